use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::NaiveDate;
use dayline::{
    DateCell, DateStripArgs, DateStripController, MonthYear, OverlayRequest, OverlaySignal, Px,
    ScrollRequest, overlay,
};
use parking_lot::Mutex;

const CELL: i32 = 60;
const VIEWPORT: Px = Px(360);

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn strip(anchor: NaiveDate, today: NaiveDate) -> DateStripController {
    let mut strip = DateStripController::new(
        DateStripArgs::default()
            .anchor(anchor)
            .cell_width(Px(CELL))
            .today_provider(move || today),
    )
    .unwrap();
    strip.set_viewport_width(VIEWPORT);
    strip
}

fn assert_contiguous(strip: &DateStripController) {
    strip.window().validate().unwrap();
    let keys: Vec<i32> = strip.window().cells().iter().map(DateCell::key).collect();
    assert!(keys.windows(2).all(|pair| pair[1] == pair[0] + 1));
}

#[test]
fn initial_window_spans_whole_months_around_the_anchor() {
    let strip = strip(ymd(2024, 3, 15), ymd(2024, 3, 15));
    let window = strip.window();
    assert_eq!(window.first().unwrap().date(), ymd(2024, 2, 1));
    assert_eq!(window.last().unwrap().date(), ymd(2024, 5, 31));
    assert_eq!(window.len(), 29 + 31 + 30 + 31);
    assert_contiguous(&strip);
}

#[test]
fn flicking_backward_keeps_the_leading_date_in_place() {
    let mut strip = strip(ymd(2024, 3, 15), ymd(2024, 3, 15));
    let now = Instant::now();
    strip.tick(now);

    for _ in 0..14 {
        strip.on_scroll(Px::ZERO, now);
        // A second frame at the edge before the commit must not grow twice.
        strip.on_scroll(Px::ZERO, now);
        let leading = strip.window().first().unwrap().date();
        let before = strip.window().len();

        let update = strip.tick(now);
        assert!(update.window_changed);
        let prepended = strip.window().len() - before;
        assert_eq!(
            update.scroll,
            vec![ScrollRequest {
                index: prepended,
                offset: Px(CELL) * prepended as i32,
                animated: false,
            }]
        );
        assert_eq!(strip.window().get(prepended).unwrap().date(), leading);
        assert_contiguous(&strip);
        strip.acknowledge_scroll();
    }
    assert_eq!(strip.window().first().unwrap().date(), ymd(2022, 12, 1));
    assert_eq!(strip.window().last().unwrap().date(), ymd(2024, 5, 31));
}

#[test]
fn scrolling_to_the_end_appends_months() {
    let mut strip = strip(ymd(2024, 3, 15), ymd(2024, 3, 15));
    let now = Instant::now();
    strip.tick(now);

    for month in 6..=12 {
        let end = strip.scroll().max_offset();
        strip.on_scroll(end, now);
        let update = strip.tick(now);
        assert!(update.window_changed);
        assert!(update.scroll.is_empty());
        assert_eq!(strip.scroll().offset(), end);
        assert_eq!(strip.window().last().unwrap().month(), month);
        assert_contiguous(&strip);
    }
    assert_eq!(strip.window().first().unwrap().date(), ymd(2024, 2, 1));
}

#[test]
fn go_to_today_always_lands_on_today() {
    let today = ymd(2024, 3, 15);
    let anchors = [
        ymd(1999, 12, 31),
        ymd(2024, 2, 29),
        ymd(2024, 3, 15),
        ymd(2100, 1, 1),
    ];
    for anchor in anchors {
        let mut strip = strip(anchor, today);
        let now = Instant::now();
        strip.on_scroll(Px::ZERO, now);
        strip.tick(now);

        strip.handle().go_to_today();
        let update = strip.tick(now);
        let glide = update
            .scroll
            .iter()
            .find(|request| request.animated)
            .copied()
            .unwrap();
        assert!(strip.window().contains(today), "anchor {anchor}");
        assert_eq!(strip.window().get(glide.index).unwrap().date(), today);
        assert_eq!(glide.offset, Px(CELL) * glide.index as i32);
        assert_contiguous(&strip);
    }
}

#[test]
fn month_header_changes_once_per_month() {
    let months = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&months);
    let anchor = ymd(2024, 1, 15);
    let mut strip = DateStripController::new(
        DateStripArgs::default()
            .anchor(anchor)
            .today_provider(move || anchor)
            .on_month_change(move |month| sink.lock().push(month)),
    )
    .unwrap();
    strip.set_viewport_width(Px(300));

    let index_of = |strip: &DateStripController, date| {
        strip
            .window()
            .cells()
            .iter()
            .position(|cell| cell.date() == date)
            .unwrap()
    };
    let rests = [
        ymd(2024, 1, 10),
        ymd(2024, 1, 11),
        ymd(2024, 1, 12),
        ymd(2024, 2, 3),
        ymd(2024, 2, 7),
        ymd(2024, 3, 20),
    ];
    let start = Instant::now();
    for (step, date) in rests.into_iter().enumerate() {
        let offset = Px(60) * index_of(&strip, date) as i32;
        let frame = start + Duration::from_secs(step as u64);
        strip.on_scroll(offset, frame);
        strip.tick(frame + Duration::from_millis(200));
    }

    assert_eq!(
        *months.lock(),
        vec![MonthYear::new(2, 2024), MonthYear::new(3, 2024)]
    );
}

#[test]
fn overlay_request_seeds_a_new_strip() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&requests);
    let subscription = overlay::subscribe(move |signal| {
        if let OverlaySignal::Open(request) = signal {
            sink.lock().push(request);
        }
    });

    assert!(overlay::open(OverlayRequest::at(ymd(2023, 8, 20))));
    let request = requests.lock().pop().unwrap();
    let today = ymd(2024, 3, 15);
    let mut strip = DateStripController::new(
        DateStripArgs::default()
            .anchor(request.focus.unwrap_or(today))
            .today_provider(move || today),
    )
    .unwrap();
    let update = strip.tick(Instant::now());
    assert_eq!(
        strip.window().get(update.scroll[0].index).unwrap().date(),
        ymd(2023, 8, 20)
    );

    drop(subscription);
    assert!(!overlay::close());
}
