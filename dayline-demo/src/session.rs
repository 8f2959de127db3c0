//! A headless host that scrolls a strip the way a touch UI would.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dayline::{DateStripArgs, DateStripController, FrameUpdate, MonthYear, Px};
use tracing::{debug, info};

use crate::config::SessionConfig;

const FRAME: Duration = Duration::from_millis(16);

/// What the strip reported during a session.
#[derive(Debug, Default)]
pub struct SessionReport {
    pub months: Vec<MonthYear>,
    pub selections: Vec<NaiveDate>,
    pub growths: usize,
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
    pub len: usize,
    pub landed_on: Option<NaiveDate>,
}

impl SessionReport {
    pub fn print(&self) {
        let months: Vec<String> = self.months.iter().map(ToString::to_string).collect();
        println!("month header: {}", months.join(" -> "));
        for date in &self.selections {
            println!("selected {date}");
        }
        println!("window grew {} times", self.growths);
        if let (Some(first), Some(last)) = (self.first, self.last) {
            println!("window {first} ..= {last} ({} days)", self.len);
        }
        if let Some(date) = self.landed_on {
            println!("go to today landed on {date}");
        }
    }
}

struct HeadlessHost {
    strip: DateStripController,
    offset: Px,
    clock: Instant,
    report: SessionReport,
}

impl HeadlessHost {
    fn new(strip: DateStripController) -> Self {
        Self {
            strip,
            offset: Px::ZERO,
            clock: Instant::now(),
            report: SessionReport::default(),
        }
    }

    fn frame(&mut self, elapsed: Duration) -> FrameUpdate {
        self.clock += elapsed;
        let update = self.strip.tick(self.clock);
        if update.window_changed {
            self.report.growths += 1;
        }
        if let Some(month) = update.month {
            self.report.months.push(month);
        }
        // Animations complete within the frame.
        for request in &update.scroll {
            debug!(?request, "applying scroll request");
            self.offset = request.offset;
        }
        if !update.scroll.is_empty() {
            self.strip.acknowledge_scroll();
        }
        update
    }

    fn flick(&mut self, distance: Px, frames: u32) {
        let frames = frames.max(1);
        let step = distance / frames as i32;
        for _ in 0..frames {
            self.strip.on_scroll(self.offset + step, self.clock);
            self.offset = self.strip.scroll().offset();
            self.frame(FRAME);
        }
        let end = self.strip.momentum_end(self.offset);
        self.report.selections.extend(end.selected);
        self.report.months.extend(end.month);
        self.frame(self.strip.args().settle_delay);
    }
}

/// Prints the window the args produce.
pub fn print_window(args: DateStripArgs) -> Result<()> {
    let strip = DateStripController::new(args).context("Failed to build the date strip")?;
    let window = strip.window();
    let (Some(first), Some(last)) = (window.first(), window.last()) else {
        println!("empty window");
        return Ok(());
    };
    println!("{first} ..= {last} ({} days)", window.len());
    let mut month = None;
    for cell in window.cells() {
        if month != Some(cell.month_year()) {
            month = Some(cell.month_year());
            println!("  {} starts on {}", cell.month_year(), cell.weekday_label());
        }
    }
    Ok(())
}

/// Flicks back past the start edge, forward past the end edge, then jumps
/// to today.
pub fn run(args: DateStripArgs, options: &SessionConfig) -> Result<SessionReport> {
    let args = args
        .on_select_date(|date| info!(%date, "date selected"))
        .on_month_change(|month| info!(%month, "month changed"));
    let cell_width = args.cell_width;
    let strip = DateStripController::new(args).context("Failed to build the date strip")?;

    let mut host = HeadlessHost::new(strip);
    host.strip.set_viewport_width(Px(options.viewport_width));
    host.frame(FRAME);

    let distance = cell_width * options.cells_per_flick;
    for _ in 0..options.flicks {
        host.flick(-distance, options.frames_per_flick);
    }
    for _ in 0..options.flicks * 2 {
        host.flick(distance, options.frames_per_flick);
    }

    host.strip.handle().go_to_today();
    let update = host.frame(FRAME);
    host.report.landed_on = update
        .scroll
        .iter()
        .find(|request| request.animated)
        .and_then(|request| host.strip.window().get(request.index))
        .map(|cell| cell.date());

    let window = host.strip.window();
    host.report.first = window.first().map(|cell| cell.date());
    host.report.last = window.last().map(|cell| cell.date());
    host.report.len = window.len();
    Ok(host.report)
}
