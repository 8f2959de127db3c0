//! Settings file for the demo.
//!
//! ```toml
//! [strip]
//! months_before = 2
//! cell_width = 48
//!
//! [session]
//! viewport_width = 390
//! flicks = 6
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dayline::{DateStripArgs, DateStripConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub strip: DateStripConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Width of the simulated scroll view, in pixels.
    pub viewport_width: i32,
    /// Flicks in each direction.
    pub flicks: usize,
    /// Distance of one flick, in cells.
    pub cells_per_flick: i32,
    /// Scroll frames per flick.
    pub frames_per_flick: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            viewport_width: 390,
            flicks: 4,
            cells_per_flick: 12,
            frames_per_flick: 8,
        }
    }
}

impl DemoConfig {
    /// Strip args from the file, with command line overrides applied.
    pub fn strip_args(&self, anchor: Option<NaiveDate>, today: Option<NaiveDate>) -> DateStripArgs {
        let mut args = self.strip.apply(DateStripArgs::default());
        if let Some(anchor) = anchor {
            args = args.anchor(anchor);
        }
        if let Some(today) = today {
            args = args.today_provider(move || today);
        }
        args
    }
}

pub fn load(path: Option<&Path>) -> Result<DemoConfig> {
    let Some(path) = path else {
        return Ok(DemoConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use dayline::Px;

    use super::*;

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let config: DemoConfig = toml::from_str(
            r#"
            [strip]
            anchor = "2024-03-15"
            cell_width = 48

            [session]
            flicks = 9
            "#,
        )
        .unwrap();
        assert_eq!(config.session.flicks, 9);
        assert_eq!(config.session.viewport_width, 390);

        let args = config.strip_args(None, None);
        assert_eq!(args.anchor, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(args.cell_width, Px(48));
        assert_eq!(args.months_after, 2);
    }

    #[test]
    fn command_line_overrides_the_file() {
        let config = DemoConfig::default();
        let anchor = NaiveDate::from_ymd_opt(2020, 5, 5).unwrap();
        let today = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let args = config.strip_args(Some(anchor), Some(today));
        assert_eq!(args.anchor, Some(anchor));
        assert_eq!(args.today.call(()), today);
    }
}
