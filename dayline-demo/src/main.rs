use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

mod config;
mod session;

#[derive(Parser)]
#[command(name = "dayline-demo")]
#[command(version, about = "Drive a dayline date strip without a UI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the initial window built around an anchor date
    Window(WindowArgs),
    /// Replay a scripted scroll session and log what the strip reports
    Session(SessionArgs),
}

#[derive(Args)]
struct WindowArgs {
    /// Anchor date (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    anchor: Option<NaiveDate>,
    /// TOML file with strip settings
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct SessionArgs {
    /// Anchor date (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    anchor: Option<NaiveDate>,
    /// Pretend today is this date
    #[arg(long)]
    today: Option<NaiveDate>,
    /// Number of flicks in each direction
    #[arg(short, long)]
    flicks: Option<usize>,
    /// TOML file with strip and session settings
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    dayline::init_tracing();
    let Cli { command } = Cli::parse();

    match command {
        Commands::Window(args) => {
            let file = config::load(args.config.as_deref())?;
            session::print_window(file.strip_args(args.anchor, None))?;
        }
        Commands::Session(args) => {
            let file = config::load(args.config.as_deref())?;
            let mut options = file.session.clone();
            if let Some(flicks) = args.flicks {
                options.flicks = flicks;
            }
            let report = session::run(file.strip_args(args.anchor, args.today), &options)?;
            report.print();
        }
    }

    Ok(())
}
