pub mod analysis;
pub mod commands;
pub mod error;
pub mod models;
pub mod render;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use commands::{
    db::{default_store_path, AccessMode, SampleStore},
    display::{run_display_internal, DisplaySinks},
    sample::{http_client, run_sample_internal},
    settings::{
        default_settings_path, load_effective_settings, parse_assignment, save_settings_to_disk,
        EffectiveSettings,
    },
    watcher::watch_store,
};
use models::display::{DisplayOutcome, TermSize};
use render::{clear_screen, ChartSink, Figlet, Gnuplot};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rr-stats")]
#[command(about = "Track Royal Road fiction statistics in the terminal", long_about = None)]
struct Cli {
    /// Sample database (defaults to the user data directory).
    #[arg(long, global = true, env = "RR_STATS_DB")]
    db: Option<PathBuf>,

    /// Settings file (defaults to the user config directory).
    #[arg(long, global = true, env = "RR_STATS_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the fiction page and record one sample.
    Sample {
        /// Fiction page; overrides the configured URL.
        #[arg(short, long)]
        url: Option<String>,
    },
    /// Render the latest sample and its day-over-day change.
    Display(DisplayArgs),
    /// Re-render every time the sample database changes.
    Watch(DisplayArgs),
    /// Show settings, optionally updating them first.
    Config {
        /// `key=value`; the value is read as JSON when possible.
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
}

#[derive(Args, Clone, Copy)]
struct DisplayArgs {
    /// Skip the gnuplot charts.
    #[arg(long)]
    no_chart: bool,
}

pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let store_path = cli.db.unwrap_or_else(default_store_path);
    let settings_path = cli.settings.unwrap_or_else(default_settings_path);

    match cli.command {
        Commands::Sample { url } => {
            let settings = load_effective_settings(&settings_path)
                .with_context(|| format!("loading settings from {}", settings_path.display()))?;
            let url = url.unwrap_or(settings.fiction_url);
            let store = SampleStore::open(&store_path, AccessMode::ReadWrite)
                .with_context(|| format!("opening {}", store_path.display()))?;
            let client = http_client()?;
            let sample = run_sample_internal(&store, &client, &url)
                .with_context(|| format!("sampling {url}"))?;
            println!("{}", serde_json::to_string_pretty(&sample)?);
        }
        Commands::Display(args) => {
            let settings = load_effective_settings(&settings_path)?;
            let store = SampleStore::open(&store_path, AccessMode::ReadOnly)
                .with_context(|| format!("opening {}", store_path.display()))?;
            display_once(&store, &settings, args)?;
        }
        Commands::Watch(args) => {
            let settings = load_effective_settings(&settings_path)?;
            let store = SampleStore::open(&store_path, AccessMode::ReadOnly)
                .with_context(|| format!("opening {}", store_path.display()))?;
            watch_store(&store_path, settings.watch_debounce, || {
                clear_screen(&mut std::io::stdout())?;
                display_once(&store, &settings, args).map(|_| ())
            })?;
        }
        Commands::Config { set } => {
            let mut updated = None;
            for assignment in &set {
                updated = Some(save_settings_to_disk(&settings_path, parse_assignment(assignment)?)?);
            }
            let shown = match updated {
                Some(value) => value,
                None => commands::settings::load_settings_from_disk(&settings_path)?,
            };
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
    }

    Ok(())
}

fn display_once(
    store: &SampleStore,
    settings: &EffectiveSettings,
    args: DisplayArgs,
) -> error::Result<DisplayOutcome> {
    let figlet = Figlet {
        font: settings.figlet_font.clone(),
        direction: settings.figlet_direction,
        spacing: settings.figlet_spacing,
    };
    let mut gnuplot = Gnuplot::new(settings.chart_rows_divisor);
    let chart: Option<&mut dyn ChartSink> = if settings.chart_enabled && !args.no_chart {
        Some(&mut gnuplot)
    } else {
        None
    };

    let stdout = std::io::stdout();
    let mut lines = stdout.lock();
    let mut sinks = DisplaySinks {
        numerals: &figlet,
        lines: &mut lines,
        chart,
    };

    run_display_internal(store, settings.primary_metric, &mut sinks, TermSize::detect())
}
