use anyhow::Context;
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use psalter::{HttpVerseService, VerseCache};
use solomonic_clock::app::AppModel;
use solomonic_clock::config::{self, Settings};
use solomonic_clock::coordinator::DetailCoordinator;
use solomonic_clock::data::{self, PsalmMap, Ring};
use solomonic_clock::engine::ClockModel;
use solomonic_clock::panel::DetailPanel;
use solomonic_clock::sys::runtime;
use std::path::PathBuf;
use strum::IntoEnumIterator;

#[derive(Parser, Debug)]
#[command(name = "solomonic-clock", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Settings file to use instead of the one in the user config directory
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Run the live clock until interrupted (default)
    Run,
    /// Print the state of every ring at one instant
    Snapshot {
        /// Local time such as 2024-03-09T15:45 (defaults to now)
        #[arg(long, value_parser = parse_instant)]
        at: Option<NaiveDateTime>,
    },
    /// List the wedges of a ring with their angles
    Layout { ring: Ring },
    /// Write the default settings file if none exists
    InitConfig,
}

fn parse_instant(s: &str) -> Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("invalid local time '{}', expected YYYY-MM-DDTHH:MM[:SS]", s))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(Commands::InitConfig) = cli.command {
        let path = config::write_default_config(cli.config.as_deref())?;
        println!("{}", path.display());
        return Ok(());
    }

    let settings = config::load_or_default(cli.config.as_deref());
    let clock = load_clock(&settings)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(settings, clock),
        Commands::Snapshot { at } => {
            let psalms = load_psalms(&settings)?;
            snapshot(&settings, &clock, &psalms, at.unwrap_or_else(|| Local::now().naive_local()));
            Ok(())
        }
        Commands::Layout { ring } => {
            for row in clock.describe_ring(ring) {
                println!(
                    "{:>3}  {:>7.2}° – {:>7.2}°  (center {:>7.2}°)  {}",
                    row.index,
                    row.start_angle.to_degrees(),
                    row.end_angle.to_degrees(),
                    row.center_angle.to_degrees(),
                    row.label
                );
            }
            Ok(())
        }
        Commands::InitConfig => Ok(()),
    }
}

fn load_clock(settings: &Settings) -> anyhow::Result<ClockModel> {
    let path = &settings.data.clock;
    let data = data::load_clock_data(path)
        .with_context(|| format!("Failed to load clock data from {}", path.display()))?;
    Ok(ClockModel::new(data))
}

fn load_psalms(settings: &Settings) -> anyhow::Result<PsalmMap> {
    let path = &settings.data.psalms;
    let psalms = data::load_psalm_map(path)
        .with_context(|| format!("Failed to load psalm mapping from {}", path.display()))?;
    log::info!("Loaded psalm citations for {} pentacles", psalms.len());
    Ok(psalms)
}

fn run(settings: Settings, clock: ClockModel) -> anyhow::Result<()> {
    let psalms = load_psalms(&settings)?;

    let service = HttpVerseService::new(&settings.service.endpoint, settings.service.timeout())?;
    log::info!("Using verse service at {}", service.endpoint());
    let verses = VerseCache::new(service)
        .with_book(settings.service.book.as_str())
        .with_translation(settings.service.translation.as_str());

    let rt = runtime::build()?;
    let (tx, rx) = async_channel::bounded(32);
    let coordinator = DetailCoordinator::new(verses, psalms, tx.clone(), rt.handle().clone());
    let app = AppModel::new(clock, coordinator, &settings.display.clock_format);

    runtime::run(&rt, app, tx, rx, settings.display.frame_interval())
}

fn snapshot(settings: &Settings, clock: &ClockModel, psalms: &PsalmMap, at: NaiveDateTime) {
    let state = clock.time_state(&at, &settings.display.clock_format);
    let rotations = clock.rotations(&state).to_degrees();
    let show = |index: Option<usize>| index.map_or_else(|| "-".to_string(), |i| i.to_string());

    println!("{}", clock.title);
    println!("{}", state.day_label());
    println!("{}", clock.core.name);
    println!();
    println!(
        "spirit     fraction {:.6}  index {:>3}  rotation {:>9.3}°",
        state.fractions.spirit,
        show(state.indices.spirit),
        rotations.spirit
    );
    println!(
        "planetary  fraction {:.6}  index {:>3}  rotation {:>9.3}°",
        state.fractions.planetary,
        show(state.indices.planetary),
        rotations.planetary
    );
    println!(
        "celestial  fraction {:.6}  index {:>3}  rotation {:>9.3}°",
        state.fractions.celestial,
        show(state.indices.celestial),
        rotations.celestial
    );
    println!("pentacle                     index {:>3}", show(state.indices.pentacle));
    println!();

    let visual = &clock.visual;
    for ring in Ring::iter() {
        println!(
            "{:<10} radius {:>5}  color {}",
            ring,
            visual.radius.get(ring),
            visual.color_scheme.get(ring)
        );
    }
    println!();

    if let Some(seal) = state.active.celestial {
        println!("{}", seal.describe());
    }
    if let Some(group) = state.active.planetary {
        println!("{}", group.describe());
    }
    if let Some(sector) = state.active.spirit {
        println!("{}", sector.describe());
    }
    println!();

    let panel = match state.active.pentacle {
        Some(pentacle) => {
            DetailPanel::for_pentacle(pentacle, psalms.get(&pentacle.key()), &settings.service.book)
        }
        None => DetailPanel::Idle,
    };
    print!("{}", panel);
}
