//! planner: plan departure times and routes for every vehicle of a road
//! network so that all of them reach their destinations.
//!
//! ```text
//! planner car.txt road.txt cross.txt presetAnswer.txt answer.txt [--config planner.json]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgMatches, Command, arg};

use tp_core::PlannerConfig;
use tp_fleet::VehicleRegistry;
use tp_network::{RoadNetwork, RoadNetworkBuilder};
use tp_sched::{LogObserver, PlanSummary, SchedulerBuilder};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn cli() -> Command {
    Command::new("planner")
        .about("Congestion-aware departure and route planning for a vehicle fleet")
        .arg(arg!(<CARS> "Vehicle records").value_parser(clap::value_parser!(PathBuf)))
        .arg(arg!(<ROADS> "Road records").value_parser(clap::value_parser!(PathBuf)))
        .arg(arg!(<CROSSES> "Intersection records").value_parser(clap::value_parser!(PathBuf)))
        .arg(arg!(<PRESETS> "Preset route records").value_parser(clap::value_parser!(PathBuf)))
        .arg(arg!(<ANSWER> "Output path for the planned routes").value_parser(clap::value_parser!(PathBuf)))
        .arg(
            arg!(--config <PATH> "JSON file overriding the default tuning")
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            arg!(--summary <PATH> "Write the plan summary as JSON")
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = cli().get_matches();
    let path = |name| path_arg(&matches, name);

    let config = match matches.get_one::<PathBuf>("config") {
        Some(p) => load_config(p)?,
        None => PlannerConfig::default(),
    };
    config.validate()?;

    let started = Instant::now();
    let network = load_network(path("ROADS")?, path("CROSSES")?, &config)?;

    let cars = tp_io::load_cars(path("CARS")?).context("reading vehicle records")?;
    let presets = tp_io::load_presets(path("PRESETS")?).context("reading preset routes")?;
    let mut fleet = VehicleRegistry::from_records(cars, &network)?;
    fleet.apply_presets(&presets, &network)?;
    log::info!(
        "loaded {} roads, {} intersections, {} vehicles ({} preset) in {:.2?}",
        network.road_count(),
        network.cross_count(),
        fleet.len(),
        presets.len(),
        started.elapsed()
    );

    let mut scheduler = SchedulerBuilder::new(network, fleet).config(config).build()?;
    let summary = scheduler.plan(&mut LogObserver::default())?;
    log::info!("planned in {:.2?}", started.elapsed());

    tp_io::write_answer_file(path("ANSWER")?, &scheduler.fleet, &scheduler.network)?;
    if let Some(p) = matches.get_one::<PathBuf>("summary") {
        write_summary(p, &summary)?;
    }

    print_summary(&summary);
    Ok(())
}

fn path_arg<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    matches.get_one::<PathBuf>(name).with_context(|| format!("missing argument {name}"))
}

fn load_config(path: &Path) -> Result<PlannerConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn load_network(roads: &Path, crosses: &Path, config: &PlannerConfig) -> Result<RoadNetwork> {
    let roads = tp_io::load_roads(roads).context("reading road records")?;
    let crosses = tp_io::load_crosses(crosses).context("reading intersection records")?;
    let mut b = RoadNetworkBuilder::with_capacity(roads.len(), crosses.len());
    for r in roads {
        b.add_road(r);
    }
    for c in crosses {
        b.add_cross(c);
    }
    b.weights(config.weights.clone());
    Ok(b.build()?)
}

fn write_summary(path: &Path, summary: &PlanSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

fn print_summary(s: &PlanSummary) {
    println!("=== plan ===");
    println!("Ticks: {}  |  Priority span: {}", s.total_ticks, s.priority_span);
    println!("Travel: {}  |  Priority travel: {}", s.total_travel, s.priority_travel);
    println!(
        "Deadlocks: {}  |  Rollbacks: {}  |  Released presets: {}  |  Key roads: {}",
        s.deadlocks, s.rollbacks, s.released, s.key_roads
    );
    if let (Some(schedule), Some(travel)) = (s.schedule_score(), s.travel_score()) {
        println!("Weighted schedule: {schedule:.0}  |  Weighted travel: {travel:.0}");
    }
}
