use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use parkour::app::SandboxApp;
use parkour::error::MachineError;
use parkour::movement::presets::default_graph;
use parkour::movement::{MachineData, MovementStateMachine, OptionRegistry};
use parkour::script::Scenario;
use parkour::settings::{MovementSettings, SandboxSettings};

#[derive(Parser)]
#[command(name = "parkour", about = "Headless movement state machine sandbox")]
struct Args {
    /// Movement graph JSON to load instead of the built-in one
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Movement tunables JSON
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Sandbox world tunables JSON
    #[arg(long)]
    sandbox_settings: Option<PathBuf>,

    /// Scripted input to play
    #[arg(long, value_enum, default_value_t = Scenario::Hop)]
    scenario: Scenario,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 3.0)]
    seconds: f32,

    /// Frames per simulated second
    #[arg(long, default_value_t = 60.0)]
    frame_rate: f32,

    /// Print the built-in graph as JSON and exit
    #[arg(long)]
    dump_graph: bool,
}

fn main() {
    init_tracing();
    let args = Args::parse();

    if let Err(err) = run(args) {
        error!(error = %err, "sandbox_failed");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), MachineError> {
    let settings = match &args.settings {
        Some(path) => MovementSettings::load(path)?,
        None => MovementSettings::default(),
    };
    let sandbox_settings = match &args.sandbox_settings {
        Some(path) => SandboxSettings::load(path)?,
        None => SandboxSettings::default(),
    };
    let registry = OptionRegistry::builtin();

    if args.dump_graph {
        let machine = default_graph(registry, settings)?;
        println!("{}", machine.to_data().to_json()?);
        return Ok(());
    }

    let machine = match &args.graph {
        Some(path) => {
            let data = MachineData::load(path)?;
            info!(path = %path.display(), states = data.states.len(), "graph_loaded");
            MovementStateMachine::from_data(&data, registry, settings)?
        }
        None => default_graph(registry, settings)?,
    };

    info!(scenario = ?args.scenario, seconds = args.seconds, "scenario_selected");
    let mut app = SandboxApp::new(machine, args.scenario.script(), sandbox_settings)?;
    let report = app.run(args.seconds, args.frame_rate)?;

    for record in &report.transitions {
        println!(
            "{} -> {}",
            record.from.as_deref().unwrap_or("<start>"),
            record.to
        );
    }
    println!(
        "final state {} at ({:.2}, {:.2}, {:.2})",
        report.final_state.as_deref().unwrap_or("<none>"),
        report.final_position.x,
        report.final_position.y,
        report.final_position.z
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
