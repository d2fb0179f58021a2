mod communication;
mod config;
mod error;
mod hardware;
mod session;

use brain::{Executor, LogProgress, Planner, ShapeDrawer};
use clap::{Parser, ValueEnum};
use communication::CommunicationLayer;
use config::AppConfig;
use hardware::{BridgeDrive, ChannelCodeReader, DriveBackend, LightBackend, SimulatedDrive};
use kinematics::DifferentialDrive;
use log::info;
use session::{Drawer, Session};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Simulated motors and lights; codes are typed on stdin.
    Sim,
    /// Motors, lights and camera reached over zenoh.
    Zenoh,
}

#[derive(Parser, Debug)]
#[command(name = "shape-drawer", version, about = "Draws shapes from scanned codes")]
struct Cli {
    #[arg(long, help = "TOML configuration file")]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Backend::Sim)]
    backend: Backend,
    #[arg(long, help = "Draw this command string once, save the log and exit")]
    command: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    println!("Initializing Shape Drawer ({:?} backend)...", cli.backend);

    let (code_tx, code_rx) = mpsc::channel::<String>();
    let (drive, light) = match cli.backend {
        Backend::Sim => {
            let model = DifferentialDrive::new(
                config.simulation.wheel_base_cm,
                config.simulation.full_speed_cm_s,
            );
            (
                DriveBackend::Simulated(SimulatedDrive::new(model, config.simulation.realtime)),
                LightBackend::Console,
            )
        }
        Backend::Zenoh => {
            let bridge = Arc::new(CommunicationLayer::new(&config.bridge).await?);
            let camera_codes = code_tx.clone();
            bridge
                .subscribe_codes(move |code| {
                    let _ = camera_codes.send(code);
                })
                .await?;
            let runtime = tokio::runtime::Handle::current();
            info!("Connected to zenoh bridge");
            (
                DriveBackend::Bridge(BridgeDrive::new(Arc::clone(&bridge), runtime.clone())),
                LightBackend::Bridge { bridge, runtime },
            )
        }
    };

    let executor = Executor::new(drive, light, LogProgress)
        .with_celebration(config.celebration.clone());
    let drawer: Drawer = ShapeDrawer::new(Planner::new(config.calibration.clone()), executor);

    if let Some(command) = cli.command {
        let drawer = session::draw(drawer, command).await?;
        print!("{}", drawer.summarize());
        drawer.persist(&config.logging.summary_path)?;
        return Ok(());
    }

    let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel();
    session::spawn_console_input(event_tx, code_tx);

    Session::new(config, drawer, ChannelCodeReader::new(code_rx), event_rx)
        .run()
        .await?;
    Ok(())
}
