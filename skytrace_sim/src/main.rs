//! SkyTrace playback simulator CLI
//!
//! Fast-forwards a flight through the full engine on a virtual clock and
//! prints the emitted event stream plus a telemetry summary.

use clap::Parser;
use skytrace_core::config::{FlightConfig, Point, TrackingEnv, VehicleType};
use skytrace_core::geo::path_length_m;
use skytrace_core::{FlightEvent, PlayerRegistry};
use skytrace_env::{FlightContext, VehicleId};
use skytrace_sim::{RecordingTransport, SimContext};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// SkyTrace deterministic playback CLI
#[derive(Parser, Debug)]
#[command(name = "skytrace-sim")]
#[command(about = "Fast-forward a flight path on a virtual clock", long_about = None)]
struct Args {
    /// JSON file with the path: an array of {"lon", "lat", "alt"} waypoints
    /// (a built-in demo path is used when omitted)
    #[arg(short, long)]
    path: Option<String>,

    /// Ground speed in m/s
    #[arg(short, long, default_value = "11.1")]
    speed: f64,

    /// Update interval in milliseconds
    #[arg(short, long, default_value = "1000")]
    interval_ms: u64,

    /// Loop back to the path start at the end
    #[arg(short, long)]
    repeat: bool,

    /// Maximum simulated duration in seconds
    #[arg(short, long, default_value = "600")]
    duration: f64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON summary output
    #[arg(long)]
    json: bool,
}

/// Short climb-and-descend loop near Brussels.
fn demo_path() -> Vec<Point> {
    vec![
        Point::new(4.3500, 50.8500, 0.0),
        Point::new(4.3520, 50.8530, 80.0),
        Point::new(4.3560, 50.8530, 120.0),
        Point::new(4.3580, 50.8500, 60.0),
        Point::new(4.3540, 50.8480, 0.0),
    ]
}

fn load_path(file: &str) -> Vec<Point> {
    let data = std::fs::read_to_string(file).unwrap_or_else(|e| {
        eprintln!("Error reading {file}: {e}");
        std::process::exit(1);
    });
    serde_json::from_str(&data).unwrap_or_else(|e| {
        eprintln!("Error parsing {file}: {e}");
        std::process::exit(1);
    })
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let path = match &args.path {
        Some(file) => load_path(file),
        None => demo_path(),
    };
    if args.speed <= 0.0 {
        eprintln!("Error: speed must be positive");
        std::process::exit(1);
    }

    let total_m = path_length_m(&path);
    info!(
        "Flying {} waypoints, {:.1}m total, at {:.1} m/s ({}ms ticks)",
        path.len(),
        total_m,
        args.speed,
        args.interval_ms
    );

    let config = FlightConfig {
        path,
        speed_ms: args.speed,
        call_sign: "SKYTRACE-SIM".to_string(),
        transponder_id: String::new(),
        security_group: String::new(),
        vehicle_type: VehicleType::Uas,
    };
    let env = TrackingEnv {
        id: "sim".to_string(),
        name: "Simulation".to_string(),
        api: "http://sim.invalid".to_string(),
        api_key: "sim".to_string(),
    };

    let ctx = SimContext::shared();
    let transport = Arc::new(RecordingTransport::new());
    let registry = PlayerRegistry::new(Arc::clone(&ctx), transport.clone());

    let vehicle_id = VehicleId::new();
    let player = registry.create(vehicle_id, config, env);
    let mut events = player.subscribe();

    let interval = Duration::from_millis(args.interval_ms);
    let max_ticks = (args.duration * 1000.0 / args.interval_ms as f64) as u64;

    player.set_play_repeat(args.repeat);
    player.set_update_interval(interval);
    player.play();
    ctx.run_until_stalled();

    let mut ticks = 0u64;
    let mut last_distance = 0.0f64;
    let mut removed = false;

    'sim: while ticks < max_ticks {
        ctx.step(interval);
        ticks += 1;

        loop {
            match events.try_recv() {
                Ok(FlightEvent::VehicleCreated { state, .. }) => {
                    info!("created at ({:.5}, {:.5})", state.position.lon, state.position.lat);
                }
                Ok(FlightEvent::VehicleUpdated { state, .. }) => {
                    last_distance = state.distance_travelled;
                    info!(
                        "t={:>5}s  d={:>7.1}m  alt={:>6.1}m  hdg={:>5.1}",
                        ctx.now().as_secs(),
                        state.distance_travelled,
                        state.position.alt,
                        state.heading
                    );
                }
                Ok(FlightEvent::VehicleRemoved { .. }) => {
                    info!("vehicle removed (end of path)");
                    removed = true;
                    break 'sim;
                }
                Ok(FlightEvent::ApiError { message }) => {
                    warn!("{message}");
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => break 'sim,
                Err(TryRecvError::Lagged(n)) => {
                    error!("event stream lagged by {n}");
                }
            }
        }
    }

    registry.remove(vehicle_id);
    ctx.run_until_stalled();

    if args.json {
        let summary = serde_json::json!({
            "ticks": ticks,
            "tracks_sent": transport.sent_count(),
            "distance_m": last_distance,
            "path_length_m": total_m,
            "completed": removed,
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap());
    } else {
        info!(
            "done: {} ticks, {} tracks sent, {:.1}m of {:.1}m",
            ticks,
            transport.sent_count(),
            last_distance,
            total_m
        );
    }
}
