use std::{
    env,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use anyhow::Result;
use clap::Parser;
use log::info;
use nalgebra::Vector3;
use swaytrack::{SensorReceiver, SwayTracker, TrackerConfig};

#[derive(Parser, Debug)]
#[command(about = "Pendulum-model position tracker fed by a UDP IMU stream")]
struct Args {
    /// Path to the TOML configuration
    #[arg(short, long, default_value = "config/swaytrack.toml")]
    config: PathBuf,

    /// Consumer tick period in milliseconds
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
}

fn main() -> Result<()> {
    // Default log level to "info"
    if env::var("RUST_LOG").is_err() {
        unsafe { env::set_var("RUST_LOG", "info") }
    }
    pretty_env_logger::init();

    let args = Args::parse();
    let config = TrackerConfig::from_file(&args.config)?;

    let mut receiver = SensorReceiver::bind(config.listen_port, config.axis_map)?;
    let mut tracker = SwayTracker::new(receiver.slot(), config.estimator_params());

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::Relaxed))?;
    }

    let anchor = Vector3::zeros();
    let mut tick = 0u64;

    while running.load(Ordering::Relaxed) {
        let position = tracker.update(&anchor);

        // Roughly once per second at the default cadence.
        if tick % 60 == 0 {
            info!(
                "position: [{:+.3}, {:+.3}, {:+.3}] (calibrated: {})",
                position.x,
                position.y,
                position.z,
                tracker.is_calibrated()
            );
        }
        tick += 1;

        thread::sleep(Duration::from_millis(args.tick_ms));
    }

    receiver.shutdown();
    Ok(())
}
