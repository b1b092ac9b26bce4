use anyhow::Context;
use bridge::server::ScanBridge;
use chrono::Utc;
use clap::Parser;
use engine::FleetEngine;
use generator::fleet::{generate_fleet, generate_scans};
use scenario::config::ScenarioConfig;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

mod bridge;
mod engine;
mod generator;
mod scenario;

#[derive(Parser)]
#[command(author, version, about = "Synthetic road-scan fleet driver and HTTP bridge")]
struct Args {
    /// Run a bounded offline simulation and emit a summary report
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a scenario config from YAML
    #[arg(long)]
    scenario: Option<PathBuf>,
    #[arg(long, default_value_t = 25)]
    devices: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,
    /// Keep the HTTP bridge and movement loop alive until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if let Some(path) = args.scenario {
        ScenarioConfig::load(path)?
    } else {
        ScenarioConfig::from_args(args.devices, args.seed, args.tick_ms)
    };

    let now = Utc::now().naive_utc();
    let fleet = generate_fleet(&config, now);
    let scans = generate_scans(&config)?;
    log::info!(
        "generated {} devices and {} scan records",
        fleet.len(),
        scans.len()
    );

    let bridge = ScanBridge::new(config.port, scans.clone());
    let mut engine = FleetEngine::new(fleet, config.interpolator(), config.seed);
    bridge.publish_fleet(engine.snapshot());

    if args.offline {
        let period = config.tick_period();
        for i in 0..10 {
            let tick_now = now + chrono::Duration::milliseconds((i + 1) * config.tick_ms as i64);
            engine.tick(period, tick_now);
        }
        bridge.publish_fleet(engine.snapshot());
        bridge.publish_status("Offline simulation results ready.");

        let active = engine.snapshot().iter().filter(|d| d.is_active()).count();
        println!(
            "Offline run -> {} ticks, {} devices ({} active), {} scan records",
            engine.ticks(),
            engine.snapshot().len(),
            active,
            scans.len()
        );

        let report = format!(
            "ticks={} devices={} active={} scans={}\n",
            engine.ticks(),
            engine.snapshot().len(),
            active,
            scans.len()
        );
        let report_path = PathBuf::from("tools/data/offline_fleet.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)?;
        file.write_all(report.as_bytes())?;
    }

    if args.serve {
        bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let period = config.tick_period();
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for the movement loop")?;
        runtime.block_on(async {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately; swallow it so every
            // advance sees a full period of elapsed time.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let tick_now = Utc::now().naive_utc();
                        engine.tick(period, tick_now);
                        bridge.publish_fleet(engine.snapshot());
                    }
                    result = signal::ctrl_c() => {
                        result.context("awaiting Ctrl+C to exit")?;
                        break;
                    }
                }
            }
            Ok::<(), anyhow::Error>(())
        })?;
        bridge.publish_status("Movement loop stopped.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_build_a_runnable_scenario() {
        let args = Args::parse_from(["simulator"]);
        let config = ScenarioConfig::from_args(args.devices, args.seed, args.tick_ms);
        assert_eq!(config.device_count, 25);
        assert_eq!(config.tick_period(), std::time::Duration::from_millis(1000));
    }
}
