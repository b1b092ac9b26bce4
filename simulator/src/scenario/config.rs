use anyhow::Context;
use scancore::config::DEFAULT_RANGE_START;
use scancore::sim::interpolator::{Interpolator, DEFAULT_SPEED_DEG_PER_SEC};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Everything a simulation run needs: fleet size and seed, movement pacing,
/// the bridge port, and the synthetic scan history to serve.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub device_count: usize,
    pub seed: u64,
    pub tick_ms: u64,
    pub speed_deg_per_sec: f64,
    pub port: u16,
    pub scan_days: u32,
    pub scans_per_day: usize,
    pub range_start: String,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            device_count: 25,
            seed: 0,
            tick_ms: 1000,
            speed_deg_per_sec: DEFAULT_SPEED_DEG_PER_SEC,
            port: 9000,
            scan_days: 7,
            scans_per_day: 40,
            range_start: DEFAULT_RANGE_START.to_string(),
        }
    }
}

impl ScenarioConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading scenario config {}", path_ref.display()))?;
        let config: ScenarioConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing scenario config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(device_count: usize, seed: u64, tick_ms: u64) -> Self {
        Self {
            device_count,
            seed,
            tick_ms,
            ..Default::default()
        }
    }

    pub fn interpolator(&self) -> Interpolator {
        Interpolator {
            speed_deg_per_sec: self.speed_deg_per_sec,
            ..Default::default()
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_builds_an_interpolator() {
        let config = ScenarioConfig::from_args(10, 42, 500);
        assert_eq!(config.device_count, 10);
        assert_eq!(config.tick_period(), Duration::from_millis(500));
        assert_eq!(
            config.interpolator().speed_deg_per_sec,
            DEFAULT_SPEED_DEG_PER_SEC
        );
    }

    #[test]
    fn config_load_reads_yaml_with_defaults_for_omitted_fields() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"device_count: 8\nseed: 7\nspeed_deg_per_sec: 0.0002\n")
            .unwrap();
        let path = temp.into_temp_path();
        let config = ScenarioConfig::load(&path).unwrap();
        assert_eq!(config.device_count, 8);
        assert_eq!(config.seed, 7);
        assert_eq!(config.tick_ms, 1000);
        assert_eq!(config.interpolator().speed_deg_per_sec, 0.0002);
    }

    #[test]
    fn config_load_reports_missing_files_with_context() {
        let error = ScenarioConfig::load("does/not/exist.yaml").unwrap_err();
        assert!(error.to_string().contains("does/not/exist.yaml"));
    }
}
