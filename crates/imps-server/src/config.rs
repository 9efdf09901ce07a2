//! Server configuration from environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use imps_core::config::DEFAULT_GRID_SIZE;
use imps_core::{MapBounds, PlannerConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub planner: PlannerConfig,
    /// Directory scenario snapshots are saved to and loaded from.
    pub scenario_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let grid_size = env_or("IMPS_GRID_SIZE", DEFAULT_GRID_SIZE);
        let defaults = PlannerConfig::with_grid_size(grid_size);
        let bounds = MapBounds {
            min_lat: env_or("IMPS_MIN_LAT", defaults.bounds.min_lat),
            max_lat: env_or("IMPS_MAX_LAT", defaults.bounds.max_lat),
            min_lon: env_or("IMPS_MIN_LON", defaults.bounds.min_lon),
            max_lon: env_or("IMPS_MAX_LON", defaults.bounds.max_lon),
        };

        Self {
            server_port: env_or("IMPS_PORT", 3000),
            planner: PlannerConfig {
                grid_size,
                bounds,
                smoothing_factor: env_or("IMPS_SMOOTHING_FACTOR", defaults.smoothing_factor),
                max_expansions: env_or("IMPS_MAX_EXPANSIONS", defaults.max_expansions),
            },
            scenario_dir: env::var("IMPS_SCENARIO_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("logs")),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_values_fall_back() {
        assert_eq!(env_or::<usize>("IMPS_TEST_UNSET_VARIABLE", 7), 7);
        env::set_var("IMPS_TEST_GARBAGE_GRID", "not-a-number");
        assert_eq!(env_or::<usize>("IMPS_TEST_GARBAGE_GRID", 120), 120);
        env::set_var("IMPS_TEST_GOOD_GRID", "80");
        assert_eq!(env_or::<usize>("IMPS_TEST_GOOD_GRID", 120), 80);
    }

    #[test]
    fn expansion_budget_defaults_to_configured_grid() {
        env::remove_var("IMPS_MAX_EXPANSIONS");
        env::set_var("IMPS_GRID_SIZE", "200");
        let config = Config::from_env();
        env::remove_var("IMPS_GRID_SIZE");

        assert_eq!(config.planner.grid_size, 200);
        assert_eq!(config.planner.max_expansions, 200 * 200);
    }
}
