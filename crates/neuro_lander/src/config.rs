use neuro_core::{EngineConfig, NetworkTopology};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Physics of the landing task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_gravity")]
    pub gravity: f64,
    #[serde(default = "default_fps")]
    pub fps: f64,
    /// Height of the play field; the ground is at the bottom edge
    #[serde(default = "default_world_height")]
    pub world_height: f64,
    #[serde(default = "default_start_y")]
    pub start_y: f64,
    #[serde(default = "default_rocket_height")]
    pub rocket_height: f64,
    /// Thrust added per burn tick (negative is upwards)
    #[serde(default = "default_thrust_step")]
    pub thrust_step: f64,
    /// Highest touchdown velocity that still counts as a landing
    #[serde(default = "default_landing_velocity")]
    pub landing_velocity: f64,
    #[serde(default = "default_fuel")]
    pub fuel: u32,
    /// Runs longer than this end as escaped
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u32,
}

fn default_gravity() -> f64 {
    9.8
}
fn default_fps() -> f64 {
    60.0
}
fn default_world_height() -> f64 {
    500.0
}
fn default_start_y() -> f64 {
    40.0
}
fn default_rocket_height() -> f64 {
    30.0
}
fn default_thrust_step() -> f64 {
    -0.2
}
fn default_landing_velocity() -> f64 {
    5.0
}
fn default_fuel() -> u32 {
    300
}
fn default_max_ticks() -> u32 {
    10_000
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            fps: default_fps(),
            world_height: default_world_height(),
            start_y: default_start_y(),
            rocket_height: default_rocket_height(),
            thrust_step: default_thrust_step(),
            landing_velocity: default_landing_velocity(),
            fuel: default_fuel(),
            max_ticks: default_max_ticks(),
        }
    }
}

impl SimulationConfig {
    /// Velocity gained per tick from gravity.
    pub fn gravity_per_tick(&self) -> f64 {
        self.gravity / (1000.0 / self.fps)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_engine")]
    pub engine: EngineConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default = "default_generations")]
    pub generations: u32,
}

fn default_engine() -> EngineConfig {
    EngineConfig::new(NetworkTopology::new(3, vec![15], 1), 10)
}

fn default_generations() -> u32 {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            simulation: SimulationConfig::default(),
            generations: default_generations(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.engine.population, 10);
        assert_eq!(config.engine.topology.neuron_counts(), vec![3, 15, 1]);
        assert_eq!(config.simulation.fuel, 300);
        assert_eq!(config.generations, 50);
    }

    #[test]
    fn partial_tables_override_fields() {
        let toml = r#"
            generations = 5

            [engine]
            population = 20
            seed = 3

            [engine.topology]
            inputs = 3
            hidden = [8, 4]
            outputs = 1

            [simulation]
            world_height = 800.0
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.engine.population, 20);
        assert_eq!(config.engine.seed, Some(3));
        assert_eq!(config.engine.elitism, 0.2);
        assert_eq!(config.engine.topology.hidden, vec![8, 4]);
        assert_eq!(config.simulation.world_height, 800.0);
        assert_eq!(config.simulation.landing_velocity, 5.0);
        assert_eq!(config.generations, 5);
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("neuro_lander_{}.toml", std::process::id()));
        let mut config = Config::default();
        config.engine.seed = Some(77);
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded.engine, config.engine);
        assert_eq!(loaded.generations, config.generations);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::load(Path::new("/nonexistent/neuro_lander.toml")).is_err());
    }

    #[test]
    fn default_config_survives_toml_round_trip() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.engine, Config::default().engine);
    }
}
