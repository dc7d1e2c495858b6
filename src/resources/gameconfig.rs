//! Simulation configuration resource.
//!
//! Manages tuning values loaded from an INI configuration file. Provides
//! defaults for safe startup and methods to load/save configuration. Missing
//! keys keep their current values; present keys must parse and be in range.
//!
//! # Configuration File Format
//!
//! ```ini
//! [road]
//! width = 20
//!
//! [physics]
//! initial_speed = 0.05
//! max_speed = 0.42
//! speed_step = 0.005
//! lateral_speed = 0.15
//! severity_threshold = 100
//! destruction_duration = 0.7
//!
//! [obstacles]
//! enabled = true
//! spawn_interval = 1.5
//! max_count = 15
//! min_count = 8
//!
//! [traffic]
//! enabled = true
//! spawn_interval = 2.0
//! min_speed = 45
//! truck_probability = 0.1
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::{Path, PathBuf};

use crate::error::SimError;

const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Road geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadConfig {
    /// Full road width; the lateral limit is half of it.
    pub width: f32,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self { width: 20.0 }
    }
}

impl RoadConfig {
    pub fn max_lateral(&self) -> f32 {
        self.width * 0.5
    }
}

/// Controlled vehicle tuning. Speeds are simulation units per frame step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    pub initial_speed: f32,
    pub max_speed: f32,
    pub min_speed: f32,
    /// Speed change per frame while accelerating or braking.
    pub speed_step: f32,
    /// Lateral offset change per 1/60 s while steering.
    pub lateral_speed: f32,
    /// Speed multiplier applied by a side impact.
    pub side_damping: f32,
    /// Factor from speed to displayed km/h.
    pub speed_scale: f32,
    /// Displayed km/h at or above which a head-on impact is fatal.
    pub severity_threshold: f32,
    /// Seconds from a fatal impact to game over.
    pub destruction_duration: f32,
    /// Chance per frame of an extra burst while being destroyed.
    pub explosion_chance: f32,
    /// Displayed km/h where camera shake starts.
    pub shake_start: f32,
    /// km/h range over which shake ramps to 1.0.
    pub shake_range: f32,
    /// Distance is reset to zero past this value.
    pub distance_limit: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            initial_speed: 0.05,
            max_speed: 0.42,
            min_speed: 0.0,
            speed_step: 0.005,
            lateral_speed: 0.15,
            side_damping: 0.8,
            speed_scale: 500.0,
            severity_threshold: 100.0,
            destruction_duration: 0.7,
            explosion_chance: 0.3,
            shake_start: 80.0,
            shake_range: 130.0,
            distance_limit: 10_000_000.0,
        }
    }
}

/// Hazard field tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleConfig {
    pub enabled: bool,
    /// Seconds between regular spawns.
    pub spawn_interval: f32,
    pub max_count: usize,
    /// The field is topped up to this many hazards every frame.
    pub min_count: usize,
    /// Depth of the band hazards spawn in, beyond the first 50 units.
    pub spawn_distance: f32,
    /// Share of collectible hazards.
    pub collectible_chance: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spawn_interval: 1.5,
            max_count: 15,
            min_count: 8,
            spawn_distance: 100.0,
            collectible_chance: 0.3,
        }
    }
}

/// Autonomous traffic tuning. Speeds are in km/h.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficConfig {
    pub enabled: bool,
    pub spawn_interval: f32,
    /// Forward traffic spawns this far ahead; oncoming traffic half again as far.
    pub spawn_distance: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub truck_probability: f32,
    /// Share of oncoming traffic.
    pub backward_probability: f32,
    /// Chance of a second car shortly after a regular spawn.
    pub follow_up_chance: f32,
    pub follow_up_delay: f32,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spawn_interval: 2.0,
            spawn_distance: 120.0,
            min_speed: 45.0,
            max_speed: 120.0,
            truck_probability: 0.1,
            backward_probability: 0.7,
            follow_up_chance: 0.3,
            follow_up_delay: 0.5,
        }
    }
}

/// Simulation configuration resource.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub road: RoadConfig,
    pub physics: PhysicsConfig,
    pub obstacles: ObstacleConfig,
    pub traffic: TrafficConfig,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(section: &str, key: &str, message: impl Into<String>) -> SimError {
    SimError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        message: message.into(),
    }
}

fn read_f32(ini: &Ini, section: &str, key: &str) -> Result<Option<f32>, SimError> {
    let value = ini
        .getfloat(section, key)
        .map_err(|e| invalid(section, key, e))?;
    match value {
        Some(v) if !v.is_finite() => Err(invalid(section, key, "not a finite number")),
        Some(v) => Ok(Some(v as f32)),
        None => Ok(None),
    }
}

fn read_usize(ini: &Ini, section: &str, key: &str) -> Result<Option<usize>, SimError> {
    ini.getuint(section, key)
        .map(|v| v.map(|v| v as usize))
        .map_err(|e| invalid(section, key, e))
}

fn read_bool(ini: &Ini, section: &str, key: &str) -> Result<Option<bool>, SimError> {
    ini.getbool(section, key).map_err(|e| invalid(section, key, e))
}

fn set_f32(target: &mut f32, ini: &Ini, section: &str, key: &str) -> Result<(), SimError> {
    if let Some(v) = read_f32(ini, section, key)? {
        *target = v;
    }
    Ok(())
}

fn check_probability(value: f32, section: &str, key: &str) -> Result<(), SimError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(section, key, "must be between 0 and 1"))
    }
}

fn check_positive(value: f32, section: &str, key: &str) -> Result<(), SimError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(section, key, "must be greater than 0"))
    }
}

impl SimConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            road: RoadConfig::default(),
            physics: PhysicsConfig::default(),
            obstacles: ObstacleConfig::default(),
            traffic: TrafficConfig::default(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file at `config_path`.
    pub fn load_from_file(&mut self) -> Result<(), SimError> {
        let mut ini = Ini::new();
        ini.load(&self.config_path).map_err(|e| SimError::Config {
            path: self.config_path.display().to_string(),
            message: e,
        })?;
        self.apply(&ini)?;
        info!(
            "Loaded config from {:?}: road width={}, max speed={}, obstacles={}, traffic={}",
            self.config_path,
            self.road.width,
            self.physics.max_speed,
            self.obstacles.enabled,
            self.traffic.enabled
        );
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), SimError> {
        let mut ini = Ini::new();
        ini.read(text.to_string()).map_err(|e| SimError::Config {
            path: "<string>".to_string(),
            message: e,
        })?;
        self.apply(&ini)
    }

    /// Copy every present key into `self`, validating the result.
    ///
    /// On error `self` is left unchanged.
    fn apply(&mut self, ini: &Ini) -> Result<(), SimError> {
        let mut next = self.clone();

        // [road] section
        set_f32(&mut next.road.width, ini, "road", "width")?;

        // [physics] section
        let p = &mut next.physics;
        set_f32(&mut p.initial_speed, ini, "physics", "initial_speed")?;
        set_f32(&mut p.max_speed, ini, "physics", "max_speed")?;
        set_f32(&mut p.min_speed, ini, "physics", "min_speed")?;
        set_f32(&mut p.speed_step, ini, "physics", "speed_step")?;
        set_f32(&mut p.lateral_speed, ini, "physics", "lateral_speed")?;
        set_f32(&mut p.side_damping, ini, "physics", "side_damping")?;
        set_f32(&mut p.speed_scale, ini, "physics", "speed_scale")?;
        set_f32(&mut p.severity_threshold, ini, "physics", "severity_threshold")?;
        set_f32(&mut p.destruction_duration, ini, "physics", "destruction_duration")?;
        set_f32(&mut p.explosion_chance, ini, "physics", "explosion_chance")?;
        set_f32(&mut p.shake_start, ini, "physics", "shake_start")?;
        set_f32(&mut p.shake_range, ini, "physics", "shake_range")?;
        set_f32(&mut p.distance_limit, ini, "physics", "distance_limit")?;

        // [obstacles] section
        let o = &mut next.obstacles;
        if let Some(v) = read_bool(ini, "obstacles", "enabled")? {
            o.enabled = v;
        }
        set_f32(&mut o.spawn_interval, ini, "obstacles", "spawn_interval")?;
        if let Some(v) = read_usize(ini, "obstacles", "max_count")? {
            o.max_count = v;
        }
        if let Some(v) = read_usize(ini, "obstacles", "min_count")? {
            o.min_count = v;
        }
        set_f32(&mut o.spawn_distance, ini, "obstacles", "spawn_distance")?;
        set_f32(&mut o.collectible_chance, ini, "obstacles", "collectible_chance")?;

        // [traffic] section
        let t = &mut next.traffic;
        if let Some(v) = read_bool(ini, "traffic", "enabled")? {
            t.enabled = v;
        }
        set_f32(&mut t.spawn_interval, ini, "traffic", "spawn_interval")?;
        set_f32(&mut t.spawn_distance, ini, "traffic", "spawn_distance")?;
        set_f32(&mut t.min_speed, ini, "traffic", "min_speed")?;
        set_f32(&mut t.max_speed, ini, "traffic", "max_speed")?;
        set_f32(&mut t.truck_probability, ini, "traffic", "truck_probability")?;
        set_f32(&mut t.backward_probability, ini, "traffic", "backward_probability")?;
        set_f32(&mut t.follow_up_chance, ini, "traffic", "follow_up_chance")?;
        set_f32(&mut t.follow_up_delay, ini, "traffic", "follow_up_delay")?;

        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Reject combinations the simulation cannot run with.
    pub fn validate(&self) -> Result<(), SimError> {
        check_positive(self.road.width, "road", "width")?;

        let p = &self.physics;
        if p.min_speed < 0.0 || p.max_speed < p.min_speed {
            return Err(invalid(
                "physics",
                "max_speed",
                "speed range must satisfy 0 <= min_speed <= max_speed",
            ));
        }
        if !(p.min_speed..=p.max_speed).contains(&p.initial_speed) {
            return Err(invalid(
                "physics",
                "initial_speed",
                "must lie within min_speed and max_speed",
            ));
        }
        check_positive(p.speed_scale, "physics", "speed_scale")?;
        check_positive(p.destruction_duration, "physics", "destruction_duration")?;
        check_positive(p.shake_range, "physics", "shake_range")?;
        check_positive(p.distance_limit, "physics", "distance_limit")?;
        check_probability(p.side_damping, "physics", "side_damping")?;
        check_probability(p.explosion_chance, "physics", "explosion_chance")?;

        let o = &self.obstacles;
        check_positive(o.spawn_interval, "obstacles", "spawn_interval")?;
        check_probability(o.collectible_chance, "obstacles", "collectible_chance")?;
        if o.min_count > o.max_count {
            return Err(invalid(
                "obstacles",
                "min_count",
                "must not exceed max_count",
            ));
        }

        let t = &self.traffic;
        check_positive(t.spawn_interval, "traffic", "spawn_interval")?;
        check_probability(t.truck_probability, "traffic", "truck_probability")?;
        check_probability(t.backward_probability, "traffic", "backward_probability")?;
        check_probability(t.follow_up_chance, "traffic", "follow_up_chance")?;
        Ok(())
    }

    /// Save configuration to `path`.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self, path: &Path) -> Result<(), SimError> {
        let mut ini = Ini::new();
        let mut put = |section: &str, key: &str, value: String| {
            ini.set(section, key, Some(value));
        };

        put("road", "width", self.road.width.to_string());

        let p = &self.physics;
        put("physics", "initial_speed", p.initial_speed.to_string());
        put("physics", "max_speed", p.max_speed.to_string());
        put("physics", "min_speed", p.min_speed.to_string());
        put("physics", "speed_step", p.speed_step.to_string());
        put("physics", "lateral_speed", p.lateral_speed.to_string());
        put("physics", "side_damping", p.side_damping.to_string());
        put("physics", "speed_scale", p.speed_scale.to_string());
        put("physics", "severity_threshold", p.severity_threshold.to_string());
        put("physics", "destruction_duration", p.destruction_duration.to_string());
        put("physics", "explosion_chance", p.explosion_chance.to_string());
        put("physics", "shake_start", p.shake_start.to_string());
        put("physics", "shake_range", p.shake_range.to_string());
        put("physics", "distance_limit", p.distance_limit.to_string());

        let o = &self.obstacles;
        put("obstacles", "enabled", o.enabled.to_string());
        put("obstacles", "spawn_interval", o.spawn_interval.to_string());
        put("obstacles", "max_count", o.max_count.to_string());
        put("obstacles", "min_count", o.min_count.to_string());
        put("obstacles", "spawn_distance", o.spawn_distance.to_string());
        put("obstacles", "collectible_chance", o.collectible_chance.to_string());

        let t = &self.traffic;
        put("traffic", "enabled", t.enabled.to_string());
        put("traffic", "spawn_interval", t.spawn_interval.to_string());
        put("traffic", "spawn_distance", t.spawn_distance.to_string());
        put("traffic", "min_speed", t.min_speed.to_string());
        put("traffic", "max_speed", t.max_speed.to_string());
        put("traffic", "truck_probability", t.truck_probability.to_string());
        put("traffic", "backward_probability", t.backward_probability.to_string());
        put("traffic", "follow_up_chance", t.follow_up_chance.to_string());
        put("traffic", "follow_up_delay", t.follow_up_delay.to_string());

        ini.write(path)?;
        info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.road.max_lateral(), 10.0);
        assert_eq!(config.physics.max_speed, 0.42);
        assert_eq!(config.obstacles.max_count, 15);
        assert_eq!(config.traffic.min_speed, 45.0);
    }

    #[test]
    fn test_load_from_str_overrides_given_keys_only() {
        let mut config = SimConfig::new();
        config
            .load_from_str("[road]\nwidth = 16\n\n[traffic]\nenabled = false\n")
            .unwrap();
        assert_eq!(config.road.max_lateral(), 8.0);
        assert!(!config.traffic.enabled);
        assert!(config.obstacles.enabled);
        assert_eq!(config.physics, PhysicsConfig::default());
    }

    #[test]
    fn test_non_numeric_value_is_rejected() {
        let mut config = SimConfig::new();
        let err = config
            .load_from_str("[physics]\nmax_speed = fast\n")
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidValue { ref key, .. } if key == "max_speed"));
        assert_eq!(config, SimConfig::new());
    }

    #[test]
    fn test_out_of_range_value_is_rejected() {
        let mut config = SimConfig::new();
        assert!(config.load_from_str("[traffic]\ntruck_probability = 1.5\n").is_err());
        assert!(config.load_from_str("[obstacles]\nmin_count = 20\n").is_err());
        assert!(config.load_from_str("[physics]\ninitial_speed = 0.9\n").is_err());
        assert_eq!(config, SimConfig::new());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let mut config = SimConfig::with_path("/nonexistent/lanerace.ini");
        assert!(matches!(config.load_from_file(), Err(SimError::Config { .. })));
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("lanerace-config-{}.ini", std::process::id()));
        let mut original = SimConfig::new();
        original.road.width = 12.0;
        original.traffic.enabled = false;
        original.save_to_file(&path).unwrap();

        let mut loaded = SimConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        assert_eq!(loaded.road.width, 12.0);
        assert!(!loaded.traffic.enabled);
        let _ = std::fs::remove_file(&path);
    }
}
