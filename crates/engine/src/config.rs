use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::clock::Millis;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {origin} at {json_path}: {source}")]
    Parse {
        origin: String,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectileTuning {
    pub speed: f32,
    pub damage: u32,
    pub step_ms: Millis,
    pub max_catch_up_steps: u32,
    pub offscreen_margin: f32,
    pub muzzle_offset: f32,
    pub muzzle_height_ratio: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 15.0,
            damage: 25,
            step_ms: 16,
            max_catch_up_steps: 8,
            offscreen_margin: 100.0,
            muzzle_offset: 10.0,
            muzzle_height_ratio: 0.6,
            width: 10.0,
            height: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SoldierTuning {
    pub max_health: u32,
    pub magazine_size: u32,
    pub frame_size: u32,
    pub walk_speed: f32,
    pub run_speed: f32,
    pub firing_speed: f32,
    pub strafe_while_firing: bool,
    pub walk_frame_ms: Millis,
    pub run_frame_ms: Millis,
    pub fire_cooldown_ms: Millis,
    pub fire_frame_ms: Millis,
    pub fire_frame_floor_ms: Millis,
    pub fire_release_frame: usize,
    pub reload_time_ms: Millis,
    pub reload_frame_ms: Millis,
    pub melee_cooldown_ms: Millis,
    pub melee_frame_ms: Millis,
    pub melee_damage: u32,
    pub melee_hit_frame: usize,
    pub damage_flash_draws: u32,
    pub edge_padding: f32,
    pub projectile: ProjectileTuning,
}

impl Default for SoldierTuning {
    fn default() -> Self {
        Self {
            max_health: 100,
            magazine_size: 30,
            frame_size: 128,
            walk_speed: 3.0,
            run_speed: 6.0,
            firing_speed: 1.0,
            strafe_while_firing: true,
            walk_frame_ms: 100,
            run_frame_ms: 50,
            fire_cooldown_ms: 500,
            fire_frame_ms: 80,
            fire_frame_floor_ms: 50,
            fire_release_frame: 2,
            reload_time_ms: 2_500,
            reload_frame_ms: 100,
            melee_cooldown_ms: 1_500,
            melee_frame_ms: 100,
            melee_damage: 30,
            melee_hit_frame: 3,
            damage_flash_draws: 10,
            edge_padding: 30.0,
            projectile: ProjectileTuning::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub max_health: u32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            x: 400.0,
            y: 480.0,
            width: 50.0,
            height: 50.0,
            max_health: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    pub soldier_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            soldier_capacity: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub new_game_spawn: [f32; 2],
    pub new_game_delay_ms: Millis,
    pub start_game_spawn: [f32; 2],
    pub start_game_delay_ms: Millis,
    pub effect_spawn_margin: f32,
    pub explosion_frame_count: usize,
    pub explosion_min_frame_ms: Millis,
    pub explosion_max_frame_ms: Millis,
    pub explosion_min_scale: f32,
    pub explosion_max_scale: f32,
    pub flame_frame_count: usize,
    pub flame_frame_ms: Millis,
    pub debug_damage: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            new_game_spawn: [150.0, 900.0],
            new_game_delay_ms: 500,
            start_game_spawn: [50.0, 450.0],
            start_game_delay_ms: 100,
            effect_spawn_margin: 100.0,
            explosion_frame_count: 27,
            explosion_min_frame_ms: 50,
            explosion_max_frame_ms: 150,
            explosion_min_scale: 0.5,
            explosion_max_scale: 1.5,
            flame_frame_count: 35,
            flame_frame_ms: 100,
            debug_damage: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub soldier: SoldierTuning,
    pub target: TargetConfig,
    pub pool: PoolConfig,
    pub session: SessionConfig,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let soldier = &self.soldier;
        ensure(soldier.max_health > 0, "soldier.max_health", "must be positive")?;
        ensure(soldier.magazine_size > 0, "soldier.magazine_size", "must be positive")?;
        ensure(soldier.frame_size > 0, "soldier.frame_size", "must be positive")?;
        for (field, speed) in [
            ("soldier.walk_speed", soldier.walk_speed),
            ("soldier.run_speed", soldier.run_speed),
            ("soldier.firing_speed", soldier.firing_speed),
            ("soldier.projectile.speed", soldier.projectile.speed),
        ] {
            ensure(speed.is_finite() && speed >= 0.0, field, "must be finite and non-negative")?;
        }
        for (field, interval) in [
            ("soldier.walk_frame_ms", soldier.walk_frame_ms),
            ("soldier.run_frame_ms", soldier.run_frame_ms),
            ("soldier.fire_frame_ms", soldier.fire_frame_ms),
            ("soldier.fire_frame_floor_ms", soldier.fire_frame_floor_ms),
            ("soldier.reload_time_ms", soldier.reload_time_ms),
            ("soldier.reload_frame_ms", soldier.reload_frame_ms),
            ("soldier.melee_frame_ms", soldier.melee_frame_ms),
            ("soldier.projectile.step_ms", soldier.projectile.step_ms),
            ("session.flame_frame_ms", self.session.flame_frame_ms),
            ("session.explosion_min_frame_ms", self.session.explosion_min_frame_ms),
        ] {
            ensure(interval > 0, field, "must be positive")?;
        }
        ensure(
            soldier.projectile.max_catch_up_steps > 0,
            "soldier.projectile.max_catch_up_steps",
            "must be positive",
        )?;
        ensure(
            self.target.width > 0.0 && self.target.height > 0.0,
            "target",
            "width and height must be positive",
        )?;
        ensure(self.target.max_health > 0, "target.max_health", "must be positive")?;

        let session = &self.session;
        ensure(
            session.explosion_min_frame_ms <= session.explosion_max_frame_ms,
            "session.explosion_min_frame_ms",
            "must not exceed explosion_max_frame_ms",
        )?;
        ensure(
            session.explosion_min_scale > 0.0
                && session.explosion_min_scale <= session.explosion_max_scale,
            "session.explosion_min_scale",
            "must be positive and not exceed explosion_max_scale",
        )?;
        ensure(session.explosion_frame_count > 0, "session.explosion_frame_count", "must be positive")?;
        ensure(session.flame_frame_count > 0, "session.flame_frame_count", "must be positive")?;
        Ok(())
    }
}

fn ensure(condition: bool, field: &'static str, reason: &str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: reason.to_string(),
        })
    }
}

pub fn parse_game_config(raw: &str, origin: &str) -> Result<GameConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let config: GameConfig =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let json_path = error.path().to_string();
            ConfigError::Parse {
                origin: origin.to_string(),
                json_path,
                source: error.into_inner(),
            }
        })?;
    config.validate()?;
    Ok(config)
}

/// Reads tuning from `path`. A missing file yields the built-in defaults.
pub fn load_game_config(path: &Path) -> Result<GameConfig, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "game_config_missing_using_defaults");
            return Ok(GameConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let config = parse_game_config(&raw, &path.display().to_string())?;
    info!(path = %path.display(), "game_config_loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_valid() {
        GameConfig::default().validate().expect("defaults validate");
    }

    #[test]
    fn partial_document_keeps_remaining_defaults() {
        let config = parse_game_config(
            r#"{ "soldier": { "magazine_size": 12, "strafe_while_firing": false } }"#,
            "inline",
        )
        .expect("parse");
        assert_eq!(config.soldier.magazine_size, 12);
        assert!(!config.soldier.strafe_while_firing);
        assert_eq!(config.soldier.reload_time_ms, 2_500);
        assert_eq!(config.pool.soldier_capacity, 5);
    }

    #[test]
    fn parse_error_reports_json_path() {
        let error = parse_game_config(r#"{ "soldier": { "projectile": { "speed": "fast" } } }"#, "inline")
            .expect_err("type mismatch");
        match error {
            ConfigError::Parse { json_path, .. } => assert_eq!(json_path, "soldier.projectile.speed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = parse_game_config(r#"{ "target": { "colour": 1 } }"#, "inline").expect_err("unknown");
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn validation_rejects_zero_magazine() {
        let error = parse_game_config(r#"{ "soldier": { "magazine_size": 0 } }"#, "inline")
            .expect_err("invalid");
        assert!(matches!(
            error,
            ConfigError::Invalid {
                field: "soldier.magazine_size",
                ..
            }
        ));
    }

    #[test]
    fn validation_rejects_zero_intervals() {
        let cases = [
            (r#"{ "soldier": { "walk_frame_ms": 0 } }"#, "soldier.walk_frame_ms"),
            (r#"{ "soldier": { "run_frame_ms": 0 } }"#, "soldier.run_frame_ms"),
            (r#"{ "soldier": { "fire_frame_ms": 0 } }"#, "soldier.fire_frame_ms"),
            (r#"{ "soldier": { "fire_frame_floor_ms": 0 } }"#, "soldier.fire_frame_floor_ms"),
            (r#"{ "soldier": { "reload_time_ms": 0 } }"#, "soldier.reload_time_ms"),
            (r#"{ "soldier": { "reload_frame_ms": 0 } }"#, "soldier.reload_frame_ms"),
            (r#"{ "soldier": { "melee_frame_ms": 0 } }"#, "soldier.melee_frame_ms"),
            (r#"{ "soldier": { "projectile": { "step_ms": 0 } } }"#, "soldier.projectile.step_ms"),
            (r#"{ "session": { "flame_frame_ms": 0 } }"#, "session.flame_frame_ms"),
            (
                r#"{ "session": { "explosion_min_frame_ms": 0 } }"#,
                "session.explosion_min_frame_ms",
            ),
        ];
        for (raw, expected_field) in cases {
            match parse_game_config(raw, "inline") {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("{raw}: expected {expected_field} rejection, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let temp = TempDir::new().expect("temp dir");
        let config = load_game_config(&temp.path().join("tuning.json")).expect("defaults");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn file_on_disk_is_loaded() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("tuning.json");
        fs::write(&path, r#"{ "target": { "max_health": 250 } }"#).expect("write");
        let config = load_game_config(&path).expect("load");
        assert_eq!(config.target.max_health, 250);
    }
}
