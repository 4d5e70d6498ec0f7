//! Tunable movement and track parameters, loadable from JSON.

use std::fmt;

use runner_engine::CharacterCapsule;
use serde::Deserialize;

/// Capsule dimensions as they appear in the JSON config.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ColliderConfig {
    pub radius: f32,
    pub height: f32,
    pub center_y: f32,
}

impl ColliderConfig {
    pub fn capsule(&self) -> CharacterCapsule {
        CharacterCapsule::new(self.radius, self.height, self.center_y)
    }
}

/// Track streaming parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Seed for obstacle placement. The same seed lays out the same track.
    pub seed: u64,
    /// Length of one ground segment along Z.
    pub segment_length: f32,
    /// Gap between obstacle rows at the start of a run.
    pub obstacle_spacing: f32,
    /// Gap between obstacle rows once the run reaches `ramp_distance`.
    pub min_obstacle_spacing: f32,
    /// Distance over which spacing shrinks from `obstacle_spacing` to `min_obstacle_spacing`.
    pub ramp_distance: f32,
    /// How far ahead of the player the track is kept built.
    pub view_distance: f32,
    /// How far behind the player pieces survive before despawning.
    pub despawn_distance: f32,
    /// Empty run-up before the first obstacle row.
    pub safe_distance: f32,
    /// Probability that a row holds an overhead bar instead of a low barrier.
    pub overhead_chance: f32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            segment_length: 20.0,
            obstacle_spacing: 24.0,
            min_obstacle_spacing: 12.0,
            ramp_distance: 1500.0,
            view_distance: 120.0,
            despawn_distance: 20.0,
            safe_distance: 30.0,
            overhead_chance: 0.35,
        }
    }
}

/// Player movement and track settings. Every field has a default, so an
/// empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub forward_speed: f32,
    pub jump_speed: f32,
    pub gravity: f32,
    pub left_lane_x: f32,
    pub right_lane_x: f32,
    pub lane_tolerance: f32,
    pub lateral_speed: f32,
    pub lateral_blend: f32,
    pub slide_duration: f32,
    pub slide_collider: ColliderConfig,
    pub standing_collider: ColliderConfig,
    pub track: TrackConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            forward_speed: 10.0,
            jump_speed: 15.0,
            gravity: 20.0,
            left_lane_x: -3.1,
            right_lane_x: 3.1,
            lane_tolerance: 0.1,
            lateral_speed: 20.0,
            lateral_blend: 500.0,
            slide_duration: 2.0,
            slide_collider: ColliderConfig {
                radius: 0.3,
                height: 0.6,
                center_y: 0.35,
            },
            standing_collider: ColliderConfig {
                radius: 0.5,
                height: 2.0,
                center_y: 1.0,
            },
            track: TrackConfig::default(),
        }
    }
}

/// Why a config was rejected.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    NonPositive(&'static str),
    Negative(&'static str),
    /// Lanes must sit on either side of the center lane, outside its tolerance.
    LanesOffSide { left: f32, right: f32 },
    SlideTallerThanStanding,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "invalid config JSON: {}", e),
            ConfigError::NonPositive(field) => write!(f, "{} must be positive", field),
            ConfigError::Negative(field) => write!(f, "{} must not be negative", field),
            ConfigError::LanesOffSide { left, right } => write!(
                f,
                "left lane ({}) must lie left of center and right lane ({}) right of it",
                left, right
            ),
            ConfigError::SlideTallerThanStanding => {
                write!(f, "slide collider must not be taller than the standing collider")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl RunnerConfig {
    /// Parse and validate a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RunnerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("forward_speed", self.forward_speed),
            ("jump_speed", self.jump_speed),
            ("gravity", self.gravity),
            ("lane_tolerance", self.lane_tolerance),
            ("lateral_speed", self.lateral_speed),
            ("lateral_blend", self.lateral_blend),
            ("slide_duration", self.slide_duration),
            ("slide_collider.radius", self.slide_collider.radius),
            ("slide_collider.height", self.slide_collider.height),
            ("standing_collider.radius", self.standing_collider.radius),
            ("standing_collider.height", self.standing_collider.height),
            ("track.segment_length", self.track.segment_length),
            ("track.obstacle_spacing", self.track.obstacle_spacing),
            ("track.min_obstacle_spacing", self.track.min_obstacle_spacing),
            ("track.view_distance", self.track.view_distance),
        ];
        for (field, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositive(field));
            }
        }

        let non_negative = [
            ("track.ramp_distance", self.track.ramp_distance),
            ("track.despawn_distance", self.track.despawn_distance),
            ("track.safe_distance", self.track.safe_distance),
        ];
        for (field, value) in non_negative {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::Negative(field));
            }
        }

        // The controller heads for the left lane along -X and the right lane
        // along +X, so each must be on its own side of the center band.
        if !(self.left_lane_x < -self.lane_tolerance && self.right_lane_x > self.lane_tolerance) {
            return Err(ConfigError::LanesOffSide {
                left: self.left_lane_x,
                right: self.right_lane_x,
            });
        }

        if self.slide_collider.height > self.standing_collider.height {
            return Err(ConfigError::SlideTallerThanStanding);
        }

        Ok(())
    }

    /// X coordinate of a lane index in `-1..=1`.
    pub fn lane_x(&self, lane: i32) -> f32 {
        match lane {
            l if l < 0 => self.left_lane_x,
            l if l > 0 => self.right_lane_x,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = RunnerConfig::from_json("{}").unwrap();
        assert_eq!(config, RunnerConfig::default());
        assert_eq!(config.forward_speed, 10.0);
        assert_eq!(config.slide_collider.height, 0.6);
    }

    #[test]
    fn partial_override() {
        let config = RunnerConfig::from_json(
            r#"{ "forward_speed": 14.0, "track": { "seed": 7 } }"#,
        )
        .unwrap();
        assert_eq!(config.forward_speed, 14.0);
        assert_eq!(config.jump_speed, 15.0);
        assert_eq!(config.track.seed, 7);
        assert_eq!(config.track.view_distance, 120.0);
    }

    #[test]
    fn rejects_bad_json() {
        assert!(matches!(
            RunnerConfig::from_json("{ forward_speed"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_non_positive_speed() {
        let err = RunnerConfig::from_json(r#"{ "gravity": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive("gravity")));
        assert_eq!(err.to_string(), "gravity must be positive");
    }

    #[test]
    fn rejects_swapped_lanes() {
        let err = RunnerConfig::from_json(r#"{ "left_lane_x": 3.0, "right_lane_x": -3.0 }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::LanesOffSide { .. }));
    }

    #[test]
    fn rejects_lanes_on_the_same_side() {
        for json in [
            r#"{ "left_lane_x": 0.5, "right_lane_x": 3.0 }"#,
            r#"{ "left_lane_x": -3.0, "right_lane_x": -0.5 }"#,
            r#"{ "left_lane_x": -0.05, "right_lane_x": 3.0 }"#,
        ] {
            let err = RunnerConfig::from_json(json).unwrap_err();
            assert!(matches!(err, ConfigError::LanesOffSide { .. }), "{}", json);
        }

        let narrow = RunnerConfig::from_json(r#"{ "left_lane_x": -0.5, "right_lane_x": 0.5 }"#);
        assert!(narrow.is_ok());
    }

    #[test]
    fn rejects_negative_despawn_distance() {
        let err = RunnerConfig::from_json(r#"{ "track": { "despawn_distance": -1.0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Negative("track.despawn_distance")));
        assert_eq!(err.to_string(), "track.despawn_distance must not be negative");

        assert!(RunnerConfig::from_json(r#"{ "track": { "despawn_distance": 0.0 } }"#).is_ok());
    }

    #[test]
    fn rejects_tall_slide_collider() {
        let err = RunnerConfig::from_json(
            r#"{ "slide_collider": { "radius": 0.3, "height": 2.5, "center_y": 1.25 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::SlideTallerThanStanding));
    }

    #[test]
    fn lane_positions() {
        let config = RunnerConfig::default();
        assert_eq!(config.lane_x(-1), -3.1);
        assert_eq!(config.lane_x(0), 0.0);
        assert_eq!(config.lane_x(1), 3.1);
    }
}
