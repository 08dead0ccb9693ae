//! Tuning knobs for the authoritative simulation.
//!
//! Every struct deserializes with `#[serde(default)]`, so a partial
//! configuration file only overrides the values it names. Durations are
//! written as fractional seconds.

use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Aggregated tuning consumed by the authority and the pursuit system.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed simulation rate of the authority in ticks per second.
    pub tick_rate_hz: u32,
    /// Character locomotion and dash parameters.
    pub ability: AbilityTuning,
    /// Health and stamina pools handed to each new character.
    pub resources: ResourceTuning,
    /// Enemy patrol and chase parameters.
    pub pursuit: PursuitTuning,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 50,
            ability: AbilityTuning::default(),
            resources: ResourceTuning::default(),
            pursuit: PursuitTuning::default(),
        }
    }
}

impl SimulationConfig {
    /// Duration of a single fixed tick.
    ///
    /// A zero tick rate is rejected by [`Self::validate`]; here it degrades to
    /// one tick per second.
    #[must_use]
    pub fn fixed_dt(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate_hz.max(1)
    }

    /// Checks every value for sign and finiteness.
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.tick_rate_hz == 0 {
            return Err(TuningError::ZeroTickRate);
        }

        let ability = &self.ability;
        positive("ability.walk_speed", ability.walk_speed)?;
        positive("ability.run_speed", ability.run_speed)?;
        positive("ability.turn_rate", ability.turn_rate)?;
        positive("ability.dash_distance", ability.dash_distance)?;
        non_zero("ability.dash_duration", ability.dash_duration)?;

        let resources = &self.resources;
        positive("resources.max_health", resources.max_health)?;
        positive("resources.max_stamina", resources.max_stamina)?;
        non_negative("resources.stamina_regen_rate", resources.stamina_regen_rate)?;
        non_negative("resources.dash_stamina_cost", resources.dash_stamina_cost)?;

        let pursuit = &self.pursuit;
        non_negative("pursuit.patrol_radius", pursuit.patrol_radius)?;
        non_negative("pursuit.detection_radius", pursuit.detection_radius)?;
        positive("pursuit.chase_speed", pursuit.chase_speed)?;
        positive("pursuit.patrol_speed", pursuit.patrol_speed)?;
        non_negative("pursuit.stopping_distance", pursuit.stopping_distance)?;
        positive("pursuit.turn_rate", pursuit.turn_rate)?;

        Ok(())
    }
}

/// Character locomotion and dash parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AbilityTuning {
    /// Walking speed in world units per second.
    pub walk_speed: f32,
    /// Running speed in world units per second.
    pub run_speed: f32,
    /// Fraction of the remaining turn applied per second of movement.
    pub turn_rate: f32,
    /// Distance covered by a dash.
    pub dash_distance: f32,
    /// Time a dash takes to cover its distance.
    #[serde(deserialize_with = "seconds")]
    pub dash_duration: Duration,
}

impl Default for AbilityTuning {
    fn default() -> Self {
        Self {
            walk_speed: 2.0,
            run_speed: 5.0,
            turn_rate: 10.0,
            dash_distance: 5.0,
            dash_duration: Duration::from_millis(200),
        }
    }
}

/// Health and stamina pools handed to each new character.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResourceTuning {
    /// Health ceiling; characters spawn at full health.
    pub max_health: f32,
    /// Stamina ceiling; characters spawn at full stamina.
    pub max_stamina: f32,
    /// Stamina regained per second while below the ceiling.
    pub stamina_regen_rate: f32,
    /// Stamina consumed when a dash starts.
    pub dash_stamina_cost: f32,
}

impl Default for ResourceTuning {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            max_stamina: 100.0,
            stamina_regen_rate: 2.0,
            dash_stamina_cost: 25.0,
        }
    }
}

/// Enemy patrol and chase parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PursuitTuning {
    /// Radius around home in which patrol goals are sampled.
    pub patrol_radius: f32,
    /// Distance at which an enemy notices the nearest character.
    pub detection_radius: f32,
    /// Time spent loitering at a reached patrol goal before choosing another.
    #[serde(deserialize_with = "seconds")]
    pub patrol_wait: Duration,
    /// Speed while chasing.
    pub chase_speed: f32,
    /// Speed while patrolling.
    pub patrol_speed: f32,
    /// Distance from the destination at which an enemy stops walking.
    pub stopping_distance: f32,
    /// Fraction of the remaining turn applied per second of movement.
    pub turn_rate: f32,
    /// Seed for patrol goal sampling.
    pub seed: u64,
}

impl Default for PursuitTuning {
    fn default() -> Self {
        Self {
            patrol_radius: 10.0,
            detection_radius: 8.0,
            patrol_wait: Duration::from_secs(3),
            chase_speed: 4.0,
            patrol_speed: 1.5,
            stopping_distance: 2.5,
            turn_rate: 10.0,
            seed: 0x5eed_cafe_f00d_b0a7,
        }
    }
}

/// Reasons a configuration is rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TuningError {
    /// The tick rate was zero.
    #[error("tick_rate_hz must be at least 1")]
    ZeroTickRate,
    /// A value that must be strictly positive was not.
    #[error("{field} must be a finite value above zero, got {value}")]
    NotPositive {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Value found in the configuration.
        value: f32,
    },
    /// A value that must not be negative was.
    #[error("{field} must be a finite value of at least zero, got {value}")]
    Negative {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Value found in the configuration.
        value: f32,
    },
    /// A duration that must be non-zero was zero.
    #[error("{field} must be longer than zero seconds")]
    ZeroDuration {
        /// Dotted path of the offending field.
        field: &'static str,
    },
}

fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TuningError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TuningError::Negative { field, value })
    }
}

fn non_zero(field: &'static str, value: Duration) -> Result<(), TuningError> {
    if value.is_zero() {
        Err(TuningError::ZeroDuration { field })
    } else {
        Ok(())
    }
}

fn seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(value).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn fixed_dt_matches_tick_rate() {
        let config = SimulationConfig::default();
        assert_eq!(config.fixed_dt(), Duration::from_millis(20));
    }

    #[test]
    fn rejects_negative_regen() {
        let mut config = SimulationConfig::default();
        config.resources.stamina_regen_rate = -1.0;
        assert_eq!(
            config.validate(),
            Err(TuningError::Negative {
                field: "resources.stamina_regen_rate",
                value: -1.0,
            })
        );
    }

    #[test]
    fn rejects_zero_dash_duration() {
        let mut config = SimulationConfig::default();
        config.ability.dash_duration = Duration::ZERO;
        assert_eq!(
            config.validate(),
            Err(TuningError::ZeroDuration {
                field: "ability.dash_duration",
            })
        );
    }

    #[test]
    fn rejects_non_finite_speed() {
        let mut config = SimulationConfig::default();
        config.pursuit.chase_speed = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(TuningError::NotPositive {
                field: "pursuit.chase_speed",
                ..
            })
        ));
    }

    #[test]
    fn rejects_zero_tick_rate() {
        let config = SimulationConfig {
            tick_rate_hz: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Err(TuningError::ZeroTickRate));
    }
}
