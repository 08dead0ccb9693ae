//! Server-driven enemy bodies steered by the pursuit system.

use std::time::Duration;

use glam::{Quat, Vec3};
use skirmish_core::{integrate, EnemyId, EnemySnapshot, PursuitMode, SpeedTier};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Steering {
    destination: Vec3,
    mode: PursuitMode,
    speed: f32,
}

/// Physical state of an enemy.
#[derive(Clone, Debug)]
pub(crate) struct EnemyBody {
    id: EnemyId,
    position: Vec3,
    orientation: Quat,
    home: Vec3,
    steering: Option<Steering>,
    speed_tier: SpeedTier,
}

impl EnemyBody {
    pub(crate) fn new(id: EnemyId, position: Vec3) -> Self {
        Self {
            id,
            position,
            orientation: Quat::IDENTITY,
            home: position,
            steering: None,
            speed_tier: SpeedTier::Idle,
        }
    }

    pub(crate) fn steer(&mut self, destination: Vec3, mode: PursuitMode, speed: f32) {
        self.steering = Some(Steering {
            destination,
            mode,
            speed: speed.max(0.0),
        });
    }

    /// Walks straight toward the destination, halting at `stopping_distance`.
    pub(crate) fn advance(&mut self, dt: Duration, stopping_distance: f32, turn_rate: f32) {
        self.speed_tier = SpeedTier::Idle;
        let Some(steering) = self.steering else {
            return;
        };

        let offset = steering.destination - self.position;
        let remaining = offset.length();
        if remaining <= stopping_distance || steering.speed <= 0.0 {
            return;
        }

        let direction = offset / remaining;
        let step = integrate(self.orientation, direction, steering.speed, turn_rate, dt);
        let travel = remaining - stopping_distance;
        self.position += step.displacement.clamp_length_max(travel);
        self.orientation = step.orientation;
        self.speed_tier = match steering.mode {
            PursuitMode::Chase => SpeedTier::Run,
            PursuitMode::Patrol => SpeedTier::Walk,
        };
    }

    pub(crate) fn remaining_distance(&self) -> f32 {
        self.steering
            .map_or(0.0, |steering| steering.destination.distance(self.position))
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            position: self.position,
            orientation: self.orientation,
            home: self.home,
            destination: self.steering.map(|steering| steering.destination),
            remaining_distance: self.remaining_distance(),
            mode: self
                .steering
                .map_or(PursuitMode::Patrol, |steering| steering.mode),
            speed_tier: self.speed_tier,
        }
    }
}
