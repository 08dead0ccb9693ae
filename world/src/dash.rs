//! Time-boxed dash state advanced once per tick.

use std::time::Duration;

use glam::Vec3;
use skirmish_core::is_zero_direction;

use crate::resources::ResourcePool;

/// Phase of a dash controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DashPhase {
    /// No dash in progress.
    #[default]
    Idle,
    /// A dash is interpolating toward its target.
    Active,
}

/// Reasons a dash trigger is refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DashRejection {
    /// Another dash is still running.
    AlreadyActive,
    /// The direction had no length or was not finite.
    InvalidDirection,
    /// The pool could not pay the stamina cost.
    InsufficientStamina,
}

/// Endpoints of a freshly started dash.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DashLaunch {
    /// Position the dash starts from.
    pub start: Vec3,
    /// Position the dash ends at.
    pub target: Vec3,
}

/// Outcome of advancing a controller by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DashAdvance {
    /// No dash was running.
    Idle,
    /// The dash moved the body to the contained position.
    Moving(Vec3),
    /// The dash finished; the body rests exactly on the contained target.
    Completed(Vec3),
}

/// Dash state machine: `Idle -> Active -> Idle`.
///
/// The controller never sleeps or suspends; [`DashController::advance`] is
/// called once per tick and steps the interpolation by the tick duration.
#[derive(Clone, Debug, PartialEq)]
pub struct DashController {
    phase: DashPhase,
    start: Vec3,
    target: Vec3,
    elapsed: Duration,
    duration: Duration,
    distance: f32,
}

impl DashController {
    /// Creates an idle controller covering `distance` over `duration`.
    #[must_use]
    pub fn new(distance: f32, duration: Duration) -> Self {
        Self {
            phase: DashPhase::Idle,
            start: Vec3::ZERO,
            target: Vec3::ZERO,
            elapsed: Duration::ZERO,
            duration,
            distance,
        }
    }

    /// Starts a dash from `position` along `direction`, paying its cost up front.
    ///
    /// A running dash is never restarted or redirected.
    pub fn trigger(
        &mut self,
        position: Vec3,
        direction: Vec3,
        pool: &mut ResourcePool,
    ) -> Result<DashLaunch, DashRejection> {
        if self.is_active() {
            return Err(DashRejection::AlreadyActive);
        }
        if !direction.is_finite() || is_zero_direction(direction) {
            return Err(DashRejection::InvalidDirection);
        }
        if !pool.spend(pool.dash_cost()) {
            return Err(DashRejection::InsufficientStamina);
        }

        self.phase = DashPhase::Active;
        self.start = position;
        self.target = position + direction.normalize() * self.distance;
        self.elapsed = Duration::ZERO;

        Ok(DashLaunch {
            start: self.start,
            target: self.target,
        })
    }

    /// Steps the running dash by `dt`.
    pub fn advance(&mut self, dt: Duration) -> DashAdvance {
        if !self.is_active() {
            return DashAdvance::Idle;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed >= self.duration {
            self.phase = DashPhase::Idle;
            return DashAdvance::Completed(self.target);
        }

        let t = (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0);
        DashAdvance::Moving(self.start.lerp(self.target, t))
    }

    /// Reports whether a dash is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == DashPhase::Active
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> DashPhase {
        self.phase
    }

    /// Start of the most recent dash.
    #[must_use]
    pub fn start_position(&self) -> Vec3 {
        self.start
    }

    /// Target of the most recent dash.
    #[must_use]
    pub fn target_position(&self) -> Vec3 {
        self.target
    }

    /// Time spent in the running dash.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
