//! Authoritative per-character ability state.

use std::time::Duration;

use glam::{Quat, Vec3};
use skirmish_core::{
    integrate, is_zero_direction, AbilityTuning, AnimationTrigger, CharacterId, CharacterSnapshot,
    ClientId, Event, ResourceTuning, SpeedTier,
};
use tracing::{debug, info};

use crate::{
    dash::{DashAdvance, DashController},
    resources::ResourcePool,
};

/// Character simulation owned by the authority.
///
/// Combines locomotion, the dash controller and the resource pool. Each
/// operation is only ever invoked on the authoritative host, either from a
/// remote call of the owning client or from the per-tick loop.
#[derive(Clone, Debug)]
pub struct AbilityAuthority {
    id: CharacterId,
    owner: ClientId,
    position: Vec3,
    orientation: Quat,
    speed_tier: SpeedTier,
    dash: DashController,
    resources: ResourcePool,
    tuning: AbilityTuning,
}

impl AbilityAuthority {
    /// Creates a character at rest with full pools.
    #[must_use]
    pub fn new(
        id: CharacterId,
        owner: ClientId,
        position: Vec3,
        ability: &AbilityTuning,
        resources: &ResourceTuning,
    ) -> Self {
        Self {
            id,
            owner,
            position,
            orientation: Quat::IDENTITY,
            speed_tier: SpeedTier::Idle,
            dash: DashController::new(ability.dash_distance, ability.dash_duration),
            resources: ResourcePool::new(resources),
            tuning: ability.clone(),
        }
    }

    /// Applies one tick of locomotion input.
    ///
    /// Ignored entirely while dashing. Directions longer than one unit are
    /// clamped to unit length; non-finite directions are dropped.
    pub fn submit_movement_intent(&mut self, direction: Vec3, wants_run: bool, dt: Duration) {
        if self.dash.is_active() {
            return;
        }
        if !direction.is_finite() {
            debug!(character = self.id.get(), "movement_dropped_non_finite");
            return;
        }

        let direction = direction.clamp_length_max(1.0);
        if is_zero_direction(direction) {
            self.speed_tier = SpeedTier::Idle;
            return;
        }

        let (speed, tier) = if wants_run {
            (self.tuning.run_speed, SpeedTier::Run)
        } else {
            (self.tuning.walk_speed, SpeedTier::Walk)
        };
        let step = integrate(self.orientation, direction, speed, self.tuning.turn_rate, dt);
        self.position += step.displacement;
        self.orientation = step.orientation;
        self.speed_tier = tier;
    }

    /// Raises the attack animation trigger.
    pub fn submit_attack_intent(&mut self, out_events: &mut Vec<Event>) {
        out_events.push(Event::AnimationTriggered {
            character: self.id,
            trigger: AnimationTrigger::Attack,
        });
    }

    /// Starts a dash when the direction is usable, no dash is running and
    /// the stamina cost can be paid.
    pub fn submit_dash_intent(&mut self, direction: Vec3, out_events: &mut Vec<Event>) {
        match self
            .dash
            .trigger(self.position, direction, &mut self.resources)
        {
            Ok(launch) => {
                out_events.push(Event::AnimationTriggered {
                    character: self.id,
                    trigger: AnimationTrigger::Dash,
                });
                out_events.push(Event::DashStarted {
                    character: self.id,
                    from: launch.start,
                    to: launch.target,
                });
            }
            Err(reason) => {
                debug!(character = self.id.get(), ?reason, "dash_rejected");
            }
        }
    }

    /// Per-tick bookkeeping: stamina regeneration, then dash interpolation.
    ///
    /// A running dash overrides any position set by movement earlier in the
    /// same tick.
    pub fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.resources.regen_tick(dt);

        match self.dash.advance(dt) {
            DashAdvance::Idle => {}
            DashAdvance::Moving(position) => self.position = position,
            DashAdvance::Completed(position) => {
                self.position = position;
                out_events.push(Event::DashCompleted {
                    character: self.id,
                    position,
                });
            }
        }
    }

    /// Removes health and announces death the first time it reaches zero.
    pub fn apply_damage(&mut self, amount: f32, out_events: &mut Vec<Event>) {
        if self.resources.apply_damage(amount) {
            info!(character = self.id.get(), "character_died");
            out_events.push(Event::CharacterDied { character: self.id });
        }
    }

    /// Identifier of the character.
    #[must_use]
    pub fn id(&self) -> CharacterId {
        self.id
    }

    /// Client allowed to drive the character.
    #[must_use]
    pub fn owner(&self) -> ClientId {
        self.owner
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current facing.
    #[must_use]
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Last locomotion tier set by movement.
    #[must_use]
    pub fn speed_tier(&self) -> SpeedTier {
        self.speed_tier
    }

    /// Reports whether a dash is running.
    #[must_use]
    pub fn is_dashing(&self) -> bool {
        self.dash.is_active()
    }

    /// Reports whether the character is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.resources.is_dead()
    }

    /// Dash state machine.
    #[must_use]
    pub fn dash(&self) -> &DashController {
        &self.dash
    }

    /// Health and stamina ledger.
    #[must_use]
    pub fn resources(&self) -> &ResourcePool {
        &self.resources
    }

    /// Captures an immutable snapshot for queries.
    #[must_use]
    pub fn snapshot(&self) -> CharacterSnapshot {
        CharacterSnapshot {
            id: self.id,
            owner: self.owner,
            position: self.position,
            orientation: self.orientation,
            speed_tier: self.speed_tier,
            is_dashing: self.dash.is_active(),
            health: self.resources.health(),
            max_health: self.resources.max_health(),
            stamina: self.resources.stamina(),
            max_stamina: self.resources.max_stamina(),
            dash_cost: self.resources.dash_cost(),
            alive: self.is_alive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXED_DT: Duration = Duration::from_millis(20);

    fn authority() -> AbilityAuthority {
        AbilityAuthority::new(
            CharacterId::new(1),
            ClientId::new(1),
            Vec3::ZERO,
            &AbilityTuning::default(),
            &ResourceTuning::default(),
        )
    }

    #[test]
    fn walking_sets_half_locomotion() {
        let mut authority = authority();
        authority.submit_movement_intent(Vec3::Z, false, FIXED_DT);
        assert_eq!(authority.snapshot().locomotion(), 0.5);
        assert!((authority.position() - Vec3::new(0.0, 0.0, 0.04)).length() < 1e-6);
    }

    #[test]
    fn running_sets_full_locomotion() {
        let mut authority = authority();
        authority.submit_movement_intent(Vec3::X, true, FIXED_DT);
        assert_eq!(authority.snapshot().locomotion(), 1.0);
        assert!((authority.position() - Vec3::new(0.1, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn zero_direction_idles_in_place() {
        let mut authority = authority();
        authority.submit_movement_intent(Vec3::X, true, FIXED_DT);
        let before = authority.position();
        authority.submit_movement_intent(Vec3::ZERO, true, FIXED_DT);
        assert_eq!(authority.snapshot().locomotion(), 0.0);
        assert_eq!(authority.position(), before);
    }

    #[test]
    fn oversized_direction_is_clamped() {
        let mut authority = authority();
        authority.submit_movement_intent(Vec3::new(10.0, 0.0, 0.0), false, FIXED_DT);
        assert!((authority.position() - Vec3::new(0.04, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn movement_is_ignored_while_dashing() {
        let mut authority = authority();
        let mut events = Vec::new();
        authority.submit_movement_intent(Vec3::Z, true, FIXED_DT);
        authority.submit_dash_intent(Vec3::X, &mut events);
        let tier_before = authority.speed_tier();
        let position_before = authority.position();

        authority.submit_movement_intent(Vec3::ZERO, false, FIXED_DT);
        authority.submit_movement_intent(Vec3::NEG_Z, false, FIXED_DT);

        assert_eq!(authority.speed_tier(), tier_before);
        assert_eq!(authority.position(), position_before);
    }

    #[test]
    fn dash_emits_trigger_and_start() {
        let mut authority = authority();
        let mut events = Vec::new();
        authority.submit_dash_intent(Vec3::Z, &mut events);
        assert_eq!(
            events,
            vec![
                Event::AnimationTriggered {
                    character: CharacterId::new(1),
                    trigger: AnimationTrigger::Dash,
                },
                Event::DashStarted {
                    character: CharacterId::new(1),
                    from: Vec3::ZERO,
                    to: Vec3::new(0.0, 0.0, 5.0),
                },
            ]
        );
        assert!(authority.is_dashing());
        assert_eq!(authority.resources().stamina(), 75.0);
    }

    #[test]
    fn attack_only_raises_a_trigger() {
        let mut authority = authority();
        let mut events = Vec::new();
        authority.submit_attack_intent(&mut events);
        authority.submit_attack_intent(&mut events);
        assert_eq!(events.len(), 2);
        assert_eq!(authority.position(), Vec3::ZERO);
        assert_eq!(authority.resources().stamina(), 100.0);
    }

    #[test]
    fn lethal_damage_reports_death_once() {
        let mut authority = authority();
        let mut events = Vec::new();
        authority.apply_damage(150.0, &mut events);
        authority.apply_damage(10.0, &mut events);
        assert_eq!(
            events,
            vec![Event::CharacterDied {
                character: CharacterId::new(1),
            }]
        );
        assert!(!authority.is_alive());
        assert_eq!(authority.resources().health(), 0.0);
    }
}
