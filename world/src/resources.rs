//! Health and stamina ledger owned by each character.

use std::time::Duration;

use skirmish_core::ResourceTuning;

/// Health and stamina pools with clamped mutation.
///
/// Both pools stay within `[0, max]` after every call. Health reaching zero
/// is reported exactly once; the pool stays dead afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourcePool {
    health: f32,
    max_health: f32,
    stamina: f32,
    max_stamina: f32,
    stamina_regen_rate: f32,
    dash_cost: f32,
    dead: bool,
}

impl ResourcePool {
    /// Creates a full pool from the provided tuning.
    #[must_use]
    pub fn new(tuning: &ResourceTuning) -> Self {
        let max_health = tuning.max_health.max(0.0);
        let max_stamina = tuning.max_stamina.max(0.0);
        Self {
            health: max_health,
            max_health,
            stamina: max_stamina,
            max_stamina,
            stamina_regen_rate: tuning.stamina_regen_rate.max(0.0),
            dash_cost: tuning.dash_stamina_cost.max(0.0),
            dead: false,
        }
    }

    /// Regenerates stamina for one tick while below the ceiling.
    pub fn regen_tick(&mut self, dt: Duration) {
        if self.stamina < self.max_stamina {
            self.stamina += self.stamina_regen_rate * dt.as_secs_f32();
            self.stamina = self.stamina.clamp(0.0, self.max_stamina);
        }
    }

    /// Reports whether the pool holds at least `cost` stamina.
    #[must_use]
    pub fn can_afford(&self, cost: f32) -> bool {
        self.stamina >= cost
    }

    /// Removes `cost` stamina, doing nothing when the pool cannot afford it.
    ///
    /// Returns whether the stamina was spent. Negative or non-finite costs
    /// are refused.
    pub fn spend(&mut self, cost: f32) -> bool {
        if !cost.is_finite() || cost < 0.0 || !self.can_afford(cost) {
            return false;
        }
        self.stamina = (self.stamina - cost).clamp(0.0, self.max_stamina);
        true
    }

    /// Removes health, returning `true` only on the call that kills.
    ///
    /// Damage after death, negative and non-finite amounts change nothing.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if self.dead || !amount.is_finite() || amount <= 0.0 {
            return false;
        }
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        if self.health <= 0.0 {
            self.dead = true;
            return true;
        }
        false
    }

    /// Current health.
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Health ceiling.
    #[must_use]
    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Current stamina.
    #[must_use]
    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    /// Stamina ceiling.
    #[must_use]
    pub fn max_stamina(&self) -> f32 {
        self.max_stamina
    }

    /// Stamina consumed by a dash.
    #[must_use]
    pub fn dash_cost(&self) -> f32 {
        self.dash_cost
    }

    /// Reports whether health has reached zero.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    #[cfg(test)]
    pub(crate) fn set_stamina(&mut self, stamina: f32) {
        self.stamina = stamina.clamp(0.0, self.max_stamina);
    }
}
