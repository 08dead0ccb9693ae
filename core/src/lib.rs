#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and remote clients submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

pub mod config;
pub mod motion;
pub mod wire;

pub use config::{AbilityTuning, PursuitTuning, ResourceTuning, SimulationConfig, TuningError};
pub use motion::{integrate, is_zero_direction, look_rotation, MotionStep};
pub use wire::{Intent, IntentEnvelope, WireError};

/// Canonical banner emitted when a host boots.
pub const WELCOME_BANNER: &str = "Skirmish authority online.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Registers a new authoritative character owned by a remote client.
    SpawnCharacter {
        /// Client allowed to submit intents for the character.
        owner: ClientId,
        /// World-space position the character appears at.
        position: Vec3,
    },
    /// Removes a character from the live set.
    DespawnCharacter {
        /// Identifier of the character to remove.
        character: CharacterId,
    },
    /// Registers a new enemy driven by the pursuit system.
    SpawnEnemy {
        /// World-space position the enemy appears at; doubles as its patrol home.
        position: Vec3,
    },
    /// Removes an enemy from the live set.
    DespawnEnemy {
        /// Identifier of the enemy to remove.
        enemy: EnemyId,
    },
    /// Delivers a remote call that arrived from a client.
    ///
    /// Intents are queued and take effect at the start of the next tick.
    SubmitIntent {
        /// Client that sent the call.
        client: ClientId,
        /// Character the call addresses.
        character: CharacterId,
        /// Requested action.
        intent: Intent,
    },
    /// Subtracts health from a character on behalf of a combat collaborator.
    ApplyDamage {
        /// Character receiving the damage.
        character: CharacterId,
        /// Amount of health removed.
        amount: f32,
    },
    /// Updates the destination an enemy walks toward.
    SteerEnemy {
        /// Enemy being steered.
        enemy: EnemyId,
        /// World-space point the enemy should approach.
        destination: Vec3,
        /// Behaviour that produced the destination.
        mode: PursuitMode,
        /// Travel speed in world units per second.
        speed: f32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a character joined the live set.
    CharacterSpawned {
        /// Identifier allocated to the character.
        character: CharacterId,
        /// Client owning the character.
        owner: ClientId,
        /// Position the character appeared at.
        position: Vec3,
    },
    /// Confirms that a character left the live set.
    CharacterDespawned {
        /// Identifier of the removed character.
        character: CharacterId,
    },
    /// Confirms that an enemy joined the live set.
    EnemySpawned {
        /// Identifier allocated to the enemy.
        enemy: EnemyId,
        /// Position the enemy appeared at.
        position: Vec3,
    },
    /// Confirms that an enemy left the live set.
    EnemyDespawned {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
    },
    /// One-shot animation trigger mirrored to every observer.
    AnimationTriggered {
        /// Character playing the animation.
        character: CharacterId,
        /// Animation that fired.
        trigger: AnimationTrigger,
    },
    /// Reports that a character started a dash.
    DashStarted {
        /// Dashing character.
        character: CharacterId,
        /// Position the dash started from.
        from: Vec3,
        /// Position the dash will end at.
        to: Vec3,
    },
    /// Reports that a dash finished and the character rests on its target.
    DashCompleted {
        /// Character that finished dashing.
        character: CharacterId,
        /// Final position of the character.
        position: Vec3,
    },
    /// Reports that a character's health reached zero.
    CharacterDied {
        /// Character that died.
        character: CharacterId,
    },
}

/// Identifier of a connected peer that may own characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(u32);

impl ClientId {
    /// Creates a new client identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an authoritative character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(u32);

impl CharacterId {
    /// Creates a new character identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reference to any replicated entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityRef {
    /// A player-owned character.
    Character(CharacterId),
    /// A server-driven enemy.
    Enemy(EnemyId),
}

/// Discrete locomotion tier of a moving body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpeedTier {
    /// Not moving.
    #[default]
    Idle,
    /// Moving at walking pace.
    Walk,
    /// Moving at running pace.
    Run,
}

impl SpeedTier {
    /// Quantized locomotion scalar replicated to observers.
    ///
    /// Observers only ever see one of `0.0`, `0.5` and `1.0`.
    #[must_use]
    pub const fn locomotion_scalar(self) -> f32 {
        match self {
            Self::Idle => 0.0,
            Self::Walk => 0.5,
            Self::Run => 1.0,
        }
    }
}

/// One-shot animation events raised by the authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationTrigger {
    /// Attack swing.
    Attack,
    /// Dash burst.
    Dash,
}

/// Behaviour currently driving an enemy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PursuitMode {
    /// Wandering around the home position.
    #[default]
    Patrol,
    /// Closing in on the nearest character.
    Chase,
}

/// Immutable representation of a single character used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterSnapshot {
    /// Identifier of the character.
    pub id: CharacterId,
    /// Client owning the character.
    pub owner: ClientId,
    /// Current world-space position.
    pub position: Vec3,
    /// Current facing.
    pub orientation: Quat,
    /// Last locomotion tier applied by a movement intent.
    pub speed_tier: SpeedTier,
    /// Indicates whether a dash is in progress.
    pub is_dashing: bool,
    /// Current health.
    pub health: f32,
    /// Health ceiling.
    pub max_health: f32,
    /// Current stamina.
    pub stamina: f32,
    /// Stamina ceiling.
    pub max_stamina: f32,
    /// Stamina consumed by a dash.
    pub dash_cost: f32,
    /// Indicates whether the character is still alive.
    pub alive: bool,
}

impl CharacterSnapshot {
    /// Locomotion scalar derived from the speed tier.
    #[must_use]
    pub const fn locomotion(&self) -> f32 {
        self.speed_tier.locomotion_scalar()
    }

    /// Reports whether the character holds enough stamina to dash.
    #[must_use]
    pub fn can_afford_dash(&self) -> bool {
        self.stamina >= self.dash_cost
    }
}

/// Read-only snapshot describing all live characters.
#[derive(Clone, Debug, Default)]
pub struct CharacterView {
    snapshots: Vec<CharacterSnapshot>,
}

impl CharacterView {
    /// Creates a new character view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CharacterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &CharacterSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a specific character.
    #[must_use]
    pub fn get(&self, id: CharacterId) -> Option<&CharacterSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of captured characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CharacterSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// Current world-space position.
    pub position: Vec3,
    /// Current facing.
    pub orientation: Quat,
    /// Position the enemy spawned at.
    pub home: Vec3,
    /// Destination currently steered toward, if any.
    pub destination: Option<Vec3>,
    /// Distance left to the destination; zero without one.
    pub remaining_distance: f32,
    /// Behaviour that issued the current destination.
    pub mode: PursuitMode,
    /// Locomotion tier produced by the last tick.
    pub speed_tier: SpeedTier,
}

impl EnemySnapshot {
    /// Locomotion scalar derived from the speed tier.
    #[must_use]
    pub const fn locomotion(&self) -> f32 {
        self.speed_tier.locomotion_scalar()
    }
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a specific enemy.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Whole-number health and stamina values suitable for a status display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StatsReadout {
    /// Health rounded up.
    pub health: u32,
    /// Stamina rounded up.
    pub stamina: u32,
}

impl StatsReadout {
    /// Rounds raw pool values up so a sliver of health never reads as zero.
    #[must_use]
    pub fn from_pools(health: f32, stamina: f32) -> Self {
        Self {
            health: health.max(0.0).ceil() as u32,
            stamina: stamina.max(0.0).ceil() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CharacterId, CharacterSnapshot, CharacterView, ClientId, SpeedTier, StatsReadout};
    use glam::{Quat, Vec3};

    fn snapshot(id: u32) -> CharacterSnapshot {
        CharacterSnapshot {
            id: CharacterId::new(id),
            owner: ClientId::new(id),
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            speed_tier: SpeedTier::Idle,
            is_dashing: false,
            health: 100.0,
            max_health: 100.0,
            stamina: 20.0,
            max_stamina: 100.0,
            dash_cost: 25.0,
            alive: true,
        }
    }

    #[test]
    fn locomotion_scalars_are_quantized() {
        assert_eq!(SpeedTier::Idle.locomotion_scalar(), 0.0);
        assert_eq!(SpeedTier::Walk.locomotion_scalar(), 0.5);
        assert_eq!(SpeedTier::Run.locomotion_scalar(), 1.0);
    }

    #[test]
    fn character_view_orders_and_finds_by_id() {
        let view = CharacterView::from_snapshots(vec![snapshot(7), snapshot(2), snapshot(4)]);
        let ids: Vec<u32> = view.iter().map(|entry| entry.id.get()).collect();
        assert_eq!(ids, vec![2, 4, 7]);
        assert_eq!(view.get(CharacterId::new(4)).map(|entry| entry.id.get()), Some(4));
        assert!(view.get(CharacterId::new(5)).is_none());
    }

    #[test]
    fn dash_affordability_compares_against_cost() {
        let mut poor = snapshot(1);
        assert!(!poor.can_afford_dash());
        poor.stamina = 25.0;
        assert!(poor.can_afford_dash());
    }

    #[test]
    fn stats_readout_rounds_up() {
        let readout = StatsReadout::from_pools(0.2, 99.01);
        assert_eq!(readout.health, 1);
        assert_eq!(readout.stamina, 100);
        assert_eq!(StatsReadout::from_pools(0.0, -3.0).health, 0);
    }
}
