#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Skirmish.
//!
//! The world owns every character's [`AbilityAuthority`] and every enemy
//! body. Remote calls are queued when they arrive and applied at the start
//! of the next [`Command::Tick`], after which each authority advances its
//! stamina and dash state and each enemy walks toward its destination.

use std::time::Duration;

use skirmish_core::{
    CharacterId, ClientId, Command, EnemyId, Event, Intent, SimulationConfig, WELCOME_BANNER,
};
use tracing::{debug, info, warn};

pub mod authority;
pub mod dash;
mod enemies;
mod inbox;
mod registry;
pub mod resources;

pub use authority::AbilityAuthority;
pub use dash::{DashAdvance, DashController, DashLaunch, DashPhase, DashRejection};
pub use resources::ResourcePool;

use enemies::EnemyBody;
use inbox::{IntentInbox, QueuedIntent};
use registry::Registry;

/// Represents the authoritative Skirmish world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: SimulationConfig,
    characters: Registry<CharacterId, AbilityAuthority>,
    enemies: Registry<EnemyId, EnemyBody>,
    inbox: IntentInbox,
    tick_index: u64,
}

impl World {
    /// Creates a world using the default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    /// Creates a world using the provided tuning.
    #[must_use]
    pub fn with_config(config: SimulationConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            config,
            characters: Registry::new(),
            enemies: Registry::new(),
            inbox: IntentInbox::default(),
            tick_index: 0,
        }
    }

    fn receive_intent(&mut self, client: ClientId, character: CharacterId, intent: Intent) {
        let Some(authority) = self.characters.get(character) else {
            debug!(
                client = client.get(),
                character = character.get(),
                "intent_dropped_unknown_character"
            );
            return;
        };
        if authority.owner() != client {
            debug!(
                client = client.get(),
                character = character.get(),
                owner = authority.owner().get(),
                "intent_dropped_not_owner"
            );
            return;
        }
        self.inbox.queue(character, intent);
    }

    fn apply_queued(&mut self, queued: QueuedIntent, dt: Duration, out_events: &mut Vec<Event>) {
        let Some(authority) = self.characters.get_mut(queued.character) else {
            return;
        };
        if !authority.is_alive() {
            debug!(character = queued.character.get(), "intent_dropped_dead");
            return;
        }

        match queued.intent {
            Intent::Movement { direction, running } => {
                authority.submit_movement_intent(direction, running, dt);
            }
            Intent::Attack => authority.submit_attack_intent(out_events),
            Intent::Dash { direction } => authority.submit_dash_intent(direction, out_events),
        }
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for queued in self.inbox.drain() {
            self.apply_queued(queued, dt, out_events);
        }

        for authority in self.characters.values_mut() {
            authority.advance(dt, out_events);
        }

        let stopping_distance = self.config.pursuit.stopping_distance;
        let turn_rate = self.config.pursuit.turn_rate;
        for enemy in self.enemies.values_mut() {
            enemy.advance(dt, stopping_distance, turn_rate);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.advance(dt, out_events);
        }
        Command::SpawnCharacter { owner, position } => {
            let ability = world.config.ability.clone();
            let resources = world.config.resources.clone();
            let Some(character) = world.characters.insert_with(|id| {
                AbilityAuthority::new(id, owner, position, &ability, &resources)
            }) else {
                warn!(owner = owner.get(), "character_ids_exhausted");
                return;
            };
            info!(
                character = character.get(),
                owner = owner.get(),
                "character_spawned"
            );
            out_events.push(Event::CharacterSpawned {
                character,
                owner,
                position,
            });
        }
        Command::DespawnCharacter { character } => {
            if world.characters.remove(character).is_some() {
                info!(character = character.get(), "character_despawned");
                out_events.push(Event::CharacterDespawned { character });
            }
        }
        Command::SpawnEnemy { position } => {
            let Some(enemy) = world
                .enemies
                .insert_with(|id| EnemyBody::new(id, position))
            else {
                warn!("enemy_ids_exhausted");
                return;
            };
            info!(enemy = enemy.get(), "enemy_spawned");
            out_events.push(Event::EnemySpawned { enemy, position });
        }
        Command::DespawnEnemy { enemy } => {
            if world.enemies.remove(enemy).is_some() {
                info!(enemy = enemy.get(), "enemy_despawned");
                out_events.push(Event::EnemyDespawned { enemy });
            }
        }
        Command::SubmitIntent {
            client,
            character,
            intent,
        } => world.receive_intent(client, character, intent),
        Command::ApplyDamage { character, amount } => {
            if let Some(authority) = world.characters.get_mut(character) {
                authority.apply_damage(amount, out_events);
            }
        }
        Command::SteerEnemy {
            enemy,
            destination,
            mode,
            speed,
        } => {
            if !destination.is_finite() || !speed.is_finite() {
                debug!(enemy = enemy.get(), speed, "steering_dropped_non_finite");
                return;
            }
            if let Some(body) = world.enemies.get_mut(enemy) {
                body.steer(destination, mode, speed);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use skirmish_core::{
        CharacterId, CharacterSnapshot, CharacterView, EnemyView, SimulationConfig, StatsReadout,
    };

    use super::World;

    /// Retrieves the banner that hosts may display on startup.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the tuning the world runs with.
    #[must_use]
    pub fn config(world: &World) -> &SimulationConfig {
        &world.config
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Number of intents waiting for the next tick.
    #[must_use]
    pub fn pending_intents(world: &World) -> usize {
        world.inbox.len()
    }

    /// Captures a snapshot of a single character.
    #[must_use]
    pub fn character(world: &World, id: CharacterId) -> Option<CharacterSnapshot> {
        world
            .characters
            .get(id)
            .map(super::AbilityAuthority::snapshot)
    }

    /// Captures a read-only view of every live character.
    #[must_use]
    pub fn character_view(world: &World) -> CharacterView {
        CharacterView::from_snapshots(
            world
                .characters
                .values()
                .map(super::AbilityAuthority::snapshot)
                .collect(),
        )
    }

    /// Captures a read-only view of every live enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.values().map(|enemy| enemy.snapshot()).collect())
    }

    /// Whole-number health and stamina of a character for status displays.
    #[must_use]
    pub fn stats_readout(world: &World, id: CharacterId) -> Option<StatsReadout> {
        world.characters.get(id).map(|authority| {
            let pool = authority.resources();
            StatsReadout::from_pools(pool.health(), pool.stamina())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use skirmish_core::PursuitMode;

    fn spawn(world: &mut World, owner: u32) -> CharacterId {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnCharacter {
                owner: ClientId::new(owner),
                position: Vec3::ZERO,
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::CharacterSpawned { character, .. }] => *character,
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn foreign_intents_are_not_queued() {
        let mut world = World::new();
        let character = spawn(&mut world, 1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SubmitIntent {
                client: ClientId::new(2),
                character,
                intent: Intent::Attack,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SubmitIntent {
                client: ClientId::new(1),
                character: CharacterId::new(99),
                intent: Intent::Attack,
            },
            &mut events,
        );
        assert_eq!(query::pending_intents(&world), 0);
        assert!(events.is_empty());
    }

    #[test]
    fn intents_wait_for_the_next_tick() {
        let mut world = World::new();
        let character = spawn(&mut world, 1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SubmitIntent {
                client: ClientId::new(1),
                character,
                intent: Intent::Attack,
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::pending_intents(&world), 1);

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(20),
            },
            &mut events,
        );
        assert_eq!(query::pending_intents(&world), 0);
        assert!(events.contains(&Event::AnimationTriggered {
            character,
            trigger: skirmish_core::AnimationTrigger::Attack,
        }));
    }

    #[test]
    fn character_identifiers_are_not_reused() {
        let mut world = World::new();
        let first = spawn(&mut world, 1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::DespawnCharacter { character: first },
            &mut events,
        );
        let second = spawn(&mut world, 1);
        assert_ne!(first, second);
        assert!(query::character(&world, first).is_none());
    }

    #[test]
    fn despawning_unknown_entities_is_silent() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::DespawnEnemy {
                enemy: EnemyId::new(5),
            },
            &mut events,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn non_finite_steering_is_dropped() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                position: Vec3::ZERO,
            },
            &mut events,
        );
        let enemy = EnemyId::new(0);
        for speed in [f32::INFINITY, f32::NAN] {
            apply(
                &mut world,
                Command::SteerEnemy {
                    enemy,
                    destination: Vec3::new(0.0, 0.0, 10.0),
                    mode: PursuitMode::Chase,
                    speed,
                },
                &mut events,
            );
        }
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(20),
            },
            &mut events,
        );

        let view = query::enemy_view(&world);
        let snapshot = view.get(enemy).expect("enemy");
        assert_eq!(snapshot.position, Vec3::ZERO);
        assert_eq!(snapshot.destination, None);
    }
}
