#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Replication of authoritative motion and animation state to observers.
//!
//! The host builds one [`ReplicationFrame`] per tick from world views and the
//! tick's events. Observers feed frames into an [`ObserverMirror`], which keeps
//! the latest transform and locomotion scalar of every entity and queues the
//! one-shot animation triggers for presentation.

use std::collections::{BTreeMap, VecDeque};

use glam::{Quat, Vec3};
use skirmish_core::{
    AnimationTrigger, CharacterId, CharacterView, EnemyView, EntityRef, Event,
};
use tracing::debug;

/// Replicated transform and locomotion of one entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityState {
    /// Entity the state belongs to.
    pub entity: EntityRef,
    /// World-space position.
    pub position: Vec3,
    /// Facing.
    pub orientation: Quat,
    /// Locomotion scalar in `{0, 0.5, 1}`.
    pub locomotion: f32,
}

/// One-shot animation trigger raised by the authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerNotice {
    /// Character that raised the trigger.
    pub character: CharacterId,
    /// Trigger to play.
    pub trigger: AnimationTrigger,
}

/// Everything observers need to mirror a single tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReplicationFrame {
    /// Index of the tick the frame describes.
    pub tick: u64,
    /// Every live entity, characters first, each group ordered by identifier.
    pub entities: Vec<EntityState>,
    /// Triggers raised during the tick in emission order.
    pub triggers: Vec<TriggerNotice>,
    /// Entities removed since the previous frame.
    pub despawned: Vec<EntityRef>,
}

impl ReplicationFrame {
    /// Empties the frame while keeping its allocations.
    pub fn clear(&mut self) {
        self.tick = 0;
        self.entities.clear();
        self.triggers.clear();
        self.despawned.clear();
    }
}

/// Pure system that packages world state into replication frames.
#[derive(Debug, Default)]
pub struct Replication {
    tick: u64,
}

impl Replication {
    /// Creates a new replication system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ticks observed so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Consumes world events and immutable views to fill `frame`.
    pub fn handle(
        &mut self,
        events: &[Event],
        characters: &CharacterView,
        enemies: &EnemyView,
        frame: &mut ReplicationFrame,
    ) {
        frame.clear();

        for event in events {
            match event {
                Event::TimeAdvanced { .. } => self.tick = self.tick.saturating_add(1),
                Event::AnimationTriggered { character, trigger } => {
                    frame.triggers.push(TriggerNotice {
                        character: *character,
                        trigger: *trigger,
                    });
                }
                Event::CharacterDespawned { character } => {
                    frame.despawned.push(EntityRef::Character(*character));
                }
                Event::EnemyDespawned { enemy } => {
                    frame.despawned.push(EntityRef::Enemy(*enemy));
                }
                _ => {}
            }
        }

        frame.tick = self.tick;
        frame
            .entities
            .extend(characters.iter().map(|snapshot| EntityState {
                entity: EntityRef::Character(snapshot.id),
                position: snapshot.position,
                orientation: snapshot.orientation,
                locomotion: snapshot.locomotion(),
            }));
        frame
            .entities
            .extend(enemies.iter().map(|snapshot| EntityState {
                entity: EntityRef::Enemy(snapshot.id),
                position: snapshot.position,
                orientation: snapshot.orientation,
                locomotion: snapshot.locomotion(),
            }));
    }
}

/// Mirrored state of a single entity on an observer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MirroredEntity {
    /// Last replicated position.
    pub position: Vec3,
    /// Last replicated facing.
    pub orientation: Quat,
    /// Last replicated locomotion scalar.
    pub locomotion: f32,
}

/// Observer-side copy of the replicated world.
#[derive(Debug, Default)]
pub struct ObserverMirror {
    last_tick: Option<u64>,
    entities: BTreeMap<EntityRef, MirroredEntity>,
    triggers: VecDeque<TriggerNotice>,
}

impl ObserverMirror {
    /// Creates an empty mirror.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a frame; frames older than the last applied one are ignored.
    pub fn apply(&mut self, frame: &ReplicationFrame) {
        if self.last_tick.is_some_and(|last| frame.tick < last) {
            debug!(
                tick = frame.tick,
                last = ?self.last_tick,
                "stale_frame_ignored"
            );
            return;
        }
        self.last_tick = Some(frame.tick);

        for entity in &frame.despawned {
            let _ = self.entities.remove(entity);
        }
        for state in &frame.entities {
            let _ = self.entities.insert(
                state.entity,
                MirroredEntity {
                    position: state.position,
                    orientation: state.orientation,
                    locomotion: state.locomotion,
                },
            );
        }
        self.triggers.extend(frame.triggers.iter().copied());
    }

    /// Tick of the last applied frame.
    #[must_use]
    pub fn last_tick(&self) -> Option<u64> {
        self.last_tick
    }

    /// Mirrored state of an entity.
    #[must_use]
    pub fn get(&self, entity: EntityRef) -> Option<&MirroredEntity> {
        self.entities.get(&entity)
    }

    /// Mirrored locomotion scalar of an entity.
    #[must_use]
    pub fn locomotion(&self, entity: EntityRef) -> Option<f32> {
        self.get(entity).map(|state| state.locomotion)
    }

    /// Number of mirrored entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Reports whether nothing is mirrored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Hands queued triggers to presentation, oldest first.
    pub fn drain_triggers(&mut self) -> impl Iterator<Item = TriggerNotice> + '_ {
        self.triggers.drain(..)
    }
}
