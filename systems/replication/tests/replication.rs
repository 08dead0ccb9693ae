use std::time::Duration;

use glam::Vec3;
use skirmish_core::{
    AnimationTrigger, CharacterId, ClientId, Command, EntityRef, Event, Intent, PursuitMode,
};
use skirmish_system_replication::{ObserverMirror, Replication, ReplicationFrame, TriggerNotice};
use skirmish_world::{self as world, query, World};

const TICK: Duration = Duration::from_millis(20);
const OWNER: ClientId = ClientId::new(1);

fn apply(world: &mut World, command: Command, events: &mut Vec<Event>) {
    world::apply(world, command, events);
}

fn publish(
    world: &World,
    replication: &mut Replication,
    events: &[Event],
    mirror: &mut ObserverMirror,
) -> ReplicationFrame {
    let mut frame = ReplicationFrame::default();
    replication.handle(
        events,
        &query::character_view(world),
        &query::enemy_view(world),
        &mut frame,
    );
    mirror.apply(&frame);
    frame
}

fn submit(world: &mut World, character: CharacterId, intent: Intent, events: &mut Vec<Event>) {
    apply(
        world,
        Command::SubmitIntent {
            client: OWNER,
            character,
            intent,
        },
        events,
    );
}

#[test]
fn observers_mirror_quantised_locomotion() {
    let mut world = World::new();
    let mut replication = Replication::new();
    let mut mirror = ObserverMirror::new();
    let mut events = Vec::new();

    apply(
        &mut world,
        Command::SpawnCharacter {
            owner: OWNER,
            position: Vec3::ZERO,
        },
        &mut events,
    );
    let character = CharacterId::new(0);
    let entity = EntityRef::Character(character);

    let cases = [
        (Vec3::X, true, 1.0),
        (Vec3::new(0.3, 0.0, 0.0), false, 0.5),
        (Vec3::ZERO, true, 0.0),
    ];
    for (direction, running, expected) in cases {
        submit(
            &mut world,
            character,
            Intent::Movement { direction, running },
            &mut events,
        );
        apply(&mut world, Command::Tick { dt: TICK }, &mut events);
        let frame = publish(&world, &mut replication, &events, &mut mirror);
        events.clear();

        assert_eq!(mirror.locomotion(entity), Some(expected));
        assert_eq!(
            mirror.get(entity).map(|state| state.position),
            frame
                .entities
                .iter()
                .find(|state| state.entity == entity)
                .map(|state| state.position)
        );
    }
    assert_eq!(mirror.last_tick(), Some(3));
}

#[test]
fn triggers_reach_observers_once() {
    let mut world = World::new();
    let mut replication = Replication::new();
    let mut mirror = ObserverMirror::new();
    let mut events = Vec::new();

    apply(
        &mut world,
        Command::SpawnCharacter {
            owner: OWNER,
            position: Vec3::ZERO,
        },
        &mut events,
    );
    let character = CharacterId::new(0);
    submit(&mut world, character, Intent::Attack, &mut events);
    submit(
        &mut world,
        character,
        Intent::Dash { direction: Vec3::Z },
        &mut events,
    );
    apply(&mut world, Command::Tick { dt: TICK }, &mut events);
    let _ = publish(&world, &mut replication, &events, &mut mirror);
    events.clear();

    let drained: Vec<TriggerNotice> = mirror.drain_triggers().collect();
    assert_eq!(
        drained,
        vec![
            TriggerNotice {
                character,
                trigger: AnimationTrigger::Attack,
            },
            TriggerNotice {
                character,
                trigger: AnimationTrigger::Dash,
            },
        ]
    );

    apply(&mut world, Command::Tick { dt: TICK }, &mut events);
    let _ = publish(&world, &mut replication, &events, &mut mirror);
    assert_eq!(mirror.drain_triggers().count(), 0);
}

#[test]
fn enemies_are_replicated_and_removed() {
    let mut world = World::new();
    let mut replication = Replication::new();
    let mut mirror = ObserverMirror::new();
    let mut events = Vec::new();

    apply(
        &mut world,
        Command::SpawnEnemy {
            position: Vec3::ZERO,
        },
        &mut events,
    );
    let enemy = query::enemy_view(&world)
        .iter()
        .map(|snapshot| snapshot.id)
        .next()
        .expect("enemy");
    apply(
        &mut world,
        Command::SteerEnemy {
            enemy,
            destination: Vec3::new(0.0, 0.0, 9.0),
            mode: PursuitMode::Patrol,
            speed: 1.5,
        },
        &mut events,
    );
    apply(&mut world, Command::Tick { dt: TICK }, &mut events);
    let _ = publish(&world, &mut replication, &events, &mut mirror);
    events.clear();
    assert_eq!(mirror.locomotion(EntityRef::Enemy(enemy)), Some(0.5));

    apply(&mut world, Command::DespawnEnemy { enemy }, &mut events);
    let frame = publish(&world, &mut replication, &events, &mut mirror);
    assert_eq!(frame.despawned, vec![EntityRef::Enemy(enemy)]);
    assert!(mirror.get(EntityRef::Enemy(enemy)).is_none());
}
