//! Headless host loop driving scripted clients against the authority.

use std::{fmt, time::Duration};

use glam::Vec3;
use skirmish_core::{
    AnimationTrigger, CharacterId, CharacterSnapshot, ClientId, Command, EnemySnapshot,
    EntityRef, Event, IntentEnvelope, PursuitMode, SimulationConfig, StatsReadout,
};
use skirmish_system_intake::{FrameInput, Intake, MoveKey, MoveKeys, RunMode};
use skirmish_system_pursuit::Pursuit;
use skirmish_system_replication::{ObserverMirror, Replication, ReplicationFrame};
use skirmish_world::{self as world, query, World};
use tracing::{info, warn};

use crate::transport::LoopbackTransport;

const SCRIPT_PHASE_TICKS: u64 = 100;
const SCRIPT_KEYS: [MoveKey; 4] = [
    MoveKey::Forward,
    MoveKey::Right,
    MoveKey::Back,
    MoveKey::Left,
];
const CHARACTER_RING_RADIUS: f32 = 3.0;
const ENEMY_RING_RADIUS: f32 = 15.0;

/// Knobs that shape a headless session.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SessionOptions {
    pub(crate) clients: u32,
    pub(crate) enemies: u32,
    pub(crate) seed: u64,
    pub(crate) drop_rate: f64,
}

/// Owning client that replays a fixed input pattern.
#[derive(Debug)]
struct ScriptedClient {
    index: u64,
    intake: Intake,
}

impl ScriptedClient {
    /// Cycles through the movement keys, double tapping at the start of each phase.
    fn frame_input(&self, tick: u64) -> FrameInput {
        let phase = tick / SCRIPT_PHASE_TICKS;
        let within = tick % SCRIPT_PHASE_TICKS;
        let slot = usize::try_from((phase + self.index) % 4).unwrap_or(0);
        let key = SCRIPT_KEYS[slot];

        let held = if within == 1 {
            MoveKeys::default()
        } else {
            MoveKeys::only(key)
        };
        let pressed = if within == 0 || within == 2 {
            MoveKeys::only(key)
        } else {
            MoveKeys::default()
        };

        FrameInput {
            held,
            pressed,
            run_modifier: phase % 2 == 0,
            attack: within == 30,
            dash: within == 60,
        }
    }
}

/// Host, clients and one observer wired together over a loopback transport.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    pursuit: Pursuit,
    replication: Replication,
    frame: ReplicationFrame,
    mirror: ObserverMirror,
    transport: LoopbackTransport,
    clients: Vec<ScriptedClient>,
    pending_events: Vec<Event>,
    dt: Duration,
    tick: u64,
    rejected_datagrams: u64,
    observed_attacks: u64,
    observed_dashes: u64,
}

impl Session {
    pub(crate) fn new(config: SimulationConfig, options: SessionOptions) -> Self {
        let dt = config.fixed_dt();
        let pursuit = Pursuit::new(config.pursuit.clone());
        let mut world = World::with_config(config);
        let mut pending_events = Vec::new();

        let mut clients = Vec::new();
        for index in 0..options.clients {
            let owner = ClientId::new(index + 1);
            let position = ring_position(index, options.clients, CHARACTER_RING_RADIUS);
            let mut events = Vec::new();
            world::apply(
                &mut world,
                Command::SpawnCharacter { owner, position },
                &mut events,
            );
            if let Some(character) = spawned_character(&events) {
                let run_mode = if index % 2 == 0 {
                    RunMode::HoldModifier
                } else {
                    RunMode::DoubleTap
                };
                clients.push(ScriptedClient {
                    index: u64::from(index),
                    intake: Intake::new(owner, character, run_mode),
                });
            }
            pending_events.extend(events);
        }

        for index in 0..options.enemies {
            let position = ring_position(index, options.enemies, ENEMY_RING_RADIUS);
            world::apply(
                &mut world,
                Command::SpawnEnemy { position },
                &mut pending_events,
            );
        }

        Self {
            world,
            pursuit,
            replication: Replication::new(),
            frame: ReplicationFrame::default(),
            mirror: ObserverMirror::new(),
            transport: LoopbackTransport::new(options.seed, options.drop_rate),
            clients,
            pending_events,
            dt,
            tick: 0,
            rejected_datagrams: 0,
            observed_attacks: 0,
            observed_dashes: 0,
        }
    }

    pub(crate) fn run(&mut self, ticks: u64) {
        info!(
            ticks,
            clients = self.clients.len(),
            dt = ?self.dt,
            "session_started"
        );
        for _ in 0..ticks {
            self.step();
        }
        info!(tick = self.tick, "session_finished");
    }

    fn step(&mut self) {
        self.sample_clients();
        let mut events = std::mem::take(&mut self.pending_events);
        self.receive_intents(&mut events);

        world::apply(&mut self.world, Command::Tick { dt: self.dt }, &mut events);
        self.tick = self.tick.saturating_add(1);

        let mut steering = Vec::new();
        self.pursuit.handle(
            &events,
            &query::character_view(&self.world),
            &query::enemy_view(&self.world),
            &mut steering,
        );
        for command in steering {
            world::apply(&mut self.world, command, &mut events);
        }

        self.replication.handle(
            &events,
            &query::character_view(&self.world),
            &query::enemy_view(&self.world),
            &mut self.frame,
        );
        self.mirror.apply(&self.frame);
        for notice in self.mirror.drain_triggers() {
            match notice.trigger {
                AnimationTrigger::Attack => self.observed_attacks += 1,
                AnimationTrigger::Dash => self.observed_dashes += 1,
            }
        }
    }

    fn sample_clients(&mut self) {
        for client in &mut self.clients {
            let input = client.frame_input(self.tick);
            let replicated = query::character(&self.world, client.intake.character());
            let mut envelopes = Vec::new();
            client
                .intake
                .sample(&input, self.dt, replicated.as_ref(), &mut envelopes);
            for envelope in envelopes {
                match envelope.encode() {
                    Ok(datagram) => self.transport.send(datagram),
                    Err(error) => warn!(%error, "intent_encode_failed"),
                }
            }
        }
    }

    fn receive_intents(&mut self, events: &mut Vec<Event>) {
        for datagram in self.transport.deliver() {
            match IntentEnvelope::decode(&datagram) {
                Ok(envelope) => world::apply(
                    &mut self.world,
                    Command::SubmitIntent {
                        client: envelope.client,
                        character: envelope.character,
                        intent: envelope.intent,
                    },
                    events,
                ),
                Err(error) => {
                    self.rejected_datagrams += 1;
                    warn!(%error, "datagram_rejected");
                }
            }
        }
    }

    pub(crate) fn summary(&self) -> Summary {
        let characters = query::character_view(&self.world)
            .into_vec()
            .into_iter()
            .map(|snapshot| {
                let stats = StatsReadout::from_pools(snapshot.health, snapshot.stamina);
                let mirrored = self
                    .mirror
                    .locomotion(EntityRef::Character(snapshot.id));
                CharacterLine {
                    snapshot,
                    stats,
                    mirrored,
                }
            })
            .collect();
        let enemies = query::enemy_view(&self.world)
            .into_vec()
            .into_iter()
            .map(|snapshot| EnemyLine {
                mode: self.pursuit.mode(snapshot.id),
                snapshot,
            })
            .collect();

        Summary {
            banner: query::welcome_banner(&self.world),
            ticks: query::tick_index(&self.world),
            characters,
            enemies,
            sent_datagrams: self.transport.sent(),
            dropped_datagrams: self.transport.dropped(),
            rejected_datagrams: self.rejected_datagrams,
            observed_attacks: self.observed_attacks,
            observed_dashes: self.observed_dashes,
        }
    }
}

fn spawned_character(events: &[Event]) -> Option<CharacterId> {
    events.iter().find_map(|event| match event {
        Event::CharacterSpawned { character, .. } => Some(*character),
        _ => None,
    })
}

fn ring_position(index: u32, count: u32, radius: f32) -> Vec3 {
    if count <= 1 {
        return Vec3::new(radius, 0.0, 0.0);
    }
    let angle = std::f32::consts::TAU * index as f32 / count as f32;
    Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CharacterLine {
    snapshot: CharacterSnapshot,
    stats: StatsReadout,
    mirrored: Option<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EnemyLine {
    snapshot: EnemySnapshot,
    mode: Option<PursuitMode>,
}

/// End-of-run report printed by the binary.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Summary {
    banner: &'static str,
    ticks: u64,
    characters: Vec<CharacterLine>,
    enemies: Vec<EnemyLine>,
    sent_datagrams: u64,
    dropped_datagrams: u64,
    rejected_datagrams: u64,
    observed_attacks: u64,
    observed_dashes: u64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.banner)?;
        writeln!(f, "ticks: {}", self.ticks)?;
        for line in &self.characters {
            let snapshot = &line.snapshot;
            writeln!(
                f,
                "character {} (client {}): pos ({:.2}, {:.2}, {:.2}) health {} stamina {} locomotion {:.1}{}",
                snapshot.id.get(),
                snapshot.owner.get(),
                snapshot.position.x,
                snapshot.position.y,
                snapshot.position.z,
                line.stats.health,
                line.stats.stamina,
                line.mirrored.unwrap_or(0.0),
                if snapshot.alive { "" } else { " [dead]" },
            )?;
        }
        for line in &self.enemies {
            let snapshot = &line.snapshot;
            let mode = match line.mode {
                Some(PursuitMode::Chase) => "chase",
                Some(PursuitMode::Patrol) => "patrol",
                None => "unseen",
            };
            writeln!(
                f,
                "enemy {}: pos ({:.2}, {:.2}, {:.2}) {mode}",
                snapshot.id.get(),
                snapshot.position.x,
                snapshot.position.y,
                snapshot.position.z,
            )?;
        }
        writeln!(
            f,
            "datagrams: {} sent, {} dropped, {} rejected",
            self.sent_datagrams, self.dropped_datagrams, self.rejected_datagrams
        )?;
        write!(
            f,
            "observed triggers: {} attack, {} dash",
            self.observed_attacks, self.observed_dashes
        )
    }
}
