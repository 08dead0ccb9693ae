#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Owning-client input sampling that turns held keys into remote intents.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec3;
use skirmish_core::{
    is_zero_direction, CharacterId, CharacterSnapshot, ClientId, Intent, IntentEnvelope,
};

/// Window in which a second key-down of the same key starts running.
pub const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(300);

/// Movement keys sampled by the owning client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MoveKey {
    /// Moves along +Z.
    Forward,
    /// Moves along -Z.
    Back,
    /// Moves along -X.
    Left,
    /// Moves along +X.
    Right,
}

impl MoveKey {
    const ALL: [MoveKey; 4] = [MoveKey::Forward, MoveKey::Back, MoveKey::Left, MoveKey::Right];

    /// Axis contributed by the key while held.
    #[must_use]
    pub const fn axis(self) -> Vec3 {
        match self {
            MoveKey::Forward => Vec3::Z,
            MoveKey::Back => Vec3::NEG_Z,
            MoveKey::Left => Vec3::NEG_X,
            MoveKey::Right => Vec3::X,
        }
    }
}

/// State of the four movement keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveKeys {
    /// Forward key.
    pub forward: bool,
    /// Back key.
    pub back: bool,
    /// Left key.
    pub left: bool,
    /// Right key.
    pub right: bool,
}

impl MoveKeys {
    /// Keys set with only `key` flagged.
    #[must_use]
    pub fn only(key: MoveKey) -> Self {
        let mut keys = Self::default();
        keys.set(key, true);
        keys
    }

    /// Flags or clears a single key.
    pub fn set(&mut self, key: MoveKey, value: bool) {
        match key {
            MoveKey::Forward => self.forward = value,
            MoveKey::Back => self.back = value,
            MoveKey::Left => self.left = value,
            MoveKey::Right => self.right = value,
        }
    }

    /// Reports whether `key` is flagged.
    #[must_use]
    pub const fn contains(&self, key: MoveKey) -> bool {
        match key {
            MoveKey::Forward => self.forward,
            MoveKey::Back => self.back,
            MoveKey::Left => self.left,
            MoveKey::Right => self.right,
        }
    }

    /// Reports whether no key is flagged.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.forward || self.back || self.left || self.right)
    }

    /// Normalised sum of the flagged keys' axes; zero when they cancel out.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        MoveKey::ALL
            .into_iter()
            .filter(|key| self.contains(*key))
            .map(MoveKey::axis)
            .sum::<Vec3>()
            .normalize_or_zero()
    }

    fn iter(self) -> impl Iterator<Item = MoveKey> {
        MoveKey::ALL.into_iter().filter(move |key| self.contains(*key))
    }
}

/// Input snapshot distilled from one sampled frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Keys held during the frame.
    pub held: MoveKeys,
    /// Keys that went down during the frame.
    pub pressed: MoveKeys,
    /// Run modifier held during the frame.
    pub run_modifier: bool,
    /// Attack pressed during the frame.
    pub attack: bool,
    /// Dash pressed during the frame.
    pub dash: bool,
}

/// How the client decides that the character should run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Runs while the modifier is held.
    #[default]
    HoldModifier,
    /// Runs after tapping a movement key twice, until every key is released.
    DoubleTap,
}

/// Per-client sampler that emits intents for a single owned character.
#[derive(Debug)]
pub struct Intake {
    client: ClientId,
    character: CharacterId,
    run_mode: RunMode,
    clock: Duration,
    last_taps: BTreeMap<MoveKey, Duration>,
    tap_running: bool,
}

impl Intake {
    /// Creates a sampler for `character`, owned by `client`.
    #[must_use]
    pub fn new(client: ClientId, character: CharacterId, run_mode: RunMode) -> Self {
        Self {
            client,
            character,
            run_mode,
            clock: Duration::ZERO,
            last_taps: BTreeMap::new(),
            tap_running: false,
        }
    }

    /// Character the sampler drives.
    #[must_use]
    pub fn character(&self) -> CharacterId {
        self.character
    }

    /// Converts one frame of input into intents.
    ///
    /// A movement intent is emitted every frame, including when no key is
    /// held. `replicated` is the client's latest view of its own character;
    /// without one the dash pre-check is skipped and left to the authority.
    pub fn sample(
        &mut self,
        input: &FrameInput,
        dt: Duration,
        replicated: Option<&CharacterSnapshot>,
        out: &mut Vec<IntentEnvelope>,
    ) {
        self.clock = self.clock.saturating_add(dt);
        let direction = input.held.direction();
        let running = self.resolve_running(input);

        out.push(self.envelope(Intent::Movement { direction, running }));

        if input.attack {
            out.push(self.envelope(Intent::Attack));
        }

        if input.dash && dash_allowed(direction, replicated) {
            out.push(self.envelope(Intent::Dash { direction }));
        }
    }

    fn resolve_running(&mut self, input: &FrameInput) -> bool {
        match self.run_mode {
            RunMode::HoldModifier => input.run_modifier,
            RunMode::DoubleTap => {
                for key in input.pressed.iter() {
                    let previous = self.last_taps.insert(key, self.clock);
                    let repeated = previous
                        .is_some_and(|at| self.clock.saturating_sub(at) <= DOUBLE_TAP_WINDOW);
                    if repeated {
                        self.tap_running = true;
                    }
                }
                if input.held.is_empty() {
                    self.tap_running = false;
                }
                self.tap_running
            }
        }
    }

    fn envelope(&self, intent: Intent) -> IntentEnvelope {
        IntentEnvelope::new(self.client, self.character, intent)
    }
}

fn dash_allowed(direction: Vec3, replicated: Option<&CharacterSnapshot>) -> bool {
    if is_zero_direction(direction) {
        return false;
    }
    replicated.map_or(true, |snapshot| {
        snapshot.alive && !snapshot.is_dashing && snapshot.can_afford_dash()
    })
}
