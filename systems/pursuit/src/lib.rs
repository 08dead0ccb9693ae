#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Patrol and chase decisions for server-driven enemies.
//!
//! Every tick each enemy looks for the nearest living character. Inside the
//! detection radius it chases that character; otherwise it wanders between
//! random goals around its home position, pausing at each one.

use std::{collections::BTreeMap, f32::consts::TAU, time::Duration};

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skirmish_core::{
    CharacterId, CharacterSnapshot, CharacterView, Command, EnemyId, EnemySnapshot, EnemyView,
    Event, PursuitMode, PursuitTuning,
};
use tracing::debug;

/// Pure system that reacts to world events and emits steering commands.
#[derive(Debug)]
pub struct Pursuit {
    tuning: PursuitTuning,
    rng: ChaCha8Rng,
    enemies: BTreeMap<EnemyId, PatrolState>,
}

#[derive(Clone, Copy, Debug)]
struct PatrolState {
    home: Vec3,
    mode: PursuitMode,
    goal: Vec3,
    wait_timer: Duration,
    target: Option<CharacterId>,
}

impl Pursuit {
    /// Creates the system; goal sampling is seeded from `tuning.seed`.
    #[must_use]
    pub fn new(tuning: PursuitTuning) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(tuning.seed),
            tuning,
            enemies: BTreeMap::new(),
        }
    }

    /// Consumes world events and immutable views to emit steering commands.
    ///
    /// Decisions are only made on ticks that advanced time.
    pub fn handle(
        &mut self,
        events: &[Event],
        characters: &CharacterView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        let mut elapsed = None;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    elapsed = Some(elapsed.unwrap_or(Duration::ZERO) + *dt);
                }
                Event::EnemyDespawned { enemy } => {
                    let _ = self.enemies.remove(enemy);
                }
                _ => {}
            }
        }
        let Some(dt) = elapsed else {
            return;
        };

        for enemy in enemies.iter() {
            self.decide(enemy, characters, dt, out);
        }
    }

    /// Current mode of an enemy, once the system has seen it.
    #[must_use]
    pub fn mode(&self, enemy: EnemyId) -> Option<PursuitMode> {
        self.enemies.get(&enemy).map(|state| state.mode)
    }

    /// Character an enemy is chasing, if any.
    #[must_use]
    pub fn target(&self, enemy: EnemyId) -> Option<CharacterId> {
        self.enemies.get(&enemy).and_then(|state| state.target)
    }

    /// Current patrol goal of an enemy.
    #[must_use]
    pub fn patrol_goal(&self, enemy: EnemyId) -> Option<Vec3> {
        self.enemies.get(&enemy).map(|state| state.goal)
    }

    /// Time an enemy has spent patrolling since its last goal was issued.
    #[must_use]
    pub fn wait_timer(&self, enemy: EnemyId) -> Option<Duration> {
        self.enemies.get(&enemy).map(|state| state.wait_timer)
    }

    fn decide(
        &mut self,
        enemy: &EnemySnapshot,
        characters: &CharacterView,
        dt: Duration,
        out: &mut Vec<Command>,
    ) {
        let state = match self.enemies.get(&enemy.id).copied() {
            Some(state) => state,
            None => {
                let goal = self.sample_goal(enemy.home);
                out.push(self.patrol_command(enemy.id, goal));
                PatrolState {
                    home: enemy.home,
                    mode: PursuitMode::Patrol,
                    goal,
                    wait_timer: Duration::ZERO,
                    target: None,
                }
            }
        };

        let next = match nearest_living(enemy.position, characters) {
            Some((target, distance)) if distance <= self.tuning.detection_radius => {
                if state.mode != PursuitMode::Chase {
                    debug!(
                        enemy = enemy.id.get(),
                        character = target.id.get(),
                        distance,
                        "chase_started"
                    );
                }
                out.push(Command::SteerEnemy {
                    enemy: enemy.id,
                    destination: target.position,
                    mode: PursuitMode::Chase,
                    speed: self.tuning.chase_speed,
                });
                PatrolState {
                    mode: PursuitMode::Chase,
                    target: Some(target.id),
                    ..state
                }
            }
            _ => self.patrol(enemy, state, dt, out),
        };

        let _ = self.enemies.insert(enemy.id, next);
    }

    fn patrol(
        &mut self,
        enemy: &EnemySnapshot,
        mut state: PatrolState,
        dt: Duration,
        out: &mut Vec<Command>,
    ) -> PatrolState {
        if state.mode == PursuitMode::Chase {
            debug!(enemy = enemy.id.get(), "chase_lost");
            state.mode = PursuitMode::Patrol;
            state.target = None;
            out.push(self.patrol_command(enemy.id, state.goal));
        }

        state.wait_timer = state.wait_timer.saturating_add(dt);
        let reached = enemy.position.distance(state.goal) <= self.tuning.stopping_distance;
        if reached && state.wait_timer >= self.tuning.patrol_wait {
            state.goal = self.sample_goal(state.home);
            state.wait_timer = Duration::ZERO;
            out.push(self.patrol_command(enemy.id, state.goal));
        }
        state
    }

    fn patrol_command(&self, enemy: EnemyId, goal: Vec3) -> Command {
        Command::SteerEnemy {
            enemy,
            destination: goal,
            mode: PursuitMode::Patrol,
            speed: self.tuning.patrol_speed,
        }
    }

    /// Uniform point inside the patrol disc around `home`, at home height.
    fn sample_goal(&mut self, home: Vec3) -> Vec3 {
        let radius = self.tuning.patrol_radius.max(0.0) * self.rng.gen::<f32>().sqrt();
        let angle = self.rng.gen::<f32>() * TAU;
        home + Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
    }
}

/// Linear scan for the closest living character.
///
/// Ties go to whichever character the view yields first, which is not a
/// guaranteed ordering for callers to rely on.
fn nearest_living(origin: Vec3, characters: &CharacterView) -> Option<(&CharacterSnapshot, f32)> {
    let mut best: Option<(&CharacterSnapshot, f32)> = None;
    for character in characters.iter().filter(|character| character.alive) {
        let distance = origin.distance(character.position);
        match best {
            Some((_, closest)) if closest <= distance => {}
            _ => best = Some((character, distance)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use skirmish_core::{ClientId, SpeedTier};

    fn character(id: u32, position: Vec3, alive: bool) -> CharacterSnapshot {
        CharacterSnapshot {
            id: CharacterId::new(id),
            owner: ClientId::new(id),
            position,
            orientation: Quat::IDENTITY,
            speed_tier: SpeedTier::Idle,
            is_dashing: false,
            health: if alive { 100.0 } else { 0.0 },
            max_health: 100.0,
            stamina: 100.0,
            max_stamina: 100.0,
            dash_cost: 25.0,
            alive,
        }
    }

    #[test]
    fn nearest_skips_dead_characters() {
        let view = CharacterView::from_snapshots(vec![
            character(0, Vec3::new(1.0, 0.0, 0.0), false),
            character(1, Vec3::new(4.0, 0.0, 0.0), true),
            character(2, Vec3::new(6.0, 0.0, 0.0), true),
        ]);
        let (nearest, distance) = nearest_living(Vec3::ZERO, &view).expect("target");
        assert_eq!(nearest.id, CharacterId::new(1));
        assert_eq!(distance, 4.0);
    }

    #[test]
    fn nearest_is_none_without_living_characters() {
        let view = CharacterView::from_snapshots(vec![character(0, Vec3::ONE, false)]);
        assert!(nearest_living(Vec3::ZERO, &view).is_none());
    }

    #[test]
    fn sampled_goals_stay_inside_the_patrol_disc() {
        let mut pursuit = Pursuit::new(PursuitTuning::default());
        let home = Vec3::new(3.0, 1.5, -2.0);
        for _ in 0..256 {
            let goal = pursuit.sample_goal(home);
            assert_eq!(goal.y, home.y);
            assert!(goal.distance(home) <= 10.0 + 1e-4);
        }
    }

    #[test]
    fn same_seed_samples_same_goals() {
        let mut first = Pursuit::new(PursuitTuning::default());
        let mut second = Pursuit::new(PursuitTuning::default());
        for _ in 0..8 {
            assert_eq!(first.sample_goal(Vec3::ZERO), second.sample_goal(Vec3::ZERO));
        }
    }
}
