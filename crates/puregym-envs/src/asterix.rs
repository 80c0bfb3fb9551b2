//! MinAtar-style Asterix environment.
//!
//! The player moves inside rows 1..=8 of a 10x10 grid while entities sweep
//! across one row each, spawned on a timer at either edge. Touching gold
//! scores +1 and consumes it; touching an enemy ends the episode. Spawn and
//! movement timers shorten over time when ramping is enabled.
//!
//! The step decomposes into pure phases (`step_spawn`, `step_agent`,
//! `step_entities`, `step_timers`) so faults localize in parity runs.

use std::collections::HashMap;

use ndarray::{Array3, ArrayD, IxDyn};
use rand::Rng;

use puregym::env::{scalar_field, Environment, StateFields, StepInfo, Transition};
use puregym::rng::Key;
use puregym::spaces::{Box as BoxSpace, Dict, Discrete, DynSpace};
use puregym::{GymError, Result};

/// Grid side length
pub const SIZE: i32 = 10;
/// Observation channels: player, enemy, trail, gold
pub const CHANNELS: usize = 4;
/// Actions: noop, left, up, right, down
pub const NUM_ACTIONS: usize = 5;
/// One entity slot per interior row
pub const NUM_SLOTS: usize = 8;

const INIT_SPAWN_SPEED: u32 = 10;
const INIT_MOVE_SPEED: u32 = 5;
const RAMP_INTERVAL: u32 = 100;

/// A moving entity occupying one interior row
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entity {
    pub x: i32,
    pub y: i32,
    pub moving_right: bool,
    pub gold: bool,
}

/// MinAtar-style Asterix
pub struct Asterix {
    ramping: bool,
    max_steps_in_episode: u32,
}

/// Asterix episode state
#[derive(Clone, Debug, PartialEq)]
pub struct AsterixState {
    pub player_x: i32,
    pub player_y: i32,
    /// Slot `i` covers row `i + 1`; `None` while the row is empty
    pub entities: [Option<Entity>; NUM_SLOTS],
    pub spawn_speed: u32,
    pub spawn_timer: u32,
    pub move_speed: u32,
    pub move_timer: u32,
    pub ramp_timer: u32,
    pub ramp_index: u32,
    pub time: u32,
    pub terminal: bool,
}

impl StateFields for AsterixState {
    fn fields(&self) -> HashMap<String, ArrayD<f32>> {
        // Entities flatten to an [8, 4] array of (x, y, moving_right, gold);
        // empty slots encode as (-1, -1, 0, 0).
        let mut entities = ArrayD::from_elem(IxDyn(&[NUM_SLOTS, 4]), 0.0f32);
        for (slot, entity) in self.entities.iter().enumerate() {
            match entity {
                Some(e) => {
                    entities[[slot, 0]] = e.x as f32;
                    entities[[slot, 1]] = e.y as f32;
                    entities[[slot, 2]] = e.moving_right as u8 as f32;
                    entities[[slot, 3]] = e.gold as u8 as f32;
                }
                None => {
                    entities[[slot, 0]] = -1.0;
                    entities[[slot, 1]] = -1.0;
                }
            }
        }
        HashMap::from([
            ("player_x".to_string(), scalar_field(self.player_x as f32)),
            ("player_y".to_string(), scalar_field(self.player_y as f32)),
            ("entities".to_string(), entities),
            ("spawn_speed".to_string(), scalar_field(self.spawn_speed as f32)),
            ("spawn_timer".to_string(), scalar_field(self.spawn_timer as f32)),
            ("move_speed".to_string(), scalar_field(self.move_speed as f32)),
            ("move_timer".to_string(), scalar_field(self.move_timer as f32)),
            ("ramp_timer".to_string(), scalar_field(self.ramp_timer as f32)),
            ("ramp_index".to_string(), scalar_field(self.ramp_index as f32)),
            ("time".to_string(), scalar_field(self.time as f32)),
            ("terminal".to_string(), scalar_field(self.terminal as u8 as f32)),
        ])
    }
}

/// Spawn an entity if the spawn timer has expired.
///
/// Draw order is fixed (side, gold, then slot among free slots in row order)
/// so a reference implementation can consume the identical key.
pub fn step_spawn(state: &AsterixState, key: Key) -> AsterixState {
    let mut next = state.clone();
    if next.spawn_timer != 0 {
        return next;
    }
    next.spawn_timer = next.spawn_speed;

    let free: Vec<usize> = (0..NUM_SLOTS)
        .filter(|&slot| next.entities[slot].is_none())
        .collect();
    if free.is_empty() {
        return next;
    }

    let mut key = key;
    let moving_right = key.gen_range(0..2) == 1;
    let gold = key.gen_range(0..3) == 0;
    let slot = free[key.gen_range(0..free.len())];
    next.entities[slot] = Some(Entity {
        x: if moving_right { 0 } else { SIZE - 1 },
        y: slot as i32 + 1,
        moving_right,
        gold,
    });
    next
}

/// Remove any entity sharing the player's cell; gold scores, enemies kill
fn resolve_collisions(state: &mut AsterixState) -> f32 {
    let mut reward = 0.0;
    for slot in 0..NUM_SLOTS {
        if let Some(e) = state.entities[slot] {
            if e.x == state.player_x && e.y == state.player_y {
                if e.gold {
                    state.entities[slot] = None;
                    reward += 1.0;
                } else {
                    state.terminal = true;
                }
            }
        }
    }
    reward
}

/// Move the player and resolve resulting collisions
pub fn step_agent(state: &AsterixState, action: usize) -> (AsterixState, f32) {
    let mut next = state.clone();
    match action {
        1 => next.player_x = (next.player_x - 1).max(0),
        2 => next.player_y = (next.player_y - 1).max(1),
        3 => next.player_x = (next.player_x + 1).min(SIZE - 1),
        4 => next.player_y = (next.player_y + 1).min(SIZE - 2),
        _ => {}
    }
    let reward = resolve_collisions(&mut next);
    (next, reward)
}

/// Advance entities if the move timer has expired, despawning at the edges
/// and resolving collisions after the shift
pub fn step_entities(state: &AsterixState) -> (AsterixState, f32) {
    let mut next = state.clone();
    if next.move_timer != 0 {
        return (next, 0.0);
    }
    next.move_timer = next.move_speed;
    for slot in 0..NUM_SLOTS {
        if let Some(e) = &mut next.entities[slot] {
            e.x += if e.moving_right { 1 } else { -1 };
            if e.x < 0 || e.x > SIZE - 1 {
                next.entities[slot] = None;
            }
        }
    }
    let reward = resolve_collisions(&mut next);
    (next, reward)
}

/// Tick the ramp and the spawn/move timers
pub fn step_timers(state: &AsterixState, ramping: bool) -> AsterixState {
    let mut next = state.clone();
    if ramping && (next.spawn_speed > 1 || next.move_speed > 1) {
        if next.ramp_timer > 0 {
            next.ramp_timer -= 1;
        } else {
            if next.move_speed > 1 && next.ramp_index % 2 == 1 {
                next.move_speed -= 1;
            } else if next.spawn_speed > 1 {
                next.spawn_speed -= 1;
            }
            next.ramp_index += 1;
            next.ramp_timer = RAMP_INTERVAL;
        }
    }
    // Saturate so a standalone call on an expired timer stays at zero
    // instead of wrapping; the composed step refreshes expired timers in
    // `step_spawn`/`step_entities` before this runs.
    next.spawn_timer = next.spawn_timer.saturating_sub(1);
    next.move_timer = next.move_timer.saturating_sub(1);
    next
}

impl Asterix {
    pub fn new() -> Self {
        Self {
            ramping: true,
            max_steps_in_episode: 1000,
        }
    }

    pub fn with_config(ramping: bool, max_steps_in_episode: u32) -> Self {
        Self {
            ramping,
            max_steps_in_episode,
        }
    }
}

impl Default for Asterix {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for Asterix {
    type State = AsterixState;

    fn name(&self) -> &'static str {
        "Asterix"
    }

    fn reset(&self, _key: Key) -> Result<(ArrayD<f32>, AsterixState)> {
        let state = AsterixState {
            player_x: 5,
            player_y: 5,
            entities: [None; NUM_SLOTS],
            spawn_speed: INIT_SPAWN_SPEED,
            spawn_timer: INIT_SPAWN_SPEED,
            move_speed: INIT_MOVE_SPEED,
            move_timer: INIT_MOVE_SPEED,
            ramp_timer: RAMP_INTERVAL,
            ramp_index: 0,
            time: 0,
            terminal: false,
        };
        Ok((self.get_obs(&state), state))
    }

    fn step(
        &self,
        key: Key,
        state: &AsterixState,
        action: usize,
    ) -> Result<Transition<AsterixState>> {
        if action >= NUM_ACTIONS {
            return Err(GymError::InvalidAction(format!(
                "action {action} out of range for Asterix ({NUM_ACTIONS} actions)"
            )));
        }
        if state.terminal {
            return Ok(Transition {
                obs: self.get_obs(state),
                state: state.clone(),
                reward: 0.0,
                done: true,
                info: StepInfo::new(0.0),
            });
        }

        let spawned = step_spawn(state, key);
        let (moved, reward_agent) = step_agent(&spawned, action);
        let (shifted, reward_entities) = step_entities(&moved);
        let mut next = step_timers(&shifted, self.ramping);
        next.time += 1;

        let reward = reward_agent + reward_entities;
        let done = self.is_terminal(&next);
        let info = StepInfo::new(self.discount(&next));
        Ok(Transition {
            obs: self.get_obs(&next),
            state: next,
            reward,
            done,
            info,
        })
    }

    fn get_obs(&self, state: &AsterixState) -> ArrayD<f32> {
        let mut obs = Array3::<f32>::zeros((SIZE as usize, SIZE as usize, CHANNELS));
        obs[[state.player_y as usize, state.player_x as usize, 0]] = 1.0;
        for entity in state.entities.iter().flatten() {
            let channel = if entity.gold { 3 } else { 1 };
            obs[[entity.y as usize, entity.x as usize, channel]] = 1.0;
            let trail_x = if entity.moving_right {
                entity.x - 1
            } else {
                entity.x + 1
            };
            if (0..SIZE).contains(&trail_x) {
                obs[[entity.y as usize, trail_x as usize, 2]] = 1.0;
            }
        }
        obs.into_dyn()
    }

    fn is_terminal(&self, state: &AsterixState) -> bool {
        state.terminal || state.time >= self.max_steps_in_episode
    }

    fn action_space(&self) -> Discrete {
        Discrete::new(NUM_ACTIONS)
    }

    fn observation_space(&self) -> BoxSpace {
        BoxSpace::unit(&[SIZE as usize, SIZE as usize, CHANNELS])
    }

    fn state_space(&self) -> Dict {
        let size = SIZE as usize;
        let steps = self.max_steps_in_episode as usize + 1;
        Dict::from_pairs(vec![
            ("player_x", DynSpace::Discrete(Discrete::new(size))),
            ("player_y", DynSpace::Discrete(Discrete::new(size))),
            (
                "entities",
                DynSpace::Box(BoxSpace::uniform(&[NUM_SLOTS, 4], -1.0, (SIZE - 1) as f32)),
            ),
            (
                "spawn_speed",
                DynSpace::Discrete(Discrete::new(INIT_SPAWN_SPEED as usize + 1)),
            ),
            (
                "spawn_timer",
                DynSpace::Discrete(Discrete::new(INIT_SPAWN_SPEED as usize + 1)),
            ),
            (
                "move_speed",
                DynSpace::Discrete(Discrete::new(INIT_MOVE_SPEED as usize + 1)),
            ),
            (
                "move_timer",
                DynSpace::Discrete(Discrete::new(INIT_MOVE_SPEED as usize + 1)),
            ),
            (
                "ramp_timer",
                DynSpace::Discrete(Discrete::new(RAMP_INTERVAL as usize + 1)),
            ),
            ("ramp_index", DynSpace::Discrete(Discrete::new(steps))),
            ("time", DynSpace::Discrete(Discrete::new(steps))),
            ("terminal", DynSpace::Discrete(Discrete::new(2))),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use puregym::spaces::Space;

    #[test]
    fn test_reset_layout() {
        let env = Asterix::new();
        let (obs, state) = env.reset(Key::from_seed(0)).unwrap();
        assert_eq!((state.player_x, state.player_y), (5, 5));
        assert!(state.entities.iter().all(|e| e.is_none()));
        assert_eq!(obs.shape(), &[10, 10, 4]);
        assert!(env.observation_space().contains(&obs));
        assert!(env.state_space().contains(&state.fields()));
    }

    #[test]
    fn test_player_movement_clamps() {
        let env = Asterix::new();
        let (_obs, mut state) = env.reset(Key::from_seed(0)).unwrap();
        state.player_x = 0;
        state.player_y = 1;
        let (next, _) = step_agent(&state, 1);
        assert_eq!(next.player_x, 0);
        let (next, _) = step_agent(&state, 2);
        assert_eq!(next.player_y, 1);

        state.player_x = 9;
        state.player_y = 8;
        let (next, _) = step_agent(&state, 3);
        assert_eq!(next.player_x, 9);
        let (next, _) = step_agent(&state, 4);
        assert_eq!(next.player_y, 8);
    }

    #[test]
    fn test_spawn_waits_for_timer() {
        let env = Asterix::new();
        let (_obs, state) = env.reset(Key::from_seed(0)).unwrap();
        let spawned = step_spawn(&state, Key::from_seed(1));
        // Fresh episode, timer still counting down
        assert!(spawned.entities.iter().all(|e| e.is_none()));

        let mut ready = state.clone();
        ready.spawn_timer = 0;
        let spawned = step_spawn(&ready, Key::from_seed(1));
        assert_eq!(spawned.entities.iter().flatten().count(), 1);
        assert_eq!(spawned.spawn_timer, spawned.spawn_speed);
        let entity = spawned.entities.iter().flatten().next().unwrap();
        assert!(entity.x == 0 || entity.x == 9);
        assert!((1..=8).contains(&entity.y));
    }

    #[test]
    fn test_gold_pickup_scores() {
        let env = Asterix::new();
        let (_obs, mut state) = env.reset(Key::from_seed(0)).unwrap();
        state.entities[4] = Some(Entity {
            x: 4,
            y: 5,
            moving_right: true,
            gold: true,
        });
        // Player at (5, 5) moves left onto the gold
        let (next, reward) = step_agent(&state, 1);
        assert_eq!(reward, 1.0);
        assert!(next.entities[4].is_none());
        assert!(!next.terminal);
    }

    #[test]
    fn test_enemy_contact_terminates() {
        let env = Asterix::new();
        let (_obs, mut state) = env.reset(Key::from_seed(0)).unwrap();
        state.entities[4] = Some(Entity {
            x: 5,
            y: 5,
            moving_right: false,
            gold: false,
        });
        let t = env.step(Key::from_seed(1), &state, 0).unwrap();
        assert!(t.done);
        assert!(t.state.terminal);
        assert_eq!(t.reward, 0.0);
    }

    #[test]
    fn test_entities_despawn_at_edges() {
        let (_obs, mut state) = Asterix::new().reset(Key::from_seed(0)).unwrap();
        state.entities[0] = Some(Entity {
            x: 9,
            y: 1,
            moving_right: true,
            gold: false,
        });
        state.move_timer = 0;
        let (next, reward) = step_entities(&state);
        assert_eq!(reward, 0.0);
        assert!(next.entities[0].is_none());
        assert_eq!(next.move_timer, next.move_speed);
    }

    #[test]
    fn test_ramping_shortens_timers() {
        let (_obs, mut state) = Asterix::new().reset(Key::from_seed(0)).unwrap();
        state.ramp_timer = 0;
        let next = step_timers(&state, true);
        assert_eq!(next.spawn_speed, INIT_SPAWN_SPEED - 1);
        assert_eq!(next.ramp_index, 1);
        assert_eq!(next.ramp_timer, RAMP_INTERVAL);

        let frozen = step_timers(&state, false);
        assert_eq!(frozen.spawn_speed, INIT_SPAWN_SPEED);
        assert_eq!(frozen.ramp_timer, 0);
    }

    #[test]
    fn test_timers_saturate_at_zero() {
        let env = Asterix::with_config(false, 1000);
        let mut key = Key::from_seed(3);
        let (next, key_reset) = key.split();
        key = next;
        let (_obs, mut state) = env.reset(key_reset).unwrap();
        // Walk until the spawn timer naturally hits zero.
        while state.spawn_timer != 0 {
            let (next, key_step) = key.split();
            key = next;
            state = env.step(key_step, &state, 0).unwrap().state;
        }
        // A standalone tick on the expired timer must not wrap.
        let ticked = step_timers(&state, false);
        assert_eq!(ticked.spawn_timer, 0);

        let mut expired = state.clone();
        expired.move_timer = 0;
        let ticked = step_timers(&expired, false);
        assert_eq!(ticked.move_timer, 0);
    }

    #[test]
    fn test_step_is_deterministic() {
        let env = Asterix::new();
        let (_obs, mut state) = env.reset(Key::from_seed(0)).unwrap();
        state.spawn_timer = 0; // force a stochastic spawn this step
        let a = env.step(Key::from_seed(9), &state, 3).unwrap();
        let b = env.step(Key::from_seed(9), &state, 3).unwrap();
        assert_eq!(a.state, b.state);
        assert_eq!(a.obs, b.obs);
        assert_eq!(a.reward, b.reward);
    }

    #[test]
    fn test_states_stay_in_space() {
        let env = Asterix::new();
        let mut key = Key::from_seed(17);
        let (next, key_reset) = key.split();
        key = next;
        let (_obs, mut state) = env.reset(key_reset).unwrap();
        for _ in 0..200 {
            let (next, key_step, key_action) = key.split3();
            key = next;
            let mut key_action = key_action;
            let action = env.action_space().sample(&mut key_action);
            let t = env.step(key_step, &state, action).unwrap();
            assert!(env.state_space().contains(&t.state.fields()));
            assert!(env.observation_space().contains(&t.obs));
            if t.done {
                break;
            }
            state = t.state;
        }
    }
}
