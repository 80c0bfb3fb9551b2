//! MinAtar-style Breakout environment.
//!
//! A 10x10 grid with a paddle on the bottom row, a diagonally moving ball,
//! and three rows of bricks. The step is split into two pure sub-steps so
//! that a parity failure localizes to either the paddle/ball movement or the
//! collision resolution:
//!
//! - [`step_agent`]: paddle move, trail update, proposed ball position
//! - [`step_ball_brick`]: wall/brick/paddle collisions, reward, termination

use std::collections::HashMap;

use ndarray::{Array2, Array3, ArrayD};

use puregym::env::{scalar_field, Environment, StateFields, StepInfo, Transition};
use puregym::rng::Key;
use puregym::spaces::{Box as BoxSpace, Dict, Discrete, DynSpace};
use puregym::{GymError, Result};

use rand::Rng;

/// Grid side length
pub const SIZE: i32 = 10;
/// Observation channels: paddle, ball, trail, brick
pub const CHANNELS: usize = 4;
/// Actions: noop, left, right
pub const NUM_ACTIONS: usize = 3;

// Ball displacement per direction index: up-left, up-right, down-left,
// down-right.
const BALL_MOVES: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

// Direction after bouncing off a vertical wall, the ceiling, or a
// brick/paddle face, indexed by incoming direction.
const BOUNCE_X: [usize; 4] = [1, 0, 3, 2];
const BOUNCE_Y: [usize; 4] = [2, 3, 0, 1];
const BOUNCE_BOTH: [usize; 4] = [3, 2, 1, 0];

/// MinAtar-style Breakout
pub struct Breakout {
    max_steps_in_episode: u32,
}

/// Breakout episode state
#[derive(Clone, Debug, PartialEq)]
pub struct BreakoutState {
    pub ball_y: i32,
    pub ball_x: i32,
    /// Index into the diagonal direction table
    pub ball_dir: usize,
    /// Paddle column (always on the bottom row)
    pub pos: i32,
    /// 1.0 where a brick is alive
    pub brick_map: Array2<f32>,
    /// Set while the ball is inside a brick run so one run scores once
    pub strike: bool,
    pub last_y: i32,
    pub last_x: i32,
    pub time: u32,
    pub terminal: bool,
}

impl StateFields for BreakoutState {
    fn fields(&self) -> HashMap<String, ArrayD<f32>> {
        HashMap::from([
            ("ball_y".to_string(), scalar_field(self.ball_y as f32)),
            ("ball_x".to_string(), scalar_field(self.ball_x as f32)),
            ("ball_dir".to_string(), scalar_field(self.ball_dir as f32)),
            ("pos".to_string(), scalar_field(self.pos as f32)),
            ("brick_map".to_string(), self.brick_map.clone().into_dyn()),
            ("strike".to_string(), scalar_field(self.strike as u8 as f32)),
            ("last_y".to_string(), scalar_field(self.last_y as f32)),
            ("last_x".to_string(), scalar_field(self.last_x as f32)),
            ("time".to_string(), scalar_field(self.time as f32)),
            ("terminal".to_string(), scalar_field(self.terminal as u8 as f32)),
        ])
    }
}

/// Fresh three-row brick wall
fn full_brick_map() -> Array2<f32> {
    let mut bricks = Array2::zeros((SIZE as usize, SIZE as usize));
    for y in 1..4 {
        for x in 0..SIZE as usize {
            bricks[[y, x]] = 1.0;
        }
    }
    bricks
}

/// Paddle move plus proposed ball position.
///
/// Returns the intermediate state (paddle and trail updated) along with the
/// proposed `(x, y)` of the ball before collision resolution.
pub fn step_agent(state: &BreakoutState, action: usize) -> (BreakoutState, i32, i32) {
    let mut next = state.clone();
    match action {
        1 => next.pos = (next.pos - 1).max(0),
        2 => next.pos = (next.pos + 1).min(SIZE - 1),
        _ => {}
    }
    next.last_x = next.ball_x;
    next.last_y = next.ball_y;
    let (dx, dy) = BALL_MOVES[next.ball_dir];
    let new_x = next.ball_x + dx;
    let new_y = next.ball_y + dy;
    (next, new_x, new_y)
}

/// Resolve wall, brick, and paddle collisions for the proposed ball position.
///
/// Returns the post-transition state and the reward. The episode terminates
/// when the ball reaches the bottom row away from the paddle; a cleared wall
/// refills before the paddle check.
pub fn step_ball_brick(state: &BreakoutState, new_x: i32, new_y: i32) -> (BreakoutState, f32) {
    let mut next = state.clone();
    let mut reward = 0.0;
    let mut new_x = new_x;
    let mut new_y = new_y;
    let mut strike_toggle = false;

    if new_x < 0 || new_x > SIZE - 1 {
        new_x = new_x.clamp(0, SIZE - 1);
        next.ball_dir = BOUNCE_X[next.ball_dir];
    }

    if new_y < 0 {
        new_y = 0;
        next.ball_dir = BOUNCE_Y[next.ball_dir];
    } else if next.brick_map[[new_y as usize, new_x as usize]] == 1.0 {
        strike_toggle = true;
        if !next.strike {
            reward += 1.0;
            next.strike = true;
            next.brick_map[[new_y as usize, new_x as usize]] = 0.0;
            new_y = next.last_y;
            next.ball_dir = BOUNCE_BOTH[next.ball_dir];
        }
    } else if new_y == SIZE - 1 {
        if next.brick_map.iter().all(|&b| b == 0.0) {
            next.brick_map = full_brick_map();
        }
        if next.ball_x == next.pos {
            // Head-on paddle hit
            next.ball_dir = BOUNCE_BOTH[next.ball_dir];
            new_y = next.last_y;
        } else if new_x == next.pos {
            // Edge hit
            next.ball_dir = BOUNCE_Y[next.ball_dir];
            new_y = next.last_y;
        } else {
            next.terminal = true;
        }
    }

    if !strike_toggle {
        next.strike = false;
    }
    next.ball_x = new_x;
    next.ball_y = new_y;
    (next, reward)
}

impl Breakout {
    pub fn new() -> Self {
        Self {
            max_steps_in_episode: 1000,
        }
    }

    pub fn with_max_steps(max_steps_in_episode: u32) -> Self {
        Self {
            max_steps_in_episode,
        }
    }
}

impl Default for Breakout {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for Breakout {
    type State = BreakoutState;

    fn name(&self) -> &'static str {
        "Breakout"
    }

    fn reset(&self, key: Key) -> Result<(ArrayD<f32>, BreakoutState)> {
        let mut key = key;
        // Ball launches from the left or right edge
        let (ball_x, ball_dir) = if key.gen_range(0..2) == 0 { (0, 2) } else { (9, 3) };
        let state = BreakoutState {
            ball_y: 3,
            ball_x,
            ball_dir,
            pos: 4,
            brick_map: full_brick_map(),
            strike: false,
            last_y: 3,
            last_x: ball_x,
            time: 0,
            terminal: false,
        };
        Ok((self.get_obs(&state), state))
    }

    fn step(
        &self,
        _key: Key,
        state: &BreakoutState,
        action: usize,
    ) -> Result<Transition<BreakoutState>> {
        if action >= NUM_ACTIONS {
            return Err(GymError::InvalidAction(format!(
                "action {action} out of range for Breakout ({NUM_ACTIONS} actions)"
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

        let (mid, new_x, new_y) = step_agent(state, action);
        let (mut next, reward) = step_ball_brick(&mid, new_x, new_y);
        next.time += 1;

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

    fn get_obs(&self, state: &BreakoutState) -> ArrayD<f32> {
        let mut obs = Array3::<f32>::zeros((SIZE as usize, SIZE as usize, CHANNELS));
        obs[[SIZE as usize - 1, state.pos as usize, 0]] = 1.0;
        obs[[state.ball_y as usize, state.ball_x as usize, 1]] = 1.0;
        obs[[state.last_y as usize, state.last_x as usize, 2]] = 1.0;
        for ((y, x), &brick) in state.brick_map.indexed_iter() {
            obs[[y, x, 3]] = brick;
        }
        obs.into_dyn()
    }

    fn is_terminal(&self, state: &BreakoutState) -> bool {
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
        Dict::from_pairs(vec![
            ("ball_y", DynSpace::Discrete(Discrete::new(size))),
            ("ball_x", DynSpace::Discrete(Discrete::new(size))),
            ("ball_dir", DynSpace::Discrete(Discrete::new(4))),
            ("pos", DynSpace::Discrete(Discrete::new(size))),
            ("brick_map", DynSpace::Box(BoxSpace::unit(&[size, size]))),
            ("strike", DynSpace::Discrete(Discrete::new(2))),
            ("last_y", DynSpace::Discrete(Discrete::new(size))),
            ("last_x", DynSpace::Discrete(Discrete::new(size))),
            (
                "time",
                DynSpace::Discrete(Discrete::new(self.max_steps_in_episode as usize + 1)),
            ),
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
        let env = Breakout::new();
        let (obs, state) = env.reset(Key::from_seed(0)).unwrap();
        assert_eq!(state.ball_y, 3);
        assert!(state.ball_x == 0 || state.ball_x == 9);
        assert_eq!(state.pos, 4);
        assert_eq!(state.brick_map.sum(), 30.0);
        assert!(!state.terminal);
        assert_eq!(obs.shape(), &[10, 10, 4]);
        assert!(env.observation_space().contains(&obs));
        assert!(env.state_space().contains(&state.fields()));
    }

    #[test]
    fn test_paddle_moves_and_clamps() {
        let env = Breakout::new();
        let (_obs, state) = env.reset(Key::from_seed(0)).unwrap();

        let (left, _, _) = step_agent(&state, 1);
        assert_eq!(left.pos, 3);
        let (right, _, _) = step_agent(&state, 2);
        assert_eq!(right.pos, 5);

        let mut at_edge = state.clone();
        at_edge.pos = 0;
        let (clamped, _, _) = step_agent(&at_edge, 1);
        assert_eq!(clamped.pos, 0);
    }

    #[test]
    fn test_wall_bounce_reverses_x() {
        let (_obs, mut state) = Breakout::new().reset(Key::from_seed(0)).unwrap();
        state.ball_x = 0;
        state.ball_y = 5;
        state.ball_dir = 2; // moving down-left
        let (mid, new_x, new_y) = step_agent(&state, 0);
        assert_eq!((new_x, new_y), (-1, 6));
        let (next, reward) = step_ball_brick(&mid, new_x, new_y);
        assert_eq!(reward, 0.0);
        assert_eq!(next.ball_x, 0);
        assert_eq!(next.ball_dir, 3); // now down-right
    }

    #[test]
    fn test_brick_hit_scores_once() {
        let (_obs, mut state) = Breakout::new().reset(Key::from_seed(0)).unwrap();
        state.ball_x = 4;
        state.ball_y = 4;
        state.ball_dir = 0; // up-left, into the brick wall at y=3
        let (mid, new_x, new_y) = step_agent(&state, 0);
        let (next, reward) = step_ball_brick(&mid, new_x, new_y);
        assert_eq!(reward, 1.0);
        assert!(next.strike);
        assert_eq!(next.brick_map[[3, 3]], 0.0);
        // Ball bounced back to its previous row
        assert_eq!(next.ball_y, state.ball_y);
    }

    #[test]
    fn test_missed_ball_terminates() {
        let env = Breakout::new();
        let (_obs, mut state) = env.reset(Key::from_seed(0)).unwrap();
        state.ball_x = 8;
        state.ball_y = 8;
        state.ball_dir = 3; // down-right, paddle far away at 4
        let t = env.step(Key::from_seed(1), &state, 0).unwrap();
        assert!(t.done);
        assert!(t.state.terminal);
        assert_eq!(t.info.discount, 0.0);
    }

    #[test]
    fn test_paddle_save_bounces() {
        let env = Breakout::new();
        let (_obs, mut state) = env.reset(Key::from_seed(0)).unwrap();
        state.ball_x = 4;
        state.ball_y = 8;
        state.ball_dir = 3; // down-right onto the paddle column
        state.pos = 4;
        let t = env.step(Key::from_seed(1), &state, 0).unwrap();
        assert!(!t.done);
        assert_eq!(t.state.ball_y, 8); // bounced back to the previous row
    }

    #[test]
    fn test_step_is_deterministic() {
        let env = Breakout::new();
        let (_obs, state) = env.reset(Key::from_seed(2)).unwrap();
        let a = env.step(Key::from_seed(3), &state, 1).unwrap();
        let b = env.step(Key::from_seed(3), &state, 1).unwrap();
        assert_eq!(a.obs, b.obs);
        assert_eq!(a.state, b.state);
        assert_eq!(a.reward, b.reward);
        assert_eq!(a.done, b.done);
    }

    #[test]
    fn test_invalid_action_fails() {
        let env = Breakout::new();
        let (_obs, state) = env.reset(Key::from_seed(4)).unwrap();
        assert!(matches!(
            env.step(Key::from_seed(5), &state, 3),
            Err(GymError::InvalidAction(_))
        ));
    }

    #[test]
    fn test_time_limit_terminates() {
        let env = Breakout::with_max_steps(2);
        let (_obs, state) = env.reset(Key::from_seed(6)).unwrap();
        let t1 = env.step(Key::from_seed(7), &state, 0).unwrap();
        assert!(!t1.done);
        let t2 = env.step(Key::from_seed(8), &t1.state, 0).unwrap();
        assert!(t2.done);
        assert!(!t2.state.terminal); // hit the step budget, not a game over
    }
}
