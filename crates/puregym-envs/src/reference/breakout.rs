//! Mutable reference implementation of Breakout.

use std::collections::HashMap;

use ndarray::{Array2, Array3, ArrayD};
use rand::Rng;

use puregym::env::scalar_field;
use puregym::parity::ReferenceEnv;
use puregym::rng::Key;

const SIZE: i32 = 10;
const CHANNELS: usize = 4;
const MAX_STEPS: u32 = 1000;

const BALL_MOVES: [(i32, i32); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];
const BOUNCE_X: [usize; 4] = [1, 0, 3, 2];
const BOUNCE_Y: [usize; 4] = [2, 3, 0, 1];
const BOUNCE_BOTH: [usize; 4] = [3, 2, 1, 0];

/// Ground-truth Breakout with in-place state updates
#[derive(Clone, Debug)]
pub struct RefBreakout {
    ball_y: i32,
    ball_x: i32,
    ball_dir: usize,
    pos: i32,
    brick_map: Array2<f32>,
    strike: bool,
    last_y: i32,
    last_x: i32,
    time: u32,
    terminal: bool,
}

impl RefBreakout {
    pub fn new() -> Self {
        Self {
            ball_y: 3,
            ball_x: 0,
            ball_dir: 2,
            pos: 4,
            brick_map: Self::full_brick_map(),
            strike: false,
            last_y: 3,
            last_x: 0,
            time: 0,
            terminal: false,
        }
    }

    fn full_brick_map() -> Array2<f32> {
        let mut bricks = Array2::zeros((SIZE as usize, SIZE as usize));
        for y in 1..4 {
            for x in 0..SIZE as usize {
                bricks[[y, x]] = 1.0;
            }
        }
        bricks
    }

    /// Move the paddle, record the trail, and propose the next ball cell.
    /// Takes the reference's MinAtar action identifiers (1 = left, 3 = right).
    pub fn step_agent(&mut self, action: usize) -> (i32, i32) {
        match action {
            1 => self.pos = (self.pos - 1).max(0),
            3 => self.pos = (self.pos + 1).min(SIZE - 1),
            _ => {}
        }
        self.last_x = self.ball_x;
        self.last_y = self.ball_y;
        let (dx, dy) = BALL_MOVES[self.ball_dir];
        (self.ball_x + dx, self.ball_y + dy)
    }

    /// Resolve collisions for the proposed ball position, returning the reward
    pub fn step_ball_brick(&mut self, new_x: i32, new_y: i32) -> f32 {
        let mut reward = 0.0;
        let mut new_x = new_x;
        let mut new_y = new_y;
        let mut strike_toggle = false;

        if new_x < 0 || new_x > SIZE - 1 {
            new_x = new_x.clamp(0, SIZE - 1);
            self.ball_dir = BOUNCE_X[self.ball_dir];
        }

        if new_y < 0 {
            new_y = 0;
            self.ball_dir = BOUNCE_Y[self.ball_dir];
        } else if self.brick_map[[new_y as usize, new_x as usize]] == 1.0 {
            strike_toggle = true;
            if !self.strike {
                reward += 1.0;
                self.strike = true;
                self.brick_map[[new_y as usize, new_x as usize]] = 0.0;
                new_y = self.last_y;
                self.ball_dir = BOUNCE_BOTH[self.ball_dir];
            }
        } else if new_y == SIZE - 1 {
            if self.brick_map.iter().all(|&b| b == 0.0) {
                self.brick_map = Self::full_brick_map();
            }
            if self.ball_x == self.pos {
                self.ball_dir = BOUNCE_BOTH[self.ball_dir];
                new_y = self.last_y;
            } else if new_x == self.pos {
                self.ball_dir = BOUNCE_Y[self.ball_dir];
                new_y = self.last_y;
            } else {
                self.terminal = true;
            }
        }

        if !strike_toggle {
            self.strike = false;
        }
        self.ball_x = new_x;
        self.ball_y = new_y;
        reward
    }
}

impl Default for RefBreakout {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceEnv for RefBreakout {
    fn reset(&mut self, key: Key) {
        let mut key = key;
        let (ball_x, ball_dir) = if key.gen_range(0..2) == 0 { (0, 2) } else { (9, 3) };
        self.ball_y = 3;
        self.ball_x = ball_x;
        self.ball_dir = ball_dir;
        self.pos = 4;
        self.brick_map = Self::full_brick_map();
        self.strike = false;
        self.last_y = 3;
        self.last_x = ball_x;
        self.time = 0;
        self.terminal = false;
    }

    fn act(&mut self, _key: Key, action: usize) -> (f32, bool) {
        if self.terminal {
            return (0.0, true);
        }
        let (new_x, new_y) = self.step_agent(action);
        let reward = self.step_ball_brick(new_x, new_y);
        self.time += 1;
        (reward, self.terminal || self.time >= MAX_STEPS)
    }

    fn obs(&self) -> ArrayD<f32> {
        let mut obs = Array3::<f32>::zeros((SIZE as usize, SIZE as usize, CHANNELS));
        obs[[SIZE as usize - 1, self.pos as usize, 0]] = 1.0;
        obs[[self.ball_y as usize, self.ball_x as usize, 1]] = 1.0;
        obs[[self.last_y as usize, self.last_x as usize, 2]] = 1.0;
        for ((y, x), &brick) in self.brick_map.indexed_iter() {
            obs[[y, x, 3]] = brick;
        }
        obs.into_dyn()
    }

    fn terminal(&self) -> bool {
        self.terminal
    }

    fn state_fields(&self) -> HashMap<String, ArrayD<f32>> {
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
