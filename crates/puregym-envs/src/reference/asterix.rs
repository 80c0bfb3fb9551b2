//! Mutable reference implementation of Asterix.

use std::collections::HashMap;

use ndarray::{Array3, ArrayD, IxDyn};
use rand::Rng;

use puregym::env::scalar_field;
use puregym::parity::ReferenceEnv;
use puregym::rng::Key;

const SIZE: i32 = 10;
const CHANNELS: usize = 4;
const NUM_SLOTS: usize = 8;
const INIT_SPAWN_SPEED: u32 = 10;
const INIT_MOVE_SPEED: u32 = 5;
const RAMP_INTERVAL: u32 = 100;
const MAX_STEPS: u32 = 1000;

#[derive(Clone, Copy, Debug)]
struct Slot {
    x: i32,
    y: i32,
    moving_right: bool,
    gold: bool,
}

/// Ground-truth Asterix with in-place state updates
#[derive(Clone, Debug)]
pub struct RefAsterix {
    player_x: i32,
    player_y: i32,
    entities: [Option<Slot>; NUM_SLOTS],
    spawn_speed: u32,
    spawn_timer: u32,
    move_speed: u32,
    move_timer: u32,
    ramp_timer: u32,
    ramp_index: u32,
    ramping: bool,
    time: u32,
    terminal: bool,
}

impl RefAsterix {
    pub fn new(ramping: bool) -> Self {
        Self {
            player_x: 5,
            player_y: 5,
            entities: [None; NUM_SLOTS],
            spawn_speed: INIT_SPAWN_SPEED,
            spawn_timer: INIT_SPAWN_SPEED,
            move_speed: INIT_MOVE_SPEED,
            move_timer: INIT_MOVE_SPEED,
            ramp_timer: RAMP_INTERVAL,
            ramp_index: 0,
            ramping,
            time: 0,
            terminal: false,
        }
    }

    // Same draw order as the functional env: side, gold, slot.
    fn spawn_entity(&mut self, key: &mut Key) {
        let free: Vec<usize> = (0..NUM_SLOTS)
            .filter(|&slot| self.entities[slot].is_none())
            .collect();
        if free.is_empty() {
            return;
        }
        let moving_right = key.gen_range(0..2) == 1;
        let gold = key.gen_range(0..3) == 0;
        let slot = free[key.gen_range(0..free.len())];
        self.entities[slot] = Some(Slot {
            x: if moving_right { 0 } else { SIZE - 1 },
            y: slot as i32 + 1,
            moving_right,
            gold,
        });
    }

    fn resolve_collisions(&mut self) -> f32 {
        let mut reward = 0.0;
        for slot in 0..NUM_SLOTS {
            if let Some(e) = self.entities[slot] {
                if e.x == self.player_x && e.y == self.player_y {
                    if e.gold {
                        self.entities[slot] = None;
                        reward += 1.0;
                    } else {
                        self.terminal = true;
                    }
                }
            }
        }
        reward
    }
}

impl ReferenceEnv for RefAsterix {
    fn reset(&mut self, _key: Key) {
        *self = Self::new(self.ramping);
    }

    fn act(&mut self, key: Key, action: usize) -> (f32, bool) {
        if self.terminal {
            return (0.0, true);
        }
        let mut key = key;
        let mut reward = 0.0;

        if self.spawn_timer == 0 {
            self.spawn_timer = self.spawn_speed;
            self.spawn_entity(&mut key);
        }

        match action {
            1 => self.player_x = (self.player_x - 1).max(0),
            2 => self.player_y = (self.player_y - 1).max(1),
            3 => self.player_x = (self.player_x + 1).min(SIZE - 1),
            4 => self.player_y = (self.player_y + 1).min(SIZE - 2),
            _ => {}
        }
        reward += self.resolve_collisions();

        if self.move_timer == 0 {
            self.move_timer = self.move_speed;
            for slot in 0..NUM_SLOTS {
                if let Some(e) = &mut self.entities[slot] {
                    e.x += if e.moving_right { 1 } else { -1 };
                    if e.x < 0 || e.x > SIZE - 1 {
                        self.entities[slot] = None;
                    }
                }
            }
            reward += self.resolve_collisions();
        }

        if self.ramping && (self.spawn_speed > 1 || self.move_speed > 1) {
            if self.ramp_timer > 0 {
                self.ramp_timer -= 1;
            } else {
                if self.move_speed > 1 && self.ramp_index % 2 == 1 {
                    self.move_speed -= 1;
                } else if self.spawn_speed > 1 {
                    self.spawn_speed -= 1;
                }
                self.ramp_index += 1;
                self.ramp_timer = RAMP_INTERVAL;
            }
        }
        self.spawn_timer = self.spawn_timer.saturating_sub(1);
        self.move_timer = self.move_timer.saturating_sub(1);
        self.time += 1;

        (reward, self.terminal || self.time >= MAX_STEPS)
    }

    fn obs(&self) -> ArrayD<f32> {
        let mut obs = Array3::<f32>::zeros((SIZE as usize, SIZE as usize, CHANNELS));
        obs[[self.player_y as usize, self.player_x as usize, 0]] = 1.0;
        for entity in self.entities.iter().flatten() {
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

    fn terminal(&self) -> bool {
        self.terminal
    }

    fn state_fields(&self) -> HashMap<String, ArrayD<f32>> {
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
