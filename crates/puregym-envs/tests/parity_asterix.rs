//! Asterix parity suite: functional candidate vs mutable reference.
//!
//! Entity spawns are stochastic, so this also exercises shared-key draw
//! ordering between the two implementations.

use puregym::env::{Environment, StateFields};
use puregym::parity::{run_parity, ParityConfig, ReferenceEnv};
use puregym::rng::Key;
use puregym::spaces::Space;
use puregym_envs::action_map::asterix_action;
use puregym_envs::reference::RefAsterix;
use puregym_envs::Asterix;

const NUM_EPISODES: usize = 10;
const NUM_STEPS: usize = 100;
const TOLERANCE: f32 = 1e-4;

fn config() -> ParityConfig {
    ParityConfig {
        num_episodes: NUM_EPISODES,
        num_steps: NUM_STEPS,
        tolerance: TOLERANCE,
    }
}

#[test]
fn test_step() {
    let env = Asterix::new();
    let mut reference = RefAsterix::new(true);
    run_parity(
        &env,
        &mut reference,
        asterix_action,
        Key::from_seed(0),
        &config(),
    )
    .unwrap();
}

#[test]
fn test_step_without_ramping() {
    let env = Asterix::with_config(false, 1000);
    let mut reference = RefAsterix::new(false);
    run_parity(
        &env,
        &mut reference,
        asterix_action,
        Key::from_seed(5),
        &config(),
    )
    .unwrap();
}

#[test]
fn test_get_obs() {
    let env = Asterix::new();
    let mut reference = RefAsterix::new(true);
    let mut key = Key::from_seed(13);

    for _episode in 0..NUM_EPISODES {
        let (next, key_reset) = key.split();
        key = next;
        reference.reset(key_reset.clone());
        let (_obs, mut state) = env.reset(key_reset).unwrap();

        for _step in 0..NUM_STEPS {
            let (next, key_step, key_action) = key.split3();
            key = next;
            let mut key_action = key_action;
            let action = env.action_space().sample(&mut key_action);

            let (_reward_ref, done_ref) = reference.act(key_step.clone(), asterix_action(action));
            let transition = env.step(key_step, &state, action).unwrap();
            state = transition.state;

            assert_eq!(env.get_obs(&state), reference.obs());
            if done_ref {
                break;
            }
        }
    }
}

#[test]
fn test_reset() {
    let env = Asterix::new();
    let mut key = Key::from_seed(21);
    for _ in 0..NUM_EPISODES {
        let (next, key_reset) = key.split();
        key = next;
        let (obs, state) = env.reset(key_reset).unwrap();
        assert!(env.observation_space().contains(&obs));
        assert!(env.state_space().contains(&state.fields()));
    }
}
