//! MinAtar action-set translation.
//!
//! The reference implementations speak MinAtar's canonical six-action set
//! (noop, left, up, right, down, fire). Each functional environment exposes
//! only the actions it actually uses, so the parity harness translates a
//! candidate action index through a pure lookup before feeding the reference.

/// Breakout exposes noop/left/right
pub const BREAKOUT_ACTION_MAP: [usize; 3] = [0, 1, 3];

/// Asterix exposes noop/left/up/right/down
pub const ASTERIX_ACTION_MAP: [usize; 5] = [0, 1, 2, 3, 4];

/// Translate a Breakout action index to its MinAtar identifier
pub fn breakout_action(action: usize) -> usize {
    BREAKOUT_ACTION_MAP[action]
}

/// Translate an Asterix action index to its MinAtar identifier
pub fn asterix_action(action: usize) -> usize {
    ASTERIX_ACTION_MAP[action]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakout_map_skips_vertical_actions() {
        assert_eq!(breakout_action(0), 0);
        assert_eq!(breakout_action(1), 1);
        assert_eq!(breakout_action(2), 3);
    }

    #[test]
    fn test_asterix_map_is_identity() {
        for a in 0..5 {
            assert_eq!(asterix_action(a), a);
        }
    }
}
