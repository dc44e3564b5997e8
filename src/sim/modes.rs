//! Level-mode state machine
//!
//! Three modes: the default lane grid, the planet field, and the comet trail.
//! Challenge modes run on a 20-second timer; every 40 seconds from the last
//! draw a new challenge is picked uniformly. Leaving a mode never clears the
//! field directly - it only lowers `mode_began`, and the tick loop drains the
//! old obstacles one-by-one as they scroll past before building the new set.

use rand::Rng;

use super::state::{Mode, ModeState};
use crate::tuning::Tuning;

/// Apply the timed transition rules for the current session second.
///
/// `now_s` comes from the host's monotonic session clock. Both rules are
/// plain elapsed-time comparisons; only a challenge draw restamps
/// `last_change_s`, so a challenge that started at T reverts at T+20 and the
/// next draw still lands at T+40.
pub fn check_mode_change<R: Rng>(modes: &mut ModeState, rng: &mut R, now_s: u64, tuning: &Tuning) {
    // Challenge modes expire after challenge_secs.
    if modes.mode != Mode::Default
        && modes.mode_began
        && now_s >= modes.last_change_s + tuning.challenge_secs
    {
        modes.last_mode = modes.mode;
        modes.mode = Mode::Default;
        modes.mode_began = false;
    }

    // A fresh challenge every mode_cycle_secs.
    if now_s >= modes.last_change_s + tuning.mode_cycle_secs {
        modes.mode = if rng.random_bool(0.5) {
            Mode::Planet
        } else {
            Mode::CometTrail
        };
        modes.last_mode = Mode::Default;
        modes.mode_began = false;
        modes.last_change_s = now_s;
    }
}
