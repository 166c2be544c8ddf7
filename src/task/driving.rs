//! Traffic-scene decision-tree tasks over binary flag worlds.
//!
//! Flags are scene observations (lights, signs, lanes, obstacles); the rules
//! are nested conditionals with three deliberate edge policies that must not
//! be "fixed": contradictory flag pairs leave a row all-zero (or go to an
//! explicit invalid column in the labeled variant), some outcomes assert two
//! correlated columns at once, and a scene with no evidence at all splits its
//! mass 0.5/0.5 over the two choices.

use crate::matrix::WorldsQueries;
use crate::world::WorldTable;

use super::TableBundle;

/// Forward/stop scene over 9 flags: tl_green, follow, clear, tl_red, t_sign,
/// ob1..ob4 (the four obstacle classes, OR-ed into one).
///
/// Columns: 0 = not-move, 1 = forward, 2 = no-stop, 3 = stop. Valid worlds
/// assert two correlated columns; contradictions (green with red, clear with
/// an obstacle, under any go-evidence) stay all-zero.
pub(super) fn forward_stop_full(table: &WorldTable) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), 4);
    for (w, world) in table.iter().enumerate() {
        let (tl_green, follow, clear) = (world[0], world[1], world[2]);
        let (tl_red, t_sign) = (world[3], world[4]);
        let obs = (world[5] + world[6] + world[7] + world[8]).min(1);
        classify_forward_stop(&mut wq, w, tl_green, follow, clear, tl_red, t_sign, obs);
    }
    TableBundle::table(wq)
}

/// Forward/stop scene over 6 flags: tl_green, follow, clear, tl_red, t_sign,
/// obs. Same rule and columns as [`forward_stop_full`] with the obstacle
/// classes pre-collapsed into one flag.
pub(super) fn forward_stop(table: &WorldTable) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), 4);
    for (w, world) in table.iter().enumerate() {
        let (tl_green, follow, clear) = (world[0], world[1], world[2]);
        let (tl_red, t_sign, obs) = (world[3], world[4], world[5]);
        classify_forward_stop(&mut wq, w, tl_green, follow, clear, tl_red, t_sign, obs);
    }
    TableBundle::table(wq)
}

/// The shared forward/stop rule. Go-evidence present: contradictions are
/// skipped entirely, stop-evidence wins over forward. No go-evidence: the
/// scene never moves, and stop/no-stop follows the stop-evidence.
#[allow(clippy::too_many_arguments)]
fn classify_forward_stop(
    wq: &mut WorldsQueries,
    w: usize,
    tl_green: u8,
    follow: u8,
    clear: u8,
    tl_red: u8,
    t_sign: u8,
    obs: u8,
) {
    if tl_green + follow + clear > 0 {
        if tl_green + tl_red == 2 || clear + obs == 2 {
            // Contradictory scene: no supervision mass at all.
        } else if tl_red + t_sign + obs > 0 {
            wq.set(w, 0, 1.0); // not-move
            wq.set(w, 3, 1.0); // stop
        } else {
            wq.set(w, 1, 1.0); // forward
            wq.set(w, 2, 1.0); // no-stop
        }
    } else {
        wq.set(w, 0, 1.0); // not-move
        if tl_red + t_sign + obs > 0 {
            wq.set(w, 3, 1.0); // stop
        } else {
            wq.set(w, 2, 1.0); // no-stop
        }
    }
}

/// Forward/stop scene over the same 6 flags, with contradictions routed to an
/// explicit invalid column instead of being dropped.
///
/// Columns: 0 = invalid, 1 = forward, 2 = stop, 3 = neither. Every world is
/// one-hot. Kept distinct from [`forward_stop`]: the two encodings feed
/// different downstream consumers.
pub(super) fn forward_stop_labeled(table: &WorldTable) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), 4);
    for (w, world) in table.iter().enumerate() {
        let (tl_green, follow, clear) = (world[0], world[1], world[2]);
        let (tl_red, t_sign, obs) = (world[3], world[4], world[5]);

        if tl_green + follow + clear > 0 {
            if tl_green + tl_red == 2 || clear + obs == 2 {
                wq.set(w, 0, 1.0); // invalid
            } else if tl_red + t_sign + obs > 0 {
                wq.set(w, 2, 1.0); // stop
            } else {
                wq.set(w, 1, 1.0); // forward
            }
        } else if tl_red + t_sign + obs > 0 {
            wq.set(w, 2, 1.0); // stop
        } else {
            wq.set(w, 3, 1.0); // neither
        }
    }
    TableBundle::table(wq)
}

/// Out-of-distribution ambulance knowledge for the forward/stop scene: lights
/// and signs are ignored, only the obstacle flag matters.
pub(super) fn forward_stop_ambulance(table: &WorldTable) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), 4);
    for (w, world) in table.iter().enumerate() {
        let obs = world[5];
        if obs > 0 {
            wq.set(w, 0, 1.0); // not-move
            wq.set(w, 3, 1.0); // stop
        } else {
            wq.set(w, 1, 1.0); // forward
            wq.set(w, 2, 1.0); // no-stop
        }
    }
    TableBundle::table(wq)
}

/// Left-turn scene over 7 flags: tl_red, no_left_lane, left_solid_line, obs,
/// left_lane, tl_green, follow.
///
/// Columns: 0 = not-move, 1 = move. Contradictions (green with red, or a
/// missing left lane while turn evidence is present) stay all-zero.
pub(super) fn left_turn(table: &WorldTable) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), 2);
    for (w, world) in table.iter().enumerate() {
        let (tl_red, no_left_lane, left_solid_line, obs) =
            (world[0], world[1], world[2], world[3]);
        let (left_lane, tl_green, follow) = (world[4], world[5], world[6]);

        if left_lane + tl_green + follow > 0 {
            if tl_green + tl_red == 2 || no_left_lane == 1 {
                // Contradictory scene.
            } else if tl_red + obs + left_solid_line > 0 {
                wq.set(w, 0, 1.0);
            } else {
                wq.set(w, 1, 1.0);
            }
        } else {
            wq.set(w, 0, 1.0);
        }
    }
    TableBundle::table(wq)
}

/// Left-lane-change scene over 6 flags: left_lane, tl_green, follow,
/// no_left_lane, obs, left_solid_line.
///
/// Columns: 0 = stay, 1 = change. A scene with no evidence at all splits
/// 0.5/0.5; no evidence means uniform belief over the choice, not "unknown".
pub(super) fn left_lane(table: &WorldTable) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), 2);
    for (w, world) in table.iter().enumerate() {
        let (left_lane, tl_green, follow) = (world[0], world[1], world[2]);
        let (no_left_lane, obs, left_solid_line) = (world[3], world[4], world[5]);

        if left_lane + tl_green + follow + no_left_lane + obs + left_solid_line == 0 {
            wq.set(w, 0, 0.5);
            wq.set(w, 1, 0.5);
        } else if left_lane + tl_green + follow > 0 {
            wq.set(w, 1, 1.0);
        } else {
            wq.set(w, 0, 1.0);
        }
    }
    TableBundle::table(wq)
}

/// Ambulance knowledge for the left-lane scene: with nothing barring the
/// lane, stay; otherwise change exactly when the left lane is seen.
pub(super) fn left_lane_ambulance(table: &WorldTable) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), 2);
    for (w, world) in table.iter().enumerate() {
        let left_lane = world[0];
        let (no_left_lane, obs) = (world[3], world[4]);

        if no_left_lane + obs == 0 {
            wq.set(w, 0, 1.0);
        } else if left_lane > 0 {
            wq.set(w, 1, 1.0);
        } else {
            wq.set(w, 0, 1.0);
        }
    }
    TableBundle::table(wq)
}

/// Right-lane-change scene over 6 flags: right_lane, tl_green, follow,
/// no_right_lane, obs, right_solid_line.
///
/// Columns: 0 = stay, 1 = change. Total ignorance splits 0.5/0.5; unlike the
/// left variant, restriction evidence inside the go branch forces "stay".
pub(super) fn right_lane(table: &WorldTable) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), 2);
    for (w, world) in table.iter().enumerate() {
        let (right_lane, tl_green, follow) = (world[0], world[1], world[2]);
        let (no_right_lane, obs, right_solid_line) = (world[3], world[4], world[5]);

        if right_lane + tl_green + follow + no_right_lane + obs + right_solid_line == 0 {
            wq.set(w, 0, 0.5);
            wq.set(w, 1, 0.5);
        } else if right_lane + tl_green + follow > 0 {
            if obs + right_solid_line + no_right_lane > 0 {
                wq.set(w, 0, 1.0);
            } else {
                wq.set(w, 1, 1.0);
            }
        } else {
            wq.set(w, 0, 1.0);
        }
    }
    TableBundle::table(wq)
}

/// Ambulance knowledge for the right-lane scene, mirroring
/// [`left_lane_ambulance`].
pub(super) fn right_lane_ambulance(table: &WorldTable) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), 2);
    for (w, world) in table.iter().enumerate() {
        let right_lane = world[0];
        let (no_right_lane, obs) = (world[3], world[4]);

        if no_right_lane + obs == 0 {
            wq.set(w, 0, 1.0);
        } else if right_lane > 0 {
            wq.set(w, 1, 1.0);
        } else {
            wq.set(w, 0, 1.0);
        }
    }
    TableBundle::table(wq)
}
