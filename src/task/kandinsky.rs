//! Shape/color pattern tasks over ternary attribute worlds.
//!
//! A figure carries one shape and one color attribute per object; the
//! classifiers look at agreement patterns (all-same / all-different / exactly
//! one pair) within each attribute channel. Each builder ships the combinator
//! matrices its consumers apply on top of per-object predictions.

use crate::logic::{and_gate, equality_gate, or_gate};
use crate::matrix::WorldsQueries;
use crate::world::WorldTable;

use super::{Gate, TableBundle};

/// Agreement class of three attribute values: 0 = all different, 1 = exactly
/// one pair, 2 = all the same.
fn agreement_class(a: u8, b: u8, c: u8) -> usize {
    let same = a == b && a == c;
    let diff = a != b && a != c && b != c;
    if same {
        2
    } else if diff {
        0
    } else {
        1
    }
}

/// Three ternary attributes classified by agreement; columns =
/// (all-different, one-pair, all-same).
///
/// Gates: "and" = three-way agreement over the per-figure classes (27×2),
/// "or" = two-bit disjunction (4×2).
pub(super) fn mini_patterns(table: &WorldTable) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), 3);
    for (w, world) in table.iter().enumerate() {
        wq.set(w, agreement_class(world[0], world[1], world[2]), 1.0);
    }
    let gates = vec![
        Gate {
            name: "and",
            matrix: equality_gate(3, 3),
        },
        Gate {
            name: "or",
            matrix: or_gate(2),
        },
    ];
    TableBundle::with_gates(wq, gates)
}

/// Three shapes plus three colors; the two channels are classified
/// independently and combined as `3 * shape_class + color_class`, giving a
/// one-hot row over 9 pattern columns.
///
/// Gate: "and-or" = three-way agreement over 9-valued per-figure pattern
/// predictions (729×2).
pub(super) fn patterns(table: &WorldTable) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), 9);
    for (w, world) in table.iter().enumerate() {
        let shape_class = agreement_class(world[0], world[1], world[2]);
        let color_class = agreement_class(world[3], world[4], world[5]);
        wq.set(w, 3 * shape_class + color_class, 1.0);
    }
    let gates = vec![Gate {
        name: "and-or",
        matrix: equality_gate(3, 9),
    }];
    TableBundle::with_gates(wq, gates)
}

/// Columns (absent, present): weight 1 in column 1 iff any of the three
/// objects is shape 0 with color 0.
///
/// Gate: "and" = three-bit conjunction (8×2).
pub(super) fn red_triangle(table: &WorldTable) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), 2);
    for (w, world) in table.iter().enumerate() {
        let hit = (0..3).any(|i| world[i] == 0 && world[i + 3] == 0);
        wq.set(w, if hit { 1 } else { 0 }, 1.0);
    }
    let gates = vec![Gate {
        name: "and",
        matrix: and_gate(3),
    }];
    TableBundle::with_gates(wq, gates)
}

/// Pairwise-relation task over four shapes and four colors; columns
/// (no-pairing, pairing).
///
/// Three candidate pairings of the four objects are tested: (12)(34),
/// (13)(24), (14)(23). An indicator fires when both pairs match in shape, the
/// two pairs differ in shape from each other, and exactly one of the two
/// pairs agrees in color. Column 1 iff any indicator fires.
///
/// Gate: "and" = three-bit conjunction (8×2).
pub(super) fn base(table: &WorldTable) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), 2);
    for (w, world) in table.iter().enumerate() {
        let (s, c) = world.split_at(4);

        let pairing = |i: usize, j: usize, k: usize, cross: usize| {
            let shapes = s[0] == s[i] && s[j] == s[k];
            let colors_odd = (c[0] == c[i]) != (c[j] == c[k]);
            shapes && colors_odd && s[0] != s[cross]
        };

        // (12)(34) with cross-check against object 3; (13)(24) and (14)(23)
        // cross-check against object 2.
        let p0 = pairing(1, 2, 3, 2);
        let p1 = pairing(2, 1, 3, 1);
        let p2 = pairing(3, 1, 2, 1);

        wq.set(w, if p0 || p1 || p2 { 1 } else { 0 }, 1.0);
    }
    let gates = vec![Gate {
        name: "and",
        matrix: and_gate(3),
    }];
    TableBundle::with_gates(wq, gates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::WorldSpace;

    fn attributes(n_values: usize, n_concepts: usize) -> WorldTable {
        WorldTable::enumerate(WorldSpace::uniform(n_values, n_concepts).unwrap())
    }

    #[test]
    fn agreement_class_covers_all_patterns() {
        assert_eq!(agreement_class(1, 1, 1), 2);
        assert_eq!(agreement_class(0, 1, 2), 0);
        assert_eq!(agreement_class(0, 0, 1), 1);
        assert_eq!(agreement_class(0, 1, 0), 1);
        assert_eq!(agreement_class(1, 0, 0), 1);
    }

    #[test]
    fn mini_patterns_shape_and_counts() {
        let wq = mini_patterns(&attributes(3, 3)).worlds_queries;
        assert_eq!(wq.shape(), (27, 3));
        assert!(wq.is_one_hot());

        // 3 all-same worlds, 6 all-different, the remaining 18 pair up.
        let count = |q: usize| (0..27).filter(|&w| wq.get(w, q) == 1.0).count();
        assert_eq!(count(0), 6);
        assert_eq!(count(1), 18);
        assert_eq!(count(2), 3);
    }

    #[test]
    fn mini_patterns_gates() {
        let bundle = mini_patterns(&attributes(3, 3));
        assert_eq!(bundle.gates.len(), 2);
        assert_eq!(bundle.gates[0].name, "and");
        assert_eq!(bundle.gates[0].matrix.shape(), (27, 2));
        assert_eq!(bundle.gates[1].name, "or");
        assert_eq!(bundle.gates[1].matrix.shape(), (4, 2));
    }

    #[test]
    fn patterns_combines_channel_classes() {
        let table = attributes(3, 6);
        let wq = patterns(&table).worlds_queries;
        assert_eq!(wq.shape(), (729, 9));
        assert!(wq.is_one_hot());

        let space = table.space();
        // Shapes all same (class 2), colors all different (class 0) -> 3*2+0.
        let w = space.index_of(&[1, 1, 1, 0, 1, 2]).unwrap();
        assert_eq!(wq.get(w, 6), 1.0);
        // Shapes pair (class 1), colors all same (class 2) -> 3*1+2.
        let w = space.index_of(&[0, 0, 2, 1, 1, 1]).unwrap();
        assert_eq!(wq.get(w, 5), 1.0);
    }

    #[test]
    fn red_triangle_detects_the_marked_object() {
        let table = attributes(3, 6);
        let wq = red_triangle(&table).worlds_queries;
        assert_eq!(wq.shape(), (729, 2));
        assert!(wq.is_one_hot());

        let space = table.space();
        // Object 2 is shape 0 with color 0.
        let w = space.index_of(&[1, 0, 2, 2, 0, 1]).unwrap();
        assert_eq!(wq.row(w), &[0.0, 1.0]);
        // Shape 0 never aligned with color 0.
        let w = space.index_of(&[0, 1, 2, 1, 0, 0]).unwrap();
        assert_eq!(wq.row(w), &[1.0, 0.0]);
    }

    #[test]
    fn base_matched_pairing_fires() {
        let table = attributes(3, 8);
        let wq = base(&table).worlds_queries;
        assert_eq!(wq.shape(), (6561, 2));
        assert!(wq.is_one_hot());

        let space = table.space();
        // (12) share shape 0, (34) share shape 1; colors equal in the first
        // pair only -> odd parity -> pairing indicator p0 fires.
        let w = space.index_of(&[0, 0, 1, 1, 2, 2, 0, 1]).unwrap();
        assert_eq!(wq.row(w), &[0.0, 1.0]);

        // Same shapes but both pairs agree in color -> even parity -> no fire.
        let w = space.index_of(&[0, 0, 1, 1, 2, 2, 0, 0]).unwrap();
        assert_eq!(wq.row(w), &[1.0, 0.0]);

        // All four objects share a shape: cross-pair mismatch fails everywhere.
        let w = space.index_of(&[1, 1, 1, 1, 0, 1, 0, 1]).unwrap();
        assert_eq!(wq.row(w), &[1.0, 0.0]);
    }

    #[test]
    fn base_cross_pairings_fire_too() {
        let table = attributes(3, 8);
        let wq = base(&table).worlds_queries;
        let space = table.space();
        // (13)(24): s = (0,1,0,1); colors equal in the (13) pair only.
        let w = space.index_of(&[0, 1, 0, 1, 2, 0, 2, 1]).unwrap();
        assert_eq!(wq.row(w), &[0.0, 1.0]);
        // (14)(23): s = (0,1,1,0); colors equal in the (23) pair only.
        let w = space.index_of(&[0, 1, 1, 0, 0, 2, 2, 1]).unwrap();
        assert_eq!(wq.row(w), &[0.0, 1.0]);
    }
}
