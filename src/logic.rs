//! Precomputed combinator (gate) matrices and their evaluation.
//!
//! A gate is a `(sub-worlds × 2)` table mapping every joint assignment of a
//! small variable group to a binary outcome. Rule evaluation over soft concept
//! predictions is explicit nested enumeration: walk the group's sub-worlds in
//! odometer order, take the joint probability of each, and accumulate it into
//! the gate's outcome columns. No broadcasting machinery required.

use crate::error::{LogicError, LogicResult};
use crate::matrix::WorldsQueries;
use crate::world::{WorldSpace, WorldTable};

// ---------------------------------------------------------------------------
// Gate constructors
// ---------------------------------------------------------------------------

/// OR over `n_bits` binary variables: the all-zero world maps to column 0,
/// every other world to column 1.
pub fn or_gate(n_bits: usize) -> WorldsQueries {
    let n_worlds = 1usize << n_bits;
    let mut gate = WorldsQueries::zeros(n_worlds, 2);
    gate.set(0, 0, 1.0);
    for w in 1..n_worlds {
        gate.set(w, 1, 1.0);
    }
    gate
}

/// AND over `n_bits` binary variables: only the all-ones world maps to
/// column 1.
pub fn and_gate(n_bits: usize) -> WorldsQueries {
    let n_worlds = 1usize << n_bits;
    let mut gate = WorldsQueries::zeros(n_worlds, 2);
    for w in 0..n_worlds - 1 {
        gate.set(w, 0, 1.0);
    }
    gate.set(n_worlds - 1, 1, 1.0);
    gate
}

/// All-equal over `n_vars` variables with `n_values` values each: worlds whose
/// components all agree map to column 1, the rest to column 0.
///
/// The Kandinsky auxiliary matrices are `equality_gate(3, 3)` (concept-level
/// agreement) and `equality_gate(3, 9)` (pattern-level agreement).
///
/// # Panics
///
/// Panics if either count is zero or the joint space overflows `usize`.
pub fn equality_gate(n_vars: usize, n_values: usize) -> WorldsQueries {
    let space = match WorldSpace::uniform(n_values, n_vars) {
        Ok(space) => space,
        Err(err) => panic!("invalid equality gate shape: {err}"),
    };
    let table = WorldTable::enumerate(space);
    let mut gate = WorldsQueries::zeros(table.len(), 2);
    for (w, world) in table.iter().enumerate() {
        let all_equal = world.iter().all(|&v| v == world[0]);
        gate.set(w, if all_equal { 1 } else { 0 }, 1.0);
    }
    gate
}

// ---------------------------------------------------------------------------
// Gate evaluation
// ---------------------------------------------------------------------------

/// Apply a gate to per-variable class distributions.
///
/// `dists` holds one probability vector per variable, all of the same length;
/// their joint (odometer-ordered) world space must match the gate's row count.
/// Returns one accumulated weight per gate column.
pub fn eval_gate(gate: &WorldsQueries, dists: &[&[f32]]) -> LogicResult<Vec<f32>> {
    let n_values = dists.first().map_or(0, |d| d.len());
    for (index, dist) in dists.iter().enumerate() {
        if dist.len() != n_values {
            return Err(LogicError::DistributionShape {
                index,
                len: dist.len(),
                expected: n_values,
            });
        }
    }
    let mut joint = 1usize;
    for _ in dists {
        joint = joint.saturating_mul(n_values);
    }
    if joint != gate.n_worlds() {
        return Err(LogicError::GateShape {
            expected: gate.n_worlds(),
            actual: joint,
        });
    }

    let mut out = vec![0.0f32; gate.n_queries()];
    let mut world = vec![0usize; dists.len()];
    for w in 0..gate.n_worlds() {
        let mut probability = 1.0f32;
        for (var, &value) in world.iter().enumerate() {
            probability *= dists[var][value];
        }
        for (q, slot) in out.iter_mut().enumerate() {
            *slot += probability * gate.get(w, q);
        }
        // Advance the odometer, last variable fastest.
        for slot in world.iter_mut().rev() {
            if *slot + 1 < n_values {
                *slot += 1;
                break;
            }
            *slot = 0;
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Driving concept layout
// ---------------------------------------------------------------------------

/// Number of probability entries in a flat driving concept vector: 21 binary
/// concepts stored as (negative, positive) pairs.
pub const CONCEPT_PROBS: usize = 42;

/// The OR gates the driving concept groups evaluate through.
#[derive(Debug, Clone)]
pub struct DrivingGates {
    pub or_two: WorldsQueries,
    pub or_three: WorldsQueries,
    pub or_four: WorldsQueries,
    pub or_six: WorldsQueries,
}

impl DrivingGates {
    pub fn new() -> Self {
        Self {
            or_two: or_gate(2),
            or_three: or_gate(3),
            or_four: or_gate(4),
            or_six: or_gate(6),
        }
    }
}

impl Default for DrivingGates {
    fn default() -> Self {
        Self::new()
    }
}

/// A borrowed view of a flat 42-probability concept vector with the fixed
/// scene layout: concepts 0..3 drive "forward", 3..9 drive "stop", 9..12
/// "no left", 12..15 "left", 15..18 "no right", 18..21 "right". Obstacle
/// classes (car, person, rider, other) are stop concepts 5..9.
#[derive(Debug, Clone, Copy)]
pub struct ConceptProbs<'a> {
    values: &'a [f32],
}

impl<'a> ConceptProbs<'a> {
    pub fn new(values: &'a [f32]) -> LogicResult<Self> {
        if values.len() != CONCEPT_PROBS {
            return Err(LogicError::ConceptShape {
                expected: CONCEPT_PROBS,
                actual: values.len(),
            });
        }
        Ok(Self { values })
    }

    /// The (negative, positive) probability pair of concept `index`.
    fn pair(&self, index: usize) -> &'a [f32] {
        &self.values[2 * index..2 * index + 2]
    }

    fn eval(&self, gate: &WorldsQueries, concepts: &[usize]) -> LogicResult<[f32; 2]> {
        let dists: Vec<&[f32]> = concepts.iter().map(|&c| self.pair(c)).collect();
        let out = eval_gate(gate, &dists)?;
        Ok([out[0], out[1]])
    }

    /// Any "may move forward" evidence: green light, follow, road clear.
    pub fn forward(&self, gates: &DrivingGates) -> LogicResult<[f32; 2]> {
        self.eval(&gates.or_three, &[0, 1, 2])
    }

    /// Any "must stop" evidence: red light, traffic sign, or any obstacle class.
    pub fn stop(&self, gates: &DrivingGates) -> LogicResult<[f32; 2]> {
        self.eval(&gates.or_six, &[3, 4, 5, 6, 7, 8])
    }

    /// Any obstacle on the road: car, person, rider, other.
    pub fn obstacle(&self, gates: &DrivingGates) -> LogicResult<[f32; 2]> {
        self.eval(&gates.or_four, &[5, 6, 7, 8])
    }

    /// Any "left change barred" evidence.
    pub fn no_left(&self, gates: &DrivingGates) -> LogicResult<[f32; 2]> {
        self.eval(&gates.or_three, &[9, 10, 11])
    }

    /// Any "left change allowed" evidence.
    pub fn left(&self, gates: &DrivingGates) -> LogicResult<[f32; 2]> {
        self.eval(&gates.or_three, &[12, 13, 14])
    }

    /// Any "right change barred" evidence.
    pub fn no_right(&self, gates: &DrivingGates) -> LogicResult<[f32; 2]> {
        self.eval(&gates.or_three, &[15, 16, 17])
    }

    /// Any "right change allowed" evidence.
    pub fn right(&self, gates: &DrivingGates) -> LogicResult<[f32; 2]> {
        self.eval(&gates.or_three, &[18, 19, 20])
    }

    /// No usable left lane: missing lane or a solid line (the first and third
    /// "no left" concepts, skipping the middle one).
    pub fn no_left_lane(&self, gates: &DrivingGates) -> LogicResult<[f32; 2]> {
        self.eval(&gates.or_two, &[9, 11])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_mass(bit: bool) -> [f32; 2] {
        if bit { [0.0, 1.0] } else { [1.0, 0.0] }
    }

    #[test]
    fn or_gate_shape_and_rows() {
        let gate = or_gate(4);
        assert_eq!(gate.shape(), (16, 2));
        assert_eq!(gate.row(0), &[1.0, 0.0]);
        for w in 1..16 {
            assert_eq!(gate.row(w), &[0.0, 1.0]);
        }
    }

    #[test]
    fn and_gate_only_last_world_fires() {
        let gate = and_gate(3);
        assert_eq!(gate.shape(), (8, 2));
        for w in 0..7 {
            assert_eq!(gate.row(w), &[1.0, 0.0]);
        }
        assert_eq!(gate.row(7), &[0.0, 1.0]);
    }

    #[test]
    fn equality_gate_counts() {
        let gate = equality_gate(3, 3);
        assert_eq!(gate.shape(), (27, 2));
        let agreeing: usize = (0..27).filter(|&w| gate.get(w, 1) == 1.0).count();
        assert_eq!(agreeing, 3);

        let nine = equality_gate(3, 9);
        assert_eq!(nine.shape(), (729, 2));
        assert_eq!((0..729).filter(|&w| nine.get(w, 1) == 1.0).count(), 9);
    }

    #[test]
    fn eval_gate_on_point_masses_matches_gate_rows() {
        let gate = or_gate(3);
        for bits in 0..8u8 {
            let a = point_mass(bits & 4 != 0);
            let b = point_mass(bits & 2 != 0);
            let c = point_mass(bits & 1 != 0);
            let out = eval_gate(&gate, &[&a, &b, &c]).unwrap();
            assert_eq!(out.as_slice(), gate.row(bits as usize));
        }
    }

    #[test]
    fn eval_gate_preserves_mass_on_uniform_inputs() {
        let gate = or_gate(6);
        let uniform = [0.5f32, 0.5];
        let dists: Vec<&[f32]> = (0..6).map(|_| uniform.as_slice()).collect();
        let out = eval_gate(&gate, &dists).unwrap();
        assert!((out[0] + out[1] - 1.0).abs() < 1e-6);
        assert!((out[0] - 1.0 / 64.0).abs() < 1e-6);
    }

    #[test]
    fn eval_gate_rejects_shape_mismatch() {
        let gate = or_gate(3);
        let pair = [0.5f32, 0.5];
        assert!(eval_gate(&gate, &[&pair, &pair]).is_err());
        let triple = [0.2f32, 0.3, 0.5];
        assert!(eval_gate(&gate, &[&pair, &pair, &triple]).is_err());
    }

    #[test]
    fn concept_probs_requires_full_layout() {
        assert!(ConceptProbs::new(&[0.0; 10]).is_err());
        let flat = [0.5f32; CONCEPT_PROBS];
        assert!(ConceptProbs::new(&flat).is_ok());
    }

    #[test]
    fn forward_group_fires_on_green_light() {
        // Concept 0 (green light) certain-positive, concepts 1..2 certain-negative.
        let mut flat = [0.0f32; CONCEPT_PROBS];
        for pair in 0..CONCEPT_PROBS / 2 {
            flat[2 * pair] = 1.0;
        }
        flat[0] = 0.0;
        flat[1] = 1.0;
        let concepts = ConceptProbs::new(&flat).unwrap();
        let gates = DrivingGates::new();
        assert_eq!(concepts.forward(&gates).unwrap(), [0.0, 1.0]);
        assert_eq!(concepts.stop(&gates).unwrap(), [1.0, 0.0]);
        assert_eq!(concepts.obstacle(&gates).unwrap(), [1.0, 0.0]);
        assert_eq!(concepts.no_left_lane(&gates).unwrap(), [1.0, 0.0]);
    }
}
