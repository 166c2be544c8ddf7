//! Task registry: every supported supervision table, built by name.
//!
//! A task pairs a world shape with a hard-coded classification rule and a
//! fixed query vocabulary. Builders are pure: the same parameters always
//! produce bit-identical tables. Unknown task names fail loudly.

mod arithmetic;
mod driving;
mod kandinsky;

use serde::{Deserialize, Serialize};

use crate::error::{TaskError, TaskResult};
use crate::matrix::WorldsQueries;
use crate::world::{WorldSpace, WorldTable};

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Shape parameters shared by all task builders.
///
/// Arithmetic tasks read `sequence_len`/`n_digits`; Kandinsky tasks read
/// `n_concepts`/`n_values`; driving tasks and the fixed-shape tasks have
/// their layouts baked in and ignore all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskParams {
    /// Number of digit positions in an arithmetic world.
    pub sequence_len: usize,
    /// Digit domain size per position.
    pub n_digits: usize,
    /// Number of latent attributes in a Kandinsky world.
    pub n_concepts: usize,
    /// Attribute domain size (shapes/colors per attribute).
    pub n_values: usize,
}

impl Default for TaskParams {
    fn default() -> Self {
        Self {
            sequence_len: 2,
            n_digits: 10,
            n_concepts: 6,
            n_values: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Build output
// ---------------------------------------------------------------------------

/// An auxiliary combinator matrix shipped alongside a task's main table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gate {
    pub name: &'static str,
    pub matrix: WorldsQueries,
}

/// The output of a task builder: the worlds-queries table plus any auxiliary
/// gate matrices the task's consumers combine it with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableBundle {
    pub worlds_queries: WorldsQueries,
    pub gates: Vec<Gate>,
}

impl TableBundle {
    pub(crate) fn table(worlds_queries: WorldsQueries) -> Self {
        Self {
            worlds_queries,
            gates: Vec::new(),
        }
    }

    pub(crate) fn with_gates(worlds_queries: WorldsQueries, gates: Vec<Gate>) -> Self {
        Self {
            worlds_queries,
            gates,
        }
    }
}

// ---------------------------------------------------------------------------
// Task registry
// ---------------------------------------------------------------------------

/// Every supported task variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Task {
    /// Two-digit addition; columns = sum values 0..19.
    Add,
    /// Two-digit product; columns = the sorted distinct one-digit products.
    Product,
    /// Two-digit sum/product decision tree over four outcome columns.
    MultiOp,
    /// Four-digit parity; columns = (odd, even), odd rows stay all-zero.
    Xor,
    /// Pairwise sum equality over four digits; columns = (unequal, equal).
    MnmathSum,
    /// Pairwise product equality over four digits.
    MnmathProd,
    /// Two binary digits; column 1 iff equal, unequal rows stay all-zero.
    DigitEq,
    /// Three ternary attributes; columns = (all-different, one-pair, all-same).
    MiniPatterns,
    /// Three shapes + three colors; columns = 3 * shape_class + color_class.
    Patterns,
    /// Column 1 iff any position is shape 0 with color 0.
    RedTriangle,
    /// Column 1 iff any of three matched-pair indicators fires.
    Base,
    /// Nine-flag forward/stop scene; contradictions left all-zero.
    ForwardStopFull,
    /// Six-flag forward/stop scene; contradictions left all-zero.
    ForwardStop,
    /// Six-flag forward/stop scene with an explicit invalid column (one-hot).
    ForwardStopLabeled,
    /// Ambulance knowledge: only the obstacle flag matters.
    ForwardStopAmbulance,
    /// Seven-flag left-turn scene; contradictions left all-zero.
    LeftTurn,
    /// Six-flag left-lane-change scene with a total-ignorance 0.5/0.5 split.
    LeftLane,
    /// Ambulance knowledge for the left-lane scene.
    LeftLaneAmbulance,
    /// Six-flag right-lane-change scene with a total-ignorance split.
    RightLane,
    /// Ambulance knowledge for the right-lane scene.
    RightLaneAmbulance,
}

impl Task {
    /// All tasks, in registry order.
    pub const ALL: [Task; 20] = [
        Task::Add,
        Task::Product,
        Task::MultiOp,
        Task::Xor,
        Task::MnmathSum,
        Task::MnmathProd,
        Task::DigitEq,
        Task::MiniPatterns,
        Task::Patterns,
        Task::RedTriangle,
        Task::Base,
        Task::ForwardStopFull,
        Task::ForwardStop,
        Task::ForwardStopLabeled,
        Task::ForwardStopAmbulance,
        Task::LeftTurn,
        Task::LeftLane,
        Task::LeftLaneAmbulance,
        Task::RightLane,
        Task::RightLaneAmbulance,
    ];

    /// The registry name, as accepted by [`Task::parse`].
    pub fn name(&self) -> &'static str {
        match self {
            Task::Add => "add",
            Task::Product => "product",
            Task::MultiOp => "multiop",
            Task::Xor => "xor",
            Task::MnmathSum => "mnmath-sum",
            Task::MnmathProd => "mnmath-prod",
            Task::DigitEq => "digit-eq",
            Task::MiniPatterns => "mini-patterns",
            Task::Patterns => "patterns",
            Task::RedTriangle => "red-triangle",
            Task::Base => "base",
            Task::ForwardStopFull => "forward-stop-full",
            Task::ForwardStop => "forward-stop",
            Task::ForwardStopLabeled => "forward-stop-labeled",
            Task::ForwardStopAmbulance => "forward-stop-ambulance",
            Task::LeftTurn => "left-turn",
            Task::LeftLane => "left-lane",
            Task::LeftLaneAmbulance => "left-lane-ambulance",
            Task::RightLane => "right-lane",
            Task::RightLaneAmbulance => "right-lane-ambulance",
        }
    }

    /// Resolve a registry name. Unknown names are an error, never a silent
    /// fall-through.
    pub fn parse(name: &str) -> TaskResult<Self> {
        let needle = name.trim().to_lowercase();
        Task::ALL
            .iter()
            .copied()
            .find(|task| task.name() == needle)
            .ok_or(TaskError::UnknownTask { name: needle })
    }

    /// The world shape this task enumerates for the given parameters.
    ///
    /// Tasks that decode a fixed number of variables reject mismatched
    /// parameters here; fixed-layout tasks ignore the parameters entirely.
    pub fn world_space(&self, params: &TaskParams) -> TaskResult<WorldSpace> {
        let digits = |expected_len: usize| -> TaskResult<WorldSpace> {
            if params.sequence_len != expected_len {
                return Err(TaskError::ArityMismatch {
                    task: self.name(),
                    expected: expected_len,
                    actual: params.sequence_len,
                });
            }
            Ok(WorldSpace::uniform(params.n_digits, expected_len)?)
        };
        let attributes = |expected_concepts: usize| -> TaskResult<WorldSpace> {
            if params.n_concepts != expected_concepts {
                return Err(TaskError::ArityMismatch {
                    task: self.name(),
                    expected: expected_concepts,
                    actual: params.n_concepts,
                });
            }
            Ok(WorldSpace::uniform(params.n_values, expected_concepts)?)
        };
        let flags = |count: usize| -> TaskResult<WorldSpace> {
            Ok(WorldSpace::uniform(2, count)?)
        };

        match self {
            Task::Add | Task::Product | Task::MultiOp => digits(2),
            Task::Xor | Task::MnmathSum | Task::MnmathProd => digits(4),
            Task::DigitEq => flags(2),
            Task::MiniPatterns => Ok(WorldSpace::uniform(3, 3)?),
            Task::Patterns | Task::RedTriangle => attributes(6),
            Task::Base => attributes(8),
            Task::ForwardStopFull => flags(9),
            Task::LeftTurn => flags(7),
            Task::ForwardStop
            | Task::ForwardStopLabeled
            | Task::ForwardStopAmbulance
            | Task::LeftLane
            | Task::LeftLaneAmbulance
            | Task::RightLane
            | Task::RightLaneAmbulance => flags(6),
        }
    }

    /// Build the worlds-queries table (plus auxiliary gates) for this task.
    pub fn build(&self, params: &TaskParams) -> TaskResult<TableBundle> {
        let table = WorldTable::enumerate(self.world_space(params)?);
        let bundle = match self {
            Task::Add => arithmetic::add(&table),
            Task::Product => arithmetic::product(&table),
            Task::MultiOp => arithmetic::multi_op(&table),
            Task::Xor => arithmetic::xor(&table),
            Task::MnmathSum => arithmetic::mnmath(&table, ArithmeticOp::Sum),
            Task::MnmathProd => arithmetic::mnmath(&table, ArithmeticOp::Product),
            Task::DigitEq => arithmetic::digit_eq(&table),
            Task::MiniPatterns => kandinsky::mini_patterns(&table),
            Task::Patterns => kandinsky::patterns(&table),
            Task::RedTriangle => kandinsky::red_triangle(&table),
            Task::Base => kandinsky::base(&table),
            Task::ForwardStopFull => driving::forward_stop_full(&table),
            Task::ForwardStop => driving::forward_stop(&table),
            Task::ForwardStopLabeled => driving::forward_stop_labeled(&table),
            Task::ForwardStopAmbulance => driving::forward_stop_ambulance(&table),
            Task::LeftTurn => driving::left_turn(&table),
            Task::LeftLane => driving::left_lane(&table),
            Task::LeftLaneAmbulance => driving::left_lane_ambulance(&table),
            Task::RightLane => driving::right_lane(&table),
            Task::RightLaneAmbulance => driving::right_lane_ambulance(&table),
        };
        tracing::debug!(
            task = self.name(),
            worlds = bundle.worlds_queries.n_worlds(),
            queries = bundle.worlds_queries.n_queries(),
            gates = bundle.gates.len(),
            "built worlds-queries table"
        );
        Ok(bundle)
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which arithmetic reduction a pairwise-equality task compares with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Sum,
    Product,
}
