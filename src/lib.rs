// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # seshat
//!
//! Worlds-to-queries supervision tables for neuro-symbolic learning: enumerate
//! the combinatorial space of discrete latent "worlds" and classify each world
//! into query buckets with hand-coded background knowledge. The resulting
//! dense tables supervise a downstream learner that multiplies per-variable
//! probability vectors against them.
//!
//! ## Architecture
//!
//! - **World enumeration** (`world`): lexicographic Cartesian products as dense lookup tables
//! - **Rule tasks** (`task`): arithmetic, Kandinsky-pattern, and driving-scene rule families
//! - **Gate matrices** (`logic`): precomputed OR/AND/equality combinators, evaluated by enumeration
//! - **Program templating** (`program`): annotated-disjunction text + caller-owned compiled-model cache
//! - **Run ledger** (`ledger`): CSV experiment bookkeeping behind a PID-checked file lock
//!
//! ## Library usage
//!
//! ```
//! use seshat::task::{Task, TaskParams};
//!
//! let bundle = Task::Add.build(&TaskParams::default()).unwrap();
//! assert_eq!(bundle.worlds_queries.shape(), (100, 20));
//! // World (3,4) puts all its mass on the sum-7 column.
//! assert_eq!(bundle.worlds_queries.get(34, 7), 1.0);
//! ```

pub mod config;
pub mod error;
pub mod ledger;
pub mod logic;
pub mod matrix;
pub mod program;
pub mod task;
pub mod world;
