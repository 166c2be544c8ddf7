//! Dense worlds-by-queries weight tables.
//!
//! Rows are worlds in enumeration order, columns are the task's query
//! vocabulary. Row-sum invariants are task-specific: one-hot for exclusive
//! classification, 0 for silently-invalid worlds, 2 for correlated multi-label
//! outcomes, 0.5/0.5 under total ignorance.

use serde::{Deserialize, Serialize};

/// A dense `(worlds × queries)` table of non-negative weights.
///
/// Row-major `f32` storage. Built once by a task builder and read-only
/// thereafter; consumers contract against row order (lexicographic world
/// enumeration) and the task's documented column vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldsQueries {
    n_worlds: usize,
    n_queries: usize,
    weights: Vec<f32>,
}

impl WorldsQueries {
    /// An all-zero table with the given shape.
    pub fn zeros(n_worlds: usize, n_queries: usize) -> Self {
        Self {
            n_worlds,
            n_queries,
            weights: vec![0.0; n_worlds * n_queries],
        }
    }

    /// `(n_worlds, n_queries)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_worlds, self.n_queries)
    }

    pub fn n_worlds(&self) -> usize {
        self.n_worlds
    }

    pub fn n_queries(&self) -> usize {
        self.n_queries
    }

    /// Weight at `(world, query)`. Panics on out-of-range indices.
    #[inline]
    pub fn get(&self, world: usize, query: usize) -> f32 {
        assert!(query < self.n_queries, "query {query} out of range");
        self.weights[world * self.n_queries + query]
    }

    /// Set the weight at `(world, query)`. Panics on out-of-range indices.
    #[inline]
    pub fn set(&mut self, world: usize, query: usize, weight: f32) {
        assert!(query < self.n_queries, "query {query} out of range");
        self.weights[world * self.n_queries + query] = weight;
    }

    /// One world's full query-weight row.
    pub fn row(&self, world: usize) -> &[f32] {
        &self.weights[world * self.n_queries..(world + 1) * self.n_queries]
    }

    /// Iterate rows in world order.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.weights.chunks_exact(self.n_queries)
    }

    /// Sum of one row's weights.
    pub fn row_sum(&self, world: usize) -> f32 {
        self.row(world).iter().sum()
    }

    /// Sum of all weights in the table.
    pub fn total_mass(&self) -> f32 {
        self.weights.iter().sum()
    }

    /// Number of all-zero rows (silently-invalid worlds in some tasks).
    pub fn zero_rows(&self) -> usize {
        self.rows().filter(|r| r.iter().all(|&w| w == 0.0)).count()
    }

    /// True if every row has exactly one weight of 1 and the rest 0.
    pub fn is_one_hot(&self) -> bool {
        self.rows().all(|row| {
            row.iter().filter(|&&w| w == 1.0).count() == 1
                && row.iter().all(|&w| w == 0.0 || w == 1.0)
        })
    }
}
