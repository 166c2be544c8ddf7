//! Exact-arithmetic-match tasks over digit worlds.
//!
//! Each builder walks the enumerated digit worlds and writes weight 1 into
//! the column its arithmetic identity selects. Column vocabularies are fixed
//! at design time and documented per builder.

use std::collections::BTreeSet;

use crate::matrix::WorldsQueries;
use crate::world::WorldTable;

use super::{ArithmeticOp, TableBundle};

/// Columns the two-digit addition table always carries: sum values 0..19,
/// regardless of the digit domain. Smaller domains simply leave the high
/// columns empty.
const ADD_QUERIES: usize = 20;

/// Two-digit addition: weight 1 at column `d1 + d2`.
///
/// Columns 0..19 are the sum vocabulary; worlds = `n_digits^2`.
pub(super) fn add(table: &WorldTable) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), ADD_QUERIES);
    for (w, world) in table.iter().enumerate() {
        let sum = world[0] as usize + world[1] as usize;
        if sum < ADD_QUERIES {
            wq.set(w, sum, 1.0);
        }
    }
    TableBundle::table(wq)
}

/// Two-digit product: columns are the sorted distinct products of one-digit
/// factors, `{0} ∪ {i·j : i,j in 1..=9}`; weight 1 at the column whose value
/// equals `d1 · d2`.
pub(super) fn product(table: &WorldTable) -> TableBundle {
    let mut values: BTreeSet<usize> = BTreeSet::new();
    values.insert(0);
    for i in 1..=9usize {
        for j in 1..=9usize {
            values.insert(i * j);
        }
    }
    let vocabulary: Vec<usize> = values.into_iter().collect();

    let mut wq = WorldsQueries::zeros(table.len(), vocabulary.len());
    for (w, world) in table.iter().enumerate() {
        let product = world[0] as usize * world[1] as usize;
        for (q, &value) in vocabulary.iter().enumerate() {
            if product == value {
                wq.set(w, q, 1.0);
            }
        }
    }
    TableBundle::table(wq)
}

/// Two-digit sum/product decision tree over four outcome columns:
/// col 0: sum == 1 and product == 0; col 1: sum == 2 and product == 0;
/// col 2: sum == 4 and product == 3; col 3: everything else.
pub(super) fn multi_op(table: &WorldTable) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), 4);
    for (w, world) in table.iter().enumerate() {
        let (d1, d2) = (world[0] as usize, world[1] as usize);
        let (sum, product) = (d1 + d2, d1 * d2);
        let query = if sum == 1 && product == 0 {
            0
        } else if sum == 2 && product == 0 {
            1
        } else if sum == 4 && product == 3 {
            2
        } else {
            3
        };
        wq.set(w, query, 1.0);
    }
    TableBundle::table(wq)
}

/// Four-digit parity with columns (odd, even): even digit sums put weight 1 in
/// column 1; odd sums leave the row all-zero. Column 0 is never written, so
/// the odd-parity rows carry no mass.
pub(super) fn xor(table: &WorldTable) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), 2);
    for (w, world) in table.iter().enumerate() {
        let sum: usize = world.iter().map(|&d| d as usize).sum();
        if sum % 2 == 0 {
            wq.set(w, 1, 1.0);
        }
    }
    TableBundle::table(wq)
}

/// Four-digit pairwise equality with columns (unequal, equal): weight 1 in
/// column 1 iff the reduction of the first pair equals the reduction of the
/// second pair, else in column 0.
pub(super) fn mnmath(table: &WorldTable, op: ArithmeticOp) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), 2);
    for (w, world) in table.iter().enumerate() {
        let (d1, d2) = (world[0] as usize, world[1] as usize);
        let (d3, d4) = (world[2] as usize, world[3] as usize);
        let (left, right) = match op {
            ArithmeticOp::Sum => (d1 + d2, d3 + d4),
            ArithmeticOp::Product => (d1 * d2, d3 * d4),
        };
        wq.set(w, if left == right { 1 } else { 0 }, 1.0);
    }
    TableBundle::table(wq)
}

/// Two binary digits with columns (unequal, equal): weight 1 in column 1 iff
/// the digits agree; disagreeing worlds stay all-zero. The shape is fixed at
/// 2 binary variables whatever the caller's digit parameters say.
pub(super) fn digit_eq(table: &WorldTable) -> TableBundle {
    let mut wq = WorldsQueries::zeros(table.len(), 2);
    for (w, world) in table.iter().enumerate() {
        if world[0] == world[1] {
            wq.set(w, 1, 1.0);
        }
    }
    TableBundle::table(wq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::WorldSpace;

    fn digits(n_digits: usize, sequence_len: usize) -> WorldTable {
        WorldTable::enumerate(WorldSpace::uniform(n_digits, sequence_len).unwrap())
    }

    #[test]
    fn add_three_plus_four_is_seven() {
        let table = digits(10, 2);
        let wq = add(&table).worlds_queries;
        assert_eq!(wq.shape(), (100, 20));
        let w = table.space().index_of(&[3, 4]).unwrap();
        for q in 0..20 {
            assert_eq!(wq.get(w, q), if q == 7 { 1.0 } else { 0.0 });
        }
    }

    #[test]
    fn add_covers_every_world_exactly_once() {
        let wq = add(&digits(10, 2)).worlds_queries;
        assert!(wq.is_one_hot());
        assert_eq!(wq.total_mass(), 100.0);
    }

    #[test]
    fn product_vocabulary_is_distinct_sorted() {
        let wq = product(&digits(10, 2)).worlds_queries;
        // {0} plus the 36 distinct products of 1..=9 squared.
        assert_eq!(wq.n_queries(), 37);
        assert!(wq.is_one_hot());
    }

    #[test]
    fn product_of_six_and_six_lands_on_36() {
        let table = digits(10, 2);
        let wq = product(&table).worlds_queries;
        let w = table.space().index_of(&[6, 6]).unwrap();
        // 36 sits at vocabulary index 25 (25 distinct products precede it).
        assert_eq!(wq.get(w, 25), 1.0);
        assert_eq!(wq.row_sum(w), 1.0);
    }

    #[test]
    fn product_zero_column_collects_zero_factors() {
        let table = digits(10, 2);
        let wq = product(&table).worlds_queries;
        assert_eq!(wq.get(table.space().index_of(&[0, 7]).unwrap(), 0), 1.0);
        assert_eq!(wq.get(table.space().index_of(&[5, 0]).unwrap(), 0), 1.0);
    }

    #[test]
    fn multi_op_partitions_the_sixteen_worlds() {
        let table = digits(4, 2);
        let wq = multi_op(&table).worlds_queries;
        assert_eq!(wq.shape(), (16, 4));
        assert!(wq.is_one_hot());
        let space = table.space();
        // (0,1): sum 1, product 0 -> col 0.
        assert_eq!(wq.row(space.index_of(&[0, 1]).unwrap()), &[1.0, 0.0, 0.0, 0.0]);
        // (0,2): sum 2, product 0 -> col 1.
        assert_eq!(wq.row(space.index_of(&[0, 2]).unwrap()), &[0.0, 1.0, 0.0, 0.0]);
        // (1,3): sum 4, product 3 -> col 2.
        assert_eq!(wq.row(space.index_of(&[1, 3]).unwrap()), &[0.0, 0.0, 1.0, 0.0]);
        // (1,1): sum 2 but product 1 -> col 3.
        assert_eq!(wq.row(space.index_of(&[1, 1]).unwrap()), &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn xor_even_parity_fires_column_one_only() {
        let table = digits(2, 4);
        let wq = xor(&table).worlds_queries;
        assert_eq!(wq.shape(), (16, 2));

        let even = table.space().index_of(&[1, 1, 0, 0]).unwrap();
        assert_eq!(wq.row(even), &[0.0, 1.0]);

        let odd = table.space().index_of(&[1, 0, 0, 0]).unwrap();
        assert_eq!(wq.row(odd), &[0.0, 0.0]);

        // Half the worlds have odd parity and stay all-zero.
        assert_eq!(wq.zero_rows(), 8);
        assert_eq!(wq.total_mass(), 8.0);
    }

    #[test]
    fn mnmath_sum_equality() {
        let table = digits(4, 4);
        let wq = mnmath(&table, ArithmeticOp::Sum).worlds_queries;
        assert_eq!(wq.shape(), (256, 2));
        assert!(wq.is_one_hot());
        // 1+2 == 0+3.
        assert_eq!(wq.row(table.space().index_of(&[1, 2, 0, 3]).unwrap()), &[0.0, 1.0]);
        // 1+2 != 3+3.
        assert_eq!(wq.row(table.space().index_of(&[1, 2, 3, 3]).unwrap()), &[1.0, 0.0]);
    }

    #[test]
    fn mnmath_prod_equality() {
        let table = digits(4, 4);
        let wq = mnmath(&table, ArithmeticOp::Product).worlds_queries;
        // 2*3 == 3*2.
        assert_eq!(wq.row(table.space().index_of(&[2, 3, 3, 2]).unwrap()), &[0.0, 1.0]);
        // 1*1 != 2*3.
        assert_eq!(wq.row(table.space().index_of(&[1, 1, 2, 3]).unwrap()), &[1.0, 0.0]);
    }

    #[test]
    fn digit_eq_leaves_unequal_rows_empty() {
        let wq = digit_eq(&digits(2, 2)).worlds_queries;
        assert_eq!(wq.shape(), (4, 2));
        assert_eq!(wq.row(0), &[0.0, 1.0]); // (0,0)
        assert_eq!(wq.row(1), &[0.0, 0.0]); // (0,1)
        assert_eq!(wq.row(2), &[0.0, 0.0]); // (1,0)
        assert_eq!(wq.row(3), &[0.0, 1.0]); // (1,1)
    }
}
