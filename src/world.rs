//! World enumeration: lexicographic Cartesian products over finite domains.
//!
//! A "world" is one concrete assignment of values to all latent variables of a
//! task. Worlds are identified by their dense index in odometer order (the last
//! variable varies fastest), so the same shape always enumerates in the same
//! order; downstream tables rely on this.

use serde::{Deserialize, Serialize};

use crate::error::{WorldError, WorldResult};

// ---------------------------------------------------------------------------
// World space
// ---------------------------------------------------------------------------

/// Shape of a space of discrete worlds: `num_variables` variables sharing one
/// finite domain `0..domain_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSpace {
    domain_size: usize,
    num_variables: usize,
    len: usize,
}

impl WorldSpace {
    /// Create a space of `num_variables` variables over `0..domain_size`.
    ///
    /// Both must be positive; the domain must fit a `u8` component and the
    /// product `domain_size^num_variables` must fit a `usize` index.
    pub fn uniform(domain_size: usize, num_variables: usize) -> WorldResult<Self> {
        if domain_size == 0 || num_variables == 0 {
            return Err(WorldError::EmptySpace {
                domain_size,
                num_variables,
            });
        }
        if domain_size > (u8::MAX as usize) + 1 {
            return Err(WorldError::DomainTooLarge { domain_size });
        }
        let mut len: usize = 1;
        for _ in 0..num_variables {
            len = len
                .checked_mul(domain_size)
                .ok_or(WorldError::TooLarge {
                    domain_size,
                    num_variables,
                })?;
        }
        Ok(Self {
            domain_size,
            num_variables,
            len,
        })
    }

    /// Number of values each variable ranges over.
    pub fn domain_size(&self) -> usize {
        self.domain_size
    }

    /// Number of latent variables.
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// Total number of worlds, `domain_size^num_variables`.
    pub fn len(&self) -> usize {
        self.len
    }

    /// A valid space is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Decode a dense index into its component tuple without materializing the
    /// full table. Pure arithmetic; the last variable varies fastest.
    pub fn decode(&self, index: usize) -> WorldResult<Vec<u8>> {
        if index >= self.len {
            return Err(WorldError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        let mut components = vec![0u8; self.num_variables];
        let mut rest = index;
        for slot in components.iter_mut().rev() {
            *slot = (rest % self.domain_size) as u8;
            rest /= self.domain_size;
        }
        Ok(components)
    }

    /// Inverse of [`decode`](Self::decode): the dense index of a tuple.
    pub fn index_of(&self, world: &[u8]) -> WorldResult<usize> {
        if world.len() != self.num_variables {
            return Err(WorldError::BadTuple {
                expected: self.num_variables,
                actual: world.len(),
            });
        }
        let mut index = 0usize;
        for &value in world {
            if (value as usize) >= self.domain_size {
                return Err(WorldError::ValueOutOfDomain {
                    value,
                    domain_size: self.domain_size,
                });
            }
            index = index * self.domain_size + value as usize;
        }
        Ok(index)
    }
}

// ---------------------------------------------------------------------------
// World table
// ---------------------------------------------------------------------------

/// The full Cartesian product of a [`WorldSpace`], materialized as a dense
/// lookup from world index to component tuple.
///
/// Stored row-major with stride `num_variables`; `world(i)` is a borrow into
/// the flat buffer. Built eagerly in one pass; covered spaces range from tens
/// to a few thousand worlds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldTable {
    space: WorldSpace,
    values: Vec<u8>,
}

impl WorldTable {
    /// Enumerate every world of `space` in odometer order.
    pub fn enumerate(space: WorldSpace) -> Self {
        let stride = space.num_variables();
        let mut values = vec![0u8; space.len() * stride];
        // Odometer fill: copy the previous row, then increment from the right.
        let mut current = vec![0u8; stride];
        for w in 0..space.len() {
            values[w * stride..(w + 1) * stride].copy_from_slice(&current);
            for slot in current.iter_mut().rev() {
                if (*slot as usize) + 1 < space.domain_size() {
                    *slot += 1;
                    break;
                }
                *slot = 0;
            }
        }
        Self { space, values }
    }

    /// The shape this table enumerates.
    pub fn space(&self) -> WorldSpace {
        self.space
    }

    /// Number of worlds.
    pub fn len(&self) -> usize {
        self.space.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The component tuple of world `index`.
    ///
    /// Panics if `index >= len()`; table consumers iterate `0..len()`.
    pub fn world(&self, index: usize) -> &[u8] {
        let stride = self.space.num_variables();
        &self.values[index * stride..(index + 1) * stride]
    }

    /// Iterate all worlds in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.values.chunks_exact(self.space.num_variables())
    }
}
