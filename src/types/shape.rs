//! The rank-4 shape every native array carries.

use crate::error::KhivaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// The native library addresses at most four dimensions.
pub const MAX_RANK: usize = 4;

/// A shape padded to exactly four extents. Trailing extents default to 1.
///
/// Extent 0 is the time axis and extent 1 the series axis for every
/// time-series operation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dim4([u64; MAX_RANK]);

impl Dim4 {
    pub const fn new(dims: [u64; MAX_RANK]) -> Self {
        Self(dims)
    }

    /// Right-pads a caller shape with 1s.
    ///
    /// `[8]` becomes `[8, 1, 1, 1]`. More than four extents is an error.
    pub fn normalize(dims: &[u64]) -> Result<Self, KhivaError> {
        if dims.len() > MAX_RANK {
            return Err(KhivaError::RankExceeded(dims.len()));
        }
        let mut padded = [1u64; MAX_RANK];
        padded[..dims.len()].copy_from_slice(dims);
        Ok(Self(padded))
    }

    /// Product of the four extents. Saturates instead of overflowing.
    pub fn elements(&self) -> u64 {
        self.0.iter().fold(1u64, |acc, &d| acc.saturating_mul(d))
    }

    pub const fn as_array(&self) -> [u64; MAX_RANK] {
        self.0
    }

    /// Length of each series (extent 0).
    pub const fn rows(&self) -> u64 {
        self.0[0]
    }

    /// Number of series: the product of extents 1..4.
    pub fn series(&self) -> u64 {
        self.0[1..].iter().fold(1u64, |acc, &d| acc.saturating_mul(d))
    }

    /// Extents of a per-series reduction: extent 0 collapses to 1.
    pub const fn reduced(&self) -> Self {
        Self([1, self.0[1], self.0[2], self.0[3]])
    }
}

impl Index<usize> for Dim4 {
    type Output = u64;

    fn index(&self, index: usize) -> &u64 {
        &self.0[index]
    }
}

impl From<[u64; MAX_RANK]> for Dim4 {
    fn from(dims: [u64; MAX_RANK]) -> Self {
        Self(dims)
    }
}

impl fmt::Display for Dim4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {} {} {}]", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_rank_four() {
        assert_eq!(Dim4::normalize(&[8]).unwrap().as_array(), [8, 1, 1, 1]);
        assert_eq!(Dim4::normalize(&[]).unwrap().as_array(), [1, 1, 1, 1]);
        assert_eq!(
            Dim4::normalize(&[2, 3, 4, 5]).unwrap().as_array(),
            [2, 3, 4, 5]
        );
    }

    #[test]
    fn rank_five_is_rejected() {
        assert!(matches!(
            Dim4::normalize(&[1, 1, 1, 1, 1]),
            Err(KhivaError::RankExceeded(5))
        ));
    }

    #[test]
    fn element_counts() {
        let dims = Dim4::new([4, 3, 2, 1]);
        assert_eq!(dims.elements(), 24);
        assert_eq!(dims.series(), 6);
        assert_eq!(dims.reduced().as_array(), [1, 3, 2, 1]);
        assert_eq!(Dim4::new([u64::MAX, 2, 1, 1]).elements(), u64::MAX);
    }
}
