//! Matrix profile (STOMP) and motif/discord extraction.

use crate::array::Array;
use crate::dispatch::{invoke_n, EntryPoint, Scalar};
use crate::error::Result;

pub const STOMP: EntryPoint = EntryPoint::new("stomp", 2, 2);
pub const STOMP_SELF_JOIN: EntryPoint = EntryPoint::new("stomp_self_join", 1, 2);
pub const FIND_BEST_N_MOTIFS: EntryPoint = EntryPoint::new("find_best_n_motifs", 2, 3);
pub const FIND_BEST_N_DISCORDS: EntryPoint = EntryPoint::new("find_best_n_discords", 2, 3);

#[derive(Debug)]
pub struct MatrixProfile {
    /// Distance from each subsequence to its nearest neighbour.
    pub profile: Array,
    /// Position of that neighbour.
    pub index: Array,
}

/// Motifs or discords extracted from a matrix profile.
#[derive(Debug)]
pub struct Matches {
    pub distances: Array,
    pub indices: Array,
    /// Positions in the compared series.
    pub subsequence_indices: Array,
}

/// Matrix profile between `a` and `b` for subsequences of length `m`.
pub fn stomp(a: &Array, b: &Array, m: i64) -> Result<MatrixProfile> {
    let [profile, index] = invoke_n::<2>(&STOMP, &[a, b], &[Scalar::Long(m)])?;
    Ok(MatrixProfile { profile, index })
}

/// Matrix profile of `t` against itself, trivial matches excluded.
pub fn stomp_self_join(t: &Array, m: i64) -> Result<MatrixProfile> {
    let [profile, index] = invoke_n::<2>(&STOMP_SELF_JOIN, &[t], &[Scalar::Long(m)])?;
    Ok(MatrixProfile { profile, index })
}

fn best_n(entry: &EntryPoint, mp: &MatrixProfile, m: i64, n: i64, self_join: bool) -> Result<Matches> {
    let [distances, indices, subsequence_indices] = invoke_n::<3>(
        entry,
        &[&mp.profile, &mp.index],
        &[Scalar::Long(m), Scalar::Long(n), Scalar::Bool(self_join)],
    )?;
    Ok(Matches {
        distances,
        indices,
        subsequence_indices,
    })
}

/// The `n` closest subsequence pairs. `self_join` excludes mirror matches.
pub fn find_best_n_motifs(mp: &MatrixProfile, m: i64, n: i64, self_join: bool) -> Result<Matches> {
    best_n(&FIND_BEST_N_MOTIFS, mp, m, n, self_join)
}

/// The `n` most isolated subsequences.
pub fn find_best_n_discords(mp: &MatrixProfile, m: i64, n: i64, self_join: bool) -> Result<Matches> {
    best_n(&FIND_BEST_N_DISCORDS, mp, m, n, self_join)
}
