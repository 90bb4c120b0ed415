//! Per-feature wrappers over the native time-series library.
//!
//! Every function here is a thin forwarder: it names an entry point, packs its
//! scalar parameters and hands the arrays to the dispatcher. Input arrays
//! follow the usual convention: extent 0 is time, extent 1 indexes series.
//! Inputs are reconciled by the dispatcher, so they stay usable after the call.

pub mod clustering;
pub mod dimensionality;
pub mod distances;
pub mod features;
pub mod linalg;
pub mod matrix;
pub mod normalization;
pub mod polynomial;
pub mod regression;
pub mod regularization;
pub mod statistics;

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a block of values is collapsed into one, passed to the native layer
/// as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationFunction {
    #[default]
    Mean = 0,
    Median = 1,
    Min = 2,
    Max = 3,
    Stdev = 4,
    Var = 5,
}

impl AggregationFunction {
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Unknown codes fall back to `Mean`, as the native library does.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Median,
            2 => Self::Min,
            3 => Self::Max,
            4 => Self::Stdev,
            5 => Self::Var,
            _ => Self::Mean,
        }
    }
}

impl fmt::Display for AggregationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Min => "min",
            Self::Max => "max",
            Self::Stdev => "stdev",
            Self::Var => "var",
        };
        f.write_str(name)
    }
}
