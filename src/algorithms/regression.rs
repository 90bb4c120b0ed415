use crate::array::Array;
use crate::dispatch::{invoke_n, EntryPoint};
use crate::error::Result;

pub const LINEAR: EntryPoint = EntryPoint::new("linear", 2, 5);

/// Least-squares line per pair of series.
#[derive(Debug)]
pub struct LinearRegression {
    pub slope: Array,
    pub intercept: Array,
    /// Correlation coefficient.
    pub rvalue: Array,
    /// Two-sided p-value of the zero-slope hypothesis (Wald test).
    pub pvalue: Array,
    /// Standard error of the slope.
    pub stderrest: Array,
}

pub fn linear(xss: &Array, yss: &Array) -> Result<LinearRegression> {
    let [slope, intercept, rvalue, pvalue, stderrest] = invoke_n::<5>(&LINEAR, &[xss, yss], &[])?;
    Ok(LinearRegression {
        slope,
        intercept,
        rvalue,
        pvalue,
        stderrest,
    })
}
