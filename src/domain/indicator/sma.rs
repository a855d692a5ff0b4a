//! Simple Moving Average.
//!
//! SMA[i] = mean(P[i-n+1..=i]). Warmup: first (n-1) points are undefined.

use crate::domain::error::AltairError;
use crate::domain::indicator::check_window;

pub fn sma(values: &[f64], window: usize) -> Result<Vec<Option<f64>>, AltairError> {
    check_window(window)?;

    let mut out = vec![None; values.len()];
    if window > values.len() {
        return Ok(out);
    }

    for (i, slice) in values.windows(window).enumerate() {
        out[i + window - 1] = Some(slice.iter().sum::<f64>() / window as f64);
    }
    Ok(out)
}
