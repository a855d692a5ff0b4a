//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = P[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) points are undefined.

use crate::domain::error::AltairError;
use crate::domain::indicator::check_window;

pub fn ema(values: &[f64], window: usize) -> Result<Vec<Option<f64>>, AltairError> {
    check_window(window)?;

    let mut out = Vec::with_capacity(values.len());
    let k = 2.0 / (window as f64 + 1.0);
    let mut current = 0.0;
    let mut sum = 0.0;

    for (i, &price) in values.iter().enumerate() {
        if i < window - 1 {
            sum += price;
            out.push(None);
        } else if i == window - 1 {
            sum += price;
            current = sum / window as f64;
            out.push(Some(current));
        } else {
            current = price * k + current * (1.0 - k);
            out.push(Some(current));
        }
    }

    Ok(out)
}
