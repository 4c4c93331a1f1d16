//! Common test utilities for rft-core integration tests

#![allow(dead_code)]

use rft_core::{GridHeader, RftContext, SpectralGrid};

/// Largest absolute elementwise difference
pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// Compute RMSE between two arrays
pub fn rmse(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
    (sum_sq / a.len() as f64).sqrt()
}

/// ||a - b|| / ||b||, or the absolute error when b is zero
pub fn relative_error(a: &[f64], b: &[f64]) -> f64 {
    let diff: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt();
    let norm: f64 = b.iter().map(|y| y * y).sum::<f64>().sqrt();
    if norm == 0.0 {
        diff
    } else {
        diff / norm
    }
}

/// Context filled with `f` sampled at its own coordinates
pub fn context_with<F>(header: GridHeader, f: F) -> RftContext
where
    F: Fn([f64; 3]) -> f64 + Sync,
{
    let mut ctx = RftContext::new(header).expect("valid header");
    ctx.fill_with(f);
    ctx
}

/// Evaluate `f` at every real-buffer offset of `ctx`
pub fn sample<F>(ctx: &RftContext, f: F) -> Vec<f64>
where
    F: Fn([f64; 3]) -> f64,
{
    let mapper = ctx.mapper();
    (0..ctx.dim()).map(|l| f(mapper.coordinate_at(l))).collect()
}

/// Smooth periodic test field built from a few exactly representable modes
pub fn smooth_periodic(header: &GridHeader) -> impl Fn([f64; 3]) -> f64 + Sync {
    let (dkx, dky, dkz) = header.freq_spacing();
    move |[x, y, z]| {
        (dkx * x).sin() * (2.0 * dky * y).cos()
            + 0.5 * (dkz * z + dkx * x).cos()
            + 0.25 * (dky * y - 2.0 * dkz * z).sin()
            + 1.5
    }
}

/// Deterministic pseudo-random field (no band limit)
pub fn rough_field(n: usize, seed: u64) -> Vec<f64> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
        })
        .collect()
}
