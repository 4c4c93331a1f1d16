//! Spectral differentiation
//!
//! Every operator transforms the real buffer forward, multiplies each packed
//! bin by `i·k` (first order) or `-k²` (second order, Laplacian), and
//! transforms back. The result replaces the field in the real buffer.

use num_complex::Complex64;
use rayon::prelude::*;

use crate::context::SpectralGrid;
use crate::transform::{transform, Direction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    fn component(self, k: &[f64; 3]) -> f64 {
        match self {
            Axis::X => k[0],
            Axis::Y => k[1],
            Axis::Z => k[2],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    First,
    Second,
}

/// Multiplier applied to a bin, as a function of its frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectralOperator {
    Partial(Axis, Order),
    Laplacian,
}

impl SpectralOperator {
    /// Update one packed bin in place.
    #[inline]
    pub fn apply(self, c: &mut Complex64, k: &[f64; 3]) {
        match self {
            SpectralOperator::Partial(axis, Order::First) => {
                // multiply by i·k
                let ka = axis.component(k);
                *c = Complex64::new(-c.im * ka, c.re * ka);
            }
            SpectralOperator::Partial(axis, Order::Second) => {
                let ka = axis.component(k);
                *c *= -(ka * ka);
            }
            SpectralOperator::Laplacian => {
                *c *= -(k[0] * k[0] + k[1] * k[1] + k[2] * k[2]);
            }
        }
    }
}

/// Apply `op` to the field held in the grid's real buffer.
///
/// Whatever the packed buffer held before is discarded.
pub fn apply_operator<G: SpectralGrid + ?Sized>(grid: &mut G, op: SpectralOperator) {
    transform(grid, Direction::Forward);

    let mapper = grid.mapper();
    grid.spectrum_mut()
        .par_iter_mut()
        .enumerate()
        .for_each(|(l, c)| op.apply(c, &mapper.frequency_at(l)));

    transform(grid, Direction::Backward);
}

/// Partial derivative of the given order along `axis`.
pub fn diff<G: SpectralGrid + ?Sized>(grid: &mut G, axis: Axis, order: Order) {
    apply_operator(grid, SpectralOperator::Partial(axis, order));
}

/// ∂/∂x
pub fn diff_x<G: SpectralGrid + ?Sized>(grid: &mut G) {
    diff(grid, Axis::X, Order::First);
}

/// ∂²/∂x²
pub fn diff_xx<G: SpectralGrid + ?Sized>(grid: &mut G) {
    diff(grid, Axis::X, Order::Second);
}

/// ∂/∂y
pub fn diff_y<G: SpectralGrid + ?Sized>(grid: &mut G) {
    diff(grid, Axis::Y, Order::First);
}

/// ∂²/∂y²
pub fn diff_yy<G: SpectralGrid + ?Sized>(grid: &mut G) {
    diff(grid, Axis::Y, Order::Second);
}

/// ∂/∂z
pub fn diff_z<G: SpectralGrid + ?Sized>(grid: &mut G) {
    diff(grid, Axis::Z, Order::First);
}

/// ∂²/∂z²
pub fn diff_zz<G: SpectralGrid + ?Sized>(grid: &mut G) {
    diff(grid, Axis::Z, Order::Second);
}

/// ∇² = ∂²/∂x² + ∂²/∂y² + ∂²/∂z²
pub fn laplace<G: SpectralGrid + ?Sized>(grid: &mut G) {
    apply_operator(grid, SpectralOperator::Laplacian);
}
