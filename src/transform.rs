//! Forward/backward transform with physical normalization
//!
//! Forward (`isign = -1`): real buffer -> packed spectrum, scaled by
//! `dx·dy·dz / (2π)^1.5`. Backward (`isign = +1`): packed spectrum -> real
//! buffer, scaled by `dkx·dky·dkz / (2π)^1.5`. With `dk = 2π / (N·d)` the
//! two factors multiply to `1 / N`, the inverse of the unnormalized pair.

use std::f64::consts::PI;

use log::debug;
use rayon::prelude::*;

use crate::context::SpectralGrid;

/// Transform direction, `Forward` being real -> complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// `-1` is forward, `+1` backward, anything else is no direction.
    pub fn from_isign(isign: i32) -> Option<Self> {
        match isign {
            -1 => Some(Direction::Forward),
            1 => Some(Direction::Backward),
            _ => None,
        }
    }
}

/// `(2π)^1.5`
fn two_pi_pow_1_5() -> f64 {
    (2.0 * PI).powf(1.5)
}

pub fn forward_scale_factor((dx, dy, dz): (f64, f64, f64)) -> f64 {
    dx * dy * dz / two_pi_pow_1_5()
}

pub fn backward_scale_factor((dkx, dky, dkz): (f64, f64, f64)) -> f64 {
    dkx * dky * dkz / two_pi_pow_1_5()
}

/// Transform selected by the integer sign convention.
///
/// Returns the direction performed, or `None` (leaving both buffers
/// untouched) when `isign` is not `±1`.
pub fn ft<G: SpectralGrid + ?Sized>(grid: &mut G, isign: i32) -> Option<Direction> {
    let Some(direction) = Direction::from_isign(isign) else {
        debug!("ignoring transform request with isign = {}", isign);
        return None;
    };
    transform(grid, direction);
    Some(direction)
}

pub fn transform<G: SpectralGrid + ?Sized>(grid: &mut G, direction: Direction) {
    match direction {
        Direction::Forward => {
            grid.execute_forward();
            let factor = forward_scale_factor(grid.spacing());
            scale(grid, direction, factor);
        }
        Direction::Backward => {
            grid.execute_backward();
            let factor = backward_scale_factor(grid.freq_spacing());
            scale(grid, direction, factor);
        }
    }
}

/// Scale the buffer written by a transform in `direction`.
pub(crate) fn scale<G: SpectralGrid + ?Sized>(grid: &mut G, direction: Direction, factor: f64) {
    match direction {
        Direction::Backward => grid.real_mut().par_iter_mut().for_each(|v| *v *= factor),
        Direction::Forward => grid.spectrum_mut().par_iter_mut().for_each(|c| *c *= factor),
    }
}
