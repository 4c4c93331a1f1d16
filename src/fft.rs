//! Real-to-complex 3D FFT using rustfft
//!
//! Provides unnormalized r2c / c2r transforms over row-major data (z varies
//! fastest). The complex side uses the Hermitian-packed layout: only
//! `nz / 2 + 1` bins are kept along the last axis.

use num_complex::Complex64;
use rustfft::{Fft, FftDirection, FftPlanner};
use std::sync::Arc;

/// FFT workspace that caches plans and scratch buffers for reuse
pub struct Rft3dWorkspace {
    nx: usize,
    ny: usize,
    nz: usize,
    rz: usize,
    // Forward FFT plans
    fft_x: Arc<dyn Fft<f64>>,
    fft_y: Arc<dyn Fft<f64>>,
    fft_z: Arc<dyn Fft<f64>>,
    // Inverse FFT plans
    ifft_x: Arc<dyn Fft<f64>>,
    ifft_y: Arc<dyn Fft<f64>>,
    ifft_z: Arc<dyn Fft<f64>>,
    // Scratch buffers
    scratch_x: Vec<Complex64>,
    scratch_y: Vec<Complex64>,
    scratch_z: Vec<Complex64>,
    buffer_x: Vec<Complex64>,
    buffer_y: Vec<Complex64>,
    buffer_z: Vec<Complex64>,
    // Copy of the packed spectrum so c2r leaves its input intact
    work: Vec<Complex64>,
}

impl Rft3dWorkspace {
    /// Create a new workspace for the given real-space dimensions
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        let mut planner = FftPlanner::new();
        let rz = nz / 2 + 1;

        let fft_x = planner.plan_fft(nx, FftDirection::Forward);
        let fft_y = planner.plan_fft(ny, FftDirection::Forward);
        let fft_z = planner.plan_fft(nz, FftDirection::Forward);

        let ifft_x = planner.plan_fft(nx, FftDirection::Inverse);
        let ifft_y = planner.plan_fft(ny, FftDirection::Inverse);
        let ifft_z = planner.plan_fft(nz, FftDirection::Inverse);

        let zero = Complex64::new(0.0, 0.0);
        let scratch_x = vec![zero; fft_x.get_inplace_scratch_len().max(ifft_x.get_inplace_scratch_len())];
        let scratch_y = vec![zero; fft_y.get_inplace_scratch_len().max(ifft_y.get_inplace_scratch_len())];
        let scratch_z = vec![zero; fft_z.get_inplace_scratch_len().max(ifft_z.get_inplace_scratch_len())];

        Self {
            nx, ny, nz, rz,
            fft_x, fft_y, fft_z,
            ifft_x, ifft_y, ifft_z,
            scratch_x, scratch_y, scratch_z,
            buffer_x: vec![zero; nx],
            buffer_y: vec![zero; ny],
            buffer_z: vec![zero; nz],
            work: vec![zero; nx * ny * rz],
        }
    }

    /// Unnormalized forward r2c transform: `input` (nx*ny*nz) -> `output` (nx*ny*rz)
    pub fn forward(&mut self, input: &[f64], output: &mut [Complex64]) {
        let (nx, ny, nz, rz) = (self.nx, self.ny, self.nz, self.rz);
        debug_assert_eq!(input.len(), nx * ny * nz);
        debug_assert_eq!(output.len(), nx * ny * rz);

        // Transform along z, keeping the non-redundant half
        for line in 0..nx * ny {
            let src = &input[line * nz..(line + 1) * nz];
            for (b, &v) in self.buffer_z.iter_mut().zip(src.iter()) {
                *b = Complex64::new(v, 0.0);
            }
            self.fft_z.process_with_scratch(&mut self.buffer_z, &mut self.scratch_z);
            output[line * rz..(line + 1) * rz].copy_from_slice(&self.buffer_z[..rz]);
        }

        transform_xy(
            output, nx, ny, rz,
            &*self.fft_x, &*self.fft_y,
            &mut self.buffer_x, &mut self.buffer_y,
            &mut self.scratch_x, &mut self.scratch_y,
        );
    }

    /// Unnormalized backward c2r transform: `input` (nx*ny*rz) -> `output` (nx*ny*nz)
    ///
    /// The imaginary parts of the zero and Nyquist bins along z are ignored,
    /// as any c2r transform assumes a Hermitian-consistent spectrum.
    pub fn backward(&mut self, input: &[Complex64], output: &mut [f64]) {
        let (nx, ny, nz, rz) = (self.nx, self.ny, self.nz, self.rz);
        debug_assert_eq!(input.len(), nx * ny * rz);
        debug_assert_eq!(output.len(), nx * ny * nz);

        self.work.copy_from_slice(input);
        transform_xy(
            &mut self.work, nx, ny, rz,
            &*self.ifft_x, &*self.ifft_y,
            &mut self.buffer_x, &mut self.buffer_y,
            &mut self.scratch_x, &mut self.scratch_y,
        );

        // Rebuild each full z line from its packed half, then invert
        for line in 0..nx * ny {
            let half = &self.work[line * rz..(line + 1) * rz];
            self.buffer_z[..rz].copy_from_slice(half);
            for k in rz..nz {
                self.buffer_z[k] = half[nz - k].conj();
            }
            self.ifft_z.process_with_scratch(&mut self.buffer_z, &mut self.scratch_z);
            for (o, b) in output[line * nz..(line + 1) * nz].iter_mut().zip(self.buffer_z.iter()) {
                *o = b.re;
            }
        }
    }
}

/// Full complex transforms along x and y of a packed (nx, ny, rz) array
#[allow(clippy::too_many_arguments)]
fn transform_xy(
    data: &mut [Complex64],
    nx: usize, ny: usize, rz: usize,
    plan_x: &dyn Fft<f64>, plan_y: &dyn Fft<f64>,
    buffer_x: &mut [Complex64], buffer_y: &mut [Complex64],
    scratch_x: &mut [Complex64], scratch_y: &mut [Complex64],
) {
    // Transform along y (stride rz)
    for i in 0..nx {
        for k in 0..rz {
            for j in 0..ny {
                buffer_y[j] = data[idx3d(i, j, k, ny, rz)];
            }
            plan_y.process_with_scratch(buffer_y, scratch_y);
            for j in 0..ny {
                data[idx3d(i, j, k, ny, rz)] = buffer_y[j];
            }
        }
    }

    // Transform along x (stride ny*rz)
    for j in 0..ny {
        for k in 0..rz {
            for i in 0..nx {
                buffer_x[i] = data[idx3d(i, j, k, ny, rz)];
            }
            plan_x.process_with_scratch(buffer_x, scratch_x);
            for i in 0..nx {
                data[idx3d(i, j, k, ny, rz)] = buffer_x[i];
            }
        }
    }
}

/// Index into a 3D array stored in row-major order (z fastest)
/// index = k + nz*(j + ny*i)
#[inline(always)]
pub fn idx3d(i: usize, j: usize, k: usize, ny: usize, nz: usize) -> usize {
    k + nz * (j + ny * i)
}
