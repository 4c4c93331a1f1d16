//! Grid/buffer context
//!
//! [`SpectralGrid`] is the narrow capability the differentiation core works
//! against: geometry queries, access to the real and packed complex buffers,
//! and the two transform invocations. [`RftContext`] is the concrete
//! implementation backed by [`Rft3dWorkspace`].

use log::{debug, trace};
use num_complex::Complex64;
use rayon::prelude::*;

use crate::error::{Result, RftError};
use crate::fft::Rft3dWorkspace;
use crate::grid::GridHeader;
use crate::mapper::IndexMapper;

pub trait SpectralGrid {
    fn dims(&self) -> (usize, usize, usize);
    fn spacing(&self) -> (f64, f64, f64);
    fn freq_spacing(&self) -> (f64, f64, f64);
    fn shifts(&self) -> (i64, i64, i64);

    /// Length of the last axis in the packed complex layout
    fn red_dim(&self) -> usize {
        self.dims().2 / 2 + 1
    }

    /// Number of real samples
    fn dim(&self) -> usize {
        let (nx, ny, nz) = self.dims();
        nx * ny * nz
    }

    /// Number of packed complex samples
    fn dim_fs(&self) -> usize {
        let (nx, ny, _) = self.dims();
        nx * ny * self.red_dim()
    }

    fn real(&self) -> &[f64];
    fn real_mut(&mut self) -> &mut [f64];
    fn spectrum(&self) -> &[Complex64];
    fn spectrum_mut(&mut self) -> &mut [Complex64];

    /// Unnormalized real -> packed complex transform of the owned buffers
    fn execute_forward(&mut self);

    /// Unnormalized packed complex -> real transform of the owned buffers
    fn execute_backward(&mut self);

    /// Snapshot of the geometry for per-element index mapping.
    fn mapper(&self) -> IndexMapper {
        IndexMapper::new(
            self.dims(),
            self.spacing(),
            self.freq_spacing(),
            self.shifts(),
        )
    }
}

/// Owns the real buffer, the packed spectrum and the cached FFT plans.
pub struct RftContext {
    header: GridHeader,
    real: Vec<f64>,
    spectrum: Vec<Complex64>,
    workspace: Rft3dWorkspace,
}

impl RftContext {
    /// Allocate zeroed buffers and plans for `header`.
    pub fn new(header: GridHeader) -> Result<Self> {
        header.validate()?;
        let (nx, ny, nz) = header.dims();
        debug!(
            "rft context {}x{}x{} (reduced {}), spacing {:?}, dk {:?}, shifts {:?}",
            nx, ny, nz, header.red_dim(), header.spacing(), header.freq_spacing(), header.shifts()
        );
        Ok(Self {
            real: vec![0.0; header.dim()],
            spectrum: vec![Complex64::new(0.0, 0.0); header.dim_fs()],
            workspace: Rft3dWorkspace::new(nx, ny, nz),
            header,
        })
    }

    /// Create a context and copy `data` (row-major, z fastest) into its real buffer.
    pub fn with_field(header: GridHeader, data: &[f64]) -> Result<Self> {
        let mut ctx = Self::new(header)?;
        ctx.load_field(data)?;
        Ok(ctx)
    }

    pub fn header(&self) -> &GridHeader {
        &self.header
    }

    /// Overwrite the real buffer with `data`.
    pub fn load_field(&mut self, data: &[f64]) -> Result<()> {
        if data.len() != self.real.len() {
            return Err(RftError::LengthMismatch {
                expected: self.real.len(),
                actual: data.len(),
            });
        }
        self.real.copy_from_slice(data);
        Ok(())
    }

    /// Sample `f` at every grid point, using the context's own coordinates.
    pub fn fill_with<F>(&mut self, f: F)
    where
        F: Fn([f64; 3]) -> f64 + Sync,
    {
        let mapper = self.mapper();
        self.real
            .par_iter_mut()
            .enumerate()
            .for_each(|(l, v)| *v = f(mapper.coordinate_at(l)));
    }

    /// Consume the context, returning the real buffer.
    pub fn into_field(self) -> Vec<f64> {
        self.real
    }
}

impl SpectralGrid for RftContext {
    fn dims(&self) -> (usize, usize, usize) {
        self.header.dims()
    }

    fn spacing(&self) -> (f64, f64, f64) {
        self.header.spacing()
    }

    fn freq_spacing(&self) -> (f64, f64, f64) {
        self.header.freq_spacing()
    }

    fn shifts(&self) -> (i64, i64, i64) {
        self.header.shifts()
    }

    fn red_dim(&self) -> usize {
        self.header.red_dim()
    }

    fn real(&self) -> &[f64] {
        &self.real
    }

    fn real_mut(&mut self) -> &mut [f64] {
        &mut self.real
    }

    fn spectrum(&self) -> &[Complex64] {
        &self.spectrum
    }

    fn spectrum_mut(&mut self) -> &mut [Complex64] {
        &mut self.spectrum
    }

    fn execute_forward(&mut self) {
        trace!("execute r2c {:?}", self.header.dims());
        self.workspace.forward(&self.real, &mut self.spectrum);
    }

    fn execute_backward(&mut self) {
        trace!("execute c2r {:?}", self.header.dims());
        self.workspace.backward(&self.spectrum, &mut self.real);
    }
}
