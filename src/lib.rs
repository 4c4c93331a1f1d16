//! rft-core: spectral differentiation on uniform 3D grids
//!
//! A real scalar field is transformed to a Hermitian-packed spectrum,
//! multiplied by a polynomial in the frequency components, and transformed
//! back.
//!
//! # Modules
//! - `grid`: Grid geometry header (dimensions, spacing, centering shifts)
//! - `fft`: Real-to-complex 3D FFT workspace using rustfft
//! - `context`: `SpectralGrid` capability trait and the `RftContext` buffers
//! - `mapper`: Buffer offset -> frequency / coordinate mapping
//! - `transform`: Normalized forward/backward transforms
//! - `diff`: First/second partial derivatives and the Laplacian
//! - `nifti_io`: Loading and saving fields as NIfTI
//!
//! ```no_run
//! use rft_core::{diff, GridHeader, RftContext, SpectralGrid};
//!
//! let header = GridHeader::new(32, 32, 32, 0.1, 0.1, 0.1)?;
//! let mut ctx = RftContext::new(header)?;
//! ctx.fill_with(|[x, y, z]| (-(x * x + y * y + z * z)).exp());
//! diff::laplace(&mut ctx);
//! let lap = ctx.real();
//! # let _ = lap;
//! # Ok::<(), rft_core::RftError>(())
//! ```

// Core modules
pub mod error;
pub mod grid;
pub mod fft;
pub mod context;
pub mod mapper;

// Differentiation
pub mod transform;
pub mod diff;

// I/O modules
pub mod nifti_io;

pub use context::{RftContext, SpectralGrid};
pub use diff::{Axis, Order, SpectralOperator};
pub use error::{Result, RftError};
pub use grid::GridHeader;
pub use mapper::IndexMapper;
pub use transform::Direction;
