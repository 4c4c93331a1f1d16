//! Uniform grid geometry
//!
//! A [`GridHeader`] fixes the dimensions, spacing and centering shifts of a
//! field for the lifetime of a context. Frequency spacing follows the angular
//! convention `dk = 2π / (N·d)`, so the forward and backward normalization
//! factors multiply to `1 / (Nx·Ny·Nz)`.
//!
//! Headers can be written by hand or loaded from TOML:
//!
//! ```toml
//! nx = 64
//! ny = 64
//! nz = 32
//! dx = 0.5
//! dy = 0.5
//! dz = 1.0
//! shift_z = 0   # optional, defaults to nz / 2
//! ```

use std::f64::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RftError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridHeader {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    #[serde(default = "default_spacing")]
    pub dx: f64,
    #[serde(default = "default_spacing")]
    pub dy: f64,
    #[serde(default = "default_spacing")]
    pub dz: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_x: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_y: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_z: Option<i64>,
}

fn default_spacing() -> f64 {
    1.0
}

impl GridHeader {
    /// Create a validated header with zero-centered default shifts.
    pub fn new(
        nx: usize, ny: usize, nz: usize,
        dx: f64, dy: f64, dz: f64,
    ) -> Result<Self> {
        let header = Self {
            nx, ny, nz,
            dx, dy, dz,
            shift_x: None,
            shift_y: None,
            shift_z: None,
        };
        header.validate()?;
        Ok(header)
    }

    /// Unit-spaced header
    pub fn cube(nx: usize, ny: usize, nz: usize) -> Result<Self> {
        Self::new(nx, ny, nz, 1.0, 1.0, 1.0)
    }

    /// Override the centering shifts.
    pub fn with_shifts(mut self, shift_x: i64, shift_y: i64, shift_z: i64) -> Self {
        self.shift_x = Some(shift_x);
        self.shift_y = Some(shift_y);
        self.shift_z = Some(shift_z);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.nx == 0 || self.ny == 0 || self.nz == 0 {
            return Err(RftError::InvalidGrid(format!(
                "dimensions must be positive, got {}x{}x{}",
                self.nx, self.ny, self.nz
            )));
        }
        for (axis, d) in [("dx", self.dx), ("dy", self.dy), ("dz", self.dz)] {
            if !d.is_finite() || d <= 0.0 {
                return Err(RftError::InvalidGrid(format!(
                    "{} must be positive and finite, got {}",
                    axis, d
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a header from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let header: GridHeader = toml::from_str(text)?;
        header.validate()?;
        Ok(header)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    /// Packed length of the last axis in the Hermitian layout: `nz / 2 + 1`
    pub fn red_dim(&self) -> usize {
        self.nz / 2 + 1
    }

    pub fn dim(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    pub fn dim_fs(&self) -> usize {
        self.nx * self.ny * self.red_dim()
    }

    pub fn spacing(&self) -> (f64, f64, f64) {
        (self.dx, self.dy, self.dz)
    }

    pub fn freq_spacing(&self) -> (f64, f64, f64) {
        (
            2.0 * PI / (self.nx as f64 * self.dx),
            2.0 * PI / (self.ny as f64 * self.dy),
            2.0 * PI / (self.nz as f64 * self.dz),
        )
    }

    /// Centering shifts, defaulting to half of each dimension.
    pub fn shifts(&self) -> (i64, i64, i64) {
        (
            self.shift_x.unwrap_or((self.nx / 2) as i64),
            self.shift_y.unwrap_or((self.ny / 2) as i64),
            self.shift_z.unwrap_or((self.nz / 2) as i64),
        )
    }
}
