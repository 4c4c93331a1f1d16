//! NIfTI field I/O
//!
//! Loads a stored scalar field into a [`FieldVolume`] and writes one back.
//! NIfTI stores voxels with x varying fastest; fields here are row-major
//! with z fastest, so both directions transpose. Voxel sizes become the grid
//! spacing. Gzip (.nii.gz) input is auto-detected.

use std::io::{Cursor, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use ndarray::Array;
use nifti::volume::ndarray::IntoNdArray;
use nifti::{InMemNiftiObject, NiftiHeader, NiftiObject};

use crate::context::RftContext;
use crate::error::{Result, RftError};
use crate::fft::idx3d;
use crate::grid::GridHeader;

const HEADER_SIZE: usize = 348;
const VOX_OFFSET: usize = 352;

/// A real field together with its grid geometry
#[derive(Debug, Clone)]
pub struct FieldVolume {
    /// Samples, row-major (z fastest)
    pub data: Vec<f64>,
    pub header: GridHeader,
    /// Affine transformation matrix (4x4, row-major)
    pub affine: [f64; 16],
}

impl FieldVolume {
    /// Wrap `data` with an axis-aligned affine built from the spacing.
    pub fn new(header: GridHeader, data: Vec<f64>) -> Result<Self> {
        header.validate()?;
        if data.len() != header.dim() {
            return Err(RftError::LengthMismatch {
                expected: header.dim(),
                actual: data.len(),
            });
        }
        let (dx, dy, dz) = header.spacing();
        Ok(Self {
            data,
            header,
            affine: [
                dx, 0.0, 0.0, 0.0,
                0.0, dy, 0.0, 0.0,
                0.0, 0.0, dz, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ],
        })
    }

    /// Build a differentiation context holding this field.
    pub fn into_context(self) -> Result<RftContext> {
        RftContext::with_field(self.header, &self.data)
    }
}

/// Check if bytes are gzip compressed
fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

/// Load a field from NIfTI bytes (.nii or .nii.gz)
///
/// Only the first volume of 4D data is read.
pub fn load_field(bytes: &[u8]) -> Result<FieldVolume> {
    let obj: InMemNiftiObject = if is_gzip(bytes) {
        InMemNiftiObject::from_reader(GzDecoder::new(Cursor::new(bytes)))
            .map_err(|e| RftError::Nifti(format!("failed to read gzipped NIfTI: {}", e)))?
    } else {
        InMemNiftiObject::from_reader(Cursor::new(bytes))
            .map_err(|e| RftError::Nifti(format!("failed to read NIfTI: {}", e)))?
    };

    let nifti_header = obj.header();
    let ndim = nifti_header.dim[0];
    if !(3..=4).contains(&ndim) {
        return Err(RftError::Nifti(format!("expected a 3D or 4D volume, got {}D", ndim)));
    }

    let spacing = (
        nifti_header.pixdim[1] as f64,
        nifti_header.pixdim[2] as f64,
        nifti_header.pixdim[3] as f64,
    );
    let affine = get_affine(nifti_header);

    let array: Array<f64, _> = obj.into_volume()
        .into_ndarray()
        .map_err(|e| RftError::Nifti(format!("failed to convert to ndarray: {}", e)))?;
    let shape = array.shape().to_vec();
    if shape.len() < 3 || shape.len() > 4 {
        return Err(RftError::Nifti(format!("expected a 3D or 4D array, got {}D", shape.len())));
    }

    // Use the array shape, nifti-rs may have reordered the header dims
    let (nx, ny, nz) = (shape[0], shape[1], shape[2]);
    let header = GridHeader::new(nx, ny, nz, spacing.0, spacing.1, spacing.2)?;

    let mut data = Vec::with_capacity(header.dim());
    for i in 0..nx {
        for j in 0..ny {
            for k in 0..nz {
                let v = if shape.len() == 3 {
                    array[[i, j, k]]
                } else {
                    array[[i, j, k, 0]]
                };
                data.push(v);
            }
        }
    }

    debug!("loaded NIfTI field {}x{}x{}, spacing {:?}", nx, ny, nz, spacing);
    Ok(FieldVolume { data, header, affine })
}

/// Get affine transformation matrix from header
fn get_affine(header: &NiftiHeader) -> [f64; 16] {
    // Prefer sform if available (sform_code > 0)
    if header.sform_code > 0 {
        let s = &header.srow_x;
        let t = &header.srow_y;
        let u = &header.srow_z;
        [
            s[0] as f64, s[1] as f64, s[2] as f64, s[3] as f64,
            t[0] as f64, t[1] as f64, t[2] as f64, t[3] as f64,
            u[0] as f64, u[1] as f64, u[2] as f64, u[3] as f64,
            0.0, 0.0, 0.0, 1.0,
        ]
    } else {
        let vsx = header.pixdim[1] as f64;
        let vsy = header.pixdim[2] as f64;
        let vsz = header.pixdim[3] as f64;
        [
            vsx, 0.0, 0.0, 0.0,
            0.0, vsy, 0.0, 0.0,
            0.0, 0.0, vsz, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ]
    }
}

/// Encode a field as uncompressed NIfTI-1 bytes (float32 samples)
pub fn save_field(volume: &FieldVolume) -> Result<Vec<u8>> {
    let (nx, ny, nz) = volume.header.dims();
    let (dx, dy, dz) = volume.header.spacing();
    if nx > i16::MAX as usize || ny > i16::MAX as usize || nz > i16::MAX as usize {
        return Err(RftError::Nifti(format!(
            "dimensions {}x{}x{} exceed the NIfTI-1 limit",
            nx, ny, nz
        )));
    }
    if volume.data.len() != volume.header.dim() {
        return Err(RftError::LengthMismatch {
            expected: volume.header.dim(),
            actual: volume.data.len(),
        });
    }

    let mut header = [0u8; HEADER_SIZE];

    // sizeof_hdr
    header[0..4].copy_from_slice(&(HEADER_SIZE as i32).to_le_bytes());

    // dim[0..7]
    let dim: [i16; 8] = [3, nx as i16, ny as i16, nz as i16, 1, 1, 1, 1];
    for (i, &d) in dim.iter().enumerate() {
        let offset = 40 + i * 2;
        header[offset..offset + 2].copy_from_slice(&d.to_le_bytes());
    }

    // datatype = 16 (FLOAT32), bitpix = 32
    header[70..72].copy_from_slice(&16i16.to_le_bytes());
    header[72..74].copy_from_slice(&32i16.to_le_bytes());

    // pixdim[0..7]
    let pixdim: [f32; 8] = [1.0, dx as f32, dy as f32, dz as f32, 1.0, 1.0, 1.0, 1.0];
    for (i, &p) in pixdim.iter().enumerate() {
        let offset = 76 + i * 4;
        header[offset..offset + 4].copy_from_slice(&p.to_le_bytes());
    }

    header[108..112].copy_from_slice(&(VOX_OFFSET as f32).to_le_bytes());
    // scl_slope = 1, scl_inter = 0
    header[112..116].copy_from_slice(&1.0f32.to_le_bytes());
    header[116..120].copy_from_slice(&0.0f32.to_le_bytes());

    // sform_code = 1 (scanner anat)
    header[254..256].copy_from_slice(&1i16.to_le_bytes());

    // srow_x, srow_y, srow_z
    for row in 0..3 {
        for col in 0..4 {
            let offset = 280 + row * 16 + col * 4;
            header[offset..offset + 4].copy_from_slice(&(volume.affine[row * 4 + col] as f32).to_le_bytes());
        }
    }

    header[344..348].copy_from_slice(b"n+1\0");

    let mut buffer = Vec::with_capacity(VOX_OFFSET + volume.data.len() * 4);
    buffer.write_all(&header)?;
    // Empty extension block
    buffer.write_all(&[0u8; 4])?;

    // NIfTI order: x fastest
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let v = volume.data[idx3d(i, j, k, ny, nz)] as f32;
                buffer.write_all(&v.to_le_bytes())?;
            }
        }
    }

    Ok(buffer)
}

/// Encode a field as gzipped NIfTI-1 bytes (.nii.gz)
pub fn save_field_gz(volume: &FieldVolume) -> Result<Vec<u8>> {
    let uncompressed = save_field(volume)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&uncompressed)?;
    Ok(encoder.finish()?)
}

/// Read a field from a .nii or .nii.gz file
pub fn read_field_file(path: &Path) -> Result<FieldVolume> {
    let bytes = std::fs::read(path)?;
    load_field(&bytes)
}

/// Write a field to disk, gzip compressed when the path ends with .nii.gz
pub fn save_field_to_file(path: &Path, volume: &FieldVolume) -> Result<()> {
    let bytes = if path.to_string_lossy().ends_with(".nii.gz") {
        save_field_gz(volume)?
    } else {
        save_field(volume)?
    };
    std::fs::write(path, &bytes)?;
    debug!("wrote NIfTI field to {}", path.display());
    Ok(())
}
