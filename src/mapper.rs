//! Linear offset <-> physical frequency / coordinate mapping
//!
//! Both buffers are row-major with the last axis fastest. The real buffer
//! has `nz` samples along that axis, the packed spectrum `rz = nz / 2 + 1`.

/// Copy of the grid geometry needed to map buffer offsets.
///
/// Taken once before a parallel loop so each iteration can look up its
/// frequency without borrowing the context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexMapper {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub rz: usize,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub dkx: f64,
    pub dky: f64,
    pub dkz: f64,
    pub shift_x: i64,
    pub shift_y: i64,
    pub shift_z: i64,
}

impl IndexMapper {
    pub fn new(
        (nx, ny, nz): (usize, usize, usize),
        (dx, dy, dz): (f64, f64, f64),
        (dkx, dky, dkz): (f64, f64, f64),
        (shift_x, shift_y, shift_z): (i64, i64, i64),
    ) -> Self {
        Self {
            nx, ny, nz,
            rz: nz / 2 + 1,
            dx, dy, dz,
            dkx, dky, dkz,
            shift_x, shift_y, shift_z,
        }
    }

    /// Physical frequency `(kx, ky, kz)` of packed offset `l` in `[0, nx*ny*rz)`.
    ///
    /// The x and y indices are folded into a signed range centered on zero.
    /// The packed z index is reduced modulo `rz - 1`, which sends the Nyquist
    /// bin of an even-length axis to zero; for `nz == 1` it is always zero.
    #[inline]
    pub fn frequency_at(&self, l: usize) -> [f64; 3] {
        let (i, j, k) = split(l, self.ny, self.rz);
        let kx = fold(i, self.shift_x, self.nx);
        let ky = fold(j, self.shift_y, self.ny);
        let kz = if self.rz > 1 { k % (self.rz - 1) } else { 0 };
        [
            self.dkx * kx as f64,
            self.dky * ky as f64,
            self.dkz * kz as f64,
        ]
    }

    /// Physical coordinate `(x, y, z)` of real offset `l` in `[0, nx*ny*nz)`.
    #[inline]
    pub fn coordinate_at(&self, l: usize) -> [f64; 3] {
        let (i, j, k) = split(l, self.ny, self.nz);
        [
            (i as i64 - self.shift_x) as f64 * self.dx,
            (j as i64 - self.shift_y) as f64 * self.dy,
            (k as i64 - self.shift_z) as f64 * self.dz,
        ]
    }

    #[inline]
    pub fn packed_index(&self, i: usize, j: usize, k: usize) -> usize {
        k + self.rz * (j + self.ny * i)
    }

    #[inline]
    pub fn real_index(&self, i: usize, j: usize, k: usize) -> usize {
        k + self.nz * (j + self.ny * i)
    }
}

/// Split a row-major offset into `(i, j, k)` for an axis-2 length of `n_last`.
#[inline]
fn split(l: usize, ny: usize, n_last: usize) -> (usize, usize, usize) {
    let i = l / (ny * n_last);
    let r = l - i * ny * n_last;
    let j = r / n_last;
    (i, j, r - j * n_last)
}

/// `((idx + shift) mod n) - shift`
#[inline]
fn fold(idx: usize, shift: i64, n: usize) -> i64 {
    (idx as i64 + shift).rem_euclid(n as i64) - shift
}
