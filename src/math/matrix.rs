use std::ops::{Add, Mul, Sub};

use super::vector::Vector3;

/// A 3x3 matrix of f64 coefficients.
///
/// Storage is a column-major array of 9 elements: the value at row `r`,
/// column `c` lives at index `3 * c + r`. All constructors and accessors
/// speak rows and columns, so the storage order only matters when a matrix
/// is built from or exported as a raw array.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Matrix3 {
    m: [f64; 9],
}

#[inline]
const fn idx(r: usize, c: usize) -> usize {
    3 * c + r
}

impl Matrix3 {
    pub const ZERO: Self = Self::from_col_major([0.0; 9]);
    pub const IDENTITY: Self =
        Self::from_col_major([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);

    /// Builds a matrix from a column-major coefficient array.
    #[inline]
    pub const fn from_col_major(m: [f64; 9]) -> Self {
        Self { m }
    }

    /// Builds a matrix from a row-major coefficient array.
    pub const fn from_row_major(a: [f64; 9]) -> Self {
        let mut m = [0.0; 9];
        let mut r = 0;
        while r < 3 {
            let mut c = 0;
            while c < 3 {
                m[idx(r, c)] = a[3 * r + c];
                c += 1;
            }
            r += 1;
        }
        Self { m }
    }

    #[inline]
    pub fn from_rows(a: Vector3, b: Vector3, c: Vector3) -> Self {
        Self::from_cols(a, b, c).transpose()
    }

    #[inline]
    pub fn from_cols(a: Vector3, b: Vector3, c: Vector3) -> Self {
        Self::from_col_major([a.x, a.y, a.z, b.x, b.y, b.z, c.x, c.y, c.z])
    }

    #[inline]
    pub fn diagonal(v: Vector3) -> Self {
        Self::from_col_major([v.x, 0.0, 0.0, 0.0, v.y, 0.0, 0.0, 0.0, v.z])
    }

    #[inline]
    pub const fn to_col_major(self) -> [f64; 9] {
        self.m
    }

    /// Single coefficient at row `r`, column `c`.
    #[inline]
    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.m[idx(r, c)]
    }

    #[inline]
    pub fn row(&self, r: usize) -> Vector3 {
        Vector3::new(self.m[idx(r, 0)], self.m[idx(r, 1)], self.m[idx(r, 2)])
    }

    #[inline]
    pub fn col(&self, c: usize) -> Vector3 {
        Vector3::new(self.m[idx(0, c)], self.m[idx(1, c)], self.m[idx(2, c)])
    }

    /// Copy of the matrix with row `r` replaced by `v`.
    pub fn with_row(&self, r: usize, v: Vector3) -> Self {
        let mut out = *self;
        for c in 0..3 {
            out.m[idx(r, c)] = v[c];
        }
        out
    }

    /// Copy of the matrix with column `c` replaced by `v`.
    pub fn with_col(&self, c: usize, v: Vector3) -> Self {
        let mut out = *self;
        for r in 0..3 {
            out.m[idx(r, c)] = v[r];
        }
        out
    }

    pub fn transpose(&self) -> Self {
        let mut m = [0.0; 9];
        for r in 0..3 {
            for c in 0..3 {
                m[idx(r, c)] = self.m[idx(c, r)];
            }
        }
        Self { m }
    }

    /// Inverts the matrix by Gauss-Jordan elimination with partial pivoting:
    /// each elimination column picks the remaining row with the
    /// largest-magnitude pivot candidate. Returns `None` when the matrix is
    /// singular, i.e. a selected pivot is exactly zero. No tolerance is
    /// applied; a nearly singular matrix inverts to huge coefficients rather
    /// than `None`.
    pub fn inverse(&self) -> Option<Self> {
        let mut work = self.m;
        let mut ret = Self::IDENTITY.m;

        for col in 0..3 {
            // Pick the row with the greatest pivot
            let mut max_row = col;
            for row in col + 1..3 {
                if work[idx(row, col)].abs() > work[idx(max_row, col)].abs() {
                    max_row = row;
                }
            }
            if work[idx(max_row, col)] == 0.0 {
                return None;
            }

            // Scale the rest of the row in the work matrix as if the pivot had
            // been scaled to 1; scale the whole return matrix row
            let pivot_scale = 1.0 / work[idx(max_row, col)];
            for c in col + 1..3 {
                work[idx(max_row, c)] *= pivot_scale;
            }
            for c in 0..3 {
                ret[idx(max_row, c)] *= pivot_scale;
            }

            // Swap the pivot row into place. The pivot column itself still
            // participates in the elimination pass below, so it swaps too.
            for c in col..3 {
                work.swap(idx(max_row, c), idx(col, c));
            }
            for c in 0..3 {
                ret.swap(idx(max_row, c), idx(col, c));
            }

            // Subtract from the other rows; only the work columns to the right
            // of the pivot need updating, but all return matrix columns do.
            for r in 0..3 {
                if r == col {
                    continue;
                }
                let elim_scale = work[idx(r, col)];
                for c in col + 1..3 {
                    work[idx(r, c)] -= elim_scale * work[idx(col, c)];
                }
                for c in 0..3 {
                    ret[idx(r, c)] -= elim_scale * ret[idx(col, c)];
                }
            }
        }

        Some(Self { m: ret })
    }
}

impl Add for Matrix3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut m = self.m;
        for (a, b) in m.iter_mut().zip(rhs.m.iter()) {
            *a += b;
        }
        Self { m }
    }
}

impl Sub for Matrix3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let mut m = self.m;
        for (a, b) in m.iter_mut().zip(rhs.m.iter()) {
            *a -= b;
        }
        Self { m }
    }
}

impl Mul for Matrix3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut m = [0.0; 9];
        for r in 0..3 {
            for c in 0..3 {
                m[idx(r, c)] = self.row(r).dot(rhs.col(c));
            }
        }
        Self { m }
    }
}

impl Mul<Vector3> for Matrix3 {
    type Output = Vector3;

    #[inline]
    fn mul(self, v: Vector3) -> Vector3 {
        Vector3::new(self.row(0).dot(v), self.row(1).dot(v), self.row(2).dot(v))
    }
}

impl Mul<f64> for Matrix3 {
    type Output = Self;

    fn mul(self, s: f64) -> Self {
        let mut m = self.m;
        for a in m.iter_mut() {
            *a *= s;
        }
        Self { m }
    }
}

impl Mul<Matrix3> for f64 {
    type Output = Matrix3;

    #[inline]
    fn mul(self, m: Matrix3) -> Matrix3 {
        m * self
    }
}
