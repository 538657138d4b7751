//! Half-space representation `H x <= h`.

use nalgebra::{DMatrix, DVector};

/// Inequality system `matrix * x <= bound`.
#[derive(Clone, Debug, PartialEq)]
pub struct HalfSpaces {
    pub matrix: DMatrix<f64>,
    pub bound: DVector<f64>,
}

impl HalfSpaces {
    /// Convert homogeneous inequality rows `[b, a]` (`b + a x >= 0`) into
    /// `-a x <= b`.
    ///
    /// Each row listed in `linearity` holds with equality and additionally
    /// contributes the reversed inequality `a x <= -b`, appended after all
    /// regular rows. Rows whose coefficients are all within `tolerance` of
    /// zero constrain nothing and are dropped.
    pub fn from_inequality_rows(rows: &DMatrix<f64>, linearity: &[usize], tolerance: f64) -> Self {
        let n = rows.ncols().saturating_sub(1);
        let is_trivial =
            |i: usize| rows.row(i).columns(1, n).iter().all(|v| v.abs() <= tolerance);

        let kept: Vec<usize> = (0..rows.nrows()).filter(|&i| !is_trivial(i)).collect();
        let equalities: Vec<usize> = linearity
            .iter()
            .copied()
            .filter(|&i| i < rows.nrows() && !is_trivial(i))
            .collect();

        let total = kept.len() + equalities.len();
        let mut matrix = DMatrix::zeros(total, n);
        let mut bound = DVector::zeros(total);
        for (k, &i) in kept.iter().enumerate() {
            bound[k] = rows[(i, 0)];
            for j in 0..n {
                matrix[(k, j)] = -rows[(i, j + 1)];
            }
        }
        for (k, &i) in equalities.iter().enumerate() {
            let r = kept.len() + k;
            bound[r] = -rows[(i, 0)];
            for j in 0..n {
                matrix[(r, j)] = rows[(i, j + 1)];
            }
        }
        Self { matrix, bound }
    }

    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.nrows() == 0
    }

    pub fn dim(&self) -> usize {
        self.matrix.ncols()
    }

    /// `H x - h`; every entry is `<= 0` inside the set.
    pub fn violation(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.matrix * x - &self.bound
    }

    /// Whether every row satisfies `H_i x - h_i <= tolerance`.
    pub fn contains(&self, x: &DVector<f64>, tolerance: f64) -> bool {
        self.violation(x).iter().all(|&v| v <= tolerance)
    }
}
