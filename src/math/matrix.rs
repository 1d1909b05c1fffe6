use serde::{Serialize, Deserialize};

/// Row-major dense matrix.
///
/// Shapes read from model files are untrusted, so the arithmetic here is
/// checked and returns `None` on a shape mismatch instead of panicking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |row| row.len()),
            data
        }
    }

    /// A single-row matrix holding `values`.
    pub fn row(values: &[f64]) -> Matrix {
        Matrix::from_data(vec![values.to_vec()])
    }

    /// Whether `rows`/`cols` agree with the stored data.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.rows && self.data.iter().all(|row| row.len() == self.cols)
    }

    pub fn checked_add(&self, rhs: &Matrix) -> Option<Matrix> {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            return None;
        }

        let data = self.data.iter().zip(rhs.data.iter())
            .map(|(a, b)| a.iter().zip(b.iter()).map(|(x, y)| x + y).collect())
            .collect();

        Some(Matrix { rows: self.rows, cols: self.cols, data })
    }

    pub fn checked_mul(&self, rhs: &Matrix) -> Option<Matrix> {
        if self.cols != rhs.rows {
            return None;
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for (i, lhs_row) in self.data.iter().enumerate() {
            for j in 0..rhs.cols {
                let mut sum = 0.0;

                for (k, &a) in lhs_row.iter().enumerate() {
                    sum += a * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        Some(res)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}
