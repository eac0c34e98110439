use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Anything with a two-dimensional (rows, columns) shape
pub trait Shape {
    fn n_rows(&self) -> usize;
    fn n_cols(&self) -> usize;

    fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols())
    }
}

/// A lightweight row-major Matrix abstraction that does almost nothing.
///
/// Data sets are stored with one observation per row and one feature per
/// column. Component parameters are stored with one component per row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matrix<T> {
    n_rows: usize,
    n_cols: usize,
    values: Vec<T>,
}

impl<T> Matrix<T> {
    /// Build a matrix from row-major values
    ///
    /// # Panics
    ///
    /// Panics if `values.len()` is not a multiple of `n_rows`
    pub fn from_raw_parts(values: Vec<T>, n_rows: usize) -> Self {
        let n_cols = if n_rows == 0 { 0 } else { values.len() / n_rows };
        assert_eq!(values.len(), n_rows * n_cols);
        Matrix {
            n_rows,
            n_cols,
            values,
        }
    }

    /// Create a new Matrix from a vector of row vectors
    ///
    /// # Panics
    ///
    /// Panics if the rows are not all the same length
    ///
    /// # Example
    ///
    /// ```rust
    /// # use iagm_utils::{Matrix, Shape};
    /// let mat = Matrix::from_vecs(vec![
    ///     vec![0.0, 1.0, 2.0],
    ///     vec![3.0, 4.0, 5.0],
    /// ]);
    ///
    /// assert_eq!(mat.shape(), (2, 3));
    /// assert_eq!(mat[(1, 0)], 3.0);
    /// ```
    pub fn from_vecs(vecs: Vec<Vec<T>>) -> Self {
        let n_rows = vecs.len();
        let n_cols = vecs.first().map_or(0, |row| row.len());
        let mut values = Vec::with_capacity(n_rows * n_cols);

        vecs.into_iter().for_each(|row| {
            assert_eq!(row.len(), n_cols, "Ragged rows");
            values.extend(row);
        });

        Matrix {
            n_rows,
            n_cols,
            values,
        }
    }

    #[inline]
    pub fn nelem(&self) -> usize {
        self.n_cols * self.n_rows
    }

    #[inline]
    pub fn raw_values(&self) -> &Vec<T> {
        &self.values
    }

    #[inline]
    pub fn raw_values_mut(&mut self) -> &mut Vec<T> {
        &mut self.values
    }

    /// Row `i` as a slice
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        let start = i * self.n_cols;
        &self.values[start..start + self.n_cols]
    }

    /// Create an iterator through rows
    #[inline]
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks(0) panics, so an empty-column matrix yields empty rows
        let n_cols = self.n_cols;
        (0..self.n_rows)
            .map(move |i| &self.values[i * n_cols..(i + 1) * n_cols])
    }

    /// Create an iterator down column `j`
    #[inline]
    pub fn column(&self, j: usize) -> impl Iterator<Item = &T> {
        self.values.iter().skip(j).step_by(self.n_cols.max(1))
    }
}

impl<T: Clone> Matrix<T> {
    /// An `n_rows` by `n_cols` matrix with every entry set to `value`
    pub fn filled(n_rows: usize, n_cols: usize, value: T) -> Self {
        Matrix {
            n_rows,
            n_cols,
            values: vec![value; n_rows * n_cols],
        }
    }
}

impl<T> Shape for Matrix<T> {
    #[inline]
    fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    fn n_cols(&self) -> usize {
        self.n_cols
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, ix: (usize, usize)) -> &Self::Output {
        let (i, j) = ix;
        &self.values[self.n_cols * i + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, ix: (usize, usize)) -> &mut Self::Output {
        let (i, j) = ix;
        &mut self.values[self.n_cols * i + j]
    }
}

/// Dense three-way array indexed by (observation, component, feature)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tensor3 {
    dims: (usize, usize, usize),
    values: Vec<f64>,
}

impl Tensor3 {
    pub fn zeros(n: usize, m: usize, d: usize) -> Self {
        Tensor3 {
            dims: (n, m, d),
            values: vec![0.0; n * m * d],
        }
    }

    /// Fill a tensor by evaluating `f(i, j, k)` at every index
    pub fn from_fn<F>(n: usize, m: usize, d: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> f64,
    {
        let mut values = Vec::with_capacity(n * m * d);
        for i in 0..n {
            for j in 0..m {
                for k in 0..d {
                    values.push(f(i, j, k));
                }
            }
        }
        Tensor3 {
            dims: (n, m, d),
            values,
        }
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize, usize) {
        self.dims
    }

    #[inline]
    pub fn raw_values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    fn offset(&self, i: usize, j: usize, k: usize) -> usize {
        let (_, m, d) = self.dims;
        (i * m + j) * d + k
    }
}

impl Index<(usize, usize, usize)> for Tensor3 {
    type Output = f64;

    #[inline]
    fn index(&self, ix: (usize, usize, usize)) -> &f64 {
        &self.values[self.offset(ix.0, ix.1, ix.2)]
    }
}

impl IndexMut<(usize, usize, usize)> for Tensor3 {
    #[inline]
    fn index_mut(&mut self, ix: (usize, usize, usize)) -> &mut f64 {
        let offset = self.offset(ix.0, ix.1, ix.2);
        &mut self.values[offset]
    }
}
