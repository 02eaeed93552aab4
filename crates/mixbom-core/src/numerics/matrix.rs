/// Dense row-major matrix of `f64`, rows are items and columns are mixes.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    columns: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            data: vec![0.0; rows * columns],
        }
    }

    /// Builds a matrix from equally sized rows; returns `None` on ragged input.
    pub fn from_rows(rows: &[Vec<f64>], columns: usize) -> Option<Self> {
        if rows.iter().any(|row| row.len() != columns) {
            return None;
        }

        Some(Self {
            rows: rows.len(),
            columns,
            data: rows.iter().flatten().copied().collect(),
        })
    }

    pub const fn rows(&self) -> usize {
        self.rows
    }

    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// # Panics
    ///
    /// Panics if the cell lies outside the matrix, as do [`Matrix::set`],
    /// [`Matrix::row`] and [`Matrix::column`].
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.data[self.offset(row, column)]
    }

    pub fn set(&mut self, row: usize, column: usize, value: f64) {
        let offset = self.offset(row, column);
        self.data[offset] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let start = self.offset(row, 0);
        &self.data[start..start + self.columns]
    }

    /// The range check runs on the call, not on the first `next`.
    pub fn column(&self, column: usize) -> impl Iterator<Item = f64> + '_ {
        assert!(column < self.columns, "column {column} out of range");
        self.data.iter().skip(column).step_by(self.columns).copied()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().copied()
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows).map(|row| self.row(row).to_vec()).collect()
    }

    fn offset(&self, row: usize, column: usize) -> usize {
        assert!(
            row < self.rows && column < self.columns,
            "cell ({row}, {column}) out of range for {}x{} matrix",
            self.rows,
            self.columns
        );
        row * self.columns + column
    }
}
