use crate::domain::{ItemKind, Mix};
use crate::numerics::{Matrix, nonzero_sum};

/// Validated percentage recipe.
///
/// Rows are `raw_material_names` followed by one row per mix in production order;
/// columns are mixes, the last one being the final product. Every value is a
/// non-negative percentage and every column's nonzero entries sum to 100.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentageTable {
    mix_names: Vec<String>,
    ingredient_names: Vec<String>,
    raw_material_names: Vec<String>,
    mixes: Vec<Mix>,
    percentages: Matrix,
}

impl PercentageTable {
    pub(super) fn from_validated_parts(
        mix_names: Vec<String>,
        ingredient_names: Vec<String>,
        raw_material_names: Vec<String>,
        mixes: Vec<Mix>,
        percentages: Matrix,
    ) -> Self {
        Self {
            mix_names,
            ingredient_names,
            raw_material_names,
            mixes,
            percentages,
        }
    }

    pub fn mix_names(&self) -> &[String] {
        &self.mix_names
    }

    pub fn ingredient_names(&self) -> &[String] {
        &self.ingredient_names
    }

    pub fn raw_material_names(&self) -> &[String] {
        &self.raw_material_names
    }

    pub fn mixes(&self) -> &[Mix] {
        &self.mixes
    }

    pub fn mix(&self, column: usize) -> Option<&Mix> {
        self.mixes.get(column)
    }

    pub fn final_mix(&self) -> &Mix {
        // Loading rejects tables without mixes.
        &self.mixes[self.mixes.len() - 1]
    }

    pub fn rows(&self) -> usize {
        self.percentages.rows()
    }

    pub fn columns(&self) -> usize {
        self.percentages.columns()
    }

    pub fn raw_material_count(&self) -> usize {
        self.raw_material_names.len()
    }

    /// # Panics
    ///
    /// Panics if `row` or `column` is outside the table. Bounds come from
    /// [`rows`](Self::rows) and [`columns`](Self::columns).
    pub fn value(&self, row: usize, column: usize) -> f64 {
        self.percentages.get(row, column)
    }

    pub fn row(&self, row: usize) -> &[f64] {
        self.percentages.row(row)
    }

    /// Percentages of one mix, top to bottom.
    ///
    /// # Panics
    ///
    /// Panics if `column >= self.columns()`.
    pub fn column(&self, column: usize) -> impl Iterator<Item = f64> + '_ {
        self.percentages.column(column)
    }

    pub fn column_total(&self, column: usize) -> f64 {
        nonzero_sum(self.column(column))
    }

    pub fn item_kind(&self, row: usize) -> ItemKind {
        if row < self.raw_material_count() {
            ItemKind::RawMaterial
        } else {
            ItemKind::Mix
        }
    }
}
