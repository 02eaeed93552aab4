use crate::domain::ItemKind;
use crate::modules::table::PercentageTable;
use crate::numerics::{Matrix, stable_sum};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixRequirement {
    pub name: String,
    pub column: usize,
    pub row: usize,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialTotal {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemAmounts {
    pub name: String,
    pub kind: ItemKind,
    pub amounts: Vec<f64>,
}

/// Serializable view of a [`TargetTable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementsSummary {
    pub target_amount: f64,
    pub mix_names: Vec<String>,
    pub mixes: Vec<MixRequirement>,
    pub raw_materials: Vec<MaterialTotal>,
    pub grand_total: f64,
    pub items: Vec<ItemAmounts>,
}

/// Absolute quantities with the same shape as the percentage table it was
/// exploded from. `amount(i, j)` is how much of item `i` goes into mix `j`,
/// except on mix `j`'s own row where it holds the mix's required batch.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetTable {
    target_amount: f64,
    mix_names: Vec<String>,
    ingredient_names: Vec<String>,
    raw_material_count: usize,
    mixes: Vec<MixRequirement>,
    amounts: Matrix,
}

impl TargetTable {
    pub(super) fn new(
        table: &PercentageTable,
        target_amount: f64,
        amounts: Matrix,
        mix_amounts: &[f64],
    ) -> Self {
        let mixes = table
            .mixes()
            .iter()
            .zip(mix_amounts)
            .map(|(mix, amount)| MixRequirement {
                name: mix.name.clone(),
                column: mix.column,
                row: mix.row,
                amount: *amount,
            })
            .collect();

        Self {
            target_amount,
            mix_names: table.mix_names().to_vec(),
            ingredient_names: table.ingredient_names().to_vec(),
            raw_material_count: table.raw_material_count(),
            mixes,
            amounts,
        }
    }

    pub const fn target_amount(&self) -> f64 {
        self.target_amount
    }

    pub fn rows(&self) -> usize {
        self.amounts.rows()
    }

    pub fn columns(&self) -> usize {
        self.amounts.columns()
    }

    pub fn mix_names(&self) -> &[String] {
        &self.mix_names
    }

    pub fn ingredient_names(&self) -> &[String] {
        &self.ingredient_names
    }

    pub fn raw_material_names(&self) -> &[String] {
        &self.ingredient_names[..self.raw_material_count]
    }

    pub const fn raw_material_count(&self) -> usize {
        self.raw_material_count
    }

    pub fn mixes(&self) -> &[MixRequirement] {
        &self.mixes
    }

    pub fn value(&self, row: usize, column: usize) -> f64 {
        self.amounts.get(row, column)
    }

    pub fn row(&self, row: usize) -> &[f64] {
        self.amounts.row(row)
    }

    /// # Panics
    ///
    /// Panics if `column >= self.columns()`; [`value`](Self::value) and
    /// [`row`](Self::row) panic the same way. Use
    /// [`mix_total`](Self::mix_total) for a checked lookup.
    pub fn column(&self, column: usize) -> impl Iterator<Item = f64> + '_ {
        self.amounts.column(column)
    }

    /// Required batch of the mix produced by `column`; the target amount for the final mix.
    pub fn mix_total(&self, column: usize) -> Option<f64> {
        self.mixes.get(column).map(|mix| mix.amount)
    }

    pub fn raw_material_totals(&self) -> Vec<f64> {
        (0..self.raw_material_count)
            .map(|row| stable_sum(self.amounts.row(row).iter().copied()))
            .collect()
    }

    pub fn grand_total(&self) -> f64 {
        stable_sum(self.raw_material_totals())
    }

    pub fn summary(&self) -> RequirementsSummary {
        let raw_materials = self
            .raw_material_names()
            .iter()
            .zip(self.raw_material_totals())
            .map(|(name, amount)| MaterialTotal {
                name: name.clone(),
                amount,
            })
            .collect();
        let items = self
            .ingredient_names
            .iter()
            .enumerate()
            .map(|(row, name)| ItemAmounts {
                name: name.clone(),
                kind: if row < self.raw_material_count {
                    ItemKind::RawMaterial
                } else {
                    ItemKind::Mix
                },
                amounts: self.amounts.row(row).to_vec(),
            })
            .collect();

        RequirementsSummary {
            target_amount: self.target_amount,
            mix_names: self.mix_names.clone(),
            mixes: self.mixes.clone(),
            raw_materials,
            grand_total: self.grand_total(),
            items,
        }
    }
}
