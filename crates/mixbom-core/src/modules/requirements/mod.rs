mod model;
mod report;

use crate::domain::{BomError, CalculationResult, Mix, validate_target_amount};
use crate::modules::table::PercentageTable;
use crate::numerics::{Matrix, compare_absolute, seed_tolerance, share_of, stable_sum};

pub use model::{ItemAmounts, MaterialTotal, MixRequirement, RequirementsSummary, TargetTable};
pub use report::render_report;

#[derive(Debug, Clone, PartialEq)]
pub struct Requirements {
    pub target_table: TargetTable,
    pub report: String,
}

pub fn compute_requirements(
    table: &PercentageTable,
    target_amount: f64,
) -> CalculationResult<Requirements> {
    let target_table = explode(table, target_amount)?;
    let report = render_report(table, &target_table);
    Ok(Requirements {
        target_table,
        report,
    })
}

/// Converts the percentage recipe into absolute quantities for `target_amount`
/// of the final mix.
///
/// The final column is seeded from the target. Earlier mixes are then visited
/// last to first: by the time mix `j` is reached, every later mix has already
/// written its demand for `j` onto `j`'s own row, so the row sum is the batch
/// size of `j`. That batch is spread over column `j` by percentage and recorded
/// on `j`'s own cell.
pub fn explode(table: &PercentageTable, target_amount: f64) -> CalculationResult<TargetTable> {
    validate_target_amount(target_amount)?;

    let rows = table.rows();
    let columns = table.columns();
    let final_mix = table.final_mix();
    let mut amounts = Matrix::zeros(rows, columns);
    let mut mix_amounts = vec![0.0; columns];

    for row in 0..rows {
        amounts.set(
            row,
            final_mix.column,
            share_of(target_amount, table.value(row, final_mix.column)),
        );
    }

    check_seed_total(
        final_mix,
        stable_sum(amounts.column(final_mix.column)),
        target_amount,
    )?;
    mix_amounts[final_mix.column] = target_amount;
    tracing::debug!(
        mix = %final_mix.name,
        column = final_mix.column,
        amount = target_amount,
        "seeded final mix"
    );

    for mix in table.mixes()[..final_mix.column].iter().rev() {
        let mix_amount = stable_sum(amounts.row(mix.row).iter().copied());
        for row in 0..rows {
            amounts.set(
                row,
                mix.column,
                share_of(mix_amount, table.value(row, mix.column)),
            );
        }
        amounts.set(mix.row, mix.column, mix_amount);
        mix_amounts[mix.column] = mix_amount;
        tracing::debug!(
            mix = %mix.name,
            column = mix.column,
            amount = mix_amount,
            "resolved mix batch"
        );
    }

    Ok(TargetTable::new(table, target_amount, amounts, &mix_amounts))
}

/// The seeded final column must add back up to the target. A validated table
/// only misses this through accumulated rounding, so the tolerance scales with
/// the target.
fn check_seed_total(
    final_mix: &Mix,
    seeded_total: f64,
    target_amount: f64,
) -> CalculationResult<()> {
    let comparison = compare_absolute(target_amount, seeded_total, seed_tolerance(target_amount));
    if comparison.passes {
        return Ok(());
    }
    tracing::error!(
        mix = %final_mix.name,
        seeded_total,
        target_amount,
        "final mix seed does not match the target"
    );
    Err(BomError::seed_mismatch(
        &final_mix.name,
        comparison.actual,
        comparison.expected,
    ))
}
