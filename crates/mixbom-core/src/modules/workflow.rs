use super::requirements::{Requirements, compute_requirements};
use super::table::{LoadedTable, load_raw_rows};
use super::traits::{ProductSource, ReportSink, StoredReport};
use crate::domain::{BomResult, CalculationRequest};
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct CalculationOutcome {
    pub product: String,
    pub loaded: LoadedTable,
    pub requirements: Requirements,
    pub stored: Option<StoredReport>,
}

pub fn validate_product(source: &dyn ProductSource, product: &str) -> BomResult<LoadedTable> {
    let rows = source.load_rows(product)?;
    load_raw_rows(&rows)
}

/// Loads the product's table afresh and computes its requirements without
/// persisting anything.
pub fn plan_product(
    source: &dyn ProductSource,
    request: &CalculationRequest,
) -> BomResult<CalculationOutcome> {
    let loaded = validate_product(source, request.product_name())?;
    let requirements = compute_requirements(&loaded.table, request.target_amount())?;
    tracing::info!(
        product = request.product_name(),
        target_amount = request.target_amount(),
        grand_total = requirements.target_table.grand_total(),
        "calculated requirements"
    );

    Ok(CalculationOutcome {
        product: request.product_name().to_string(),
        loaded,
        requirements,
        stored: None,
    })
}

pub fn calculate_bom(
    source: &dyn ProductSource,
    sink: &dyn ReportSink,
    request: &CalculationRequest,
    timestamp: NaiveDateTime,
) -> BomResult<CalculationOutcome> {
    let mut outcome = plan_product(source, request)?;
    let stored = sink.store(&outcome.product, timestamp, &outcome.requirements.report)?;
    outcome.stored = Some(stored);
    Ok(outcome)
}
