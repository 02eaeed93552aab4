use super::model::TargetTable;
use crate::modules::serialization::{format_amount, format_fixed_f64, format_left, format_right};
use crate::modules::table::PercentageTable;

const NAME_WIDTH: usize = 15;
const CELL_WIDTH: usize = 10;
const CELL_PRECISION: usize = 1;
const BANNER_WIDTH: usize = 80;
const RULE_WIDTH: usize = 65;
const BOM_HEADER: &str = "BOM";
const NOT_APPLICABLE: &str = "n/a";

/// Renders the percentage table, the target table with its BOM column and the
/// raw material grand total as fixed-width text.
pub fn render_report(percentages: &PercentageTable, target: &TargetTable) -> String {
    let banner = "=".repeat(BANNER_WIDTH);
    let rule = "-".repeat(RULE_WIDTH);
    let mut lines = vec![
        format!("\n{banner}"),
        "MATERIAL REQUIREMENTS PLANNING RESULTS".to_string(),
        format!("Target Amount: {}", format_amount(target.target_amount())),
        banner.clone(),
    ];

    lines.push("\nPERCENTAGE TABLE (Original):".to_string());
    lines.push(rule.clone());
    lines.push(header_line(percentages.mix_names(), None));
    for (row, name) in percentages.ingredient_names().iter().enumerate() {
        lines.push(value_line(name, percentages.row(row), None));
    }

    lines.push("\nTARGET TABLE (Calculated):".to_string());
    lines.push(rule);
    lines.push(header_line(target.mix_names(), Some(BOM_HEADER)));
    let raw_material_totals = target.raw_material_totals();
    for (row, name) in target.ingredient_names().iter().enumerate() {
        let bom = raw_material_totals
            .get(row)
            .map(|total| format_fixed_f64(*total, CELL_WIDTH, CELL_PRECISION))
            .unwrap_or_else(|| format_right(NOT_APPLICABLE, CELL_WIDTH));
        lines.push(value_line(name, target.row(row), Some(bom.as_str())));
    }

    lines.push(format!(
        "\nTotal raw materials needed: {:.1}",
        target.grand_total()
    ));
    lines.push(format!("\n{banner}"));
    lines.push("\n".to_string());

    lines.join("\n")
}

fn header_line(mix_names: &[String], trailing: Option<&str>) -> String {
    let mut line = format_left("", NAME_WIDTH);
    for name in mix_names.iter().map(String::as_str).chain(trailing) {
        line.push_str(&format_right(name, CELL_WIDTH));
    }
    line
}

fn value_line(name: &str, values: &[f64], trailing: Option<&str>) -> String {
    let mut line = format_left(name, NAME_WIDTH);
    for value in values {
        line.push_str(&format_fixed_f64(*value, CELL_WIDTH, CELL_PRECISION));
    }
    if let Some(trailing) = trailing {
        line.push_str(trailing);
    }
    line
}
