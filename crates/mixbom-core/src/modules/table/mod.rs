mod model;
mod parser;

use crate::domain::{BomError, Mix, TableResult};
use crate::numerics::{COLUMN_SUM_TOLERANCE, Matrix, PERCENT_SCALE, compare_absolute, nonzero_sum};
use serde::Serialize;
use std::collections::BTreeSet;

pub use model::PercentageTable;
pub use parser::{CellValue, CellWarning, CellWarningKind, RawRows, parse_csv_bytes, parse_csv_rows};

use parser::{parse_header, parse_ingredient_rows};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub raw_materials: usize,
    pub mixes: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub table: PercentageTable,
    pub summary: LoadSummary,
    pub warnings: Vec<CellWarning>,
}

/// Parses and validates raw rows: header first (mix names from field 2 on),
/// then one row per ingredient. Cell warnings number rows from line 1.
pub fn load_table(raw_rows: &[Vec<String>]) -> TableResult<LoadedTable> {
    let lines = (1..=raw_rows.len()).collect::<Vec<_>>();
    load_located(raw_rows, &lines)
}

/// [`load_table`] for rows read from CSV; cell warnings carry the source line
/// of each record.
pub fn load_raw_rows(raw: &RawRows) -> TableResult<LoadedTable> {
    load_located(raw.rows(), raw.lines())
}

fn load_located(raw_rows: &[Vec<String>], lines: &[usize]) -> TableResult<LoadedTable> {
    let Some((header, body)) = raw_rows.split_first() else {
        return Err(BomError::structural(
            "INPUT.EMPTY_HEADER",
            "percentage table has no rows",
        ));
    };
    if lines.len() != raw_rows.len() {
        return Err(BomError::internal(
            "SYS.TABLE_SHAPE",
            "raw rows and their source lines differ in length",
        ));
    }

    let mix_names = parse_header(header);
    if mix_names.is_empty() {
        return Err(BomError::structural(
            "INPUT.EMPTY_HEADER",
            "header row does not name any mix",
        ));
    }
    reject_duplicate_mix_names(&mix_names)?;

    let parsed = parse_ingredient_rows(body, &lines[1..], mix_names.len());
    if parsed.ingredient_names.is_empty() {
        return Err(BomError::structural(
            "INPUT.NO_DATA_ROWS",
            "percentage table has no ingredient rows",
        ));
    }

    let row_count = parsed.ingredient_names.len();
    let mix_count = mix_names.len();
    if row_count < mix_count {
        return Err(BomError::structural(
            "INPUT.TOO_FEW_ROWS",
            format!(
                "percentage table has {} ingredient rows but {} mixes; every mix needs its own row",
                row_count, mix_count
            ),
        ));
    }

    let raw_material_names = parsed
        .ingredient_names
        .iter()
        .filter(|name| !mix_names.contains(*name))
        .cloned()
        .collect::<Vec<_>>();
    let mixes = resolve_mix_rows(&mix_names, &parsed.ingredient_names)?;
    if raw_material_names.len() != row_count - mix_count {
        return Err(BomError::structural(
            "INPUT.MIX_ROW_ALIGNMENT",
            format!(
                "expected {} raw material rows ahead of {} mix rows, found {}",
                row_count - mix_count,
                mix_count,
                raw_material_names.len()
            ),
        ));
    }

    let percentages = Matrix::from_rows(&parsed.values, mix_count).ok_or_else(|| {
        BomError::internal(
            "SYS.TABLE_SHAPE",
            "parsed ingredient rows do not share the mix column count",
        )
    })?;

    reject_negative_percentages(&percentages, &parsed.ingredient_names, &mix_names)?;
    validate_column_sums(&percentages, &mix_names)?;
    reject_forward_references(&percentages, &mixes)?;

    let summary = LoadSummary {
        raw_materials: raw_material_names.len(),
        mixes: mix_count,
    };
    for warning in &parsed.warnings {
        tracing::warn!(
            line = warning.line,
            field = warning.field,
            kind = ?warning.kind,
            "{}",
            warning
        );
    }
    tracing::info!(
        raw_materials = summary.raw_materials,
        mixes = summary.mixes,
        warnings = parsed.warnings.len(),
        "valid percentage table"
    );

    Ok(LoadedTable {
        table: PercentageTable::from_validated_parts(
            mix_names,
            parsed.ingredient_names,
            raw_material_names,
            mixes,
            percentages,
        ),
        summary,
        warnings: parsed.warnings,
    })
}

fn reject_duplicate_mix_names(mix_names: &[String]) -> TableResult<()> {
    let mut seen = BTreeSet::new();
    for name in mix_names {
        if !seen.insert(name.as_str()) {
            return Err(BomError::structural(
                "INPUT.DUPLICATE_MIX",
                format!("mix '{}' appears more than once in the header", name),
            ));
        }
    }
    Ok(())
}

/// Binds each header mix to its ingredient row. The mix produced by column `j`
/// must sit at row `R + j`, where `R` is the raw material row count.
fn resolve_mix_rows(mix_names: &[String], ingredient_names: &[String]) -> TableResult<Vec<Mix>> {
    let raw_material_count = ingredient_names.len() - mix_names.len();

    mix_names
        .iter()
        .enumerate()
        .map(|(column, name)| {
            let row = ingredient_names
                .iter()
                .position(|ingredient| ingredient == name)
                .ok_or_else(|| {
                    BomError::structural(
                        "INPUT.MIX_ROW_MISSING",
                        format!("mix '{}' (column {}) has no ingredient row", name, column + 1),
                    )
                })?;

            let expected_row = raw_material_count + column;
            if row != expected_row {
                return Err(BomError::structural(
                    "INPUT.MIX_ROW_ALIGNMENT",
                    format!(
                        "mix '{}' (column {}) is on ingredient row {} but must be on row {} to follow production order",
                        name,
                        column + 1,
                        row + 1,
                        expected_row + 1
                    ),
                ));
            }

            Ok(Mix::new(name.clone(), column, row))
        })
        .collect()
}

fn reject_negative_percentages(
    percentages: &Matrix,
    ingredient_names: &[String],
    mix_names: &[String],
) -> TableResult<()> {
    for (row, ingredient) in ingredient_names.iter().enumerate() {
        for (column, mix) in mix_names.iter().enumerate() {
            let value = percentages.get(row, column);
            if value < 0.0 {
                return Err(BomError::structural(
                    "INPUT.NEGATIVE_PERCENTAGE",
                    format!(
                        "ingredient '{}' has negative percentage {} in mix '{}'",
                        ingredient, value, mix
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn validate_column_sums(percentages: &Matrix, mix_names: &[String]) -> TableResult<()> {
    for (column, mix) in mix_names.iter().enumerate() {
        let total = nonzero_sum(percentages.column(column));
        let comparison = compare_absolute(PERCENT_SCALE, total, COLUMN_SUM_TOLERANCE);
        if !comparison.passes {
            tracing::error!(column = column + 1, mix = %mix, sum = total, "column does not sum to 100");
            return Err(BomError::column_sum(column, mix, total));
        }
    }
    Ok(())
}

/// A mix may only consume raw materials and mixes produced by earlier columns.
fn reject_forward_references(percentages: &Matrix, mixes: &[Mix]) -> TableResult<()> {
    for consumer in mixes {
        for produced in &mixes[consumer.column..] {
            let value = percentages.get(produced.row, consumer.column);
            if value != 0.0 {
                return Err(BomError::structural(
                    "INPUT.FORWARD_REFERENCE",
                    format!(
                        "mix '{}' (column {}) uses {}% of '{}', which is not produced before it",
                        consumer.name,
                        consumer.column + 1,
                        value,
                        produced.name
                    ),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CellWarningKind, RawRows, load_raw_rows, load_table, parse_csv_rows};
    use crate::domain::{BomErrorCategory, ItemKind};

    fn rows(source: &str) -> RawRows {
        parse_csv_rows(source).expect("fixture csv should parse")
    }

    const ARTICLE_TABLE: &str = ",Mix 1,Mix 2,Mix 3,Mix 4
Raw Material 1,10,,25,
Raw Material 2,20,,,20
Raw Material 3,,50,,25
Raw Material 4,,,25,5
Raw Material 5,70,30,,
Mix 1,,20,25,20
Mix 2,,,25,10
Mix 3,,,,20
Mix 4,,,,
";

    #[test]
    fn article_table_loads_with_derived_names() {
        let loaded = load_raw_rows(&rows(ARTICLE_TABLE)).expect("article table should load");
        let table = &loaded.table;

        assert_eq!(table.mix_names(), ["Mix 1", "Mix 2", "Mix 3", "Mix 4"]);
        assert_eq!(table.raw_material_count(), 5);
        assert_eq!(table.rows(), 9);
        assert_eq!(table.columns(), 4);
        assert_eq!(
            table.ingredient_names()[..5],
            table.raw_material_names()[..]
        );
        assert_eq!(table.ingredient_names()[5..], table.mix_names()[..]);
        assert_eq!(loaded.summary.raw_materials, 5);
        assert_eq!(loaded.summary.mixes, 4);
        assert!(loaded.warnings.is_empty());

        for (column, mix) in table.mixes().iter().enumerate() {
            assert_eq!(mix.column, column);
            assert_eq!(mix.row, 5 + column);
            assert_eq!(table.item_kind(mix.row), ItemKind::Mix);
        }
        assert_eq!(table.item_kind(0), ItemKind::RawMaterial);
        assert_eq!(table.final_mix().name, "Mix 4");
        assert_eq!(table.value(5, 1), 20.0);
        assert_eq!(table.column_total(3), 100.0);
    }

    #[test]
    fn every_accepted_column_sums_to_one_hundred() {
        let loaded = load_raw_rows(&rows(ARTICLE_TABLE)).expect("article table should load");
        for column in 0..loaded.table.columns() {
            assert!((loaded.table.column_total(column) - 100.0).abs() <= 1.0e-6);
        }
    }

    #[test]
    fn column_summing_to_97_is_rejected_with_column_and_sum() {
        let error = load_raw_rows(&rows(",Blend\nSand,57\nGravel,40\nBlend,\n"))
            .expect_err("column sum 97 should fail");

        assert_eq!(error.category(), BomErrorCategory::StructuralError);
        assert_eq!(error.code(), "INPUT.COLUMN_SUM");
        assert_eq!(
            error.message(),
            "column 1 ('Blend') does not sum to 100 (sum = 97)"
        );
    }

    #[test]
    fn column_sum_within_tolerance_is_accepted() {
        let loaded = load_raw_rows(&rows(",Blend\nSand,60.0000004\nGravel,39.9999999\nBlend,\n"))
            .expect("sum within 1e-6 should load");
        assert_eq!(loaded.summary.raw_materials, 2);
    }

    #[test]
    fn empty_inputs_are_structural_errors() {
        let error = load_table(&[]).expect_err("no rows should fail");
        assert_eq!(error.code(), "INPUT.EMPTY_HEADER");

        let error = load_raw_rows(&rows(",,\nSand,100\n")).expect_err("blank header should fail");
        assert_eq!(error.code(), "INPUT.EMPTY_HEADER");

        let error = load_raw_rows(&rows(",Blend\n")).expect_err("header only should fail");
        assert_eq!(error.code(), "INPUT.NO_DATA_ROWS");
    }

    #[test]
    fn duplicate_mix_names_are_rejected() {
        let error = load_raw_rows(&rows(",Blend,Blend\nSand,100,50\nBlend,,50\n"))
            .expect_err("duplicate mix should fail");
        assert_eq!(error.code(), "INPUT.DUPLICATE_MIX");
    }

    #[test]
    fn more_mixes_than_rows_is_rejected() {
        let error = load_raw_rows(&rows(",A,B,C\nSand,100,100,100\n"))
            .expect_err("too few rows should fail");
        assert_eq!(error.code(), "INPUT.TOO_FEW_ROWS");
    }

    #[test]
    fn mix_without_row_is_rejected() {
        let error = load_raw_rows(&rows(",Blend\nSand,60\nGravel,40\n"))
            .expect_err("missing mix row should fail");
        assert_eq!(error.code(), "INPUT.MIX_ROW_MISSING");
        assert!(error.message().contains("'Blend'"));
    }

    #[test]
    fn mix_rows_out_of_production_order_are_rejected() {
        let source = ",Base,Final
Sand,100,
Gravel,,50
Final,,
Base,,50
";
        let error = load_raw_rows(&rows(source)).expect_err("swapped mix rows should fail");
        assert_eq!(error.code(), "INPUT.MIX_ROW_ALIGNMENT");
        assert!(error.message().contains("'Base'"));
    }

    #[test]
    fn raw_material_after_mix_block_is_rejected() {
        let source = ",Base,Final
Sand,100,
Base,,50
Final,,
Gravel,,50
";
        let error = load_raw_rows(&rows(source)).expect_err("raw row after mixes should fail");
        assert_eq!(error.code(), "INPUT.MIX_ROW_ALIGNMENT");
    }

    #[test]
    fn negative_percentages_are_rejected() {
        let error = load_raw_rows(&rows(",Blend\nSand,110\nGravel,-10\nBlend,\n"))
            .expect_err("negative percentage should fail");
        assert_eq!(error.code(), "INPUT.NEGATIVE_PERCENTAGE");
    }

    #[test]
    fn mix_consuming_later_mix_is_rejected() {
        let source = ",Base,Final
Sand,50,50
Base,,50
Final,50,
";
        let error = load_raw_rows(&rows(source)).expect_err("forward reference should fail");
        assert_eq!(error.code(), "INPUT.FORWARD_REFERENCE");
        assert!(error.message().contains("'Final'"));
    }

    #[test]
    fn malformed_cells_default_to_zero_and_are_reported() {
        let source = ",Blend
Sand,60
Gravel,40
Dust,n/a
Blend,,extra
";
        let loaded = load_raw_rows(&rows(source)).expect("lenient cells should load");

        assert_eq!(loaded.table.value(2, 0), 0.0);
        assert_eq!(loaded.summary.raw_materials, 3);
        let kinds = loaded
            .warnings
            .iter()
            .map(|warning| warning.kind)
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                CellWarningKind::NonNumeric,
                CellWarningKind::IgnoredOverflow
            ]
        );
        assert_eq!(loaded.warnings[0].ingredient.as_deref(), Some("Dust"));
        assert_eq!(loaded.warnings[0].line, 4);
    }

    #[test]
    fn warnings_point_at_source_lines_past_blank_lines() {
        let loaded = load_raw_rows(&rows(",Blend\n\nSand,60\nGravel,40\nDust,n/a\nBlend,\n"))
            .expect("blank line should be skipped");

        assert_eq!(loaded.warnings.len(), 1);
        let warning = &loaded.warnings[0];
        assert_eq!(warning.kind, CellWarningKind::NonNumeric);
        assert_eq!(warning.ingredient.as_deref(), Some("Dust"));
        assert_eq!(warning.line, 5);
        assert_eq!(warning.field, 2);
    }

    #[test]
    fn plain_rows_are_numbered_from_line_one() {
        let raw = vec![
            vec![String::new(), "Blend".to_string()],
            vec!["Sand".to_string(), "100".to_string()],
            vec!["Dust".to_string(), "?".to_string()],
            vec!["Blend".to_string()],
        ];
        let loaded = load_table(&raw).expect("plain rows should load");
        assert_eq!(loaded.warnings[0].line, 3);
    }

    #[test]
    #[should_panic(expected = "column 4 out of range")]
    fn percentage_column_past_final_mix_panics() {
        let loaded = load_raw_rows(&rows(ARTICLE_TABLE)).expect("article table should load");
        let _ = loaded.table.column(4);
    }
}
