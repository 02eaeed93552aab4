use crate::domain::{BomError, TableResult};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Outcome of reading one numeric cell. Only `Number` carries information;
/// the other two read as `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Blank,
    Defaulted { raw: String },
}

impl CellValue {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Blank;
        }

        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Number(value),
            _ => Self::Defaulted {
                raw: trimmed.to_string(),
            },
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Self::Number(value) => *value,
            Self::Blank | Self::Defaulted { .. } => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellWarningKind {
    NonNumeric,
    IgnoredOverflow,
    SkippedUnnamedRow,
}

/// A lenient parse decision the loader made instead of failing.
///
/// `line` and `field` are 1-based positions in the raw input, the header being line 1
/// and the ingredient name field 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellWarning {
    pub kind: CellWarningKind,
    pub line: usize,
    pub field: usize,
    pub ingredient: Option<String>,
    pub raw: String,
}

impl Display for CellWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let ingredient = self.ingredient.as_deref().unwrap_or("<unnamed>");
        match self.kind {
            CellWarningKind::NonNumeric => write!(
                f,
                "line {} field {} ({}): non-numeric value '{}' read as 0.0",
                self.line, self.field, ingredient, self.raw
            ),
            CellWarningKind::IgnoredOverflow => write!(
                f,
                "line {} field {} ({}): value '{}' has no mix column and was ignored",
                self.line, self.field, ingredient, self.raw
            ),
            CellWarningKind::SkippedUnnamedRow => write!(
                f,
                "line {}: row without an ingredient name was skipped ('{}')",
                self.line, self.raw
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct ParsedRows {
    pub(super) ingredient_names: Vec<String>,
    pub(super) values: Vec<Vec<f64>>,
    pub(super) warnings: Vec<CellWarning>,
}

pub(super) fn parse_header(header: &[String]) -> Vec<String> {
    header
        .iter()
        .skip(1)
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}

/// `lines` holds the 1-based source line of each row in `rows`.
pub(super) fn parse_ingredient_rows(
    rows: &[Vec<String>],
    lines: &[usize],
    mix_count: usize,
) -> ParsedRows {
    let mut parsed = ParsedRows {
        ingredient_names: Vec::new(),
        values: Vec::new(),
        warnings: Vec::new(),
    };

    for (row, &line) in rows.iter().zip(lines) {
        let name = row.first().map(|cell| cell.trim()).unwrap_or_default();

        if name.is_empty() {
            let content = row
                .iter()
                .map(|cell| cell.trim())
                .filter(|cell| !cell.is_empty())
                .collect::<Vec<_>>();
            if !content.is_empty() {
                parsed.warnings.push(CellWarning {
                    kind: CellWarningKind::SkippedUnnamedRow,
                    line,
                    field: 1,
                    ingredient: None,
                    raw: content.join(","),
                });
            }
            continue;
        }

        let mut values = Vec::with_capacity(mix_count);
        for column in 0..mix_count {
            let field = column + 2;
            let cell = row
                .get(column + 1)
                .map(|raw| CellValue::parse(raw))
                .unwrap_or(CellValue::Blank);
            if let CellValue::Defaulted { raw } = &cell {
                parsed.warnings.push(CellWarning {
                    kind: CellWarningKind::NonNumeric,
                    line,
                    field,
                    ingredient: Some(name.to_string()),
                    raw: raw.clone(),
                });
            }
            values.push(cell.value());
        }

        for (index, raw) in row.iter().enumerate().skip(mix_count + 1) {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            parsed.warnings.push(CellWarning {
                kind: CellWarningKind::IgnoredOverflow,
                line,
                field: index + 1,
                ingredient: Some(name.to_string()),
                raw: trimmed.to_string(),
            });
        }

        parsed.ingredient_names.push(name.to_string());
        parsed.values.push(values);
    }

    parsed
}

/// Rows of a raw table together with the 1-based source line each row starts on.
///
/// Blank lines are not rows and a quoted field may span several lines, so the
/// row index alone does not locate a row in its source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRows {
    rows: Vec<Vec<String>>,
    lines: Vec<usize>,
}

impl RawRows {
    /// Rows numbered consecutively from line 1.
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        let lines = (1..=rows.len()).collect();
        Self { rows, lines }
    }

    pub fn push(&mut self, line: usize, fields: Vec<String>) {
        self.rows.push(fields);
        self.lines.push(line);
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn lines(&self) -> &[usize] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<Vec<String>>> for RawRows {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self::new(rows)
    }
}

/// Splits CSV text into raw rows. Ragged rows are kept as-is; trimming and
/// numeric interpretation happen in the loader.
pub fn parse_csv_rows(source: &str) -> TableResult<RawRows> {
    parse_csv_bytes(source.as_bytes())
}

/// Like [`parse_csv_rows`], for undecoded input. Invalid UTF-8 is a malformed
/// record, not an I/O failure.
pub fn parse_csv_bytes(source: &[u8]) -> TableResult<RawRows> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source);

    let mut rows = RawRows::default();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|source| {
            BomError::structural(
                "INPUT.CSV_RECORD",
                format!("failed to read CSV record {}: {}", index + 1, source),
            )
        })?;
        let offset = record
            .position()
            .map_or(0, |position| position.byte() as usize);
        rows.push(
            line_of_record(source, offset),
            record.iter().map(str::to_string).collect(),
        );
    }

    Ok(rows)
}

/// 1-based line of the first record byte at or after `offset`. The reader may
/// report a record as starting before the blank lines it skipped.
fn line_of_record(source: &[u8], offset: usize) -> usize {
    let offset = offset.min(source.len());
    let start = source[offset..]
        .iter()
        .position(|byte| !matches!(byte, b'\n' | b'\r'))
        .map_or(source.len(), |skipped| offset + skipped);

    let prefix = &source[..start];
    1 + prefix
        .iter()
        .enumerate()
        .filter(|&(index, &byte)| {
            byte == b'\n' || (byte == b'\r' && prefix.get(index + 1) != Some(&b'\n'))
        })
        .count()
}
