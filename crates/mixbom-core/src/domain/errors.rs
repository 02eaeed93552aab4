use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type BomResult<T> = Result<T, BomError>;
pub type TableResult<T> = BomResult<T>;
pub type CalculationResult<T> = BomResult<T>;

/// Failure class of a load or calculation. A clean run has no category and
/// exits 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BomErrorCategory {
    /// The percentage table, a request field or a CLI argument is malformed.
    StructuralError,
    /// A product, report or config file could not be read or written.
    IoSystemError,
    /// A validated table produced an inconsistent explosion.
    CalculationError,
    InternalError,
}

impl BomErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::StructuralError => 2,
            Self::IoSystemError => 3,
            Self::CalculationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StructuralError => "StructuralError",
            Self::IoSystemError => "IoSystemError",
            Self::CalculationError => "CalculationError",
            Self::InternalError => "InternalError",
        }
    }
}

impl Display for BomErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Terminal failure of a single load or calculation.
///
/// `code` is a stable dotted identifier (`INPUT.COLUMN_SUM`, `RUN.SEED_MISMATCH`)
/// whose prefix names the stage that failed. Callers and tests match on it
/// instead of parsing the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BomError {
    category: BomErrorCategory,
    code: &'static str,
    message: String,
}

impl BomError {
    fn new(category: BomErrorCategory, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            category,
            code,
            message: message.into(),
        }
    }

    pub fn structural(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(BomErrorCategory::StructuralError, code, message)
    }

    pub fn io_system(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(BomErrorCategory::IoSystemError, code, message)
    }

    pub fn calculation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(BomErrorCategory::CalculationError, code, message)
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(BomErrorCategory::InternalError, code, message)
    }

    /// `column` is 0-based; the message names it the way a spreadsheet user
    /// counts mix columns.
    pub fn column_sum(column: usize, mix: &str, sum: f64) -> Self {
        Self::structural(
            "INPUT.COLUMN_SUM",
            format!(
                "column {} ('{}') does not sum to 100 (sum = {})",
                column + 1,
                mix,
                sum
            ),
        )
    }

    pub fn seed_mismatch(final_mix: &str, seeded_total: f64, target_amount: f64) -> Self {
        Self::calculation(
            "RUN.SEED_MISMATCH",
            format!(
                "final mix '{}' totals {} but the requested target amount is {}",
                final_mix, seeded_total, target_amount
            ),
        )
    }

    pub fn product_not_found(product: &str, path: &Path) -> Self {
        Self::io_system(
            "IO.PRODUCT_NOT_FOUND",
            format!("product '{}' not found at '{}'", product, path.display()),
        )
    }

    pub const fn category(&self) -> BomErrorCategory {
        self.category
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Stage prefix of the code: `INPUT`, `IO`, `RUN` or `SYS`.
    pub fn stage(&self) -> &'static str {
        self.code
            .split_once('.')
            .map_or(self.code, |(stage, _)| stage)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    /// `ERROR: [CODE] message`, the first stderr line of a failed command.
    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.code, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

impl Display for BomError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}", self.category, self.code, self.message)
    }
}

impl Error for BomError {}
