use super::table::RawRows;
use crate::domain::BomResult;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::PathBuf;

/// Where percentage tables come from, addressed by product name.
pub trait ProductSource {
    /// Raw CSV rows of `product`, each tagged with the line it starts on.
    fn load_rows(&self, product: &str) -> BomResult<RawRows>;

    fn list_products(&self) -> BomResult<Vec<String>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredReport {
    pub path: PathBuf,
    pub bytes: usize,
}

pub trait ReportSink {
    fn store(
        &self,
        product: &str,
        timestamp: NaiveDateTime,
        report: &str,
    ) -> BomResult<StoredReport>;
}
