pub mod requirements;
pub mod serialization;
pub mod store;
pub mod table;
pub mod workflow;

mod traits;

pub use requirements::{Requirements, TargetTable, compute_requirements, explode, render_report};
pub use store::{InstalledProduct, ProductDirectory, ReportDirectory};
pub use table::{LoadSummary, LoadedTable, PercentageTable, RawRows, load_raw_rows, load_table};
pub use traits::{ProductSource, ReportSink, StoredReport};
pub use workflow::{CalculationOutcome, calculate_bom, plan_product, validate_product};
