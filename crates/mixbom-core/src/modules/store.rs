use super::serialization::{normalize_text_artifact, write_text_artifact};
use super::table::{CellWarning, LoadSummary, RawRows, load_raw_rows, parse_csv_bytes};
use super::traits::{ProductSource, ReportSink, StoredReport};
use crate::domain::{BomError, BomResult};
use chrono::NaiveDateTime;
use globset::{Glob, GlobMatcher};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const PRODUCT_EXTENSION: &str = "csv";
pub const REPORT_EXTENSION: &str = "txt";
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Directory of `<product>.csv` percentage tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDirectory {
    root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstalledProduct {
    pub name: String,
    pub path: PathBuf,
    pub summary: LoadSummary,
    pub warnings: Vec<CellWarning>,
}

impl ProductDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn product_path(&self, product: &str) -> BomResult<PathBuf> {
        validate_product_name(product)?;
        Ok(self.root.join(format!("{product}.{PRODUCT_EXTENSION}")))
    }

    /// Validates `source` as a percentage table and copies it in as `name`,
    /// replacing any product with the same name.
    pub fn install(&self, name: &str, source: &Path) -> BomResult<InstalledProduct> {
        let destination = self.product_path(name)?;
        let bytes = fs::read(source).map_err(|error| {
            BomError::io_system(
                "IO.PRODUCT_IMPORT",
                format!("failed to read '{}': {}", source.display(), error),
            )
        })?;
        let loaded = load_raw_rows(&parse_csv_bytes(&bytes)?)?;
        let content = String::from_utf8(bytes).map_err(|error| {
            BomError::structural(
                "INPUT.CSV_RECORD",
                format!("'{}' is not valid UTF-8: {}", source.display(), error),
            )
        })?;

        fs::create_dir_all(&self.root).map_err(|error| {
            BomError::io_system(
                "IO.PRODUCT_DIRECTORY",
                format!(
                    "failed to create products directory '{}': {}",
                    self.root.display(),
                    error
                ),
            )
        })?;
        write_text_artifact(&destination, &content).map_err(|error| {
            BomError::io_system(
                "IO.PRODUCT_WRITE",
                format!("failed to write '{}': {}", destination.display(), error),
            )
        })?;
        tracing::info!(
            product = name,
            path = %destination.display(),
            raw_materials = loaded.summary.raw_materials,
            mixes = loaded.summary.mixes,
            "installed product"
        );

        Ok(InstalledProduct {
            name: name.to_string(),
            path: destination,
            summary: loaded.summary,
            warnings: loaded.warnings,
        })
    }
}

impl ProductSource for ProductDirectory {
    fn load_rows(&self, product: &str) -> BomResult<RawRows> {
        let path = self.product_path(product)?;
        let bytes = fs::read(&path).map_err(|error| {
            if error.kind() == ErrorKind::NotFound {
                BomError::product_not_found(product, &path)
            } else {
                BomError::io_system(
                    "IO.PRODUCT_READ",
                    format!("failed to read '{}': {}", path.display(), error),
                )
            }
        })?;
        parse_csv_bytes(&bytes)
    }

    /// Product names in byte order. A missing directory lists as empty.
    fn list_products(&self) -> BomResult<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => {
                return Err(BomError::io_system(
                    "IO.PRODUCT_LIST",
                    format!(
                        "failed to list products in '{}': {}",
                        self.root.display(),
                        error
                    ),
                ));
            }
        };

        let matcher = product_matcher()?;
        let mut products = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|error| {
                BomError::io_system(
                    "IO.PRODUCT_LIST",
                    format!(
                        "failed to list products in '{}': {}",
                        self.root.display(),
                        error
                    ),
                )
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name() else {
                continue;
            };
            if !matcher.is_match(Path::new(file_name)) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                products.push(stem.to_string());
            }
        }

        products.sort();
        Ok(products)
    }
}

/// Directory of rendered reports named `<product>_<YYYYMMDDHHMMSS>.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDirectory {
    root: PathBuf,
}

impl ReportDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn report_path(&self, product: &str, timestamp: NaiveDateTime) -> BomResult<PathBuf> {
        validate_product_name(product)?;
        Ok(self.root.join(format!(
            "{}_{}.{}",
            product,
            timestamp.format(REPORT_TIMESTAMP_FORMAT),
            REPORT_EXTENSION
        )))
    }
}

impl ReportSink for ReportDirectory {
    fn store(
        &self,
        product: &str,
        timestamp: NaiveDateTime,
        report: &str,
    ) -> BomResult<StoredReport> {
        let path = self.report_path(product, timestamp)?;
        fs::create_dir_all(&self.root).map_err(|error| {
            BomError::io_system(
                "IO.REPORT_DIRECTORY",
                format!(
                    "failed to create calculations directory '{}': {}",
                    self.root.display(),
                    error
                ),
            )
        })?;
        write_text_artifact(&path, report).map_err(|error| {
            BomError::io_system(
                "IO.REPORT_WRITE",
                format!("failed to write report '{}': {}", path.display(), error),
            )
        })?;

        let bytes = normalize_text_artifact(report).len();
        tracing::info!(product, path = %path.display(), bytes, "stored calculation report");
        Ok(StoredReport { path, bytes })
    }
}

fn product_matcher() -> BomResult<GlobMatcher> {
    let pattern = format!("*.{PRODUCT_EXTENSION}");
    Glob::new(&pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|error| {
            BomError::internal(
                "RUN.PRODUCT_GLOB",
                format!("invalid product pattern '{pattern}': {error}"),
            )
        })
}

/// Product names become file names, so they may not be empty or address
/// another directory.
pub fn validate_product_name(product: &str) -> BomResult<()> {
    let trimmed = product.trim();
    if trimmed.is_empty() {
        return Err(BomError::structural(
            "INPUT.PRODUCT_NAME",
            "product name is empty",
        ));
    }
    if trimmed != product
        || product.contains(['/', '\\'])
        || product == "."
        || product == ".."
    {
        return Err(BomError::structural(
            "INPUT.PRODUCT_NAME",
            format!("product name '{product}' is not a plain file name"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ProductDirectory, ReportDirectory, validate_product_name};
    use crate::domain::BomErrorCategory;
    use crate::modules::traits::{ProductSource, ReportSink};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    const BLEND: &str = ",Blend\nSand,60\nGravel,40\nBlend,\n";

    fn timestamp() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|date| date.and_hms_opt(14, 5, 7))
            .expect("fixture timestamp should be valid")
    }

    #[test]
    fn load_rows_reads_product_csv() {
        let temp = TempDir::new().expect("tempdir should be created");
        fs::write(temp.path().join("Concrete.csv"), BLEND).expect("fixture should be written");

        let rows = ProductDirectory::new(temp.path())
            .load_rows("Concrete")
            .expect("product should load");
        assert_eq!(rows.len(), 4);
        assert_eq!(rows.rows()[1], ["Sand", "60"]);
        assert_eq!(rows.lines(), [1, 2, 3, 4]);
    }

    #[test]
    fn missing_product_is_an_io_error() {
        let temp = TempDir::new().expect("tempdir should be created");

        let error = ProductDirectory::new(temp.path())
            .load_rows("Nothing")
            .expect_err("missing product should fail");
        assert_eq!(error.category(), BomErrorCategory::IoSystemError);
        assert_eq!(error.code(), "IO.PRODUCT_NOT_FOUND");
        assert!(error.message().contains("Nothing"));
    }

    #[test]
    fn non_utf8_product_is_a_structural_error() {
        let temp = TempDir::new().expect("tempdir should be created");
        fs::write(
            temp.path().join("Latin1.csv"),
            b",Blend\nSand,60\nGr\xe4vel,40\nBlend,\n",
        )
        .expect("fixture should be written");

        let error = ProductDirectory::new(temp.path())
            .load_rows("Latin1")
            .expect_err("invalid UTF-8 should fail");
        assert_eq!(error.category(), BomErrorCategory::StructuralError);
        assert_eq!(error.exit_code(), 2);
        assert_eq!(error.code(), "INPUT.CSV_RECORD");
    }

    #[test]
    fn list_products_returns_sorted_csv_stems() {
        let temp = TempDir::new().expect("tempdir should be created");
        for name in ["mortar.csv", "Concrete.csv", "notes.txt", "asphalt.csv"] {
            fs::write(temp.path().join(name), BLEND).expect("fixture should be written");
        }
        fs::create_dir(temp.path().join("nested.csv")).expect("directory should be created");

        let products = ProductDirectory::new(temp.path())
            .list_products()
            .expect("listing should succeed");
        assert_eq!(products, ["Concrete", "asphalt", "mortar"]);
    }

    #[test]
    fn missing_products_directory_lists_nothing() {
        let temp = TempDir::new().expect("tempdir should be created");

        let products = ProductDirectory::new(temp.path().join("absent"))
            .list_products()
            .expect("listing should succeed");
        assert!(products.is_empty());
    }

    #[test]
    fn install_validates_before_copying() {
        let temp = TempDir::new().expect("tempdir should be created");
        let upload = temp.path().join("upload.csv");
        fs::write(&upload, ",Blend\nSand,60\nGravel,37\nBlend,\n").expect("upload should be written");
        let products = ProductDirectory::new(temp.path().join("products"));

        let error = products
            .install("Broken", &upload)
            .expect_err("invalid table should be rejected");
        assert_eq!(error.code(), "INPUT.COLUMN_SUM");
        assert!(!temp.path().join("products").join("Broken.csv").exists());
    }

    #[test]
    fn install_rejects_non_utf8_upload_without_copying() {
        let temp = TempDir::new().expect("tempdir should be created");
        let upload = temp.path().join("upload.csv");
        fs::write(&upload, b",Blend\nSand,60\nGr\xe4vel,40\nBlend,\n")
            .expect("upload should be written");
        let products = ProductDirectory::new(temp.path().join("products"));

        let error = products
            .install("Latin1", &upload)
            .expect_err("invalid UTF-8 should be rejected");
        assert_eq!(error.category(), BomErrorCategory::StructuralError);
        assert_eq!(error.code(), "INPUT.CSV_RECORD");
        assert!(!temp.path().join("products").exists());
    }

    #[test]
    fn install_creates_directory_and_reports_summary() {
        let temp = TempDir::new().expect("tempdir should be created");
        let upload = temp.path().join("upload.csv");
        fs::write(&upload, BLEND.replace('\n', "\r\n")).expect("upload should be written");
        let products = ProductDirectory::new(temp.path().join("products"));

        let installed = products
            .install("Concrete", &upload)
            .expect("valid table should install");
        assert_eq!(installed.summary.raw_materials, 2);
        assert_eq!(installed.summary.mixes, 1);
        assert_eq!(
            fs::read_to_string(&installed.path).expect("installed product should be readable"),
            BLEND
        );
        assert_eq!(
            products.list_products().expect("listing should succeed"),
            ["Concrete"]
        );
    }

    #[test]
    fn store_writes_timestamped_report() {
        let temp = TempDir::new().expect("tempdir should be created");
        let reports = ReportDirectory::new(temp.path().join("calculation_requests"));

        let stored = reports
            .store("Concrete", timestamp(), "line 1\r\nline 2\n")
            .expect("report should be stored");
        assert_eq!(
            stored.path,
            temp.path()
                .join("calculation_requests")
                .join("Concrete_20240309140507.txt")
        );
        assert_eq!(stored.bytes, 14);
        assert_eq!(
            fs::read_to_string(&stored.path).expect("report should be readable"),
            "line 1\nline 2\n"
        );
    }

    #[test]
    fn product_names_must_be_plain_file_names() {
        for name in ["", "  ", "../etc", "a/b", "a\\b", "..", " padded"] {
            let error = validate_product_name(name).expect_err("name should be rejected");
            assert_eq!(error.code(), "INPUT.PRODUCT_NAME");
        }
        validate_product_name("Concrete Mix 2").expect("plain name should be accepted");
    }
}
