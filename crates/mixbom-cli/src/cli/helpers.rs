use super::CliError;
use anyhow::Context;
use chrono::NaiveDateTime;
use mixbom_core::common::{MixbomConfig, load_config};
use mixbom_core::domain::{BomError, BomResult};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub(super) struct CliContext {
    pub(super) working_dir: PathBuf,
    pub(super) config: MixbomConfig,
}

impl CliContext {
    pub(super) fn products_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        override_dir
            .map(|path| resolve_cli_path(&self.working_dir, path))
            .unwrap_or_else(|| self.config.products_dir.clone())
    }

    pub(super) fn calculations_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        override_dir
            .map(|path| resolve_cli_path(&self.working_dir, path))
            .unwrap_or_else(|| self.config.calculations_dir.clone())
    }
}

/// Explicit `--config` wins over discovery; directories left relative by the
/// defaults resolve against the working directory.
pub(super) fn load_cli_context(config_path: Option<&Path>) -> Result<CliContext, CliError> {
    let working_dir = current_working_dir()?;
    let config = match config_path {
        Some(path) => MixbomConfig::from_path(resolve_cli_path(&working_dir, path)),
        None => load_config(&working_dir),
    }
    .map_err(BomError::from)?
    .resolved_against(&working_dir);
    tracing::debug!(
        products_dir = %config.products_dir.display(),
        calculations_dir = %config.calculations_dir.display(),
        default_target_amount = config.default_target_amount,
        "resolved configuration"
    );

    Ok(CliContext {
        working_dir,
        config,
    })
}

pub(super) fn current_working_dir() -> BomResult<PathBuf> {
    std::env::current_dir().map_err(|source| {
        BomError::io_system(
            "IO.CLI_CURRENT_DIR",
            format!("failed to read current working directory: {}", source),
        )
    })
}

pub(super) fn current_timestamp() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

pub(super) fn resolve_cli_path(working_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}

pub(super) fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered =
        serde_json::to_string_pretty(value).context("failed to serialize JSON output")?;
    println!("{}", rendered);
    Ok(())
}

/// Product name for an imported CSV: its file stem.
pub(super) fn product_name_from_path(path: &Path) -> Result<String, CliError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            CliError::Usage(format!(
                "cannot derive a product name from '{}'; pass --name",
                path.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::{CliContext, product_name_from_path, resolve_cli_path};
    use mixbom_core::common::MixbomConfig;
    use std::path::{Path, PathBuf};

    fn context() -> CliContext {
        CliContext {
            working_dir: PathBuf::from("/work"),
            config: MixbomConfig::default().resolved_against(Path::new("/work")),
        }
    }

    #[test]
    fn flags_override_configured_directories() {
        let context = context();
        assert_eq!(context.products_dir(None), PathBuf::from("/work/products"));
        assert_eq!(
            context.products_dir(Some(Path::new("recipes"))),
            PathBuf::from("/work/recipes")
        );
        assert_eq!(
            context.calculations_dir(Some(Path::new("/reports"))),
            PathBuf::from("/reports")
        );
    }

    #[test]
    fn relative_cli_paths_resolve_against_working_dir() {
        assert_eq!(
            resolve_cli_path(Path::new("/work"), Path::new("a.csv")),
            PathBuf::from("/work/a.csv")
        );
    }

    #[test]
    fn imported_product_name_is_file_stem() {
        assert_eq!(
            product_name_from_path(Path::new("uploads/Concrete.csv"))
                .expect("stem should be derived"),
            "Concrete"
        );
    }
}
