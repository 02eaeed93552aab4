use super::CliError;
use super::helpers::*;
use mixbom_core::domain::CalculationRequest;
use mixbom_core::modules::requirements::RequirementsSummary;
use mixbom_core::modules::table::{CellWarning, LoadSummary};
use mixbom_core::modules::{
    ProductDirectory, ProductSource, ReportDirectory, calculate_bom, plan_product,
    validate_product,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(clap::Args)]
pub(super) struct CalculateArgs {
    /// Product name (file stem in the products directory)
    product: String,

    /// Amount of the final mix to produce (default: configured target amount)
    #[arg(long, allow_negative_numbers = true)]
    amount: Option<f64>,

    /// Directory holding <product>.csv recipes
    #[arg(long)]
    products_dir: Option<PathBuf>,

    /// Directory receiving stored reports
    #[arg(long)]
    calculations_dir: Option<PathBuf>,

    /// Print the report without storing it
    #[arg(long)]
    no_save: bool,

    /// Print the target table and totals as JSON instead of the text report
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct ValidateArgs {
    /// Product name (file stem in the products directory)
    product: String,

    /// Directory holding <product>.csv recipes
    #[arg(long)]
    products_dir: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct ListArgs {
    /// Directory holding <product>.csv recipes
    #[arg(long)]
    products_dir: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct ImportArgs {
    /// CSV recipe to install
    csv: PathBuf,

    /// Product name to install under (default: the CSV file stem)
    #[arg(long)]
    name: Option<String>,

    /// Directory holding <product>.csv recipes
    #[arg(long)]
    products_dir: Option<PathBuf>,
}

#[derive(Serialize)]
struct CalculationJson<'a> {
    product: &'a str,
    load: LoadSummary,
    warnings: &'a [CellWarning],
    requirements: RequirementsSummary,
    report_path: Option<&'a Path>,
}

pub(super) fn run_calculate_command(
    context: &CliContext,
    args: CalculateArgs,
) -> Result<i32, CliError> {
    let amount = args
        .amount
        .unwrap_or(context.config.default_target_amount);
    let request = CalculationRequest::new(args.product, amount)?;
    let products = ProductDirectory::new(context.products_dir(args.products_dir.as_deref()));

    let outcome = if args.no_save {
        plan_product(&products, &request)?
    } else {
        let reports =
            ReportDirectory::new(context.calculations_dir(args.calculations_dir.as_deref()));
        calculate_bom(&products, &reports, &request, current_timestamp())?
    };
    let stored_path = outcome.stored.as_ref().map(|stored| stored.path.as_path());

    if args.json {
        print_json(&CalculationJson {
            product: &outcome.product,
            load: outcome.loaded.summary,
            warnings: &outcome.loaded.warnings,
            requirements: outcome.requirements.target_table.summary(),
            report_path: stored_path,
        })?;
    } else {
        print!("{}", outcome.requirements.report);
        if let Some(path) = stored_path {
            println!("Report saved to: {}", path.display());
        }
    }

    Ok(0)
}

pub(super) fn run_validate_command(
    context: &CliContext,
    args: ValidateArgs,
) -> Result<i32, CliError> {
    let products = ProductDirectory::new(context.products_dir(args.products_dir.as_deref()));
    let loaded = validate_product(&products, &args.product)?;

    println!(
        "Product '{}': {} raw materials, {} mixes",
        args.product, loaded.summary.raw_materials, loaded.summary.mixes
    );
    println!("Mixes: {}", loaded.table.mix_names().join(", "));
    println!(
        "Raw materials: {}",
        loaded.table.raw_material_names().join(", ")
    );
    for warning in &loaded.warnings {
        println!("WARNING: {}", warning);
    }
    println!("Status: valid");

    Ok(0)
}

pub(super) fn run_list_command(context: &CliContext, args: ListArgs) -> Result<i32, CliError> {
    let products = ProductDirectory::new(context.products_dir(args.products_dir.as_deref()));
    let names = products.list_products()?;
    if names.is_empty() {
        eprintln!("No products found in '{}'", products.root().display());
    }
    for name in names {
        println!("{}", name);
    }

    Ok(0)
}

pub(super) fn run_import_command(context: &CliContext, args: ImportArgs) -> Result<i32, CliError> {
    let source = resolve_cli_path(&context.working_dir, &args.csv);
    let name = match args.name {
        Some(name) => name,
        None => product_name_from_path(&source)?,
    };
    let products = ProductDirectory::new(context.products_dir(args.products_dir.as_deref()));
    let installed = products.install(&name, &source)?;

    println!(
        "Imported '{}' ({} raw materials, {} mixes) to {}",
        installed.name,
        installed.summary.raw_materials,
        installed.summary.mixes,
        installed.path.display()
    );
    for warning in &installed.warnings {
        println!("WARNING: {}", warning);
    }

    Ok(0)
}
