// Terminal dashboard over the processed dataset.
//
// Loads (and caches) the canonical table, applies the municipality/product/
// period selection and prints the headline figures followed by the time
// series, geographic and detail tables. Optionally exports the selection.
use anyhow::{bail, Context, Result};
use clap::Parser;
use pam_pipeline::config::{DASHBOARD_LOG_DEFAULT, DATA_PATH_ENV, DEFAULT_DATA_PATH};
use pam_pipeline::filter::{available_municipalities, available_products, year_bounds};
use pam_pipeline::logging::init_logging;
use pam_pipeline::types::HeadlineMetrics;
use pam_pipeline::util::{format_int, format_metric, format_percent};
use pam_pipeline::{output, reports, Filter, TableCache};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "pam-dashboard",
    about = "Fruit-growing production dashboard for the São Francisco valley"
)]
struct Args {
    /// Processed CSV to read
    #[arg(long, env = DATA_PATH_ENV, default_value = DEFAULT_DATA_PATH)]
    path: PathBuf,

    /// Municipality to include (repeatable; default all)
    #[arg(long = "municipality")]
    municipalities: Vec<String>,

    /// Product to include (repeatable; default all)
    #[arg(long = "product")]
    products: Vec<String>,

    /// First year of the period (default: earliest in data)
    #[arg(long)]
    from: Option<i32>,

    /// Last year of the period (default: latest in data)
    #[arg(long)]
    to: Option<i32>,

    /// Rows shown from the detail table
    #[arg(long, default_value_t = 20)]
    rows: usize,

    /// Write the selected canonical rows to this CSV file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Write the headline metrics to this JSON file
    #[arg(long)]
    json: Option<PathBuf>,
}

fn print_headline(m: &HeadlineMetrics) {
    println!(
        "Production ({}): {} ({} vs previous year)",
        m.latest_year,
        format_metric(Some(m.production_ton), "", " t", 0),
        format_percent(m.production_delta),
    );
    println!(
        "Value ({}): {} ({} vs previous year)",
        m.latest_year,
        format_metric(Some(m.value_millions), "R$ ", " Mi", 1),
        format_percent(m.value_delta),
    );
    println!("Mean yield (period): {}", format_metric(m.mean_yield_kg_ha, "", " kg/ha", 0));
    println!("Mean price (period): {}", format_metric(m.mean_price_per_kg, "R$ ", "", 2));
}

fn main() -> Result<()> {
    init_logging(DASHBOARD_LOG_DEFAULT);
    let args = Args::parse();

    let mut cache = TableCache::new();
    let table = cache
        .get_or_load(&args.path)
        .with_context(|| format!("cannot load dataset from {}", args.path.display()))?;

    let Some((min_year, max_year)) = year_bounds(&table.records) else {
        bail!("dataset {} has no usable rows", args.path.display());
    };
    let from = args.from.unwrap_or(min_year);
    let to = args.to.unwrap_or(max_year);
    if from > to {
        bail!("invalid period: {} is after {}", from, to);
    }

    let filter = Filter {
        municipalities: args.municipalities,
        products: args.products,
        years: Some(from..=to),
    };
    let selected = filter.apply(&table.records);
    info!(selected = selected.len(), total = table.len(), "applied filters");

    let Some(metrics) = reports::headline_metrics(&table.records, &filter, &selected) else {
        println!(
            "No data found for the selected filters. \
             Adjust the municipality, product or period selection."
        );
        println!("Available municipalities: {:?}", available_municipalities(&table.records));
        println!("Available products: {:?}", available_products(&table.records));
        return Ok(());
    };

    let municipalities = if filter.municipalities.is_empty() {
        available_municipalities(&table.records)
    } else {
        filter.municipalities.clone()
    };
    let products = if filter.products.is_empty() {
        available_products(&table.records)
    } else {
        filter.products.clone()
    };

    println!("São Francisco Valley: Fruit-Growing Analysis");
    println!("Period: {} - {} | Source: IBGE (PAM) + CEPEA", from, to);
    println!(
        "{} in {} ({} records)\n",
        products.join(", "),
        municipalities.join(", "),
        format_int(selected.len())
    );

    print_headline(&metrics);

    let series = reports::temporal_series(&selected);
    output::preview_table(
        "Production and value over time",
        Some("by year and product"),
        &series,
        series.len(),
    );

    let share = reports::municipal_share(&selected);
    output::preview_table("Production share by municipality", None, &share, share.len());

    let yields = reports::yield_by_product(&selected);
    output::preview_table("Mean yield by product", None, &yields, yields.len());

    let detail = reports::detail_table(&selected);
    let note = format!("showing {} of {} rows", args.rows.min(detail.len()), detail.len());
    output::preview_table("Detailed data", Some(note.as_str()), &detail, args.rows);

    if let Some(path) = &args.export {
        let written = output::write_records(path, &table, selected.iter().copied())
            .with_context(|| format!("export to {} failed", path.display()))?;
        println!("Exported {} rows to {}", format_int(written), path.display());
    }
    if let Some(path) = &args.json {
        output::write_json(path, &metrics)
            .with_context(|| format!("writing {} failed", path.display()))?;
        println!("Headline metrics saved to {}", path.display());
    }

    Ok(())
}
