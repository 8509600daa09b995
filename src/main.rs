use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use liquidity_engine::{
    domain::{
        calculate_elasticity, calculate_liquidity_score, calculate_optimal_path_with, Inventory,
    },
    infra::csv_export::{export_inventory, template_csv},
    util::settings::{load_settings, load_settings_from, Settings},
    Session,
};

/// Inventory liquidity calculators and CSV tooling.
#[derive(Parser, Debug)]
#[command(name = "liquidity", version, about = "Inventory liquidity calculators and CSV tooling")]
struct Cli {
    /// Settings file; defaults to the platform config directory.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Project demand and revenue after a price change.
    Elasticity {
        #[arg(long)]
        base_price: f64,
        #[arg(long)]
        base_demand: f64,
        #[arg(long)]
        new_price: f64,
        #[arg(long, allow_negative_numbers = true)]
        coef: f64,
    },
    /// Compare resale, donation and bulk recovery.
    Path {
        #[arg(long)]
        market_value: f64,
        #[arg(long)]
        cost_basis: f64,
        #[arg(long, default_value_t = 0.0)]
        shipping: f64,
        /// Defaults to the configured tax rate.
        #[arg(long)]
        tax_rate: Option<f64>,
    },
    /// Compute a liquidity score.
    Score {
        #[arg(long, allow_negative_numbers = true)]
        velocity: f64,
        #[arg(long, allow_negative_numbers = true)]
        days_on_hand: f64,
        #[arg(long, allow_negative_numbers = true)]
        margin: f64,
    },
    /// Import a CSV file, merging into an optional existing JSON inventory.
    Import {
        file: PathBuf,
        #[arg(long)]
        existing: Option<PathBuf>,
    },
    /// Print the CSV import template.
    Template,
    /// Convert a JSON inventory to CSV.
    Export { inventory: PathBuf },
}

#[derive(Serialize)]
struct ImportOutput<'a> {
    summary: &'a liquidity_engine::ImportSummary,
    notices: Vec<liquidity_engine::util::notice::Notice>,
    inventory: &'a Inventory,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let settings = resolve_settings(cli.settings.as_deref())?;

    match cli.command {
        Command::Elasticity {
            base_price,
            base_demand,
            new_price,
            coef,
        } => print_json(&calculate_elasticity(base_price, base_demand, new_price, coef))?,
        Command::Path {
            market_value,
            cost_basis,
            shipping,
            tax_rate,
        } => {
            let tax_rate = tax_rate.unwrap_or(settings.default_tax_rate);
            let path = calculate_optimal_path_with(
                &settings.path_rates(),
                market_value,
                cost_basis,
                shipping,
                tax_rate,
            );
            match path.best() {
                Some(best) => info!("recommended channel: {}", best.channel.label()),
                None => info!("no single channel dominates"),
            }
            print_json(&path)?;
        }
        Command::Score {
            velocity,
            days_on_hand,
            margin,
        } => {
            let score = settings.apply_score_policy(calculate_liquidity_score(
                velocity,
                days_on_hand,
                margin,
            ));
            print_json(&serde_json::json!({ "score": score }))?;
        }
        Command::Import { file, existing } => {
            let inventory = match existing {
                Some(path) => read_inventory(&path)?,
                None => Inventory::default(),
            };
            let mut session = Session::new(settings).with_inventory(inventory);
            let summary = session.import_csv_file(&file).await?;
            let notices = session.notices.drain();
            print_json(&ImportOutput {
                summary: &summary,
                notices,
                inventory: &session.inventory,
            })?;
        }
        Command::Template => print!("{}", template_csv()?),
        Command::Export { inventory } => {
            let inventory = read_inventory(&inventory)?;
            print!("{}", export_inventory(inventory.products())?);
        }
    }

    Ok(())
}

fn resolve_settings(path: Option<&std::path::Path>) -> anyhow::Result<Settings> {
    if let Some(path) = path {
        return load_settings_from(path)
            .with_context(|| format!("failed to load settings from {}", path.display()));
    }
    Ok(load_settings().unwrap_or_else(|| {
        debug!("using default settings");
        Settings::default()
    }))
}

fn read_inventory(path: &std::path::Path) -> anyhow::Result<Inventory> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read inventory {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("failed to parse inventory {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
