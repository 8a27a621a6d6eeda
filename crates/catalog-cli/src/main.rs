mod tables;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use catalog_client::fetcher::DEFAULT_USER_AGENT;
use catalog_client::{FetchConfig, MarkupExtractor, ReqwestFetcher};
use catalog_core::batch::DEFAULT_URL_TEMPLATE;
use catalog_core::progress::{SilentReporter, TracingReporter};
use catalog_core::{BatchConfig, BatchReport, BatchService, RetryConfig, RetryingFetcher};

#[derive(Parser)]
#[command(name = "catalog", version, about = "Product catalog harvester")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every product code listed in a CSV file and write the result tables
    Harvest {
        /// CSV file containing the product codes
        #[arg(short, long)]
        input: PathBuf,

        /// Header of the column holding the product codes
        #[arg(short, long, default_value = "Referans")]
        column: String,

        /// Output CSV for the product summary table
        #[arg(long, default_value = "products.csv")]
        products_out: PathBuf,

        /// Output CSV for the characteristic table
        #[arg(long, default_value = "characteristics.csv")]
        characteristics_out: PathBuf,

        /// Optional CSV listing skipped codes and why
        #[arg(long)]
        skipped_out: Option<PathBuf>,

        #[command(flatten)]
        http: HttpArgs,

        /// Do not log progress
        #[arg(short, long, default_value_t = false)]
        quiet: bool,
    },

    /// Fetch a single product and print it as JSON
    Product {
        /// Product code
        #[arg(short, long)]
        code: String,

        #[command(flatten)]
        http: HttpArgs,
    },
}

#[derive(Args)]
struct HttpArgs {
    /// Product page URL; {code} is replaced by the product code
    #[arg(long, env = "CATALOG_URL_TEMPLATE", default_value = DEFAULT_URL_TEMPLATE)]
    url_template: String,

    /// Maximum number of products fetched at once
    #[arg(long, env = "CATALOG_CONCURRENCY", default_value_t = 16)]
    concurrency: usize,

    /// Pause between starting two requests, in milliseconds
    #[arg(long, env = "CATALOG_STAGGER_MS", default_value_t = 100)]
    stagger_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, env = "CATALOG_TIMEOUT_SECS", default_value_t = 40)]
    timeout_secs: u64,

    /// Attempts per request for connection failures and timeouts
    #[arg(long, env = "CATALOG_RETRIES", default_value_t = 3)]
    retries: u32,

    /// Pause between two attempts, in milliseconds
    #[arg(long, env = "CATALOG_RETRY_DELAY_MS", default_value_t = 1000)]
    retry_delay_ms: u64,

    /// User-Agent header sent with every request
    #[arg(long, env = "CATALOG_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
}

impl HttpArgs {
    fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            url_template: self.url_template.clone(),
            concurrency: self.concurrency,
            stagger: Duration::from_millis(self.stagger_ms),
        }
    }

    fn service(&self) -> Result<BatchService<RetryingFetcher<ReqwestFetcher>, MarkupExtractor>> {
        let config = self.batch_config();
        config.validate().map_err(|e| anyhow::anyhow!(e))?;

        let fetcher = ReqwestFetcher::with_config(&FetchConfig {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        })
        .context("Failed to create HTTP client")?;
        let retry = RetryConfig::new(self.retries, Duration::from_millis(self.retry_delay_ms));
        let extractor = MarkupExtractor::new().map_err(|e| anyhow::anyhow!(e))?;

        Ok(BatchService::new(
            RetryingFetcher::new(fetcher, retry),
            extractor,
            config,
        ))
    }
}

struct OutputPaths<'a> {
    products: &'a Path,
    characteristics: &'a Path,
    skipped: Option<&'a Path>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("catalog=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Harvest {
            input,
            column,
            products_out,
            characteristics_out,
            skipped_out,
            http,
            quiet,
        } => {
            let paths = OutputPaths {
                products: &products_out,
                characteristics: &characteristics_out,
                skipped: skipped_out.as_deref(),
            };
            cmd_harvest(&input, &column, &http, &paths, quiet).await?;
        }
        Commands::Product { code, http } => {
            cmd_product(&code, &http).await?;
        }
    }

    Ok(())
}

async fn cmd_harvest(
    input: &Path,
    column: &str,
    http: &HttpArgs,
    paths: &OutputPaths<'_>,
    quiet: bool,
) -> Result<()> {
    let file = File::open(input)
        .with_context(|| format!("Failed to open input file: {}", input.display()))?;
    let codes = tables::read_codes(file, column)?;
    tracing::info!("Read {} product codes from {}", codes.len(), input.display());

    let service = http.service()?;
    let outcomes = if quiet {
        service.run(&codes, &SilentReporter).await
    } else {
        service.run(&codes, &TracingReporter::default()).await
    };

    let report = BatchReport::from_outcomes(outcomes);
    write_report(&report, paths)?;

    println!(
        "{} products, {} skipped, {} characteristic rows",
        report.succeeded(),
        report.skipped_count(),
        report.characteristics.len()
    );

    Ok(())
}

async fn cmd_product(code: &str, http: &HttpArgs) -> Result<()> {
    let service = http.service()?;
    tracing::info!("Fetching {}", service.config().product_url(code));

    let page = service
        .product(code)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        characteristics = page.characteristics.len(),
        "Extraction complete"
    );

    println!("{}", serde_json::to_string_pretty(&page)?);

    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn write_report(report: &BatchReport, paths: &OutputPaths<'_>) -> Result<()> {
    tables::write_products(create(paths.products)?, &report.products)?;
    tracing::info!("Wrote {} products to {}", report.products.len(), paths.products.display());

    tables::write_characteristics(create(paths.characteristics)?, &report.characteristics)?;
    tracing::info!(
        "Wrote {} characteristic rows to {}",
        report.characteristics.len(),
        paths.characteristics.display()
    );

    if let Some(path) = paths.skipped {
        tables::write_skipped(create(path)?, &report.skipped)?;
        tracing::info!("Wrote {} skipped codes to {}", report.skipped.len(), path.display());
    }

    Ok(())
}
