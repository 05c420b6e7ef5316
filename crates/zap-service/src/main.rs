use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zap_config::ConfigLoader;
use zap_types::Address;

mod service;

#[derive(Parser)]
#[command(name = "zap")]
#[command(about = "Zap planner for basket assets", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[arg(short, long, value_name = "FILE", default_value = "config/eusd.toml")]
	config: PathBuf,

	#[arg(long, env = "ZAP_LOG_LEVEL", default_value = "info")]
	log_level: String,

	/// Emit logs as JSON lines
	#[arg(long)]
	json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Plan a zap and print it as JSON
	Plan {
		/// Basket name from the configuration
		#[arg(long)]
		basket: String,
		/// Token the user pays with
		#[arg(long)]
		input_token: Address,
		/// Basket asset to issue, in decimal units
		#[arg(long)]
		amount: String,
		/// Decimals of the basket asset
		#[arg(long, default_value_t = 18)]
		decimals: u8,
		/// Receiver of the basket asset and refunds
		#[arg(long)]
		user: Address,
	},
	/// Validate the configuration file
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level, cli.json_logs)?;

	match &cli.command {
		Commands::Plan {
			basket,
			input_token,
			amount,
			decimals,
			user,
		} => {
			let amount = service::parse_amount(amount, *decimals)?;
			plan(&cli, basket, *input_token, amount, *user).await
		}
		Commands::Validate => validate_config(&cli).await,
	}
}

async fn plan(
	cli: &Cli,
	basket: &str,
	input_token: Address,
	amount: zap_types::U256,
	user: Address,
) -> Result<()> {
	info!("Loading configuration from: {:?}", cli.config);
	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")?;

	let service = service::ZapService::new(config)?;
	let output = service.plan(basket, input_token, amount, user).await?;

	println!(
		"{}",
		serde_json::to_string_pretty(&output).context("Failed to encode plan")?
	);
	Ok(())
}

async fn validate_config(cli: &Cli) -> Result<()> {
	info!("Validating configuration file: {:?}", cli.config);

	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")?;

	// Building the aggregator runs its schema check.
	zap_aggregator::create_aggregator(
		&config.aggregator.implementation,
		&config.aggregator.config,
	)
	.context("Invalid aggregator configuration")?;

	info!("Configuration is valid");
	info!("Chain: {} ({})", config.chain.chain_id, config.chain.rpc_url);
	info!("Aggregator: {}", config.aggregator.implementation);
	info!("Baskets:");
	for (name, tokens) in &config.baskets {
		info!(
			"  {}: {} ({} precursors, {} wrapped, {} direct)",
			name,
			tokens.basket_token,
			tokens.precursors.len(),
			tokens.wrapped.len(),
			tokens.direct.len()
		);
	}

	Ok(())
}

fn setup_tracing(log_level: &str, json: bool) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	// Logs go to stderr so the printed plan stays machine readable.
	let registry = tracing_subscriber::registry().with(env_filter);
	if json {
		registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init();
	}

	Ok(())
}
