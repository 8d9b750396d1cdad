use std::{fs, path::PathBuf};

use clap::Parser;
use color_eyre::eyre::WrapErr;
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use analogy_service::{AnalogyService, PlanRequest};
use analogy_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = analogy_cli::VERSION,
	rename_all = "kebab",
	styles = analogy_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// JSON request body containing `message.query_graph` and an optional `workflow`.
	#[arg(long, short = 'q', value_name = "FILE")]
	pub query: PathBuf,
	/// Search creative edges over direct-provider cases only.
	#[arg(long)]
	pub force_direct: bool,
	/// Dispatch the plans after assembling them.
	#[arg(long)]
	pub execute: bool,
	/// Parent dispatch id; random when omitted.
	#[arg(long, value_name = "UUID")]
	pub dispatch_id: Option<Uuid>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = analogy_config::load(&args.config)?;

	init_tracing(&config)?;

	let raw = fs::read_to_string(&args.query)
		.wrap_err_with(|| format!("Failed to read query file {:?}.", args.query))?;
	let query: Value = serde_json::from_str(&raw).wrap_err("Query file is not valid JSON.")?;
	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let service = AnalogyService::new(config, db);
	let mut request = PlanRequest::new(query);

	request.force_direct = args.force_direct;

	if let Some(dispatch_id) = args.dispatch_id {
		request.dispatch_id = dispatch_id;
	}

	let output = if args.execute {
		let answer = service.answer(&request).await?;

		tracing::info!(
			attempts = answer.attempts.len(),
			results = answer.total_results(),
			"Dispatched analogy plans."
		);

		serde_json::to_string_pretty(&answer)?
	} else {
		serde_json::to_string_pretty(&service.plan_query(&request).await?)?
	};

	println!("{output}");

	Ok(())
}

fn init_tracing(config: &analogy_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(filter).init();

	Ok(())
}
