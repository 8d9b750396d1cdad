use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = analogy_planner::Args::parse();

	analogy_planner::run(args).await
}
