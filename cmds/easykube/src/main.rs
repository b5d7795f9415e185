use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use easykube::ClusterConnection;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "easykube")]
#[command(about = "Create Kubernetes resources from YAML manifests", long_about = None)]
#[command(version)]
struct Cli {
	/// Path to the kubeconfig file. Without it every file listed in
	/// KUBECONFIG is merged, falling back to ~/.kube/config
	#[arg(long)]
	kubeconfig: Option<PathBuf>,

	/// Kubeconfig context to use instead of current-context
	#[arg(long)]
	context: Option<String>,

	/// Log level (trace, debug, info, warn, error). Overrides RUST_LOG
	#[arg(long)]
	log_level: Option<Level>,

	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Create one resource per manifest file
	Create(CreateArgs),
}

#[derive(Args)]
struct CreateArgs {
	/// Create every file as this kind instead of reading its `kind` field
	#[arg(long, value_enum)]
	kind: Option<KindArg>,

	/// Manifest files, processed in order
	#[arg(required = true)]
	files: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum KindArg {
	Deployment,
	Secret,
	Service,
	Pod,
}

/// Initialize tracing on stderr.
///
/// Priority for log level:
/// 1. `--log-level`
/// 2. `RUST_LOG` environment variable
/// 3. Default: info
fn init_logger(log_level: Option<Level>) {
	let filter = match log_level {
		Some(level) => EnvFilter::new(level.as_str()),
		None => EnvFilter::builder()
			.with_default_directive(Level::INFO.into())
			.from_env_lossy(),
	};

	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();
}

async fn run_create(conn: &ClusterConnection, args: CreateArgs) -> Result<()> {
	for file in &args.files {
		let result = match args.kind {
			Some(KindArg::Deployment) => conn.create_deployment(file).await,
			Some(KindArg::Secret) => conn.create_secret(file).await,
			Some(KindArg::Service) => conn.create_service(file).await,
			Some(KindArg::Pod) => conn.create_pod(file).await,
			None => conn.create_from_file(file).await,
		};
		result.with_context(|| format!("creating resource from {}", file.display()))?;
	}

	Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	init_logger(cli.log_level);

	let context = cli.context.as_deref();
	let conn = match &cli.kubeconfig {
		Some(path) => ClusterConnection::connect_with_context(path, context)
			.await
			.with_context(|| format!("loading kubeconfig {}", path.display()))?,
		None => ClusterConnection::connect_default(context)
			.await
			.context("loading default kubeconfig")?,
	};

	match cli.command {
		Commands::Create(args) => run_create(&conn, args).await,
	}
}
