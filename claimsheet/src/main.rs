use clap::Parser;
use claim::ReportConfig;
use claimsheet::{
    run, AppResult, CredentialChain, DciFetcher, RunOptions, DEFAULT_CREDENTIALS_FILE,
    DEFAULT_FETCH_COMMAND,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "claimsheet")]
#[command(about = "Parse a certsuite claim.json and save the results as an Excel workbook")]
struct Cli {
    /// Path to claim.json (download target when --job-id is given)
    #[arg(short, long)]
    input_file: PathBuf,
    /// Path of the workbook to write, e.g. result.xlsx
    #[arg(short, long)]
    output_file: PathBuf,
    /// DCI job to download the claim from; omit to parse the local file
    #[arg(short, long)]
    job_id: Option<String>,
    /// TOML report configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Shell file with `export NAME=value` DCI credentials
    #[arg(long, default_value = DEFAULT_CREDENTIALS_FILE)]
    credentials_file: PathBuf,
    /// DCI command line client
    #[arg(long, default_value = DEFAULT_FETCH_COMMAND)]
    fetch_command: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match execute(cli).await {
        Ok(path) => {
            println!("Report written to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> AppResult<PathBuf> {
    let config = match &cli.config {
        Some(path) => ReportConfig::from_path(path)?,
        None => ReportConfig::default(),
    };

    let mut options = RunOptions::new(cli.input_file, cli.output_file).with_config(config);
    match cli.job_id {
        Some(job_id) => options = options.with_job_id(job_id),
        None => info!("no job id given, parsing {} offline", options.input.display()),
    }

    let fetcher = DciFetcher::new().with_program(cli.fetch_command);
    let credentials = CredentialChain::standard(&cli.credentials_file);

    let report = run(&options, &fetcher, &credentials).await?;
    Ok(report.output)
}
