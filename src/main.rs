use std::path::PathBuf;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use groundcheck::{BatchConfig, BatchDriver, DatasetVariant, OutputMode, load_records};

#[derive(Parser)]
#[command(name = "groundcheck")]
#[command(about = "Render per-sample grounding reports from VQA evaluation results")]
struct Cli {
    /// JSONL file of evaluation records
    #[arg(long, value_name = "FILE", env = "GROUNDCHECK_RESULTS")]
    results: PathBuf,

    /// Benchmark image root (images and ground-truth JSON per variant)
    #[arg(long, value_name = "DIR", env = "GROUNDCHECK_IMAGE_ROOT")]
    image_root: PathBuf,

    /// Root directory for generated reports
    #[arg(long, value_name = "DIR", env = "GROUNDCHECK_REPORT_ROOT")]
    report_root: PathBuf,

    /// Dataset split; inferred from the results file name when omitted
    #[arg(long, value_enum)]
    variant: Option<DatasetVariant>,

    /// Also save overlays, crops and a text summary next to each report
    #[arg(long)]
    export_assets: bool,

    /// TrueType font used for box labels
    #[arg(long, value_name = "FILE", env = "GROUNDCHECK_LABEL_FONT")]
    label_font: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let args = Cli::parse();
    init_tracing(args.verbose);

    if let Err(err) = run(args) {
        error!(error = %err, "run failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run(args: Cli) -> anyhow::Result<()> {
    let mut config = BatchConfig::new(args.results, &args.image_root, &args.report_root, args.variant);
    if args.export_assets {
        config.output_mode = OutputMode::WithAssets;
    }
    config.label_font = args.label_font;
    config.show_progress = !args.quiet;

    std::fs::create_dir_all(&config.report_dir)?;
    let records = load_records(&config.results_path)?;

    let driver = BatchDriver::new(config)?;
    driver.run(records);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
