//! The `pixf extract` command.

use clap::Args;
use pixf_core::{Config, DirectorySource, ExtractionReport, Pixf};
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for the `extract` command.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Raw image file or directory of raw images
    pub input: PathBuf,

    /// Output directory [default: <output.root>/<output.dir_prefix><input stem>]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Output format: original, png, webp [default: output.format from config]
    #[arg(short, long)]
    pub format: Option<String>,

    /// Number of parallel encode workers (overrides PIXF_WORKERS)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Execute the extract command.
pub async fn execute(args: ExtractArgs, config: Config) -> anyhow::Result<()> {
    if args.workers == Some(0) {
        anyhow::bail!("--workers must be greater than 0");
    }

    let format = args
        .format
        .clone()
        .unwrap_or_else(|| config.output.format.clone());
    let img_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.default_output_dir(&args.input));

    // Pixf::new applies PIXF_WORKERS; --workers wins over it
    let mut pixf = Pixf::new(config);
    if let Some(workers) = args.workers {
        pixf = pixf.with_workers(workers);
    }

    tracing::info!(
        "Extracting {:?} -> {:?} (format: {}, workers: {})",
        args.input,
        img_dir,
        format,
        pixf.config().processing.workers
    );

    let spinner = create_spinner();
    let result = pixf
        .extract_images(&DirectorySource, &args.input, &img_dir, &format)
        .await;
    spinner.finish_and_clear();
    let report = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprint!("{}", format_summary(&report));
    }

    Ok(())
}

/// Spinner shown while a batch runs. Hidden automatically when stderr is not a terminal.
fn create_spinner() -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message("processing images...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Render the summary table printed after a run.
fn format_summary(report: &ExtractionReport) -> String {
    let megabytes = report.total_bytes() as f64 / (1024.0 * 1024.0);
    let seconds = report.elapsed_ms as f64 / 1000.0;

    let mut out = String::new();
    out.push('\n');
    out.push_str("  ====================================\n");
    out.push_str("               Summary\n");
    out.push_str("  ====================================\n");
    out.push_str(&format!("    Mode:         {:>8}\n", report.mode));
    out.push_str(&format!("    Discovered:   {:>8}\n", report.discovered));
    if report.skipped_unrecognized > 0 {
        out.push_str(&format!(
            "    Unrecognized: {:>8}\n",
            report.skipped_unrecognized
        ));
    }
    if report.duplicates > 0 {
        out.push_str(&format!("    Duplicates:   {:>8}\n", report.duplicates));
    }
    out.push_str(&format!("    Written:      {:>8}\n", report.written.len()));
    out.push_str("  ------------------------------------\n");
    out.push_str(&format!("    Size:         {:>7.1} MB\n", megabytes));
    out.push_str(&format!("    Duration:     {:>7.1}s\n", seconds));
    out.push_str(&format!(
        "    Output:       {}\n",
        report.output_dir.display()
    ));
    out.push_str("  ====================================\n");
    out
}
