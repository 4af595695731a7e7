//! Batch command - extract expenses from many document texts.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use fiscal_core::{Expense, ExtractionRouter, TenantPolicy};

use super::config::load_config;
use super::extract::{expense_row, format_expense, ExtractOptions, OutputFormat, EXPENSE_COLUMNS};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern (e.g. "inbox/*.txt")
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    #[command(flatten)]
    options: ExtractOptions,
}

/// Outcome of one input file.
struct FileOutcome {
    path: PathBuf,
    result: Result<Expense, String>,
    elapsed_ms: u64,
}

impl FileOutcome {
    fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string()
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let files = collect_inputs(&args.input)?;

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(output_dir) = &args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let router = args.options.router(config)?;
    let policy = args.options.policy();
    let mut outcomes = Vec::with_capacity(files.len());

    for path in files {
        pb.set_message(path.display().to_string());
        let file_start = Instant::now();
        let result = process_single_file(&path, &router, &policy, &args.options).await;
        let elapsed_ms = file_start.elapsed().as_millis() as u64;

        let result = match result {
            Ok(expense) => {
                if let Some(output_dir) = &args.output_dir {
                    write_output(output_dir, &path, &expense, args.format)?;
                }
                Ok(expense)
            }
            Err(e) if args.continue_on_error => {
                warn!("Skipping {}: {}", path.display(), e);
                Err(e.to_string())
            }
            Err(e) => {
                pb.abandon();
                error!("Failed to process {}: {}", path.display(), e);
                anyhow::bail!("Processing {} failed: {}", path.display(), e);
            }
        };

        outcomes.push(FileOutcome {
            path,
            result,
            elapsed_ms,
        });
        pb.inc(1);
    }

    pb.finish_and_clear();

    if args.summary {
        let summary_path = args
            .output_dir
            .as_deref()
            .unwrap_or(Path::new("."))
            .join("summary.csv");

        write_summary(&summary_path, &outcomes)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    print_report(&outcomes, start);

    Ok(())
}

/// Text files matching `pattern`, in glob order.
fn collect_inputs(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let files: Vec<PathBuf> = glob(pattern)?
        .filter_map(|entry| entry.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", pattern);
    }
    Ok(files)
}

fn write_output(
    output_dir: &Path,
    input: &Path,
    expense: &Expense,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("expense");
    let output_path = output_dir.join(format!("{}.{}", stem, format.extension()));

    fs::write(&output_path, format_expense(expense, format)?)?;
    debug!("Wrote output to {}", output_path.display());
    Ok(())
}

fn print_report(outcomes: &[FileOutcome], start: Instant) {
    let failed: Vec<&FileOutcome> = outcomes.iter().filter(|o| o.result.is_err()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(outcomes.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if failed.is_empty() {
        return;
    }
    println!();
    println!("{}", style("Failed files:").red());
    for outcome in failed {
        if let Err(reason) = &outcome.result {
            println!("  - {}: {}", outcome.path.display(), reason);
        }
    }
}

async fn process_single_file(
    path: &Path,
    router: &ExtractionRouter,
    policy: &TenantPolicy,
    options: &ExtractOptions,
) -> anyhow::Result<Expense> {
    let text = fs::read_to_string(path)?;
    let document = options.document(text);
    debug!("{} classified as {}", path.display(), document.expense_type);

    Ok(router.extract_with_policy(&document, policy).await?)
}

fn write_summary(path: &Path, outcomes: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename", "status"];
    header.extend(EXPENSE_COLUMNS);
    header.extend(["processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for outcome in outcomes {
        let mut record = vec![outcome.file_name()];
        match &outcome.result {
            Ok(expense) => {
                record.push("success".to_string());
                record.extend(expense_row(expense));
                record.push(outcome.elapsed_ms.to_string());
                record.push(String::new());
            }
            Err(reason) => {
                record.push("error".to_string());
                record.extend(EXPENSE_COLUMNS.iter().map(|_| String::new()));
                record.push(outcome.elapsed_ms.to_string());
                record.push(reason.clone());
            }
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
