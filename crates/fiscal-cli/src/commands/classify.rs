//! Classify command - detect the expense type of a document.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use fiscal_core::classify;

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Input text file(s)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

pub async fn run(args: ClassifyArgs) -> anyhow::Result<()> {
    let many = args.inputs.len() > 1;

    for input in &args.inputs {
        let text = fs::read_to_string(input)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", input.display(), e))?;
        let expense_type = classify(&text);
        info!("{} classified as {}", input.display(), expense_type);

        if many {
            println!("{}\t{}", input.display(), expense_type);
        } else {
            println!("{}", expense_type);
        }
    }

    Ok(())
}
