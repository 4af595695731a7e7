//! Validate command - check CPF/CNPJ check digits.

use clap::Args;
use console::style;

use fiscal_core::{fiscal_id_kind, format_fiscal_id, FiscalIdKind};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// CPF or CNPJ, with or without punctuation
    #[arg(required = true)]
    ids: Vec<String>,
}

pub async fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let mut invalid = 0usize;

    for id in &args.ids {
        match fiscal_id_kind(id) {
            Some(kind) => {
                let label = match kind {
                    FiscalIdKind::Cpf => "CPF",
                    FiscalIdKind::Cnpj => "CNPJ",
                };
                println!(
                    "{} {} {}",
                    style("✓").green(),
                    label,
                    format_fiscal_id(id)
                );
            }
            None => {
                invalid += 1;
                println!("{} invalid {}", style("✗").red(), id);
            }
        }
    }

    if invalid > 0 {
        anyhow::bail!("{} of {} identifiers are invalid", invalid, args.ids.len());
    }

    Ok(())
}
