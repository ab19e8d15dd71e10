//! `codesearch check` - hallucination detection over a Python script (§4.K).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::commands::Services;
use crate::OutputFormat;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Python source file to analyse.
    pub script_path: PathBuf,

    /// Repository to validate references against.
    #[arg(long)]
    pub repository: Option<String>,

    /// Attach suggested corrections for unsupported references.
    #[arg(long)]
    pub suggestions: bool,

    /// Include per-reference detail in the report.
    #[arg(long)]
    pub detailed: bool,
}

pub async fn execute(args: CheckArgs, services: &Services, format: OutputFormat) -> Result<()> {
    let program_text = std::fs::read_to_string(&args.script_path)
        .with_context(|| format!("reading {}", args.script_path.display()))?;

    let report = services
        .detector
        .check(
            &args.script_path.display().to_string(),
            &program_text,
            args.repository.as_deref(),
            args.suggestions,
            args.detailed,
        )
        .await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!(
                "{}: risk={} confidence={:.3}",
                report.script_path,
                report.overall_risk.as_str(),
                report.overall_confidence
            );
            for item in &report.items {
                if item.supported {
                    continue;
                }
                println!("  unsupported: {} ({:?})", item.name, item.kind);
                for suggestion in &item.suggestions {
                    println!("    did you mean: {suggestion}");
                }
                for correction in &item.suggested_corrections {
                    println!("    similar code: {}", correction.full_name);
                }
            }
        }
    }

    if report.overall_risk.as_str() == "high" || report.overall_risk.as_str() == "critical" {
        std::process::exit(1);
    }

    Ok(())
}
