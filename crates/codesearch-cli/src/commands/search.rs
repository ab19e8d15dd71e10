//! `codesearch search` - validated semantic code search (§4.J).

use anyhow::Result;
use clap::Args;
use serde_json::json;

use codesearch_search::{Filter, SearchMode};

use crate::commands::Services;
use crate::OutputFormat;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Natural-language or code-shaped query.
    pub query: String,

    /// Number of validated hits to return (1-50).
    #[arg(long, default_value_t = 10)]
    pub top_k: usize,

    /// Restrict results to this repository.
    #[arg(long)]
    pub repository: Option<String>,

    /// Drop hits whose combined confidence falls below this threshold.
    #[arg(long, default_value_t = 0.0)]
    pub min_confidence: f64,

    /// Retrieval/validation tuning: fast, balanced, or thorough.
    #[arg(long, default_value = "balanced")]
    pub mode: String,
}

fn parse_mode(mode: &str) -> Result<SearchMode> {
    match mode {
        "fast" => Ok(SearchMode::Fast),
        "balanced" => Ok(SearchMode::Balanced),
        "thorough" => Ok(SearchMode::Thorough),
        other => anyhow::bail!("unknown search mode '{other}', expected fast|balanced|thorough"),
    }
}

pub async fn execute(args: SearchArgs, services: &Services, format: OutputFormat) -> Result<()> {
    let filter = args.repository.as_deref().map(Filter::repository);
    let mode = parse_mode(&args.mode)?;

    let hits = services
        .engine
        .search_and_validate(&args.query, args.top_k, filter, args.min_confidence, mode)
        .await?;

    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = hits
                .iter()
                .map(|hit| {
                    json!({
                        "id": hit.id,
                        "full_name": hit.payload.full_name,
                        "repository_name": hit.payload.repository_name,
                        "file_path": hit.payload.file_path,
                        "kind": hit.payload.kind.as_str(),
                        "semantic_score": hit.semantic_score,
                        "structural_score": hit.structural_score,
                        "combined_score": hit.combined_score,
                        "validation_status": hit.validation_status,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            if hits.is_empty() {
                println!("no validated hits");
            }
            for hit in &hits {
                println!(
                    "{:<6.3} {:<10} {} ({}:{})",
                    hit.combined_score, hit.validation_status, hit.payload.full_name, hit.payload.repository_name, hit.payload.file_path
                );
            }
        }
    }

    Ok(())
}
