//! `codesearch index` - rebuild a repository's code examples (§4.G).

use anyhow::Result;
use clap::Args;

use crate::commands::Services;
use crate::progress::{finish_spinner, spinner};

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Repository name as known to the graph store.
    pub repository: String,

    /// Suppress progress output.
    #[arg(long)]
    pub quiet: bool,
}

pub async fn execute(args: IndexArgs, services: &Services) -> Result<()> {
    let pb = spinner(&format!("reindexing {}", args.repository), args.quiet);

    let stats = services.indexer.reindex(&args.repository).await?;
    let summary = format!(
        "reindexed {}: {} classes, {} methods, {} functions, {} written in {}ms",
        args.repository, stats.classes, stats.methods, stats.functions, stats.written, stats.took_ms
    );

    if pb.is_some() {
        finish_spinner(pb, &summary);
    } else {
        println!("{summary}");
    }

    Ok(())
}
