//! `codesearch health` - aggregate backend status (§4.L).
//!
//! Grounded on the teacher's `doctor` command: a glyph-annotated status per
//! component plus a machine-readable JSON form, exiting non-zero when
//! anything is unreachable.

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use serde::Serialize;

use codesearch_core::{ComponentHealth, HealthCheckable, HealthMonitor, Status};

use crate::commands::Services;
use crate::OutputFormat;

/// `dyn VectorStore`/`dyn GraphStore` can't be upcast to `dyn
/// HealthCheckable` directly, so these thin adapters delegate the one
/// method `HealthMonitor::status` needs.
struct VectorHealth<'a>(&'a Services);
struct GraphHealth<'a>(&'a Services);

#[async_trait]
impl HealthCheckable for VectorHealth<'_> {
    async fn health(&self) -> ComponentHealth {
        self.0.vector_store.health().await
    }
}

#[async_trait]
impl HealthCheckable for GraphHealth<'_> {
    async fn health(&self) -> ComponentHealth {
        self.0.graph.health().await
    }
}

#[derive(Debug, Args)]
pub struct HealthArgs {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let glyph = match self {
            CheckStatus::Pass => "✓",
            CheckStatus::Warn => "!",
            CheckStatus::Fail => "✗",
        };
        write!(f, "{glyph}")
    }
}

impl From<Status> for CheckStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Healthy => CheckStatus::Pass,
            Status::Degraded => CheckStatus::Warn,
            Status::Unreachable => CheckStatus::Fail,
        }
    }
}

pub async fn execute(_args: HealthArgs, services: &Services, format: OutputFormat) -> Result<()> {
    let report = HealthMonitor::status(&VectorHealth(services), &GraphHealth(services), &services.cache).await;

    let vector_status: CheckStatus = report.vector.status.into();
    let graph_status: CheckStatus = report.graph.status.into();
    let overall: CheckStatus = report.overall.into();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!(
                "{vector_status} vector store{}",
                report.vector.detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
            );
            println!(
                "{graph_status} graph store{}",
                report.graph.detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
            );
            println!("  cache hit rate: {:.1}%", report.cache_hit_rate * 100.0);
            println!("  graph breaker: {:?}", services.graph_breaker.state());
            println!("  vector breaker: {:?}", services.vector_breaker.state());
            println!("{overall} overall: {:?}", report.overall);
        }
    }

    if report.overall == Status::Unreachable {
        std::process::exit(1);
    }

    Ok(())
}
