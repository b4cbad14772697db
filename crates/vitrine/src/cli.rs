//! Command implementations for the vitrine CLI
//!
//! Thin wrappers over vitrine-core: per-asset manifest verification,
//! vitals scoring with table output, and analytics forwarding.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;
use vitrine_core::cache::{AssetRequest, CacheConfig, CacheManager, Fetcher, GenerationStore};
use vitrine_core::metrics::{web_vitals_score, AnalyticsExporter};
use vitrine_core::{HttpFetcher, MetricsRecord};

/// Run the install phase against a deployed origin, reporting per-asset
/// results first so a failure names the exact asset.
pub async fn run_check(base_url: &str, version: Option<String>) -> Result<()> {
    let config = CacheConfig {
        version: version.unwrap_or_else(|| CacheConfig::default().version),
        ..CacheConfig::default()
    };
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::with_base_url(base_url));

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Asset", "Status", "Type", "Size"]);

    let mut failures = 0usize;
    for path in &config.manifest {
        match fetcher.fetch(&AssetRequest::get(path.clone())).await {
            Ok(snapshot) if snapshot.is_success() => {
                table.add_row(vec![
                    Cell::new(path),
                    Cell::new(snapshot.status).fg(Color::Green),
                    Cell::new(snapshot.content_type().unwrap_or("-")),
                    Cell::new(format!("{} B", snapshot.body_len())),
                ]);
            }
            Ok(snapshot) => {
                failures += 1;
                warn!(path = %path, status = snapshot.status, "Manifest asset unhealthy");
                table.add_row(vec![
                    Cell::new(path),
                    Cell::new(snapshot.status).fg(Color::Red),
                    Cell::new(snapshot.content_type().unwrap_or("-")),
                    Cell::new("-"),
                ]);
            }
            Err(e) => {
                failures += 1;
                warn!(path = %path, error = %e, "Manifest asset unreachable");
                table.add_row(vec![
                    Cell::new(path),
                    Cell::new(format!("error: {}", e.message)).fg(Color::Red),
                    Cell::new("-"),
                    Cell::new("-"),
                ]);
            }
        }
    }
    println!("{table}");

    if failures > 0 {
        anyhow::bail!(
            "{} of {} manifest assets failed; install would not complete",
            failures,
            config.manifest.len()
        );
    }

    // Per-asset fetches all passed; run the real install to confirm the
    // all-or-nothing phase and entry count.
    let version = config.version.clone();
    let manager = CacheManager::new(config, Arc::new(GenerationStore::new()), fetcher);
    manager.install().await?;
    manager.activate().await?;
    let stats = manager.store().stats();
    println!(
        "Install OK: generation '{}' holds {} entries ({} B)",
        version, stats.total_entries, stats.total_body_bytes
    );
    Ok(())
}

/// Score a vitals record and print it
pub fn run_score(path: &Path, json: bool) -> Result<()> {
    let record = load_record(path)?;
    let score = web_vitals_score(&record);

    if json {
        println!("{}", serde_json::to_string_pretty(&score)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Vital", "Value", "Score"]);
    table.add_row(vec![
        Cell::new("LCP"),
        Cell::new(format_ms(record.largest_contentful_paint)),
        score_cell(score.individual.lcp),
    ]);
    table.add_row(vec![
        Cell::new("FID"),
        Cell::new(format_ms(record.first_input_delay)),
        score_cell(score.individual.fid),
    ]);
    table.add_row(vec![
        Cell::new("CLS"),
        Cell::new(
            record
                .cumulative_layout_shift
                .map(|v| format!("{:.3}", v))
                .unwrap_or_else(|| "unset".to_string()),
        ),
        score_cell(score.individual.cls),
    ]);
    println!("{table}");
    println!("Overall: {:.2} ({})", score.overall, score.rating);
    Ok(())
}

/// Forward a vitals record to an analytics endpoint
pub async fn run_send(path: &Path, endpoint: String, url: String) -> Result<()> {
    let record = load_record(path)?;
    let exporter = AnalyticsExporter::new(
        Some(endpoint),
        format!("vitrine-cli/{}", env!("CARGO_PKG_VERSION")),
        url,
    );
    let payload = exporter.send(record).await;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn load_record(path: &Path) -> Result<MetricsRecord> {
    let raw = if path == Path::new("-") {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read metrics record from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read metrics record: {}", path.display()))?
    };
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid metrics record JSON: {}", path.display()))
}

fn format_ms(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.0} ms", v))
        .unwrap_or_else(|| "unset".to_string())
}

fn score_cell(score: f64) -> Cell {
    let color = if score >= 1.0 {
        Color::Green
    } else if score >= 0.5 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format!("{:.1}", score)).fg(color)
}
