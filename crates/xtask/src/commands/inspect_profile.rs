//! Read and inspect binary profiler dumps
//!
//! Decodes files written by `Profiler::dump(true)` and displays their contents.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::{Path, PathBuf};

use behavior_tree::{Collection, NodeId, ProfileReport, RootId};

/// Read and inspect a binary profiler dump
#[derive(Parser)]
pub struct InspectProfile {
    /// Path to the dump file
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Only show this root's collection
    #[arg(short, long, value_name = "ROOT")]
    root: Option<RootId>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Per-root table (calls, total and mean time per node)
    Summary,
    /// Full JSON output
    Json,
    /// Pretty-printed debug format
    Debug,
}

impl InspectProfile {
    pub fn execute(self) -> Result<()> {
        let (bytes, mut report) = read_report(&self.path)?;

        if let Some(root) = self.root {
            report.roots.retain(|&id, _| id == root);
            if report.is_empty() {
                anyhow::bail!("Root {} not found in {}", root, self.path.display());
            }
        }

        println!(
            "{} {}",
            style("Profile File:").bold().cyan(),
            self.path.display()
        );
        println!(
            "{} {}",
            style("File Size:").bold().cyan(),
            format_bytes(bytes)
        );
        println!("{} {}", style("Roots:").bold().cyan(), report.roots.len());
        println!();

        match self.format {
            OutputFormat::Summary => print_summary(&report),
            OutputFormat::Json => print_json(&report)?,
            OutputFormat::Debug => println!("{:#?}", report),
        }

        Ok(())
    }
}

/// Reads and decodes a dump, returning its size alongside the report.
fn read_report(path: &Path) -> Result<(usize, ProfileReport)> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read profile file: {}", path.display()))?;
    let report = ProfileReport::from_bytes(&bytes)
        .with_context(|| format!("Failed to decode profile file: {}", path.display()))?;
    Ok((bytes.len(), report))
}

pub fn print_summary(report: &ProfileReport) {
    println!("{}", style("=== Profile Summary ===").bold().green());
    println!();

    if report.is_empty() {
        println!("{}", style("No samples recorded").dim());
        return;
    }

    for (root, collection) in &report.roots {
        print_collection(*root, collection);
        println!();
    }
}

fn print_collection(root: RootId, collection: &Collection) {
    println!("{}", style(format!("Root {root}:")).bold().yellow());
    if collection.is_empty() {
        println!("  {}", style("(empty)").dim());
        return;
    }

    println!(
        "  {:>8}  {:>10}  {:>12}  {:>12}",
        "node", "calls", "total", "mean"
    );

    // Heaviest subtrees first.
    let mut rows: Vec<(NodeId, u64, u64)> = collection
        .iter()
        .map(|(&node, sample)| (node, sample.calls, sample.elapsed_ticks))
        .collect();
    rows.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));

    for (node, calls, elapsed) in rows {
        let mean = elapsed.checked_div(calls).unwrap_or(0);
        println!(
            "  {:>8}  {:>10}  {:>12}  {:>12}",
            node,
            calls,
            format_nanos(elapsed),
            format_nanos(mean)
        );
    }
}

fn print_json(report: &ProfileReport) -> Result<()> {
    let json =
        serde_json::to_string_pretty(report).context("Failed to serialize profile to JSON")?;
    println!("{}", json);
    Ok(())
}

fn format_nanos(nanos: u64) -> String {
    const US: u64 = 1_000;
    const MS: u64 = US * 1_000;

    if nanos >= MS {
        format!("{:.2} ms", nanos as f64 / MS as f64)
    } else if nanos >= US {
        format!("{:.2} us", nanos as f64 / US as f64)
    } else {
        format!("{} ns", nanos)
    }
}

fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
