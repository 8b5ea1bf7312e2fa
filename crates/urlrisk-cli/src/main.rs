//! URL scam assessment CLI - heuristic rules plus a frozen tree-ensemble classifier.
//!
//! Usage:
//!   urlrisk https://example.com --model models/model.json
//!   urlrisk --input urls.txt --model models/model.json --threshold 0.7 --format json
//!   cat urls.txt | urlrisk --input - --model models/model.json

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use urlrisk_core::config::EngineConfig;
use urlrisk_core::decision::DEFAULT_THRESHOLD;
use urlrisk_core::engine::Engine;
use urlrisk_core::report::{print_results, AssessmentRecord, OutputFormat};

#[derive(Parser)]
#[command(name = "urlrisk")]
#[command(about = "URL scam assessment engine")]
struct Cli {
    /// URLs to assess
    urls: Vec<String>,

    /// Read additional URLs from a file, one per line (`-` for stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Path to the classifier artifact
    #[arg(short, long, default_value = "models/model.json")]
    model: PathBuf,

    /// Path to the rule configuration (built-in defaults when omitted)
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Scam threshold (0.0-1.0)
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

/// Read URLs one per line; blank lines and `#` comments are skipped.
fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let data = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("cannot read URLs from stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?
    };

    Ok(data
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut urls = cli.urls.clone();
    if let Some(path) = &cli.input {
        urls.extend(read_url_list(path)?);
    }
    if urls.is_empty() {
        bail!("no URLs given; pass them as arguments or via --input");
    }

    eprintln!("[*] Loading model from {}...", cli.model.display());
    let config = EngineConfig {
        model_path: cli.model,
        rules_path: cli.rules,
        threshold: cli.threshold,
    };
    // A broken artifact must stop the process here, before any verdicts.
    let engine = Engine::from_config(&config).context("engine startup failed")?;

    eprintln!("[*] Assessing {} URLs...", urls.len());
    let records: Vec<AssessmentRecord> = urls
        .par_iter()
        .map(|url| match engine.assess(url) {
            Ok(verdict) => AssessmentRecord {
                url: url.clone(),
                verdict: Some(verdict),
                error: None,
            },
            Err(e) => AssessmentRecord {
                url: url.clone(),
                verdict: None,
                error: Some(format!("assessment error: {e}")),
            },
        })
        .collect();

    print_results(&records, cli.format);

    Ok(())
}
