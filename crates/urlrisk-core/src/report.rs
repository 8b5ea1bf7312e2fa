//! Output formatting for assessment results.

use serde::Serialize;

use crate::decision::{Label, Verdict};

/// One URL's outcome: a verdict, or the error that prevented one.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentRecord {
    pub url: String,
    #[serde(flatten)]
    pub verdict: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {s}. Use 'text' or 'json'.")),
        }
    }
}

fn is_scam(record: &AssessmentRecord) -> bool {
    matches!(&record.verdict, Some(v) if v.label == Label::Scam)
}

pub fn print_results(records: &[AssessmentRecord], format: OutputFormat) {
    match format {
        OutputFormat::Text => print_text(records),
        OutputFormat::Json => print_json(records),
    }
}

fn print_text(records: &[AssessmentRecord]) {
    let scams: Vec<_> = records.iter().filter(|r| is_scam(r)).collect();
    let errors: Vec<_> = records.iter().filter(|r| r.error.is_some()).collect();
    let legitimate = records.len() - scams.len() - errors.len();

    println!("\n{}", "=".repeat(70));
    println!("URL ASSESSMENT RESULTS");
    println!("{}", "=".repeat(70));

    if !scams.is_empty() {
        println!("\nSCAM URLS ({}):", scams.len());
        for r in &scams {
            if let Some(v) = &r.verdict {
                match v.score {
                    Some(score) => println!("  [{score:.4}] {} -- {}", r.url, v.reason),
                    None => println!("  [rule  ] {} -- {}", r.url, v.reason),
                }
            }
        }
    }

    if !errors.is_empty() {
        println!("\nERRORS ({}):", errors.len());
        for r in &errors {
            let err = r.error.as_deref().unwrap_or("unknown");
            println!("  [ERR ] {} -- {}", r.url, err);
        }
    }

    println!("\nSUMMARY:");
    println!("  Total URLs assessed: {}", records.len());
    println!("  Scam:                {}", scams.len());
    println!("  Legitimate:          {}", legitimate);
    println!("  Errors:              {}", errors.len());
    println!("{}", "=".repeat(70));
}

fn print_json(records: &[AssessmentRecord]) {
    let output = serde_json::json!({
        "results": records,
        "summary": {
            "total": records.len(),
            "scam": records.iter().filter(|r| is_scam(r)).count(),
            "legitimate": records.iter().filter(|r| !is_scam(r) && r.error.is_none()).count(),
            "errors": records.iter().filter(|r| r.error.is_some()).count(),
        }
    });
    println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
}
