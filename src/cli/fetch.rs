//! Fetch command implementation

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::{ContributionDay, SourceKind};
use crate::error::{ConfigError, Result};
use crate::models::{DayDisplay, SummaryRow};
use crate::output::json::format_json;
use crate::output::table::format_table;
use crate::output::{Formattable, heatmap};
use crate::pipeline::service::Contributions;
use crate::pipeline::{ContributionService, FetchOutcome};
use crate::stats::Summary;

/// Contributions plus their summary, ready for any output format.
pub struct ContributionReport {
    pub data: Contributions,
    pub summary: Summary,
    pub show_days: bool,
}

impl ContributionReport {
    pub fn new(data: Contributions, show_days: bool) -> Self {
        let summary = Summary::from_days(&data.days);
        Self {
            data,
            summary,
            show_days,
        }
    }
}

/// JSON shape: the backend response fields plus provenance and summary.
#[derive(Serialize)]
struct ReportJson<'a> {
    ok: bool,
    username: &'a str,
    source: SourceKind,
    data: &'a [ContributionDay],
    summary: &'a Summary,
    #[serde(skip_serializing_if = "is_empty")]
    failures: &'a [String],
    #[serde(skip_serializing_if = "is_empty")]
    warnings: &'a [String],
}

fn is_empty(items: &&[String]) -> bool {
    items.is_empty()
}

impl Formattable for ContributionReport {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(format_json(&ReportJson {
                ok: true,
                username: &self.data.username,
                source: self.data.source,
                data: &self.data.days,
                summary: &self.summary,
                failures: &self.data.failures,
                warnings: &self.data.warnings,
            })?),
            OutputFormat::Table if self.show_days => {
                let rows: Vec<DayDisplay> = self.data.days.iter().map(DayDisplay::from).collect();
                Ok(format_table(&rows))
            }
            OutputFormat::Table => Ok(format_table(&SummaryRow::from_summary(&self.summary))),
            OutputFormat::Pretty => Ok(self.pretty()),
        }
    }
}

impl ContributionReport {
    fn pretty(&self) -> String {
        let mut out = format!(
            "{} {} contributions in {} days {}\n\n",
            self.data.username.bold(),
            self.summary.total.to_string().green().bold(),
            self.data.days.len(),
            format!("(source: {})", self.data.source).dimmed()
        );
        out.push_str(&heatmap::render(&self.data.days));
        out.push_str("\n\n");

        for row in SummaryRow::from_summary(&self.summary) {
            out.push_str(&format!("{:<22}{}\n", row.metric, row.value));
        }

        if self.data.is_mock() {
            out.push_str(&format!(
                "\n{} Showing sample data, every source failed:\n",
                "⚠".yellow()
            ));
            for failure in &self.data.failures {
                out.push_str(&format!("  - {}\n", failure));
            }
        }
        for warning in &self.data.warnings {
            out.push_str(&format!("{} {}\n", "⚠".yellow(), warning));
        }

        out.trim_end().to_string()
    }
}

/// Run one service cycle, with a spinner when the output is interactive.
pub async fn cycle(service: &ContributionService, format: OutputFormat) -> Result<FetchOutcome> {
    let spinner = (format == OutputFormat::Pretty).then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Fetching contributions...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let outcome = service.fetch().await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    Ok(outcome?)
}

/// Print a cycle's result; not-authenticated becomes an error with a login hint.
pub fn report(outcome: FetchOutcome, format: OutputFormat, show_days: bool) -> Result<()> {
    match outcome {
        FetchOutcome::NotAuthenticated => Err(ConfigError::MissingUsername.into()),
        FetchOutcome::Ready(data) => {
            crate::output::print(&ContributionReport::new(data, show_days), format)
        }
    }
}

/// Run the fetch command
pub async fn run(opts: &GlobalOptions, show_days: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let service = ctx.service()?;
    let outcome = cycle(&service, ctx.format).await?;
    report(outcome, ctx.format, show_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::{day, days_ending};

    fn contributions(source: SourceKind) -> Contributions {
        Contributions {
            username: "octocat".to_string(),
            source,
            days: vec![day("2025-01-14", 2), day("2025-01-15", 5)],
            failures: vec![],
            warnings: vec![],
        }
    }

    #[test]
    fn test_json_report() {
        let report = ContributionReport::new(contributions(SourceKind::GraphQl), false);
        let json: serde_json::Value =
            serde_json::from_str(&report.format(OutputFormat::Json).unwrap()).unwrap();

        assert_eq!(json["data"]["ok"], true);
        assert_eq!(json["data"]["source"], "graphql");
        assert_eq!(json["data"]["data"][1]["contributionCount"], 5);
        assert_eq!(json["data"]["summary"]["total"], 7);
        assert!(json["data"].get("failures").is_none());
        assert!(json["meta"]["version"].is_string());
    }

    #[test]
    fn test_table_report_summary_and_days() {
        let report = ContributionReport::new(contributions(SourceKind::Scrape), false);
        let table = report.format(OutputFormat::Table).unwrap();
        assert!(table.contains("Total contributions"));

        let report = ContributionReport::new(contributions(SourceKind::Scrape), true);
        let table = report.format(OutputFormat::Table).unwrap();
        assert!(table.contains("2025-01-15"));
        assert!(table.contains("COUNT"));
    }

    #[test]
    fn test_pretty_report_flags_mock_data() {
        colored::control::set_override(false);
        let mut data = contributions(SourceKind::Mock);
        data.days = days_ending("2025-01-15", 365);
        data.failures = vec!["scrape: no contribution data found, profile might be private".into()];

        let out = ContributionReport::new(data, false)
            .format(OutputFormat::Pretty)
            .unwrap();
        assert!(out.contains("Showing sample data"));
        assert!(out.contains("profile might be private"));
        assert!(out.contains("Longest streak"));
    }

    #[test]
    fn test_not_authenticated_is_error() {
        let err = report(FetchOutcome::NotAuthenticated, OutputFormat::Json, false).unwrap_err();
        assert!(err.to_string().contains("gitpulse login"));
    }
}
