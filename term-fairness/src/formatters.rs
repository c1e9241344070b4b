//! Rendering of fairness reports.
//!
//! A [`FairnessReport`] can be written as JSON for downstream tooling, as
//! console text, or as Markdown for audit documents.
//!
//! # Examples
//!
//! ```rust,ignore
//! use term_fairness::formatters::{HumanFormatter, ReportFormatter};
//!
//! let report = scorer.report(None, None)?;
//! println!("{}", HumanFormatter::new().format(&report)?);
//! ```

use std::fmt::Write;

use crate::error::Result;
use crate::scorer::{DistanceRecord, FairnessReport};

/// What to include when rendering a report.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include the per-group moments table
    pub include_moments: bool,
    /// Include individual distance records
    pub include_records: bool,
    /// Maximum number of records to show (`None` for all)
    pub max_records: Option<usize>,
    /// List records from largest to smallest distance
    pub sort_by_distance: bool,
    /// Whether to use colorized output (for human formatter)
    pub use_colors: bool,
    /// Whether to include the generation timestamp
    pub include_timestamps: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_moments: true,
            include_records: true,
            max_records: None,
            sort_by_distance: false,
            use_colors: true,
            include_timestamps: true,
        }
    }
}

impl FormatterConfig {
    /// Score only.
    pub fn minimal() -> Self {
        Self {
            include_moments: false,
            include_records: false,
            max_records: Some(0),
            sort_by_distance: false,
            use_colors: false,
            include_timestamps: false,
        }
    }

    /// Everything, most divergent groups first.
    pub fn detailed() -> Self {
        Self {
            sort_by_distance: true,
            ..Self::default()
        }
    }

    /// Plain output with a bounded record list.
    pub fn ci() -> Self {
        Self {
            include_moments: false,
            include_records: true,
            max_records: Some(20),
            sort_by_distance: true,
            use_colors: false,
            include_timestamps: true,
        }
    }

    /// Sets whether to include group moments.
    pub fn with_moments(mut self, include: bool) -> Self {
        self.include_moments = include;
        self
    }

    /// Sets whether to include distance records.
    pub fn with_records(mut self, include: bool) -> Self {
        self.include_records = include;
        self
    }

    /// Sets the maximum number of records to display.
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = Some(max);
        self
    }

    /// Sets whether to use colorized output.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Records selected for display, and how many were left out.
    fn records<'r>(&self, report: &'r FairnessReport) -> (Vec<&'r DistanceRecord>, usize) {
        if !self.include_records {
            return (Vec::new(), 0);
        }
        let mut records: Vec<&DistanceRecord> = report.table().records.iter().collect();
        if self.sort_by_distance {
            records.sort_by(|a, b| {
                let (a, b) = (a.distance().unwrap_or(-1.0), b.distance().unwrap_or(-1.0));
                b.total_cmp(&a)
            });
        }
        let total = records.len();
        if let Some(max) = self.max_records {
            records.truncate(max);
        }
        let hidden = total - records.len();
        (records, hidden)
    }
}

/// Renders a [`FairnessReport`] as text.
pub trait ReportFormatter {
    /// Formats a report with the formatter's own configuration.
    fn format(&self, report: &FairnessReport) -> Result<String>;

    /// Formats a report with an explicit configuration.
    fn format_with_config(&self, report: &FairnessReport, _config: &FormatterConfig) -> Result<String> {
        self.format(report)
    }
}

/// Structured JSON output.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a pretty-printing JSON formatter.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: true,
        }
    }

    /// Creates a JSON formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &FairnessReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(&self, report: &FairnessReport, config: &FormatterConfig) -> Result<String> {
        let mut filtered = report.clone();
        if !config.include_moments {
            filtered.analysis.rows.clear();
        }
        filtered.distances.table.records = config.records(report).0.into_iter().cloned().collect();

        let mut value = serde_json::to_value(&filtered)?;
        if !config.include_timestamps {
            if let Some(object) = value.as_object_mut() {
                object.remove("generated_at");
            }
        }

        Ok(if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        })
    }
}

/// Console output.
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    /// Creates a human formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
        }
    }

    /// Creates a human formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for HumanFormatter {
    fn format(&self, report: &FairnessReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(&self, report: &FairnessReport, config: &FormatterConfig) -> Result<String> {
        let mut output = String::new();
        let score = report.score();

        writeln!(output)?;
        writeln!(
            output,
            "Fairness report for '{}' ({})",
            report.target, report.target_type
        )?;
        writeln!(
            output,
            "Sensitive attributes: {}",
            report.sensitive_attributes.join(", ")
        )?;
        if config.include_timestamps {
            writeln!(output, "Generated: {}", report.generated_at.to_rfc3339())?;
        }

        writeln!(output)?;
        if config.use_colors {
            let color = if score.is_zero() { "32" } else { "33" };
            writeln!(output, "📊 Score: \x1b[{color}m{score}\x1b[0m")?;
        } else {
            writeln!(output, "📊 Score: {score}")?;
        }
        writeln!(output, "   Mode: {}", report.mode())?;
        writeln!(output, "   Metric: {}", report.metric())?;
        writeln!(output, "   Records scored: {}", score.groups)?;
        writeln!(output, "   Total count: {}", score.total_count)?;

        if config.include_moments && !report.analysis.is_empty() {
            writeln!(output)?;
            writeln!(output, "📈 Group Moments:")?;
            for row in &report.analysis.rows {
                writeln!(
                    output,
                    "   {} (n={}): mean={} variance={}",
                    row.label, row.count, row.mean, row.variance
                )?;
            }
        }

        let (records, hidden) = config.records(report);
        if !records.is_empty() {
            writeln!(output)?;
            writeln!(output, "🔍 Distances:")?;
            for record in &records {
                writeln!(
                    output,
                    "   {}: {} (n={})",
                    record.label, record.outcome, record.count
                )?;
            }
        }
        if hidden > 0 {
            writeln!(output)?;
            writeln!(output, "   ... and {hidden} more records")?;
        }

        writeln!(output)?;
        Ok(output)
    }
}

/// Markdown output for audit documents.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    /// Creates a Markdown formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            heading_level: 2,
        }
    }

    /// Creates a Markdown formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 2,
        }
    }

    /// Sets the base heading level for the output.
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 6);
        self
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &FairnessReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(&self, report: &FairnessReport, config: &FormatterConfig) -> Result<String> {
        let mut output = String::new();
        let h = "#".repeat(self.heading_level as usize);
        let score = report.score();

        writeln!(output, "{h} Fairness Report: {}", report.target)?;
        writeln!(output)?;
        writeln!(output, "**Target type:** {}", report.target_type)?;
        writeln!(
            output,
            "**Sensitive attributes:** {}",
            report.sensitive_attributes.join(", ")
        )?;
        if config.include_timestamps {
            writeln!(output, "**Generated:** {}", report.generated_at.to_rfc3339())?;
        }

        writeln!(output)?;
        writeln!(output, "{h}# Score")?;
        writeln!(output)?;
        writeln!(output, "| Metric | Value |")?;
        writeln!(output, "|--------|-------|")?;
        writeln!(output, "| Score | {score} |")?;
        writeln!(output, "| Mode | {} |", report.mode())?;
        writeln!(output, "| Distance | {} |", report.metric())?;
        writeln!(output, "| Records Scored | {} |", score.groups)?;
        writeln!(output, "| Total Count | {} |", score.total_count)?;

        if config.include_moments && !report.analysis.is_empty() {
            writeln!(output)?;
            writeln!(output, "{h}# Group Moments")?;
            writeln!(output)?;
            writeln!(output, "| Group | Count | Mean | Variance |")?;
            writeln!(output, "|-------|-------|------|----------|")?;
            for row in &report.analysis.rows {
                writeln!(
                    output,
                    "| {} | {} | {} | {} |",
                    row.label, row.count, row.mean, row.variance
                )?;
            }
        }

        let (records, hidden) = config.records(report);
        if !records.is_empty() {
            writeln!(output)?;
            writeln!(output, "{h}# Distances")?;
            writeln!(output)?;
            writeln!(output, "| Group | Distance | Count |")?;
            writeln!(output, "|-------|----------|-------|")?;
            for record in &records {
                writeln!(
                    output,
                    "| {} | {} | {} |",
                    record.label, record.outcome, record.count
                )?;
            }
        }
        if hidden > 0 {
            writeln!(output)?;
            writeln!(
                output,
                "> **Note:** {hidden} additional records not shown in this report."
            )?;
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::{DistributionType, GroupAnalysis, GroupMoments, MomentValue};
    use crate::groups::{ComparisonMode, RecordLabel};
    use crate::metrics::DistanceMetric;
    use crate::scorer::{DistanceTable, DistributionScore, ScoreAggregator};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn create_test_report() -> FairnessReport {
        let records = vec![
            DistanceRecord::measured(RecordLabel::Group("Female".to_string()), 0.12, 40),
            DistanceRecord::measured(RecordLabel::Group("Male".to_string()), 0.3, 60),
            DistanceRecord::empty(RecordLabel::Group("Other".to_string())),
        ];
        let score = ScoreAggregator::aggregate(&records).unwrap();

        let rates = |p: f64| {
            let mut map = BTreeMap::new();
            map.insert("0".to_string(), 1.0 - p);
            map.insert("1".to_string(), p);
            MomentValue::Categorical(map)
        };

        FairnessReport {
            target: "hired".to_string(),
            target_type: DistributionType::Categorical,
            sensitive_attributes: vec!["sex".to_string()],
            analysis: GroupAnalysis {
                target: "hired".to_string(),
                target_type: DistributionType::Categorical,
                rows: vec![GroupMoments {
                    label: "Female".to_string(),
                    count: 40,
                    mean: rates(0.25),
                    variance: rates(0.25),
                }],
            },
            distances: DistributionScore {
                table: DistanceTable {
                    target: "hired".to_string(),
                    target_type: DistributionType::Categorical,
                    mode: ComparisonMode::Rest,
                    metric: DistanceMetric::Binomial,
                    records,
                },
                score,
            },
            generated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_formatter_config() {
        let config = FormatterConfig::default();
        assert!(config.include_moments);
        assert!(config.include_records);
        assert!(config.use_colors);

        let minimal = FormatterConfig::minimal();
        assert!(!minimal.include_records);
        assert!(!minimal.use_colors);

        assert_eq!(FormatterConfig::ci().max_records, Some(20));
    }

    #[test]
    fn test_json_formatter() {
        let report = create_test_report();
        let formatter = JsonFormatter::new();

        let output = formatter.format(&report).unwrap();
        assert!(output.contains("\"target\": \"hired\""));
        assert!(output.contains("\"metric\": \"binomial\""));
        assert!(output.contains("generated_at"));

        let output = formatter
            .format_with_config(&report, &FormatterConfig::minimal())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(value.get("generated_at").is_none());
        assert_eq!(value["distances"]["table"]["records"].as_array().unwrap().len(), 0);
        assert_eq!(value["distances"]["score"]["total_count"], 100);
    }

    #[test]
    fn test_human_formatter() {
        let report = create_test_report();
        let formatter = HumanFormatter::new();

        let output = formatter.format(&report).unwrap();
        assert!(output.contains("Fairness report for 'hired' (categorical)"));
        assert!(output.contains("Mode: rest"));
        assert!(output.contains("Female: 0.1200 (n=40)"));
        assert!(output.contains("Other: empty (n=0)"));

        let config = FormatterConfig::default().with_colors(false);
        let output = formatter.format_with_config(&report, &config).unwrap();
        assert!(output.contains("📊 Score: 0.2280"));
        assert!(!output.contains("\x1b["));
    }

    #[test]
    fn test_markdown_formatter() {
        let report = create_test_report();
        let formatter = MarkdownFormatter::new();

        let output = formatter.format(&report).unwrap();
        assert!(output.contains("## Fairness Report: hired"));
        assert!(output.contains("| Total Count | 100 |"));
        assert!(output.contains("| Female | 40 | 0: 0.7500, 1: 0.2500 |"));
        assert!(output.contains("### Distances"));

        let output = MarkdownFormatter::new()
            .with_heading_level(1)
            .format(&report)
            .unwrap();
        assert!(output.contains("# Fairness Report: hired"));
    }

    #[test]
    fn test_max_records_and_sorting() {
        let report = create_test_report();
        let config = FormatterConfig::detailed().with_colors(false).with_max_records(1);

        let output = HumanFormatter::new()
            .format_with_config(&report, &config)
            .unwrap();
        assert!(output.contains("Male: 0.3000 (n=60)"));
        assert!(!output.contains("Female: 0.1200"));
        assert!(output.contains("... and 2 more records"));
    }
}
