use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use feedback_triage::config::TriageConfig;
use feedback_triage::dispatch::DispatchOutcome;
use feedback_triage::ingest::ParseTier;
use feedback_triage::insights::InsightReport;
use feedback_triage::normalize::SynthesisStats;
use feedback_triage::scoring::CategorySummary;
use feedback_triage::{parse_sentiment_filter, round_to, LoadedFeedback, TriageRun};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub top_n: Option<usize>,
    pub sentiment: Option<String>,
}

impl ReportQuery {
    pub fn apply(&self, config: &mut TriageConfig) -> Result<(), String> {
        if let Some(top_n) = self.top_n {
            config.report.top_n = top_n;
        }
        if let Some(sentiment) = self.sentiment.as_deref() {
            config.report.sentiments = parse_sentiment_filter([sentiment])?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ApiSourceStatus {
    pub path: String,
    pub tier: Option<ParseTier>,
    pub degraded: bool,
    pub fingerprint: Option<String>,
    pub synthesized: SynthesisStats,
    pub error: Option<String>,
}

impl ApiSourceStatus {
    pub fn from_loaded(path: String, loaded: &LoadedFeedback) -> Self {
        Self {
            path,
            tier: loaded.tier,
            degraded: loaded.is_degraded(),
            fingerprint: loaded.fingerprint.clone(),
            synthesized: loaded.synthesis,
            error: loaded.source_error.as_ref().map(|err| err.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiPriorityRow {
    pub rank: usize,
    pub category: String,
    pub frequency: usize,
    pub negative_feedback: usize,
    pub priority_score: f64,
    pub urgency: String,
    pub sentiment_score: f64,
    pub recency_score: f64,
}

impl ApiPriorityRow {
    fn from_summary(rank: usize, summary: &CategorySummary) -> Self {
        Self {
            rank,
            category: summary.category.clone(),
            frequency: summary.frequency,
            negative_feedback: summary.negative_count,
            priority_score: summary.display_priority(),
            urgency: summary.urgency.label().to_string(),
            sentiment_score: summary.display_sentiment(),
            recency_score: round_to(summary.recency_score, 1),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiReportResponse {
    pub generated_at: NaiveDateTime,
    pub source: ApiSourceStatus,
    pub total_feedback: usize,
    pub categories: usize,
    pub critical_issues: usize,
    pub average_priority: f64,
    pub priorities: Vec<ApiPriorityRow>,
    pub insights: InsightReport,
}

impl ApiReportResponse {
    pub fn from_run(run: TriageRun, source: ApiSourceStatus, table_len: usize) -> Self {
        Self {
            generated_at: run.generated_at,
            source,
            total_feedback: run.total_feedback,
            categories: run.priorities.len(),
            critical_issues: run.critical_count(),
            average_priority: round_to(run.average_priority(), 1),
            priorities: run
                .priorities
                .iter()
                .take(table_len)
                .enumerate()
                .map(|(idx, summary)| ApiPriorityRow::from_summary(idx + 1, summary))
                .collect(),
            insights: run.insights,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiDispatchRequest {
    pub recipients: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiDispatchResponse {
    pub request_id: String,
    pub outcome: DispatchOutcome,
    pub warnings: Vec<String>,
}
