pub mod cache;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod ingest;
pub mod insights;
pub mod normalize;
pub mod report;
pub mod scoring;

use chrono::{Local, NaiveDateTime};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::config::TriageConfig;
use crate::error::SourceError;
use crate::ingest::{LoadOutcome, ParseTier, TieredLoader};
use crate::insights::{generate_insights, InsightReport};
use crate::normalize::{Normalizer, SynthesisStats};
use crate::scoring::{CategorySummary, PriorityScorer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentKind {
    Positive,
    Neutral,
    Negative,
}

impl SentimentKind {
    pub const ALL: [SentimentKind; 3] = [
        SentimentKind::Positive,
        SentimentKind::Neutral,
        SentimentKind::Negative,
    ];

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "positive" => Some(SentimentKind::Positive),
            "neutral" => Some(SentimentKind::Neutral),
            "negative" => Some(SentimentKind::Negative),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SentimentKind::Positive => "Positive",
            SentimentKind::Neutral => "Neutral",
            SentimentKind::Negative => "Negative",
        }
    }
}

pub fn parse_sentiment_filter<'a>(
    values: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<SentimentKind>, String> {
    let mut kinds = Vec::new();
    for value in values.into_iter().flat_map(|value| value.split(',')) {
        if value.trim().is_empty() {
            continue;
        }
        let kind = SentimentKind::from_str(value)
            .ok_or_else(|| format!("invalid sentiment: {}", value.trim()))?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    if kinds.is_empty() {
        kinds = SentimentKind::ALL.to_vec();
    }
    Ok(kinds)
}

/// Keeps the source casing in `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentiment {
    pub kind: SentimentKind,
    pub label: String,
}

impl Sentiment {
    pub fn parse(value: &str) -> Option<Self> {
        SentimentKind::from_str(value).map(|kind| Self {
            kind,
            label: value.trim().to_string(),
        })
    }

    pub fn is_negative(&self) -> bool {
        self.kind == SentimentKind::Negative
    }
}

impl From<SentimentKind> for Sentiment {
    fn from(kind: SentimentKind) -> Self {
        Self {
            kind,
            label: kind.label().to_string(),
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRecord {
    pub category: String,
    pub sentiment: Sentiment,
    pub date: NaiveDateTime,
}

impl FeedbackRecord {
    pub fn new(category: impl Into<String>, sentiment: SentimentKind, date: NaiveDateTime) -> Self {
        Self {
            category: category.into(),
            sentiment: Sentiment::from(sentiment),
            date,
        }
    }
}

#[derive(Debug, Default)]
pub struct LoadedFeedback {
    pub records: Vec<FeedbackRecord>,
    pub tier: Option<ParseTier>,
    pub fingerprint: Option<String>,
    pub synthesis: SynthesisStats,
    pub source_error: Option<SourceError>,
}

impl LoadedFeedback {
    pub fn is_degraded(&self) -> bool {
        self.tier == Some(ParseTier::Manual)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TriageRun {
    pub generated_at: NaiveDateTime,
    pub total_feedback: usize,
    pub priorities: Vec<CategorySummary>,
    pub insights: InsightReport,
}

impl TriageRun {
    pub fn critical_count(&self) -> usize {
        self.priorities
            .iter()
            .filter(|summary| summary.urgency == scoring::Urgency::Critical)
            .count()
    }

    pub fn average_priority(&self) -> f64 {
        if self.priorities.is_empty() {
            return 0.0;
        }
        let total: f64 = self.priorities.iter().map(|summary| summary.priority_score).sum();
        total / self.priorities.len() as f64
    }
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn load_feedback(config: &TriageConfig, now: NaiveDateTime) -> LoadedFeedback {
    let loader = TieredLoader::new(config.source.delimiter);
    match loader.load_path(&config.source.path) {
        LoadOutcome::Parsed {
            parsed,
            fingerprint,
        } => {
            let seed = config.synthesis.seed.unwrap_or_else(|| fingerprint.seed());
            let normalizer = Normalizer::new(
                StdRng::seed_from_u64(seed),
                now,
                config.synthesis.max_age_days,
            );
            let tier = parsed.tier;
            let (records, synthesis) = normalizer.normalize(parsed.table);
            LoadedFeedback {
                records,
                tier: Some(tier),
                fingerprint: Some(fingerprint.hex()),
                synthesis,
                source_error: None,
            }
        }
        LoadOutcome::Unavailable(err) => {
            warn!(error = %err, "continuing with an empty feedback table");
            LoadedFeedback {
                source_error: Some(err),
                ..LoadedFeedback::default()
            }
        }
    }
}

pub fn analyze(records: &[FeedbackRecord], config: &TriageConfig, now: NaiveDateTime) -> TriageRun {
    let filtered: Vec<FeedbackRecord> = records
        .iter()
        .filter(|record| config.report.sentiments.contains(&record.sentiment.kind))
        .cloned()
        .collect();

    let scorer = PriorityScorer::new(config.scoring.clone());
    let priorities = scorer.score(&filtered, now);
    let insight_rows = config.report.insight_count.min(priorities.len());
    let insights = generate_insights(&priorities[..insight_rows], filtered.len());

    TriageRun {
        generated_at: now,
        total_feedback: filtered.len(),
        priorities,
        insights,
    }
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}

pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
