use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::scoring::Urgency;
use crate::{round_to, FeedbackRecord};

const MILLIS_PER_DAY: i128 = 86_400_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    pub frequency_weight: f64,
    pub sentiment_weight: f64,
    pub recency_weight: f64,
    pub recency_decay_per_day: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            frequency_weight: 0.4,
            sentiment_weight: 0.4,
            recency_weight: 0.2,
            recency_decay_per_day: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub frequency: usize,
    pub negative_count: usize,
    pub sentiment_score: f64,
    pub avg_age_days: i64,
    pub recency_score: f64,
    pub priority_score: f64,
    pub urgency: Urgency,
}

impl CategorySummary {
    pub fn display_priority(&self) -> f64 {
        round_to(self.priority_score, 1)
    }

    pub fn display_sentiment(&self) -> f64 {
        round_to(self.sentiment_score, 1)
    }
}

#[derive(Debug)]
struct CategoryAccumulator {
    category: String,
    frequency: usize,
    negative_count: usize,
    timestamp_sum_ms: i128,
}

impl CategoryAccumulator {
    fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            frequency: 0,
            negative_count: 0,
            timestamp_sum_ms: 0,
        }
    }

    fn add(&mut self, record: &FeedbackRecord) {
        self.frequency += 1;
        if record.sentiment.is_negative() {
            self.negative_count += 1;
        }
        self.timestamp_sum_ms += i128::from(record.date.and_utc().timestamp_millis());
    }
}

#[derive(Debug, Clone, Default)]
pub struct PriorityScorer {
    weights: PriorityWeights,
}

impl PriorityScorer {
    pub fn new(weights: PriorityWeights) -> Self {
        Self { weights }
    }

    /// Equal scores keep the order in which their categories first appear.
    pub fn score(&self, records: &[FeedbackRecord], now: NaiveDateTime) -> Vec<CategorySummary> {
        let mut groups: Vec<CategoryAccumulator> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for record in records {
            let slot = *index.entry(record.category.as_str()).or_insert_with(|| {
                groups.push(CategoryAccumulator::new(&record.category));
                groups.len() - 1
            });
            groups[slot].add(record);
        }

        let mut summaries: Vec<CategorySummary> = groups
            .into_iter()
            .map(|group| self.summarize(group, now))
            .collect();

        summaries.sort_by(|a, b| {
            b.priority_score
                .partial_cmp(&a.priority_score)
                .unwrap_or(Ordering::Equal)
        });
        summaries
    }

    fn summarize(&self, group: CategoryAccumulator, now: NaiveDateTime) -> CategorySummary {
        let sentiment_score = if group.frequency == 0 {
            0.0
        } else {
            (group.negative_count as f64 / group.frequency as f64) * 100.0
        };

        let avg_age_days = if group.frequency == 0 {
            0
        } else {
            let mean_ms = group.timestamp_sum_ms.div_euclid(group.frequency as i128);
            let now_ms = i128::from(now.and_utc().timestamp_millis());
            (now_ms - mean_ms).div_euclid(MILLIS_PER_DAY) as i64
        };
        let recency_score = self.recency_score(avg_age_days);

        let priority_score = (group.frequency as f64 * self.weights.frequency_weight)
            + (sentiment_score * self.weights.sentiment_weight)
            + (recency_score * self.weights.recency_weight);

        CategorySummary {
            category: group.category,
            frequency: group.frequency,
            negative_count: group.negative_count,
            sentiment_score,
            avg_age_days,
            recency_score,
            priority_score,
            urgency: Urgency::from_score(priority_score),
        }
    }

    pub fn recency_score(&self, avg_age_days: i64) -> f64 {
        (100.0 - avg_age_days as f64 * self.weights.recency_decay_per_day).max(0.0)
    }
}
