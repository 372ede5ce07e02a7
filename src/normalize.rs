use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::info;

use crate::ingest::RawTable;
use crate::{FeedbackRecord, Sentiment, SentimentKind};

const DATE_TIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%Y%m%d"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SynthesisStats {
    pub sentiments: usize,
    pub dates: usize,
    pub dropped_rows: usize,
}

pub struct Normalizer {
    rng: StdRng,
    now: NaiveDateTime,
    max_age_days: u32,
}

impl Normalizer {
    pub fn new(rng: StdRng, now: NaiveDateTime, max_age_days: u32) -> Self {
        Self {
            rng,
            now,
            max_age_days,
        }
    }

    pub fn seeded(seed: u64, now: NaiveDateTime) -> Self {
        Self::new(StdRng::seed_from_u64(seed), now, 30)
    }

    pub fn normalize(mut self, table: RawTable) -> (Vec<FeedbackRecord>, SynthesisStats) {
        let mut stats = SynthesisStats::default();

        let sentiments: Vec<Sentiment> = table
            .rows
            .iter()
            .map(|row| {
                row.sentiment
                    .as_deref()
                    .and_then(Sentiment::parse)
                    .unwrap_or_else(|| {
                        stats.sentiments += 1;
                        self.synthesize_sentiment()
                    })
            })
            .collect();

        let now = self.now;
        let dates: Vec<NaiveDateTime> = table
            .rows
            .iter()
            .map(|row| {
                row.date
                    .as_deref()
                    .and_then(parse_timestamp)
                    .filter(|date| *date <= now)
                    .unwrap_or_else(|| {
                        stats.dates += 1;
                        self.synthesize_date()
                    })
            })
            .collect();

        let total = table.rows.len();
        let records: Vec<FeedbackRecord> = table
            .rows
            .into_iter()
            .zip(sentiments)
            .zip(dates)
            .filter_map(|((row, sentiment), date)| {
                let category = row.category?;
                if category.trim().is_empty() {
                    return None;
                }
                Some(FeedbackRecord {
                    category,
                    sentiment,
                    date,
                })
            })
            .collect();
        stats.dropped_rows = total - records.len();

        if stats.sentiments > 0 || stats.dates > 0 || stats.dropped_rows > 0 {
            info!(
                synthesized_sentiments = stats.sentiments,
                synthesized_dates = stats.dates,
                dropped_rows = stats.dropped_rows,
                sentiment_column = table.columns.sentiment,
                date_column = table.columns.date,
                "normalized feedback table"
            );
        }

        (records, stats)
    }

    fn synthesize_sentiment(&mut self) -> Sentiment {
        let idx = self.rng.gen_range(0..SentimentKind::ALL.len());
        Sentiment::from(SentimentKind::ALL[idx])
    }

    fn synthesize_date(&mut self) -> NaiveDateTime {
        let days = self.rng.gen_range(0..=self.max_age_days);
        self.now - Duration::days(i64::from(days))
    }
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Local).naive_local());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, format) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }
    None
}
