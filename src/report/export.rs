use chrono::NaiveDateTime;

use crate::format_float;
use crate::scoring::CategorySummary;

pub const PRIORITY_HEADER: [&str; 7] = [
    "Category",
    "Frequency",
    "Negative_Feedback",
    "Priority_Score",
    "Urgency",
    "Sentiment_Score",
    "Recency_Score",
];

pub fn priority_csv(rows: &[CategorySummary]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(PRIORITY_HEADER)?;
    for row in rows {
        writer.write_record([
            row.category.clone(),
            row.frequency.to_string(),
            row.negative_count.to_string(),
            format_float(row.priority_score, 1),
            row.urgency.label().to_string(),
            format_float(row.sentiment_score, 1),
            format_float(row.recency_score, 1),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

pub fn export_filename(generated_at: NaiveDateTime) -> String {
    format!("priority_report_{}.csv", generated_at.format("%Y%m%d"))
}
