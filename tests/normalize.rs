use chrono::{Duration, NaiveDate, NaiveDateTime};
use feedback_triage::ingest::{ColumnPresence, RawRecord, RawTable};
use feedback_triage::normalize::{parse_timestamp, Normalizer};
use feedback_triage::SentimentKind;

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 10)
        .and_then(|date| date.and_hms_opt(9, 30, 0))
        .unwrap()
}

fn table(rows: Vec<RawRecord>) -> RawTable {
    RawTable {
        columns: ColumnPresence {
            category: true,
            sentiment: true,
            date: true,
        },
        rows,
    }
}

fn row(category: Option<&str>, sentiment: Option<&str>, date: Option<&str>) -> RawRecord {
    RawRecord::from_fields(category, sentiment, date)
}

#[test]
fn keeps_present_values_untouched() {
    let input = table(vec![row(Some("UI"), Some("negative"), Some("2024-06-01"))]);
    let (records, stats) = Normalizer::seeded(7, fixed_now()).normalize(input);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].category, "UI");
    assert_eq!(records[0].sentiment.kind, SentimentKind::Negative);
    assert_eq!(records[0].sentiment.label, "negative");
    assert_eq!(
        records[0].date,
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap()
    );
    assert_eq!(stats.sentiments, 0);
    assert_eq!(stats.dates, 0);
}

#[test]
fn fills_every_missing_field() {
    let input = table(vec![
        row(Some("UI"), None, None),
        row(Some("Billing"), Some("mad"), Some("not a date")),
        row(Some("Speed"), Some("Positive"), Some("2999-01-01")),
    ]);
    let (records, stats) = Normalizer::seeded(42, fixed_now()).normalize(input);

    assert_eq!(records.len(), 3);
    assert_eq!(stats.sentiments, 2);
    assert_eq!(stats.dates, 3);
    for record in &records {
        assert!(record.date <= fixed_now());
        assert!(record.date >= fixed_now() - Duration::days(30));
    }
    assert_eq!(records[2].sentiment.kind, SentimentKind::Positive);
}

#[test]
fn drops_rows_without_category() {
    let input = table(vec![
        row(None, Some("Negative"), None),
        row(Some("UI"), Some("Negative"), None),
        row(Some("   "), Some("Positive"), None),
        row(Some("Speed"), None, None),
    ]);
    let (records, stats) = Normalizer::seeded(1, fixed_now()).normalize(input);

    let categories: Vec<&str> = records.iter().map(|record| record.category.as_str()).collect();
    assert_eq!(categories, vec!["UI", "Speed"]);
    assert_eq!(stats.dropped_rows, 2);
}

#[test]
fn same_seed_same_output() {
    let rows: Vec<RawRecord> = (0..50)
        .map(|idx| row(Some(["UI", "Billing", "Speed"][idx % 3]), None, None))
        .collect();

    let (first, _) = Normalizer::seeded(99, fixed_now()).normalize(table(rows.clone()));
    let (second, _) = Normalizer::seeded(99, fixed_now()).normalize(table(rows.clone()));
    assert_eq!(first, second);

    let (other, _) = Normalizer::seeded(100, fixed_now()).normalize(table(rows));
    assert_ne!(first, other);
}

#[test]
fn synthesized_dates_are_whole_days_back() {
    let rows: Vec<RawRecord> = (0..20).map(|_| row(Some("UI"), None, None)).collect();
    let (records, _) = Normalizer::seeded(5, fixed_now()).normalize(table(rows));
    for record in records {
        let age = fixed_now() - record.date;
        assert_eq!(age.num_seconds() % 86_400, 0);
        assert!((0..=30).contains(&age.num_days()));
    }
}

#[test]
fn parses_common_timestamp_layouts() {
    let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
        .and_then(|date| date.and_hms_opt(14, 20, 0))
        .unwrap();
    assert_eq!(parse_timestamp("2024-03-05 14:20:00"), Some(expected));
    assert_eq!(parse_timestamp("2024-03-05T14:20:00"), Some(expected));
    assert_eq!(parse_timestamp("03/05/2024 14:20"), Some(expected));
    assert_eq!(
        parse_timestamp("2024/03/05"),
        expected.date().and_hms_opt(0, 0, 0)
    );
    assert!(parse_timestamp("2024-03-05T14:20:00Z").is_some());
    assert_eq!(parse_timestamp(""), None);
    assert_eq!(parse_timestamp("yesterday"), None);
}
