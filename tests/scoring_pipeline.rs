use chrono::{Duration, NaiveDate, NaiveDateTime};
use feedback_triage::config::TriageConfig;
use feedback_triage::scoring::{PriorityScorer, PriorityWeights, Urgency};
use feedback_triage::{analyze, parse_sentiment_filter, FeedbackRecord, SentimentKind};

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 10)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .unwrap()
}

fn record(category: &str, sentiment: SentimentKind, days_ago: i64) -> FeedbackRecord {
    FeedbackRecord::new(category, sentiment, fixed_now() - Duration::days(days_ago))
}

#[test]
fn scores_and_ranks_example_categories() {
    let records = vec![
        record("A", SentimentKind::Negative, 0),
        record("A", SentimentKind::Negative, 0),
        record("B", SentimentKind::Positive, 0),
    ];

    let scorer = PriorityScorer::new(PriorityWeights::default());
    let ranked = scorer.score(&records, fixed_now());

    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].category, "A");
    assert_eq!(ranked[0].frequency, 2);
    assert_eq!(ranked[0].negative_count, 2);
    assert!((ranked[0].sentiment_score - 100.0).abs() < 1e-6);
    assert!((ranked[0].recency_score - 100.0).abs() < 1e-6);
    assert!((ranked[0].priority_score - 60.8).abs() < 1e-6);
    assert_eq!(ranked[0].urgency, Urgency::High);

    assert_eq!(ranked[1].category, "B");
    assert!((ranked[1].priority_score - 20.4).abs() < 1e-6);
    assert_eq!(ranked[1].urgency, Urgency::Low);
}

#[test]
fn urgency_thresholds_are_exclusive() {
    assert_eq!(Urgency::from_score(70.0), Urgency::High);
    assert_eq!(Urgency::from_score(70.01), Urgency::Critical);
    assert_eq!(Urgency::from_score(50.0), Urgency::Medium);
    assert_eq!(Urgency::from_score(50.01), Urgency::High);
    assert_eq!(Urgency::from_score(30.0), Urgency::Low);
    assert_eq!(Urgency::from_score(30.01), Urgency::Medium);
    assert_eq!(Urgency::from_score(0.0), Urgency::Low);
}

#[test]
fn recency_floors_at_zero_for_old_feedback() {
    let scorer = PriorityScorer::new(PriorityWeights::default());
    assert!((scorer.recency_score(0) - 100.0).abs() < 1e-6);
    assert!((scorer.recency_score(10) - 70.0).abs() < 1e-6);
    assert!((scorer.recency_score(34) - 0.0).abs() < 1e-6);
    assert!((scorer.recency_score(400) - 0.0).abs() < 1e-6);

    let ranked = scorer.score(&[record("Old", SentimentKind::Neutral, 90)], fixed_now());
    assert_eq!(ranked[0].avg_age_days, 90);
    assert!((ranked[0].recency_score - 0.0).abs() < 1e-6);
}

#[test]
fn average_age_uses_mean_timestamp() {
    let records = vec![
        record("Login", SentimentKind::Neutral, 0),
        record("Login", SentimentKind::Neutral, 10),
    ];
    let ranked = PriorityScorer::default().score(&records, fixed_now());
    assert_eq!(ranked[0].avg_age_days, 5);
    assert!((ranked[0].recency_score - 85.0).abs() < 1e-6);
}

#[test]
fn ties_keep_first_appearance_order() {
    let records = vec![
        record("Zeta", SentimentKind::Positive, 1),
        record("Alpha", SentimentKind::Positive, 1),
        record("Mid", SentimentKind::Negative, 1),
    ];
    let ranked = PriorityScorer::new(PriorityWeights::default()).score(&records, fixed_now());
    let order: Vec<&str> = ranked.iter().map(|row| row.category.as_str()).collect();
    assert_eq!(order, vec!["Mid", "Zeta", "Alpha"]);
}

#[test]
fn sentiment_match_ignores_case() {
    let mut negative = record("Billing", SentimentKind::Neutral, 0);
    negative.sentiment = feedback_triage::Sentiment::parse("NEGATIVE").unwrap();
    assert_eq!(negative.sentiment.label, "NEGATIVE");

    let ranked = PriorityScorer::default().score(&[negative], fixed_now());
    assert_eq!(ranked[0].negative_count, 1);
}

#[test]
fn scoring_is_deterministic() {
    let records: Vec<FeedbackRecord> = (0..40)
        .map(|idx| {
            let category = ["UI", "Billing", "Speed", "Search"][idx % 4];
            let sentiment = SentimentKind::ALL[idx % 3];
            record(category, sentiment, (idx % 7) as i64)
        })
        .collect();
    let scorer = PriorityScorer::default();
    assert_eq!(scorer.score(&records, fixed_now()), scorer.score(&records, fixed_now()));
}

#[test]
fn custom_weights_change_the_formula() {
    let weights = PriorityWeights {
        frequency_weight: 1.0,
        sentiment_weight: 0.0,
        recency_weight: 0.0,
        recency_decay_per_day: 3.0,
    };
    let records = vec![
        record("A", SentimentKind::Negative, 0),
        record("A", SentimentKind::Negative, 0),
        record("A", SentimentKind::Negative, 0),
    ];
    let ranked = PriorityScorer::new(weights).score(&records, fixed_now());
    assert!((ranked[0].priority_score - 3.0).abs() < 1e-6);
}

#[test]
fn analyze_filters_sentiments_before_scoring() {
    let records = vec![
        record("A", SentimentKind::Negative, 0),
        record("A", SentimentKind::Positive, 0),
        record("B", SentimentKind::Positive, 0),
    ];
    let mut config = TriageConfig::default();
    config.report.sentiments = parse_sentiment_filter(["negative"]).unwrap();

    let run = analyze(&records, &config, fixed_now());
    assert_eq!(run.total_feedback, 1);
    assert_eq!(run.priorities.len(), 1);
    assert_eq!(run.priorities[0].category, "A");
    assert_eq!(run.insights.action_items.len(), 1);
}

#[test]
fn analyze_empty_input_yields_placeholder() {
    let run = analyze(&[], &TriageConfig::default(), fixed_now());
    assert!(run.priorities.is_empty());
    assert_eq!(run.insights.executive_summary, "No data to summarize");
    assert!(run.insights.action_items.is_empty());
    assert_eq!(run.critical_count(), 0);
    assert!((run.average_priority() - 0.0).abs() < 1e-6);
}

#[test]
fn sentiment_filter_rejects_unknown_values() {
    assert!(parse_sentiment_filter(["negative,angry"]).is_err());
    assert_eq!(
        parse_sentiment_filter(Vec::<&str>::new()).unwrap(),
        SentimentKind::ALL.to_vec()
    );
    assert_eq!(
        parse_sentiment_filter(["Negative, negative", "neutral"]).unwrap(),
        vec![SentimentKind::Negative, SentimentKind::Neutral]
    );
}
