use feedback_triage::insights::{
    estimate_impact, generate_insights, recommendation, ImpactLevel, OverallSentiment,
};
use feedback_triage::scoring::{CategorySummary, Urgency};

fn summary(category: &str, frequency: usize, negative_count: usize, priority_score: f64) -> CategorySummary {
    CategorySummary {
        category: category.to_string(),
        frequency,
        negative_count,
        sentiment_score: if frequency == 0 {
            0.0
        } else {
            negative_count as f64 / frequency as f64 * 100.0
        },
        avg_age_days: 0,
        recency_score: 100.0,
        priority_score,
        urgency: Urgency::from_score(priority_score),
    }
}

#[test]
fn empty_input_returns_placeholder() {
    let report = generate_insights(&[], 0);
    assert_eq!(report.executive_summary, "No data to summarize");
    assert!(report.summary.is_none());
    assert!(report.action_items.is_empty());
}

#[test]
fn summary_interpolates_totals_and_leader() {
    let rows = vec![
        summary("Checkout", 120, 90, 96.0),
        summary("Search", 40, 10, 40.0),
    ];
    let report = generate_insights(&rows, 300);
    let summary = report.summary.as_ref().unwrap();

    assert_eq!(summary.total_feedback, 300);
    assert_eq!(summary.critical_issues, 1);
    assert_eq!(summary.top_category, "Checkout");
    assert_eq!(summary.top_frequency, 120);
    assert_eq!(summary.overall_sentiment, OverallSentiment::Mixed);

    assert!(report.executive_summary.starts_with("Feedback Analysis Summary"));
    assert!(report
        .executive_summary
        .contains("Total feedback analyzed: 300 entries"));
    assert!(report
        .executive_summary
        .contains("Critical issues requiring immediate attention: 1"));
    assert!(report
        .executive_summary
        .contains("Top concern: Checkout (120 mentions)"));
    assert!(report.executive_summary.contains("Overall sentiment: Mixed"));
}

#[test]
fn overall_sentiment_uses_mean_negative_count() {
    assert_eq!(
        OverallSentiment::from_rows(&[summary("A", 200, 51, 90.0)]),
        OverallSentiment::Concerning
    );
    assert_eq!(
        OverallSentiment::from_rows(&[summary("A", 200, 50, 90.0)]),
        OverallSentiment::Mixed
    );
    assert_eq!(
        OverallSentiment::from_rows(&[summary("A", 100, 25, 40.0), summary("B", 100, 25, 40.0)]),
        OverallSentiment::Positive
    );
}

#[test]
fn one_action_item_per_row_in_order() {
    let rows = vec![
        summary("Checkout", 120, 90, 96.0),
        summary("Search", 60, 20, 55.0),
        summary("Docs", 3, 0, 21.0),
    ];
    let report = generate_insights(&rows, 183);

    let issues: Vec<&str> = report
        .action_items
        .iter()
        .map(|item| item.issue.as_str())
        .collect();
    assert_eq!(issues, vec!["Checkout", "Search", "Docs"]);
    assert_eq!(report.action_items[0].priority, Urgency::Critical);
    assert_eq!(report.action_items[1].impact, ImpactLevel::Medium);
    assert_eq!(report.action_items[2].estimated_impact, "Low Impact - Affects 3 users");
}

#[test]
fn recommendation_depends_only_on_urgency_and_category() {
    assert_eq!(
        recommendation(Urgency::Critical, "Login"),
        "Immediate action required: Assign dedicated team to resolve 'Login' within 48 hours."
    );
    assert_eq!(
        recommendation(Urgency::High, "Login"),
        "Schedule sprint planning: Address 'Login' in next development cycle."
    );
    assert_eq!(
        recommendation(Urgency::Medium, "Login"),
        "Add to backlog: Plan improvements for 'Login' in upcoming quarter."
    );
    assert_eq!(
        recommendation(Urgency::Low, "Login"),
        "Monitor: Keep tracking 'Login' feedback for trend changes."
    );
}

#[test]
fn impact_buckets_are_exclusive() {
    assert_eq!(estimate_impact(101).0, ImpactLevel::High);
    assert_eq!(estimate_impact(101).1, "High Impact - Affects 101+ users");
    assert_eq!(estimate_impact(100).0, ImpactLevel::Medium);
    assert_eq!(estimate_impact(51).0, ImpactLevel::Medium);
    assert_eq!(estimate_impact(50).0, ImpactLevel::Low);
    assert_eq!(estimate_impact(0).1, "Low Impact - Affects 0 users");
}
