use chrono::{Duration, NaiveDate, NaiveDateTime};
use feedback_triage::config::TriageConfig;
use feedback_triage::report::export::{export_filename, priority_csv, PRIORITY_HEADER};
use feedback_triage::report::html::{escape_html, render_html};
use feedback_triage::report::render_report;
use feedback_triage::{analyze, FeedbackRecord, SentimentKind, TriageRun};

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 10)
        .and_then(|date| date.and_hms_opt(8, 0, 0))
        .unwrap()
}

fn sample_run() -> TriageRun {
    let mut records = Vec::new();
    for idx in 0..8 {
        let category = format!("Category {}", idx);
        for n in 0..=idx {
            let sentiment = if n % 2 == 0 {
                SentimentKind::Negative
            } else {
                SentimentKind::Positive
            };
            records.push(FeedbackRecord::new(
                category.clone(),
                sentiment,
                fixed_now() - Duration::days(n as i64),
            ));
        }
    }
    records.push(FeedbackRecord::new(
        "<script>",
        SentimentKind::Neutral,
        fixed_now(),
    ));
    analyze(&records, &TriageConfig::default(), fixed_now())
}

#[test]
fn csv_export_has_fixed_header() {
    let run = sample_run();
    let bytes = priority_csv(&run.priorities).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let mut lines = text.lines();

    assert_eq!(
        lines.next(),
        Some("Category,Frequency,Negative_Feedback,Priority_Score,Urgency,Sentiment_Score,Recency_Score")
    );
    assert_eq!(PRIORITY_HEADER.len(), 7);
    assert_eq!(lines.count(), run.priorities.len());
}

#[test]
fn csv_scores_use_one_decimal() {
    let run = sample_run();
    let bytes = priority_csv(&run.priorities[..1]).unwrap();
    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let row = reader.records().next().unwrap().unwrap();

    let score = row.get(3).unwrap();
    assert_eq!(score.split('.').nth(1).map(str::len), Some(1));
    assert_eq!(row.get(0), Some(run.priorities[0].category.as_str()));
}

#[test]
fn rendered_report_carries_subject_and_attachment() {
    let run = sample_run();
    let report = render_report(&run).unwrap();

    assert_eq!(report.subject, "Weekly Feedback Priority Report - Jun 10, 2024");
    assert_eq!(report.attachments.len(), 1);
    assert_eq!(report.attachments[0].filename, "priority_report_20240610.csv");
    assert_eq!(report.attachments[0].content_type, "text/csv");
    assert_eq!(export_filename(fixed_now()), "priority_report_20240610.csv");
}

#[test]
fn html_lists_only_the_top_five() {
    let run = sample_run();
    let html = render_html(&run);

    assert!(html.contains(&run.priorities[0].category));
    assert!(html.contains(&run.priorities[4].category));
    assert!(!html.contains(&format!("<strong>{}</strong>", run.priorities[5].category)));
    assert!(html.contains("Recommended Actions"));
}

#[test]
fn html_escapes_category_text() {
    assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    let run = sample_run();
    assert!(!render_html(&run).contains("<script>"));
}
