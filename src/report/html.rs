use std::fmt::Write;

use crate::report::EMAILED_ROWS;
use crate::scoring::Urgency;
use crate::{format_float, TriageRun};

const STYLE: &str = r#"
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background-color: #f5f5f5; margin: 0; padding: 20px; }
.container { max-width: 800px; margin: 0 auto; background-color: white; border-radius: 10px; }
.header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; border-radius: 10px 10px 0 0; }
.header h1 { margin: 0; font-size: 28px; }
.content { padding: 30px; }
.summary { background-color: #f8f9fa; padding: 20px; border-radius: 8px; margin-bottom: 25px; border-left: 4px solid #667eea; }
.action-item { border: 1px solid #e0e0e0; padding: 20px; margin-bottom: 15px; border-radius: 8px; }
.priority-badge { display: inline-block; padding: 5px 12px; border-radius: 20px; font-size: 12px; font-weight: bold; margin-right: 10px; }
.critical { background-color: #ffe0e0; color: #d32f2f; }
.high { background-color: #fff4e0; color: #f57c00; }
.medium { background-color: #e8f5e9; color: #388e3c; }
.low { background-color: #f5f5f5; color: #757575; }
.table { width: 100%; border-collapse: collapse; margin: 20px 0; }
.table th { background-color: #667eea; color: white; padding: 12px; text-align: left; }
.table td { padding: 12px; border-bottom: 1px solid #e0e0e0; }
.metric { display: inline-block; margin: 10px 20px; }
.metric-value { font-size: 32px; font-weight: bold; color: #667eea; }
.footer { background-color: #f8f9fa; padding: 20px; text-align: center; color: #666; font-size: 12px; }
"#;

pub fn render_html(run: &TriageRun) -> String {
    let top = &run.priorities[..EMAILED_ROWS.min(run.priorities.len())];
    let mentions: usize = top.iter().map(|row| row.frequency).sum();
    let critical = top
        .iter()
        .filter(|row| row.urgency == Urgency::Critical)
        .count();

    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>{}</style>\n</head>\n<body>\n<div class=\"container\">\n",
        STYLE
    );
    let _ = write!(
        html,
        "<div class=\"header\"><h1>Weekly Customer Feedback Report</h1><p>Priority Analysis &amp; Action Items &middot; {}</p></div>\n",
        run.generated_at.format("%B %d, %Y")
    );

    html.push_str("<div class=\"content\">\n<div class=\"summary\">\n<h2>Executive Summary</h2>\n");
    html.push_str(&summary_html(&run.insights.executive_summary));
    let _ = write!(
        html,
        "<div><div class=\"metric\"><div class=\"metric-value\">{}</div><div>Categories Analyzed</div></div>\
<div class=\"metric\"><div class=\"metric-value\">{}</div><div>Total Feedback</div></div>\
<div class=\"metric\"><div class=\"metric-value\">{}</div><div>Critical Issues</div></div></div>\n</div>\n",
        top.len(),
        mentions,
        critical
    );

    html.push_str("<h2>Top 5 Priority Issues</h2>\n<table class=\"table\">\n<thead><tr><th>#</th><th>Category</th><th>Mentions</th><th>Priority Score</th><th>Urgency</th></tr></thead>\n<tbody>\n");
    for (idx, row) in top.iter().enumerate() {
        let _ = writeln!(
            html,
            "<tr><td><strong>{}</strong></td><td><strong>{}</strong></td><td>{}</td><td>{}</td><td>{}</td></tr>",
            idx + 1,
            escape_html(&row.category),
            row.frequency,
            format_float(row.priority_score, 1),
            row.urgency.label()
        );
    }
    html.push_str("</tbody>\n</table>\n<h2>Recommended Actions</h2>\n");

    for (idx, action) in run.insights.action_items.iter().take(EMAILED_ROWS).enumerate() {
        let _ = writeln!(
            html,
            "<div class=\"action-item\"><h3><span class=\"priority-badge {}\">{}</span>{}. {}</h3>\
<p><strong>Recommendation:</strong> {}</p><p><strong>Impact:</strong> {}</p></div>",
            action.priority.css_class(),
            action.priority.label(),
            idx + 1,
            escape_html(&action.issue),
            escape_html(&action.recommendation),
            escape_html(&action.estimated_impact)
        );
    }

    html.push_str("</div>\n<div class=\"footer\"><p>Generated automatically by feedback-triage</p><p>For questions or feedback, contact your product team</p></div>\n</div>\n</body>\n</html>\n");
    html
}

fn summary_html(summary: &str) -> String {
    let mut lines = summary.lines();
    let mut out = String::new();
    if let Some(title) = lines.next() {
        let _ = write!(out, "<strong>{}</strong>", escape_html(title));
    }
    for line in lines {
        let item = line.trim_start_matches("- ");
        let _ = write!(out, "<br>&bull; {}", escape_html(item));
    }
    out.push('\n');
    out
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
