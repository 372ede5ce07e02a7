use serde::Serialize;

use crate::scoring::{CategorySummary, Urgency};

const NO_DATA_SUMMARY: &str = "No data to summarize";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

struct ImpactRule {
    level: ImpactLevel,
    above: Option<usize>,
    template: &'static str,
}

static IMPACT_RULES: [ImpactRule; 3] = [
    ImpactRule {
        level: ImpactLevel::High,
        above: Some(100),
        template: "High Impact - Affects {count}+ users",
    },
    ImpactRule {
        level: ImpactLevel::Medium,
        above: Some(50),
        template: "Medium Impact - Affects {count} users",
    },
    ImpactRule {
        level: ImpactLevel::Low,
        above: None,
        template: "Low Impact - Affects {count} users",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverallSentiment {
    Concerning,
    Mixed,
    Positive,
}

impl OverallSentiment {
    pub fn from_rows(rows: &[CategorySummary]) -> Self {
        if rows.is_empty() {
            return OverallSentiment::Positive;
        }
        let total: usize = rows.iter().map(|row| row.negative_count).sum();
        let mean = total as f64 / rows.len() as f64;
        if mean > 50.0 {
            OverallSentiment::Concerning
        } else if mean > 25.0 {
            OverallSentiment::Mixed
        } else {
            OverallSentiment::Positive
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OverallSentiment::Concerning => "Concerning",
            OverallSentiment::Mixed => "Mixed",
            OverallSentiment::Positive => "Positive",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            OverallSentiment::Concerning => "High negative sentiment detected",
            OverallSentiment::Mixed => "Some areas need improvement",
            OverallSentiment::Positive => "Most feedback is constructive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
    pub total_feedback: usize,
    pub critical_issues: usize,
    pub top_category: String,
    pub top_frequency: usize,
    pub overall_sentiment: OverallSentiment,
}

impl ExecutiveSummary {
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Total feedback analyzed: {} entries", self.total_feedback),
            format!(
                "Critical issues requiring immediate attention: {}",
                self.critical_issues
            ),
            format!(
                "Top concern: {} ({} mentions)",
                self.top_category, self.top_frequency
            ),
            format!(
                "Overall sentiment: {} - {}",
                self.overall_sentiment.label(),
                self.overall_sentiment.description()
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionItem {
    pub issue: String,
    pub priority: Urgency,
    pub recommendation: String,
    pub impact: ImpactLevel,
    pub estimated_impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightReport {
    pub executive_summary: String,
    pub summary: Option<ExecutiveSummary>,
    pub action_items: Vec<ActionItem>,
}

impl InsightReport {
    pub fn placeholder() -> Self {
        Self {
            executive_summary: NO_DATA_SUMMARY.to_string(),
            summary: None,
            action_items: Vec::new(),
        }
    }
}

pub fn generate_insights(top: &[CategorySummary], total_feedback: usize) -> InsightReport {
    let leader = match top.first() {
        Some(row) => row,
        None => return InsightReport::placeholder(),
    };

    let summary = ExecutiveSummary {
        total_feedback,
        critical_issues: top
            .iter()
            .filter(|row| row.urgency == Urgency::Critical)
            .count(),
        top_category: leader.category.clone(),
        top_frequency: leader.frequency,
        overall_sentiment: OverallSentiment::from_rows(top),
    };

    let mut executive_summary = String::from("Feedback Analysis Summary");
    for line in summary.lines() {
        executive_summary.push_str("\n- ");
        executive_summary.push_str(&line);
    }

    let action_items = top
        .iter()
        .map(|row| {
            let (impact, estimated_impact) = estimate_impact(row.frequency);
            ActionItem {
                issue: row.category.clone(),
                priority: row.urgency,
                recommendation: recommendation(row.urgency, &row.category),
                impact,
                estimated_impact,
            }
        })
        .collect();

    InsightReport {
        executive_summary,
        summary: Some(summary),
        action_items,
    }
}

pub fn recommendation(urgency: Urgency, category: &str) -> String {
    let template = match urgency {
        Urgency::Critical => {
            "Immediate action required: Assign dedicated team to resolve '{category}' within 48 hours."
        }
        Urgency::High => "Schedule sprint planning: Address '{category}' in next development cycle.",
        Urgency::Medium => "Add to backlog: Plan improvements for '{category}' in upcoming quarter.",
        Urgency::Low => "Monitor: Keep tracking '{category}' feedback for trend changes.",
    };
    template.replace("{category}", category)
}

pub fn estimate_impact(frequency: usize) -> (ImpactLevel, String) {
    let rule = IMPACT_RULES
        .iter()
        .find(|rule| rule.above.map_or(true, |bound| frequency > bound))
        .unwrap_or(&IMPACT_RULES[IMPACT_RULES.len() - 1]);
    (
        rule.level,
        rule.template.replace("{count}", &frequency.to_string()),
    )
}
