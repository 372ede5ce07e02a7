pub mod export;
pub mod html;

use crate::TriageRun;

pub const EMAILED_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: &'static str,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub subject: String,
    pub html: String,
    pub attachments: Vec<Attachment>,
}

pub fn render_report(run: &TriageRun) -> Result<RenderedReport, csv::Error> {
    let csv = export::priority_csv(&run.priorities)?;
    Ok(RenderedReport {
        subject: format!(
            "Weekly Feedback Priority Report - {}",
            run.generated_at.format("%b %d, %Y")
        ),
        html: html::render_html(run),
        attachments: vec![Attachment {
            filename: export::export_filename(run.generated_at),
            content_type: "text/csv",
            content: csv,
        }],
    })
}
