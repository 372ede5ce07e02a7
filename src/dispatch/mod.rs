pub mod channels;
pub mod sendgrid;

use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use tracing::{info, warn};

use crate::error::{DispatchError, RecipientRejected};
use crate::report::RenderedReport;

pub use channels::ProgressChannels;
pub use sendgrid::SendGridClient;

pub trait ReportSender {
    fn send(
        &self,
        report: &RenderedReport,
        recipient: &str,
    ) -> impl Future<Output = Result<(), String>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DispatchProgress {
    Sending {
        recipient: String,
        index: usize,
        total: usize,
    },
    Delivered {
        recipient: String,
    },
    Rejected {
        recipient: String,
        detail: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub attempted: usize,
    pub success_count: usize,
    pub failures: Vec<RecipientRejected>,
}

impl DispatchOutcome {
    pub fn all_delivered(&self) -> bool {
        self.failures.is_empty() && self.success_count == self.attempted
    }

    pub fn none_delivered(&self) -> bool {
        self.success_count == 0
    }
}

pub fn parse_recipients(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(['\n', ',', ';'])
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .filter(|address| seen.insert(address.to_string()))
        .map(str::to_string)
        .collect()
}

pub fn ensure_configured(
    sender: Option<&str>,
    api_key: Option<&str>,
    recipients: &[String],
) -> Result<(), DispatchError> {
    let mut missing = Vec::new();
    if sender.map_or(true, |value| value.trim().is_empty()) {
        missing.push("sender address");
    }
    if api_key.map_or(true, |value| value.trim().is_empty()) {
        missing.push("API key");
    }
    if recipients.is_empty() {
        missing.push("recipients");
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DispatchError::Unconfigured { missing })
    }
}

pub async fn dispatch_report<S, F>(
    sender: &S,
    report: &RenderedReport,
    recipients: &[String],
    mut on_progress: F,
) -> Result<DispatchOutcome, DispatchError>
where
    S: ReportSender,
    F: FnMut(DispatchProgress),
{
    if recipients.is_empty() {
        return Err(DispatchError::Unconfigured {
            missing: vec!["recipients"],
        });
    }

    let total = recipients.len();
    let mut outcome = DispatchOutcome {
        attempted: total,
        ..DispatchOutcome::default()
    };

    for (index, recipient) in recipients.iter().enumerate() {
        on_progress(DispatchProgress::Sending {
            recipient: recipient.clone(),
            index,
            total,
        });
        info!(recipient = %recipient, index, total, "sending report");

        match sender.send(report, recipient).await {
            Ok(()) => {
                outcome.success_count += 1;
                on_progress(DispatchProgress::Delivered {
                    recipient: recipient.clone(),
                });
            }
            Err(detail) => {
                warn!(recipient = %recipient, %detail, "recipient rejected");
                on_progress(DispatchProgress::Rejected {
                    recipient: recipient.clone(),
                    detail: detail.clone(),
                });
                outcome.failures.push(RecipientRejected {
                    recipient: recipient.clone(),
                    detail,
                });
            }
        }
    }

    info!(
        delivered = outcome.success_count,
        failed = outcome.failures.len(),
        "dispatch finished"
    );
    Ok(outcome)
}
