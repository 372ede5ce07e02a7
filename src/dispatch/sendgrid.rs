use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Serialize;
use std::env;
use std::time::Duration;

use crate::config::DispatchConfig;
use crate::dispatch::ReportSender;
use crate::error::DispatchError;
use crate::report::RenderedReport;

const ACCEPTED: [StatusCode; 3] = [StatusCode::OK, StatusCode::CREATED, StatusCode::ACCEPTED];

#[derive(Clone)]
pub struct SendGridClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    sender: String,
}

impl SendGridClient {
    pub fn new(
        api_base: String,
        api_key: String,
        sender: String,
        timeout: Duration,
    ) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| DispatchError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            api_base,
            api_key,
            sender,
        })
    }

    pub fn from_config(config: &DispatchConfig, api_key: Option<String>) -> Result<Self, DispatchError> {
        let api_key = api_key
            .or_else(|| env::var("SENDGRID_API_KEY").ok())
            .filter(|value| !value.trim().is_empty());
        let sender = config
            .sender
            .clone()
            .filter(|value| !value.trim().is_empty());

        match (sender, api_key) {
            (Some(sender), Some(api_key)) => SendGridClient::new(
                config.api_base.clone(),
                api_key,
                sender,
                Duration::from_millis(config.timeout_ms),
            ),
            (sender, api_key) => {
                let mut missing = Vec::new();
                if sender.is_none() {
                    missing.push("sender address");
                }
                if api_key.is_none() {
                    missing.push("API key");
                }
                Err(DispatchError::Unconfigured { missing })
            }
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    async fn post_mail(&self, report: &RenderedReport, recipient: &str) -> Result<(), String> {
        let url = format!("{}/mail/send", self.api_base.trim_end_matches('/'));
        let request = MailRequest::new(report, &self.sender, recipient);

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|err| format!("SendGrid request failed: {}", err))?;

        let status = response.status();
        if ACCEPTED.contains(&status) {
            return Ok(());
        }

        let error_body = response.text().await.unwrap_or_default();
        let detail = error_body.trim();
        if detail.is_empty() {
            return Err(format!("SendGrid returned status code: {}", status.as_u16()));
        }
        Err(format!(
            "SendGrid returned status code: {} {}",
            status.as_u16(),
            detail
        ))
    }
}

impl ReportSender for SendGridClient {
    async fn send(&self, report: &RenderedReport, recipient: &str) -> Result<(), String> {
        self.post_mail(report, recipient).await
    }
}

#[derive(Serialize)]
struct MailRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<MailAttachment<'a>>,
}

impl<'a> MailRequest<'a> {
    fn new(report: &'a RenderedReport, sender: &'a str, recipient: &'a str) -> Self {
        Self {
            personalizations: vec![Personalization {
                to: vec![Address { email: recipient }],
            }],
            from: Address { email: sender },
            subject: &report.subject,
            content: vec![Content {
                kind: "text/html",
                value: &report.html,
            }],
            attachments: report
                .attachments
                .iter()
                .map(|attachment| MailAttachment {
                    content: STANDARD.encode(&attachment.content),
                    filename: &attachment.filename,
                    kind: attachment.content_type,
                    disposition: "attachment",
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct MailAttachment<'a> {
    content: String,
    filename: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    disposition: &'a str,
}
