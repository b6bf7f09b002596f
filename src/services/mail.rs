// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notification gateway: one transactional email per call over SMTP.
//!
//! The relay authenticates with the sender address and its app password.
//! Failures are returned as `MailOutcome::Failed`, never as an error.

use crate::config::Config;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::stub::AsyncStubTransport;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);
const SENDER_DISPLAY_NAME: &str = "AI-Powered Financial Intelligence";

/// A message ready to hand to the relay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub bcc: Vec<String>,
}

/// `{success: true, message, body}` or `{success: false, error}` on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum MailOutcome {
    /// Relay accepted the message; `body` lists the accepted recipients and
    /// the relay's reply.
    Sent { body: serde_json::Value },
    Failed { error: String },
}

impl MailOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, MailOutcome::Sent { .. })
    }

    fn failed(error: impl Into<String>) -> Self {
        MailOutcome::Failed {
            error: error.into(),
        }
    }
}

impl Serialize for MailOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MailOutcome::Sent { body } => {
                let mut s = serializer.serialize_struct("MailOutcome", 3)?;
                s.serialize_field("success", &true)?;
                s.serialize_field("message", "Mail sent successfully")?;
                s.serialize_field("body", body)?;
                s.end()
            }
            MailOutcome::Failed { error } => {
                let mut s = serializer.serialize_struct("MailOutcome", 2)?;
                s.serialize_field("success", &false)?;
                s.serialize_field("error", error)?;
                s.end()
            }
        }
    }
}

/// Where outbound messages go.
pub enum MailTransport {
    /// Authenticated SMTP relay
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    /// In-process recorder; nothing leaves the host
    Stub(Arc<AsyncStubTransport>),
}

struct Outbound {
    sender: Mailbox,
    transport: MailTransport,
}

/// Transactional mail client.
#[derive(Clone)]
pub struct MailService {
    outbound: Option<Arc<Outbound>>,
}

impl MailService {
    /// Build the SMTP client from config. Missing credentials leave the
    /// service unconfigured; every send then fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let (Some(sender), Some(app_password)) =
            (&config.mail_sender_address, &config.mail_app_password)
        else {
            tracing::warn!("Mail credentials not configured; sends will fail");
            return Ok(Self { outbound: None });
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.mail_smtp_host)?
            .credentials(Credentials::new(sender.clone(), app_password.clone()))
            .timeout(Some(SMTP_TIMEOUT));
        if let Some(port) = config.mail_smtp_port {
            builder = builder.port(port);
        }

        tracing::info!(host = %config.mail_smtp_host, "Mail relay configured");
        Self::with_transport(sender, MailTransport::Smtp(builder.build()))
    }

    /// Send from `sender` through an explicit transport.
    pub fn with_transport(sender: &str, transport: MailTransport) -> anyhow::Result<Self> {
        let address: Address = sender.trim().parse()?;
        let sender = Mailbox::new(Some(SENDER_DISPLAY_NAME.to_string()), address);
        Ok(Self {
            outbound: Some(Arc::new(Outbound { sender, transport })),
        })
    }

    /// Send one message.
    pub async fn send(&self, message: &MailMessage) -> MailOutcome {
        let Some(outbound) = &self.outbound else {
            return MailOutcome::failed("Mail service is not configured");
        };

        if message.to.trim().is_empty() {
            return MailOutcome::failed("Recipient address is required");
        }

        let email = match build_message(&outbound.sender, message) {
            Ok(email) => email,
            Err(e) => return MailOutcome::failed(e),
        };
        let accepted: Vec<String> = email
            .envelope()
            .to()
            .iter()
            .map(ToString::to_string)
            .collect();

        let reply: Result<Option<String>, String> = match &outbound.transport {
            MailTransport::Smtp(smtp) => smtp
                .send(email)
                .await
                .map(|response| {
                    let lines: Vec<String> = response.message().map(|l| l.to_string()).collect();
                    Some(format!("{} {}", response.code(), lines.join(" ")))
                })
                .map_err(|e| e.to_string()),
            MailTransport::Stub(stub) => stub
                .send(email)
                .await
                .map(|()| None)
                .map_err(|e| e.to_string()),
        };

        match reply {
            Ok(response) => {
                tracing::info!(bcc = message.bcc.len(), "Mail sent");
                MailOutcome::Sent {
                    body: serde_json::json!({ "accepted": accepted, "response": response }),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Mail relay rejected message");
                MailOutcome::failed(e)
            }
        }
    }
}

fn build_message(sender: &Mailbox, message: &MailMessage) -> Result<Message, String> {
    let to: Mailbox = message
        .to
        .trim()
        .parse()
        .map_err(|e| format!("Invalid recipient address: {e}"))?;

    let mut builder = Message::builder()
        .from(sender.clone())
        .to(to)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_HTML);

    for bcc in message.bcc.iter().map(|b| b.trim()).filter(|b| !b.is_empty()) {
        let mailbox: Mailbox = bcc
            .parse()
            .map_err(|e| format!("Invalid bcc address {bcc}: {e}"))?;
        builder = builder.bcc(mailbox);
    }

    builder.body(message.html.clone()).map_err(|e| e.to_string())
}
