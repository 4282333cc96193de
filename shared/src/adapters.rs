use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

#[cfg(any(test, feature = "mocks"))]
use mockall::automock;

use crate::configuration::Configuration;
use crate::core::EmailMessage;

/// Upstream reply bodies get embedded in 502 responses for diagnostics;
/// bounded so a misbehaving upstream cannot balloon the error payload.
const MAX_UPSTREAM_BODY_CHARS: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    /// The mail API answered with a non-2xx status.
    #[error("MailChannels error: {status}: {body}")]
    Rejected { status: u16, body: String },
    /// The call itself failed: DNS, TLS, connection reset.
    #[error("{0}")]
    Transport(String),
}

#[cfg_attr(any(test, feature = "mocks"), automock)]
#[async_trait]
pub trait Mailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError>;
}

#[derive(Debug, Serialize)]
struct OutboundMailRequest {
    personalizations: Vec<Personalization>,
    from: MailAddress,
    reply_to: MailAddress,
    subject: String,
    content: Vec<MailContent>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<MailAddress>,
}

#[derive(Debug, Serialize)]
struct MailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct MailContent {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

/// Submits order emails to a MailChannels-style transactional send
/// endpoint. Recipient and sender identity are fixed configuration, never
/// derived from the inbound payload.
#[derive(Debug)]
pub struct MailChannelsMailer {
    http_client: Client,
    endpoint: String,
    recipient: String,
    sender_email: String,
    sender_name: String,
}

impl MailChannelsMailer {
    pub fn new(http_client: Client, configuration: &Configuration) -> Self {
        Self {
            http_client,
            endpoint: configuration.mail_api_url.clone(),
            recipient: configuration.order_recipient.clone(),
            sender_email: configuration.sender_email.clone(),
            sender_name: configuration.sender_name.clone(),
        }
    }

    fn build_request(&self, message: &EmailMessage) -> OutboundMailRequest {
        OutboundMailRequest {
            personalizations: vec![Personalization {
                to: vec![MailAddress {
                    email: self.recipient.clone(),
                    name: None,
                }],
            }],
            from: MailAddress {
                email: self.sender_email.clone(),
                name: (!self.sender_name.is_empty()).then(|| self.sender_name.clone()),
            },
            reply_to: MailAddress {
                email: message.reply_to.clone(),
                name: None,
            },
            subject: message.subject.clone(),
            content: vec![
                MailContent {
                    content_type: "text/plain".to_string(),
                    value: message.text.clone(),
                },
                MailContent {
                    content_type: "text/html".to_string(),
                    value: message.html.clone(),
                },
            ],
        }
    }
}

#[async_trait]
impl Mailer for MailChannelsMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailerError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&self.build_request(message))
            .send()
            .await
            .map_err(|e| MailerError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(MAX_UPSTREAM_BODY_CHARS)
                .collect();
            return Err(MailerError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn mailer_with(configuration: &Configuration) -> MailChannelsMailer {
        MailChannelsMailer::new(Client::new(), configuration)
    }

    fn message() -> EmailMessage {
        EmailMessage {
            reply_to: "jane@x.com".to_string(),
            subject: "Order #1".to_string(),
            text: "plain body".to_string(),
            html: "<p>html body</p>".to_string(),
        }
    }

    #[test]
    fn outbound_payload_carries_both_content_types_and_fixed_identities() {
        let configuration = Configuration {
            order_recipient: "orders@example.com".to_string(),
            sender_email: "no-reply@example.com".to_string(),
            sender_name: "Order Desk".to_string(),
            ..Configuration::default()
        };

        let payload = serde_json::to_value(mailer_with(&configuration).build_request(&message()))
            .unwrap();

        assert_eq!(
            payload,
            json!({
                "personalizations": [{ "to": [{ "email": "orders@example.com" }] }],
                "from": { "email": "no-reply@example.com", "name": "Order Desk" },
                "reply_to": { "email": "jane@x.com" },
                "subject": "Order #1",
                "content": [
                    { "type": "text/plain", "value": "plain body" },
                    { "type": "text/html", "value": "<p>html body</p>" }
                ]
            })
        );
    }

    #[test]
    fn when_sender_name_is_empty_from_omits_name() {
        let configuration = Configuration {
            sender_name: String::new(),
            ..Configuration::default()
        };

        let payload = serde_json::to_value(mailer_with(&configuration).build_request(&message()))
            .unwrap();

        assert!(payload["from"].get("name").is_none());
    }

    #[test]
    fn rejected_error_formats_status_and_body() {
        let error = MailerError::Rejected {
            status: 500,
            body: "rate limited".to_string(),
        };

        assert_eq!(error.to_string(), "MailChannels error: 500: rate limited");
    }
}
