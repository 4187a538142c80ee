//! Brevo Client
//!
//! Contacts API for subscriptions and the transactional email API for
//! delivery. Topics are kept as a comma-separated contact attribute: `TOPICS`
//! when the account defines it, `LASTNAME` otherwise.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{Value, json};

use super::store::{Mailer, OutgoingEmail, SubscribeOutcome, SubscriberStore};
use crate::config::NewsletterConfig;
use crate::error::{ChatbotError, Result};
use crate::model::{Subscriber, parse_topics};

const SERVICE: &str = "Brevo";
const LIST_PAGE_SIZE: u32 = 500;

/// Subscriber from a Brevo contact object
fn subscriber_from_contact(contact: &Value) -> Option<Subscriber> {
    let email = contact.get("email")?.as_str()?.to_string();
    let attributes = contact.get("attributes");
    let attribute = |key: &str| attributes.and_then(|a| a.get(key)).and_then(Value::as_str);

    let topics = attribute("TOPICS")
        .filter(|t| !t.trim().is_empty())
        .or_else(|| attribute("LASTNAME"))
        .map(parse_topics)
        .unwrap_or_default();
    Some(Subscriber {
        email,
        name: attribute("FIRSTNAME").unwrap_or("User").to_string(),
        topics,
        subscribed_date: contact.get("createdAt").and_then(Value::as_str).map(str::to_string),
    })
}

fn contact_attributes(name: &str, topics: &[String]) -> Value {
    json!({
        "FIRSTNAME": name,
        "LASTNAME": topics.join(","),
    })
}

pub struct BrevoClient {
    http: reqwest::Client,
    config: NewsletterConfig,
}

impl BrevoClient {
    pub const fn new(http: reqwest::Client, config: NewsletterConfig) -> Self {
        Self { http, config }
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let key = self
            .config
            .brevo
            .api_key
            .as_deref()
            .ok_or_else(|| ChatbotError::Config("BREVO_API_KEY is not set".into()))?;
        Ok(self
            .http
            .request(method, self.config.brevo.url(path))
            .header("accept", "application/json")
            .header("api-key", key))
    }

    /// Error carrying the body of an unexpected response
    async fn unexpected(response: reqwest::Response) -> ChatbotError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "Brevo request failed");
        ChatbotError::api(SERVICE, status, body)
    }

    async fn put_attributes(&self, email: &str, name: &str, topics: &[String]) -> Result<()> {
        let response = self
            .request(Method::PUT, &format!("contacts/{email}"))?
            .json(&json!({ "attributes": contact_attributes(name, topics) }))
            .send()
            .await?;
        if response.status() == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(Self::unexpected(response).await)
        }
    }
}

#[async_trait]
impl SubscriberStore for BrevoClient {
    async fn subscribe(&self, email: &str, name: &str, topics: &[String]) -> Result<SubscribeOutcome> {
        let response = self
            .request(Method::POST, "contacts")?
            .json(&json!({
                "email": email,
                "attributes": contact_attributes(name, topics),
                "listIds": [self.config.list_id],
                "updateEnabled": true,
            }))
            .send()
            .await?;
        match response.status() {
            StatusCode::CREATED | StatusCode::NO_CONTENT => Ok(SubscribeOutcome::Created),
            // Usually an existing contact
            StatusCode::BAD_REQUEST => {
                self.put_attributes(email, name, topics).await?;
                Ok(SubscribeOutcome::Updated)
            }
            _ => Err(Self::unexpected(response).await),
        }
    }

    async fn unsubscribe(&self, email: &str) -> Result<()> {
        let response = self.request(Method::DELETE, &format!("contacts/{email}"))?.send().await?;
        if response.status() == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(Self::unexpected(response).await)
        }
    }

    async fn lookup(&self, email: &str) -> Result<Option<Subscriber>> {
        let response = self.request(Method::GET, &format!("contacts/{email}"))?.send().await?;
        match response.status() {
            StatusCode::OK => Ok(subscriber_from_contact(&response.json::<Value>().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(Self::unexpected(response).await),
        }
    }

    async fn set_topics(&self, email: &str, name: &str, topics: &[String]) -> Result<()> {
        self.put_attributes(email, name, topics).await
    }

    async fn list(&self) -> Result<Vec<Subscriber>> {
        let path = format!("contacts/lists/{}/contacts", self.config.list_id);
        let response = self
            .request(Method::GET, &path)?
            .query(&[("limit", LIST_PAGE_SIZE)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::unexpected(response).await);
        }
        let body: Value = response.json().await?;
        let contacts = body.get("contacts").and_then(Value::as_array);
        Ok(contacts
            .map(|list| list.iter().filter_map(subscriber_from_contact).collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl Mailer for BrevoClient {
    async fn send(&self, email: &OutgoingEmail) -> Result<Option<String>> {
        let response = self
            .request(Method::POST, "smtp/email")?
            .json(&json!({
                "sender": {
                    "name": self.config.sender_name,
                    "email": self.config.sender_email,
                },
                "to": [{ "email": email.to }],
                "subject": email.subject,
                "htmlContent": email.html,
                "tags": email.tags,
            }))
            .send()
            .await?;
        if !matches!(response.status(), StatusCode::OK | StatusCode::CREATED) {
            return Err(Self::unexpected(response).await);
        }
        let body: Value = response.json().await?;
        Ok(body.get("messageId").and_then(Value::as_str).map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics_from_lastname() {
        let contact = json!({
            "email": "a@example.com",
            "attributes": {"FIRSTNAME": "Ada", "LASTNAME": "bitcoin, defi"},
            "createdAt": "2025-01-06T10:00:00.000+01:00"
        });
        let subscriber = subscriber_from_contact(&contact).unwrap();
        assert_eq!(subscriber.name, "Ada");
        assert_eq!(subscriber.topics, vec!["bitcoin", "defi"]);
        assert_eq!(subscriber.subscribed_date.as_deref(), Some("2025-01-06T10:00:00.000+01:00"));
    }

    #[test]
    fn test_topics_attribute_preferred() {
        let contact = json!({
            "email": "a@example.com",
            "attributes": {"TOPICS": "mining", "LASTNAME": "Lovelace"}
        });
        let subscriber = subscriber_from_contact(&contact).unwrap();
        assert_eq!(subscriber.name, "User");
        assert_eq!(subscriber.topics, vec!["mining"]);
    }

    #[test]
    fn test_contact_without_email_skipped() {
        assert!(subscriber_from_contact(&json!({"attributes": {}})).is_none());
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let client = BrevoClient::new(reqwest::Client::new(), NewsletterConfig::default());
        let err = client.lookup("a@example.com").await.unwrap_err();
        assert!(matches!(err, ChatbotError::Config(_)));
    }
}
