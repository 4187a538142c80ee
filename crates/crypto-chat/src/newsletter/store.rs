//! Subscriber storage and mail delivery seams
//!
//! [`BrevoClient`](super::BrevoClient) implements both traits against the
//! Brevo API; the in-memory versions back offline mode and tests.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{ChatbotError, Result};
use crate::model::Subscriber;

/// Whether a subscribe call created a contact or updated an existing one
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Created,
    Updated,
}

impl SubscribeOutcome {
    pub const fn message(self) -> &'static str {
        match self {
            Self::Created => "Successfully subscribed to newsletter",
            Self::Updated => "Newsletter subscription updated",
        }
    }
}

/// How new topics combine with a subscriber's existing ones
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicUpdateMode {
    Merge,
    #[default]
    Replace,
}

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Create the contact, or update it when it already exists
    async fn subscribe(&self, email: &str, name: &str, topics: &[String]) -> Result<SubscribeOutcome>;

    async fn unsubscribe(&self, email: &str) -> Result<()>;

    /// `None` when the contact does not exist
    async fn lookup(&self, email: &str) -> Result<Option<Subscriber>>;

    /// Overwrite name and topics of an existing contact
    async fn set_topics(&self, email: &str, name: &str, topics: &[String]) -> Result<()>;

    /// Every subscriber on the newsletter list
    async fn list(&self) -> Result<Vec<Subscriber>>;
}

/// A rendered newsletter ready for delivery
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub tags: Vec<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Returns the provider's message id, when it reports one
    async fn send(&self, email: &OutgoingEmail) -> Result<Option<String>>;
}

/// First word of a display name, `User` when blank
pub fn first_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or("User")
}

/// Apply `mode` and store the result. Returns the final topic list.
pub async fn update_topics(
    store: &dyn SubscriberStore,
    email: &str,
    name: &str,
    topics: Vec<String>,
    mode: TopicUpdateMode,
) -> Result<Vec<String>> {
    let mut final_topics = match mode {
        TopicUpdateMode::Replace => Vec::new(),
        TopicUpdateMode::Merge => store.lookup(email).await?.map(|s| s.topics).unwrap_or_default(),
    };
    for topic in topics {
        if !final_topics.contains(&topic) {
            final_topics.push(topic);
        }
    }
    if final_topics.is_empty() {
        return Err(ChatbotError::InvalidInput("At least one topic is required".into()));
    }
    store.set_topics(email, first_name(name), &final_topics).await?;
    tracing::info!(email, topics = final_topics.len(), ?mode, "Updated subscriber topics");
    Ok(final_topics)
}

fn not_found(email: &str) -> ChatbotError {
    ChatbotError::Api {
        service: "Subscribers",
        status: 404,
        body: format!("contact {email} not found"),
    }
}

/// Subscribers kept in process memory
#[derive(Debug, Default)]
pub struct InMemorySubscribers {
    contacts: RwLock<BTreeMap<String, Subscriber>>,
}

impl InMemorySubscribers {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriberStore for InMemorySubscribers {
    async fn subscribe(&self, email: &str, name: &str, topics: &[String]) -> Result<SubscribeOutcome> {
        let subscriber = Subscriber {
            email: email.to_string(),
            name: first_name(name).to_string(),
            topics: topics.to_vec(),
            subscribed_date: Some(chrono::Utc::now().format("%Y-%m-%d").to_string()),
        };
        let previous = self.contacts.write().await.insert(email.to_string(), subscriber);
        Ok(if previous.is_some() {
            SubscribeOutcome::Updated
        } else {
            SubscribeOutcome::Created
        })
    }

    async fn unsubscribe(&self, email: &str) -> Result<()> {
        self.contacts
            .write()
            .await
            .remove(email)
            .map(|_| ())
            .ok_or_else(|| not_found(email))
    }

    async fn lookup(&self, email: &str) -> Result<Option<Subscriber>> {
        Ok(self.contacts.read().await.get(email).cloned())
    }

    async fn set_topics(&self, email: &str, name: &str, topics: &[String]) -> Result<()> {
        let mut contacts = self.contacts.write().await;
        let contact = contacts.get_mut(email).ok_or_else(|| not_found(email))?;
        contact.name = name.to_string();
        contact.topics = topics.to_vec();
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Subscriber>> {
        Ok(self.contacts.read().await.values().cloned().collect())
    }
}

/// Records deliveries instead of sending them
#[derive(Debug, Default)]
pub struct InMemoryMailer {
    sent: RwLock<Vec<OutgoingEmail>>,
    rejected: HashSet<String>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every delivery to `email`
    #[must_use]
    pub fn rejecting(mut self, email: &str) -> Self {
        self.rejected.insert(email.to_string());
        self
    }

    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<Option<String>> {
        if self.rejected.contains(&email.to) {
            return Err(ChatbotError::Newsletter(format!("delivery to {} rejected", email.to)));
        }
        let mut sent = self.sent.write().await;
        sent.push(email.clone());
        Ok(Some(format!("<local-{}@crypto-chat>", sent.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|t| (*t).to_string()).collect()
    }

    #[test]
    fn test_first_name() {
        assert_eq!(first_name("Ada Lovelace"), "Ada");
        assert_eq!(first_name("   "), "User");
    }

    #[test]
    fn test_mode_deserializes() {
        let mode: TopicUpdateMode = serde_json::from_str("\"merge\"").unwrap();
        assert_eq!(mode, TopicUpdateMode::Merge);
        assert_eq!(TopicUpdateMode::default(), TopicUpdateMode::Replace);
    }

    #[tokio::test]
    async fn test_subscribe_then_resubscribe() {
        let store = InMemorySubscribers::new();
        let first = store.subscribe("a@example.com", "Ada Lovelace", &topics(&["bitcoin"])).await.unwrap();
        let again = store.subscribe("a@example.com", "Ada", &topics(&["defi"])).await.unwrap();
        assert_eq!((first, again), (SubscribeOutcome::Created, SubscribeOutcome::Updated));
        let found = store.lookup("a@example.com").await.unwrap().unwrap();
        assert_eq!(found.name, "Ada");
        assert_eq!(found.topics, topics(&["defi"]));
    }

    #[tokio::test]
    async fn test_merge_keeps_existing_topics() {
        let store = InMemorySubscribers::new();
        store.subscribe("a@example.com", "Ada", &topics(&["bitcoin", "defi"])).await.unwrap();
        let merged = update_topics(&store, "a@example.com", "Ada", topics(&["defi", "mining"]), TopicUpdateMode::Merge)
            .await
            .unwrap();
        assert_eq!(merged, topics(&["bitcoin", "defi", "mining"]));
    }

    #[tokio::test]
    async fn test_replace_requires_a_topic() {
        let store = InMemorySubscribers::new();
        store.subscribe("a@example.com", "Ada", &topics(&["bitcoin"])).await.unwrap();
        let err = update_topics(&store, "a@example.com", "Ada", Vec::new(), TopicUpdateMode::Replace)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatbotError::InvalidInput(_)));
        let replaced = update_topics(&store, "a@example.com", "Ada", topics(&["nft-art"]), TopicUpdateMode::Replace)
            .await
            .unwrap();
        assert_eq!(replaced, topics(&["nft-art"]));
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_is_error() {
        let store = InMemorySubscribers::new();
        assert!(store.unsubscribe("nobody@example.com").await.is_err());
    }

    #[tokio::test]
    async fn test_mailer_records_and_rejects() {
        let mailer = InMemoryMailer::new().rejecting("bounce@example.com");
        let mut email = OutgoingEmail {
            to: "a@example.com".into(),
            subject: "Hi".into(),
            html: "<p>hi</p>".into(),
            tags: vec!["newsletter".into()],
        };
        assert!(mailer.send(&email).await.unwrap().is_some());
        email.to = "bounce@example.com".into();
        assert!(mailer.send(&email).await.is_err());
        assert_eq!(mailer.sent().await.len(), 1);
    }
}
