//! Weekly Newsletter Job
//!
//! News is collected once per run for every topic, prices once per priced
//! topic; each subscriber then gets a digest of their own topics.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;

use super::render::{ArticleView, NewsletterRenderer, NewsletterView, PriceBox, SectionView};
use super::store::{Mailer, OutgoingEmail, SubscriberStore};
use super::topics;
use crate::api::{MarketDataApi, TopicNews};
use crate::chart::grouped;
use crate::config::NewsletterConfig;
use crate::error::Result;
use crate::model::{NewsArticle, Subscriber};

const EMAIL_TAGS: [&str; 2] = ["newsletter", "weekly-digest"];

/// Where a topic's price box comes from
enum PriceSource {
    Spot(&'static str),
    Floor(&'static str),
}

fn price_source(topic_id: &str) -> Option<PriceSource> {
    match topic_id {
        "bitcoin" => Some(PriceSource::Spot("bitcoin")),
        "ethereum" => Some(PriceSource::Spot("ethereum")),
        "nft-cryptopunks" => Some(PriceSource::Floor("cryptopunks")),
        "nft-bored-ape" => Some(PriceSource::Floor("bored-ape-yacht-club")),
        _ => None,
    }
}

/// `Your Weekly Crypto Digest - 2 Topics Update`
pub fn subject(topic_count: usize) -> String {
    let plural = if topic_count == 1 { "" } else { "s" };
    format!("Your Weekly Crypto Digest - {topic_count} Topic{plural} Update")
}

/// Outcome of a send run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NewsletterReport {
    pub sent: usize,
    pub failed: usize,
    pub total: usize,
}

/// News and prices for a set of topics, gathered once per run
#[derive(Debug, Default)]
pub struct Digest {
    news: HashMap<String, Vec<NewsArticle>>,
    prices: HashMap<String, PriceBox>,
}

impl Digest {
    pub fn articles(&self, topic_id: &str) -> &[NewsArticle] {
        self.news.get(topic_id).map_or(&[], Vec::as_slice)
    }

    pub fn price(&self, topic_id: &str) -> Option<&PriceBox> {
        self.prices.get(topic_id)
    }
}

/// Builds digests and renders them
pub struct DigestBuilder {
    news: Arc<dyn TopicNews>,
    market: Arc<dyn MarketDataApi>,
    renderer: NewsletterRenderer,
    config: NewsletterConfig,
}

impl DigestBuilder {
    pub fn new(news: Arc<dyn TopicNews>, market: Arc<dyn MarketDataApi>, config: NewsletterConfig) -> Result<Self> {
        Ok(Self {
            news,
            market,
            renderer: NewsletterRenderer::new()?,
            config,
        })
    }

    /// Fetch news and prices for `topic_ids` concurrently. Failures leave
    /// that topic without articles or price.
    pub async fn collect(&self, topic_ids: &[&str]) -> Digest {
        let news = join_all(topic_ids.iter().map(|id| self.topic_news(id)));
        let prices = join_all(topic_ids.iter().map(|id| self.topic_price(id)));
        let (news, prices) = futures::join!(news, prices);

        let mut digest = Digest::default();
        for ((id, articles), price) in topic_ids.iter().zip(news).zip(prices) {
            tracing::info!(topic = id, articles = articles.len(), "Collected news");
            digest.news.insert((*id).to_string(), articles);
            if let Some(price) = price {
                digest.prices.insert((*id).to_string(), price);
            }
        }
        digest
    }

    async fn topic_news(&self, topic_id: &str) -> Vec<NewsArticle> {
        let (query, currency) = topics::find(topic_id).map_or((topic_id, None), |t| (t.query, t.currency));
        match self.news.search(query, currency, self.config.articles_per_topic).await {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!(topic = topic_id, error = %e, "News lookup failed");
                Vec::new()
            }
        }
    }

    async fn topic_price(&self, topic_id: &str) -> Option<PriceBox> {
        let source = price_source(topic_id)?;
        let fetched = match source {
            PriceSource::Spot(id) => self
                .market
                .simple_price(id, "usd")
                .await
                .map(|v| v.get(id).and_then(|p| p.get("usd")).and_then(Value::as_f64)),
            PriceSource::Floor(id) => self
                .market
                .nft(id)
                .await
                .map(|v| v.pointer("/floor_price/usd").and_then(Value::as_f64)),
        };
        match (source, fetched) {
            (PriceSource::Spot(_), Ok(Some(usd))) => Some(PriceBox {
                label: "Current Price",
                value: format!("${}", grouped(usd, 2)),
            }),
            (PriceSource::Floor(_), Ok(Some(usd))) => Some(PriceBox {
                label: "Floor Price",
                value: format!("${}", grouped(usd, 0)),
            }),
            (_, Ok(None)) => None,
            (_, Err(e)) => {
                tracing::warn!(topic = topic_id, error = %e, "Price lookup failed");
                None
            }
        }
    }

    /// HTML newsletter for one subscriber
    pub fn render(&self, name: &str, topic_ids: &[String], digest: &Digest, today: NaiveDate) -> Result<String> {
        let sections = topic_ids
            .iter()
            .map(|id| SectionView {
                title: topics::display_name(id).to_string(),
                price: digest.price(id).cloned(),
                articles: digest.articles(id).iter().map(ArticleView::from).collect(),
            })
            .collect();
        let view = NewsletterView::new(name, sections, &self.config.chatbot_url, today);
        self.renderer.render(&view)
    }
}

/// Sends the weekly digest to every subscriber
pub struct NewsletterJob {
    digest: DigestBuilder,
    subscribers: Arc<dyn SubscriberStore>,
    mailer: Arc<dyn Mailer>,
}

impl NewsletterJob {
    pub fn new(digest: DigestBuilder, subscribers: Arc<dyn SubscriberStore>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            digest,
            subscribers,
            mailer,
        }
    }

    /// Render a newsletter without sending it
    pub async fn preview(&self, name: &str, topic_ids: &[String]) -> Result<String> {
        let ids: Vec<&str> = topic_ids.iter().map(String::as_str).collect();
        let digest = self.digest.collect(&ids).await;
        self.digest.render(name, topic_ids, &digest, Utc::now().date_naive())
    }

    pub async fn run(&self) -> Result<NewsletterReport> {
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .list()
            .await?
            .into_iter()
            .filter(|s| s.topics.iter().any(|t| topics::find(t).is_some()))
            .collect();
        tracing::info!(subscribers = subscribers.len(), "Starting newsletter run");
        if subscribers.is_empty() {
            tracing::warn!("No subscribers found");
            return Ok(NewsletterReport::default());
        }

        let all_topics: Vec<&str> = topics::ids().collect();
        let digest = self.digest.collect(&all_topics).await;
        let today = Utc::now().date_naive();

        let mut report = NewsletterReport {
            total: subscribers.len(),
            ..NewsletterReport::default()
        };
        for subscriber in &subscribers {
            let email = OutgoingEmail {
                to: subscriber.email.clone(),
                subject: subject(subscriber.topics.len()),
                html: self.digest.render(&subscriber.name, &subscriber.topics, &digest, today)?,
                tags: EMAIL_TAGS.iter().map(|t| (*t).to_string()).collect(),
            };
            match self.mailer.send(&email).await {
                Ok(message_id) => {
                    tracing::info!(to = %email.to, ?message_id, "Newsletter sent");
                    report.sent += 1;
                }
                Err(e) => {
                    tracing::warn!(to = %email.to, error = %e, "Newsletter delivery failed");
                    report.failed += 1;
                }
            }
        }
        tracing::info!(sent = report.sent, failed = report.failed, total = report.total, "Newsletter run complete");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockDataApi;
    use crate::newsletter::store::{InMemoryMailer, InMemorySubscribers};

    fn builder() -> DigestBuilder {
        let api = Arc::new(MockDataApi::new());
        DigestBuilder::new(api.clone(), api, NewsletterConfig::default()).unwrap()
    }

    fn topic_list(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|t| (*t).to_string()).collect()
    }

    #[test]
    fn test_subject() {
        assert_eq!(subject(1), "Your Weekly Crypto Digest - 1 Topic Update");
        assert_eq!(subject(3), "Your Weekly Crypto Digest - 3 Topics Update");
    }

    #[tokio::test]
    async fn test_collect_prices_and_news() {
        let digest = builder().collect(&["bitcoin", "nft-cryptopunks", "defi"]).await;
        assert_eq!(digest.price("bitcoin").unwrap().value, "$97,500.00");
        let floor = digest.price("nft-cryptopunks").unwrap();
        assert_eq!((floor.label, floor.value.as_str()), ("Floor Price", "$145,000"));
        assert!(digest.price("defi").is_none());
        assert!(digest.articles("bitcoin").len() <= 3);
        assert!(!digest.articles("defi").is_empty());
        assert!(digest.articles("unknown").is_empty());
    }

    #[tokio::test]
    async fn test_run_sends_and_counts_failures() {
        let store = Arc::new(InMemorySubscribers::new());
        store.subscribe("ada@example.com", "Ada", &topic_list(&["bitcoin", "defi"])).await.unwrap();
        store.subscribe("bounce@example.com", "Bo", &topic_list(&["mining"])).await.unwrap();
        store.subscribe("stale@example.com", "Old", &topic_list(&["dogs"])).await.unwrap();
        let mailer = Arc::new(InMemoryMailer::new().rejecting("bounce@example.com"));

        let job = NewsletterJob::new(builder(), store, mailer.clone());
        let report = job.run().await.unwrap();
        assert_eq!(report, NewsletterReport { sent: 1, failed: 1, total: 2 });

        let sent = mailer.sent().await;
        assert_eq!(sent[0].to, "ada@example.com");
        assert_eq!(sent[0].subject, "Your Weekly Crypto Digest - 2 Topics Update");
        assert_eq!(sent[0].tags, vec!["newsletter", "weekly-digest"]);
        assert!(sent[0].html.contains("₿ Bitcoin"));
        assert!(sent[0].html.contains("🏦 DeFi"));
        assert!(!sent[0].html.contains("⛏️ Mining"));
    }

    #[tokio::test]
    async fn test_run_without_subscribers() {
        let job = NewsletterJob::new(
            builder(),
            Arc::new(InMemorySubscribers::new()),
            Arc::new(InMemoryMailer::new()),
        );
        assert_eq!(job.run().await.unwrap(), NewsletterReport::default());
    }

    #[tokio::test]
    async fn test_preview() {
        let job = NewsletterJob::new(
            builder(),
            Arc::new(InMemorySubscribers::new()),
            Arc::new(InMemoryMailer::new()),
        );
        let html = job.preview("Test User", &topic_list(&["ethereum", "nft-art"])).await.unwrap();
        assert!(html.contains("Hi Test User!"));
        assert!(html.contains("$3,450.00"));
        assert!(html.contains("🎨 NFT Art"));
    }
}
