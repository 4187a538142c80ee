//! Service Wiring
//!
//! Builds every external collaborator from configuration, either the live
//! HTTP clients or the in-process stand-ins used in offline mode.

use std::sync::Arc;

use crate::api::{
    CoinGeckoClient, CryptoCompareClient, CryptoPanicClient, ExchangeRateClient, FxRatesApi, MarketDataApi,
    MockDataApi, NewsSearch, TopicNews,
};
use crate::config::ChatbotConfig;
use crate::error::Result;
use crate::news::NewsFeed;
use crate::newsletter::{
    BrevoClient, DigestBuilder, InMemoryMailer, InMemorySubscribers, Mailer, NewsletterJob, SubscriberStore,
};
use crate::reference::ReferenceData;
use crate::resolver::CategoryResolver;
use crate::svckit::DataSources;

/// Shared handles to every data source and newsletter backend
#[derive(Clone)]
pub struct Services {
    pub reference: Arc<ReferenceData>,
    pub market: Arc<dyn MarketDataApi>,
    pub fx: Arc<dyn FxRatesApi>,
    pub topic_news: Arc<dyn TopicNews>,
    pub news_search: Arc<dyn NewsSearch>,
    pub subscribers: Arc<dyn SubscriberStore>,
    pub mailer: Arc<dyn Mailer>,
    config: ChatbotConfig,
}

impl Services {
    /// Live clients, or the mock data source when `config.offline` is set.
    pub fn from_config(config: &ChatbotConfig, reference: Arc<ReferenceData>) -> Result<Self> {
        if config.offline {
            tracing::warn!("Offline mode: serving mock market data");
            return Ok(Self::offline(config, reference));
        }
        let http = config.http_client()?;
        let brevo = Arc::new(BrevoClient::new(http.clone(), config.newsletter.clone()));
        Ok(Self {
            reference,
            market: Arc::new(CoinGeckoClient::new(http.clone(), config.coingecko.clone())),
            fx: Arc::new(ExchangeRateClient::new(http.clone(), config.exchangerate.clone())),
            topic_news: Arc::new(CryptoPanicClient::new(http.clone(), config.cryptopanic.clone())),
            news_search: Arc::new(CryptoCompareClient::new(http, config.cryptocompare.clone())),
            subscribers: brevo.clone(),
            mailer: brevo,
            config: config.clone(),
        })
    }

    /// Mock data and in-memory newsletter backends
    pub fn offline(config: &ChatbotConfig, reference: Arc<ReferenceData>) -> Self {
        let mock = Arc::new(MockDataApi::new());
        Self {
            reference,
            market: mock.clone(),
            fx: mock.clone(),
            topic_news: mock.clone(),
            news_search: mock,
            subscribers: Arc::new(InMemorySubscribers::new()),
            mailer: Arc::new(InMemoryMailer::new()),
            config: config.clone(),
        }
    }

    pub fn data_sources(&self) -> DataSources {
        DataSources {
            market: self.market.clone(),
            fx: self.fx.clone(),
            resolver: CategoryResolver::new(self.reference.clone()),
        }
    }

    pub fn news_feed(&self) -> NewsFeed {
        NewsFeed::new(self.news_search.clone(), self.topic_news.clone(), self.reference.clone())
    }

    pub fn newsletter_job(&self) -> Result<NewsletterJob> {
        let digest = DigestBuilder::new(self.topic_news.clone(), self.market.clone(), self.config.newsletter.clone())?;
        Ok(NewsletterJob::new(digest, self.subscribers.clone(), self.mailer.clone()))
    }
}
