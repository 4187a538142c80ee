//! Weekly Newsletter
//!
//! Topic taxonomy, subscriber management (Brevo), digest collection and
//! HTML rendering.

mod brevo;
mod job;
mod render;
mod store;
pub mod topics;

pub use brevo::BrevoClient;
pub use job::{Digest, DigestBuilder, NewsletterJob, NewsletterReport, subject};
pub use render::{NewsletterRenderer, NewsletterView, PriceBox};
pub use store::{
    InMemoryMailer, InMemorySubscribers, Mailer, OutgoingEmail, SubscribeOutcome, SubscriberStore,
    TopicUpdateMode, first_name, update_topics,
};
pub use topics::Topic;
