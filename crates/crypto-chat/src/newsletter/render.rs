//! Newsletter HTML rendering (minijinja, auto-escaped)

use chrono::{Datelike, NaiveDate};
use minijinja::Environment;
use serde::Serialize;

use crate::error::Result;
use crate::model::NewsArticle;

// The `.html` name turns on auto-escaping for titles and names
const TEMPLATE_NAME: &str = "newsletter.html";
const TEMPLATE: &str = include_str!("../../templates/newsletter.html");

/// Current or floor price shown at the top of a topic section
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PriceBox {
    pub label: &'static str,
    pub value: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ArticleView {
    pub title: String,
    pub url: String,
    pub source: String,
}

impl From<&NewsArticle> for ArticleView {
    fn from(article: &NewsArticle) -> Self {
        let source = if article.source.title.is_empty() {
            "Unknown".to_string()
        } else {
            article.source.title.clone()
        };
        Self {
            title: article.title.clone(),
            url: if article.url.is_empty() { "#".into() } else { article.url.clone() },
            source,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SectionView {
    pub title: String,
    pub price: Option<PriceBox>,
    pub articles: Vec<ArticleView>,
}

/// Everything one subscriber's newsletter shows
#[derive(Clone, Debug, Serialize)]
pub struct NewsletterView {
    pub name: String,
    pub sections: Vec<SectionView>,
    pub chatbot_url: String,
    /// e.g. `January 06, 2025`
    pub date: String,
    pub year: i32,
}

impl NewsletterView {
    pub fn new(name: &str, sections: Vec<SectionView>, chatbot_url: &str, today: NaiveDate) -> Self {
        Self {
            name: name.to_string(),
            sections,
            chatbot_url: chatbot_url.to_string(),
            date: today.format("%B %d, %Y").to_string(),
            year: today.year(),
        }
    }
}

pub struct NewsletterRenderer {
    env: Environment<'static>,
}

impl NewsletterRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render(&self, view: &NewsletterView) -> Result<String> {
        Ok(self.env.get_template(TEMPLATE_NAME)?.render(view)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewsSource;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    #[test]
    fn test_render_sections() {
        let view = NewsletterView::new(
            "Ada",
            vec![
                SectionView {
                    title: "₿ Bitcoin".into(),
                    price: Some(PriceBox {
                        label: "Current Price",
                        value: "$97,500.00".into(),
                    }),
                    articles: vec![ArticleView {
                        title: "Bitcoin climbs".into(),
                        url: "https://news.example.com/1".into(),
                        source: "Example News".into(),
                    }],
                },
                SectionView {
                    title: "🎨 NFT Art".into(),
                    price: None,
                    articles: Vec::new(),
                },
            ],
            "http://localhost:3000",
            today(),
        );
        let html = NewsletterRenderer::new().unwrap().render(&view).unwrap();
        assert!(html.contains("Hi Ada!"));
        assert!(html.contains("$97,500.00"));
        assert!(html.contains("as of January 06, 2025"));
        assert!(html.contains("Bitcoin climbs"));
        assert!(html.contains("No news articles available for this topic this week."));
        assert!(html.contains("&copy; 2025"));
        assert_eq!(html.matches("class=\"price-box\"").count(), 1);
    }

    #[test]
    fn test_article_titles_escaped() {
        let view = NewsletterView::new(
            "<b>Eve</b>",
            vec![SectionView {
                title: "DeFi".into(),
                price: None,
                articles: vec![ArticleView {
                    title: "<script>alert(1)</script>".into(),
                    url: "#".into(),
                    source: "X".into(),
                }],
            }],
            "http://localhost:3000",
            today(),
        );
        let html = NewsletterRenderer::new().unwrap().render(&view).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<b>Eve</b>"));
    }

    #[test]
    fn test_article_view_defaults() {
        let article = NewsArticle {
            id: "1".into(),
            title: "T".into(),
            url: String::new(),
            published_at: String::new(),
            source: NewsSource::default(),
        };
        let view = ArticleView::from(&article);
        assert_eq!(view.url, "#");
        assert_eq!(view.source, "Unknown");
    }
}
