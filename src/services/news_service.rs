use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use tracing::warn;

use crate::services::upstream::{self, UpstreamError};

pub const MAX_HEADLINES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headline {
    pub title: String,
    pub link: String,
    pub published_at: Option<DateTime<FixedOffset>>,
}

#[async_trait]
pub trait NewsFeed: Send + Sync {
    /// At most `MAX_HEADLINES`, in upstream order.
    async fn recent_headlines(
        &self,
        city: &str,
        district: &str,
    ) -> Result<Vec<Headline>, UpstreamError>;
}

pub fn disaster_query(city: &str, district: &str) -> String {
    format!(
        "{} {} flood OR cyclone OR earthquake OR landslide site:news",
        city, district
    )
}

#[derive(Clone, Copy)]
enum ItemField {
    Title,
    Link,
    PubDate,
}

#[derive(Default)]
struct ItemText {
    title: String,
    link: String,
    pub_date: String,
}

impl ItemText {
    fn push(&mut self, field: ItemField, text: &str) {
        match field {
            ItemField::Title => self.title.push_str(text),
            ItemField::Link => self.link.push_str(text),
            ItemField::PubDate => self.pub_date.push_str(text),
        }
    }

    fn into_headline(self) -> Headline {
        let title = self.title.trim();
        let link = self.link.trim();
        Headline {
            title: if title.is_empty() { "Untitled" } else { title }.to_string(),
            link: if link.is_empty() { "#" } else { link }.to_string(),
            published_at: DateTime::parse_from_rfc2822(self.pub_date.trim()).ok(),
        }
    }
}

/// Reads the first `limit` `<item>`s of an RSS document.
pub fn parse_rss(xml: &str, limit: usize) -> Result<Vec<Headline>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut headlines = Vec::new();
    let mut item: Option<ItemText> = None;
    let mut field: Option<ItemField> = None;

    while headlines.len() < limit {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"item" => item = Some(ItemText::default()),
                b"title" => field = Some(ItemField::Title),
                b"link" => field = Some(ItemField::Link),
                b"pubDate" => field = Some(ItemField::PubDate),
                _ => field = None,
            },
            Event::Text(t) => {
                if let (Some(item), Some(field)) = (item.as_mut(), field) {
                    item.push(field, &t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let (Some(item), Some(field)) = (item.as_mut(), field) {
                    item.push(field, &String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(e) => {
                field = None;
                if e.name().as_ref() == b"item" {
                    if let Some(done) = item.take() {
                        headlines.push(done.into_headline());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(headlines)
}

pub struct GoogleNewsRss {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleNewsRss {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: upstream::http_client(),
            base_url: base_url.into(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(upstream::env_url(
            "NEWS_RSS_URL",
            "https://news.google.com/rss/search",
        ))
    }
}

#[async_trait]
impl NewsFeed for GoogleNewsRss {
    async fn recent_headlines(
        &self,
        city: &str,
        district: &str,
    ) -> Result<Vec<Headline>, UpstreamError> {
        let query = disaster_query(city, district);
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query.as_str()),
                ("hl", "en-IN"),
                ("gl", "IN"),
                ("ceid", "IN:en"),
            ])
            .send()
            .await
            .map_err(|e| UpstreamError::Unreachable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(UpstreamError::Status(resp.status().as_u16()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| UpstreamError::Payload(e.to_string()))?;
        parse_rss(&body, MAX_HEADLINES).map_err(|e| UpstreamError::Payload(e.to_string()))
    }
}

/// News widget contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsView {
    pub available: bool,
    pub headlines: Vec<Headline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl NewsView {
    pub fn from_result(result: Result<Vec<Headline>, UpstreamError>) -> Self {
        match result {
            Ok(headlines) if headlines.is_empty() => Self {
                available: true,
                headlines,
                message: Some("No recent disaster news found.".to_string()),
            },
            Ok(headlines) => Self {
                available: true,
                headlines,
                message: None,
            },
            Err(e) => {
                warn!("📰 News feed failed: {}", e);
                Self {
                    available: false,
                    headlines: Vec::new(),
                    message: Some("Unable to load news right now.".to_string()),
                }
            }
        }
    }
}
