use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Fields present in a dataset file that the viewer does not model.
/// They are kept so that a record can be written back unchanged.
pub type Extra = BTreeMap<String, Value>;

/// A timestamp exactly as it was stored in the dataset file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Interprets the stored text. Values without an offset are taken as UTC.
    pub fn parsed(&self) -> Option<DateTime<Utc>> {
        let raw = self.0.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Long form date, e.g. `April 29th, 1453`. Falls back to the raw text.
    pub fn long_date(&self) -> String {
        match self.parsed() {
            Some(dt) => format!(
                "{} {}{}, {}",
                dt.format("%B"),
                dt.day(),
                ordinal_suffix(dt.day()),
                dt.year()
            ),
            None => self.0.trim().to_string(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn non_empty_str(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn non_empty_list(value: &Option<Vec<String>>) -> Option<&[String]> {
    value.as_deref().filter(|list| !list.is_empty())
}

/// Explicit `null` reads the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty_timestamp(value: &Option<Timestamp>) -> Option<&Timestamp> {
    value.as_ref().filter(|ts| !ts.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub metadata: DatasetMetadata,
    pub articles: Vec<Article>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Dataset {
    pub fn displayable_count(&self) -> usize {
        self.articles.iter().filter(|a| a.is_displayable()).count()
    }
}

/// Summary block of a dataset. The stored counts are provenance only and may
/// disagree with the articles that follow them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub query: String,
    pub processed_at: Timestamp,
    pub total_articles: usize,
    pub successful: usize,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One search hit. Every per-article field may be missing or `null`; scalars
/// that were absent stay absent when the record is written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Kept as stored so `8` is not rewritten as `8.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_interpretation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<ArticleMetadata>,
    /// Body location used by older datasets, before it moved into `article`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Article {
    /// Crawl and extraction both succeeded and the metadata payload exists.
    pub fn is_displayable(&self) -> bool {
        self.crawled() && self.extracted() && self.article.is_some()
    }

    pub fn crawled(&self) -> bool {
        self.crawl_success.unwrap_or(false)
    }

    pub fn extracted(&self) -> bool {
        self.extraction_success.unwrap_or(false)
    }

    /// Relevance on the 0..=10 scale; a missing score counts as 0.
    pub fn score(&self) -> f64 {
        self.relevance_score
            .as_ref()
            .and_then(Number::as_f64)
            .unwrap_or(0.0)
    }

    pub fn snippet(&self) -> &str {
        self.original_snippet.as_deref().unwrap_or_default()
    }

    /// The metadata payload, only for displayable articles.
    pub fn payload(&self) -> Option<&ArticleMetadata> {
        if self.is_displayable() {
            self.article.as_ref()
        } else {
            None
        }
    }

    /// `None` when the article is unranked (stored rank of 0 or below).
    pub fn rank(&self) -> Option<i64> {
        self.rank.filter(|rank| *rank > 0)
    }

    /// Relevance score mapped onto 0..=100.
    pub fn relevance_percent(&self) -> f64 {
        let score = self.score();
        if score.is_nan() {
            return 0.0;
        }
        (score / 10.0 * 100.0).clamp(0.0, 100.0)
    }

    pub fn thumbnail(&self) -> Option<&str> {
        non_empty_str(&self.thumbnail_url)
    }

    pub fn error_detail(&self) -> Option<&str> {
        non_empty_str(&self.error)
    }

    /// Body text: the nested payload first, then the legacy top-level field.
    pub fn markdown_source(&self) -> Option<&str> {
        self.article
            .as_ref()
            .and_then(ArticleMetadata::markdown)
            .or_else(|| non_empty_str(&self.markdown_content))
    }

    /// Source name of a displayable article, used for badges.
    pub fn source(&self) -> Option<&str> {
        self.payload().and_then(ArticleMetadata::source)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_points: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities_mentioned: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_paywall: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_content: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl ArticleMetadata {
    pub fn paywalled(&self) -> bool {
        self.has_paywall.unwrap_or(false)
    }

    pub fn summary(&self) -> Option<&str> {
        non_empty_str(&self.summary)
    }

    pub fn source(&self) -> Option<&str> {
        non_empty_str(&self.source)
    }

    pub fn published(&self) -> Option<&Timestamp> {
        non_empty_timestamp(&self.published_date)
    }

    pub fn updated(&self) -> Option<&Timestamp> {
        non_empty_timestamp(&self.updated_date)
    }

    pub fn authors(&self) -> Option<&[String]> {
        non_empty_list(&self.authors)
    }

    pub fn categories(&self) -> Option<&[String]> {
        non_empty_list(&self.categories)
    }

    pub fn tags(&self) -> Option<&[String]> {
        non_empty_list(&self.tags)
    }

    pub fn key_points(&self) -> Option<&[String]> {
        non_empty_list(&self.key_points)
    }

    pub fn entities(&self) -> Option<&[String]> {
        non_empty_list(&self.entities_mentioned)
    }

    pub fn content_type(&self) -> Option<&str> {
        non_empty_str(&self.content_type)
    }

    pub fn markdown(&self) -> Option<&str> {
        non_empty_str(&self.markdown_content)
    }
}

/// A dataset together with the file it was loaded from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetEntry {
    pub filename: String,
    pub dataset: Dataset,
}
