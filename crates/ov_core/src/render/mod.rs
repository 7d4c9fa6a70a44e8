//! What to show for one article.
//!
//! A displayable article can be shown as its body or as its metadata; the
//! reader picks. Anything else can only be shown as a failure notice. The
//! original URL is offered as an outbound link in every case, so it is not
//! part of these types.

pub mod markdown;

pub use markdown::{Alignment, Block, Document, Inline};

use crate::types::{Article, ArticleMetadata};
use serde::{Deserialize, Serialize};

/// Why an article has nothing to render, in order of precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    CrawlFailed,
    ExtractionFailed,
    NoArticleData,
}

impl FailureReason {
    /// `None` when the article is displayable.
    pub fn of(article: &Article) -> Option<Self> {
        if article.is_displayable() {
            None
        } else if !article.crawled() {
            Some(FailureReason::CrawlFailed)
        } else if !article.extracted() {
            Some(FailureReason::ExtractionFailed)
        } else {
            Some(FailureReason::NoArticleData)
        }
    }

    /// Short form used on article cards.
    pub fn label(self) -> &'static str {
        match self {
            FailureReason::CrawlFailed => "Failed to crawl",
            FailureReason::ExtractionFailed => "Failed to extract content",
            FailureReason::NoArticleData => "No article data available",
        }
    }

    /// Long form used on the article page.
    pub fn detail(self) -> &'static str {
        match self {
            FailureReason::CrawlFailed => "Failed to crawl this article",
            FailureReason::ExtractionFailed => "Failed to extract content from this article",
            FailureReason::NoArticleData => "No article data available",
        }
    }
}

/// The presentation a reader asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Body,
    Metadata,
}

/// The presentation actually produced for an article.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ArticleBody<'a> {
    Body { document: Document },
    Metadata { sections: Vec<MetadataSection<'a>> },
    Failure {
        reason: FailureReason,
        /// Diagnostic text, shown only behind a disclosure control.
        detail: Option<&'a str>,
    },
}

impl ArticleBody<'_> {
    pub fn mode(&self) -> Option<ViewMode> {
        match self {
            ArticleBody::Body { .. } => Some(ViewMode::Body),
            ArticleBody::Metadata { .. } => Some(ViewMode::Metadata),
            ArticleBody::Failure { .. } => None,
        }
    }
}

/// Picks the presentation for `article`. Failed articles always get the
/// failure notice whatever mode was requested.
pub fn render_article(article: &Article, requested: ViewMode) -> ArticleBody<'_> {
    let payload = match (FailureReason::of(article), article.payload()) {
        (None, Some(payload)) => payload,
        (reason, _) => {
            return ArticleBody::Failure {
                reason: reason.unwrap_or(FailureReason::NoArticleData),
                detail: article.error_detail(),
            }
        }
    };

    match requested {
        ViewMode::Body => ArticleBody::Body {
            document: Document::parse(article.markdown_source().unwrap_or_default()),
        },
        ViewMode::Metadata => ArticleBody::Metadata {
            sections: metadata_sections(payload),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "section", content = "value", rename_all = "snake_case")]
pub enum MetadataSection<'a> {
    Summary(&'a str),
    Source(&'a str),
    Published(String),
    Updated(String),
    Authors(String),
    Categories(&'a [String]),
    Tags(&'a [String]),
    KeyPoints(&'a [String]),
    Entities(&'a [String]),
    ContentType(&'a str),
    Paywall,
}

impl MetadataSection<'_> {
    pub fn title(&self) -> &'static str {
        match self {
            MetadataSection::Summary(_) => "Summary",
            MetadataSection::Source(_) => "Source",
            MetadataSection::Published(_) => "Published",
            MetadataSection::Updated(_) => "Updated",
            MetadataSection::Authors(_) => "Authors",
            MetadataSection::Categories(_) => "Categories",
            MetadataSection::Tags(_) => "Tags",
            MetadataSection::KeyPoints(_) => "Key Points",
            MetadataSection::Entities(_) => "Entities Mentioned",
            MetadataSection::ContentType(_) => "Content Type",
            MetadataSection::Paywall => "Paywall",
        }
    }
}

/// Sections for the metadata presentation. Absent or empty fields produce no
/// section at all.
pub fn metadata_sections(meta: &ArticleMetadata) -> Vec<MetadataSection<'_>> {
    let mut sections = Vec::new();
    if let Some(summary) = meta.summary() {
        sections.push(MetadataSection::Summary(summary));
    }
    if let Some(source) = meta.source() {
        sections.push(MetadataSection::Source(source));
    }
    if let Some(published) = meta.published() {
        sections.push(MetadataSection::Published(published.long_date()));
    }
    if let Some(updated) = meta.updated() {
        sections.push(MetadataSection::Updated(updated.long_date()));
    }
    if let Some(authors) = meta.authors() {
        sections.push(MetadataSection::Authors(authors.join(", ")));
    }
    if let Some(categories) = meta.categories() {
        sections.push(MetadataSection::Categories(categories));
    }
    if let Some(tags) = meta.tags() {
        sections.push(MetadataSection::Tags(tags));
    }
    if let Some(points) = meta.key_points() {
        sections.push(MetadataSection::KeyPoints(points));
    }
    if let Some(entities) = meta.entities() {
        sections.push(MetadataSection::Entities(entities));
    }
    if let Some(content_type) = meta.content_type() {
        sections.push(MetadataSection::ContentType(content_type));
    }
    if meta.paywalled() {
        sections.push(MetadataSection::Paywall);
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::article;
    use crate::types::Timestamp;

    #[test]
    fn test_failure_precedence() {
        let mut a = article("https://a.example", 1.0, false);
        a.extraction_success = Some(false);
        assert_eq!(FailureReason::of(&a), Some(FailureReason::CrawlFailed));
        assert_eq!(FailureReason::CrawlFailed.label().to_lowercase(), "failed to crawl");

        // crawl failure wins even when the other fields look fine
        a.extraction_success = Some(true);
        a.article = Some(ArticleMetadata::default());
        assert_eq!(FailureReason::of(&a), Some(FailureReason::CrawlFailed));

        a.crawl_success = Some(true);
        a.extraction_success = None;
        assert_eq!(FailureReason::of(&a), Some(FailureReason::ExtractionFailed));
        assert_eq!(
            FailureReason::ExtractionFailed.label().to_lowercase(),
            "failed to extract content"
        );

        a.extraction_success = Some(true);
        a.article = None;
        assert_eq!(FailureReason::of(&a), Some(FailureReason::NoArticleData));
        assert_eq!(
            FailureReason::NoArticleData.label().to_lowercase(),
            "no article data available"
        );

        a.article = Some(ArticleMetadata::default());
        assert_eq!(FailureReason::of(&a), None);
    }

    #[test]
    fn test_failed_articles_only_render_failure() {
        let a = article("https://a.example", 1.0, false);
        for mode in [ViewMode::Body, ViewMode::Metadata] {
            let body = render_article(&a, mode);
            assert_eq!(
                body,
                ArticleBody::Failure {
                    reason: FailureReason::CrawlFailed,
                    detail: Some("timeout"),
                }
            );
            assert_eq!(body.mode(), None);
        }
    }

    #[test]
    fn test_failure_without_error_text() {
        let mut a = article("https://a.example", 1.0, true);
        a.article = None;
        a.error = Some("  ".to_string());
        match render_article(&a, ViewMode::Body) {
            ArticleBody::Failure { reason, detail } => {
                assert_eq!(reason, FailureReason::NoArticleData);
                assert_eq!(detail, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_displayable_articles_switch_modes() {
        let mut a = article("https://a.example", 1.0, true);
        a.article = Some(ArticleMetadata {
            summary: Some("Short summary".to_string()),
            markdown_content: Some("## Body\n\ntext".to_string()),
            ..Default::default()
        });

        let body = render_article(&a, ViewMode::Body);
        assert_eq!(body.mode(), Some(ViewMode::Body));
        match body {
            ArticleBody::Body { document } => assert_eq!(document.blocks.len(), 2),
            other => panic!("unexpected {:?}", other),
        }

        let meta = render_article(&a, ViewMode::Metadata);
        assert_eq!(
            meta,
            ArticleBody::Metadata {
                sections: vec![MetadataSection::Summary("Short summary")],
            }
        );
    }

    #[test]
    fn test_body_without_markdown_is_empty() {
        let a = article("https://a.example", 1.0, true);
        match render_article(&a, ViewMode::Body) {
            ArticleBody::Body { document } => assert!(document.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_metadata_sections_skip_absent_fields() {
        let meta = ArticleMetadata {
            source: Some("Example News".to_string()),
            published_date: Some(Timestamp::new("2025-01-14T09:00:00Z")),
            updated_date: Some(Timestamp::new("")),
            authors: Some(vec!["Jane Doe".to_string(), "John Roe".to_string()]),
            categories: Some(vec![]),
            tags: None,
            key_points: Some(vec!["Point one".to_string()]),
            has_paywall: Some(true),
            ..Default::default()
        };
        let sections = metadata_sections(&meta);
        let titles: Vec<&str> = sections.iter().map(MetadataSection::title).collect();
        assert_eq!(
            titles,
            vec!["Source", "Published", "Authors", "Key Points", "Paywall"]
        );
        assert_eq!(
            sections[1],
            MetadataSection::Published("January 14th, 2025".to_string())
        );
        assert_eq!(
            sections[2],
            MetadataSection::Authors("Jane Doe, John Roe".to_string())
        );

        assert!(metadata_sections(&ArticleMetadata::default()).is_empty());
    }
}
