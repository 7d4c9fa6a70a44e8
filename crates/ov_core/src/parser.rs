use crate::types::Dataset;
use crate::Result;

/// Parses the text of a dataset file.
///
/// Only the top-level structure and the metadata block are required; article
/// fields that are missing come through as absent values.
pub fn parse(raw: &str) -> Result<Dataset> {
    Ok(serde_yaml::from_str(raw)?)
}

/// Like [`parse`], for raw file contents. Text that is not UTF-8 is a parse
/// failure.
pub fn parse_slice(raw: &[u8]) -> Result<Dataset> {
    Ok(serde_yaml::from_slice(raw)?)
}

/// Writes a dataset back out, unknown fields included.
pub fn to_yaml(dataset: &Dataset) -> Result<String> {
    Ok(serde_yaml::to_string(dataset)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_yaml::Value;

    const SAMPLE: &str = r##"
name: Baltic cable incidents
pipeline_version: "2.3"
metadata:
  query: baltic sea cable damage
  processed_at: "2025-01-15T10:30:00"
  total_articles: 3
  successful: 2
  model: ranker-v4
articles:
  - url: https://news.example/cable-1
    original_title: Second cable damaged
    original_snippet: Authorities investigate a second incident.
    thumbnail_url: https://img.example/1.jpg
    relevance_score: 8.5
    relevance_interpretation: Directly on topic
    rank: 1
    crawl_success: true
    extraction_success: true
    crawl_duration_ms: 1200
    article:
      title: Second cable damaged in the Baltic
      summary: A data cable was cut.
      source: Example News
      published_date: "2025-01-14T09:00:00Z"
      updated_date: ""
      authors: [Jane Doe]
      categories: [security]
      tags: [baltic, infrastructure]
      key_points:
        - Cable cut near Gotland
      entities_mentioned: [NATO]
      has_paywall: false
      content_type: news
      markdown_content: "# Heading\n\nBody text."
      language: en
  - url: https://news.example/cable-2
    original_title: Paywalled story
    original_snippet: ""
    relevance_score: 6.25
    rank: 2
    crawl_success: true
    extraction_success: false
    error: "extraction timed out"
  - url: https://news.example/cable-3
    original_title: Unreachable
    original_snippet: Nothing here
    relevance_score: 9.75
    rank: 0
    crawl_success: false
    extraction_success: false
    error: "HTTP 403"
"##;

    #[test]
    fn test_parse_sample() {
        let dataset = parse(SAMPLE).unwrap();
        assert_eq!(dataset.name, "Baltic cable incidents");
        assert_eq!(dataset.metadata.query, "baltic sea cable damage");
        assert_eq!(dataset.metadata.total_articles, 3);
        assert_eq!(dataset.articles.len(), 3);

        let first = &dataset.articles[0];
        assert!(first.is_displayable());
        let payload = first.article.as_ref().unwrap();
        assert_eq!(payload.source(), Some("Example News"));
        assert!(payload.updated().is_none());
        assert_eq!(first.markdown_source(), Some("# Heading\n\nBody text."));
        assert_eq!(first.extra.get("crawl_duration_ms"), Some(&Value::from(1200)));

        let second = &dataset.articles[1];
        assert!(second.article.is_none());
        assert!(second.thumbnail_url.is_none());
        assert_eq!(second.error_detail(), Some("extraction timed out"));
    }

    #[test]
    fn test_round_trip_preserves_all_fields() {
        let original: Value = serde_yaml::from_str(SAMPLE).unwrap();
        let dataset = parse(SAMPLE).unwrap();
        let written = to_yaml(&dataset).unwrap();
        let reread: Value = serde_yaml::from_str(&written).unwrap();
        assert_eq!(original, reread);
    }

    #[test]
    fn test_missing_top_level_fields_fail() {
        let no_articles = "name: x\nmetadata:\n  query: q\n  processed_at: '2025-01-01'\n  total_articles: 0\n  successful: 0\n";
        assert!(matches!(parse(no_articles), Err(Error::ParseFailure(_))));

        let no_metadata = "name: x\narticles: []\n";
        assert!(matches!(parse(no_metadata), Err(Error::ParseFailure(_))));

        let no_name = "metadata:\n  query: q\n  processed_at: '2025-01-01'\n  total_articles: 0\n  successful: 0\narticles: []\n";
        assert!(matches!(parse(no_name), Err(Error::ParseFailure(_))));
    }

    #[test]
    fn test_malformed_yaml_fails() {
        let err = parse("name: [unclosed\n").unwrap_err();
        assert!(matches!(err, Error::ParseFailure(_)));
        assert!(err.to_string().starts_with("Failed to parse dataset"));

        assert!(matches!(parse(""), Err(Error::ParseFailure(_))));
        assert!(matches!(parse("- just\n- a list\n"), Err(Error::ParseFailure(_))));
    }

    #[test]
    fn test_invalid_utf8_fails() {
        let mut bytes = b"name: \"".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b"\"\n");
        assert!(matches!(parse_slice(&bytes), Err(Error::ParseFailure(_))));
        assert!(parse_slice(SAMPLE.as_bytes()).is_ok());
    }

    #[test]
    fn test_sparse_articles_are_accepted() {
        let sparse = r#"
name: sparse
metadata:
  query: q
  processed_at: "2025-01-01"
  total_articles: 1
  successful: 0
articles:
  - url: https://only-a-url.example
"#;
        let dataset = parse(sparse).unwrap();
        let article = &dataset.articles[0];
        assert_eq!(article.original_title, "");
        assert_eq!(article.snippet(), "");
        assert_eq!(article.score(), 0.0);
        assert_eq!(article.rank(), None);
        assert!(!article.crawled());
        assert!(!article.is_displayable());
    }

    #[test]
    fn test_null_fields_read_as_absent() {
        let nulls = r#"
name: nulls
metadata:
  query: q
  processed_at: "2025-01-01"
  total_articles: 1
  successful: 1
articles:
  - url: null
    original_title: null
    original_snippet: null
    thumbnail_url: null
    relevance_score: null
    rank: null
    crawl_success: true
    extraction_success: null
    error: null
    article:
      title: null
      tags: null
      has_paywall: null
"#;
        let dataset = parse(nulls).unwrap();
        let article = &dataset.articles[0];
        assert_eq!(article.url, "");
        assert_eq!(article.original_title, "");
        assert_eq!(article.score(), 0.0);
        assert_eq!(article.rank(), None);
        assert!(article.crawled());
        assert!(!article.extracted());
        assert!(!article.is_displayable());
        let payload = article.article.as_ref().unwrap();
        assert!(payload.tags().is_none());
        assert!(!payload.paywalled());
    }

    #[test]
    fn test_round_trip_of_sparse_articles_adds_nothing() {
        let sparse = r#"
name: sparse
metadata:
  query: q
  processed_at: "2025-01-01"
  total_articles: 2
  successful: 1
articles:
  - url: https://a.example
    original_title: Integer score
    relevance_score: 8
    crawl_success: true
    extraction_success: true
    article:
      source: Wire
  - url: https://b.example
    original_title: Bare
    relevance_score: 6.5
"#;
        let original: Value = serde_yaml::from_str(sparse).unwrap();
        let dataset = parse(sparse).unwrap();
        assert_eq!(dataset.articles[0].score(), 8.0);

        let written = to_yaml(&dataset).unwrap();
        let reread: Value = serde_yaml::from_str(&written).unwrap();
        assert_eq!(original, reread);
        assert!(written.contains("relevance_score: 8\n"));
        assert!(!written.contains("rank"));
        assert!(!written.contains("has_paywall"));
        assert!(!written.contains("original_snippet"));
    }
}
