use crate::types::{Article, Dataset};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Derives the display view of a dataset.
///
/// The view holds only displayable articles, ordered by relevance score from
/// highest to lowest (equal scores keep their stored order), with the summary
/// counts recomputed from what remains. The input is left untouched.
pub fn derive_view(dataset: &Dataset) -> Dataset {
    let mut articles: Vec<Article> = dataset
        .articles
        .iter()
        .filter(|article| article.is_displayable())
        .cloned()
        .collect();
    // sort_by is stable
    articles.sort_by(|a, b| compare_relevance(b, a));

    let mut view = Dataset {
        name: dataset.name.clone(),
        metadata: dataset.metadata.clone(),
        articles,
        extra: dataset.extra.clone(),
    };
    view.metadata.total_articles = view.articles.len();
    view.metadata.successful = view.displayable_count();
    view
}

/// Ascending relevance order. NaN ranks below every real score.
fn compare_relevance(a: &Article, b: &Article) -> Ordering {
    sort_key(a.score()).total_cmp(&sort_key(b.score()))
}

fn sort_key(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score
    }
}

/// Identifies an article inside one view. URLs repeat within a dataset, so
/// the position is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ArticleKey {
    pub url: String,
    pub index: usize,
}

impl fmt::Display for ArticleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.url, self.index)
    }
}

/// Pairs every article of `dataset` with its key.
pub fn keyed_articles(dataset: &Dataset) -> impl Iterator<Item = (ArticleKey, &Article)> {
    dataset.articles.iter().enumerate().map(|(index, article)| {
        (
            ArticleKey {
                url: article.url.clone(),
                index,
            },
            article,
        )
    })
}
