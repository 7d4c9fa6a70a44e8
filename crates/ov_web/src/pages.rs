use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
};
use ov_core::render::{render_article, ArticleBody, FailureReason, MetadataSection};
use ov_core::{keyed_articles, Article, ArticleKey, Dataset, Error};
use std::sync::Arc;
use crate::handlers::{error_status, ArticleQuery};
use crate::html::{self, attr_url, escape, external_link, path_href};
use crate::AppState;

type Page = (StatusCode, Html<String>);

#[derive(Debug, Default, serde::Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub all: bool,
}

pub async fn index(State(state): State<Arc<AppState>>) -> Page {
    let entries = state.store.list_datasets().await;
    let mut body = String::from(
        "<header><h1>OSINT Articles</h1>\
<p>Browse analyzed news articles from various data sources</p></header>\n<main>\n",
    );
    if entries.is_empty() {
        body.push_str(
            "<div class=\"empty\"><h2>No data files found</h2>\
<p>Add YAML files to the data directory to get started</p></div>\n",
        );
    } else {
        body.push_str(&format!("<h2>Available Data Files ({})</h2>\n", entries.len()));
        for entry in &entries {
            let meta = &entry.dataset.metadata;
            body.push_str(&format!(
                "<a class=\"card\" href=\"{}\"><h3>{}</h3>\
<p>{}</p><p><strong>Query</strong> {}</p>\
<span class=\"badge\">{} articles</span><span class=\"badge\">{} successful</span></a>\n",
                attr_url(&path_href(&["articles", &entry.filename])),
                escape(&entry.dataset.name),
                escape(&meta.processed_at.long_date()),
                escape(&meta.query),
                meta.total_articles,
                meta.successful,
            ));
        }
    }
    body.push_str("</main>");
    (StatusCode::OK, Html(html::layout("OSINT Articles", &body)))
}

pub async fn dataset(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    Query(query): Query<ListQuery>,
) -> Page {
    match state.load_articles(&filename, query.all).await {
        Ok(dataset) => (StatusCode::OK, Html(dataset_page(&filename, &dataset))),
        Err(e) => error_page(&e),
    }
}

pub async fn article(
    State(state): State<Arc<AppState>>,
    Path((filename, index)): Path<(String, usize)>,
    Query(query): Query<ArticleQuery>,
) -> Page {
    let dataset = match state.load_articles(&filename, query.all).await {
        Ok(dataset) => dataset,
        Err(e) => return error_page(&e),
    };
    let found = keyed_articles(&dataset).nth(index);
    match found {
        Some((key, article)) => (
            StatusCode::OK,
            Html(article_page(&filename, &dataset, &key, article, query)),
        ),
        None => error_page(&Error::NotFound(format!("{} article {}", filename, index))),
    }
}

/// Same page for every load failure; the cause stays in the logs.
fn error_page(error: &Error) -> Page {
    let body = "<header><a href=\"/\">&larr; Back to Home</a></header>\n<main><div class=\"empty\">\
<h2>Error loading data</h2><p>Could not load this dataset</p></div></main>";
    (error_status(error), Html(html::layout("Error loading data", body)))
}

fn dataset_page(filename: &str, dataset: &Dataset) -> String {
    let meta = &dataset.metadata;
    let mut body = format!(
        "<header><nav><a href=\"/\">Home</a> / {name}</nav><h1>{name}</h1>\
<p><strong>Query:</strong> {query} &middot; <strong>Total Articles:</strong> {total} \
&middot; <strong>Successful:</strong> {successful}</p></header>\n<main>\n",
        name = escape(&dataset.name),
        query = escape(&meta.query),
        total = meta.total_articles,
        successful = meta.successful,
    );
    if dataset.articles.is_empty() {
        body.push_str(
            "<div class=\"empty\"><h2>No articles found</h2>\
<p>This data file does not contain any articles</p></div>\n",
        );
    } else {
        body.push_str(&format!("<h2>Articles ({})</h2>\n", dataset.articles.len()));
        for (key, article) in keyed_articles(dataset) {
            body.push_str(&article_card(filename, &key, article));
        }
    }
    body.push_str("</main>");
    html::layout(&dataset.name, &body)
}

fn article_card(filename: &str, key: &ArticleKey, article: &Article) -> String {
    let index = key.index.to_string();
    let failure = FailureReason::of(article);
    let mut card = format!(
        "<article class=\"card{}\" id=\"{}\" aria-label=\"Article: {}{}\">\n",
        if failure.is_some() { " unavailable" } else { "" },
        escape(&key.to_string()),
        escape(&article.original_title),
        if failure.is_some() { " (unavailable)" } else { "" },
    );
    if let Some(thumbnail) = article.thumbnail() {
        card.push_str(&format!(
            "<img class=\"thumb\" src=\"{}\" alt=\"{}\" loading=\"lazy\" referrerpolicy=\"no-referrer\">\n",
            attr_url(thumbnail),
            escape(&article.original_title),
        ));
    }
    let title = escape(&article.original_title);
    match failure {
        None => {
            let href = path_href(&["articles", filename, &index]);
            card.push_str(&format!(
                "<h3><a href=\"{}\">{}</a></h3>\n<p><a href=\"{}?mode=metadata\">Details</a> &middot; {}</p>\n",
                attr_url(&href),
                title,
                attr_url(&href),
                external_link(&article.url, "Open article in new tab"),
            ));
        }
        Some(reason) => {
            card.push_str(&format!(
                "<h3>{}</h3>\n<p>{}</p>\n<div class=\"failure\">{}</div>\n",
                title,
                external_link(&article.url, "Open article in new tab"),
                escape(reason.label()),
            ));
        }
    }
    card.push_str(&format!("<p>{}</p>\n", escape(article.snippet())));
    card.push_str(&format!(
        "<p>Relevance <span class=\"badge\">{:.2}</span> \
<progress max=\"100\" value=\"{:.0}\"></progress>",
        article.score(),
        article.relevance_percent(),
    ));
    if let Some(source) = article.source() {
        card.push_str(&format!(" <span class=\"badge\">{}</span>", escape(source)));
    }
    if let Some(rank) = article.rank() {
        card.push_str(&format!(" <span class=\"badge\">#{}</span>", rank));
    }
    if failure.is_some() {
        card.push_str(" <span class=\"badge destructive\">Unavailable</span>");
    }
    card.push_str("</p>\n</article>\n");
    card
}

fn article_page(
    filename: &str,
    dataset: &Dataset,
    key: &ArticleKey,
    article: &Article,
    query: ArticleQuery,
) -> String {
    let dataset_href = path_href(&["articles", filename]);
    let mut body = format!(
        "<header><nav><a href=\"/\">Home</a> / <a href=\"{}\">{}</a></nav><h1>{}</h1><p>",
        attr_url(&dataset_href),
        escape(&dataset.name),
        escape(&article.original_title),
    );
    match article.source() {
        Some(source) => body.push_str(&format!("<span class=\"badge\">{}</span> ", escape(source))),
        None if !article.is_displayable() => {
            body.push_str("<span class=\"badge destructive\">Unavailable</span> ")
        }
        None => {}
    }
    body.push_str(&external_link(&article.url, "View original article"));
    body.push_str("</p>");

    let rendered = render_article(article, query.mode.unwrap_or_default());
    if rendered.mode().is_some() {
        let base = path_href(&["articles", filename, &key.index.to_string()]);
        let suffix = if query.all { "&all=true" } else { "" };
        body.push_str(&format!(
            "<p><a href=\"{base}?mode=body{suffix}\">Article</a> &middot; \
<a href=\"{base}?mode=metadata{suffix}\">Details</a></p>",
            base = attr_url(&base),
            suffix = escape(suffix),
        ));
    }
    body.push_str("</header>\n<main class=\"prose\">\n");

    match &rendered {
        ArticleBody::Body { document } => body.push_str(&html::document(document)),
        ArticleBody::Metadata { sections } => body.push_str(&metadata_markup(sections)),
        ArticleBody::Failure { reason, detail } => {
            body.push_str(&format!(
                "<div class=\"empty\"><h3 class=\"failure\">Content Unavailable</h3><p>{}</p>",
                escape(reason.detail())
            ));
            if let Some(detail) = detail {
                body.push_str(&format!(
                    "<details><summary>Show error details</summary><pre>{}</pre></details>",
                    escape(detail)
                ));
            }
            body.push_str(
                "<p>You can still view the original article using the link above.</p></div>",
            );
        }
    }
    body.push_str("\n</main>");
    html::layout(&article.original_title, &body)
}

fn metadata_markup(sections: &[MetadataSection<'_>]) -> String {
    let mut out = String::new();
    for section in sections {
        out.push_str(&format!("<section><h4>{}</h4>", section.title()));
        match section {
            MetadataSection::Summary(text)
            | MetadataSection::Source(text)
            | MetadataSection::ContentType(text) => {
                out.push_str(&format!("<p>{}</p>", escape(text)))
            }
            MetadataSection::Published(text)
            | MetadataSection::Updated(text)
            | MetadataSection::Authors(text) => out.push_str(&format!("<p>{}</p>", escape(text))),
            MetadataSection::Categories(items) | MetadataSection::Tags(items) => {
                for item in items.iter() {
                    out.push_str(&format!("<span class=\"badge\">{}</span>", escape(item)));
                }
            }
            MetadataSection::KeyPoints(items) | MetadataSection::Entities(items) => {
                out.push_str("<ul>");
                for item in items.iter() {
                    out.push_str(&format!("<li>{}</li>", escape(item)));
                }
                out.push_str("</ul>");
            }
            MetadataSection::Paywall => out.push_str("<p>This article is behind a paywall.</p>"),
        }
        out.push_str("</section>\n");
    }
    out
}
