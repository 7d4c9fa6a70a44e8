//! HTML output for pages and for rendered article bodies.
//!
//! Every piece of dataset text goes through [`escape`]. Article bodies arrive
//! as the closed node set from `ov_core::render::markdown`, so the only markup
//! written here is the markup these functions emit themselves.

use ov_core::render::{Alignment, Block, Document, Inline};
use pulldown_cmark::escape::{escape_href, escape_html};
use url::Url;

pub const EXTERNAL_REL: &str = "noopener noreferrer";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}

pub fn push_escaped(out: &mut String, text: &str) {
    // writes into a String never fail
    let _ = escape_html(out, text);
}

/// A URL ready for a double-quoted `href` or `src` attribute.
pub fn attr_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let _ = escape_href(&mut out, url);
    out
}

/// Absolute path made of percent-encoded segments.
pub fn path_href(segments: &[&str]) -> String {
    let Ok(mut url) = Url::parse("http://viewer.invalid/") else {
        return "/".to_string();
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }
    url.path().to_string()
}

/// Link that opens in a new tab without passing a referrer.
pub fn external_link(href: &str, label: &str) -> String {
    format!(
        "<a href=\"{}\" target=\"_blank\" rel=\"{}\">{}</a>",
        attr_url(href),
        EXTERNAL_REL,
        escape(label)
    )
}

pub fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<meta name=\"referrer\" content=\"no-referrer\">\n<title>{}</title>\n<style>{}</style>\n</head>\n\
<body>\n{}\n</body>\n</html>\n",
        escape(title),
        STYLE,
        body
    )
}

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;color:#1f2328;background:#fafafa}\
header{border-bottom:1px solid #ddd;background:#fff;padding:1.5rem 2rem}\
main{padding:2rem;max-width:64rem;margin:0 auto}\
.card{background:#fff;border:1px solid #ddd;border-radius:.5rem;padding:1rem;margin-bottom:1rem}\
.card.unavailable{opacity:.75}\
.badge{display:inline-block;border:1px solid #ccc;border-radius:.75rem;padding:0 .5rem;font-size:.75rem;margin-right:.25rem}\
.badge.destructive,.failure{color:#b42318}\
.failure{background:#fef3f2;border-radius:.375rem;padding:.5rem .75rem;font-size:.8rem}\
.thumb{width:8rem;height:6rem;object-fit:cover;float:right;margin-left:1rem;border-radius:.375rem}\
.prose pre{overflow-x:auto;background:#f3f3f3;padding:1rem;border-radius:.375rem}\
.prose code{font-family:ui-monospace,monospace;font-size:.85em}\
.prose blockquote{border-left:4px solid #888;padding-left:1rem;font-style:italic;color:#555}\
.prose table{border-collapse:collapse}.prose th,.prose td{border:1px solid #ddd;padding:.5rem 1rem}\
.empty{text-align:center;padding:4rem 0;color:#666}";

/// Article body markup.
pub fn document(doc: &Document) -> String {
    let mut out = String::new();
    for block in &doc.blocks {
        push_block(&mut out, block);
    }
    out
}

fn push_block(out: &mut String, block: &Block) {
    match block {
        Block::Heading { level, content } => {
            let level = (*level).clamp(1, 6);
            out.push_str(&format!("<h{}>", level));
            push_inlines(out, content);
            out.push_str(&format!("</h{}>\n", level));
        }
        Block::Paragraph { content } => {
            out.push_str("<p>");
            push_inlines(out, content);
            out.push_str("</p>\n");
        }
        Block::List { start, items } => {
            let close = match start {
                Some(1) => {
                    out.push_str("<ol>\n");
                    "</ol>\n"
                }
                Some(n) => {
                    out.push_str(&format!("<ol start=\"{}\">\n", n));
                    "</ol>\n"
                }
                None => {
                    out.push_str("<ul>\n");
                    "</ul>\n"
                }
            };
            for item in items {
                out.push_str("<li>");
                for block in item {
                    push_block(out, block);
                }
                out.push_str("</li>\n");
            }
            out.push_str(close);
        }
        Block::BlockQuote { blocks } => {
            out.push_str("<blockquote>\n");
            for block in blocks {
                push_block(out, block);
            }
            out.push_str("</blockquote>\n");
        }
        Block::CodeBlock { language, code } => {
            match language {
                Some(lang) => out.push_str(&format!(
                    "<pre><code class=\"language-{}\">",
                    escape(lang)
                )),
                None => out.push_str("<pre><code>"),
            }
            push_escaped(out, code);
            out.push_str("</code></pre>\n");
        }
        Block::Table {
            alignments,
            head,
            rows,
        } => {
            out.push_str("<div class=\"table\"><table>\n<thead><tr>");
            for (i, cell) in head.iter().enumerate() {
                push_cell(out, "th", alignments.get(i), cell);
            }
            out.push_str("</tr></thead>\n<tbody>\n");
            for row in rows {
                out.push_str("<tr>");
                for (i, cell) in row.iter().enumerate() {
                    push_cell(out, "td", alignments.get(i), cell);
                }
                out.push_str("</tr>\n");
            }
            out.push_str("</tbody>\n</table></div>\n");
        }
        Block::Rule => out.push_str("<hr>\n"),
    }
}

fn push_cell(out: &mut String, tag: &str, alignment: Option<&Alignment>, content: &[Inline]) {
    let style = match alignment {
        Some(Alignment::Left) => " style=\"text-align:left\"",
        Some(Alignment::Center) => " style=\"text-align:center\"",
        Some(Alignment::Right) => " style=\"text-align:right\"",
        _ => "",
    };
    out.push_str(&format!("<{}{}>", tag, style));
    push_inlines(out, content);
    out.push_str(&format!("</{}>", tag));
}

fn push_inlines(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        match inline {
            Inline::Text { text } => push_escaped(out, text),
            Inline::Code { code } => {
                out.push_str("<code>");
                push_escaped(out, code);
                out.push_str("</code>");
            }
            Inline::Emphasis { content } => push_wrapped(out, "em", content),
            Inline::Strong { content } => push_wrapped(out, "strong", content),
            Inline::Strikethrough { content } => push_wrapped(out, "del", content),
            Inline::Link {
                href,
                title,
                content,
            } => {
                out.push_str(&format!("<a href=\"{}\"", attr_url(href)));
                if let Some(title) = title {
                    out.push_str(&format!(" title=\"{}\"", escape(title)));
                }
                out.push_str(&format!(" target=\"_blank\" rel=\"{}\">", EXTERNAL_REL));
                push_inlines(out, content);
                out.push_str("</a>");
            }
            Inline::SoftBreak => out.push('\n'),
            Inline::HardBreak => out.push_str("<br>\n"),
        }
    }
}

fn push_wrapped(out: &mut String, tag: &str, content: &[Inline]) {
    out.push_str(&format!("<{}>", tag));
    push_inlines(out, content);
    out.push_str(&format!("</{}>", tag));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<a href=\"x\">Tom & 'Jerry'</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; 'Jerry'&lt;/a&gt;"
        );
    }

    #[test]
    fn test_attr_url() {
        assert_eq!(
            attr_url("https://example.com/?q=a&b=\"c\""),
            "https://example.com/?q=a&amp;b=%22c%22"
        );
        assert_eq!(attr_url("/articles/my%20data.yaml"), "/articles/my%20data.yaml");
        assert_eq!(attr_url("https://example.com/<x>"), "https://example.com/%3Cx%3E");
    }

    #[test]
    fn test_path_href_encodes_segments() {
        assert_eq!(path_href(&["articles", "my data.yaml"]), "/articles/my%20data.yaml");
        assert_eq!(path_href(&["articles", "a/b.yaml", "3"]), "/articles/a%2Fb.yaml/3");
        assert_eq!(path_href(&[]), "/");
    }

    #[test]
    fn test_document_markup() {
        let doc = Document::parse(
            "# Title\n\nSee [the source](https://example.com?a=1&b=2) and `x<y`.\n\n\
<script>alert(1)</script>\n\n- one\n\n| h |\n|---|\n| <b>v</b> |\n",
        );
        let html = document(&doc);
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains(
            "<a href=\"https://example.com?a=1&amp;b=2\" target=\"_blank\" rel=\"noopener noreferrer\">the source</a>"
        ));
        assert!(html.contains("<code>x&lt;y</code>"));
        assert!(html.contains("<ul>\n<li><p>one</p>\n</li>\n</ul>"));
        assert!(html.contains("<th>h</th>"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_code_block_is_escaped() {
        let doc = Document::parse("```html\n<script>alert(1)</script>\n```\n");
        assert_eq!(
            document(&doc),
            "<pre><code class=\"language-html\">&lt;script&gt;alert(1)&lt;/script&gt;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_ordered_list_start() {
        let doc = Document::parse("3. three\n4. four\n");
        let html = document(&doc);
        assert!(html.starts_with("<ol start=\"3\">"));
    }
}
