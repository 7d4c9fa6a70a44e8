//! Markdown to a closed set of formatting nodes.
//!
//! Extracted article bodies are untrusted. Parsing goes through
//! `pulldown-cmark` and only the node kinds listed in [`Block`] and
//! [`Inline`] are kept: raw HTML is dropped, link targets are limited to web,
//! mail and relative references, and images become plain links.

use pulldown_cmark::{Alignment as CmarkAlignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};
use serde::Serialize;
use tracing::trace;
use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph { content: Vec<Inline> },
    List { start: Option<u64>, items: Vec<Vec<Block>> },
    BlockQuote { blocks: Vec<Block> },
    CodeBlock { language: Option<String>, code: String },
    Table {
        alignments: Vec<Alignment>,
        head: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
    Rule,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    Text { text: String },
    Code { code: String },
    Emphasis { content: Vec<Inline> },
    Strong { content: Vec<Inline> },
    Strikethrough { content: Vec<Inline> },
    Link { href: String, title: Option<String>, content: Vec<Inline> },
    SoftBreak,
    HardBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

impl From<CmarkAlignment> for Alignment {
    fn from(value: CmarkAlignment) -> Self {
        match value {
            CmarkAlignment::None => Alignment::None,
            CmarkAlignment::Left => Alignment::Left,
            CmarkAlignment::Center => Alignment::Center,
            CmarkAlignment::Right => Alignment::Right,
        }
    }
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text { text: text.into() }
    }
}

/// Concatenated text of a run of inlines, without formatting.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    collect_text(inlines, &mut out);
    out
}

fn collect_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text { text } => out.push_str(text),
            Inline::Code { code } => out.push_str(code),
            Inline::Emphasis { content }
            | Inline::Strong { content }
            | Inline::Strikethrough { content }
            | Inline::Link { content, .. } => collect_text(content, out),
            Inline::SoftBreak | Inline::HardBreak => out.push(' '),
        }
    }
}

/// Returns the link target when it is safe to navigate to: `http`, `https`
/// and `mailto` URLs, or references relative to the current page.
pub fn safe_href(dest: &str) -> Option<String> {
    let dest = dest.trim();
    if dest.is_empty() {
        return None;
    }
    match Url::parse(dest) {
        Ok(url) => matches!(url.scheme(), "http" | "https" | "mailto").then(|| dest.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => Some(dest.to_string()),
        Err(_) => None,
    }
}

impl Document {
    pub fn parse(source: &str) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let mut builder = Builder::new();
        for event in Parser::new_ext(source, options) {
            builder.event(event);
        }
        Document {
            blocks: builder.finish(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
enum SpanKind {
    Emphasis,
    Strong,
    Strikethrough,
}

enum Frame {
    Root(Vec<Block>),
    Paragraph(Vec<Inline>),
    Heading(u8, Vec<Inline>),
    BlockQuote(Vec<Block>),
    CodeBlock(Option<String>, String),
    List(Option<u64>, Vec<Vec<Block>>),
    // Tight list items carry inlines without a paragraph around them.
    Item(Vec<Block>, Vec<Inline>),
    Table(Vec<Alignment>, Vec<Vec<Inline>>, Vec<Vec<Vec<Inline>>>),
    Row(bool, Vec<Vec<Inline>>),
    Cell(Vec<Inline>),
    Span(SpanKind, Vec<Inline>),
    Link(Option<String>, Option<String>, Vec<Inline>),
    Image(Option<String>, Option<String>, Vec<Inline>),
    Dropped,
}

enum Node {
    Block(Block),
    Inlines(Vec<Inline>),
    Item(Vec<Block>),
    Row(bool, Vec<Vec<Inline>>),
    Cell(Vec<Inline>),
    Nothing,
}

struct Builder {
    stack: Vec<Frame>,
}

impl Builder {
    fn new() -> Self {
        Self {
            stack: vec![Frame::Root(Vec::new())],
        }
    }

    fn finish(mut self) -> Vec<Block> {
        while self.stack.len() > 1 {
            self.close();
        }
        match self.stack.pop() {
            Some(Frame::Root(blocks)) => blocks,
            _ => Vec::new(),
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(_) => self.close(),
            Event::Text(text) => self.push_inline(Inline::text(text.into_string())),
            Event::Code(code) => self.push_inline(Inline::Code {
                code: code.into_string(),
            }),
            Event::Html(html) => trace!("Dropping raw HTML ({} bytes)", html.len()),
            Event::FootnoteReference(label) => self.push_inline(Inline::text(format!("[{}]", &*label))),
            Event::SoftBreak => self.push_inline(Inline::SoftBreak),
            Event::HardBreak => self.push_inline(Inline::HardBreak),
            Event::Rule => self.push_block(Block::Rule),
            Event::TaskListMarker(checked) => {
                self.push_inline(Inline::text(if checked { "[x] " } else { "[ ] " }))
            }
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph(Vec::new()),
            Tag::Heading(level, _, _) => Frame::Heading(heading_level(level), Vec::new()),
            Tag::BlockQuote => Frame::BlockQuote(Vec::new()),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                Frame::CodeBlock(language, String::new())
            }
            Tag::List(start) => Frame::List(start, Vec::new()),
            Tag::Item => Frame::Item(Vec::new(), Vec::new()),
            Tag::Table(alignments) => Frame::Table(
                alignments.into_iter().map(Alignment::from).collect(),
                Vec::new(),
                Vec::new(),
            ),
            Tag::TableHead => Frame::Row(true, Vec::new()),
            Tag::TableRow => Frame::Row(false, Vec::new()),
            Tag::TableCell => Frame::Cell(Vec::new()),
            Tag::Emphasis => Frame::Span(SpanKind::Emphasis, Vec::new()),
            Tag::Strong => Frame::Span(SpanKind::Strong, Vec::new()),
            Tag::Strikethrough => Frame::Span(SpanKind::Strikethrough, Vec::new()),
            Tag::Link(_, dest, title) => Frame::Link(safe_href(&dest), non_empty(&title), Vec::new()),
            Tag::Image(_, dest, title) => Frame::Image(safe_href(&dest), non_empty(&title), Vec::new()),
            Tag::FootnoteDefinition(_) => Frame::Dropped,
        };
        self.stack.push(frame);
    }

    fn close(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let node = match self.stack.pop() {
            Some(frame) => into_node(frame),
            None => return,
        };
        self.deliver(node);
    }

    fn deliver(&mut self, node: Node) {
        match node {
            Node::Block(block) => self.push_block(block),
            Node::Inlines(inlines) => {
                for inline in inlines {
                    self.push_inline(inline);
                }
            }
            Node::Item(blocks) => match self.stack.last_mut() {
                Some(Frame::List(_, items)) => items.push(blocks),
                _ => {
                    for block in blocks {
                        self.push_block(block);
                    }
                }
            },
            Node::Row(is_head, cells) => {
                if let Some(Frame::Table(_, head, rows)) = self.stack.last_mut() {
                    if is_head {
                        *head = cells;
                    } else {
                        rows.push(cells);
                    }
                }
            }
            Node::Cell(cell) => match self.stack.last_mut() {
                Some(Frame::Row(_, cells)) => cells.push(cell),
                _ => self.deliver(Node::Inlines(cell)),
            },
            Node::Nothing => {}
        }
    }

    fn push_block(&mut self, block: Block) {
        match self.stack.last_mut() {
            Some(Frame::Root(blocks)) | Some(Frame::BlockQuote(blocks)) => blocks.push(block),
            Some(Frame::Item(blocks, inlines)) => {
                flush_inlines(blocks, inlines);
                blocks.push(block);
            }
            _ => {}
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        match self.stack.last_mut() {
            Some(Frame::CodeBlock(_, code)) => {
                if let Inline::Text { text } = inline {
                    code.push_str(&text);
                }
            }
            Some(Frame::Paragraph(content))
            | Some(Frame::Heading(_, content))
            | Some(Frame::Cell(content))
            | Some(Frame::Span(_, content))
            | Some(Frame::Link(_, _, content))
            | Some(Frame::Image(_, _, content))
            | Some(Frame::Item(_, content)) => append_inline(content, inline),
            Some(Frame::Root(blocks)) | Some(Frame::BlockQuote(blocks)) => {
                blocks.push(Block::Paragraph {
                    content: vec![inline],
                })
            }
            _ => {}
        }
    }
}

fn into_node(frame: Frame) -> Node {
    match frame {
        Frame::Root(_) | Frame::Dropped => Node::Nothing,
        Frame::BlockQuote(blocks) => Node::Block(Block::BlockQuote { blocks }),
        Frame::Paragraph(content) => Node::Block(Block::Paragraph { content }),
        Frame::Heading(level, content) => Node::Block(Block::Heading { level, content }),
        Frame::CodeBlock(language, code) => Node::Block(Block::CodeBlock { language, code }),
        Frame::List(start, items) => Node::Block(Block::List { start, items }),
        Frame::Item(mut blocks, mut inlines) => {
            flush_inlines(&mut blocks, &mut inlines);
            Node::Item(blocks)
        }
        Frame::Table(alignments, head, rows) => Node::Block(Block::Table {
            alignments,
            head,
            rows,
        }),
        Frame::Row(is_head, cells) => Node::Row(is_head, cells),
        Frame::Cell(content) => Node::Cell(content),
        Frame::Span(kind, content) => Node::Inlines(vec![match kind {
            SpanKind::Emphasis => Inline::Emphasis { content },
            SpanKind::Strong => Inline::Strong { content },
            SpanKind::Strikethrough => Inline::Strikethrough { content },
        }]),
        Frame::Link(Some(href), title, content) => Node::Inlines(vec![Inline::Link {
            href,
            title,
            content,
        }]),
        Frame::Link(None, _, content) => Node::Inlines(content),
        Frame::Image(Some(href), title, alt) => {
            let label = plain_text(&alt);
            let label = if label.trim().is_empty() {
                "image".to_string()
            } else {
                label
            };
            Node::Inlines(vec![Inline::Link {
                href,
                title,
                content: vec![Inline::text(label)],
            }])
        }
        Frame::Image(None, _, alt) => Node::Inlines(alt),
    }
}

fn append_inline(content: &mut Vec<Inline>, inline: Inline) {
    if let Inline::Text { text } = &inline {
        if let Some(Inline::Text { text: last }) = content.last_mut() {
            last.push_str(text);
            return;
        }
    }
    content.push(inline);
}

fn flush_inlines(blocks: &mut Vec<Block>, inlines: &mut Vec<Inline>) {
    if !inlines.is_empty() {
        blocks.push(Block::Paragraph {
            content: std::mem::take(inlines),
        });
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
