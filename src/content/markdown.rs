//! Markdown rendering for point articles.
//!
//! `render_html` produces the HTML kept in the content cache. The egui
//! front end cannot show HTML, so `blocks` flattens the same document into
//! styled runs it can lay out directly.

use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options
}

/// Renders Markdown to HTML. The source is trusted; nothing is sanitized.
pub fn render_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// A run of text sharing one style
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Span {
    pub text: String,
    pub strong: bool,
    pub emphasis: bool,
    pub strikethrough: bool,
    pub code: bool,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, spans: Vec<Span> },
    Paragraph(Vec<Span>),
    ListItem { depth: usize, marker: String, spans: Vec<Span> },
    Quote(Vec<Span>),
    Code(String),
    Image { url: String, alt: String },
    TableRow { cells: Vec<String>, header: bool },
    Rule,
}

#[derive(Default)]
struct Style {
    strong: usize,
    emphasis: usize,
    strikethrough: usize,
    link: Option<String>,
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

/// Flattens a document into display blocks
pub fn blocks(markdown: &str) -> Vec<Block> {
    let mut out = Vec::new();
    let mut spans: Vec<Span> = Vec::new();
    let mut style = Style::default();
    // Next number of each open list; `None` for bullet lists
    let mut lists: Vec<Option<u64>> = Vec::new();
    let mut item_marker = String::new();
    let mut in_quote = false;
    let mut code: Option<String> = None;
    let mut image: Option<(String, String)> = None;
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_head = false;
    let mut in_cell = false;

    let push_text = |spans: &mut Vec<Span>, style: &Style, text: &str, code: bool| {
        spans.push(Span {
            text: text.to_string(),
            strong: style.strong > 0,
            emphasis: style.emphasis > 0,
            strikethrough: style.strikethrough > 0,
            code,
            link: style.link.clone(),
        });
    };

    for event in Parser::new_ext(markdown, options()) {
        match event {
            Event::Start(Tag::Strong) => style.strong += 1,
            Event::End(TagEnd::Strong) => style.strong = style.strong.saturating_sub(1),
            Event::Start(Tag::Emphasis) => style.emphasis += 1,
            Event::End(TagEnd::Emphasis) => style.emphasis = style.emphasis.saturating_sub(1),
            Event::Start(Tag::Strikethrough) => style.strikethrough += 1,
            Event::End(TagEnd::Strikethrough) => {
                style.strikethrough = style.strikethrough.saturating_sub(1)
            }
            Event::Start(Tag::Link { dest_url, .. }) => style.link = Some(dest_url.to_string()),
            Event::End(TagEnd::Link) => style.link = None,

            Event::Start(Tag::Image { dest_url, .. }) => {
                image = Some((dest_url.to_string(), String::new()));
            }
            Event::End(TagEnd::Image) => {
                if let Some((url, alt)) = image.take() {
                    if !spans.is_empty() {
                        out.push(Block::Paragraph(std::mem::take(&mut spans)));
                    }
                    out.push(Block::Image { url, alt });
                }
            }

            Event::Start(Tag::BlockQuote) => in_quote = true,
            Event::End(TagEnd::BlockQuote) => in_quote = false,

            Event::Start(Tag::List(start)) => {
                // The parent item's text comes before its nested list
                if !spans.is_empty() && !lists.is_empty() {
                    out.push(Block::ListItem {
                        depth: lists.len() - 1,
                        marker: std::mem::take(&mut item_marker),
                        spans: std::mem::take(&mut spans),
                    });
                }
                lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                lists.pop();
            }
            Event::Start(Tag::Item) => {
                if !spans.is_empty() {
                    out.push(Block::Paragraph(std::mem::take(&mut spans)));
                }
                item_marker = match lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}.", n);
                        *n += 1;
                        marker
                    }
                    _ => "•".to_string(),
                };
            }
            Event::End(TagEnd::Item) => {
                if !spans.is_empty() {
                    out.push(Block::ListItem {
                        depth: lists.len().saturating_sub(1),
                        marker: std::mem::take(&mut item_marker),
                        spans: std::mem::take(&mut spans),
                    });
                }
            }

            Event::End(TagEnd::Paragraph) => {
                // Paragraphs inside list items are flushed by the item
                if lists.is_empty() && !spans.is_empty() {
                    let spans = std::mem::take(&mut spans);
                    out.push(if in_quote {
                        Block::Quote(spans)
                    } else {
                        Block::Paragraph(spans)
                    });
                }
            }
            Event::End(TagEnd::Heading(level)) => out.push(Block::Heading {
                level: heading_level(level),
                spans: std::mem::take(&mut spans),
            }),

            Event::Start(Tag::CodeBlock(_)) => code = Some(String::new()),
            Event::End(TagEnd::CodeBlock) => {
                if let Some(text) = code.take() {
                    out.push(Block::Code(text.trim_end_matches('\n').to_string()));
                }
            }

            Event::Start(Tag::TableHead) => in_head = true,
            Event::End(TagEnd::TableHead) => {
                out.push(Block::TableRow {
                    cells: std::mem::take(&mut row),
                    header: true,
                });
                in_head = false;
            }
            Event::End(TagEnd::TableRow) => out.push(Block::TableRow {
                cells: std::mem::take(&mut row),
                header: in_head,
            }),
            Event::Start(Tag::TableCell) => in_cell = true,
            Event::End(TagEnd::TableCell) => {
                row.push(std::mem::take(&mut cell));
                in_cell = false;
            }

            Event::Text(text) => {
                if let Some(buf) = code.as_mut() {
                    buf.push_str(&text);
                } else if let Some((_, alt)) = image.as_mut() {
                    alt.push_str(&text);
                } else if in_cell {
                    cell.push_str(&text);
                } else {
                    push_text(&mut spans, &style, &text, false);
                }
            }
            Event::Code(text) => {
                if in_cell {
                    cell.push_str(&text);
                } else {
                    push_text(&mut spans, &style, &text, true);
                }
            }
            Event::SoftBreak => push_text(&mut spans, &style, " ", false),
            Event::HardBreak => push_text(&mut spans, &style, "\n", false),
            Event::Rule => out.push(Block::Rule),
            _ => {}
        }
    }

    if !spans.is_empty() {
        out.push(Block::Paragraph(spans));
    }
    out
}
