// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Blog content pipeline.
//!
//! Converts a post's markdown into HTML with pulldown-cmark. Every heading
//! gets a stable anchor id, headings in the configured level range form a
//! nested table of contents, and the word count gives a reading time.

pub mod slug;
pub mod toc;

use pulldown_cmark::{html as md_html, CowStr, Event, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use slug::{slugify, SlugRegistry};
pub use toc::{render_toc, TocEntry};

/// Rendering knobs for a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Shallowest heading level listed in the TOC (default: 2)
    #[serde(default = "default_toc_min_level")]
    pub toc_min_level: u8,

    /// Deepest heading level listed in the TOC (default: 3)
    #[serde(default = "default_toc_max_level")]
    pub toc_max_level: u8,

    /// Pass raw HTML blocks through instead of escaping them (default: false)
    #[serde(default)]
    pub allow_raw_html: bool,

    /// Reading speed for the reading time estimate (default: 200)
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: usize,
}

fn default_toc_min_level() -> u8 {
    2
}

fn default_toc_max_level() -> u8 {
    3
}

fn default_words_per_minute() -> usize {
    200
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            toc_min_level: default_toc_min_level(),
            toc_max_level: default_toc_max_level(),
            allow_raw_html: false,
            words_per_minute: default_words_per_minute(),
        }
    }
}

/// A rendered post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPost {
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub reading_time_minutes: usize,
}

/// A heading found while scanning the event stream.
struct HeadingSpan {
    /// Index of its `Start` event
    start: usize,
    level: u8,
    explicit_id: Option<String>,
    title: String,
}

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

/// Render a post's markdown.
pub fn render_post(markdown: &str, options: &RenderOptions) -> RenderedPost {
    let mut events: Vec<Event<'_>> = Vec::new();
    let mut headings: Vec<HeadingSpan> = Vec::new();
    let mut open: Option<HeadingSpan> = None;
    let mut words = 0usize;

    for event in Parser::new_ext(markdown, markdown_options()) {
        match &event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                open = Some(HeadingSpan {
                    start: events.len(),
                    level: *level as u8,
                    explicit_id: id
                        .as_ref()
                        .map(|id| id.trim().to_string())
                        .filter(|id| !id.is_empty()),
                    title: String::new(),
                });
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(mut heading) = open.take() {
                    heading.title = heading.title.trim().to_string();
                    headings.push(heading);
                }
            }
            Event::Text(text) | Event::Code(text) => {
                words += text.split_whitespace().count();
                if let Some(heading) = open.as_mut() {
                    heading.title.push_str(text);
                }
            }
            _ => {}
        }

        let event = match event {
            Event::Html(raw) | Event::InlineHtml(raw) if !options.allow_raw_html => {
                Event::Text(raw)
            }
            other => other,
        };
        events.push(event);
    }

    let mut registry = SlugRegistry::new();
    for heading in &headings {
        if let Some(id) = &heading.explicit_id {
            registry.reserve(id);
        }
    }

    let mut flat = Vec::new();
    for heading in &headings {
        let anchor = match &heading.explicit_id {
            Some(id) => registry.claim(id),
            None => registry.unique(&slugify(&heading.title)),
        };

        if let Some(Event::Start(Tag::Heading { id, .. })) = events.get_mut(heading.start) {
            *id = Some(CowStr::from(anchor.clone()));
        }

        if (options.toc_min_level..=options.toc_max_level).contains(&heading.level) {
            flat.push(TocEntry::new(heading.level, anchor, heading.title.clone()));
        }
    }

    let mut html = String::with_capacity(markdown.len() * 2);
    md_html::push_html(&mut html, events.into_iter());

    let reading_time_minutes = words
        .div_ceil(options.words_per_minute.max(1))
        .max(1);

    debug!(
        headings = headings.len(),
        toc_entries = flat.len(),
        words,
        "Rendered post"
    );

    RenderedPost {
        html,
        toc: toc::nest(flat),
        reading_time_minutes,
    }
}
