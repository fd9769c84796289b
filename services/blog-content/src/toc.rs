// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Table of contents.

use maud::{html, Markup};
use serde::Serialize;

/// One heading in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub level: u8,
    pub id: String,
    pub title: String,
    pub children: Vec<TocEntry>,
}

impl TocEntry {
    pub fn new(level: u8, id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            level,
            id: id.into(),
            title: title.into(),
            children: Vec::new(),
        }
    }
}

/// Nest a flat, document-ordered list of headings by level.
///
/// A heading becomes a child of the nearest preceding heading with a smaller
/// level; otherwise it is a sibling at the deepest level that allows it.
pub fn nest(flat: Vec<TocEntry>) -> Vec<TocEntry> {
    let mut roots = Vec::new();
    for entry in flat {
        insert(&mut roots, entry);
    }
    roots
}

fn insert(siblings: &mut Vec<TocEntry>, entry: TocEntry) {
    match siblings.last_mut() {
        Some(last) if last.level < entry.level => insert(&mut last.children, entry),
        _ => siblings.push(entry),
    }
}

/// Render entries as nested `<ul class="toc">` lists of anchor links.
pub fn render_toc(entries: &[TocEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    toc_list(entries).into_string()
}

fn toc_list(entries: &[TocEntry]) -> Markup {
    html! {
        ul class="toc" {
            @for entry in entries {
                li {
                    a href=(format!("#{}", entry.id)) { (entry.title) }
                    @if !entry.children.is_empty() {
                        (toc_list(&entry.children))
                    }
                }
            }
        }
    }
}
