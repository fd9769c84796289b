// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Heading anchor ids.

use std::collections::HashSet;

/// Fallback id for headings with no usable characters.
pub const EMPTY_SLUG: &str = "section";

/// Turn heading text into an anchor id.
///
/// Lowercases, keeps alphanumerics, collapses runs of whitespace, `-` and `_`
/// into a single `-`, drops everything else and trims dashes from both ends.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug
    }
}

/// Issues ids that are unique within one document.
#[derive(Debug, Default)]
pub struct SlugRegistry {
    issued: HashSet<String>,
    reserved: HashSet<String>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold an explicit id so generated slugs never take it.
    pub fn reserve(&mut self, id: &str) {
        self.reserved.insert(id.to_string());
    }

    /// Claim an explicit id. A repeat gets a numeric suffix.
    pub fn claim(&mut self, id: &str) -> String {
        if self.issued.contains(id) {
            return self.unique(id);
        }
        self.issued.insert(id.to_string());
        id.to_string()
    }

    /// Issue `base`, or `base-1`, `base-2`, ... if it is taken.
    pub fn unique(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut n = 0;
        while self.is_taken(&candidate) {
            n += 1;
            candidate = format!("{base}-{n}");
        }
        self.issued.insert(candidate.clone());
        candidate
    }

    fn is_taken(&self, id: &str) -> bool {
        self.issued.contains(id) || self.reserved.contains(id)
    }
}
