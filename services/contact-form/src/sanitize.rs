// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Markup stripping for user-supplied text.

use regex::Regex;
use std::sync::OnceLock;

fn script_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid regex"))
}

fn html_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"))
}

/// Remove `<script>` blocks (with their content) and any other HTML tags,
/// then trim surrounding whitespace.
pub fn strip_markup(input: &str) -> String {
    let without_scripts = script_block().replace_all(input, "");
    let without_tags = html_tag().replace_all(&without_scripts, "");
    without_tags.trim().to_string()
}
