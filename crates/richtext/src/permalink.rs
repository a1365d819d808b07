//! Permalink placeholders: extraction at save time, rewriting at render time.
//!
//! A permalink is an anchor whose href encodes a cross-document reference:
//! `href="#apostrophe-permalink-<id>[?updateTitle=1]"`. The wire format is
//! fixed and must survive bit-exact in stored markup; only the transient
//! render-time copy ever carries the resolved url.

use serde::{Deserialize, Serialize};

use crate::text::html_escape;

/// Literal scanned for inside markup. The leading `#` is part of the href
/// value, not the needle, so the scan also matches hrefs that a browser has
/// already resolved against a base url.
pub const PERMALINK_NEEDLE: &str = "apostrophe-permalink-";

/// Placeholder start as it appears inside a quoted href attribute.
const PLACEHOLDER_START: &str = "\"#apostrophe-permalink-";

/// Query flag requesting that the anchor text track the target's title.
const UPDATE_TITLE_FLAG: &str = "?updateTitle=1";

/// A document a permalink resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermalinkTarget {
    pub id: String,
    pub title: String,
    pub url: String,
}

/// A resolved target paired with the editability of the widget occurrence
/// being rendered. When the widget is open for direct editing the href is
/// left as the placeholder so further edits do not lose it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPermalink {
    pub target: PermalinkTarget,
    pub editable: bool,
}

/// Collect the permalink ids referenced by sanitized markup.
///
/// Best-effort: a placeholder with an empty id segment contributes nothing,
/// and duplicates are preserved (callers dedupe when resolving).
pub fn extract_ids(html: &str) -> Vec<String> {
    let mut ids = Vec::new();
    let mut offset = 0;
    while let Some(found) = html[offset..].find(PLACEHOLDER_START) {
        let start = offset + found + PLACEHOLDER_START.len();
        offset = start;
        let Some(len) = html[start..].find(['"', '?']) else {
            // unterminated attribute value
            break;
        };
        if len > 0 {
            ids.push(html[start..start + len].to_string());
        }
    }
    ids
}

/// Rewrite permalink placeholders in rendered markup.
///
/// Operates by direct substring search rather than an HTML parse because
/// this runs on every page render for potentially many widgets. For each
/// resolved target the scan finds every literal occurrence of its
/// placeholder, advancing a cursor past the match before any splicing so
/// the loop terminates even on malformed or overlapping markup. Occurrences
/// whose structural landmarks (`<`, ` href="`, closing `"`, `>`) cannot be
/// located are left untouched and the scan continues. A match that does not
/// sit inside the located href value (e.g. the id appearing in anchor text)
/// is treated the same way; splicing there would corrupt the markup and
/// rewind the cursor.
///
/// The input is never mutated; a derived copy is returned.
pub fn rewrite(html: &str, resolved: &[ResolvedPermalink]) -> String {
    let mut content = html.to_string();
    for permalink in resolved {
        let needle = format!("{PERMALINK_NEEDLE}{}", permalink.target.id);
        let mut offset = 0;
        while let Some(found) = content[offset..].find(&needle) {
            let start = offset + found;
            let end = start + needle.len();
            // Guaranteed advance, before any rewriting.
            offset = end;

            let update_title = content[end..].starts_with(UPDATE_TITLE_FLAG);

            // Landmarks of the enclosing anchor open tag.
            let Some(left) = content[..start].rfind('<') else {
                continue;
            };
            let Some(href) = content[left..].find(" href=\"").map(|p| left + p) else {
                continue;
            };
            let value_start = href + " href=\"".len();
            let Some(close) = content[value_start..].find('"').map(|p| value_start + p) else {
                continue;
            };

            // The match must lie inside the href value; only then is the
            // post-splice fast-forward below ahead of the match.
            if start < value_start || close < end {
                continue;
            }

            // Index of the href value's closing quote, kept valid across
            // the splice.
            let mut after_href = close;
            if !permalink.editable {
                content.replace_range(value_start..close, &permalink.target.url);
                after_href = value_start + permalink.target.url.len();
                // resume just past the rewritten value's closing quote
                offset = after_href + 1;
            }

            // Title replacement applies whether or not the widget is
            // editable; only the href is pinned to the placeholder.
            if update_title {
                let Some(right) = content[after_href..].find('>').map(|p| after_href + p)
                else {
                    continue;
                };
                let Some(next_left) = content[right + 1..].find('<').map(|p| right + 1 + p)
                else {
                    continue;
                };
                content.replace_range(right + 1..next_left, &html_escape(&permalink.target.title));
            }
        }
    }
    content
}
