//! Save-time sanitization against a compiled policy.
//!
//! The sanitizer itself is `ammonia`; this module's job is mapping a
//! [`SanitizationPolicy`] onto an `ammonia::Builder` and producing the
//! persisted content shape (sanitized markup plus extracted permalink ids).
//! Sanitization is best-effort on malformed markup and idempotent on its
//! own output.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use ammonia::Builder;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::permalink::extract_ids;
use crate::policy::{SanitizationPolicy, WILDCARD};
use crate::text::html_to_plaintext;

/// Persisted rich text: sanitized markup plus the permalink ids referenced
/// by it. Written once per save; render-time rewriting never touches the
/// stored markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichTextContent {
    pub markup: String,
    pub permalink_ids: Vec<String>,
}

impl RichTextContent {
    /// Tag-stripped text, suitable for search indexing.
    pub fn plaintext(&self) -> String {
        html_to_plaintext(&self.markup)
    }

    /// True when the widget renders no visible text.
    pub fn is_empty(&self) -> bool {
        self.plaintext().trim().is_empty()
    }
}

/// One compiled `allowed_styles` entry: the selector it applies to, the CSS
/// property, and the anchored value patterns.
struct StyleRule {
    selector: String,
    property: String,
    patterns: Vec<Regex>,
}

fn compile_style_rules(policy: &SanitizationPolicy) -> Vec<StyleRule> {
    let mut rules = Vec::new();
    for (selector, properties) in &policy.allowed_styles {
        for (property, patterns) in properties {
            // Patterns come from the closed tool enumeration; anything
            // invalid is simply not enforceable and is skipped.
            let patterns = patterns
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect();
            rules.push(StyleRule {
                selector: selector.clone(),
                property: property.clone(),
                patterns,
            });
        }
    }
    rules
}

/// Keep only the CSS declarations the policy allows for this element.
/// Returns an empty string when nothing survives.
fn filter_style_value(element: &str, value: &str, rules: &[StyleRule]) -> String {
    let mut kept = Vec::new();
    for declaration in value.split(';') {
        let Some((property, val)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let val = val.trim();
        let allowed = rules.iter().any(|rule| {
            (rule.selector == WILDCARD || rule.selector == element)
                && rule.property == property
                && rule.patterns.iter().any(|p| p.is_match(val))
        });
        if allowed {
            kept.push(format!("{property}: {val}"));
        }
    }
    kept.join("; ")
}

/// Sanitize author-submitted markup against a compiled policy.
///
/// Strips any tag, attribute, class, or style declaration the policy does
/// not allow; text content and the surviving structure are preserved.
pub fn sanitize_html(raw: &str, policy: &SanitizationPolicy) -> String {
    let tags: HashSet<&str> = policy.allowed_tags.iter().map(String::as_str).collect();

    let mut tag_attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    let mut generic_attributes: HashSet<&str> = HashSet::new();
    for (tag, attributes) in &policy.allowed_attributes {
        let attributes = attributes.iter().map(String::as_str);
        if tag == WILDCARD {
            generic_attributes.extend(attributes);
        } else {
            tag_attributes.insert(tag.as_str(), attributes.collect());
        }
    }

    let allowed_classes: HashMap<&str, HashSet<&str>> = policy
        .allowed_classes
        .iter()
        .map(|(tag, classes)| (tag.as_str(), classes.iter().map(String::as_str).collect()))
        .collect();

    // The attribute filter closure must own its rules.
    let style_rules = compile_style_rules(policy);

    let mut builder = Builder::new();
    builder
        .tags(tags)
        .tag_attributes(tag_attributes)
        .generic_attributes(generic_attributes)
        .allowed_classes(allowed_classes)
        .link_rel(None)
        .attribute_filter(move |element, attribute, value| {
            if attribute != "style" {
                return Some(value.into());
            }
            let kept = filter_style_value(element, value, &style_rules);
            if kept.is_empty() {
                None
            } else {
                Some(Cow::Owned(kept))
            }
        });

    builder.clean(raw).to_string()
}

/// The save-time step: sanitize, then extract permalink ids from the
/// sanitized markup.
pub fn prepare_content(raw: &str, policy: &SanitizationPolicy) -> RichTextContent {
    let markup = sanitize_html(raw, policy);
    let permalink_ids = extract_ids(&markup);
    debug!(
        bytes = markup.len(),
        permalinks = permalink_ids.len(),
        "prepared rich text content"
    );
    RichTextContent {
        markup,
        permalink_ids,
    }
}
