//! Sanitization policy compiler.
//!
//! Converts a toolbar configuration into the allow-list enforced on saved
//! markup, so that (for example) `h4` can be legal in one area and illegal
//! in another. Compilation is a pure function of the options: identical
//! inputs always yield structurally identical policies.

use std::collections::BTreeMap;
use std::sync::Arc;

use moka::sync::Cache;
use serde::Serialize;
use tracing::debug;

use crate::options::RichTextOptions;

/// Selector applying to every tag.
pub const WILDCARD: &str = "*";

/// Recognized toolbar entries.
///
/// The mapping from tool to allowed tags/attributes/styles is a closed
/// enumeration; toolbar names outside this set are a deliberate no-op so
/// future editor tools never break sanitization of existing areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Styles,
    Bold,
    Italic,
    Strike,
    Underline,
    Link,
    HorizontalRule,
    BulletList,
    OrderedList,
    Blockquote,
    CodeBlock,
    AlignLeft,
    AlignCenter,
    AlignRight,
    AlignJustify,
}

impl Tool {
    /// Parse a toolbar entry name. Unknown names return `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "styles" => Some(Self::Styles),
            "bold" => Some(Self::Bold),
            "italic" => Some(Self::Italic),
            "strike" => Some(Self::Strike),
            "underline" => Some(Self::Underline),
            "link" => Some(Self::Link),
            "horizontalRule" => Some(Self::HorizontalRule),
            "bulletList" => Some(Self::BulletList),
            "orderedList" => Some(Self::OrderedList),
            "blockquote" => Some(Self::Blockquote),
            "codeBlock" => Some(Self::CodeBlock),
            "alignLeft" => Some(Self::AlignLeft),
            "alignCenter" => Some(Self::AlignCenter),
            "alignRight" => Some(Self::AlignRight),
            "alignJustify" => Some(Self::AlignJustify),
            _ => None,
        }
    }

    /// Raw tags this tool allows in saved markup.
    fn tags(self) -> &'static [&'static str] {
        match self {
            Self::Bold => &["b", "strong"],
            Self::Italic => &["i", "em"],
            Self::Strike => &["s"],
            Self::Underline => &["u"],
            Self::Link => &["a"],
            Self::HorizontalRule => &["hr"],
            Self::BulletList => &["ul", "li"],
            Self::OrderedList => &["ol", "li"],
            Self::Blockquote => &["blockquote"],
            Self::CodeBlock => &["pre", "code"],
            // Styles contributes via the preset list; alignment tools
            // contribute style properties, not tags.
            Self::Styles
            | Self::AlignLeft
            | Self::AlignCenter
            | Self::AlignRight
            | Self::AlignJustify => &[],
        }
    }

    /// The `text-align` value an alignment tool permits, if any.
    fn alignment(self) -> Option<&'static str> {
        match self {
            Self::AlignLeft => Some("left"),
            Self::AlignCenter => Some("center"),
            Self::AlignRight => Some("right"),
            Self::AlignJustify => Some("justify"),
            _ => None,
        }
    }
}

/// Compiled allow-list enforced on saved markup.
///
/// Sequences are duplicate-free in insertion order; maps are ordered, so two
/// policies compiled from the same options compare equal structurally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizationPolicy {
    /// Allowed tag names.
    pub allowed_tags: Vec<String>,
    /// Tag name (or `*`) to allowed attribute names.
    pub allowed_attributes: BTreeMap<String, Vec<String>>,
    /// Tag name to allowed CSS class names.
    pub allowed_classes: BTreeMap<String, Vec<String>>,
    /// Selector (tag or `*`) to CSS property to anchored value patterns.
    pub allowed_styles: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl SanitizationPolicy {
    fn allow_tag(&mut self, tag: &str) {
        if !self.allowed_tags.iter().any(|t| t == tag) {
            self.allowed_tags.push(tag.to_string());
        }
    }

    fn allow_attribute(&mut self, tag: &str, attribute: &str) {
        let attributes = self.allowed_attributes.entry(tag.to_string()).or_default();
        if !attributes.iter().any(|a| a == attribute) {
            attributes.push(attribute.to_string());
        }
    }

    fn allow_class(&mut self, tag: &str, class: &str) {
        let classes = self.allowed_classes.entry(tag.to_string()).or_default();
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn allow_style(&mut self, selector: &str, property: &str, pattern: String) {
        let patterns = self
            .allowed_styles
            .entry(selector.to_string())
            .or_default()
            .entry(property.to_string())
            .or_default();
        if !patterns.contains(&pattern) {
            patterns.push(pattern);
        }
    }
}

/// Compile area options into a sanitization policy.
///
/// Pure and infallible: unknown toolbar entries contribute nothing, and the
/// structural base tags (`br`, `p`) are always allowed.
pub fn compile(options: &RichTextOptions) -> SanitizationPolicy {
    let mut policy = SanitizationPolicy::default();
    policy.allow_tag("br");
    policy.allow_tag("p");

    for name in &options.toolbar {
        let Some(tool) = Tool::parse(name) else {
            continue;
        };
        for tag in tool.tags() {
            policy.allow_tag(tag);
        }
        match tool {
            Tool::Styles => {
                for preset in &options.styles {
                    policy.allow_tag(&preset.tag);
                    for class in preset.classes() {
                        policy.allow_class(&preset.tag, class);
                    }
                }
            }
            Tool::Link => {
                for attribute in ["href", "id", "name", "target"] {
                    policy.allow_attribute("a", attribute);
                }
            }
            _ => {
                if let Some(value) = tool.alignment() {
                    // Without the style attribute the property allow-list
                    // would have nothing to attach to.
                    policy.allow_attribute(WILDCARD, "style");
                    policy.allow_style(WILDCARD, "text-align", format!("^{value}$"));
                }
            }
        }
    }

    policy
}

/// In-process cache of compiled policies, keyed by the stable serialization
/// of the options.
pub struct PolicyCache {
    policies: Cache<String, Arc<SanitizationPolicy>>,
}

impl PolicyCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            policies: Cache::new(max_capacity),
        }
    }

    /// Return the cached policy for these options, compiling on a miss.
    ///
    /// If the options cannot be serialized into a cache key the policy is
    /// compiled directly, uncached.
    pub fn get_or_compile(&self, options: &RichTextOptions) -> Arc<SanitizationPolicy> {
        match serde_json::to_string(options) {
            Ok(key) => self
                .policies
                .get_with(key, || Arc::new(compile(options))),
            Err(e) => {
                debug!(error = %e, "options not serializable; compiling uncached policy");
                Arc::new(compile(options))
            }
        }
    }
}

impl Default for PolicyCache {
    fn default() -> Self {
        Self::new(1_000)
    }
}
