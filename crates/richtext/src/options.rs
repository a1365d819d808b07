//! Widget configuration: toolbar entries and style presets.
//!
//! An area supplies a toolbar (ordered list of tool names) and, when the
//! `styles` tool is present, a list of author-facing style presets. Defaults
//! are merged with per-area overrides through an explicit merge function
//! rather than by mutating a shared default object.

use serde::{Deserialize, Serialize};

/// An author-defined semantic style: a tag plus an optional space-separated
/// CSS class list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylePreset {
    pub tag: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl StylePreset {
    /// Create a preset with no classes.
    pub fn new(tag: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            label: label.into(),
            class: None,
        }
    }

    /// Create a preset carrying a space-separated class list.
    pub fn with_class(
        tag: impl Into<String>,
        label: impl Into<String>,
        class: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            label: label.into(),
            class: Some(class.into()),
        }
    }

    /// The individual class names, split on whitespace. Empty when the
    /// preset carries no `class` value.
    pub fn classes(&self) -> Vec<&str> {
        self.class
            .as_deref()
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// Rich text configuration for one area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichTextOptions {
    pub toolbar: Vec<String>,
    #[serde(default)]
    pub styles: Vec<StylePreset>,
}

/// Per-area overrides. Any field left unset falls through to the defaults;
/// a supplied field replaces the default wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RichTextOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolbar: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Vec<StylePreset>>,
}

impl RichTextOptions {
    /// The minimum default configuration every area starts from.
    pub fn defaults() -> Self {
        Self {
            toolbar: [
                "styles",
                "bold",
                "italic",
                "strike",
                "link",
                "bulletList",
                "orderedList",
                "blockquote",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            styles: vec![
                StylePreset::new("p", "Paragraph"),
                StylePreset::new("h2", "Heading 2"),
                StylePreset::new("h3", "Heading 3"),
                StylePreset::new("h4", "Heading 4"),
            ],
        }
    }

    /// Merge overrides on top of this configuration, producing a new value.
    ///
    /// Caller-supplied fields win over the base; unset fields keep the base
    /// value. Neither input is mutated.
    pub fn merged(&self, overrides: &RichTextOverrides) -> Self {
        Self {
            toolbar: overrides
                .toolbar
                .clone()
                .unwrap_or_else(|| self.toolbar.clone()),
            styles: overrides
                .styles
                .clone()
                .unwrap_or_else(|| self.styles.clone()),
        }
    }
}

impl Default for RichTextOptions {
    fn default() -> Self {
        Self::defaults()
    }
}
