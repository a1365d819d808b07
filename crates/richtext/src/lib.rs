//! Rich text widget toolkit.
//!
//! This library provides:
//! - RichTextOptions: Toolbar/style configuration with explicit default merging
//! - SanitizationPolicy: Compiled allow-list derived from the toolbar config
//! - sanitize: Ammonia-backed enforcement of a compiled policy at save time
//! - permalink: Placeholder extraction and cursor-scan rewriting at render time
//! - render: Batched permalink resolution and the pure render transform

pub mod error;
pub mod options;
pub mod permalink;
pub mod policy;
pub mod render;
pub mod sanitize;
pub mod text;

pub use error::{RichTextError, RichTextResult};
pub use options::{RichTextOptions, RichTextOverrides, StylePreset};
pub use permalink::{extract_ids, rewrite, PermalinkTarget, ResolvedPermalink};
pub use policy::{compile, PolicyCache, SanitizationPolicy, Tool};
pub use render::{gather_permalink_ids, render_all, PermalinkResolver, RenderRequest};
pub use sanitize::{prepare_content, sanitize_html, RichTextContent};
