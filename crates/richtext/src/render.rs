//! Render-time permalink resolution and the pure render transform.
//!
//! Resolution is the only suspending step in the pipeline: one batched
//! lookup per page-worth of widgets, never one per widget. The resolved map
//! is then applied as a pure transform over each widget's stored markup;
//! nothing is ever attached back onto the persisted content.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::error::RichTextResult;
use crate::permalink::{rewrite, PermalinkTarget, ResolvedPermalink};
use crate::sanitize::RichTextContent;

/// External document-store lookup for permalink targets.
#[async_trait]
pub trait PermalinkResolver: Send + Sync {
    /// Resolve permalink ids to their target documents.
    ///
    /// Ids that cannot be resolved (deleted or inaccessible documents) are
    /// simply absent from the result; that is a normal condition, not an
    /// error.
    async fn resolve(&self, ids: &[String]) -> Result<HashMap<String, PermalinkTarget>>;
}

/// One widget to render: its stored content and whether it is currently
/// open for direct editing.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub content: &'a RichTextContent,
    pub editable: bool,
}

/// Collect the distinct permalink ids referenced across a collection of
/// widgets, in first-seen order.
pub fn gather_permalink_ids<'a, I>(contents: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a RichTextContent>,
{
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for content in contents {
        for id in &content.permalink_ids {
            if seen.insert(id.as_str()) {
                ids.push(id.clone());
            }
        }
    }
    ids
}

/// Render a page-worth of widgets with exactly one resolver call.
///
/// Returns one final HTML string per request, in order. Widgets whose
/// permalinks did not resolve keep their placeholders untouched.
pub async fn render_all(
    resolver: &dyn PermalinkResolver,
    requests: &[RenderRequest<'_>],
) -> RichTextResult<Vec<String>> {
    let ids = gather_permalink_ids(requests.iter().map(|r| r.content));
    let targets = if ids.is_empty() {
        HashMap::new()
    } else {
        resolver.resolve(&ids).await?
    };
    debug!(
        widgets = requests.len(),
        requested = ids.len(),
        resolved = targets.len(),
        "resolved permalinks for render"
    );

    let rendered = requests
        .iter()
        .map(|request| {
            let mut seen = HashSet::new();
            let resolved: Vec<ResolvedPermalink> = request
                .content
                .permalink_ids
                .iter()
                .filter(|id| seen.insert(id.as_str()))
                .filter_map(|id| targets.get(id))
                .map(|target| ResolvedPermalink {
                    target: target.clone(),
                    editable: request.editable,
                })
                .collect();
            rewrite(&request.content.markup, &resolved)
        })
        .collect();

    Ok(rendered)
}
