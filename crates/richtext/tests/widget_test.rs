#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end widget pipeline tests: configure, sanitize at save time,
//! resolve and rewrite permalinks at render time.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use richtext_widget::{
    prepare_content, render_all, PermalinkResolver, PermalinkTarget, PolicyCache, RenderRequest,
    RichTextOptions, RichTextOverrides,
};

struct StubResolver {
    targets: HashMap<String, PermalinkTarget>,
}

impl StubResolver {
    fn new(targets: Vec<PermalinkTarget>) -> Self {
        Self {
            targets: targets.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }
}

#[async_trait]
impl PermalinkResolver for StubResolver {
    async fn resolve(&self, ids: &[String]) -> Result<HashMap<String, PermalinkTarget>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.targets.get(id).cloned())
            .map(|t| (t.id.clone(), t))
            .collect())
    }
}

#[tokio::test]
async fn save_then_render_full_pipeline() {
    let cache = PolicyCache::default();
    let options = RichTextOptions::defaults();
    let policy = cache.get_or_compile(&options);

    let raw = concat!(
        "<h2>Intro</h2>",
        "<p>Hello <b>world</b><script>alert('xss')</script></p>",
        r##"<p>See <a href="#apostrophe-permalink-doc1?updateTitle=1">stale title</a></p>"##,
        r##"<p>Also <a href="#apostrophe-permalink-doc2">this one</a></p>"##,
    );

    // Save time: sanitize and extract permalink references.
    let content = prepare_content(raw, &policy);
    assert!(!content.markup.contains("script"));
    assert!(content.markup.contains("<b>world</b>"));
    assert_eq!(content.permalink_ids, vec!["doc1", "doc2"]);

    // Render time: one batched lookup, pure rewrite.
    let resolver = StubResolver::new(vec![
        PermalinkTarget {
            id: "doc1".to_string(),
            title: "Fresh Title".to_string(),
            url: "/docs/fresh".to_string(),
        },
        PermalinkTarget {
            id: "doc2".to_string(),
            title: "Other".to_string(),
            url: "/docs/other".to_string(),
        },
    ]);
    let requests = [RenderRequest {
        content: &content,
        editable: false,
    }];
    let rendered = render_all(&resolver, &requests).await.unwrap();

    assert!(rendered[0].contains(r#"<a href="/docs/fresh">Fresh Title</a>"#));
    assert!(rendered[0].contains(r#"<a href="/docs/other">this one</a>"#));
    // the stored markup keeps its placeholders for the next edit
    assert!(content.markup.contains("#apostrophe-permalink-doc1"));
    assert!(content.markup.contains("#apostrophe-permalink-doc2"));
}

#[tokio::test]
async fn narrowed_toolbar_rejects_headings_other_areas_allow() {
    // h4 legal in one area, illegal in another, from the same defaults.
    let cache = PolicyCache::default();
    let defaults = RichTextOptions::defaults();
    let narrowed = defaults.merged(&RichTextOverrides {
        toolbar: Some(vec!["bold".to_string(), "link".to_string()]),
        styles: None,
    });

    let raw = r#"<h4>Heading</h4><p><b>body</b></p>"#;

    let full = prepare_content(raw, &cache.get_or_compile(&defaults));
    assert!(full.markup.contains("<h4>Heading</h4>"));

    let narrow = prepare_content(raw, &cache.get_or_compile(&narrowed));
    assert!(!narrow.markup.contains("<h4>"));
    assert!(narrow.markup.contains("Heading"));
    assert!(narrow.markup.contains("<b>body</b>"));
}

#[tokio::test]
async fn missing_documents_degrade_to_placeholders() {
    let cache = PolicyCache::default();
    let policy = cache.get_or_compile(&RichTextOptions::defaults());
    let content = prepare_content(
        r##"<p><a href="#apostrophe-permalink-deleted">old doc</a></p>"##,
        &policy,
    );

    let resolver = StubResolver::new(vec![]);
    let requests = [RenderRequest {
        content: &content,
        editable: false,
    }];
    let rendered = render_all(&resolver, &requests).await.unwrap();

    // deleted document: placeholder left as-is, render still succeeds
    assert_eq!(rendered[0], content.markup);
}
