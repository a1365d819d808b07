//! Widget error types.

use thiserror::Error;

/// Errors surfaced by the rich text rendering pipeline.
///
/// Sanitization and rewriting are best-effort and never fail; the only
/// fallible step is the external permalink lookup.
#[derive(Debug, Error)]
pub enum RichTextError {
    #[error("permalink resolution failed")]
    Resolve(#[from] anyhow::Error),
}

/// Result type alias using RichTextError.
pub type RichTextResult<T> = Result<T, RichTextError>;
