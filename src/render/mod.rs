//! Markup Rendering
//!
//! The boundary between the edit pipeline and the markup renderer.
//! Anything implementing [`Render`] can back the preview; the crate ships a
//! comrak-based implementation.

pub mod markdown;
pub mod document;

pub use markdown::ComrakRenderer;
pub use document::{DocNode, DocumentTree, NodeKind};

use thiserror::Error;

/// Failure of a single render pass
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("input of {len} bytes exceeds the render limit of {limit} bytes")]
    InputTooLarge { len: usize, limit: usize },
    #[error("markdown rendering failed: {message}")]
    Markdown { message: String },
}

/// A pure markup renderer.
///
/// Implementations must be deterministic and must not keep state between
/// calls: the preview memoizes on input text and assumes equal input gives an
/// equal document.
pub trait Render {
    fn render(&self, text: &str) -> Result<DocumentTree, RenderError>;
}

impl<R: Render + ?Sized> Render for &R {
    fn render(&self, text: &str) -> Result<DocumentTree, RenderError> {
        (**self).render(text)
    }
}

impl<R: Render + ?Sized> Render for Box<R> {
    fn render(&self, text: &str) -> Result<DocumentTree, RenderError> {
        (**self).render(text)
    }
}
