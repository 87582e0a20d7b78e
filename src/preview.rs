//! Preview Renderer
//!
//! Turns the render stage's output into what the display shows. Rendering is
//! memoized on the rendered content, and a failed render falls back to the
//! last good document so one bad input never blanks the preview.

use std::sync::Arc;

use crate::render::{DocumentTree, Render};

/// What the display surface should show
#[derive(Debug, Clone)]
pub enum DisplayState {
    /// A render is in flight; show a loading indicator.
    Pending,
    Document(Arc<DocumentTree>),
}

impl DisplayState {
    pub fn is_pending(&self) -> bool {
        matches!(self, DisplayState::Pending)
    }

    pub fn document(&self) -> Option<&Arc<DocumentTree>> {
        match self {
            DisplayState::Pending => None,
            DisplayState::Document(document) => Some(document),
        }
    }
}

// Documents compare by identity: a memo hit hands out the same Arc.
impl PartialEq for DisplayState {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DisplayState::Pending, DisplayState::Pending) => true,
            (DisplayState::Document(a), DisplayState::Document(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[derive(Debug)]
struct Memo {
    input: Arc<str>,
    document: Arc<DocumentTree>,
}

/// Memoizing front end over a [`Render`] implementation
#[derive(Debug)]
pub struct PreviewRenderer<R> {
    renderer: R,
    memo: Option<Memo>,
    last_good: Option<Arc<DocumentTree>>,
    render_calls: u64,
}

impl<R: Render> PreviewRenderer<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            memo: None,
            last_good: None,
            render_calls: 0,
        }
    }

    /// Compute the display for `rendered` content.
    ///
    /// While `loading` the display is [`DisplayState::Pending`] and nothing is
    /// rendered. Otherwise the renderer runs only if `rendered` differs from
    /// the previous input.
    pub fn present(&mut self, rendered: &Arc<str>, loading: bool) -> DisplayState {
        if loading {
            return DisplayState::Pending;
        }
        DisplayState::Document(self.document_for(rendered))
    }

    fn document_for(&mut self, content: &Arc<str>) -> Arc<DocumentTree> {
        if let Some(memo) = &self.memo
            && (Arc::ptr_eq(&memo.input, content) || memo.input == *content)
        {
            return Arc::clone(&memo.document);
        }

        self.render_calls += 1;
        let document = match self.renderer.render(content) {
            Ok(document) => {
                let document = Arc::new(document);
                self.last_good = Some(Arc::clone(&document));
                document
            }
            Err(err) => {
                log::warn!("render failed, keeping the previous document: {}", err);
                self.last_good
                    .clone()
                    .unwrap_or_else(|| Arc::new(DocumentTree::empty()))
            }
        };

        self.memo = Some(Memo {
            input: Arc::clone(content),
            document: Arc::clone(&document),
        });
        document
    }

    /// Last successfully rendered document
    pub fn last_document(&self) -> Option<&Arc<DocumentTree>> {
        self.last_good.as_ref()
    }

    /// Number of times the underlying renderer has been invoked
    pub fn render_calls(&self) -> u64 {
        self.render_calls
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}
