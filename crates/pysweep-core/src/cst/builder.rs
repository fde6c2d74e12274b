//! Green tree construction helpers
//!
//! Thin wrapper around `rowan::GreenNodeBuilder` that accepts our
//! [`CstToken`]s and [`PySyntaxKind`]s directly.

use rowan::GreenNodeBuilder;

use super::{CstToken, PySyntaxKind, PySyntaxNode};

/// Builder for the lossless syntax tree
pub struct CstBuilder {
    inner: GreenNodeBuilder<'static>,
}

impl CstBuilder {
    pub fn new() -> Self {
        Self {
            inner: GreenNodeBuilder::new(),
        }
    }

    /// Open a new node with the given kind
    pub fn start_node(&mut self, kind: PySyntaxKind) {
        self.inner.start_node(kind.into());
    }

    /// Close the most recently opened node
    pub fn finish_node(&mut self) {
        self.inner.finish_node();
    }

    /// Record the current position for a possible deferred wrap
    pub fn checkpoint(&self) -> rowan::Checkpoint {
        self.inner.checkpoint()
    }

    /// Open a node retroactively at `checkpoint`, adopting everything
    /// emitted since
    pub fn start_node_at(&mut self, checkpoint: rowan::Checkpoint, kind: PySyntaxKind) {
        self.inner.start_node_at(checkpoint, kind.into());
    }

    /// Append a lexed token
    pub fn add_token(&mut self, token: &CstToken) {
        self.inner.token(token.kind.into(), &token.text);
    }

    /// Append a synthesized token (error recovery)
    pub fn token(&mut self, kind: PySyntaxKind, text: &str) {
        self.inner.token(kind.into(), text);
    }

    /// Finish building and return the root syntax node
    pub fn finish(self) -> PySyntaxNode {
        PySyntaxNode::new_root(self.inner.finish())
    }
}

impl Default for CstBuilder {
    fn default() -> Self {
        Self::new()
    }
}
