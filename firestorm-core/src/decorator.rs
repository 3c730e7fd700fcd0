//! Post-processing of documents returned by read operations.
//!
//! A [`DecoratorChain`] is an ordered list of `Document -> Document` functions registered
//! on a collection. Every document returned by a read passes through all of them in
//! registration order, so registering `f` then `g` yields `g(f(doc))`.

use std::{fmt, sync::Arc};

use crate::document::{Document, DocumentMap};

/// A registered document transform.
pub type Decorator = Arc<dyn Fn(Document) -> Document + Send + Sync>;

/// Ordered, append-only list of decorators.
#[derive(Clone, Default)]
pub struct DecoratorChain {
    decorators: Vec<Decorator>,
}

impl fmt::Debug for DecoratorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratorChain")
            .field("len", &self.decorators.len())
            .finish()
    }
}

impl DecoratorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a decorator and returns a handle to it.
    pub fn register<F>(&mut self, decorator: F) -> Decorator
    where
        F: Fn(Document) -> Document + Send + Sync + 'static,
    {
        let decorator: Decorator = Arc::new(decorator);
        self.decorators.push(decorator.clone());
        decorator
    }

    pub fn len(&self) -> usize {
        self.decorators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorators.is_empty()
    }

    /// Runs one document through every decorator.
    pub fn apply_one(&self, document: Document) -> Document {
        self.decorators
            .iter()
            .fold(document, |document, decorator| decorator(document))
    }

    /// Applies the chain to any decoratable result shape.
    pub fn apply<R: Decorate>(&self, result: R) -> R {
        result.decorate(self)
    }
}

/// Result shapes a [`DecoratorChain`] knows how to walk.
pub trait Decorate: Sized {
    fn decorate(self, chain: &DecoratorChain) -> Self;
}

impl Decorate for Document {
    /// Empty documents pass through unchanged.
    fn decorate(self, chain: &DecoratorChain) -> Self {
        if self.is_empty() {
            return self;
        }

        chain.apply_one(self)
    }
}

impl Decorate for Vec<Document> {
    fn decorate(self, chain: &DecoratorChain) -> Self {
        self.into_iter()
            .map(|document| chain.apply_one(document))
            .collect()
    }
}

impl Decorate for DocumentMap {
    fn decorate(mut self, chain: &DecoratorChain) -> Self {
        for document in self.values_mut() {
            *document = chain.apply_one(std::mem::take(document));
        }

        self
    }
}
