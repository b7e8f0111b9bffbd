//! Prefix search over qualified names.

use std::iter::FusedIterator;

use crate::model::Entity;
use crate::store::IndexStore;

/// Lazy, finite iterator over entities whose qualified name starts with a
/// prefix, in package-then-name order.
///
/// Each [`super::QueryService::search`] call builds a fresh `Search` from the
/// store's ordered table, so results can be restarted by searching again.
/// Only the table ranges whose package can produce a match are visited.
pub struct Search<'a> {
    inner: Box<dyn Iterator<Item = &'a Entity> + Send + 'a>,
    prefix: String,
}

impl<'a> Search<'a> {
    pub(crate) fn new(store: &'a IndexStore, prefix: &str) -> Self {
        Self {
            inner: Box::new(store.prefix_candidates(prefix)),
            prefix: prefix.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl<'a> Iterator for Search<'a> {
    type Item = &'a Entity;

    fn next(&mut self) -> Option<&'a Entity> {
        let prefix = self.prefix.as_str();
        self.inner
            .by_ref()
            .find(|entity| entity.qualified_name.starts_with(prefix))
    }
}

impl FusedIterator for Search<'_> {}
