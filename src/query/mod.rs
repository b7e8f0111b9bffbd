//! Query Service: navigation queries for a documentation browser.
//!
//! Holds only a shared borrow of the [`IndexStore`]; every operation is a
//! pure read, so a `QueryService` can be copied freely across threads.

pub mod search;

use tracing::debug;

use crate::error::{IndexError, Result};
use crate::model::{validate_qualified_name, Entity, Kind, Package, RelativePath};
use crate::store::IndexStore;

pub use search::Search;

/// Outcome of resolving a qualified name.
///
/// Empty when the name is well-formed but not declared; that is an ordinary
/// answer, not an error.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    /// Package chosen by longest-prefix match, if any prefix is known
    pub package: Option<&'a Package>,
    pub entity: Option<&'a Entity>,
}

impl<'a> Resolution<'a> {
    fn empty() -> Self {
        Self {
            package: None,
            entity: None,
        }
    }

    /// (kind, path) pairs in kind order
    pub fn pages(&self) -> impl Iterator<Item = (Kind, &'a RelativePath)> + 'a {
        self.entity
            .into_iter()
            .flat_map(|entity| entity.pages.iter().map(|(kind, path)| (*kind, path)))
    }

    pub fn kinds(&self) -> Vec<Kind> {
        self.pages().map(|(kind, _)| kind).collect()
    }

    pub fn get(&self, kind: Kind) -> Option<&'a RelativePath> {
        self.entity.and_then(|entity| entity.page(kind))
    }

    pub fn len(&self) -> usize {
        self.entity.map_or(0, |entity| entity.pages.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QueryService<'a> {
    store: &'a IndexStore,
}

impl<'a> QueryService<'a> {
    pub fn new(store: &'a IndexStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'a IndexStore {
        self.store
    }

    /// Every (kind, path) under which `qualified_name` is declared.
    ///
    /// The name is split at the longest package prefix present in the index,
    /// since package and member separators are the same character.
    pub fn resolve(&self, qualified_name: &str) -> Result<Resolution<'a>> {
        validate_qualified_name(qualified_name)?;

        let Some((package, simple_name)) = self.store.split_qualified(qualified_name) else {
            debug!(name = qualified_name, "no known package prefix");
            return Ok(Resolution::empty());
        };

        let entity = self.store.find_entity(package.as_str(), simple_name);
        debug!(
            name = qualified_name,
            package = %package,
            found = entity.is_some(),
            "resolved qualified name"
        );
        Ok(Resolution {
            package: Some(package),
            entity,
        })
    }

    /// Narrow a resolution to one page.
    ///
    /// Without a kind, succeeds only when the name has exactly one kind.
    pub fn disambiguate(&self, qualified_name: &str, kind: Option<Kind>) -> Result<&'a RelativePath> {
        let resolution = self.resolve(qualified_name)?;
        if resolution.is_empty() {
            return Err(IndexError::NotFound(qualified_name.to_string()));
        }

        match kind {
            Some(kind) => resolution
                .get(kind)
                .ok_or_else(|| IndexError::NotFound(format!("{} {}", kind, qualified_name))),
            None => {
                let mut pages = resolution.pages();
                match (pages.next(), pages.next()) {
                    (Some((_, path)), None) => Ok(path),
                    _ => Err(IndexError::AmbiguousKind {
                        name: qualified_name.to_string(),
                        kinds: resolution.kinds(),
                    }),
                }
            }
        }
    }

    /// Entities whose qualified name starts with `prefix`, in
    /// package-then-name order. Recomputed on every call.
    pub fn search(&self, prefix: &str) -> Search<'a> {
        Search::new(self.store, prefix)
    }

    /// Browsable link for one page of `qualified_name`.
    pub fn link(&self, qualified_name: &str, kind: Option<Kind>, base: &str) -> Result<String> {
        self.disambiguate(qualified_name, kind).map(|path| path.href(base))
    }

    /// Entities declared under `kind`, in package-then-name order.
    pub fn entities_of_kind(&self, kind: Kind) -> impl Iterator<Item = &'a Entity> + 'a {
        self.store
            .ordered_entities()
            .filter(move |entity| entity.page(kind).is_some())
    }
}
