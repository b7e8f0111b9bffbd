//! Index Store: the validated, immutable package → entities mapping.
//!
//! Built exactly once from a generated artifact. All accessors borrow;
//! nothing is exposed that could mutate the mapping after load.

pub mod artifact;
pub(crate) mod index_set;

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{IndexError, Result};
use crate::model::{validate_qualified_name, Entity, Kind, Package, RelativePath};

pub use artifact::{parse_artifact, ArtifactForm, RawIndex, RawPackage, RawRecord};
use index_set::{EntitySlot, IndexSet};

/// One package and its entities in artifact order
#[derive(Debug)]
pub(crate) struct PackageEntry {
    pub package: Package,
    pub entities: Vec<Entity>,
}

/// Summary counts for a loaded index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub packages: usize,
    /// Packages present only to keep the namespace hierarchy
    pub empty_packages: usize,
    pub entities: usize,
    /// Total (kind, path) pairs
    pub pages: usize,
    pub pages_by_kind: BTreeMap<Kind, usize>,
}

/// Immutable documentation index.
///
/// `Send + Sync` with no interior mutability, so one instance can serve any
/// number of concurrent readers.
#[derive(Debug)]
pub struct IndexStore {
    packages: Vec<PackageEntry>,
    index: IndexSet,
}

impl IndexStore {
    /// Parse and validate artifact text (bare JSON or `Index.PACKAGES = {...};`).
    pub fn load(raw: &str) -> Result<Self> {
        let (form, raw) = parse_artifact(raw)?;
        debug!(?form, packages = raw.packages.len(), "decoded index artifact");
        Self::from_raw(raw)
    }

    /// Read the artifact from disk and load it.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), bytes = text.len(), "read index artifact");
        Self::load(&text)
    }

    /// Validate an already-decoded artifact.
    pub fn from_raw(raw: RawIndex) -> Result<Self> {
        let mut packages = Vec::with_capacity(raw.packages.len());
        for raw_package in raw.packages {
            packages.push(Self::validate_package(raw_package)?);
        }

        let store = Self {
            index: IndexSet::build(&packages),
            packages,
        };
        store.check_reachable()?;

        let stats = store.stats();
        info!(
            packages = stats.packages,
            entities = stats.entities,
            pages = stats.pages,
            "loaded documentation index"
        );
        Ok(store)
    }

    fn validate_package(raw: RawPackage) -> Result<PackageEntry> {
        let package = Package::new(raw.name.as_str()).ok_or_else(|| {
            IndexError::MalformedIndex(format!("invalid package name '{}'", raw.name))
        })?;

        let mut entities: Vec<Entity> = Vec::with_capacity(raw.records.len());
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for (position, record) in raw.records.into_iter().enumerate() {
            let qualified = record.name.ok_or_else(|| {
                IndexError::MalformedIndex(format!(
                    "record #{} in package '{}' has no name",
                    position, package
                ))
            })?;
            if record.pages.is_empty() {
                return Err(IndexError::MalformedIndex(format!(
                    "entity '{}' has no documentation pages",
                    qualified
                )));
            }
            let simple_name = Self::simple_name_of(&package, &qualified)?;

            let slot = match by_name.entry(simple_name.to_string()) {
                Entry::Occupied(e) => {
                    debug!(entity = %qualified, "merging records that share a name");
                    *e.get()
                }
                Entry::Vacant(e) => {
                    entities.push(Entity::new(package.clone(), simple_name));
                    *e.insert(entities.len() - 1)
                }
            };

            let entity = &mut entities[slot];
            for (kind, path) in record.pages {
                if entity.pages.contains_key(&kind) {
                    return Err(IndexError::MalformedIndex(format!(
                        "duplicate {} '{}' in package '{}'",
                        kind, entity.simple_name, package
                    )));
                }
                entity.pages.insert(kind, RelativePath::new(path));
            }
        }

        Ok(PackageEntry { package, entities })
    }

    /// Every entity must be found again by splitting its qualified name at
    /// the longest known package. This also makes qualified names unique
    /// across the whole index.
    fn check_reachable(&self) -> Result<()> {
        for (pkg_slot, entry) in self.packages.iter().enumerate() {
            for entity in &entry.entities {
                match self.index.split_longest_prefix(&entity.qualified_name) {
                    Some((slot, _)) if slot == pkg_slot => {}
                    Some((slot, _)) => {
                        return Err(IndexError::MalformedIndex(format!(
                            "entity '{}' is shadowed by package '{}'",
                            entity.qualified_name, self.packages[slot].package
                        )));
                    }
                    None => {
                        return Err(IndexError::MalformedIndex(format!(
                            "entity '{}' is not reachable from package '{}'",
                            entity.qualified_name, entry.package
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// The generator writes qualified names; bare simple names are accepted too.
    fn simple_name_of<'q>(package: &Package, qualified: &'q str) -> Result<&'q str> {
        validate_qualified_name(qualified).map_err(|_| {
            IndexError::MalformedIndex(format!("invalid entity name '{}'", qualified))
        })?;

        if let Some(simple) = package.strip_from(qualified) {
            return Ok(simple);
        }
        if !qualified.contains('.') {
            return Ok(qualified);
        }
        Err(IndexError::MalformedIndex(format!(
            "entity '{}' does not belong to package '{}'",
            qualified, package
        )))
    }

    // ── Reads ──────────────────────────────────────────────────────

    /// Packages in artifact order.
    pub fn packages(&self) -> impl Iterator<Item = &Package> + '_ {
        self.packages.iter().map(|entry| &entry.package)
    }

    /// Entities of a package in artifact order.
    ///
    /// A package present with no entities yields an empty slice; an absent
    /// package is `UnknownPackage`.
    pub fn entities_of(&self, package: &str) -> Result<&[Entity]> {
        self.index
            .find_package(package)
            .map(|slot| self.packages[slot].entities.as_slice())
            .ok_or_else(|| IndexError::UnknownPackage(package.to_string()))
    }

    /// Direct sub-packages present in the index, in artifact order.
    pub fn subpackages(&self, package: &str) -> Result<Vec<&Package>> {
        let slot = self
            .index
            .find_package(package)
            .ok_or_else(|| IndexError::UnknownPackage(package.to_string()))?;
        Ok(self
            .index
            .children(slot)
            .iter()
            .map(|&child| &self.packages[child].package)
            .collect())
    }

    pub fn contains_package(&self, package: &str) -> bool {
        self.index.find_package(package).is_some()
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn entity_count(&self) -> usize {
        self.index.ordered().len()
    }

    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            packages: self.packages.len(),
            ..IndexStats::default()
        };
        for entry in &self.packages {
            if entry.entities.is_empty() {
                stats.empty_packages += 1;
            }
            stats.entities += entry.entities.len();
            for entity in &entry.entities {
                stats.pages += entity.pages.len();
                for kind in entity.kinds() {
                    *stats.pages_by_kind.entry(kind).or_insert(0) += 1;
                }
            }
        }
        stats
    }

    // ── Crate-internal lookups for the query layer ─────────────────

    /// Longest-known-package split of a qualified name.
    pub(crate) fn split_qualified<'q>(&self, qualified: &'q str) -> Option<(&Package, &'q str)> {
        self.index
            .split_longest_prefix(qualified)
            .map(|(slot, simple)| (&self.packages[slot].package, simple))
    }

    pub(crate) fn find_entity(&self, package: &str, simple_name: &str) -> Option<&Entity> {
        let pkg_slot = self.index.find_package(package)?;
        let ent_slot = self.index.find_entity(pkg_slot, simple_name)?;
        Some(&self.packages[pkg_slot].entities[ent_slot])
    }

    /// All entities in package-then-name order.
    pub(crate) fn ordered_entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.index.ordered().iter().map(move |&slot| self.entity_at(slot))
    }

    /// Entities that can have a qualified name starting with `prefix`, in
    /// package-then-name order. Callers still filter on the full name.
    ///
    /// Candidates come from three disjoint, ascending ranges of the ordered
    /// table, each located with `partition_point`: the root package, every
    /// package that `prefix` continues with a `.`, and every package whose
    /// own name starts with `prefix`.
    pub(crate) fn prefix_candidates(&self, prefix: &str) -> impl Iterator<Item = &Entity> + '_ {
        let ordered = self.index.ordered();
        let package_of = |&(pkg_slot, _): &EntitySlot| self.packages[pkg_slot].package.as_str();
        let package_range = |name: &str| {
            let start = ordered.partition_point(|slot| package_of(slot) < name);
            let end = ordered.partition_point(|slot| package_of(slot) <= name);
            start..end
        };

        let mut ranges = Vec::new();
        if !prefix.is_empty() {
            ranges.push(package_range(""));
        }
        for (pos, _) in prefix.match_indices('.').filter(|&(pos, _)| pos > 0) {
            ranges.push(package_range(&prefix[..pos]));
        }
        let start = ordered.partition_point(|slot| package_of(slot) < prefix);
        let len = ordered[start..].partition_point(|slot| package_of(slot).starts_with(prefix));
        ranges.push(start..start + len);

        ranges
            .into_iter()
            .flat_map(move |range| ordered[range].iter().map(move |&slot| self.entity_at(slot)))
    }

    fn entity_at(&self, (pkg_slot, ent_slot): EntitySlot) -> &Entity {
        &self.packages[pkg_slot].entities[ent_slot]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"Index.PACKAGES = {
        "org.saddle.index": [
            {"object": "org\/saddle\/index\/IndexMaker$.html", "trait": "org\/saddle\/index\/IndexMaker.html", "name": "org.saddle.index.IndexMaker"},
            {"class": "org\/saddle\/index\/IndexInt.html", "name": "org.saddle.index.IndexInt"}
        ],
        "org": [],
        "org.saddle": [
            {"object": "org\/saddle\/Vec$.html", "trait": "org\/saddle\/Vec.html", "name": "org.saddle.Vec"}
        ]
    };"#;

    fn malformed(text: &str) -> String {
        match IndexStore::load(text) {
            Err(IndexError::MalformedIndex(msg)) => msg,
            other => panic!("expected MalformedIndex, got {:?}", other),
        }
    }

    #[test]
    fn test_load_script_artifact() {
        let store = IndexStore::load(SAMPLE).unwrap();
        let names: Vec<&str> = store.packages().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["org.saddle.index", "org", "org.saddle"]);
        assert_eq!(store.package_count(), 3);
        assert_eq!(store.entity_count(), 3);
    }

    #[test]
    fn test_entities_of_preserves_artifact_order() {
        let store = IndexStore::load(SAMPLE).unwrap();
        let entities = store.entities_of("org.saddle.index").unwrap();
        let names: Vec<&str> = entities.iter().map(|e| e.simple_name.as_str()).collect();
        assert_eq!(names, vec!["IndexMaker", "IndexInt"]);
        assert_eq!(
            entities[0].page(Kind::Trait).map(|p| p.as_str()),
            Some("org/saddle/index/IndexMaker.html")
        );
    }

    #[test]
    fn test_empty_package_vs_unknown_package() {
        let store = IndexStore::load(SAMPLE).unwrap();
        assert!(store.entities_of("org").unwrap().is_empty());
        match store.entities_of("org.saddle.nope") {
            Err(IndexError::UnknownPackage(name)) => assert_eq!(name, "org.saddle.nope"),
            other => panic!("expected UnknownPackage, got {:?}", other),
        }
    }

    #[test]
    fn test_subpackages() {
        let store = IndexStore::load(SAMPLE).unwrap();
        let org: Vec<&str> = store.subpackages("org").unwrap().iter().map(|p| p.as_str()).collect();
        assert_eq!(org, vec!["org.saddle"]);
        let saddle: Vec<&str> = store
            .subpackages("org.saddle")
            .unwrap()
            .iter()
            .map(|p| p.as_str())
            .collect();
        assert_eq!(saddle, vec!["org.saddle.index"]);
        assert!(store.subpackages("org.saddle.index").unwrap().is_empty());
        assert!(matches!(store.subpackages("com"), Err(IndexError::UnknownPackage(_))));
    }

    #[test]
    fn test_stats() {
        let store = IndexStore::load(SAMPLE).unwrap();
        let stats = store.stats();
        assert_eq!(stats.packages, 3);
        assert_eq!(stats.empty_packages, 1);
        assert_eq!(stats.entities, 3);
        assert_eq!(stats.pages, 5);
        assert_eq!(stats.pages_by_kind.get(&Kind::Object), Some(&2));
        assert_eq!(stats.pages_by_kind.get(&Kind::Trait), Some(&2));
        assert_eq!(stats.pages_by_kind.get(&Kind::Class), Some(&1));
        assert_eq!(stats.pages_by_kind.get(&Kind::CaseClass), None);
    }

    #[test]
    fn test_records_with_disjoint_kinds_merge() {
        let store = IndexStore::load(
            r#"{"a": [
                {"class": "a/X.html", "name": "a.X"},
                {"class": "a/Y.html", "name": "a.Y"},
                {"object": "a/X$.html", "name": "a.X"}
            ]}"#,
        )
        .unwrap();
        let entities = store.entities_of("a").unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].simple_name, "X");
        assert_eq!(entities[0].kinds().collect::<Vec<_>>(), vec![Kind::Object, Kind::Class]);
    }

    #[test]
    fn test_duplicate_triple_rejected() {
        let msg = malformed(
            r#"{"a": [
                {"trait": "a/X.html", "name": "a.X"},
                {"trait": "a/X2.html", "name": "a.X"}
            ]}"#,
        );
        assert!(msg.contains("duplicate trait 'X'"), "{msg}");
    }

    #[test]
    fn test_same_name_in_different_packages_is_fine() {
        let store = IndexStore::load(
            r#"{"a": [{"class": "a/X.html", "name": "a.X"}],
                "b": [{"class": "b/X.html", "name": "b.X"}]}"#,
        )
        .unwrap();
        assert_eq!(store.entity_count(), 2);
    }

    #[test]
    fn test_record_without_name_or_pages_rejected() {
        let msg = malformed(r#"{"a": [{"class": "a/X.html"}]}"#);
        assert!(msg.contains("has no name"), "{msg}");
        let msg = malformed(r#"{"a": [{"name": "a.X"}]}"#);
        assert!(msg.contains("no documentation pages"), "{msg}");
        malformed(r#"{"a": [{}]}"#);
    }

    #[test]
    fn test_entity_must_belong_to_package() {
        let msg = malformed(r#"{"a.b": [{"class": "c/X.html", "name": "c.X"}]}"#);
        assert!(msg.contains("does not belong"), "{msg}");
        malformed(r#"{"a.b": [{"class": "a/b.html", "name": "a.b"}]}"#);
        malformed(r#"{"a": [{"class": "a/X.html", "name": "a..X"}]}"#);
    }

    #[test]
    fn test_bare_simple_names_accepted() {
        let store = IndexStore::load(r#"{"a.b": [{"class": "a/b/X.html", "name": "X"}]}"#).unwrap();
        let entity = &store.entities_of("a.b").unwrap()[0];
        assert_eq!(entity.simple_name, "X");
        assert_eq!(entity.qualified_name, "a.b.X");
    }

    #[test]
    fn test_root_package() {
        let store = IndexStore::load(
            r#"{"": [{"object": "Top$.html", "name": "Top"}], "a": []}"#,
        )
        .unwrap();
        assert!(store.contains_package(""));
        let root = &store.entities_of("").unwrap()[0];
        assert_eq!(root.qualified_name, "Top");
        assert!(root.package.is_root());
        let top: Vec<&str> = store.subpackages("").unwrap().iter().map(|p| p.as_str()).collect();
        assert_eq!(top, vec!["a"]);
    }

    #[test]
    fn test_entity_shadowed_by_deeper_package_rejected() {
        let msg = malformed(r#"{"a": [{"class": "a/b/X.html", "name": "a.b.X"}], "a.b": []}"#);
        assert_eq!(msg, "entity 'a.b.X' is shadowed by package 'a.b'");

        // Listing order does not matter
        let msg = malformed(r#"{"a.b": [], "a": [{"class": "a/b/X.html", "name": "a.b.X"}]}"#);
        assert!(msg.contains("shadowed by package 'a.b'"), "{msg}");
    }

    #[test]
    fn test_qualified_names_unique_across_packages() {
        let msg = malformed(
            r#"{"a": [{"class": "a/b/X.html", "name": "a.b.X"}],
                "a.b": [{"class": "a/b/X.html", "name": "a.b.X"}]}"#,
        );
        assert_eq!(msg, "entity 'a.b.X' is shadowed by package 'a.b'");

        let msg = malformed(
            r#"{"": [{"object": "a/X$.html", "name": "a.X"}],
                "a": [{"object": "a/X$.html", "name": "a.X"}]}"#,
        );
        assert!(msg.contains("shadowed by package 'a'"), "{msg}");
    }

    #[test]
    fn test_dotted_simple_name_without_shadowing_package() {
        let store = IndexStore::load(
            r#"{"a": [{"object": "a/package$$B$.html", "name": "a.package.B"}], "a.b": []}"#,
        )
        .unwrap();
        let (package, simple) = store.split_qualified("a.package.B").unwrap();
        assert_eq!(package.as_str(), "a");
        assert_eq!(simple, "package.B");
        assert!(store.find_entity("a", "package.B").is_some());
    }

    #[test]
    fn test_invalid_package_name_rejected() {
        let msg = malformed(r#"{"a..b": []}"#);
        assert!(msg.contains("invalid package name"), "{msg}");
    }

    #[test]
    fn test_load_path() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let store = IndexStore::load_path(file.path()).unwrap();
        assert_eq!(store.package_count(), 3);

        let missing = IndexStore::load_path(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(IndexError::Io(_))));
    }

    #[test]
    fn test_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IndexStore>();
    }
}
