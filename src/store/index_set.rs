//! In-memory secondary indexes over the loaded packages.
//!
//! Built once from the package table right after validation; the store
//! never changes afterwards, so there is no incremental maintenance.

use std::collections::HashMap;

use super::PackageEntry;

/// Position of an entity: (package slot, entity slot within that package).
pub(crate) type EntitySlot = (usize, usize);

/// Secondary indexes for O(1) name lookups and ordered scans.
///
/// - `package_index`: package name → package slot
/// - `name_index`: per package slot, simple name → entity slot
/// - `ordered`: every entity, sorted by package name then simple name
/// - `children`: per package slot, direct sub-packages in insertion order
#[derive(Debug, Default)]
pub(crate) struct IndexSet {
    package_index: HashMap<String, usize>,
    name_index: Vec<HashMap<String, usize>>,
    ordered: Vec<EntitySlot>,
    children: Vec<Vec<usize>>,
}

impl IndexSet {
    /// Build all indexes from the package table in a single pass plus one sort.
    pub fn build(packages: &[PackageEntry]) -> Self {
        let mut package_index = HashMap::with_capacity(packages.len());
        let mut name_index = Vec::with_capacity(packages.len());
        let mut ordered = Vec::new();

        for (pkg_slot, entry) in packages.iter().enumerate() {
            package_index.insert(entry.package.as_str().to_string(), pkg_slot);

            let mut names = HashMap::with_capacity(entry.entities.len());
            for (ent_slot, entity) in entry.entities.iter().enumerate() {
                names.insert(entity.simple_name.clone(), ent_slot);
                ordered.push((pkg_slot, ent_slot));
            }
            name_index.push(names);
        }

        ordered.sort_by(|&(pa, ea), &(pb, eb)| {
            let a = &packages[pa];
            let b = &packages[pb];
            a.package
                .as_str()
                .cmp(b.package.as_str())
                .then_with(|| a.entities[ea].simple_name.cmp(&b.entities[eb].simple_name))
        });

        // Parent links only for parents present in the index; a missing
        // intermediate namespace leaves its children unattached.
        let mut children = vec![Vec::new(); packages.len()];
        for (pkg_slot, entry) in packages.iter().enumerate() {
            if let Some(parent) = entry.package.parent() {
                if let Some(&parent_slot) = package_index.get(parent.as_str()) {
                    children[parent_slot].push(pkg_slot);
                }
            }
        }

        Self {
            package_index,
            name_index,
            ordered,
            children,
        }
    }

    pub fn find_package(&self, name: &str) -> Option<usize> {
        self.package_index.get(name).copied()
    }

    pub fn find_entity(&self, pkg_slot: usize, simple_name: &str) -> Option<usize> {
        self.name_index.get(pkg_slot)?.get(simple_name).copied()
    }

    /// Split a qualified name at the longest package prefix present in the
    /// index. Falls back to the root package when it exists.
    ///
    /// Returns the package slot and the remaining simple name.
    pub fn split_longest_prefix<'q>(&self, qualified: &'q str) -> Option<(usize, &'q str)> {
        for (pos, _) in qualified.rmatch_indices('.') {
            if let Some(slot) = self.find_package(&qualified[..pos]) {
                return Some((slot, &qualified[pos + 1..]));
            }
        }
        self.find_package("").map(|slot| (slot, qualified))
    }

    pub fn ordered(&self) -> &[EntitySlot] {
        &self.ordered
    }

    pub fn children(&self, pkg_slot: usize) -> &[usize] {
        self.children.get(pkg_slot).map(Vec::as_slice).unwrap_or(&[])
    }
}
