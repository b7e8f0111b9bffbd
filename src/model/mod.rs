//! Index data model: packages, entity kinds, entities and their pages

pub mod name;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IndexError;

pub use name::{is_valid_package_name, split_segments, validate_qualified_name};

// ── Kind ───────────────────────────────────────────────────────────

/// Declaration category of a documented entity.
///
/// One simple name may be documented under several kinds at once
/// (companion `object` next to a `class`, an `object` next to a `trait`).
/// Declaration order here is the order kinds are listed in results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Kind {
    #[serde(rename = "object")]
    Object,
    #[serde(rename = "class")]
    Class,
    #[serde(rename = "trait")]
    Trait,
    #[serde(rename = "case class")]
    CaseClass,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::Object, Kind::Class, Kind::Trait, Kind::CaseClass];

    /// Label used by the generator as the record key
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Object => "object",
            Kind::Class => "class",
            Kind::Trait => "trait",
            Kind::CaseClass => "case class",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Kind::ALL.into_iter().find(|k| k.label() == label)
    }

    /// Singleton declarations (the companion side of a name)
    pub fn is_singleton(&self) -> bool {
        matches!(self, Kind::Object)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Kind {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::from_label(s)
            .ok_or_else(|| IndexError::InvalidName(format!("unknown kind '{}'", s)))
    }
}

// ── Package ────────────────────────────────────────────────────────

/// Dot-separated namespace key. The empty string is the root namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Package(String);

impl Package {
    /// Validated constructor; rejects empty segments (`a..b`, `.a`, `a.`).
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        is_valid_package_name(&name).then_some(Package(name))
    }

    pub fn root() -> Self {
        Package(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        split_segments(&self.0)
    }

    /// Number of segments (0 for root)
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Enclosing namespace; `None` only for the root.
    pub fn parent(&self) -> Option<Package> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('.') {
            Some(pos) => Some(Package(self.0[..pos].to_string())),
            None => Some(Package::root()),
        }
    }

    /// Qualified name of `simple_name` declared in this package
    pub fn qualify(&self, simple_name: &str) -> String {
        if self.is_root() {
            simple_name.to_string()
        } else {
            format!("{}.{}", self.0, simple_name)
        }
    }

    /// If `qualified` names something inside this package, the remainder.
    pub fn strip_from<'q>(&self, qualified: &'q str) -> Option<&'q str> {
        if self.is_root() {
            return Some(qualified);
        }
        qualified
            .strip_prefix(self.0.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .filter(|rest| !rest.is_empty())
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}

// ── RelativePath ───────────────────────────────────────────────────

/// Opaque link fragment to a rendered page, e.g. `org/saddle/io/CsvFile$.html`.
///
/// Stable for one generated snapshot only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelativePath(String);

impl RelativePath {
    pub fn new(path: impl Into<String>) -> Self {
        RelativePath(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join onto a base URL or directory with exactly one `/` in between.
    /// An empty base yields the path unchanged.
    pub fn href(&self, base: &str) -> String {
        let path = self.0.trim_start_matches('/');
        let base = base.trim_end_matches('/');
        if base.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", base, path)
        }
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Entity ─────────────────────────────────────────────────────────

/// One documented name within a package, with every kind it is declared as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub package: Package,
    pub simple_name: String,
    pub qualified_name: String,
    /// Kind → page. Never empty after load.
    pub pages: BTreeMap<Kind, RelativePath>,
}

impl Entity {
    pub fn new(package: Package, simple_name: impl Into<String>) -> Self {
        let simple_name = simple_name.into();
        let qualified_name = package.qualify(&simple_name);
        Self {
            package,
            simple_name,
            qualified_name,
            pages: BTreeMap::new(),
        }
    }

    /// Builder used by tests and fixtures
    pub fn with_page(mut self, kind: Kind, path: impl Into<String>) -> Self {
        self.pages.insert(kind, RelativePath::new(path));
        self
    }

    pub fn page(&self, kind: Kind) -> Option<&RelativePath> {
        self.pages.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = Kind> + '_ {
        self.pages.keys().copied()
    }

    /// A singleton object sharing its name with a class, trait or case class
    pub fn has_companion(&self) -> bool {
        self.pages.contains_key(&Kind::Object) && self.pages.len() > 1
    }
}
