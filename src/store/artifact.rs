//! Raw artifact decoding.
//!
//! The generator writes either bare JSON or a script assignment:
//!
//! ```text
//! Index.PACKAGES = {"org.saddle.io" : [{"object" : "org\/saddle\/io\/CsvFile$.html",
//!                                       "class" : "org\/saddle\/io\/CsvFile.html",
//!                                       "name" : "org.saddle.io.CsvFile"}, ...], ...};
//! ```
//!
//! Decoding keeps the artifact's key order (packages are listed in
//! insertion order) and rejects repeated keys instead of letting the last
//! one win. Semantic checks (name membership, empty records, cross-record
//! duplicates) happen in [`super::IndexStore::from_raw`].

use std::collections::HashSet;
use std::fmt;

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;

use crate::error::{IndexError, Result};
use crate::model::Kind;

/// Record key carrying the entity's qualified name
pub const NAME_KEY: &str = "name";

/// Undecoded-but-ordered package mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawIndex {
    pub packages: Vec<RawPackage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawPackage {
    pub name: String,
    pub records: Vec<RawRecord>,
}

/// One entity record as written by the generator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub name: Option<String>,
    /// (kind, path) pairs in record order; kinds are unique per record
    pub pages: Vec<(Kind, String)>,
}

/// How the artifact text was wrapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactForm {
    Json,
    Script,
}

/// Strip the script assignment, if any, leaving the JSON object text.
pub fn unwrap_payload(text: &str) -> Result<(ArtifactForm, &str)> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return Ok((ArtifactForm::Json, trimmed));
    }

    let eq = trimmed.find('=').ok_or_else(|| {
        IndexError::MalformedIndex("artifact is neither a JSON object nor an assignment".into())
    })?;
    let payload = trimmed[eq + 1..].trim();
    let payload = payload.strip_suffix(';').unwrap_or(payload).trim_end();
    if !payload.starts_with('{') {
        return Err(IndexError::MalformedIndex(
            "assigned value is not an object".into(),
        ));
    }
    Ok((ArtifactForm::Script, payload))
}

/// Decode artifact text (either form) into the raw ordered mapping.
pub fn parse_artifact(text: &str) -> Result<(ArtifactForm, RawIndex)> {
    let (form, payload) = unwrap_payload(text)?;
    let raw: RawIndex = serde_json::from_str(payload)
        .map_err(|e| IndexError::MalformedIndex(e.to_string()))?;
    Ok((form, raw))
}

// ── Deserialization ────────────────────────────────────────────────

impl<'de> Deserialize<'de> for RawIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(RawIndexVisitor)
    }
}

struct RawIndexVisitor;

impl<'de> Visitor<'de> for RawIndexVisitor {
    type Value = RawIndex;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping package names to entity records")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<RawIndex, A::Error> {
        let mut seen = HashSet::new();
        let mut packages = Vec::new();

        while let Some(name) = map.next_key::<String>()? {
            if !seen.insert(name.clone()) {
                return Err(de::Error::custom(format!("duplicate package '{}'", name)));
            }
            let records = map.next_value_seed(RecordsSeed { package: &name })?;
            packages.push(RawPackage { name, records });
        }

        Ok(RawIndex { packages })
    }
}

/// Decodes one package's record list, naming the package in errors.
struct RecordsSeed<'p> {
    package: &'p str,
}

impl<'de, 'p> DeserializeSeed<'de> for RecordsSeed<'p> {
    type Value = Vec<RawRecord>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, 'p> Visitor<'de> for RecordsSeed<'p> {
    type Value = Vec<RawRecord>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a sequence of entity records for package '{}'", self.package)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
        let mut records = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(record) = seq.next_element::<RawRecord>()? {
            records.push(record);
        }
        Ok(records)
    }
}

impl<'de> Deserialize<'de> for RawRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(RawRecordVisitor)
    }
}

struct RawRecordVisitor;

impl<'de> Visitor<'de> for RawRecordVisitor {
    type Value = RawRecord;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an entity record mapping kinds to page paths")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<RawRecord, A::Error> {
        let mut record = RawRecord::default();

        while let Some(key) = map.next_key::<String>()? {
            if key == NAME_KEY {
                if record.name.is_some() {
                    return Err(de::Error::duplicate_field(NAME_KEY));
                }
                record.name = Some(map.next_value()?);
                continue;
            }

            let kind = Kind::from_label(&key).ok_or_else(|| {
                de::Error::custom(format!("unknown record key '{}'", key))
            })?;
            let path: String = map.next_value()?;
            if path.is_empty() {
                return Err(de::Error::custom(format!("empty path for kind '{}'", kind)));
            }
            if record.pages.iter().any(|(k, _)| *k == kind) {
                return Err(de::Error::custom(format!("kind '{}' repeated in one record", kind)));
            }
            record.pages.push((kind, path));
        }

        Ok(record)
    }
}
