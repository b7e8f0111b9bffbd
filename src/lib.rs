//! apidoc-index - symbol index for generated API documentation
//!
//! Loads the package → entities mapping a documentation generator emits
//! (`Index.PACKAGES = {...};`) into an immutable [`IndexStore`], and answers
//! browser navigation queries through [`QueryService`]:
//!
//! - `resolve` - every (kind, page) a qualified name is documented under
//! - `disambiguate` - narrow to one page, optionally by kind
//! - `search` - qualified-name prefix search in package-then-name order

pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod shared;
pub mod store;

pub use config::IndexConfig;
pub use error::{IndexError, Result};
pub use model::{Entity, Kind, Package, RelativePath};
pub use query::{QueryService, Resolution, Search};
pub use shared::IndexCell;
pub use store::{IndexStats, IndexStore};
