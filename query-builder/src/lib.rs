//! Core of a visual query builder for document indices.
//!
//! A [`QueryBuilder`] session keeps a tree of operator and condition blocks,
//! edited through [`QueryTree`]'s structural operations, and compiles it into
//! an Elasticsearch search request with [`QueryCompiler`]. The
//! [`ComparatorRegistry`] tells which comparators apply to each property type
//! of an [`IndexSchema`] and how their values are defaulted, validated,
//! edited and presented.

pub mod block;
pub mod compiler;
pub mod config;
pub mod errors;
pub mod properties_tree;
pub mod registry;
pub mod results;
pub mod schema;
pub mod session;
pub mod validity;

pub use block::{BlockId, ConditionBlock, OperatorBlock, OperatorKind, QueryBlock, QueryTree};
pub use compiler::{Pagination, QueryCompiler, QueryDocument, SortDirection, SortSpec};
pub use config::{QueryBuilderConfig, ViewerTimezone};
pub use errors::{EditError, QueryBuilderError};
pub use properties_tree::PropertiesTree;
pub use registry::{Comparator, ComparatorRegistry, ComparatorValue, DateValue, EditorInput, Space};
pub use results::{QueryResult, QueryResults};
pub use schema::{IndexProperty, IndexSchema, PropertyKind, PropertyType};
pub use session::QueryBuilder;
pub use validity::{EditState, EditValidityTracker};
