//! List query state and its encodings
//!
//! - [`state`]: the filter/sort/pagination value types
//! - [`params`]: an order-preserving query-string container
//! - [`codec`]: conversion between the two
//! - [`source`]: where a list engine reads filters from and mirrors them to

pub mod codec;
pub mod params;
pub mod source;
pub mod state;

pub use params::QueryParams;
pub use source::{
    ExternallySuppliedSource, MemoryRouter, RouteBackedSource, Router, SourceUpdate, StateSource,
};
pub use state::{
    DEFAULT_PAGE_SIZE, DurationBucket, FilterPatch, FilterState, ParseStateError, SortMode,
    ViewMode,
};
