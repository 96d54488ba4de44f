//! Routing configuration.
//!
//! # Data Flow
//! ```text
//! JSON document
//!     → validation.rs validate_shape (types, required/unknown properties)
//!     → schema.rs RoutingConfig (serde)
//!     → validation.rs check_limits (size ceilings)
//!     → compose (rule list)
//! ```
//!
//! # Design Decisions
//! - Shape problems are reported as `RuleError` values, not serde errors
//! - Unknown top-level keys are ignored; unknown keys inside an entry are not
//! - `null` is treated the same as an absent key

pub mod schema;
pub mod validation;

pub use schema::{HeaderEntry, HeaderSource, Redirect, Rewrite, RoutingConfig};
pub use validation::{check_limits, validate_shape, MAX_ITEMS};
