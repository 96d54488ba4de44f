//! # zentinel-routes
//!
//! Routing-rule compiler and validator.
//!
//! Turns high-level routing primitives (clean URLs, trailing slash policy,
//! redirects, custom headers, rewrites) or a hand-written rule list into one
//! ordered list of low-level rules for an edge router to evaluate.
//!
//! ## Features
//!
//! - Path patterns with `:name`, `:name*`, `:name+` and inline regex
//! - Destination templating with positional backreferences
//! - Phase-aware validation of `handle` markers (`filesystem`, `hit`, `miss`)
//! - Every problem collected and reported in one pass
//!
//! ## Quick Start
//!
//! ```ignore
//! use zentinel_routes::compile_str;
//!
//! let compiled = compile_str(r#"{
//!     "cleanUrls": true,
//!     "redirects": [{ "source": "/help", "destination": "/support", "statusCode": 302 }],
//!     "rewrites": [{ "source": "/v1", "destination": "/v2/api.py" }]
//! }"#)?;
//!
//! match compiled.into_result() {
//!     Ok(rules) => println!("{}", serde_json::to_string_pretty(&rules)?),
//!     Err(error) => eprintln!("{}", error),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod compose;
pub mod config;
pub mod convert;
pub mod error;
pub mod normalize;
pub mod pattern;
pub mod rule;

// Re-export main types at crate root
pub use compose::{compile, compile_str, compile_value};
pub use config::RoutingConfig;
pub use convert::{get_clean_urls, CleanUrl};
pub use error::{Error, ErrorCode, Finding, Result, RuleError};
pub use normalize::{normalize_routes, Normalized};
pub use rule::{Handler, Phase, Rule, SourceRule};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
