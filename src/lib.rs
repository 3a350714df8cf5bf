//! Compiles legacy structural search patterns.
//!
//! Legacy patterns mark variables with an apostrophe and may attach
//! occurrence bounds and filters inline. Transforming one yields the
//! normalized `$name$` pattern plus a constraint per annotated variable.
//!
//! # Example
//!
//! ```rust
//! use ssr_legacy::{MatchOptions, VariableConstraint, transform_old_pattern};
//!
//! let mut options = MatchOptions::with_pattern("'obj.'method{0,}:[regex(get.*)]()");
//! transform_old_pattern(&mut options).unwrap();
//!
//! assert_eq!(options.search_pattern(), "$obj$.$method$()");
//!
//! let method = options.variable_constraint("method").unwrap();
//! assert_eq!(method.min_count, 0);
//! assert_eq!(method.max_count, VariableConstraint::UNBOUNDED);
//! assert_eq!(method.regex.as_deref(), Some("get.*"));
//! ```

mod error;
mod options;
pub mod transform;

pub use error::{MalformedKind, TransformError, UnsupportedKind};
pub use options::{MatchOptions, VariableConstraint};
pub use transform::{transform, transform_old_pattern};
