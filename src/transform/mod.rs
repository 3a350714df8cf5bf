//! Legacy structural search pattern transformer.
//!
//! Rewrites apostrophe-style variable references into `$name$` tokens and
//! records their occurrence bounds and filters as variable constraints.
//!
//! # Legacy syntax
//!
//! | Form              | Meaning                                        |
//! |-------------------|------------------------------------------------|
//! | `'name`           | Variable reference, emitted as `$name$`        |
//! | `'_name`          | Anonymous-style reference, emitted as `$name$` |
//! | `''`              | A literal apostrophe                           |
//! | `\c`              | `c` copied verbatim, never starts a reference  |
//! | `'a{n}`           | Exactly n occurrences                          |
//! | `'a{n,m}`         | Between n and m occurrences                    |
//! | `'a{n,}`          | At least n occurrences                         |
//! | `'a{,m}`          | At most m occurrences                          |
//! | `'a{,}`           | Zero occurrences (legacy)                      |
//! | `'a:re`           | Inline regex filter, up to the next whitespace |
//! | `'a:[regex(re)]`  | Regex filter                                   |
//! | `'a:[!regex(re)]` | Negated regex filter                           |
//! | `'a:[t && t]`     | Conjunction of condition terms                 |
//! | `'T::`            | Scope resolution, not a condition              |

mod condition;
mod parser;

use log::debug;

use crate::error::TransformError;
use crate::options::MatchOptions;

use parser::Parser;

/// Introduces a variable reference in legacy patterns.
pub const LEGACY_MARKER: char = '\'';

/// Surrounds a variable name in normalized patterns.
pub const VARIABLE_DELIMITER: char = '$';

/// Transform the legacy search pattern held by `options` in place.
///
/// On success the search pattern is replaced with its normalized form and
/// constraints are created or updated for every variable carrying a
/// quantifier or condition. On failure the search pattern is left as it
/// was; constraints recorded for references before the failing one are
/// kept.
pub fn transform_old_pattern(options: &mut MatchOptions) -> Result<(), TransformError> {
    let source = options.search_pattern().to_string();
    debug!("transforming legacy pattern {source:?}");

    let normalized = Parser::new(&source, options).run().inspect_err(|err| {
        debug!("legacy pattern rejected: {err}");
    })?;

    debug!("normalized pattern {normalized:?}");
    options.set_search_pattern(normalized);
    Ok(())
}

/// Transform a legacy pattern into fresh [`MatchOptions`].
pub fn transform(pattern: &str) -> Result<MatchOptions, TransformError> {
    let mut options = MatchOptions::with_pattern(pattern);
    transform_old_pattern(&mut options)?;
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_replaced_on_success() {
        let mut options = MatchOptions::with_pattern("for('_t 'a : '_b) {}");
        transform_old_pattern(&mut options).unwrap();
        assert_eq!(options.search_pattern(), "for($t$ $a$ : $b$) {}");
        assert!(!options.has_constraints());
    }

    #[test]
    fn test_pattern_kept_on_failure() {
        let mut options = MatchOptions::with_pattern("'a{1} 'b{x}");
        let err = transform_old_pattern(&mut options).unwrap_err();
        assert!(err.is_malformed());
        assert_eq!(options.search_pattern(), "'a{1} 'b{x}");
        // Constraints made before the failure are not rolled back.
        assert!(options.variable_constraint("a").is_some());
        assert!(options.variable_constraint("b").is_none());
    }

    #[test]
    fn test_transform_helper() {
        let options = transform("'x{2,3}").unwrap();
        assert_eq!(options.search_pattern(), "$x$");
        assert_eq!(options.variable_constraint("x").unwrap().max_count, 3);
    }
}
