//! Search options shared between the pattern transformer and the matcher.
//!
//! Holds the search pattern text and the per-variable constraints, keyed by
//! variable name.

use std::collections::HashMap;
use std::fmt;

use itertools::Itertools;

/// Occurrence bounds and filter conditions for one pattern variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableConstraint {
    pub name: String,
    pub min_count: u32,
    pub max_count: u32,
    /// The regex filter applies inverted.
    pub negated: bool,
    /// Regex filter text. Several `regex(..)` terms are joined with `&&`.
    pub regex: Option<String>,
}

impl VariableConstraint {
    /// Largest count the legacy syntax can express; stands for "no upper bound".
    pub const UNBOUNDED: u32 = i32::MAX as u32;

    /// A constraint matching exactly one occurrence with no filter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_count: 1,
            max_count: 1,
            negated: false,
            regex: None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_count == Self::UNBOUNDED
    }
}

impl fmt::Display for VariableConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{{},", self.name, self.min_count)?;
        if !self.is_unbounded() {
            write!(f, "{}", self.max_count)?;
        }
        write!(f, "}}")?;
        if let Some(regex) = &self.regex {
            let bang = if self.negated { "!" } else { "" };
            write!(f, ":[{bang}regex({regex})]")?;
        }
        Ok(())
    }
}

/// Pattern text plus the constraints attached to its variables.
#[derive(Debug, Default, Clone)]
pub struct MatchOptions {
    search_pattern: String,
    constraints: HashMap<String, VariableConstraint>,
}

impl MatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        Self {
            search_pattern: pattern.into(),
            constraints: HashMap::new(),
        }
    }

    pub fn search_pattern(&self) -> &str {
        &self.search_pattern
    }

    pub fn set_search_pattern(&mut self, pattern: impl Into<String>) {
        self.search_pattern = pattern.into();
    }

    /// Look up the constraint for a variable.
    pub fn variable_constraint(&self, name: &str) -> Option<&VariableConstraint> {
        self.constraints.get(name)
    }

    /// Get the constraint for `name`, creating a default one if absent.
    pub fn get_or_create_constraint(&mut self, name: &str) -> &mut VariableConstraint {
        self.constraints
            .entry(name.to_string())
            .or_insert_with(|| VariableConstraint::new(name))
    }

    pub fn constraints(&self) -> impl Iterator<Item = &VariableConstraint> {
        self.constraints.values()
    }

    /// Names of all constrained variables, sorted.
    pub fn variable_constraint_names(&self) -> Vec<&str> {
        self.constraints.keys().map(String::as_str).sorted().collect()
    }

    pub fn has_constraints(&self) -> bool {
        !self.constraints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_reuses_existing() {
        let mut options = MatchOptions::new();
        options.get_or_create_constraint("a").min_count = 3;
        let again = options.get_or_create_constraint("a");
        assert_eq!(again.min_count, 3);
        assert_eq!(options.constraints().count(), 1);
    }

    #[test]
    fn test_new_constraint_defaults() {
        let mut options = MatchOptions::new();
        let c = options.get_or_create_constraint("x");
        assert_eq!(c.name, "x");
        assert_eq!((c.min_count, c.max_count), (1, 1));
        assert!(!c.negated);
        assert!(c.regex.is_none());
    }

    #[test]
    fn test_names_sorted() {
        let mut options = MatchOptions::new();
        options.get_or_create_constraint("b");
        options.get_or_create_constraint("a");
        options.get_or_create_constraint("c");
        assert_eq!(options.variable_constraint_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_display_bounded() {
        let mut c = VariableConstraint::new("a");
        c.min_count = 0;
        c.max_count = 2;
        assert_eq!(c.to_string(), "a{0,2}");
    }

    #[test]
    fn test_display_unbounded_negated_regex() {
        let mut c = VariableConstraint::new("x");
        c.max_count = VariableConstraint::UNBOUNDED;
        c.negated = true;
        c.regex = Some("foo".to_string());
        assert_eq!(c.to_string(), "x{1,}:[!regex(foo)]");
    }
}
