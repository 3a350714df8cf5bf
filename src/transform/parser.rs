//! Single-pass scanner for legacy patterns.
//!
//! Scanning and emission are interleaved: text outside variable references
//! is copied to the output as it is read, and each reference is rewritten
//! to its `$name$` token the moment its name has been consumed.

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::CharIndices;

use log::trace;

use crate::error::{MalformedKind, TransformError};
use crate::options::{MatchOptions, VariableConstraint};

use super::{LEGACY_MARKER, VARIABLE_DELIMITER};

pub(super) type Result<T> = std::result::Result<T, TransformError>;

pub(super) struct Parser<'a, 'o> {
    pub(super) source: &'a str,
    pub(super) chars: Peekable<CharIndices<'a>>,
    pub(super) options: &'o mut MatchOptions,
    /// Inline shorthand regexes seen so far in this call, by variable name.
    pub(super) inline_regexes: HashMap<String, String>,
    out: String,
    anonymous_count: usize,
}

impl<'a, 'o> Parser<'a, 'o> {
    pub(super) fn new(source: &'a str, options: &'o mut MatchOptions) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            options,
            inline_regexes: HashMap::new(),
            out: String::with_capacity(source.len()),
            anonymous_count: 0,
        }
    }

    /// Scan the whole source and return the normalized pattern.
    pub(super) fn run(mut self) -> Result<String> {
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    // An escaped character is copied as-is and never starts a reference.
                    self.out.push(c);
                    if let Some(escaped) = self.bump() {
                        self.out.push(escaped);
                    }
                }
                LEGACY_MARKER => self.parse_marker()?,
                _ => self.out.push(c),
            }
        }
        Ok(self.out)
    }

    /// Handle what follows a marker (the marker itself has been consumed).
    fn parse_marker(&mut self) -> Result<()> {
        match self.peek() {
            Some(LEGACY_MARKER) => {
                self.bump();
                self.out.push(LEGACY_MARKER);
            }
            Some(c) if is_identifier_start(c) => self.parse_reference()?,
            Some(c) if c.is_whitespace() => {
                return Err(TransformError::malformed(
                    MalformedKind::CharacterExpectedAfterQuote,
                    self.offset(),
                ));
            }
            _ => self.out.push(LEGACY_MARKER),
        }
        Ok(())
    }

    /// Parse `name`, an optional `{quantifier}` and an optional `:condition`.
    fn parse_reference(&mut self) -> Result<()> {
        let name = self.variable_name();
        trace!("variable reference '{name}'");

        self.out.push(VARIABLE_DELIMITER);
        self.out.push_str(&name);
        self.out.push(VARIABLE_DELIMITER);

        if self.peek() == Some('{') {
            self.bump();
            let (min, max) = self.parse_quantifier()?;
            let constraint = self.options.get_or_create_constraint(&name);
            constraint.min_count = min;
            constraint.max_count = max;
            trace!("constraint {constraint}");
        }

        if self.peek() == Some(':') {
            self.bump();
            self.parse_condition(&name)?;
        }
        Ok(())
    }

    /// Consume an identifier and map it to the variable name it stands for.
    ///
    /// One leading `_` is the anonymous marker and is dropped; a bare `_`
    /// gets a generated name.
    fn variable_name(&mut self) -> String {
        let ident = self.take_identifier();
        match ident.strip_prefix('_') {
            Some("") => {
                self.anonymous_count += 1;
                format!("__{}", self.anonymous_count)
            }
            Some(rest) => rest.to_string(),
            None => ident,
        }
    }

    /// Parse a `{n}`, `{n,m}`, `{n,}`, `{,m}` or `{,}` quantifier (the `{` has
    /// already been consumed).
    fn parse_quantifier(&mut self) -> Result<(u32, u32)> {
        let min = self.parse_count()?;

        let at = self.offset();
        match self.bump() {
            None => Err(TransformError::malformed(MalformedKind::UnexpectedEnd, at)),
            Some('}') => {
                let n = min.unwrap_or(0);
                Ok((n, n))
            }
            Some(',') => {
                let max = self.parse_count()?;

                let at = self.offset();
                match self.bump() {
                    Some('}') => {}
                    Some(c) => {
                        return Err(TransformError::malformed(MalformedKind::DigitExpected(c), at));
                    }
                    None => {
                        return Err(TransformError::malformed(
                            MalformedKind::MissingClosingBrace,
                            at,
                        ));
                    }
                }

                match (min, max) {
                    (None, None) => Ok((0, 0)), // {,}
                    (Some(n), None) => Ok((n, VariableConstraint::UNBOUNDED)),
                    (None, Some(m)) => Ok((0, m)),
                    (Some(n), Some(m)) if n <= m => Ok((n, m)),
                    (Some(n), Some(m)) => Err(TransformError::malformed(
                        MalformedKind::InvalidRange { min: n, max: m },
                        at,
                    )),
                }
            }
            Some(c) => Err(TransformError::malformed(MalformedKind::DigitExpected(c), at)),
        }
    }

    /// Parse a run of ASCII digits. Returns `None` if there are none.
    fn parse_count(&mut self) -> Result<Option<u32>> {
        let start = self.offset();
        let mut value: Option<u32> = None;
        while let Some(digit) = self.peek().and_then(|c| c.to_digit(10)) {
            self.bump();
            let next = value
                .unwrap_or(0)
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .filter(|&v| v <= VariableConstraint::UNBOUNDED)
                .ok_or_else(|| TransformError::malformed(MalformedKind::Overflow, start))?;
            value = Some(next);
        }
        Ok(value)
    }

    pub(super) fn take_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.peek()
            && is_identifier_part(c)
        {
            ident.push(c);
            self.bump();
        }
        ident
    }

    pub(super) fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    pub(super) fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    pub(super) fn bump(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    /// Byte offset of the next unread character.
    pub(super) fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.source.len(), |&(i, _)| i)
    }

    pub(super) fn push_str(&mut self, s: &str) {
        self.out.push_str(s);
    }
}

pub(super) fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

pub(super) fn is_identifier_part(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(s: &str) -> Result<(String, MatchOptions)> {
        let mut options = MatchOptions::new();
        let out = Parser::new(s, &mut options).run()?;
        Ok((out, options))
    }

    fn parse_ok(s: &str) -> (String, MatchOptions) {
        run(s).expect("transform should succeed")
    }

    fn parse_err(s: &str) -> TransformError {
        run(s).expect_err("transform should fail")
    }

    fn bounds(options: &MatchOptions, name: &str) -> (u32, u32) {
        let c = options
            .variable_constraint(name)
            .expect("constraint should exist");
        (c.min_count, c.max_count)
    }

    // --- Scanning ---

    #[test]
    fn test_plain_text_is_copied() {
        let (out, options) = parse_ok("System.out.println(\"hi\");");
        assert_eq!(out, "System.out.println(\"hi\");");
        assert!(!options.has_constraints());
    }

    #[test]
    fn test_reference_without_constraint() {
        let (out, options) = parse_ok("'x.foo()");
        assert_eq!(out, "$x$.foo()");
        assert!(options.variable_constraint("x").is_none());
    }

    #[test]
    fn test_anonymous_prefix_dropped() {
        let (out, _) = parse_ok("'_t");
        assert_eq!(out, "$t$");
    }

    #[test]
    fn test_bare_underscore_gets_fresh_names() {
        let (out, _) = parse_ok("'_ + '_");
        assert_eq!(out, "$__1$ + $__2$");
    }

    #[test]
    fn test_doubled_marker_is_literal() {
        let (out, options) = parse_ok("char c = ''x'';");
        assert_eq!(out, "char c = 'x';");
        assert!(!options.has_constraints());
    }

    #[test]
    fn test_escaped_marker_is_copied() {
        let (out, _) = parse_ok(r"\'a 'b");
        assert_eq!(out, r"\'a $b$");
    }

    #[test]
    fn test_marker_before_non_identifier_is_copied() {
        let (out, _) = parse_ok("'1'+'");
        assert_eq!(out, "'1'+'");
    }

    #[test]
    fn test_marker_then_space() {
        let err = parse_err("' asdf");
        assert_eq!(
            err,
            TransformError::malformed(MalformedKind::CharacterExpectedAfterQuote, 1)
        );
    }

    #[test]
    fn test_unicode_name() {
        let (out, _) = parse_ok("'größe;");
        assert_eq!(out, "$größe$;");
    }

    // --- Quantifiers ---

    #[test]
    fn test_exact_count() {
        let (out, options) = parse_ok("'a{3};");
        assert_eq!(out, "$a$;");
        assert_eq!(bounds(&options, "a"), (3, 3));
    }

    #[test]
    fn test_range() {
        let (_, options) = parse_ok("'a{2,5}");
        assert_eq!(bounds(&options, "a"), (2, 5));
    }

    #[test]
    fn test_at_least() {
        let (_, options) = parse_ok("'a{2,}");
        assert_eq!(bounds(&options, "a"), (2, VariableConstraint::UNBOUNDED));
    }

    #[test]
    fn test_up_to() {
        let (_, options) = parse_ok("'a{,4}");
        assert_eq!(bounds(&options, "a"), (0, 4));
    }

    #[test]
    fn test_zero_occurs() {
        let (_, options) = parse_ok("'a{,}");
        assert_eq!(bounds(&options, "a"), (0, 0));
    }

    #[test]
    fn test_empty_braces() {
        let (_, options) = parse_ok("'a{}");
        assert_eq!(bounds(&options, "a"), (0, 0));
    }

    #[test]
    fn test_largest_count() {
        let (_, options) = parse_ok("'a{2147483647}");
        assert_eq!(
            bounds(&options, "a"),
            (VariableConstraint::UNBOUNDED, VariableConstraint::UNBOUNDED)
        );
    }

    #[test]
    fn test_overflow() {
        assert!(matches!(
            parse_err("'a{2147483648}"),
            TransformError::Malformed {
                kind: MalformedKind::Overflow,
                offset: 3
            }
        ));
        assert!(matches!(
            parse_err("'a{1,99999999999}"),
            TransformError::Malformed {
                kind: MalformedKind::Overflow,
                ..
            }
        ));
    }

    #[test]
    fn test_unexpected_end() {
        assert!(matches!(
            parse_err("'_a{"),
            TransformError::Malformed {
                kind: MalformedKind::UnexpectedEnd,
                ..
            }
        ));
    }

    #[test]
    fn test_digit_expected() {
        assert!(matches!(
            parse_err("'a{a"),
            TransformError::Malformed {
                kind: MalformedKind::DigitExpected('a'),
                ..
            }
        ));
        assert!(matches!(
            parse_err("'a{1,a}"),
            TransformError::Malformed {
                kind: MalformedKind::DigitExpected('a'),
                ..
            }
        ));
    }

    #[test]
    fn test_missing_brace() {
        assert!(matches!(
            parse_err("'a{1,3"),
            TransformError::Malformed {
                kind: MalformedKind::MissingClosingBrace,
                ..
            }
        ));
    }

    #[test]
    fn test_inverted_range() {
        assert!(matches!(
            parse_err("'a{5,2}"),
            TransformError::Malformed {
                kind: MalformedKind::InvalidRange { min: 5, max: 2 },
                ..
            }
        ));
    }

    #[test]
    fn test_requantify_updates_existing() {
        let (out, options) = parse_ok("'a{1} 'a{2,3}");
        assert_eq!(out, "$a$ $a$");
        assert_eq!(bounds(&options, "a"), (2, 3));
        assert_eq!(options.constraints().count(), 1);
    }
}
