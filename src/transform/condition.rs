//! Conditions attached to a variable reference after `:`.
//!
//! Two forms exist: a bracketed list of condition calls (`'a:[!regex(x) &&
//! regex(y)]`) and the inline regex shorthand (`'a:x+`), which runs up to
//! the next whitespace.

use log::trace;
use phf::{Set, phf_set};

use crate::error::{MalformedKind, TransformError, UnsupportedKind};

use super::parser::{Parser, Result, is_identifier_start};

/// Condition functions that can be turned into a constraint.
const SUPPORTED_CONDITIONS: Set<&'static str> = phf_set! {
    "regex",
};

/// The outcome of a bracketed condition list.
#[derive(Debug, Default, PartialEq)]
struct Condition {
    negated: bool,
    regex: Option<String>,
}

impl Parser<'_, '_> {
    /// Parse whatever follows `:` and attach it to `name`'s constraint.
    pub(super) fn parse_condition(&mut self, name: &str) -> Result<()> {
        let at = self.offset();
        match self.peek() {
            None => Err(TransformError::malformed(MalformedKind::NoOptions, at)),
            Some(c) if c.is_whitespace() => {
                Err(TransformError::malformed(MalformedKind::NoOptions, at))
            }
            Some(':') => {
                // `'T::` is scope resolution, not a condition.
                self.bump();
                self.push_str("::");
                Ok(())
            }
            Some('[') => {
                self.bump();
                let condition = self.parse_condition_list()?;
                let constraint = self.options.get_or_create_constraint(name);
                if let Some(regex) = condition.regex {
                    constraint.negated = condition.negated;
                    constraint.regex = Some(regex);
                }
                trace!("constraint {constraint}");
                Ok(())
            }
            Some(_) => self.parse_inline_regex(name),
        }
    }

    /// Parse `[term && term ...]` (the `[` has already been consumed).
    fn parse_condition_list(&mut self) -> Result<Condition> {
        let mut terms = Vec::new();
        let mut negated = None;
        loop {
            self.skip_whitespace();
            let at = self.offset();
            match self.peek() {
                None => return Err(TransformError::malformed(MalformedKind::UnclosedCondition, at)),
                // Empty list, or a trailing `&&`.
                Some(']') => {
                    self.bump();
                    break;
                }
                _ => {}
            }

            let (term_negated, regex) = self.parse_condition_term()?;
            match negated {
                None => negated = Some(term_negated),
                Some(n) if n != term_negated => {
                    return Err(TransformError::unsupported(UnsupportedKind::MixedNegation, at));
                }
                Some(_) => {}
            }
            terms.push(regex);

            self.skip_whitespace();
            let at = self.offset();
            match self.bump() {
                Some(']') => break,
                Some('&') if self.peek() == Some('&') => {
                    self.bump();
                }
                Some(c) => {
                    return Err(TransformError::malformed(MalformedKind::CombinatorExpected(c), at));
                }
                None => return Err(TransformError::malformed(MalformedKind::UnclosedCondition, at)),
            }
        }

        Ok(Condition {
            negated: negated.unwrap_or(false),
            regex: (!terms.is_empty()).then(|| terms.join("&&")),
        })
    }

    /// Parse one `[!]name(args)` term, returning its negation and argument text.
    fn parse_condition_term(&mut self) -> Result<(bool, String)> {
        let negated = self.peek() == Some('!');
        if negated {
            self.bump();
            self.skip_whitespace();
        }

        let at = self.offset();
        match self.peek() {
            None => return Err(TransformError::malformed(MalformedKind::UnclosedCondition, at)),
            Some(']') if negated => {
                return Err(TransformError::malformed(MalformedKind::EmptyNegatedCondition, at));
            }
            Some(c) if !is_identifier_start(c) => {
                return Err(TransformError::malformed(MalformedKind::ConditionExpected(c), at));
            }
            Some(_) => {}
        }

        let function = self.take_identifier();
        if !SUPPORTED_CONDITIONS.contains(function.as_str()) {
            return Err(TransformError::unsupported(
                UnsupportedKind::UnknownCondition(function),
                at,
            ));
        }

        self.skip_whitespace();
        if self.peek() != Some('(') {
            let at = self.offset();
            return Err(TransformError::malformed(MalformedKind::ArgumentsExpected(function), at));
        }
        self.bump();

        let args = self.parse_arguments(&function, at)?;
        Ok((negated, args))
    }

    /// Collect argument text verbatim up to the matching `)`.
    ///
    /// Parentheses nest and `\` escapes the next character. Reaching `]` or
    /// the end of input leaves the call incomplete.
    fn parse_arguments(&mut self, function: &str, at: usize) -> Result<String> {
        let incomplete = || {
            TransformError::unsupported(UnsupportedKind::IncompleteCondition(function.to_string()), at)
        };

        let mut args = String::new();
        let mut depth = 0usize;
        loop {
            match self.bump() {
                None | Some(']') => return Err(incomplete()),
                Some(')') if depth == 0 => return Ok(args),
                Some(c) => {
                    match c {
                        '(' => depth += 1,
                        ')' => depth -= 1,
                        '\\' => {
                            args.push(c);
                            let escaped = self.bump().ok_or_else(incomplete)?;
                            args.push(escaped);
                            continue;
                        }
                        _ => {}
                    }
                    args.push(c);
                }
            }
        }
    }

    /// Parse the inline shorthand `'a:regex` up to the next unescaped whitespace.
    fn parse_inline_regex(&mut self, name: &str) -> Result<()> {
        let at = self.offset();
        let mut text = String::new();
        while let Some(c) = self.peek()
            && !c.is_whitespace()
        {
            self.bump();
            text.push(c);
            if c == '\\'
                && let Some(escaped) = self.bump()
            {
                text.push(escaped);
            }
        }

        if let Some(existing) = self.inline_regexes.get(name)
            && *existing != text
        {
            return Err(TransformError::malformed(
                MalformedKind::ConflictingRegex {
                    name: name.to_string(),
                },
                at,
            ));
        }

        if let Err(err) = regex::Regex::new(&text) {
            return Err(TransformError::malformed(
                MalformedKind::InvalidRegex {
                    regex: text,
                    reason: err.to_string(),
                },
                at,
            ));
        }

        self.inline_regexes.insert(name.to_string(), text.clone());
        let constraint = self.options.get_or_create_constraint(name);
        constraint.negated = false;
        constraint.regex = Some(text);
        trace!("constraint {constraint}");
        Ok(())
    }
}
