//! Errors raised by the legacy pattern transformer.
//!
//! Every failure is exactly one of two kinds: the pattern text is
//! *malformed* (it cannot be parsed), or it is *unsupported* (it parses,
//! but asks for something the transformer cannot honor).

/// Why a legacy pattern could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedKind {
    /// The variable marker was followed by whitespace instead of a name.
    CharacterExpectedAfterQuote,
    /// Input ended in the middle of a variable reference.
    UnexpectedEnd,
    /// A non-digit appeared where a count was expected.
    DigitExpected(char),
    /// A count does not fit in a 32-bit signed integer.
    Overflow,
    /// A quantifier was not closed with `}`.
    MissingClosingBrace,
    /// A quantifier's minimum exceeds its maximum.
    InvalidRange { min: u32, max: u32 },
    /// Nothing usable followed the condition introducer `:`.
    NoOptions,
    /// A bracketed condition list was not closed with `]`.
    UnclosedCondition,
    /// A `!` was not followed by a condition.
    EmptyNegatedCondition,
    /// Something other than a condition term appeared in a condition list.
    ConditionExpected(char),
    /// A condition term was followed by something other than `&&` or `]`.
    CombinatorExpected(char),
    /// A condition name was not followed by `(`.
    ArgumentsExpected(String),
    /// The inline regex shorthand does not compile.
    InvalidRegex { regex: String, reason: String },
    /// A variable was given two different inline regexes.
    ConflictingRegex { name: String },
}

impl std::fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CharacterExpectedAfterQuote => write!(f, "character expected after quote"),
            Self::UnexpectedEnd => write!(f, "unexpected end of pattern"),
            Self::DigitExpected(c) => write!(f, "digit expected, found {c:?}"),
            Self::Overflow => write!(f, "count overflow"),
            Self::MissingClosingBrace => write!(f, "missing closing brace '}}'"),
            Self::InvalidRange { min, max } => {
                write!(f, "minimum count {min} exceeds maximum count {max}")
            }
            Self::NoOptions => write!(f, "no options after ':'"),
            Self::UnclosedCondition => write!(f, "unclosed condition, ']' expected"),
            Self::EmptyNegatedCondition => write!(f, "condition expected after '!'"),
            Self::ConditionExpected(c) => write!(f, "condition expected, found {c:?}"),
            Self::CombinatorExpected(c) => write!(f, "'&&' or ']' expected, found {c:?}"),
            Self::ArgumentsExpected(name) => write!(f, "'(' expected after '{name}'"),
            Self::InvalidRegex { regex, reason } => {
                write!(f, "invalid regular expression {regex:?}: {reason}")
            }
            Self::ConflictingRegex { name } => {
                write!(f, "two different regular expressions for variable '{name}'")
            }
        }
    }
}

/// Why a well-formed legacy pattern cannot be honored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedKind {
    /// A condition function other than `regex`.
    UnknownCondition(String),
    /// A `regex(` whose argument list never closes.
    IncompleteCondition(String),
    /// Negated and non-negated regex terms mixed in one list.
    MixedNegation,
}

impl std::fmt::Display for UnsupportedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCondition(name) => write!(f, "condition '{name}' is not supported"),
            Self::IncompleteCondition(name) => {
                write!(f, "incomplete condition '{name}(': ')' expected")
            }
            Self::MixedNegation => {
                write!(f, "mixing negated and plain regex conditions is not supported")
            }
        }
    }
}

/// A failed transformation. `offset` is the byte offset in the source
/// pattern at which the problem was detected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Malformed pattern at {offset}: {kind}")]
    Malformed { kind: MalformedKind, offset: usize },
    #[error("Unsupported pattern at {offset}: {kind}")]
    Unsupported { kind: UnsupportedKind, offset: usize },
}

impl TransformError {
    pub(crate) fn malformed(kind: MalformedKind, offset: usize) -> Self {
        Self::Malformed { kind, offset }
    }

    pub(crate) fn unsupported(kind: UnsupportedKind, offset: usize) -> Self {
        Self::Unsupported { kind, offset }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Byte offset in the source pattern where the problem was found.
    pub fn offset(&self) -> usize {
        match self {
            Self::Malformed { offset, .. } | Self::Unsupported { offset, .. } => *offset,
        }
    }
}
