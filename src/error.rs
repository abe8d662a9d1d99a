//! Error types for the two parsing surfaces of the crate: the LL(1) language
//! parser and the nom-based `.krb` listing parser, plus the grammar-table
//! configuration errors detected while building the selection table.

use std::fmt::{self, Display};

use itertools::Itertools;
use nom::error::ErrorKind;

use crate::parsing::{line_span, Span};

/// Fatal error produced by the predictive parser at the first point of
/// divergence from the grammar.
///
/// Carries the offending span and the complete set of terminals that would
/// have been accepted there, so callers can render an "expected one of {…}"
/// diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxErrorKind {
    /// The lookahead token matched no acceptable terminal.
    UnexpectedToken {
        expected: Vec<&'static str>,
        found: String,
    },

    /// The token stream ended while the parser still expected input.
    UnexpectedEnd { expected: Vec<&'static str> },

    /// The lexer could not interpret a piece of the input.
    InvalidToken { slice: String },
}

impl SyntaxError {
    pub fn unexpected<S: Into<String>>(
        expected: Vec<&'static str>,
        found: S,
        span: Span,
    ) -> SyntaxError {
        SyntaxError {
            kind: SyntaxErrorKind::UnexpectedToken {
                expected,
                found: found.into(),
            },
            span,
        }
    }

    pub fn end_of_input(expected: Vec<&'static str>, span: Span) -> SyntaxError {
        SyntaxError {
            kind: SyntaxErrorKind::UnexpectedEnd { expected },
            span,
        }
    }

    pub fn invalid_token<S: Into<String>>(slice: S, span: Span) -> SyntaxError {
        SyntaxError {
            kind: SyntaxErrorKind::InvalidToken {
                slice: slice.into(),
            },
            span,
        }
    }

    /// The terminals that would have been accepted at the error location.
    pub fn expected(&self) -> &[&'static str] {
        match &self.kind {
            SyntaxErrorKind::UnexpectedToken { expected, .. } => expected,
            SyntaxErrorKind::UnexpectedEnd { expected } => expected,
            SyntaxErrorKind::InvalidToken { .. } => &[],
        }
    }

    /// Renders the error with line and column information computed from the
    /// original source text.
    pub fn verbose(&self, source: &str) -> String {
        let loc = line_span(source, &self.span);
        format!("at line {} col {}: {}", loc.line, loc.column, self)
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            SyntaxErrorKind::UnexpectedToken { expected, found } => write!(
                f,
                "expected one of {{{}}}, found `{}` at {}..{}",
                expected.iter().join(", "),
                found,
                self.span.start,
                self.span.end,
            ),
            SyntaxErrorKind::UnexpectedEnd { expected } => write!(
                f,
                "expected one of {{{}}}, found end of input",
                expected.iter().join(", "),
            ),
            SyntaxErrorKind::InvalidToken { slice } => write!(
                f,
                "invalid token `{}` at {}..{}",
                slice, self.span.start, self.span.end,
            ),
        }
    }
}

impl std::error::Error for SyntaxError {}

/// A defect in the grammar table itself.
///
/// These are configuration-level errors: they are detected exactly once,
/// while the selection table is built, and can never occur during a parse.
#[derive(Debug, Clone, PartialEq)]
pub enum GrammarError {
    /// Two rules share a name.
    DuplicateRule { nonterminal: &'static str },

    /// A production or declared set mentions a symbol that is neither a
    /// known terminal nor a defined nonterminal.
    UnknownSymbol {
        nonterminal: &'static str,
        symbol: &'static str,
    },

    /// The declared FIRST set disagrees with the one computed from the
    /// productions.
    FirstMismatch {
        nonterminal: &'static str,
        declared: Vec<&'static str>,
        computed: Vec<&'static str>,
    },

    /// The declared FOLLOW set disagrees with the computed one.
    FollowMismatch {
        nonterminal: &'static str,
        declared: Vec<&'static str>,
        computed: Vec<&'static str>,
    },

    /// Two alternatives of one nonterminal are selectable on the same
    /// lookahead terminal, violating the LL(1) invariant.
    SelectionConflict {
        nonterminal: &'static str,
        terminal: &'static str,
        productions: (usize, usize),
    },
}

impl Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GrammarError::DuplicateRule { nonterminal } => {
                write!(f, "nonterminal `{}` is defined twice", nonterminal)
            }
            GrammarError::UnknownSymbol {
                nonterminal,
                symbol,
            } => write!(
                f,
                "rule `{}` references unknown symbol `{}`",
                nonterminal, symbol
            ),
            GrammarError::FirstMismatch {
                nonterminal,
                declared,
                computed,
            } => write!(
                f,
                "FIRST({}) declared as {{{}}} but computes to {{{}}}",
                nonterminal,
                declared.iter().join(", "),
                computed.iter().join(", "),
            ),
            GrammarError::FollowMismatch {
                nonterminal,
                declared,
                computed,
            } => write!(
                f,
                "FOLLOW({}) declared as {{{}}} but computes to {{{}}}",
                nonterminal,
                declared.iter().join(", "),
                computed.iter().join(", "),
            ),
            GrammarError::SelectionConflict {
                nonterminal,
                terminal,
                productions: (a, b),
            } => write!(
                f,
                "alternatives {} and {} of `{}` are both selectable on `{}`",
                a, b, nonterminal, terminal
            ),
        }
    }
}

impl std::error::Error for GrammarError {}

#[derive(Debug, Clone)]
enum ListingErrorKind {
    Incomplete,
    Context(&'static str),
    UnknownMnemonic {
        found: String,
        suggestion: Option<String>,
    },
    Nom(ErrorKind),
}

impl Display for ListingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ListingErrorKind::Incomplete => write!(f, "expected more input"),
            ListingErrorKind::Context(ctx) => write!(f, "invalid {}", ctx),
            ListingErrorKind::UnknownMnemonic { found, suggestion } => {
                write!(f, "unknown mnemonic `{}`", found)?;

                if let Some(suggestion) = suggestion {
                    write!(f, " (did you mean `{}`?)", suggestion)?;
                }

                Ok(())
            }
            ListingErrorKind::Nom(_) => write!(f, "unexpected input"),
        }
    }
}

/// Error raised while parsing a textual `.krb` bytecode listing.
///
/// Stores the unconsumed input alongside the reason; [ListingError::verbose]
/// turns that into line and column numbers.
#[derive(Debug, Clone)]
pub struct ListingError {
    stack: Vec<(String, ListingErrorKind)>,
}

impl ListingError {
    pub(crate) fn incomplete() -> ListingError {
        ListingError {
            stack: vec![(String::new(), ListingErrorKind::Incomplete)],
        }
    }

    pub(crate) fn trailing(input: &str) -> ListingError {
        ListingError {
            stack: vec![(
                input.to_string(),
                ListingErrorKind::Context("trailing input"),
            )],
        }
    }

    pub(crate) fn unknown_mnemonic(
        input: &str,
        found: &str,
        suggestion: Option<String>,
    ) -> ListingError {
        ListingError {
            stack: vec![(
                input.to_string(),
                ListingErrorKind::UnknownMnemonic {
                    found: found.to_string(),
                    suggestion,
                },
            )],
        }
    }

    /// Combines the error with the original input buffer to produce a
    /// located, human-readable message.
    pub fn verbose(&self, input: &str) -> String {
        let (rest, kind) = &self.stack[0];

        let consumed = input.len().saturating_sub(rest.len());
        let loc = line_span(input, &(consumed..consumed));

        let tail: String = input[consumed..].chars().take_while(|c| *c != '\n').take(20).collect();

        format!("at line {} col {}: {}, at '{}'", loc.line, loc.column, kind, tail)
    }
}

impl Display for ListingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (input, kind) = &self.stack[0];

        let head: String = input.chars().take_while(|c| *c != '\n').take(20).collect();

        write!(f, "{} at: {}", kind, head)
    }
}

impl std::error::Error for ListingError {}

impl nom::error::ParseError<&str> for ListingError {
    fn from_error_kind(input: &str, kind: ErrorKind) -> Self {
        ListingError {
            stack: vec![(input.to_string(), ListingErrorKind::Nom(kind))],
        }
    }

    fn append(input: &str, kind: ErrorKind, mut other: Self) -> Self {
        other.stack.push((input.to_string(), ListingErrorKind::Nom(kind)));
        other
    }

    fn add_context(input: &str, ctx: &'static str, mut other: Self) -> Self {
        other
            .stack
            .push((input.to_string(), ListingErrorKind::Context(ctx)));
        other
    }
}
