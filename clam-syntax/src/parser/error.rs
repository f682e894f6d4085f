// This file is part of clam, a POSIX-compatible shell.
// Copyright (C) 2026 The clam developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Definition of errors that happen in the parser
//!
//! Every [`SyntaxError`] carries a stable catalogue code, a message, a
//! default suggestion, a severity, and a recoverability flag. A located
//! [`Error`] wraps the cause together with its span, line/column, a slice
//! of the surrounding token values, and an optional source-line snippet.
//! The [suggester](suggest) enriches errors with typo and context hints.

use crate::lexer::Keyword;
use crate::source::Span;
use itertools::Itertools;
use std::fmt;
use thiserror::Error as ThisError;

/// Severity of a diagnostic
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Fatal,
}

/// Types of syntax errors
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{}", self.message())]
#[non_exhaustive]
pub enum SyntaxError {
    /// A `then` appears where a `;` or newline should separate it from the
    /// condition.
    MissingSemicolonBeforeThen,
    /// A `do` appears in the word list or condition of a loop.
    MissingDoAfter { construct: Keyword },
    /// An `if` command is missing its closing `fi`.
    UnclosedIf { opening: Span },
    /// A loop is missing its closing `done`.
    UnclosedLoop { construct: Keyword, opening: Span },
    /// A `case` command is missing its closing `esac`.
    UnclosedCase { opening: Span },
    /// A clause body contains no commands.
    EmptyBody { construct: Keyword },
    /// A condition contains no commands.
    EmptyCondition { construct: Keyword },
    /// The `then` clause is missing entirely.
    MissingThen { opening: Span },
    /// The `do` clause is missing entirely.
    MissingDo { construct: Keyword, opening: Span },
    /// A command is missing after `|`.
    MissingCommandAfterPipe,
    /// A command is missing after `&&`.
    MissingCommandAfterAnd,
    /// A command is missing after `||`.
    MissingCommandAfterOr,
    /// A redirection operator is missing its target.
    MissingRedirectTarget,
    /// A file descriptor is not usable.
    InvalidFileDescriptor { text: String },
    /// A here-document has no collected body.
    UnclosedHereDocument { delimiter: String },
    /// A function name is not a valid identifier.
    InvalidFunctionName { name: String },
    /// A function definition is missing its body.
    MissingFunctionBody,
    /// A brace group is missing its closing `}`.
    UnclosedBraceGroup { opening: Span },
    /// A subshell is missing its closing `)`.
    UnclosedSubshell { opening: Span },
    /// The level operand of `break`/`continue` is not a positive number.
    InvalidLoopLevel { construct: Keyword, found: String },
    /// A `[[` is missing its closing `]]`.
    UnclosedTestExpression { opening: Span },
    /// An operator invalid in a test expression.
    InvalidTestOperator { found: String },
    /// A `((` is missing its closing `))`.
    UnclosedArithmetic { opening: Span },
    /// `in` is missing after the `case` subject.
    MissingInAfterCase { opening: Span },
    /// The subject word is missing after `case`.
    MissingCaseSubject,
    /// A pattern is missing in a `case` item.
    MissingPattern,
    /// The variable name is missing or invalid in a `for`/`select` loop.
    MissingForVariable { found: String },
    /// A token no grammar rule expected.
    UnexpectedToken {
        found: String,
        expected: Option<String>,
    },
    /// The input ended in the middle of a construct.
    UnexpectedEof { expected: Option<String> },
}

impl SyntaxError {
    /// Returns the stable catalogue code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        use SyntaxError::*;
        match self {
            MissingSemicolonBeforeThen => "E001",
            MissingDoAfter { construct } | MissingDo { construct, .. } => match construct {
                Keyword::While | Keyword::Until => "E003",
                _ => "E002",
            },
            UnclosedIf { .. } | MissingThen { .. } => "E004",
            UnclosedLoop { construct, .. } => match construct {
                Keyword::While | Keyword::Until => "E006",
                _ => "E005",
            },
            UnclosedCase { .. } => "E007",
            EmptyBody { .. } | EmptyCondition { .. } => "E010",
            MissingCommandAfterPipe => "E012",
            MissingCommandAfterAnd => "E013",
            MissingCommandAfterOr => "E014",
            MissingRedirectTarget => "E020",
            InvalidFileDescriptor { .. } => "E021",
            UnclosedHereDocument { .. } => "E022",
            InvalidFunctionName { .. } => "E030",
            MissingFunctionBody => "E031",
            UnclosedBraceGroup { .. } => "E032",
            UnclosedTestExpression { .. } => "E070",
            InvalidTestOperator { .. } => "E071",
            UnclosedArithmetic { .. } => "E053",
            UnexpectedToken { .. } | MissingInAfterCase { .. } | MissingCaseSubject
            | MissingPattern => "E080",
            UnexpectedEof { .. } => "E081",
            UnclosedSubshell { .. } | InvalidLoopLevel { .. } | MissingForVariable { .. } => "E082",
        }
    }

    /// Returns an error message describing the error.
    #[must_use]
    pub fn message(&self) -> String {
        use SyntaxError::*;
        match self {
            MissingSemicolonBeforeThen => "Missing ';' or newline before 'then'".to_string(),
            MissingDoAfter { construct } => {
                format!("Missing ';' or newline before 'do' in {construct} loop")
            }
            UnclosedIf { .. } => "Unclosed 'if' statement".to_string(),
            UnclosedLoop { construct, .. } => format!("Unclosed '{construct}' loop"),
            UnclosedCase { .. } => "Unclosed 'case' statement".to_string(),
            EmptyBody { construct } => format!("Empty '{construct}' clause"),
            EmptyCondition { construct } => format!("Empty condition in '{construct}'"),
            MissingThen { .. } => "Missing 'then' in if statement".to_string(),
            MissingDo { construct, .. } => format!("Missing 'do' in {construct} loop"),
            MissingCommandAfterPipe => "Missing command after pipe '|'".to_string(),
            MissingCommandAfterAnd => "Missing command after '&&'".to_string(),
            MissingCommandAfterOr => "Missing command after '||'".to_string(),
            MissingRedirectTarget => "Missing redirection target".to_string(),
            InvalidFileDescriptor { text } => format!("Invalid file descriptor '{text}'"),
            UnclosedHereDocument { delimiter } => {
                format!("Unclosed here document delimited by '{delimiter}'")
            }
            InvalidFunctionName { name } => format!("Invalid function name '{name}'"),
            MissingFunctionBody => "Missing function body".to_string(),
            UnclosedBraceGroup { .. } => "Unclosed brace group".to_string(),
            UnclosedSubshell { .. } => "Unclosed subshell".to_string(),
            InvalidLoopLevel { construct, found } => {
                format!("'{construct}' level must be a positive number, not '{found}'")
            }
            UnclosedTestExpression { .. } => "Unclosed test expression".to_string(),
            InvalidTestOperator { found } => format!("Invalid test operator '{found}'"),
            UnclosedArithmetic { .. } => "Unclosed arithmetic expression".to_string(),
            MissingInAfterCase { .. } => "Missing 'in' after 'case' subject".to_string(),
            MissingCaseSubject => "Missing subject word after 'case'".to_string(),
            MissingPattern => "Missing pattern in 'case' item".to_string(),
            MissingForVariable { found } => {
                format!("Expected a variable name after 'for', found '{found}'")
            }
            UnexpectedToken { found, expected } => match expected {
                Some(expected) => format!("Unexpected token '{found}', expected {expected}"),
                None => format!("Unexpected token '{found}'"),
            },
            UnexpectedEof { expected } => match expected {
                Some(expected) => format!("Unexpected end of input, expected {expected}"),
                None => "Unexpected end of input".to_string(),
            },
        }
    }

    /// Returns the default suggestion for fixing the error.
    #[must_use]
    pub fn suggestion(&self) -> Option<String> {
        use SyntaxError::*;
        let text = match self {
            MissingSemicolonBeforeThen => "Add ';' before 'then'".to_string(),
            MissingDoAfter { construct } | MissingDo { construct, .. } => match construct {
                Keyword::While | Keyword::Until => {
                    format!("Add 'do' after the condition: {construct} condition; do")
                }
                _ => format!("Add 'do' after the word list: {construct} var in list; do"),
            },
            UnclosedIf { .. } => "Add 'fi' to close the if statement".to_string(),
            UnclosedLoop { construct, .. } => {
                format!("Add 'done' to close the {construct} loop")
            }
            UnclosedCase { .. } => "Add 'esac' to close the case statement".to_string(),
            EmptyBody { construct } => format!("Add commands to the '{construct}' clause"),
            EmptyCondition { construct } => format!("Add a condition after '{construct}'"),
            MissingThen { .. } => "Add 'then' after the condition: if condition; then".to_string(),
            MissingCommandAfterPipe => "Add a command after the pipe operator".to_string(),
            MissingCommandAfterAnd => "Add a command after the && operator".to_string(),
            MissingCommandAfterOr => "Add a command after the || operator".to_string(),
            MissingRedirectTarget => {
                "Add a filename after the redirection operator: > filename".to_string()
            }
            InvalidFileDescriptor { .. } => "File descriptors must be numbers 0-9".to_string(),
            UnclosedHereDocument { delimiter } => {
                format!("Add the delimiter '{delimiter}' on its own line")
            }
            InvalidFunctionName { .. } => {
                "Function names must be valid identifiers (letters, numbers, underscore)"
                    .to_string()
            }
            MissingFunctionBody => {
                "Add braces with commands: function_name() { commands; }".to_string()
            }
            UnclosedBraceGroup { .. } => "Add '}' to close the brace group".to_string(),
            UnclosedSubshell { .. } => "Add ')' to close the subshell".to_string(),
            InvalidLoopLevel { .. } => "Use a positive number, as in 'break 2'".to_string(),
            UnclosedTestExpression { .. } => "Add ']]' to close the test expression".to_string(),
            InvalidTestOperator { .. } => {
                "Use valid test operators like -eq, -ne, -lt, -gt".to_string()
            }
            UnclosedArithmetic { .. } => "Add '))' to close the arithmetic expression".to_string(),
            MissingInAfterCase { .. } => "Add 'in' after the subject: case word in".to_string(),
            MissingCaseSubject => "Add a word to match against: case word in".to_string(),
            MissingPattern => "Add a pattern before ')'".to_string(),
            MissingForVariable { .. } => "Name the loop variable: for var in list".to_string(),
            UnexpectedToken { .. } => "Check syntax around this token".to_string(),
            UnexpectedEof { .. } => "Complete the command or statement".to_string(),
        };
        Some(text)
    }

    /// Returns the severity of this error.
    #[must_use]
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }

    /// Tests whether panic-mode recovery can resume parsing after this
    /// error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SyntaxError::UnexpectedEof { .. })
    }

    /// Returns the opening location of the construct the error is about,
    /// when there is one.
    #[must_use]
    pub fn related_span(&self) -> Option<Span> {
        use SyntaxError::*;
        match self {
            UnclosedIf { opening }
            | UnclosedLoop { opening, .. }
            | UnclosedCase { opening }
            | MissingThen { opening }
            | MissingDo { opening, .. }
            | UnclosedBraceGroup { opening }
            | UnclosedSubshell { opening }
            | UnclosedTestExpression { opening }
            | UnclosedArithmetic { opening }
            | MissingInAfterCase { opening } => Some(*opening),
            _ => None,
        }
    }
}

/// Explanation of a failure in parsing
#[derive(Clone, Debug, PartialEq, ThisError)]
#[error("{cause}")]
pub struct Error {
    /// What went wrong
    pub cause: SyntaxError,
    /// Position of the offending token
    pub span: Span,
    /// 1-based line of the offending token
    pub line: usize,
    /// 1-based column of the offending token
    pub column: usize,
    /// Suggested fix, refined by the suggester
    pub suggestion: Option<String>,
    /// Values of up to three tokens preceding the error, for display
    pub context: Vec<String>,
    /// The offending source line with a caret marker, when the source text
    /// was available
    pub snippet: Option<String>,
}

impl Error {
    /// Returns the stable catalogue code of the underlying cause.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.cause.code()
    }

    /// Returns the severity of the underlying cause.
    #[must_use]
    pub fn severity(&self) -> ErrorSeverity {
        self.cause.severity()
    }
}

/// Typo and context hints for error suggestions
pub mod suggest {
    use super::Keyword;

    /// Command names common enough to be worth a typo hint.
    const COMMON_COMMANDS: [&str; 8] = [
        "echo", "exit", "grep", "cat", "ls", "cd", "read", "printf",
    ];

    /// Computes the edit distance between two short strings.
    fn edit_distance(a: &str, b: &str) -> usize {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let mut row: Vec<usize> = (0..=b.len()).collect();
        for (i, &ca) in a.iter().enumerate() {
            let mut previous_diagonal = row[0];
            row[0] = i + 1;
            for (j, &cb) in b.iter().enumerate() {
                let cost = usize::from(ca != cb);
                let value = (previous_diagonal + cost).min(row[j] + 1).min(row[j + 1] + 1);
                previous_diagonal = row[j + 1];
                row[j + 1] = value;
            }
        }
        row[b.len()]
    }

    /// Suggests a correction when `found` is within a small edit distance
    /// of a keyword or common command.
    #[must_use]
    pub fn typo_hint(found: &str) -> Option<String> {
        if found.len() < 2 {
            return None;
        }
        let budget = if found.len() <= 2 { 1 } else { 2 };
        Keyword::ALL
            .iter()
            .map(|k| k.as_str())
            .chain(COMMON_COMMANDS)
            .filter(|&candidate| candidate != found)
            .map(|candidate| (edit_distance(found, candidate), candidate))
            .filter(|&(distance, _)| distance <= budget)
            .min_by_key(|&(distance, _)| distance)
            .map(|(_, candidate)| format!("Did you mean '{candidate}'?"))
    }

    /// Suggests a fix from the tokens immediately preceding the error.
    #[must_use]
    pub fn context_hint(preceding: &[String]) -> Option<String> {
        let last = preceding.last()?;
        let hint = match last.as_str() {
            "if" | "elif" => "Add a condition: if condition; then",
            "for" => "Add a variable and list: for var in list; do",
            "while" => "Add a condition: while condition; do",
            "until" => "Add a condition: until condition; do",
            "case" => "Add an expression: case expression in",
            "|" => "Add a command after the pipe",
            "&&" => "Add a command after &&",
            "||" => "Add a command after ||",
            ">" | ">>" | "<" => "Add a filename after the redirection",
            _ => return None,
        };
        Some(hint.to_string())
    }

    /// Suggests the token to insert for a (expected, context) pair.
    #[must_use]
    pub fn missing_token_hint(expected: &str, context: &str) -> Option<String> {
        let hint = match (expected, context) {
            ("then", "if") => "Add ';' before 'then': if condition; then",
            ("do", "for") => "Add ';' before 'do': for var in list; do",
            ("do", "while") => "Add ';' before 'do': while condition; do",
            ("fi", "if") => "Close the if statement with 'fi'",
            ("done", "for") | ("done", "while") | ("done", "until") => {
                "Close the loop with 'done'"
            }
            ("esac", "case") => "Close the case statement with 'esac'",
            (")", "(") => "Add a closing parenthesis",
            ("}", "{") => "Add a closing brace",
            ("]]", "[[") => "Add a closing double bracket",
            _ => return None,
        };
        Some(hint.to_string())
    }
}

/// Accumulated result of the parsing phase
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParseReport {
    /// Collected errors, in the order they were produced
    pub errors: Vec<Error>,
    /// Collected warnings (relaxed checks in permissive modes)
    pub warnings: Vec<Error>,
}

impl ParseReport {
    /// Tests whether any error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Tests whether the report is completely empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

impl fmt::Display for ParseReport {
    /// Renders errors then warnings, sorted by position then severity.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let all = self
            .errors
            .iter()
            .map(|e| (e, "error"))
            .chain(self.warnings.iter().map(|e| (e, "warning")))
            .sorted_by_key(|(e, _)| (e.span.start, std::cmp::Reverse(e.severity())));
        for (error, label) in all {
            writeln!(
                f,
                "{}:{}: {label} [{}]: {}",
                error.line,
                error.column,
                error.code(),
                error.cause.message(),
            )?;
            if let Some(suggestion) = &error.suggestion {
                writeln!(f, "    suggestion: {suggestion}")?;
            }
        }
        Ok(())
    }
}
