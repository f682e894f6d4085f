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

//! Shell command language syntax
//!
//! This module contains types that represent abstract syntax trees (ASTs) of
//! the shell language.
//!
//! The type that represents a whole script is [`TopLevel`], a vector of
//! [`TopLevelItem`]s. Statement sequences are [`CommandList`]s of
//! [`Statement`]s; a statement is an [`AndOrList`] of [`Pipeline`]s or a
//! [`CompoundCommand`] used directly. A pipeline element is a
//! [`SimpleCommand`] or, again, a compound command, whose
//! [`ExecutionContext`] records whether it ran as a statement or as a
//! pipeline component.
//!
//! Command arguments are [`Word`]s: ordered lists of literal and
//! [expansion](Expansion) parts whose concatenation, with expansions
//! evaluated, yields the runtime value. The quote context on each part
//! governs later field splitting and globbing.
//!
//! Nodes own their children; the tree has no cycles, so dropping the
//! [`TopLevel`] root releases everything.

use crate::source::Span;
use std::fmt;

/// Parameter-expansion operator, in `${parameter<operator><word>}`
///
/// Matching against the inner text tries operators in the order this enum
/// is declared in: longer operators come before their prefixes, and `/#`
/// before both `/` and `#`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ParamOperator {
    /// `${#parameter}`
    Length,
    /// `${parameter/#pattern/string}`
    SubstPrefix,
    /// `${parameter/%pattern/string}`
    SubstSuffix,
    /// `${parameter//pattern/string}`
    SubstAll,
    /// `${parameter/pattern/string}`
    Subst,
    /// `${parameter##pattern}`
    RemovePrefixLong,
    /// `${parameter#pattern}`
    RemovePrefixShort,
    /// `${parameter%%pattern}`
    RemoveSuffixLong,
    /// `${parameter%pattern}`
    RemoveSuffixShort,
    /// `${parameter:-word}`
    UseDefault,
    /// `${parameter:=word}`
    AssignDefault,
    /// `${parameter:?word}`
    ErrorIfUnset,
    /// `${parameter:+word}`
    UseAlternative,
    /// `${parameter:offset}` or `${parameter:offset:length}`
    Substring,
}

impl ParamOperator {
    /// Returns the literal operator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        use ParamOperator::*;
        match self {
            Length => "#",
            SubstPrefix => "/#",
            SubstSuffix => "/%",
            SubstAll => "//",
            Subst => "/",
            RemovePrefixLong => "##",
            RemovePrefixShort => "#",
            RemoveSuffixLong => "%%",
            RemoveSuffixShort => "%",
            UseDefault => ":-",
            AssignDefault => ":=",
            ErrorIfUnset => ":?",
            UseAlternative => ":+",
            Substring => ":",
        }
    }
}

impl fmt::Display for ParamOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a process substitution
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ProcessSubstDirection {
    /// `<(...)`: the command's output is read
    In,
    /// `>(...)`: the command's input is written
    Out,
}

/// Expansion producing a runtime value
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Expansion {
    /// `$name`
    Variable { name: String },
    /// `${parameter}`, possibly with an operator and word
    Parameter {
        parameter: String,
        operator: Option<ParamOperator>,
        word: Option<String>,
    },
    /// `$(command)` or `` `command` ``
    CommandSubst { command: String, backquote: bool },
    /// `$((expression))`
    Arithmetic { expression: String },
    /// `<(command)` or `>(command)`
    ProcessSubst {
        command: String,
        direction: ProcessSubstDirection,
    },
}

impl fmt::Display for Expansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expansion::*;
        match self {
            Variable { name } => write!(f, "${name}"),
            Parameter {
                parameter,
                operator: None,
                ..
            } => write!(f, "${{{parameter}}}"),
            Parameter {
                parameter,
                operator: Some(ParamOperator::Length),
                ..
            } => write!(f, "${{#{parameter}}}"),
            Parameter {
                parameter,
                operator: Some(op),
                word,
            } => write!(
                f,
                "${{{parameter}{op}{}}}",
                word.as_deref().unwrap_or_default()
            ),
            CommandSubst {
                command,
                backquote: false,
            } => write!(f, "$({command})"),
            CommandSubst {
                command,
                backquote: true,
            } => write!(f, "`{command}`"),
            Arithmetic { expression } => write!(f, "$(({expression}))"),
            ProcessSubst {
                command,
                direction: ProcessSubstDirection::In,
            } => write!(f, "<({command})"),
            ProcessSubst {
                command,
                direction: ProcessSubstDirection::Out,
            } => write!(f, ">({command})"),
        }
    }
}

/// Element of a [`Word`]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum WordPart {
    /// Literal text
    Literal {
        text: String,
        /// Whether the text was quoted
        quoted: bool,
        /// The quote character in force, if any
        quote_char: Option<char>,
    },
    /// Expansion, with the quote context of the surrounding token
    Expansion {
        expansion: Expansion,
        quote_char: Option<char>,
    },
}

impl WordPart {
    /// Tests whether this part is quoted.
    #[must_use]
    pub fn is_quoted(&self) -> bool {
        match self {
            WordPart::Literal { quoted, .. } => *quoted,
            WordPart::Expansion { quote_char, .. } => quote_char.is_some(),
        }
    }
}

impl fmt::Display for WordPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordPart::Literal { text, .. } => f.write_str(text),
            WordPart::Expansion { expansion, .. } => expansion.fmt(f),
        }
    }
}

/// Token that may involve expansions and quotes
///
/// A word is a sequence of [`WordPart`]s. It depends on context whether an
/// empty word is valid or not.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Word {
    /// Parts that constitute the word
    pub parts: Vec<WordPart>,
    /// Position of the word in the source code
    pub span: Span,
}

impl Word {
    /// Creates a word with a single unquoted literal part.
    #[must_use]
    pub fn from_literal(text: impl Into<String>, span: Span) -> Self {
        Word {
            parts: vec![WordPart::Literal {
                text: text.into(),
                quoted: false,
                quote_char: None,
            }],
            span,
        }
    }

    /// Returns the literal value if no part is an expansion.
    #[must_use]
    pub fn to_string_if_literal(&self) -> Option<String> {
        let mut result = String::new();
        for part in &self.parts {
            match part {
                WordPart::Literal { text, .. } => result.push_str(text),
                WordPart::Expansion { .. } => return None,
            }
        }
        Some(result)
    }

    /// Tests whether any part was quoted.
    #[must_use]
    pub fn is_any_part_quoted(&self) -> bool {
        self.parts.iter().any(WordPart::is_quoted)
    }

    /// Returns the quote character of the first quoted part, if any.
    #[must_use]
    pub fn quote_char(&self) -> Option<char> {
        self.parts.iter().find_map(|part| match part {
            WordPart::Literal { quote_char, .. } => *quote_char,
            WordPart::Expansion { quote_char, .. } => *quote_char,
        })
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            part.fmt(f)?;
        }
        Ok(())
    }
}

/// File descriptor
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fd(pub i32);

impl Fd {
    /// File descriptor for the standard input
    pub const STDIN: Fd = Fd(0);
    /// File descriptor for the standard output
    pub const STDOUT: Fd = Fd(1);
    /// File descriptor for the standard error
    pub const STDERR: Fd = Fd(2);
}

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// File redirection operators
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RedirOp {
    /// `<`
    In,
    /// `>`
    Out,
    /// `>>`
    Append,
}

/// Direction of a file-descriptor duplication
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DupDirection {
    /// `<&`
    In,
    /// `>&`
    Out,
}

/// Target of a file-descriptor duplication
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DupTarget {
    /// Duplicate the given descriptor
    Fd(Fd),
    /// `-`: close the descriptor
    Close,
}

/// Here-document with its collected body
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct HereDoc {
    /// Delimiter word, unquoted
    pub delimiter: String,
    /// Whether the delimiter was quoted, suppressing expansions in the body
    pub quoted: bool,
    /// Whether leading tabs are removed (`<<-`)
    pub remove_tabs: bool,
    /// Body text; ends with a newline unless empty
    pub content: String,
}

/// Part of a redirection that defines the nature of the resulting file
/// descriptor
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum RedirBody {
    /// File redirection
    Normal { operator: RedirOp, target: Word },
    /// File-descriptor duplication
    Dup {
        direction: DupDirection,
        target: DupTarget,
    },
    /// Here-document, with its body already attached
    HereDoc(HereDoc),
    /// `<<<` here-string
    HereString { word: Word },
}

/// Redirection
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Redirect {
    /// File descriptor the redirection modifies, if written explicitly
    pub fd: Option<Fd>,
    /// Nature of the resulting file descriptor
    pub body: RedirBody,
    /// Position of the redirection in the source code
    pub span: Span,
}

impl Redirect {
    /// Computes the file descriptor this redirection modifies.
    ///
    /// If `self.fd` is `None`, the default is selected from the operator:
    /// standard input for input redirections, here-documents, and
    /// here-strings, standard output for output redirections.
    #[must_use]
    pub fn fd_or_default(&self) -> Fd {
        self.fd.unwrap_or(match &self.body {
            RedirBody::Normal {
                operator: RedirOp::In,
                ..
            } => Fd::STDIN,
            RedirBody::Normal { .. } => Fd::STDOUT,
            RedirBody::Dup {
                direction: DupDirection::In,
                ..
            } => Fd::STDIN,
            RedirBody::Dup { .. } => Fd::STDOUT,
            RedirBody::HereDoc(_) | RedirBody::HereString { .. } => Fd::STDIN,
        })
    }
}

/// `name=(element...)` array initialisation in a simple command
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ArrayAssignment {
    /// Name of the array variable
    pub name: String,
    /// Element words, in order
    pub elements: Vec<Word>,
    pub span: Span,
}

/// Command that involves words and redirections
///
/// Scalar assignment words stay in `words` with their verbatim text; array
/// initialisations are recognised specially and stored separately.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SimpleCommand {
    /// Command name and arguments
    pub words: Vec<Word>,
    /// `name=(...)` initialisations
    pub array_assignments: Vec<ArrayAssignment>,
    /// Redirections, in source order
    pub redirects: Vec<Redirect>,
    /// Whether the command is terminated by `&`
    pub background: bool,
    pub span: Span,
}

impl SimpleCommand {
    /// Tests whether the command has no words, assignments, or redirections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.array_assignments.is_empty() && self.redirects.is_empty()
    }

    /// Returns the command name, if the first word is a literal.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.words.first()?.to_string_if_literal()
    }

    /// Renders each word to its source-like text, for display and tests.
    #[must_use]
    pub fn arg_texts(&self) -> Vec<String> {
        self.words.iter().map(Word::to_string).collect()
    }
}

/// Whether a compound command ran as a statement or as a pipeline component
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ExecutionContext {
    #[default]
    Statement,
    Pipeline,
}

/// `elif ...; then ...` clause
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ElifClause {
    pub condition: CommandList,
    pub body: CommandList,
}

/// Symbol that terminates the body of a case branch and determines what to
/// do after executing it
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum CaseContinuation {
    /// `;;` (terminate the case construct)
    #[default]
    Break,
    /// `;&` (unconditionally execute the body of the next branch)
    FallThrough,
    /// `;;&` (resume pattern matching with the next branch)
    Continue,
}

/// Branch of a `case` compound command
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseItem {
    /// Patterns matched against the subject; at least one in valid syntax
    pub patterns: Vec<Word>,
    /// Commands executed when a pattern matches
    pub body: CommandList,
    /// What to do after executing the body
    pub continuation: CaseContinuation,
}

/// The command part of a [`CompoundCommand`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompoundCommandKind {
    /// `if` conditional construct
    If {
        condition: CommandList,
        then_part: CommandList,
        elif_parts: Vec<ElifClause>,
        else_part: Option<CommandList>,
    },
    /// `while` loop
    While {
        condition: CommandList,
        body: CommandList,
    },
    /// `until` loop
    Until {
        condition: CommandList,
        body: CommandList,
    },
    /// `for` loop over a word list
    For {
        variable: String,
        /// `None` when the `in` clause is absent (loop over `"$@"`)
        items: Option<Vec<Word>>,
        body: CommandList,
    },
    /// C-style `for ((init; condition; update))` loop
    ///
    /// The three header sections are stored verbatim; their arithmetic
    /// grammar is parsed by the evaluator at runtime.
    CStyleFor {
        init: String,
        condition: String,
        update: String,
        body: CommandList,
    },
    /// `case` conditional construct
    Case { subject: Word, items: Vec<CaseItem> },
    /// `select` loop
    Select {
        variable: String,
        items: Option<Vec<Word>>,
        body: CommandList,
    },
    /// `((expression))` arithmetic command, expression stored verbatim
    Arithmetic { expression: String },
    /// `[[ expression ]]` conditional
    Test(TestExpr),
    /// `(...)` subshell
    Subshell(CommandList),
    /// `{ ...; }` brace group
    BraceGroup(CommandList),
}

/// Compound command with redirections and its execution context
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompoundCommand {
    /// The main part
    pub kind: CompoundCommandKind,
    /// Redirections applied to the whole construct
    pub redirects: Vec<Redirect>,
    /// Set to [`ExecutionContext::Pipeline`] when the construct is a
    /// pipeline component
    pub execution_context: ExecutionContext,
    /// Whether the construct is terminated by `&`
    pub background: bool,
    pub span: Span,
}

/// `[[ ... ]]` test expression
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TestExpr {
    /// `left op right`, e.g. `$a -lt 3` or `$x == y*`
    Binary {
        operator: String,
        left: Word,
        right: Word,
    },
    /// `op operand`, e.g. `-f file`
    Unary { operator: String, operand: Word },
    /// `left && right` or `left || right`
    Compound {
        left: Box<TestExpr>,
        op: AndOr,
        right: Box<TestExpr>,
    },
    /// `! inner`
    Negated(Box<TestExpr>),
}

/// Element of a pipe sequence
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Simple command
    Simple(SimpleCommand),
    /// Compound command used as a pipeline component
    Compound(CompoundCommand),
    /// `break` used as a pipeline component, as in `cmd && break`
    Break(BreakStatement),
    /// `continue` used as a pipeline component, as in `cmd || continue`
    Continue(ContinueStatement),
}

impl Command {
    /// Returns the position of the command in the source code.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Command::Simple(simple) => simple.span,
            Command::Compound(compound) => compound.span,
            Command::Break(statement) => statement.span,
            Command::Continue(statement) => statement.span,
        }
    }
}

/// Commands separated by `|`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pipeline {
    /// Elements of the pipeline; at least one in valid syntax
    pub commands: Vec<Command>,
    /// Whether the pipeline begins with a `!`
    pub negated: bool,
    pub span: Span,
}

/// Condition that decides whether the next [`Pipeline`] in an
/// [`AndOrList`] should be executed
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AndOr {
    /// `&&`
    AndThen,
    /// `||`
    OrElse,
}

impl AndOr {
    /// Returns the operator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AndOr::AndThen => "&&",
            AndOr::OrElse => "||",
        }
    }
}

impl fmt::Display for AndOr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipelines separated by `&&` and `||`
///
/// Invariant: `operators.len() == pipelines.len() - 1`; operator `i` sits
/// between pipelines `i` and `i + 1`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AndOrList {
    pub pipelines: Vec<Pipeline>,
    pub operators: Vec<AndOr>,
    pub span: Span,
}

/// `break [n]`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BreakStatement {
    /// How many enclosing loops to break out of
    pub level: u32,
    pub span: Span,
}

/// `continue [n]`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ContinueStatement {
    /// Which enclosing loop to continue
    pub level: u32,
    pub span: Span,
}

/// Function definition command
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FunctionDef {
    /// Function name
    pub name: String,
    /// Function body
    pub body: CommandList,
    /// Redirections applied to the body
    pub redirects: Vec<Redirect>,
    pub span: Span,
}

/// One executable statement
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Statement {
    /// Pipelines joined by `&&`/`||`
    AndOr(AndOrList),
    /// Control structure executed as a statement
    Compound(CompoundCommand),
    /// Function definition
    Function(FunctionDef),
    /// `break`
    Break(BreakStatement),
    /// `continue`
    Continue(ContinueStatement),
}

impl Statement {
    /// Returns the position of the statement in the source code.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Statement::AndOr(list) => list.span,
            Statement::Compound(compound) => compound.span,
            Statement::Function(function) => function.span,
            Statement::Break(statement) => statement.span,
            Statement::Continue(statement) => statement.span,
        }
    }
}

/// Sequence of statements
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandList {
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl CommandList {
    /// Tests whether the list contains no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Element of a [`TopLevel`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TopLevelItem {
    /// A run of ordinary statements
    Statements(CommandList),
    /// Function definition
    Function(FunctionDef),
    /// `break` at the top level
    Break(BreakStatement),
    /// `continue` at the top level
    Continue(ContinueStatement),
}

/// Entire script
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TopLevel {
    pub items: Vec<TopLevelItem>,
}

impl TopLevel {
    /// Tests whether the script contains nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str) -> Word {
        Word::from_literal(text, Span::default())
    }

    #[test]
    fn word_to_string_if_literal() {
        assert_eq!(word("foo").to_string_if_literal(), Some("foo".to_string()));

        let with_expansion = Word {
            parts: vec![
                WordPart::Literal {
                    text: "a".to_string(),
                    quoted: false,
                    quote_char: None,
                },
                WordPart::Expansion {
                    expansion: Expansion::Variable {
                        name: "x".to_string(),
                    },
                    quote_char: None,
                },
            ],
            span: Span::default(),
        };
        assert_eq!(with_expansion.to_string_if_literal(), None);
        assert_eq!(with_expansion.to_string(), "a$x");
    }

    #[test]
    fn expansion_display() {
        let expansion = Expansion::Parameter {
            parameter: "USER".to_string(),
            operator: Some(ParamOperator::UseDefault),
            word: Some("nobody".to_string()),
        };
        assert_eq!(expansion.to_string(), "${USER:-nobody}");

        let length = Expansion::Parameter {
            parameter: "x".to_string(),
            operator: Some(ParamOperator::Length),
            word: None,
        };
        assert_eq!(length.to_string(), "${#x}");

        let backquote = Expansion::CommandSubst {
            command: "date".to_string(),
            backquote: true,
        };
        assert_eq!(backquote.to_string(), "`date`");
    }

    #[test]
    fn redirect_default_fds() {
        let out = Redirect {
            fd: None,
            body: RedirBody::Normal {
                operator: RedirOp::Out,
                target: word("file"),
            },
            span: Span::default(),
        };
        assert_eq!(out.fd_or_default(), Fd::STDOUT);

        let heredoc = Redirect {
            fd: None,
            body: RedirBody::HereDoc(HereDoc {
                delimiter: "EOF".to_string(),
                quoted: false,
                remove_tabs: false,
                content: String::new(),
            }),
            span: Span::default(),
        };
        assert_eq!(heredoc.fd_or_default(), Fd::STDIN);

        let explicit = Redirect {
            fd: Some(Fd(7)),
            body: RedirBody::Normal {
                operator: RedirOp::In,
                target: word("x"),
            },
            span: Span::default(),
        };
        assert_eq!(explicit.fd_or_default(), Fd(7));
    }

    #[test]
    fn simple_command_name() {
        let command = SimpleCommand {
            words: vec![word("grep"), word("-v")],
            ..SimpleCommand::default()
        };
        assert_eq!(command.name(), Some("grep".to_string()));
        assert_eq!(command.arg_texts(), ["grep", "-v"]);
        assert!(!command.is_empty());
        assert!(SimpleCommand::default().is_empty());
    }

    #[test]
    fn execution_context_defaults_to_statement() {
        assert_eq!(ExecutionContext::default(), ExecutionContext::Statement);
        assert_eq!(CaseContinuation::default(), CaseContinuation::Break);
    }
}
