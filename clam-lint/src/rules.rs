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

//! Validation rules
//!
//! Independent [`ValidationRule`]s are invoked on every node of the AST
//! through the [walker](crate::walk). Rules can be disabled by name. The
//! default set covers empty bodies, redirect targets and descriptor
//! ranges, break/continue levels, function names, and empty arithmetic
//! and test operands.

use crate::report::{Issue, Severity};
use crate::walk::{NodeRef, WalkContext, walk};
use clam_syntax::syntax::{
    CompoundCommandKind, DupTarget, RedirBody, TestExpr, TopLevel, Word,
};
use std::collections::HashSet;

/// One independent check invoked on every AST node
pub trait ValidationRule {
    /// Stable rule name used for enabling and disabling.
    fn name(&self) -> &'static str;

    /// Checks one node, returning zero or more issues.
    fn check(&self, node: NodeRef<'_>, context: WalkContext) -> Vec<Issue>;
}

/// Registry of validation rules
pub struct RuleSet {
    rules: Vec<Box<dyn ValidationRule>>,
    disabled: HashSet<&'static str>,
}

impl RuleSet {
    /// Creates an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        RuleSet {
            rules: Vec::new(),
            disabled: HashSet::new(),
        }
    }

    /// Registers a rule.
    pub fn register(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Disables a rule by name.
    pub fn disable(&mut self, name: &'static str) {
        self.disabled.insert(name);
    }

    /// Re-enables a previously disabled rule.
    pub fn enable(&mut self, name: &'static str) {
        self.disabled.remove(name);
    }

    /// Runs every enabled rule on every node of the AST.
    #[must_use]
    pub fn run(&self, ast: &TopLevel) -> Vec<Issue> {
        let mut issues = Vec::new();
        walk(ast, &mut |node, context| {
            for rule in &self.rules {
                if !self.disabled.contains(rule.name()) {
                    issues.extend(rule.check(node, context));
                }
            }
        });
        issues
    }
}

impl Default for RuleSet {
    /// The default registry with all six standard rules.
    fn default() -> Self {
        let mut set = RuleSet::empty();
        set.register(Box::new(NoEmptyBody));
        set.register(Box::new(ValidRedirect));
        set.register(Box::new(CorrectBreakContinue));
        set.register(Box::new(FunctionName));
        set.register(Box::new(ValidArithmetic));
        set.register(Box::new(ValidTestExpression));
        set.register(Box::new(ValidVariableName));
        set
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn word_is_empty(word: &Word) -> bool {
    word.to_string_if_literal().is_some_and(|s| s.is_empty())
}

/// Flags loop, conditional, and case constructs with no commands to run.
struct NoEmptyBody;

impl ValidationRule for NoEmptyBody {
    fn name(&self) -> &'static str {
        "no_empty_body"
    }

    fn check(&self, node: NodeRef<'_>, _context: WalkContext) -> Vec<Issue> {
        let NodeRef::CompoundCommand(compound) = node else {
            return Vec::new();
        };
        let mut issues = Vec::new();
        let mut report = |what: &str, suggestion: &str| {
            issues.push(
                Issue::new(
                    format!("empty {what}"),
                    compound.span,
                    Severity::Warning,
                    "no_empty_body",
                )
                .with_suggestion(suggestion),
            );
        };
        match &compound.kind {
            CompoundCommandKind::While { body, .. } | CompoundCommandKind::Until { body, .. } => {
                if body.is_empty() {
                    report("loop body", "Add commands to the loop body or remove the loop");
                }
            }
            CompoundCommandKind::For { body, .. }
            | CompoundCommandKind::Select { body, .. }
            | CompoundCommandKind::CStyleFor { body, .. } => {
                if body.is_empty() {
                    report("loop body", "Add commands to the loop body or remove the loop");
                }
            }
            CompoundCommandKind::If { then_part, .. } => {
                if then_part.is_empty() {
                    report("'then' clause in if statement", "Add commands to the 'then' clause");
                }
            }
            CompoundCommandKind::Case { items, .. } => {
                if items.is_empty() {
                    report("case statement", "Add case patterns or remove the case statement");
                }
            }
            _ => {}
        }
        issues
    }
}

/// Checks redirect targets and keeps file descriptors in the 0–9 range.
struct ValidRedirect;

impl ValidationRule for ValidRedirect {
    fn name(&self) -> &'static str {
        "valid_redirect"
    }

    fn check(&self, node: NodeRef<'_>, _context: WalkContext) -> Vec<Issue> {
        let NodeRef::Redirect(redirect) = node else {
            return Vec::new();
        };
        let mut issues = Vec::new();
        if let Some(fd) = redirect.fd {
            if !(0..=9).contains(&fd.0) {
                issues.push(
                    Issue::new(
                        format!("invalid file descriptor: {}", fd.0),
                        redirect.span,
                        Severity::Error,
                        "valid_redirect",
                    )
                    .with_suggestion("Use file descriptors 0-9"),
                );
            }
        }
        match &redirect.body {
            RedirBody::Normal { target, .. } => {
                if word_is_empty(target) {
                    issues.push(
                        Issue::new(
                            "redirection missing target",
                            redirect.span,
                            Severity::Error,
                            "valid_redirect",
                        )
                        .with_suggestion("Specify a file or file descriptor for redirection"),
                    );
                }
            }
            RedirBody::Dup {
                target: DupTarget::Fd(fd),
                ..
            } => {
                if !(0..=9).contains(&fd.0) {
                    issues.push(
                        Issue::new(
                            format!("invalid file descriptor: {}", fd.0),
                            redirect.span,
                            Severity::Error,
                            "valid_redirect",
                        )
                        .with_suggestion("Use file descriptors 0-9"),
                    );
                }
            }
            _ => {}
        }
        issues
    }
}

/// Checks that `break N`/`continue N` do not name more loops than enclose
/// them. Plain misplacement outside any loop is the semantic analyser's
/// warning.
struct CorrectBreakContinue;

impl ValidationRule for CorrectBreakContinue {
    fn name(&self) -> &'static str {
        "correct_break_continue"
    }

    fn check(&self, node: NodeRef<'_>, context: WalkContext) -> Vec<Issue> {
        let (name, level, span) = match node {
            NodeRef::Break(statement) => ("break", statement.level, statement.span),
            NodeRef::Continue(statement) => ("continue", statement.level, statement.span),
            _ => return Vec::new(),
        };
        if context.loop_depth > 0 && level as usize > context.loop_depth {
            return vec![
                Issue::new(
                    format!(
                        "'{name} {level}' names more loops than the {} enclosing it",
                        context.loop_depth
                    ),
                    span,
                    Severity::Error,
                    "correct_break_continue",
                )
                .with_suggestion(format!("Use a level of at most {}", context.loop_depth)),
            ];
        }
        Vec::new()
    }
}

/// Rejects function names that collide with shell keywords or start with
/// a digit.
struct FunctionName;

const SHELL_KEYWORDS: [&str; 20] = [
    "if", "then", "else", "elif", "fi", "case", "esac", "for", "while", "until", "do", "done",
    "function", "select", "in", "time", "coproc", "{", "}", "!",
];

impl ValidationRule for FunctionName {
    fn name(&self) -> &'static str {
        "function_name"
    }

    fn check(&self, node: NodeRef<'_>, _context: WalkContext) -> Vec<Issue> {
        let NodeRef::FunctionDef(function) = node else {
            return Vec::new();
        };
        let mut issues = Vec::new();
        if SHELL_KEYWORDS.contains(&function.name.as_str()) {
            issues.push(
                Issue::new(
                    format!("function name '{}' conflicts with a shell keyword", function.name),
                    function.span,
                    Severity::Error,
                    "function_name",
                )
                .with_suggestion(format!("Use a different name for function '{}'", function.name)),
            );
        }
        if function.name.starts_with(|c: char| c.is_ascii_digit()) {
            issues.push(
                Issue::new(
                    format!("function name '{}' cannot start with a digit", function.name),
                    function.span,
                    Severity::Error,
                    "function_name",
                )
                .with_suggestion("Start the function name with a letter or underscore"),
            );
        }
        issues
    }
}

/// Flags empty arithmetic expressions.
struct ValidArithmetic;

impl ValidationRule for ValidArithmetic {
    fn name(&self) -> &'static str {
        "valid_arithmetic"
    }

    fn check(&self, node: NodeRef<'_>, _context: WalkContext) -> Vec<Issue> {
        let NodeRef::CompoundCommand(compound) = node else {
            return Vec::new();
        };
        let CompoundCommandKind::Arithmetic { expression } = &compound.kind else {
            return Vec::new();
        };
        if expression.trim().is_empty() {
            return vec![
                Issue::new(
                    "empty arithmetic expression",
                    compound.span,
                    Severity::Warning,
                    "valid_arithmetic",
                )
                .with_suggestion("Add an arithmetic expression or remove ((...))"),
            ];
        }
        Vec::new()
    }
}

/// Flags test expressions with empty operands.
struct ValidTestExpression;

impl ValidationRule for ValidTestExpression {
    fn name(&self) -> &'static str {
        "valid_test_expression"
    }

    fn check(&self, node: NodeRef<'_>, _context: WalkContext) -> Vec<Issue> {
        let NodeRef::TestExpr(expr) = node else {
            return Vec::new();
        };
        let empty = match expr {
            TestExpr::Binary { left, right, .. } => word_is_empty(left) || word_is_empty(right),
            TestExpr::Unary { operand, .. } => word_is_empty(operand),
            _ => false,
        };
        if empty {
            let span = match expr {
                TestExpr::Binary { left, .. } => left.span,
                TestExpr::Unary { operand, .. } => operand.span,
                _ => clam_syntax::Span::default(),
            };
            return vec![
                Issue::new(
                    "empty operand in test expression",
                    span,
                    Severity::Warning,
                    "valid_test_expression",
                )
                .with_suggestion("Add a test condition or remove [[ ]]"),
            ];
        }
        Vec::new()
    }
}

/// Checks variable names in array assignments.
struct ValidVariableName;

impl ValidationRule for ValidVariableName {
    fn name(&self) -> &'static str {
        "valid_variable_name"
    }

    fn check(&self, node: NodeRef<'_>, _context: WalkContext) -> Vec<Issue> {
        let NodeRef::ArrayAssignment(assignment) = node else {
            return Vec::new();
        };
        if !is_identifier(&assignment.name) {
            return vec![
                Issue::new(
                    format!("invalid variable name '{}'", assignment.name),
                    assignment.span,
                    Severity::Error,
                    "valid_variable_name",
                )
                .with_suggestion(
                    "Variable names must start with a letter or underscore and contain \
                     only alphanumeric characters",
                ),
            ];
        }
        Vec::new()
    }
}
