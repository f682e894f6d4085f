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

//! Semantic analysis
//!
//! A tree walk over the finished AST that maintains a [symbol
//! table](crate::symbol::SymbolTable) and control-flow flags. A statement
//! is flagged unreachable only when every branch of the preceding
//! statement unconditionally returns or exits; an `if` without `else`
//! never terminates.

use crate::report::{Issue, Severity};
use crate::symbol::SymbolTable;
use clam_syntax::syntax::{
    Command, CommandList, CompoundCommand, CompoundCommandKind, FunctionDef, SimpleCommand,
    Statement, TopLevel, TopLevelItem, Word, WordPart,
};

const RULE: &str = "semantic";

/// Control-flow state after analysing a piece of the tree
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct Flow {
    after_return: bool,
    after_exit: bool,
}

impl Flow {
    fn terminates(self) -> bool {
        self.after_return || self.after_exit
    }
}

/// Tree walker performing the semantic checks
#[derive(Debug, Default)]
pub struct SemanticAnalyzer {
    symbols: SymbolTable,
    issues: Vec<Issue>,
    flow: Flow,
}

impl SemanticAnalyzer {
    /// Creates a fresh analyser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyses the AST and returns the issues found.
    ///
    /// Analysis is a pure function of the tree: running it twice on the
    /// same AST yields the same issues.
    pub fn analyze(mut self, ast: &TopLevel) -> Vec<Issue> {
        // First pass: declare top-level functions, so calls that appear
        // before the definition still count as uses.
        for item in &ast.items {
            if let TopLevelItem::Function(function) = item {
                self.declare_function(function);
            }
        }

        for item in &ast.items {
            match item {
                TopLevelItem::Statements(list) => self.command_list(list),
                TopLevelItem::Function(function) => self.function_body(function),
                TopLevelItem::Break(statement) => self.loop_control("break", statement.span),
                TopLevelItem::Continue(statement) => self.loop_control("continue", statement.span),
            }
        }

        for function in self.symbols.unused_functions() {
            self.issues.push(Issue::new(
                format!("function '{}' is never used", function.name),
                function.span,
                Severity::Info,
                RULE,
            ));
        }

        self.issues
    }

    fn declare_function(&mut self, function: &FunctionDef) {
        if !self.symbols.add_function(&function.name, function.span) {
            self.issues.push(Issue::new(
                format!("function '{}' is already defined", function.name),
                function.span,
                Severity::Error,
                RULE,
            ));
        }
        if function.body.is_empty() {
            self.issues.push(
                Issue::new(
                    format!("function '{}' has an empty body", function.name),
                    function.span,
                    Severity::Warning,
                    RULE,
                )
                .with_suggestion("Add commands to the function or remove it"),
            );
        }
    }

    fn function_body(&mut self, function: &FunctionDef) {
        self.symbols.enter_function();
        let saved = std::mem::take(&mut self.flow);
        self.command_list(&function.body);
        self.flow = saved;
        self.symbols.exit_function();
    }

    fn loop_control(&mut self, name: &str, span: clam_syntax::Span) {
        if !self.symbols.in_loop() {
            self.issues.push(
                Issue::new(
                    format!("{name}: only meaningful in a 'for', 'while', or 'until' loop"),
                    span,
                    Severity::Warning,
                    RULE,
                )
                .with_suggestion(format!("Remove '{name}' or move it inside a loop")),
            );
        }
    }

    fn command_list(&mut self, list: &CommandList) {
        for (index, statement) in list.statements.iter().enumerate() {
            self.statement(statement);
            if self.flow.terminates() && index + 1 < list.statements.len() {
                let next = &list.statements[index + 1];
                self.issues.push(
                    Issue::new(
                        "unreachable code after 'return' or 'exit'",
                        next.span(),
                        Severity::Warning,
                        RULE,
                    )
                    .with_suggestion("Remove the unreachable commands"),
                );
                break;
            }
        }
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::AndOr(list) => {
                for pipeline in &list.pipelines {
                    for command in &pipeline.commands {
                        self.command(command);
                    }
                }
            }
            Statement::Compound(compound) => self.compound(compound),
            Statement::Function(function) => {
                self.declare_function(function);
                self.function_body(function);
            }
            Statement::Break(statement) => self.loop_control("break", statement.span),
            Statement::Continue(statement) => self.loop_control("continue", statement.span),
        }
    }

    fn command(&mut self, command: &Command) {
        match command {
            Command::Simple(simple) => self.simple_command(simple),
            Command::Compound(compound) => self.compound(compound),
            Command::Break(statement) => self.loop_control("break", statement.span),
            Command::Continue(statement) => self.loop_control("continue", statement.span),
        }
    }

    fn simple_command(&mut self, simple: &SimpleCommand) {
        self.record_assignments(simple);

        let Some(name) = simple.name() else { return };
        match name.as_str() {
            "return" => {
                if !self.symbols.in_function() {
                    self.issues.push(
                        Issue::new(
                            "return: can only be used in a function",
                            simple.span,
                            Severity::Warning,
                            RULE,
                        )
                        .with_suggestion("Use 'exit' to leave the script"),
                    );
                }
                self.flow.after_return = true;
            }
            "exit" => self.flow.after_exit = true,
            "readonly" => {
                for word in &simple.words[1..] {
                    if let Some(name) = assigned_name(word) {
                        self.symbols.mark_readonly(&name, word.span);
                    }
                }
            }
            "export" => {
                for word in &simple.words[1..] {
                    if let Some(name) = assigned_name(word) {
                        self.symbols.mark_exported(&name, word.span);
                    }
                }
            }
            _ => {
                if self.symbols.has_function(&name) {
                    self.symbols.use_function(&name);
                }
            }
        }
    }

    /// Records variable assignments and reports writes to readonly
    /// variables.
    fn record_assignments(&mut self, simple: &SimpleCommand) {
        for word in &simple.words {
            // Assignment words precede the command name; stop at the
            // first word that is not one.
            let Some(name) = scalar_assignment_name(word) else {
                break;
            };
            self.check_readonly(&name, word.span);
            self.symbols.add_variable(&name, word.span);
        }
        for assignment in &simple.array_assignments {
            self.check_readonly(&assignment.name, assignment.span);
            self.symbols.add_variable(&assignment.name, assignment.span);
        }
    }

    fn check_readonly(&mut self, name: &str, span: clam_syntax::Span) {
        if self.symbols.is_readonly(name) {
            self.issues.push(
                Issue::new(
                    format!("{name}: readonly variable"),
                    span,
                    Severity::Warning,
                    RULE,
                )
                .with_suggestion(format!("Do not assign to the readonly variable '{name}'")),
            );
        }
    }

    fn compound(&mut self, compound: &CompoundCommand) {
        match &compound.kind {
            CompoundCommandKind::If {
                condition,
                then_part,
                elif_parts,
                else_part,
            } => {
                self.command_list(condition);

                let before = self.flow;
                let mut branch_flows = Vec::new();

                self.flow = Flow::default();
                self.command_list(then_part);
                branch_flows.push(self.flow);

                for clause in elif_parts {
                    self.flow = before;
                    self.command_list(&clause.condition);
                    self.flow = Flow::default();
                    self.command_list(&clause.body);
                    branch_flows.push(self.flow);
                }

                let else_flow = match else_part {
                    Some(body) => {
                        self.flow = Flow::default();
                        self.command_list(body);
                        Some(self.flow)
                    }
                    None => None,
                };

                // The conditional terminates only if the then branch,
                // every elif branch, and a present else branch all do; an
                // if without else can always fall through.
                let all_terminate = else_flow.is_some_and(|flow| {
                    branch_flows
                        .iter()
                        .chain(std::iter::once(&flow))
                        .all(|f| f.terminates())
                });
                let all_return = else_flow.is_some_and(|flow| {
                    branch_flows
                        .iter()
                        .chain(std::iter::once(&flow))
                        .all(|f| f.after_return)
                });
                self.flow = Flow {
                    after_return: before.after_return || (all_terminate && all_return),
                    after_exit: before.after_exit || (all_terminate && !all_return),
                };
            }
            CompoundCommandKind::While { condition, body }
            | CompoundCommandKind::Until { condition, body } => {
                self.command_list(condition);
                self.symbols.enter_loop();
                let saved = self.flow;
                self.command_list(body);
                self.flow = saved;
                self.symbols.exit_loop();
            }
            CompoundCommandKind::For {
                variable,
                items: _,
                body,
            }
            | CompoundCommandKind::Select {
                variable,
                items: _,
                body,
            } => {
                self.symbols.add_variable(variable, compound.span);
                self.symbols.enter_loop();
                let saved = self.flow;
                self.command_list(body);
                self.flow = saved;
                self.symbols.exit_loop();
            }
            CompoundCommandKind::CStyleFor { body, .. } => {
                self.symbols.enter_loop();
                let saved = self.flow;
                self.command_list(body);
                self.flow = saved;
                self.symbols.exit_loop();
            }
            CompoundCommandKind::Case { items, .. } => {
                let saved = self.flow;
                for item in items {
                    self.flow = saved;
                    self.command_list(&item.body);
                }
                self.flow = saved;
            }
            CompoundCommandKind::Arithmetic { .. } | CompoundCommandKind::Test(_) => {}
            CompoundCommandKind::Subshell(body) => {
                // Exits and returns inside a subshell stay inside it.
                let saved = self.flow;
                self.command_list(body);
                self.flow = saved;
            }
            CompoundCommandKind::BraceGroup(body) => self.command_list(body),
        }
    }
}

/// Extracts the variable name from a scalar assignment word
/// (`NAME=VALUE`).
fn scalar_assignment_name(word: &Word) -> Option<String> {
    let WordPart::Literal { text, quoted: false, .. } = word.parts.first()? else {
        return None;
    };
    let (name, _) = text.split_once('=')?;
    let name = name.strip_suffix(['+', '-', '*', '/', '%', '&', '|', '^', '<', '>'])
        .unwrap_or(name)
        .trim_end_matches(['<', '>']);
    let mut chars = name.chars();
    if chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
    {
        Some(name.to_string())
    } else {
        None
    }
}

/// Extracts the variable name from a `readonly`/`export` operand, which
/// may be `NAME` or `NAME=VALUE`.
fn assigned_name(word: &Word) -> Option<String> {
    let literal = word.to_string_if_literal()?;
    let name = literal.split_once('=').map_or(literal.clone(), |(n, _)| n.to_string());
    let mut chars = name.chars();
    if chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
    {
        Some(name)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clam_syntax::{ParserConfig, parse_source};

    fn analyze(source: &str) -> Vec<Issue> {
        let config = ParserConfig::new();
        let (ast, report) = parse_source(source, &config).unwrap();
        assert!(!report.has_errors(), "parse failed: {report:?}");
        SemanticAnalyzer::new().analyze(&ast)
    }

    #[test]
    fn break_outside_loop_warns() {
        let issues = analyze("echo start; break; echo end");
        let warning = issues
            .iter()
            .find(|i| i.severity == Severity::Warning)
            .unwrap();
        assert_eq!(
            warning.message,
            "break: only meaningful in a 'for', 'while', or 'until' loop"
        );
    }

    #[test]
    fn break_inside_loop_is_fine() {
        let issues = analyze("while true; do break; done");
        assert!(issues.iter().all(|i| i.severity != Severity::Warning));
    }

    #[test]
    fn continue_outside_loop_warns() {
        let issues = analyze("continue");
        assert!(issues.iter().any(|i| i.message.starts_with("continue:")));
    }

    #[test]
    fn break_in_pipeline_outside_loop_warns() {
        let issues = analyze("true && break");
        assert!(issues.iter().any(|i| i.message.starts_with("break:")));
    }

    #[test]
    fn break_in_pipeline_inside_loop_is_fine() {
        let issues = analyze("while read x; do test -z $x && break; done");
        assert!(issues.iter().all(|i| i.severity != Severity::Warning));
    }

    #[test]
    fn return_outside_function_warns() {
        let issues = analyze("echo x; return");
        assert!(
            issues
                .iter()
                .any(|i| i.message == "return: can only be used in a function")
        );
    }

    #[test]
    fn return_inside_function_is_fine() {
        let issues = analyze("f() { return; }\nf");
        assert!(
            !issues
                .iter()
                .any(|i| i.message.contains("can only be used"))
        );
    }

    #[test]
    fn duplicate_function_is_an_error() {
        let issues = analyze("f() { echo a; }\nf() { echo b; }\nf");
        assert!(
            issues
                .iter()
                .any(|i| i.severity == Severity::Error && i.message.contains("already defined"))
        );
    }

    #[test]
    fn unused_function_is_reported_as_info() {
        let issues = analyze("helper() { echo hi; }");
        assert!(
            issues
                .iter()
                .any(|i| i.severity == Severity::Info && i.message.contains("never used"))
        );
    }

    #[test]
    fn called_function_is_not_unused() {
        let issues = analyze("helper() { echo hi; }\nhelper");
        assert!(!issues.iter().any(|i| i.message.contains("never used")));
    }

    #[test]
    fn unreachable_after_exit() {
        let issues = analyze("exit 1; echo never");
        assert!(
            issues
                .iter()
                .any(|i| i.message.contains("unreachable"))
        );
    }

    #[test]
    fn if_with_one_returning_branch_is_reachable() {
        let issues = analyze("f() { if a; then return; fi; echo still; }\nf");
        assert!(!issues.iter().any(|i| i.message.contains("unreachable")));
    }

    #[test]
    fn if_with_all_branches_returning_makes_following_unreachable() {
        let issues =
            analyze("f() { if a; then return; else return; fi; echo never; }\nf");
        assert!(issues.iter().any(|i| i.message.contains("unreachable")));
    }

    #[test]
    fn three_way_if_requires_every_branch_to_terminate() {
        // elif branch falls through, so the trailing echo is reachable.
        let reachable = analyze(
            "f() { if a; then return; elif b; then echo on; else return; fi; echo ok; }\nf",
        );
        assert!(!reachable.iter().any(|i| i.message.contains("unreachable")));

        let unreachable = analyze(
            "f() { if a; then return; elif b; then return; else return; fi; echo no; }\nf",
        );
        assert!(unreachable.iter().any(|i| i.message.contains("unreachable")));
    }

    #[test]
    fn readonly_assignment_warns() {
        let issues = analyze("readonly MODE=fast\nMODE=slow");
        assert!(
            issues
                .iter()
                .any(|i| i.message == "MODE: readonly variable")
        );
    }

    #[test]
    fn plain_assignment_does_not_warn() {
        let issues = analyze("MODE=fast\nMODE=slow");
        assert!(!issues.iter().any(|i| i.message.contains("readonly")));
    }

    #[test]
    fn analysis_is_deterministic() {
        let config = ParserConfig::new();
        let (ast, _) = parse_source("helper() { return; }\nbreak", &config).unwrap();
        let first = SemanticAnalyzer::new().analyze(&ast);
        let second = SemanticAnalyzer::new().analyze(&ast);
        assert_eq!(first, second);
    }
}
