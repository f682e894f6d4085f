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

//! Preorder traversal over the AST
//!
//! The validation-rule pipeline visits every node through [`walk`], which
//! hands each node to the callback as a [`NodeRef`] together with the
//! [`WalkContext`] at that point (loop, function, and case nesting
//! depths).

use clam_syntax::syntax::{
    ArrayAssignment, BreakStatement, CaseItem, Command, CommandList, CompoundCommand,
    CompoundCommandKind, ContinueStatement, FunctionDef, Pipeline, Redirect, SimpleCommand,
    Statement, TestExpr, TopLevel, TopLevelItem, Word,
};

/// Borrowed reference to any AST node
#[derive(Clone, Copy, Debug)]
pub enum NodeRef<'a> {
    TopLevel(&'a TopLevel),
    CommandList(&'a CommandList),
    Statement(&'a Statement),
    Pipeline(&'a Pipeline),
    Command(&'a Command),
    SimpleCommand(&'a SimpleCommand),
    CompoundCommand(&'a CompoundCommand),
    FunctionDef(&'a FunctionDef),
    Redirect(&'a Redirect),
    Word(&'a Word),
    TestExpr(&'a TestExpr),
    CaseItem(&'a CaseItem),
    ArrayAssignment(&'a ArrayAssignment),
    Break(&'a BreakStatement),
    Continue(&'a ContinueStatement),
}

/// Nesting state at the visited node
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WalkContext {
    pub loop_depth: usize,
    pub function_depth: usize,
    pub case_depth: usize,
}

/// Visits every node of the tree in preorder.
pub fn walk<'a, F>(ast: &'a TopLevel, visit: &mut F)
where
    F: FnMut(NodeRef<'a>, WalkContext),
{
    let context = WalkContext::default();
    visit(NodeRef::TopLevel(ast), context);
    for item in &ast.items {
        match item {
            TopLevelItem::Statements(list) => walk_list(list, context, visit),
            TopLevelItem::Function(function) => walk_function(function, context, visit),
            TopLevelItem::Break(statement) => visit(NodeRef::Break(statement), context),
            TopLevelItem::Continue(statement) => visit(NodeRef::Continue(statement), context),
        }
    }
}

fn walk_list<'a, F>(list: &'a CommandList, context: WalkContext, visit: &mut F)
where
    F: FnMut(NodeRef<'a>, WalkContext),
{
    visit(NodeRef::CommandList(list), context);
    for statement in &list.statements {
        walk_statement(statement, context, visit);
    }
}

fn walk_statement<'a, F>(statement: &'a Statement, context: WalkContext, visit: &mut F)
where
    F: FnMut(NodeRef<'a>, WalkContext),
{
    visit(NodeRef::Statement(statement), context);
    match statement {
        Statement::AndOr(list) => {
            for pipeline in &list.pipelines {
                walk_pipeline(pipeline, context, visit);
            }
        }
        Statement::Compound(compound) => walk_compound(compound, context, visit),
        Statement::Function(function) => walk_function(function, context, visit),
        Statement::Break(statement) => visit(NodeRef::Break(statement), context),
        Statement::Continue(statement) => visit(NodeRef::Continue(statement), context),
    }
}

fn walk_pipeline<'a, F>(pipeline: &'a Pipeline, context: WalkContext, visit: &mut F)
where
    F: FnMut(NodeRef<'a>, WalkContext),
{
    visit(NodeRef::Pipeline(pipeline), context);
    for command in &pipeline.commands {
        visit(NodeRef::Command(command), context);
        match command {
            Command::Simple(simple) => walk_simple(simple, context, visit),
            Command::Compound(compound) => walk_compound(compound, context, visit),
            Command::Break(statement) => visit(NodeRef::Break(statement), context),
            Command::Continue(statement) => visit(NodeRef::Continue(statement), context),
        }
    }
}

fn walk_simple<'a, F>(simple: &'a SimpleCommand, context: WalkContext, visit: &mut F)
where
    F: FnMut(NodeRef<'a>, WalkContext),
{
    visit(NodeRef::SimpleCommand(simple), context);
    for word in &simple.words {
        visit(NodeRef::Word(word), context);
    }
    for assignment in &simple.array_assignments {
        visit(NodeRef::ArrayAssignment(assignment), context);
        for element in &assignment.elements {
            visit(NodeRef::Word(element), context);
        }
    }
    for redirect in &simple.redirects {
        visit(NodeRef::Redirect(redirect), context);
    }
}

fn walk_compound<'a, F>(compound: &'a CompoundCommand, context: WalkContext, visit: &mut F)
where
    F: FnMut(NodeRef<'a>, WalkContext),
{
    visit(NodeRef::CompoundCommand(compound), context);
    for redirect in &compound.redirects {
        visit(NodeRef::Redirect(redirect), context);
    }

    let looped = WalkContext {
        loop_depth: context.loop_depth + 1,
        ..context
    };
    match &compound.kind {
        CompoundCommandKind::If {
            condition,
            then_part,
            elif_parts,
            else_part,
        } => {
            walk_list(condition, context, visit);
            walk_list(then_part, context, visit);
            for clause in elif_parts {
                walk_list(&clause.condition, context, visit);
                walk_list(&clause.body, context, visit);
            }
            if let Some(else_part) = else_part {
                walk_list(else_part, context, visit);
            }
        }
        CompoundCommandKind::While { condition, body }
        | CompoundCommandKind::Until { condition, body } => {
            walk_list(condition, context, visit);
            walk_list(body, looped, visit);
        }
        CompoundCommandKind::For { items, body, .. }
        | CompoundCommandKind::Select { items, body, .. } => {
            if let Some(items) = items {
                for item in items {
                    visit(NodeRef::Word(item), context);
                }
            }
            walk_list(body, looped, visit);
        }
        CompoundCommandKind::CStyleFor { body, .. } => {
            walk_list(body, looped, visit);
        }
        CompoundCommandKind::Case { subject, items } => {
            visit(NodeRef::Word(subject), context);
            let in_case = WalkContext {
                case_depth: context.case_depth + 1,
                ..context
            };
            for item in items {
                visit(NodeRef::CaseItem(item), in_case);
                for pattern in &item.patterns {
                    visit(NodeRef::Word(pattern), in_case);
                }
                walk_list(&item.body, in_case, visit);
            }
        }
        CompoundCommandKind::Arithmetic { .. } => {}
        CompoundCommandKind::Test(expr) => walk_test(expr, context, visit),
        CompoundCommandKind::Subshell(body) | CompoundCommandKind::BraceGroup(body) => {
            walk_list(body, context, visit);
        }
    }
}

fn walk_test<'a, F>(expr: &'a TestExpr, context: WalkContext, visit: &mut F)
where
    F: FnMut(NodeRef<'a>, WalkContext),
{
    visit(NodeRef::TestExpr(expr), context);
    match expr {
        TestExpr::Binary { left, right, .. } => {
            visit(NodeRef::Word(left), context);
            visit(NodeRef::Word(right), context);
        }
        TestExpr::Unary { operand, .. } => visit(NodeRef::Word(operand), context),
        TestExpr::Compound { left, right, .. } => {
            walk_test(left, context, visit);
            walk_test(right, context, visit);
        }
        TestExpr::Negated(inner) => walk_test(inner, context, visit),
    }
}

fn walk_function<'a, F>(function: &'a FunctionDef, context: WalkContext, visit: &mut F)
where
    F: FnMut(NodeRef<'a>, WalkContext),
{
    visit(NodeRef::FunctionDef(function), context);
    for redirect in &function.redirects {
        visit(NodeRef::Redirect(redirect), context);
    }
    let inner = WalkContext {
        function_depth: context.function_depth + 1,
        ..context
    };
    walk_list(&function.body, inner, visit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clam_syntax::{ParserConfig, parse_source};

    fn ast_for(source: &str) -> TopLevel {
        let config = ParserConfig::new();
        parse_source(source, &config).unwrap().0
    }

    #[test]
    fn visits_nested_nodes_with_loop_depth() {
        let ast = ast_for("while a; do while b; do break; done; done");
        let mut max_loop_depth = 0;
        walk(&ast, &mut |node, context| {
            if let NodeRef::Break(_) = node {
                max_loop_depth = context.loop_depth;
            }
        });
        assert_eq!(max_loop_depth, 2);
    }

    #[test]
    fn function_depth_is_tracked() {
        let ast = ast_for("f() { echo inside; }");
        let mut saw_word_in_function = false;
        walk(&ast, &mut |node, context| {
            if let NodeRef::Word(word) = node {
                if word.to_string() == "inside" {
                    assert_eq!(context.function_depth, 1);
                    saw_word_in_function = true;
                }
            }
        });
        assert!(saw_word_in_function);
    }

    #[test]
    fn case_items_are_visited() {
        let ast = ast_for("case $x in a) echo a;; b) echo b;; esac");
        let mut case_items = 0;
        walk(&ast, &mut |node, context| {
            if matches!(node, NodeRef::CaseItem(_)) {
                assert_eq!(context.case_depth, 1);
                case_items += 1;
            }
        });
        assert_eq!(case_items, 2);
    }

    #[test]
    fn redirects_are_visited() {
        let ast = ast_for("echo hi > out.txt 2>&1");
        let mut redirects = 0;
        walk(&ast, &mut |node, _| {
            if matches!(node, NodeRef::Redirect(_)) {
                redirects += 1;
            }
        });
        assert_eq!(redirects, 2);
    }
}
