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

//! Symbol table for semantic analysis
//!
//! Records functions and variables with their definition sites and
//! used-flags, plus the loop and function nesting the analyser is
//! currently inside. Variables live in the global scope or in the scope of
//! the enclosing function.

use clam_syntax::Span;
use std::collections::HashMap;

/// Record of a defined function
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FunctionInfo {
    pub name: String,
    /// Definition site
    pub span: Span,
    /// Whether any command names the function
    pub used: bool,
}

/// Record of an assigned variable
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariableInfo {
    pub name: String,
    /// First assignment site
    pub span: Span,
    pub readonly: bool,
    pub exported: bool,
    pub used: bool,
}

/// Function and variable records with scope tracking
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    functions: HashMap<String, FunctionInfo>,
    globals: HashMap<String, VariableInfo>,
    /// One variable scope per enclosing function
    function_scopes: Vec<HashMap<String, VariableInfo>>,
    loop_depth: usize,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a function. Returns `false` when the name was already
    /// defined.
    pub fn add_function(&mut self, name: &str, span: Span) -> bool {
        if self.functions.contains_key(name) {
            return false;
        }
        self.functions.insert(
            name.to_string(),
            FunctionInfo {
                name: name.to_string(),
                span,
                used: false,
            },
        );
        true
    }

    /// Tests whether a function with the given name is defined.
    #[must_use]
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Marks a function as used.
    pub fn use_function(&mut self, name: &str) {
        if let Some(info) = self.functions.get_mut(name) {
            info.used = true;
        }
    }

    /// Returns the functions never marked used, in definition order by
    /// position.
    #[must_use]
    pub fn unused_functions(&self) -> Vec<&FunctionInfo> {
        let mut unused: Vec<_> = self.functions.values().filter(|f| !f.used).collect();
        unused.sort_by_key(|f| f.span.start);
        unused
    }

    /// Records an assignment to a variable in the current scope.
    pub fn add_variable(&mut self, name: &str, span: Span) {
        let scope = self.function_scopes.last_mut().unwrap_or(&mut self.globals);
        scope.entry(name.to_string()).or_insert_with(|| VariableInfo {
            name: name.to_string(),
            span,
            readonly: false,
            exported: false,
            used: false,
        });
    }

    /// Marks a variable as readonly, creating it if needed.
    pub fn mark_readonly(&mut self, name: &str, span: Span) {
        self.add_variable(name, span);
        if let Some(info) = self.lookup_mut(name) {
            info.readonly = true;
        }
    }

    /// Marks a variable as exported, creating it if needed.
    pub fn mark_exported(&mut self, name: &str, span: Span) {
        self.add_variable(name, span);
        if let Some(info) = self.lookup_mut(name) {
            info.exported = true;
        }
    }

    /// Tests whether a variable is readonly in any visible scope.
    #[must_use]
    pub fn is_readonly(&self, name: &str) -> bool {
        self.function_scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .or_else(|| self.globals.get(name))
            .is_some_and(|info| info.readonly)
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut VariableInfo> {
        for scope in self.function_scopes.iter_mut().rev() {
            if scope.contains_key(name) {
                return scope.get_mut(name);
            }
        }
        self.globals.get_mut(name)
    }

    /// Enters a function scope.
    pub fn enter_function(&mut self) {
        self.function_scopes.push(HashMap::new());
    }

    /// Leaves the innermost function scope.
    pub fn exit_function(&mut self) {
        self.function_scopes.pop();
    }

    /// Tests whether the analyser is inside a function.
    #[must_use]
    pub fn in_function(&self) -> bool {
        !self.function_scopes.is_empty()
    }

    /// Enters a loop.
    pub fn enter_loop(&mut self) {
        self.loop_depth += 1;
    }

    /// Leaves the innermost loop.
    pub fn exit_loop(&mut self) {
        self.loop_depth = self.loop_depth.saturating_sub(1);
    }

    /// Tests whether the analyser is inside a loop.
    #[must_use]
    pub fn in_loop(&self) -> bool {
        self.loop_depth > 0
    }
}
