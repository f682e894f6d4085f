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

//! Front-end configuration
//!
//! [`ParserConfig`] governs the whole front-end: which dialect the lexer and
//! parser accept, how errors are handled, and which validation passes run on
//! the finished AST. The preset constructors produce the four standard modes.

/// Dialect the front-end accepts
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ParsingMode {
    /// Strict POSIX compliance; all bash extensions rejected
    StrictPosix,
    /// Bash compatibility
    #[default]
    BashCompat,
    /// Bash compatibility with error collection, recovery, and relaxed
    /// keyword checks
    Permissive,
    /// Like permissive, with suggestions always enabled
    Educational,
}

/// How the parser reacts to a syntax error
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ErrorHandling {
    /// Return the first error immediately
    #[default]
    Strict,
    /// Accumulate errors, discarding the statement that failed
    Collect,
    /// Accumulate errors and keep a best-effort partial statement
    Recover,
}

/// Configuration for the lexer, parser, and validator
///
/// A default configuration is bash-compatible and stops at the first parse
/// error. The [`strict_posix`](Self::strict_posix),
/// [`bash_compatible`](Self::bash_compatible),
/// [`permissive`](Self::permissive), and [`educational`](Self::educational)
/// constructors produce the standard presets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParserConfig {
    /// Dialect to accept
    pub parsing_mode: ParsingMode,
    /// Reaction to syntax errors
    pub error_handling: ErrorHandling,
    /// Hard cap on collected errors; parsing stops when exceeded
    pub max_errors: usize,

    /// Recognize alias definitions (reserved for the interactive shell)
    pub enable_aliases: bool,
    /// Recognize function definitions
    pub enable_functions: bool,
    /// Recognize `$((...))` and `((...))`
    pub enable_arithmetic: bool,
    /// Recognize `name=(...)` array initialisation
    pub enable_arrays: bool,
    /// Recognize associative array subscripts
    pub enable_associative_arrays: bool,
    /// Recognize `<(...)` and `>(...)`
    pub enable_process_substitution: bool,
    /// Recognize `{a,b}` brace expansion (lexed as literal word text)
    pub enable_brace_expansion: bool,
    /// Recognize `<<<` here-strings
    pub enable_here_strings: bool,
    /// Recognize extended glob patterns
    pub enable_extended_globbing: bool,
    /// Recognize `[[ ... ]]` conditionals
    pub allow_bash_conditionals: bool,
    /// Recognize `(( ... ))` arithmetic commands and C-style `for`
    pub allow_bash_arithmetic: bool,
    /// Recognize bash-style arrays (`arr[i]=x`)
    pub allow_bash_arrays: bool,

    /// Match keywords case-insensitively
    pub case_insensitive_keywords: bool,

    /// Run the validator at all
    pub enable_validation: bool,
    /// Run the semantic analyser
    pub enable_semantic_analysis: bool,
    /// Run the registered validation rules
    pub enable_validation_rules: bool,
}

impl ParserConfig {
    /// Creates the default, bash-compatible configuration.
    #[must_use]
    pub fn new() -> Self {
        ParserConfig {
            parsing_mode: ParsingMode::BashCompat,
            error_handling: ErrorHandling::Strict,
            max_errors: 10,
            enable_aliases: true,
            enable_functions: true,
            enable_arithmetic: true,
            enable_arrays: true,
            enable_associative_arrays: true,
            enable_process_substitution: true,
            enable_brace_expansion: true,
            enable_here_strings: true,
            enable_extended_globbing: true,
            allow_bash_conditionals: true,
            allow_bash_arithmetic: true,
            allow_bash_arrays: true,
            case_insensitive_keywords: false,
            enable_validation: true,
            enable_semantic_analysis: true,
            enable_validation_rules: true,
        }
    }

    /// Creates a configuration that accepts only strict POSIX syntax.
    ///
    /// All bash-specific toggles are off and the parser stops at the first
    /// error.
    #[must_use]
    pub fn strict_posix() -> Self {
        ParserConfig {
            parsing_mode: ParsingMode::StrictPosix,
            error_handling: ErrorHandling::Strict,
            enable_associative_arrays: false,
            enable_process_substitution: false,
            enable_brace_expansion: false,
            enable_here_strings: false,
            enable_extended_globbing: false,
            allow_bash_conditionals: false,
            allow_bash_arithmetic: false,
            allow_bash_arrays: false,
            enable_arrays: false,
            ..Self::new()
        }
    }

    /// Creates a bash-compatible configuration that collects errors.
    #[must_use]
    pub fn bash_compatible() -> Self {
        ParserConfig {
            error_handling: ErrorHandling::Collect,
            max_errors: 20,
            ..Self::new()
        }
    }

    /// Creates a permissive configuration: error collection with recovery
    /// and relaxed keyword-case and missing-separator checks.
    #[must_use]
    pub fn permissive() -> Self {
        ParserConfig {
            parsing_mode: ParsingMode::Permissive,
            error_handling: ErrorHandling::Recover,
            case_insensitive_keywords: true,
            ..Self::new()
        }
    }

    /// Creates the educational configuration, a permissive mode whose
    /// diagnostics always carry suggestions.
    #[must_use]
    pub fn educational() -> Self {
        ParserConfig {
            parsing_mode: ParsingMode::Educational,
            ..Self::permissive()
        }
    }

    /// Tests whether missing-separator checks are relaxed.
    #[must_use]
    pub fn relaxes_separators(&self) -> bool {
        matches!(
            self.parsing_mode,
            ParsingMode::Permissive | ParsingMode::Educational
        )
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_posix_disables_bash_toggles() {
        let config = ParserConfig::strict_posix();
        assert!(!config.allow_bash_conditionals);
        assert!(!config.allow_bash_arithmetic);
        assert!(!config.allow_bash_arrays);
        assert!(!config.enable_process_substitution);
        assert!(!config.enable_here_strings);
        assert_eq!(config.error_handling, ErrorHandling::Strict);
    }

    #[test]
    fn permissive_enables_recovery() {
        let config = ParserConfig::permissive();
        assert_eq!(config.error_handling, ErrorHandling::Recover);
        assert!(config.case_insensitive_keywords);
        assert!(config.relaxes_separators());
    }

    #[test]
    fn default_is_bash_compatible_and_strict() {
        let config = ParserConfig::default();
        assert_eq!(config.parsing_mode, ParsingMode::BashCompat);
        assert_eq!(config.error_handling, ErrorHandling::Strict);
        assert_eq!(config.max_errors, 10);
    }
}
