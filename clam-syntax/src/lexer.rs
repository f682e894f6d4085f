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

//! Lexical analysis
//!
//! [`tokenize`] converts source text into an ordered token stream terminated
//! by an end-of-input token, together with a map of collected here-document
//! bodies and a [report](LexReport) of everything found wrong along the way.
//! Lexing never fails: damaged constructs produce best-effort tokens whose
//! metadata carries a structured [`LexerError`](token::LexerError).
//!
//! The work happens in two passes. The primary pass recognises lexemes with
//! full context awareness; a second pass
//! [normalises keywords](keyword::normalize_keywords), rewriting words in
//! command position to reserved-word kinds.

mod assignment;
mod balance;
mod brackets;
pub mod core;
mod expansion;
pub mod heredoc;
pub mod keyword;
mod op;
mod quoted;
pub mod token;

pub use self::core::{LexDiagnostic, LexReport, Lexer, is_blank};
pub use self::heredoc::{HeredocBody, HeredocMap};
pub use self::keyword::{Keyword, ParseKeywordError, normalize_keywords};
pub use self::token::{
    AssignOp, AssignmentMeta, LexErrorKind, LexerError, SemanticType, Token, TokenContext,
    TokenKind, TokenMetadata, TokenPart, TokenPartKind,
};

use crate::config::ParserConfig;

/// Everything the lexing phase produces
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LexOutput {
    /// Tokens in source order, ending with an `Eof` token
    pub tokens: Vec<Token>,
    /// Collected here-document bodies, keyed by the ids stamped into the
    /// operator tokens
    pub heredocs: HeredocMap,
    /// Errors, warnings, and notes
    pub report: LexReport,
}

/// Tokenizes a complete source text.
///
/// Every byte of the input is accounted for by exactly one token's span, by
/// skipped whitespace or comments, or by a here-document body. Tokens are
/// emitted in source order and the stream always ends with an `Eof` token.
#[must_use]
pub fn tokenize(source: &str, config: &ParserConfig) -> LexOutput {
    let mut lexer = Lexer::new(source, config);
    lexer.run();
    let Lexer {
        mut tokens,
        heredocs,
        report,
        ..
    } = lexer;
    normalize_keywords(&mut tokens, config);
    LexOutput {
        tokens,
        heredocs,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Span;
    use assert_matches::assert_matches;

    fn lex(source: &str) -> LexOutput {
        tokenize(source, &ParserConfig::new())
    }

    fn kinds(output: &LexOutput) -> Vec<TokenKind> {
        output.tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_input_yields_single_eof() {
        let output = lex("");
        assert_eq!(kinds(&output), [TokenKind::Eof]);
        assert!(output.report.is_empty());
        assert!(output.heredocs.is_empty());
    }

    #[test]
    fn whitespace_only_input_yields_newlines_and_eof() {
        let output = lex("   \t  ");
        assert_eq!(kinds(&output), [TokenKind::Eof]);
        assert!(output.report.is_empty());
    }

    #[test]
    fn simple_pipeline() {
        let output = lex("cat file | grep pattern");
        let pairs: Vec<(TokenKind, &str)> = output
            .tokens
            .iter()
            .map(|t| (t.kind, t.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [
                (TokenKind::Word, "cat"),
                (TokenKind::Word, "file"),
                (TokenKind::Pipe, "|"),
                (TokenKind::Word, "grep"),
                (TokenKind::Word, "pattern"),
                (TokenKind::Eof, ""),
            ]
        );
        assert!(output.report.is_empty());
    }

    #[test]
    fn spans_cover_every_byte() {
        let source = "if x; then  y $z; fi\n";
        let output = lex(source);
        let mut covered = vec![false; source.len()];
        for token in &output.tokens {
            for flag in &mut covered[token.span.start..token.span.end] {
                assert!(!*flag, "byte covered twice");
                *flag = true;
            }
        }
        for (i, byte) in source.bytes().enumerate() {
            if !covered[i] {
                assert!(
                    byte == b' ' || byte == b'\t',
                    "byte {i} ({:?}) not covered",
                    byte as char
                );
            }
        }
    }

    #[test]
    fn param_expansion_is_one_token() {
        let output = lex("echo ${USER:-nobody}");
        assert_eq!(
            kinds(&output),
            [TokenKind::Word, TokenKind::ParamExpansion, TokenKind::Eof]
        );
        assert_eq!(output.tokens[1].value, "${USER:-nobody}");
        assert_eq!(output.tokens[1].parts.len(), 1);
        assert_eq!(output.tokens[1].parts[0].kind, TokenPartKind::Parameter);
    }

    #[test]
    fn adjacent_word_and_expansion_fuse_into_composite() {
        let output = lex("echo file$num.txt");
        assert_eq!(
            kinds(&output),
            [TokenKind::Word, TokenKind::Composite, TokenKind::Eof]
        );
        let composite = &output.tokens[1];
        assert_eq!(composite.value, "file$num.txt");
        assert_eq!(composite.parts.len(), 3);
        assert_eq!(composite.parts[0].kind, TokenPartKind::Literal);
        assert_eq!(composite.parts[1].kind, TokenPartKind::Variable);
        assert_eq!(composite.parts[1].text, "$num");
        assert_eq!(composite.parts[2].text, ".txt");
    }

    #[test]
    fn double_quoted_string_decomposes_into_parts() {
        let output = lex(r#"echo "hello $USER today""#);
        let string = &output.tokens[1];
        assert_eq!(string.kind, TokenKind::String);
        assert_eq!(string.quote, Some('"'));
        assert_eq!(string.parts.len(), 3);
        assert_eq!(string.parts[0].text, "hello ");
        assert!(string.parts[0].quoted);
        assert_eq!(string.parts[0].quote_char, Some('"'));
        assert_eq!(string.parts[1].kind, TokenPartKind::Variable);
        assert_eq!(string.parts[1].text, "$USER");
        assert_eq!(string.parts[2].text, " today");
    }

    #[test]
    fn single_quotes_are_literal() {
        let output = lex("echo '$USER'");
        let string = &output.tokens[1];
        assert_eq!(string.kind, TokenKind::String);
        assert_eq!(string.quote, Some('\''));
        assert_eq!(string.value, "$USER");
        assert_eq!(string.parts.len(), 1);
        assert_eq!(string.parts[0].kind, TokenPartKind::Literal);
    }

    #[test]
    fn unclosed_single_quote_reports_error() {
        let output = lex("echo 'abc");
        let string = &output.tokens[1];
        assert_eq!(string.value, "'abc");
        let error = string.metadata.error.as_ref().unwrap();
        assert_eq!(error.kind, LexErrorKind::UnclosedQuote);
        assert_eq!(error.expected.as_deref(), Some("'"));
        assert!(output.report.has_errors());
        assert_eq!(output.report.errors[0].code, Some("E050"));
    }

    #[test]
    fn unclosed_expansion_reports_error() {
        let output = lex("echo ${USER");
        let token = &output.tokens[1];
        assert_eq!(token.kind, TokenKind::ParamExpansion);
        let error = token.metadata.error.as_ref().unwrap();
        assert_eq!(error.kind, LexErrorKind::UnclosedExpansion);
        assert_eq!(error.expected.as_deref(), Some("}"));
        assert_eq!(output.report.errors[0].code, Some("E054"));
    }

    #[test]
    fn command_substitution_with_nested_quotes() {
        let output = lex(r#"echo $(grep ")" file)"#);
        assert_eq!(output.tokens[1].kind, TokenKind::CommandSub);
        assert_eq!(output.tokens[1].value, r#"$(grep ")" file)"#);
    }

    #[test]
    fn backtick_substitution() {
        let output = lex("echo `date`");
        assert_eq!(output.tokens[1].kind, TokenKind::CommandSubBacktick);
        assert_eq!(output.tokens[1].value, "`date`");
    }

    #[test]
    fn process_substitution_tokens() {
        let output = lex("diff <(sort a) >(cat)");
        assert_eq!(
            kinds(&output),
            [
                TokenKind::Word,
                TokenKind::ProcessSubIn,
                TokenKind::ProcessSubOut,
                TokenKind::Eof
            ]
        );
        assert_eq!(output.tokens[1].value, "<(sort a)");
        assert_eq!(output.tokens[2].value, ">(cat)");
    }

    #[test]
    fn process_substitution_disabled_in_posix_mode() {
        let output = tokenize("diff <(sort a) b", &ParserConfig::strict_posix());
        assert_eq!(output.tokens[1].kind, TokenKind::RedirectIn);
    }

    #[test]
    fn assignment_word_in_command_position() {
        let output = lex("FOO=bar cmd");
        let assign = &output.tokens[0];
        assert_eq!(assign.kind, TokenKind::AssignmentWord);
        assert_eq!(assign.value, "FOO=bar");
        let meta = assign.metadata.assignment.as_ref().unwrap();
        assert_eq!(meta.name, "FOO");
        assert_eq!(meta.operator, AssignOp::Assign);
        assert_eq!(meta.value, "bar");
        assert_eq!(assign.metadata.semantic, Some(SemanticType::Assignment));
        assert_eq!(output.tokens[1].kind, TokenKind::Word);
    }

    #[test]
    fn assignment_with_quoted_value() {
        let output = lex(r#"GREETING="hello world" cmd"#);
        assert_eq!(output.tokens[0].kind, TokenKind::AssignmentWord);
        assert_eq!(output.tokens[0].value, r#"GREETING="hello world""#);
        assert_eq!(output.tokens[1].value, "cmd");
    }

    #[test]
    fn compound_and_array_assignments() {
        let output = lex("n+=1");
        assert_eq!(output.tokens[0].kind, TokenKind::PlusAssign);
        let meta = output.tokens[0].metadata.assignment.as_ref().unwrap();
        assert_eq!(meta.operator, AssignOp::Plus);

        let output = lex("arr[2]=x");
        assert_eq!(output.tokens[0].kind, TokenKind::ArrayAssignmentWord);
        let meta = output.tokens[0].metadata.assignment.as_ref().unwrap();
        assert_eq!(meta.index.as_deref(), Some("2"));
    }

    #[test]
    fn assignment_not_recognized_in_argument_position() {
        let output = lex("echo FOO=bar");
        assert_eq!(output.tokens[1].kind, TokenKind::Word);
        assert_eq!(output.tokens[1].value, "FOO=bar");
    }

    #[test]
    fn heredoc_tokens_and_body() {
        let output = lex("cat <<'END'\n$USER\nEND\n");
        let pairs: Vec<(TokenKind, &str)> = output
            .tokens
            .iter()
            .map(|t| (t.kind, t.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [
                (TokenKind::Word, "cat"),
                (TokenKind::Heredoc, "<<"),
                (TokenKind::String, "END"),
                (TokenKind::Newline, "\n"),
                (TokenKind::Eof, ""),
            ]
        );
        let key = output.tokens[1].metadata.heredoc_key.unwrap();
        let body = &output.heredocs[&key];
        assert_eq!(body.content, "$USER\n");
        assert!(body.quoted);
        assert!(!body.remove_tabs);
        assert_eq!(body.delimiter, "END");
        assert!(output.report.is_empty());
    }

    #[test]
    fn heredoc_strip_removes_tabs() {
        let output = lex("cat <<-EOF\n\tindented\n\tEOF\n");
        let key = output.tokens[1].metadata.heredoc_key.unwrap();
        let body = &output.heredocs[&key];
        assert_eq!(body.content, "indented\n");
        assert!(body.remove_tabs);
        assert!(!body.quoted);
    }

    #[test]
    fn multiple_heredocs_collect_in_fifo_order() {
        let output = lex("cat <<A <<B\none\nA\ntwo\nB\n");
        let key_a = output.tokens[1].metadata.heredoc_key.unwrap();
        let key_b = output.tokens[3].metadata.heredoc_key.unwrap();
        assert_eq!(output.heredocs[&key_a].content, "one\n");
        assert_eq!(output.heredocs[&key_b].content, "two\n");
    }

    #[test]
    fn unterminated_heredoc_reports_error() {
        let output = lex("cat <<EOF\nbody\n");
        assert!(output.report.has_errors());
        assert_eq!(output.report.errors[0].code, Some("E022"));
        let key = output.tokens[1].metadata.heredoc_key.unwrap();
        assert_eq!(output.heredocs[&key].content, "body\n");
    }

    #[test]
    fn keywords_normalized_in_command_position_only() {
        let output = lex("if test; then echo then; fi");
        assert_eq!(output.tokens[0].kind, TokenKind::If);
        assert_eq!(output.tokens[3].kind, TokenKind::Then);
        // `then` as an argument stays a word
        assert_eq!(output.tokens[5].kind, TokenKind::Word);
        assert_eq!(output.tokens[5].value, "then");
        assert_eq!(output.tokens[7].kind, TokenKind::Fi);
    }

    #[test]
    fn test_expression_operators() {
        let output = lex("[[ $a == foo && $b -lt 3 ]]");
        assert_eq!(output.tokens[0].kind, TokenKind::DoubleOpenBracket);
        assert_eq!(output.tokens[2].kind, TokenKind::Equal);
        assert_eq!(output.tokens[4].kind, TokenKind::AndAnd);
        assert_eq!(output.tokens[6].kind, TokenKind::Word);
        assert_eq!(output.tokens[6].value, "-lt");
        let close = output.tokens.iter().position(|t| t.kind == TokenKind::DoubleCloseBracket);
        assert!(close.is_some());
    }

    #[test]
    fn less_than_is_comparison_inside_test() {
        let output = lex("[[ $a < $b ]]");
        assert_eq!(output.tokens[2].kind, TokenKind::LessThanTest);
        let output = lex("cmd < file");
        assert_eq!(output.tokens[1].kind, TokenKind::RedirectIn);
    }

    #[test]
    fn test_tokens_carry_test_context() {
        let output = lex("[[ -f x ]]");
        assert!(
            output.tokens[1]
                .metadata
                .contexts
                .contains(TokenContext::TestExpression)
        );
    }

    #[test]
    fn double_paren_arithmetic_tokens() {
        let output = lex("((i=0; i<10))");
        assert_eq!(output.tokens[0].kind, TokenKind::DoubleOpenParen);
        assert_eq!(output.tokens[1].kind, TokenKind::AssignmentWord);
        // `<` stays a redirect token here; the parser restores it when it
        // collects the expression text.
        assert_eq!(output.tokens[4].kind, TokenKind::RedirectIn);
        let close = output.tokens.last().unwrap().kind;
        assert_eq!(close, TokenKind::Eof);
        assert!(
            output.tokens[1]
                .metadata
                .contexts
                .contains(TokenContext::ArithmeticExpression)
        );
    }

    #[test]
    fn adjacent_semicolons_inside_arithmetic_stay_separators() {
        let output = lex("((;;))");
        assert_eq!(
            kinds(&output),
            [
                TokenKind::DoubleOpenParen,
                TokenKind::Semicolon,
                TokenKind::Semicolon,
                TokenKind::DoubleCloseParen,
                TokenKind::Eof
            ]
        );
        // Outside arithmetic the same characters are a case terminator.
        let output = lex("case x in a) b;; esac");
        assert!(
            output
                .tokens
                .iter()
                .any(|t| t.kind == TokenKind::DoubleSemicolon)
        );
    }

    #[test]
    fn bracket_pairing_links_indices() {
        let output = lex("(echo hi)");
        let open = &output.tokens[0];
        assert_eq!(open.kind, TokenKind::OpenParen);
        let close_index = open.metadata.paired_with.unwrap();
        assert_eq!(output.tokens[close_index].kind, TokenKind::CloseParen);
        assert_eq!(
            output.tokens[close_index].metadata.paired_with,
            Some(0)
        );
    }

    #[test]
    fn unclosed_paren_reports_bracket_error() {
        let output = lex("(echo hi");
        assert!(output.report.has_errors());
        let open = &output.tokens[0];
        assert_matches!(
            open.metadata.error,
            Some(LexerError {
                kind: LexErrorKind::UnmatchedBracket,
                ..
            })
        );
        assert_eq!(open.metadata.paired_with, None);
    }

    #[test]
    fn case_pattern_glob_tokens() {
        let output = lex("case $x in *) echo any;; esac");
        let star = output
            .tokens
            .iter()
            .find(|t| t.kind == TokenKind::GlobStar)
            .unwrap();
        assert!(star.metadata.contexts.contains(TokenContext::CasePattern));
        assert!(
            output
                .tokens
                .iter()
                .any(|t| t.kind == TokenKind::DoubleSemicolon)
        );
    }

    #[test]
    fn digit_redirects() {
        let output = lex("cmd 2>err 2>>log");
        assert_eq!(output.tokens[1].kind, TokenKind::RedirectErr);
        assert_eq!(output.tokens[1].value, "2>");
        assert_eq!(output.tokens[3].kind, TokenKind::RedirectErrAppend);
        assert_eq!(output.tokens[3].value, "2>>");
    }

    #[test]
    fn dup_redirects() {
        let output = lex("cmd 2>&1 >&- 3<&0");
        assert_eq!(output.tokens[1].kind, TokenKind::RedirectDup);
        assert_eq!(output.tokens[1].value, "2>&1");
        assert_eq!(output.tokens[2].kind, TokenKind::RedirectDup);
        assert_eq!(output.tokens[2].value, ">&-");
        assert_eq!(output.tokens[3].kind, TokenKind::RedirectDup);
        assert_eq!(output.tokens[3].value, "3<&0");
    }

    #[test]
    fn here_string_token() {
        let output = lex("cat <<<word");
        assert_eq!(output.tokens[1].kind, TokenKind::HereString);
        assert_eq!(output.tokens[2].kind, TokenKind::Word);
    }

    #[test]
    fn comments_are_skipped() {
        let output = lex("echo hi # trailing comment\n");
        assert_eq!(
            kinds(&output),
            [
                TokenKind::Word,
                TokenKind::Word,
                TokenKind::Newline,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn hash_adjacent_to_word_is_literal() {
        let output = lex("echo foo#bar");
        assert_eq!(output.tokens[1].value, "foo#bar");
    }

    #[test]
    fn line_and_column_are_recorded() {
        let output = lex("echo hi\nfoo bar");
        let foo = &output.tokens[3];
        assert_eq!(foo.value, "foo");
        assert_eq!(foo.line, 2);
        assert_eq!(foo.column, 1);
        let bar = &output.tokens[4];
        assert_eq!(bar.line, 2);
        assert_eq!(bar.column, 5);
    }

    #[test]
    fn retokenizing_token_values_is_stable() {
        let source = "if true; then echo ${USER:-nobody}; fi";
        let first = lex(source);
        let rebuilt: String = first
            .tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| t.value.clone())
            .collect::<Vec<_>>()
            .join(" ");
        let second = lex(&rebuilt);
        let first_kinds: Vec<_> = first.tokens.iter().map(|t| t.kind).collect();
        let second_kinds: Vec<_> = second.tokens.iter().map(|t| t.kind).collect();
        assert_eq!(first_kinds, second_kinds);
        let first_values: Vec<_> = first.tokens.iter().map(|t| &t.value).collect();
        let second_values: Vec<_> = second.tokens.iter().map(|t| &t.value).collect();
        assert_eq!(first_values, second_values);
    }

    #[test]
    fn exclamation_in_command_position() {
        let output = lex("! true");
        assert_eq!(output.tokens[0].kind, TokenKind::Exclamation);
    }

    #[test]
    fn command_position_context_is_tracked() {
        let output = lex("echo hi; ls");
        assert!(output.tokens[0].is_command_position());
        assert!(
            output.tokens[1]
                .metadata
                .contexts
                .contains(TokenContext::ArgumentPosition)
        );
        assert!(output.tokens[3].is_command_position());
    }

    #[test]
    fn redirect_target_context() {
        let output = lex("cmd > out.txt");
        assert!(
            output.tokens[2]
                .metadata
                .contexts
                .contains(TokenContext::RedirectTarget)
        );
    }

    #[test]
    fn missing_heredoc_delimiter_reports_error() {
        let output = lex("cat <<\n");
        assert!(output.report.has_errors());
        let op = &output.tokens[1];
        assert_matches!(
            op.metadata.error,
            Some(LexerError {
                kind: LexErrorKind::MissingHeredocDelimiter,
                ..
            })
        );
    }

    #[test]
    fn quoted_string_spans_include_quotes() {
        let output = lex("echo 'ab'");
        assert_eq!(output.tokens[1].span, Span::new(5, 9));
        assert_eq!(output.tokens[1].value, "ab");
    }
}
