//! Fuzz test for the WORDBOOK Lexer
//!
//! This fuzz target tests the lexer with arbitrary byte sequences to find:
//! - Panics or crashes
//! - Infinite loops
//! - Errors that are not sticky
//!
//! Run with: cargo +nightly fuzz run lexer_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use wordbook_dsl::{Lexer, TokenKind};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize();

        // Tokenize stops at Eof or the first error.
        let last = tokens.last().expect("tokenize yields at least one token");
        assert!(
            matches!(last.kind, TokenKind::Eof | TokenKind::Error(_)),
            "last token must be Eof or an error"
        );

        // Once finished, the lexer keeps returning the same final token.
        assert_eq!(lexer.next_token().kind, last.kind);
        assert_eq!(lexer.peek_token().kind, last.kind);

        let mut prev_end = 0;
        for token in &tokens {
            assert!(token.span.start <= token.span.end, "Span start should be <= end");
            assert!(token.span.start >= prev_end, "Spans should not overlap");
            assert!(token.span.end <= input.len(), "Span should stay inside input");
            assert!(token.span.line >= 1, "Line numbers should be >= 1");
            assert!(token.span.column >= 1, "Column numbers should be >= 1");
            prev_end = token.span.end;
        }
    }
});
