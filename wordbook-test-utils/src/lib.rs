//! WORDBOOK Test Utilities
//!
//! Shared test infrastructure for the WORDBOOK workspace:
//! - Proptest generators for words, values and documents
//! - Fixture record types with their shape descriptions
//! - Custom assertions for WORDBOOK results

// Re-export core types for convenience
pub use wordbook_core::{
    ConfigError, DecodeError, DecodeErrorKind, LexError, ParseError, ParseErrorKind,
    ParseOptions, Position, ScalarKind, ShapeError, SyntaxError, Value, WordbookError,
    WordbookResult,
};
pub use wordbook_decode::{Decode, Registry, Shape};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating wordbook text.

    use proptest::prelude::*;

    /// A bare word: no whitespace, parens, semicolons or quotes, and not
    /// starting with a comment or continuation.
    pub fn arb_word() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9._/@=<>+-][a-zA-Z0-9._/@=<>+-]{0,11}"
            .prop_filter("comment start", |w| !w.starts_with("//"))
    }

    /// Any word, including ones that only survive when quoted.
    pub fn arb_any_word() -> impl Strategy<Value = String> {
        prop_oneof![
            4 => arb_word(),
            1 => "[a-z ;()\"\\\\`/\t.é-]{0,8}",
            1 => Just(String::new()),
        ]
    }

    /// The words of one value (at least one).
    pub fn arb_words() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(arb_word(), 1..6)
    }

    /// A document as a list of lines of bare words.
    pub fn arb_lines() -> impl Strategy<Value = Vec<Vec<String>>> {
        prop::collection::vec(arb_words(), 0..12)
    }

    /// A run of separators: at least one newline or semicolon, possibly with
    /// blanks and comments in between.
    pub fn arb_separator() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                Just("\n".to_string()),
                Just(";".to_string()),
                Just(" \n".to_string()),
                Just("\t;".to_string()),
                Just(" // note\n".to_string()),
            ],
            1..5,
        )
        .prop_map(|parts| parts.concat())
    }

    /// A signed integer literal with its value.
    pub fn arb_int_literal() -> impl Strategy<Value = (String, i64)> {
        any::<i64>().prop_map(|n| (n.to_string(), n))
    }

    /// A word that is neither `true` nor `false`.
    pub fn arb_non_bool_word() -> impl Strategy<Value = String> {
        arb_word().prop_filter("bool literal", |w| w != "true" && w != "false")
    }
}

// ============================================================================
// TEXT HELPERS
// ============================================================================

pub mod text {
    //! Rendering helpers for building wordbook source in tests.

    use wordbook_core::Value;

    /// Join each line's words with spaces and the lines with `separator`.
    pub fn render_lines(lines: &[Vec<String>], separator: &str) -> String {
        lines
            .iter()
            .map(|words| words.join(" "))
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Join lines with a different separator run between each pair.
    pub fn render_with_separators(lines: &[Vec<String>], separators: &[String]) -> String {
        let mut out = String::new();
        for (i, words) in lines.iter().enumerate() {
            if i > 0 {
                let sep = separators
                    .get(i - 1)
                    .map(String::as_str)
                    .unwrap_or("\n");
                out.push_str(sep);
            }
            out.push_str(&words.join(" "));
        }
        out
    }

    /// Render `prefix ( ... )` with one inner line per entry.
    pub fn render_block(prefix: &[String], lines: &[Vec<String>]) -> String {
        let mut out = prefix.join(" ");
        out.push_str(" (\n");
        for words in lines {
            out.push('\t');
            out.push_str(&words.join(" "));
            out.push('\n');
        }
        out.push(')');
        out
    }

    /// The word lists of parsed values.
    pub fn words_of(values: &[Value]) -> Vec<Vec<String>> {
        values.iter().map(|v| v.words().to_vec()).collect()
    }

    /// Owned word list from string slices.
    pub fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Record types modelled on go.mod-like manifests, with their shapes.

    use wordbook_decode::{Decode, Shape};

    /// A go.mod-style manifest exercising every field kind.
    pub const GO_MOD: &str = r#"// Module manifest.
module example.com/service

go 1.21

require (
    github.com/google/uuid v1.6.0
    golang.org/x/sync v0.7.0 // indirect
)
require golang.org/x/text v0.15.0

replace example.com/old => ../old
exclude example.com/broken v0.1.0

tool example.com/gen example.com/lint
"#;

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Require {
        pub module: String,
        pub version: String,
    }

    impl Require {
        pub fn new(module: &str, version: &str) -> Self {
            Self {
                module: module.to_string(),
                version: version.to_string(),
            }
        }
    }

    impl Decode for Require {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .scalar("module", |r| &mut r.module)
                .scalar("version", |r| &mut r.version)
                .build()
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Replace {
        pub from: String,
        pub op: String,
        pub to: String,
    }

    impl Decode for Replace {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .scalar("from", |r| &mut r.from)
                .scalar("op", |r| &mut r.op)
                .scalar("to", |r| &mut r.to)
                .build()
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Module {
        pub path: String,
    }

    impl Decode for Module {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .scalar("path", |m| &mut m.path)
                .build()
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Manifest {
        pub module: Option<Module>,
        pub go: String,
        pub requires: Vec<Require>,
        pub replaces: Vec<Box<Replace>>,
        pub excludes: Vec<Require>,
        pub tools: Vec<String>,
    }

    impl Decode for Manifest {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .record("module", |m| &mut m.module)
                .scalar("go", |m| &mut m.go)
                .records("requires", |m| &mut m.requires)
                .boxed_records("replaces", |m| &mut m.replaces)
                .records("excludes", |m| &mut m.excludes)
                .scalars("tools", |m| &mut m.tools)
                .build()
        }
    }

    /// Two positional scalars.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Thing {
        pub count: i64,
        pub good: bool,
    }

    impl Decode for Thing {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .scalar("count", |t| &mut t.count)
                .scalar("good", |t| &mut t.good)
                .build()
        }
    }

    /// A name followed by its values.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Enum {
        pub name: String,
        pub values: Vec<String>,
    }

    impl Decode for Enum {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .scalar("name", |e| &mut e.name)
                .scalars("values", |e| &mut e.values)
                .build()
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Palette {
        pub values: Vec<String>,
    }

    impl Decode for Palette {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .scalars("values", |p| &mut p.values)
                .build()
        }
    }

    /// Positional scalars followed by a named collection.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Tally {
        pub count: i64,
        pub good: bool,
        pub colors: Vec<Palette>,
    }

    impl Decode for Tally {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .scalar("count", |t| &mut t.count)
                .scalar("good", |t| &mut t.good)
                .records("colors", |t| &mut t.colors)
                .build()
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct NamedReqs {
        pub name: String,
        pub reqs: Vec<Require>,
    }

    impl Decode for NamedReqs {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .scalar("name", |n| &mut n.name)
                .records("reqs", |n| &mut n.reqs)
                .rename("req")
                .build()
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Arg {
        pub name: String,
        pub kind: String,
    }

    impl Arg {
        pub fn new(name: &str, kind: &str) -> Self {
            Self {
                name: name.to_string(),
                kind: kind.to_string(),
            }
        }
    }

    impl Decode for Arg {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .scalar("name", |a| &mut a.name)
                .scalar("kind", |a| &mut a.kind)
                .build()
        }
    }

    /// A record merged by its name.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Command {
        pub name: String,
        pub args: Vec<Arg>,
    }

    impl Decode for Command {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .identity("name", |c| &mut c.name)
                .records("args", |c| &mut c.args)
                .build()
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Commands {
        pub commands: Vec<Command>,
    }

    impl Decode for Commands {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .records("commands", |c| &mut c.commands)
                .build()
        }
    }

    /// A self-referential record.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Node {
        pub name: String,
        pub children: Vec<Box<Node>>,
    }

    impl Decode for Node {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .identity("name", |n| &mut n.name)
                .boxed_records("children", |n| &mut n.children)
                .rename("child")
                .build()
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Tree {
        pub nodes: Vec<Node>,
    }

    impl Decode for Tree {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .records("nodes", |t| &mut t.nodes)
                .build()
        }
    }

    /// A scalar collection declared before another field.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Misordered {
        pub tags: Vec<String>,
        pub name: String,
    }

    impl Decode for Misordered {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .scalars("tags", |m| &mut m.tags)
                .scalar("name", |m| &mut m.name)
                .build()
        }
    }

    /// Keyed by name; reached through a boxed single field.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Owner {
        pub name: String,
        pub email: String,
    }

    impl Owner {
        pub fn new(name: &str, email: &str) -> Self {
            Self {
                name: name.to_string(),
                email: email.to_string(),
            }
        }
    }

    impl Decode for Owner {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .identity("name", |o| &mut o.name)
                .scalar("email", |o| &mut o.email)
                .build()
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct License {
        pub id: String,
    }

    impl Decode for License {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .scalar("id", |l| &mut l.id)
                .build()
        }
    }

    /// A positional name followed by single nested records.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Package {
        pub name: String,
        pub owner: Option<Box<Owner>>,
        pub license: Option<License>,
    }

    impl Decode for Package {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .scalar("name", |p| &mut p.name)
                .boxed_record("owner", |p| &mut p.owner)
                .record("license", |p| &mut p.license)
                .build()
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertion helpers for WORDBOOK results.

    use super::*;

    /// Assert that the parsed values have exactly these word lists.
    #[track_caller]
    pub fn assert_words(values: &[Value], expected: &[&[&str]]) {
        let got: Vec<Vec<&str>> = values
            .iter()
            .map(|v| v.words().iter().map(String::as_str).collect())
            .collect();
        let want: Vec<Vec<&str>> = expected.iter().map(|ws| ws.to_vec()).collect();
        assert_eq!(got, want, "parsed words differ");
    }

    /// Assert that a parse failed with a structural error.
    #[track_caller]
    pub fn assert_syntax_error<T: std::fmt::Debug>(
        result: &Result<T, ParseError>,
        expected: SyntaxError,
    ) {
        match result {
            Err(ParseError {
                kind: ParseErrorKind::Syntax(got),
                ..
            }) => assert_eq!(*got, expected),
            other => panic!("Expected syntax error {expected:?}, got: {other:?}"),
        }
    }

    /// Assert that a parse failed with a lexical error.
    #[track_caller]
    pub fn assert_lex_error<T: std::fmt::Debug>(result: &Result<T, ParseError>) {
        match result {
            Err(e) if e.is_lexical() => {}
            other => panic!("Expected lexical error, got: {other:?}"),
        }
    }

    /// Assert that a WordbookResult is a decode error of the given shape.
    #[track_caller]
    pub fn assert_decode_error<T: std::fmt::Debug>(
        result: &WordbookResult<T>,
        matches: impl Fn(&DecodeErrorKind) -> bool,
    ) {
        match result {
            Err(WordbookError::Decode(e)) => {
                assert!(matches(&e.kind), "Unexpected decode error: {e}");
            }
            other => panic!("Expected decode error, got: {other:?}"),
        }
    }

    /// Assert that a WordbookResult is a shape error.
    #[track_caller]
    pub fn assert_shape_error<T: std::fmt::Debug>(result: &WordbookResult<T>, expected: ShapeError) {
        match result {
            Err(WordbookError::Shape { error, .. }) => assert_eq!(*error, expected),
            other => panic!("Expected shape error {expected:?}, got: {other:?}"),
        }
    }

    /// Assert that an error's message contains `needle`.
    #[track_caller]
    pub fn assert_error_contains<T: std::fmt::Debug, E: std::fmt::Display>(
        result: &Result<T, E>,
        needle: &str,
    ) {
        match result {
            Err(e) => {
                let msg = e.to_string();
                assert!(msg.contains(needle), "{msg:?} does not contain {needle:?}");
            }
            Ok(v) => panic!("Expected error containing {needle:?}, got Ok({v:?})"),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
