use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wordbook_dsl::{parse_text, Lexer, TokenKind};

const GO_MOD: &str = r#"
// A typical module file.
module example.com/service

go 1.21

require (
    github.com/google/uuid v1.6.0
    golang.org/x/sync v0.7.0 // indirect
    golang.org/x/text v0.15.0
)

replace example.com/old => ../old

exclude (
    example.com/broken v0.1.0
    example.com/broken v0.1.1
)
"#;

fn bench_lex(c: &mut Criterion) {
    c.bench_function("dsl/lex_go_mod", |b| {
        b.iter(|| {
            let mut lexer = Lexer::new(black_box(GO_MOD));
            let mut count = 0usize;
            while !matches!(lexer.next_token().kind, TokenKind::Eof | TokenKind::Error(_)) {
                count += 1;
            }
            black_box(count);
        });
    });
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("dsl/parse_go_mod", |b| {
        b.iter(|| {
            let values = parse_text(black_box(GO_MOD)).expect("parse go.mod");
            black_box(values.len());
        });
    });

    let large = GO_MOD.repeat(64);
    c.bench_function("dsl/parse_go_mod_x64", |b| {
        b.iter(|| {
            let values = parse_text(black_box(&large)).expect("parse go.mod");
            black_box(values.len());
        });
    });
}

criterion_group!(benches, bench_lex, bench_parse);
criterion_main!(benches);
