use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wordbook_decode::{decode_many, decode_text, Registry};
use wordbook_dsl::parse_text;
use wordbook_test_utils::fixtures::{Commands, Manifest, GO_MOD};

fn bench_decode(c: &mut Criterion) {
    let registry = Registry::new();
    let values = parse_text(GO_MOD).expect("parse go.mod");

    c.bench_function("decode/go_mod_values", |b| {
        b.iter(|| {
            let mut manifest = Manifest::default();
            decode_many(&registry, black_box(&values), &mut manifest).expect("decode go.mod");
            black_box(manifest.requires.len());
        });
    });

    c.bench_function("decode/parse_and_decode_go_mod", |b| {
        b.iter(|| {
            let manifest: Manifest =
                decode_text(&registry, black_box(GO_MOD)).expect("decode go.mod");
            black_box(manifest.requires.len());
        });
    });
}

fn bench_identity_merge(c: &mut Criterion) {
    let registry = Registry::new();
    let text: String = (0..200)
        .map(|i| format!("command cmd{} arg a{i} string\n", i % 20))
        .collect();

    c.bench_function("decode/identity_merge_200", |b| {
        b.iter(|| {
            let commands: Commands =
                decode_text(&registry, black_box(&text)).expect("decode commands");
            black_box(commands.commands.len());
        });
    });
}

fn bench_cold_registry(c: &mut Criterion) {
    c.bench_function("decode/compile_manifest", |b| {
        b.iter(|| {
            let registry = Registry::new();
            let program = registry.program::<Manifest>().expect("compile manifest");
            black_box(program.op_count());
        });
    });
}

criterion_group!(benches, bench_decode, bench_identity_merge, bench_cold_registry);
criterion_main!(benches);
