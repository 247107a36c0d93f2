//! Benchmarks for hook-repo.

#![allow(missing_docs)]
#![allow(let_underscore_drop)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hook_repo::manifest::{parse_hooks, HookOverride};
use std::path::Path;

const MANIFEST: &str = "
- id: trailing-whitespace
  name: Trim trailing whitespace
  entry: trailing-whitespace-fixer
  language: python
  files: \\.(py|md|txt)$
- id: eslint
  entry: eslint
  language: node
  args: [--fix]
- id: shellcheck
  entry: shellcheck
  language: system
  exclude: ^vendor/
";

fn benchmark_manifest_parsing(c: &mut Criterion) {
    c.bench_function("manifest_parsing", |b| {
        b.iter(|| {
            parse_hooks(Path::new("hooks.yaml"), black_box(MANIFEST)).expect("parse manifest")
        });
    });
}

fn benchmark_hook_merge(c: &mut Criterion) {
    let hooks = parse_hooks(Path::new("hooks.yaml"), MANIFEST).expect("parse manifest");
    let overrides = HookOverride {
        args: Some(vec!["--max-line-length=100".to_string()]),
        files: Some(r"\.py$".to_string()),
        ..HookOverride::new("trailing-whitespace")
    };

    c.bench_function("hook_merge", |b| {
        b.iter(|| black_box(&hooks[0]).merged(black_box(&overrides)));
    });
}

criterion_group!(benches, benchmark_manifest_parsing, benchmark_hook_merge);
criterion_main!(benches);
