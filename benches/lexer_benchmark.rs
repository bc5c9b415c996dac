use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mocha_lexer::{tokenize, Options};
use std::hint::black_box as bb;

// =============================================================================
// Test corpus - different sizes of Mocha code
// =============================================================================

const SMALL_HELLO: &str = r#"
console.log "Hello, World!"
"#;

const MEDIUM_CLASS: &str = r#"
class Point
  constructor: (@x, @y) ->

  abs: ->
    Math.sqrt @x * @x + @y * @y

  scale: (f) ->
    @x *= f
    @y *= f
    this

class Rectangle extends Shape
  constructor: (@width, @height) ->

  area: ->
    @width * @height

  grow: (delta) ->
    @width += delta
    @height += delta
"#;

const LARGE_MIXED: &str = r##"
# A tokenizer sketch with most surface syntax in play.

TOKEN_KINDS = ['eof', 'ident', 'number', 'string']

defaults =
  verbose: no
  limit: 0x100
  pattern: /[a-z_]+/gi

clean = (text) ->
  text.replace(/\s+$/, '').replace /\r/g, ''

classify = (word) ->
  switch word
    when 'if', 'else' then 'keyword'
    when 'yes', 'no' then 'bool'
    else 'ident'

tokenize = (source, options = defaults) ->
  tokens = []
  position = 0
  until position >= source.length
    chunk = source[position..]
    matched = chunk.match defaults.pattern
    if matched and matched.length > 0
      word = matched[0]
      tokens.push kind: classify(word), value: word
      position += word.length
    else
      position += 1
  tokens

report = (tokens) ->
  counts = {}
  for own kind, items of groupBy(tokens, 'kind')
    counts[kind] = items.length
  lines = for kind in TOKEN_KINDS when counts[kind]?
    "#{kind}: #{counts[kind]}"
  ###
  Emitted as a summary block.
  ###
  lines.join '\n'

exports.run = (source) ->
  tokens = tokenize source
  if defaults.verbose then console.log report(tokens) else tokens.length
"##;

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");
    let opts = Options::default();

    for (name, src) in [
        ("small", SMALL_HELLO),
        ("medium", MEDIUM_CLASS),
        ("large", LARGE_MIXED),
    ] {
        group.throughput(Throughput::Bytes(src.len() as u64));
        group.bench_with_input(BenchmarkId::new("tokenize", name), src, |b, src| {
            b.iter(|| tokenize(bb(src), bb(&opts)).expect("benchmark corpus lexes"));
        });
    }
    group.finish();
}

fn bench_deep_interpolation(c: &mut Criterion) {
    // interpolation spawns a nested lexer per fragment; measure the recursion
    let mut src = String::from("x");
    for _ in 0..24 {
        src = format!("\"a#{{{src}}}b\"");
    }
    let opts = Options::default();

    c.bench_function("deep_interpolation", |b| {
        b.iter(|| tokenize(bb(&src), bb(&opts)).expect("nested interpolation lexes"));
    });
}

criterion_group!(benches, bench_lexer, bench_deep_interpolation);
criterion_main!(benches);
