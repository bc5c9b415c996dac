// src/bin/hot_lexer.rs
//
// Quick manual profiling harness: run under `perf` / a sampling profiler to
// see where tokenize time goes without criterion in the way.

use mocha_lexer::{tokenize, Options};
use std::hint::black_box as bb;
use std::time::Instant;

const SMALL: &str = r#"
square = (x) -> x * x
console.log square 7
"#;

const MEDIUM: &str = r##"
class Account
  constructor: (@owner, @balance = 0) ->

  deposit: (amount) ->
    throw new Error "bad amount" unless amount > 0
    @balance += amount

  withdraw: (amount) ->
    if amount > @balance
      throw new Error "insufficient funds for #{@owner}"
    @balance -= amount

report = (accounts) ->
  for own name, account of accounts
    console.log "#{name}: #{account.balance}"
"##;

fn time(label: &str, src: &str, iterations: u32) {
    let opts = Options::default();
    // warm up
    for _ in 0..100 {
        let _ = bb(tokenize(bb(src), &opts));
    }
    let start = Instant::now();
    for _ in 0..iterations {
        let _ = bb(tokenize(bb(src), &opts));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations;
    let mib_s = src.len() as f64 * iterations as f64 / elapsed.as_secs_f64() / (1024.0 * 1024.0);
    println!("{label:8} {per_iter:>10.1?}/iter  {mib_s:>8.1} MiB/s");
}

fn main() {
    println!("hot_lexer: tokenize throughput");
    time("small", SMALL, 200_000);
    time("medium", MEDIUM, 50_000);

    let big: String = MEDIUM.repeat(200);
    time("big", &big, 500);
}
