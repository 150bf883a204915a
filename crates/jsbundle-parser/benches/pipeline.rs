//! Pipeline benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use jsbundle_parser::{lex, load_file, parse, print};

const SAMPLE_SOURCE: &str = r#"
// Sample module for benchmarking
import React, { useState as useLocalState } from 'react';
import * as utils from './utils';
import './styles.css';

const path = require('./path');

function fibonacci(n) {
    if (n <= 1) return n;
    return fibonacci(n - 1) + fibonacci(n - 2);
}

class Calculator {
    constructor() {
        this.result = 0;
    }

    add(x, y) {
        return x + y;
    }

    async fetchData(url) {
        const response = await fetch(url);
        return response.json();
    }
}

const calc = new Calculator();
const numbers = [1, 2, 3, 4, 5].map(n => n * 2);
const { a, b, ...rest } = { a: 1, b: 2, c: 3, d: 4 };
const template = `Hello ${name}, you have ${count} messages`;
const pattern = /[a-z]+\/(\d+)/gi;

export { Calculator, fibonacci };
export default calc;
"#;

fn bench_phases(c: &mut Criterion) {
    let mut group = c.benchmark_group("phases");
    group.throughput(Throughput::Bytes(SAMPLE_SOURCE.len() as u64));

    group.bench_function("lex", |b| {
        b.iter(|| lex(black_box(SAMPLE_SOURCE)));
    });

    let tokens = lex(SAMPLE_SOURCE);
    group.bench_function("parse", |b| {
        b.iter(|| parse(black_box(&tokens)));
    });

    if let Ok(program) = parse(&tokens) {
        group.bench_function("print", |b| {
            b.iter(|| print(black_box(&program)));
        });
    }

    group.finish();
}

fn bench_load_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_file");
    group.throughput(Throughput::Bytes(SAMPLE_SOURCE.len() as u64));

    group.bench_function("sample", |b| {
        b.iter(|| load_file(black_box(SAMPLE_SOURCE.as_bytes()), "src/app.js"));
    });

    group.finish();
}

criterion_group!(benches, bench_phases, bench_load_file);
criterion_main!(benches);
