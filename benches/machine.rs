//! State machine benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use willow_terminal::core::{ColorPalette, Size, StateMachine};
use willow_terminal::render::RenderQueue;
use willow_terminal::scanner::Scanner;
use willow_terminal::Terminal;

fn bench_apply_print(c: &mut Criterion) {
    let mut group = c.benchmark_group("machine");

    let instructions = Scanner::new().feed_bytes("A".repeat(80 * 24).as_bytes());
    group.throughput(Throughput::Elements(instructions.len() as u64));

    group.bench_function("print_full_screen", |b| {
        b.iter(|| {
            let mut machine = StateMachine::new(Size::new(80, 24), ColorPalette::default());
            let mut sink = RenderQueue::new();
            machine.apply_all(black_box(instructions.iter().copied()), &mut sink);
            black_box(sink.len())
        })
    });

    group.finish();
}

fn bench_apply_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("machine");

    // Every line past the first screenful scrolls
    let instructions = Scanner::new().feed_bytes("line of output\n".repeat(1000).as_bytes());
    group.throughput(Throughput::Elements(instructions.len() as u64));

    group.bench_function("scroll", |b| {
        b.iter(|| {
            let mut machine = StateMachine::new(Size::new(80, 24), ColorPalette::default());
            let mut sink = RenderQueue::new();
            machine.apply_all(black_box(instructions.iter().copied()), &mut sink);
            black_box(sink.len())
        })
    });

    group.finish();
}

fn bench_terminal_redraw(c: &mut Criterion) {
    let mut group = c.benchmark_group("machine");

    // Full-screen redraw the way curses-style programs do it
    let mut redraw = String::from("\x1b[H\x1b[2J");
    for row in 1..=24 {
        redraw.push_str(&format!("\x1b[{};1H\x1b[3{}m{}\x1b[0m", row, row % 8, "x".repeat(80)));
    }
    group.throughput(Throughput::Bytes(redraw.len() as u64));

    group.bench_function("full_redraw", |b| {
        b.iter(|| {
            let mut terminal = Terminal::with_size(80, 24);
            terminal.feed(black_box(redraw.as_bytes()));
            black_box(terminal.drain_renders().len())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_apply_print,
    bench_apply_scroll,
    bench_terminal_redraw
);
criterion_main!(benches);
