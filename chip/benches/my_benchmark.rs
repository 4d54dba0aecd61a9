use chip::{chip8::ChipSet, resources::Rom};
use criterion::{criterion_group, criterion_main, Criterion};

/// will setup the default configured chip
fn get_default_chip() -> ChipSet {
    let mut chip = ChipSet::new().with_seed(0);
    chip.load_rom(Rom::splash())
        .expect("The splash rom has to fit into memory.");
    chip
}

pub fn step_bench(c: &mut Criterion) {
    c.bench_function("splash_bench", |b| {
        b.iter(|| {
            let mut chip = get_default_chip();
            for _ in 0..200 {
                let _ = chip.step();
            }
        });
    });
}

pub fn print_bench(c: &mut Criterion) {
    let chip = get_default_chip();
    c.bench_function("print_bench", |b| {
        b.iter(|| {
            let _ = format!("{}", chip);
        });
    });
}

criterion_group!(benches, step_bench, print_bench);
criterion_main!(benches);
