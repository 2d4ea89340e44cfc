#[macro_use]
extern crate criterion;
extern crate mandelbrot;

use criterion::Criterion;
use mandelbrot::{ColorPalette, ComplexRegion, CpuEngine, Engine};

fn cpu_generate(c: &mut Criterion) {
    let palette = ColorPalette::builtin().unwrap();
    let region = ComplexRegion::new((-2.0, 1.0), (-1.5, 1.5)).unwrap();
    let tasks = num_cpus::get();
    c.bench_function("cpu generate 200x200", move |b| {
        let engine = CpuEngine::new(&palette);
        b.iter(|| engine.generate(200, 200, &region, tasks).unwrap())
    });
}

fn cpu_render(c: &mut Criterion) {
    let palette = ColorPalette::builtin().unwrap();
    let region = ComplexRegion::new((-2.0, 1.0), (-1.5, 1.5)).unwrap();
    let tasks = num_cpus::get();
    let results = CpuEngine::new(&palette)
        .generate(200, 200, &region, tasks)
        .unwrap();
    c.bench_function("cpu render 200x200", move |b| {
        let engine = CpuEngine::new(&palette);
        b.iter(|| engine.render(200, 200, &results, tasks).unwrap())
    });
}

criterion_group!(benches, cpu_generate, cpu_render);
criterion_main!(benches);
