use criterion::{Criterion, black_box, criterion_group, criterion_main};

use scrolly_core::{HexPalette, Rect, RegistryConfig, SceneDescriptor, SceneRegistry, Viewport};

fn build(n: usize) -> SceneRegistry<HexPalette> {
    let mut reg = SceneRegistry::new(HexPalette::default(), RegistryConfig::default());
    for i in 0..n {
        let h = reg.register_scene(SceneDescriptor::new(&format!("scene-{i}"), "#1e3a8a"));
        reg.set_region_rect(h, Some(Rect::band(i as f64 * 900.0, 900.0)));
        reg.observe_entrance(h);
    }
    reg
}

fn bench_scroll_through(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll_through");
    for n in [10usize, 100] {
        group.bench_function(format!("{n}_scenes"), |b| {
            b.iter_batched(
                || build(n),
                |mut reg| {
                    let viewport = Viewport::new(1280.0, 1000.0);
                    let end = n as f64 * 900.0;
                    let mut y = 0.0;
                    let mut t = 0.0;
                    while y < end {
                        reg.on_scroll(&viewport.scrolled_to(y), t);
                        y += 40.0;
                        t += 16.0;
                    }
                    black_box(reg.visual_state(t))
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scroll_through);
criterion_main!(benches);
