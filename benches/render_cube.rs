use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use orthotrace::{
    BatchSettings, RenderJob, SimpleRayTraceWorker, render_batch,
    functor::Sidedness,
    geometry::{ScreenSize, TextureSize, WorldPoint},
    presets,
    scene::{Cube, Scene},
    texture::Texture,
};

fn block_scene() -> Scene {
    let pixels = (0..256u32)
        .map(|i| 0xFF000000 | (i * 0x010101))
        .collect::<Vec<_>>();
    let texture = Texture::new(TextureSize::new(16, 16), pixels).unwrap();

    let mut scene = Scene::new();
    scene.add(Cube::with_texture(WorldPoint::origin(), 1.0, texture));
    scene.extend(presets::icon_lights(presets::ICON_AMBIENT_INTENSITY));
    scene
}

fn criterion_benchmark(c: &mut Criterion) {
    let camera = presets::icon_camera(ScreenSize::new(128, 128));
    let scene = block_scene().freeze();
    let worker = SimpleRayTraceWorker::builder()
        .sidedness(Sidedness::Single)
        .build();

    c.bench_function("render_cube", |b| {
        b.iter(|| camera.render(&scene, &worker).unwrap())
    });

    c.bench_function("render_cube_batch", |b| {
        b.iter_batched(
            || {
                (0..32)
                    .map(|i| RenderJob {
                        name: format!("cube{i}"),
                        scene: scene.clone(),
                        sidedness: Sidedness::Single,
                    })
                    .collect::<Vec<_>>()
            },
            |jobs| {
                render_batch(jobs, camera.clone(), BatchSettings::default())
                    .unwrap()
                    .into_results()
                    .unwrap()
            },
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20).measurement_time(Duration::from_secs(20));
    targets = criterion_benchmark
}
criterion_main!(benches);
