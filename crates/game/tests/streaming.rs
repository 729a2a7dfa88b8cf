//! Property sweeps over many seeds and tunings: every streamed layout stays
//! reachable, non-overlapping and bounded while the window slides.

use glam::Vec3;
use parkour_game::SimulationConfig;
use parkour_world::{ChunkGenerator, ChunkManager, JumpReach, WorldEvent};

fn create_test_manager(config: &SimulationConfig) -> ChunkManager {
    let generator = ChunkGenerator::new(config.generator.clone(), &config.movement);
    let mut manager = ChunkManager::new(generator, config.streaming.clone());
    manager.reset(config.checkpoint.default_spawn, &mut Vec::new());
    manager
}

/// Walk the traveler from chunk exit to chunk exit, letting the window catch
/// up after every step. Returns the events emitted on the way.
fn walk(
    manager: &mut ChunkManager,
    steps: u64,
    mut check: impl FnMut(&ChunkManager, Vec3),
) -> Vec<WorldEvent> {
    let mut events = Vec::new();
    for step in 1..=steps {
        let Some(position) = manager.chunk(step).map(|chunk| chunk.exit) else {
            break;
        };
        for _ in 0..4 {
            manager.update(position, None, 1.0 / 60.0, &mut events);
        }
        check(manager, position);
    }
    events
}

fn presets() -> Vec<SimulationConfig> {
    vec![
        SimulationConfig::default(),
        SimulationConfig::floaty(),
        SimulationConfig::tight(),
    ]
}

#[test]
fn test_streamed_gaps_reachable() {
    for base in presets() {
        for seed in 1..=8 {
            let config = base.clone().with_seed(seed);
            let reach = JumpReach::from_movement(&config.movement);
            let mut manager = create_test_manager(&config);

            walk(&mut manager, 12, |manager, _| {
                for chunk in manager.chunks() {
                    for platform in chunk.walkable() {
                        let Some(a) = platform.approach else { continue };
                        assert!(a.gap <= config.generator.max_edge_gap + 1e-4);
                        assert!(a.rise <= reach.with_launch(a.launch_force).apex());

                        let distance = reach
                            .with_launch(a.launch_force)
                            .distance(a.rise)
                            .unwrap_or(0.0);
                        let needed = ((a.gap + a.run_up).powi(2) + a.lateral * a.lateral).sqrt();
                        assert!(
                            needed <= distance,
                            "seed {seed}, chunk {}: {needed} > {distance}",
                            chunk.index
                        );
                    }
                }
            });
        }
    }
}

#[test]
fn test_streamed_platforms_never_overlap() {
    for seed in [3, 17, 42, 99] {
        let config = SimulationConfig::default().with_seed(seed);
        let buffer = config.generator.overlap_buffer;
        let mut manager = create_test_manager(&config);

        walk(&mut manager, 10, |manager, _| {
            let chunks: Vec<_> = manager.chunks().collect();
            for pair in chunks.windows(2) {
                let platforms: Vec<_> = pair[0].platforms.iter().chain(&pair[1].platforms).collect();
                for (i, a) in platforms.iter().enumerate() {
                    for b in &platforms[i + 1..] {
                        assert!(
                            !a.outline(buffer).overlaps(&b.outline(buffer)),
                            "seed {seed}: platforms {} and {} overlap",
                            a.id,
                            b.id
                        );
                    }
                }
            }
        });
    }
}

#[test]
fn test_window_stays_bounded() {
    let config = SimulationConfig::default().with_seed(5);
    let chunk_length = config.generator.chunk_length;
    let mut manager = create_test_manager(&config);

    walk(&mut manager, 25, |manager, position| {
        let progress = manager.progress(position);
        assert!(manager.frontier() - progress < manager.lookahead_distance() + chunk_length);

        if manager.chunk_count() > 1 {
            let front = manager.chunks().next().map_or(0.0, |chunk| chunk.end);
            assert!(front >= progress - manager.trailing_distance());
        }

        let world = manager.world();
        let platforms: usize = manager.chunks().map(|chunk| chunk.platforms.len()).sum();
        assert_eq!(world.len(), platforms);
        assert_eq!(world.chunk_count(), manager.chunk_count());
    });

    let first = manager.chunks().next().map_or(0, |chunk| chunk.index);
    assert!(first > 0, "trailing chunks were never disposed");
}

#[test]
fn test_chunk_events_balance() {
    let config = SimulationConfig::default().with_seed(11);
    let generator = ChunkGenerator::new(config.generator.clone(), &config.movement);
    let mut manager = ChunkManager::new(generator, config.streaming.clone());
    let mut events = Vec::new();
    manager.reset(Vec3::ZERO, &mut events);
    events.extend(walk(&mut manager, 15, |_, _| {}));

    let generated = events
        .iter()
        .filter(|e| matches!(e, WorldEvent::ChunkGenerated { .. }))
        .count();
    let disposed = events
        .iter()
        .filter(|e| matches!(e, WorldEvent::ChunkDisposed { .. }))
        .count();
    assert!(disposed > 0);
    assert_eq!(generated - disposed, manager.chunk_count());
}

#[test]
fn test_same_seed_same_world() {
    let config = SimulationConfig::default().with_seed(77);
    let mut a = create_test_manager(&config);
    let mut b = create_test_manager(&config);
    walk(&mut a, 6, |_, _| {});
    walk(&mut b, 6, |_, _| {});

    let left: Vec<_> = a.chunks().cloned().collect();
    let right: Vec<_> = b.chunks().cloned().collect();
    assert_eq!(left, right);
}
