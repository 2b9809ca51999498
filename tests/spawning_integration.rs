//! End-to-end tests: configuration through placement output

use foliage_growth::core::config::FoliageConfig;
use foliage_growth::placement::{
    InMemoryPlacementStore, PlacementFile, PlacementRecord, PlacementStore, SpawnBatchId,
};
use foliage_growth::projection::{BlockingVolume, SyntheticTerrain};
use foliage_growth::spawn::{FoliageSet, FoliageSpawner};

const CONFIG: &str = r#"
[set]
tile_size = 800.0
num_unique_tiles = 2
random_seed = 99

[spawn]
tiles_x = 2
tiles_y = 2
overlap = 120.0
half_height = 2000.0

[[species]]
name = "spruce"
collision_radius = 20.0
shade_radius = 35.0
overlap_priority = 1
num_steps = 3
initial_seed_density = 4.0
average_spread_distance = 60.0
spread_variance = 40.0
seeds_per_step = 2
max_age = 6.0
max_initial_age = 1.5
scale_min = 0.7
scale_max = 1.4
height_min = 10.0

[[species]]
name = "moss"
collision_radius = 4.0
shade_radius = 4.0
can_grow_in_shade = true
num_steps = 2
initial_seed_density = 6.0
average_spread_distance = 12.0
spread_variance = 8.0
max_initial_age = 1.0
height_min = 10.0
"#;

fn run(config: &FoliageConfig, world: &SyntheticTerrain, batch: SpawnBatchId) -> Vec<PlacementRecord> {
    let set = FoliageSet::new(config.ecosystem(), &config.set).unwrap();
    let spawner = FoliageSpawner::new(&set, config.spawn.clone()).unwrap().with_batch(batch);
    spawner.spawn_tiles(world, None).unwrap()
}

#[test]
fn test_pipeline_is_deterministic() {
    let config = FoliageConfig::from_toml(CONFIG).unwrap();
    let world = SyntheticTerrain::flat(10.0);
    let batch = SpawnBatchId::new();

    let first = run(&config, &world, batch);
    let second = run(&config, &world, batch);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_height_min_is_inclusive() {
    let config = FoliageConfig::from_toml(CONFIG).unwrap();
    let batch = SpawnBatchId::new();

    let at_limit = run(&config, &SyntheticTerrain::flat(10.0), batch);
    let below = run(&config, &SyntheticTerrain::flat(9.99), batch);
    assert!(!at_limit.is_empty());
    assert!(below.is_empty());
    assert!(at_limit.iter().all(|r| r.location.z == 10.0));
}

#[test]
fn test_blocking_volume_clears_area() {
    let config = FoliageConfig::from_toml(CONFIG).unwrap();
    let batch = SpawnBatchId::new();
    let open = SyntheticTerrain::flat(20.0);
    let blocked = SyntheticTerrain {
        blocking_volumes: vec![BlockingVolume {
            min: [0.0, 0.0],
            max: [800.0, 800.0],
            top: 500.0,
        }],
        ..SyntheticTerrain::flat(20.0)
    };

    let all = run(&config, &open, batch);
    let kept = run(&config, &blocked, batch);
    assert!(kept.len() < all.len());
    assert!(kept.iter().all(|r| {
        let p = r.location;
        !(p.x >= 0.0 && p.x <= 800.0 && p.y >= 0.0 && p.y <= 800.0)
    }));
}

#[test]
fn test_respawn_clears_previous_batch_only() {
    let config = FoliageConfig::from_toml(CONFIG).unwrap();
    let world = SyntheticTerrain::flat(10.0);
    let set = FoliageSet::new(config.ecosystem(), &config.set).unwrap();
    let spawner = FoliageSpawner::new(&set, config.spawn.clone()).unwrap();

    let mut store = InMemoryPlacementStore::new();
    let unrelated = SpawnBatchId::new();
    let mut foreign = run(&config, &world, unrelated);
    foreign.truncate(3);
    store.add(foreign);

    let placed = spawner.spawn_procedural_content(&world, &mut store, None).unwrap();
    spawner.spawn_procedural_content(&world, &mut store, None).unwrap();
    assert_eq!(store.batch_len(spawner.batch()), placed);
    assert_eq!(store.batch_len(unrelated), 3);

    spawner.remove_procedural_content(&mut store);
    assert_eq!(store.len(), 3);
}

#[test]
fn test_placement_file_written_and_read_back() {
    let config = FoliageConfig::from_toml(CONFIG).unwrap();
    let records = run(&config, &SyntheticTerrain::flat(10.0), SpawnBatchId::new());
    let count = records.len();

    let path = std::env::temp_dir().join(format!("foliage_growth_{}.json", std::process::id()));
    PlacementFile::new(records, None).save(&path).unwrap();
    let loaded = PlacementFile::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.version, 1);
    assert_eq!(loaded.placements.len(), count);
    assert!(loaded.placements.iter().all(|r| r.species == "spruce" || r.species == "moss"));
}

#[test]
fn test_bundled_forest_config_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/forest.toml");
    let config = FoliageConfig::from_file(&path).unwrap();
    assert_eq!(config.species.len(), 3);
    assert_eq!(config.terrain.blocking_volumes.len(), 1);
}
