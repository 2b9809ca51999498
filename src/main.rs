//! Foliage Growth - Command Line Spawner
//!
//! Loads a TOML configuration, simulates the tile pool, spawns the grid onto
//! a synthetic terrain and writes the placements as JSON.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use foliage_growth::core::config::FoliageConfig;
use foliage_growth::core::error::Result;
use foliage_growth::placement::{InMemoryPlacementStore, PlacementFile, PlacementMetadata};
use foliage_growth::spawn::{FoliageSet, FoliageSpawner, ProgressSink};

/// Procedural foliage spawner
#[derive(Parser, Debug)]
#[command(name = "foliage-growth")]
#[command(about = "Simulate vegetation growth over a tile grid and write placements as JSON")]
struct Args {
    /// TOML configuration file
    #[arg(long, default_value = "data/forest.toml")]
    config: PathBuf,

    /// Output placement file
    #[arg(long, default_value = "foliage_placements.json")]
    output: PathBuf,

    /// Override the tile pool seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the grid width
    #[arg(long)]
    tiles_x: Option<u32>,

    /// Override the grid height
    #[arg(long)]
    tiles_y: Option<u32>,

    /// Cap the number of simulation steps per tile
    #[arg(long)]
    max_steps: Option<u32>,
}

struct LogProgress;

impl ProgressSink for LogProgress {
    fn cell_completed(&self, completed: usize, total: usize) {
        tracing::debug!(completed, total, "cell placed");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();

    let mut config = FoliageConfig::from_file(&args.config)?;
    if let Some(seed) = args.seed {
        config.set.random_seed = seed;
    }
    if let Some(tiles_x) = args.tiles_x {
        config.spawn.tiles_x = tiles_x;
    }
    if let Some(tiles_y) = args.tiles_y {
        config.spawn.tiles_y = tiles_y;
    }
    if let Some(max_steps) = args.max_steps {
        config.set.max_steps = Some(max_steps as i64);
    }
    config.validate()?;

    tracing::info!(
        config = %args.config.display(),
        species = config.species.len(),
        seed = config.set.random_seed,
        "loaded configuration"
    );

    let set = FoliageSet::new(config.ecosystem(), &config.set)?;
    let spawner = FoliageSpawner::new(&set, config.spawn.clone())?;

    let mut store = InMemoryPlacementStore::new();
    let placed = spawner.spawn_procedural_content(&config.terrain, &mut store, Some(&LogProgress))?;

    let metadata = PlacementMetadata {
        name: args.config.file_stem().map(|s| s.to_string_lossy().into_owned()),
        created_by: Some(format!("foliage-growth {}", env!("CARGO_PKG_VERSION"))),
        seed: Some(config.set.random_seed),
        tiles_x: Some(config.spawn.tiles_x),
        tiles_y: Some(config.spawn.tiles_y),
        tile_size: Some(config.set.tile_size),
    };
    PlacementFile::new(store.into_records(), Some(metadata)).save(&args.output)?;

    tracing::info!(placed, output = %args.output.display(), "wrote placements");
    Ok(())
}
