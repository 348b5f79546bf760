//! Generates the chunks around the origin of a configured world and logs
//! what came out.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use steel_density::BlockStateId;
use steel_terrain::chunk::ChunkGenerator;
use steel_terrain::worldgen::biome_source::biomes;
use steel_terrain::worldgen::{BiomeSource, MultiNoiseBiomeSource, biome_name};
use steel_terrain::{
    ChunkPos, HeightmapType, NoiseBasedChunkGenerator, Preset, ProtoChunk, WorldGenConfig, WorldGenerator,
    parse_seed,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config/worldgen.json5";

/// Totals over every generated chunk.
struct Summary {
    chunks: usize,
    failed: usize,
    blocks: u64,
    fluids: usize,
    light_sources: usize,
    columns: u64,
    surface_sum: i64,
    lowest_surface: i32,
    highest_surface: i32,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            chunks: 0,
            failed: 0,
            blocks: 0,
            fluids: 0,
            light_sources: 0,
            columns: 0,
            surface_sum: 0,
            lowest_surface: i32::MAX,
            highest_surface: i32::MIN,
        }
    }
}

impl Summary {
    fn add(&mut self, chunk: &ProtoChunk) {
        self.chunks += 1;
        self.blocks += chunk
            .sections()
            .iter()
            .map(|section| u64::from(section.lock().non_air_count()))
            .sum::<u64>();
        self.fluids += chunk.postprocessing().len();
        self.light_sources += chunk.light_sources().len();
        for x in 0..16 {
            for z in 0..16 {
                let surface = chunk.height_at(HeightmapType::WorldSurfaceWg, x, z);
                self.columns += 1;
                self.surface_sum += i64::from(surface);
                self.lowest_surface = self.lowest_surface.min(surface);
                self.highest_surface = self.highest_surface.max(surface);
            }
        }
    }
}

/// Reads the config at `path`, writing the defaults there first if it is missing.
fn load_config(path: &Path) -> Result<WorldGenConfig> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let config = WorldGenConfig::default();
        fs::write(path, serde_json::to_string_pretty(&config)?)
            .with_context(|| format!("writing default config to {}", path.display()))?;
        log::info!("Wrote default config to {}", path.display());
        return Ok(config);
    }
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json5::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn build_generator(config: &WorldGenConfig, seed: i64) -> Result<NoiseBasedChunkGenerator> {
    let settings = config
        .preset
        .settings(config.legacy_random_source)
        .context("building noise settings")?;
    let biome_source = match config.preset {
        Preset::Flat { .. } => BiomeSource::Fixed(biomes::PLAINS),
        Preset::Overworld => BiomeSource::MultiNoise(MultiNoiseBiomeSource::overworld()),
    };
    Ok(NoiseBasedChunkGenerator::new(settings, seed as u64, biome_source)
        .context("binding the noise router to the seed")?
        .with_debug_override(config.debug))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = load_config(&path)?;
    let seed = parse_seed(&config.seed).unwrap_or_else(rand::random);
    log::info!("Generating {:?} with seed {seed}", config.preset);

    let generator = Arc::new(build_generator(&config, seed)?);
    let world = WorldGenerator::new(generator.clone());

    let radius = i32::try_from(config.chunk_radius).context("chunk radius too large")?;
    let positions: Vec<ChunkPos> = (-radius..=radius)
        .flat_map(|x| (-radius..=radius).map(move |z| ChunkPos::new(x, z)))
        .collect();

    let start = Instant::now();
    let results = world.generate_many(&positions).await;
    let elapsed = start.elapsed();

    let mut summary = Summary::default();
    let mut spawn_biome = None;
    for (pos, result) in positions.iter().zip(results) {
        match result {
            Ok(chunk) => {
                if *pos == ChunkPos::new(0, 0) {
                    spawn_biome = Some(chunk.get_biome(0, generator.sea_level() >> 2, 0));
                }
                summary.add(&chunk);
            }
            Err(err) => {
                tracing::warn!(%err, "chunk generation failed");
                summary.failed += 1;
            }
        }
    }

    tracing::info!(
        chunks = summary.chunks,
        failed = summary.failed,
        ?elapsed,
        blocks = summary.blocks,
        fluids = summary.fluids,
        light_sources = summary.light_sources,
        "Generation finished"
    );
    if summary.columns > 0 {
        log::info!(
            "Surface Y ranges {}..={}, mean {:.1}",
            summary.lowest_surface,
            summary.highest_surface,
            summary.surface_sum as f64 / summary.columns as f64
        );
    }

    let spawn_height = generator.base_height(0, 0, HeightmapType::WorldSurfaceWg);
    let top = spawn_height.map_or_else(BlockStateId::default, |y| generator.base_column(0, 0).get_block(y - 1));
    log::info!(
        "Spawn surface {spawn_height:?} ({}), biome {}, sea level {}",
        top.name().unwrap_or("unknown"),
        spawn_biome.and_then(biome_name).unwrap_or("unknown"),
        generator.sea_level()
    );
    Ok(())
}
