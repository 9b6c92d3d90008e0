//! Generate a map and print what came out of each stage

use std::collections::HashMap;
use std::time::Instant;

use voronoi_mapgen::*;

fn main() -> Result<()> {
    println!("=== voronoi_mapgen demo ===\n");

    // Step 1: Configure
    let seed = std::env::args().nth(1).unwrap_or_else(|| "demo".to_owned());
    let config = MapConfigBuilder::new()
        .seed(seed)
        .cell_count(6_000)?
        .size(1024, 768)?
        .random_template()
        .river_density(1.2)?
        .build()?;

    println!("Seed: {}", config.seed);
    println!("Size: {}x{}, {} cells", config.width, config.height, config.cell_count);

    // Step 2: Generate
    let start = Instant::now();
    let map = generate_with_progress(&config, &|p| {
        if (p * 100.0) as u32 % 10 == 0 {
            println!("  {:>3.0}%", p * 100.0);
        }
    })?;
    println!("Generated in {:.2?}", start.elapsed());
    if let Some(template) = map.template() {
        println!("Template: {}", template);
    }

    // Step 3: Land and water
    let land = map.cells().iter().filter(|c| c.is_land).count();
    let pct = land as f32 / map.cell_count().max(1) as f32 * 100.0;
    println!("\nLand: {} cells ({:.1}%)", land, pct);

    let mut kinds: HashMap<FeatureKind, (usize, usize)> = HashMap::new();
    for feature in map.features() {
        let entry = kinds.entry(feature.kind).or_default();
        entry.0 += 1;
        entry.1 += feature.size();
    }
    for kind in [FeatureKind::Ocean, FeatureKind::Lake, FeatureKind::Landmass] {
        let (count, cells) = kinds.get(&kind).copied().unwrap_or_default();
        println!("  {:?}: {} ({} cells)", kind, count, cells);
    }

    // Step 4: Rivers
    println!("\nRivers: {}", map.rivers().len());
    if let Some(longest) = map.rivers().iter().max_by_key(|r| r.len()) {
        println!(
            "  Longest: river {} with {} cells, width {:.2}, ends at {:?}",
            longest.id,
            longest.len(),
            longest.width,
            longest.mouth
        );
    }

    // Step 5: Biomes
    println!("\nBiomes:");
    let mut biomes: HashMap<u8, usize> = HashMap::new();
    for cell in map.cells() {
        *biomes.entry(cell.biome_id).or_insert(0) += 1;
    }
    for biome in Biome::ALL {
        if let Some(count) = biomes.get(&biome.id()) {
            println!("  {:<28} {}", biome.name(), count);
        }
    }

    // Step 6: Spatial query
    let center = Vec2::new(map.width() as f32 / 2.0, map.height() as f32 / 2.0);
    if let Some(id) = map.find_cell_at(center) {
        let cell = map.cell(id)?;
        println!(
            "\nCenter {:?} -> cell {} (height {:.2}, {} neighbors)",
            center,
            id,
            cell.height,
            cell.neighbors.len()
        );
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
