//! Deterministic Voronoi-cell map generation
//!
//! Turns a seed and a handful of parameters into a 2D map of Voronoi cells
//! with heights, coastlines, lakes, rivers, precipitation and biomes. The
//! same configuration always produces the same map, with or without
//! multithreading.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voronoi_mapgen::*;
//!
//! let config = MapConfigBuilder::new()
//!     .seed("islands")
//!     .cell_count(8_000).unwrap()
//!     .size(1024, 768).unwrap()
//!     .template(HeightmapTemplate::Archipelago)
//!     .build().unwrap();
//!
//! let map = generate_with_progress(&config, &|p| println!("{:.0}%", p * 100.0)).unwrap();
//!
//! let land = map.cells().iter().filter(|c| c.is_land).count();
//! println!("{} land cells, {} rivers", land, map.rivers().len());
//! ```
//!
//! # Pipeline
//!
//! 1. Jittered grid points, Lloyd's relaxation, Delaunay triangulation and
//!    clipped Voronoi cells
//! 2. Heightmap from a template or freeform noise, then a land border
//! 3. Features, coast distance, lakes and depression filling, alongside
//!    precipitation
//! 4. Rivers traced down the filled surface
//! 5. Biomes alongside smoothed river polylines, then render colors
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) position-to-cell lookups using KD-tree
//! - `serde`: Enables serialization support for configuration, cells and maps

// Modules
pub mod cell;
pub mod climate;
pub mod color;
pub mod config;
pub mod error;
pub mod generation;
pub mod hydrology;
pub mod map;
pub mod parallel;
pub mod pipeline;
pub mod rng;
pub mod spatial;
pub mod terrain;

// Re-export core types for convenience
pub use cell::Cell;
pub use climate::Biome;
pub use color::{BiomePalette, ColorMapper, HeightBands, TerrainColor};
pub use config::{MapConfig, MapConfigBuilder};
pub use error::{MapGenError, Result};
pub use generation::{LloydOptions, RawCell};
pub use hydrology::{Feature, FeatureKind, River, RiverMouth};
pub use map::MapData;
pub use pipeline::{generate, generate_simple, generate_simple_with_progress, generate_with_progress};
pub use rng::{MapRng, Seed, Stage};
pub use spatial::SpatialIndex;
pub use terrain::{HeightmapTemplate, PerlinConfig};

// Re-export glam::Vec2 for convenience
pub use glam::Vec2;
