pub mod cell;
pub mod classifier;
pub mod config;
pub mod error;
pub mod generator;
pub mod grid;
pub mod heightmap;
pub mod lattice;
pub mod noise;
pub mod pathfinding;
pub mod relief;
pub mod render;
pub mod rivers;
pub mod terrain;

pub use cell::{Cell, WorldMap};
pub use classifier::TerrainClassifier;
pub use config::{GenerationConfig, NoiseKind, NoiseSettings, WorldSetup};
pub use error::{ConfigError, GenerationError};
pub use generator::{GeneratedWorld, generate_map, generate_world};
pub use lattice::GridLattice;
pub use pathfinding::{AStar, SearchGraph, SearchOutcome, find_path};
pub use terrain::{TerrainCatalog, TerrainDescriptor, TerrainKind};
