pub mod biome;
pub mod config;
pub mod error;
pub mod grid;
pub mod heightmap;
pub mod hydrology;
pub mod metrics;
pub mod seed;
pub mod solver;
pub mod tuning;

pub use biome::Biome;
pub use config::{GenerationConfig, ShapeParams, TargetRatios, WaterRules, WorldSettings, resolve_water_rules};
pub use error::HydromapError;
pub use grid::Grid;
pub use heightmap::{Heightmap, generate_heightmap};
pub use hydrology::{FlowDir, HydrologyMap, TerrainType, generate_hydrology, generate_hydrology_with_rules};
pub use metrics::{MapMetrics, measure_map};
pub use seed::Seed;
pub use solver::{AdjustmentSolver, Adjuster, FnAdjuster, Metrics, Parameters, SolveResult, SolveStatus, SolverOptions};
pub use tuning::{TerrainAdjuster, TuningOutcome, run_solver};
