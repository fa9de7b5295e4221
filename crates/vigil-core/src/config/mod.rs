//! Configuration system for Vigil.
//! TOML-based, layered resolution: overrides > env > project file > defaults.

pub mod blast_radius_config;
pub mod generation_config;
pub mod review_config;
pub mod simulation_config;
pub mod vigil_config;
pub mod workflow_config;

pub use blast_radius_config::BlastRadiusConfig;
pub use generation_config::GenerationConfig;
pub use review_config::{ReviewConfig, ReviewConfigPatch, ReviewDefaultsConfig};
pub use simulation_config::SimulationConfig;
pub use vigil_config::{ConfigOverrides, VigilConfig};
pub use workflow_config::WorkflowConfig;
