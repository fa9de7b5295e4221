//! Durable workflows: review and rule simulation, with retry, a watchdog
//! for step and heartbeat timeouts, and crash recovery.

pub mod heartbeat;
pub mod retry;
pub mod review;
pub mod simulation;
pub mod state;
pub mod supervisor;
pub mod watchdog;

pub use review::{ReviewOrchestrator, ReviewServices};
pub use simulation::{count_workspace_files, SimulationOrchestrator, SimulationServices};
pub use state::{ReviewCheckpoint, ReviewRequest, ReviewState, SimulationRequest, SimulationState};
pub use supervisor::Supervisor;
pub use watchdog::{run_guarded, StepLimits};
