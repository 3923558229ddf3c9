//! Random-walk state sampling on top of the generator facades.
//!
//! Purpose
//! - Draw training or test states around the initial state (forward walks
//!   over full states) or around the goal (backward walks over partial
//!   assignments through regression operators).
//! - Enumerate the cheap regression neighbourhood of an assignment
//!   (`sample_area`).
//!
//! Why this design
//! - One generic walk (`walk.rs`) parameterized by a `WalkSpace`; the two
//!   samplers only supply applicable operators and candidate construction.
//! - Generators come from an injected `GeneratorCache`; each sampler owns a
//!   seeded `StdRng`, so a seed reproduces the samples.

mod backward;
mod forward;
mod registry;
mod walk;

pub use backward::{AreaSample, RandomRegressionWalkSampler};
pub use forward::RandomWalkSampler;
pub use registry::PartialAssignmentRegistry;
pub use walk::{walk_length, WalkCfg, WalkHooks, MAX_WALK_TRIALS};
