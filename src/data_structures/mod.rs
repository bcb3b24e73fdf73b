//! Engine data structures: geometry, orbits, scene graphs, models, textures and instances.
//!
//! - `geometry` generates sphere meshes on the CPU
//! - `orbit` holds a body's spin and orbit parameters and the resulting local transform
//! - `scene_graph` enables hierarchical scene organization (translation-only inheritance)
//! - `model` contains mesh and material definitions, GPU resources for 3D models
//! - `texture` contains GPU texture wrapper and creation utilities
//! - `instance` holds per-instance transformation data

pub mod geometry;
pub mod instance;
pub mod model;
pub mod orbit;
pub mod scene_graph;
pub mod texture;
