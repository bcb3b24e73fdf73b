//! orrery
//!
//! A small animated solar system: a star sphere, the sun, the earth and the
//! moon, each a textured UV sphere spinning about its own tilted axis while
//! orbiting its parent. Rendering runs on wgpu inside a winit window.
//!
//! High-level modules
//! - `camera`: spherical camera, projection and uniforms for view/projection
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `controls`: pause, reset and camera input handling
//! - `data_structures`: geometry, orbits, the scene graph, meshes, textures, instances
//! - `flow`: high level flow control and the event loop
//! - `pipelines`: the planet render pipeline and the light uniform
//! - `render`: render composition handed from flows to the engine
//! - `resources`: helpers to load textures from the asset directory
//! - `solar_system`: the bodies of the default scene and their flow
//!

pub mod camera;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod solar_system;
