//! Engine data structures: meshes, textures, and instances.
//!
//! - `mesh` contains vertex types, GPU meshes and the primitive shapes
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `instance` holds per-instance data for the forward-pass light proxies

pub mod instance;
pub mod mesh;
pub mod texture;
