//! Render engine over a swappable drawing backend.
//!
//! The engine (`engine`) owns the frame loop and scene state and talks to
//! the GPU only through the `RenderBackend` trait; `gpu` provides the wgpu
//! implementation, and tests substitute a recording backend. `scene` holds
//! the built-in presets.

pub mod backend;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod scene;

pub use backend::{FrameAccess, FrameScheduler, MeshHandle, RenderBackend};
pub use engine::{Animation, EngineState, RenderEngine, Scene, SceneObject};
pub use error::{RenderError, RenderResult};
pub use gpu::{GpuBackend, GpuConfig};
