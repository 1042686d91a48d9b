//! Backend and scheduling abstractions.
//!
//! `RenderBackend` is the wire-level draw contract the engine speaks:
//! resize, clear, upload, draw, present. Anything that can fail is checked
//! when meshes are uploaded or the pipeline is built; per-frame calls
//! assume a valid backend. `FrameScheduler` is the host's
//! continuous-scheduling primitive; headless tests substitute a manual
//! stepper.

use corelib::Mat4;
use models::Mesh;

use crate::error::RenderResult;

/// Handle to a mesh resident in backend buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Outcome of attempting to begin a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameAccess {
    /// Surface acquired; draw calls may follow.
    Ready,
    /// Transient surface problem; skip this frame's draws and try again
    /// next tick.
    Skip,
}

pub trait RenderBackend {
    /// Current backing-store size in pixels.
    fn surface_size(&self) -> (u32, u32);

    /// Resizes the backing store and viewport. Must happen before the
    /// frame's projection is built, since aspect ratio depends on it.
    fn resize(&mut self, width: u32, height: u32);

    /// Uploads vertex data into backend buffers and returns a handle.
    fn upload_mesh(&mut self, mesh: &Mesh) -> RenderResult<MeshHandle>;

    /// Clears color and depth and prepares the pass (depth test and
    /// back-face culling are part of the steady state, not a toggle).
    fn begin_frame(&mut self) -> RenderResult<FrameAccess>;

    /// Draws one resident mesh with the given model-view-projection.
    fn draw(&mut self, mesh: MeshHandle, mvp: Mat4) -> RenderResult<()>;

    /// Submits and presents the frame begun by `begin_frame`.
    fn end_frame(&mut self) -> RenderResult<()>;
}

/// Requests that the host invoke `tick` once more. The windowed
/// implementation maps this onto the display-refresh redraw queue.
pub trait FrameScheduler {
    fn request_next_tick(&mut self);
}
