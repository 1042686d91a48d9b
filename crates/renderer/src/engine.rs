//! Render engine: per-frame state, scene orchestration, draw loop.
//!
//! One tick: apply any pending resize, clear, rebuild the view-projection
//! from camera state, draw every scene object in fixed order with
//! `vp * local`, then advance the animations with the delta time derived
//! from consecutive tick timestamps, and ask the scheduler for the next
//! tick unless stopped.

use corelib::{Vec3, camera::Projection, clock::FrameClock, entity::MovingEntity, vec3};
use corelib::transform::Transform;
use models::Mesh;

use crate::backend::{FrameAccess, FrameScheduler, MeshHandle, RenderBackend};
use crate::error::{RenderError, RenderResult};

/// Per-frame mutation applied to a scene object's transform parameters.
#[derive(Clone, Copy, Debug)]
pub enum Animation {
    /// Static object.
    Fixed,
    /// Euler rotation rates in radians per second.
    Spin { rate: Vec3 },
    /// Position and yaw follow a simulated entity on the ground plane
    /// (entity X maps to world X, entity Y to world Z).
    Drive(MovingEntity),
}

/// A drawable: geometry/color tables plus local transform parameters.
/// Constructed once at engine initialization; the transform may be mutated
/// every frame by its animation.
#[derive(Clone, Debug)]
pub struct SceneObject {
    pub name: &'static str,
    pub mesh: Mesh,
    pub transform: Transform,
    pub animation: Animation,
    handle: Option<MeshHandle>,
    disabled: bool,
}

impl SceneObject {
    pub fn new(name: &'static str, mesh: Mesh) -> Self {
        Self {
            name,
            mesh,
            transform: Transform::identity(),
            animation: Animation::Fixed,
            handle: None,
            disabled: false,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = animation;
        self
    }

    /// Disabled objects stay in the scene but are never drawn.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// Engine lifecycle. `initialize` is the only way to obtain an engine, so
/// an engine value is always at least Ready; Stopped is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Initialized, no tick yet.
    Ready,
    /// At least one tick processed; rescheduling itself.
    Running,
    /// `stop()` observed or a fatal error occurred. No further ticks are
    /// scheduled; restarting requires a fresh `initialize`.
    Stopped,
}

/// Scene description consumed by [`RenderEngine::initialize`].
#[derive(Clone, Debug)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub projection: Projection,
    pub clear_color: [f64; 4],
    /// Depth test + back-face culling. Off only for the 2D preset.
    pub depth_test: bool,
}

pub struct RenderEngine<B: RenderBackend, S: FrameScheduler> {
    backend: B,
    scheduler: S,
    scene: Scene,
    clock: FrameClock,
    state: EngineState,
    pending_size: Option<(u32, u32)>,
}

impl<B: RenderBackend, S: FrameScheduler> RenderEngine<B, S> {
    /// Uploads every scene mesh and transitions to Ready.
    ///
    /// An object whose attribute tables are rejected is disabled and
    /// logged; any other upload failure aborts initialization.
    pub fn initialize(mut backend: B, mut scene: Scene, scheduler: S) -> RenderResult<Self> {
        for obj in &mut scene.objects {
            match backend.upload_mesh(&obj.mesh) {
                Ok(handle) => obj.handle = Some(handle),
                Err(RenderError::InvalidAttribute { name }) => {
                    log::warn!(
                        "scene object '{}': attribute '{}' missing or mismatched; object disabled",
                        obj.name,
                        name
                    );
                    obj.disabled = true;
                }
                Err(e) => return Err(e),
            }
        }
        log::info!(
            "engine ready: {} object(s), depth_test={}",
            scene.objects.len(),
            scene.depth_test
        );
        Ok(Self {
            backend,
            scheduler,
            scene,
            clock: FrameClock::new(),
            state: EngineState::Ready,
            pending_size: None,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.state == EngineState::Stopped
    }

    /// Records the host-reported surface size; applied at the start of the
    /// next tick, before the projection is rebuilt.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.pending_size = Some((width.max(1), height.max(1)));
    }

    /// Takes effect before the next scheduled tick; never preempts a tick
    /// in progress. A stopped engine cannot be resumed.
    pub fn stop(&mut self) {
        self.state = EngineState::Stopped;
    }

    /// Runs one update-and-draw cycle for the timestamp `now_ms`.
    ///
    /// No-op when stopped. A backend failure mid-frame is reported, halts
    /// the loop and is returned to the caller.
    pub fn tick(&mut self, now_ms: f64) -> RenderResult<()> {
        if self.state == EngineState::Stopped {
            return Ok(());
        }
        self.state = EngineState::Running;

        let dt = self.clock.tick(now_ms);

        if let Some((w, h)) = self.pending_size.take() {
            if (w, h) != self.backend.surface_size() {
                self.backend.resize(w, h);
            }
        }
        let (width, height) = self.backend.surface_size();

        if let Err(e) = self.draw_frame(width as f32, height as f32) {
            log::error!("frame failed, halting render loop: {e}");
            self.state = EngineState::Stopped;
            return Err(e);
        }

        self.advance(dt);

        if self.state != EngineState::Stopped {
            self.scheduler.request_next_tick();
        }
        Ok(())
    }

    /// Draws all enabled objects. A singular view-projection skips the
    /// frame's draws (the cleared frame is still presented) rather than
    /// propagating garbage.
    fn draw_frame(&mut self, width: f32, height: f32) -> RenderResult<()> {
        match self.backend.begin_frame()? {
            FrameAccess::Skip => {
                log::debug!("surface not ready; skipping frame");
                return Ok(());
            }
            FrameAccess::Ready => {}
        }

        match self.scene.projection.view_projection(width, height) {
            Err(e) => log::warn!("view-projection unavailable, skipping draws: {e}"),
            Ok(vp) => {
                for obj in &self.scene.objects {
                    let Some(handle) = obj.handle else { continue };
                    if obj.disabled {
                        continue;
                    }
                    self.backend.draw(handle, vp * obj.transform.matrix())?;
                }
            }
        }

        self.backend.end_frame()
    }

    /// Applies per-frame animation with the tick's delta time. The first
    /// tick has `dt = 0`, so state is presented before it moves.
    fn advance(&mut self, dt: f32) {
        for obj in &mut self.scene.objects {
            match &mut obj.animation {
                Animation::Fixed => {}
                Animation::Spin { rate } => {
                    obj.transform.rotation += *rate * dt;
                }
                Animation::Drive(entity) => {
                    entity.advance(dt);
                    obj.transform.translation =
                        vec3(entity.position.x, 0.0, entity.position.y);
                    obj.transform.rotation.y = entity.heading;
                }
            }
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.scene.objects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::Mat4;
    use corelib::camera::OrbitCamera;
    use models::{bus, cuboid, floor};

    /// Records the wire-level calls the engine makes.
    #[derive(Default)]
    struct RecordingBackend {
        size: (u32, u32),
        resizes: Vec<(u32, u32)>,
        uploads: u32,
        frames_begun: u32,
        frames_ended: u32,
        draws: Vec<(MeshHandle, Mat4)>,
        fail_begin: bool,
        skip_frames: bool,
    }

    impl RecordingBackend {
        fn new(width: u32, height: u32) -> Self {
            Self {
                size: (width, height),
                ..Self::default()
            }
        }
    }

    impl RenderBackend for RecordingBackend {
        fn surface_size(&self) -> (u32, u32) {
            self.size
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.size = (width, height);
            self.resizes.push((width, height));
        }

        fn upload_mesh(&mut self, mesh: &Mesh) -> RenderResult<MeshHandle> {
            if mesh.positions.is_empty() {
                return Err(RenderError::InvalidAttribute { name: "position" });
            }
            if mesh.colors.len() != mesh.positions.len() {
                return Err(RenderError::InvalidAttribute { name: "color" });
            }
            let handle = MeshHandle(self.uploads);
            self.uploads += 1;
            Ok(handle)
        }

        fn begin_frame(&mut self) -> RenderResult<FrameAccess> {
            if self.fail_begin {
                return Err(RenderError::Surface("device lost".into()));
            }
            self.frames_begun += 1;
            if self.skip_frames {
                return Ok(FrameAccess::Skip);
            }
            Ok(FrameAccess::Ready)
        }

        fn draw(&mut self, mesh: MeshHandle, mvp: Mat4) -> RenderResult<()> {
            self.draws.push((mesh, mvp));
            Ok(())
        }

        fn end_frame(&mut self) -> RenderResult<()> {
            self.frames_ended += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct ManualScheduler {
        requests: u32,
    }

    impl FrameScheduler for ManualScheduler {
        fn request_next_tick(&mut self) {
            self.requests += 1;
        }
    }

    fn bus_scene() -> Scene {
        Scene {
            objects: vec![
                SceneObject::new("bus", bus()).with_animation(Animation::Drive(
                    MovingEntity::new(corelib::vec2(0.0, 0.0), 0.0, 100.0),
                )),
                SceneObject::new("floor", floor()),
            ],
            projection: Projection::Orbit(OrbitCamera::default()),
            clear_color: [1.0, 1.0, 1.0, 1.0],
            depth_test: true,
        }
    }

    fn engine_with(
        scene: Scene,
    ) -> RenderEngine<RecordingBackend, ManualScheduler> {
        RenderEngine::initialize(
            RecordingBackend::new(800, 600),
            scene,
            ManualScheduler::default(),
        )
        .unwrap()
    }

    #[test]
    fn initialize_uploads_every_mesh_and_is_ready() {
        let engine = engine_with(bus_scene());
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.backend().uploads, 2);
    }

    #[test]
    fn tick_draws_in_fixed_order_and_reschedules() {
        let mut engine = engine_with(bus_scene());
        engine.tick(0.0).unwrap();
        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(engine.backend().frames_begun, 1);
        assert_eq!(engine.backend().frames_ended, 1);
        let drawn: Vec<u32> = engine.backend().draws.iter().map(|(h, _)| h.0).collect();
        assert_eq!(drawn, vec![0, 1]);
        assert_eq!(engine.scheduler().requests, 1);
    }

    #[test]
    fn stop_prevents_further_scheduling() {
        let mut engine = engine_with(bus_scene());
        engine.tick(0.0).unwrap();
        engine.stop();
        engine.tick(16.0).unwrap();
        assert_eq!(engine.backend().frames_begun, 1, "stopped tick is a no-op");
        assert_eq!(engine.scheduler().requests, 1);
        assert!(engine.is_stopped());
    }

    #[test]
    fn first_tick_applies_no_motion() {
        let mut engine = engine_with(bus_scene());
        engine.tick(1000.0).unwrap();
        let bus = &engine.objects()[0];
        assert_eq!(bus.transform.translation, vec3(0.0, 0.0, 0.0));

        engine.tick(1100.0).unwrap();
        let bus = &engine.objects()[0];
        // heading 0, speed 100, dt 0.1s -> 10 units along +Z.
        assert!((bus.transform.translation.z - 10.0).abs() < 1e-3);
    }

    #[test]
    fn resize_is_applied_before_the_projection() {
        let mut engine = engine_with(bus_scene());
        engine.tick(0.0).unwrap();
        let before = engine.backend().draws[1].1;

        engine.resize(1600, 600);
        engine.tick(16.0).unwrap();
        assert_eq!(engine.backend().resizes, vec![(1600, 600)]);
        let after = engine.backend().draws[3].1;
        // Floor is static; only the aspect ratio changed, halving column 0.
        assert!((after.col(0).x - before.col(0).x / 2.0).abs() < 1e-5);
    }

    #[test]
    fn identical_timestamps_give_identical_view_projections() {
        let mut a = engine_with(bus_scene());
        let mut b = engine_with(bus_scene());
        for ts in [0.0, 16.7, 33.1, 50.2] {
            a.tick(ts).unwrap();
            b.tick(ts).unwrap();
        }
        let ma: Vec<_> = a.backend().draws.iter().map(|(_, m)| m.to_cols_array()).collect();
        let mb: Vec<_> = b.backend().draws.iter().map(|(_, m)| m.to_cols_array()).collect();
        assert_eq!(ma, mb);
    }

    #[test]
    fn invalid_attribute_disables_object_but_not_engine() {
        let mut scene = bus_scene();
        let mut broken = cuboid(10.0, 10.0, 10.0);
        broken.colors.pop();
        scene.objects.push(SceneObject::new("broken", broken));

        let mut engine = engine_with(scene);
        assert!(engine.objects()[2].is_disabled());

        engine.tick(0.0).unwrap();
        assert_eq!(engine.backend().draws.len(), 2, "disabled object is never drawn");
    }

    #[test]
    fn singular_view_projection_skips_draws_not_the_loop() {
        let mut scene = bus_scene();
        scene.projection = Projection::Orbit(OrbitCamera {
            radius: f32::NAN,
            ..OrbitCamera::default()
        });
        let mut engine = engine_with(scene);
        engine.tick(0.0).unwrap();
        assert!(engine.backend().draws.is_empty());
        assert_eq!(engine.backend().frames_ended, 1, "cleared frame still presented");
        assert_eq!(engine.scheduler().requests, 1, "loop keeps running");
    }

    #[test]
    fn transient_skip_keeps_the_loop_alive() {
        let mut engine = engine_with(bus_scene());
        engine.backend.skip_frames = true;
        engine.tick(0.0).unwrap();
        assert!(engine.backend().draws.is_empty());
        assert_eq!(engine.scheduler().requests, 1);
    }

    #[test]
    fn backend_failure_halts_the_loop() {
        let mut engine = engine_with(bus_scene());
        engine.backend.fail_begin = true;
        assert!(engine.tick(0.0).is_err());
        assert!(engine.is_stopped());
        assert_eq!(engine.scheduler().requests, 0);
        // Terminal: further ticks do nothing.
        assert!(engine.tick(16.0).is_ok());
        assert_eq!(engine.backend().frames_begun, 0);
    }

    #[test]
    fn drive_animation_follows_the_entity() {
        let mut engine = engine_with(bus_scene());
        engine.tick(0.0).unwrap();
        // 20 seconds of clamped ticks keep the bus inside the world bounds.
        for i in 1..=800 {
            engine.tick(i as f64 * 25.0).unwrap();
            let t = engine.objects()[0].transform.translation;
            assert!(t.x.abs() <= 500.0 && t.z.abs() <= 500.0);
        }
    }
}
