//! wgpu implementation of the render backend.
//!
//! One flat-color pipeline (two variants: triangle list and strip), one
//! uniform slot per resident mesh, depth + back-face culling when the
//! scene asks for it. Everything that can fail is checked at construction
//! or upload time; per-frame surface trouble maps to skip/reconfigure.

use std::num::NonZeroU64;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use corelib::Mat4;
use models::{Mesh, Topology};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::backend::{FrameAccess, MeshHandle, RenderBackend};
use crate::error::{RenderError, RenderResult};

/// Vertex: position + color.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    color: [f32; 3],
}

impl Vertex {
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
    };
}

/// Per-draw uniform (16-byte aligned).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct CameraUniform {
    mvp: [[f32; 4]; 4],
}

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// corelib projections produce GL-style NDC (z in [-1, 1]); wgpu clips
/// z to [0, 1]. Applied once per draw, in front of the mvp.
const OPENGL_TO_WGPU: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
]);

/// Backend configuration, taken from the scene preset and CLI.
#[derive(Clone, Copy, Debug)]
pub struct GpuConfig {
    pub backends: wgpu::Backends,
    pub clear_color: [f64; 4],
    pub depth_test: bool,
}

struct GpuMesh {
    vertex_buf: wgpu::Buffer,
    index_buf: Option<wgpu::Buffer>,
    draw_count: u32,
    topology: Topology,
    uniform_buf: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct FrameInFlight {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    draws: Vec<MeshHandle>,
}

pub struct GpuBackend {
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline_list: wgpu::RenderPipeline,
    pipeline_strip: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    meshes: Vec<GpuMesh>,
    clear_color: wgpu::Color,
    depth_test: bool,
    depth_view: Option<wgpu::TextureView>,
    frame: Option<FrameInFlight>,
}

impl GpuBackend {
    /// Creates the GPU state bound to a window: surface, device, shader,
    /// pipelines. Any failure here aborts initialization with a
    /// backend/shader error carrying the diagnostic.
    pub async fn new(window: Arc<Window>, config: GpuConfig) -> RenderResult<Self> {
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: config.backends,
            ..Default::default()
        });

        let surface: wgpu::Surface<'static> = instance
            .create_surface(window.clone())
            .map_err(|e| RenderError::BackendUnavailable(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::BackendUnavailable(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("veles3d device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            })
            .await
            .map_err(|e| RenderError::BackendUnavailable(e.to_string()))?;

        // Surface format (prefer sRGB).
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| {
                RenderError::BackendUnavailable("no supported surface formats".into())
            })?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = config
            .depth_test
            .then(|| create_depth_view(&device, &surface_config));

        // Shader compile errors are captured via an error scope so the
        // diagnostic text reaches the caller instead of the panic handler.
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("flat color"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/flat.wgsl").into()),
        });
        if let Some(err) = device.pop_error_scope().await {
            return Err(RenderError::ShaderCompileFailed {
                log: err.to_string(),
            });
        }

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(
                        NonZeroU64::new(std::mem::size_of::<CameraUniform>() as u64).unwrap(),
                    ),
                },
                count: None,
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("flat pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline_list = build_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_format,
            wgpu::PrimitiveTopology::TriangleList,
            config.depth_test,
        );
        let pipeline_strip = build_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_format,
            wgpu::PrimitiveTopology::TriangleStrip,
            config.depth_test,
        );
        if let Some(err) = device.pop_error_scope().await {
            return Err(RenderError::ProgramLinkFailed {
                log: err.to_string(),
            });
        }

        let [r, g, b, a] = config.clear_color;
        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline_list,
            pipeline_strip,
            uniform_layout,
            meshes: Vec::new(),
            clear_color: wgpu::Color { r, g, b, a },
            depth_test: config.depth_test,
            depth_view,
            frame: None,
        })
    }
}

impl RenderBackend for GpuBackend {
    fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Reconfigures the surface and recreates the depth view. Zero sizes
    /// are clamped; wgpu cannot configure a 0x0 surface.
    fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
        if self.depth_test {
            self.depth_view = Some(create_depth_view(&self.device, &self.surface_config));
        }
    }

    fn upload_mesh(&mut self, mesh: &Mesh) -> RenderResult<MeshHandle> {
        if mesh.positions.is_empty() {
            return Err(RenderError::InvalidAttribute { name: "position" });
        }
        if mesh.colors.len() != mesh.positions.len() {
            return Err(RenderError::InvalidAttribute { name: "color" });
        }
        if let Some(indices) = &mesh.indices {
            if indices.iter().any(|&i| (i as usize) >= mesh.positions.len()) {
                return Err(RenderError::InvalidAttribute { name: "index" });
            }
        }

        let vertices: Vec<Vertex> = mesh
            .positions
            .iter()
            .zip(mesh.colors.iter())
            .map(|(p, c)| Vertex {
                position: *p,
                color: [
                    c[0] as f32 / 255.0,
                    c[1] as f32 / 255.0,
                    c[2] as f32 / 255.0,
                ],
            })
            .collect();

        let vertex_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buf = mesh.indices.as_ref().map(|indices| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("mesh indices"),
                    contents: bytemuck::cast_slice(indices),
                    usage: wgpu::BufferUsages::INDEX,
                })
        });

        let uniform_init = CameraUniform {
            mvp: Mat4::IDENTITY.to_cols_array_2d(),
        };
        let uniform_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh mvp"),
                contents: bytemuck::bytes_of(&uniform_init),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mesh mvp bind group"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buf.as_entire_binding(),
            }],
        });

        let handle = MeshHandle(self.meshes.len() as u32);
        self.meshes.push(GpuMesh {
            vertex_buf,
            index_buf,
            draw_count: mesh.draw_count(),
            topology: mesh.topology,
            uniform_buf,
            bind_group,
        });
        Ok(handle)
    }

    fn begin_frame(&mut self) -> RenderResult<FrameAccess> {
        match self.surface.get_current_texture() {
            Ok(surface_texture) => {
                let view = surface_texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                self.frame = Some(FrameInFlight {
                    surface_texture,
                    view,
                    draws: Vec::new(),
                });
                Ok(FrameAccess::Ready)
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost/outdated; reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                Ok(FrameAccess::Skip)
            }
            Err(wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other) => {
                Ok(FrameAccess::Skip)
            }
            Err(e @ wgpu::SurfaceError::OutOfMemory) => {
                Err(RenderError::Surface(e.to_string()))
            }
        }
    }

    /// Queues one draw. The uniform write lands before command submission,
    /// and each mesh owns its uniform slot, so per-object matrices do not
    /// clobber each other within a frame.
    fn draw(&mut self, mesh: MeshHandle, mvp: Mat4) -> RenderResult<()> {
        let Some(frame) = self.frame.as_mut() else {
            return Err(RenderError::Surface("draw outside an active frame".into()));
        };
        let Some(gpu_mesh) = self.meshes.get(mesh.0 as usize) else {
            return Err(RenderError::Surface(format!("unknown mesh handle {}", mesh.0)));
        };

        let uniform = CameraUniform {
            mvp: (OPENGL_TO_WGPU * mvp).to_cols_array_2d(),
        };
        self.queue
            .write_buffer(&gpu_mesh.uniform_buf, 0, bytemuck::bytes_of(&uniform));
        frame.draws.push(mesh);
        Ok(())
    }

    fn end_frame(&mut self) -> RenderResult<()> {
        let Some(frame) = self.frame.take() else {
            return Err(RenderError::Surface("end_frame without begin_frame".into()));
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: self.depth_view.as_ref().map(|view| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for handle in &frame.draws {
                let gpu_mesh = &self.meshes[handle.0 as usize];
                pass.set_pipeline(match gpu_mesh.topology {
                    Topology::TriangleList => &self.pipeline_list,
                    Topology::TriangleStrip => &self.pipeline_strip,
                });
                pass.set_bind_group(0, &gpu_mesh.bind_group, &[]);
                pass.set_vertex_buffer(0, gpu_mesh.vertex_buf.slice(..));
                match &gpu_mesh.index_buf {
                    Some(index_buf) => {
                        pass.set_index_buffer(index_buf.slice(..), wgpu::IndexFormat::Uint16);
                        pass.draw_indexed(0..gpu_mesh.draw_count, 0, 0..1);
                    }
                    None => pass.draw(0..gpu_mesh.draw_count, 0..1),
                }
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.surface_texture.present();
        Ok(())
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
    depth_test: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("flat pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::LAYOUT],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            cull_mode: depth_test.then_some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: depth_test.then(|| wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(
    device: &wgpu::Device,
    sc: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth"),
        size: wgpu::Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}
