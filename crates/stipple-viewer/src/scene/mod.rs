//! Demo scene: a field of lit, spinning cubes.

mod camera;
mod mesh;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use stipple_engine::input::Gesture;
use stipple_engine::render::{RenderCtx, RenderTarget};
use stipple_engine::scene::Scene;

use camera::OrbitCamera;
use mesh::{CubeInstance, CubeVertex};

const CUBES_PER_SIDE: u32 = 7;
const CUBE_SPACING: f32 = 2.2;
const AMBIENT: f32 = 0.12;
const INFO_INTERVAL_SECS: f32 = 1.0;

/// Debug views toggled by `Gesture::ToggleDebug(2..=4)`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
struct DebugView {
    /// 2: each cube gets its own gray level.
    instance_shades: bool,
    /// 3: outline every cube's edges.
    bounds: bool,
    /// 4: log camera and animation state once per second.
    info: bool,
    since_info: f32,
}

impl DebugView {
    /// Flips the view numbered `n`. Returns `false` for unknown numbers.
    fn toggle(&mut self, n: u8) -> bool {
        let flag = match n {
            2 => &mut self.instance_shades,
            3 => &mut self.bounds,
            4 => &mut self.info,
            _ => return false,
        };
        *flag = !*flag;
        self.since_info = 0.0;
        true
    }

    /// Advances the info timer; `true` when a report is due.
    fn info_due(&mut self, dt: f32) -> bool {
        if !self.info {
            return false;
        }
        self.since_info += dt;
        if self.since_info < INFO_INTERVAL_SECS {
            return false;
        }
        self.since_info -= INFO_INTERVAL_SECS;
        true
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
    params: [f32; 4],
}

/// GPU objects created in `initialize`, dropped in `teardown`.
struct CubeGpu {
    pipeline: wgpu::RenderPipeline,
    globals_ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    instance_vbo: wgpu::Buffer,
    index_count: u32,
    instance_count: u32,
}

impl CubeGpu {
    fn new(ctx: &RenderCtx<'_>) -> Self {
        let device = ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cubes shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/cubes.wgsl").into()),
        });

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cubes bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Globals>() as u64),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cubes pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let depth_stencil = ctx.depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cubes pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[CubeVertex::layout(), CubeInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let globals_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cubes globals ubo"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cubes bind group"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_ubo.as_entire_binding(),
            }],
        });

        let (vertices, indices) = mesh::cube();
        let instances = mesh::field(CUBES_PER_SIDE, CUBE_SPACING);

        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cubes vbo"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cubes ibo"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instance_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cubes instance vbo"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX,
        });

        log::debug!(
            "cube field pipeline built for {:?} / {:?}",
            ctx.target_format,
            ctx.depth_format
        );

        Self {
            pipeline,
            globals_ubo,
            bind_group,
            vbo,
            ibo,
            instance_vbo,
            index_count: indices.len() as u32,
            instance_count: instances.len() as u32,
        }
    }

    fn destroy(self) {
        self.instance_vbo.destroy();
        self.ibo.destroy();
        self.vbo.destroy();
        self.globals_ubo.destroy();
    }
}

/// Spinning cube field with an orbit camera.
///
/// Gestures: pan orbits, pinch zooms, rotate rolls the view, shove tilts,
/// double tap resets the camera, debug toggle 1 pauses the animation and
/// toggles 2 to 4 switch the [`DebugView`]s.
pub struct CubeField {
    camera: OrbitCamera,
    time: f32,
    paused: bool,
    debug: DebugView,
    aspect: f32,
    gpu: Option<CubeGpu>,
}

impl CubeField {
    pub fn new() -> Self {
        Self {
            camera: OrbitCamera::default(),
            time: 0.0,
            paused: false,
            debug: DebugView::default(),
            aspect: 1.0,
            gpu: None,
        }
    }

    fn globals(&self) -> Globals {
        let light = Vec3::new(0.4, 1.0, 0.6).normalize();
        let view_proj: Mat4 = self.camera.view_proj(self.aspect);
        Globals {
            view_proj: view_proj.to_cols_array_2d(),
            light_dir: light.extend(0.0).to_array(),
            params: [
                self.time,
                AMBIENT,
                self.debug.instance_shades as u32 as f32,
                self.debug.bounds as u32 as f32,
            ],
        }
    }
}

impl Default for CubeField {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for CubeField {
    fn initialize(&mut self, ctx: &RenderCtx<'_>) {
        let (w, h) = (ctx.viewport.width, ctx.viewport.height);
        if w > 0.0 && h > 0.0 {
            self.aspect = w / h;
        }
        self.gpu = Some(CubeGpu::new(ctx));
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    fn update(&mut self, dt: f32) {
        if !self.paused {
            self.time += dt;
        }
        if self.debug.info_due(dt) {
            log::info!(
                "cubes: t={:.2}s paused={} eye={:?} distance={:.1} aspect={:.3}",
                self.time,
                self.paused,
                self.camera.eye(),
                self.camera.distance,
                self.aspect
            );
        }
    }

    fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        let globals = self.globals();
        let Some(gpu) = self.gpu.as_ref() else { return; };
        let Some(depth_view) = target.depth_view else { return; };

        ctx.queue.write_buffer(&gpu.globals_ubo, 0, bytemuck::bytes_of(&globals));

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("cubes pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&gpu.pipeline);
        rpass.set_bind_group(0, &gpu.bind_group, &[]);
        rpass.set_vertex_buffer(0, gpu.vbo.slice(..));
        rpass.set_vertex_buffer(1, gpu.instance_vbo.slice(..));
        rpass.set_index_buffer(gpu.ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..gpu.index_count, 0, 0..gpu.instance_count);
    }

    fn teardown(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            gpu.destroy();
        }
    }

    fn handle_gesture(&mut self, gesture: Gesture) {
        match gesture {
            Gesture::Pan { from, to } => {
                let d = to - from;
                self.camera.orbit(d.x, d.y);
            }
            Gesture::Pinch { scale, .. } => self.camera.zoom(scale),
            Gesture::Rotate { radians, .. } => self.camera.spin(radians),
            Gesture::Shove { delta } => self.camera.tilt(delta),
            Gesture::DoubleTap { .. } => self.camera.reset(),
            Gesture::ToggleDebug(1) => {
                self.paused = !self.paused;
                log::info!("animation {}", if self.paused { "paused" } else { "resumed" });
            }
            Gesture::ToggleDebug(n) => {
                if self.debug.toggle(n) {
                    log::info!("debug view {n}: {:?}", self.debug);
                }
            }
            Gesture::Tap { .. } => {}
        }
    }
}
