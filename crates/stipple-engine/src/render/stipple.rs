use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::glyph::{GlyphId, GlyphSubsystem};
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};
use crate::text::{FontId, FontSystem, GlyphBitmap};

// ── style ─────────────────────────────────────────────────────────────────

/// Appearance shared by every glyph in the layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphStyle {
    pub ch: char,
    /// Logical pixels; rasterized at `size * scale_factor`.
    pub size: f32,
    pub color: Color,
}

impl Default for GlyphStyle {
    fn default() -> Self {
        Self {
            ch: 'O',
            size: 20.0,
            color: Color::BLACK,
        }
    }
}

/// Raster size in device pixels, quantised to quarter pixels so tiny scale
/// jitter does not re-rasterize the glyph.
fn raster_px(size: f32, scale_factor: f32) -> f32 {
    let scale = if scale_factor.is_finite() && scale_factor > 0.0 { scale_factor } else { 1.0 };
    ((size * scale * 4.0).round() / 4.0).max(1.0)
}

// ── renderer ──────────────────────────────────────────────────────────────

/// Glyph backend drawing one fixed glyph per slot.
///
/// The glyph is rasterized once with fontdue into an R8Unorm texture and
/// reused for every slot; each slot is one instance of a textured quad, so the
/// whole layer is a single instanced draw call.
pub struct StippleRenderer {
    fonts: FontSystem,
    font: FontId,
    style: GlyphStyle,

    // pipeline
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    sampler: Option<wgpu::Sampler>,

    // glyph texture (rebuilt when the raster size changes)
    glyph_px: Option<f32>,
    glyph_size: [f32; 2],
    glyph_view: Option<wgpu::TextureView>,
    globals_ubo: Option<wgpu::Buffer>,
    bind_group: Option<wgpu::BindGroup>,
    warned_missing_glyph: bool,

    // geometry
    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,
    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,

    // one entry per allocated glyph id
    instances: Vec<GlyphInstance>,
}

impl StippleRenderer {
    pub fn new(fonts: FontSystem, font: FontId, style: GlyphStyle) -> Self {
        Self {
            fonts,
            font,
            style,
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            sampler: None,
            glyph_px: None,
            glyph_size: [0.0; 2],
            glyph_view: None,
            globals_ubo: None,
            bind_group: None,
            warned_missing_glyph: false,
            quad_vbo: None,
            quad_ibo: None,
            instance_vbo: None,
            instance_capacity: 0,
            instances: Vec::new(),
        }
    }

    pub fn style(&self) -> GlyphStyle {
        self.style
    }

    /// Number of allocated glyph handles.
    pub fn glyph_count(&self) -> usize {
        self.instances.len()
    }

    // ── lazy-init helpers ─────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.target_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("stipple shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/stipple.wgsl").into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("stipple bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<Globals>() as u64,
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("stipple pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("stipple pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), GlyphInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.target_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("stipple pipeline built for {:?}", ctx.target_format);

        self.pipeline_format = Some(ctx.target_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);
        self.bind_group = None;
    }

    fn ensure_sampler(&mut self, ctx: &RenderCtx<'_>) {
        if self.sampler.is_some() {
            return;
        }
        self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("stipple glyph sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }));
    }

    /// Rasterizes and uploads the glyph when the raster size changes.
    ///
    /// Returns `false` when the font has no visible glyph for the style.
    fn ensure_glyph(&mut self, ctx: &RenderCtx<'_>) -> bool {
        let px = raster_px(self.style.size, ctx.scale_factor);
        if self.glyph_px == Some(px) {
            return self.glyph_view.is_some();
        }
        self.glyph_px = Some(px);
        self.glyph_view = None;
        self.bind_group = None;

        let Some(bitmap) = self.fonts.rasterize(self.font, self.style.ch, px) else {
            if !self.warned_missing_glyph {
                log::warn!(
                    "StippleRenderer: no visible glyph for {:?} at {px}px; overlay disabled",
                    self.style.ch
                );
                self.warned_missing_glyph = true;
            }
            return false;
        };

        self.glyph_view = Some(upload_glyph(ctx, &bitmap));
        self.glyph_size = [bitmap.width as f32, bitmap.height as f32];
        log::debug!("stipple glyph {:?} rasterized at {px}px ({}x{})", self.style.ch, bitmap.width, bitmap.height);
        true
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.globals_ubo.is_some() {
            return;
        }

        let Some(bgl) = self.bind_group_layout.as_ref() else { return; };
        let Some(glyph_view) = self.glyph_view.as_ref() else { return; };
        let Some(sampler) = self.sampler.as_ref() else { return; };

        let globals_ubo = match self.globals_ubo.take() {
            Some(ubo) => ubo,
            None => ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("stipple globals ubo"),
                size: std::mem::size_of::<Globals>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
        };

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("stipple bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(glyph_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        self.globals_ubo = Some(globals_ubo);
        self.bind_group = Some(bind_group);
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }
        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("stipple quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("stipple quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    fn ensure_instance_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }
        let new_cap = required.next_power_of_two().max(64);
        let new_size = (new_cap * std::mem::size_of::<GlyphInstance>()) as u64;
        self.instance_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("stipple instance vbo"),
            size: new_size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }

    fn write_globals(&self, ctx: &RenderCtx<'_>) {
        let Some(ubo) = self.globals_ubo.as_ref() else { return; };
        let globals = Globals {
            viewport: [ctx.viewport.width.max(1.0), ctx.viewport.height.max(1.0)],
            half_size: [self.glyph_size[0] * 0.5, self.glyph_size[1] * 0.5],
            color: self.style.color.to_array(),
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&globals));
    }
}

impl GlyphSubsystem for StippleRenderer {
    fn allocate(&mut self, count: usize) -> Vec<GlyphId> {
        let start = self.instances.len();
        self.instances.resize(start + count, GlyphInstance::hidden());
        (start..start + count).map(|i| GlyphId(i as u32)).collect()
    }

    fn set_transform(&mut self, id: GlyphId, x: f32, y: f32, rotation: f32, intensity: f32) {
        if let Some(instance) = self.instances.get_mut(id.index()) {
            *instance = GlyphInstance::new(x, y, rotation, intensity);
        }
    }

    fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        if self.instances.is_empty() || !ctx.viewport.is_valid() {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_sampler(ctx);
        self.ensure_static_buffers(ctx);
        if !self.ensure_glyph(ctx) {
            return;
        }
        self.ensure_bindings(ctx);
        self.write_globals(ctx);
        self.ensure_instance_capacity(ctx, self.instances.len());

        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return; };
        ctx.queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(&self.instances));

        let Some(pipeline) = self.pipeline.as_ref() else { return; };
        let Some(bind_group) = self.bind_group.as_ref() else { return; };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return; };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return; };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("stipple pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..6, 0, 0..self.instances.len() as u32);
    }
}

fn upload_glyph(ctx: &RenderCtx<'_>, bitmap: &GlyphBitmap) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: bitmap.width,
        height: bitmap.height,
        depth_or_array_layers: 1,
    };
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("stipple glyph texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::R8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &bitmap.coverage,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(bitmap.width),
            rows_per_image: Some(bitmap.height),
        },
        size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Uniform block (32 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Globals {
    viewport: [f32; 2],
    half_size: [f32; 2],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    pos: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Instance data layout (16 bytes):
///
///  offset 0  center       [f32; 2]  loc 1
///  offset 8  rot_opacity  [f32; 2]  loc 2
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct GlyphInstance {
    center: [f32; 2],
    rot_opacity: [f32; 2],
}

impl GlyphInstance {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        1 => Float32x2, // center
        2 => Float32x2  // rotation, opacity
    ];

    /// Opacity is clamped to `[0, 1]`; non-finite values hide the glyph.
    fn new(x: f32, y: f32, rotation: f32, intensity: f32) -> Self {
        let opacity = if intensity.is_finite() { intensity.clamp(0.0, 1.0) } else { 0.0 };
        let rotation = if rotation.is_finite() { rotation } else { 0.0 };
        Self {
            center: [x, y],
            rot_opacity: [rotation, opacity],
        }
    }

    const fn hidden() -> Self {
        Self {
            center: [0.0, 0.0],
            rot_opacity: [0.0, 0.0],
        }
    }

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlyphInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
