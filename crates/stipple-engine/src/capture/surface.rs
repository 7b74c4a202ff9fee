use std::sync::mpsc;

use anyhow::{anyhow, Context, Result};

use crate::coords::Viewport;
use crate::luminance::RawFrame;
use crate::render::{RenderCtx, RenderTarget};

use super::readback::{padded_bytes_per_row, unpad_rows_into};

/// Color format of the capture. Unorm (not sRGB) so readback bytes are the
/// values the scene wrote.
pub const CAPTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub const CAPTURE_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// GPU objects backing one capture size.
struct Attachments {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth: wgpu::Texture,
    depth_view: wgpu::TextureView,
    staging: wgpu::Buffer,
    padded_bpr: u32,
}

impl Attachments {
    fn destroy(self) {
        self.staging.destroy();
        self.depth.destroy();
        self.color.destroy();
    }
}

/// Offscreen render target: color texture + depth texture of identical size,
/// plus the staging buffer used to read the color back.
///
/// Owns its GPU objects. They are released by [`release`](Self::release), when
/// [`configure`](Self::configure) replaces them, or on drop.
pub struct RenderSurface {
    width: u32,
    height: u32,
    /// Nearest/nearest; lives as long as the surface.
    _sampler: wgpu::Sampler,
    attachments: Option<Attachments>,
}

impl RenderSurface {
    /// Creates an unconfigured surface. Call [`configure`](Self::configure)
    /// before rendering.
    pub fn new(device: &wgpu::Device) -> Self {
        // Nearest filtering: the capture is a per-pixel lookup table.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("stipple capture sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });
        Self {
            width: 0,
            height: 0,
            _sampler: sampler,
            attachments: None,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn is_configured(&self) -> bool {
        self.attachments.is_some()
    }

    /// (Re)creates the attachments at `width` × `height` device pixels.
    ///
    /// Returns `Ok(false)` without touching the GPU when the size is unchanged;
    /// `Ok(true)` when objects were (re)created. Previous objects are released
    /// first.
    pub fn configure(&mut self, device: &wgpu::Device, width: u32, height: u32) -> Result<bool> {
        if self.is_configured() && self.width == width && self.height == height {
            return Ok(false);
        }

        anyhow::ensure!(width > 0 && height > 0, "capture size {width}x{height} is empty");
        let max = device.limits().max_texture_dimension_2d;
        anyhow::ensure!(
            width <= max && height <= max,
            "capture size {width}x{height} exceeds device limit {max}"
        );

        self.release();

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("stipple capture color"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CAPTURE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("stipple capture depth"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CAPTURE_DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let padded_bpr = padded_bytes_per_row(width);
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("stipple capture staging"),
            size: padded_bpr as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        self.attachments = Some(Attachments {
            color_view: color.create_view(&wgpu::TextureViewDescriptor::default()),
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            color,
            depth,
            staging,
            padded_bpr,
        });
        self.width = width;
        self.height = height;

        log::debug!("capture surface configured {width}x{height}");
        Ok(true)
    }

    /// Records `render` against this surface and submits it.
    ///
    /// The callback receives a [`RenderCtx`] sized to the capture and a
    /// [`RenderTarget`] carrying both color and depth views.
    pub fn render_into<F>(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scale_factor: f32,
        render: F,
    ) -> Result<()>
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        let attachments = self
            .attachments
            .as_ref()
            .ok_or_else(|| anyhow!("capture surface is not configured"))?;

        let ctx = RenderCtx::new(
            device,
            queue,
            CAPTURE_FORMAT,
            Some(CAPTURE_DEPTH_FORMAT),
            Viewport::from_device(self.width, self.height),
            scale_factor,
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("stipple capture encoder"),
        });
        {
            let mut target = RenderTarget::new(
                &mut encoder,
                &attachments.color_view,
                Some(&attachments.depth_view),
            );
            render(&ctx, &mut target);
        }
        queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    /// Copies the color attachment into `frame`, blocking until the GPU is done.
    pub fn readback(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &mut RawFrame,
    ) -> Result<()> {
        let attachments = self
            .attachments
            .as_ref()
            .ok_or_else(|| anyhow!("capture surface is not configured"))?;

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("stipple readback encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &attachments.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &attachments.staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(attachments.padded_bpr),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        let slice = attachments.staging.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = sender.send(res);
        });
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .context("device poll failed during capture readback")?;
        receiver
            .recv()
            .context("capture map callback was dropped")?
            .context("failed to map capture staging buffer")?;

        {
            let mapped = slice.get_mapped_range();
            unpad_rows_into(&mapped, self.width, self.height, attachments.padded_bpr, frame);
        }
        attachments.staging.unmap();
        Ok(())
    }

    /// Frees the textures and staging buffer. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(attachments) = self.attachments.take() {
            attachments.destroy();
            log::debug!("capture surface {}x{} released", self.width, self.height);
        }
        self.width = 0;
        self.height = 0;
    }
}

impl Drop for RenderSurface {
    fn drop(&mut self) {
        self.release();
    }
}
