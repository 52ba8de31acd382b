pub mod colors;
pub mod scene;
pub mod svg;
pub mod text;

use std::sync::Arc;

use anyhow::{Context, Result};
use vello::wgpu;
use vello::{AaConfig, RenderParams, Renderer, RendererOptions, Scene};
use winit::window::Window;

/// Holds all GPU rendering state.
pub struct RenderState {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub renderer: Renderer,
    target: SceneTarget,
}

impl RenderState {
    /// Initialize the GPU rendering pipeline for `window`.
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to this window")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await?;
        let (device, queue) = (Arc::new(device), Arc::new(queue));

        let size = window.inner_size();
        let format = surface
            .get_capabilities(&adapter)
            .formats
            .first()
            .copied()
            .context("surface reported no supported formats")?;
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        // Flat fills and glyph images only; area AA is plenty.
        let renderer = Renderer::new(
            &device,
            RendererOptions {
                use_cpu: false,
                antialiasing_support: vello::AaSupport::area_only(),
                num_init_threads: None,
                pipeline_cache: None,
            },
        )?;
        let target = SceneTarget::new(&device, format, surface_config.width, surface_config.height);

        tracing::info!(
            "GPU ready: {} ({:?}), surface {}x{} {:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            surface_config.width,
            surface_config.height,
            format
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            renderer,
            target,
        })
    }

    /// Follow a window resize. The scene itself is rescaled by the caller.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
        self.target
            .resize(&self.device, self.surface_config.width, self.surface_config.height);
    }

    /// Render `scene` and present it.
    pub fn render(&mut self, scene: &Scene) -> Result<()> {
        let frame = self.surface.get_current_texture()?;

        // White outside the scaled canvas, matching the page background.
        let params = RenderParams {
            base_color: vello::peniko::Color::WHITE,
            width: self.surface_config.width,
            height: self.surface_config.height,
            antialiasing_method: AaConfig::Area,
        };
        self.renderer
            .render_to_texture(&self.device, &self.queue, scene, &self.target.view, &params)?;

        let frame_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("salesview present"),
            });
        self.target.blit(&self.device, &mut encoder, &frame_view);
        self.queue.submit(Some(encoder.finish()));

        frame.present();
        Ok(())
    }
}

/// Offscreen Rgba8 storage texture vello draws into, plus the blit that
/// copies it onto a swapchain of any format.
struct SceneTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    blitter: wgpu::util::TextureBlitter,
}

impl SceneTarget {
    fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let (texture, view) = Self::create(device, width, height);
        Self {
            texture,
            view,
            blitter: wgpu::util::TextureBlitter::new(device, surface_format),
        }
    }

    fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let size = self.texture.size();
        if size.width == width.max(1) && size.height == height.max(1) {
            return;
        }
        (self.texture, self.view) = Self::create(device, width, height);
    }

    fn blit(&self, device: &wgpu::Device, encoder: &mut wgpu::CommandEncoder, dst: &wgpu::TextureView) {
        self.blitter.copy(device, encoder, &self.view, dst);
    }

    fn create(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("salesview scene target"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }
}
