use std::sync::Arc;

use anyhow::Context;
use bytemuck::Pod;
use log::info;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::relativity::{CameraBlock, DiskBlock, ObjectsBlock};
use crate::rendering::frame::{FrameData, Globals, LensingFrame};
use crate::rendering::render_config::RenderConfig;

const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.03,
    a: 1.0,
};

/// Vertex or instance buffer that grows to fit whatever is uploaded.
struct DynamicBuffer {
    label: &'static str,
    usage: wgpu::BufferUsages,
    buffer: wgpu::Buffer,
    capacity: u64,
    len: u32,
}

impl DynamicBuffer {
    fn new(device: &wgpu::Device, label: &'static str, usage: wgpu::BufferUsages) -> Self {
        let capacity = 4096;
        Self {
            label,
            usage,
            buffer: Self::allocate(device, label, usage, capacity),
            capacity,
            len: 0,
        }
    }

    fn allocate(device: &wgpu::Device, label: &str, usage: wgpu::BufferUsages, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn upload<T: Pod>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let size = bytes.len() as u64;
        if size > self.capacity {
            self.capacity = size.next_power_of_two();
            self.buffer = Self::allocate(device, self.label, self.usage, self.capacity);
        }
        if size > 0 {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
        self.len = data.len() as u32;
    }
}

/// Offscreen target for the black-hole pass, sized by the lensing extent.
struct LensingTarget {
    extent: (u32, u32),
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

struct LensingResources {
    objects: wgpu::Buffer,
    camera: wgpu::Buffer,
    disk: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    target: Option<LensingTarget>,
}

// Main renderer struct
pub struct Renderer {
    window: Arc<Window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    size: winit::dpi::PhysicalSize<u32>,
    surface: wgpu::Surface<'static>,
    render_config: RenderConfig,

    globals: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    lines: DynamicBuffer,
    mesh_vertices: DynamicBuffer,
    mesh_indices: DynamicBuffer,
    mesh_instances: DynamicBuffer,
    lensing: LensingResources,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create a surface for the window")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;
        info!("Using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to open the GPU device")?;

        let size = window.inner_size();
        let cap = surface.get_capabilities(&adapter);
        let surface_format = *cap.formats.first().context("surface reports no formats")?;

        let render_config = RenderConfig::new(&device, surface_format);

        let globals = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytemuck::bytes_of(&<Globals as bytemuck::Zeroable>::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let globals_bind_group = render_config.create_globals_bind_group(&device, &globals);

        let lensing = Self::create_lensing_resources(&device, &render_config);

        let renderer = Self {
            lines: DynamicBuffer::new(&device, "Line Vertex Buffer", wgpu::BufferUsages::VERTEX),
            mesh_vertices: DynamicBuffer::new(&device, "Mesh Vertex Buffer", wgpu::BufferUsages::VERTEX),
            mesh_indices: DynamicBuffer::new(&device, "Mesh Index Buffer", wgpu::BufferUsages::INDEX),
            mesh_instances: DynamicBuffer::new(&device, "Mesh Instance Buffer", wgpu::BufferUsages::VERTEX),
            window,
            device,
            queue,
            size,
            surface,
            render_config,
            globals,
            globals_bind_group,
            lensing,
        };

        // Configure surface for the first time
        renderer.configure_surface();

        Ok(renderer)
    }

    fn create_lensing_resources(device: &wgpu::Device, render_config: &RenderConfig) -> LensingResources {
        let uniform = |label: &str, contents: &[u8]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        };
        let objects = uniform("Objects Block Buffer", bytemuck::bytes_of(&ObjectsBlock::default()));
        let camera = uniform(
            "Camera Block Buffer",
            bytemuck::bytes_of(&<CameraBlock as bytemuck::Zeroable>::zeroed()),
        );
        let disk = uniform(
            "Disk Block Buffer",
            bytemuck::bytes_of(&<DiskBlock as bytemuck::Zeroable>::zeroed()),
        );
        let bind_group = render_config.create_lensing_bind_group(device, &objects, &camera, &disk);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Lensing Target Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        LensingResources {
            objects,
            camera,
            disk,
            bind_group,
            sampler,
            target: None,
        }
    }

    pub fn get_window(&self) -> &Window {
        &self.window
    }

    /// Width over height of the surface.
    pub fn aspect(&self) -> f32 {
        self.size.width.max(1) as f32 / self.size.height.max(1) as f32
    }

    pub fn configure_surface(&self) {
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: self.render_config.surface_format,
            // Request compatibility with the sRGB-format texture view we're going to create later.
            view_formats: vec![self.render_config.surface_format.add_srgb_suffix()],
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            width: self.size.width.max(1),
            height: self.size.height.max(1),
            desired_maximum_frame_latency: 2,
            present_mode: wgpu::PresentMode::AutoVsync,
        };
        self.surface.configure(&self.device, &surface_config);
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.configure_surface();
        }
    }

    fn ensure_lensing_target(&mut self, extent: (u32, u32)) {
        if self.lensing.target.as_ref().is_some_and(|t| t.extent == extent) {
            return;
        }
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Lensing Target"),
            size: wgpu::Extent3d {
                width: extent.0,
                height: extent.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.render_config.surface_format.add_srgb_suffix(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self
            .render_config
            .create_blit_bind_group(&self.device, &view, &self.lensing.sampler);
        log::debug!("lensing target resized to {}x{}", extent.0, extent.1);
        self.lensing.target = Some(LensingTarget {
            extent,
            view,
            bind_group,
        });
    }

    fn upload_lensing(&mut self, lensing: &LensingFrame) {
        self.ensure_lensing_target(lensing.extent);
        self.queue
            .write_buffer(&self.lensing.objects, 0, bytemuck::bytes_of(&lensing.objects));
        self.queue
            .write_buffer(&self.lensing.camera, 0, bytemuck::bytes_of(&lensing.camera));
        self.queue
            .write_buffer(&self.lensing.disk, 0, bytemuck::bytes_of(&lensing.disk));
    }

    /// Draw one frame. Lost or outdated surfaces are reconfigured and the
    /// frame is skipped; other surface errors are returned.
    pub fn render(&mut self, frame: &FrameData) -> Result<(), wgpu::SurfaceError> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.configure_surface();
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        let texture_view = surface_texture.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.render_config.surface_format.add_srgb_suffix()),
            ..Default::default()
        });

        self.queue
            .write_buffer(&self.globals, 0, bytemuck::bytes_of(&frame.globals));
        self.lines.upload(&self.device, &self.queue, &frame.lines);
        self.mesh_vertices
            .upload(&self.device, &self.queue, &frame.meshes.vertices);
        self.mesh_indices
            .upload(&self.device, &self.queue, &frame.meshes.indices);
        self.mesh_instances
            .upload(&self.device, &self.queue, &frame.meshes.instances);
        if let Some(lensing) = &frame.lensing {
            self.upload_lensing(lensing);
        }

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Gravity Command Encoder"),
        });

        // Massive objects into the reduced-resolution target
        let lensing_target = frame.lensing.as_ref().and(self.lensing.target.as_ref());
        if let (Some(lensing), Some(target)) = (&frame.lensing, lensing_target) {
            let mut render_pass = clear_pass(&mut encoder, &target.view, "Lensing Render Pass", wgpu::Color::BLACK);
            render_pass.set_pipeline(&self.render_config.object_pipeline);
            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            render_pass.set_bind_group(1, &self.lensing.bind_group, &[]);
            render_pass.draw(0..6, 0..lensing.objects.len() as u32);
        }

        {
            let mut render_pass = clear_pass(&mut encoder, &texture_view, "Scene Render Pass", BACKGROUND);

            if let Some(target) = lensing_target {
                render_pass.set_pipeline(&self.render_config.blit_pipeline);
                render_pass.set_bind_group(0, &target.bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }

            if self.lines.len > 0 {
                render_pass.set_pipeline(&self.render_config.line_pipeline);
                render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.lines.buffer.slice(..));
                render_pass.draw(0..self.lines.len, 0..1);
            }

            if !frame.meshes.is_empty() {
                render_pass.set_pipeline(&self.render_config.mesh_pipeline);
                render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.mesh_vertices.buffer.slice(..));
                render_pass.set_vertex_buffer(1, self.mesh_instances.buffer.slice(..));
                render_pass.set_index_buffer(self.mesh_indices.buffer.slice(..), wgpu::IndexFormat::Uint32);
                for (instance, draw) in (0u32..).zip(&frame.meshes.draws) {
                    render_pass.draw_indexed(draw.indices.clone(), draw.base_vertex, instance..instance + 1);
                }
            }
        }

        self.queue.submit([encoder.finish()]);
        self.window.pre_present_notify();
        surface_texture.present();

        Ok(())
    }
}

/// Begin a pass that clears `view` to `color`.
fn clear_pass<'a>(
    encoder: &'a mut wgpu::CommandEncoder,
    view: &'a wgpu::TextureView,
    label: &'a str,
    color: wgpu::Color,
) -> wgpu::RenderPass<'a> {
    let attachment = wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations {
            load: wgpu::LoadOp::Clear(color),
            store: wgpu::StoreOp::Store,
        },
    };
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(attachment)],
        depth_stencil_attachment: None,
        occlusion_query_set: None,
        timestamp_writes: None,
    })
}
