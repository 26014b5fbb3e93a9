//! wgpu raster backend
//!
//! Rasterization is split in two: [`FrameRecorder`] implements
//! [`DrawTarget`] purely on the CPU (lyon tessellation, quad assembly)
//! while the command-list mutex may still be contended elsewhere, and
//! [`RasterBackend`] turns one recorded frame into a single render pass
//! over the shared overlay texture.

use std::collections::HashMap;
use std::sync::Arc;

use cosmic_text::{FontSystem, SwashCache};
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, StrokeOptions, StrokeTessellator,
    StrokeVertex, VertexBuffers,
};
use parking_lot::Mutex;
use scrim_core::{Color, Result, ScrimError};
use scrim_draw::{Image, TextLayout};
use wgpu::util::DeviceExt;

use crate::bridge::CompositingBridge;
use crate::target::DrawTarget;

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct SolidVertex {
    position: [f32; 2],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct TexturedVertex {
    position: [f32; 2],
    uv: [f32; 2],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    surface_size: [f32; 2],
    _pad: [f32; 2],
}

enum TextureSource {
    Image(Arc<Image>),
    Text {
        layout: Arc<TextLayout>,
        width: u32,
        height: u32,
    },
}

enum Batch {
    Solid {
        index_start: u32,
        index_count: u32,
    },
    Textured {
        source: usize,
        vertex_start: u32,
    },
}

/// CPU-side recording of one repaint tick's draw calls
pub struct FrameRecorder {
    solid: VertexBuffers<SolidVertex, u32>,
    quads: Vec<TexturedVertex>,
    sources: Vec<TextureSource>,
    batches: Vec<Batch>,
    fill_tessellator: FillTessellator,
    stroke_tessellator: StrokeTessellator,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self {
            solid: VertexBuffers::new(),
            quads: Vec::new(),
            sources: Vec::new(),
            batches: Vec::new(),
            fill_tessellator: FillTessellator::new(),
            stroke_tessellator: StrokeTessellator::new(),
        }
    }

    fn extend_solid(&mut self, index_start: u32) {
        let index_count = self.solid.indices.len() as u32 - index_start;
        if index_count == 0 {
            return;
        }
        if let Some(Batch::Solid {
            index_count: count, ..
        }) = self.batches.last_mut()
        {
            *count += index_count;
            return;
        }
        self.batches.push(Batch::Solid {
            index_start,
            index_count,
        });
    }

    fn push_quad(&mut self, source: TextureSource, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let color = color.to_f32_array();
        let vertex_start = self.quads.len() as u32;

        let corner = |px: f32, py: f32, u: f32, v: f32| TexturedVertex {
            position: [px, py],
            uv: [u, v],
            color,
        };
        let (top_left, top_right) = (corner(x, y, 0.0, 0.0), corner(x + w, y, 1.0, 0.0));
        let (bottom_right, bottom_left) =
            (corner(x + w, y + h, 1.0, 1.0), corner(x, y + h, 0.0, 1.0));

        self.quads.extend_from_slice(&[
            top_left,
            top_right,
            bottom_right,
            top_left,
            bottom_right,
            bottom_left,
        ]);

        self.sources.push(source);
        self.batches.push(Batch::Textured {
            source: self.sources.len() - 1,
            vertex_start,
        });
    }
}

impl Default for FrameRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawTarget for FrameRecorder {
    fn fill_path(&mut self, path: &Path, color: Color) -> Result<()> {
        let color = color.to_f32_array();
        let index_start = self.solid.indices.len() as u32;
        self.fill_tessellator
            .tessellate_path(
                path,
                &FillOptions::default(),
                &mut BuffersBuilder::new(&mut self.solid, move |vertex: FillVertex| SolidVertex {
                    position: vertex.position().to_array(),
                    color,
                }),
            )
            .map_err(|err| ScrimError::render(format!("fill tessellation failed: {err:?}")))?;
        self.extend_solid(index_start);
        Ok(())
    }

    fn stroke_path(&mut self, path: &Path, thickness: f32, color: Color) -> Result<()> {
        let color = color.to_f32_array();
        let index_start = self.solid.indices.len() as u32;
        self.stroke_tessellator
            .tessellate_path(
                path,
                &StrokeOptions::default().with_line_width(thickness),
                &mut BuffersBuilder::new(&mut self.solid, move |vertex: StrokeVertex| {
                    SolidVertex {
                        position: vertex.position().to_array(),
                        color,
                    }
                }),
            )
            .map_err(|err| ScrimError::render(format!("stroke tessellation failed: {err:?}")))?;
        self.extend_solid(index_start);
        Ok(())
    }

    fn line(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        thickness: f32,
        color: Color,
    ) -> Result<()> {
        let mut builder = Path::builder();
        builder.begin(point(x1, y1));
        builder.line_to(point(x2, y2));
        builder.end(false);
        self.stroke_path(&builder.build(), thickness, color)
    }

    fn image(&mut self, image: &Arc<Image>, x: f32, y: f32, w: f32, h: f32) -> Result<()> {
        self.push_quad(TextureSource::Image(Arc::clone(image)), x, y, w, h, Color::WHITE);
        Ok(())
    }

    fn text(&mut self, layout: &Arc<TextLayout>, x: f32, y: f32, color: Color) -> Result<()> {
        let width = layout.width().ceil();
        let height = layout.height().ceil();
        if width < 1.0 || height < 1.0 {
            return Ok(());
        }
        self.push_quad(
            TextureSource::Text {
                layout: Arc::clone(layout),
                width: width as u32,
                height: height as u32,
            },
            x,
            y,
            width,
            height,
            color,
        );
        Ok(())
    }
}

/// GPU pipelines and texture caches for overlay rasterization.
///
/// Device-resident: a graphics device reset drops the whole backend.
pub struct RasterBackend {
    solid_pipeline: wgpu::RenderPipeline,
    textured_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    image_bind_groups: HashMap<u64, wgpu::BindGroup>,
    font_system: Arc<Mutex<FontSystem>>,
    swash_cache: SwashCache,
}

impl RasterBackend {
    pub fn new(device: &wgpu::Device, font_system: Arc<Mutex<FontSystem>>) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Overlay Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/overlay.wgsl").into()),
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Overlay Globals Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Overlay Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Globals"),
            contents: bytemuck::bytes_of(&Globals {
                surface_size: [1.0, 1.0],
                _pad: [0.0, 0.0],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Overlay Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let solid_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Overlay Solid Pipeline Layout"),
            bind_group_layouts: &[&globals_layout],
            push_constant_ranges: &[],
        });

        let textured_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Overlay Textured Pipeline Layout"),
                bind_group_layouts: &[&globals_layout, &texture_layout],
                push_constant_ranges: &[],
            });

        let color_target = [Some(wgpu::ColorTargetState {
            format: CompositingBridge::COLOR_FORMAT,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let solid_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Overlay Solid Pipeline"),
            layout: Some(&solid_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_solid",
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<SolidVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_solid",
                compilation_options: Default::default(),
                targets: &color_target,
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let textured_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Overlay Textured Pipeline"),
            layout: Some(&textured_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_textured",
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<TexturedVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_textured",
                compilation_options: Default::default(),
                targets: &color_target,
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            solid_pipeline,
            textured_pipeline,
            globals_buffer,
            globals_bind_group,
            texture_layout,
            sampler,
            image_bind_groups: HashMap::new(),
            font_system,
            swash_cache: SwashCache::new(),
        }
    }

    /// Encode one recorded frame into a render pass over the overlay view
    pub fn flush(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        surface_size: (u32, u32),
        clear_color: Color,
        recorder: FrameRecorder,
    ) -> Result<()> {
        queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&Globals {
                surface_size: [surface_size.0 as f32, surface_size.1 as f32],
                _pad: [0.0, 0.0],
            }),
        );

        // Resolve texture bind groups up front; text rasterizations are
        // per-frame, image uploads are cached by resource id.
        let mut frame_groups: Vec<Option<wgpu::BindGroup>> = Vec::new();
        for source in &recorder.sources {
            match source {
                TextureSource::Image(image) => {
                    if !self.image_bind_groups.contains_key(&image.id()) {
                        let group = self.upload_texture(
                            device,
                            queue,
                            image.width(),
                            image.height(),
                            image.data(),
                        );
                        self.image_bind_groups.insert(image.id(), group);
                    }
                    frame_groups.push(None);
                }
                TextureSource::Text {
                    layout,
                    width,
                    height,
                } => {
                    let pixels = self.rasterize_layout(layout, *width, *height);
                    frame_groups.push(Some(self.upload_texture(
                        device, queue, *width, *height, &pixels,
                    )));
                }
            }
        }

        let solid_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Solid Vertices"),
            contents: bytemuck::cast_slice(&recorder.solid.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let solid_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Solid Indices"),
            contents: bytemuck::cast_slice(&recorder.solid.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let quad_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Quad Vertices"),
            contents: bytemuck::cast_slice(&recorder.quads),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let [red, green, blue, alpha] = clear_color.to_f32_array();
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Overlay Raster Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: f64::from(red),
                        g: f64::from(green),
                        b: f64::from(blue),
                        a: f64::from(alpha),
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        for batch in &recorder.batches {
            match batch {
                Batch::Solid {
                    index_start,
                    index_count,
                } => {
                    pass.set_pipeline(&self.solid_pipeline);
                    pass.set_bind_group(0, &self.globals_bind_group, &[]);
                    pass.set_vertex_buffer(0, solid_vertices.slice(..));
                    pass.set_index_buffer(solid_indices.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(*index_start..*index_start + *index_count, 0, 0..1);
                }
                Batch::Textured {
                    source,
                    vertex_start,
                } => {
                    let group = match (&recorder.sources[*source], &frame_groups[*source]) {
                        (_, Some(group)) => group,
                        (TextureSource::Image(image), None) => {
                            match self.image_bind_groups.get(&image.id()) {
                                Some(group) => group,
                                None => continue,
                            }
                        }
                        _ => continue,
                    };
                    pass.set_pipeline(&self.textured_pipeline);
                    pass.set_bind_group(0, &self.globals_bind_group, &[]);
                    pass.set_bind_group(1, group, &[]);
                    pass.set_vertex_buffer(0, quad_vertices.slice(..));
                    pass.draw(*vertex_start..*vertex_start + 6, 0..1);
                }
            }
        }

        Ok(())
    }

    fn upload_texture(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> wgpu::BindGroup {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Overlay Quad Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Overlay Quad Bind Group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    /// Rasterize a shaped layout into white-on-transparent RGBA pixels;
    /// the quad's vertex color applies the tint.
    fn rasterize_layout(&mut self, layout: &TextLayout, width: u32, height: u32) -> Vec<u8> {
        let mut font_system = self.font_system.lock();
        let mut pixels = vec![0u8; (width * height * 4) as usize];

        for run in layout.buffer().layout_runs() {
            for glyph in run.glyphs.iter() {
                let physical = glyph.physical((0.0, run.line_y), 1.0);
                self.swash_cache.with_pixels(
                    &mut font_system,
                    physical.cache_key,
                    cosmic_text::Color::rgba(255, 255, 255, 255),
                    |px, py, color| {
                        let x = physical.x + px;
                        let y = physical.y + py;
                        if x < 0 || y < 0 {
                            return;
                        }
                        let (x, y) = (x as u32, y as u32);
                        if x >= width || y >= height {
                            return;
                        }
                        let offset = ((y * width + x) * 4) as usize;
                        pixels[offset] = color.r();
                        pixels[offset + 1] = color.g();
                        pixels[offset + 2] = color.b();
                        pixels[offset + 3] = color.a();
                    },
                );
            }
        }

        pixels
    }
}
