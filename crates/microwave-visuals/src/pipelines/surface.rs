use wgpu::util::DeviceExt;

use super::{PipelineDesc, SharedResources};
use crate::{rect::Rect, render_window::RenderContext};
use microwave_core as mw;

/// Draws a field frame as a height map colored with the active color map.
///
/// Grid positions and triangles are uploaded once.
/// Each frame only rewrites the value buffer,
/// which the shader reads as both height and color.
pub(crate) struct SurfacePipeline {
    /// The grid the buffers were built for.
    pub grid: mw::Grid,
    pipeline: wgpu::RenderPipeline,
    positions: wgpu::Buffer,
    values: wgpu::Buffer,
    triangles: TriangleBuffer,
}

/// Triangle indices, in the narrowest format that fits the grid.
struct TriangleBuffer {
    buf: wgpu::Buffer,
    len: u32,
    format: wgpu::IndexFormat,
}

impl TriangleBuffer {
    fn new(device: &wgpu::Device, grid: &mw::Grid) -> Self {
        let indices = grid.triangles().flatten();
        let (contents, len, format): (Vec<u8>, _, _) = if grid.point_count() <= u16::MAX as usize {
            let narrow: Vec<u16> = indices.map(|i| i as u16).collect();
            let bytes = bytemuck::cast_slice(&narrow).to_vec();
            (bytes, narrow.len(), wgpu::IndexFormat::Uint16)
        } else {
            let wide: Vec<u32> = indices.map(|i| i as u32).collect();
            let bytes = bytemuck::cast_slice(&wide).to_vec();
            (bytes, wide.len(), wgpu::IndexFormat::Uint32)
        };

        let buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("surface triangles"),
            contents: &contents,
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            buf,
            len: len as u32,
            format,
        }
    }
}

impl SurfacePipeline {
    pub fn new(ctx: &RenderContext, grid: &mw::Grid, res: &SharedResources) -> Self {
        let pipeline = PipelineDesc {
            label: "field surface",
            shader: wgpu::include_wgsl!("../shaders/surface.wgsl"),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<f32>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![1 => Float32],
                },
            ],
            topology: wgpu::PrimitiveTopology::TriangleList,
            depth_tested: true,
        }
        .build(ctx, res);

        let xy: Vec<[f32; 2]> = grid.points().map(|p| [p.x as f32, p.y as f32]).collect();
        let positions = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("surface positions"),
                contents: bytemuck::cast_slice(&xy),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let values = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("surface values"),
            size: (grid.point_count() * std::mem::size_of::<f32>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let triangles = TriangleBuffer::new(ctx.device, grid);
        log::debug!(
            "Built surface for a {0}x{0} grid, {1} triangles",
            grid.resolution(),
            triangles.len / 3
        );

        Self {
            grid: *grid,
            pipeline,
            positions,
            values,
            triangles,
        }
    }

    /// Write a frame's values into the value buffer
    /// and return them as the shader sees them.
    ///
    /// Values that don't match the grid are skipped with a warning.
    pub fn upload_values(&self, ctx: &mut RenderContext, values: &[f64]) -> Option<Vec<f32>> {
        if values.len() != self.grid.point_count() {
            log::warn!(
                "Skipping surface with {} values on a grid of {} points",
                values.len(),
                self.grid.point_count()
            );
            return None;
        }
        let values: Vec<f32> = values.iter().map(|&v| v as f32).collect();
        ctx.queue
            .write_buffer(&self.values, 0, bytemuck::cast_slice(&values));
        Some(values)
    }

    pub fn draw(&self, res: &SharedResources, ctx: &mut RenderContext, area: Rect) {
        let mut pass = ctx.depth_pass("field surface");
        pass.set_viewport(area.x, area.y, area.width, area.height, 0., 1.);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &res.bind_group, &[]);
        pass.set_vertex_buffer(0, self.positions.slice(..));
        pass.set_vertex_buffer(1, self.values.slice(..));
        pass.set_index_buffer(self.triangles.buf.slice(..), self.triangles.format);
        pass.draw_indexed(0..self.triangles.len, 0, 0..1);
    }
}
