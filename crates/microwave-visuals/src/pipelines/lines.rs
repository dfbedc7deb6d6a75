use nalgebra as na;
use wgpu::util::DeviceExt;

use super::{PipelineDesc, SharedResources};
use crate::{rect::Rect, render_window::RenderContext};

/// Parameters for drawing lines with [`Painter::line_list`][crate::Painter::line_list].
#[derive(Clone, Copy, Debug)]
pub struct LineParams {
    /// Color of the lines. Default: black.
    pub color: palette::LinSrgb,
}

impl Default for LineParams {
    fn default() -> Self {
        Self {
            color: palette::LinSrgb::new(0., 0., 0.),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct LineVertex {
    position: [f32; 3],
    color: [f32; 4],
}

/// Pipeline for one pixel wide, depth-tested line segments in world space.
pub(crate) struct LinePipeline {
    pipeline: wgpu::RenderPipeline,
}

impl LinePipeline {
    pub fn new(ctx: &RenderContext, res: &SharedResources) -> Self {
        let pipeline = PipelineDesc {
            label: "lines",
            shader: wgpu::include_wgsl!("../shaders/lines.wgsl"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4],
            }],
            topology: wgpu::PrimitiveTopology::LineList,
            depth_tested: true,
        }
        .build(ctx, res);

        Self { pipeline }
    }

    pub fn draw(
        &self,
        res: &SharedResources,
        ctx: &mut RenderContext,
        area: Rect,
        params: LineParams,
        points: &[na::Vector3<f64>],
    ) {
        // an odd point out has nothing to connect to
        let segment_points = points.len() - points.len() % 2;
        if segment_points == 0 {
            return;
        }

        let color = [params.color.red, params.color.green, params.color.blue, 1.];
        let vertices: Vec<LineVertex> = points[..segment_points]
            .iter()
            .map(|p| LineVertex {
                position: [p.x as f32, p.y as f32, p.z as f32],
                color,
            })
            .collect();

        let vertex_buf = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("line vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let mut pass = ctx.depth_pass("lines");
        pass.set_viewport(area.x, area.y, area.width, area.height, 0., 1.);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &res.bind_group, &[]);
        pass.set_vertex_buffer(0, vertex_buf.slice(..));
        pass.draw(0..vertices.len() as u32, 0..1);
    }
}
