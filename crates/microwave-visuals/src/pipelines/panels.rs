use wgpu::util::DeviceExt;

use super::{PipelineDesc, SharedResources};
use crate::{rect::Rect, render_window::RenderContext};

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct PanelInstance {
    // x, y, width, height in window pixels
    rect: [f32; 4],
    color: [f32; 4],
}

/// Pipeline for flat rectangles in window space,
/// the backgrounds of user interface elements.
pub(crate) struct PanelPipeline {
    pipeline: wgpu::RenderPipeline,
}

impl PanelPipeline {
    pub fn new(ctx: &RenderContext, res: &SharedResources) -> Self {
        let pipeline = PipelineDesc {
            label: "panels",
            shader: wgpu::include_wgsl!("../shaders/panels.wgsl"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<PanelInstance>() as u64,
                // quad corners come from the vertex index
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4],
            }],
            topology: wgpu::PrimitiveTopology::TriangleList,
            depth_tested: false,
        }
        .build(ctx, res);

        Self { pipeline }
    }

    pub fn draw(
        &self,
        res: &SharedResources,
        ctx: &mut RenderContext,
        rect: Rect,
        color: palette::LinSrgb,
    ) {
        if rect.width <= 0. || rect.height <= 0. {
            return;
        }
        let instance = PanelInstance {
            rect: [rect.x, rect.y, rect.width, rect.height],
            color: [color.red, color.green, color.blue, 1.],
        };

        let instance_buf = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("panel"),
                contents: bytemuck::bytes_of(&instance),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let mut pass = ctx.pass("panels");
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &res.bind_group, &[]);
        pass.set_vertex_buffer(0, instance_buf.slice(..));
        pass.draw(0..6, 0..1);
    }
}
