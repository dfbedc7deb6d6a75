mod resources;
use resources::SharedResources;

pub(crate) mod axes;
use axes::AxesParams;

pub(crate) mod lines;
use lines::{LineParams, LinePipeline};

mod panels;
use panels::PanelPipeline;

mod surface;
use surface::SurfacePipeline;

pub(crate) mod text;
use text::{TextParams, TextPipeline, TextPosition};

//

use nalgebra as na;
use std::{cell::OnceCell, ops::Range};

use crate::{
    camera::Camera,
    rect::Rect,
    render_window::{ActiveRenderWindow, RenderContext},
};
use microwave_core as mw;

pub(crate) struct Renderer {
    // the surface pipeline holds grid-sized buffers
    // and is rebuilt when a frame on a different grid comes along
    surface_pl: Option<SurfacePipeline>,
    line_pl: OnceCell<LinePipeline>,
    panel_pl: OnceCell<PanelPipeline>,
    text_pl: TextPipeline,
    resources: SharedResources,
    color_map_names: Vec<String>,
    state: RendererState,
}

/// Drawing settings that persist between frames until changed.
pub(crate) struct RendererState {
    /// Layer of the active color map in the lookup table texture.
    color_map_idx: usize,
    /// Values mapped onto the ends of the color map.
    /// Follows the data of each surface if not set.
    color_map_range: Option<Range<f32>>,
    /// Region of the window that 3D drawing goes to.
    /// The whole window if not set.
    plot_area: Option<Rect>,
}

/// What differs between the render pipelines of this crate.
/// All of them use the shared bind group as group 0 and nothing else.
struct PipelineDesc<'a> {
    label: &'a str,
    shader: wgpu::ShaderModuleDescriptor<'a>,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    depth_tested: bool,
}

impl PipelineDesc<'_> {
    fn build(self, ctx: &RenderContext, res: &SharedResources) -> wgpu::RenderPipeline {
        let shader = ctx.device.create_shader_module(self.shader);
        let layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(self.label),
                bind_group_layouts: &[&res.layout],
                push_constant_ranges: &[],
            });
        ctx.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(self.label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    buffers: self.buffers,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs_main",
                    targets: &[Some(ctx.target_format.into())],
                    compilation_options: Default::default(),
                }),
                // no culling, the surface is seen from below where it dips
                primitive: wgpu::PrimitiveState {
                    topology: self.topology,
                    ..Default::default()
                },
                depth_stencil: self
                    .depth_tested
                    .then(crate::render_window::depth_stencil_state),
                multisample: ctx.multisample_state,
                multiview: None,
                cache: None,
            })
    }
}

impl Renderer {
    pub fn new(window: &ActiveRenderWindow, params: &crate::AnimationParams) -> Self {
        Self {
            surface_pl: None,
            line_pl: OnceCell::new(),
            panel_pl: OnceCell::new(),
            text_pl: TextPipeline::new(window),
            resources: SharedResources::new(window, &params.color_maps),
            color_map_names: params.color_maps.iter().map(|m| m.name.clone()).collect(),
            state: RendererState {
                color_map_idx: 0,
                color_map_range: None,
                plot_area: None,
            },
        }
    }

    /// Activate the next color map in order.
    pub fn cycle_color_maps(&mut self) {
        let count = self.color_map_names.len().max(1);
        self.state.color_map_idx = (self.state.color_map_idx + 1) % count;
        if let Some(name) = self.color_map_names.get(self.state.color_map_idx) {
            log::info!("Color map: {name}");
        }
    }

    /// Upload per-frame data before any drawing happens.
    pub fn begin_frame(&mut self, ctx: &mut RenderContext, camera: &Camera) {
        let plot_area = self.state.plot_area(ctx.viewport_size);
        self.resources
            .upload_camera(ctx, camera, plot_area.pixel_size());
    }

    /// Draw the text queued up during the frame on top of everything else.
    pub fn draw_batched(&mut self, ctx: &mut RenderContext) {
        self.text_pl.draw(ctx);
    }

    pub fn end_frame(&mut self) {
        self.text_pl.trim();
    }
}

impl RendererState {
    /// The plot area clamped to the window.
    fn plot_area(&self, viewport_size: (u32, u32)) -> Rect {
        let (w, h) = (viewport_size.0 as f32, viewport_size.1 as f32);
        let Some(area) = self.plot_area else {
            return Rect::new(0., 0., w, h);
        };
        let x = area.x.clamp(0., w - 1.);
        let y = area.y.clamp(0., h - 1.);
        Rect::new(
            x,
            y,
            area.width.clamp(1., w - x),
            area.height.clamp(1., h - y),
        )
    }
}

/// The main user interface for drawing graphics.
///
/// Given to [`Animation::draw`][super::animation::Animation] once per frame;
/// see the `microwave` binary for usage.
pub struct Painter<'a, 'ctx: 'a> {
    pub(crate) ctx: &'a mut RenderContext<'ctx>,
    pub(crate) rend: &'a mut Renderer,
    pub(crate) camera: &'a Camera,
}

impl<'a, 'ctx: 'a> Painter<'a, 'ctx> {
    /// Fix the values mapped onto the ends of the color map.
    /// Values outside the range get the end colors.
    ///
    /// Until this is called, each surface is colored
    /// from its own minimum to its own maximum.
    pub fn set_color_map_range(&mut self, range: Range<f32>) {
        self.rend.state.color_map_range = Some(range);
    }

    /// Confine 3D drawing (surfaces, lines, world-space text)
    /// to a region of the window.
    ///
    /// The region is kept until changed, also for the following frames.
    pub fn set_plot_area(&mut self, area: Rect) {
        if self.rend.state.plot_area == Some(area) {
            return;
        }
        self.rend.state.plot_area = Some(area);
        let area = self.plot_area();
        self.rend
            .resources
            .upload_camera(self.ctx, self.camera, area.pixel_size());
    }

    /// The region of the window 3D drawing goes to.
    #[inline]
    pub fn plot_area(&self) -> Rect {
        self.rend.state.plot_area(self.ctx.viewport_size)
    }

    /// Draw a field frame as a surface whose height and color both show the field value.
    pub fn field_surface(&mut self, frame: &mw::FieldFrame) {
        let area = self.plot_area();
        let rend = &mut *self.rend;
        if rend
            .surface_pl
            .as_ref()
            .map_or(true, |pl| pl.grid != frame.grid)
        {
            rend.surface_pl = Some(SurfacePipeline::new(self.ctx, &frame.grid, &rend.resources));
        }
        let Some(pl) = &rend.surface_pl else {
            return;
        };

        let Some(values) = pl.upload_values(self.ctx, &frame.values) else {
            return;
        };
        let range = match &rend.state.color_map_range {
            Some(range) => range.clone(),
            None => resources::value_range(&values),
        };
        rend.resources
            .upload_color_map(self.ctx, rend.state.color_map_idx, range);

        pl.draw(&rend.resources, self.ctx, area);
    }

    /// Draw a list of line segments in world space.
    ///
    /// Every two points in `points` define a distinct segment,
    /// with a gap left between them.
    pub fn line_list(&mut self, params: LineParams, points: &[na::Vector3<f64>]) {
        let area = self.plot_area();
        let line_pl = self
            .rend
            .line_pl
            .get_or_init(|| LinePipeline::new(self.ctx, &self.rend.resources));
        line_pl.draw(&self.rend.resources, self.ctx, area, params, points);
    }

    /// Draw a bounding box with ticks and labels around a surface plot.
    pub fn axes_3d(&mut self, params: AxesParams) {
        axes::axes_3d(self, params);
    }

    /// Fill a rectangle of the window with a solid color.
    pub fn panel(&mut self, rect: Rect, color: palette::LinSrgb) {
        let panel_pl = self
            .rend
            .panel_pl
            .get_or_init(|| PanelPipeline::new(self.ctx, &self.rend.resources));
        panel_pl.draw(&self.rend.resources, self.ctx, rect, color);
    }

    /// Draw text.
    ///
    /// Text is queued up and drawn on top of everything else at the end of the frame.
    /// Text anchored to a point behind the camera isn't drawn.
    pub fn text(&mut self, params: TextParams) {
        let anchor = match params.position {
            TextPosition::Screen(x, y) => na::Vector2::new(x, y),
            TextPosition::World(pos) => match self.project_to_window(pos) {
                Some(pixel) => pixel,
                None => return,
            },
        };
        self.rend.text_pl.queue(params, anchor);
    }

    /// Project a world space point to window pixel coordinates
    /// inside the plot area.
    fn project_to_window(&self, pos: na::Vector3<f64>) -> Option<na::Vector2<f32>> {
        let area = self.plot_area();
        let ndc = self.camera.project(pos.cast::<f32>(), area.pixel_size())?;
        Some(na::Vector2::new(
            area.x + (ndc.x + 1.) / 2. * area.width,
            area.y + (1. - ndc.y) / 2. * area.height,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(plot_area: Option<Rect>) -> RendererState {
        RendererState {
            color_map_idx: 0,
            color_map_range: None,
            plot_area,
        }
    }

    #[test]
    fn plot_area_defaults_to_the_window() {
        assert_eq!(
            state(None).plot_area((800, 600)),
            Rect::new(0., 0., 800., 600.)
        );
    }

    #[test]
    fn plot_area_is_clamped_to_the_window() {
        let area = state(Some(Rect::new(100., 500., 900., 300.))).plot_area((800, 600));
        assert_eq!(area, Rect::new(100., 500., 700., 100.));
    }
}
