use glyphon as gh;
use nalgebra as na;

use crate::render_window::{ActiveRenderWindow, RenderContext};

pub use gh::Color as TextColor;

/// Parameters for displaying text with [`Painter::text`][crate::Painter::text].
#[derive(Clone, Copy, Debug)]
pub struct TextParams<'a> {
    /// The text itself. Default: "".
    pub text: &'a str,
    /// Where the anchor point is. Default: the window's top left corner.
    pub position: TextPosition,
    /// Which point of the text sits on `position`. Default: top left.
    pub anchor: TextAnchor,
    /// Width to lay the text out in, in pixels.
    /// Default: None, as wide as the longest line.
    pub area_width: Option<f32>,
    /// Height to lay the text out in, in pixels.
    /// Default: None, as tall as all the lines.
    pub area_height: Option<f32>,
    /// Default: 20.
    pub font_size: f32,
    /// Default: 28.
    pub line_height: f32,
    /// Default: black.
    pub color: TextColor,
    /// Font family, weight and style.
    /// Default: sans-serif with cosmic-text's defaults for the rest.
    ///
    /// The types are available through the re-exported [`glyphon`].
    pub attrs: gh::Attrs<'a>,
}

impl<'a> Default for TextParams<'a> {
    fn default() -> Self {
        Self {
            text: "",
            position: TextPosition::Screen(0., 0.),
            anchor: TextAnchor::TopLeft,
            area_width: None,
            area_height: None,
            font_size: 20.,
            line_height: 28.,
            color: TextColor::rgb(0, 0, 0),
            attrs: gh::Attrs::new().family(gh::Family::SansSerif),
        }
    }
}

/// Where the anchor point of a text field is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextPosition {
    /// A point in 3D world space,
    /// projected into the plot area with the animation's camera.
    World(na::Vector3<f64>),
    /// A point in window pixels, measured from the top left corner.
    Screen(f32, f32),
}

/// The point of a text field's bounding box
/// that is placed at its [`TextPosition`].
///
/// `TopMid` for example centers the text horizontally
/// and hangs it below the position:
/// ```text
/// ----x----
/// |content|
/// ---------
/// ```
#[derive(Clone, Copy, Debug)]
#[allow(missing_docs)]
pub enum TextAnchor {
    TopLeft,
    TopMid,
    TopRight,
    MidLeft,
    Center,
    MidRight,
    BottomLeft,
    BottomMid,
    BottomRight,
}

impl TextAnchor {
    /// Fractions of the width and height from the top left corner to the anchor.
    fn fractions(self) -> (f32, f32) {
        use TextAnchor::*;
        let x = match self {
            TopLeft | MidLeft | BottomLeft => 0.,
            TopMid | Center | BottomMid => 0.5,
            TopRight | MidRight | BottomRight => 1.,
        };
        let y = match self {
            TopLeft | TopMid | TopRight => 0.,
            MidLeft | Center | MidRight => 0.5,
            BottomLeft | BottomMid | BottomRight => 1.,
        };
        (x, y)
    }

    /// Top left corner of a `size` box whose anchor sits at `anchor_pixel`.
    fn top_left(self, anchor_pixel: na::Vector2<f32>, size: na::Vector2<f32>) -> na::Vector2<f32> {
        let (fx, fy) = self.fractions();
        anchor_pixel - na::Vector2::new(fx * size.x, fy * size.y)
    }
}

/// Shaped text with its final placement in the window.
struct PlacedText {
    buffer: gh::Buffer,
    top_left: na::Vector2<f32>,
    size: na::Vector2<f32>,
    color: TextColor,
}

/// Glyphon renders every text area of a frame in one call,
/// so text is shaped and placed when requested
/// and rendered together at the end of the frame.
pub(crate) struct TextPipeline {
    fonts: gh::FontSystem,
    rasterizer: gh::SwashCache,
    viewport: gh::Viewport,
    atlas: gh::TextAtlas,
    renderer: gh::TextRenderer,
    queued: Vec<PlacedText>,
}

impl TextPipeline {
    pub fn new(window: &ActiveRenderWindow) -> Self {
        let cache = gh::Cache::new(&window.device);
        let mut atlas = gh::TextAtlas::new(
            &window.device,
            &window.queue,
            &cache,
            window.swapchain_format(),
        );
        let renderer =
            gh::TextRenderer::new(&mut atlas, &window.device, window.multisample_state(), None);

        Self {
            fonts: gh::FontSystem::new(),
            rasterizer: gh::SwashCache::new(),
            viewport: gh::Viewport::new(&window.device, &cache),
            atlas,
            renderer,
            queued: Vec::new(),
        }
    }

    /// Shape text and queue it for the end of the frame,
    /// with its anchor at the given window pixel.
    pub fn queue(&mut self, params: TextParams<'_>, anchor_pixel: na::Vector2<f32>) {
        let metrics = gh::Metrics::new(params.font_size, params.line_height);
        let mut buffer = gh::Buffer::new(&mut self.fonts, metrics);
        buffer.set_size(&mut self.fonts, params.area_width, params.area_height);
        buffer.set_text(
            &mut self.fonts,
            params.text,
            params.attrs,
            gh::Shaping::Advanced,
        );
        buffer.shape_until_scroll(&mut self.fonts, false);

        let size = na::Vector2::new(
            params.area_width.unwrap_or_else(|| text_width(&buffer)),
            params.area_height.unwrap_or_else(|| text_height(&buffer)),
        );
        self.queued.push(PlacedText {
            top_left: params.anchor.top_left(anchor_pixel, size),
            size,
            color: params.color,
            buffer,
        });
    }

    /// Render everything queued this frame.
    pub fn draw(&mut self, ctx: &mut RenderContext) {
        if self.queued.is_empty() {
            return;
        }

        let (width, height) = ctx.viewport_size;
        self.viewport
            .update(ctx.queue, gh::Resolution { width, height });

        let areas = self.queued.iter().map(|text| gh::TextArea {
            buffer: &text.buffer,
            left: text.top_left.x,
            top: text.top_left.y,
            scale: 1.,
            // a pixel of slack so antialiased edges aren't clipped
            bounds: gh::TextBounds {
                left: text.top_left.x.floor() as i32,
                top: text.top_left.y.floor() as i32,
                right: (text.top_left.x + text.size.x).ceil() as i32 + 1,
                bottom: (text.top_left.y + text.size.y).ceil() as i32 + 1,
            },
            default_color: text.color,
            custom_glyphs: &[],
        });
        let prepared = self.renderer.prepare(
            ctx.device,
            ctx.queue,
            &mut self.fonts,
            &mut self.atlas,
            &self.viewport,
            areas,
            &mut self.rasterizer,
        );

        match prepared {
            Ok(()) => {
                let mut pass = ctx.pass("text");
                if let Err(err) = self.renderer.render(&self.atlas, &self.viewport, &mut pass) {
                    log::warn!("Failed to render text: {err}");
                }
            }
            Err(err) => log::warn!("Skipping text for this frame: {err}"),
        }
        self.queued.clear();
    }

    /// Drop glyphs that weren't used this frame from the atlas.
    pub fn trim(&mut self) {
        self.atlas.trim();
    }
}

/// Width of the longest laid out line.
fn text_width(buffer: &gh::Buffer) -> f32 {
    buffer
        .layout_runs()
        .map(|run| run.line_w)
        .fold(0., f32::max)
}

/// Distance from the top of the first line to the bottom of the last.
fn text_height(buffer: &gh::Buffer) -> f32 {
    buffer
        .layout_runs()
        .last()
        .map_or(0., |run| run.line_top + run.line_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_place_the_top_left_corner() {
        let anchor = na::Vector2::new(100., 50.);
        let size = na::Vector2::new(40., 10.);
        let top_left = |a: TextAnchor| a.top_left(anchor, size);

        assert_eq!(top_left(TextAnchor::TopLeft), na::Vector2::new(100., 50.));
        assert_eq!(top_left(TextAnchor::Center), na::Vector2::new(80., 45.));
        assert_eq!(top_left(TextAnchor::BottomRight), na::Vector2::new(60., 40.));
        assert_eq!(top_left(TextAnchor::MidLeft), na::Vector2::new(100., 45.));
        assert_eq!(top_left(TextAnchor::TopMid), na::Vector2::new(80., 50.));
    }
}
