use nalgebra as na;

use super::{
    lines::LineParams,
    text::{TextAnchor, TextColor, TextParams, TextPosition},
};

/// Parameters to configure the box, ticks and labels drawn around a surface plot.
///
/// The box spans `[-extent, extent]` along X and Y
/// and `z_range` along Z, all in world units.
#[derive(Clone, Debug)]
pub struct AxesParams<'a> {
    /// Half the side length of the box in the XY plane. Default: 1.0.
    pub extent: f64,
    /// Vertical range of the box. Default: -1.0..1.0.
    pub z_range: std::ops::Range<f64>,
    /// Number of intervals between tick marks on each axis. Default: 4.
    pub tick_intervals: usize,
    /// Length of tick marks in world space. Default: 0.06.
    pub tick_length: f64,
    /// Title drawn above the plot area. Default: "".
    pub title: &'a str,
    /// Label of the X axis. Default: "x".
    pub x_label: &'a str,
    /// Label of the Y axis. Default: "y".
    pub y_label: &'a str,
    /// Label of the Z axis. Default: "z".
    pub z_label: &'a str,
    /// Color of the box and tick lines. Default: dark gray.
    pub color: palette::LinSrgb,
    /// Color of all text. Default: black.
    pub text_color: TextColor,
    /// Font size of tick labels.
    /// Axis labels and the title are drawn somewhat larger. Default: 14.
    pub font_size: f32,
}

impl<'a> Default for AxesParams<'a> {
    fn default() -> Self {
        Self {
            extent: 1.,
            z_range: -1.0..1.0,
            tick_intervals: 4,
            tick_length: 0.06,
            title: "",
            x_label: "x",
            y_label: "y",
            z_label: "z",
            color: palette::LinSrgb::new(0.1, 0.1, 0.1),
            text_color: TextColor::rgb(0, 0, 0),
            font_size: 14.,
        }
    }
}

/// Evenly spaced tick positions covering `range` end to end.
fn tick_values(range: std::ops::Range<f64>, intervals: usize) -> Vec<f64> {
    let intervals = intervals.max(1);
    let step = (range.end - range.start) / intervals as f64;
    (0..=intervals)
        .map(|i| {
            if i == intervals {
                range.end
            } else {
                range.start + i as f64 * step
            }
        })
        .collect()
}

/// Format a tick value with just enough decimals to tell ticks `step` apart.
fn tick_label(value: f64, step: f64) -> String {
    let decimals = (0..6)
        .find(|&d| {
            let scaled = step.abs() * 10f64.powi(d);
            (scaled - scaled.round()).abs() < 1e-9
        })
        .unwrap_or(6) as usize;
    // adding zero turns a negative zero positive
    format!("{:.*}", decimals, value + 0.0)
}

pub(crate) fn axes_3d(painter: &mut super::Painter, params: AxesParams) {
    let e = params.extent;
    let (z_lo, z_hi) = (params.z_range.start, params.z_range.end);
    let tl = params.tick_length;
    let p = na::Vector3::new;

    // the default camera looks at the box from the +x, -y side,
    // so the floor and the two far walls frame the surface
    // without hiding it
    #[rustfmt::skip]
    let box_points = [
        // floor
        p(-e, -e, z_lo), p(e, -e, z_lo),
        p(e, -e, z_lo), p(e, e, z_lo),
        p(e, e, z_lo), p(-e, e, z_lo),
        p(-e, e, z_lo), p(-e, -e, z_lo),
        // vertical edges of the far walls
        p(-e, -e, z_lo), p(-e, -e, z_hi),
        p(-e, e, z_lo), p(-e, e, z_hi),
        p(e, e, z_lo), p(e, e, z_hi),
        // top edges of the far walls
        p(-e, -e, z_hi), p(-e, e, z_hi),
        p(-e, e, z_hi), p(e, e, z_hi),
    ];
    let line_params = LineParams {
        color: params.color,
    };
    painter.line_list(line_params, &box_points);

    // ticks along the front edges, pointing away from the box

    let xy_ticks = tick_values(-e..e, params.tick_intervals);
    let xy_step = 2. * e / params.tick_intervals.max(1) as f64;
    let z_ticks = tick_values(params.z_range.clone(), params.tick_intervals);
    let z_step = (z_hi - z_lo) / params.tick_intervals.max(1) as f64;

    let mut tick_points = Vec::new();
    let mut labels: Vec<(String, na::Vector3<f64>, TextAnchor)> = Vec::new();
    for &x in &xy_ticks {
        tick_points.extend([p(x, -e, z_lo), p(x, -e - tl, z_lo)]);
        labels.push((
            tick_label(x, xy_step),
            p(x, -e - 3. * tl, z_lo),
            TextAnchor::TopMid,
        ));
    }
    for &y in &xy_ticks {
        tick_points.extend([p(e, y, z_lo), p(e + tl, y, z_lo)]);
        labels.push((
            tick_label(y, xy_step),
            p(e + 3. * tl, y, z_lo),
            TextAnchor::TopLeft,
        ));
    }
    for &z in &z_ticks {
        tick_points.extend([p(-e, -e, z), p(-e - tl, -e, z)]);
        labels.push((
            tick_label(z, z_step),
            p(-e - 2. * tl, -e, z),
            TextAnchor::MidRight,
        ));
    }
    painter.line_list(line_params, &tick_points);

    for (text, pos, anchor) in &labels {
        painter.text(TextParams {
            text,
            position: TextPosition::World(*pos),
            anchor: *anchor,
            font_size: params.font_size,
            line_height: params.font_size * 1.3,
            color: params.text_color,
            ..Default::default()
        });
    }

    // axis labels, further out than the tick labels

    let label_size = params.font_size * 1.15;
    let axis_labels = [
        (params.x_label, p(0., -e - 9. * tl, z_lo), TextAnchor::TopMid),
        (params.y_label, p(e + 9. * tl, 0., z_lo), TextAnchor::TopLeft),
        (
            params.z_label,
            p(-e - 9. * tl, -e, (z_lo + z_hi) / 2.),
            TextAnchor::MidRight,
        ),
    ];
    for (text, pos, anchor) in axis_labels {
        painter.text(TextParams {
            text,
            position: TextPosition::World(pos),
            anchor,
            font_size: label_size,
            line_height: label_size * 1.3,
            color: params.text_color,
            ..Default::default()
        });
    }

    if !params.title.is_empty() {
        let area = painter.plot_area();
        let title_size = params.font_size * 1.4;
        painter.text(TextParams {
            text: params.title,
            position: TextPosition::Screen(area.center().0, area.y + 8.),
            anchor: TextAnchor::TopMid,
            font_size: title_size,
            line_height: title_size * 1.3,
            color: params.text_color,
            ..Default::default()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ticks_cover_the_range_end_to_end() {
        let ticks = tick_values(-1.0..1.0, 4);
        assert_eq!(ticks.len(), 5);
        for (tick, expected) in ticks.iter().zip([-1., -0.5, 0., 0.5, 1.]) {
            assert_relative_eq!(*tick, expected);
        }
        // zero intervals still gives the endpoints
        assert_eq!(tick_values(0.0..2.0, 0), vec![0., 2.]);
    }

    #[test]
    fn tick_labels_use_just_enough_decimals() {
        assert_eq!(tick_label(1., 1.), "1");
        assert_eq!(tick_label(-0.5, 0.5), "-0.5");
        assert_eq!(tick_label(0.25, 0.25), "0.25");
        assert_eq!(tick_label(-0.0, 0.5), "0.0");
    }
}
