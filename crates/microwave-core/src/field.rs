//! The synthetic standing-wave field and the grid it is sampled on.
//!
//! The field is a closed-form illustration of the pattern inside an oven cavity,
//! ```text
//! E(x, y, t) = sin(2πx/λ - t) cos(2πy/λ),
//! ```
//! where `λ = c / f` is the wavelength for wave speed `c` and frequency `f`.
//! It is not a solution of Maxwell's equations,
//! just something that looks the part when animated.

use std::f64::consts::TAU;

use itertools::iproduct;

use crate::Vec2;

/// Error in the parameters of a grid, field or animation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    /// A surface needs at least two samples per axis.
    #[error("Grid resolution must be at least 2, got {0}")]
    GridResolution(usize),
    /// The grid must cover a nonempty area.
    #[error("Spatial extent must be positive and finite, got {0}")]
    SpatialExtent(f64),
    /// The wave frequency must be a positive number.
    #[error("Wave frequency must be positive and finite, got {0}")]
    Frequency(f64),
    /// The wave speed must be a positive number.
    #[error("Wave speed must be positive and finite, got {0}")]
    WaveSpeed(f64),
    /// The number of frames per unit of time must be a positive number.
    #[error("Frames per time unit must be positive and finite, got {0}")]
    FramesPerTimeUnit(f64),
    /// An animation needs at least one frame.
    #[error("Animation must have at least one frame")]
    FrameCount,
    /// An animation driver can't fire continuously.
    #[error("Animation frame interval must be nonzero")]
    FrameInterval,
}

fn positive_finite(val: f64) -> bool {
    val.is_finite() && val > 0.
}

/// Physical constants and time scaling of the field function.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldParams {
    /// Frequency of the wave in hertz. Default: 2.45 GHz, the usual oven band.
    pub frequency: f64,
    /// Propagation speed of the wave in m/s. Default: 3e8, the speed of light.
    pub wave_speed: f64,
    /// How many animation frames make up one unit of the phase time `t`.
    /// Default: 10, i.e. frame `n` is evaluated at `t = n / 10`.
    pub frames_per_time_unit: f64,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            frequency: 2.45e9,
            wave_speed: 3e8,
            frames_per_time_unit: 10.,
        }
    }
}

impl FieldParams {
    /// Check that all parameters are usable.
    pub fn validate(&self) -> Result<(), ParamError> {
        if !positive_finite(self.frequency) {
            return Err(ParamError::Frequency(self.frequency));
        }
        if !positive_finite(self.wave_speed) {
            return Err(ParamError::WaveSpeed(self.wave_speed));
        }
        if !positive_finite(self.frames_per_time_unit) {
            return Err(ParamError::FramesPerTimeUnit(self.frames_per_time_unit));
        }
        Ok(())
    }

    /// Wavelength `λ = c / f` in meters.
    #[inline]
    pub fn wavelength(&self) -> f64 {
        self.wave_speed / self.frequency
    }

    /// Phase time for the given frame index.
    ///
    /// This depends only on the index, never on wall-clock time,
    /// so a late or dropped frame doesn't change what the next one looks like.
    #[inline]
    pub fn time_of_frame(&self, frame_index: usize) -> f64 {
        frame_index as f64 / self.frames_per_time_unit
    }

    /// Evaluate the field at a point.
    #[inline]
    pub fn value(&self, x: f64, y: f64, t: f64) -> f64 {
        field_value(x, y, self.wavelength(), t)
    }

    /// Evaluate the field over a whole grid at the given frame.
    pub fn sample(&self, grid: &Grid, frame_index: usize) -> FieldFrame {
        let wavelength = self.wavelength();
        let time = self.time_of_frame(frame_index);
        let values = grid
            .points()
            .map(|p| field_value(p.x, p.y, wavelength, time))
            .collect();
        FieldFrame {
            frame_index,
            time,
            grid: *grid,
            values,
        }
    }
}

/// The field function `sin(2πx/λ - t) cos(2πy/λ)`.
#[inline]
pub fn field_value(x: f64, y: f64, wavelength: f64, t: f64) -> f64 {
    f64::sin(TAU * x / wavelength - t) * f64::cos(TAU * y / wavelength)
}

/// A square grid of evenly spaced sample points
/// covering `[-extent, extent]` on both axes, endpoints included.
///
/// Points are ordered row by row:
/// the `y` coordinate selects the row and `x` the column,
/// so the point at column `i` and row `j` has index `j * resolution + i`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    resolution: usize,
    extent: f64,
}

impl Grid {
    /// Create a grid with `resolution` samples per axis.
    pub fn new(resolution: usize, extent: f64) -> Result<Self, ParamError> {
        if resolution < 2 {
            return Err(ParamError::GridResolution(resolution));
        }
        if !positive_finite(extent) {
            return Err(ParamError::SpatialExtent(extent));
        }
        Ok(Self { resolution, extent })
    }

    /// Number of samples per axis.
    #[inline]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Half the side length of the covered square.
    #[inline]
    pub fn extent(&self) -> f64 {
        self.extent
    }

    /// Total number of sample points.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.resolution * self.resolution
    }

    /// Coordinate of the `idx`th sample along either axis.
    pub fn coordinate(&self, idx: usize) -> f64 {
        // pin the last sample exactly to the boundary
        // instead of accumulating rounding error on the way there
        if idx + 1 == self.resolution {
            return self.extent;
        }
        let step = 2. * self.extent / (self.resolution - 1) as f64;
        -self.extent + idx as f64 * step
    }

    /// Iterate over the sample coordinates along one axis.
    pub fn coordinates(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.resolution).map(|idx| self.coordinate(idx))
    }

    /// Iterate over all sample points in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        iproduct!(0..self.resolution, 0..self.resolution)
            .map(|(row, col)| Vec2::new(self.coordinate(col), self.coordinate(row)))
    }

    /// Index of the point at column `x_idx` and row `y_idx`.
    #[inline]
    pub fn index(&self, x_idx: usize, y_idx: usize) -> usize {
        y_idx * self.resolution + x_idx
    }

    /// Split every grid cell into two counterclockwise triangles
    /// and iterate over their point indices.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let cells = self.resolution - 1;
        iproduct!(0..cells, 0..cells).flat_map(move |(row, col)| {
            let bottom_left = self.index(col, row);
            let bottom_right = self.index(col + 1, row);
            let top_left = self.index(col, row + 1);
            let top_right = self.index(col + 1, row + 1);
            [
                [bottom_left, bottom_right, top_right],
                [bottom_left, top_right, top_left],
            ]
        })
    }
}

/// The field sampled over a grid at one animation frame.
///
/// Frames are computed from scratch every time and never updated in place.
#[derive(Clone, Debug)]
pub struct FieldFrame {
    /// Index of the animation frame this was computed for.
    pub frame_index: usize,
    /// Phase time `t` the field was evaluated at.
    pub time: f64,
    /// The grid the values are sampled on.
    pub grid: Grid,
    /// Field values in the grid's point order.
    pub values: Vec<f64>,
}

impl FieldFrame {
    /// Field value at column `x_idx` and row `y_idx`.
    #[inline]
    pub fn value_at(&self, x_idx: usize, y_idx: usize) -> f64 {
        self.values[self.grid.index(x_idx, y_idx)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn default_grid() -> Grid {
        Grid::new(100, 1.0).unwrap()
    }

    #[test]
    fn wavelength_is_in_the_microwave_band() {
        let params = FieldParams::default();
        assert_relative_eq!(params.wavelength(), 0.12244897959183673, epsilon = 1e-12);
    }

    #[test]
    fn frame_time_is_index_over_ten() {
        let params = FieldParams::default();
        assert_eq!(params.time_of_frame(0), 0.);
        assert_eq!(params.time_of_frame(5), 0.5);
        assert_eq!(params.time_of_frame(199), 19.9);
    }

    #[test]
    fn phase_term_vanishes_at_time_zero() {
        let params = FieldParams::default();
        let lambda = params.wavelength();
        let frame = params.sample(&default_grid(), 0);
        for (p, &val) in default_grid().points().zip(&frame.values) {
            let expected = f64::sin(TAU * p.x / lambda) * f64::cos(TAU * p.y / lambda);
            assert_eq!(val, expected);
        }
    }

    #[test]
    fn amplitude_is_bounded() {
        let params = FieldParams::default();
        let grid = default_grid();
        for frame_index in (0..200).step_by(7) {
            let frame = params.sample(&grid, frame_index);
            assert_eq!(frame.values.len(), grid.point_count());
            assert!(frame.values.iter().all(|v| v.abs() <= 1.));
        }
    }

    #[test]
    fn frames_follow_meshgrid_layout() {
        let params = FieldParams::default();
        let grid = Grid::new(7, 1.0).unwrap();
        let frame = params.sample(&grid, 3);
        assert_eq!(frame.time, 0.3);
        for (row, col) in iproduct!(0..7, 0..7) {
            let expected = params.value(grid.coordinate(col), grid.coordinate(row), 0.3);
            assert_eq!(frame.value_at(col, row), expected);
        }
    }

    #[test]
    fn grid_spans_the_extent() {
        let grid = Grid::new(5, 2.0).unwrap();
        let coords: Vec<f64> = grid.coordinates().collect();
        assert_eq!(coords, vec![-2.0, -1.0, 0.0, 1.0, 2.0]);

        let grid = default_grid();
        assert_eq!(grid.coordinate(0), -1.0);
        assert_eq!(grid.coordinate(99), 1.0);
        let first_row_end = grid.points().nth(99).unwrap();
        assert_eq!((first_row_end.x, first_row_end.y), (1.0, -1.0));
    }

    #[test]
    fn grid_triangulation_covers_every_cell() {
        let grid = Grid::new(4, 1.0).unwrap();
        let tris: Vec<[usize; 3]> = grid.triangles().collect();
        assert_eq!(tris.len(), 2 * 3 * 3);
        assert!(tris.iter().flatten().all(|&i| i < grid.point_count()));
        assert_eq!(tris[0], [0, 1, 5]);
        assert_eq!(tris[1], [0, 5, 4]);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert_eq!(Grid::new(0, 1.0), Err(ParamError::GridResolution(0)));
        assert_eq!(Grid::new(1, 1.0), Err(ParamError::GridResolution(1)));
        assert_eq!(Grid::new(10, 0.0), Err(ParamError::SpatialExtent(0.0)));
        assert!(matches!(
            Grid::new(10, f64::NAN),
            Err(ParamError::SpatialExtent(_))
        ));

        let params = FieldParams {
            frequency: -1.,
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(ParamError::Frequency(-1.)));
        let params = FieldParams {
            wave_speed: 0.,
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(ParamError::WaveSpeed(0.)));
        assert_eq!(FieldParams::default().validate(), Ok(()));
    }
}
