/// An axis-aligned rectangle in window pixel coordinates,
/// with the origin at the top left corner and `y` growing downwards.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle from its top left corner and size.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center point as `(x, y)`.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2., self.y + self.height / 2.)
    }

    /// Size rounded down to whole pixels, as expected by viewport-sized GPU state.
    #[inline]
    pub(crate) fn pixel_size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    /// Whether the point is inside the rectangle.
    /// Left and top edges are inclusive, right and bottom exclusive.
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shrink the rectangle by `margin` on every side.
    /// The size never goes below zero.
    pub fn inset(&self, margin: f32) -> Self {
        Self {
            x: self.x + margin,
            y: self.y + margin,
            width: (self.width - 2. * margin).max(0.),
            height: (self.height - 2. * margin).max(0.),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_and_inset() {
        let r = Rect::new(10., 20., 100., 50.);
        assert!(r.contains(10., 20.));
        assert!(r.contains(109.9, 69.9));
        assert!(!r.contains(110., 30.));
        assert!(!r.contains(50., 70.));
        assert_eq!(r.center(), (60., 45.));

        let inner = r.inset(5.);
        assert_eq!(inner, Rect::new(15., 25., 90., 40.));
        assert_eq!(r.inset(100.).width, 0.);
        assert_eq!(Rect::new(0., 0., 99.7, 40.2).pixel_size(), (99, 40));
    }
}
