//! The viewpoint of 3D visuals.

use nalgebra as na;

/// nalgebra's projections map depth to [-1, 1] like OpenGL,
/// wgpu wants [0, 1].
#[rustfmt::skip]
fn opengl_to_wgpu() -> na::Matrix4<f32> {
    na::Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// A camera determines where the viewer of a visualization is in 3D space.
///
/// The world's up direction is the positive Z axis,
/// as is customary for surface plots.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// Position and orientation of the viewer.
    ///
    /// The negative Z axis of this space is the view direction.
    pub pose: na::Isometry3<f32>,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Distance to the near clipping plane.
    pub near: f32,
    /// Distance to the far clipping plane.
    pub far: f32,
}

impl Default for Camera {
    /// The default view of a matplotlib 3D plot
    /// (30 degrees of elevation, -60 degrees of azimuth)
    /// looking at the origin from far enough to see a labeled 2x2x2 box.
    fn default() -> Self {
        Self::orbit(na::Point3::origin(), 5.5, -60., 30.)
    }
}

impl Camera {
    /// Create a camera looking at `target` from `distance` away,
    /// with the direction given in degrees as azimuth around the Z axis
    /// (measured from the positive X axis)
    /// and elevation above the XY plane.
    pub fn orbit(
        target: na::Point3<f32>,
        distance: f32,
        azimuth_deg: f32,
        elevation_deg: f32,
    ) -> Self {
        let (azim, elev) = (azimuth_deg.to_radians(), elevation_deg.to_radians());
        let dir = na::Vector3::new(
            elev.cos() * azim.cos(),
            elev.cos() * azim.sin(),
            elev.sin(),
        );
        let eye = target + distance * dir;
        let view = na::Isometry3::look_at_rh(&eye, &target, &na::Vector3::z());
        Self {
            pose: view.inverse(),
            fov_y: 35f32.to_radians(),
            near: 0.1,
            far: 100.,
        }
    }

    /// Position of the viewer in world space.
    #[inline]
    pub fn eye(&self) -> na::Point3<f32> {
        self.pose * na::Point3::origin()
    }

    pub(crate) fn view_projection_matrix(&self, viewport_size: (u32, u32)) -> na::Matrix4<f32> {
        let aspect = viewport_size.0.max(1) as f32 / viewport_size.1.max(1) as f32;
        let proj = na::Perspective3::new(aspect, self.fov_y, self.near, self.far);
        opengl_to_wgpu() * proj.to_homogeneous() * self.pose.inverse().to_homogeneous()
    }

    /// Project a world space point to normalized device coordinates.
    ///
    /// Returns `None` for points behind the camera.
    pub(crate) fn project(
        &self,
        point: na::Vector3<f32>,
        viewport_size: (u32, u32),
    ) -> Option<na::Vector3<f32>> {
        let clip = self.view_projection_matrix(viewport_size) * point.push(1.);
        (clip.w > 0.).then(|| clip.xyz() / clip.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn orbit_camera_looks_at_target() {
        let cam = Camera::default();
        let eye = cam.eye();
        assert_relative_eq!(eye.coords.norm(), 5.5, epsilon = 1e-5);
        // -60 degrees azimuth puts the viewer on the +x, -y side
        assert!(eye.x > 0. && eye.y < 0. && eye.z > 0.);

        let center = cam.project(na::Vector3::zeros(), (800, 600)).unwrap();
        assert_relative_eq!(center.x, 0., epsilon = 1e-5);
        assert_relative_eq!(center.y, 0., epsilon = 1e-5);
        assert!(center.z > 0. && center.z < 1.);
    }

    #[test]
    fn up_is_up_on_screen() {
        let cam = Camera::default();
        let top = cam.project(na::Vector3::new(0., 0., 1.), (800, 600)).unwrap();
        let bottom = cam.project(na::Vector3::new(0., 0., -1.), (800, 600)).unwrap();
        assert!(top.y > bottom.y);
    }

    #[test]
    fn points_behind_the_camera_are_not_projected() {
        let cam = Camera::default();
        let behind = cam.eye().coords * 2.;
        assert!(cam.project(behind, (800, 600)).is_none());
    }
}
