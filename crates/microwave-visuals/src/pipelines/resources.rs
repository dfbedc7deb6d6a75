//! The bind group every pipeline shares:
//! camera matrices, color map parameters and the color map lookup tables.

use std::ops::Range;

use nalgebra as na;
use wgpu::util::DeviceExt;

use crate::{
    camera::Camera,
    color_map::{self, ColorMap},
    render_window::{ActiveRenderWindow, RenderContext},
};

#[derive(Clone, Copy, Debug, encase::ShaderType)]
struct CameraUniforms {
    // projection into the plot area
    view_proj: na::Matrix4<f32>,
    // whole window, for pixel-space geometry
    resolution: na::Vector2<f32>,
}

#[derive(Clone, Copy, Debug, encase::ShaderType)]
struct ColorMapUniforms {
    layer: u32,
    range_start: f32,
    range_length: f32,
}

/// Group 0 of every pipeline. Bindings:
/// 0. [`CameraUniforms`]
/// 1. [`ColorMapUniforms`]
/// 2. color map lookup tables, one layer per map
/// 3. linear sampler for the lookup tables
pub(crate) struct SharedResources {
    camera_buf: wgpu::Buffer,
    color_map_buf: wgpu::Buffer,
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl SharedResources {
    pub fn new(window: &ActiveRenderWindow, color_maps: &[ColorMap]) -> Self {
        let device = &window.device;

        let uniform_buf = |label: &str, size: wgpu::BufferSize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: size.get(),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let camera_size = <CameraUniforms as encase::ShaderType>::min_size();
        let color_map_size = <ColorMapUniforms as encase::ShaderType>::min_size();
        let camera_buf = uniform_buf("camera", camera_size);
        let color_map_buf = uniform_buf("color map parameters", color_map_size);

        let lut_bytes: Vec<u8> = color_maps
            .iter()
            .flat_map(|map| bytemuck::cast_slice::<_, u8>(&map.lut).iter().copied())
            .collect();
        let lut_texture = device.create_texture_with_data(
            &window.queue,
            &wgpu::TextureDescriptor {
                label: Some("color map lookup tables"),
                size: wgpu::Extent3d {
                    width: color_map::LUT_SIZE as u32,
                    height: 1,
                    depth_or_array_layers: color_maps.len() as u32,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: color_map::TEX_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &lut_bytes,
        );
        let lut_view = lut_texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });
        let lut_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("color map lookup tables"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniform_entry = |binding, visibility, size| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: Some(size),
            },
            count: None,
        };
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shared"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX, camera_size),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT, color_map_size),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        // the bind group keeps the texture, view and sampler alive
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shared"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: color_map_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&lut_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&lut_sampler),
                },
            ],
        });

        Self {
            camera_buf,
            color_map_buf,
            layout,
            bind_group,
        }
    }

    /// Upload the camera for a plot area of the given size.
    ///
    /// Writes take effect when the frame is submitted,
    /// so the last call in a frame applies to every pass in it.
    pub fn upload_camera(&self, ctx: &mut RenderContext, camera: &Camera, plot_size: (u32, u32)) {
        let (width, height) = ctx.viewport_size;
        let uniforms = CameraUniforms {
            view_proj: camera.view_projection_matrix(plot_size),
            resolution: na::Vector2::new(width as f32, height as f32),
        };
        let mut bytes = encase::UniformBuffer::new(Vec::new());
        bytes.write(&uniforms).unwrap();
        ctx.queue
            .write_buffer(&self.camera_buf, 0, &bytes.into_inner());
    }

    /// Select the lookup table layer and the value range stretched over it.
    ///
    /// Like the camera, this holds for the whole frame,
    /// which is fine as long as one color-mapped surface is drawn per frame.
    pub fn upload_color_map(&self, ctx: &mut RenderContext, layer: usize, range: Range<f32>) {
        let uniforms = ColorMapUniforms {
            layer: layer as u32,
            range_start: range.start,
            range_length: range.end - range.start,
        };
        let mut bytes = encase::UniformBuffer::new(Vec::new());
        bytes.write(&uniforms).unwrap();
        ctx.queue
            .write_buffer(&self.color_map_buf, 0, &bytes.into_inner());
    }
}

/// Range of `values` to stretch over a color map.
///
/// Constant data gets a unit margin on both sides
/// so the range never has zero length.
pub(crate) fn value_range(values: &[f32]) -> Range<f32> {
    use itertools::{Itertools, MinMaxResult};
    match values.iter().copied().minmax() {
        MinMaxResult::NoElements => -1.0..1.0,
        MinMaxResult::OneElement(v) => v - 1.0..v + 1.0,
        MinMaxResult::MinMax(lo, hi) if lo == hi => lo - 1.0..hi + 1.0,
        MinMaxResult::MinMax(lo, hi) => lo..hi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_range_spans_the_data() {
        assert_eq!(value_range(&[0.5, -0.25, 0.75, 0.]), -0.25..0.75);
    }

    #[test]
    fn flat_data_still_gets_a_range() {
        assert_eq!(value_range(&[]), -1.0..1.0);
        assert_eq!(value_range(&[2.]), 1.0..3.0);
        assert_eq!(value_range(&[0., 0., 0.]), -1.0..1.0);
    }
}
