//! Texture resolution of billboard rectangles

use bbcloud_core::Rectangle;
use serde::{Deserialize, Serialize};

/// Smallest renderable resolution per axis
pub const MIN_RESOLUTION: f32 = 1.0;

/// Largest renderable resolution per axis
pub const MAX_RESOLUTION: f32 = 1e6;

/// Pixel size of a billboard texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureSize {
    pub width: u32,
    pub height: u32,
}

/// Pixels covering `axis_length` world units, at a scale where the bounding
/// sphere's diameter spans `base_size` pixels.
pub fn texture_resolution(axis_length: f32, base_size: u32, sphere_radius: f32) -> f32 {
    axis_length * base_size as f32 / (2.0 * sphere_radius)
}

fn renderable(resolution: f32) -> bool {
    resolution.is_finite() && (MIN_RESOLUTION..=MAX_RESOLUTION).contains(&resolution)
}

/// Texture size of a rectangle, `None` when either axis is unrenderable.
///
/// The width follows `axis_x`, the height follows `axis_y`.
pub fn texture_size(rect: &Rectangle, base_size: (u32, u32), sphere_radius: f32) -> Option<TextureSize> {
    let width = texture_resolution(rect.axis_x_length, base_size.0, sphere_radius);
    let height = texture_resolution(rect.axis_y_length, base_size.1, sphere_radius);
    if !(renderable(width) && renderable(height)) {
        return None;
    }
    Some(TextureSize {
        width: width as u32,
        height: height as u32,
    })
}
