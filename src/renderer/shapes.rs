//! Shape tessellation for 2D primitives
//!
//! [`ShapeBatch`] is the GPU-facing [`Surface`]: every draw call becomes a
//! handful of colored triangles in play field pixels.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use std::f32::consts::TAU;

use super::surface::{Color, Surface};

/// Triangle fan resolution for circles
const CIRCLE_SEGMENTS: u32 = 20;

/// 2D vertex with position (field pixels until uploaded) and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    pub const fn new(x: f32, y: f32, color: Color) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Two triangles covering a rectangle
pub fn rect(min: Vec2, size: Vec2, color: Color) -> [Vertex; 6] {
    let max = min + size;
    [
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: Color, segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Accumulates one frame of geometry
#[derive(Debug, Clone)]
pub struct ShapeBatch {
    pub clear_color: Color,
    pub vertices: Vec<Vertex>,
}

impl Default for ShapeBatch {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            vertices: Vec::with_capacity(4096),
        }
    }
}

impl ShapeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop last frame's geometry, keeping the allocation
    pub fn reset(&mut self) {
        self.vertices.clear();
    }
}

impl Surface for ShapeBatch {
    fn clear(&mut self, color: Color) {
        self.clear_color = color;
        self.vertices.clear();
    }

    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        self.vertices.extend_from_slice(&rect(min, size, color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        self.vertices
            .extend(circle(center, radius, color, CIRCLE_SEGMENTS));
    }
}
