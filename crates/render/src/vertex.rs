//! Textured quad geometry

use bytemuck::{Pod, Zeroable};

/// Vertex layout shared with `shader.hlsl`: POSITION then TEXCOORD
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y, 0.0],
            tex_coord: [u, v],
        }
    }
}

pub const QUAD_VERTEX_COUNT: usize = 6;

/// Two triangles covering an `image_w × image_h` image rotated by `angle`
/// degrees, scaled so the rotated quad's bounding box spans the whole clip
/// space.
pub fn fitted_quad(image_w: f32, image_h: f32, angle: f64) -> [Vertex; QUAD_VERTEX_COUNT] {
    let (w, h) = (image_w, image_h);
    let mut vertices = [
        Vertex::new(0.0, 0.0, 0.0, 0.0),
        Vertex::new(w, 0.0, 1.0, 0.0),
        Vertex::new(0.0, h, 0.0, 1.0),
        Vertex::new(w, 0.0, 1.0, 0.0),
        Vertex::new(w, h, 1.0, 1.0),
        Vertex::new(0.0, h, 0.0, 1.0),
    ];

    let (sin, cos) = (angle.to_radians() as f32).sin_cos();
    for vertex in &mut vertices {
        let [x, y, _] = vertex.position;
        vertex.position[0] = x * cos - y * sin;
        vertex.position[1] = x * sin + y * cos;
    }

    let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
    let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
    for vertex in &vertices {
        min_x = min_x.min(vertex.position[0]);
        min_y = min_y.min(vertex.position[1]);
        max_x = max_x.max(vertex.position[0]);
        max_y = max_y.max(vertex.position[1]);
    }
    let span_x = (max_x - min_x).max(f32::EPSILON);
    let span_y = (max_y - min_y).max(f32::EPSILON);

    // Raster Y grows downwards, clip Y upwards
    for vertex in &mut vertices {
        let [x, y, _] = vertex.position;
        vertex.position[0] = (x - min_x) * 2.0 / span_x - 1.0;
        vertex.position[1] = 1.0 - (y - min_y) * 2.0 / span_y;
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn close(a: [f32; 3], x: f32, y: f32) -> bool {
        (a[0] - x).abs() < EPS && (a[1] - y).abs() < EPS
    }

    #[test]
    fn unrotated_quad_fills_clip_space() {
        let quad = fitted_quad(400.0, 300.0, 0.0);
        assert!(close(quad[0].position, -1.0, 1.0));
        assert!(close(quad[1].position, 1.0, 1.0));
        assert!(close(quad[2].position, -1.0, -1.0));
        assert!(close(quad[4].position, 1.0, -1.0));
        assert_eq!(quad[4].tex_coord, [1.0, 1.0]);
    }

    #[test]
    fn quarter_turn_puts_image_origin_top_right() {
        let quad = fitted_quad(400.0, 300.0, 90.0);
        assert!(close(quad[0].position, 1.0, 1.0));
        assert_eq!(quad[0].tex_coord, [0.0, 0.0]);
        assert!(close(quad[4].position, -1.0, -1.0));
    }

    #[test]
    fn any_angle_touches_every_clip_edge() {
        for angle in [17.0, 45.0, 133.0, 250.0, -30.0] {
            let quad = fitted_quad(640.0, 360.0, angle);
            let xs = quad.iter().map(|v| v.position[0]);
            let ys = quad.iter().map(|v| v.position[1]);
            let (min_x, max_x) = xs.fold((f32::MAX, f32::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
            let (min_y, max_y) = ys.fold((f32::MAX, f32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));

            assert!((min_x + 1.0).abs() < EPS, "angle {angle}");
            assert!((max_x - 1.0).abs() < EPS, "angle {angle}");
            assert!((min_y + 1.0).abs() < EPS, "angle {angle}");
            assert!((max_y - 1.0).abs() < EPS, "angle {angle}");
        }
    }

    #[test]
    fn vertex_matches_input_layout_stride() {
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
        assert_eq!(bytemuck::cast_slice::<Vertex, u8>(&fitted_quad(1.0, 1.0, 0.0)).len(), 120);
    }
}
