//! Triangle hull volume
//!
//! Triangles are stored in object space. The hull keeps its world placement as
//! translation, rotation and a per-axis scale; world-space triangles are
//! produced on demand by [`Hull::triangle_in_world_coord`].

use glam::{Mat3, Mat4, Vec3, Vec4};

use super::Bounds;
use crate::physics::types::Triangle;

/// Triangle-mesh volume. Not required to be convex.
#[derive(Debug, Clone, PartialEq)]
pub struct Hull {
    position: Vec4,
    prev_position: Vec4,
    triangles: Vec<Triangle>,
    rotation: Mat3,
    scale: Vec3,
    /// Farthest corner distance from the object-space origin
    object_radius: f32,
}

impl Hull {
    /// Creates a hull at the origin.
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self::with_position(Vec4::W, triangles)
    }

    /// Creates a hull whose object-space origin sits at `center`.
    pub fn with_position(center: Vec4, triangles: Vec<Triangle>) -> Self {
        let object_radius = triangles
            .iter()
            .flat_map(|tri| tri.corners)
            .map(|corner| corner.truncate().length())
            .fold(0.0_f32, f32::max);
        let position = center.truncate().extend(1.0);

        Self {
            position,
            prev_position: position,
            triangles,
            rotation: Mat3::IDENTITY,
            scale: Vec3::ONE,
            object_radius,
        }
    }

    pub fn position(&self) -> Vec4 {
        self.position
    }

    pub fn prev_position(&self) -> Vec4 {
        self.prev_position
    }

    /// Applies `transform` to the hull origin, relative to the current position.
    pub fn update_position(&mut self, transform: &Mat4) {
        self.prev_position = self.position;
        self.position = transform
            .transform_point3(self.position.truncate())
            .extend(1.0);
    }

    /// Moves the hull origin to an absolute position.
    pub fn set_position(&mut self, position: Vec4) {
        self.position = position.truncate().extend(1.0);
    }

    /// Multiplies the per-axis scale factor.
    pub fn scale(&mut self, factor: Vec3) {
        self.scale *= factor;
    }

    /// Current per-axis scale, `w = 0`.
    pub fn scale_factor(&self) -> Vec4 {
        self.scale.extend(0.0)
    }

    pub fn set_rotation(&mut self, rotation: &Mat4) {
        self.rotation = Mat3::from_mat4(*rotation);
    }

    pub fn rotation(&self) -> Mat4 {
        Mat4::from_mat3(self.rotation)
    }

    /// Object-to-world transform: scale, then rotate, then translate.
    pub fn world_transform(&self) -> Mat4 {
        Mat4::from_translation(self.position.truncate())
            * Mat4::from_mat3(self.rotation)
            * Mat4::from_scale(self.scale)
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Object-space triangle. Panics if `index` is out of range.
    pub fn triangle_at(&self, index: usize) -> &Triangle {
        &self.triangles[index]
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    fn to_world(&self, corner: Vec4) -> Vec3 {
        self.position.truncate() + self.rotation * (self.scale * corner.truncate())
    }

    /// Triangle `index` in world coordinates. Panics if `index` is out of range.
    pub fn triangle_in_world_coord(&self, index: usize) -> Triangle {
        let [a, b, c] = self.triangles[index].corners;
        Triangle::from_points(self.to_world(a), self.to_world(b), self.to_world(c))
    }

    /// All triangles in world coordinates.
    pub fn world_triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangles.len()).map(|i| self.triangle_in_world_coord(i))
    }

    /// World-space triangles as a flat `x, y, z, w` stream for debug drawing.
    pub fn world_vertex_data(&self) -> Vec<f32> {
        let world: Vec<Triangle> = self.world_triangles().collect();
        Triangle::to_flat(&world)
    }

    /// Closest point on world-space triangle `index` to `point`.
    pub fn find_closest_point_on_triangle(&self, point: Vec4, index: usize) -> Vec4 {
        let [a, b, c] = self.triangle_in_world_coord(index).corners.map(Vec4::truncate);
        closest_point_on_triangle(point.truncate(), a, b, c).extend(1.0)
    }

    /// Closest point on the hull surface. A hull without triangles answers
    /// with its own position.
    pub fn closest_point(&self, point: Vec4) -> Vec4 {
        let p = point.truncate();
        self.world_triangles()
            .map(|tri| {
                let [a, b, c] = tri.corners.map(Vec4::truncate);
                closest_point_on_triangle(p, a, b, c)
            })
            .min_by(|x, y| x.distance_squared(p).total_cmp(&y.distance_squared(p)))
            .map_or(self.position, |q| q.extend(1.0))
    }

    /// Radius of a sphere around the hull origin enclosing every corner.
    pub fn bounding_radius(&self) -> f32 {
        self.object_radius * self.scale.abs().max_element()
    }

    pub fn bounds(&self) -> Bounds {
        let corners = self
            .triangles
            .iter()
            .flat_map(|tri| tri.corners)
            .map(|corner| self.to_world(corner));
        Bounds::from_points(corners)
            .unwrap_or_else(|| Bounds::from_center_radius(self.position.truncate(), 0.0))
    }
}

/// Closest point to `p` on triangle `abc`.
///
/// Classifies `p` against the Voronoi regions of the three vertices, the three
/// edges and the face, so points beyond an edge or corner are clamped to that
/// feature rather than to the supporting plane.
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;

    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    // Inside the face
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}
