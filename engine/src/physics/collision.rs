//! Narrow-phase collision detection
//!
//! Exact overlap tests between pairs of bounding volumes. The broad phase
//! ([`crate::physics::octree`]) proposes candidate bodies; the functions here
//! decide whether two specific volumes touch and describe the contact.
//!
//! # Conventions
//!
//! [`volume_vs_volume`] takes a *collider* (the moving volume) and a *victim*
//! (the volume it ran into). The reported normal always points from the victim
//! toward the collider, and `depth` is how far the collider has to move along
//! the normal to stop touching.
//!
//! Box pairs and triangle/box pairs use the separating axis test: each
//! candidate axis projects both shapes to an interval, any gap proves
//! separation, otherwise the axis with the least overlap gives the contact
//! normal.
//!
//! # Example
//!
//! ```ignore
//! use haven_physics_engine::physics::collision::volume_vs_volume;
//! use haven_physics_engine::physics::volume::{BoundingVolume, Sphere};
//! use glam::Vec4;
//!
//! let a = BoundingVolume::from(Sphere::new(1.0, Vec4::new(1.5, 0.0, 0.0, 1.0)));
//! let b = BoundingVolume::from(Sphere::new(1.0, Vec4::W));
//! let hit = volume_vs_volume(&a, &b);
//! assert!(hit.intersect);
//! ```

use glam::{Vec3, Vec4};

use super::handle::BodyHandle;
use super::volume::{Aabb, BoundingVolume, Hull, Obb, Shape, Sphere, closest_point_on_triangle};

/// Axes shorter than this (squared) come from parallel edges and are skipped.
const DEGENERATE_AXIS_SQ: f32 = 1e-10;

/// Which pair routine produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollisionKind {
    /// No contact
    #[default]
    None,
    SphereVsSphere,
    AabbVsSphere,
    AabbVsAabb,
    ObbVsSphere,
    /// Any pair of boxes where at least one is oriented
    ObbVsObb,
    HullVsSphere,
    /// Hull against an axis-aligned or oriented box
    HullVsBox,
}

/// Result of a narrow-phase test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitData {
    /// True if the volumes touch or overlap
    pub intersect: bool,
    /// Contact point on or inside the victim (`w = 1`)
    pub position: Vec4,
    /// Unit normal from the victim toward the collider (`w = 0`)
    pub normal: Vec4,
    /// Overlap along `normal`
    pub depth: f32,
    /// Pair routine that produced the hit
    pub kind: CollisionKind,
    /// Body that owns the moving volume
    pub collider: BodyHandle,
    /// Body that was hit
    pub victim: BodyHandle,
    /// True if the victim is flagged as an edge
    pub is_edge: bool,
}

impl Default for HitData {
    fn default() -> Self {
        Self {
            intersect: false,
            position: Vec4::W,
            normal: Vec4::ZERO,
            depth: 0.0,
            kind: CollisionKind::None,
            collider: BodyHandle::NONE,
            victim: BodyHandle::NONE,
            is_edge: false,
        }
    }
}

/// Contact between two shapes, normal pointing from the second toward the first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Point on or inside the second shape
    pub position: Vec3,
    /// Unit normal from the second shape toward the first
    pub normal: Vec3,
    /// Overlap along the normal
    pub depth: f32,
}

impl Contact {
    /// The same contact seen from the first shape, reported at `position`.
    fn flipped_at(self, position: Vec3) -> Self {
        Self {
            position,
            normal: -self.normal,
            depth: self.depth,
        }
    }

    /// Flips a contact whose second shape was `s`, moving the point onto the
    /// sphere surface facing the first shape.
    fn flipped_onto_sphere(self, s: &Sphere) -> Self {
        let normal = -self.normal;
        self.flipped_at(s.position().truncate() + normal * s.radius())
    }
}

/// Tests `collider` against `victim`.
///
/// Hull against hull is not supported and always misses.
pub fn volume_vs_volume(collider: &BoundingVolume, victim: &BoundingVolume) -> HitData {
    use Shape::{Aabb as A, Hull as H, Obb as O, Sphere as S};

    let (contact, kind) = match (collider.shape(), victim.shape()) {
        (S(a), S(b)) => (sphere_vs_sphere(a, b), CollisionKind::SphereVsSphere),

        (S(s), A(b)) => (sphere_vs_aabb(s, b), CollisionKind::AabbVsSphere),
        (A(b), S(s)) => (
            sphere_vs_aabb(s, b).map(|c| c.flipped_onto_sphere(s)),
            CollisionKind::AabbVsSphere,
        ),
        (A(a), A(b)) => (aabb_vs_aabb(a, b), CollisionKind::AabbVsAabb),

        (S(s), O(o)) => (sphere_vs_obb(s, o), CollisionKind::ObbVsSphere),
        (O(o), S(s)) => (
            sphere_vs_obb(s, o).map(|c| c.flipped_onto_sphere(s)),
            CollisionKind::ObbVsSphere,
        ),
        (O(_) | A(_), O(_) | A(_)) => match (BoxFrame::of(collider.shape()), BoxFrame::of(victim.shape())) {
            (Some(a), Some(b)) => (box_vs_box(&a, &b), CollisionKind::ObbVsObb),
            _ => (None, CollisionKind::None),
        },

        (S(s), H(h)) => (sphere_vs_hull(s, h), CollisionKind::HullVsSphere),
        (H(h), S(s)) => (
            sphere_vs_hull(s, h).map(|c| c.flipped_onto_sphere(s)),
            CollisionKind::HullVsSphere,
        ),

        (O(_) | A(_), H(h)) => (
            BoxFrame::of(collider.shape()).and_then(|b| box_vs_hull(&b, h)),
            CollisionKind::HullVsBox,
        ),
        (H(h), O(_) | A(_)) => (
            BoxFrame::of(victim.shape()).and_then(|b| {
                box_vs_hull(&b, h).map(|c| c.flipped_at(b.closest_point(c.position)))
            }),
            CollisionKind::HullVsBox,
        ),

        (H(_), H(_)) => (None, CollisionKind::None),
    };

    match contact {
        Some(c) => HitData {
            intersect: true,
            position: c.position.extend(1.0),
            normal: c.normal.extend(0.0),
            depth: c.depth,
            kind,
            collider: collider.body_handle(),
            victim: victim.body_handle(),
            is_edge: false,
        },
        None => HitData::default(),
    }
}

// =============================================================================
// Sphere pairs
// =============================================================================

/// Sphere `a` against sphere `b`. Coincident centers resolve along +Y.
pub fn sphere_vs_sphere(a: &Sphere, b: &Sphere) -> Option<Contact> {
    let diff = a.position().truncate() - b.position().truncate();
    let dist_sq = diff.length_squared();
    let r_sum = a.radius() + b.radius();
    if dist_sq > r_sum * r_sum {
        return None;
    }

    let normal = diff.try_normalize().unwrap_or(Vec3::Y);
    Some(Contact {
        position: b.position().truncate() + normal * b.radius(),
        normal,
        depth: r_sum - dist_sq.sqrt(),
    })
}

/// Face of the box `[-half, half]` nearest to the interior point `local`.
///
/// Returns the outward face normal and the distance to that face.
fn nearest_face(local: Vec3, half: Vec3) -> (Vec3, f32) {
    let to_face = half - local.abs();
    let axis = if to_face.x <= to_face.y && to_face.x <= to_face.z {
        0
    } else if to_face.y <= to_face.z {
        1
    } else {
        2
    };

    let mut normal = Vec3::ZERO;
    normal[axis] = if local[axis] < 0.0 { -1.0 } else { 1.0 };
    (normal, to_face[axis])
}

/// Sphere against an axis-aligned box. The normal points out of the box.
pub fn sphere_vs_aabb(s: &Sphere, b: &Aabb) -> Option<Contact> {
    let center = s.position().truncate();
    let closest = b.closest_point(s.position()).truncate();
    let offset = center - closest;
    let dist_sq = offset.length_squared();
    if dist_sq > s.sqr_radius() {
        return None;
    }

    if let Some(normal) = offset.try_normalize() {
        return Some(Contact {
            position: closest,
            normal,
            depth: s.radius() - dist_sq.sqrt(),
        });
    }

    // Center inside the box: push out through the nearest face
    let box_center = b.position().truncate();
    let (normal, to_face) = nearest_face(center - box_center, b.half_diagonal().truncate());
    Some(Contact {
        position: center + normal * to_face,
        normal,
        depth: s.radius() + to_face,
    })
}

/// Sphere against an oriented box. The normal points out of the box.
pub fn sphere_vs_obb(s: &Sphere, o: &Obb) -> Option<Contact> {
    let center = s.position().truncate();
    let closest = o.find_closest_pt(s.position()).truncate();
    let offset = center - closest;
    let dist_sq = offset.length_squared();
    if dist_sq > s.sqr_radius() {
        return None;
    }

    if let Some(normal) = offset.try_normalize() {
        return Some(Contact {
            position: closest,
            normal,
            depth: s.radius() - dist_sq.sqrt(),
        });
    }

    let frame = BoxFrame::from_obb(o);
    let local = frame.to_local(center);
    let (local_normal, to_face) = nearest_face(local, o.extents());
    let normal = frame.to_world_dir(local_normal);
    Some(Contact {
        position: center + normal * to_face,
        normal,
        depth: s.radius() + to_face,
    })
}

/// Sphere against every triangle of a hull. The normal points from the hull
/// toward the sphere center.
pub fn sphere_vs_hull(s: &Sphere, h: &Hull) -> Option<Contact> {
    let center = s.position().truncate();

    let (closest, face_normal) = h
        .world_triangles()
        .map(|tri| {
            let [a, b, c] = tri.corners.map(Vec4::truncate);
            (closest_point_on_triangle(center, a, b, c), tri.face_normal())
        })
        .min_by(|x, y| {
            x.0.distance_squared(center)
                .total_cmp(&y.0.distance_squared(center))
        })?;

    let offset = center - closest;
    let dist_sq = offset.length_squared();
    if dist_sq > s.sqr_radius() {
        return None;
    }

    let normal = offset
        .try_normalize()
        .or_else(|| face_normal.try_normalize())
        .unwrap_or(Vec3::Y);
    Some(Contact {
        position: closest,
        normal,
        depth: s.radius() - dist_sq.sqrt(),
    })
}

// =============================================================================
// Box pairs (separating axis test)
// =============================================================================

/// A box in world space: center, unit axes and half widths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxFrame {
    pub center: Vec3,
    pub axes: [Vec3; 3],
    pub extents: Vec3,
}

impl BoxFrame {
    pub fn from_aabb(b: &Aabb) -> Self {
        Self {
            center: b.position().truncate(),
            axes: [Vec3::X, Vec3::Y, Vec3::Z],
            extents: b.half_diagonal().truncate(),
        }
    }

    pub fn from_obb(o: &Obb) -> Self {
        Self {
            center: o.position().truncate(),
            axes: o.axes(),
            extents: o.extents(),
        }
    }

    /// Frame of a box shape, `None` for spheres and hulls.
    pub fn of(shape: &Shape) -> Option<Self> {
        match shape {
            Shape::Aabb(b) => Some(Self::from_aabb(b)),
            Shape::Obb(o) => Some(Self::from_obb(o)),
            Shape::Sphere(_) | Shape::Hull(_) => None,
        }
    }

    /// Interval covered by the box along unit `axis`.
    pub fn project(&self, axis: Vec3) -> (f32, f32) {
        let c = self.center.dot(axis);
        let r = self.axes[0].dot(axis).abs() * self.extents.x
            + self.axes[1].dot(axis).abs() * self.extents.y
            + self.axes[2].dot(axis).abs() * self.extents.z;
        (c - r, c + r)
    }

    fn to_local(&self, point: Vec3) -> Vec3 {
        let d = point - self.center;
        Vec3::new(d.dot(self.axes[0]), d.dot(self.axes[1]), d.dot(self.axes[2]))
    }

    fn to_world_dir(&self, local: Vec3) -> Vec3 {
        self.axes[0] * local.x + self.axes[1] * local.y + self.axes[2] * local.z
    }

    /// Closest point in or on the box to `point`.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let local = self.to_local(point).clamp(-self.extents, self.extents);
        self.center + self.to_world_dir(local)
    }
}

/// Overlap of interval `a` with interval `b`.
///
/// Returns the shortest push that separates `a` from `b` and its direction
/// (+1 moves `a` toward increasing values), or `None` if there is a gap.
fn interval_overlap(a: (f32, f32), b: (f32, f32)) -> Option<(f32, f32)> {
    let push_up = b.1 - a.0;
    let push_down = a.1 - b.0;
    if push_up < 0.0 || push_down < 0.0 {
        return None;
    }
    Some(if push_up < push_down {
        (push_up, 1.0)
    } else {
        (push_down, -1.0)
    })
}

/// Runs the separating axis test over `axes`.
///
/// Returns the minimum-overlap axis, oriented to push `a` out of `b`, and the
/// overlap along it.
fn separating_axis_test<A, B>(
    axes: impl IntoIterator<Item = Vec3>,
    project_a: A,
    project_b: B,
) -> Option<(Vec3, f32)>
where
    A: Fn(Vec3) -> (f32, f32),
    B: Fn(Vec3) -> (f32, f32),
{
    let mut best: Option<(Vec3, f32)> = None;
    for axis in axes {
        let len_sq = axis.length_squared();
        if len_sq < DEGENERATE_AXIS_SQ {
            continue;
        }
        let axis = axis / len_sq.sqrt();
        let (depth, sign) = interval_overlap(project_a(axis), project_b(axis))?;
        if best.is_none_or(|(_, d)| depth < d) {
            best = Some((axis * sign, depth));
        }
    }
    best
}

/// Axis-aligned box against axis-aligned box.
pub fn aabb_vs_aabb(a: &Aabb, b: &Aabb) -> Option<Contact> {
    let (normal, depth) = separating_axis_test(
        [Vec3::X, Vec3::Y, Vec3::Z],
        |axis| BoxFrame::from_aabb(a).project(axis),
        |axis| BoxFrame::from_aabb(b).project(axis),
    )?;

    let lo = a.min().truncate().max(b.min().truncate());
    let hi = a.max().truncate().min(b.max().truncate());
    Some(Contact {
        position: (lo + hi) * 0.5,
        normal,
        depth,
    })
}

/// Any two boxes: 3 + 3 face axes and 9 edge cross products.
pub fn box_vs_box(a: &BoxFrame, b: &BoxFrame) -> Option<Contact> {
    let mut axes = Vec::with_capacity(15);
    axes.extend(a.axes);
    axes.extend(b.axes);
    for ea in a.axes {
        for eb in b.axes {
            axes.push(ea.cross(eb));
        }
    }

    let (normal, depth) = separating_axis_test(axes, |axis| a.project(axis), |axis| b.project(axis))?;
    Some(Contact {
        position: b.closest_point(a.center),
        normal,
        depth,
    })
}

fn triangle_interval(corners: [Vec3; 3], axis: Vec3) -> (f32, f32) {
    let d = corners.map(|c| c.dot(axis));
    (d[0].min(d[1]).min(d[2]), d[0].max(d[1]).max(d[2]))
}

/// Box against every triangle of a hull.
///
/// Each triangle is tested with its face normal, the three box axes and the
/// nine box-axis/edge cross products. The deepest touching triangle gives the
/// contact. The normal points from the hull toward the box.
pub fn box_vs_hull(b: &BoxFrame, h: &Hull) -> Option<Contact> {
    let mut deepest: Option<Contact> = None;

    for tri in h.world_triangles() {
        let corners = tri.corners.map(Vec4::truncate);
        let edges = [
            corners[1] - corners[0],
            corners[2] - corners[1],
            corners[0] - corners[2],
        ];

        let mut axes = Vec::with_capacity(13);
        axes.push(tri.face_normal());
        axes.extend(b.axes);
        for axis in b.axes {
            for edge in edges {
                axes.push(axis.cross(edge));
            }
        }

        let Some((normal, depth)) = separating_axis_test(
            axes,
            |axis| b.project(axis),
            |axis| triangle_interval(corners, axis),
        ) else {
            continue;
        };

        if deepest.is_none_or(|d| depth > d.depth) {
            let [p0, p1, p2] = corners;
            deepest = Some(Contact {
                position: closest_point_on_triangle(b.center, p0, p1, p2),
                normal,
                depth,
            });
        }
    }

    deepest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::types::Triangle;
    use glam::Mat4;
    use std::f32::consts::FRAC_PI_4;

    const EPS: f32 = 1e-5;

    fn approx(a: Vec4, b: Vec4) -> bool {
        (a - b).length() < EPS
    }

    fn ground_hull() -> Hull {
        Hull::new(vec![
            Triangle::from_points(
                Vec3::new(-5.0, 0.0, -5.0),
                Vec3::new(-5.0, 0.0, 5.0),
                Vec3::new(5.0, 0.0, 5.0),
            ),
            Triangle::from_points(
                Vec3::new(-5.0, 0.0, -5.0),
                Vec3::new(5.0, 0.0, 5.0),
                Vec3::new(5.0, 0.0, -5.0),
            ),
        ])
    }

    #[test]
    fn test_sphere_vs_sphere_normal_points_at_collider() {
        let a = BoundingVolume::from(Sphere::new(1.0, Vec4::new(1.5, 0.0, 0.0, 1.0)));
        let b = BoundingVolume::from(Sphere::new(1.0, Vec4::W));
        let hit = volume_vs_volume(&a, &b);
        assert!(hit.intersect);
        assert_eq!(hit.kind, CollisionKind::SphereVsSphere);
        assert!(approx(hit.normal, Vec4::new(1.0, 0.0, 0.0, 0.0)));
        assert!((hit.depth - 0.5).abs() < EPS);
        assert!(approx(hit.position, Vec4::new(1.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_spheres_apart_miss() {
        let a = BoundingVolume::from(Sphere::new(1.0, Vec4::new(3.0, 0.0, 0.0, 1.0)));
        let b = BoundingVolume::from(Sphere::new(1.0, Vec4::W));
        let hit = volume_vs_volume(&a, &b);
        assert!(!hit.intersect);
        assert_eq!(hit.kind, CollisionKind::None);
    }

    #[test]
    fn test_sphere_resting_on_box() {
        let sphere = BoundingVolume::from(Sphere::new(1.0, Vec4::new(0.0, 1.75, 0.0, 1.0)));
        let ground = BoundingVolume::from(Aabb::from_center_half_diagonal(Vec4::W, Vec3::ONE));
        let hit = volume_vs_volume(&sphere, &ground);
        assert!(hit.intersect);
        assert_eq!(hit.kind, CollisionKind::AabbVsSphere);
        assert!(approx(hit.normal, Vec4::new(0.0, 1.0, 0.0, 0.0)));
        assert!((hit.depth - 0.25).abs() < EPS);

        // Swapping roles flips the normal
        let hit = volume_vs_volume(&ground, &sphere);
        assert!(approx(hit.normal, Vec4::new(0.0, -1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_swapped_roles_report_point_on_victim() {
        let sphere = Sphere::new(1.0, Vec4::new(0.0, 1.75, 0.0, 1.0));
        let ground = BoundingVolume::from(Aabb::from_center_half_diagonal(Vec4::W, Vec3::ONE));

        // Box moving into a sphere: the point lies on the sphere surface facing the box
        let hit = volume_vs_volume(&ground, &sphere.into());
        assert!(approx(hit.position, Vec4::new(0.0, 0.75, 0.0, 1.0)));

        let hull = BoundingVolume::from(ground_hull());
        let hit = volume_vs_volume(&hull, &sphere.into());
        assert!(!hit.intersect);

        let low = Sphere::new(1.0, Vec4::new(2.0, 0.5, 0.0, 1.0));
        let hit = volume_vs_volume(&hull, &low.into());
        assert!(hit.intersect);
        assert!(approx(hit.position, Vec4::new(2.0, -0.5, 0.0, 1.0)));

        // Hull moving into a box: the point lies in the box
        let crate_box = Aabb::from_center_half_diagonal(Vec4::new(3.0, 0.5, 0.0, 1.0), Vec3::ONE);
        let hit = volume_vs_volume(&hull, &crate_box.into());
        assert!(hit.intersect);
        assert!(crate_box.contains_point(hit.position));
    }

    #[test]
    fn test_sphere_center_inside_box_uses_nearest_face() {
        let sphere = Sphere::new(0.5, Vec4::new(0.0, 0.0, 0.8, 1.0));
        let b = Aabb::from_center_half_diagonal(Vec4::W, Vec3::ONE);
        let c = sphere_vs_aabb(&sphere, &b).unwrap();
        assert!((c.normal - Vec3::Z).length() < EPS);
        assert!((c.depth - 0.7).abs() < EPS);
    }

    #[test]
    fn test_aabb_vs_aabb_least_overlap_axis() {
        let a = Aabb::from_center_half_diagonal(Vec4::new(1.8, 0.5, 0.0, 1.0), Vec3::ONE);
        let b = Aabb::from_center_half_diagonal(Vec4::W, Vec3::ONE);
        let c = aabb_vs_aabb(&a, &b).unwrap();
        assert!((c.normal - Vec3::X).length() < EPS);
        assert!((c.depth - 0.2).abs() < EPS);

        let far = Aabb::from_center_half_diagonal(Vec4::new(5.0, 0.0, 0.0, 1.0), Vec3::ONE);
        assert!(aabb_vs_aabb(&far, &b).is_none());
    }

    #[test]
    fn test_touching_boxes_intersect() {
        let a = Aabb::from_center_half_diagonal(Vec4::new(2.0, 0.0, 0.0, 1.0), Vec3::ONE);
        let b = Aabb::from_center_half_diagonal(Vec4::W, Vec3::ONE);
        let c = aabb_vs_aabb(&a, &b).unwrap();
        assert!(c.depth.abs() < EPS);
    }

    #[test]
    fn test_sphere_vs_rotated_obb() {
        let obb = BoundingVolume::from(Obb::with_rotation(
            Vec4::W,
            Vec3::ONE,
            &Mat4::from_rotation_y(FRAC_PI_4),
        ));
        let sphere = BoundingVolume::from(Sphere::new(0.7, Vec4::new(2.0, 0.0, 0.0, 1.0)));
        let hit = volume_vs_volume(&sphere, &obb);
        assert!(hit.intersect);
        assert_eq!(hit.kind, CollisionKind::ObbVsSphere);
        assert!(approx(hit.normal, Vec4::new(1.0, 0.0, 0.0, 0.0)));
        assert!((hit.depth - (0.7 - (2.0 - 2.0_f32.sqrt()))).abs() < 1e-4);
    }

    #[test]
    fn test_rotated_boxes_separated_on_face_axis() {
        // World AABBs overlap, the boxes themselves do not
        let rot = Mat4::from_rotation_z(FRAC_PI_4);
        let a = Obb::with_rotation(Vec4::W, Vec3::ONE, &rot);
        let b = Obb::with_rotation(Vec4::new(2.1, 2.1, 0.0, 1.0), Vec3::ONE, &rot);
        assert!(a.bounds().overlaps(&b.bounds()));

        let hit = volume_vs_volume(&a.into(), &b.into());
        assert!(!hit.intersect);
    }

    #[test]
    fn test_obb_vs_aabb_overlap() {
        let obb = BoundingVolume::from(Obb::with_rotation(
            Vec4::new(0.0, 2.2, 0.0, 1.0),
            Vec3::ONE,
            &Mat4::from_rotation_y(0.3),
        ));
        let ground = BoundingVolume::from(Aabb::from_center_half_diagonal(Vec4::W, Vec3::new(5.0, 1.5, 5.0)));
        let hit = volume_vs_volume(&obb, &ground);
        assert!(hit.intersect);
        assert_eq!(hit.kind, CollisionKind::ObbVsObb);
        assert!(approx(hit.normal, Vec4::new(0.0, 1.0, 0.0, 0.0)));
        assert!((hit.depth - 0.3).abs() < 1e-4);
    }

    #[test]
    fn test_sphere_vs_hull() {
        let hull = BoundingVolume::from(ground_hull());
        let sphere = BoundingVolume::from(Sphere::new(1.0, Vec4::new(0.0, 0.5, 0.0, 1.0)));
        let hit = volume_vs_volume(&sphere, &hull);
        assert!(hit.intersect);
        assert_eq!(hit.kind, CollisionKind::HullVsSphere);
        assert!(approx(hit.normal, Vec4::new(0.0, 1.0, 0.0, 0.0)));
        assert!((hit.depth - 0.5).abs() < EPS);
    }

    #[test]
    fn test_box_vs_hull() {
        let hull = BoundingVolume::from(ground_hull());
        let b = BoundingVolume::from(Aabb::from_center_half_diagonal(
            Vec4::new(0.0, 0.5, 0.0, 1.0),
            Vec3::ONE,
        ));
        let hit = volume_vs_volume(&b, &hull);
        assert!(hit.intersect);
        assert_eq!(hit.kind, CollisionKind::HullVsBox);
        assert!(approx(hit.normal, Vec4::new(0.0, 1.0, 0.0, 0.0)));
        assert!((hit.depth - 0.5).abs() < EPS);

        let above = BoundingVolume::from(Aabb::from_center_half_diagonal(
            Vec4::new(0.0, 3.0, 0.0, 1.0),
            Vec3::ONE,
        ));
        assert!(!volume_vs_volume(&above, &hull).intersect);
    }

    #[test]
    fn test_hull_vs_hull_never_hits() {
        let a = BoundingVolume::from(ground_hull());
        let b = BoundingVolume::from(ground_hull());
        assert!(!volume_vs_volume(&a, &b).intersect);
    }

    #[test]
    fn test_hit_carries_body_handles() {
        let a = BoundingVolume::from(Sphere::new(1.0, Vec4::W)).with_body(BodyHandle::from_raw(3));
        let b = BoundingVolume::from(Sphere::new(1.0, Vec4::W)).with_body(BodyHandle::from_raw(8));
        let hit = volume_vs_volume(&a, &b);
        assert_eq!(hit.collider, BodyHandle::from_raw(3));
        assert_eq!(hit.victim, BodyHandle::from_raw(8));
        // Coincident centers fall back to +Y
        assert!(approx(hit.normal, Vec4::new(0.0, 1.0, 0.0, 0.0)));
    }
}
