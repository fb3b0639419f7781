//! Volume Tests - AABB, OBB, Sphere and Hull
//!
//! Construction invariants, cumulative vs absolute positioning, scaling and
//! closest-point queries, driven through the public volume API.

use glam::{Mat4, Vec3, Vec4};
use haven_physics_engine::physics::{
    Aabb, BoundingVolume, Hull, Obb, Sphere, Triangle, VolumeKind,
};

const EPS: f32 = 1e-5;

fn assert_vec4_near(actual: Vec4, expected: Vec4) {
    assert!(
        (actual - expected).length() < EPS,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

fn quad_at_minus_one_z() -> Vec<Triangle> {
    vec![
        Triangle::from_points(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
        ),
        Triangle::from_points(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
        ),
    ]
}

// ============================================================================
// AABB
// ============================================================================

#[test]
fn test_aabb_center_and_half_diagonal_from_corners() {
    let aabb = Aabb::new(Vec4::new(0.5, 1.5, 3.0, 1.0), Vec4::new(3.0, 5.0, 8.0, 1.0));
    assert_eq!(aabb.position(), Vec4::new(1.75, 3.25, 5.5, 1.0));
    assert_eq!(aabb.half_diagonal(), Vec4::new(1.25, 1.75, 2.5, 0.0));
}

#[test]
fn test_aabb_update_position_is_cumulative() {
    let start = Aabb::new(Vec4::new(0.5, 1.5, 3.0, 1.0), Vec4::new(3.0, 5.0, 8.0, 1.0));
    let step = Vec3::new(5.0, 10.0, 15.0);

    let mut twice = start;
    twice.update_position(&Mat4::from_translation(step));
    twice.update_position(&Mat4::from_translation(step));

    let mut once = start;
    once.update_position(&Mat4::from_translation(step * 2.0));

    assert_eq!(twice.position(), once.position());
    assert_eq!(twice.position(), Vec4::new(11.75, 23.25, 35.5, 1.0));
}

#[test]
fn test_aabb_scale_keeps_corners_in_sync() {
    let mut aabb = Aabb::new(Vec4::new(0.5, 1.5, 3.0, 1.0), Vec4::new(3.0, 5.0, 8.0, 1.0));
    aabb.scale(Vec3::new(2.0, 4.0, 6.0));

    assert_eq!(aabb.half_diagonal(), Vec4::new(2.5, 7.0, 15.0, 0.0));
    assert_eq!(aabb.min(), aabb.position() - aabb.half_diagonal());
    assert_eq!(aabb.max(), aabb.position() + aabb.half_diagonal());
}

#[test]
fn test_aabb_degenerate_point_box() {
    let p = Vec4::new(2.0, 2.0, 2.0, 1.0);
    let aabb = Aabb::new(p, p);
    assert_eq!(aabb.half_diagonal(), Vec4::ZERO);
    assert_eq!(aabb.min(), p);
    assert_eq!(aabb.max(), p);
    assert!(aabb.contains_point(p));
}

#[test]
fn test_aabb_closest_point_of_inside_point_is_itself() {
    let aabb = Aabb::from_center_half_diagonal(Vec4::W, Vec3::ONE);
    let inside = Vec4::new(0.25, -0.5, 0.75, 1.0);
    assert_eq!(aabb.closest_point(inside), inside);
}

// ============================================================================
// OBB
// ============================================================================

#[test]
fn test_obb_closest_point_clamps_to_face() {
    let obb = Obb::new(Vec4::W, Vec3::ONE);
    let p = obb.find_closest_pt(Vec4::new(-3.0, 0.0, 0.0, 1.0));
    assert_vec4_near(p, Vec4::new(-1.0, 0.0, 0.0, 1.0));
}

#[test]
fn test_obb_closest_point_follows_rotation() {
    // Quarter turn around Z swaps the local x and y extents in world space
    let obb = Obb::with_rotation(
        Vec4::W,
        Vec3::new(2.0, 1.0, 1.0),
        &Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2),
    );
    let p = obb.find_closest_pt(Vec4::new(5.0, 0.0, 0.0, 1.0));
    assert_vec4_near(p, Vec4::new(1.0, 0.0, 0.0, 1.0));
}

#[test]
fn test_obb_update_position_is_cumulative() {
    let mut obb = Obb::new(Vec4::W, Vec3::ONE);
    let t = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    obb.update_position(&t);
    obb.update_position(&t);
    assert_eq!(obb.position(), Vec4::new(2.0, 4.0, 6.0, 1.0));
}

// ============================================================================
// Sphere
// ============================================================================

#[test]
fn test_sphere_cumulative_and_absolute_updates() {
    let mut sphere = Sphere::new(1.0, Vec4::W);
    let t = Mat4::from_translation(Vec3::new(5.0, 10.0, 15.0));
    sphere.update_position(&t);
    sphere.update_position(&t);
    assert_eq!(sphere.position(), Vec4::new(10.0, 20.0, 30.0, 1.0));
    assert_eq!(sphere.prev_position(), Vec4::new(5.0, 10.0, 15.0, 1.0));

    sphere.update_position_point(Vec4::new(1.0, 1.0, 1.0, 1.0));
    sphere.update_position_point(Vec4::new(1.0, 1.0, 1.0, 1.0));
    assert_eq!(sphere.position(), Vec4::new(1.0, 1.0, 1.0, 1.0));
}

#[test]
fn test_sphere_radius_and_square_stay_in_sync() {
    let mut sphere = Sphere::new(2.0, Vec4::W);
    assert_eq!(sphere.sqr_radius(), 4.0);
    sphere.set_radius(3.0);
    assert_eq!(sphere.radius(), 3.0);
    assert_eq!(sphere.sqr_radius(), 9.0);
}

#[test]
fn test_zero_radius_sphere_is_a_point() {
    let sphere = Sphere::new(0.0, Vec4::new(1.0, 0.0, 0.0, 1.0));
    assert!(sphere.contains_point(Vec4::new(1.0, 0.0, 0.0, 1.0)));
    assert!(!sphere.contains_point(Vec4::new(1.0, 0.1, 0.0, 1.0)));
    assert_eq!(
        sphere.closest_point(Vec4::new(4.0, 0.0, 0.0, 1.0)),
        Vec4::new(1.0, 0.0, 0.0, 1.0)
    );
}

#[test]
fn test_sphere_ignores_scale_through_volume() {
    let mut volume = BoundingVolume::from(Sphere::new(1.5, Vec4::W));
    volume.scale(Vec3::splat(10.0));
    assert_eq!(volume.as_sphere().map(Sphere::radius), Some(1.5));
}

// ============================================================================
// Hull
// ============================================================================

#[test]
fn test_hull_closest_point_per_triangle_after_translation() {
    let mut hull = Hull::new(quad_at_minus_one_z());
    hull.update_position(&Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)));

    let origin = Vec4::new(0.0, 0.0, 0.0, 1.0);
    assert_vec4_near(
        hull.find_closest_point_on_triangle(origin, 0),
        Vec4::new(-1.0, 4.0, -1.0, 1.0),
    );
    assert_vec4_near(
        hull.find_closest_point_on_triangle(origin, 1),
        Vec4::new(0.0, 4.0, -1.0, 1.0),
    );
}

#[test]
fn test_hull_scale_factor() {
    let mut hull = Hull::new(quad_at_minus_one_z());
    assert_eq!(hull.scale_factor(), Vec4::new(1.0, 1.0, 1.0, 0.0));
    hull.scale(Vec3::splat(5.0));
    assert_eq!(hull.scale_factor(), Vec4::new(5.0, 5.0, 5.0, 0.0));
}

#[test]
fn test_hull_triangle_access() {
    let hull = Hull::new(quad_at_minus_one_z());
    assert_eq!(hull.triangle_count(), 2);
    assert_eq!(hull.triangle_at(1).corners[2], Vec4::new(1.0, -1.0, -1.0, 1.0));
}

#[test]
#[should_panic]
fn test_hull_triangle_out_of_range_panics() {
    let hull = Hull::new(quad_at_minus_one_z());
    let _ = hull.triangle_in_world_coord(2);
}

// ============================================================================
// Volume dispatch
// ============================================================================

#[test]
fn test_volume_kind_matches_shape() {
    assert_eq!(BoundingVolume::from(Aabb::default()).kind(), VolumeKind::Aabb);
    assert_eq!(BoundingVolume::from(Obb::default()).kind(), VolumeKind::Obb);
    assert_eq!(BoundingVolume::from(Sphere::default()).kind(), VolumeKind::Sphere);
    assert_eq!(BoundingVolume::from(Hull::new(Vec::new())).kind(), VolumeKind::Hull);
}

#[test]
fn test_volume_bounds_of_rotated_obb_contain_corners() {
    let obb = Obb::with_rotation(
        Vec4::new(3.0, 0.0, 0.0, 1.0),
        Vec3::new(1.0, 0.5, 2.0),
        &Mat4::from_rotation_y(0.7),
    );
    let bounds = BoundingVolume::from(obb).bounds();
    for corner in obb.corners() {
        let c = corner.truncate();
        assert!(c.cmpge(bounds.min - Vec3::splat(EPS)).all());
        assert!(c.cmple(bounds.max + Vec3::splat(EPS)).all());
    }
}
