//! Physics Sandbox
//!
//! Headless demo of the physics core: an immovable ground box, a hull ramp and
//! a few falling bodies stepped for two seconds at 60 Hz.
//!
//! Contacts are resolved here with a minimal response (stop falling, lift out
//! of the ground) to show how a response layer consumes the hit list.
//!
//! Usage:
//!
//! ```text
//! RUST_LOG=debug physics-sandbox [config.json]
//! ```

use glam::Vec3;
use haven_physics_engine::physics::{HitData, Triangle};
use haven_physics_engine::{PhysicsConfig, PhysicsError, PhysicsWorld};
use tracing::info;
use tracing_subscriber::EnvFilter;

const TICKS: usize = 120;
const DT: f32 = 1.0 / 60.0;

fn ramp_triangles() -> Vec<Triangle> {
    let a = Vec3::new(-2.0, 0.0, -2.0);
    let b = Vec3::new(-2.0, 0.0, 2.0);
    let c = Vec3::new(2.0, 2.0, 2.0);
    let d = Vec3::new(2.0, 2.0, -2.0);
    vec![Triangle::from_points(a, b, c), Triangle::from_points(a, c, d)]
}

/// Pushes the collider out along the contact normal and kills the velocity
/// component going into the surface.
fn resolve(world: &mut PhysicsWorld, hit: &HitData) {
    let Some(body) = world.body(hit.collider) else {
        return;
    };
    if body.is_immovable() {
        return;
    }
    let normal = hit.normal.truncate();
    let position = body.position().truncate() + normal * hit.depth;
    let velocity = body.velocity().truncate();
    let into_surface = velocity.dot(normal).min(0.0);

    world.set_body_position(hit.collider, position);
    world.set_body_velocity(hit.collider, velocity - normal * into_surface);
}

fn main() -> Result<(), PhysicsError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("loading physics config from {}", path);
            PhysicsConfig::load(path)?
        }
        None => PhysicsConfig::default(),
    };

    let mut world = PhysicsWorld::new(config);

    world.create_aabb(0.0, true, Vec3::new(0.0, -0.5, 0.0), Vec3::new(20.0, 0.5, 20.0), false);
    world.register_hull_template("ramp", ramp_triangles())?;
    let ramp = world.create_hull_instance("ramp")?;
    world.set_body_position(ramp, Vec3::new(6.0, 0.0, 0.0));

    let ball = world.create_sphere(2.0, false, Vec3::new(0.0, 4.0, 0.0), 0.5);
    let crate_box = world.create_obb(5.0, false, Vec3::new(-4.0, 6.0, 0.0), Vec3::splat(0.5), false);
    world.set_body_rotation(crate_box, 0.4, 0.0, 0.2);
    let rolling = world.create_sphere(1.0, false, Vec3::new(4.0, 3.0, 0.0), 0.4);
    world.apply_impulse(rolling, Vec3::new(2.0, 0.0, 0.0));

    for tick in 0..TICKS {
        world.update(DT);

        let hits: Vec<HitData> = world.hit_data().to_vec();
        for hit in &hits {
            resolve(&mut world, hit);
        }

        if tick % 30 == 0 || tick == TICKS - 1 {
            for handle in [ball, crate_box, rolling] {
                if let (Some(pos), Some(in_air)) = (world.body_position(handle), world.body_in_air(handle)) {
                    info!(
                        tick,
                        %handle,
                        x = pos.x,
                        y = pos.y,
                        z = pos.z,
                        in_air,
                        "body state"
                    );
                }
            }
            info!(tick, contacts = hits.len(), "contacts this tick");
        }
    }

    let bounds = world.octree().bounds();
    info!(
        bodies = world.body_count(),
        indexed = world.octree().body_count(),
        ?bounds,
        "sandbox finished"
    );
    Ok(())
}
