//! Physics primitives for the frame loop: semi-implicit integration,
//! boundary reflection, overlap tests, and solid-contact response.

use crate::schema::bounds;
use crate::schema::capability::{ColliderType, EntityKind};
use crate::schema::description::PhysicsParams;
use crate::schema::entity::{Entity, Vec2};

/// Advance one dynamic entity by `dt` seconds: gravity, friction
/// damping, position update, then boundary reflection at
/// `-restitution` with the full bounding box clamped inside the world.
pub fn integrate(entity: &mut Entity, physics: &PhysicsParams, world: Vec2, dt: f32) {
    if entity.collider.is_static {
        return;
    }

    entity.velocity.x += physics.gravity.x * dt;
    entity.velocity.y += physics.gravity.y * dt;
    // Friction models contact drag; airborne projectiles keep their
    // launch speed until they expire at the world edge.
    if entity.kind != EntityKind::Projectile {
        entity.velocity.x *= physics.friction;
        entity.velocity.y *= physics.friction;
    }
    entity.velocity.x = entity
        .velocity
        .x
        .clamp(-bounds::VELOCITY_MAX, bounds::VELOCITY_MAX);
    entity.velocity.y = entity
        .velocity
        .y
        .clamp(-bounds::VELOCITY_MAX, bounds::VELOCITY_MAX);

    entity.position.x += entity.velocity.x * dt;
    entity.position.y += entity.velocity.y * dt;

    reflect_at_bounds(entity, physics.restitution, world);
}

/// Clamp the bounding box inside the world, reflecting the velocity
/// component that hit a wall.
pub fn reflect_at_bounds(entity: &mut Entity, restitution: f32, world: Vec2) {
    let hw = entity.size.x * 0.5;
    let hh = entity.size.y * 0.5;

    if entity.position.x < hw {
        entity.position.x = hw;
        entity.velocity.x = -entity.velocity.x * restitution;
    } else if entity.position.x > world.x - hw {
        entity.position.x = world.x - hw;
        entity.velocity.x = -entity.velocity.x * restitution;
    }
    if entity.position.y < hh {
        entity.position.y = hh;
        entity.velocity.y = -entity.velocity.y * restitution;
    } else if entity.position.y > world.y - hh {
        entity.position.y = world.y - hh;
        entity.velocity.y = -entity.velocity.y * restitution;
    }
}

/// Overlap test: circle-circle (sum of radii) when either collider is
/// a circle, axis-aligned box overlap otherwise.
pub fn overlaps(a: &Entity, b: &Entity) -> bool {
    let circular = a.collider.collider_type == ColliderType::Circle
        || b.collider.collider_type == ColliderType::Circle;
    if circular {
        let dx = a.position.x - b.position.x;
        let dy = a.position.y - b.position.y;
        let reach = a.radius() + b.radius();
        dx * dx + dy * dy <= reach * reach
    } else {
        let (a_min_x, a_min_y, a_max_x, a_max_y) = a.aabb();
        let (b_min_x, b_min_y, b_max_x, b_max_y) = b.aabb();
        a_min_x <= b_max_x && a_max_x >= b_min_x && a_min_y <= b_max_y && a_max_y >= b_min_y
    }
}

/// Response for a moving entity against a solid static collider:
/// velocity reflected at `-restitution`, position pushed out along the
/// center line so the pair does not re-collide next frame.
pub fn bounce_off_static(mover: &mut Entity, fixed: &Entity, restitution: f32) {
    let dx = mover.position.x - fixed.position.x;
    let dy = mover.position.y - fixed.position.y;
    let dist = (dx * dx + dy * dy).sqrt().max(1e-3);
    let nx = dx / dist;
    let ny = dy / dist;

    // Reflect velocity about the contact normal.
    let dot = mover.velocity.x * nx + mover.velocity.y * ny;
    if dot < 0.0 {
        mover.velocity.x = (mover.velocity.x - 2.0 * dot * nx) * restitution;
        mover.velocity.y = (mover.velocity.y - 2.0 * dot * ny) * restitution;
    }

    let reach = mover.radius() + fixed.radius();
    if dist < reach {
        mover.position.x = fixed.position.x + nx * reach;
        mover.position.y = fixed.position.y + ny * reach;
    }
}

/// Response for two solid dynamic entities: swap velocities, then
/// separate along the center line.
pub fn swap_velocities(a: &mut Entity, b: &mut Entity) {
    std::mem::swap(&mut a.velocity, &mut b.velocity);

    let dx = a.position.x - b.position.x;
    let dy = a.position.y - b.position.y;
    let dist = (dx * dx + dy * dy).sqrt().max(1e-3);
    let reach = a.radius() + b.radius();
    if dist < reach {
        let push = (reach - dist) * 0.5;
        a.position.x += dx / dist * push;
        a.position.y += dy / dist * push;
        b.position.x -= dx / dist * push;
        b.position.y -= dy / dist * push;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::entity::Collider;
    use approx::assert_relative_eq;

    fn ball(x: f32, y: f32, vx: f32, vy: f32) -> Entity {
        Entity {
            id: "b".to_string(),
            kind: EntityKind::Ball,
            position: Vec2::new(x, y),
            velocity: Vec2::new(vx, vy),
            size: Vec2::new(20.0, 20.0),
            rotation: 0.0,
            render: Default::default(),
            collider: Collider::solid_circle(),
            tags: Vec::new(),
        }
    }

    fn frictionless() -> PhysicsParams {
        PhysicsParams {
            gravity: Vec2::default(),
            friction: 1.0,
            restitution: 1.0,
            time_step: 1.0 / 60.0,
        }
    }

    #[test]
    fn integration_moves_by_velocity() {
        let mut e = ball(100.0, 100.0, 60.0, -30.0);
        integrate(&mut e, &frictionless(), Vec2::new(800.0, 600.0), 0.5);
        assert_relative_eq!(e.position.x, 130.0);
        assert_relative_eq!(e.position.y, 85.0);
    }

    #[test]
    fn gravity_accelerates_before_moving() {
        let mut e = ball(100.0, 100.0, 0.0, 0.0);
        let physics = PhysicsParams {
            gravity: Vec2::new(0.0, 100.0),
            ..frictionless()
        };
        integrate(&mut e, &physics, Vec2::new(800.0, 600.0), 1.0);
        // Semi-implicit: velocity updates first, position uses the new
        // velocity.
        assert_relative_eq!(e.velocity.y, 100.0);
        assert_relative_eq!(e.position.y, 200.0);
    }

    #[test]
    fn friction_damps_velocity() {
        let mut e = ball(400.0, 300.0, 100.0, 0.0);
        let physics = PhysicsParams {
            friction: 0.5,
            ..frictionless()
        };
        integrate(&mut e, &physics, Vec2::new(800.0, 600.0), 0.0);
        assert_relative_eq!(e.velocity.x, 50.0);
    }

    #[test]
    fn boundary_reflects_with_restitution() {
        let mut e = ball(12.0, 300.0, -100.0, 0.0);
        let physics = PhysicsParams {
            restitution: 0.8,
            ..frictionless()
        };
        integrate(&mut e, &physics, Vec2::new(800.0, 600.0), 0.1);
        assert_relative_eq!(e.position.x, 10.0); // clamped to half-size
        assert_relative_eq!(e.velocity.x, 80.0); // reflected and scaled
    }

    #[test]
    fn projectiles_keep_speed_under_friction() {
        let mut shot = ball(200.0, 300.0, 420.0, 0.0);
        shot.kind = EntityKind::Projectile;
        shot.collider.is_sensor = true;
        let physics = PhysicsParams {
            friction: 0.94,
            ..frictionless()
        };
        for _ in 0..60 {
            integrate(&mut shot, &physics, Vec2::new(1600.0, 600.0), 1.0 / 60.0);
        }
        assert_relative_eq!(shot.velocity.x, 420.0);
        assert!(shot.position.x > 600.0);
    }

    #[test]
    fn static_entities_do_not_integrate() {
        let mut e = ball(100.0, 100.0, 50.0, 50.0);
        e.collider.is_static = true;
        integrate(&mut e, &frictionless(), Vec2::new(800.0, 600.0), 1.0);
        assert_relative_eq!(e.position.x, 100.0);
    }

    #[test]
    fn circle_overlap_by_radius_sum() {
        let a = ball(100.0, 100.0, 0.0, 0.0);
        let b = ball(119.0, 100.0, 0.0, 0.0);
        assert!(overlaps(&a, &b));
        let c = ball(121.0, 100.0, 0.0, 0.0);
        assert!(!overlaps(&a, &c));
    }

    #[test]
    fn rect_overlap_when_neither_is_circle() {
        let mut a = ball(100.0, 100.0, 0.0, 0.0);
        let mut b = ball(115.0, 100.0, 0.0, 0.0);
        a.collider = Collider::static_rect();
        b.collider = Collider::static_rect();
        assert!(overlaps(&a, &b));
        b.position.x = 125.0;
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn bounce_reverses_approach_component() {
        let mut mover = ball(100.0, 100.0, 50.0, 0.0);
        let fixed = ball(112.0, 100.0, 0.0, 0.0);
        bounce_off_static(&mut mover, &fixed, 1.0);
        assert_relative_eq!(mover.velocity.x, -50.0);
        // Pushed out of overlap.
        assert!(mover.position.x <= fixed.position.x - 20.0);
    }

    #[test]
    fn swap_exchanges_velocities() {
        let mut a = ball(100.0, 100.0, 40.0, 0.0);
        let mut b = ball(118.0, 100.0, -20.0, 0.0);
        swap_velocities(&mut a, &mut b);
        assert_relative_eq!(a.velocity.x, -20.0);
        assert_relative_eq!(b.velocity.x, 40.0);
    }
}
