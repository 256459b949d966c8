//! Headless physics demo
//!
//! Builds a small level (a dropped ball, a wrecking-ball chain, a piston, a
//! balancing platform and a collectable coin), steps it for a few seconds and
//! logs what happens. Pass a `.toml` or `.ron` physics config as the first
//! argument to override the defaults.

use std::cell::Cell;
use std::rc::Rc;

use rust_physics::config::PhysicsConfig;
use rust_physics::foundation::logging;
use rust_physics::foundation::math::{Vec2, Vec3};
use rust_physics::physics::{
    BalancingPlaneConstraint, BodyHandle, CollisionEventKind, CollisionHandler, CollisionLayers, CollisionPeer,
    ConstraintHandle, PhysicsObject, PhysicsSystem, PhysicsWorld, PistonConstraint, PositionConstraint,
    WorldCommands,
};
use rust_physics::picking::{Camera, Viewport};

const FRAME_TIME: f32 = 1.0 / 60.0;
const FRAMES: u32 = 600;

/// Player hook: picking up a coin scores and removes it
struct CoinCollector {
    score: Rc<Cell<u32>>,
}

impl CollisionHandler for CoinCollector {
    fn on_collision_begin(&mut self, _this: BodyHandle, other: CollisionPeer<'_>, commands: &mut WorldCommands) {
        if other.layer.contains(CollisionLayers::PICKUP) {
            self.score.set(self.score.get() + 100);
            log::info!("Collected '{}', score {}", other.name, self.score.get());
            commands.remove_body(other.handle);
        }
    }
}

struct Level {
    ball: BodyHandle,
    chain_end: BodyHandle,
    piston: ConstraintHandle,
    platform: ConstraintHandle,
}

fn build_level(world: &mut PhysicsWorld, score: &Rc<Cell<u32>>) -> Result<Level, Box<dyn std::error::Error>> {
    world.add_object(PhysicsObject::floor_aabb(Vec3::zeros(), Vec3::new(100.0, 2.0, 100.0)));
    world.add_object(PhysicsObject::floor_obb(
        Vec3::new(60.0, 10.0, 0.0),
        Vec3::new(0.0, 0.0, 20.0),
        Vec3::new(20.0, 1.0, 20.0),
    ));

    let ball = world.add_object(PhysicsObject::sphere(Vec3::new(0.0, 50.0, 0.0), 4.0, 2.0).with_name("Ball"));

    // Wrecking ball: a static anchor and six rods of cubes, released sideways
    let link_size = Vec3::new(5.0, 5.0, 5.0);
    let anchor_position = Vec3::new(-50.0, 120.0, 0.0);
    let mut previous = world.add_object(PhysicsObject::cube(anchor_position, link_size, 0.0).with_name("Anchor"));
    for i in 1..=6u8 {
        let position = anchor_position + Vec3::new(f32::from(i) * 15.0, 0.0, 0.0);
        let link = world.add_object(PhysicsObject::cube(position, link_size, 5.0).with_name(format!("Link {i}")));
        world.add_constraint(PositionConstraint::new(previous, link, 15.0))?;
        previous = link;
    }
    let chain_end = previous;

    let piston_rest = Vec3::new(-30.0, 6.0, 40.0);
    let piston_body = world.add_object(
        PhysicsObject::cube(piston_rest, Vec3::new(6.0, 1.0, 6.0), 1.0).with_name("Piston"),
    );
    let piston = world.add_constraint(
        PistonConstraint::new(piston_body, piston_rest, Vec3::y()).with_max_extension(20.0),
    )?;

    let platform_rest = Vec3::new(30.0, 8.0, 40.0);
    let platform_body = world.add_object(
        PhysicsObject::cube(platform_rest, Vec3::new(10.0, 1.0, 10.0), 1.0).with_name("Platform"),
    );
    let platform = world.add_constraint(BalancingPlaneConstraint::new(platform_body, platform_rest, Vec3::y()))?;

    world.add_object(
        PhysicsObject::sphere(Vec3::new(0.0, 4.0, -30.0), 1.5, 0.0)
            .with_name("Coin")
            .with_layers(CollisionLayers::PICKUP, CollisionLayers::PLAYER),
    );
    let mut player = PhysicsObject::sphere(Vec3::new(0.0, 20.0, -30.0), 2.0, 1.0)
        .with_name("Player")
        .with_layers(CollisionLayers::PLAYER, CollisionLayers::all())
        .with_handler(CoinCollector { score: score.clone() });
    player.body.linear_velocity = Vec3::new(0.0, -5.0, 0.0);
    world.add_object(player);

    Ok(Level {
        ball,
        chain_end,
        piston,
        platform,
    })
}

fn load_config() -> Result<PhysicsConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading physics config from {}", path);
            Ok(PhysicsConfig::load_validated(&path)?)
        }
        None => Ok(PhysicsConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_level(log::LevelFilter::Info);

    log::info!("Starting physics demo");

    let config = load_config()?;
    let mut world = PhysicsWorld::from_config(&config);
    let mut system = PhysicsSystem::new(config);
    let score = Rc::new(Cell::new(0));
    let level = build_level(&mut world, &score)?;

    log::info!(
        "Level built: {} objects, {} constraints",
        world.object_count(),
        world.constraint_count()
    );

    for frame in 0..FRAMES {
        if frame == 60 {
            world.constraint_input_mut().trigger(level.piston);
        }
        if (120..180).contains(&frame) {
            world.constraint_input_mut().steer(level.platform, Vec3::new(0.0, 0.0, 0.5));
        }

        system.update(&mut world, FRAME_TIME);

        for event in system.collision_events() {
            if event.kind == CollisionEventKind::Begin {
                let name = |handle| world.object(handle).map_or("<removed>", |o| o.name.as_str());
                log::debug!("'{}' hit '{}'", name(event.a), name(event.b));
            }
        }

        if frame % 60 == 0 {
            if let Some(ball) = world.object(level.ball) {
                log::info!(
                    "t={:.1}s ball y={:.2} vy={:.2}, {} contacts",
                    frame as f32 * FRAME_TIME,
                    ball.transform.position.y,
                    ball.body.linear_velocity.y,
                    system.collisions().len()
                );
            }
        }
    }

    if let Some(end) = world.object(level.chain_end) {
        log::info!("Wrecking ball settled at {:?}", end.transform.position);
    }

    // Pick whatever is in the middle of an 800x600 screen
    let camera = Camera::new(Vec3::new(0.0, 30.0, 120.0)).with_angles(-10.0, 0.0);
    let viewport = Viewport::new(800.0, 600.0);
    let ray = camera.build_ray(Vec2::new(400.0, 300.0), &viewport)?;
    match world.raycast(&ray, None) {
        Some(hit) => {
            let name = world.object(hit.entity).map_or("<unknown>", |o| o.name.as_str());
            log::info!("Picked '{}' at {:.1} units ({:?})", name, hit.distance, hit.point);
        }
        None => log::info!("Picking ray hit nothing"),
    }

    log::info!("Demo finished with score {}", score.get());
    Ok(())
}
