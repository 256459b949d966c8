//! Begin/end notifications and deferred edits

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::PhysicsConfig;
use crate::foundation::math::Vec3;
use crate::physics::{
    BodyHandle, CollisionEventKind, CollisionHandler, CollisionLayers, CollisionPeer, PhysicsObject, PhysicsSystem,
    PhysicsWorld, WorldCommands,
};

const DT: f32 = 1.0 / 60.0;

type Log = Rc<RefCell<Vec<(CollisionEventKind, String)>>>;

struct Recorder {
    log: Log,
}

impl CollisionHandler for Recorder {
    fn on_collision_begin(&mut self, _this: BodyHandle, other: CollisionPeer<'_>, _commands: &mut WorldCommands) {
        self.log.borrow_mut().push((CollisionEventKind::Begin, other.name.to_string()));
    }

    fn on_collision_end(&mut self, _this: BodyHandle, other: CollisionPeer<'_>, _commands: &mut WorldCommands) {
        self.log.borrow_mut().push((CollisionEventKind::End, other.name.to_string()));
    }
}

struct CoinCollector {
    score: Rc<RefCell<u32>>,
}

impl CollisionHandler for CoinCollector {
    fn on_collision_begin(&mut self, _this: BodyHandle, other: CollisionPeer<'_>, commands: &mut WorldCommands) {
        if other.layer.contains(CollisionLayers::PICKUP) {
            *self.score.borrow_mut() += 100;
            commands.remove_body(other.handle);
        }
    }
}

fn weightless() -> PhysicsSystem {
    PhysicsSystem::new(PhysicsConfig {
        use_gravity: false,
        ..Default::default()
    })
}

/// Sphere of radius 4 sunk half a unit into a floor whose top is at y = 2
fn sunk_sphere(world: &mut PhysicsWorld, log: &Log) -> BodyHandle {
    world.add_object(PhysicsObject::floor_aabb(Vec3::zeros(), Vec3::new(50.0, 2.0, 50.0)));
    world.add_object(
        PhysicsObject::sphere(Vec3::new(0.0, 5.5, 0.0), 4.0, 2.0)
            .with_name("Ball")
            .with_handler(Recorder { log: log.clone() }),
    )
}

#[test]
fn test_begin_then_end_after_separation() {
    let log = Log::default();
    let mut world = PhysicsWorld::with_seed(5);
    let mut system = weightless();
    let ball = sunk_sphere(&mut world, &log);

    system.update(&mut world, DT);
    assert_eq!(system.collisions().len(), 1);
    assert_eq!(system.collision_events().len(), 1);
    assert_eq!(system.collision_events()[0].kind, CollisionEventKind::Begin);
    assert_eq!(*log.borrow(), vec![(CollisionEventKind::Begin, "AABB Floor".to_string())]);

    // Pushed out to exactly touching, which no longer counts as overlap
    assert!((world.object(ball).unwrap().transform.position.y - 6.0).abs() < 1e-4);

    system.update(&mut world, DT);
    assert!(system.collisions().is_empty());
    assert_eq!(system.collision_events().len(), 1);
    assert_eq!(system.collision_events()[0].kind, CollisionEventKind::End);
    assert_eq!(log.borrow().len(), 2);
    assert_eq!(log.borrow()[1], (CollisionEventKind::End, "AABB Floor".to_string()));

    // Nothing more to report
    system.update(&mut world, DT);
    assert!(system.collision_events().is_empty());
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn test_continuing_contact_does_not_begin_twice() {
    let log = Log::default();
    let mut world = PhysicsWorld::with_seed(5);
    let mut system = weightless();
    let ball = sunk_sphere(&mut world, &log);

    system.update(&mut world, DT);
    world.object_mut(ball).unwrap().transform.position.y = 5.5;
    system.update(&mut world, DT);

    assert_eq!(system.collisions().len(), 1);
    assert!(system.collision_events().is_empty());
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn test_clear_forgets_cached_pairs() {
    let log = Log::default();
    let mut world = PhysicsWorld::with_seed(5);
    let mut system = weightless();
    let ball = sunk_sphere(&mut world, &log);

    system.update(&mut world, DT);
    system.clear();
    assert!(system.collisions().is_empty());
    assert!(system.collision_events().is_empty());
    assert_eq!(system.broad_phase().entity_count(), 0);

    world.object_mut(ball).unwrap().transform.position.y = 5.5;
    system.update(&mut world, DT);
    assert_eq!(system.collision_events().len(), 1);
    assert_eq!(system.collision_events()[0].kind, CollisionEventKind::Begin);
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn test_handler_removes_coin_after_the_frame() {
    let score = Rc::new(RefCell::new(0));
    let mut world = PhysicsWorld::with_seed(5);
    let mut system = weightless();

    let coin = world.add_object(
        PhysicsObject::sphere(Vec3::zeros(), 1.0, 0.0)
            .with_name("coin")
            .with_layers(CollisionLayers::PICKUP, CollisionLayers::PLAYER),
    );
    let player = world.add_object(
        PhysicsObject::sphere(Vec3::new(1.5, 0.0, 0.0), 1.0, 1.0)
            .with_name("player")
            .with_layers(CollisionLayers::PLAYER, CollisionLayers::all())
            .with_handler(CoinCollector { score: score.clone() }),
    );

    system.update(&mut world, DT);
    assert_eq!(*score.borrow(), 100);
    assert!(world.object(coin).is_none());
    assert!(world.object(player).is_some());
    assert_eq!(world.object_count(), 1);

    // The end of contact with a removed object is still reported, without a callback
    system.update(&mut world, DT);
    assert_eq!(system.collision_events().len(), 1);
    assert_eq!(system.collision_events()[0].kind, CollisionEventKind::End);
    assert_eq!(*score.borrow(), 100);
}

#[test]
fn test_masked_layers_never_notify() {
    let log = Log::default();
    let mut world = PhysicsWorld::with_seed(5);
    let mut system = weightless();

    world.add_object(
        PhysicsObject::sphere(Vec3::zeros(), 1.0, 1.0)
            .with_layers(CollisionLayers::ENEMY, CollisionLayers::ENVIRONMENT)
            .with_handler(Recorder { log: log.clone() }),
    );
    world.add_object(
        PhysicsObject::sphere(Vec3::new(1.0, 0.0, 0.0), 1.0, 1.0)
            .with_layers(CollisionLayers::ENEMY, CollisionLayers::ENVIRONMENT),
    );

    system.update(&mut world, DT);
    assert!(system.collisions().is_empty());
    assert!(log.borrow().is_empty());
}

#[derive(Default)]
struct Tally {
    begins: Rc<RefCell<u32>>,
    ends: Rc<RefCell<u32>>,
}

impl CollisionHandler for Tally {
    fn on_collision_begin(&mut self, _this: BodyHandle, _other: CollisionPeer<'_>, _commands: &mut WorldCommands) {
        *self.begins.borrow_mut() += 1;
    }

    fn on_collision_end(&mut self, _this: BodyHandle, _other: CollisionPeer<'_>, _commands: &mut WorldCommands) {
        *self.ends.borrow_mut() += 1;
    }
}

fn falling() -> PhysicsSystem {
    PhysicsSystem::new(PhysicsConfig {
        gravity: Vec3::new(0.0, -10.0, 0.0),
        ..Default::default()
    })
}

#[test]
fn test_ball_landing_during_integration_begins_once() {
    let tally = Tally::default();
    let (begins, ends) = (tally.begins.clone(), tally.ends.clone());
    let mut world = PhysicsWorld::with_seed(5);
    let mut system = falling();

    world.add_object(PhysicsObject::floor_aabb(Vec3::zeros(), Vec3::new(50.0, 2.0, 50.0)));
    // No restitution, so it lands and stays down
    world.add_object(
        PhysicsObject::sphere(Vec3::new(0.0, 50.0, 0.0), 4.0, 2.0)
            .with_surface(0.0, 0.4)
            .with_handler(tally),
    );

    let mut frames_in_contact = 0;
    for _ in 0..600 {
        system.update(&mut world, DT);
        if !system.collisions().is_empty() {
            frames_in_contact += 1;
        }
    }

    assert_eq!(*begins.borrow(), 1);
    assert_eq!(*ends.borrow(), 0);
    assert!(frames_in_contact > 400, "only {frames_in_contact} frames in contact");

    let resting = &system.collisions()[0].contacts[0];
    assert!(resting.accumulated_impulse > 0.0);
    assert!(resting.normal_mass > 0.0);
}

#[test]
fn test_player_falling_onto_coin_collects_it() {
    let score = Rc::new(RefCell::new(0));
    let mut world = PhysicsWorld::with_seed(5);
    let mut system = falling();

    let coin = world.add_object(
        PhysicsObject::sphere(Vec3::new(0.0, 4.0, 0.0), 1.5, 0.0)
            .with_name("coin")
            .with_layers(CollisionLayers::PICKUP, CollisionLayers::PLAYER),
    );
    world.add_object(
        PhysicsObject::sphere(Vec3::new(0.0, 20.0, 0.0), 2.0, 1.0)
            .with_name("player")
            .with_layers(CollisionLayers::PLAYER, CollisionLayers::all())
            .with_handler(CoinCollector { score: score.clone() }),
    );

    for _ in 0..300 {
        system.update(&mut world, DT);
    }

    assert_eq!(*score.borrow(), 100);
    assert!(world.object(coin).is_none());
}
