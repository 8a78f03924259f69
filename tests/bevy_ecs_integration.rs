//! Bevy ECS Integration Tests
//!
//! These tests verify that bevy_ecs behaves as expected by the Rebound
//! engine. They serve as a compatibility layer to detect breaking changes
//! when upgrading bevy_ecs versions.
//!
//! # Test Categories
//!
//! 1. **World & Resources** - Resource insertion, retrieval, mutability
//! 2. **Entity & Component** - Spawning, despawning, component mutation
//! 3. **Query Patterns** - Iteration and direct world access from systems
//! 4. **Messages** - MessageWriter/MessageReader, drain, batch writes
//! 5. **Schedules** - Chained ordering, exclusive systems, SystemState
//!
//! # Usage
//!
//! Run these tests after upgrading bevy_ecs to detect API changes:
//!
//! ```sh
//! cargo test --test bevy_ecs_integration
//! ```

use bevy_ecs::message::Message;
use bevy_ecs::prelude::*;
use bevy_ecs::system::SystemState;

// =============================================================================
// Test Components, Resources, and Messages
// =============================================================================

#[derive(Component, Debug, Clone, PartialEq)]
struct Pos {
    x: f32,
    y: f32,
}

#[derive(Component, Debug, Clone, PartialEq)]
struct Vel {
    x: f32,
    y: f32,
}

#[derive(Component, Debug, Clone, PartialEq)]
struct Flag(bool);

#[derive(Resource, Debug, Default, PartialEq)]
struct Counter(i32);

#[derive(Resource, Debug, Clone, Copy)]
struct Delta(f32);

#[derive(Message, Debug, Clone, Copy, PartialEq)]
struct Contact {
    a: u32,
    b: u32,
}

// =============================================================================
// CATEGORY 1: World & Resources
// =============================================================================

#[test]
fn world_insert_and_read_resources() {
    let mut world = World::new();
    world.insert_resource(Counter(7));
    world.insert_resource(Delta(0.016));

    assert_eq!(world.resource::<Counter>().0, 7);
    assert!((world.resource::<Delta>().0 - 0.016).abs() < f32::EPSILON);
}

#[test]
fn world_init_resource_uses_default() {
    let mut world = World::new();
    world.init_resource::<Counter>();
    assert_eq!(world.resource::<Counter>().0, 0);
}

#[test]
fn world_resource_mut_and_into_inner() {
    let mut world = World::new();
    world.insert_resource(Counter(1));

    world.resource_mut::<Counter>().0 += 10;
    let inner: &mut Counter = world.resource_mut::<Counter>().into_inner();
    inner.0 += 100;

    assert_eq!(world.resource::<Counter>().0, 111);
}

#[test]
fn world_remove_resource() {
    let mut world = World::new();
    world.insert_resource(Counter(1));
    assert!(world.remove_resource::<Counter>().is_some());
    assert!(world.get_resource::<Counter>().is_none());
}

// =============================================================================
// CATEGORY 2: Entity & Component
// =============================================================================

#[test]
fn entity_spawn_get_and_despawn() {
    let mut world = World::new();

    let entity = world
        .spawn((Pos { x: 10.0, y: 20.0 }, Vel { x: 1.0, y: 2.0 }))
        .id();

    assert!(world.get_entity(entity).is_ok());
    assert!((world.get::<Pos>(entity).unwrap().x - 10.0).abs() < f32::EPSILON);

    world.despawn(entity);
    assert!(world.get_entity(entity).is_err());
    assert!(world.get::<Pos>(entity).is_none());
}

#[test]
fn entity_get_mut_component() {
    let mut world = World::new();
    let entity = world.spawn((Pos { x: 0.0, y: 0.0 },)).id();

    if let Some(mut pos) = world.get_mut::<Pos>(entity) {
        pos.x += 5.0;
    }

    assert!((world.get::<Pos>(entity).unwrap().x - 5.0).abs() < f32::EPSILON);
}

#[test]
fn component_clone_out_and_write_back() {
    // The pair resolver clones both bodies, mutates the copies, then writes
    // them back; verify the write-back pattern holds.
    let mut world = World::new();
    let entity = world.spawn((Pos { x: 1.0, y: 1.0 },)).id();

    let mut copy = world.get::<Pos>(entity).unwrap().clone();
    copy.x = 42.0;
    if let Some(mut slot) = world.get_mut::<Pos>(entity) {
        *slot = copy;
    }

    assert!((world.get::<Pos>(entity).unwrap().x - 42.0).abs() < f32::EPSILON);
}

// =============================================================================
// CATEGORY 3: Query Patterns
// =============================================================================

#[test]
fn query_iter_mut_from_system() {
    let mut world = World::new();
    world.insert_resource(Delta(0.5));
    let entity = world
        .spawn((Pos { x: 0.0, y: 0.0 }, Vel { x: 10.0, y: 0.0 }))
        .id();
    world.spawn((Pos { x: 5.0, y: 5.0 },)); // no velocity, must be skipped

    fn mover(mut query: Query<(&mut Pos, &Vel)>, delta: Res<Delta>) {
        for (mut pos, vel) in query.iter_mut() {
            pos.x += vel.x * delta.0;
            pos.y += vel.y * delta.0;
        }
    }

    let mut schedule = Schedule::default();
    schedule.add_systems(mover);
    schedule.run(&mut world);

    assert!((world.get::<Pos>(entity).unwrap().x - 5.0).abs() < f32::EPSILON);
}

#[test]
fn world_query_from_exclusive_context() {
    let mut world = World::new();
    world.spawn((Pos { x: 1.0, y: 0.0 },));
    world.spawn((Pos { x: 2.0, y: 0.0 },));

    let mut query = world.query::<(Entity, &Pos)>();
    let collected: Vec<f32> = query.iter(&world).map(|(_, pos)| pos.x).collect();
    assert_eq!(collected.len(), 2);
}

#[test]
fn optional_resource_parameter() {
    let mut world = World::new();
    world.insert_resource(Counter(0));

    fn bump_if_delta(delta: Option<Res<Delta>>, mut counter: ResMut<Counter>) {
        if delta.is_some() {
            counter.0 += 1;
        }
    }

    let mut schedule = Schedule::default();
    schedule.add_systems(bump_if_delta);
    schedule.run(&mut world);
    assert_eq!(world.resource::<Counter>().0, 0);

    world.insert_resource(Delta(0.016));
    let mut schedule = Schedule::default();
    schedule.add_systems(bump_if_delta);
    schedule.run(&mut world);
    assert_eq!(world.resource::<Counter>().0, 1);
}

// =============================================================================
// CATEGORY 4: Messages
// =============================================================================

#[test]
fn messages_write_and_read() {
    let mut world = World::new();
    world.init_resource::<Messages<Contact>>();

    {
        let mut state = SystemState::<MessageWriter<Contact>>::new(&mut world);
        let mut writer = state.get_mut(&mut world);
        writer.write(Contact { a: 1, b: 2 });
        writer.write_batch(vec![Contact { a: 3, b: 4 }, Contact { a: 5, b: 6 }]);
    }

    world.resource_mut::<Messages<Contact>>().update();

    {
        let mut state = SystemState::<MessageReader<Contact>>::new(&mut world);
        let mut reader = state.get_mut(&mut world);
        let contacts: Vec<_> = reader.read().copied().collect();
        assert_eq!(contacts.len(), 3);
        assert_eq!(contacts[0], Contact { a: 1, b: 2 });
    }
}

#[test]
fn messages_drain_empties_the_queue() {
    let mut world = World::new();
    world.init_resource::<Messages<Contact>>();

    {
        let mut state = SystemState::<MessageWriter<Contact>>::new(&mut world);
        let mut writer = state.get_mut(&mut world);
        writer.write(Contact { a: 1, b: 2 });
        writer.write(Contact { a: 3, b: 4 });
    }

    let drained: Vec<Contact> = world.resource_mut::<Messages<Contact>>().drain().collect();
    assert_eq!(drained.len(), 2);

    let again: Vec<Contact> = world.resource_mut::<Messages<Contact>>().drain().collect();
    assert!(again.is_empty());
}

#[test]
fn message_writer_as_system_param() {
    let mut world = World::new();
    world.init_resource::<Messages<Contact>>();
    world.spawn((Flag(true),));
    world.spawn((Flag(false),));

    fn reporter(query: Query<&Flag>, mut writer: MessageWriter<Contact>) {
        for flag in query.iter() {
            if flag.0 {
                writer.write(Contact { a: 0, b: 0 });
            }
        }
    }

    let mut schedule = Schedule::default();
    schedule.add_systems(reporter);
    schedule.run(&mut world);

    let drained: Vec<Contact> = world.resource_mut::<Messages<Contact>>().drain().collect();
    assert_eq!(drained.len(), 1);
}

// =============================================================================
// CATEGORY 5: Schedules & Ordering
// =============================================================================

#[test]
fn chained_systems_run_in_order() {
    let mut world = World::new();
    world.insert_resource(Counter(0));

    fn double(mut counter: ResMut<Counter>) {
        counter.0 *= 2;
    }
    fn add_three(mut counter: ResMut<Counter>) {
        counter.0 += 3;
    }

    // (0 + 3) * 2 = 6 only holds if the chain order is respected.
    let mut schedule = Schedule::default();
    schedule.add_systems((add_three, double).chain());
    schedule.run(&mut world);

    assert_eq!(world.resource::<Counter>().0, 6);
}

#[test]
fn exclusive_system_in_a_chain() {
    let mut world = World::new();
    world.insert_resource(Counter(0));

    fn normal(mut counter: ResMut<Counter>) {
        counter.0 += 1;
    }
    fn exclusive(world: &mut World) {
        let spawned = world.spawn((Pos { x: 0.0, y: 0.0 },)).id();
        assert!(world.get_entity(spawned).is_ok());
        world.resource_mut::<Counter>().0 += 10;
    }

    let mut schedule = Schedule::default();
    schedule.add_systems((normal, exclusive, normal).chain());
    schedule.run(&mut world);

    assert_eq!(world.resource::<Counter>().0, 12);
}

#[test]
fn schedule_initialize_then_run_repeatedly() {
    let mut world = World::new();
    world.insert_resource(Counter(0));

    fn bump(mut counter: ResMut<Counter>) {
        counter.0 += 1;
    }

    let mut schedule = Schedule::default();
    schedule.add_systems(bump);
    schedule
        .initialize(&mut world)
        .expect("schedule should initialize");

    for _ in 0..5 {
        schedule.run(&mut world);
    }
    assert_eq!(world.resource::<Counter>().0, 5);
}

#[test]
fn system_state_caches_across_calls() {
    let mut world = World::new();
    world.spawn((Pos { x: 1.0, y: 0.0 },));

    let mut state = SystemState::<Query<&Pos>>::new(&mut world);
    {
        let query = state.get(&world);
        assert_eq!(query.iter().count(), 1);
    }
    world.spawn((Pos { x: 2.0, y: 0.0 },));
    {
        let query = state.get(&world);
        assert_eq!(query.iter().count(), 2);
    }
}
