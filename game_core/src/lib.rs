pub mod components;
pub mod config;
pub mod director;
pub mod paths;
pub mod resources;
pub mod systems;

pub use components::*;
pub use config::*;
pub use director::*;
pub use paths::*;
pub use resources::*;
pub use systems::*;

use hecs::World;

/// Advance every tracked entity by one tick
pub fn step(world: &mut World, time: &Time, geometry: &dyn PathGeometry, events: &mut Events) {
    // Clear events at start of frame
    events.clear();

    follow_paths(world, time, geometry);
    gc(world, geometry, events);
}

/// Spawn a tracked entity fully formed: it is only ever observable with
/// its path, speed, owner and skin already assigned.
#[allow(clippy::too_many_arguments)]
pub fn create_tracked(
    world: &mut World,
    id: NetId,
    kind: EntityKind,
    skin: Skin,
    path: PathId,
    speed: f32,
    owner: u8,
    end: EndOfPath,
    geometry: &dyn PathGeometry,
) -> hecs::Entity {
    let transform = Transform::new(
        geometry.point_at_distance(path, 0.0, end),
        geometry.rotation_at_distance(path, 0.0, end),
    );
    world.spawn((
        id,
        kind,
        skin,
        PathFollower::new(path, speed, end),
        Owner(owner),
        transform,
    ))
}
