use hecs::World;

use crate::components::{NetId, PathFollower};
use crate::paths::{EndOfPath, PathGeometry};
use crate::resources::Events;

/// Release followers that ran off the end of a stop-at-end path
pub fn gc(world: &mut World, geometry: &dyn PathGeometry, events: &mut Events) {
    let mut to_remove = Vec::new();

    for (entity, (follower, id)) in world.query::<(&PathFollower, &NetId)>().iter() {
        if follower.end == EndOfPath::Stop && follower.distance >= geometry.length(follower.path) {
            to_remove.push((entity, *id));
        }
    }

    for (entity, id) in to_remove {
        let _ = world.despawn(entity);
        events.path_completed.push(id);
    }
}

/// Release every tracked entity; used when the session ends
pub fn despawn_all(world: &mut World) {
    let entities: Vec<_> = world.query::<&NetId>().iter().map(|(e, _)| e).collect();
    for entity in entities {
        let _ = world.despawn(entity);
    }
}
