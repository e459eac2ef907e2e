use hecs::World;

use crate::components::{EntityKind, PathFollower, Transform};
use crate::paths::PathGeometry;
use crate::resources::Time;

/// Advance every path follower and rewrite its transform from the path
/// geometry. Hearts keep their spawn orientation.
pub fn follow_paths(world: &mut World, time: &Time, geometry: &dyn PathGeometry) {
    for (_entity, (follower, kind, transform)) in
        world.query_mut::<(&mut PathFollower, &EntityKind, &mut Transform)>()
    {
        follower.distance += follower.speed * time.dt;
        transform.pos = geometry.point_at_distance(follower.path, follower.distance, follower.end);
        if *kind != EntityKind::Heart {
            transform.rot =
                geometry.rotation_at_distance(follower.path, follower.distance, follower.end);
        }
    }
}
