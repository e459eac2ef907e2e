use glam::{Quat, Vec3};

/// One of the three parallel spawn lanes in a player's play space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    Left,
    Mid,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Mid, Lane::Right];

    /// Draw a lane uniformly
    pub fn random(rng: &mut crate::GameRng) -> Lane {
        use rand::Rng;
        Lane::ALL[rng.0.gen_range(0..3)]
    }

    pub fn index(self) -> u8 {
        match self {
            Lane::Left => 0,
            Lane::Mid => 1,
            Lane::Right => 2,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Lane::Left),
            1 => Some(Lane::Mid),
            2 => Some(Lane::Right),
            _ => None,
        }
    }
}

/// What a follower does once it reaches the end of its path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfPath {
    Stop,
    Loop,
    Reverse,
}

/// One of the six spawn paths: three lanes on each player's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathId {
    pub lane: Lane,
    pub side: u8, // 0 = authority's play space, 1 = mirrored
}

impl PathId {
    pub fn new(lane: Lane, side: u8) -> Self {
        Self { lane, side }
    }
}

/// Spline math lives outside the core; the simulation only asks for
/// positions and rotations at a distance along a named path.
pub trait PathGeometry {
    fn point_at_distance(&self, path: PathId, distance: f32, end: EndOfPath) -> Vec3;
    fn rotation_at_distance(&self, path: PathId, distance: f32, end: EndOfPath) -> Quat;
    /// Total arc length of the path
    fn length(&self, path: PathId) -> f32;
}

/// Map a raw travelled distance onto a path of length `len` under the
/// given end-of-path policy.
pub fn resolve_distance(distance: f32, len: f32, end: EndOfPath) -> f32 {
    if len <= 0.0 {
        return 0.0;
    }
    match end {
        EndOfPath::Stop => distance.clamp(0.0, len),
        EndOfPath::Loop => distance.rem_euclid(len),
        EndOfPath::Reverse => {
            let cycle = distance.rem_euclid(2.0 * len);
            if cycle <= len {
                cycle
            } else {
                2.0 * len - cycle
            }
        }
    }
}

/// Straight-line stand-in for the spline paths: every path descends from a
/// shared spawn height toward its player, lanes fanned out on the X axis,
/// the mirrored side flipped on Z.
#[derive(Debug, Clone)]
pub struct LinePaths {
    pub length: f32,
    pub lane_spacing: f32,
}

impl LinePaths {
    pub fn new(length: f32) -> Self {
        Self {
            length,
            lane_spacing: 1.5,
        }
    }

    fn start(&self, path: PathId) -> Vec3 {
        let x = (path.lane.index() as f32 - 1.0) * self.lane_spacing;
        let z = if path.side == 0 { 1.0 } else { -1.0 };
        Vec3::new(x, self.length, z)
    }
}

impl Default for LinePaths {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl PathGeometry for LinePaths {
    fn point_at_distance(&self, path: PathId, distance: f32, end: EndOfPath) -> Vec3 {
        let d = resolve_distance(distance, self.length, end);
        self.start(path) - Vec3::new(0.0, d, 0.0)
    }

    fn rotation_at_distance(&self, _path: PathId, _distance: f32, _end: EndOfPath) -> Quat {
        // Straight descent: constant facing
        Quat::IDENTITY
    }

    fn length(&self, _path: PathId) -> f32 {
        self.length
    }
}
