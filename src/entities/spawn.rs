use crate::math::Vec3;
use crate::mesh::CollisionMesh;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnTeam {
    T,
    Ct,
    Dm,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub position: Vec3,
    pub yaw: f32,
    pub team: SpawnTeam,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MapBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl MapBounds {
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
            p.z.clamp(self.min.z, self.max.z),
        )
    }
}

/// A loaded map: static world bounds, spawn list, and the collision mesh
/// with its BVH. Shared by reference across a room's lifetime — never
/// mutated after `MapData::load`.
#[derive(Clone)]
pub struct MapData {
    pub bounds: MapBounds,
    pub spawn_points: Vec<SpawnPoint>,
    pub mesh: CollisionMesh,
}

impl MapData {
    pub fn load(
        bounds: MapBounds,
        spawn_points: Vec<SpawnPoint>,
        raw_triangles: &[(Vec3, Vec3, Vec3)],
    ) -> Self {
        Self {
            bounds,
            spawn_points,
            mesh: CollisionMesh::build(raw_triangles),
        }
    }

    pub fn spawns_for(&self, team: SpawnTeam) -> impl Iterator<Item = (usize, &SpawnPoint)> {
        self.spawn_points
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.team == team)
    }
}
