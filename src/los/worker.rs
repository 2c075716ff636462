use crate::math::Vec3;
use crate::mesh::CollisionMesh;
use crossbeam_channel::{Receiver, Sender};

/// One query in a batch: its slot index (so results can be reassembled out
/// of order across workers) plus the two endpoints of the segment.
pub type LosQuery = (usize, Vec3, Vec3);

pub enum WorkerRequest {
    SetMesh(CollisionMesh),
    Batch {
        queries: Vec<LosQuery>,
        reply: Sender<(usize, bool)>,
    },
}

/// A persistent OS thread holding its own copy of the collision mesh.
/// Receives typed requests over a channel; never mutates shared state.
pub struct Worker {
    tx: Sender<WorkerRequest>,
    handle: std::thread::JoinHandle<()>,
}

impl Worker {
    pub fn spawn(id: usize, mesh: CollisionMesh) -> Self {
        let (tx, rx): (Sender<WorkerRequest>, Receiver<WorkerRequest>) = crossbeam_channel::unbounded();
        let handle = std::thread::Builder::new()
            .name(format!("los-worker-{id}"))
            .spawn(move || Self::run(mesh, rx))
            .expect("spawn LOS worker thread");
        Self { tx, handle }
    }

    fn run(mut mesh: CollisionMesh, rx: Receiver<WorkerRequest>) {
        while let Ok(request) = rx.recv() {
            match request {
                WorkerRequest::SetMesh(new_mesh) => mesh = new_mesh,
                WorkerRequest::Batch { queries, reply } => {
                    for (index, from, to) in queries {
                        let visible = line_of_sight(&mesh, from, to);
                        // The other side may have stopped listening after a
                        // watchdog timeout; a send failure there is fine.
                        let _ = reply.send((index, visible));
                    }
                }
            }
        }
    }

    pub fn send(&self, request: WorkerRequest) {
        let _ = self.tx.send(request);
    }

    pub fn join(self) {
        drop(self.tx);
        let _ = self.handle.join();
    }
}

/// Ray-triangle visibility test with an AABB precheck against the query
/// segment: early-out false on the first hit strictly between `eps` and
/// `dist - 0.1` so the ray doesn't register the target itself as an
/// occluder.
pub fn line_of_sight(mesh: &CollisionMesh, from: Vec3, to: Vec3) -> bool {
    let delta = to - from;
    let dist = delta.length();
    if dist < 1e-6 {
        return true;
    }
    mesh.raycast(from, delta, (dist - 0.1).max(0.0)).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synchronous_los_matches_direct_mesh_query() {
        let mesh = CollisionMesh::build(&[
            (
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ),
            (
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ),
        ]);
        assert!(!line_of_sight(&mesh, Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0)));
        assert!(line_of_sight(&mesh, Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0)));
    }
}
