use super::worker::{LosQuery, Worker, WorkerRequest};
use crate::math::Vec3;
use crate::mesh::CollisionMesh;
use std::collections::HashMap;
use std::time::Duration;

/// Below this many queries the calling thread just computes synchronously;
/// spinning up cross-thread round trips for a handful of rays costs more
/// than it saves.
const SYNC_THRESHOLD: usize = 4;
const BATCH_TIMEOUT: Duration = Duration::from_secs(1);

/// Fixed-size pool of persistent LOS worker threads, sized 2..4 by
/// available parallelism. Each worker holds its own copy of the mesh;
/// `set_mesh` re-broadcasts a new copy to all of them on map change.
pub struct LosPool {
    workers: Vec<Worker>,
    mesh: CollisionMesh,
}

impl LosPool {
    pub fn new(mesh: CollisionMesh) -> Self {
        let count = num_cpus::get().clamp(2, 4);
        let workers = (0..count)
            .map(|id| Worker::spawn(id, mesh.clone()))
            .collect();
        Self { workers, mesh }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn set_mesh(&mut self, mesh: CollisionMesh) {
        for worker in &self.workers {
            worker.send(WorkerRequest::SetMesh(mesh.clone()));
        }
        self.mesh = mesh;
    }

    /// Returns, for every query index in `0..queries.len()`, whether the
    /// segment is unobstructed. Entries that don't come back within the 1s
    /// watchdog are simply absent from the map; `BotBrain` degrades to
    /// FOV-only visibility for those (§5: graceful degradation).
    pub fn batch_line_of_sight(&self, queries: &[(Vec3, Vec3)]) -> HashMap<usize, bool> {
        if queries.len() < SYNC_THRESHOLD || self.workers.is_empty() {
            return queries
                .iter()
                .enumerate()
                .map(|(i, (from, to))| (i, super::worker::line_of_sight(&self.mesh, *from, *to)))
                .collect();
        }

        let (reply_tx, reply_rx) = crossbeam_channel::unbounded();
        let n_workers = self.workers.len();
        let chunk = queries.len().div_ceil(n_workers);

        for (w, worker) in self.workers.iter().enumerate() {
            let start = w * chunk;
            if start >= queries.len() {
                break;
            }
            let end = (start + chunk).min(queries.len());
            let batch: Vec<LosQuery> = (start..end)
                .map(|i| (i, queries[i].0, queries[i].1))
                .collect();
            worker.send(WorkerRequest::Batch {
                queries: batch,
                reply: reply_tx.clone(),
            });
        }
        drop(reply_tx);

        let deadline = std::time::Instant::now() + BATCH_TIMEOUT;
        let mut results = HashMap::with_capacity(queries.len());
        while results.len() < queries.len() {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                log::warn!(
                    "LOS batch timed out with {}/{} results",
                    results.len(),
                    queries.len()
                );
                break;
            }
            match reply_rx.recv_timeout(remaining) {
                Ok((index, visible)) => {
                    results.insert(index, visible);
                }
                Err(_) => break,
            }
        }
        results
    }
}

impl Drop for LosPool {
    fn drop(&mut self) {
        for worker in self.workers.drain(..) {
            worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_mesh() -> CollisionMesh {
        CollisionMesh::build(&[
            (
                Vec3::new(-10.0, -10.0, 0.0),
                Vec3::new(10.0, -10.0, 0.0),
                Vec3::new(-10.0, 10.0, 0.0),
            ),
            (
                Vec3::new(10.0, -10.0, 0.0),
                Vec3::new(10.0, 10.0, 0.0),
                Vec3::new(-10.0, 10.0, 0.0),
            ),
        ])
    }

    #[test]
    fn small_batch_runs_synchronously() {
        let pool = LosPool::new(wall_mesh());
        let queries = vec![(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0))];
        let results = pool.batch_line_of_sight(&queries);
        assert_eq!(results.get(&0), Some(&false));
    }

    #[test]
    fn large_batch_dispatches_to_workers() {
        let pool = LosPool::new(wall_mesh());
        let queries: Vec<(Vec3, Vec3)> = (0..20)
            .map(|i| {
                let z = i as f32 * 0.1;
                (Vec3::new(0.0, z, -5.0), Vec3::new(0.0, z, 5.0))
            })
            .collect();
        let results = pool.batch_line_of_sight(&queries);
        assert_eq!(results.len(), 20);
        assert!(results.values().all(|v| !*v));
    }

    #[test]
    fn empty_mesh_is_always_visible() {
        let pool = LosPool::new(CollisionMesh::build(&[]));
        let queries: Vec<(Vec3, Vec3)> = (0..10)
            .map(|i| (Vec3::ZERO, Vec3::new(i as f32, 0.0, 0.0)))
            .collect();
        let results = pool.batch_line_of_sight(&queries);
        assert!(results.values().all(|v| *v));
    }
}
