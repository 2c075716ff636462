use std::collections::HashMap;

/// One tick's worth of resolved LOS queries, keyed by (querying bot id,
/// candidate id). Built once per tick in `GameRunner::tick_bots` from a
/// single batched `LosPool::batch_line_of_sight` call rather than each bot
/// raycasting the mesh on its own.
#[derive(Debug, Default)]
pub struct LosCache {
    results: HashMap<(String, String), bool>,
}

impl LosCache {
    pub fn new() -> Self {
        Self { results: HashMap::new() }
    }

    pub fn insert(&mut self, from_id: &str, to_id: &str, visible: bool) {
        self.results.insert((from_id.to_string(), to_id.to_string()), visible);
    }

    /// A query that was never issued, or that timed out in the pool's
    /// watchdog window, degrades to "trust FOV alone" rather than blocking
    /// the bot's decision on a stale answer.
    pub fn is_visible(&self, from_id: &str, to_id: &str) -> bool {
        *self.results.get(&(from_id.to_string(), to_id.to_string())).unwrap_or(&true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entry_degrades_to_visible() {
        let cache = LosCache::new();
        assert!(cache.is_visible("bot1", "enemy1"));
    }

    #[test]
    fn recorded_entry_is_returned() {
        let mut cache = LosCache::new();
        cache.insert("bot1", "enemy1", false);
        assert!(!cache.is_visible("bot1", "enemy1"));
        assert!(cache.is_visible("bot1", "enemy2"));
    }
}
