use crate::types::{Configuration, SimulationResult};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Memoized sweeps, so carried-over elites and repeated children are not re-simulated
pub struct EvaluationCache {
    data: Mutex<HashMap<Configuration, SimulationResult>>,
    capacity: usize,
}

impl EvaluationCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Mutex::new(HashMap::with_capacity(capacity.min(4096))),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Configuration, SimulationResult>> {
        // Entries are inserted whole, so a poisoned map is still consistent
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &Configuration) -> Option<SimulationResult> {
        self.lock().get(key).cloned()
    }

    pub fn set(&self, key: Configuration, value: SimulationResult) {
        if self.capacity == 0 {
            return;
        }
        let mut data = self.lock();
        if data.len() >= self.capacity && !data.contains_key(&key) {
            // A simple eviction strategy: clear the cache when full.
            data.clear();
        }
        data.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
