use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use anyhow::Result;

use super::executable::{Executable, Signature};

/// Executables keyed by signature, evicted least-recently-used first.
#[derive(Debug)]
pub struct ExecutableCache {
    depth: usize,
    entries: HashMap<Signature, Arc<Executable>>,
    // Most recently used at the front.
    lru: VecDeque<Signature>,
}

impl ExecutableCache {
    pub fn new(depth: usize) -> Self {
        Self {
            depth: depth.max(1),
            entries: HashMap::new(),
            lru: VecDeque::new(),
        }
    }

    /// Look up `signature`, compiling on a miss. Returns the executable and
    /// whether it was a cache hit.
    pub fn get_or_compile<F>(&mut self, signature: &Signature, compile: F) -> Result<(Arc<Executable>, bool)>
    where
        F: FnOnce() -> Result<Executable>,
    {
        if let Some(exec) = self.entries.get(signature) {
            let exec = Arc::clone(exec);
            self.touch(signature);
            crate::trace!("compilation cache hit: {}", signature.as_str());
            return Ok((exec, true));
        }

        crate::trace!("compilation cache miss: {}", signature.as_str());
        let exec = Arc::new(compile()?);
        if self.entries.len() >= self.depth {
            if let Some(evicted) = self.lru.pop_back() {
                if let Some(old) = self.entries.remove(&evicted) {
                    crate::trace!(
                        "evicted executable {} ({} constant bytes freed)",
                        evicted.as_str(),
                        old.constant_bytes()
                    );
                }
            }
        }
        self.entries.insert(signature.clone(), Arc::clone(&exec));
        self.lru.push_front(signature.clone());
        Ok((exec, false))
    }

    fn touch(&mut self, signature: &Signature) {
        if self.lru.front() == Some(signature) {
            return;
        }
        self.lru.retain(|entry| entry != signature);
        self.lru.push_front(signature.clone());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn contains(&self, signature: &Signature) -> bool {
        self.entries.contains_key(signature)
    }
}
