use std::sync::mpsc::{self, Receiver, SyncSender};

use anyhow::{anyhow, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::graph::OpKind;
use crate::runtime::exec_op;
use crate::tensor::Tensor;

/// Background producer feeding a bounded queue.
///
/// At most `depth` elements are produced ahead of the consumer: `depth - 1`
/// wait in the queue and one is held by the producer while it blocks on a
/// full queue. Elements are delivered in the order they were produced.
/// The producer stops after its first error or once the `Prefetcher` is
/// dropped.
pub struct Prefetcher {
    // Declared before `pool` so the channel disconnects before the pool is
    // torn down, which unblocks a producer waiting on a full queue.
    rx: Receiver<Result<Tensor>>,
    _pool: ThreadPool,
    depth: usize,
    delivered: usize,
}

impl std::fmt::Debug for Prefetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prefetcher")
            .field("depth", &self.depth)
            .field("delivered", &self.delivered)
            .finish()
    }
}

impl Prefetcher {
    /// Start producing with `produce(index)` for index 0, 1, 2, ...
    pub fn spawn<F>(depth: usize, produce: F) -> Result<Self>
    where
        F: FnMut(usize) -> Result<Tensor> + Send + 'static,
    {
        if depth == 0 {
            return Err(anyhow!("prefetch depth must be positive"));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(1)
            .thread_name(|idx| format!("axpybench-prefetch-{}", idx))
            .build()
            .map_err(|err| anyhow!("failed to build prefetch threadpool: {}", err))?;
        // The producer holds one finished element while blocked on send.
        let (tx, rx) = mpsc::sync_channel(depth - 1);
        pool.spawn(move || produce_loop(tx, produce));
        Ok(Self {
            rx,
            _pool: pool,
            depth,
            delivered: 0,
        })
    }

    /// Repeating dataset over `elements`, each passed through `stages`.
    pub fn dataset(elements: Vec<Tensor>, stages: Vec<OpKind>, depth: usize) -> Result<Self> {
        if elements.is_empty() {
            return Err(anyhow!("dataset has no elements"));
        }
        Self::spawn(depth, move |index| {
            let mut value = elements[index % elements.len()].clone();
            for stage in &stages {
                value = exec_op(*stage, &[&value])?;
            }
            Ok(value)
        })
    }

    /// Block until the next element is available.
    pub fn next(&mut self) -> Result<Tensor> {
        let item = self
            .rx
            .recv()
            .map_err(|_| anyhow!("prefetch producer stopped after {} elements", self.delivered))?;
        let value = item?;
        self.delivered += 1;
        Ok(value)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Elements handed out so far.
    pub fn delivered(&self) -> usize {
        self.delivered
    }
}

fn produce_loop<F>(tx: SyncSender<Result<Tensor>>, mut produce: F)
where
    F: FnMut(usize) -> Result<Tensor>,
{
    crate::trace!(
        "prefetch.start thread={:?}",
        std::thread::current().id()
    );
    let mut index = 0usize;
    loop {
        let item = produce(index);
        let failed = item.is_err();
        if tx.send(item).is_err() || failed {
            break;
        }
        index += 1;
    }
    crate::trace!("prefetch.end produced={}", index);
}
