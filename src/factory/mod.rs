//! Background maze construction with single-delivery orders

mod order;

pub use order::Order;

use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        mpsc::{Receiver, Sender},
    },
    thread::JoinHandle,
};

use rand::Rng;

use crate::{
    config::{BusyPolicy, FactoryConfig},
    error::{MazeError, Result},
    generators::{Blueprint, BuildObserver, generate_maze},
    maze::Maze,
};

/// Orders that have been accepted but not yet delivered, oldest first.
type Backlog = Arc<Mutex<Vec<Order>>>;

/// What the worker runs for every order it takes off the channel.
type BuildFn = fn(&FactoryConfig, &Order) -> Result<Maze>;

fn lock(backlog: &Backlog) -> MutexGuard<'_, Vec<Order>> {
    backlog.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Builds mazes on a single background worker thread.
///
/// Orders are handed over with [`MazeFactory::order`] and fulfilled in
/// submission order; no two builds of the same factory ever run at once.
pub struct MazeFactory {
    config: Arc<FactoryConfig>,
    sender: Option<Sender<Order>>,
    worker: Option<JoinHandle<()>>,
    backlog: Backlog,
}

impl Default for MazeFactory {
    fn default() -> Self {
        Self::new(FactoryConfig::default())
    }
}

impl MazeFactory {
    pub fn new(config: FactoryConfig) -> Self {
        Self::with_build(config, build)
    }

    fn with_build(config: FactoryConfig, build: BuildFn) -> Self {
        let config = Arc::new(config);
        let backlog = Backlog::default();
        let (sender, receiver) = std::sync::mpsc::channel::<Order>();

        let worker = {
            let config = Arc::clone(&config);
            let backlog = Arc::clone(&backlog);
            std::thread::spawn(move || run_worker(&config, build, receiver, &backlog))
        };
        tracing::debug!("[factory] worker started");

        MazeFactory {
            config,
            sender: Some(sender),
            worker: Some(worker),
            backlog,
        }
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Submits an order for building.
    ///
    /// Fails with [`MazeError::DoubleSubmission`] if the order was submitted
    /// before, and with [`MazeError::FactoryBusy`] if another order is still
    /// pending and the factory rejects concurrent orders. A rejected order may
    /// be submitted again later.
    pub fn order(&self, order: &Order) -> Result<()> {
        order.mark_submitted()?;

        let mut backlog = lock(&self.backlog);
        if self.config.busy_policy == BusyPolicy::Reject && !backlog.is_empty() {
            order.unmark_submitted();
            tracing::debug!("[factory] rejected order, {} still pending", backlog.len());
            return Err(MazeError::FactoryBusy);
        }

        if let Err(e) = dispatch(self.sender.as_ref(), order) {
            order.unmark_submitted();
            return Err(e);
        }
        backlog.push(order.clone());

        let kind = if order.is_perfect() {
            "perfect"
        } else {
            "imperfect"
        };
        tracing::info!(
            "[factory] accepted order: skill {}, {}, {kind}",
            order.skill(),
            order.builder()
        );
        Ok(())
    }

    /// Blocks until `order` is delivered and returns its maze.
    pub fn wait_till_delivered(&self, order: &Order) -> Result<Arc<Maze>> {
        order.wait()
    }

    /// Cancels every order that is accepted but not delivered yet. Each of
    /// them is fulfilled with [`MazeError::Cancelled`]. Returns how many
    /// orders were cancelled.
    pub fn cancel(&self) -> usize {
        let backlog = lock(&self.backlog);
        for order in backlog.iter() {
            order.cancel();
        }
        if !backlog.is_empty() {
            tracing::info!("[factory] cancelled {} orders", backlog.len());
        }
        backlog.len()
    }

    /// Number of orders accepted but not delivered yet.
    pub fn pending(&self) -> usize {
        lock(&self.backlog).len()
    }
}

impl Drop for MazeFactory {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish the queue and exit
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("[factory] worker thread panicked");
            }
        }
        tracing::debug!("[factory] worker stopped");
    }
}

/// Hands an order to the worker thread.
fn dispatch(sender: Option<&Sender<Order>>, order: &Order) -> Result<()> {
    let sender = sender.ok_or(MazeError::WorkerStopped)?;
    sender
        .send(order.clone())
        .map_err(|_| MazeError::WorkerStopped)
}

fn run_worker(config: &FactoryConfig, build: BuildFn, jobs: Receiver<Order>, backlog: &Backlog) {
    loop {
        let order = match jobs.recv() {
            Ok(order) => order,
            Err(_) => {
                // Channel disconnected, the factory was dropped
                break;
            }
        };

        let result = match catch_unwind(AssertUnwindSafe(|| build(config, &order))) {
            Ok(result) => result,
            Err(payload) => Err(MazeError::WorkerPanicked(panic_message(payload.as_ref()))),
        };

        // Off the backlog before waking any waiter
        lock(backlog).retain(|o| !o.same_order(&order));
        if let Err(e) = order.deliver(result) {
            tracing::error!("[worker] {e}");
        }

        match order.try_result() {
            Some(Ok(maze)) => tracing::info!(
                "[worker] delivered {}x{} maze, seed {}, start {} at distance {}",
                maze.width(),
                maze.height(),
                maze.seed(),
                maze.start_position(),
                maze.distances().max_distance()
            ),
            Some(Err(e)) => tracing::warn!("[worker] order failed: {e}"),
            None => {}
        }
    }
    tracing::debug!("[worker] job channel closed, exiting");
}

fn build(config: &FactoryConfig, order: &Order) -> Result<Maze> {
    if order.is_cancelled() {
        return Err(MazeError::Cancelled);
    }
    let skill = config.skill(order.skill())?;
    let seed = order.seed().unwrap_or_else(|| rand::rng().random());
    let blueprint = Blueprint {
        width: skill.width,
        height: skill.height,
        builder: order.builder(),
        perfect: order.is_perfect(),
        rooms: skill.rooms,
        max_room_size: config.max_room_size,
        seed,
    };
    tracing::debug!("[worker] building {:?}", blueprint);
    generate_maze(&blueprint, order)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
