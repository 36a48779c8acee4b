use std::sync::{
    Arc, Condvar, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, AtomicU8, Ordering},
};

use crate::{
    error::{MazeError, Result},
    generators::{BuildObserver, Builder},
    maze::Maze,
};

#[derive(Debug)]
enum Delivery {
    Pending,
    Delivered(Result<Arc<Maze>>),
}

#[derive(Debug)]
struct OrderInner {
    skill: u8,
    builder: Builder,
    perfect: bool,
    seed: Option<u64>,
    submitted: AtomicBool,
    cancelled: AtomicBool,
    progress: AtomicU8,
    delivery: Mutex<Delivery>,
    delivered: Condvar,
}

/// A request for one maze and the slot it is delivered into.
///
/// Clones share the same slot, so any clone can wait for the result and all
/// of them observe the same [`Maze`].
#[derive(Debug, Clone)]
pub struct Order {
    inner: Arc<OrderInner>,
}

impl Order {
    /// A new order for a maze of the given skill level. Without a seed the
    /// factory draws one from OS entropy; the maze records which.
    pub fn new(skill: u8, builder: Builder, perfect: bool, seed: Option<u64>) -> Self {
        Order {
            inner: Arc::new(OrderInner {
                skill,
                builder,
                perfect,
                seed,
                submitted: AtomicBool::new(false),
                cancelled: AtomicBool::new(false),
                progress: AtomicU8::new(0),
                delivery: Mutex::new(Delivery::Pending),
                delivered: Condvar::new(),
            }),
        }
    }

    pub fn skill(&self) -> u8 {
        self.inner.skill
    }

    pub fn builder(&self) -> Builder {
        self.inner.builder
    }

    pub fn is_perfect(&self) -> bool {
        self.inner.perfect
    }

    pub fn seed(&self) -> Option<u64> {
        self.inner.seed
    }

    /// Build progress in percent.
    pub fn progress(&self) -> u8 {
        self.inner.progress.load(Ordering::Relaxed)
    }

    /// Asks the factory to abandon this order. The order is then fulfilled
    /// with [`MazeError::Cancelled`] unless it was already delivered.
    pub fn cancel(&self) {
        // Under the delivery lock so it cannot slip between the check in
        // `deliver` and the publication
        let _delivery = self.lock_delivery();
        self.inner.cancelled.store(true, Ordering::Release);
    }

    pub fn is_delivered(&self) -> bool {
        matches!(*self.lock_delivery(), Delivery::Delivered(_))
    }

    /// Blocks until the factory delivers this order.
    pub fn wait(&self) -> Result<Arc<Maze>> {
        let guard = self.lock_delivery();
        let guard = self
            .inner
            .delivered
            .wait_while(guard, |d| matches!(d, Delivery::Pending))
            .unwrap_or_else(PoisonError::into_inner);
        match &*guard {
            Delivery::Delivered(result) => result.clone(),
            Delivery::Pending => unreachable!("wait_while returned on a pending order"),
        }
    }

    /// The delivered result, or `None` while the order is still being built.
    pub fn try_result(&self) -> Option<Result<Arc<Maze>>> {
        match &*self.lock_delivery() {
            Delivery::Pending => None,
            Delivery::Delivered(result) => Some(result.clone()),
        }
    }

    /// Whether two handles refer to the same order.
    pub fn same_order(&self, other: &Order) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Publishes the result of the build and wakes every waiter. Only the
    /// first delivery is kept, and a maze for a cancelled order is replaced
    /// by [`MazeError::Cancelled`].
    pub(crate) fn deliver(&self, result: Result<Maze>) -> Result<()> {
        let mut delivery = self.lock_delivery();
        if let Delivery::Delivered(_) = *delivery {
            return Err(MazeError::DoubleDelivery);
        }
        let result = match result {
            Ok(_) if self.is_cancelled() => Err(MazeError::Cancelled),
            result => result,
        };
        if result.is_ok() {
            self.inner.progress.store(100, Ordering::Relaxed);
        }
        *delivery = Delivery::Delivered(result.map(Arc::new));
        drop(delivery);
        self.inner.delivered.notify_all();
        Ok(())
    }

    /// Flags the order as submitted. Fails if it already was.
    pub(crate) fn mark_submitted(&self) -> Result<()> {
        if self.inner.submitted.swap(true, Ordering::AcqRel) {
            Err(MazeError::DoubleSubmission)
        } else {
            Ok(())
        }
    }

    /// Undoes [`Order::mark_submitted`] for an order the factory refused.
    pub(crate) fn unmark_submitted(&self) {
        self.inner.submitted.store(false, Ordering::Release);
    }

    fn lock_delivery(&self) -> MutexGuard<'_, Delivery> {
        self.inner
            .delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl BuildObserver for Order {
    fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    fn report_progress(&self, percent: u8) {
        self.inner.progress.store(percent, Ordering::Relaxed);
    }
}
