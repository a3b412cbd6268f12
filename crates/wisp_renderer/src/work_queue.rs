//! Row-band work orders and the lock-free queue that hands them out.
//!
//! The image is cut into bands of rows. Workers claim bands with a single
//! atomic increment; a claimed band belongs to exactly one worker, so its
//! pixels are written without further synchronization.

use std::sync::atomic::{AtomicU64, Ordering};

/// Default band height in rows.
pub const DEFAULT_ROWS_PER_ORDER: u32 = 8;

/// Multiplier applied to a band's row range to derive its RNG seed.
const SEED_MULTIPLIER: u32 = 19_937;

/// Mixes the end row into the seed so bands of different heights differ.
const SEED_ROW_PRIME: u32 = 7_919;

/// A band of image rows `[start_row, end_row)` to be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkOrder {
    pub start_row: u32,
    pub end_row: u32,
    pub sample_count: u32,
}

impl WorkOrder {
    pub fn new(start_row: u32, end_row: u32, sample_count: u32) -> Self {
        Self {
            start_row,
            end_row,
            sample_count,
        }
    }

    /// Number of rows in the band.
    pub fn row_count(&self) -> u32 {
        self.end_row - self.start_row
    }

    /// Seed for this band's random stream. Depends only on the row range,
    /// so a band renders identically whichever thread picks it up.
    pub fn seed(&self) -> u32 {
        SEED_MULTIPLIER.wrapping_mul(
            self.start_row
                .wrapping_add(self.end_row.wrapping_mul(SEED_ROW_PRIME)),
        )
    }
}

/// Split `height` rows into bands of `rows_per_order`, top to bottom.
///
/// Yields `ceil(height / rows_per_order)` bands; the last is shorter when the
/// height is not a multiple, so 90 rows at 8 per band make 11 full bands and
/// one of 2 rows.
pub fn generate_orders(height: u32, rows_per_order: u32, sample_count: u32) -> Vec<WorkOrder> {
    let rows_per_order = rows_per_order.max(1);
    (0..height)
        .step_by(rows_per_order as usize)
        .map(|start| WorkOrder::new(start, (start + rows_per_order).min(height), sample_count))
        .collect()
}

/// Shared queue of work orders with progress counters.
///
/// Counters only ever increase. `next_order_to_do` may run past the order
/// count; claims beyond it return `None`.
#[derive(Debug)]
pub struct WorkQueue {
    orders: Vec<WorkOrder>,
    next_order_to_do: AtomicU64,
    finished_order_count: AtomicU64,
    total_bounces_computed: AtomicU64,
}

impl WorkQueue {
    pub fn new(orders: Vec<WorkOrder>) -> Self {
        Self {
            orders,
            next_order_to_do: AtomicU64::new(0),
            finished_order_count: AtomicU64::new(0),
            total_bounces_computed: AtomicU64::new(0),
        }
    }

    pub fn orders(&self) -> &[WorkOrder] {
        &self.orders
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Claim the next unclaimed order, returning its index.
    ///
    /// Each index is returned at most once across all threads.
    #[inline]
    pub fn claim(&self) -> Option<(usize, WorkOrder)> {
        let index = self.next_order_to_do.fetch_add(1, Ordering::Relaxed) as usize;
        self.orders.get(index).map(|order| (index, *order))
    }

    /// Record a finished order and the bounces it traced.
    pub fn complete(&self, bounces: u64) {
        self.total_bounces_computed
            .fetch_add(bounces, Ordering::Relaxed);
        // Release pairs with the Acquire in `finished_count`, publishing the
        // order's pixels and bounce count to whoever sees it finished.
        self.finished_order_count.fetch_add(1, Ordering::Release);
    }

    pub fn finished_count(&self) -> u64 {
        self.finished_order_count.load(Ordering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.finished_count() >= self.orders.len() as u64
    }

    pub fn total_bounces(&self) -> u64 {
        self.total_bounces_computed.load(Ordering::Relaxed)
    }

    /// Fraction of orders finished, in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.orders.is_empty() {
            return 1.0;
        }
        self.finished_count() as f32 / self.orders.len() as f32
    }
}

/// Claim and run orders until the queue is drained.
///
/// `render` receives the order index and order and returns the bounces it
/// traced. Returns how many orders this worker completed.
pub fn run_worker<F>(queue: &WorkQueue, mut render: F) -> usize
where
    F: FnMut(usize, &WorkOrder) -> u64,
{
    let mut completed = 0;
    while let Some((index, order)) = queue.claim() {
        let bounces = render(index, &order);
        queue.complete(bounces);
        completed += 1;
    }
    completed
}
