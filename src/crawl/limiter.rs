/// Fetch budget for frame crawling.
///
/// `fetched_count` never exceeds `max_fetches`: `record_fetch` refuses to
/// count past the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCrawlLimiter {
    fetched_count: usize,
    max_fetches: usize,
    max_depth: usize,
}

/// Why a frame fetch was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitReason {
    Depth,
    Budget,
}

impl FrameCrawlLimiter {
    pub fn new(max_fetches: usize, max_depth: usize) -> Self {
        Self {
            fetched_count: 0,
            max_fetches,
            max_depth,
        }
    }

    pub fn fetched_count(&self) -> usize {
        self.fetched_count
    }

    pub fn max_fetches(&self) -> usize {
        self.max_fetches
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn can_fetch_more(&self) -> bool {
        self.fetched_count < self.max_fetches
    }

    pub fn depth_allowed(&self, depth: usize) -> bool {
        depth <= self.max_depth
    }

    /// Count one attempted fetch, successful or not. Returns false (and
    /// counts nothing) once the budget is spent.
    pub fn record_fetch(&mut self) -> bool {
        if !self.can_fetch_more() {
            return false;
        }
        self.fetched_count += 1;
        true
    }

    /// Check depth, then budget, and record the fetch when both pass.
    pub fn try_acquire(&mut self, depth: usize) -> Result<(), LimitReason> {
        if !self.depth_allowed(depth) {
            return Err(LimitReason::Depth);
        }
        if !self.record_fetch() {
            return Err(LimitReason::Budget);
        }
        Ok(())
    }
}
