use log::info;
use std::sync::atomic::{AtomicU32, Ordering};

/// Counters shared by batch workers.
#[derive(Default)]
pub struct Statistics {
    requests: AtomicU32,
    accepted: AtomicU32,
    rejected: AtomicU32,
}

impl Statistics {
    pub fn requests(&self) -> u32 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn accepted(&self) -> u32 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u32 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn all_accepted(&self) -> bool {
        self.rejected() == 0
    }

    pub fn record(&self) {
        info!("requests: {}", self.requests());
        info!("accepted: {}", self.accepted());
        info!("rejected: {}", self.rejected());
    }

    pub fn increment_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }
}
