use crate::statistics::Statistics;
use std::process::exit;

pub fn success() -> ! {
    exit(0)
}

pub fn failure() -> ! {
    exit(1)
}

/// Exit once a batch is answered: any rejected request fails the run.
pub fn finish(statistics: &Statistics) -> ! {
    if statistics.all_accepted() {
        success()
    } else {
        failure()
    }
}
