pub mod batch;
pub mod exit;
pub mod log;
