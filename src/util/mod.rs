pub mod block;
pub mod id;
