#[macro_use]
pub mod error;

pub mod calculi;
pub mod calculus;
pub mod clause;
pub mod io;
pub mod logic;
mod prelude;
pub mod seal;
pub mod statistics;
pub mod util;
pub mod wire;

pub use crate::calculus::{Calculus, CloseMessage};
pub use crate::error::{CalculusError, Result};
