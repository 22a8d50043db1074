use crate::error::Result;
use crate::seal::ProtectedState;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of checking whether a proof is finished.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseMessage {
    pub closed: bool,
    pub msg: String,
}

impl CloseMessage {
    pub fn new<S: Into<String>>(closed: bool, msg: S) -> Self {
        let msg = msg.into();
        Self { closed, msg }
    }
}

/// A proof calculus: a way to build an initial proof state from a formula
/// and a set of moves transforming it.
///
/// States are values: `apply_move` consumes the state and returns the
/// successor, or an error leaving the caller's last good state in place.
pub trait Calculus {
    const IDENTIFIER: &'static str;

    type Params: DeserializeOwned + Default;
    type State: ProtectedState + Serialize + DeserializeOwned;
    type Move: Serialize + DeserializeOwned + Clone + fmt::Debug;

    fn parse_formula(formula: &str, params: Self::Params) -> Result<Self::State>;

    fn apply_move(state: Self::State, mv: Self::Move) -> Result<Self::State>;

    fn check_close(state: &Self::State) -> CloseMessage;
}

/// Rebuild a state by applying `moves` in order to `initial`.
pub fn replay<C: Calculus>(initial: C::State, moves: Vec<C::Move>) -> Result<C::State> {
    moves.into_iter().try_fold(initial, C::apply_move)
}
