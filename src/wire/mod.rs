pub(crate) mod logic;

use crate::calculus::Calculus;
use crate::error::{CalculusError, Result};
use crate::seal::ProtectedState;
use log::debug;

fn json_error(what: &str, message: impl std::fmt::Display) -> CalculusError {
    CalculusError::JsonParse(format!("Could not parse JSON {}: {}", what, message))
}

pub fn json_to_state<C: Calculus>(json: &str) -> Result<C::State> {
    let state: C::State = serde_json::from_str(json).map_err(|e| json_error("state", e))?;
    if !state.verify_seal() {
        return Err(json_error(
            "state",
            "Invalid tamper protection seal, state object appears to have been modified",
        ));
    }
    Ok(state)
}

pub fn state_to_json<C: Calculus>(mut state: C::State) -> Result<String> {
    state.compute_seal();
    serde_json::to_string(&state).map_err(|e| json_error("state", e))
}

pub fn json_to_move<C: Calculus>(json: &str) -> Result<C::Move> {
    serde_json::from_str(json).map_err(|e| json_error("move", e))
}

pub fn json_to_params<C: Calculus>(json: &str) -> Result<C::Params> {
    serde_json::from_str(json).map_err(|e| json_error("params", e))
}

/// Initial sealed state for `formula`.
pub fn parse<C: Calculus>(formula: &str, params: Option<&str>) -> Result<String> {
    let params = match params {
        Some(json) => json_to_params::<C>(json)?,
        None => C::Params::default(),
    };
    debug!("{}: parsing '{}'", C::IDENTIFIER, formula);
    state_to_json::<C>(C::parse_formula(formula, params)?)
}

pub fn apply_move<C: Calculus>(state: &str, mv: &str) -> Result<String> {
    let state = json_to_state::<C>(state)?;
    let mv = json_to_move::<C>(mv)?;
    debug!("{}: applying {:?}", C::IDENTIFIER, mv);
    state_to_json::<C>(C::apply_move(state, mv)?)
}

pub fn check_close<C: Calculus>(state: &str) -> Result<String> {
    let state = json_to_state::<C>(state)?;
    let message = C::check_close(&state);
    serde_json::to_string(&message).map_err(|e| json_error("close message", e))
}
