use super::{SequentMove, SequentState};
use crate::calculus::{Calculus, CloseMessage};
use crate::error::Result;
use crate::logic::parse::{parse_sequent, Logic};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SequentParams {
    pub show_only_applicable_rules: bool,
}

pub struct PropSequent;

impl Calculus for PropSequent {
    const IDENTIFIER: &'static str = "prop-sequent";

    type Params = SequentParams;
    type State = SequentState;
    type Move = SequentMove;

    fn parse_formula(formula: &str, params: Self::Params) -> Result<Self::State> {
        let (left, right) = parse_sequent(formula, Logic::Propositional)?;
        Ok(SequentState::new(left, right, params.show_only_applicable_rules))
    }

    fn apply_move(state: Self::State, mv: Self::Move) -> Result<Self::State> {
        state.apply::<Self>(mv, false)
    }

    fn check_close(state: &Self::State) -> CloseMessage {
        state.close_message("propositional")
    }
}
