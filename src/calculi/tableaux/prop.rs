use super::{Connectedness, TableauxMove, TableauxState};
use crate::calculus::{replay, Calculus, CloseMessage};
use crate::error::Result;
use crate::logic::cnf::CnfStrategy;
use crate::logic::parse::parse_clauses_or_formula;
use serde::{Deserialize, Serialize};

pub type PropTableauxState = TableauxState<String>;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropTableauxParams {
    #[serde(rename = "type")]
    pub connectedness: Connectedness,
    pub regular: bool,
    pub backtracking: bool,
    pub cnf_strategy: CnfStrategy,
}

pub struct PropTableaux;

impl Calculus for PropTableaux {
    const IDENTIFIER: &'static str = "prop-tableaux";

    type Params = PropTableauxParams;
    type State = PropTableauxState;
    type Move = TableauxMove;

    fn parse_formula(formula: &str, params: Self::Params) -> Result<Self::State> {
        let clause_set = parse_clauses_or_formula(formula, params.cnf_strategy)?;
        Ok(TableauxState::new(
            clause_set,
            params.connectedness,
            params.regular,
            params.backtracking,
        ))
    }

    fn apply_move(state: Self::State, mv: Self::Move) -> Result<Self::State> {
        match mv {
            TableauxMove::Expand { id, clause } => {
                let leaf = state.node(id)?;
                let expansion = state.clause(clause)?.clone();
                let mut state = state.expand(leaf, expansion)?;
                state.record(mv);
                Ok(state)
            }
            TableauxMove::Close { id1, id2, .. } => {
                let leaf = state.node(id1)?;
                let partner = state.node(id2)?;
                let mut state = state.close(leaf, partner)?;
                state.record(mv);
                Ok(state)
            }
            TableauxMove::Undo => {
                let history = state.undo_history()?;
                replay::<Self>(state.fresh(), history)
            }
        }
    }

    fn check_close(state: &Self::State) -> CloseMessage {
        state.close_message()
    }
}
