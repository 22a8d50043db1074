use super::{Connectedness, TableauxMove, TableauxState};
use crate::calculus::{replay, Calculus, CloseMessage};
use crate::error::Result;
use crate::logic::cnf::first_order_cnf;
use crate::logic::parse::{parse_first_order, parse_substitution};
use crate::logic::term::{Relation, Substitution};
use crate::logic::unify::unify;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type FoTableauxState = TableauxState<Relation>;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FoTableauxParams {
    #[serde(rename = "type")]
    pub connectedness: Connectedness,
    pub regular: bool,
    pub backtracking: bool,
    pub manual_var_assign: bool,
}

impl TableauxState<Relation> {
    /// Apply `substitution` to every atom in the tree.
    fn instantiate(mut self, substitution: &Substitution) -> Self {
        for node in self.nodes.iter_mut() {
            if let Some(atom) = &mut node.atom {
                *atom = atom.instantiate(substitution);
            }
        }
        self
    }
}

pub struct FoTableaux;

impl Calculus for FoTableaux {
    const IDENTIFIER: &'static str = "fo-tableaux";

    type Params = FoTableauxParams;
    type State = FoTableauxState;
    type Move = TableauxMove;

    fn parse_formula(formula: &str, params: Self::Params) -> Result<Self::State> {
        let clause_set = first_order_cnf(&parse_first_order(formula)?)?;
        let mut state = TableauxState::new(
            clause_set,
            params.connectedness,
            params.regular,
            params.backtracking,
        );
        state.manual_var_assign = params.manual_var_assign;
        Ok(state)
    }

    fn apply_move(state: Self::State, mv: Self::Move) -> Result<Self::State> {
        match mv {
            TableauxMove::Expand { id, clause } => {
                let leaf = state.node(id)?;
                let expansion = state
                    .clause(clause)?
                    .with_suffix(state.expansion_counter + 1);
                let mut state = state.expand(leaf, expansion)?;
                state.record(mv);
                Ok(state)
            }
            TableauxMove::Close { id1, id2, var_assign } => close(state, id1, id2, var_assign),
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

/// Unify the two atoms, instantiate the whole tree and close. The history
/// keeps the unifier actually used so replay does not depend on params.
fn close(
    state: FoTableauxState,
    id1: usize,
    id2: usize,
    var_assign: Option<BTreeMap<String, String>>,
) -> Result<FoTableauxState> {
    let leaf = state.node(id1)?;
    let partner = state.node(id2)?;
    let (atom, other) = state.close_pair(leaf, partner)?;
    let unifier = match var_assign {
        Some(var_assign) => parse_substitution(&var_assign)?,
        None if state.manual_var_assign => {
            return Err(illegal_move!("Please specify a variable instantiation"))
        }
        None => unify(&atom.lit, &other.lit).map_err(|e| {
            illegal_move!("Could not unify '{}' and '{}': {}", atom, other, e)
        })?,
    };

    let mut state = state.instantiate(&unifier).close(leaf, partner)?;
    let var_assign = unifier
        .iter()
        .map(|(variable, term)| (variable.clone(), term.to_string()))
        .collect();
    state.record(TableauxMove::Close {
        id1,
        id2,
        var_assign: Some(var_assign),
    });
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::seal::ProtectedState;

    const FORMULA: &str = "\\all X: R(X) & !R(c)";

    fn params() -> FoTableauxParams {
        FoTableauxParams {
            backtracking: true,
            ..FoTableauxParams::default()
        }
    }

    fn expand(id: usize, clause: usize) -> TableauxMove {
        TableauxMove::Expand { id, clause }
    }

    fn close_with(id1: usize, id2: usize, pairs: &[(&str, &str)]) -> TableauxMove {
        let var_assign = pairs
            .iter()
            .map(|(variable, term)| (variable.to_string(), term.to_string()))
            .collect();
        TableauxMove::Close { id1, id2, var_assign: Some(var_assign) }
    }

    fn apply(state: FoTableauxState, moves: Vec<TableauxMove>) -> Result<FoTableauxState> {
        replay::<FoTableaux>(state, moves)
    }

    #[test]
    fn expansion_renames_variables() {
        let state = FoTableaux::parse_formula(FORMULA, params()).unwrap();
        let state = apply(state, vec![expand(0, 0), expand(1, 0)]).unwrap();
        let atom = |id: u32| state.nodes[Id::new(id)].atom.as_ref().unwrap().to_string();
        assert_eq!(atom(1), "R(X_1)");
        assert_eq!(atom(2), "R(X_2)");
    }

    #[test]
    fn close_instantiates_globally() {
        let state = FoTableaux::parse_formula(FORMULA, params()).unwrap();
        let moves = vec![
            expand(0, 0),
            expand(1, 1),
            TableauxMove::Close { id1: 2, id2: 1, var_assign: None },
        ];
        let state = apply(state, moves).unwrap();
        assert_eq!(state.nodes[Id::new(1)].atom.as_ref().unwrap().to_string(), "R(c)");
        assert!(FoTableaux::check_close(&state).closed);
        assert_eq!(state.move_history[2], close_with(2, 1, &[("X_1", "c")]));
    }

    #[test]
    fn caller_unifier() {
        let state = FoTableaux::parse_formula(FORMULA, params()).unwrap();
        let state = apply(state, vec![expand(0, 0), expand(1, 1)]).unwrap();
        assert!(apply(state.clone(), vec![close_with(2, 1, &[("X_1", "c")])]).is_ok());
        assert!(apply(state, vec![close_with(2, 1, &[("X_1", "d")])]).is_err());
    }

    #[test]
    fn close_rejects_clashing_constants() {
        let state = FoTableaux::parse_formula("R(d) & !R(c)", params()).unwrap();
        let state = apply(state, vec![expand(0, 0), expand(1, 1)]).unwrap();
        let mv = TableauxMove::Close { id1: 2, id2: 1, var_assign: None };
        let error = apply(state, vec![mv]).unwrap_err();
        assert_eq!(error.kind(), "IllegalMove");
        assert!(error.to_string().starts_with("Could not unify"));
    }

    #[test]
    fn manual_var_assign_requires_unifier() {
        let params = FoTableauxParams {
            manual_var_assign: true,
            ..params()
        };
        let state = FoTableaux::parse_formula(FORMULA, params).unwrap();
        let state = apply(state, vec![expand(0, 0), expand(1, 1)]).unwrap();
        let mv = TableauxMove::Close { id1: 2, id2: 1, var_assign: None };
        assert!(apply(state.clone(), vec![mv]).is_err());
        assert!(apply(state, vec![close_with(2, 1, &[("X_1", "c")])]).is_ok());
    }

    #[test]
    fn connectedness_uses_unification() {
        let params = FoTableauxParams {
            connectedness: Connectedness::StronglyConnected,
            ..params()
        };
        let state = FoTableaux::parse_formula("\\all X: (R(X) | Q(X)) & !R(c) & !P(c)", params)
            .unwrap();
        let state = apply(state, vec![expand(0, 0)]).unwrap();
        assert!(apply(state.clone(), vec![expand(1, 1)]).is_ok());
        assert!(apply(state, vec![expand(1, 2)]).is_err());
    }

    #[test]
    fn undo_restores_uninstantiated_tree() {
        let state = FoTableaux::parse_formula(FORMULA, params()).unwrap();
        let mut before = apply(state, vec![expand(0, 0), expand(1, 1)]).unwrap();
        let close = TableauxMove::Close { id1: 2, id2: 1, var_assign: None };
        let mut after = apply(before.clone(), vec![close, TableauxMove::Undo]).unwrap();
        assert_eq!(after.nodes[Id::new(1)].atom.as_ref().unwrap().to_string(), "R(X_1)");
        before.compute_seal();
        after.compute_seal();
        assert_eq!(before.seal, after.seal);
    }
}
