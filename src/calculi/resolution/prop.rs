use super::{hyper_resolvent, resolvent, AtomMap, ResolutionMove, ResolutionState};
use crate::calculus::{Calculus, CloseMessage};
use crate::clause::{Atom, Literal};
use crate::error::Result;
use crate::logic::cnf::CnfStrategy;
use crate::logic::parse::parse_clauses_or_formula;
use serde::{Deserialize, Serialize};

pub type PropResolutionState = ResolutionState<String>;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropResolutionParams {
    pub cnf_strategy: CnfStrategy,
    pub highlight_selectable: bool,
}

pub struct PropResolution;

impl Calculus for PropResolution {
    const IDENTIFIER: &'static str = "prop-resolution";

    type Params = PropResolutionParams;
    type State = PropResolutionState;
    type Move = ResolutionMove;

    fn parse_formula(formula: &str, params: Self::Params) -> Result<Self::State> {
        let clause_set = parse_clauses_or_formula(formula, params.cnf_strategy)?;
        Ok(ResolutionState::new(clause_set, params.highlight_selectable))
    }

    fn apply_move(mut state: Self::State, mv: Self::Move) -> Result<Self::State> {
        state.status_message = None;
        match mv {
            ResolutionMove::Resolve { c1, c2, literal } => {
                let literal = literal.as_deref().map(String::parse_literal).transpose()?;
                resolve(state, c1, c2, literal)
            }
            ResolutionMove::Hide { c1 } => state.hide(c1),
            ResolutionMove::Show => Ok(state.show()),
            ResolutionMove::Hyper { main, atom_map } => hyper(state, main, &atom_map),
            ResolutionMove::Factorize { c1, .. } => factorize(state, c1),
            _ => Err(illegal_move!("Unknown move type")),
        }
    }

    fn check_close(state: &Self::State) -> CloseMessage {
        state.close_message()
    }
}

fn resolve(
    mut state: PropResolutionState,
    c1: usize,
    c2: usize,
    literal: Option<String>,
) -> Result<PropResolutionState> {
    if c1 == c2 {
        return Err(illegal_move!("Both ids refer to the same clause"));
    }
    let first = state.clause(c1)?;
    let second = state.clause(c2)?;
    let opposed = |atom: &&Atom<String>| second.contains(&atom.complement());

    let atom = match literal {
        Some(literal) => first
            .atoms
            .iter()
            .filter(|atom| atom.lit == literal)
            .find(opposed)
            .ok_or_else(|| {
                illegal_move!(
                    "Clauses '{}' and '{}' do not contain '{}' in opposite polarity",
                    first,
                    second,
                    literal
                )
            })?,
        None => first.atoms.iter().find(opposed).ok_or_else(|| {
            illegal_move!(
                "Clauses '{}' and '{}' do not contain complementary atoms",
                first,
                second
            )
        })?,
    };

    let clause = resolvent(first, second, atom);
    state.push(clause);
    Ok(state)
}

fn hyper(
    mut state: PropResolutionState,
    main: usize,
    atom_map: &AtomMap,
) -> Result<PropResolutionState> {
    let (main, sides) = state.premisses(main, atom_map)?;
    let clause = hyper_resolvent(&main, &sides)?;
    state.push(clause);
    Ok(state)
}

fn factorize(mut state: PropResolutionState, c1: usize) -> Result<PropResolutionState> {
    let clause = state.clause(c1)?;
    if !clause.is_factorizable() {
        return Err(illegal_move!("Nothing to factorize"));
    }
    let factorized = clause.factorized();
    state.replace(c1, factorized);
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn start(formula: &str) -> PropResolutionState {
        PropResolution::parse_formula(formula, PropResolutionParams::default()).unwrap()
    }

    fn resolve(c1: usize, c2: usize, literal: &str) -> ResolutionMove {
        ResolutionMove::Resolve { c1, c2, literal: Some(literal.to_string()) }
    }

    #[test]
    fn resolve_to_empty_clause() {
        let state = start("a; !a");
        assert!(!PropResolution::check_close(&state).closed);

        let state = PropResolution::apply_move(state, resolve(0, 1, "a")).unwrap();
        assert_eq!(state.clause_set.len(), 3);
        assert!(state.clause_set.clauses[2].is_empty());
        assert_eq!(state.newest_node, Some(2));

        let close = PropResolution::check_close(&state);
        assert!(close.closed);
        assert_eq!(close.msg, "The proof is closed");
    }

    #[test]
    fn resolve_keeps_remainders() {
        let state = start("a, b, c; !a, c, d");
        let state = PropResolution::apply_move(state, resolve(0, 1, "a")).unwrap();
        assert_eq!(state.clause_set.clauses[2].to_string(), "{b, c, d}");
    }

    #[test]
    fn resolve_without_literal_finds_one() {
        let state = start("a, b; c, !b");
        let mv = ResolutionMove::Resolve { c1: 0, c2: 1, literal: None };
        let state = PropResolution::apply_move(state, mv).unwrap();
        assert_eq!(state.clause_set.clauses[2].to_string(), "{a, c}");
    }

    #[test]
    fn resolve_rejections() {
        let state = start("a, b; !a; c");
        assert!(PropResolution::apply_move(state.clone(), resolve(0, 0, "a")).is_err());
        assert!(PropResolution::apply_move(state.clone(), resolve(0, 1, "b")).is_err());
        assert!(PropResolution::apply_move(state.clone(), resolve(0, 2, "a")).is_err());
        assert!(PropResolution::apply_move(state, resolve(0, 7, "a")).is_err());
    }

    #[test]
    fn unknown_moves() {
        let state = start("a; !a");
        let mv = ResolutionMove::ResolveUnify { c1: 0, c2: 1, l1: 0, l2: 0 };
        let error = PropResolution::apply_move(state, mv).unwrap_err();
        assert_eq!(error.to_string(), "Unknown move type");
    }

    #[test]
    fn hide_and_show() {
        let state = start("a; b; c");
        let state = PropResolution::apply_move(state, ResolutionMove::Hide { c1: 1 }).unwrap();
        assert_eq!(state.clause_set.to_string(), "{a}, {c}");
        assert_eq!(state.hidden_clauses.to_string(), "{b}");

        let state = PropResolution::apply_move(state, ResolutionMove::Show).unwrap();
        assert_eq!(state.clause_set.to_string(), "{a}, {c}, {b}");
        assert!(state.hidden_clauses.is_empty());
    }

    #[test]
    fn factorize() {
        let state = start("a; a, b, c, a, b, c");
        let mv = ResolutionMove::Factorize { c1: 1, atoms: vec![] };
        let state = PropResolution::apply_move(state, mv).unwrap();
        assert_eq!(state.clause_set.len(), 2);
        assert_eq!(state.clause_set.clauses[1].to_string(), "{a, b, c}");
        assert_eq!(state.hidden_clauses.to_string(), "{a, b, c, a, b, c}");

        let state = start("a; b, b; c; d; e");
        let mv = ResolutionMove::Factorize { c1: 1, atoms: vec![] };
        let state = PropResolution::apply_move(state, mv).unwrap();
        assert_eq!(state.clause_set.clauses[1].to_string(), "{b}");
    }

    #[test]
    fn nothing_to_factorize() {
        let state = start("a, b");
        let mv = ResolutionMove::Factorize { c1: 0, atoms: vec![] };
        let error = PropResolution::apply_move(state, mv).unwrap_err();
        assert_eq!(error.to_string(), "Nothing to factorize");
    }

    #[test]
    fn hyper_resolution() {
        let state = start("!a, !b, c; a, d; b");
        let mut map = BTreeMap::new();
        map.insert(0, (1, 0));
        map.insert(1, (2, 0));
        let mv = ResolutionMove::Hyper { main: 0, atom_map: AtomMap(map) };
        let state = PropResolution::apply_move(state, mv).unwrap();
        assert_eq!(state.clause_set.clauses[3].to_string(), "{c, d}");
    }

    #[test]
    fn hyper_needs_positive_sides() {
        let state = start("!a, c; a, !d");
        let mut map = BTreeMap::new();
        map.insert(0, (1, 0));
        let mv = ResolutionMove::Hyper { main: 0, atom_map: AtomMap(map) };
        let error = PropResolution::apply_move(state, mv).unwrap_err();
        assert_eq!(error.to_string(), "Side premiss '{a, !d}' is not positive");

        let state = start("a; b");
        let mv = ResolutionMove::Hyper { main: 0, atom_map: AtomMap::default() };
        assert!(PropResolution::apply_move(state, mv).is_err());
    }

    #[test]
    fn formula_input() {
        let params = PropResolutionParams {
            cnf_strategy: CnfStrategy::Naive,
            highlight_selectable: true,
        };
        let state = PropResolution::parse_formula("(a | b) & !c", params).unwrap();
        assert_eq!(state.clause_set.to_string(), "{a, b}, {!c}");
        assert!(state.highlight_selectable);
    }
}
