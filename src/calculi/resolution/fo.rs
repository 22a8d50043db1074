use super::{hyper_resolvent, resolvent, AtomMap, ResolutionMove, ResolutionState};
use crate::calculus::{Calculus, CloseMessage};
use crate::clause::{Clause, Literal};
use crate::error::Result;
use crate::logic::cnf::first_order_cnf;
use crate::logic::parse::{parse_first_order, parse_substitution};
use crate::logic::term::{Relation, Substitution};
use crate::logic::unify::{is_mgu_or_not_unifiable, unify, unify_all};
use serde::{Deserialize, Serialize};

pub type FoResolutionState = ResolutionState<Relation>;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FoResolutionParams {
    pub highlight_selectable: bool,
}

pub struct FoResolution;

impl Calculus for FoResolution {
    const IDENTIFIER: &'static str = "fo-resolution";

    type Params = FoResolutionParams;
    type State = FoResolutionState;
    type Move = ResolutionMove;

    fn parse_formula(formula: &str, params: Self::Params) -> Result<Self::State> {
        let clause_set = first_order_cnf(&parse_first_order(formula)?)?;
        Ok(ResolutionState::new(clause_set, params.highlight_selectable))
    }

    fn apply_move(mut state: Self::State, mv: Self::Move) -> Result<Self::State> {
        state.status_message = None;
        match mv {
            ResolutionMove::Resolve { c1, c2, literal } => {
                let literal = literal.as_deref().map(Relation::parse_literal).transpose()?;
                resolve(state, c1, c2, literal)
            }
            ResolutionMove::ResolveUnify { c1, c2, l1, l2 } => {
                resolve_unify(state, c1, c2, l1, l2, None)
            }
            ResolutionMove::ResolveCustom { c1, c2, l1, l2, var_assign } => {
                let unifier = parse_substitution(&var_assign)?;
                resolve_unify(state, c1, c2, l1, l2, Some(unifier))
            }
            ResolutionMove::Instantiate { c1, var_assign } => {
                let substitution = parse_substitution(&var_assign)?;
                let instance = state.clause(c1)?.instantiate(&substitution);
                state.push(instance);
                Ok(state)
            }
            ResolutionMove::Hide { c1 } => state.hide(c1),
            ResolutionMove::Show => Ok(state.show()),
            ResolutionMove::Hyper { main, atom_map } => hyper(state, main, &atom_map),
            ResolutionMove::Factorize { c1, atoms } => factorize(state, c1, &atoms),
        }
    }

    fn check_close(state: &Self::State) -> CloseMessage {
        state.close_message()
    }
}

/// Resolve on the first complementary pair that unifies, restricted to
/// atoms equal to `literal` when one is given.
fn resolve(
    state: FoResolutionState,
    c1: usize,
    c2: usize,
    literal: Option<Relation>,
) -> Result<FoResolutionState> {
    if c1 == c2 {
        return Err(illegal_move!("Both ids refer to the same clause"));
    }
    let first = state.clause(c1)?;
    let second = state.clause(c2)?;
    let selected = |relation: &Relation| literal.as_ref().map_or(true, |lit| lit == relation);

    let mut pair = None;
    'search: for (l1, left) in first.atoms.iter().enumerate() {
        for (l2, right) in second.atoms.iter().enumerate() {
            let candidate = left.negated != right.negated
                && selected(&left.lit)
                && selected(&right.lit)
                && unify(&left.lit, &right.lit).is_ok();
            if candidate {
                pair = Some((l1, l2));
                break 'search;
            }
        }
    }

    match pair {
        Some((l1, l2)) => resolve_unify(state, c1, c2, l1, l2, None),
        None => Err(illegal_move!(
            "Clauses '{}' and '{}' contain no unifiable complementary atoms",
            first,
            second
        )),
    }
}

fn resolve_unify(
    mut state: FoResolutionState,
    c1: usize,
    c2: usize,
    l1: usize,
    l2: usize,
    unifier: Option<Substitution>,
) -> Result<FoResolutionState> {
    if c1 == c2 {
        return Err(illegal_move!("Both ids refer to the same clause"));
    }
    let left = state.atom(c1, l1)?;
    let right = state.atom(c2, l2)?;
    if left.negated == right.negated {
        return Err(illegal_move!(
            "Atoms '{}' and '{}' do not have opposite polarity",
            left,
            right
        ));
    }

    let (unifier, general) = match unifier {
        Some(unifier) => {
            let general = is_mgu_or_not_unifiable(&unifier, &left.lit, &right.lit);
            (unifier, general)
        }
        None => (unify_or_reject(&left.lit, &right.lit)?, true),
    };

    let literal = left.instantiate(&unifier);
    let other = right.instantiate(&unifier);
    if literal.lit != other.lit {
        return Err(illegal_move!(
            "The unifier does not make '{}' and '{}' equal",
            left,
            right
        ));
    }

    let first = state.clause(c1)?.instantiate(&unifier);
    let second = state.clause(c2)?.instantiate(&unifier);
    let id = state.clause_set.len();
    state.push(resolvent(&first, &second, &literal).with_suffix(id));
    if !general {
        state.status_message = Some("The unifier you specified is not an MGU".to_string());
    }
    Ok(state)
}

fn unify_or_reject(left: &Relation, right: &Relation) -> Result<Substitution> {
    unify(left, right)
        .map_err(|e| illegal_move!("Could not unify '{}' and '{}': {}", left, right, e))
}

fn hyper(
    mut state: FoResolutionState,
    main: usize,
    atom_map: &AtomMap,
) -> Result<FoResolutionState> {
    let (main, sides) = state.premisses(main, atom_map)?;
    let pairs = sides
        .iter()
        .map(|(atom, side, side_atom)| (&main.atoms[*atom].lit, &side.atoms[*side_atom].lit));
    let mgu = unify_all(pairs).map_err(|e| {
        illegal_move!("Could not unify main premiss '{}' with its side premisses: {}", main, e)
    })?;

    let main = main.instantiate(&mgu);
    let sides: Vec<_> = sides
        .into_iter()
        .map(|(atom, side, side_atom)| (atom, side.instantiate(&mgu), side_atom))
        .collect();
    let clause = hyper_resolvent(&main, &sides)?;
    let id = state.clause_set.len();
    state.push(clause.with_suffix(id));
    Ok(state)
}

/// Unify the selected atoms pairwise in order, then keep only the first.
fn factorize(
    mut state: FoResolutionState,
    c1: usize,
    atoms: &[usize],
) -> Result<FoResolutionState> {
    if atoms.len() < 2 {
        return Err(illegal_move!("Please select more than 1 atom to factorize"));
    }
    let mut clause = state.clause(c1)?.clone();
    for &atom in atoms {
        state.atom(c1, atom)?;
    }

    for pair in atoms.windows(2) {
        if pair[0] == pair[1] {
            return Err(illegal_move!("Cannot unify an atom with itself"));
        }
        let first = &clause.atoms[pair[0]];
        let second = &clause.atoms[pair[1]];
        if first.negated != second.negated {
            return Err(illegal_move!(
                "Atoms '{}' and '{}' do not have the same polarity",
                first,
                second
            ));
        }
        let mgu = unify_or_reject(&first.lit, &second.lit)?;
        clause = clause.instantiate(&mgu);
    }

    let kept = &clause.atoms[atoms[0]];
    let redundant = |index: usize| atoms[1..].contains(&index) && clause.atoms[index] == *kept;
    let remaining = (0..clause.len())
        .filter(|index| !redundant(*index))
        .map(|index| clause.atoms[index].clone())
        .collect();

    state.replace(c1, Clause::new(remaining).with_suffix(c1));
    Ok(state)
}
