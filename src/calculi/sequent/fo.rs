use super::prop::SequentParams;
use super::{SequentMove, SequentState};
use crate::calculus::{Calculus, CloseMessage};
use crate::error::Result;
use crate::logic::parse::{parse_sequent, Logic};

pub struct FoSequent;

impl Calculus for FoSequent {
    const IDENTIFIER: &'static str = "fo-sequent";

    type Params = SequentParams;
    type State = SequentState;
    type Move = SequentMove;

    fn parse_formula(formula: &str, params: Self::Params) -> Result<Self::State> {
        let (left, right) = parse_sequent(formula, Logic::FirstOrder)?;
        Ok(SequentState::new(left, right, params.show_only_applicable_rules))
    }

    fn apply_move(state: Self::State, mv: Self::Move) -> Result<Self::State> {
        state.apply::<Self>(mv, true)
    }

    fn check_close(state: &Self::State) -> CloseMessage {
        state.close_message("first-order")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculi::sequent::{Instantiation, RuleTarget};
    use crate::calculus::replay;
    use crate::logic::parse::parse_first_order;
    use crate::prelude::*;

    fn start(formula: &str) -> SequentState {
        FoSequent::parse_formula(formula, SequentParams::default()).unwrap()
    }

    fn apply(state: SequentState, moves: Vec<SequentMove>) -> Result<SequentState> {
        replay::<FoSequent>(state, moves)
    }

    fn inst(node: usize, list_index: usize, pairs: &[(&str, &str)]) -> Instantiation {
        let var_assign = pairs
            .iter()
            .map(|(variable, constant)| (variable.to_string(), constant.to_string()))
            .collect();
        Instantiation { node, list_index, var_assign }
    }

    mod all_right {
        use super::*;

        #[test]
        fn instantiates_with_constant() {
            let state = start("\\all X: R(X)");
            let state = apply(state, vec![SequentMove::AllRight(inst(0, 0, &[("X", "a")]))])
                .unwrap();
            assert_eq!(state.tree.len(), 2);
            assert_eq!(state.tree[Id::new(0)].children, vec![Id::new(1)]);
            assert_eq!(state.tree[Id::new(1)].parent, Some(Id::new(0)));
            let node = &state.tree[Id::new(1)];
            assert!(node.left.is_empty());
            assert_eq!(node.right, vec![parse_first_order("R(a)").unwrap()]);
        }

        #[test]
        fn rejects_used_identifier() {
            let state = start("\\all X: R(X), P(a)");
            let error = apply(state, vec![SequentMove::AllRight(inst(0, 0, &[("X", "a")]))])
                .unwrap_err();
            assert_eq!(error.to_string(), "Identifier 'a' is already in use");
        }

        #[test]
        fn rejects_wrong_quantifier() {
            let state = start("\\ex X: R(X)");
            assert!(apply(state, vec![SequentMove::AllRight(inst(0, 0, &[("X", "a")]))]).is_err());
        }

        #[test]
        fn requires_assignment() {
            let state = start("\\all X: R(X)");
            assert!(apply(state.clone(), vec![SequentMove::AllRight(inst(0, 0, &[]))]).is_err());
            assert!(apply(state.clone(), vec![SequentMove::AllRight(inst(0, 0, &[("X", "")]))])
                .is_err());
            assert!(apply(state, vec![SequentMove::AllRight(inst(0, 0, &[("X", "B")]))]).is_err());
        }

        #[test]
        #[cfg(target_pointer_width = "64")]
        fn node_ids_do_not_wrap() {
            let state = start("\\all X: R(X)");
            let mv = SequentMove::AllRight(inst(1 << 32, 0, &[("X", "a")]));
            let error = apply(state, vec![mv]).unwrap_err();
            assert_eq!(error.kind(), "IllegalMove");
            assert_eq!(error.to_string(), "Node with ID 4294967296 does not exist");
        }
    }

    mod other_quantifier_rules {
        use super::*;

        #[test]
        fn all_left_keeps_formula() {
            let state = start("\\all X: R(X) |- R(a)");
            let moves = vec![
                SequentMove::AllLeft(inst(0, 0, &[("X", "a")])),
                SequentMove::Ax { node: 1 },
            ];
            let state = apply(state, moves).unwrap();
            let node = &state.tree[Id::new(1)];
            assert_eq!(node.left.len(), 2);
            assert_eq!(node.left[1], parse_first_order("R(a)").unwrap());
            assert!(FoSequent::check_close(&state).closed);
        }

        #[test]
        fn ex_right_keeps_formula_and_allows_used_names() {
            let state = start("R(a) |- \\ex X: R(X)");
            let state = apply(state, vec![SequentMove::ExRight(inst(0, 0, &[("X", "a")]))])
                .unwrap();
            assert_eq!(state.tree[Id::new(1)].right.len(), 2);
        }

        #[test]
        fn ex_left_removes_formula() {
            let state = start("\\ex X: R(X) |- \\ex Y: R(Y)");
            let state = apply(state, vec![SequentMove::ExLeft(inst(0, 0, &[("X", "b")]))])
                .unwrap();
            let node = &state.tree[Id::new(1)];
            assert_eq!(node.left, vec![parse_first_order("R(b)").unwrap()]);
        }
    }

    #[test]
    fn propositional_rules_apply() {
        let state = start("R(a) -> R(a)");
        let moves = vec![
            SequentMove::ImpRight(RuleTarget { node: 0, list_index: 0 }),
            SequentMove::Ax { node: 1 },
        ];
        let state = apply(state, moves).unwrap();
        assert_eq!(
            FoSequent::check_close(&state).msg,
            "The proof is closed and valid in first-order sequent calculus"
        );
    }
}
