//! Non-clausal tableaux over the negation normal form of a first-order
//! formula. Rules decompose a node's formula onto every open leaf below it.

use crate::calculus::{replay, Calculus, CloseMessage};
use crate::error::Result;
use crate::logic::nnf::negation_normal_form;
use crate::logic::node::LogicNode;
use crate::logic::parse::{parse_first_order, parse_substitution};
use crate::logic::term::{Relation, Term};
use crate::logic::transform::{
    instantiate_bound, FreeVariables, IdentifierCollector, Instantiator, VariableNames,
};
use crate::logic::unify::unify;
use crate::prelude::*;
use crate::seal::ProtectedState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;

pub type NcNodeId = Id<NcNode>;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NcNode {
    pub parent: Option<NcNodeId>,
    pub formula: LogicNode,
    pub is_closed: bool,
    pub close_ref: Option<NcNodeId>,
    pub children: Vec<NcNodeId>,
}

impl NcNode {
    fn new(parent: Option<NcNodeId>, formula: LogicNode) -> Self {
        Self {
            parent,
            formula,
            is_closed: false,
            close_ref: None,
            children: vec![],
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NcTableauxMove {
    Alpha {
        #[serde(rename = "nodeID")]
        node: usize,
    },
    Beta {
        #[serde(rename = "nodeID")]
        node: usize,
    },
    Gamma {
        #[serde(rename = "nodeID")]
        node: usize,
    },
    Delta {
        #[serde(rename = "nodeID")]
        node: usize,
    },
    Close {
        #[serde(rename = "leafID")]
        leaf: usize,
        #[serde(rename = "closeID")]
        partner: usize,
        #[serde(default, rename = "varAssign", skip_serializing_if = "Option::is_none")]
        var_assign: Option<BTreeMap<String, String>>,
    },
    Undo,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NcTableauxParams {
    pub backtracking: bool,
}

impl Default for NcTableauxParams {
    fn default() -> Self {
        Self { backtracking: true }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NcTableauxState {
    pub formula: LogicNode,
    pub backtracking: bool,
    pub nodes: Block<NcNode>,
    pub move_history: Vec<NcTableauxMove>,
    pub gamma_counter: usize,
    pub skolem_counter: usize,
    #[serde(default)]
    pub seal: String,
}

impl NcTableauxState {
    pub fn new(formula: LogicNode, backtracking: bool) -> Self {
        let mut nodes = Block::default();
        nodes.push(NcNode::new(None, formula.clone()));
        Self {
            formula,
            backtracking,
            nodes,
            move_history: vec![],
            gamma_counter: 0,
            skolem_counter: 0,
            seal: String::new(),
        }
    }

    fn root(&self) -> NcNodeId {
        Id::new(0)
    }

    fn node(&self, id: usize) -> Result<NcNodeId> {
        self.nodes
            .id(id)
            .ok_or_else(|| illegal_move!("Node with ID {} does not exist", id))
    }

    fn is_ancestor(&self, ancestor: NcNodeId, node: NcNodeId) -> bool {
        std::iter::successors(self.nodes[node].parent, |id| self.nodes[*id].parent)
            .any(|id| id == ancestor)
    }

    /// Open leaves in the subtree rooted at `id`, left to right.
    fn open_leaves(&self, id: NcNodeId) -> Vec<NcNodeId> {
        let mut leaves = vec![];
        let mut todo = vec![id];
        while let Some(id) = todo.pop() {
            let node = &self.nodes[id];
            if node.is_leaf() {
                if !node.is_closed {
                    leaves.push(id);
                }
            } else {
                todo.extend(node.children.iter().rev().copied());
            }
        }
        leaves
    }

    /// Leaves the rule will extend, rejecting a subtree with none.
    fn targets(&self, id: NcNodeId) -> Result<Vec<NcNodeId>> {
        let leaves = self.open_leaves(id);
        if leaves.is_empty() {
            return Err(illegal_move!(
                "Node '{}' has no open leaves below it",
                self.nodes[id].formula
            ));
        }
        Ok(leaves)
    }

    fn append(&mut self, parent: NcNodeId, formula: LogicNode) -> NcNodeId {
        let child = self.nodes.push(NcNode::new(Some(parent), formula));
        self.nodes[parent].children.push(child);
        child
    }

    fn set_closed(&mut self, leaf: NcNodeId) {
        self.nodes[leaf].is_closed = true;
        let mut current = self.nodes[leaf].parent;
        while let Some(id) = current {
            let closed = self.nodes[id]
                .children
                .iter()
                .all(|child| self.nodes[*child].is_closed);
            if !closed {
                break;
            }
            self.nodes[id].is_closed = true;
            current = self.nodes[id].parent;
        }
    }

    fn record(&mut self, mv: NcTableauxMove) {
        if self.backtracking {
            self.move_history.push(mv);
        }
    }

    fn alpha(mut self, id: NcNodeId) -> Result<Self> {
        let (left, right) = match &self.nodes[id].formula {
            LogicNode::And(left, right) => ((**left).clone(), (**right).clone()),
            other => return Err(illegal_move!("Outermost logic operator of '{}' is not AND", other)),
        };
        for leaf in self.targets(id)? {
            let first = self.append(leaf, left.clone());
            self.append(first, right.clone());
        }
        Ok(self)
    }

    fn beta(mut self, id: NcNodeId) -> Result<Self> {
        let (left, right) = match &self.nodes[id].formula {
            LogicNode::Or(left, right) => ((**left).clone(), (**right).clone()),
            other => return Err(illegal_move!("Outermost logic operator of '{}' is not OR", other)),
        };
        for leaf in self.targets(id)? {
            self.append(leaf, left.clone());
            self.append(leaf, right.clone());
        }
        Ok(self)
    }

    fn gamma(mut self, id: NcNodeId) -> Result<Self> {
        let (variable, body) = match &self.nodes[id].formula {
            LogicNode::All(variable, body) => (variable.clone(), (**body).clone()),
            other => {
                return Err(illegal_move!(
                    "Outermost logic operator of '{}' is not a universal quantifier",
                    other
                ))
            }
        };
        let leaves = self.targets(id)?;
        let used = VariableNames::collect(self.nodes.iter().map(|node| &node.formula));
        let fresh = loop {
            self.gamma_counter += 1;
            let name = format!("{}_{}", variable, self.gamma_counter);
            if !used.contains(&name) {
                break name;
            }
        };
        let instance = instantiate_bound(&variable, body, Term::Var(fresh));
        for leaf in leaves {
            self.append(leaf, instance.clone());
        }
        Ok(self)
    }

    fn delta(mut self, id: NcNodeId) -> Result<Self> {
        let formula = self.nodes[id].formula.clone();
        let (variable, body) = match formula {
            LogicNode::Ex(ref variable, ref body) => (variable.clone(), (**body).clone()),
            other => {
                return Err(illegal_move!(
                    "Outermost logic operator of '{}' is not an existential quantifier",
                    other
                ))
            }
        };
        let leaves = self.targets(id)?;
        let used = IdentifierCollector::collect(self.nodes.iter().map(|node| &node.formula));
        let name = loop {
            self.skolem_counter += 1;
            let name = format!("sk{}", self.skolem_counter);
            if !used.contains(&name) {
                break name;
            }
        };
        let free = FreeVariables::of(&formula);
        let skolem = if free.is_empty() {
            Term::Const(name)
        } else {
            Term::Fun(name, free.into_iter().map(Term::Var).collect())
        };
        let instance = instantiate_bound(&variable, body, skolem);
        for leaf in leaves {
            self.append(leaf, instance.clone());
        }
        Ok(self)
    }

    fn close(
        mut self,
        leaf: usize,
        partner: usize,
        var_assign: Option<BTreeMap<String, String>>,
    ) -> Result<Self> {
        let leaf_id = self.node(leaf)?;
        let partner_id = self.node(partner)?;
        let node = &self.nodes[leaf_id];
        let other = &self.nodes[partner_id];
        if !node.is_leaf() {
            return Err(illegal_move!("Node '{}' is not a leaf", node.formula));
        }
        if node.is_closed {
            return Err(illegal_move!(
                "Leaf '{}' is already closed, no need to close again",
                node.formula
            ));
        }
        if !self.is_ancestor(partner_id, leaf_id) {
            return Err(illegal_move!(
                "Node '{}' is not an ancestor of leaf '{}'",
                other.formula,
                node.formula
            ));
        }
        let (leaf_relation, partner_relation) = complementary(&node.formula, &other.formula)?;

        let unifier = match var_assign {
            Some(var_assign) => parse_substitution(&var_assign)?,
            None => unify(leaf_relation, partner_relation).map_err(|e| {
                illegal_move!(
                    "Cannot unify '{}' and '{}': {}",
                    leaf_relation,
                    partner_relation,
                    e
                )
            })?,
        };

        let mut instantiator = Instantiator::new(&unifier);
        for node in self.nodes.iter_mut() {
            let formula = std::mem::replace(&mut node.formula, LogicNode::var(""));
            node.formula = formula.accept(&mut instantiator);
        }

        let (leaf_relation, partner_relation) =
            complementary(&self.nodes[leaf_id].formula, &self.nodes[partner_id].formula)?;
        if leaf_relation != partner_relation {
            return Err(illegal_move!(
                "Relations '{}' and '{}' are not equal after variable instantiation",
                leaf_relation,
                partner_relation
            ));
        }

        self.nodes[leaf_id].close_ref = Some(partner_id);
        self.set_closed(leaf_id);

        let var_assign = unifier
            .iter()
            .map(|(variable, term)| (variable.clone(), term.to_string()))
            .collect();
        self.record(NcTableauxMove::Close {
            leaf,
            partner,
            var_assign: Some(var_assign),
        });
        Ok(self)
    }

    fn undo(self) -> Result<Self> {
        if !self.backtracking {
            return Err(illegal_move!("Backtracking is not enabled for this proof"));
        }
        let mut history = self.move_history.clone();
        if history.pop().is_none() {
            return Ok(self);
        }
        let fresh = Self::new(self.formula.clone(), self.backtracking);
        replay::<NcTableaux>(fresh, history)
    }
}

/// The relations of a leaf and its partner when exactly one of them is
/// negated.
fn complementary<'a>(
    leaf: &'a LogicNode,
    partner: &'a LogicNode,
) -> Result<(&'a Relation, &'a Relation)> {
    match (leaf, partner) {
        (LogicNode::Not(child), _) => match (&**child, partner) {
            (LogicNode::Relation(left), LogicNode::Relation(right)) => Ok((left, right)),
            (LogicNode::Relation(_), _) => Err(illegal_move!(
                "Close node formula '{}' is not a relation",
                partner
            )),
            _ => Err(illegal_move!(
                "Leaf formula '{}' is not a negated relation",
                leaf
            )),
        },
        (_, LogicNode::Not(child)) => match (leaf, &**child) {
            (LogicNode::Relation(left), LogicNode::Relation(right)) => Ok((left, right)),
            (_, LogicNode::Relation(_)) => {
                Err(illegal_move!("Leaf formula '{}' is not a relation", leaf))
            }
            _ => Err(illegal_move!(
                "Close node formula '{}' is not a negated relation",
                partner
            )),
        },
        _ => Err(illegal_move!(
            "Neither '{}' nor '{}' are negated",
            leaf,
            partner
        )),
    }
}

impl ProtectedState for NcTableauxState {
    fn seal_info(&self) -> String {
        let mut info = format!(
            "nctableauxstate|{}|{}|{}|{}|[",
            self.formula, self.backtracking, self.gamma_counter, self.skolem_counter
        );
        for node in self.nodes.iter() {
            let _ = write!(
                info,
                "({:?};{};{};{:?};{:?})",
                node.parent, node.formula, node.is_closed, node.close_ref, node.children
            );
        }
        let _ = write!(info, "]|{:?}", self.move_history);
        info
    }

    fn seal(&self) -> &str {
        &self.seal
    }

    fn set_seal(&mut self, seal: String) {
        self.seal = seal;
    }
}

pub struct NcTableaux;

impl Calculus for NcTableaux {
    const IDENTIFIER: &'static str = "nc-tableaux";

    type Params = NcTableauxParams;
    type State = NcTableauxState;
    type Move = NcTableauxMove;

    fn parse_formula(formula: &str, params: Self::Params) -> Result<Self::State> {
        let formula = negation_normal_form(parse_first_order(formula)?);
        Ok(NcTableauxState::new(formula, params.backtracking))
    }

    fn apply_move(state: Self::State, mv: Self::Move) -> Result<Self::State> {
        let mut state = match mv {
            NcTableauxMove::Alpha { node } => {
                let id = state.node(node)?;
                state.alpha(id)?
            }
            NcTableauxMove::Beta { node } => {
                let id = state.node(node)?;
                state.beta(id)?
            }
            NcTableauxMove::Gamma { node } => {
                let id = state.node(node)?;
                state.gamma(id)?
            }
            NcTableauxMove::Delta { node } => {
                let id = state.node(node)?;
                state.delta(id)?
            }
            NcTableauxMove::Close { leaf, partner, var_assign } => {
                return state.close(leaf, partner, var_assign)
            }
            NcTableauxMove::Undo => return state.undo(),
        };
        state.record(mv);
        Ok(state)
    }

    fn check_close(state: &Self::State) -> CloseMessage {
        if !state.nodes[state.root()].is_closed {
            return CloseMessage::new(false, "The proof tree is not closed");
        }
        let backtracking = if state.backtracking { "with" } else { "without" };
        CloseMessage::new(
            true,
            format!(
                "The proof is closed and valid in non-clausal tableaux {} backtracking",
                backtracking
            ),
        )
    }
}
