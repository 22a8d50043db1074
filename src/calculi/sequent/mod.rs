//! Sequent calculus proof trees. Every node holds a sequent; rules apply
//! to an open leaf and add one or two child sequents below it.

pub mod fo;
pub mod prop;

use crate::calculus::{replay, Calculus, CloseMessage};
use crate::error::Result;
use crate::logic::node::LogicNode;
use crate::logic::term::Term;
use crate::logic::transform::{fold_node, instantiate_bound, IdentifierCollector, Transform};
use crate::prelude::*;
use crate::seal::ProtectedState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Write};

pub type SequentNodeId = Id<SequentNode>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SequentMove {
    Ax {
        #[serde(rename = "nodeID")]
        node: usize,
    },
    NotLeft(RuleTarget),
    NotRight(RuleTarget),
    AndLeft(RuleTarget),
    AndRight(RuleTarget),
    OrLeft(RuleTarget),
    OrRight(RuleTarget),
    ImpLeft(RuleTarget),
    ImpRight(RuleTarget),
    AllLeft(Instantiation),
    AllRight(Instantiation),
    ExLeft(Instantiation),
    ExRight(Instantiation),
    #[serde(rename = "undo")]
    Undo,
}

impl SequentMove {
    fn name(&self) -> &'static str {
        match self {
            Self::Ax { .. } => "Ax",
            Self::NotLeft(_) => "NotLeft",
            Self::NotRight(_) => "NotRight",
            Self::AndLeft(_) => "AndLeft",
            Self::AndRight(_) => "AndRight",
            Self::OrLeft(_) => "OrLeft",
            Self::OrRight(_) => "OrRight",
            Self::ImpLeft(_) => "ImpLeft",
            Self::ImpRight(_) => "ImpRight",
            Self::AllLeft(_) => "AllLeft",
            Self::AllRight(_) => "AllRight",
            Self::ExLeft(_) => "ExLeft",
            Self::ExRight(_) => "ExRight",
            Self::Undo => "undo",
        }
    }

    fn is_first_order(&self) -> bool {
        matches!(
            self,
            Self::AllLeft(_) | Self::AllRight(_) | Self::ExLeft(_) | Self::ExRight(_)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTarget {
    #[serde(rename = "nodeID")]
    pub node: usize,
    pub list_index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instantiation {
    #[serde(rename = "nodeID")]
    pub node: usize,
    pub list_index: usize,
    #[serde(default)]
    pub var_assign: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequentNode {
    pub parent: Option<SequentNodeId>,
    #[serde(rename = "leftFormulas")]
    pub left: Vec<LogicNode>,
    #[serde(rename = "rightFormulas")]
    pub right: Vec<LogicNode>,
    pub is_closed: bool,
    pub last_move: Option<SequentMove>,
    pub children: Vec<SequentNodeId>,
}

impl SequentNode {
    fn new(parent: Option<SequentNodeId>, left: Vec<LogicNode>, right: Vec<LogicNode>) -> Self {
        Self {
            parent,
            left: distinct(left),
            right: distinct(right),
            is_closed: false,
            last_move: None,
            children: vec![],
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Display for SequentNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_formulas(f, &self.left)?;
        write!(f, " ⊢ ")?;
        write_formulas(f, &self.right)
    }
}

fn write_formulas(f: &mut impl Write, formulas: &[LogicNode]) -> fmt::Result {
    for (index, formula) in formulas.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", formula)?;
    }
    Ok(())
}

fn distinct(formulas: Vec<LogicNode>) -> Vec<LogicNode> {
    let mut unique: Vec<LogicNode> = vec![];
    for formula in formulas {
        if !unique.contains(&formula) {
            unique.push(formula);
        }
    }
    unique
}

/// Rewrites `a <=> b` to `(a --> b) ∧ (b --> a)` everywhere.
struct EquivalenceRewriter;

impl Transform for EquivalenceRewriter {
    fn node(&mut self, node: LogicNode) -> LogicNode {
        match fold_node(self, node) {
            LogicNode::Equiv(left, right) => LogicNode::and(
                LogicNode::Impl(left.clone(), right.clone()),
                LogicNode::Impl(right, left),
            ),
            other => other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequentState {
    pub tree: Block<SequentNode>,
    pub move_history: Vec<SequentMove>,
    pub show_only_applicable_rules: bool,
    #[serde(default)]
    pub seal: String,
}

impl SequentState {
    pub fn new(
        left: Vec<LogicNode>,
        right: Vec<LogicNode>,
        show_only_applicable_rules: bool,
    ) -> Self {
        let mut rewriter = EquivalenceRewriter;
        let left = left.into_iter().map(|f| f.accept(&mut rewriter)).collect();
        let right = right.into_iter().map(|f| f.accept(&mut rewriter)).collect();
        let mut tree = Block::default();
        tree.push(SequentNode::new(None, left, right));
        Self {
            tree,
            move_history: vec![],
            show_only_applicable_rules,
            seal: String::new(),
        }
    }

    fn root(&self) -> SequentNodeId {
        Id::new(0)
    }

    fn fresh(&self) -> Self {
        let root = &self.tree[self.root()];
        Self::new(root.left.clone(), root.right.clone(), self.show_only_applicable_rules)
    }

    fn leaf(&self, id: usize) -> Result<SequentNodeId> {
        let id = self
            .tree
            .id(id)
            .ok_or_else(|| illegal_move!("Node with ID {} does not exist", id))?;
        let node = &self.tree[id];
        if !node.is_leaf() {
            return Err(illegal_move!("Node '{}' is not a leaf", node));
        }
        if node.is_closed {
            return Err(illegal_move!("Node '{}' is already closed", node));
        }
        Ok(id)
    }

    /// The selected formula of leaf `id` plus the leaf's sequent with that
    /// formula removed.
    fn take(
        &self,
        id: usize,
        side: Side,
        index: usize,
    ) -> Result<(SequentNodeId, LogicNode, Vec<LogicNode>, Vec<LogicNode>)> {
        let id = self.leaf(id)?;
        let node = &self.tree[id];
        let mut left = node.left.clone();
        let mut right = node.right.clone();
        let formulas = match side {
            Side::Left => &mut left,
            Side::Right => &mut right,
        };
        if index >= formulas.len() {
            let side = if side == Side::Left { "left" } else { "right" };
            return Err(illegal_move!(
                "There is no formula with index {} on the {} side of '{}'",
                index,
                side,
                node
            ));
        }
        let formula = formulas.remove(index);
        Ok((id, formula, left, right))
    }

    fn grow(
        mut self,
        parent: SequentNodeId,
        sequents: Vec<(Vec<LogicNode>, Vec<LogicNode>)>,
        mv: SequentMove,
    ) -> Self {
        for (left, right) in sequents {
            let mut child = SequentNode::new(Some(parent), left, right);
            child.last_move = Some(mv.clone());
            let id = self.tree.push(child);
            self.tree[parent].children.push(id);
        }
        self.move_history.push(mv);
        self
    }

    fn set_closed(&mut self, leaf: SequentNodeId) {
        self.tree[leaf].is_closed = true;
        let mut current = self.tree[leaf].parent;
        while let Some(id) = current {
            let closed = self.tree[id]
                .children
                .iter()
                .all(|child| self.tree[*child].is_closed);
            if !closed {
                break;
            }
            self.tree[id].is_closed = true;
            current = self.tree[id].parent;
        }
    }

    fn axiom(self, node: usize, mv: SequentMove) -> Result<Self> {
        let id = self.leaf(node)?;
        let sequent = &self.tree[id];
        if !sequent.left.iter().any(|formula| sequent.right.contains(formula)) {
            return Err(illegal_move!(
                "Axiom is not applicable: no formula occurs on both sides of '{}'",
                sequent
            ));
        }
        let sequent = (sequent.left.clone(), sequent.right.clone());
        let mut state = self.grow(id, vec![sequent], mv);
        if let Some(closed) = state.tree.last_id() {
            state.set_closed(closed);
        }
        Ok(state)
    }

    fn propositional(self, target: RuleTarget, mv: SequentMove) -> Result<Self> {
        let side = match mv {
            SequentMove::NotLeft(_)
            | SequentMove::AndLeft(_)
            | SequentMove::OrLeft(_)
            | SequentMove::ImpLeft(_) => Side::Left,
            _ => Side::Right,
        };
        let (id, formula, left, right) = self.take(target.node, side, target.list_index)?;
        let sequents = match (&mv, formula) {
            (SequentMove::NotLeft(_), LogicNode::Not(child)) => {
                vec![(left, with(right, *child))]
            }
            (SequentMove::NotRight(_), LogicNode::Not(child)) => {
                vec![(with(left, *child), right)]
            }
            (SequentMove::AndLeft(_), LogicNode::And(a, b)) => {
                vec![(with(with(left, *a), *b), right)]
            }
            (SequentMove::AndRight(_), LogicNode::And(a, b)) => vec![
                (left.clone(), with(right.clone(), *a)),
                (left, with(right, *b)),
            ],
            (SequentMove::OrLeft(_), LogicNode::Or(a, b)) => vec![
                (with(left.clone(), *a), right.clone()),
                (with(left, *b), right),
            ],
            (SequentMove::OrRight(_), LogicNode::Or(a, b)) => {
                vec![(left, with(with(right, *a), *b))]
            }
            (SequentMove::ImpLeft(_), LogicNode::Impl(a, b)) => vec![
                (left.clone(), with(right.clone(), *a)),
                (with(left, *b), right),
            ],
            (SequentMove::ImpRight(_), LogicNode::Impl(a, b)) => {
                vec![(with(left, *a), with(right, *b))]
            }
            (_, formula) => {
                return Err(illegal_move!(
                    "Rule {} can not be applied on '{}'",
                    mv.name(),
                    formula
                ))
            }
        };
        Ok(self.grow(id, sequents, mv))
    }

    fn quantifier(self, target: &Instantiation, mv: SequentMove) -> Result<Self> {
        let (side, eigenvariable) = match mv {
            SequentMove::AllLeft(_) => (Side::Left, false),
            SequentMove::AllRight(_) => (Side::Right, true),
            SequentMove::ExLeft(_) => (Side::Left, true),
            _ => (Side::Right, false),
        };
        let (id, formula, mut left, mut right) =
            self.take(target.node, side, target.list_index)?;
        let (variable, body) = match (&mv, &formula) {
            (SequentMove::AllLeft(_), LogicNode::All(variable, body))
            | (SequentMove::AllRight(_), LogicNode::All(variable, body))
            | (SequentMove::ExLeft(_), LogicNode::Ex(variable, body))
            | (SequentMove::ExRight(_), LogicNode::Ex(variable, body)) => {
                (variable.clone(), (**body).clone())
            }
            _ => {
                let expected = if let SequentMove::AllLeft(_) | SequentMove::AllRight(_) = mv {
                    "a universal"
                } else {
                    "an existential"
                };
                return Err(illegal_move!(
                    "Rule {} can only be applied on {} quantifier",
                    mv.name(),
                    expected
                ));
            }
        };

        let constant = match target.var_assign.get(&variable) {
            Some(constant) => constant.clone(),
            None => {
                return Err(illegal_move!(
                    "No constant given to instantiate '{}' with",
                    variable
                ))
            }
        };
        check_constant(&constant)?;
        if eigenvariable {
            let sequent = &self.tree[id];
            let used = IdentifierCollector::collect(sequent.left.iter().chain(&sequent.right));
            if used.contains(&constant) {
                return Err(illegal_move!("Identifier '{}' is already in use", constant));
            }
        }

        let instance = instantiate_bound(&variable, body, Term::Const(constant));
        let sequent = match (side, eigenvariable) {
            (Side::Left, true) => (with(left, instance), right),
            (Side::Right, true) => (left, with(right, instance)),
            (Side::Left, false) => {
                left.insert(target.list_index, formula);
                (with(left, instance), right)
            }
            (Side::Right, false) => {
                right.insert(target.list_index, formula);
                (left, with(right, instance))
            }
        };
        Ok(self.grow(id, vec![sequent], mv))
    }

    /// Apply `mv`, accepting quantifier rules only when `first_order`.
    pub(crate) fn apply<C>(self, mv: SequentMove, first_order: bool) -> Result<Self>
    where
        C: Calculus<State = Self, Move = SequentMove>,
    {
        if mv.is_first_order() && !first_order {
            return Err(illegal_move!(
                "Rule {} is not available in propositional sequent calculus",
                mv.name()
            ));
        }
        match mv {
            SequentMove::Ax { node } => self.axiom(node, mv),
            SequentMove::NotLeft(target)
            | SequentMove::NotRight(target)
            | SequentMove::AndLeft(target)
            | SequentMove::AndRight(target)
            | SequentMove::OrLeft(target)
            | SequentMove::OrRight(target)
            | SequentMove::ImpLeft(target)
            | SequentMove::ImpRight(target) => self.propositional(target, mv),
            SequentMove::AllLeft(ref target)
            | SequentMove::AllRight(ref target)
            | SequentMove::ExLeft(ref target)
            | SequentMove::ExRight(ref target) => {
                let target = target.clone();
                self.quantifier(&target, mv)
            }
            SequentMove::Undo => self.undo::<C>(),
        }
    }

    fn undo<C>(self) -> Result<Self>
    where
        C: Calculus<State = Self, Move = SequentMove>,
    {
        let mut history = self.move_history.clone();
        if history.pop().is_none() {
            return Err(illegal_move!("Can't undo in initial state"));
        }
        replay::<C>(self.fresh(), history)
    }

    pub(crate) fn close_message(&self, logic: &str) -> CloseMessage {
        if self.tree[self.root()].is_closed {
            CloseMessage::new(
                true,
                format!("The proof is closed and valid in {} sequent calculus", logic),
            )
        } else {
            CloseMessage::new(false, "The proof is not closed")
        }
    }
}

fn with(mut formulas: Vec<LogicNode>, formula: LogicNode) -> Vec<LogicNode> {
    formulas.push(formula);
    formulas
}

/// A quantifier instantiation must be a well-formed constant name.
fn check_constant(name: &str) -> Result<()> {
    let first = match name.chars().next() {
        Some(first) => first,
        None => return Err(illegal_move!("Can't instantiate with empty identifier")),
    };
    if !first.is_ascii_lowercase() {
        return Err(illegal_move!(
            "Constant '{}' does not start with a lowercase letter",
            name
        ));
    }
    if let Some(position) = name.chars().position(|c| !(c.is_ascii_alphanumeric() || c == '_')) {
        return Err(illegal_move!(
            "Character at position {} in '{}' is not allowed in constants",
            position,
            name
        ));
    }
    Ok(())
}

impl ProtectedState for SequentState {
    fn seal_info(&self) -> String {
        let mut info = format!("sequentstate|{}|[", self.show_only_applicable_rules);
        for node in self.tree.iter() {
            let _ = write!(
                info,
                "({:?};{};{};{:?};{:?})",
                node.parent, node, node.is_closed, node.last_move, node.children
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_names() {
        assert!(check_constant("a").is_ok());
        assert!(check_constant("c_12").is_ok());
        assert_eq!(
            check_constant("").unwrap_err().to_string(),
            "Can't instantiate with empty identifier"
        );
        assert!(check_constant("A").is_err());
        assert!(check_constant("_a").is_err());
        assert_eq!(
            check_constant("ab-c").unwrap_err().to_string(),
            "Character at position 2 in 'ab-c' is not allowed in constants"
        );
    }

    #[test]
    fn equivalences_become_implications() {
        let a = LogicNode::var("a");
        let b = LogicNode::var("b");
        let state = SequentState::new(vec![], vec![LogicNode::equiv(a, b)], false);
        assert_eq!(
            state.tree[state.root()].right[0].to_string(),
            "((a --> b) ∧ (b --> a))"
        );
    }

    #[test]
    fn move_json() {
        let mv: SequentMove = serde_json::from_str(
            r#"{"type": "AllRight", "nodeID": 0, "listIndex": 1, "varAssign": {"X": "a"}}"#,
        )
        .unwrap();
        let mut var_assign = BTreeMap::new();
        var_assign.insert("X".to_string(), "a".to_string());
        assert_eq!(
            mv,
            SequentMove::AllRight(Instantiation { node: 0, list_index: 1, var_assign })
        );
        let mv: SequentMove = serde_json::from_str(r#"{"type": "undo"}"#).unwrap();
        assert_eq!(mv, SequentMove::Undo);
    }
}
