//! Clausal tableaux: the tree grows by appending one child per atom of a
//! clause below an open leaf, and branches close on complementary atoms.

pub mod fo;
pub mod prop;

use crate::calculus::CloseMessage;
use crate::clause::{Atom, Clause, ClauseSet, Literal};
use crate::error::Result;
use crate::logic::term::Relation;
use crate::logic::unify::unify;
use crate::prelude::*;
use crate::seal::ProtectedState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connectedness {
    Unconnected,
    WeaklyConnected,
    StronglyConnected,
}

impl Default for Connectedness {
    fn default() -> Self {
        Self::Unconnected
    }
}

impl Connectedness {
    fn describe(self) -> &'static str {
        match self {
            Self::Unconnected => "unconnected",
            Self::WeaklyConnected => "weakly connected",
            Self::StronglyConnected => "strongly connected",
        }
    }
}

/// Payloads whose atoms can close a branch against each other.
pub trait Connectable: Literal {
    /// Whether a positive and a negative atom over these payloads could be
    /// closed, possibly after instantiation.
    fn connects(&self, other: &Self) -> bool;
}

impl Connectable for String {
    fn connects(&self, other: &Self) -> bool {
        self == other
    }
}

impl Connectable for Relation {
    fn connects(&self, other: &Self) -> bool {
        unify(self, other).is_ok()
    }
}

pub type NodeId<L> = Id<TableauxNode<L>>;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableauxNode<L> {
    pub parent: Option<NodeId<L>>,
    /// `None` only at the root.
    pub atom: Option<Atom<L>>,
    pub is_closed: bool,
    pub close_ref: Option<NodeId<L>>,
    pub children: Vec<NodeId<L>>,
}

impl<L> TableauxNode<L> {
    fn root() -> Self {
        Self {
            parent: None,
            atom: None,
            is_closed: false,
            close_ref: None,
            children: vec![],
        }
    }

    fn new(parent: NodeId<L>, atom: Atom<L>) -> Self {
        Self {
            parent: Some(parent),
            atom: Some(atom),
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
#[serde(tag = "type")]
pub enum TableauxMove {
    #[serde(rename = "tableaux-expand")]
    Expand { id: usize, clause: usize },
    #[serde(rename = "tableaux-close")]
    Close {
        id1: usize,
        id2: usize,
        #[serde(default, rename = "varAssign", skip_serializing_if = "Option::is_none")]
        var_assign: Option<BTreeMap<String, String>>,
    },
    #[serde(rename = "tableaux-undo")]
    Undo,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableauxState<L> {
    pub clause_set: ClauseSet<L>,
    #[serde(rename = "type")]
    pub connectedness: Connectedness,
    pub regular: bool,
    pub backtracking: bool,
    #[serde(default)]
    pub manual_var_assign: bool,
    pub nodes: Block<TableauxNode<L>>,
    pub move_history: Vec<TableauxMove>,
    pub expansion_counter: usize,
    #[serde(default)]
    pub seal: String,
}

impl<L: Connectable> TableauxState<L> {
    pub fn new(
        clause_set: ClauseSet<L>,
        connectedness: Connectedness,
        regular: bool,
        backtracking: bool,
    ) -> Self {
        let mut nodes = Block::default();
        nodes.push(TableauxNode::root());
        Self {
            clause_set,
            connectedness,
            regular,
            backtracking,
            manual_var_assign: false,
            nodes,
            move_history: vec![],
            expansion_counter: 0,
            seal: String::new(),
        }
    }

    /// The same proof before any move was made.
    pub fn fresh(&self) -> Self {
        let mut fresh = Self::new(
            self.clause_set.clone(),
            self.connectedness,
            self.regular,
            self.backtracking,
        );
        fresh.manual_var_assign = self.manual_var_assign;
        fresh
    }

    pub fn root(&self) -> NodeId<L> {
        Id::new(0)
    }

    pub fn node(&self, id: usize) -> Result<NodeId<L>> {
        self.nodes
            .id(id)
            .ok_or_else(|| illegal_move!("Node with ID {} does not exist", id))
    }

    pub fn clause(&self, id: usize) -> Result<&Clause<L>> {
        self.clause_set
            .get(id)
            .ok_or_else(|| illegal_move!("Clause with ID {} does not exist", id))
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId<L>) -> impl Iterator<Item = NodeId<L>> + '_ {
        std::iter::successors(self.nodes[id].parent, move |ancestor| {
            self.nodes[*ancestor].parent
        })
    }

    /// Atoms on the branch ending at `id`, including `id`.
    fn branch(&self, id: NodeId<L>) -> impl Iterator<Item = &Atom<L>> + '_ {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .filter_map(move |node| self.nodes[node].atom.as_ref())
    }

    /// Append `clause` below the open leaf `leaf`.
    pub(crate) fn expand(mut self, leaf: NodeId<L>, clause: Clause<L>) -> Result<Self> {
        let node = &self.nodes[leaf];
        if !node.is_leaf() {
            return Err(illegal_move!("Node '{}' is not a leaf", leaf));
        }
        if node.is_closed {
            return Err(illegal_move!("Node '{}' is already closed", leaf));
        }
        if clause.is_empty() {
            return Err(illegal_move!("Cannot expand an empty clause"));
        }
        if self.regular {
            self.check_regular(leaf, &clause)?;
        }
        if leaf != self.root() {
            self.check_connected(leaf, &clause)?;
        }

        for atom in clause.atoms {
            let child = self.nodes.push(TableauxNode::new(leaf, atom));
            self.nodes[leaf].children.push(child);
        }
        self.expansion_counter += 1;
        Ok(self)
    }

    fn check_regular(&self, leaf: NodeId<L>, clause: &Clause<L>) -> Result<()> {
        for (index, atom) in clause.atoms.iter().enumerate() {
            let repeated = clause.atoms[..index].contains(atom);
            if repeated || self.branch(leaf).any(|on_branch| on_branch == atom) {
                return Err(illegal_move!(
                    "Expanding this clause would introduce a duplicate node '{}' on the branch, making the tree irregular",
                    atom
                ));
            }
        }
        Ok(())
    }

    fn check_connected(&self, leaf: NodeId<L>, clause: &Clause<L>) -> Result<()> {
        let closes = |target: &Atom<L>| {
            clause
                .atoms
                .iter()
                .any(|atom| atom.negated != target.negated && atom.lit.connects(&target.lit))
        };
        let connected = match self.connectedness {
            Connectedness::Unconnected => true,
            Connectedness::WeaklyConnected => self.branch(leaf).any(closes),
            Connectedness::StronglyConnected => {
                self.nodes[leaf].atom.as_ref().map_or(false, closes)
            }
        };
        if connected {
            Ok(())
        } else {
            Err(illegal_move!(
                "Expanding this clause would violate the {} property",
                self.connectedness.describe()
            ))
        }
    }

    /// Complementary atoms of `leaf` and its ancestor `partner`, checking
    /// everything but equality of the payloads.
    pub(crate) fn close_pair(
        &self,
        leaf: NodeId<L>,
        partner: NodeId<L>,
    ) -> Result<(&Atom<L>, &Atom<L>)> {
        let node = &self.nodes[leaf];
        if !node.is_leaf() {
            return Err(illegal_move!("Node '{}' is not a leaf", leaf));
        }
        if node.is_closed {
            return Err(illegal_move!("Node '{}' is already closed", leaf));
        }
        if !self.ancestors(leaf).any(|ancestor| ancestor == partner) {
            return Err(illegal_move!(
                "Node '{}' is not an ancestor of leaf '{}'",
                partner,
                leaf
            ));
        }
        let (atom, other) = match (&node.atom, &self.nodes[partner].atom) {
            (Some(atom), Some(other)) => (atom, other),
            _ => return Err(illegal_move!("Cannot close a branch with the root node")),
        };
        if atom.negated == other.negated {
            return Err(illegal_move!(
                "Nodes '{}' and '{}' do not have opposite polarity",
                atom,
                other
            ));
        }
        Ok((atom, other))
    }

    /// Mark `leaf` closed against `partner` and propagate closure upwards.
    pub(crate) fn close(mut self, leaf: NodeId<L>, partner: NodeId<L>) -> Result<Self> {
        let (atom, other) = self.close_pair(leaf, partner)?;
        if atom.lit != other.lit {
            return Err(illegal_move!(
                "Nodes '{}' and '{}' are not complementary",
                atom,
                other
            ));
        }

        let node = &mut self.nodes[leaf];
        node.is_closed = true;
        node.close_ref = Some(partner);
        for ancestor in self.ancestors(leaf).collect::<Vec<_>>() {
            let closed = self.nodes[ancestor]
                .children
                .iter()
                .all(|child| self.nodes[*child].is_closed);
            if !closed {
                break;
            }
            self.nodes[ancestor].is_closed = true;
        }
        Ok(self)
    }

    pub(crate) fn record(&mut self, mv: TableauxMove) {
        if self.backtracking {
            self.move_history.push(mv);
        }
    }

    /// History without its last move, for replay.
    pub(crate) fn undo_history(&self) -> Result<Vec<TableauxMove>> {
        if !self.backtracking {
            return Err(illegal_move!("Backtracking is not enabled for this proof"));
        }
        let mut history = self.move_history.clone();
        if history.pop().is_none() {
            return Err(illegal_move!("Can't undo in initial state"));
        }
        Ok(history)
    }

    pub(crate) fn close_message(&self) -> CloseMessage {
        if !self.nodes[self.root()].is_closed {
            return CloseMessage::new(false, "The proof tree is not closed");
        }
        let regular = if self.regular { "regular " } else { "" };
        let backtracking = if self.backtracking { "with" } else { "without" };
        CloseMessage::new(
            true,
            format!(
                "The proof tree is closed and valid in {}{} tableaux {} backtracking",
                regular,
                self.connectedness.describe(),
                backtracking
            ),
        )
    }
}

impl<L: Connectable> ProtectedState for TableauxState<L> {
    fn seal_info(&self) -> String {
        let mut info = format!(
            "{}-tableauxstate|{:?}|{}|{}|{}|{}|{}|[",
            L::LOGIC,
            self.connectedness,
            self.regular,
            self.backtracking,
            self.manual_var_assign,
            self.expansion_counter,
            self.clause_set,
        );
        for node in self.nodes.iter() {
            let atom = node.atom.as_ref().map(ToString::to_string);
            let _ = write!(
                info,
                "({:?};{:?};{};{:?};{:?})",
                node.parent, atom, node.is_closed, node.close_ref, node.children
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
