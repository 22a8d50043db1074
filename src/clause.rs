use crate::error::{CalculusError, Result};
use crate::logic::node::LogicNode;
use crate::logic::parse::{parse_propositional, parse_relation};
use crate::logic::term::{Relation, Substitution};
use crate::logic::transform::SuffixRenamer;
use crate::logic::transform::Transform;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload of an atom: a propositional variable or a first-order relation.
pub trait Literal:
    Clone + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Distinguishes the logics in sealed state.
    const LOGIC: &'static str;

    /// The literal an atomic formula denotes, `None` for anything else.
    fn from_node(node: &LogicNode) -> Option<Self>;

    fn parse_literal(text: &str) -> Result<Self>;
}

impl Literal for String {
    const LOGIC: &'static str = "prop";

    fn from_node(node: &LogicNode) -> Option<Self> {
        match node {
            LogicNode::Var(name) => Some(name.clone()),
            _ => None,
        }
    }

    fn parse_literal(text: &str) -> Result<Self> {
        match parse_propositional(text)? {
            LogicNode::Var(name) => Ok(name),
            other => Err(CalculusError::InvalidFormula(format!(
                "'{}' is not a propositional variable",
                other
            ))),
        }
    }
}

impl Literal for Relation {
    const LOGIC: &'static str = "fo";

    fn from_node(node: &LogicNode) -> Option<Self> {
        match node {
            LogicNode::Relation(relation) => Some(relation.clone()),
            _ => None,
        }
    }

    fn parse_literal(text: &str) -> Result<Self> {
        parse_relation(text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Atom<L> {
    pub lit: L,
    pub negated: bool,
}

impl<L> Atom<L> {
    pub fn new(lit: L, negated: bool) -> Self {
        Self { lit, negated }
    }

    pub fn positive(lit: L) -> Self {
        Self::new(lit, false)
    }

    pub fn negative(lit: L) -> Self {
        Self::new(lit, true)
    }
}

impl<L: Clone> Atom<L> {
    pub fn complement(&self) -> Self {
        Self::new(self.lit.clone(), !self.negated)
    }
}

impl Atom<Relation> {
    pub fn instantiate(&self, substitution: &Substitution) -> Self {
        Self::new(self.lit.instantiate(substitution), self.negated)
    }
}

impl<L: fmt::Display> fmt::Display for Atom<L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.negated {
            write!(f, "!{}", self.lit)
        } else {
            write!(f, "{}", self.lit)
        }
    }
}

/// A disjunction of atoms. Atom order is kept for display only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Clause<L> {
    pub atoms: Vec<Atom<L>>,
}

impl<L> Clause<L> {
    pub fn new(atoms: Vec<Atom<L>>) -> Self {
        Self { atoms }
    }

    pub fn add(&mut self, atom: Atom<L>) {
        self.atoms.push(atom);
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn is_positive(&self) -> bool {
        self.atoms.iter().all(|atom| !atom.negated)
    }
}

impl<L: PartialEq> Clause<L> {
    pub fn contains(&self, atom: &Atom<L>) -> bool {
        self.atoms.contains(atom)
    }

    /// Whether some atom occurs more than once.
    pub fn is_factorizable(&self) -> bool {
        self.atoms
            .iter()
            .enumerate()
            .any(|(index, atom)| self.atoms[index + 1..].contains(atom))
    }
}

impl<L: Clone + PartialEq> Clause<L> {
    /// The clause with later duplicates of each atom removed.
    pub fn factorized(&self) -> Self {
        let mut atoms: Vec<Atom<L>> = vec![];
        for atom in &self.atoms {
            if !atoms.contains(atom) {
                atoms.push(atom.clone());
            }
        }
        Self { atoms }
    }
}

impl Clause<Relation> {
    pub fn instantiate(&self, substitution: &Substitution) -> Self {
        let atoms = self
            .atoms
            .iter()
            .map(|atom| atom.instantiate(substitution))
            .collect();
        Self { atoms }
    }

    /// Rename variables apart: `X` or `X_<n>` becomes `X_<suffix>`.
    pub fn with_suffix<S: ToString>(&self, suffix: S) -> Self {
        let mut renamer = SuffixRenamer::new(suffix);
        let atoms = self
            .atoms
            .iter()
            .map(|atom| Atom::new(renamer.relation(atom.lit.clone()), atom.negated))
            .collect();
        Self { atoms }
    }
}

impl<L> Default for Clause<L> {
    fn default() -> Self {
        Self::new(vec![])
    }
}

/// Multiset equality: order is ignored, multiplicity is not.
impl<L: PartialEq> PartialEq for Clause<L> {
    fn eq(&self, other: &Self) -> bool {
        let count = |clause: &Self, atom: &Atom<L>| {
            clause.atoms.iter().filter(|other| *other == atom).count()
        };
        self.len() == other.len()
            && self
                .atoms
                .iter()
                .all(|atom| count(self, atom) == count(other, atom))
    }
}

impl<L: fmt::Display> fmt::Display for Clause<L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (index, atom) in self.atoms.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", atom)?;
        }
        write!(f, "}}")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClauseSet<L> {
    pub clauses: Vec<Clause<L>>,
}

impl<L> ClauseSet<L> {
    pub fn new(clauses: Vec<Clause<L>>) -> Self {
        Self { clauses }
    }

    pub fn add(&mut self, clause: Clause<L>) {
        self.clauses.push(clause);
    }

    pub fn unite(&mut self, other: Self) {
        self.clauses.extend(other.clauses);
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Clause<L>> {
        self.clauses.get(index)
    }

    pub fn has_empty_clause(&self) -> bool {
        self.clauses.iter().any(Clause::is_empty)
    }
}

impl<L> Default for ClauseSet<L> {
    fn default() -> Self {
        Self::new(vec![])
    }
}

impl<L: fmt::Display> fmt::Display for ClauseSet<L> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, clause) in self.clauses.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}
