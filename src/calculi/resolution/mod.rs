pub mod fo;
pub mod prop;

use crate::calculus::CloseMessage;
use crate::clause::{Atom, Clause, ClauseSet, Literal};
use crate::error::Result;
use crate::seal::ProtectedState;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Clause set under resolution, shared by the propositional and the
/// first-order calculus.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionState<L> {
    pub clause_set: ClauseSet<L>,
    pub hidden_clauses: ClauseSet<L>,
    pub highlight_selectable: bool,
    pub newest_node: Option<usize>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub seal: String,
}

impl<L: Literal> ResolutionState<L> {
    pub fn new(clause_set: ClauseSet<L>, highlight_selectable: bool) -> Self {
        let hidden_clauses = ClauseSet::default();
        let newest_node = None;
        let status_message = None;
        let seal = String::new();
        Self {
            clause_set,
            hidden_clauses,
            highlight_selectable,
            newest_node,
            status_message,
            seal,
        }
    }

    pub fn clause(&self, id: usize) -> Result<&Clause<L>> {
        self.clause_set
            .get(id)
            .ok_or_else(|| illegal_move!("There is no clause with id {}", id))
    }

    pub fn atom(&self, clause: usize, atom: usize) -> Result<&Atom<L>> {
        let found = self.clause(clause)?;
        found.atoms.get(atom).ok_or_else(|| {
            illegal_move!("There is no atom with id {} in clause '{}'", atom, found)
        })
    }

    fn push(&mut self, clause: Clause<L>) -> usize {
        self.clause_set.add(clause);
        let id = self.clause_set.len() - 1;
        self.newest_node = Some(id);
        id
    }

    /// Put `clause` in place of clause `id`, keeping the original hidden.
    fn replace(&mut self, id: usize, clause: Clause<L>) {
        let original = std::mem::replace(&mut self.clause_set.clauses[id], clause);
        self.hidden_clauses.add(original);
        self.newest_node = Some(id);
    }

    fn hide(mut self, id: usize) -> Result<Self> {
        self.clause(id)?;
        let clause = self.clause_set.clauses.remove(id);
        self.hidden_clauses.add(clause);
        self.newest_node = None;
        Ok(self)
    }

    fn show(mut self) -> Self {
        let hidden = std::mem::take(&mut self.hidden_clauses);
        self.clause_set.unite(hidden);
        self.newest_node = None;
        self
    }

    /// Main premiss and side premisses of a hyper resolution step, each
    /// side paired with the main atom it resolves and its own atom.
    fn premisses(
        &self,
        main: usize,
        atom_map: &AtomMap,
    ) -> Result<(Clause<L>, Vec<(usize, Clause<L>, usize)>)> {
        if atom_map.0.is_empty() {
            return Err(illegal_move!(
                "Please select side premisses for hyper resolution"
            ));
        }
        let main_clause = self.clause(main)?.clone();
        let mut sides = vec![];
        for (&atom, &(side, side_atom)) in &atom_map.0 {
            self.atom(main, atom)?;
            self.atom(side, side_atom)?;
            sides.push((atom, self.clause(side)?.clone(), side_atom));
        }
        Ok((main_clause, sides))
    }

    fn close_message(&self) -> CloseMessage {
        if self.clause_set.has_empty_clause() {
            CloseMessage::new(true, "The proof is closed")
        } else {
            CloseMessage::new(false, "The proof is not closed")
        }
    }
}

impl<L: Literal> ProtectedState for ResolutionState<L> {
    fn seal_info(&self) -> String {
        format!(
            "{}-resolutionstate|{}|{}|{}|{:?}|{:?}",
            L::LOGIC,
            self.clause_set,
            self.hidden_clauses,
            self.highlight_selectable,
            self.newest_node,
            self.status_message
        )
    }

    fn seal(&self) -> &str {
        &self.seal
    }

    fn set_seal(&mut self, seal: String) {
        self.seal = seal;
    }
}

/// Main premiss atom to the side premiss and atom it is resolved with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AtomMap(pub BTreeMap<usize, (usize, usize)>);

impl Serialize for AtomMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

// Keys arrive as strings once the move's tag has been buffered.
impl<'de> Deserialize<'de> for AtomMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, (usize, usize)>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, side)| {
                key.parse()
                    .map(|atom| (atom, side))
                    .map_err(|_| D::Error::custom(format!("invalid atom id '{}'", key)))
            })
            .collect::<Result<_, _>>()
            .map(AtomMap)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResolutionMove {
    #[serde(rename = "res-resolve")]
    Resolve {
        c1: usize,
        c2: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        literal: Option<String>,
    },
    #[serde(rename = "res-resolveunify")]
    ResolveUnify {
        c1: usize,
        c2: usize,
        l1: usize,
        l2: usize,
    },
    #[serde(rename = "res-resolvecustom")]
    ResolveCustom {
        c1: usize,
        c2: usize,
        l1: usize,
        l2: usize,
        #[serde(rename = "varAssign")]
        var_assign: BTreeMap<String, String>,
    },
    #[serde(rename = "res-instantiate")]
    Instantiate {
        c1: usize,
        #[serde(rename = "varAssign")]
        var_assign: BTreeMap<String, String>,
    },
    #[serde(rename = "res-hide")]
    Hide { c1: usize },
    #[serde(rename = "res-show")]
    Show,
    #[serde(rename = "res-hyper")]
    Hyper {
        #[serde(rename = "mainID")]
        main: usize,
        #[serde(rename = "atomMap")]
        atom_map: AtomMap,
    },
    #[serde(rename = "res-factorize")]
    Factorize {
        c1: usize,
        #[serde(default, rename = "atomIDs")]
        atoms: Vec<usize>,
    },
}

/// Drop every copy of `literal` from `first` and of its complement from
/// `second`, then merge the remainders without duplicates.
fn resolvent<L: Literal>(first: &Clause<L>, second: &Clause<L>, literal: &Atom<L>) -> Clause<L> {
    let complement = literal.complement();
    let atoms = first
        .atoms
        .iter()
        .filter(|atom| *atom != literal)
        .chain(second.atoms.iter().filter(|atom| **atom != complement))
        .cloned()
        .collect();
    Clause::new(atoms).factorized()
}

/// Fold side premisses into the main premiss. `sides` pairs each main
/// atom index with its side premiss and side atom index; all premisses
/// must already agree syntactically on the resolved literals.
fn hyper_resolvent<L: Literal>(
    main: &Clause<L>,
    sides: &[(usize, Clause<L>, usize)],
) -> Result<Clause<L>> {
    let mut atoms = vec![];
    for (index, atom) in main.atoms.iter().enumerate() {
        if !sides.iter().any(|(main_atom, _, _)| *main_atom == index) {
            atoms.push(atom.clone());
        }
    }

    for (main_atom, side, side_atom) in sides {
        let main_atom = &main.atoms[*main_atom];
        let side_atom = &side.atoms[*side_atom];
        if !side.is_positive() {
            return Err(illegal_move!("Side premiss '{}' is not positive", side));
        }
        if !main_atom.negated {
            return Err(illegal_move!(
                "Literal '{}' in main premiss '{}' is not negative",
                main_atom,
                main
            ));
        }
        if main_atom.lit != side_atom.lit {
            return Err(illegal_move!(
                "Literals '{}' and '{}' do not match",
                main_atom,
                side_atom
            ));
        }
        atoms.extend(side.atoms.iter().filter(|atom| *atom != side_atom).cloned());
    }

    let clause = Clause::new(atoms).factorized();
    if !clause.is_positive() {
        return Err(illegal_move!("Resulting clause '{}' is not positive", clause));
    }
    Ok(clause)
}
