use crate::wire::logic::{RelationJson, TermJson};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A first-order term.
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "TermJson", into = "TermJson")]
pub enum Term {
    /// `QuantifiedVariable`: uppercase-initial, bound by a quantifier or
    /// implicitly universal once quantifiers are stripped.
    Var(String),
    Const(String),
    Fun(String, Vec<Term>),
}

/// Variable name to replacement term. Ordered so that display and sealing
/// are deterministic.
pub type Substitution = BTreeMap<String, Term>;

impl Term {
    pub fn var<S: Into<String>>(name: S) -> Self {
        Self::Var(name.into())
    }

    pub fn constant<S: Into<String>>(name: S) -> Self {
        Self::Const(name.into())
    }

    pub fn function<S: Into<String>>(name: S, args: Vec<Term>) -> Self {
        Self::Fun(name.into(), args)
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Self::Var(_))
    }

    pub fn occurs(&self, variable: &str) -> bool {
        match self {
            Self::Var(x) => x == variable,
            Self::Const(_) => false,
            Self::Fun(_, args) => args.iter().any(|arg| arg.occurs(variable)),
        }
    }

    pub fn vars<E: Extend<String>>(&self, vars: &mut E) {
        match self {
            Self::Var(x) => vars.extend(std::iter::once(x.clone())),
            Self::Const(_) => {}
            Self::Fun(_, args) => {
                for arg in args {
                    arg.vars(vars);
                }
            }
        }
    }

    /// Replace variables by the most recent matching entry of `lookup`.
    pub fn subst(self, lookup: &[(String, Term)]) -> Self {
        match self {
            Self::Var(x) => {
                if let Some((_, term)) = lookup.iter().rev().find(|(y, _)| &x == y)
                {
                    term.clone()
                } else {
                    Self::Var(x)
                }
            }
            Self::Const(_) => self,
            Self::Fun(f, args) => Self::Fun(
                f,
                args.into_iter().map(|term| term.subst(lookup)).collect(),
            ),
        }
    }

    pub fn instantiate(&self, substitution: &Substitution) -> Self {
        match self {
            Self::Var(x) => substitution.get(x).cloned().unwrap_or_else(|| self.clone()),
            Self::Const(_) => self.clone(),
            Self::Fun(f, args) => Self::Fun(
                f.clone(),
                args.iter().map(|arg| arg.instantiate(substitution)).collect(),
            ),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Var(name) | Self::Const(name) => write!(f, "{}", name),
            Self::Fun(name, args) => {
                write!(f, "{}(", name)?;
                write_args(f, args)?;
                write!(f, ")")
            }
        }
    }
}

fn write_args(f: &mut fmt::Formatter, args: &[Term]) -> fmt::Result {
    for (index, arg) in args.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    Ok(())
}

/// An applied predicate symbol, the literal payload of first-order clauses.
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "RelationJson", into = "RelationJson")]
pub struct Relation {
    pub name: String,
    pub args: Vec<Term>,
}

impl Relation {
    pub fn new<S: Into<String>>(name: S, args: Vec<Term>) -> Self {
        let name = name.into();
        Self { name, args }
    }

    pub fn instantiate(&self, substitution: &Substitution) -> Self {
        let name = self.name.clone();
        let args = self
            .args
            .iter()
            .map(|arg| arg.instantiate(substitution))
            .collect();
        Self { name, args }
    }

    pub fn subst(self, lookup: &[(String, Term)]) -> Self {
        let name = self.name;
        let args = self.args.into_iter().map(|arg| arg.subst(lookup)).collect();
        Self { name, args }
    }

    pub fn vars<E: Extend<String>>(&self, vars: &mut E) {
        for arg in &self.args {
            arg.vars(vars);
        }
    }

    pub fn same_symbol(&self, other: &Self) -> bool {
        self.name == other.name && self.args.len() == other.args.len()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        write_args(f, &self.args)?;
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Relation {
        let inner = Term::function("f", vec![Term::constant("d"), Term::var("X")]);
        Relation::new("NewRel", vec![Term::constant("c"), inner])
    }

    #[test]
    fn display() {
        assert_eq!(sample().to_string(), "NewRel(c, f(d, X))");
        assert_eq!(
            Relation::new("R1", vec![Term::constant("Abc")]).to_string(),
            "R1(Abc)"
        );
    }

    #[test]
    fn instantiate_leaves_unbound_variables() {
        let mut substitution = Substitution::new();
        substitution.insert("Y".to_string(), Term::constant("a"));
        assert_eq!(sample().instantiate(&substitution), sample());

        substitution.insert("X".to_string(), Term::constant("a"));
        assert_eq!(
            sample().instantiate(&substitution).to_string(),
            "NewRel(c, f(d, a))"
        );
    }

    #[test]
    fn subst_prefers_innermost_binding() {
        let lookup = vec![
            ("X".to_string(), Term::constant("outer")),
            ("X".to_string(), Term::constant("inner")),
        ];
        assert_eq!(Term::var("X").subst(&lookup), Term::constant("inner"));
    }

    #[test]
    fn occurs() {
        let term = Term::function("g", vec![Term::function("h", vec![Term::var("Z")])]);
        assert!(term.occurs("Z"));
        assert!(!term.occurs("X"));
    }
}
