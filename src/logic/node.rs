use crate::logic::term::{Relation, Term};
use crate::logic::transform::{Transform, Visit};
use crate::wire::logic::NodeJson;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Propositional and first-order formulas.
///
/// Derived equality is syntactic: identical shape and identical spellings,
/// with no renaming or unification.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "NodeJson", into = "NodeJson")]
pub enum LogicNode {
    Var(String),
    Not(Box<LogicNode>),
    And(Box<LogicNode>, Box<LogicNode>),
    Or(Box<LogicNode>, Box<LogicNode>),
    Impl(Box<LogicNode>, Box<LogicNode>),
    Equiv(Box<LogicNode>, Box<LogicNode>),
    Relation(Relation),
    All(String, Box<LogicNode>),
    Ex(String, Box<LogicNode>),
}

impl LogicNode {
    pub fn var<S: Into<String>>(name: S) -> Self {
        Self::Var(name.into())
    }

    pub fn not(child: Self) -> Self {
        Self::Not(Box::new(child))
    }

    pub fn and(left: Self, right: Self) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Self, right: Self) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    pub fn implies(left: Self, right: Self) -> Self {
        Self::Impl(Box::new(left), Box::new(right))
    }

    pub fn equiv(left: Self, right: Self) -> Self {
        Self::Equiv(Box::new(left), Box::new(right))
    }

    pub fn relation<S: Into<String>>(name: S, args: Vec<Term>) -> Self {
        Self::Relation(Relation::new(name, args))
    }

    pub fn all<S: Into<String>>(variable: S, child: Self) -> Self {
        Self::All(variable.into(), Box::new(child))
    }

    pub fn ex<S: Into<String>>(variable: S, child: Self) -> Self {
        Self::Ex(variable.into(), Box::new(child))
    }

    pub fn accept<T: Transform + ?Sized>(self, transform: &mut T) -> Self {
        transform.node(self)
    }

    pub fn visit<V: Visit + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_node(self)
    }

    /// Rewrite `a -> b` to `!a | b` and `a <=> b` to `(a & b) | (!a & !b)`.
    pub fn to_basic_ops(self) -> Self {
        match self {
            Self::Var(_) | Self::Relation(_) => self,
            Self::Not(child) => Self::not(child.to_basic_ops()),
            Self::And(left, right) => {
                Self::and(left.to_basic_ops(), right.to_basic_ops())
            }
            Self::Or(left, right) => {
                Self::or(left.to_basic_ops(), right.to_basic_ops())
            }
            Self::Impl(left, right) => {
                Self::or(Self::not(left.to_basic_ops()), right.to_basic_ops())
            }
            Self::Equiv(left, right) => {
                let left = left.to_basic_ops();
                let right = right.to_basic_ops();
                let both = Self::and(left.clone(), right.clone());
                let neither = Self::and(Self::not(left), Self::not(right));
                Self::or(both, neither)
            }
            Self::All(variable, child) => Self::all(variable, child.to_basic_ops()),
            Self::Ex(variable, child) => Self::ex(variable, child.to_basic_ops()),
        }
    }

    pub fn is_quantifier_free(&self) -> bool {
        match self {
            Self::Var(_) | Self::Relation(_) => true,
            Self::Not(child) => child.is_quantifier_free(),
            Self::And(left, right)
            | Self::Or(left, right)
            | Self::Impl(left, right)
            | Self::Equiv(left, right) => {
                left.is_quantifier_free() && right.is_quantifier_free()
            }
            Self::All(_, _) | Self::Ex(_, _) => false,
        }
    }
}

impl fmt::Display for LogicNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Var(name) => write!(f, "{}", name),
            Self::Not(child) => write!(f, "!{}", child),
            Self::And(left, right) => write!(f, "({} ∧ {})", left, right),
            Self::Or(left, right) => write!(f, "({} ∨ {})", left, right),
            Self::Impl(left, right) => write!(f, "({} --> {})", left, right),
            Self::Equiv(left, right) => write!(f, "({} <=> {})", left, right),
            Self::Relation(relation) => write!(f, "{}", relation),
            Self::All(variable, child) => write!(f, "(∀{}: {})", variable, child),
            Self::Ex(variable, child) => write!(f, "(∃{}: {})", variable, child),
        }
    }
}

impl From<Relation> for LogicNode {
    fn from(relation: Relation) -> Self {
        Self::Relation(relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> LogicNode {
        LogicNode::var(name)
    }

    #[test]
    fn display_propositional() {
        let formula = LogicNode::all("X", LogicNode::or(var("X"), LogicNode::not(var("X"))));
        assert_eq!(formula.to_string(), "(∀X: (X ∨ !X))");
        assert_eq!(LogicNode::implies(var("a"), var("b")).to_string(), "(a --> b)");
        assert_eq!(LogicNode::equiv(var("a"), var("b")).to_string(), "(a <=> b)");
    }

    #[test]
    fn display_first_order() {
        let body = LogicNode::relation(
            "=",
            vec![
                Term::var("Y"),
                Term::function("m", vec![Term::var("X"), Term::var("Y")]),
            ],
        );
        let formula = LogicNode::ex("X", LogicNode::all("Y", body));
        assert_eq!(formula.to_string(), "(∃X: (∀Y: =(Y, m(X, Y))))");

        let negated = LogicNode::ex(
            "C",
            LogicNode::not(LogicNode::relation("Q", vec![Term::var("C")])),
        );
        assert_eq!(negated.to_string(), "(∃C: !Q(C))");
    }

    #[test]
    fn structural_equality_is_syntactic() {
        let left = LogicNode::and(var("a"), var("b"));
        assert_eq!(left.clone(), LogicNode::and(var("a"), var("b")));
        assert_ne!(left, LogicNode::and(var("b"), var("a")));
        assert_ne!(
            LogicNode::relation("R", vec![Term::var("X")]),
            LogicNode::relation("R", vec![Term::var("Y")])
        );
    }

    #[test]
    fn basic_ops() {
        let implication = LogicNode::implies(var("a"), var("b")).to_basic_ops();
        assert_eq!(implication.to_string(), "(!a ∨ b)");

        let equivalence = LogicNode::equiv(var("a"), var("b")).to_basic_ops();
        assert_eq!(equivalence.to_string(), "((a ∧ b) ∨ (!a ∧ !b))");

        let nested = LogicNode::not(LogicNode::implies(
            var("a"),
            LogicNode::equiv(var("b"), var("c")),
        ))
        .to_basic_ops();
        assert_eq!(nested.to_string(), "!(!a ∨ ((b ∧ c) ∨ (!b ∧ !c)))");
    }

    #[test]
    fn quantifier_free() {
        assert!(LogicNode::and(var("a"), LogicNode::not(var("b"))).is_quantifier_free());
        assert!(!LogicNode::or(var("a"), LogicNode::all("X", var("b"))).is_quantifier_free());
    }
}
