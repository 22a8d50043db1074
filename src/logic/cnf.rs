use crate::clause::{Atom, Clause, ClauseSet, Literal};
use crate::error::{CalculusError, Result};
use crate::logic::nnf::SkolemNormalForm;
use crate::logic::node::LogicNode;
use crate::logic::term::Relation;
use serde::{Deserialize, Serialize};

/// Clause count beyond which the optimal strategy gives up on naive
/// expansion.
pub const CNF_BLOWUP_LIMIT: usize = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CnfStrategy {
    Naive,
    Tseytin,
    Optimal,
}

impl Default for CnfStrategy {
    fn default() -> Self {
        Self::Optimal
    }
}

/// Clause normal form of a propositional formula.
pub fn clausify(formula: &LogicNode, strategy: CnfStrategy) -> Result<ClauseSet<String>> {
    match strategy {
        CnfStrategy::Naive => naive_cnf(formula),
        CnfStrategy::Tseytin => tseytin_cnf(formula),
        CnfStrategy::Optimal => {
            let tseytin = tseytin_cnf(formula)?;
            let limit = tseytin.len().min(CNF_BLOWUP_LIMIT);
            let naive = Naive { limit: Some(limit) };
            Ok(naive.cnf(formula).unwrap_or(tseytin))
        }
    }
}

/// Skolemize, drop universal quantifiers and expand naively.
pub fn first_order_cnf(formula: &LogicNode) -> Result<ClauseSet<Relation>> {
    naive_cnf(&SkolemNormalForm::transform(formula.clone()))
}

pub fn naive_cnf<L: Literal>(formula: &LogicNode) -> Result<ClauseSet<L>> {
    Naive { limit: None }.cnf(formula)
}

fn quantified(formula: &LogicNode) -> CalculusError {
    CalculusError::FormulaConversion(format!(
        "Cannot convert formula with quantifiers to CNF: '{}'",
        formula
    ))
}

fn atom<L: Literal>(formula: &LogicNode, negated: bool) -> Result<ClauseSet<L>> {
    let lit = L::from_node(formula).ok_or_else(|| {
        CalculusError::FormulaConversion(format!(
            "'{}' is not an atomic formula of this logic",
            formula
        ))
    })?;
    Ok(ClauseSet::new(vec![Clause::new(vec![Atom::new(lit, negated)])]))
}

fn negate(node: &LogicNode) -> LogicNode {
    LogicNode::not(node.clone())
}

struct Naive {
    limit: Option<usize>,
}

impl Naive {
    fn cnf<L: Literal>(&self, formula: &LogicNode) -> Result<ClauseSet<L>> {
        match formula {
            LogicNode::Var(_) | LogicNode::Relation(_) => atom(formula, false),
            LogicNode::Not(child) => self.negated(child),
            LogicNode::And(left, right) => {
                let mut clauses = self.cnf(left)?;
                clauses.unite(self.cnf(right)?);
                self.check(clauses.len())?;
                Ok(clauses)
            }
            LogicNode::Or(left, right) => {
                let left = self.cnf(left)?;
                let right = self.cnf(right)?;
                self.check(left.len() * right.len())?;
                let mut clauses = ClauseSet::default();
                for l in &left.clauses {
                    for r in &right.clauses {
                        let mut atoms = l.atoms.clone();
                        atoms.extend(r.atoms.iter().cloned());
                        clauses.add(Clause::new(atoms));
                    }
                }
                Ok(clauses)
            }
            LogicNode::Impl(_, _) | LogicNode::Equiv(_, _) => {
                self.cnf(&formula.clone().to_basic_ops())
            }
            LogicNode::All(_, _) | LogicNode::Ex(_, _) => Err(quantified(formula)),
        }
    }

    fn negated<L: Literal>(&self, formula: &LogicNode) -> Result<ClauseSet<L>> {
        match formula {
            LogicNode::Var(_) | LogicNode::Relation(_) => atom(formula, true),
            LogicNode::Not(child) => self.cnf(child),
            LogicNode::And(left, right) => self.cnf(&LogicNode::or(negate(left), negate(right))),
            LogicNode::Or(left, right) => self.cnf(&LogicNode::and(negate(left), negate(right))),
            LogicNode::Impl(left, right) => {
                self.cnf(&LogicNode::and((**left).clone(), negate(right)))
            }
            LogicNode::Equiv(left, right) => {
                let forward = LogicNode::Impl(left.clone(), right.clone());
                let backward = LogicNode::Impl(right.clone(), left.clone());
                self.negated(&LogicNode::and(forward, backward))
            }
            LogicNode::All(_, _) | LogicNode::Ex(_, _) => Err(quantified(formula)),
        }
    }

    fn check(&self, clauses: usize) -> Result<()> {
        match self.limit {
            Some(limit) if clauses > limit => Err(CalculusError::FormulaConversion(
                format!("Naive CNF exceeds {} clauses", limit),
            )),
            _ => Ok(()),
        }
    }
}

/// Equisatisfiable clause set with one auxiliary variable per subformula.
/// The first clause asserts the root.
pub fn tseytin_cnf(formula: &LogicNode) -> Result<ClauseSet<String>> {
    let mut clauses = ClauseSet::default();
    clauses.add(Clause::new(vec![Atom::positive(tseytin_name(formula, 0)?)]));
    tseytin(formula, &mut clauses, 0)?;
    Ok(clauses)
}

fn tseytin_name(formula: &LogicNode, index: usize) -> Result<String> {
    match formula {
        LogicNode::Var(name) => Ok(format!("var{}", name)),
        LogicNode::Not(_) => Ok(format!("not{}", index)),
        LogicNode::And(_, _) => Ok(format!("and{}", index)),
        LogicNode::Or(_, _) => Ok(format!("or{}", index)),
        LogicNode::Impl(_, _) => Ok(format!("impl{}", index)),
        LogicNode::Equiv(_, _) => Ok(format!("equiv{}", index)),
        LogicNode::Relation(_) => Err(CalculusError::FormulaConversion(format!(
            "Tseytin transformation is only defined for propositional formulas, found '{}'",
            formula
        ))),
        LogicNode::All(_, _) | LogicNode::Ex(_, _) => Err(quantified(formula)),
    }
}

fn clause(atoms: &[(&str, bool)]) -> Clause<String> {
    Clause::new(
        atoms
            .iter()
            .map(|(name, negated)| Atom::new(name.to_string(), *negated))
            .collect(),
    )
}

// Returns the next unused pre-order index.
fn tseytin(
    formula: &LogicNode,
    clauses: &mut ClauseSet<String>,
    index: usize,
) -> Result<usize> {
    let me = tseytin_name(formula, index)?;
    let (left, right) = match formula {
        LogicNode::Var(_) => return Ok(index + 1),
        LogicNode::Not(child) => {
            let child_index = index + 1;
            let next = tseytin(child, clauses, child_index)?;
            let child = tseytin_name(child, child_index)?;
            clauses.add(clause(&[(&child, true), (&me, true)]));
            clauses.add(clause(&[(&child, false), (&me, false)]));
            return Ok(next);
        }
        LogicNode::And(left, right)
        | LogicNode::Or(left, right)
        | LogicNode::Impl(left, right)
        | LogicNode::Equiv(left, right) => (left, right),
        _ => return Err(quantified(formula)),
    };

    let left_index = index + 1;
    let right_index = tseytin(left, clauses, left_index)?;
    let next = tseytin(right, clauses, right_index)?;
    let l = tseytin_name(left, left_index)?;
    let r = tseytin_name(right, right_index)?;
    let (l, r, s) = (l.as_str(), r.as_str(), me.as_str());
    match formula {
        LogicNode::And(_, _) => {
            clauses.add(clause(&[(l, false), (s, true)]));
            clauses.add(clause(&[(r, false), (s, true)]));
            clauses.add(clause(&[(l, true), (r, true), (s, false)]));
        }
        LogicNode::Or(_, _) => {
            clauses.add(clause(&[(l, true), (s, false)]));
            clauses.add(clause(&[(r, true), (s, false)]));
            clauses.add(clause(&[(l, false), (r, false), (s, true)]));
        }
        LogicNode::Impl(_, _) => {
            clauses.add(clause(&[(l, false), (s, false)]));
            clauses.add(clause(&[(r, true), (s, false)]));
            clauses.add(clause(&[(l, true), (r, false), (s, true)]));
        }
        _ => {
            clauses.add(clause(&[(l, false), (r, true), (s, true)]));
            clauses.add(clause(&[(l, true), (r, false), (s, true)]));
            clauses.add(clause(&[(l, true), (r, true), (s, false)]));
            clauses.add(clause(&[(l, false), (r, false), (s, false)]));
        }
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::parse::{parse_first_order, parse_propositional};

    fn naive(text: &str) -> String {
        let formula = parse_propositional(text).unwrap();
        naive_cnf::<String>(&formula).unwrap().to_string()
    }

    fn tseytin(text: &str) -> String {
        let formula = parse_propositional(text).unwrap();
        tseytin_cnf(&formula).unwrap().to_string()
    }

    mod naive {
        use super::*;

        #[test]
        fn atoms() {
            assert_eq!(naive("a"), "{a}");
            assert_eq!(naive("!a"), "{!a}");
            assert_eq!(naive("!!a"), "{a}");
        }

        #[test]
        fn distributes_or_over_and() {
            assert_eq!(naive("(a & b) | c"), "{a, c}, {b, c}");
            assert_eq!(naive("(a & b) | (c & d)"), "{a, c}, {a, d}, {b, c}, {b, d}");
        }

        #[test]
        fn de_morgan() {
            assert_eq!(naive("!(a | b)"), "{!a}, {!b}");
            assert_eq!(naive("!(a & b)"), "{!a, !b}");
        }

        #[test]
        fn implications() {
            assert_eq!(naive("a -> b"), "{!a, b}");
            assert_eq!(naive("!(a -> b)"), "{a}, {!b}");
            assert_eq!(naive("a <=> b"), "{a, !a}, {a, !b}, {b, !a}, {b, !b}");
            assert_eq!(naive("!(a <=> b)"), "{a, b}, {a, !a}, {!b, b}, {!b, !a}");
        }

        #[test]
        fn rejects_quantifiers() {
            let formula = parse_first_order("\\all X: P(X)").unwrap();
            let error = naive_cnf::<Relation>(&formula).unwrap_err();
            assert_eq!(error.kind(), "FormulaConversionException");
        }

        #[test]
        fn rejects_foreign_atoms() {
            let formula = parse_first_order("P(a)").unwrap();
            assert!(naive_cnf::<String>(&formula).is_err());
        }
    }

    mod tseytin {
        use super::*;

        #[test]
        fn variable() {
            assert_eq!(tseytin("a"), "{vara}");
        }

        #[test]
        fn negation() {
            assert_eq!(tseytin("!a"), "{not0}, {!vara, !not0}, {vara, not0}");
        }

        #[test]
        fn conjunction() {
            assert_eq!(
                tseytin("a & b"),
                "{and0}, {vara, !and0}, {varb, !and0}, {!vara, !varb, and0}"
            );
        }

        #[test]
        fn indices_are_preorder() {
            let clauses = tseytin_cnf(&parse_propositional("!(a | b) -> !c").unwrap()).unwrap();
            let names: Vec<String> = clauses
                .clauses
                .iter()
                .flat_map(|clause| clause.atoms.iter().map(|atom| atom.lit.clone()))
                .collect();
            assert_eq!(names[0], "impl0");
            assert!(names.contains(&"not1".to_string()));
            assert!(names.contains(&"or2".to_string()));
            assert!(names.contains(&"not5".to_string()));
        }

        #[test]
        fn rejects_quantifiers() {
            let formula = parse_first_order("\\ex X: P(X)").unwrap();
            assert!(tseytin_cnf(&formula).is_err());
        }
    }

    mod strategy {
        use super::*;

        #[test]
        fn optimal_prefers_smaller() {
            let small = parse_propositional("a & b").unwrap();
            assert_eq!(clausify(&small, CnfStrategy::Optimal).unwrap().to_string(), "{a}, {b}");

            let blowup = parse_propositional(
                "(a & b) | (c & d) | (e & f) | (g & h) | (i & j) | (k & l)",
            )
            .unwrap();
            let optimal = clausify(&blowup, CnfStrategy::Optimal).unwrap();
            let tseytin = tseytin_cnf(&blowup).unwrap();
            assert_eq!(optimal, tseytin);
        }
    }

    #[test]
    fn first_order() {
        let formula = parse_first_order("\\all X: (P(X) -> \\ex Y: R(X, Y))").unwrap();
        let clauses = first_order_cnf(&formula).unwrap();
        assert_eq!(clauses.to_string(), "{!P(X), R(X, sk1(X))}");
    }
}
