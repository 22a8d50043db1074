use crate::logic::node::LogicNode;
use crate::logic::term::{Relation, Substitution, Term};
use fnv::FnvHashSet;

/// Rewrites a formula bottom-up. Each method defaults to rebuilding the
/// node from its rewritten children, so implementors override only the
/// cases they care about.
pub trait Transform {
    fn node(&mut self, node: LogicNode) -> LogicNode {
        fold_node(self, node)
    }

    fn relation(&mut self, relation: Relation) -> Relation {
        fold_relation(self, relation)
    }

    fn term(&mut self, term: Term) -> Term {
        fold_term(self, term)
    }
}

pub fn fold_node<T: Transform + ?Sized>(
    transform: &mut T,
    node: LogicNode,
) -> LogicNode {
    match node {
        LogicNode::Var(_) => node,
        LogicNode::Not(child) => LogicNode::Not(Box::new(transform.node(*child))),
        LogicNode::And(left, right) => LogicNode::And(
            Box::new(transform.node(*left)),
            Box::new(transform.node(*right)),
        ),
        LogicNode::Or(left, right) => LogicNode::Or(
            Box::new(transform.node(*left)),
            Box::new(transform.node(*right)),
        ),
        LogicNode::Impl(left, right) => LogicNode::Impl(
            Box::new(transform.node(*left)),
            Box::new(transform.node(*right)),
        ),
        LogicNode::Equiv(left, right) => LogicNode::Equiv(
            Box::new(transform.node(*left)),
            Box::new(transform.node(*right)),
        ),
        LogicNode::Relation(relation) => LogicNode::Relation(transform.relation(relation)),
        LogicNode::All(variable, child) => LogicNode::All(variable, Box::new(transform.node(*child))),
        LogicNode::Ex(variable, child) => LogicNode::Ex(variable, Box::new(transform.node(*child))),
    }
}

pub fn fold_relation<T: Transform + ?Sized>(
    transform: &mut T,
    relation: Relation,
) -> Relation {
    let name = relation.name;
    let args = relation
        .args
        .into_iter()
        .map(|arg| transform.term(arg))
        .collect();
    Relation { name, args }
}

pub fn fold_term<T: Transform + ?Sized>(transform: &mut T, term: Term) -> Term {
    match term {
        Term::Fun(name, args) => Term::Fun(
            name,
            args.into_iter().map(|arg| transform.term(arg)).collect(),
        ),
        _ => term,
    }
}

/// Read-only counterpart of `Transform`.
pub trait Visit {
    fn visit_node(&mut self, node: &LogicNode) {
        walk_node(self, node)
    }

    fn visit_relation(&mut self, relation: &Relation) {
        for arg in &relation.args {
            self.visit_term(arg);
        }
    }

    fn visit_term(&mut self, term: &Term) {
        if let Term::Fun(_, args) = term {
            for arg in args {
                self.visit_term(arg);
            }
        }
    }
}

pub fn walk_node<V: Visit + ?Sized>(visitor: &mut V, node: &LogicNode) {
    match node {
        LogicNode::Var(_) => {}
        LogicNode::Not(child) | LogicNode::All(_, child) | LogicNode::Ex(_, child) => visitor.visit_node(child),
        LogicNode::And(left, right)
        | LogicNode::Or(left, right)
        | LogicNode::Impl(left, right)
        | LogicNode::Equiv(left, right) => {
            visitor.visit_node(left);
            visitor.visit_node(right);
        }
        LogicNode::Relation(relation) => visitor.visit_relation(relation),
    }
}

/// Applies a substitution to free variable occurrences. Occurrences bound
/// by a quantifier of the same name are left alone.
pub struct Instantiator<'a> {
    substitution: &'a Substitution,
    shadowed: Vec<String>,
}

impl<'a> Instantiator<'a> {
    pub fn new(substitution: &'a Substitution) -> Self {
        let shadowed = vec![];
        Self {
            substitution,
            shadowed,
        }
    }
}

impl Transform for Instantiator<'_> {
    fn node(&mut self, node: LogicNode) -> LogicNode {
        match node {
            LogicNode::All(variable, child) => {
                self.shadowed.push(variable.clone());
                let child = self.node(*child);
                self.shadowed.pop();
                LogicNode::All(variable, Box::new(child))
            }
            LogicNode::Ex(variable, child) => {
                self.shadowed.push(variable.clone());
                let child = self.node(*child);
                self.shadowed.pop();
                LogicNode::Ex(variable, Box::new(child))
            }
            _ => fold_node(self, node),
        }
    }

    fn term(&mut self, term: Term) -> Term {
        match term {
            Term::Var(name) => {
                if self.shadowed.contains(&name) {
                    return Term::Var(name);
                }
                match self.substitution.get(&name) {
                    Some(replacement) => replacement.clone(),
                    None => Term::Var(name),
                }
            }
            _ => fold_term(self, term),
        }
    }
}

/// Replace the variable bound by an outermost quantifier with `term`.
pub fn instantiate_bound(variable: &str, body: LogicNode, term: Term) -> LogicNode {
    let mut substitution = Substitution::new();
    substitution.insert(variable.to_string(), term);
    body.accept(&mut Instantiator::new(&substitution))
}

/// Renames every variable `X` or `X_<n>` to `X_<suffix>`.
pub struct SuffixRenamer {
    suffix: String,
}

impl SuffixRenamer {
    pub fn new<S: ToString>(suffix: S) -> Self {
        let suffix = suffix.to_string();
        Self { suffix }
    }
}

impl Transform for SuffixRenamer {
    fn term(&mut self, term: Term) -> Term {
        match term {
            Term::Var(name) => {
                Term::Var(format!("{}_{}", strip_suffix(&name), self.suffix))
            }
            _ => fold_term(self, term),
        }
    }
}

fn strip_suffix(name: &str) -> &str {
    match name.rfind('_') {
        Some(index)
            if index > 0
                && index + 1 < name.len()
                && name[index + 1..].bytes().all(|b| b.is_ascii_digit()) =>
        {
            &name[..index]
        }
        _ => name,
    }
}

/// Constant and function symbols occurring anywhere in a formula.
#[derive(Default)]
pub struct IdentifierCollector {
    pub identifiers: FnvHashSet<String>,
}

impl IdentifierCollector {
    pub fn collect<'a, I: IntoIterator<Item = &'a LogicNode>>(
        formulas: I,
    ) -> FnvHashSet<String> {
        let mut collector = Self::default();
        for formula in formulas {
            formula.visit(&mut collector);
        }
        collector.identifiers
    }
}

impl Visit for IdentifierCollector {
    fn visit_term(&mut self, term: &Term) {
        match term {
            Term::Var(_) => {}
            Term::Const(name) => {
                self.identifiers.insert(name.clone());
            }
            Term::Fun(name, args) => {
                self.identifiers.insert(name.clone());
                for arg in args {
                    self.visit_term(arg);
                }
            }
        }
    }
}

/// Variables with an occurrence outside the scope of any binder of the same
/// name, in order of first occurrence.
#[derive(Default)]
pub struct FreeVariables {
    bound: Vec<String>,
    pub free: Vec<String>,
}

impl FreeVariables {
    pub fn of(formula: &LogicNode) -> Vec<String> {
        let mut collector = Self::default();
        formula.visit(&mut collector);
        collector.free
    }
}

impl Visit for FreeVariables {
    fn visit_node(&mut self, node: &LogicNode) {
        match node {
            LogicNode::All(variable, child) | LogicNode::Ex(variable, child) => {
                self.bound.push(variable.clone());
                self.visit_node(child);
                self.bound.pop();
            }
            _ => walk_node(self, node),
        }
    }

    fn visit_term(&mut self, term: &Term) {
        match term {
            Term::Var(name) => {
                if !self.bound.contains(name) && !self.free.contains(name) {
                    self.free.push(name.clone());
                }
            }
            Term::Const(_) => {}
            Term::Fun(_, args) => {
                for arg in args {
                    self.visit_term(arg);
                }
            }
        }
    }
}

/// Every variable name in the formulas, bound or free.
#[derive(Default)]
pub struct VariableNames {
    pub names: FnvHashSet<String>,
}

impl VariableNames {
    pub fn collect<'a, I: IntoIterator<Item = &'a LogicNode>>(
        formulas: I,
    ) -> FnvHashSet<String> {
        let mut collector = Self::default();
        for formula in formulas {
            formula.visit(&mut collector);
        }
        collector.names
    }
}

impl Visit for VariableNames {
    fn visit_node(&mut self, node: &LogicNode) {
        if let LogicNode::All(variable, _) | LogicNode::Ex(variable, _) = node {
            self.names.insert(variable.clone());
        }
        walk_node(self, node)
    }

    fn visit_term(&mut self, term: &Term) {
        match term {
            Term::Var(name) => {
                self.names.insert(name.clone());
            }
            Term::Const(_) => {}
            Term::Fun(_, args) => {
                for arg in args {
                    self.visit_term(arg);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(name: &str, args: Vec<Term>) -> LogicNode {
        LogicNode::relation(name, args)
    }

    #[test]
    fn instantiator_respects_shadowing() {
        let formula = LogicNode::and(
            rel("P", vec![Term::var("X")]),
            LogicNode::all("X", rel("Q", vec![Term::var("X")])),
        );
        let mut substitution = Substitution::new();
        substitution.insert("X".to_string(), Term::constant("a"));
        let result = formula.accept(&mut Instantiator::new(&substitution));
        assert_eq!(result.to_string(), "(P(a) ∧ (∀X: Q(X)))");
    }

    #[test]
    fn instantiate_bound_variable() {
        let body = rel("R", vec![Term::var("X"), Term::function("f", vec![Term::var("X")])]);
        let result = instantiate_bound("X", body, Term::constant("c"));
        assert_eq!(result.to_string(), "R(c, f(c))");
    }

    #[test]
    fn suffix_renaming_replaces_old_suffix() {
        let formula = rel("R", vec![Term::var("X"), Term::var("Y_3"), Term::var("Z_a")]);
        let renamed = formula.accept(&mut SuffixRenamer::new(7));
        assert_eq!(renamed.to_string(), "R(X_7, Y_7, Z_a_7)");
    }

    #[test]
    fn identifiers() {
        let formula = LogicNode::all(
            "X",
            rel("R", vec![Term::var("X"), Term::function("f", vec![Term::constant("a")])]),
        );
        let identifiers = IdentifierCollector::collect(std::iter::once(&formula));
        assert!(identifiers.contains("a"));
        assert!(identifiers.contains("f"));
        assert!(!identifiers.contains("X"));
        assert!(!identifiers.contains("R"));
    }

    #[test]
    fn free_variables() {
        let formula = LogicNode::or(
            rel("P", vec![Term::var("Y"), Term::var("X")]),
            LogicNode::ex("Y", rel("Q", vec![Term::var("Y"), Term::var("Z")])),
        );
        assert_eq!(FreeVariables::of(&formula), vec!["Y", "X", "Z"]);
    }
}
