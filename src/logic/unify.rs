use crate::error::{CalculusError, Result};
use crate::logic::term::{Relation, Substitution, Term};
use fnv::FnvHashMap;
use std::collections::VecDeque;

fn impossible(message: String) -> CalculusError {
    CalculusError::UnificationImpossible(message)
}

/// Most general unifier of two relations.
pub fn unify(left: &Relation, right: &Relation) -> Result<Substitution> {
    unify_all(std::iter::once((left, right)))
}

/// Most general unifier solving every pair at once.
pub fn unify_all<'a, I>(pairs: I) -> Result<Substitution>
where
    I: IntoIterator<Item = (&'a Relation, &'a Relation)>,
{
    let mut constraints = VecDeque::new();
    for (left, right) in pairs {
        if !left.same_symbol(right) {
            return Err(impossible(format!(
                "Relations '{}' and '{}' have different names or arities",
                left, right
            )));
        }
        constraints.extend(left.args.iter().cloned().zip(right.args.iter().cloned()));
    }
    solve(constraints)
}

pub fn unify_terms(left: &Term, right: &Term) -> Result<Substitution> {
    let mut constraints = VecDeque::new();
    constraints.push_back((left.clone(), right.clone()));
    solve(constraints)
}

// Pairs in the queue do not yet have `mgu` applied.
fn solve(mut constraints: VecDeque<(Term, Term)>) -> Result<Substitution> {
    let mut mgu = Substitution::new();
    while let Some((left, right)) = constraints.pop_front() {
        let left = left.instantiate(&mgu);
        let right = right.instantiate(&mgu);
        if left == right {
            continue;
        }

        match (left, right) {
            (Term::Var(variable), right) => {
                if let Term::Fun(_, _) = right {
                    if right.occurs(&variable) {
                        return Err(impossible(format!(
                            "Variable '{}' would be instantiated with term '{}' that contains it",
                            variable, right
                        )));
                    }
                }
                let mut binding = Substitution::new();
                binding.insert(variable.clone(), right.clone());
                for value in mgu.values_mut() {
                    *value = value.instantiate(&binding);
                }
                mgu.insert(variable, right);
            }
            (left, right @ Term::Var(_)) => {
                constraints.push_back((right, left));
            }
            (Term::Fun(f, ts), Term::Fun(g, ss)) if f == g && ts.len() == ss.len() => {
                constraints.extend(ts.into_iter().zip(ss));
            }
            (left, right) => {
                return Err(impossible(format!(
                    "Cannot unify '{}' and '{}'",
                    left, right
                )));
            }
        }
    }
    Ok(mgu)
}

/// Whether `unifier` solves `left = right` as generally as the computed
/// MGU, up to renaming of variables. Relations without a unifier count as
/// satisfied, as the move using them fails later anyway.
pub fn is_mgu_or_not_unifiable(
    unifier: &Substitution,
    left: &Relation,
    right: &Relation,
) -> bool {
    let mgu = match unify(left, right) {
        Ok(mgu) => mgu,
        Err(_) => return true,
    };
    let instance = left.instantiate(unifier);
    instance == right.instantiate(unifier)
        && is_variant(&instance, &left.instantiate(&mgu))
}

/// Equal up to a bijective renaming of variables.
pub fn is_variant(left: &Relation, right: &Relation) -> bool {
    let mut forward = FnvHashMap::default();
    let mut backward = FnvHashMap::default();
    left.same_symbol(right)
        && left
            .args
            .iter()
            .zip(right.args.iter())
            .all(|(s, t)| variant_terms(s, t, &mut forward, &mut backward))
}

fn variant_terms<'a>(
    left: &'a Term,
    right: &'a Term,
    forward: &mut FnvHashMap<&'a str, &'a str>,
    backward: &mut FnvHashMap<&'a str, &'a str>,
) -> bool {
    match (left, right) {
        (Term::Var(x), Term::Var(y)) => {
            let x = x.as_str();
            let y = y.as_str();
            *forward.entry(x).or_insert(y) == y && *backward.entry(y).or_insert(x) == x
        }
        (Term::Const(a), Term::Const(b)) => a == b,
        (Term::Fun(f, ts), Term::Fun(g, ss)) => {
            f == g
                && ts.len() == ss.len()
                && ts
                    .iter()
                    .zip(ss.iter())
                    .all(|(s, t)| variant_terms(s, t, forward, backward))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::parse::parse_relation;

    fn rel(text: &str) -> Relation {
        parse_relation(text).expect("relation")
    }

    fn show(substitution: &Substitution) -> String {
        substitution
            .iter()
            .map(|(variable, term)| format!("{}={}", variable, term))
            .collect::<Vec<_>>()
            .join(", ")
    }

    mod unify {
        use super::*;

        #[test]
        fn variable_with_constant() {
            let mgu = unify(&rel("R(X, b)"), &rel("R(a, Y)")).unwrap();
            assert_eq!(show(&mgu), "X=a, Y=b");
        }

        #[test]
        fn composes_bindings() {
            let left = rel("P(X, f(X))");
            let right = rel("P(g(Y), Z)");
            let mgu = unify(&left, &right).unwrap();
            assert_eq!(show(&mgu), "X=g(Y), Z=f(g(Y))");
            assert_eq!(left.instantiate(&mgu), right.instantiate(&mgu));
        }

        #[test]
        fn swaps_variable_to_the_left() {
            let mgu = unify(&rel("Q(f(a))"), &rel("Q(X)")).unwrap();
            assert_eq!(show(&mgu), "X=f(a)");
        }

        #[test]
        fn chains_variables() {
            let left = rel("R(X, Y, Z)");
            let right = rel("R(Y, Z, c)");
            let mgu = unify(&left, &right).unwrap();
            assert_eq!(left.instantiate(&mgu), right.instantiate(&mgu));
            assert_eq!(left.instantiate(&mgu).to_string(), "R(c, c, c)");
        }

        #[test]
        fn identical_relations() {
            assert!(unify(&rel("R(X, a)"), &rel("R(X, a)")).unwrap().is_empty());
        }

        #[test]
        fn occurs_check() {
            let error = unify(&rel("R(X)"), &rel("R(f(X))")).unwrap_err();
            assert_eq!(error.kind(), "UnificationImpossible");
        }

        #[test]
        fn name_or_arity_mismatch() {
            assert!(unify(&rel("R(X)"), &rel("Q(X)")).is_err());
            assert!(unify(&rel("R(X)"), &rel("R(X, Y)")).is_err());
        }

        #[test]
        fn clashing_symbols() {
            assert!(unify(&rel("R(a)"), &rel("R(b)")).is_err());
            assert!(unify(&rel("R(f(X))"), &rel("R(g(X))")).is_err());
            assert!(unify(&rel("R(f(X))"), &rel("R(f(X, Y))")).is_err());
            assert!(unify(&rel("R(a)"), &rel("R(f(a))")).is_err());
        }
    }

    mod unify_all {
        use super::*;

        #[test]
        fn consistent_across_pairs() {
            let pairs = vec![
                (rel("P(X)"), rel("P(a)")),
                (rel("Q(X, Y)"), rel("Q(Z, b)")),
            ];
            let mgu = unify_all(pairs.iter().map(|(l, r)| (l, r))).unwrap();
            for (left, right) in &pairs {
                assert_eq!(left.instantiate(&mgu), right.instantiate(&mgu));
            }
            assert_eq!(mgu["Z"], Term::constant("a"));
        }

        #[test]
        fn conflict_between_pairs() {
            let pairs = vec![(rel("P(X)"), rel("P(a)")), (rel("P(X)"), rel("P(b)"))];
            assert!(unify_all(pairs.iter().map(|(l, r)| (l, r))).is_err());
        }
    }

    mod equivalence {
        use super::*;

        fn substitution(pairs: &[(&str, Term)]) -> Substitution {
            pairs
                .iter()
                .map(|(variable, term)| (variable.to_string(), term.clone()))
                .collect()
        }

        #[test]
        fn renamed_mgu_is_accepted() {
            let unifier = substitution(&[("Y", Term::var("X"))]);
            assert!(is_mgu_or_not_unifiable(&unifier, &rel("R(X)"), &rel("R(Y)")));
        }

        #[test]
        fn overly_specific_unifier_is_rejected() {
            let unifier = substitution(&[("X", Term::constant("a")), ("Y", Term::constant("a"))]);
            assert!(!is_mgu_or_not_unifiable(&unifier, &rel("R(X)"), &rel("R(Y)")));
        }

        #[test]
        fn non_unifier_is_rejected() {
            let unifier = substitution(&[("X", Term::constant("a"))]);
            assert!(!is_mgu_or_not_unifiable(&unifier, &rel("R(X)"), &rel("R(b)")));
        }

        #[test]
        fn not_unifiable_is_accepted() {
            assert!(is_mgu_or_not_unifiable(&Substitution::new(), &rel("R(a)"), &rel("R(b)")));
        }

        #[test]
        fn variants() {
            assert!(is_variant(&rel("R(X, f(Y))"), &rel("R(A, f(B))")));
            assert!(!is_variant(&rel("R(X, X)"), &rel("R(A, B)")));
            assert!(!is_variant(&rel("R(X, Y)"), &rel("R(A, A)")));
        }
    }
}
