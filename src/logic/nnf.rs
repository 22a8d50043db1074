use crate::logic::node::LogicNode;
use crate::logic::term::Term;
use fnv::FnvHashMap;

/// Push negations down to atoms, eliminating implications and
/// equivalences. Quantifiers are kept and dualised under negation.
pub fn negation_normal_form(formula: LogicNode) -> LogicNode {
    nnf(true, formula)
}

fn nnf(polarity: bool, formula: LogicNode) -> LogicNode {
    match (polarity, formula) {
        (_, LogicNode::Not(negated)) => nnf(!polarity, *negated),
        (true, atom @ LogicNode::Var(_)) | (true, atom @ LogicNode::Relation(_)) => atom,
        (false, atom @ LogicNode::Var(_)) | (false, atom @ LogicNode::Relation(_)) => {
            LogicNode::not(atom)
        }
        (true, LogicNode::And(p, q)) | (false, LogicNode::Or(p, q)) => {
            LogicNode::and(nnf(polarity, *p), nnf(polarity, *q))
        }
        (true, LogicNode::Or(p, q)) | (false, LogicNode::And(p, q)) => {
            LogicNode::or(nnf(polarity, *p), nnf(polarity, *q))
        }
        (true, LogicNode::Impl(p, q)) => LogicNode::or(nnf(false, *p), nnf(true, *q)),
        (false, LogicNode::Impl(p, q)) => LogicNode::and(nnf(true, *p), nnf(false, *q)),
        (_, LogicNode::Equiv(p, q)) => {
            let p = *p;
            let q = *q;
            let notp = nnf(false, p.clone());
            let p = nnf(true, p);
            let notq = nnf(!polarity, q.clone());
            let q = nnf(polarity, q);
            LogicNode::or(LogicNode::and(p, q), LogicNode::and(notp, notq))
        }
        (true, LogicNode::All(x, f)) | (false, LogicNode::Ex(x, f)) => {
            LogicNode::all(x, nnf(polarity, *f))
        }
        (true, LogicNode::Ex(x, f)) | (false, LogicNode::All(x, f)) => {
            LogicNode::ex(x, nnf(polarity, *f))
        }
    }
}

/// Skolemized negation normal form with universal quantifiers dropped.
/// Universally bound variables are renamed apart so that the remaining
/// free variables are distinct per binder.
#[derive(Default)]
pub struct SkolemNormalForm {
    bound: Vec<String>,
    replacements: Vec<(String, Term)>,
    used: FnvHashMap<String, usize>,
    fresh: usize,
}

impl SkolemNormalForm {
    pub fn transform(formula: LogicNode) -> LogicNode {
        Self::default().formula(true, formula)
    }

    fn formula(&mut self, polarity: bool, formula: LogicNode) -> LogicNode {
        match (polarity, formula) {
            (_, LogicNode::Not(negated)) => self.formula(!polarity, *negated),
            (_, LogicNode::Relation(relation)) => {
                let atom = LogicNode::Relation(relation.subst(&self.replacements));
                if polarity {
                    atom
                } else {
                    LogicNode::not(atom)
                }
            }
            (_, atom @ LogicNode::Var(_)) => {
                if polarity {
                    atom
                } else {
                    LogicNode::not(atom)
                }
            }
            (true, LogicNode::And(p, q)) | (false, LogicNode::Or(p, q)) => {
                let p = self.formula(polarity, *p);
                let q = self.formula(polarity, *q);
                LogicNode::and(p, q)
            }
            (true, LogicNode::Or(p, q)) | (false, LogicNode::And(p, q)) => {
                let p = self.formula(polarity, *p);
                let q = self.formula(polarity, *q);
                LogicNode::or(p, q)
            }
            (_, LogicNode::Impl(p, q)) => {
                let p = LogicNode::not(*p);
                let f = LogicNode::Or(Box::new(p), q);
                self.formula(polarity, f)
            }
            (_, LogicNode::Equiv(p, q)) => {
                let p = *p;
                let q = *q;
                let both = LogicNode::and(p.clone(), q.clone());
                let neither = LogicNode::and(LogicNode::not(p), LogicNode::not(q));
                self.formula(polarity, LogicNode::or(both, neither))
            }
            (true, LogicNode::All(x, f)) | (false, LogicNode::Ex(x, f)) => {
                let name = self.rename(&x);
                self.bound.push(name.clone());
                self.replacements.push((x, Term::Var(name)));
                let f = self.formula(polarity, *f);
                self.replacements.pop();
                self.bound.pop();
                f
            }
            (true, LogicNode::Ex(x, f)) | (false, LogicNode::All(x, f)) => {
                self.fresh += 1;
                let name = format!("sk{}", self.fresh);
                let skolem = if self.bound.is_empty() {
                    Term::Const(name)
                } else {
                    Term::Fun(name, self.bound.iter().cloned().map(Term::Var).collect())
                };
                self.replacements.push((x, skolem));
                let f = self.formula(polarity, *f);
                self.replacements.pop();
                f
            }
        }
    }

    fn rename(&mut self, variable: &str) -> String {
        let count = self.used.entry(variable.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            variable.to_string()
        } else {
            format!("{}_{}", variable, *count - 1)
        }
    }
}
