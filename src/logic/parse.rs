use crate::clause::{Atom, Clause, ClauseSet};
use crate::error::{CalculusError, Result};
use crate::logic::cnf::{clausify, CnfStrategy};
use crate::logic::node::LogicNode;
use crate::logic::term::{Relation, Substitution, Term};
use crate::logic::transform::FreeVariables;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, opt, verify},
    multi::{separated_list0, separated_list1},
    sequence::{delimited, preceded, terminated, tuple},
    Finish, IResult,
};
use std::collections::BTreeMap;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    Propositional,
    FirstOrder,
}

fn token<'a>(text: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(multispace0, tag(text))
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn starts_upper(name: &str) -> bool {
    name.chars().next().map_or(false, |c| c.is_ascii_uppercase())
}

fn identifier(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, take_while1(is_identifier_char))(input)
}

fn upper_identifier(input: &str) -> IResult<&str, &str> {
    verify(identifier, |name: &str| starts_upper(name))(input)
}

fn equivalence(logic: Logic, input: &str) -> IResult<&str, LogicNode> {
    let (mut input, mut left) = implication(logic, input)?;
    while let Ok((rest, right)) =
        preceded(token("<=>"), |i| implication(logic, i))(input)
    {
        left = LogicNode::equiv(left, right);
        input = rest;
    }
    Ok((input, left))
}

fn implication(logic: Logic, input: &str) -> IResult<&str, LogicNode> {
    let (input, left) = disjunction(logic, input)?;
    let arrow = alt((token("-->"), token("->")));
    match preceded(arrow, |i| implication(logic, i))(input) {
        Ok((rest, right)) => Ok((rest, LogicNode::implies(left, right))),
        Err(_) => Ok((input, left)),
    }
}

fn disjunction(logic: Logic, input: &str) -> IResult<&str, LogicNode> {
    let (mut input, mut left) = conjunction(logic, input)?;
    while let Ok((rest, right)) = preceded(token("|"), |i| conjunction(logic, i))(input) {
        left = LogicNode::or(left, right);
        input = rest;
    }
    Ok((input, left))
}

fn conjunction(logic: Logic, input: &str) -> IResult<&str, LogicNode> {
    let (mut input, mut left) = unary(logic, input)?;
    while let Ok((rest, right)) = preceded(token("&"), |i| unary(logic, i))(input) {
        left = LogicNode::and(left, right);
        input = rest;
    }
    Ok((input, left))
}

fn unary(logic: Logic, input: &str) -> IResult<&str, LogicNode> {
    preceded(
        multispace0,
        alt((
            map(preceded(char('!'), |i| unary(logic, i)), LogicNode::not),
            |i| quantifier(logic, i),
            delimited(char('('), |i| equivalence(logic, i), token(")")),
            |i| atom(logic, i),
        )),
    )(input)
}

fn quantifier(logic: Logic, input: &str) -> IResult<&str, LogicNode> {
    if logic == Logic::Propositional {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        )));
    }
    let (input, universal) =
        alt((map(tag("\\all"), |_| true), map(tag("\\ex"), |_| false)))(input)?;
    let (input, variable) = upper_identifier(input)?;
    let (input, _) = token(":")(input)?;
    let (input, child) = unary(logic, input)?;
    let node = if universal {
        LogicNode::all(variable, child)
    } else {
        LogicNode::ex(variable, child)
    };
    Ok((input, node))
}

fn atom(logic: Logic, input: &str) -> IResult<&str, LogicNode> {
    match logic {
        Logic::Propositional => map(identifier, LogicNode::var)(input),
        Logic::FirstOrder => map(relation, LogicNode::Relation)(input),
    }
}

fn relation(input: &str) -> IResult<&str, Relation> {
    let (input, name) = upper_identifier(input)?;
    let (input, args) =
        delimited(token("("), separated_list0(token(","), term), token(")"))(input)?;
    Ok((input, Relation::new(name, args)))
}

fn term(input: &str) -> IResult<&str, Term> {
    let (input, name) = identifier(input)?;
    if starts_upper(name) {
        return Ok((input, Term::var(name)));
    }
    match delimited(token("("), separated_list1(token(","), term), token(")"))(input) {
        Ok((rest, args)) => Ok((rest, Term::function(name, args))),
        Err(_) => Ok((input, Term::constant(name))),
    }
}

fn formula_list(logic: Logic, input: &str) -> IResult<&str, Vec<LogicNode>> {
    separated_list0(token(","), |i| equivalence(logic, i))(input)
}

fn complete<'a, O, P>(text: &'a str, parser: P) -> Result<O>
where
    P: FnMut(&'a str) -> IResult<&'a str, O>,
{
    all_consuming(terminated(parser, multispace0))(text)
        .finish()
        .map(|(_, output)| output)
        .map_err(|error| {
            let position = text.len() - error.input.len();
            let rest: String = error.input.chars().take(16).collect();
            let found = if rest.is_empty() {
                "end of input".to_string()
            } else {
                format!("'{}'", rest)
            };
            CalculusError::InvalidFormula(format!(
                "Unexpected {} at position {} in '{}'",
                found, position, text
            ))
        })
}

fn ensure_closed(formula: LogicNode) -> Result<LogicNode> {
    match FreeVariables::of(&formula).first() {
        Some(variable) => Err(CalculusError::InvalidFormula(format!(
            "Unbound variable '{}' in '{}'",
            variable, formula
        ))),
        None => Ok(formula),
    }
}

pub fn parse_propositional(text: &str) -> Result<LogicNode> {
    complete(text, |i| equivalence(Logic::Propositional, i))
}

/// Parse a closed first-order formula.
pub fn parse_first_order(text: &str) -> Result<LogicNode> {
    ensure_closed(complete(text, |i| equivalence(Logic::FirstOrder, i))?)
}

pub fn parse_formula(text: &str, logic: Logic) -> Result<LogicNode> {
    match logic {
        Logic::Propositional => parse_propositional(text),
        Logic::FirstOrder => parse_first_order(text),
    }
}

pub fn parse_term(text: &str) -> Result<Term> {
    complete(text, term)
}

pub fn parse_relation(text: &str) -> Result<Relation> {
    complete(text, relation)
}

/// Parse the replacement terms of a `{"X": "f(a)"}` style assignment.
pub fn parse_substitution(assignment: &BTreeMap<String, String>) -> Result<Substitution> {
    assignment
        .iter()
        .map(|(variable, text)| {
            let term = parse_term(text).map_err(|error| {
                CalculusError::InvalidFormula(format!(
                    "Could not parse term '{}': {}",
                    text, error
                ))
            })?;
            Ok((variable.clone(), term))
        })
        .collect()
}

/// Parse `left |- right`, or a plain formula list taken as the right side.
pub fn parse_sequent(text: &str, logic: Logic) -> Result<(Vec<LogicNode>, Vec<LogicNode>)> {
    let (left, right) = if text.contains("|-") {
        complete(
            text,
            map(
                tuple((
                    |i| formula_list(logic, i),
                    token("|-"),
                    |i| formula_list(logic, i),
                )),
                |(left, _, right)| (left, right),
            ),
        )?
    } else {
        (vec![], complete(text, |i| formula_list(logic, i))?)
    };
    if logic == Logic::FirstOrder {
        for formula in left.iter().chain(right.iter()) {
            ensure_closed(formula.clone())?;
        }
    }
    Ok((left, right))
}

fn is_clause_set_syntax(text: &str) -> bool {
    text.chars()
        .all(|c| is_identifier_char(c) || c.is_whitespace() || "!,;".contains(c))
}

fn clause_atom(input: &str) -> IResult<&str, Atom<String>> {
    let (input, negated) = opt(token("!"))(input)?;
    let (input, name) = identifier(input)?;
    Ok((input, Atom::new(name.to_string(), negated.is_some())))
}

fn clause(input: &str) -> IResult<&str, Clause<String>> {
    map(separated_list1(token(","), clause_atom), Clause::new)(input)
}

/// Parse `a, !b; c` clause notation. Clauses are separated by `;` or line
/// breaks, atoms by `,`.
pub fn parse_clause_set(text: &str) -> Result<ClauseSet<String>> {
    let separator = preceded(
        take_while_inline_space,
        alt((tag(";"), tag("\n"), tag("\r\n"))),
    );
    let clauses = complete(text, separated_list1(separator, clause))?;
    Ok(ClauseSet::new(clauses))
}

fn take_while_inline_space(input: &str) -> IResult<&str, &str> {
    nom::bytes::complete::take_while(|c: char| c == ' ' || c == '\t')(input)
}

/// Clause notation when the input uses nothing else, otherwise a formula
/// in clause normal form.
pub fn parse_clauses_or_formula(
    text: &str,
    strategy: CnfStrategy,
) -> Result<ClauseSet<String>> {
    if is_clause_set_syntax(text) {
        parse_clause_set(text)
    } else {
        clausify(&parse_propositional(text)?, strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod propositional {
        use super::*;

        fn show(text: &str) -> String {
            parse_propositional(text).unwrap().to_string()
        }

        #[test]
        fn precedence() {
            assert_eq!(show("a | b & c"), "(a ∨ (b ∧ c))");
            assert_eq!(show("!a & b"), "(!a ∧ b)");
            assert_eq!(show("a -> b | c <=> d"), "((a --> (b ∨ c)) <=> d)");
        }

        #[test]
        fn associativity() {
            assert_eq!(show("a -> b -> c"), "(a --> (b --> c))");
            assert_eq!(show("a & b & c"), "((a ∧ b) ∧ c)");
            assert_eq!(show("a <=> b <=> c"), "((a <=> b) <=> c)");
        }

        #[test]
        fn whitespace_and_parentheses() {
            assert_eq!(show("  !( a|b )  "), "!(a ∨ b)");
            assert_eq!(show("!!a"), "!!a");
            assert_eq!(show("a --> b"), "(a --> b)");
        }

        #[test]
        fn errors() {
            for text in &["", "a &", "(a | b", "a b", "a -> ", "\\all X: a"] {
                let error = parse_propositional(text).unwrap_err();
                assert_eq!(error.kind(), "InvalidFormulaFormat", "{}", text);
            }
        }
    }

    mod first_order {
        use super::*;

        fn show(text: &str) -> String {
            parse_first_order(text).unwrap().to_string()
        }

        #[test]
        fn quantifiers_bind_tightly() {
            assert_eq!(show("\\all X: (R(X) | !R(X))"), "(∀X: (R(X) ∨ !R(X)))");
            assert_eq!(
                show("\\ex El: (!P(El) | \\all Y: P(Y))"),
                "(∃El: (!P(El) ∨ (∀Y: P(Y))))"
            );
            assert_eq!(show("\\all X: R(X) & Q(a)"), "((∀X: R(X)) ∧ Q(a))");
        }

        #[test]
        fn terms() {
            assert_eq!(show("NewRel(c, f(d, e))"), "NewRel(c, f(d, e))");
            assert_eq!(show("\\ex X: \\all Y: Eq(Y, m(X, Y))"), "(∃X: (∀Y: Eq(Y, m(X, Y))))");
        }

        #[test]
        fn unbound_variables() {
            assert!(parse_first_order("R(X)").is_err());
            assert!(parse_first_order("(\\all X: R(X)) & Q(X)").is_err());
        }

        #[test]
        fn relations_need_uppercase_and_arguments() {
            assert!(parse_first_order("r(a)").is_err());
            assert!(parse_first_order("R").is_err());
        }

        #[test]
        fn term_and_relation() {
            assert_eq!(parse_term("f(X, g(a))").unwrap().to_string(), "f(X, g(a))");
            assert_eq!(parse_term("X").unwrap(), Term::var("X"));
            assert_eq!(parse_term("a").unwrap(), Term::constant("a"));
            assert_eq!(parse_relation("R(a,  X)").unwrap().to_string(), "R(a, X)");
            assert!(parse_term("f(").is_err());
        }

        #[test]
        fn substitution() {
            let mut assignment = BTreeMap::new();
            assignment.insert("X".to_string(), "f(a)".to_string());
            let substitution = parse_substitution(&assignment).unwrap();
            assert_eq!(substitution["X"].to_string(), "f(a)");

            assignment.insert("Y".to_string(), "f(".to_string());
            assert!(parse_substitution(&assignment).is_err());
        }
    }

    mod clause_sets {
        use super::*;

        #[test]
        fn clause_notation() {
            let clauses = parse_clause_set("a;a,b,c,a,b,c").unwrap();
            assert_eq!(clauses.to_string(), "{a}, {a, b, c, a, b, c}");
            let clauses = parse_clause_set("!a, b\n c ; !d").unwrap();
            assert_eq!(clauses.to_string(), "{!a, b}, {c}, {!d}");
        }

        #[test]
        fn falls_back_to_formula() {
            let clauses = parse_clauses_or_formula("a & (b | !c)", CnfStrategy::Naive).unwrap();
            assert_eq!(clauses.to_string(), "{a}, {b, !c}");
        }

        #[test]
        fn malformed() {
            assert!(parse_clause_set("a,,b").is_err());
            assert!(parse_clauses_or_formula("", CnfStrategy::Naive).is_err());
        }
    }

    mod sequents {
        use super::*;

        #[test]
        fn right_side_by_default() {
            let (left, right) = parse_sequent("\\all X: R(X), P(a)", Logic::FirstOrder).unwrap();
            assert!(left.is_empty());
            assert_eq!(right.len(), 2);
            assert_eq!(right[1].to_string(), "P(a)");
        }

        #[test]
        fn turnstile() {
            let (left, right) = parse_sequent("a, a -> b |- b", Logic::Propositional).unwrap();
            assert_eq!(left.len(), 2);
            assert_eq!(right[0].to_string(), "b");
        }
    }
}
