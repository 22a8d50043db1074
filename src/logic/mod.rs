pub mod cnf;
pub mod nnf;
pub mod node;
pub mod parse;
pub mod term;
pub mod transform;
pub mod unify;
