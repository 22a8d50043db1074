pub mod nc_tableaux;
pub mod resolution;
pub mod sequent;
pub mod tableaux;

use crate::error::{CalculusError, Result};
use crate::wire;

macro_rules! calculi {
    ($($calculus:ty),* $(,)?) => {
        /// Identifiers of every supported calculus, in a stable order.
        pub const IDENTIFIERS: &[&str] = &[
            $(<$calculus as crate::calculus::Calculus>::IDENTIFIER),*
        ];

        /// Initial sealed state for `formula` in the calculus named `calculus`.
        pub fn parse(calculus: &str, formula: &str, params: Option<&str>) -> Result<String> {
            $(
                if calculus == <$calculus as crate::calculus::Calculus>::IDENTIFIER {
                    return wire::parse::<$calculus>(formula, params);
                }
            )*
            Err(unknown(calculus))
        }

        pub fn apply_move(calculus: &str, state: &str, mv: &str) -> Result<String> {
            $(
                if calculus == <$calculus as crate::calculus::Calculus>::IDENTIFIER {
                    return wire::apply_move::<$calculus>(state, mv);
                }
            )*
            Err(unknown(calculus))
        }

        pub fn check_close(calculus: &str, state: &str) -> Result<String> {
            $(
                if calculus == <$calculus as crate::calculus::Calculus>::IDENTIFIER {
                    return wire::check_close::<$calculus>(state);
                }
            )*
            Err(unknown(calculus))
        }
    };
}

calculi! {
    resolution::prop::PropResolution,
    resolution::fo::FoResolution,
    tableaux::prop::PropTableaux,
    tableaux::fo::FoTableaux,
    nc_tableaux::NcTableaux,
    sequent::prop::PropSequent,
    sequent::fo::FoSequent,
}

fn unknown(calculus: &str) -> CalculusError {
    CalculusError::JsonParse(format!("Unknown calculus '{}'", calculus))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_distinct() {
        let mut identifiers = IDENTIFIERS.to_vec();
        identifiers.sort_unstable();
        identifiers.dedup();
        assert_eq!(identifiers.len(), 7);
    }

    #[test]
    fn dispatch_by_identifier() {
        let state = parse("prop-resolution", "a; !a", None).unwrap();
        let close = check_close("prop-resolution", &state).unwrap();
        assert!(close.contains("\"closed\":false"));
    }

    #[test]
    fn unknown_calculus_is_rejected() {
        let error = parse("dpll", "a", None).unwrap_err();
        assert_eq!(error.kind(), "JsonParseException");
        assert_eq!(error.to_string(), "Unknown calculus 'dpll'");
    }
}
