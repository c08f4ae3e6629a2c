//! Pure validation helpers used by forms before they call store actions.

pub mod cpf;
pub mod form;

pub use form::{FieldRule, FormValidator, RuleOutcome};
