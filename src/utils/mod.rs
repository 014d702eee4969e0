pub mod formatting;
pub mod validation;
