pub mod form;

pub use form::{FormDefinition, Submission};
