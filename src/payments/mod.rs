pub mod reference;

pub use reference::{generate_reference, REFERENCE_PREFIX};
