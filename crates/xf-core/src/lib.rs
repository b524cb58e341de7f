pub mod error;
pub mod types;
pub mod value;

pub use error::{Diagnostic, ItextError};
pub use types::*;
pub use value::*;
