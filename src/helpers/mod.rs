mod error;
mod path;

pub use error::*;
pub use path::*;
