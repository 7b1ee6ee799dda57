pub mod directory;
pub mod error;
pub mod executor;
pub mod io;
pub mod model;
pub mod preconditions;
pub mod report;
pub mod run;

pub use error::{ImportError, Result};
