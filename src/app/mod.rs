pub mod context;
pub mod error;
pub(crate) mod sync;

pub use context::AppContext;
pub use error::{PulseError, Result};
