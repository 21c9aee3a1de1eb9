//! Configuration loaded from `config.yaml` and `SESSIONTRON_*` variables.

pub mod logging;
pub mod storage;
pub mod types;

pub use logging::*;
pub use storage::*;
pub use types::*;
