//! Convenient imports for whimbrel.
//!
//! ```ignore
//! use whimbrel::prelude::*;
//!
//! let wb = Whimbrel::ephemeral()?;
//! let id = wb.requests.create("nightly_import").await?;
//! ```

// Main entry point
pub use crate::database::{Whimbrel, WhimbrelBuilder};

// Error handling
pub use crate::error::{Error, Result, StoreError};

// Records
pub use whimbrel_primitives::{ExecState, RequestOptions, WorkflowExec, WorkflowRequest};

// Configuration
pub use whimbrel_core::{ConnectionOptions, StoreConfig};
