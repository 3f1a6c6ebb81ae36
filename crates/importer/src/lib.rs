pub mod delimited;
pub mod error;
pub mod traits;

pub use delimited::DelimitedImporter;
pub use error::{ImporterError, Result};
pub use traits::{ImportContext, ImportReport, SubmissionImporter};
