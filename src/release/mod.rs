//! The release pipeline and the state it runs with.

pub mod context;
pub mod pipeline;
pub mod step;

pub use context::ReleaseContext;
pub use pipeline::{check_preconditions, run_release, ReleaseArgs, ReleaseOutcome};
pub use step::ReleaseStep;
