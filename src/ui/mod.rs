//! User interface module.
//!
//! The release runs unattended, so there are no prompts; `formatter` holds
//! the output functions and is re-exported here.

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_command, display_error, display_phase, display_plan,
    display_release_summary, display_status, display_success,
};
