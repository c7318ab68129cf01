//! Domain logic - pure release rules independent of git and npm

pub mod branch;
pub mod state;
pub mod version;

pub use branch::BranchContext;
pub use state::RepositoryState;
pub use version::VersionBump;
