//! Domain logic - pure version rules independent of git and the clock

pub mod branch;
pub mod dev_version;
pub mod tag;

pub use branch::BranchSlug;
pub use dev_version::{DevVersion, VersionInputs};
pub use tag::ReleaseTag;
