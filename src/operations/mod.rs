//! Operations module
//!
//! Template rendering, release tagging, downstream sync and package builds

pub mod build;
pub mod bump;
pub mod changelog;
pub mod commands;
pub mod release;
pub mod render;
pub mod substitute;
pub mod sync;
pub mod variants;

pub use build::{BuildOptions, BuildReport, run_build};
pub use release::{ReleaseOptions, ReleaseReport, ReleaseWorkflow};
pub use render::{RenderReport, render_directory};
pub use substitute::substitute;
pub use sync::{DownstreamSync, sync_downstream};
