//! Profile catalog support: a directory-backed [`ProfileSource`], persona
//! narrative generation, and panel-level statistics.

pub mod loader;
pub mod persona;
pub mod stats;

pub use crowdtest_core::profile::{CustomerProfile, ProfileSource, ProfileSourceError};
pub use loader::DirProfileSource;
pub use stats::{PanelStats, panel_stats};
