//! Monitoring configuration and the feature gate derived from it.
//!
//! `MonitorConfig` is the validated runtime snapshot produced by the
//! server's config loader. `FeatureFlags` is a pure function of it and
//! decides which notification channels a process run needs.

mod features;
mod monitor;

pub use features::FeatureFlags;
pub use monitor::MonitorConfig;
