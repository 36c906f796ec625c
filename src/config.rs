//! # Per-instance configuration.
//!
//! [`LifecycleConfig`] sizes the per-signal broadcast channels of a module
//! host. One config is captured at construction; it is not shared between
//! instances.
//!
//! # Example
//! ```
//! use modvisor::LifecycleConfig;
//!
//! let mut cfg = LifecycleConfig::default();
//! cfg.channel_capacity = 256;
//!
//! assert_eq!(cfg.channel_capacity, 256);
//! ```

/// Configuration for a single module host.
#[derive(Clone, Copy, Debug)]
pub struct LifecycleConfig {
    /// Capacity of each per-signal broadcast channel.
    ///
    /// Slow observers that fall behind by more than this many events observe
    /// a lag error on their receiver and skip the missed items.
    pub channel_capacity: usize,
}

impl Default for LifecycleConfig {
    /// Provides a default configuration:
    /// - `channel_capacity = 64`
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}
