//! # Global fan-out configuration.
//!
//! Provides [`FanoutConfig`] centralized settings for the bounded parallel scheduler.
//!
//! Config is used in two ways:
//! 1. **Scheduler creation**: `Scheduler::new(config)` / `Scheduler::builder(config)`
//! 2. **Planning**: `FanoutConfig::plan(count, cap)` decides how many workers a batch gets
//!
//! ## Sentinel values
//! - `parallelism = 0` → detect via [`std::thread::available_parallelism`]
//! - `max_parallel = 0` → treated as `1` (zero workers can never make progress)

use std::num::NonZeroUsize;

/// Default ceiling applied to every caller-supplied cap.
pub const MAX_PARALLEL: usize = 32;

/// Global configuration for the fan-out runtime.
///
/// ## Field semantics
/// - `max_parallel`: Ceiling for any cap passed to `schedule` (min 1)
/// - `parallelism`: Hardware parallelism override (`0` = detect)
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct FanoutConfig {
    /// Upper bound for the number of worker routines a single batch may use.
    ///
    /// Caller caps are clamped to `[1, max_parallel]`.
    pub max_parallel: usize,

    /// Number of hardware threads the planner assumes.
    ///
    /// - `0` = ask the OS (falls back to `1` if unknown)
    /// - `n > 0` = use `n` (useful for deterministic tests)
    pub parallelism: usize,
}

impl FanoutConfig {
    /// Returns the effective ceiling, clamped to a minimum of 1.
    #[inline]
    pub fn parallel_ceiling(&self) -> usize {
        self.max_parallel.max(1)
    }

    /// Returns the hardware parallelism the planner works with.
    #[inline]
    pub fn hardware_parallelism(&self) -> usize {
        if self.parallelism == 0 {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        } else {
            self.parallelism
        }
    }

    /// Clamps a caller cap into `[1, parallel_ceiling()]`.
    #[inline]
    pub fn clamp_cap(&self, cap: usize) -> usize {
        cap.clamp(1, self.parallel_ceiling())
    }

    /// Number of worker routines for a batch of `count` items.
    ///
    /// `min(count, min(hardware_parallelism, clamp_cap(cap)))`:
    /// zero iff `count == 0`, otherwise within `[1, count]`.
    ///
    /// # Example
    /// ```
    /// use taskfan::FanoutConfig;
    ///
    /// let cfg = FanoutConfig { parallelism: 8, ..FanoutConfig::default() };
    /// assert_eq!(cfg.plan(20, 3), 3);
    /// assert_eq!(cfg.plan(2, 16), 2);
    /// assert_eq!(cfg.plan(20, 0), 1);
    /// assert_eq!(cfg.plan(0, 4), 0);
    /// ```
    #[inline]
    pub fn plan(&self, count: usize, cap: usize) -> usize {
        count.min(self.hardware_parallelism().min(self.clamp_cap(cap)))
    }
}

impl Default for FanoutConfig {
    /// Default configuration:
    ///
    /// - `max_parallel = 32`
    /// - `parallelism = 0` (detect)
    fn default() -> Self {
        Self {
            max_parallel: MAX_PARALLEL,
            parallelism: 0,
        }
    }
}
