//! Launch configuration: defaults derived from the kernel's index
//! domain, merged with caller overrides.
//!
//! The resolver is purely deterministic merging — override present, use
//! the override; absent, use the computed default. It never asks whether
//! the combination is legal on the target; the accelerator capability
//! may reject the launch at submit time.

use serde::{Deserialize, Serialize};

use crate::kernel::{Arg, Kernel};

/// Execution stream/queue handle. The wgpu backend exposes a single
/// queue as stream 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamId(pub u32);

impl StreamId {
    pub const DEFAULT: StreamId = StreamId(0);
}

/// A fully-resolved launch configuration. Immutable for the duration of
/// one launch; owned exclusively by one dispatch call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchConfig {
    pub group_count: u32,
    pub threads_per_group: u32,
    pub shared_memory_bytes: u32,
    pub stream: StreamId,
}

impl LaunchConfig {
    /// Total thread count across all groups.
    pub fn total_threads(&self) -> u64 {
        self.group_count as u64 * self.threads_per_group as u64
    }
}

/// Caller overrides: every field optional, every set field wins over the
/// computed default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct LaunchOverrides {
    pub group_count: Option<u32>,
    pub threads_per_group: Option<u32>,
    pub shared_memory_bytes: Option<u32>,
    pub stream: Option<StreamId>,
}

impl LaunchOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn group_count(mut self, n: u32) -> Self {
        self.group_count = Some(n);
        self
    }

    pub fn threads_per_group(mut self, n: u32) -> Self {
        self.threads_per_group = Some(n);
        self
    }

    pub fn shared_memory_bytes(mut self, n: u32) -> Self {
        self.shared_memory_bytes = Some(n);
        self
    }

    pub fn stream(mut self, stream: StreamId) -> Self {
        self.stream = Some(stream);
        self
    }

    /// Set an override by its option name. Recognized names:
    /// `groupCount`, `threadsPerGroup`, `sharedMemoryBytes`, `stream`.
    pub fn set(&mut self, name: &str, value: u32) -> Result<(), String> {
        match name {
            "groupCount" => self.group_count = Some(value),
            "threadsPerGroup" => self.threads_per_group = Some(value),
            "sharedMemoryBytes" => self.shared_memory_bytes = Some(value),
            "stream" => self.stream = Some(StreamId(value)),
            other => return Err(format!("unrecognized launch option `{other}`")),
        }
        Ok(())
    }
}

/// Resolve a launch configuration for `kernel` over `args`.
///
/// Defaults cover the kernel's index domain with at most `max_threads`
/// threads per group: `threads_per_group = min(domain, max_threads)` and
/// enough groups to reach `domain`. Shared memory defaults to zero and
/// the stream to [`StreamId::DEFAULT`]. Overrides are then applied
/// field-by-field.
pub fn resolve<K: Kernel>(
    kernel: &K,
    max_threads: u32,
    args: &[Arg<'_>],
    overrides: &LaunchOverrides,
) -> LaunchConfig {
    let domain = (kernel.domain(args) as u64).min(u32::MAX as u64) as u32;

    // An empty domain still resolves to a well-formed one-thread launch;
    // the bounds guard rejects every index at run time.
    let threads = domain.min(max_threads).max(1);
    let groups = (((domain as u64 + threads as u64 - 1) / threads as u64).max(1)) as u32;

    LaunchConfig {
        group_count: overrides.group_count.unwrap_or(groups),
        threads_per_group: overrides.threads_per_group.unwrap_or(threads),
        shared_memory_bytes: overrides.shared_memory_bytes.unwrap_or(0),
        stream: overrides.stream.unwrap_or(StreamId::DEFAULT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Device;

    struct Fixed(usize);

    impl Kernel for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn body<D: Device>(&self, _tag: D, _args: &mut [Arg<'_>]) {}
        fn source(&self) -> &str {
            ""
        }
        fn domain(&self, _args: &[Arg<'_>]) -> usize {
            self.0
        }
    }

    #[test]
    fn defaults_cover_domain_within_budget() {
        let cfg = resolve(&Fixed(200), 256, &[], &LaunchOverrides::none());
        assert_eq!(cfg.threads_per_group, 200);
        assert_eq!(cfg.group_count, 1);
        assert_eq!(cfg.shared_memory_bytes, 0);
        assert_eq!(cfg.stream, StreamId::DEFAULT);
        assert!(cfg.total_threads() <= 256);
    }

    #[test]
    fn large_domain_splits_into_groups() {
        let cfg = resolve(&Fixed(1024), 256, &[], &LaunchOverrides::none());
        assert_eq!(cfg.threads_per_group, 256);
        assert_eq!(cfg.group_count, 4);
        assert!(cfg.total_threads() >= 1024);
    }

    #[test]
    fn ragged_domain_rounds_groups_up() {
        let cfg = resolve(&Fixed(1000), 256, &[], &LaunchOverrides::none());
        assert_eq!(cfg.group_count, 4);
        assert!(cfg.total_threads() >= 1000);
    }

    #[test]
    fn override_wins_others_stay_default() {
        let overrides = LaunchOverrides::none().threads_per_group(64);
        let cfg = resolve(&Fixed(200), 256, &[], &overrides);
        assert_eq!(cfg.threads_per_group, 64);
        // Remaining fields keep their computed defaults.
        assert_eq!(cfg.group_count, 1);
        assert_eq!(cfg.shared_memory_bytes, 0);
        assert_eq!(cfg.stream, StreamId::DEFAULT);
    }

    #[test]
    fn every_field_overridable() {
        let overrides = LaunchOverrides::none()
            .group_count(3)
            .threads_per_group(32)
            .shared_memory_bytes(4096)
            .stream(StreamId(2));
        let cfg = resolve(&Fixed(1024), 256, &[], &overrides);
        assert_eq!(
            cfg,
            LaunchConfig {
                group_count: 3,
                threads_per_group: 32,
                shared_memory_bytes: 4096,
                stream: StreamId(2),
            }
        );
    }

    #[test]
    fn empty_domain_resolves_to_one_idle_thread() {
        let cfg = resolve(&Fixed(0), 256, &[], &LaunchOverrides::none());
        assert_eq!(cfg.threads_per_group, 1);
        assert_eq!(cfg.group_count, 1);
    }

    #[test]
    fn set_by_option_name() {
        let mut overrides = LaunchOverrides::none();
        overrides.set("threadsPerGroup", 64).unwrap();
        overrides.set("groupCount", 2).unwrap();
        overrides.set("sharedMemoryBytes", 1024).unwrap();
        overrides.set("stream", 1).unwrap();
        assert_eq!(overrides.threads_per_group, Some(64));
        assert_eq!(overrides.group_count, Some(2));
        assert_eq!(overrides.shared_memory_bytes, Some(1024));
        assert_eq!(overrides.stream, Some(StreamId(1)));
    }

    #[test]
    fn set_rejects_unknown_name() {
        let mut overrides = LaunchOverrides::none();
        let err = overrides.set("warpSize", 32).unwrap_err();
        assert!(err.contains("warpSize"));
        assert_eq!(overrides, LaunchOverrides::none());
    }
}
