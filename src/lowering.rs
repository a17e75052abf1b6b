//! Loop lowering: one dual-range loop specification, two concrete loops.
//!
//! A kernel author writes a single loop over a *host range* and a *device
//! range* that denote the same logical index domain. Lowered against
//! [`Host`](crate::device::Host), the loop iterates exactly the host range
//! in order. Lowered against an accelerator tag, it iterates the device
//! range — typically each work-item's global thread index, possibly padded
//! up to a group multiple — with a bounds guard that skips indices outside
//! the host range. The set of indices for which the body runs is identical
//! under both lowerings for any device range that is a superset of the
//! host range.
//!
//! Preconditions the caller must uphold (unchecked; a runtime check would
//! cost the host path its zero-overhead guarantee):
//! - the device range covers every index of the host range.

use std::ops::Range;

use crate::device::Device;

/// A dual-range loop specification.
///
/// Exists only during specialization: one `LoopSpec` is consumed by
/// exactly one [`lower`] call to produce exactly one concrete loop.
#[derive(Clone, Debug)]
pub struct LoopSpec {
    /// The logical index domain, visited in order on the host path.
    pub host: Range<usize>,
    /// The thread-indexed domain, a superset of `host` (e.g. rounded up
    /// to a work-group multiple).
    pub device: Range<usize>,
}

impl LoopSpec {
    pub fn new(host: Range<usize>, device: Range<usize>) -> Self {
        Self { host, device }
    }

    /// Both ranges identical: a 1:1 domain with no padding.
    pub fn unsplit(range: Range<usize>) -> Self {
        Self {
            host: range.clone(),
            device: range,
        }
    }
}

/// Lower `spec` against `tag` and run the resulting concrete loop.
///
/// `D::IS_HOST` is an associated const, so the branch below is resolved
/// at monomorphization: the host instantiation compiles to a plain
/// sequential loop with no trace of the guarded arm, and vice versa.
///
/// The body is opaque to this layer. Nested control flow, barrier calls,
/// and data accesses inside it are left untouched; closure capture and
/// the induction-variable binding are the same under both lowerings.
#[inline]
pub fn lower<D: Device, F: FnMut(usize)>(_tag: D, spec: LoopSpec, mut body: F) {
    if D::IS_HOST {
        for i in spec.host {
            body(i);
        }
    } else {
        let LoopSpec { host, device } = spec;
        for i in device {
            // Bounds guard: padded device indices fall outside the
            // logical domain and must not execute the body.
            if !host.contains(&i) {
                continue;
            }
            body(i);
        }
    }
}

/// Surface syntax for a lowered loop.
///
/// ```
/// use riptide::{device_loop, Host};
///
/// let mut out = vec![0u32; 8];
/// device_loop!(Host, i in (0..8 => 0..8) {
///     out[i] = i as u32 * 2;
/// });
/// assert_eq!(out[3], 6);
/// ```
///
/// The only accepted shape is a single induction variable bound to a
/// dual `(host => device)` range. Anything else — two induction
/// variables, an un-split range, a malformed binding — fails to match
/// and is rejected at build time.
#[macro_export]
macro_rules! device_loop {
    ($tag:expr, $i:ident in ($host:expr => $device:expr) $body:block) => {
        $crate::lowering::lower(
            $tag,
            $crate::lowering::LoopSpec::new($host, $device),
            |$i: usize| $body,
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Device, Host, Wgpu};

    fn visited<D: Device>(tag: D, spec: LoopSpec) -> Vec<usize> {
        let mut seen = Vec::new();
        lower(tag, spec, |i| seen.push(i));
        seen
    }

    #[test]
    fn host_visits_host_range_in_order() {
        assert_eq!(visited(Host, LoopSpec::new(2..7, 0..16)), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn accelerator_guard_matches_host_exactly() {
        // Device range padded up to a group multiple of 64.
        let host = visited(Host, LoopSpec::new(0..100, 0..128));
        let accel = visited(Wgpu, LoopSpec::new(0..100, 0..128));
        assert_eq!(host, accel);
        assert_eq!(accel.len(), 100);
    }

    #[test]
    fn accelerator_guard_with_offset_domain() {
        let host = visited(Host, LoopSpec::new(10..20, 0..64));
        let accel = visited(Wgpu, LoopSpec::new(10..20, 0..64));
        assert_eq!(host, accel);
        assert_eq!(accel, (10..20).collect::<Vec<_>>());
    }

    #[test]
    fn empty_host_range_runs_zero_iterations_on_both_paths() {
        assert!(visited(Host, LoopSpec::new(5..5, 0..256)).is_empty());
        assert!(visited(Wgpu, LoopSpec::new(5..5, 0..256)).is_empty());
    }

    #[test]
    fn unsplit_range_is_one_to_one() {
        let spec = LoopSpec::unsplit(0..12);
        assert_eq!(spec.host, spec.device);
        assert_eq!(visited(Wgpu, spec), (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn macro_binds_induction_variable() {
        let mut out = vec![0u64; 1024];
        device_loop!(Host, i in (0..1024 => 0..1024) {
            out[i] = i as u64;
        });
        assert_eq!(out[1023], 1023);
    }

    #[test]
    fn macro_equivalence_with_padded_device_range() {
        let mut host_out = vec![0u32; 1000];
        let mut accel_out = vec![0u32; 1000];
        device_loop!(Host, i in (0..1000 => 0..1024) {
            host_out[i] += 1;
        });
        device_loop!(Wgpu, i in (0..1000 => 0..1024) {
            accel_out[i] += 1;
        });
        assert_eq!(host_out, accel_out);
        assert!(host_out.iter().all(|&v| v == 1));
    }

    #[test]
    fn barrier_inside_lowered_body() {
        // Barriers in the body are left untouched by the lowering.
        fn run<D: Device>(tag: D) -> Vec<usize> {
            let mut seen = Vec::new();
            device_loop!(tag, i in (0..4 => 0..8) {
                tag.barrier();
                seen.push(i);
            });
            seen
        }
        assert_eq!(run(Host), run(Wgpu));
    }
}
