//! Device tags: zero-sized markers selecting which specialization of a
//! kernel body gets compiled.
//!
//! A tag is picked once per kernel call and threaded explicitly through
//! the lowered body, its barrier calls, and any helper it invokes. It is
//! never stored or made ambient. Dispatch on the tag happens at
//! monomorphization, so the host build of a kernel carries no trace of
//! the accelerator arm.

/// Capability marker for an execution target.
///
/// `Host` is the sequential CPU path. Everything else is an accelerator
/// variant (`IS_HOST == false`). Adding a new accelerator backend means
/// adding a new marker type plus `Dispatch` support for it — the loop
/// lowering and the host barrier case never change.
pub trait Device: Copy {
    /// Resolved at monomorphization; branching on it costs nothing in
    /// the compiled host path.
    const IS_HOST: bool;

    /// Value-level form of [`Device::IS_HOST`].
    fn is_host(self) -> bool {
        Self::IS_HOST
    }

    /// Cooperative thread barrier.
    ///
    /// On `Host` this is a no-op: sequential execution has no concurrent
    /// peers within one invocation. On an accelerator variant it maps to
    /// that backend's group-wide rendezvous (WGSL `workgroupBarrier()`
    /// on the device build). Calling it outside an active accelerator
    /// execution context is the accelerator layer's problem, not ours.
    fn barrier(self);
}

/// Sequential host execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Host;

impl Device for Host {
    const IS_HOST: bool = true;

    #[inline(always)]
    fn barrier(self) {}
}

/// The wgpu accelerator backend (Metal, Vulkan, DX12 via wgpu).
///
/// Today's single concrete member of the accelerator family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Wgpu;

impl Device for Wgpu {
    const IS_HOST: bool = false;

    #[inline(always)]
    fn barrier(self) {
        // The device build of a kernel expresses this as
        // workgroupBarrier() in its WGSL source. The host-side stand-in
        // runs work-items one at a time, so there are no peers to wait
        // for here.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_predicate() {
        assert!(Host.is_host());
        assert!(Host::IS_HOST);
    }

    #[test]
    fn accelerator_predicate() {
        assert!(!Wgpu.is_host());
        assert!(!Wgpu::IS_HOST);
    }

    #[test]
    fn host_barrier_is_a_noop() {
        // No context required, no blocking, no side effect.
        let mut touched = 0u32;
        Host.barrier();
        touched += 1;
        Host.barrier();
        assert_eq!(touched, 1);
    }

    #[test]
    fn tag_is_per_call() {
        // Tags are Copy and zero-sized; passing one around never moves state.
        fn takes_tag<D: Device>(tag: D) -> bool {
            tag.is_host()
        }
        assert!(takes_tag(Host));
        assert!(!takes_tag(Wgpu));
        assert_eq!(std::mem::size_of::<Host>(), 0);
        assert_eq!(std::mem::size_of::<Wgpu>(), 0);
    }
}
