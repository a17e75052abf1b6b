//! The accelerator capability contract.
//!
//! riptide prepares work; a backend runs it. This module defines only
//! the interface: argument conversion, kernel compilation, a thread
//! budget query, submission, and readback. The wgpu backend in
//! [`crate::gpu`] implements it; tests stub it. No heavy dependencies
//! here — only the contract.
//!
//! All operations report failure as `Result<_, String>`; the dispatch
//! layer surfaces those messages verbatim with no retry and no
//! recovery.

use crate::kernel::{Arg, Kernel};
use crate::launch::LaunchConfig;

/// An accelerator backend capable of running compiled kernels.
///
/// Absence of a capability is detected at dispatch time, not link time:
/// constructors return `Option`/`Result`, and the accelerator dispatch
/// path fails fast when none can be produced.
pub trait Accelerator {
    /// Accelerator-resident form of one positional argument.
    type Buffer;
    /// Accelerator-executable form of a kernel.
    type Compiled;

    /// Convert a host-resident argument into its accelerator-resident
    /// representation. The result is exclusively owned by the one launch
    /// it was converted for.
    fn convert(&self, arg: &Arg<'_>) -> Result<Self::Buffer, String>;

    /// Compile a kernel's accelerator build.
    fn compile<K: Kernel>(&self, kernel: &K) -> Result<Self::Compiled, String>;

    /// Maximum threads-per-group this backend supports for the compiled
    /// kernel. Feeds the launch resolver as its thread budget.
    fn max_threads(&self, compiled: &Self::Compiled) -> u32;

    /// Submit one launch: converted arguments, the host-range extent
    /// `domain` (for the bounds guard), and a fully-resolved
    /// configuration. The backend validates the configuration here and
    /// may reject it.
    fn submit(
        &self,
        compiled: &Self::Compiled,
        buffers: &[Self::Buffer],
        domain: u32,
        config: &LaunchConfig,
    ) -> Result<(), String>;

    /// Copy one launched buffer's contents back into its host argument.
    fn read_back(&self, buffer: &Self::Buffer, arg: &mut Arg<'_>) -> Result<(), String>;
}
