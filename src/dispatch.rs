//! Kernel dispatch: one branch on the device tag, resolved per tag type.
//!
//! `Host` calls the kernel body directly — no configuration resolution,
//! no conversion. An accelerator tag converts arguments, asks the
//! backend for its thread budget, resolves a [`LaunchConfig`], submits,
//! and reads results back. When no accelerator capability is available
//! the accelerator path fails immediately; it never silently falls back
//! to host execution.

use std::fmt;

use crate::accel::Accelerator;
use crate::device::{Device, Host, Wgpu};
use crate::gpu::WgpuAccelerator;
use crate::kernel::{Arg, Kernel};
use crate::launch::{resolve, LaunchOverrides};

// ─── Errors ────────────────────────────────────────────────────────

/// Failure of one dispatch call. Nothing here is recovered locally;
/// every failure propagates to the immediate caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchError {
    /// An accelerator dispatch was requested but no accelerator
    /// capability is available on this machine.
    AcceleratorUnavailable,
    /// The accelerator capability rejected the launch; its message is
    /// passed through verbatim.
    Launch(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::AcceleratorUnavailable => {
                write!(f, "accelerator support not available: no compatible adapter")
            }
            DispatchError::Launch(msg) => write!(f, "launch failed: {msg}"),
        }
    }
}

impl std::error::Error for DispatchError {}

// ─── Entry point ───────────────────────────────────────────────────

/// Per-tag dispatch behavior. This trait (together with the launch
/// resolver's backend budget) is what grows when a new accelerator
/// variant is added; the loop lowering and barrier abstraction do not.
pub trait Dispatch: Device {
    fn dispatch<K: Kernel>(
        self,
        kernel: &K,
        args: &mut [Arg<'_>],
        overrides: &LaunchOverrides,
    ) -> Result<(), DispatchError>;
}

impl Dispatch for Host {
    fn dispatch<K: Kernel>(
        self,
        kernel: &K,
        args: &mut [Arg<'_>],
        _overrides: &LaunchOverrides,
    ) -> Result<(), DispatchError> {
        kernel.body(self, args);
        Ok(())
    }
}

impl Dispatch for Wgpu {
    fn dispatch<K: Kernel>(
        self,
        kernel: &K,
        args: &mut [Arg<'_>],
        overrides: &LaunchOverrides,
    ) -> Result<(), DispatchError> {
        let accel = WgpuAccelerator::try_new().ok_or(DispatchError::AcceleratorUnavailable)?;
        dispatch_with(&accel, kernel, args, overrides)
    }
}

/// Dispatch `kernel` over `args` on the target selected by `tag`.
pub fn dispatch<D: Dispatch, K: Kernel>(
    tag: D,
    kernel: &K,
    args: &mut [Arg<'_>],
    overrides: &LaunchOverrides,
) -> Result<(), DispatchError> {
    tag.dispatch(kernel, args, overrides)
}

/// Accelerator dispatch through an explicit capability.
///
/// Compile, convert each positional argument, resolve the launch
/// configuration against the backend's thread budget, submit, read
/// back. Also the seam a caller (or test) uses to supply its own
/// [`Accelerator`] implementation instead of the linked-in wgpu one.
pub fn dispatch_with<A: Accelerator, K: Kernel>(
    accel: &A,
    kernel: &K,
    args: &mut [Arg<'_>],
    overrides: &LaunchOverrides,
) -> Result<(), DispatchError> {
    let compiled = accel.compile(kernel).map_err(DispatchError::Launch)?;

    let mut buffers = Vec::with_capacity(args.len());
    for arg in args.iter() {
        buffers.push(accel.convert(arg).map_err(DispatchError::Launch)?);
    }

    let max_threads = accel.max_threads(&compiled);
    let config = resolve(kernel, max_threads, args, overrides);
    let domain = (kernel.domain(args) as u64).min(u32::MAX as u64) as u32;

    accel
        .submit(&compiled, &buffers, domain, &config)
        .map_err(DispatchError::Launch)?;

    for (buffer, arg) in buffers.iter().zip(args.iter_mut()) {
        accel.read_back(buffer, arg).map_err(DispatchError::Launch)?;
    }
    Ok(())
}
