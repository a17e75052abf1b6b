//! riptide: write a kernel once, run it anywhere.
//!
//! A kernel body written against a [`Device`] tag is specialized at
//! generic-instantiation time into either a plain sequential loop
//! ([`Host`]) or a bounds-guarded, thread-indexed iteration (an
//! accelerator tag such as [`Wgpu`]) — same logic, zero duplication,
//! zero branching overhead on the host path.
//!
//! ```
//! use riptide::{device_loop, Device, Host};
//!
//! fn double<D: Device>(tag: D, data: &mut [f32]) {
//!     let n = data.len();
//!     device_loop!(tag, i in (0..n => 0..n) {
//!         data[i] *= 2.0;
//!     });
//! }
//!
//! let mut data = vec![1.0, 2.0, 3.0];
//! double(Host, &mut data);
//! assert_eq!(data, vec![2.0, 4.0, 6.0]);
//! ```
//!
//! Accelerator execution goes through [`dispatch()`], which resolves a
//! [`LaunchConfig`] and submits the kernel's WGSL build via the
//! [`Accelerator`] capability (wgpu today). Host execution calls the
//! body directly.

pub mod accel;
pub mod device;
pub mod dispatch;
pub mod gpu;
pub mod kernel;
pub mod launch;
pub mod lowering;

pub use accel::Accelerator;
pub use device::{Device, Host, Wgpu};
pub use dispatch::{dispatch, dispatch_with, Dispatch, DispatchError};
pub use gpu::WgpuAccelerator;
pub use kernel::{Arg, Kernel};
pub use launch::{resolve, LaunchConfig, LaunchOverrides, StreamId};
pub use lowering::{lower, LoopSpec};
