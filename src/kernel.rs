//! Kernels and their positional arguments.

use crate::device::Device;

/// One positional kernel argument: a mutable, host-resident slice of
/// plain data.
///
/// Arguments are converted to accelerator-resident buffers only for the
/// accelerator dispatch path, and the converted form is exclusively
/// owned by that single launch until its results are copied back.
pub enum Arg<'a> {
    F32(&'a mut [f32]),
    U32(&'a mut [u32]),
}

impl Arg<'_> {
    /// Element count.
    pub fn len(&self) -> usize {
        match self {
            Arg::F32(s) => s.len(),
            Arg::U32(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw bytes for upload to the accelerator.
    pub(crate) fn as_bytes(&self) -> &[u8] {
        match self {
            Arg::F32(s) => bytemuck::cast_slice(s),
            Arg::U32(s) => bytemuck::cast_slice(s),
        }
    }

    /// Overwrite the host slice with bytes read back from the accelerator.
    pub(crate) fn copy_from_bytes(&mut self, bytes: &[u8]) -> Result<(), String> {
        let dst: &mut [u8] = match self {
            Arg::F32(s) => bytemuck::cast_slice_mut(s),
            Arg::U32(s) => bytemuck::cast_slice_mut(s),
        };
        if dst.len() != bytes.len() {
            return Err(format!(
                "readback size mismatch: argument holds {} bytes, accelerator returned {}",
                dst.len(),
                bytes.len()
            ));
        }
        dst.copy_from_slice(bytes);
        Ok(())
    }
}

/// A device-tag-polymorphic kernel: one body, two builds.
///
/// The `body` is ordinary Rust, written against any [`Device`] tag using
/// [`device_loop!`](crate::device_loop) and `tag.barrier()`. It is what
/// the host path calls directly, and what defines the semantics the
/// device build must reproduce. `source` is the WGSL rendition submitted
/// through the accelerator capability; its bindings follow the crate's
/// convention (positional args at `@group(0)`, bounds uniform at
/// `@group(1) @binding(0)`, see [`crate::gpu::shaders`]).
pub trait Kernel {
    /// Label used for accelerator pipelines and error messages.
    fn name(&self) -> &str;

    /// The device-generic kernel body.
    fn body<D: Device>(&self, tag: D, args: &mut [Arg<'_>]);

    /// WGSL source for the accelerator build.
    fn source(&self) -> &str;

    /// Entry point inside [`Kernel::source`].
    fn entry_point(&self) -> &str {
        "main"
    }

    /// Extent of the logical index domain implied by the arguments.
    /// Drives the default launch configuration and the bounds guard on
    /// the device path.
    fn domain(&self, args: &[Arg<'_>]) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg_len_and_bytes() {
        let mut data = vec![1.0f32, 2.0, 3.0];
        let arg = Arg::F32(&mut data);
        assert_eq!(arg.len(), 3);
        assert!(!arg.is_empty());
        assert_eq!(arg.as_bytes().len(), 12);
    }

    #[test]
    fn copy_from_bytes_round_trips() {
        let mut data = vec![0u32; 4];
        let mut arg = Arg::U32(&mut data);
        let src: Vec<u8> = bytemuck::cast_slice(&[7u32, 8, 9, 10]).to_vec();
        arg.copy_from_bytes(&src).unwrap();
        assert_eq!(data, vec![7, 8, 9, 10]);
    }

    #[test]
    fn copy_from_bytes_rejects_size_mismatch() {
        let mut data = vec![0u32; 2];
        let mut arg = Arg::U32(&mut data);
        let err = arg.copy_from_bytes(&[0u8; 4]).unwrap_err();
        assert!(err.contains("size mismatch"));
    }
}
