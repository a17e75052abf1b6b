/// Bounds-guard prelude prepended to every kernel's WGSL source.
///
/// Declares the `@group(1)` bounds uniform, the `in_bounds()` guard,
/// and the `WORKGROUP_SIZE` pipeline constant. Kernel entry points use
/// them as:
///
/// ```wgsl
/// @compute @workgroup_size(WORKGROUP_SIZE)
/// fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
///     let i = gid.x;
///     if (!in_bounds(i)) { return; }
///     // body
/// }
/// ```
pub const BOUNDS: &str = include_str!("shaders/bounds.wgsl");
