//! CPU frame composition.

/// Band blending and source-over compositing.
pub mod composite;
/// Section frame composition.
pub mod compositor;
/// Frame buffers and image loading.
pub mod frame;
