use std::fmt;
use std::sync::Arc;

use crate::engine::{Allocation, Allocator};
use crate::io::InputStream;

/// Engine-side handle of a body stream.
///
/// This is the duplicate a message installs into its body slot. It keeps the high-level
/// stream alive while installed, and dropping it destroys only the handle: other holders of
/// the stream are unaffected.
pub struct NativeStream {
    source: Arc<dyn InputStream>,
    _allocation: Allocation,
}

impl NativeStream {
    pub fn new(allocator: &Allocator, source: Arc<dyn InputStream>) -> Self {
        Self { source, _allocation: allocator.register_stream() }
    }

    /// The stream this handle reads from.
    pub fn source(&self) -> &Arc<dyn InputStream> {
        &self.source
    }

    /// Whether this handle was created for `stream`.
    pub fn is_for(&self, stream: &Arc<dyn InputStream>) -> bool {
        Arc::ptr_eq(&self.source, stream)
    }
}

impl fmt::Debug for NativeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeStream").field("source", &self.source).finish_non_exhaustive()
    }
}
