use std::any::Any;
use std::sync::Arc;

/// Shared handle to a source capability.
///
/// Source vertex identity is the identity of this `Arc`: cloning the handle
/// refers to the same vertex, two separately constructed sources are distinct
/// vertices even if otherwise indistinguishable.
pub type SourceRef = Arc<dyn Source>;

/// An element-producing topology endpoint.
///
/// Opaque to the core: it is held as a vertex payload and returned as a key in
/// the materialization result, paired with the consumer entry point the
/// source must ultimately feed. Starting element production is the runtime's
/// job, not the core's.
pub trait Source: Send + Sync {
  /// Name used in diagnostics and error reports.
  fn name(&self) -> &str;

  /// Downcast support so runtime drivers can recover the concrete source.
  fn as_any(&self) -> &dyn Any;
}
