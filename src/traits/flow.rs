use std::any::Any;
use std::sync::Arc;

/// Shared handle to a flow stage, used as an edge label.
///
/// Labels are compared by `Arc` identity: clones of one handle are the same
/// label, two separately constructed flows are different labels even when
/// structurally identical. This identity is what
/// [`attach_sink`](crate::GraphBuilder::attach_sink) and
/// [`attach_source`](crate::GraphBuilder::attach_source) use to find an edge
/// again.
pub type FlowRef = Arc<dyn Flow>;

/// An opaque transformation stage between two topology vertices.
///
/// The core never runs a flow; it holds it as an edge label and hands it to
/// the terminating sink at materialization time
/// ([`Sink::bind_flow`](crate::traits::Sink::bind_flow)).
pub trait Flow: Send + Sync {
  /// Name used in diagnostics and error reports.
  fn name(&self) -> &str;

  /// Downcast support so runtime implementations can recover the concrete
  /// stage behind the label.
  fn as_any(&self) -> &dyn Any;
}

/// Whether two flow handles are the same edge label.
pub fn same_flow(a: &FlowRef, b: &FlowRef) -> bool {
  Arc::ptr_eq(a, b)
}
