use crate::traits::entry::ConsumerEntryPoint;
use crate::traits::flow::FlowRef;
use std::sync::Arc;

/// Shared handle to a sink capability.
///
/// Sink vertex identity is the identity of this `Arc`, mirroring
/// [`SourceRef`](crate::traits::SourceRef).
pub type SinkRef = Arc<dyn Sink>;

/// An element-consuming topology endpoint.
///
/// Besides acting as a vertex payload, a sink exposes the one operation the
/// core calls during materialization: binding the flow label of its incoming
/// edge into a consumer entry point the rest of the network feeds.
pub trait Sink: Send + Sync {
  /// Name used in diagnostics and error reports.
  fn name(&self) -> &str;

  /// Bind `flow` to this sink, producing the consumer entry point that
  /// receives elements for it.
  fn bind_flow(&self, flow: &FlowRef) -> Box<dyn ConsumerEntryPoint>;
}
