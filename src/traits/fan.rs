use crate::traits::entry::{ConsumerEntryPoint, ProducerEntryPoint};
use std::sync::Arc;

/// Materialization capability for fan operators, supplied externally to
/// [`FlowGraph::run`](crate::FlowGraph::run).
///
/// `C` is the opaque runtime context threaded through `run()`; the core
/// neither inspects nor stores it beyond these calls.
///
/// Fan arity is fixed at two on the "many" side and the signatures encode it:
/// a merge yields exactly two input slots, a broadcast pairs one shared
/// producer with one input consumer. Larger fan shapes can be described by the
/// builder but are rejected at materialization time.
pub trait FanMaterializer<C> {
  /// Materialize a merge: given the entry point the merged output feeds,
  /// produce the two upstream-facing input-slot entry points.
  fn materialize_merge(
    &mut self,
    ctx: &mut C,
    downstream: Box<dyn ConsumerEntryPoint>,
  ) -> (Box<dyn ConsumerEntryPoint>, Box<dyn ConsumerEntryPoint>);

  /// Materialize a broadcast: produce its shared output producer (attached to
  /// once per downstream branch) and the single input consumer its upstream
  /// feeds.
  fn materialize_broadcast(
    &mut self,
    ctx: &mut C,
  ) -> (Arc<dyn ProducerEntryPoint>, Box<dyn ConsumerEntryPoint>);
}
