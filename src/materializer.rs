//! # Materializer
//!
//! Converts a validated topology into a wired network of producer/consumer
//! entry points.
//!
//! ## Algorithm
//!
//! Materialization walks the graph backward. The starting set is every vertex
//! with no outgoing edge; after validation these must all be sinks. Each
//! sink binds the flow label of its single incoming edge into a consumer
//! entry point, and that edge is traversed upstream carrying the entry point
//! as the downstream target:
//!
//! - a **source** origin terminates the branch and records the
//!   `(source, target)` pairing in the result;
//! - a **merge** origin asks the external [`FanMaterializer`] for its two
//!   input-slot entry points and recurses into both incoming edges;
//! - a **broadcast** origin consults a per-run memo keyed by the operator's
//!   identity: the first branch to reach it materializes the shared
//!   producer/consumer pair and recurses upstream once; every branch,
//!   including the first, attaches its downstream target to the shared
//!   producer. The subgraph feeding a broadcast is thus materialized exactly
//!   once regardless of how many branches reach it, while every branch gets a
//!   working connection to the shared output.
//!
//! Any arity or consistency violation aborts the whole run immediately; no
//! partial materialization is valid. The memo lives and dies with one
//! [`FlowGraph::run`](crate::FlowGraph::run) call, so repeated runs produce
//! independent networks.

use crate::edge::Edge;
use crate::error::RunError;
use crate::graph::Multigraph;
use crate::traits::entry::{ConsumerEntryPoint, ProducerEntryPoint};
use crate::traits::fan::FanMaterializer;
use crate::traits::source::SourceRef;
use crate::vertex::{FanKind, FanRef, Outlet, Vertex};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// The wiring produced by one [`FlowGraph::run`](crate::FlowGraph::run) call.
///
/// Holds one binding per source branch reached by the traversal: the source
/// capability and the consumer entry point it must ultimately feed. Actually
/// starting element production is the caller's (or an external driver's) job.
pub struct Materialization {
  bindings: Vec<(SourceRef, Box<dyn ConsumerEntryPoint>)>,
}

impl fmt::Debug for Materialization {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Materialization")
      .field("bindings", &self.bindings.len())
      .finish()
  }
}

impl Materialization {
  /// The recorded source bindings, in traversal order.
  pub fn bindings(&self) -> &[(SourceRef, Box<dyn ConsumerEntryPoint>)] {
    &self.bindings
  }

  /// Consumes the materialization into its bindings, handing the entry
  /// points over to a runtime driver.
  pub fn into_bindings(self) -> Vec<(SourceRef, Box<dyn ConsumerEntryPoint>)> {
    self.bindings
  }

  /// Number of recorded source bindings.
  pub fn len(&self) -> usize {
    self.bindings.len()
  }

  /// Whether the traversal recorded no source binding at all (the empty
  /// topology).
  pub fn is_empty(&self) -> bool {
    self.bindings.is_empty()
  }
}

/// One run's traversal state: the memo table and the accumulated bindings.
struct Traversal<'a, C> {
  graph: &'a Multigraph,
  ctx: &'a mut C,
  fans: &'a mut dyn FanMaterializer<C>,
  broadcast_memo: HashMap<FanRef, Arc<dyn ProducerEntryPoint>>,
  bindings: Vec<(SourceRef, Box<dyn ConsumerEntryPoint>)>,
}

impl<C> Traversal<'_, C> {
  /// Walk one edge upstream, carrying the consumer entry point its elements
  /// must reach.
  fn walk(
    &mut self,
    edge: &Edge,
    downstream: Box<dyn ConsumerEntryPoint>,
  ) -> Result<(), RunError> {
    match edge.from() {
      Outlet::Source(source) => {
        trace!(source = source.name(), "branch terminated at source");
        self.bindings.push((source.clone(), downstream));
        Ok(())
      }
      Outlet::UndefinedSource(_) => {
        // Validation removes placeholders before traversal starts.
        Err(RunError::UnexpectedTerminalVertex {
          vertex: edge.from().vertex().to_string(),
        })
      }
      Outlet::Fan(fan) => match fan.kind() {
        FanKind::Merge => self.walk_merge(*fan, downstream),
        FanKind::Broadcast => self.walk_broadcast(*fan, downstream),
      },
    }
  }

  fn walk_merge(
    &mut self,
    fan: FanRef,
    downstream: Box<dyn ConsumerEntryPoint>,
  ) -> Result<(), RunError> {
    let incoming = self.graph.incoming(&Vertex::Fan(fan));
    let [first, second] = incoming.as_slice() else {
      return Err(RunError::MergeArityViolation {
        fan: fan.to_string(),
        incoming: incoming.len(),
      });
    };
    trace!(fan = %fan, "materializing merge inputs");
    let (left, right) = self.fans.materialize_merge(self.ctx, downstream);
    // The two branches are independent; their order is not significant.
    self.walk(first, left)?;
    self.walk(second, right)
  }

  fn walk_broadcast(
    &mut self,
    fan: FanRef,
    downstream: Box<dyn ConsumerEntryPoint>,
  ) -> Result<(), RunError> {
    let incoming = self.graph.incoming(&Vertex::Fan(fan));
    let outgoing = self.graph.outgoing(&Vertex::Fan(fan));
    if incoming.len() != 1 || outgoing.len() != 2 {
      return Err(RunError::BroadcastArityViolation {
        fan: fan.to_string(),
        incoming: incoming.len(),
        outgoing: outgoing.len(),
      });
    }
    if let Some(producer) = self.broadcast_memo.get(&fan) {
      // Upstream already materialized; this branch only subscribes to the
      // shared output.
      trace!(fan = %fan, "attaching branch to memoized broadcast");
      producer.attach(downstream);
      return Ok(());
    }
    trace!(fan = %fan, "materializing broadcast");
    let (producer, consumer) = self.fans.materialize_broadcast(self.ctx);
    self.broadcast_memo.insert(fan, producer.clone());
    producer.attach(downstream);
    self.walk(&incoming[0], consumer)
  }
}

/// Materialize a validated graph. Caller must have run the validator first.
pub(crate) fn materialize<C>(
  graph: &Multigraph,
  ctx: &mut C,
  fans: &mut dyn FanMaterializer<C>,
) -> Result<Materialization, RunError> {
  let mut traversal = Traversal {
    graph,
    ctx,
    fans,
    broadcast_memo: HashMap::new(),
    bindings: Vec::new(),
  };

  for vertex in graph.vertices() {
    if graph.has_outgoing(&vertex) {
      continue;
    }
    let Vertex::Sink(sink) = &vertex else {
      return Err(RunError::UnexpectedTerminalVertex {
        vertex: vertex.to_string(),
      });
    };
    let incoming = graph.incoming(&vertex);
    let [edge] = incoming.as_slice() else {
      return Err(RunError::SinkArityViolation {
        sink: vertex.to_string(),
        incoming: incoming.len(),
      });
    };
    trace!(sink = sink.name(), flow = edge.label().name(), "binding sink");
    let entry = sink.bind_flow(edge.label());
    traversal.walk(edge, entry)?;
  }

  debug!(
    sources = traversal.bindings.len(),
    broadcasts = traversal.broadcast_memo.len(),
    "materialization complete"
  );
  Ok(Materialization {
    bindings: traversal.bindings,
  })
}
