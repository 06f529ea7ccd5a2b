//! # GraphBuilder
//!
//! Incremental, single-owner construction of a topology, one labeled edge at
//! a time.
//!
//! An edge endpoint may be a concrete source/sink capability or a fan operator
//! obtained from [`merge`](GraphBuilder::merge) /
//! [`broadcast`](GraphBuilder::broadcast). An edge may also be left open on
//! one side: [`add_edge_deferred_sink`](GraphBuilder::add_edge_deferred_sink)
//! and [`add_edge_deferred_source`](GraphBuilder::add_edge_deferred_source)
//! insert a fresh, unique placeholder endpoint, resolved later by flow label
//! with [`attach_sink`](GraphBuilder::attach_sink) /
//! [`attach_source`](GraphBuilder::attach_source).
//!
//! The builder owns its graph exclusively; [`build`](GraphBuilder::build)
//! consumes the builder, so the frozen [`FlowGraph`] can never be mutated
//! behind the caller's back.
//!
//! ## Example
//!
//! ```rust,no_run
//! use streamloom::GraphBuilder;
//! use streamloom::channel::{ChannelFlow, CollectSink, VecSource};
//!
//! # fn main() -> Result<(), streamloom::BuildError> {
//! let source = VecSource::from_iter("ticks", [1i64, 2, 3]);
//! let (left, _left_rx) = CollectSink::new("left", 16);
//! let (right, _right_rx) = CollectSink::new("right", 16);
//!
//! let mut builder = GraphBuilder::new();
//! let fanout = builder.broadcast();
//! builder
//!   .add_edge(source, ChannelFlow::identity("in"), fanout)?
//!   .add_edge(fanout, ChannelFlow::identity("l"), left)?
//!   .add_edge(fanout, ChannelFlow::identity("r"), right)?;
//! let graph = builder.build();
//! # let _ = graph;
//! # Ok(())
//! # }
//! ```

use crate::edge::Edge;
use crate::error::BuildError;
use crate::graph::{FlowGraph, Multigraph};
use crate::traits::flow::FlowRef;
use crate::traits::sink::SinkRef;
use crate::traits::source::SourceRef;
use crate::vertex::{FanKind, FanRef, Inlet, Outlet, PlaceholderId, Vertex};
use tracing::trace;

/// Mutable builder assembling a topology edge by edge.
///
/// All fallible mutators return `Result<&mut Self, BuildError>` so calls can
/// be chained with `?`. A failing call leaves the graph exactly as it was.
#[derive(Debug, Default)]
pub struct GraphBuilder {
  graph: Multigraph,
}

impl GraphBuilder {
  /// Creates an empty builder.
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a fresh, uniquely-identified merge operator vertex.
  ///
  /// Two calls never yield equal refs, even across builders.
  pub fn merge(&mut self) -> FanRef {
    FanRef::merge()
  }

  /// Creates a fresh, uniquely-identified broadcast operator vertex.
  pub fn broadcast(&mut self) -> FanRef {
    FanRef::broadcast()
  }

  /// Inserts one labeled edge `from -> flow -> to`.
  ///
  /// Both endpoints may independently be concrete capabilities or fan
  /// operators. Fan preconditions are checked on both endpoints before any
  /// mutation; parallel edges between the same vertex pair are kept as long
  /// as their labels differ by identity, and an existing edge is never
  /// replaced.
  ///
  /// # Errors
  ///
  /// [`BuildError::FanAlreadyAttached`] if `to` is a broadcast that already
  /// has an incoming edge, or `from` is a merge that already has an outgoing
  /// edge.
  pub fn add_edge(
    &mut self,
    from: impl Into<Outlet>,
    flow: FlowRef,
    to: impl Into<Inlet>,
  ) -> Result<&mut Self, BuildError> {
    let from = from.into();
    let to = to.into();
    self.check_fan_outlet(&from)?;
    self.check_fan_inlet(&to)?;
    let edge = Edge::new(from, flow, to);
    trace!(edge = ?edge, "add_edge");
    self.graph.insert(edge);
    Ok(self)
  }

  /// Inserts an edge from `from` to a fresh [`UndefinedSink`] placeholder,
  /// to be resolved later with [`attach_sink`](GraphBuilder::attach_sink).
  ///
  /// The placeholder is unique to this call and never reused.
  ///
  /// # Errors
  ///
  /// [`BuildError::FanAlreadyAttached`] if `from` is a merge that already has
  /// an outgoing edge.
  ///
  /// [`UndefinedSink`]: crate::vertex::Vertex::UndefinedSink
  pub fn add_edge_deferred_sink(
    &mut self,
    from: impl Into<Outlet>,
    flow: FlowRef,
  ) -> Result<&mut Self, BuildError> {
    let from = from.into();
    self.check_fan_outlet(&from)?;
    let edge = Edge::new(from, flow, Inlet::UndefinedSink(PlaceholderId::fresh()));
    trace!(edge = ?edge, "add_edge_deferred_sink");
    self.graph.insert(edge);
    Ok(self)
  }

  /// Inserts an edge from a fresh [`UndefinedSource`] placeholder to `to`,
  /// to be resolved later with [`attach_source`](GraphBuilder::attach_source).
  ///
  /// # Errors
  ///
  /// [`BuildError::FanAlreadyAttached`] if `to` is a broadcast that already
  /// has an incoming edge.
  ///
  /// [`UndefinedSource`]: crate::vertex::Vertex::UndefinedSource
  pub fn add_edge_deferred_source(
    &mut self,
    flow: FlowRef,
    to: impl Into<Inlet>,
  ) -> Result<&mut Self, BuildError> {
    let to = to.into();
    self.check_fan_inlet(&to)?;
    let edge = Edge::new(
      Outlet::UndefinedSource(PlaceholderId::fresh()),
      flow,
      to,
    );
    trace!(edge = ?edge, "add_edge_deferred_source");
    self.graph.insert(edge);
    Ok(self)
  }

  /// Resolves every edge labeled `flow` to terminate at `sink`.
  ///
  /// All matching edges are located by label identity; their placeholder
  /// destinations are removed and each edge re-pointed at the sink, keeping
  /// its label and position. All checks complete before the first mutation.
  ///
  /// # Errors
  ///
  /// - [`BuildError::NoMatchingFlow`] if no edge carries `flow`.
  /// - [`BuildError::AlreadyAttached`] if any matching edge's destination is
  ///   not an `UndefinedSink` placeholder (in particular on a second
  ///   `attach_sink` with the same flow).
  pub fn attach_sink(&mut self, flow: &FlowRef, sink: SinkRef) -> Result<&mut Self, BuildError> {
    let matches = self.graph.edges_with_label(flow);
    if matches.is_empty() {
      return Err(BuildError::NoMatchingFlow {
        flow: flow.name().to_string(),
      });
    }
    for &index in &matches {
      let to = self.graph.edge(index).to();
      if !matches!(to, Inlet::UndefinedSink(_)) {
        return Err(BuildError::AlreadyAttached {
          flow: flow.name().to_string(),
          endpoint: to.vertex().to_string(),
        });
      }
    }
    trace!(flow = flow.name(), sink = sink.name(), edges = matches.len(), "attach_sink");
    for index in matches {
      self.graph.retarget(index, Inlet::Sink(sink.clone()));
    }
    Ok(self)
  }

  /// Resolves every edge labeled `flow` to originate at `source`.
  ///
  /// Symmetric to [`attach_sink`](GraphBuilder::attach_sink) on the source
  /// side.
  ///
  /// # Errors
  ///
  /// - [`BuildError::NoMatchingFlow`] if no edge carries `flow`.
  /// - [`BuildError::AlreadyAttached`] if any matching edge's origin is not an
  ///   `UndefinedSource` placeholder.
  pub fn attach_source(
    &mut self,
    flow: &FlowRef,
    source: SourceRef,
  ) -> Result<&mut Self, BuildError> {
    let matches = self.graph.edges_with_label(flow);
    if matches.is_empty() {
      return Err(BuildError::NoMatchingFlow {
        flow: flow.name().to_string(),
      });
    }
    for &index in &matches {
      let from = self.graph.edge(index).from();
      if !matches!(from, Outlet::UndefinedSource(_)) {
        return Err(BuildError::AlreadyAttached {
          flow: flow.name().to_string(),
          endpoint: from.vertex().to_string(),
        });
      }
    }
    trace!(flow = flow.name(), source = source.name(), edges = matches.len(), "attach_source");
    for index in matches {
      self.graph.reroot(index, Outlet::Source(source.clone()));
    }
    Ok(self)
  }

  /// Freezes the current graph into an immutable [`FlowGraph`] handle.
  ///
  /// Consumes the builder; structural checks run later, at
  /// [`FlowGraph::run`], so a graph that still contains cycles or
  /// placeholders builds fine and fails there.
  pub fn build(self) -> FlowGraph {
    FlowGraph::new(self.graph)
  }

  /// Fan precondition for an edge origin: a merge used as a source keeps a
  /// single outgoing edge.
  fn check_fan_outlet(&self, from: &Outlet) -> Result<(), BuildError> {
    if let Outlet::Fan(fan) = from {
      if fan.kind() == FanKind::Merge && self.graph.has_outgoing(&Vertex::Fan(*fan)) {
        return Err(BuildError::FanAlreadyAttached {
          fan: fan.to_string(),
        });
      }
    }
    Ok(())
  }

  /// Fan precondition for an edge destination: a broadcast used as a sink
  /// keeps a single incoming edge.
  fn check_fan_inlet(&self, to: &Inlet) -> Result<(), BuildError> {
    if let Inlet::Fan(fan) = to {
      if fan.kind() == FanKind::Broadcast && self.graph.has_incoming(&Vertex::Fan(*fan)) {
        return Err(BuildError::FanAlreadyAttached {
          fan: fan.to_string(),
        });
      }
    }
    Ok(())
  }
}
