//! # Graph
//!
//! Multigraph storage for topology edges plus the frozen [`FlowGraph`] handle
//! produced by [`GraphBuilder::build`](crate::GraphBuilder::build).
//!
//! The vertex set is derived from the edge list: a vertex exists exactly while
//! it has an incident edge, so resolving a placeholder endpoint makes the
//! placeholder vertex disappear without separate bookkeeping. Structure
//! queries are synchronous and read-only; all mutation happens through the
//! builder before the graph is frozen.

use crate::edge::Edge;
use crate::error::RunError;
use crate::materializer::{self, Materialization};
use crate::traits::fan::FanMaterializer;
use crate::traits::flow::FlowRef;
use crate::validator;
use crate::vertex::{Inlet, Outlet, Vertex};
use std::collections::{HashMap, HashSet};

/// Mutable directed multigraph over topology vertices.
///
/// Owned exclusively by one [`GraphBuilder`](crate::GraphBuilder) during
/// construction and frozen into a [`FlowGraph`] afterwards.
#[derive(Clone, Debug, Default)]
pub(crate) struct Multigraph {
  edges: Vec<Edge>,
}

impl Multigraph {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// Append one edge. Parallel edges are preserved; nothing is replaced.
  pub(crate) fn insert(&mut self, edge: Edge) {
    self.edges.push(edge);
  }

  pub(crate) fn edges(&self) -> &[Edge] {
    &self.edges
  }

  /// Every vertex with at least one incident edge, deduplicated, in first-seen
  /// insertion order so diagnostics and traversal stay deterministic.
  pub(crate) fn vertices(&self) -> Vec<Vertex> {
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    for edge in &self.edges {
      for vertex in [edge.from().vertex(), edge.to().vertex()] {
        if seen.insert(vertex.clone()) {
          ordered.push(vertex);
        }
      }
    }
    ordered
  }

  /// Edges terminating at `vertex`, in insertion order.
  pub(crate) fn incoming(&self, vertex: &Vertex) -> Vec<Edge> {
    self
      .edges
      .iter()
      .filter(|e| &e.to().vertex() == vertex)
      .cloned()
      .collect()
  }

  /// Edges originating at `vertex`, in insertion order.
  pub(crate) fn outgoing(&self, vertex: &Vertex) -> Vec<Edge> {
    self
      .edges
      .iter()
      .filter(|e| &e.from().vertex() == vertex)
      .cloned()
      .collect()
  }

  pub(crate) fn has_incoming(&self, vertex: &Vertex) -> bool {
    self.edges.iter().any(|e| &e.to().vertex() == vertex)
  }

  pub(crate) fn has_outgoing(&self, vertex: &Vertex) -> bool {
    self.edges.iter().any(|e| &e.from().vertex() == vertex)
  }

  /// Indices of every edge carrying `flow` as its label.
  pub(crate) fn edges_with_label(&self, flow: &FlowRef) -> Vec<usize> {
    self
      .edges
      .iter()
      .enumerate()
      .filter(|(_, e)| e.has_label(flow))
      .map(|(i, _)| i)
      .collect()
  }

  pub(crate) fn edge(&self, index: usize) -> &Edge {
    &self.edges[index]
  }

  /// Re-point edge `index` at a new destination; the previous destination
  /// vertex disappears with its last incident edge.
  pub(crate) fn retarget(&mut self, index: usize, to: Inlet) {
    self.edges[index].retarget(to);
  }

  /// Re-point edge `index` at a new origin.
  pub(crate) fn reroot(&mut self, index: usize, from: Outlet) {
    self.edges[index].reroot(from);
  }

  /// First directed cycle found, as its vertex sequence (first vertex repeated
  /// at the end), or `None` if the graph is acyclic. Parallel edges cannot
  /// form a cycle on their own; a self-loop can.
  pub(crate) fn find_cycle(&self) -> Option<Vec<Vertex>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
      Visiting,
      Done,
    }

    fn walk(
      graph: &Multigraph,
      vertex: Vertex,
      marks: &mut HashMap<Vertex, Mark>,
      trail: &mut Vec<Vertex>,
    ) -> Option<Vec<Vertex>> {
      marks.insert(vertex.clone(), Mark::Visiting);
      trail.push(vertex.clone());
      for edge in graph.outgoing(&vertex) {
        let next = edge.to().vertex();
        match marks.get(&next) {
          Some(Mark::Visiting) => {
            let start = trail.iter().position(|v| v == &next).unwrap_or(0);
            let mut cycle = trail[start..].to_vec();
            cycle.push(next);
            return Some(cycle);
          }
          Some(Mark::Done) => {}
          None => {
            if let Some(cycle) = walk(graph, next, marks, trail) {
              return Some(cycle);
            }
          }
        }
      }
      trail.pop();
      marks.insert(vertex, Mark::Done);
      None
    }

    let mut marks = HashMap::new();
    let mut trail = Vec::new();
    for vertex in self.vertices() {
      if !marks.contains_key(&vertex) {
        if let Some(cycle) = walk(self, vertex, &mut marks, &mut trail) {
          return Some(cycle);
        }
      }
    }
    None
  }
}

/// A frozen topology, produced by
/// [`GraphBuilder::build`](crate::GraphBuilder::build).
///
/// The builder is consumed on `build()`, so no further structural mutation is
/// possible. [`run`](FlowGraph::run) validates the topology and materializes
/// it; each call produces an independent materialization (broadcast memo state
/// is scoped to one call).
pub struct FlowGraph {
  graph: Multigraph,
}

impl FlowGraph {
  pub(crate) fn new(graph: Multigraph) -> Self {
    Self { graph }
  }

  pub(crate) fn inner(&self) -> &Multigraph {
    &self.graph
  }

  /// The edges of this topology, in insertion order.
  pub fn edges(&self) -> &[Edge] {
    self.graph.edges()
  }

  /// The vertices of this topology, deduplicated, in first-seen order.
  pub fn vertices(&self) -> Vec<Vertex> {
    self.graph.vertices()
  }

  /// Run the structural checks without materializing.
  ///
  /// Rejects directed cycles ([`RunError::UnsupportedCycle`]) and unresolved
  /// placeholder endpoints ([`RunError::DanglingEndpoint`]). Read-only.
  pub fn validate(&self) -> Result<(), RunError> {
    validator::validate(&self.graph)
  }

  /// Validate the topology, then materialize it into wired producer/consumer
  /// entry points.
  ///
  /// `ctx` is an opaque runtime context threaded through to `fans`; the core
  /// neither inspects nor stores it. On success the returned
  /// [`Materialization`] records, for every source, the consumer entry point
  /// it must ultimately feed.
  ///
  /// # Errors
  ///
  /// Validation failures ([`RunError::UnsupportedCycle`],
  /// [`RunError::DanglingEndpoint`]) surface before any materialization side
  /// effect; arity and consistency violations detected during traversal
  /// ([`RunError::SinkArityViolation`], [`RunError::MergeArityViolation`],
  /// [`RunError::BroadcastArityViolation`],
  /// [`RunError::UnexpectedTerminalVertex`]) abort the whole call with no
  /// partial wiring considered valid.
  pub fn run<C>(
    &self,
    ctx: &mut C,
    fans: &mut dyn FanMaterializer<C>,
  ) -> Result<Materialization, RunError> {
    validator::validate(&self.graph)?;
    materializer::materialize(&self.graph, ctx, fans)
  }
}
