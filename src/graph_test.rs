//! # Graph Model Test Suite
//!
//! Vertex identity, edge labels, structure queries, and the frozen handle.

use crate::GraphBuilder;
use crate::edge::Edge;
use crate::graph::Multigraph;
use crate::traits::entry::ConsumerEntryPoint;
use crate::traits::flow::{Flow, FlowRef, same_flow};
use crate::traits::sink::{Sink, SinkRef};
use crate::traits::source::{Source, SourceRef};
use crate::vertex::{FanRef, Inlet, Outlet, PlaceholderId, Vertex};
use std::any::Any;
use std::sync::Arc;

struct TestSource(String);

impl Source for TestSource {
  fn name(&self) -> &str {
    &self.0
  }

  fn as_any(&self) -> &dyn Any {
    self
  }
}

struct TestSink(String);

impl Sink for TestSink {
  fn name(&self) -> &str {
    &self.0
  }

  fn bind_flow(&self, flow: &FlowRef) -> Box<dyn ConsumerEntryPoint> {
    Box::new(Probe(format!("{}<-{}", self.0, flow.name())))
  }
}

struct TestFlow(String);

impl Flow for TestFlow {
  fn name(&self) -> &str {
    &self.0
  }

  fn as_any(&self) -> &dyn Any {
    self
  }
}

struct Probe(#[allow(dead_code)] String);

impl ConsumerEntryPoint for Probe {
  fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
    self
  }
}

fn source(name: &str) -> SourceRef {
  Arc::new(TestSource(name.to_string()))
}

fn sink(name: &str) -> SinkRef {
  Arc::new(TestSink(name.to_string()))
}

fn flow(name: &str) -> FlowRef {
  Arc::new(TestFlow(name.to_string()))
}

// ============================================================================
// Vertex identity
// ============================================================================

#[test]
fn cloned_source_handles_are_the_same_vertex() {
  let s = source("a");
  assert_eq!(Vertex::Source(s.clone()), Vertex::Source(s));
}

#[test]
fn distinct_sources_are_distinct_vertices_even_with_equal_names() {
  assert_ne!(Vertex::Source(source("a")), Vertex::Source(source("a")));
}

#[test]
fn source_and_sink_vertices_never_compare_equal() {
  assert_ne!(Vertex::Source(source("x")), Vertex::Sink(sink("x")));
}

#[test]
fn vertex_display_names_the_kind_and_payload() {
  assert_eq!(Vertex::Source(source("ticks")).to_string(), "Source(ticks)");
  assert_eq!(Vertex::Sink(sink("out")).to_string(), "Sink(out)");
  assert!(Vertex::Fan(FanRef::merge()).to_string().starts_with("Merge#"));
  assert!(
    Vertex::Fan(FanRef::broadcast())
      .to_string()
      .starts_with("Broadcast#")
  );
}

// ============================================================================
// Edge labels
// ============================================================================

#[test]
fn edge_labels_match_by_identity() {
  let f = flow("f");
  let edge = Edge::new(
    Outlet::Source(source("s")),
    f.clone(),
    Inlet::Sink(sink("out")),
  );
  assert!(edge.has_label(&f));
  assert!(!edge.has_label(&flow("f")));
  assert!(same_flow(&f, &f.clone()));
}

// ============================================================================
// Structure queries
// ============================================================================

fn diamond() -> (Multigraph, Vertex) {
  // s -> fanout -> {a, b} -> fanin -> out, fan vertices returned for queries
  let mut graph = Multigraph::new();
  let fanout = FanRef::broadcast();
  let fanin = FanRef::merge();
  graph.insert(Edge::new(
    Outlet::Source(source("s")),
    flow("in"),
    Inlet::Fan(fanout),
  ));
  graph.insert(Edge::new(Outlet::Fan(fanout), flow("a"), Inlet::Fan(fanin)));
  graph.insert(Edge::new(Outlet::Fan(fanout), flow("b"), Inlet::Fan(fanin)));
  graph.insert(Edge::new(
    Outlet::Fan(fanin),
    flow("merged"),
    Inlet::Sink(sink("out")),
  ));
  (graph, Vertex::Fan(fanout))
}

#[test]
fn vertices_are_deduplicated_in_first_seen_order() {
  let (graph, _) = diamond();
  let vertices = graph.vertices();
  assert_eq!(vertices.len(), 4);
  assert_eq!(vertices[0].to_string(), "Source(s)");
  assert_eq!(vertices[3].to_string(), "Sink(out)");
}

#[test]
fn incoming_and_outgoing_respect_direction() {
  let (graph, fanout) = diamond();
  assert_eq!(graph.incoming(&fanout).len(), 1);
  assert_eq!(graph.outgoing(&fanout).len(), 2);
  assert!(graph.has_incoming(&fanout));
  assert!(graph.has_outgoing(&fanout));
}

#[test]
fn labels_locate_edges_among_parallel_ones() {
  let (mut graph, _) = diamond();
  let f = flow("extra");
  graph.insert(Edge::new(
    Outlet::Source(source("s2")),
    f.clone(),
    Inlet::UndefinedSink(PlaceholderId::fresh()),
  ));
  let matches = graph.edges_with_label(&f);
  assert_eq!(matches.len(), 1);
  assert!(graph.edge(matches[0]).has_label(&f));
}

#[test]
fn retargeting_makes_the_placeholder_vertex_disappear() {
  let mut graph = Multigraph::new();
  let f = flow("f");
  graph.insert(Edge::new(
    Outlet::Source(source("s")),
    f.clone(),
    Inlet::UndefinedSink(PlaceholderId::fresh()),
  ));
  assert!(graph.vertices().iter().any(Vertex::is_placeholder));
  let index = graph.edges_with_label(&f)[0];
  graph.retarget(index, Inlet::Sink(sink("out")));
  assert!(!graph.vertices().iter().any(Vertex::is_placeholder));
  assert_eq!(graph.edges().len(), 1);
}

// ============================================================================
// Cycle query
// ============================================================================

#[test]
fn diamond_is_acyclic() {
  let (graph, _) = diamond();
  assert!(graph.find_cycle().is_none());
}

#[test]
fn parallel_edges_alone_do_not_form_a_cycle() {
  let mut graph = Multigraph::new();
  let s = source("s");
  let out = sink("out");
  graph.insert(Edge::new(
    Outlet::Source(s.clone()),
    flow("f1"),
    Inlet::Sink(out.clone()),
  ));
  graph.insert(Edge::new(Outlet::Source(s), flow("f2"), Inlet::Sink(out)));
  assert!(graph.find_cycle().is_none());
}

#[test]
fn back_edge_is_reported_as_a_closed_walk() {
  let mut graph = Multigraph::new();
  let fanout = FanRef::broadcast();
  let fanin = FanRef::merge();
  graph.insert(Edge::new(Outlet::Fan(fanout), flow("down"), Inlet::Fan(fanin)));
  graph.insert(Edge::new(Outlet::Fan(fanin), flow("back"), Inlet::Fan(fanout)));
  let cycle = graph.find_cycle().expect("cycle exists");
  assert_eq!(cycle.len(), 3);
  assert_eq!(cycle.first(), cycle.last());
}

// ============================================================================
// Frozen handle
// ============================================================================

#[test]
fn built_graph_exposes_structure_read_only() {
  let mut builder = GraphBuilder::new();
  builder
    .add_edge(source("s"), flow("f"), sink("out"))
    .expect("edge");
  let graph = builder.build();
  assert_eq!(graph.edges().len(), 1);
  assert_eq!(graph.vertices().len(), 2);
  assert_eq!(format!("{:?}", graph.edges()[0]), "Source(s) -> f -> Sink(out)");
}
