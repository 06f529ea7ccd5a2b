//! # Vertex Model
//!
//! Topology vertices: concrete endpoints (sources, sinks), fan operators
//! (merge, broadcast) and placeholder endpoints for edges whose other side has
//! not been chosen yet.
//!
//! Two points carry the whole model:
//!
//! - **Identity, not structure.** Fan operators and placeholders are keyed by
//!   unique IDs drawn from a process-wide counter, so two [`FanRef`]s from two
//!   `merge()` calls are never equal even across builders. Sources and sinks
//!   are caller-supplied capabilities and are keyed by `Arc` pointer identity.
//! - **Typed edge endpoints.** An edge origin is an [`Outlet`] (source,
//!   undefined source, or fan) and an edge destination is an [`Inlet`] (sink,
//!   undefined sink, or fan). A sink can never appear as an edge origin by
//!   construction, which keeps validator and materializer dispatch exhaustive.

use crate::traits::{SinkRef, SourceRef};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counter behind fan-operator and placeholder IDs.
static NEXT_VERTEX_ID: AtomicU64 = AtomicU64::new(1);

fn next_vertex_id() -> u64 {
  NEXT_VERTEX_ID.fetch_add(1, Ordering::Relaxed)
}

/// Unique identifier of one fan operator instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FanId(u64);

/// The two supported fan operator kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FanKind {
  /// Fan-in: many upstream branches into one downstream branch.
  Merge,
  /// Fan-out: one upstream branch into many downstream branches.
  Broadcast,
}

/// Handle to one fan operator vertex.
///
/// Obtained from [`GraphBuilder::merge`](crate::GraphBuilder::merge) and
/// [`GraphBuilder::broadcast`](crate::GraphBuilder::broadcast). The ID is the
/// vertex key and, for broadcasts, the per-run materialization memo key; two
/// factory calls never yield equal refs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FanRef {
  kind: FanKind,
  id: FanId,
}

impl FanRef {
  pub(crate) fn merge() -> Self {
    Self {
      kind: FanKind::Merge,
      id: FanId(next_vertex_id()),
    }
  }

  pub(crate) fn broadcast() -> Self {
    Self {
      kind: FanKind::Broadcast,
      id: FanId(next_vertex_id()),
    }
  }

  /// The operator kind of this fan vertex.
  pub fn kind(&self) -> FanKind {
    self.kind
  }

  /// The unique ID of this fan vertex.
  pub fn id(&self) -> FanId {
    self.id
  }
}

impl fmt::Display for FanRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.kind {
      FanKind::Merge => write!(f, "Merge#{}", self.id.0),
      FanKind::Broadcast => write!(f, "Broadcast#{}", self.id.0),
    }
  }
}

/// Unique identifier of one placeholder endpoint instance.
///
/// Every open-ended edge gets a fresh placeholder; placeholders are never
/// deduplicated with one another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaceholderId(u64);

impl PlaceholderId {
  pub(crate) fn fresh() -> Self {
    Self(next_vertex_id())
  }
}

/// The origin side of an edge: a source, a not-yet-chosen source, or a fan.
#[derive(Clone)]
pub enum Outlet {
  /// A concrete element-producing endpoint.
  Source(SourceRef),
  /// A placeholder standing in for a source chosen later.
  UndefinedSource(PlaceholderId),
  /// A fan operator acting as the upstream side of this edge.
  Fan(FanRef),
}

impl Outlet {
  /// The vertex this outlet occupies in the graph.
  pub fn vertex(&self) -> Vertex {
    match self {
      Outlet::Source(s) => Vertex::Source(s.clone()),
      Outlet::UndefinedSource(p) => Vertex::UndefinedSource(*p),
      Outlet::Fan(f) => Vertex::Fan(*f),
    }
  }
}

impl From<SourceRef> for Outlet {
  fn from(source: SourceRef) -> Self {
    Outlet::Source(source)
  }
}

impl From<FanRef> for Outlet {
  fn from(fan: FanRef) -> Self {
    Outlet::Fan(fan)
  }
}

impl fmt::Debug for Outlet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.vertex())
  }
}

/// The destination side of an edge: a sink, a not-yet-chosen sink, or a fan.
#[derive(Clone)]
pub enum Inlet {
  /// A concrete element-consuming endpoint.
  Sink(SinkRef),
  /// A placeholder standing in for a sink chosen later.
  UndefinedSink(PlaceholderId),
  /// A fan operator acting as the downstream side of this edge.
  Fan(FanRef),
}

impl Inlet {
  /// The vertex this inlet occupies in the graph.
  pub fn vertex(&self) -> Vertex {
    match self {
      Inlet::Sink(s) => Vertex::Sink(s.clone()),
      Inlet::UndefinedSink(p) => Vertex::UndefinedSink(*p),
      Inlet::Fan(f) => Vertex::Fan(*f),
    }
  }
}

impl From<SinkRef> for Inlet {
  fn from(sink: SinkRef) -> Self {
    Inlet::Sink(sink)
  }
}

impl From<FanRef> for Inlet {
  fn from(fan: FanRef) -> Self {
    Inlet::Fan(fan)
  }
}

impl fmt::Debug for Inlet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.vertex())
  }
}

/// A topology vertex.
///
/// Closed union over the five vertex kinds. Equality and hashing follow vertex
/// identity: `Arc` pointer identity for sources and sinks, unique IDs for fans
/// and placeholders. This is the key used by graph queries and by the
/// materializer's broadcast memo.
#[derive(Clone)]
pub enum Vertex {
  /// A topology entry point producing elements.
  Source(SourceRef),
  /// A topology exit point consuming elements.
  Sink(SinkRef),
  /// A merge or broadcast operator.
  Fan(FanRef),
  /// A transient placeholder for a source not yet chosen.
  UndefinedSource(PlaceholderId),
  /// A transient placeholder for a sink not yet chosen.
  UndefinedSink(PlaceholderId),
}

impl Vertex {
  /// Whether this vertex is a transient placeholder endpoint.
  pub fn is_placeholder(&self) -> bool {
    matches!(
      self,
      Vertex::UndefinedSource(_) | Vertex::UndefinedSink(_)
    )
  }
}

/// Thin data pointer of a capability `Arc`, fat-pointer metadata dropped.
fn capability_addr<T: ?Sized>(arc: &Arc<T>) -> usize {
  Arc::as_ptr(arc) as *const () as usize
}

impl PartialEq for Vertex {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Vertex::Source(a), Vertex::Source(b)) => capability_addr(a) == capability_addr(b),
      (Vertex::Sink(a), Vertex::Sink(b)) => capability_addr(a) == capability_addr(b),
      (Vertex::Fan(a), Vertex::Fan(b)) => a == b,
      (Vertex::UndefinedSource(a), Vertex::UndefinedSource(b)) => a == b,
      (Vertex::UndefinedSink(a), Vertex::UndefinedSink(b)) => a == b,
      _ => false,
    }
  }
}

impl Eq for Vertex {}

impl Hash for Vertex {
  fn hash<H: Hasher>(&self, state: &mut H) {
    match self {
      Vertex::Source(s) => {
        state.write_u8(0);
        capability_addr(s).hash(state);
      }
      Vertex::Sink(s) => {
        state.write_u8(1);
        capability_addr(s).hash(state);
      }
      Vertex::Fan(f) => {
        state.write_u8(2);
        f.hash(state);
      }
      Vertex::UndefinedSource(p) => {
        state.write_u8(3);
        p.hash(state);
      }
      Vertex::UndefinedSink(p) => {
        state.write_u8(4);
        p.hash(state);
      }
    }
  }
}

impl fmt::Display for Vertex {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Vertex::Source(s) => write!(f, "Source({})", s.name()),
      Vertex::Sink(s) => write!(f, "Sink({})", s.name()),
      Vertex::Fan(fan) => write!(f, "{}", fan),
      Vertex::UndefinedSource(PlaceholderId(id)) => write!(f, "UndefinedSource#{}", id),
      Vertex::UndefinedSink(PlaceholderId(id)) => write!(f, "UndefinedSink#{}", id),
    }
  }
}

impl fmt::Debug for Vertex {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self)
  }
}
