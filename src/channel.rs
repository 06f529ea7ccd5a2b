//! # Channel Runtime
//!
//! Reference in-memory implementation of the boundary traits over bounded
//! tokio channels, so a materialized topology can actually move elements in
//! tests and demos.
//!
//! Elements are type-erased as `Arc<dyn Any + Send + Sync>`, shared zero-copy
//! between branches. Bounded channel capacity is the demand signal: a full
//! channel suspends the feeding task until downstream consumes.
//!
//! Flow transforms are applied where the core binds flows: on the edge
//! terminating at a sink ([`CollectSink::bind_flow`]). Interior edge labels
//! are wiring-only in this runtime; use [`ChannelFlow::identity`] for them.
//!
//! ## Wiring shape
//!
//! - [`ChannelConsumer`]: consumer entry point over an `mpsc::Sender`.
//! - [`CollectSink`]: sink whose bound entries feed one receiver.
//! - [`BroadcastHub`]: shared producer entry point; a pump task forwards
//!   every input element to every attached tap.
//! - [`ChannelFans`]: fan materializer where merge input slots are clones of the
//!   downstream sender, broadcasts get a hub plus pump.
//! - [`VecSource`] / [`drive_sources`]: feed fixed elements through the
//!   bindings a run recorded.

use crate::materializer::Materialization;
use crate::traits::entry::{ConsumerEntryPoint, ProducerEntryPoint};
use crate::traits::fan::FanMaterializer;
use crate::traits::flow::{Flow, FlowRef};
use crate::traits::sink::{Sink, SinkRef};
use crate::traits::source::{Source, SourceRef};
use std::any::Any;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{trace, warn};

/// Type-erased element flowing through the channel runtime.
pub type Item = Arc<dyn Any + Send + Sync>;

/// Element transform carried by a [`ChannelFlow`].
pub type ItemTransform = Arc<dyn Fn(Item) -> Item + Send + Sync>;

/// Runtime context for [`ChannelFans`]: per-link channel capacity.
///
/// Threaded opaquely through [`FlowGraph::run`](crate::FlowGraph::run); only
/// the fan materializer reads it.
#[derive(Clone, Copy, Debug)]
pub struct ChannelRuntime {
  /// Bounded capacity of each fan-created channel.
  pub capacity: usize,
}

impl Default for ChannelRuntime {
  fn default() -> Self {
    Self { capacity: 16 }
  }
}

/// Named flow stage carrying an optional element transform.
pub struct ChannelFlow {
  name: String,
  transform: Option<ItemTransform>,
}

impl ChannelFlow {
  /// A flow that passes elements through unchanged.
  pub fn identity(name: impl Into<String>) -> FlowRef {
    Arc::new(Self {
      name: name.into(),
      transform: None,
    })
  }

  /// A flow applying `f` to every element.
  pub fn map<F>(name: impl Into<String>, f: F) -> FlowRef
  where
    F: Fn(Item) -> Item + Send + Sync + 'static,
  {
    Arc::new(Self {
      name: name.into(),
      transform: Some(Arc::new(f)),
    })
  }
}

impl Flow for ChannelFlow {
  fn name(&self) -> &str {
    &self.name
  }

  fn as_any(&self) -> &dyn Any {
    self
  }
}

/// Consumer entry point feeding a bounded channel, optionally transforming
/// each element first.
#[derive(Clone)]
pub struct ChannelConsumer {
  tx: mpsc::Sender<Item>,
  transform: Option<ItemTransform>,
}

impl ChannelConsumer {
  /// Wraps a sender with no transform.
  pub fn new(tx: mpsc::Sender<Item>) -> Self {
    Self {
      tx,
      transform: None,
    }
  }

  /// A consumer whose channel is already closed; everything fed is dropped.
  fn closed() -> Self {
    let (tx, _rx) = mpsc::channel(1);
    Self {
      tx,
      transform: None,
    }
  }

  /// Deliver one element, waiting for demand if the channel is full.
  ///
  /// Returns `false` once downstream has hung up.
  pub async fn feed(&self, item: Item) -> bool {
    let item = match &self.transform {
      Some(f) => f(item),
      None => item,
    };
    self.tx.send(item).await.is_ok()
  }

  /// Recover a `ChannelConsumer` from an erased entry point, if it is one.
  pub fn downcast(entry: Box<dyn ConsumerEntryPoint>) -> Option<Self> {
    entry.into_any().downcast::<Self>().ok().map(|c| *c)
  }
}

impl ConsumerEntryPoint for ChannelConsumer {
  fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
    self
  }
}

/// Sink collecting every delivered element into one receiver.
pub struct CollectSink {
  name: String,
  tx: mpsc::Sender<Item>,
}

impl CollectSink {
  /// Creates the sink and the receiver its elements arrive on.
  pub fn new(name: impl Into<String>, capacity: usize) -> (SinkRef, mpsc::Receiver<Item>) {
    let (tx, rx) = mpsc::channel(capacity);
    let sink: SinkRef = Arc::new(Self {
      name: name.into(),
      tx,
    });
    (sink, rx)
  }
}

impl Sink for CollectSink {
  fn name(&self) -> &str {
    &self.name
  }

  fn bind_flow(&self, flow: &FlowRef) -> Box<dyn ConsumerEntryPoint> {
    let transform = flow
      .as_any()
      .downcast_ref::<ChannelFlow>()
      .and_then(|f| f.transform.clone());
    trace!(sink = %self.name, flow = flow.name(), "binding sink entry");
    Box::new(ChannelConsumer {
      tx: self.tx.clone(),
      transform,
    })
  }
}

/// Shared output of one materialized broadcast.
///
/// Downstream branches attach during materialization; a pump task forwards
/// every input element to every tap afterwards. One hub per broadcast per
/// run, upstream materialized once.
pub struct BroadcastHub {
  taps: Mutex<Vec<ChannelConsumer>>,
}

impl BroadcastHub {
  fn new() -> Self {
    Self {
      taps: Mutex::new(Vec::new()),
    }
  }

  fn snapshot(&self) -> Vec<ChannelConsumer> {
    match self.taps.lock() {
      Ok(taps) => taps.clone(),
      Err(poisoned) => poisoned.into_inner().clone(),
    }
  }
}

impl ProducerEntryPoint for BroadcastHub {
  fn attach(&self, downstream: Box<dyn ConsumerEntryPoint>) {
    match ChannelConsumer::downcast(downstream) {
      Some(consumer) => match self.taps.lock() {
        Ok(mut taps) => taps.push(consumer),
        Err(poisoned) => poisoned.into_inner().push(consumer),
      },
      None => warn!("broadcast tap is not a channel consumer; branch dropped"),
    }
  }
}

/// Fan materializer wiring merges and broadcasts over bounded channels.
///
/// Broadcast materialization spawns the hub's pump task, so `run()` must be
/// called from within a tokio runtime when using this materializer.
pub struct ChannelFans;

impl FanMaterializer<ChannelRuntime> for ChannelFans {
  fn materialize_merge(
    &mut self,
    _ctx: &mut ChannelRuntime,
    downstream: Box<dyn ConsumerEntryPoint>,
  ) -> (Box<dyn ConsumerEntryPoint>, Box<dyn ConsumerEntryPoint>) {
    // Both input slots feed the same downstream sender; the channel itself
    // interleaves the two branches.
    let shared = match ChannelConsumer::downcast(downstream) {
      Some(consumer) => consumer,
      None => {
        warn!("merge downstream is not a channel consumer; inputs dead-ended");
        ChannelConsumer::closed()
      }
    };
    (Box::new(shared.clone()), Box::new(shared))
  }

  fn materialize_broadcast(
    &mut self,
    ctx: &mut ChannelRuntime,
  ) -> (Arc<dyn ProducerEntryPoint>, Box<dyn ConsumerEntryPoint>) {
    let (tx, mut rx) = mpsc::channel::<Item>(ctx.capacity);
    let hub = Arc::new(BroadcastHub::new());
    let pump_hub = Arc::clone(&hub);
    tokio::spawn(async move {
      while let Some(item) = rx.recv().await {
        for tap in pump_hub.snapshot() {
          if !tap.feed(Arc::clone(&item)).await {
            trace!("broadcast tap hung up");
          }
        }
      }
    });
    (hub, Box::new(ChannelConsumer::new(tx)))
  }
}

/// Source producing a fixed sequence of elements.
pub struct VecSource {
  name: String,
  items: Vec<Item>,
}

impl VecSource {
  /// Creates a source over already-erased items.
  pub fn new(name: impl Into<String>, items: Vec<Item>) -> SourceRef {
    Arc::new(Self {
      name: name.into(),
      items,
    })
  }

  /// Creates a source by erasing each element of `items`.
  pub fn from_iter<T, I>(name: impl Into<String>, items: I) -> SourceRef
  where
    T: Send + Sync + 'static,
    I: IntoIterator<Item = T>,
  {
    Self::new(
      name,
      items
        .into_iter()
        .map(|item| Arc::new(item) as Item)
        .collect(),
    )
  }
}

impl Source for VecSource {
  fn name(&self) -> &str {
    &self.name
  }

  fn as_any(&self) -> &dyn Any {
    self
  }
}

/// Feed every bound [`VecSource`]'s elements into the consumer entry point
/// recorded for it, honoring backpressure, then drop the entry points so
/// downstream channels close.
///
/// Bindings whose source is not a `VecSource` or whose entry point is not a
/// [`ChannelConsumer`] are skipped with a warning.
pub async fn drive_sources(materialization: Materialization) {
  for (source, entry) in materialization.into_bindings() {
    let Some(consumer) = ChannelConsumer::downcast(entry) else {
      warn!(source = source.name(), "entry point is not a channel consumer");
      continue;
    };
    let Some(vec_source) = source.as_any().downcast_ref::<VecSource>() else {
      warn!(source = source.name(), "source is not a VecSource; nothing to feed");
      continue;
    };
    for item in &vec_source.items {
      if !consumer.feed(Arc::clone(item)).await {
        trace!(source = source.name(), "downstream hung up");
        break;
      }
    }
  }
}
