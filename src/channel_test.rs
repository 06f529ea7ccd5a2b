//! # Channel Runtime Test Suite
//!
//! End-to-end element delivery through materialized topologies: linear
//! pipelines, broadcast sharing, merge interleaving, all over bounded tokio
//! channels.

use crate::GraphBuilder;
use crate::channel::{
  ChannelConsumer, ChannelFans, ChannelFlow, ChannelRuntime, CollectSink, Item, VecSource,
  drive_sources,
};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Route builder and runtime trace output through the test capture writer.
fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_max_level(tracing::Level::TRACE)
    .with_test_writer()
    .try_init();
}

/// Collect a receiver into concrete values once every sender is gone.
async fn collect_i64(rx: mpsc::Receiver<Item>) -> Vec<i64> {
  ReceiverStream::new(rx)
    .map(|item| *item.downcast_ref::<i64>().expect("i64 payload"))
    .collect()
    .await
}

fn double(item: Item) -> Item {
  let value = item.downcast_ref::<i64>().expect("i64 payload");
  Arc::new(value * 2)
}

#[test]
fn feed_reports_demand_until_the_receiver_hangs_up() {
  let (tx, rx) = mpsc::channel(1);
  let consumer = ChannelConsumer::new(tx);
  assert!(tokio_test::block_on(consumer.feed(Arc::new(5_i64))));
  drop(rx);
  assert!(!tokio_test::block_on(consumer.feed(Arc::new(6_i64))));
}

#[tokio::test]
async fn linear_pipeline_delivers_transformed_elements() {
  init_tracing();
  let source = VecSource::from_iter("numbers", [1i64, 2, 3]);
  let (sink, rx) = CollectSink::new("out", 16);

  let mut builder = GraphBuilder::new();
  builder
    .add_edge(source, ChannelFlow::map("double", double), sink)
    .expect("edge");
  let graph = builder.build();

  let materialization = graph
    .run(&mut ChannelRuntime::default(), &mut ChannelFans)
    .expect("run");
  drop(graph); // release the sink's intake sender so the receiver can close
  drive_sources(materialization).await;

  assert_eq!(collect_i64(rx).await, vec![2, 4, 6]);
}

#[tokio::test]
async fn broadcast_feeds_both_sinks_from_one_source_traversal() {
  init_tracing();
  let source = VecSource::from_iter("numbers", [1i64, 2, 3]);
  let (plain, plain_rx) = CollectSink::new("plain", 16);
  let (doubled, doubled_rx) = CollectSink::new("doubled", 16);

  let mut builder = GraphBuilder::new();
  let fanout = builder.broadcast();
  builder
    .add_edge(source, ChannelFlow::identity("in"), fanout)
    .expect("input edge");
  builder
    .add_edge(fanout, ChannelFlow::identity("as-is"), plain)
    .expect("plain branch");
  builder
    .add_edge(fanout, ChannelFlow::map("double", double), doubled)
    .expect("doubled branch");
  let graph = builder.build();

  let materialization = graph
    .run(&mut ChannelRuntime::default(), &mut ChannelFans)
    .expect("run");
  // Exactly one source binding: the upstream materialized once.
  assert_eq!(materialization.len(), 1);
  drop(graph);
  drive_sources(materialization).await;

  assert_eq!(collect_i64(plain_rx).await, vec![1, 2, 3]);
  assert_eq!(collect_i64(doubled_rx).await, vec![2, 4, 6]);
}

#[tokio::test]
async fn merge_interleaves_two_sources_into_one_sink() {
  init_tracing();
  let left = VecSource::from_iter("left", [1i64, 2, 3]);
  let right = VecSource::from_iter("right", [10i64, 20, 30]);
  let (sink, rx) = CollectSink::new("out", 16);

  let mut builder = GraphBuilder::new();
  let fanin = builder.merge();
  builder
    .add_edge(left, ChannelFlow::identity("l"), fanin)
    .expect("left edge");
  builder
    .add_edge(right, ChannelFlow::identity("r"), fanin)
    .expect("right edge");
  builder
    .add_edge(fanin, ChannelFlow::identity("merged"), sink)
    .expect("output edge");
  let graph = builder.build();

  let materialization = graph
    .run(&mut ChannelRuntime::default(), &mut ChannelFans)
    .expect("run");
  assert_eq!(materialization.len(), 2);
  drop(graph);
  tokio::spawn(drive_sources(materialization));

  let mut collected = collect_i64(rx).await;
  collected.sort_unstable();
  assert_eq!(collected, vec![1, 2, 3, 10, 20, 30]);
}

#[tokio::test]
async fn bounded_channels_backpressure_a_fast_source() {
  init_tracing();
  // Channel capacity 1 and a consumer that drains afterwards: the driver
  // must suspend on a full channel instead of dropping elements.
  let source = VecSource::from_iter("burst", (0..64i64).collect::<Vec<_>>());
  let (sink, rx) = CollectSink::new("out", 1);

  let mut builder = GraphBuilder::new();
  builder
    .add_edge(source, ChannelFlow::identity("pass"), sink)
    .expect("edge");
  let graph = builder.build();

  let materialization = graph
    .run(&mut ChannelRuntime { capacity: 1 }, &mut ChannelFans)
    .expect("run");
  drop(graph);
  tokio::spawn(drive_sources(materialization));

  let collected = collect_i64(rx).await;
  assert_eq!(collected, (0..64).collect::<Vec<_>>());
}

#[tokio::test]
async fn diamond_routes_shared_elements_through_both_branches() {
  init_tracing();
  // source -> broadcast -> {identity, identity} -> merge -> sink: every
  // element arrives twice.
  let source = VecSource::from_iter("numbers", [7i64]);
  let (sink, rx) = CollectSink::new("out", 16);

  let mut builder = GraphBuilder::new();
  let fanout = builder.broadcast();
  let fanin = builder.merge();
  builder
    .add_edge(source, ChannelFlow::identity("in"), fanout)
    .expect("input edge");
  builder
    .add_edge(fanout, ChannelFlow::identity("a"), fanin)
    .expect("first branch");
  builder
    .add_edge(fanout, ChannelFlow::identity("b"), fanin)
    .expect("second branch");
  builder
    .add_edge(fanin, ChannelFlow::identity("merged"), sink)
    .expect("output edge");
  let graph = builder.build();

  let materialization = graph
    .run(&mut ChannelRuntime::default(), &mut ChannelFans)
    .expect("run");
  drop(graph);
  tokio::spawn(drive_sources(materialization));

  assert_eq!(collect_i64(rx).await, vec![7, 7]);
}
