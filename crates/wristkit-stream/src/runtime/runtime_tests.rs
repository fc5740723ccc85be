#![allow(non_snake_case)]

use super::*;
use crate::{collect, from_records, merge};
use bytes::Bytes;
use wristkit_core::FileRecord;

// RuntimeConfig tests

#[test]
fn RuntimeConfig___default___current_thread() {
    let config = RuntimeConfig::default();

    assert!(config.worker_threads.is_none());
    assert_eq!(config.thread_name, "wristkit-worker");
    assert_eq!(config.merge_capacity, DEFAULT_MERGE_CAPACITY);
}

#[test]
fn RuntimeConfig___with_worker_threads___multi_thread() {
    let config = RuntimeConfig::new().with_worker_threads(2);

    assert_eq!(config.worker_threads, Some(2));
}

// PipelineRuntime tests

#[test]
fn PipelineRuntime___multi_thread___drives_merge() {
    let runtime = PipelineRuntime::new(RuntimeConfig::new().with_worker_threads(2)).unwrap();

    let records = runtime
        .block_on_interruptible(collect(merge(vec![
            from_records([FileRecord::buffer("a", Bytes::new())]),
            from_records([FileRecord::buffer("b", Bytes::new())]),
        ])))
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(runtime.config().worker_threads, Some(2));
}

#[test]
fn PipelineRuntime___block_on_interruptible___passes_result() {
    let runtime = PipelineRuntime::new(RuntimeConfig::default()).unwrap();

    let result = runtime.block_on_interruptible(async { Ok::<_, BuildError>("done") });

    assert_eq!(result.unwrap(), "done");
}
