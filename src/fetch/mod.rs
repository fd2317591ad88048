//! Fetch module for downloading the documents of one sub-range
//!
//! This module provides functionality for:
//! - Requesting each document through a proxy taken from the worker's pool
//! - Classifying responses into per-ID outcomes
//! - Filtering saved documents down to the regions needed downstream

pub mod filter;
pub mod outcome;
pub mod sink;
pub mod worker;

pub use filter::FragmentFilter;
pub use outcome::{FetchOutcome, RunReport, WorkerFailure, WorkerReport};
pub use sink::{DocumentSink, EventSink, FileSink, TracingSink};
pub use worker::{FetchWorker, WorkerContext};
