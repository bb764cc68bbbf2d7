//! Image extraction pipeline components.
//!
//! Stages, leaves first:
//! - **hash**: BLAKE3 content fingerprints
//! - **decode**: Decode raw bytes into canonical RGBA images
//! - **encode**: Output encoders and the format registry
//! - **dedup**: First-occurrence deduplication by fingerprint
//! - **buffer**: Scratch buffer pool shared by encode workers
//! - **writer**: Deterministic output naming and persistence
//! - **worker**: Concurrent encode-and-write pool
//! - **discovery**: Enumerate raw image files
//! - **processor**: Orchestrates a full batch

pub mod buffer;
pub mod decode;
pub mod dedup;
pub mod discovery;
pub mod encode;
pub mod hash;
pub mod processor;
pub mod worker;
pub mod writer;

// Re-exports for convenient access
pub use buffer::{BufferPool, PooledBuffer};
pub use decode::ImageDecoder;
pub use dedup::{Deduplicator, UniqueImageSet};
pub use discovery::{DiscoveredFile, Discovery, FileDiscovery};
pub use encode::{EncoderRegistry, FormatEncoder, OutputMode, PngEncoder, WebpEncoder};
pub use hash::Hasher;
pub use processor::BatchProcessor;
pub use worker::{BatchOutcome, BatchState, WorkerPool};
pub use writer::OutputWriter;
