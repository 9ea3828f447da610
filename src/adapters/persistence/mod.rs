//! Persistence Adapters
//!
//! JSON snapshot files written by the acquisition job.

pub mod snapshot_store;

pub use snapshot_store::JsonSnapshotStore;
