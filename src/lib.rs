//! Batched submission of Solana instructions as v0 transactions.
//!
//! A transaction has a hard serialized-size ceiling, so a long list of
//! instructions has to be split across several transactions. This crate
//! partitions an instruction list into contiguous groups, compiles each
//! group into a v0 transaction (optionally against an address lookup table,
//! which collapses repeated 32-byte account references into one-byte
//! indexes), signs it with the group's own signer set, and submits the
//! groups strictly one after another, failing fast at the first rejection.
//!
//! The network and lookup table are reached through the traits in
//! [`client`], so everything here runs against the in-memory
//! [`client::mock::MockNetwork`] as well as a live cluster via
//! [`client::rpc::RpcNetwork`].

pub mod batcher;
pub mod client;
pub mod constants;
pub mod errors;
pub mod report;
pub mod submit;
pub mod table;
pub mod utils;

pub use batcher::{max_group_size_for, submit_batched, submit_in_groups, BatchReceipt};
pub use client::{LookupTableClient, NetworkClient, RecentBlockhash};
pub use errors::{BatchError, BatchResult, SubmitError, SubmitResult};
pub use submit::{submit_group, RetryPolicy, SubmitOptions};

/// Version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
