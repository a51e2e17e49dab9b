//! Network limits and tuning knobs.

/// Maximum serialized size of a transaction, in bytes. This is the binding
/// constraint that forces batching: a v0 transaction that compiles above
/// this size will never be accepted by the network.
pub const MAX_TRANSACTION_SIZE: usize = 1232;

/// Maximum number of addresses an address lookup table can hold.
pub const LOOKUP_TABLE_MAX_ADDRESSES: usize = 256;

/// How many addresses to append per extend instruction. Each address costs
/// 32 bytes of instruction data, so extending with too many at once runs
/// into [`MAX_TRANSACTION_SIZE`] just like any other oversized transaction.
pub const EXTEND_BATCH_SIZE: usize = 20;

/// Interval between signature-status polls while waiting for confirmation.
pub const CONFIRM_POLL_INTERVAL_MS: u64 = 500;

/// A blockhash is valid for roughly this many blocks after it is issued.
/// The mock network uses it to model expiry; the RPC client gets the real
/// last valid block height from the node.
pub const BLOCKHASH_VALID_BLOCKS: u64 = 150;
