//! Client interfaces for the network and for address lookup tables.
//!
//! The batcher and submission driver only ever talk to these traits, so the
//! whole core can be exercised against [`mock::MockNetwork`] without a live
//! cluster. [`rpc::RpcNetwork`] is the real implementation over the Solana
//! JSON-RPC API.

pub mod mock;
pub mod rpc;

use solana_message::AddressLookupTableAccount;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;

use crate::errors::SubmitResult;

/// A recent blockhash together with the block height at which it stops being
/// accepted. Every transaction must be anchored to one, fetched immediately
/// before assembly so it does not expire mid-flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentBlockhash {
    pub blockhash: solana_hash::Hash,
    pub last_valid_block_height: u64,
}

/// Interface to the network a transaction is submitted to.
///
/// Every method is a suspension point; callers must not reorder them
/// relative to the transaction they belong to.
pub trait NetworkClient {
    /// Fetch a fresh blockhash anchor.
    fn recent_blockhash(&self) -> impl std::future::Future<Output = SubmitResult<RecentBlockhash>> + Send;

    /// Current slot, needed when deriving a new lookup table address.
    fn current_slot(&self) -> impl std::future::Future<Output = SubmitResult<u64>> + Send;

    /// Submit a fully signed transaction. Fails fast on malformed input;
    /// success only means the network accepted it for processing.
    fn send(&self, tx: &VersionedTransaction) -> impl std::future::Future<Output = SubmitResult<Signature>> + Send;

    /// Block until the signature is confirmed or the anchoring blockhash
    /// expires ([`crate::errors::SubmitError::BlockhashExpired`]).
    fn confirm(
        &self,
        signature: &Signature,
        anchor: &RecentBlockhash,
    ) -> impl std::future::Future<Output = SubmitResult<()>> + Send;

    /// Read-only balance query, in lamports.
    fn balance(&self, account: &Pubkey) -> impl std::future::Future<Output = SubmitResult<u64>> + Send;

    /// Minimum lamports for an account of `data_len` bytes to be rent exempt.
    fn minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> impl std::future::Future<Output = SubmitResult<u64>> + Send;
}

/// Interface to address lookup table state on the network.
pub trait LookupTableClient {
    /// Resolve a table address to its current ordered member list.
    fn resolve_table(
        &self,
        table: &Pubkey,
    ) -> impl std::future::Future<Output = SubmitResult<AddressLookupTableAccount>> + Send;
}
