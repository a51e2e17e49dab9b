//! Transaction batcher: partitions a long list of instructions into groups
//! that each fit one signed transaction, and drives their submission
//! strictly one at a time.
//!
//! Groups are contiguous and order-preserving; group `i + 1` is not started
//! until group `i` is confirmed. Serializing submissions is a correctness
//! choice, not just a simplicity one: concurrent in-flight transactions from
//! the same payer share blockhash anchors awkwardly, and co-signers writing
//! the same accounts can race. The batch fails fast at the first failing
//! group, reporting its index and how many groups were already confirmed;
//! groups after the failure are never attempted.

#[cfg(test)]
mod tests;

use std::ops::Range;

use log::info;
use solana_instruction::Instruction;
use solana_keypair::Keypair;
use solana_message::{v0, AddressLookupTableAccount, VersionedMessage};
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;

use crate::client::{LookupTableClient, NetworkClient};
use crate::constants::MAX_TRANSACTION_SIZE;
use crate::errors::{BatchError, BatchResult, SubmitError, SubmitResult};
use crate::submit::{submit_group, SubmitOptions};

/// Confirmation signatures for a completed batch, one per group, in
/// submission order.
#[derive(Debug, Clone)]
pub struct BatchReceipt {
    pub signatures: Vec<Signature>,
}

impl BatchReceipt {
    /// Number of transactions issued.
    pub fn transactions(&self) -> usize {
        self.signatures.len()
    }
}

/// Submit `operations` in contiguous groups of at most `group_size`, each
/// group as one signed transaction.
///
/// `signers_for` is called once per group with the group index and the
/// operation range it covers, and must return the co-signers that group's
/// instructions require (the payer is always added). Groups generally need
/// different signer sets, so a global set is never reused blindly.
///
/// Issues exactly `operations.len().div_ceil(group_size)` transactions on
/// success; zero operations succeed immediately with zero transactions.
pub async fn submit_in_groups<'a, N, L, F>(
    network: &N,
    table_client: &L,
    operations: &[Instruction],
    group_size: usize,
    payer: &Keypair,
    mut signers_for: F,
    table: Option<&Pubkey>,
    options: &SubmitOptions,
) -> BatchResult<BatchReceipt>
where
    N: NetworkClient,
    L: LookupTableClient,
    F: FnMut(usize, Range<usize>) -> Vec<&'a Keypair>,
{
    if group_size == 0 {
        return Err(BatchError {
            source: SubmitError::Config("group size must be at least 1".to_string()),
            group_index: 0,
            confirmed: 0,
        });
    }

    let mut signatures = Vec::with_capacity(operations.len().div_ceil(group_size));

    for (group_index, group) in operations.chunks(group_size).enumerate() {
        let start = group_index * group_size;
        let signers = signers_for(group_index, start..start + group.len());

        let signature = submit_group(network, table_client, group, payer, &signers, table, options)
            .await
            .map_err(|source| BatchError {
                source,
                group_index,
                confirmed: signatures.len(),
            })?;

        info!(
            "group {group_index} confirmed ({} operations): {signature}",
            group.len()
        );
        signatures.push(signature);
    }

    Ok(BatchReceipt { signatures })
}

/// [`submit_in_groups`] for the common case where the payer's signature is
/// the only one required.
pub async fn submit_batched<N, L>(
    network: &N,
    table_client: &L,
    operations: &[Instruction],
    group_size: usize,
    payer: &Keypair,
    table: Option<&Pubkey>,
    options: &SubmitOptions,
) -> BatchResult<BatchReceipt>
where
    N: NetworkClient,
    L: LookupTableClient,
{
    submit_in_groups(
        network,
        table_client,
        operations,
        group_size,
        payer,
        |_, _| Vec::new(),
        table,
        options,
    )
    .await
}

/// Serialized size of an unsigned transaction over the first `count`
/// operations, with placeholder signatures standing in for the real ones.
fn compiled_size(
    operations: &[Instruction],
    payer: &Pubkey,
    table: Option<&AddressLookupTableAccount>,
    count: usize,
) -> SubmitResult<usize> {
    let tables: &[AddressLookupTableAccount] = match table {
        Some(t) => std::slice::from_ref(t),
        None => &[],
    };
    let message = v0::Message::try_compile(
        payer,
        &operations[..count],
        tables,
        solana_hash::Hash::default(),
    )
    .map_err(|e| SubmitError::Signing(format!("message compilation failed: {e}")))?;

    let num_signatures = message.header.num_required_signatures as usize;
    let tx = VersionedTransaction {
        signatures: vec![Signature::default(); num_signatures],
        message: VersionedMessage::V0(message),
    };
    let size = bincode::serialized_size(&tx)
        .map_err(|e| SubmitError::Signing(format!("serialization failed: {e}")))?;
    Ok(size as usize)
}

/// Largest group size whose leading operations compile into a transaction
/// that fits the network's size ceiling, with or without a lookup table.
///
/// Empirically chosen constants age badly as operations change shape; this
/// measures the actual compiled envelope instead. Returns an error if even
/// a single operation does not fit.
pub fn max_group_size_for(
    operations: &[Instruction],
    payer: &Pubkey,
    table: Option<&AddressLookupTableAccount>,
) -> SubmitResult<usize> {
    if operations.is_empty() {
        return Ok(0);
    }
    if compiled_size(operations, payer, table, 1)? > MAX_TRANSACTION_SIZE {
        return Err(SubmitError::Rejected(
            "a single operation exceeds the transaction size ceiling".to_string(),
        ));
    }

    let mut fits = 1;
    let mut too_big = operations.len() + 1;
    while too_big - fits > 1 {
        let mid = (fits + too_big) / 2;
        if compiled_size(operations, payer, table, mid)? <= MAX_TRANSACTION_SIZE {
            fits = mid;
        } else {
            too_big = mid;
        }
    }
    Ok(fits)
}
