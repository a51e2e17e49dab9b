//! Submission driver: turns one group of instructions plus signing context
//! into a signed v0 transaction, submits it, and blocks until the network
//! reports a terminal outcome.
//!
//! The driver never retries semantic failures. An optional [`RetryPolicy`]
//! adds bounded exponential backoff around transport failures only, and only
//! for the steps where a retry cannot double-execute anything: blockhash
//! fetch, table resolution, and re-sending the *same* signed envelope.


use std::time::Duration;

use log::debug;
use solana_instruction::Instruction;
use solana_keypair::Keypair;
use solana_message::{v0, AddressLookupTableAccount, VersionedMessage};
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_signer::Signer;
use solana_transaction::versioned::VersionedTransaction;

use crate::client::{LookupTableClient, NetworkClient, RecentBlockhash};
use crate::constants::MAX_TRANSACTION_SIZE;
use crate::errors::{SubmitError, SubmitResult};

/// Bounded exponential backoff for transport failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Must be at least 1.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }
}

/// Caller-tunable submission behavior.
#[derive(Debug, Clone, Default)]
pub struct SubmitOptions {
    /// Backoff for transport failures. `None` means fail on the first one.
    pub retry: Option<RetryPolicy>,
}

/// Run `op`, retrying transport failures per the policy. Semantic failures
/// and blockhash expiry pass through untouched.
pub(crate) async fn with_backoff<T, F, Fut>(policy: Option<&RetryPolicy>, mut op: F) -> SubmitResult<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = SubmitResult<T>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Err(e) if e.is_retryable()
                && policy.is_some_and(|p| attempt + 1 < p.max_attempts) =>
            {
                let policy = policy.unwrap();
                let delay = policy.base_delay * (1u32 << attempt.min(16));
                debug!("transport failure, retrying in {delay:?}: {e}");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// Reject instead of silently compiling an account as a full static key:
/// when the caller asked for a lookup table, every non-signer account the
/// group references must already be a member.
fn check_table_coverage(
    instructions: &[Instruction],
    signer_keys: &[Pubkey],
    table: &AddressLookupTableAccount,
) -> SubmitResult<()> {
    for ix in instructions {
        for meta in &ix.accounts {
            if meta.is_signer || signer_keys.contains(&meta.pubkey) {
                continue;
            }
            if !table.addresses.contains(&meta.pubkey) {
                return Err(SubmitError::Rejected(format!(
                    "account {} is not in lookup table {}",
                    meta.pubkey, table.key
                )));
            }
        }
    }
    Ok(())
}

/// Compile, sign and size-check one transaction without touching the
/// network. Shared between [`submit_group`] and the group-size estimator.
pub(crate) fn build_transaction(
    instructions: &[Instruction],
    payer: &Keypair,
    signers: &[&Keypair],
    table: Option<&AddressLookupTableAccount>,
    anchor: &RecentBlockhash,
) -> SubmitResult<VersionedTransaction> {
    let tables: &[AddressLookupTableAccount] = match table {
        Some(t) => std::slice::from_ref(t),
        None => &[],
    };
    let message = v0::Message::try_compile(&payer.pubkey(), instructions, tables, anchor.blockhash)
        .map_err(|e| SubmitError::Signing(format!("message compilation failed: {e}")))?;

    // One signature per keypair, payer first, duplicates collapsed.
    let mut unique: Vec<&dyn Signer> = vec![payer as &dyn Signer];
    for signer in signers {
        if unique.iter().all(|s| s.pubkey() != signer.pubkey()) {
            unique.push(*signer);
        }
    }

    let tx = VersionedTransaction::try_new(VersionedMessage::V0(message), &unique)
        .map_err(|e| SubmitError::Signing(format!("signing failed: {e}")))?;

    let serialized_size = bincode::serialized_size(&tx)
        .map_err(|e| SubmitError::Signing(format!("serialization failed: {e}")))?
        as usize;
    if serialized_size > MAX_TRANSACTION_SIZE {
        return Err(SubmitError::Rejected(format!(
            "transaction too large: {serialized_size} bytes (max {MAX_TRANSACTION_SIZE})"
        )));
    }
    Ok(tx)
}

/// Build, sign, submit and confirm one transaction for a group of
/// instructions.
///
/// `signers` must contain every keypair whose signature the group's
/// instructions require; the payer is always included and need not be
/// repeated. When `table` is supplied it is resolved to its current member
/// list first, and the group is rejected if it references a non-signer
/// account the table does not (yet) contain.
pub async fn submit_group<N, L>(
    network: &N,
    table_client: &L,
    instructions: &[Instruction],
    payer: &Keypair,
    signers: &[&Keypair],
    table: Option<&Pubkey>,
    options: &SubmitOptions,
) -> SubmitResult<Signature>
where
    N: NetworkClient,
    L: LookupTableClient,
{
    if instructions.is_empty() {
        return Err(SubmitError::Config("empty instruction group".to_string()));
    }

    let resolved = match table {
        Some(key) => Some(
            with_backoff(options.retry.as_ref(), || table_client.resolve_table(key)).await?,
        ),
        None => None,
    };

    if let Some(table) = &resolved {
        let mut signer_keys: Vec<Pubkey> = signers.iter().map(|s| s.pubkey()).collect();
        signer_keys.push(payer.pubkey());
        check_table_coverage(instructions, &signer_keys, table)?;
    }

    // Fetched immediately before assembly so the anchor is as fresh as
    // possible when the transaction hits the network.
    let anchor = with_backoff(options.retry.as_ref(), || network.recent_blockhash()).await?;

    let tx = build_transaction(instructions, payer, signers, resolved.as_ref(), &anchor)?;

    let signature = with_backoff(options.retry.as_ref(), || network.send(&tx)).await?;
    debug!("sent transaction {signature}, awaiting confirmation");

    network.confirm(&signature, &anchor).await?;
    Ok(signature)
}
