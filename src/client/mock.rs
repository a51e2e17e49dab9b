//! In-memory network for tests and offline experimentation.
//!
//! [`MockNetwork`] models the pieces of cluster behavior the batcher and
//! submission driver actually depend on: the serialized transaction size
//! ceiling, system-program transfers against an in-memory balance map,
//! per-signature fees, advancing blockhashes with expiry, duplicate
//! detection keyed on the transaction signature, and address lookup table
//! creation, extension and resolution (so the full harness flow runs against
//! it unchanged).
//!
//! It is deliberately not a validator: no rent, no sysvars, no programs
//! beyond the system and lookup-table programs, instant finality.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use solana_address_lookup_table_interface::instruction::ProgramInstruction;
use solana_hash::Hash;
use solana_message::{AddressLookupTableAccount, VersionedMessage};
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_system_interface::instruction::SystemInstruction;
use solana_transaction::versioned::VersionedTransaction;

use crate::constants::{BLOCKHASH_VALID_BLOCKS, MAX_TRANSACTION_SIZE};
use crate::errors::{SubmitError, SubmitResult};

use super::{LookupTableClient, NetworkClient, RecentBlockhash};

/// Flat fee charged per required signature, matching the mainnet default.
pub const FEE_PER_SIGNATURE: u64 = 5_000;

/// Rent-exempt minimum for a zero-data account.
const MIN_RENT_ZERO_DATA: u64 = 890_880;

#[derive(Default)]
struct Inner {
    balances: HashMap<Pubkey, u64>,
    tables: HashMap<Pubkey, Vec<Pubkey>>,
    block_height: u64,
    slot: u64,
    issued_blockhashes: HashMap<Hash, u64>,
    confirmed: HashSet<Signature>,
    dropped: HashSet<Signature>,
    transactions_sent: u64,
    expire_blockhashes: bool,
}

/// In-memory implementation of [`NetworkClient`] and [`LookupTableClient`].
#[derive(Default)]
pub struct MockNetwork {
    inner: Mutex<Inner>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account out of thin air.
    pub fn airdrop(&self, account: &Pubkey, lamports: u64) {
        let mut inner = self.inner.lock().unwrap();
        *inner.balances.entry(*account).or_insert(0) += lamports;
    }

    /// Install a lookup table directly, bypassing the on-chain instructions.
    pub fn register_table(&self, table: Pubkey, addresses: Vec<Pubkey>) {
        self.inner.lock().unwrap().tables.insert(table, addresses);
    }

    /// When set, blockhashes issued from now on are already expired when
    /// confirmation is polled; the transactions anchored to them are dropped
    /// without executing.
    pub fn set_expire_blockhashes(&self, expire: bool) {
        self.inner.lock().unwrap().expire_blockhashes = expire;
    }

    /// Number of transactions accepted so far.
    pub fn transactions_sent(&self) -> u64 {
        self.inner.lock().unwrap().transactions_sent
    }
}

/// Resolve the full account key list of a message: static keys first, then
/// the writable and readonly loaded addresses of each table lookup, in the
/// order the runtime loads them.
fn resolve_account_keys(inner: &Inner, message: &VersionedMessage) -> SubmitResult<Vec<Pubkey>> {
    let mut keys: Vec<Pubkey> = message.static_account_keys().to_vec();

    let Some(lookups) = message.address_table_lookups() else {
        return Ok(keys);
    };

    let load = |inner: &Inner, table_key: &Pubkey, indexes: &[u8]| -> SubmitResult<Vec<Pubkey>> {
        let table = inner
            .tables
            .get(table_key)
            .ok_or_else(|| SubmitError::Rejected(format!("lookup table {table_key} not found")))?;
        indexes
            .iter()
            .map(|&index| {
                table.get(index as usize).copied().ok_or_else(|| {
                    SubmitError::Rejected(format!(
                        "lookup index {index} out of range for table {table_key}"
                    ))
                })
            })
            .collect()
    };

    // The runtime loads all writable lookups first, then all readonly ones.
    for lookup in lookups {
        keys.extend(load(inner, &lookup.account_key, &lookup.writable_indexes)?);
    }
    for lookup in lookups {
        keys.extend(load(inner, &lookup.account_key, &lookup.readonly_indexes)?);
    }
    Ok(keys)
}

/// Execute one compiled instruction against a working balance/table copy.
fn execute_instruction(
    balances: &mut HashMap<Pubkey, u64>,
    tables: &mut HashMap<Pubkey, Vec<Pubkey>>,
    keys: &[Pubkey],
    num_signers: usize,
    program_id_index: u8,
    accounts: &[u8],
    data: &[u8],
) -> SubmitResult<()> {
    let program_id = keys
        .get(program_id_index as usize)
        .ok_or_else(|| SubmitError::Rejected("program id index out of range".to_string()))?;

    let account_key = |slot: usize| -> SubmitResult<Pubkey> {
        let index = *accounts
            .get(slot)
            .ok_or_else(|| SubmitError::Rejected("missing instruction account".to_string()))?;
        keys.get(index as usize)
            .copied()
            .ok_or_else(|| SubmitError::Rejected("account index out of range".to_string()))
    };

    if *program_id == solana_sdk_ids::system_program::ID {
        let decoded: SystemInstruction = bincode::deserialize(data)
            .map_err(|e| SubmitError::Rejected(format!("malformed system instruction: {e}")))?;
        let SystemInstruction::Transfer { lamports } = decoded else {
            return Err(SubmitError::Rejected(
                "unsupported system instruction".to_string(),
            ));
        };

        // The source must be a transaction signer, which for v0 messages
        // means one of the leading static accounts.
        let from = account_key(0)?;
        let from_index = accounts[0] as usize;
        if from_index >= num_signers {
            return Err(SubmitError::Rejected(format!(
                "transfer source {from} did not sign"
            )));
        }
        let to = account_key(1)?;
        let from_balance = balances.entry(from).or_insert(0);
        if *from_balance < lamports {
            return Err(SubmitError::Rejected(format!(
                "insufficient funds: {from} has {from_balance}, needs {lamports}"
            )));
        }
        *from_balance -= lamports;
        *balances.entry(to).or_insert(0) += lamports;
        return Ok(());
    }

    if *program_id == solana_sdk_ids::address_lookup_table::ID {
        let decoded: ProgramInstruction = bincode::deserialize(data)
            .map_err(|e| SubmitError::Rejected(format!("malformed lookup table instruction: {e}")))?;
        match decoded {
            ProgramInstruction::CreateLookupTable { .. } => {
                tables.insert(account_key(0)?, Vec::new());
            }
            ProgramInstruction::ExtendLookupTable { new_addresses } => {
                let table = account_key(0)?;
                tables
                    .get_mut(&table)
                    .ok_or_else(|| SubmitError::Rejected(format!("lookup table {table} not found")))?
                    .extend(new_addresses);
            }
            _ => {
                return Err(SubmitError::Rejected(
                    "unsupported lookup table instruction".to_string(),
                ))
            }
        }
        return Ok(());
    }

    Err(SubmitError::Rejected(format!("unknown program {program_id}")))
}

impl NetworkClient for MockNetwork {
    async fn recent_blockhash(&self) -> SubmitResult<RecentBlockhash> {
        let mut inner = self.inner.lock().unwrap();
        inner.block_height += 1;
        inner.slot += 1;

        let mut seed = [0u8; 32];
        seed[..8].copy_from_slice(&inner.block_height.to_le_bytes());
        let blockhash = Hash::new_from_array(seed);

        let last_valid_block_height = if inner.expire_blockhashes {
            // Already below the current height, so the next confirmation
            // poll observes expiry.
            inner.block_height.saturating_sub(1)
        } else {
            inner.block_height + BLOCKHASH_VALID_BLOCKS
        };
        inner
            .issued_blockhashes
            .insert(blockhash, last_valid_block_height);

        Ok(RecentBlockhash {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn current_slot(&self) -> SubmitResult<u64> {
        Ok(self.inner.lock().unwrap().slot)
    }

    async fn send(&self, tx: &VersionedTransaction) -> SubmitResult<Signature> {
        let mut inner = self.inner.lock().unwrap();

        let serialized_size = bincode::serialized_size(tx)
            .map_err(|e| SubmitError::Rejected(format!("unserializable transaction: {e}")))?
            as usize;
        if serialized_size > MAX_TRANSACTION_SIZE {
            return Err(SubmitError::Rejected(format!(
                "transaction too large: {serialized_size} bytes (max {MAX_TRANSACTION_SIZE})"
            )));
        }

        let num_signers = tx.message.header().num_required_signatures as usize;
        if tx.signatures.len() != num_signers || tx.signatures.iter().any(|s| *s == Signature::default()) {
            return Err(SubmitError::Rejected("missing signatures".to_string()));
        }

        let signature = tx.signatures[0];
        if inner.confirmed.contains(&signature) || inner.dropped.contains(&signature) {
            return Err(SubmitError::Rejected(format!(
                "duplicate transaction {signature}"
            )));
        }

        let last_valid = *inner
            .issued_blockhashes
            .get(tx.message.recent_blockhash())
            .ok_or_else(|| SubmitError::Rejected("blockhash not found".to_string()))?;
        if inner.block_height > last_valid {
            // Anchored to an expired blockhash: accepted at the RPC edge but
            // never lands. Confirmation reports the expiry.
            inner.dropped.insert(signature);
            inner.transactions_sent += 1;
            return Ok(signature);
        }

        let keys = resolve_account_keys(&inner, &tx.message)?;

        // Stage everything, commit only if the whole transaction succeeds.
        let mut balances = inner.balances.clone();
        let mut tables = inner.tables.clone();

        let payer = keys[0];
        let fee = FEE_PER_SIGNATURE * num_signers as u64;
        let payer_balance = balances.entry(payer).or_insert(0);
        if *payer_balance < fee {
            return Err(SubmitError::Rejected(format!(
                "fee payer {payer} cannot cover fee {fee}"
            )));
        }
        *payer_balance -= fee;

        for ix in tx.message.instructions() {
            execute_instruction(
                &mut balances,
                &mut tables,
                &keys,
                num_signers,
                ix.program_id_index,
                &ix.accounts,
                &ix.data,
            )?;
        }

        inner.balances = balances;
        inner.tables = tables;
        inner.confirmed.insert(signature);
        inner.transactions_sent += 1;
        inner.block_height += 1;
        inner.slot += 1;
        Ok(signature)
    }

    async fn confirm(&self, signature: &Signature, _anchor: &RecentBlockhash) -> SubmitResult<()> {
        let inner = self.inner.lock().unwrap();
        if inner.confirmed.contains(signature) {
            Ok(())
        } else if inner.dropped.contains(signature) {
            Err(SubmitError::BlockhashExpired)
        } else {
            Err(SubmitError::Rejected(format!("unknown signature {signature}")))
        }
    }

    async fn balance(&self, account: &Pubkey) -> SubmitResult<u64> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .balances
            .get(account)
            .copied()
            .unwrap_or(0))
    }

    async fn minimum_balance_for_rent_exemption(&self, _data_len: usize) -> SubmitResult<u64> {
        Ok(MIN_RENT_ZERO_DATA)
    }
}

impl LookupTableClient for MockNetwork {
    async fn resolve_table(&self, table: &Pubkey) -> SubmitResult<AddressLookupTableAccount> {
        let inner = self.inner.lock().unwrap();
        let addresses = inner
            .tables
            .get(table)
            .ok_or_else(|| SubmitError::Rejected(format!("lookup table {table} not found")))?
            .clone();
        Ok(AddressLookupTableAccount {
            key: *table,
            addresses,
        })
    }
}
