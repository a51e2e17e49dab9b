//! Building instructions that manage an address lookup table.
//!
//! Thin wrappers over the lookup table program's instruction builders. The
//! table itself lives on the network; this crate only creates it, appends
//! members, and later references it when compiling transactions.

use solana_address_lookup_table_interface::instruction as alt_instruction;
use solana_instruction::Instruction;
use solana_pubkey::Pubkey;

use crate::constants::{EXTEND_BATCH_SIZE, LOOKUP_TABLE_MAX_ADDRESSES};
use crate::errors::{SubmitError, SubmitResult};

/// Instruction creating a new lookup table, plus the address the table will
/// live at. The address is derived from the authority and the slot, so the
/// slot must be recent when the instruction lands.
pub fn create_table(authority: &Pubkey, payer: &Pubkey, recent_slot: u64) -> (Instruction, Pubkey) {
    alt_instruction::create_lookup_table(*authority, *payer, recent_slot)
}

/// Instruction appending `addresses` to an existing table.
pub fn extend_table(
    table: &Pubkey,
    authority: &Pubkey,
    payer: &Pubkey,
    addresses: Vec<Pubkey>,
) -> Instruction {
    alt_instruction::extend_lookup_table(*table, *authority, Some(*payer), addresses)
}

/// Split a long address list into extend instructions of at most
/// [`EXTEND_BATCH_SIZE`] addresses each. Extend instructions carry 32 bytes
/// per address and are bound by the same transaction size ceiling as
/// everything else, so appending a large membership takes several
/// transactions.
pub fn extend_table_instructions(
    table: &Pubkey,
    authority: &Pubkey,
    payer: &Pubkey,
    addresses: &[Pubkey],
) -> SubmitResult<Vec<Instruction>> {
    if addresses.len() > LOOKUP_TABLE_MAX_ADDRESSES {
        return Err(SubmitError::Config(format!(
            "{} addresses exceed the table capacity of {LOOKUP_TABLE_MAX_ADDRESSES}",
            addresses.len()
        )));
    }
    Ok(addresses
        .chunks(EXTEND_BATCH_SIZE)
        .map(|chunk| extend_table(table, authority, payer, chunk.to_vec()))
        .collect())
}
