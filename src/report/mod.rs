//! Read-only diagnostics printed between harness phases.

use log::info;
use solana_pubkey::Pubkey;

use crate::client::{LookupTableClient, NetworkClient};
use crate::errors::SubmitResult;

/// Log the payer's balance and every tracked account's balance.
pub async fn print_balances<N: NetworkClient>(
    network: &N,
    phase: &str,
    payer: &Pubkey,
    accounts: &[Pubkey],
) -> SubmitResult<()> {
    info!("{phase}:");
    info!("  payer balance: {}", network.balance(payer).await?);
    for (index, account) in accounts.iter().enumerate() {
        info!(
            "  index: {index}  address: {account}  balance: {}",
            network.balance(account).await?
        );
    }
    Ok(())
}

/// Log a lookup table's members with their indexes.
pub async fn print_lookup_table<L: LookupTableClient>(
    table_client: &L,
    table: &Pubkey,
) -> SubmitResult<()> {
    let resolved = table_client.resolve_table(table).await?;
    info!("lookup table: {table}");
    for (index, address) in resolved.addresses.iter().enumerate() {
        info!("  index: {index}  address: {address}");
    }
    Ok(())
}

/// Running fee accounting across harness phases, derived from observed
/// balance deltas the way the original harness reports them.
#[derive(Debug, Default)]
pub struct FeeTracker {
    initial_balance: u64,
    last_balance: u64,
}

impl FeeTracker {
    pub fn new(initial_balance: u64) -> Self {
        Self {
            initial_balance,
            last_balance: initial_balance,
        }
    }

    /// Record the balance after a phase and log the fee it cost, net of
    /// lamports intentionally moved in or out of the payer.
    pub fn record_phase(&mut self, phase: &str, new_balance: u64, net_transferred_out: i64) {
        let spent = self.last_balance as i64 - new_balance as i64;
        let fee = spent - net_transferred_out;
        info!("{phase} fee: {fee}");
        info!("payer balance: {new_balance}");
        self.last_balance = new_balance;
    }

    /// Total lamports the payer is down since tracking began.
    pub fn total_spent(&self) -> i64 {
        self.initial_balance as i64 - self.last_balance as i64
    }
}
