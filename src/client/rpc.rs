//! JSON-RPC implementations of the client traits.

use solana_address_lookup_table_interface::state::AddressLookupTable;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_message::AddressLookupTableAccount;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;

use crate::constants::CONFIRM_POLL_INTERVAL_MS;
use crate::errors::{SubmitError, SubmitResult};

use super::{LookupTableClient, NetworkClient, RecentBlockhash};

/// Network client backed by a Solana JSON-RPC node.
pub struct RpcNetwork {
    rpc_client: RpcClient,
}

impl RpcNetwork {
    /// Connect to the given RPC URL at `confirmed` commitment.
    pub fn new(rpc_url: &str) -> Self {
        Self {
            rpc_client: RpcClient::new_with_commitment(
                rpc_url.to_string(),
                CommitmentConfig::confirmed(),
            ),
        }
    }
}

/// Map an RPC client error onto the submission taxonomy. Node-side
/// responses (including preflight failures) are semantic rejections;
/// anything at the connection level is transport.
fn map_client_error(e: ClientError) -> SubmitError {
    match e.kind() {
        ClientErrorKind::TransactionError(te) => SubmitError::Rejected(te.to_string()),
        ClientErrorKind::RpcError(_) => SubmitError::Rejected(e.to_string()),
        _ => SubmitError::Transport(e.to_string()),
    }
}

impl NetworkClient for RpcNetwork {
    async fn recent_blockhash(&self) -> SubmitResult<RecentBlockhash> {
        let (blockhash, last_valid_block_height) = self
            .rpc_client
            .get_latest_blockhash_with_commitment(CommitmentConfig::confirmed())
            .await
            .map_err(map_client_error)?;
        Ok(RecentBlockhash {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn current_slot(&self) -> SubmitResult<u64> {
        self.rpc_client.get_slot().await.map_err(map_client_error)
    }

    async fn send(&self, tx: &VersionedTransaction) -> SubmitResult<Signature> {
        self.rpc_client
            .send_transaction(tx)
            .await
            .map_err(map_client_error)
    }

    async fn confirm(&self, signature: &Signature, anchor: &RecentBlockhash) -> SubmitResult<()> {
        loop {
            let statuses = self
                .rpc_client
                .get_signature_statuses(&[*signature])
                .await
                .map_err(map_client_error)?;

            if let Some(Some(status)) = statuses.value.first() {
                if let Some(err) = &status.err {
                    return Err(SubmitError::Rejected(err.to_string()));
                }
                if status.satisfies_commitment(CommitmentConfig::confirmed()) {
                    return Ok(());
                }
            }

            let block_height = self
                .rpc_client
                .get_block_height()
                .await
                .map_err(map_client_error)?;
            if block_height > anchor.last_valid_block_height {
                return Err(SubmitError::BlockhashExpired);
            }

            tokio::time::sleep(std::time::Duration::from_millis(CONFIRM_POLL_INTERVAL_MS)).await;
        }
    }

    async fn balance(&self, account: &Pubkey) -> SubmitResult<u64> {
        self.rpc_client
            .get_balance(account)
            .await
            .map_err(map_client_error)
    }

    async fn minimum_balance_for_rent_exemption(&self, data_len: usize) -> SubmitResult<u64> {
        self.rpc_client
            .get_minimum_balance_for_rent_exemption(data_len)
            .await
            .map_err(map_client_error)
    }
}

impl LookupTableClient for RpcNetwork {
    async fn resolve_table(&self, table: &Pubkey) -> SubmitResult<AddressLookupTableAccount> {
        let account = self
            .rpc_client
            .get_account(table)
            .await
            .map_err(map_client_error)?;

        let state = AddressLookupTable::deserialize(&account.data)
            .map_err(|e| SubmitError::Rejected(format!("invalid lookup table {table}: {e}")))?;

        Ok(AddressLookupTableAccount {
            key: *table,
            addresses: state.addresses.to_vec(),
        })
    }
}
