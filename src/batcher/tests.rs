use super::*;
use crate::client::mock::{MockNetwork, FEE_PER_SIGNATURE};
use crate::errors::SubmitError;
use solana_signer::Signer;
use solana_system_interface::instruction as system_instruction;

const AMOUNT: u64 = 1_000_000;

fn funded_payer(network: &MockNetwork) -> Keypair {
    let payer = Keypair::new();
    network.airdrop(&payer.pubkey(), 10_000_000_000);
    payer
}

fn fresh_pubkeys(count: usize) -> Vec<Pubkey> {
    (0..count).map(|_| Pubkey::new_unique()).collect()
}

fn transfers_from(payer: &Pubkey, destinations: &[Pubkey]) -> Vec<Instruction> {
    destinations
        .iter()
        .map(|to| system_instruction::transfer(payer, to, AMOUNT))
        .collect()
}

#[tokio::test]
async fn test_zero_operations_zero_transactions() {
    let network = MockNetwork::new();
    let payer = funded_payer(&network);

    let receipt = submit_batched(&network, &network, &[], 20, &payer, None, &Default::default())
        .await
        .unwrap();

    assert_eq!(receipt.transactions(), 0);
    assert_eq!(network.transactions_sent(), 0);
}

#[tokio::test]
async fn test_group_size_zero_is_config_error() {
    let network = MockNetwork::new();
    let payer = funded_payer(&network);
    let ops = transfers_from(&payer.pubkey(), &fresh_pubkeys(3));

    let err = submit_batched(&network, &network, &ops, 0, &payer, None, &Default::default())
        .await
        .unwrap_err();

    assert!(matches!(err.source, SubmitError::Config(_)));
    assert_eq!(err.group_index, 0);
    assert_eq!(err.confirmed, 0);
    assert_eq!(network.transactions_sent(), 0);
}

#[tokio::test]
async fn test_group_count_and_coverage() {
    let network = MockNetwork::new();
    let payer = funded_payer(&network);
    let destinations = fresh_pubkeys(40);
    let ops = transfers_from(&payer.pubkey(), &destinations);

    let receipt = submit_batched(&network, &network, &ops, 20, &payer, None, &Default::default())
        .await
        .unwrap();

    assert_eq!(receipt.transactions(), 2);
    assert_eq!(network.transactions_sent(), 2);
    // Every destination received exactly its one transfer: nothing was
    // dropped or duplicated by the partitioning.
    for destination in &destinations {
        assert_eq!(network.balance(destination).await.unwrap(), AMOUNT);
    }
}

#[tokio::test]
async fn test_short_last_group() {
    let network = MockNetwork::new();
    let payer = funded_payer(&network);
    let ops = transfers_from(&payer.pubkey(), &fresh_pubkeys(40));

    let receipt = submit_batched(&network, &network, &ops, 7, &payer, None, &Default::default())
        .await
        .unwrap();

    // ceil(40 / 7)
    assert_eq!(receipt.transactions(), 6);
}

#[tokio::test]
async fn test_oversized_group_fails_without_table() {
    let network = MockNetwork::new();
    let payer = funded_payer(&network);
    let ops = transfers_from(&payer.pubkey(), &fresh_pubkeys(40));

    // 40 distinct 32-byte destination keys cannot fit one transaction.
    let err = submit_batched(&network, &network, &ops, 40, &payer, None, &Default::default())
        .await
        .unwrap_err();

    assert!(matches!(err.source, SubmitError::Rejected(_)));
    assert_eq!(err.group_index, 0);
    assert_eq!(network.transactions_sent(), 0);
}

#[tokio::test]
async fn test_lookup_table_fits_what_static_keys_cannot() {
    let network = MockNetwork::new();
    let payer = funded_payer(&network);
    let destinations = fresh_pubkeys(40);
    let ops = transfers_from(&payer.pubkey(), &destinations);

    let table_key = Pubkey::new_unique();
    network.register_table(table_key, destinations.clone());

    // The exact workload that was rejected at group size 40 without the
    // table compresses into a single transaction with it.
    let receipt = submit_batched(
        &network,
        &network,
        &ops,
        40,
        &payer,
        Some(&table_key),
        &Default::default(),
    )
    .await
    .unwrap();

    assert_eq!(receipt.transactions(), 1);
    for destination in &destinations {
        assert_eq!(network.balance(destination).await.unwrap(), AMOUNT);
    }
}

#[tokio::test]
async fn test_reclaim_with_per_group_signers() {
    let network = MockNetwork::new();
    let payer = funded_payer(&network);
    let sources: Vec<Keypair> = (0..40).map(|_| Keypair::new()).collect();
    let source_keys: Vec<Pubkey> = sources.iter().map(|k| k.pubkey()).collect();
    for key in &source_keys {
        network.airdrop(key, AMOUNT);
    }

    let table_key = Pubkey::new_unique();
    network.register_table(table_key, source_keys.clone());

    let ops: Vec<Instruction> = source_keys
        .iter()
        .map(|from| system_instruction::transfer(from, &payer.pubkey(), AMOUNT))
        .collect();

    let payer_before = network.balance(&payer.pubkey()).await.unwrap();
    let receipt = submit_in_groups(
        &network,
        &network,
        &ops,
        5,
        &payer,
        |_, range| sources[range].iter().collect(),
        Some(&table_key),
        &Default::default(),
    )
    .await
    .unwrap();

    assert_eq!(receipt.transactions(), 8);

    // Each of the 8 transactions is signed by the payer plus its 5 sources.
    let fees = 8 * 6 * FEE_PER_SIGNATURE;
    let payer_after = network.balance(&payer.pubkey()).await.unwrap();
    assert_eq!(payer_after, payer_before + 40 * AMOUNT - fees);
    for key in &source_keys {
        assert_eq!(network.balance(key).await.unwrap(), 0);
    }
}

#[tokio::test]
async fn test_failure_reports_group_index_and_stops() {
    let network = MockNetwork::new();
    let payer = funded_payer(&network);
    let sources: Vec<Keypair> = (0..20).map(|_| Keypair::new()).collect();
    let source_keys: Vec<Pubkey> = sources.iter().map(|k| k.pubkey()).collect();
    // Fund only the first two groups; group 2's sources are broke.
    for key in &source_keys[..10] {
        network.airdrop(key, AMOUNT);
    }

    let ops: Vec<Instruction> = source_keys
        .iter()
        .map(|from| system_instruction::transfer(from, &payer.pubkey(), AMOUNT))
        .collect();

    let err = submit_in_groups(
        &network,
        &network,
        &ops,
        5,
        &payer,
        |_, range| sources[range].iter().collect(),
        None,
        &Default::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err.source, SubmitError::Rejected(_)));
    assert_eq!(err.group_index, 2);
    assert_eq!(err.confirmed, 2);
    // Fail-fast: the last group was never attempted.
    assert_eq!(network.transactions_sent(), 2);
    // Only the two confirmed groups moved funds.
    let payer_after = network.balance(&payer.pubkey()).await.unwrap();
    assert_eq!(payer_after, 10_000_000_000 + 10 * AMOUNT - 2 * 6 * FEE_PER_SIGNATURE);
}

#[tokio::test]
async fn test_stale_blockhash_surfaces_as_expiry() {
    let network = MockNetwork::new();
    let payer = funded_payer(&network);
    let ops = transfers_from(&payer.pubkey(), &fresh_pubkeys(10));

    network.set_expire_blockhashes(true);
    let err = submit_batched(&network, &network, &ops, 5, &payer, None, &Default::default())
        .await
        .unwrap_err();

    assert!(matches!(err.source, SubmitError::BlockhashExpired));
    assert_eq!(err.group_index, 0);
    assert_eq!(err.confirmed, 0);
}

#[test]
fn test_max_group_size_without_table() {
    let payer = Keypair::new();
    let ops = transfers_from(&payer.pubkey(), &fresh_pubkeys(40));

    let k = max_group_size_for(&ops, &payer.pubkey(), None).unwrap();

    assert!(k >= 1 && k < 40);
    assert!(compiled_size(&ops, &payer.pubkey(), None, k).unwrap() <= MAX_TRANSACTION_SIZE);
    assert!(compiled_size(&ops, &payer.pubkey(), None, k + 1).unwrap() > MAX_TRANSACTION_SIZE);
}

#[test]
fn test_max_group_size_with_table() {
    let payer = Keypair::new();
    let destinations = fresh_pubkeys(40);
    let ops = transfers_from(&payer.pubkey(), &destinations);
    let table = AddressLookupTableAccount {
        key: Pubkey::new_unique(),
        addresses: destinations,
    };

    let without = max_group_size_for(&ops, &payer.pubkey(), None).unwrap();
    let with = max_group_size_for(&ops, &payer.pubkey(), Some(&table)).unwrap();

    // One-byte table indexes instead of 32-byte keys: the whole list fits.
    assert_eq!(with, 40);
    assert!(with > without);
}

#[test]
fn test_max_group_size_empty() {
    let payer = Keypair::new();
    assert_eq!(max_group_size_for(&[], &payer.pubkey(), None).unwrap(), 0);
}
