use anyhow::{bail, Context, Result};
use env_logger::Builder;
use log::{info, LevelFilter};
use solana_keypair::Keypair;
use solana_pubkey::Pubkey;
use solana_signer::Signer;
use solana_system_interface::instruction as system_instruction;
use std::io::Write;
use std::path::PathBuf;

use solana_tx_batcher::client::rpc::RpcNetwork;
use solana_tx_batcher::report::{print_balances, print_lookup_table, FeeTracker};
use solana_tx_batcher::{
    max_group_size_for, submit_batched, submit_group, submit_in_groups, table, utils,
    LookupTableClient, NetworkClient, SubmitOptions,
};

/// Demo harness: creates an address lookup table, funds a set of fresh
/// accounts through it, and reclaims the funds in co-signed groups,
/// reporting balances and fees after each phase.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap()
                    .as_secs(),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && (args[1] == "--version" || args[1] == "-v") {
        println!("solana-tx-batcher demo v{}", solana_tx_batcher::VERSION);
        return Ok(());
    }
    if args.len() > 1 && (args[1] == "--help" || args[1] == "-h") {
        println!("solana-tx-batcher demo v{}", solana_tx_batcher::VERSION);
        println!("\nUsage:");
        println!("  {} [--cluster URL] [--keypair PATH] [--accounts N]", args[0]);
        println!("\nOptions:");
        println!("  --cluster, -c URL    RPC URL (default: devnet)");
        println!("  --keypair, -k PATH   Payer keypair file (default: ~/.config/solana/id.json)");
        println!("  --accounts, -n N     Number of destination accounts (default: 40)");
        println!("  --version, -v        Show version information");
        println!("\nThe payer needs roughly 0.05 SOL on devnet; total fees are about 0.01.");
        return Ok(());
    }

    let mut cluster = "https://api.devnet.solana.com".to_string();
    let mut keypair_path: Option<PathBuf> = None;
    let mut num_accounts = 40usize;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--cluster" | "-c" => {
                if i + 1 < args.len() {
                    cluster = args[i + 1].clone();
                    i += 2;
                } else {
                    bail!("missing value for --cluster");
                }
            }
            "--keypair" | "-k" => {
                if i + 1 < args.len() {
                    keypair_path = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    bail!("missing value for --keypair");
                }
            }
            "--accounts" | "-n" => {
                if i + 1 < args.len() {
                    num_accounts = args[i + 1].parse().context("invalid value for --accounts")?;
                    i += 2;
                } else {
                    bail!("missing value for --accounts");
                }
            }
            other => bail!("unknown argument: {other}"),
        }
    }

    let keypair_path = keypair_path.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/solana/id.json")
    });
    let payer = utils::load_keypair(&keypair_path)?;
    info!("payer: {}", payer.pubkey());

    let network = RpcNetwork::new(&cluster);
    let options = SubmitOptions::default();

    let keypairs: Vec<Keypair> = (0..num_accounts).map(|_| Keypair::new()).collect();
    let pubkeys: Vec<Pubkey> = keypairs.iter().map(|k| k.pubkey()).collect();

    let min_rent = network.minimum_balance_for_rent_exemption(0).await?;
    info!("min rent for zero-data account: {min_rent}");

    let initial_balance = network.balance(&payer.pubkey()).await?;
    info!("payer balance: {initial_balance}");
    let mut fees = FeeTracker::new(initial_balance);

    // Phase 1: create the lookup table.
    let recent_slot = network.current_slot().await?;
    let (create_ix, table_key) = table::create_table(&payer.pubkey(), &payer.pubkey(), recent_slot);
    submit_group(&network, &network, &[create_ix], &payer, &[], None, &options).await?;
    print_lookup_table(&network, &table_key).await?;
    fees.record_phase("table init", network.balance(&payer.pubkey()).await?, 0);

    // Phase 2: append every destination, a few extends per the size ceiling.
    let extend_ixs = table::extend_table_instructions(
        &table_key,
        &payer.pubkey(),
        &payer.pubkey(),
        &pubkeys,
    )?;
    submit_batched(&network, &network, &extend_ixs, 1, &payer, None, &options)
        .await
        .context("extending lookup table")?;
    // A table only becomes referenceable a slot after its last extension.
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;
    print_lookup_table(&network, &table_key).await?;
    fees.record_phase("table extend", network.balance(&payer.pubkey()).await?, 0);

    // Phase 3: funding all accounts in one transaction without the table
    // must be rejected for size; each destination costs a full 32-byte key.
    let transfers: Vec<_> = pubkeys
        .iter()
        .map(|to| system_instruction::transfer(&payer.pubkey(), to, min_rent))
        .collect();
    match submit_group(&network, &network, &transfers, &payer, &[], None, &options).await {
        Err(e) => info!("funding without the table rejected as expected: {e}"),
        Ok(signature) => bail!(
            "funding {num_accounts} accounts without the table unexpectedly succeeded: {signature}"
        ),
    }

    let resolved = network.resolve_table(&table_key).await?;
    info!(
        "estimated max transfers per transaction: {} without table, {} with table",
        max_group_size_for(&transfers, &payer.pubkey(), None)?,
        max_group_size_for(&transfers, &payer.pubkey(), Some(&resolved))?,
    );

    // Phase 4: the same transfers through the table fit in one transaction.
    submit_group(
        &network,
        &network,
        &transfers,
        &payer,
        &[],
        Some(&table_key),
        &options,
    )
    .await
    .context("funding accounts through the lookup table")?;
    print_balances(&network, "after funding with table", &payer.pubkey(), &pubkeys).await?;
    let amount_given = num_accounts as u64 * min_rent;
    fees.record_phase(
        "funding with table",
        network.balance(&payer.pubkey()).await?,
        amount_given as i64,
    );

    // Phase 5: reclaim in groups of 5; each group is co-signed by exactly
    // the five source accounts it moves funds from.
    let reclaims: Vec<_> = pubkeys
        .iter()
        .map(|from| system_instruction::transfer(from, &payer.pubkey(), min_rent))
        .collect();
    let receipt = submit_in_groups(
        &network,
        &network,
        &reclaims,
        5,
        &payer,
        |_, range| keypairs[range].iter().collect(),
        Some(&table_key),
        &options,
    )
    .await
    .context("reclaiming funds")?;
    info!("reclaim took {} transactions", receipt.transactions());
    print_balances(&network, "after reclaiming", &payer.pubkey(), &pubkeys).await?;
    fees.record_phase(
        "reclaim",
        network.balance(&payer.pubkey()).await?,
        -(amount_given as i64),
    );

    info!(
        "creating the table, funding and reclaiming {num_accounts} accounts cost {} lamports total",
        fees.total_spent()
    );
    Ok(())
}
