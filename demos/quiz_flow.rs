//! Quiz flow demo for the Learna SDK
//!
//! Run with: cargo run --example quiz_flow
//!
//! Requires USER_PRIVATE_KEY, ADMIN_PRIVATE_KEY, LEARNA_CONTRACT, LEARNA_TOKEN
//! and CAMPAIGN_HASH. Set NEYNAR_API_KEY/NEYNAR_SIGNER_UUID for broadcasts and
//! REFERRAL_CONSUMER to attach referral attribution on Celo mainnet.

use std::io::{self, Write};
use std::sync::Arc;

use learna_sdk::{
    CompletionCoordinator, CoordinatorConfig, DivviClient, LearnaClient, LearnaReader,
    LocalSigner, NeynarClient, NetworkConfig, PassKeyCheck, ReferralConfig, Registry, RunContext,
    RunnerConfig, TransactionSigner, TxBuilder, TxRunner,
};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let network = NetworkConfig::from_env()?;
    let user = LocalSigner::from_env("USER_PRIVATE_KEY", &network.rpc_url).await?;
    let admin = LocalSigner::from_env("ADMIN_PRIVATE_KEY", &network.rpc_url).await?;
    let campaign_hash = std::env::var("CAMPAIGN_HASH")?.parse()?;

    let mut runner_config = RunnerConfig::default();
    if let Ok(consumer) = std::env::var("REFERRAL_CONSUMER") {
        runner_config = runner_config.with_referral(ReferralConfig {
            consumer: consumer.parse()?,
            providers: Vec::new(),
        });
    }

    let registry = Arc::new(Registry::from_networks(&[network.clone()]));
    let builder = TxBuilder::new(registry, network.chain_id, admin.address());
    let runner = TxRunner::new(user, admin, DivviClient::new()?, network.chain_id, runner_config);
    let reader = LearnaReader::new(&network)?;
    let coordinator = CompletionCoordinator::new(
        reader.clone(),
        NeynarClient::from_env()?,
        CoordinatorConfig::default(),
    );
    let client = LearnaClient::new(builder, runner, coordinator);

    println!("Connected wallet: {}", client.address());

    // Print run-state updates as they arrive
    let mut updates = client.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if let Some(message) = state.message {
                println!("  > {}", message);
            }
            if let Some(error) = state.error_message {
                println!("  ! {}", error);
            }
        }
    });

    print!("Enter your quiz score: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let score: u32 = input.trim().parse()?;

    // Skip key generation when the wallet already holds a pass key
    let mut batch = client
        .builder()
        .run_all(client.address(), campaign_hash, Default::default())?;
    batch.descriptors[0] = batch.descriptors[0]
        .clone()
        .with_refresher(Arc::new(PassKeyCheck::new(reader)));

    let (_points_tx, points_rx) = watch::channel(score);
    let outcome = client
        .execute(batch, RunContext::default().with_quiz_points(points_rx))
        .await?;

    match outcome.completed {
        Some(done) => println!("Points recorded in {}", done.tx_hash),
        None => println!("Nothing to record"),
    }

    // Let the teardown timer settle before exiting
    tokio::time::sleep(std::time::Duration::from_secs(7)).await;
    println!("Navigate to: {:?}", client.state().get().navigate_to);

    Ok(())
}
