//! Plasma CLI - drive an in-memory root-chain deployment
//!
//! This tool provides commands for:
//! - Running the full deposit → checkpoint → exit → withdraw round trip
//! - Computing sparse-Merkle-tree roots and verifying inclusion proofs
//! - Encoding and inspecting child-chain transactions
//! - Deriving keys and producing ownership signatures

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use plasma_keys::{
    address_from_public_key, public_key_hex, sign_recoverable, signing_key_from_hex,
};
use plasma_ledger::{CallContext, ContractInvoker, PlasmaModule};
use plasma_primitives::{slot, Address, Hash256};
use plasma_smt::SparseMerkleTree;
use plasma_tx::ChildChainTx;

/// Plasma Root Chain - coin ledger and exit game
#[derive(Parser)]
#[command(name = "plasma")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Drive an in-memory plasma root-chain deployment", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the whole protocol once: deposit, checkpoint, exit, withdraw
    Simulate {
        /// Deposit amount (denomination of the coin)
        #[arg(short, long, default_value = "50000")]
        amount: u64,

        /// Challenge period, in chain time units
        #[arg(short, long, default_value = "60")]
        challenge_period: u64,

        /// Asset id to deposit
        #[arg(long, default_value = "0")]
        asset: u32,
    },

    /// Compute the root of a tree built from slot:hash leaf pairs
    SmtRoot {
        /// Leaves as `slotHex:hashHex`, repeated
        #[arg(required = true)]
        leaves: Vec<String>,
    },

    /// Verify an inclusion proof against a root
    SmtVerify {
        /// The checkpoint root (hex)
        #[arg(long)]
        root: String,

        /// The slot (decimal, as at the contract-API boundary)
        #[arg(long)]
        slot: String,

        /// The leaf value (hex)
        #[arg(long)]
        value: String,

        /// The proof (hex)
        #[arg(long)]
        proof: String,
    },

    /// Encode a child-chain transaction and print its hash
    EncodeTx {
        #[arg(long)]
        owner_pub_key: String,

        #[arg(long)]
        owner: String,

        /// Slot (hex)
        #[arg(long)]
        slot: String,

        #[arg(long)]
        balance: u64,

        /// Previous block height (0 for a deposit)
        #[arg(long, default_value = "0")]
        prev_block: u64,
    },

    /// Decode a transaction hex string and print it as JSON
    InspectTx {
        /// Canonical transaction bytes (hex)
        tx: String,
    },

    /// Derive a deterministic keypair from a seed string
    GenKey {
        /// Any seed text; the key is its SHA-256
        seed: String,
    },

    /// Sign a 32-byte digest and print both signature layouts
    Sign {
        /// Private key (hex)
        #[arg(long)]
        key: String,

        /// Digest to sign (hex)
        #[arg(long)]
        digest: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            amount,
            challenge_period,
            asset,
        } => simulate(amount, challenge_period, asset),

        Commands::SmtRoot { leaves } => smt_root(leaves),

        Commands::SmtVerify {
            root,
            slot,
            value,
            proof,
        } => smt_verify(root, slot, value, proof),

        Commands::EncodeTx {
            owner_pub_key,
            owner,
            slot,
            balance,
            prev_block,
        } => encode_tx(owner_pub_key, owner, slot, balance, prev_block),

        Commands::InspectTx { tx } => inspect_tx(tx),

        Commands::GenKey { seed } => gen_key(seed),

        Commands::Sign { key, digest } => sign(key, digest),
    }
}

/// One full pass over the protocol against an in-memory deployment.
fn simulate(amount: u64, challenge_period: u64, asset: u32) -> Result<()> {
    // Deterministic actor key: the simulation needs no randomness.
    let key = signing_key_from_hex(&Hash256::sha256(b"plasma.simulate.owner").to_hex())
        .context("deriving the owner key")?;
    let owner = address_from_public_key(key.verifying_key());
    let operator = owner.clone();

    let mut module = PlasmaModule::with_in_memory_assets(Address::new("plasma1"));
    let contract = module.contract_ref().clone();
    let mut now = 1u64;

    eprintln!("operator/owner: {owner}");

    // Configure and fund.
    let receipt = module.invoke(
        &CallContext::new(operator.clone(), 0, 0, now),
        &contract,
        "set_config",
        &format!("{owner},vmc1,smt1,{challenge_period}"),
    );
    anyhow::ensure!(receipt.exec_succeed, "set_config: {}", receipt.api_result);
    module.chain_mut().assets_mut().mint(&owner, asset, amount * 2);

    // Deposit.
    let receipt = module.invoke(
        &CallContext::new(owner.clone(), asset, amount, now),
        &contract,
        "on_deposit_asset",
        "",
    );
    anyhow::ensure!(receipt.exec_succeed, "deposit: {}", receipt.api_result);
    let coin_slot_hex = receipt.api_result.clone();
    let coin_slot = slot::from_hex(&coin_slot_hex)?;
    eprintln!("deposited {amount} into coin {coin_slot_hex}");

    let deposit_block = module.chain().current_block();

    // Build the deposit-exit material.
    let tx = ChildChainTx::new(
        public_key_hex(key.verifying_key()),
        owner.as_str(),
        coin_slot,
        amount,
        0,
    )
    .seal();
    let mut tree = SparseMerkleTree::new();
    tree.set(coin_slot, tx.hash);
    let proof_hex = tree.create_merkle_proof(coin_slot).to_hex();
    let signature = sign_recoverable(&key, &tx.signing_digest())?;
    let tx_hex = hex::encode(plasma_tx::encode(&tx));

    // Exit.
    let arg = format!(
        "{coin_slot_hex},0,{tx_hex},0,{proof_hex},{},{deposit_block},{deposit_block}",
        signature.to_consensus().to_hex(),
    );
    let receipt = module.invoke(
        &CallContext::new(owner.clone(), 0, 0, now),
        &contract,
        "startExit",
        &arg,
    );
    anyhow::ensure!(receipt.exec_succeed, "startExit: {}", receipt.api_result);
    eprintln!(
        "exit started: {}",
        module
            .invoke_offline(&contract, "getExit", &coin_slot_hex)
            .api_result
    );

    // Wait out the challenge window, then finalize and withdraw.
    now += challenge_period;
    let receipt = module.invoke(
        &CallContext::new(owner.clone(), 0, 0, now),
        &contract,
        "finalizeExit",
        &coin_slot_hex,
    );
    anyhow::ensure!(receipt.api_result == "true", "finalizeExit: {}", receipt.api_result);

    let receipt = module.invoke(
        &CallContext::new(owner.clone(), 0, 0, now),
        &contract,
        "withdraw",
        &coin_slot_hex,
    );
    anyhow::ensure!(receipt.exec_succeed, "withdraw: {}", receipt.api_result);
    eprintln!("withdrew {} back to {owner}", receipt.api_result);

    let summary = serde_json::json!({
        "slot": coin_slot_hex,
        "amount": amount,
        "ownerBalance": module.chain().assets().balance_of(&owner, asset),
        "exitAfterWithdraw": module
            .invoke_offline(&contract, "getExit", &coin_slot_hex)
            .api_result,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn smt_root(leaves: Vec<String>) -> Result<()> {
    let mut tree = SparseMerkleTree::new();
    for leaf in &leaves {
        let (slot_hex, hash_hex) = leaf
            .split_once(':')
            .with_context(|| format!("leaf `{leaf}` is not slotHex:hashHex"))?;
        let key = slot::from_hex(slot_hex)?;
        let value = Hash256::from_hex(hash_hex)?;
        tree.set(key, value);
    }
    println!("{}", tree.root().to_hex());
    Ok(())
}

fn smt_verify(root: String, slot_dec: String, value: String, proof: String) -> Result<()> {
    let root = Hash256::from_hex(&root).context("parsing root")?;
    let key = slot::from_dec_str(&slot_dec)?;
    let value = Hash256::from_hex(&value).context("parsing value")?;
    // A garbled proof is simply a negative answer.
    let ok = match hex::decode(proof.trim()) {
        Ok(bytes) => plasma_smt::verify(&root, key, &value, &bytes),
        Err(_) => false,
    };
    println!("{ok}");
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn encode_tx(
    owner_pub_key: String,
    owner: String,
    slot_hex: String,
    balance: u64,
    prev_block: u64,
) -> Result<()> {
    let tx = ChildChainTx::new(
        owner_pub_key,
        owner,
        slot::from_hex(&slot_hex)?,
        balance,
        prev_block,
    )
    .seal();
    eprintln!("hash: {}", tx.hash);
    println!("{}", hex::encode(plasma_tx::encode(&tx)));
    Ok(())
}

fn inspect_tx(tx_hex: String) -> Result<()> {
    let bytes = hex::decode(tx_hex.trim()).context("transaction is not valid hex")?;
    let tx = plasma_tx::decode(&bytes).context("transaction bytes are not canonical")?;
    println!("{}", serde_json::to_string_pretty(&tx)?);
    Ok(())
}

fn gen_key(seed: String) -> Result<()> {
    let key_bytes = Hash256::sha256(seed.as_bytes());
    let key = signing_key_from_hex(&key_bytes.to_hex())
        .context("seed hashes to an invalid scalar; pick another seed")?;
    let output = serde_json::json!({
        "privateKey": key_bytes.to_hex(),
        "publicKey": public_key_hex(key.verifying_key()),
        "address": address_from_public_key(key.verifying_key()).as_str(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn sign(key_hex: String, digest_hex: String) -> Result<()> {
    let key = signing_key_from_hex(&key_hex).context("parsing private key")?;
    let digest = Hash256::from_hex(&digest_hex).context("parsing digest")?;
    let signature = sign_recoverable(&key, &digest)?;
    let output = serde_json::json!({
        "eth": signature.to_hex(),
        "consensus": signature.to_consensus().to_hex(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
