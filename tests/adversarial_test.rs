//! Adversarial tests for the exit-challenge protocol
//!
//! These verify that the ledger rejects dishonest material at every gate:
//! corrupted proofs, foreign signatures, replayed operations, and calls
//! ahead of policy. A failure here is a safety bug, since the whole point
//! of the protocol is that owners need not trust the operator.

use plasma_keys::{
    address_from_public_key, public_key_hex, sign_recoverable, signing_key_from_hex,
    ConsensusSignature, EthSignature,
};
use plasma_ledger::{
    AssetLedger, Config, ContractRef, InMemoryAssetLedger, LedgerError, RootChain,
    StartExitParams,
};
use plasma_primitives::{Address, Hash256, Slot};
use plasma_smt::SparseMerkleTree;
use plasma_tx::ChildChainTx;

const CHALLENGE_PERIOD: u64 = 1000;

fn owner_key() -> k256::ecdsa::SigningKey {
    signing_key_from_hex("4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318")
        .unwrap()
}

fn attacker_key() -> k256::ecdsa::SigningKey {
    signing_key_from_hex("7c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318")
        .unwrap()
}

fn deployed_chain(owner: &Address) -> RootChain<InMemoryAssetLedger> {
    let mut chain = RootChain::new(Address::new("plasma1"), InMemoryAssetLedger::new());
    chain
        .set_config(
            owner,
            Config {
                operator: owner.clone(),
                validator_manager: ContractRef::new("vmc1"),
                merkle_tree_service: ContractRef::new("smt1"),
                challenge_period: CHALLENGE_PERIOD,
            },
        )
        .unwrap();
    chain.assets_mut().mint(owner, 0, 100_000);
    chain
}

struct ExitMaterial {
    coin_slot: Slot,
    tx_bytes: Vec<u8>,
    proof: Vec<u8>,
    signature: EthSignature,
    block: u64,
}

fn deposit_with_exit_material(
    chain: &mut RootChain<InMemoryAssetLedger>,
    key: &k256::ecdsa::SigningKey,
    owner: &Address,
    amount: u64,
) -> ExitMaterial {
    let (coin_slot, _) = chain.on_deposit_asset(owner, 0, amount).unwrap();
    let block = chain.current_block();

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
    let proof = tree.create_merkle_proof(coin_slot).to_bytes();
    let signature = sign_recoverable(key, &tx.signing_digest()).unwrap();

    ExitMaterial {
        coin_slot,
        tx_bytes: plasma_tx::encode(&tx),
        proof,
        signature,
        block,
    }
}

fn exit_params(m: &ExitMaterial) -> StartExitParams<'_> {
    StartExitParams {
        slot: m.coin_slot,
        prev_tx_hash: None,
        tx_bytes: &m.tx_bytes,
        prev_proof: None,
        proof: &m.proof,
        signature: m.signature,
        exit_block: m.block,
        prev_block: m.block,
    }
}

#[test]
fn test_corrupted_proof_rejected_at_every_byte() {
    let key = owner_key();
    let owner = address_from_public_key(key.verifying_key());
    let mut chain = deployed_chain(&owner);
    let m = deposit_with_exit_material(&mut chain, &key, &owner, 10_000);

    for i in 0..m.proof.len() {
        let mut garbled = m.proof.clone();
        garbled[i] ^= 0x01;
        let params = StartExitParams {
            proof: &garbled,
            ..exit_params(&m)
        };
        assert!(
            matches!(
                chain.start_exit(&owner, &params, 0),
                Err(LedgerError::InvalidProof(_))
            ),
            "corrupted proof byte {i} was accepted"
        );
    }
    // Nothing was written by any failed attempt.
    assert!(chain.get_exit(m.coin_slot).is_none());
}

#[test]
fn test_signature_from_another_key_rejected() {
    let key = owner_key();
    let owner = address_from_public_key(key.verifying_key());
    let mut chain = deployed_chain(&owner);
    let m = deposit_with_exit_material(&mut chain, &key, &owner, 10_000);

    let tx = plasma_tx::decode(&m.tx_bytes).unwrap();
    let forged = sign_recoverable(&attacker_key(), &tx.signing_digest()).unwrap();
    let params = StartExitParams {
        signature: forged,
        ..exit_params(&m)
    };
    assert!(matches!(
        chain.start_exit(&owner, &params, 0),
        Err(LedgerError::InvalidSignature(_))
    ));
}

#[test]
fn test_tampered_transaction_rejected() {
    let key = owner_key();
    let owner = address_from_public_key(key.verifying_key());
    let mut chain = deployed_chain(&owner);
    let m = deposit_with_exit_material(&mut chain, &key, &owner, 10_000);

    // Re-encode the transaction with an inflated balance but the original
    // sealed hash: the content no longer matches the hash.
    let mut tx = plasma_tx::decode(&m.tx_bytes).unwrap();
    tx.balance = 99_999;
    tx.prev_block = 5;
    let tampered = plasma_tx::encode(&tx);

    let params = StartExitParams {
        tx_bytes: &tampered,
        ..exit_params(&m)
    };
    assert!(matches!(
        chain.start_exit(&owner, &params, 0),
        Err(LedgerError::InvalidTransaction(_))
    ));
}

#[test]
fn test_exit_for_foreign_slot_rejected() {
    let key = owner_key();
    let owner = address_from_public_key(key.verifying_key());
    let mut chain = deployed_chain(&owner);
    let m = deposit_with_exit_material(&mut chain, &key, &owner, 10_000);
    let other = deposit_with_exit_material(&mut chain, &key, &owner, 10_000);

    // Present coin A's transaction against coin B's slot.
    let params = StartExitParams {
        slot: other.coin_slot,
        exit_block: other.block,
        prev_block: other.block,
        ..exit_params(&m)
    };
    assert!(matches!(
        chain.start_exit(&owner, &params, 0),
        Err(LedgerError::InvalidTransaction(_))
    ));
}

#[test]
fn test_exit_against_missing_checkpoint_rejected() {
    let key = owner_key();
    let owner = address_from_public_key(key.verifying_key());
    let mut chain = deployed_chain(&owner);
    let m = deposit_with_exit_material(&mut chain, &key, &owner, 10_000);

    let params = StartExitParams {
        exit_block: 555,
        prev_block: 555,
        ..exit_params(&m)
    };
    assert!(matches!(
        chain.start_exit(&owner, &params, 0),
        Err(LedgerError::UnknownBlock(555))
    ));
}

#[test]
fn test_challenge_with_unsigned_evidence_rejected() {
    let key = owner_key();
    let owner = address_from_public_key(key.verifying_key());
    let mut chain = deployed_chain(&owner);
    let m = deposit_with_exit_material(&mut chain, &key, &owner, 10_000);
    chain.start_exit(&owner, &exit_params(&m), 0).unwrap();

    // A watcher fabricates a spend and signs it with their own key.
    let spend = ChildChainTx::new(
        public_key_hex(key.verifying_key()),
        owner.as_str(),
        m.coin_slot,
        10_000,
        m.block,
    )
    .seal();
    let mut tree = SparseMerkleTree::new();
    let root = tree.set(m.coin_slot, spend.hash);
    let proof = tree.create_merkle_proof(m.coin_slot).to_bytes();
    chain.submit_block(&owner, root, 1000).unwrap();

    let watcher = Address::new("watcher");
    let forged = sign_recoverable(&attacker_key(), &spend.signing_digest()).unwrap();
    assert!(matches!(
        chain.challenge_exit(
            &watcher,
            m.coin_slot,
            &plasma_tx::encode(&spend),
            &proof,
            1000,
            &forged,
        ),
        Err(LedgerError::InvalidSignature(_))
    ));
    // The honest signature lands.
    let honest = sign_recoverable(&key, &spend.signing_digest()).unwrap();
    chain
        .challenge_exit(
            &watcher,
            m.coin_slot,
            &plasma_tx::encode(&spend),
            &proof,
            1000,
            &honest,
        )
        .unwrap();
}

#[test]
fn test_non_canonical_tx_bytes_are_a_hard_decode_error() {
    let key = owner_key();
    let owner = address_from_public_key(key.verifying_key());
    let mut chain = deployed_chain(&owner);
    let m = deposit_with_exit_material(&mut chain, &key, &owner, 10_000);

    let mut truncated = m.tx_bytes.clone();
    truncated.pop();
    let params = StartExitParams {
        tx_bytes: &truncated,
        ..exit_params(&m)
    };
    assert!(matches!(
        chain.start_exit(&owner, &params, 0),
        Err(LedgerError::Codec(_))
    ));
}

#[test]
fn test_consensus_signature_header_checked() {
    assert!(ConsensusSignature::from_bytes(&[0u8; 65]).is_err());
    let mut sig = [0u8; 65];
    sig[0] = 32; // header 31 + recovery id 1
    assert!(ConsensusSignature::from_bytes(&sig).is_ok());
}

#[test]
fn test_withdraw_cannot_be_replayed() {
    let key = owner_key();
    let owner = address_from_public_key(key.verifying_key());
    let mut chain = deployed_chain(&owner);
    let m = deposit_with_exit_material(&mut chain, &key, &owner, 10_000);

    chain.start_exit(&owner, &exit_params(&m), 0).unwrap();
    chain.finalize_exit(m.coin_slot, CHALLENGE_PERIOD).unwrap();
    chain.withdraw(&owner, m.coin_slot).unwrap();
    let drained = chain.assets().balance_of(&owner, 0);

    // Replaying any stage of the finished exit moves no more value.
    assert!(chain.withdraw(&owner, m.coin_slot).is_err());
    assert!(chain.finalize_exit(m.coin_slot, CHALLENGE_PERIOD).is_err());
    assert!(chain.start_exit(&owner, &exit_params(&m), 0).is_err());
    assert_eq!(chain.assets().balance_of(&owner, 0), drained);
}

#[test]
fn test_value_is_conserved_across_the_lifecycle() {
    let key = owner_key();
    let owner = address_from_public_key(key.verifying_key());
    let mut chain = deployed_chain(&owner);
    let custody = chain.address().clone();
    let total = chain.assets().balance_of(&owner, 0);

    let m = deposit_with_exit_material(&mut chain, &key, &owner, 50_000);
    assert_eq!(
        chain.assets().balance_of(&owner, 0) + chain.assets().balance_of(&custody, 0),
        total
    );

    chain.start_exit(&owner, &exit_params(&m), 0).unwrap();
    chain.finalize_exit(m.coin_slot, CHALLENGE_PERIOD).unwrap();
    chain.withdraw(&owner, m.coin_slot).unwrap();

    assert_eq!(chain.assets().balance_of(&owner, 0), total);
    assert_eq!(chain.assets().balance_of(&custody, 0), 0);
}

#[test]
fn test_balance_never_exceeds_denomination() {
    let key = owner_key();
    let owner = address_from_public_key(key.verifying_key());
    let mut chain = deployed_chain(&owner);

    let (coin_slot, _) = chain.on_deposit_asset(&owner, 0, 10_000).unwrap();
    let coin = chain.get_coin(coin_slot).unwrap();
    assert!(coin.balance <= coin.denomination);

    let (empty_slot, _) = chain.create_empty_coin(&owner).unwrap();
    chain.provide_liquidity(empty_slot, 500).unwrap();
    let coin = chain.get_coin(empty_slot).unwrap();
    assert!(coin.balance <= coin.denomination);
}

#[test]
fn test_unrelated_proof_against_same_root_is_false() {
    let mut tree = SparseMerkleTree::new();
    let a = Slot::from(1u64);
    let b = Slot::from(2u64);
    tree.set(a, Hash256::sha256(b"a"));
    let root = tree.set(b, Hash256::sha256(b"b"));

    // Coin A's proof cannot vouch for coin B's leaf.
    let proof_a = tree.create_merkle_proof(a).to_bytes();
    assert!(!plasma_smt::verify(&root, b, &Hash256::sha256(b"b"), &proof_a));
    assert!(plasma_smt::verify(&root, a, &Hash256::sha256(b"a"), &proof_a));
}
