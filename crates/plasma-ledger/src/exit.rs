//! The exit game
//!
//! A per-coin state machine: `Started` → (`Finalized` | `Challenged`) →
//! withdrawal, gated by the configured challenge period. Time is always an
//! explicit argument: expiry is evaluated lazily on `finalize_exit` and
//! `withdraw`, never by a timer.

use crate::assets::AssetLedger;
use crate::coin::CoinState;
use crate::error::{LedgerError, LedgerResult};
use crate::event::Event;
use crate::registry::RootChain;
use plasma_keys::{public_key_hex, recover_public_key, EthSignature};
use plasma_primitives::{slot, Address, Hash256, Slot};
use plasma_tx::{decode, deposit_tx_hash, ChildChainTx};
use serde::{Deserialize, Serialize};

/// Where an exit stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitState {
    /// Open and challengeable until `exitable_at`.
    Started,
    /// A counter-claim is pending; the exitor must respond.
    Challenged,
    /// The challenge window elapsed unchallenged; value awaits withdrawal.
    Finalized,
    /// Terminal: value returned to the owner.
    Withdrawn,
}

/// A pending counter-claim against an exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub challenger: Address,
    pub tx_hash: Hash256,
    pub block: u64,
}

/// The record created by `start_exit` and deleted by `withdraw`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitRecord {
    #[serde(with = "slot::serde_hex")]
    pub slot: Slot,
    pub owner: Address,
    /// Earliest time the exit may finalize.
    pub exitable_at: u64,
    pub state: ExitState,
    /// Checkpoint height of the exiting transaction.
    pub exit_block: u64,
    /// Checkpoint height of the prior transaction in the coin's history.
    pub prev_block: u64,
    pub challenge: Option<Challenge>,
}

/// Everything `start_exit` needs to validate a claim.
pub struct StartExitParams<'a> {
    pub slot: Slot,
    /// Hash of the prior transaction; absent for a deposit exit.
    pub prev_tx_hash: Option<Hash256>,
    /// Canonical bytes of the exiting transaction.
    pub tx_bytes: &'a [u8],
    /// Inclusion proof of the prior transaction; absent for a deposit exit.
    pub prev_proof: Option<&'a [u8]>,
    /// Inclusion proof of the exiting transaction at `exit_block`.
    pub proof: &'a [u8],
    /// Owner signature over the exiting transaction's signing digest.
    pub signature: EthSignature,
    pub exit_block: u64,
    pub prev_block: u64,
}

impl<A: AssetLedger> RootChain<A> {
    /// Open an exit for a coin.
    ///
    /// Validates the presented transaction's inclusion proof against the
    /// checkpoint at `exit_block` (and, unless this is a deposit exit, the
    /// prior transaction's proof at `prev_block`), checks the signature
    /// recovers to the transaction owner, and only then creates the
    /// record; nothing is written on any failure.
    pub fn start_exit(
        &mut self,
        caller: &Address,
        params: &StartExitParams<'_>,
        now: u64,
    ) -> LedgerResult<Vec<Event>> {
        let challenge_period = self.require_config()?.challenge_period;
        let slot_hex = slot::to_hex(params.slot);

        if self.exits.contains_key(&params.slot) {
            return Err(LedgerError::ExitExists(slot_hex));
        }
        let coin = self
            .coins
            .get(&params.slot)
            .ok_or_else(|| LedgerError::UnknownCoin(slot_hex.clone()))?;
        if coin.state != CoinState::Deposited {
            return Err(LedgerError::CoinNotExitable(slot_hex));
        }

        let tx = decode(params.tx_bytes)?;
        self.validate_exit_tx(&tx, params)?;
        verify_owner_signature(&tx, &params.signature)?;
        if caller.as_str() != tx.owner {
            return Err(LedgerError::NotExitOwner {
                slot: slot_hex,
                caller: caller.clone(),
            });
        }

        let record = ExitRecord {
            slot: params.slot,
            owner: caller.clone(),
            exitable_at: now + challenge_period,
            state: ExitState::Started,
            exit_block: params.exit_block,
            prev_block: params.prev_block,
            challenge: None,
        };
        tracing::info!(
            slot = %slot::to_hex(params.slot),
            exit_block = params.exit_block,
            exitable_at = record.exitable_at,
            "exit started"
        );
        let events = vec![Event::new(
            "StartedExit",
            serde_json::json!({
                "slot": slot::to_hex(params.slot),
                "owner": caller.as_str(),
                "exitBlock": params.exit_block,
                "exitableAt": record.exitable_at,
            }),
        )];

        self.exits.insert(params.slot, record);
        if let Some(coin) = self.coins.get_mut(&params.slot) {
            coin.state = CoinState::Exiting;
        }
        Ok(events)
    }

    pub fn get_exit(&self, target: Slot) -> Option<&ExitRecord> {
        self.exits.get(&target)
    }

    /// Present evidence that the exiting owner spent the coin after the
    /// checkpoint their exit cites.
    pub fn challenge_exit(
        &mut self,
        challenger: &Address,
        target: Slot,
        tx_bytes: &[u8],
        proof: &[u8],
        challenge_block: u64,
        signature: &EthSignature,
    ) -> LedgerResult<Vec<Event>> {
        let slot_hex = slot::to_hex(target);
        let exit = self
            .exits
            .get(&target)
            .ok_or_else(|| LedgerError::UnknownExit(slot_hex.clone()))?;
        match exit.state {
            ExitState::Started => {}
            ExitState::Challenged => return Err(LedgerError::ChallengeExists(slot_hex)),
            _ => {
                return Err(LedgerError::InvalidChallenge(
                    "exit is no longer challengeable".to_string(),
                ))
            }
        }
        if challenge_block <= exit.exit_block {
            return Err(LedgerError::InvalidChallenge(format!(
                "evidence at height {challenge_block} does not postdate the exit at height {}",
                exit.exit_block
            )));
        }

        let tx = decode(tx_bytes)?;
        self.validate_evidence(&tx, target, challenge_block, proof)?;
        verify_owner_signature(&tx, signature)?;

        let challenge = Challenge {
            challenger: challenger.clone(),
            tx_hash: tx.hash,
            block: challenge_block,
        };
        tracing::info!(
            slot = %slot::to_hex(target),
            challenger = %challenger,
            challenge_block,
            "exit challenged"
        );
        let events = vec![Event::new(
            "ChallengedExit",
            serde_json::json!({
                "slot": slot::to_hex(target),
                "challenger": challenger.as_str(),
                "challengeBlock": challenge_block,
            }),
        )];

        if let Some(exit) = self.exits.get_mut(&target) {
            exit.state = ExitState::Challenged;
            exit.challenge = Some(challenge);
        }
        Ok(events)
    }

    /// Answer a pending challenge with a still-later transaction that
    /// returns the coin to the exitor.
    pub fn respond_challenge(
        &mut self,
        target: Slot,
        tx_bytes: &[u8],
        proof: &[u8],
        response_block: u64,
        signature: &EthSignature,
    ) -> LedgerResult<Vec<Event>> {
        let slot_hex = slot::to_hex(target);
        let exit = self
            .exits
            .get(&target)
            .ok_or_else(|| LedgerError::UnknownExit(slot_hex.clone()))?;
        let challenge = match (&exit.state, &exit.challenge) {
            (ExitState::Challenged, Some(challenge)) => challenge.clone(),
            _ => return Err(LedgerError::NoChallenge(slot_hex)),
        };
        if response_block <= challenge.block {
            return Err(LedgerError::InvalidChallenge(format!(
                "response at height {response_block} does not postdate the challenge at height {}",
                challenge.block
            )));
        }
        let exit_owner = exit.owner.clone();

        let tx = decode(tx_bytes)?;
        self.validate_evidence(&tx, target, response_block, proof)?;
        verify_owner_signature(&tx, signature)?;
        if tx.owner != exit_owner.as_str() {
            return Err(LedgerError::InvalidChallenge(
                "response does not return the coin to the exitor".to_string(),
            ));
        }

        tracing::info!(slot = %slot::to_hex(target), response_block, "challenge answered");
        let events = vec![Event::new(
            "RespondedChallenge",
            serde_json::json!({
                "slot": slot::to_hex(target),
                "responseBlock": response_block,
            }),
        )];

        if let Some(exit) = self.exits.get_mut(&target) {
            exit.state = ExitState::Started;
            exit.challenge = None;
        }
        Ok(events)
    }

    /// Close the challenge window.
    ///
    /// Before `exitable_at` this is a policy error. At or after it, an
    /// unchallenged exit finalizes (`true`); re-finalizing is a no-op
    /// (`true`); an exit with an unresolved challenge is cancelled and the
    /// coin returns to the child chain (`false`).
    pub fn finalize_exit(&mut self, target: Slot, now: u64) -> LedgerResult<(bool, Vec<Event>)> {
        let slot_hex = slot::to_hex(target);
        let exit = self
            .exits
            .get(&target)
            .ok_or_else(|| LedgerError::UnknownExit(slot_hex.clone()))?;

        if exit.state == ExitState::Finalized {
            return Ok((true, Vec::new()));
        }
        if now < exit.exitable_at {
            return Err(LedgerError::ExitNotMature {
                slot: slot_hex,
                exitable_at: exit.exitable_at,
                now,
            });
        }

        match exit.state {
            ExitState::Started => {
                if let Some(exit) = self.exits.get_mut(&target) {
                    exit.state = ExitState::Finalized;
                }
                if let Some(coin) = self.coins.get_mut(&target) {
                    coin.state = CoinState::Exited;
                }
                tracing::info!(slot = %slot::to_hex(target), "exit finalized");
                let events = vec![Event::new(
                    "FinalizedExit",
                    serde_json::json!({ "slot": slot::to_hex(target) }),
                )];
                Ok((true, events))
            }
            ExitState::Challenged => {
                // The exitor never answered: the exit fails and the coin
                // stays live on the child chain.
                let challenge = self.exits.remove(&target).and_then(|e| e.challenge);
                if let Some(coin) = self.coins.get_mut(&target) {
                    coin.state = CoinState::Deposited;
                }
                tracing::info!(slot = %slot::to_hex(target), "exit cancelled by unanswered challenge");
                let events = vec![Event::new(
                    "CancelledExit",
                    serde_json::json!({
                        "slot": slot::to_hex(target),
                        "challenger": challenge.map(|c| c.challenger.as_str().to_string()),
                    }),
                )];
                Ok((false, events))
            }
            // Withdrawn records are deleted, Finalized handled above.
            _ => Err(LedgerError::UnknownExit(slot_hex)),
        }
    }

    /// Pay a finalized exit back to its owner and retire the coin.
    ///
    /// Deletes the exit record: a later `get_exit` for the slot is absent.
    pub fn withdraw(&mut self, caller: &Address, target: Slot) -> LedgerResult<(u64, Vec<Event>)> {
        let slot_hex = slot::to_hex(target);
        let exit = self
            .exits
            .get(&target)
            .ok_or_else(|| LedgerError::UnknownExit(slot_hex.clone()))?;
        if exit.state != ExitState::Finalized {
            return Err(LedgerError::ExitNotFinalized(slot_hex));
        }
        if exit.owner != *caller {
            return Err(LedgerError::NotExitOwner {
                slot: slot_hex,
                caller: caller.clone(),
            });
        }
        let owner = exit.owner.clone();

        let (amount, asset) = {
            let coin = self
                .coins
                .get(&target)
                .ok_or_else(|| LedgerError::UnknownCoin(slot::to_hex(target)))?;
            (coin.balance, coin.asset)
        };

        let custody = self.address.clone();
        self.assets.transfer(&custody, &owner, asset, amount)?;

        self.exits.remove(&target);
        if let Some(coin) = self.coins.get_mut(&target) {
            coin.balance = 0;
            coin.state = CoinState::Withdrawn;
        }

        tracing::info!(slot = %slot::to_hex(target), amount, "withdrawn");
        let events = vec![Event::new(
            "Withdrew",
            serde_json::json!({
                "slot": slot::to_hex(target),
                "owner": owner.as_str(),
                "amount": amount,
            }),
        )];
        Ok((amount, events))
    }

    /// Shared validation of the exiting transaction and its history claim.
    fn validate_exit_tx(
        &self,
        tx: &ChildChainTx,
        params: &StartExitParams<'_>,
    ) -> LedgerResult<()> {
        if tx.slot != params.slot {
            return Err(LedgerError::InvalidTransaction(
                "transaction is for a different slot".to_string(),
            ));
        }
        if tx.hash != tx.compute_hash() {
            return Err(LedgerError::InvalidTransaction(
                "transaction hash does not match its content".to_string(),
            ));
        }

        let block = self
            .blocks
            .get(&params.exit_block)
            .ok_or(LedgerError::UnknownBlock(params.exit_block))?;
        if !plasma_smt::verify(&block.root, params.slot, &tx.hash, params.proof) {
            return Err(LedgerError::InvalidProof(format!(
                "exiting transaction is not in the checkpoint at height {}",
                params.exit_block
            )));
        }

        if params.exit_block == params.prev_block {
            // A deposit exit: the presented transaction must be the coin's
            // self-identifying deposit entry.
            if !tx.is_deposit() || tx.hash != deposit_tx_hash(params.slot) {
                return Err(LedgerError::InvalidTransaction(
                    "deposit exit requires the coin's deposit transaction".to_string(),
                ));
            }
        } else {
            if tx.prev_block != params.prev_block {
                return Err(LedgerError::InvalidTransaction(format!(
                    "transaction spends height {} but the exit claims height {}",
                    tx.prev_block, params.prev_block
                )));
            }
            let prev_hash = params.prev_tx_hash.ok_or_else(|| {
                LedgerError::BadArgument("previous transaction hash required".to_string())
            })?;
            let prev_proof = params
                .prev_proof
                .ok_or_else(|| LedgerError::BadArgument("previous proof required".to_string()))?;
            let prev_block = self
                .blocks
                .get(&params.prev_block)
                .ok_or(LedgerError::UnknownBlock(params.prev_block))?;
            if !plasma_smt::verify(&prev_block.root, params.slot, &prev_hash, prev_proof) {
                return Err(LedgerError::InvalidProof(format!(
                    "previous transaction is not in the checkpoint at height {}",
                    params.prev_block
                )));
            }
        }
        Ok(())
    }

    /// Shared validation of challenge/response evidence: a well-formed
    /// transaction for the slot, included in the checkpoint at `height`.
    fn validate_evidence(
        &self,
        tx: &ChildChainTx,
        target: Slot,
        height: u64,
        proof: &[u8],
    ) -> LedgerResult<()> {
        if tx.slot != target {
            return Err(LedgerError::InvalidTransaction(
                "evidence is for a different slot".to_string(),
            ));
        }
        if tx.hash != tx.compute_hash() {
            return Err(LedgerError::InvalidTransaction(
                "evidence hash does not match its content".to_string(),
            ));
        }
        let block = self
            .blocks
            .get(&height)
            .ok_or(LedgerError::UnknownBlock(height))?;
        if !plasma_smt::verify(&block.root, target, &tx.hash, proof) {
            return Err(LedgerError::InvalidProof(format!(
                "evidence is not in the checkpoint at height {height}"
            )));
        }
        Ok(())
    }
}

/// The signature must recover to the transaction's own owner key.
fn verify_owner_signature(tx: &ChildChainTx, signature: &EthSignature) -> LedgerResult<()> {
    let digest = tx.signing_digest();
    let recovered = recover_public_key(&digest, signature)
        .map_err(|e| LedgerError::InvalidSignature(e.to_string()))?;
    if public_key_hex(&recovered) != tx.owner_pub_key {
        return Err(LedgerError::InvalidSignature(
            "signature does not recover to the transaction owner".to_string(),
        ));
    }
    Ok(())
}
