//! The string-argument contract-API surface
//!
//! `PlasmaModule` adapts the typed ledger to the chain's dispatch
//! convention: API names, comma-joined string arguments, hex transport for
//! every binary payload, and JSON for structured results. Failed
//! executions come back as receipts, never panics.

use crate::assets::{AssetLedger, InMemoryAssetLedger};
use crate::config::{Config, ContractRef};
use crate::error::{LedgerError, LedgerResult};
use crate::event::Event;
use crate::exit::StartExitParams;
use crate::invoke::{CallContext, ContractInvoker, InvokeReceipt};
use crate::registry::RootChain;
use plasma_keys::ConsensusSignature;
use plasma_primitives::{slot, Address, Hash256, Slot};

/// The deployed plasma root-chain contract.
pub struct PlasmaModule<A = InMemoryAssetLedger> {
    contract: ContractRef,
    chain: RootChain<A>,
}

impl PlasmaModule<InMemoryAssetLedger> {
    /// A module backed by a fresh in-memory asset ledger (tests, CLI).
    pub fn with_in_memory_assets(address: Address) -> Self {
        Self::new(address, InMemoryAssetLedger::new())
    }
}

impl<A: AssetLedger> PlasmaModule<A> {
    pub fn new(address: Address, assets: A) -> Self {
        Self {
            contract: ContractRef::new(address.as_str()),
            chain: RootChain::new(address, assets),
        }
    }

    /// The reference invocations must address.
    pub fn contract_ref(&self) -> &ContractRef {
        &self.contract
    }

    pub fn chain(&self) -> &RootChain<A> {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut RootChain<A> {
        &mut self.chain
    }

    fn dispatch_mut(
        &mut self,
        ctx: &CallContext,
        api: &str,
        arg: &str,
    ) -> LedgerResult<(String, Vec<Event>)> {
        match api {
            "on_deposit_asset" => {
                let (new_slot, events) =
                    self.chain
                        .on_deposit_asset(&ctx.caller, ctx.asset, ctx.value)?;
                Ok((slot::to_hex(new_slot), events))
            }
            "create_empty_coin" => {
                let (new_slot, events) = self.chain.create_empty_coin(&ctx.caller)?;
                Ok((slot::to_hex(new_slot), events))
            }
            "provide_liquidity" => {
                let args = split_args(arg, 2, api)?;
                let target = parse_slot(&args[0])?;
                let amount = parse_u64(&args[1], "amount")?;
                let events = self.chain.provide_liquidity(target, amount)?;
                Ok((String::new(), events))
            }
            "submit_block" => {
                let args = split_args(arg, 1, api)?;
                let root = parse_hash(&args[0], "root")?;
                let height = self.chain.next_checkpoint_height();
                let events = self.chain.submit_block(&ctx.caller, root, height)?;
                Ok((height.to_string(), events))
            }
            "set_config" => {
                let args = split_args(arg, 4, api)?;
                let config = Config {
                    operator: Address::new(args[0].clone()),
                    validator_manager: ContractRef::new(args[1].clone()),
                    merkle_tree_service: ContractRef::new(args[2].clone()),
                    challenge_period: parse_u64(&args[3], "challengePeriod")?,
                };
                let events = self.chain.set_config(&ctx.caller, config)?;
                Ok((String::new(), events))
            }
            "startExit" => {
                let args = split_args(arg, 8, api)?;
                let target = parse_slot(&args[0])?;
                let prev_tx_hash = parse_optional_hash(&args[1], "prevTxHash")?;
                let tx_bytes = parse_hex_bytes(&args[2], "tx")?;
                let prev_proof = parse_optional_hex_bytes(&args[3], "prevProof")?;
                let proof = parse_hex_bytes(&args[4], "proof")?;
                let signature = parse_signature(&args[5])?;
                let exit_block = parse_u64(&args[6], "blockNum")?;
                let prev_block = parse_u64(&args[7], "prevBlockNum")?;

                let params = StartExitParams {
                    slot: target,
                    prev_tx_hash,
                    tx_bytes: &tx_bytes,
                    prev_proof: prev_proof.as_deref(),
                    proof: &proof,
                    signature,
                    exit_block,
                    prev_block,
                };
                let events = self.chain.start_exit(&ctx.caller, &params, ctx.now)?;
                Ok(("true".to_string(), events))
            }
            "challengeExit" => {
                let args = split_args(arg, 5, api)?;
                let target = parse_slot(&args[0])?;
                let tx_bytes = parse_hex_bytes(&args[1], "tx")?;
                let proof = parse_hex_bytes(&args[2], "proof")?;
                let signature = parse_signature(&args[3])?;
                let challenge_block = parse_u64(&args[4], "blockNum")?;
                let events = self.chain.challenge_exit(
                    &ctx.caller,
                    target,
                    &tx_bytes,
                    &proof,
                    challenge_block,
                    &signature,
                )?;
                Ok(("true".to_string(), events))
            }
            "respondChallenge" => {
                let args = split_args(arg, 5, api)?;
                let target = parse_slot(&args[0])?;
                let tx_bytes = parse_hex_bytes(&args[1], "tx")?;
                let proof = parse_hex_bytes(&args[2], "proof")?;
                let signature = parse_signature(&args[3])?;
                let response_block = parse_u64(&args[4], "blockNum")?;
                let events = self.chain.respond_challenge(
                    target,
                    &tx_bytes,
                    &proof,
                    response_block,
                    &signature,
                )?;
                Ok(("true".to_string(), events))
            }
            "finalizeExit" => {
                let args = split_args(arg, 1, api)?;
                let target = parse_slot(&args[0])?;
                let (finalized, events) = self.chain.finalize_exit(target, ctx.now)?;
                Ok((finalized.to_string(), events))
            }
            "withdraw" => {
                let args = split_args(arg, 1, api)?;
                let target = parse_slot(&args[0])?;
                let (amount, events) = self.chain.withdraw(&ctx.caller, target)?;
                Ok((amount.to_string(), events))
            }
            // Read APIs stay callable inside a transaction too.
            _ => self.dispatch_read(api, arg).map(|result| (result, Vec::new())),
        }
    }

    fn dispatch_read(&self, api: &str, arg: &str) -> LedgerResult<String> {
        match api {
            "get_config" => match self.chain.config() {
                Some(config) => {
                    let mut value = serde_json::to_value(config)
                        .map_err(|e| LedgerError::Serialization(e.to_string()))?;
                    value["currentBlockNum"] =
                        serde_json::Value::from(self.chain.current_block());
                    Ok(value.to_string())
                }
                None => Ok("null".to_string()),
            },
            "getExit" => {
                let args = split_args(arg, 1, api)?;
                let target = parse_slot(&args[0])?;
                to_json_or_null(self.chain.get_exit(target))
            }
            "get_plasma_coin" => {
                let args = split_args(arg, 1, api)?;
                let target = parse_slot(&args[0])?;
                to_json_or_null(self.chain.get_coin(target))
            }
            "getChildBlockByHeight" => {
                let args = split_args(arg, 1, api)?;
                let height = parse_u64(&args[0], "height")?;
                to_json_or_null(self.chain.get_child_block_by_height(height))
            }
            "checkMembership" => {
                let args = split_args(arg, 4, api)?;
                let tx_hash = parse_hash(&args[0], "txHash")?;
                let root = parse_hash(&args[1], "root")?;
                // The slot rides as a decimal string in this API.
                let target = slot::from_dec_str(&args[2])
                    .map_err(|e| LedgerError::BadArgument(e.to_string()))?;
                // A garbled proof is a negative answer, not an error.
                let result = match hex::decode(args[3].trim()) {
                    Ok(proof) => self.chain.check_membership(&tx_hash, &root, target, &proof),
                    Err(_) => false,
                };
                Ok(result.to_string())
            }
            _ => Err(LedgerError::UnknownApi(api.to_string())),
        }
    }

    fn check_contract(&self, contract: &ContractRef) -> LedgerResult<()> {
        if *contract != self.contract {
            return Err(LedgerError::UnknownContract(contract.to_string()));
        }
        Ok(())
    }
}

impl<A: AssetLedger> ContractInvoker for PlasmaModule<A> {
    fn invoke(
        &mut self,
        ctx: &CallContext,
        contract: &ContractRef,
        api: &str,
        arg: &str,
    ) -> InvokeReceipt {
        if let Err(err) = self.check_contract(contract) {
            return InvokeReceipt::fail(&err);
        }
        match self.dispatch_mut(ctx, api, arg) {
            Ok((api_result, events)) => InvokeReceipt::ok(api_result, events),
            Err(err) => {
                tracing::warn!(api, %err, "invocation failed");
                InvokeReceipt::fail(&err)
            }
        }
    }

    fn invoke_offline(&self, contract: &ContractRef, api: &str, arg: &str) -> InvokeReceipt {
        if let Err(err) = self.check_contract(contract) {
            return InvokeReceipt::fail(&err);
        }
        match self.dispatch_read(api, arg) {
            Ok(api_result) => InvokeReceipt::ok(api_result, Vec::new()),
            Err(err) => InvokeReceipt::fail(&err),
        }
    }
}

fn split_args(arg: &str, expect: usize, api: &str) -> LedgerResult<Vec<String>> {
    let parts: Vec<String> = arg.split(',').map(|p| p.trim().to_string()).collect();
    if parts.len() != expect {
        return Err(LedgerError::BadArgument(format!(
            "{api} expects {expect} arguments, got {}",
            parts.len()
        )));
    }
    Ok(parts)
}

fn parse_slot(s: &str) -> LedgerResult<Slot> {
    slot::from_hex(s).map_err(|e| LedgerError::BadArgument(e.to_string()))
}

fn parse_u64(s: &str, what: &str) -> LedgerResult<u64> {
    s.parse()
        .map_err(|_| LedgerError::BadArgument(format!("{what} is not an integer: {s}")))
}

fn parse_hash(s: &str, what: &str) -> LedgerResult<Hash256> {
    Hash256::from_hex(s).map_err(|e| LedgerError::BadArgument(format!("{what}: {e}")))
}

fn parse_hex_bytes(s: &str, what: &str) -> LedgerResult<Vec<u8>> {
    hex::decode(s.trim()).map_err(|e| LedgerError::BadArgument(format!("{what}: {e}")))
}

/// `"0"` (or empty) marks an absent optional argument.
fn parse_optional_hash(s: &str, what: &str) -> LedgerResult<Option<Hash256>> {
    if s.is_empty() || s == "0" {
        return Ok(None);
    }
    parse_hash(s, what).map(Some)
}

fn parse_optional_hex_bytes(s: &str, what: &str) -> LedgerResult<Option<Vec<u8>>> {
    if s.is_empty() || s == "0" {
        return Ok(None);
    }
    parse_hex_bytes(s, what).map(Some)
}

/// Signatures arrive in the chain's consensus layout.
fn parse_signature(s: &str) -> LedgerResult<plasma_keys::EthSignature> {
    ConsensusSignature::from_hex(s)
        .map(|sig| sig.to_eth())
        .map_err(|e| LedgerError::InvalidSignature(e.to_string()))
}

fn to_json_or_null<T: serde::Serialize>(value: Option<&T>) -> LedgerResult<String> {
    match value {
        Some(v) => serde_json::to_value(v)
            .map(|v| v.to_string())
            .map_err(|e| LedgerError::Serialization(e.to_string())),
        None => Ok("null".to_string()),
    }
}
