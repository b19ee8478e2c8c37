//! Response shapes returned by the typed wrappers.
//!
//! Every shape keeps members it does not declare in its `extra` map, so a
//! newer daemon adding fields never breaks decoding and re-encoding stays
//! lossless. Member order follows what the daemon emits.

use std::fmt;

use bitcoin::{BlockHash, Txid};
use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

use crate::amount::Amount;
use crate::extensible_struct;

// ==============================================================================
// Node and Chain
// ==============================================================================

extensible_struct! {
    /// `getblockchaininfo`.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ChainInfo {
        "chain" => pub chain: String,
        "blocks" => pub blocks: u64,
        "headers" [skip_none] => pub headers: Option<u64>,
        "bestblockhash" => pub best_block_hash: BlockHash,
        "difficulty" => pub difficulty: Number,
        "mediantime" [skip_none] => pub median_time: Option<u64>,
        "verificationprogress" [skip_none] => pub verification_progress: Option<Number>,
        "initialblockdownload" [skip_none] => pub initial_block_download: Option<bool>,
        "chainwork" [skip_none] => pub chain_work: Option<String>,
        "size_on_disk" [skip_none] => pub size_on_disk: Option<u64>,
        "pruned" => pub pruned: bool,
    }
}

extensible_struct! {
    /// `getinfo` on daemons that still provide it.
    #[derive(Debug, Clone, PartialEq)]
    pub struct NodeInfo {
        "version" => pub version: i64,
        "protocolversion" => pub protocol_version: i64,
        "walletversion" [skip_none] => pub wallet_version: Option<i64>,
        "balance" [skip_none] => pub balance: Option<Amount>,
        "blocks" => pub blocks: u64,
        "timeoffset" => pub time_offset: i64,
        "connections" => pub connections: u32,
        "proxy" => pub proxy: String,
        "difficulty" => pub difficulty: Number,
        "testnet" => pub testnet: bool,
        "keypoololdest" [skip_none] => pub keypool_oldest: Option<u64>,
        "keypoolsize" [skip_none] => pub keypool_size: Option<u32>,
        "unlocked_until" [skip_none] => pub unlocked_until: Option<u64>,
        "paytxfee" => pub pay_tx_fee: Amount,
        "relayfee" [skip_none] => pub relay_fee: Option<Amount>,
        "errors" => pub errors: String,
    }
}

extensible_struct! {
    /// `getmininginfo`.
    #[derive(Debug, Clone, PartialEq)]
    pub struct MiningInfo {
        "blocks" => pub blocks: u64,
        "currentblocksize" [skip_none] => pub current_block_size: Option<u64>,
        "currentblocktx" [skip_none] => pub current_block_tx: Option<u64>,
        "difficulty" => pub difficulty: Number,
        "errors" [skip_none] => pub errors: Option<String>,
        "generate" [skip_none] => pub generate: Option<bool>,
        "genproclimit" [skip_none] => pub gen_proc_limit: Option<i64>,
        "hashespersec" [skip_none] => pub hashes_per_sec: Option<u64>,
        "pooledtx" => pub pooled_tx: u64,
        "testnet" [skip_none] => pub testnet: Option<bool>,
    }
}

extensible_struct! {
    /// One entry of `getpeerinfo`.
    #[derive(Debug, Clone, PartialEq)]
    pub struct PeerInfo {
        "addr" => pub addr: String,
        "services" => pub services: String,
        "lastsend" => pub last_send: u64,
        "lastrecv" => pub last_recv: u64,
        "conntime" => pub conn_time: u64,
        "version" => pub version: i64,
        "subver" => pub sub_version: String,
        "inbound" => pub inbound: bool,
        "releasetime" [skip_none] => pub release_time: Option<u64>,
        "startingheight" => pub starting_height: i64,
        "banscore" [skip_none] => pub ban_score: Option<i64>,
    }
}

// ==============================================================================
// Wallet
// ==============================================================================

extensible_struct! {
    /// `validateaddress`. Only `isvalid` is always present.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ValidateAddress {
        "isvalid" => pub is_valid: bool,
        "address" [skip_none] => pub address: Option<String>,
        "ismine" [skip_none] => pub is_mine: Option<bool>,
        "isscript" [skip_none] => pub is_script: Option<bool>,
        "pubkey" [skip_none] => pub pubkey: Option<String>,
        "iscompressed" [skip_none] => pub is_compressed: Option<bool>,
        "account" [skip_none] => pub account: Option<String>,
    }
}

extensible_struct! {
    /// `gettransaction`.
    #[derive(Debug, Clone, PartialEq)]
    pub struct WalletTransaction {
        "amount" => pub amount: Amount,
        "fee" [skip_none] => pub fee: Option<Amount>,
        "confirmations" => pub confirmations: i64,
        "blockhash" [skip_none] => pub block_hash: Option<BlockHash>,
        "blockindex" [skip_none] => pub block_index: Option<u32>,
        "blocktime" [skip_none] => pub block_time: Option<u64>,
        "txid" => pub txid: Txid,
        "time" => pub time: u64,
        "timereceived" => pub time_received: u64,
        "details" => pub details: Vec<TransactionDetail>,
        "hex" [skip_none] => pub hex: Option<String>,
    }
}

extensible_struct! {
    /// One wallet-relevant movement inside a [`WalletTransaction`].
    #[derive(Debug, Clone, PartialEq)]
    pub struct TransactionDetail {
        "account" [skip_none] => pub account: Option<String>,
        "address" [skip_none] => pub address: Option<String>,
        "category" => pub category: String,
        "amount" => pub amount: Amount,
        "vout" [skip_none] => pub vout: Option<u32>,
        "fee" [skip_none] => pub fee: Option<Amount>,
    }
}

extensible_struct! {
    /// One entry of `listtransactions` or `listsinceblock`.
    #[derive(Debug, Clone, PartialEq)]
    pub struct TransactionData {
        "account" [skip_none] => pub account: Option<String>,
        "address" [skip_none] => pub address: Option<String>,
        "category" => pub category: String,
        "amount" => pub amount: Amount,
        "fee" [skip_none] => pub fee: Option<Amount>,
        "confirmations" => pub confirmations: i64,
        "generated" [skip_none] => pub generated: Option<bool>,
        "blockhash" [skip_none] => pub block_hash: Option<BlockHash>,
        "blockindex" [skip_none] => pub block_index: Option<u32>,
        "blocktime" [skip_none] => pub block_time: Option<u64>,
        "txid" [skip_none] => pub txid: Option<Txid>,
        "time" => pub time: u64,
        "timereceived" [skip_none] => pub time_received: Option<u64>,
        "comment" [skip_none] => pub comment: Option<String>,
        "to" [skip_none] => pub to: Option<String>,
    }
}

extensible_struct! {
    /// `listsinceblock`.
    #[derive(Debug, Clone, PartialEq)]
    pub struct SinceBlock {
        "transactions" => pub transactions: Vec<TransactionData>,
        "lastblock" => pub last_block: BlockHash,
    }
}

extensible_struct! {
    /// One entry of `listunspent`.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Unspent {
        "txid" => pub txid: Txid,
        "vout" => pub vout: u32,
        "address" [skip_none] => pub address: Option<String>,
        "account" [skip_none] => pub account: Option<String>,
        "scriptPubKey" => pub script_pub_key: String,
        "redeemScript" [skip_none] => pub redeem_script: Option<String>,
        "amount" => pub amount: Amount,
        "confirmations" => pub confirmations: u64,
        "spendable" [skip_none] => pub spendable: Option<bool>,
    }
}

/// One group of `listaddressgroupings`.
pub type AddressGrouping = Vec<GroupedAddress>;

/// One address inside an address grouping.
///
/// On the wire this is a positional array `[address, amount]` or
/// `[address, amount, account]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedAddress {
    pub address: String,
    pub amount: Amount,
    pub account: Option<String>,
}

impl Serialize for GroupedAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.account.is_some() { 3 } else { 2 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.address)?;
        seq.serialize_element(&self.amount)?;
        if let Some(account) = &self.account {
            seq.serialize_element(account)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for GroupedAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = Vec::<Value>::deserialize(deserializer)?;
        let mut items = items.into_iter();
        let (Some(address), Some(amount)) = (items.next(), items.next()) else {
            return Err(D::Error::invalid_length(
                0,
                &"[address, amount] or [address, amount, account]",
            ));
        };
        let account = items.next();
        if items.next().is_some() {
            return Err(D::Error::invalid_length(
                4,
                &"[address, amount] or [address, amount, account]",
            ));
        }

        Ok(Self {
            address: serde_json::from_value(address).map_err(D::Error::custom)?,
            amount: serde_json::from_value(amount).map_err(D::Error::custom)?,
            account: account
                .map(serde_json::from_value)
                .transpose()
                .map_err(D::Error::custom)?,
        })
    }
}

// ==============================================================================
// Raw Transactions
// ==============================================================================

extensible_struct! {
    /// Verbose `getrawtransaction` and `decoderawtransaction`.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RawTransaction {
        "hex" [skip_none] => pub hex: Option<String>,
        "txid" => pub txid: Txid,
        "version" => pub version: i32,
        "locktime" => pub lock_time: u32,
        "vin" => pub vin: Vec<RawInput>,
        "vout" => pub vout: Vec<RawOutput>,
        "blockhash" [skip_none] => pub block_hash: Option<BlockHash>,
        "confirmations" [skip_none] => pub confirmations: Option<u64>,
        "time" [skip_none] => pub time: Option<u64>,
        "blocktime" [skip_none] => pub block_time: Option<u64>,
    }
}

extensible_struct! {
    /// A transaction input; coinbase inputs carry `coinbase` instead of a
    /// previous outpoint.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RawInput {
        "coinbase" [skip_none] => pub coinbase: Option<String>,
        "txid" [skip_none] => pub txid: Option<Txid>,
        "vout" [skip_none] => pub vout: Option<u32>,
        "scriptSig" [skip_none] => pub script_sig: Option<ScriptSig>,
        "sequence" => pub sequence: u32,
    }
}

extensible_struct! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct ScriptSig {
        "asm" => pub asm: String,
        "hex" => pub hex: String,
    }
}

extensible_struct! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct RawOutput {
        "value" => pub value: Amount,
        "n" => pub n: u32,
        "scriptPubKey" => pub script_pub_key: ScriptPubKey,
    }
}

extensible_struct! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct ScriptPubKey {
        "asm" => pub asm: String,
        "hex" => pub hex: String,
        "reqSigs" [skip_none] => pub req_sigs: Option<u32>,
        "type" => pub script_type: String,
        "addresses" [skip_none] => pub addresses: Option<Vec<String>>,
    }
}

extensible_struct! {
    /// `gettxout` for an unspent output.
    #[derive(Debug, Clone, PartialEq)]
    pub struct TxOut {
        "bestblock" => pub best_block: BlockHash,
        "confirmations" => pub confirmations: u64,
        "value" => pub value: Amount,
        "scriptPubKey" => pub script_pub_key: ScriptPubKey,
        "version" [skip_none] => pub version: Option<i32>,
        "coinbase" => pub coinbase: bool,
    }
}

// ==============================================================================
// Request-side Types
// ==============================================================================

/// An output to spend, as passed to `createrawtransaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPointRef {
    pub txid: Txid,
    pub vout: u32,
}

impl From<bitcoin::OutPoint> for OutPointRef {
    fn from(outpoint: bitcoin::OutPoint) -> Self {
        Self {
            txid: outpoint.txid,
            vout: outpoint.vout,
        }
    }
}

/// The `command` argument of `addnode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddNodeAction {
    Add,
    Remove,
    OneTry,
}

impl fmt::Display for AddNodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove => write!(f, "remove"),
            Self::OneTry => write!(f, "onetry"),
        }
    }
}
