//! Typed wrappers over [`RpcClient::call`].
//!
//! Each wrapper is a fixed slot list fed through [`ParamsBuilder`]; the
//! defaults given for optional slots are the values the daemon itself
//! assumes, so an argument left at its default is never sent.

use bitcoin::{BlockHash, Txid};
use serde_json::{Map, Value};

use crate::amount::Amount;
use crate::error::RpcError;
use crate::params::ParamsBuilder;
use crate::types::{
    AddNodeAction, AddressGrouping, ChainInfo, MiningInfo, NodeInfo, OutPointRef, PeerInfo,
    RawTransaction, SinceBlock, TransactionData, TxOut, Unspent, ValidateAddress,
    WalletTransaction,
};

use super::RpcClient;

const ALL_ACCOUNTS: &str = "*";

impl RpcClient {
    // ==========================================================================
    // Chain and Node
    // ==========================================================================

    pub async fn get_blockchain_info(&self) -> Result<ChainInfo, RpcError> {
        self.call("getblockchaininfo", Vec::new()).await
    }

    pub async fn get_block_count(&self) -> Result<u64, RpcError> {
        self.call("getblockcount", Vec::new()).await
    }

    pub async fn get_best_block_hash(&self) -> Result<BlockHash, RpcError> {
        self.call("getbestblockhash", Vec::new()).await
    }

    pub async fn get_block_hash(&self, height: u64) -> Result<BlockHash, RpcError> {
        let params = ParamsBuilder::new().required("height", height).build()?;
        self.call("getblockhash", params).await
    }

    pub async fn get_info(&self) -> Result<NodeInfo, RpcError> {
        self.call("getinfo", Vec::new()).await
    }

    pub async fn get_mining_info(&self) -> Result<MiningInfo, RpcError> {
        self.call("getmininginfo", Vec::new()).await
    }

    pub async fn get_peer_info(&self) -> Result<Vec<PeerInfo>, RpcError> {
        self.call("getpeerinfo", Vec::new()).await
    }

    pub async fn add_node(&self, node: &str, action: AddNodeAction) -> Result<(), RpcError> {
        let params = ParamsBuilder::new()
            .required("node", node)
            .required("command", action)
            .build()?;
        self.call("addnode", params).await
    }

    /// List commands, or describe one.
    pub async fn help(&self, command: Option<&str>) -> Result<String, RpcError> {
        let params = ParamsBuilder::new()
            .optional("command", command, "")
            .build()?;
        self.call("help", params).await
    }

    pub async fn stop(&self) -> Result<String, RpcError> {
        self.call("stop", Vec::new()).await
    }

    // ==========================================================================
    // Wallet Queries
    // ==========================================================================

    /// Balance of `account`, or of the whole wallet when `None`.
    pub async fn get_balance(
        &self,
        account: Option<&str>,
        minconf: Option<u32>,
    ) -> Result<Amount, RpcError> {
        let params = ParamsBuilder::new()
            .optional("account", account, ALL_ACCOUNTS)
            .optional("minconf", minconf, 1)
            .build()?;
        self.call("getbalance", params).await
    }

    pub async fn get_new_address(&self, account: Option<&str>) -> Result<String, RpcError> {
        let params = ParamsBuilder::new()
            .optional("account", account, "")
            .build()?;
        self.call("getnewaddress", params).await
    }

    pub async fn get_account(&self, address: &str) -> Result<String, RpcError> {
        let params = ParamsBuilder::new().required("address", address).build()?;
        self.call("getaccount", params).await
    }

    pub async fn validate_address(&self, address: &str) -> Result<ValidateAddress, RpcError> {
        let params = ParamsBuilder::new().required("address", address).build()?;
        self.call("validateaddress", params).await
    }

    pub async fn get_transaction(&self, txid: &Txid) -> Result<WalletTransaction, RpcError> {
        let params = ParamsBuilder::new().required("txid", txid).build()?;
        self.call("gettransaction", params).await
    }

    pub async fn list_transactions(
        &self,
        account: Option<&str>,
        count: Option<u32>,
        from: Option<u32>,
    ) -> Result<Vec<TransactionData>, RpcError> {
        let params = ParamsBuilder::new()
            .optional("account", account, ALL_ACCOUNTS)
            .optional("count", count, 10)
            .optional("from", from, 0)
            .build()?;
        self.call("listtransactions", params).await
    }

    /// Transactions since `block_hash`, or all of them when `None`.
    pub async fn list_since_block(
        &self,
        block_hash: Option<&BlockHash>,
        target_confirmations: Option<u32>,
    ) -> Result<SinceBlock, RpcError> {
        let params = ParamsBuilder::new()
            .optional("blockhash", block_hash, "")
            .optional("target_confirmations", target_confirmations, 1)
            .build()?;
        self.call("listsinceblock", params).await
    }

    /// Unspent outputs, optionally restricted to `addresses`.
    pub async fn list_unspent(
        &self,
        minconf: Option<u32>,
        maxconf: Option<u32>,
        addresses: &[String],
    ) -> Result<Vec<Unspent>, RpcError> {
        let addresses = (!addresses.is_empty()).then_some(addresses);
        let params = ParamsBuilder::new()
            .optional("minconf", minconf, 1)
            .optional("maxconf", maxconf, 9_999_999)
            .optional("addresses", addresses, Vec::<String>::new())
            .build()?;
        self.call("listunspent", params).await
    }

    pub async fn list_address_groupings(&self) -> Result<Vec<AddressGrouping>, RpcError> {
        self.call("listaddressgroupings", Vec::new()).await
    }

    pub async fn dump_priv_key(&self, address: &str) -> Result<String, RpcError> {
        let params = ParamsBuilder::new().required("address", address).build()?;
        self.call("dumpprivkey", params).await
    }

    // ==========================================================================
    // Sending
    // ==========================================================================

    pub async fn send_to_address(
        &self,
        address: &str,
        amount: Amount,
        comment: Option<&str>,
        comment_to: Option<&str>,
    ) -> Result<Txid, RpcError> {
        let params = ParamsBuilder::new()
            .required("address", address)
            .amount("amount", amount)
            .optional("comment", comment, "")
            .optional("comment_to", comment_to, "")
            .build()?;
        self.call("sendtoaddress", params).await
    }

    pub async fn send_from(
        &self,
        from_account: &str,
        address: &str,
        amount: Amount,
        minconf: Option<u32>,
        comment: Option<&str>,
        comment_to: Option<&str>,
    ) -> Result<Txid, RpcError> {
        let params = ParamsBuilder::new()
            .required("fromaccount", from_account)
            .required("address", address)
            .amount("amount", amount)
            .optional("minconf", minconf, 1)
            .optional("comment", comment, "")
            .optional("comment_to", comment_to, "")
            .build()?;
        self.call("sendfrom", params).await
    }

    /// Pay several addresses in one transaction. Each address may appear
    /// only once.
    pub async fn send_many(
        &self,
        from_account: &str,
        amounts: &[(String, Amount)],
        minconf: Option<u32>,
        comment: Option<&str>,
    ) -> Result<Txid, RpcError> {
        let mut recipients = Map::new();
        for (address, amount) in amounts {
            if recipients.contains_key(address) {
                return Err(RpcError::invalid_parameter(format!(
                    "duplicated address `{address}`"
                )));
            }
            recipients.insert(address.clone(), amount_value(*amount)?);
        }

        let params = ParamsBuilder::new()
            .required("fromaccount", from_account)
            .required("amounts", recipients)
            .optional("minconf", minconf, 1)
            .optional("comment", comment, "")
            .build()?;
        self.call("sendmany", params).await
    }

    pub async fn set_tx_fee(&self, amount: Amount) -> Result<bool, RpcError> {
        let params = ParamsBuilder::new().amount("amount", amount).build()?;
        self.call("settxfee", params).await
    }

    // ==========================================================================
    // Raw Transactions
    // ==========================================================================

    /// Serialized transaction as hex.
    pub async fn get_raw_transaction_hex(&self, txid: &Txid) -> Result<String, RpcError> {
        let params = ParamsBuilder::new().required("txid", txid).build()?;
        self.call("getrawtransaction", params).await
    }

    pub async fn get_raw_transaction(&self, txid: &Txid) -> Result<RawTransaction, RpcError> {
        let params = ParamsBuilder::new()
            .required("txid", txid)
            .optional("verbose", Some(1), 0)
            .build()?;
        self.call("getrawtransaction", params).await
    }

    pub async fn decode_raw_transaction(&self, hex: &str) -> Result<RawTransaction, RpcError> {
        let params = ParamsBuilder::new().required("hexstring", hex).build()?;
        self.call("decoderawtransaction", params).await
    }

    /// Details of an unspent output; `None` when it is spent or unknown.
    pub async fn get_tx_out(
        &self,
        txid: &Txid,
        vout: u32,
        include_mempool: Option<bool>,
    ) -> Result<Option<TxOut>, RpcError> {
        let params = ParamsBuilder::new()
            .required("txid", txid)
            .required("n", vout)
            .optional("include_mempool", include_mempool, true)
            .build()?;
        self.call("gettxout", params).await
    }

    /// Build an unsigned transaction. Amounts for a repeated address are
    /// added together into one output.
    pub async fn create_raw_transaction(
        &self,
        inputs: &[OutPointRef],
        outputs: &[(String, Amount)],
    ) -> Result<String, RpcError> {
        let mut totals: Vec<(&str, Amount)> = Vec::with_capacity(outputs.len());
        for (address, amount) in outputs {
            match totals.iter_mut().find(|(seen, _)| *seen == address.as_str()) {
                Some((_, total)) => {
                    *total = total.checked_add(*amount).ok_or_else(|| {
                        RpcError::invalid_parameter(format!("amount overflow for `{address}`"))
                    })?;
                }
                None => totals.push((address.as_str(), *amount)),
            }
        }

        let mut recipients = Map::new();
        for (address, amount) in totals {
            recipients.insert(address.to_owned(), amount_value(amount)?);
        }

        let params = ParamsBuilder::new()
            .required("inputs", inputs)
            .required("outputs", recipients)
            .build()?;
        self.call("createrawtransaction", params).await
    }

    pub async fn send_raw_transaction(&self, hex: &str) -> Result<Txid, RpcError> {
        let params = ParamsBuilder::new().required("hexstring", hex).build()?;
        self.call("sendrawtransaction", params).await
    }

    pub async fn add_multisig_address(
        &self,
        nrequired: u32,
        keys: &[String],
        account: Option<&str>,
    ) -> Result<String, RpcError> {
        let params = ParamsBuilder::new()
            .required("nrequired", nrequired)
            .required("keys", keys)
            .optional("account", account, "")
            .build()?;
        self.call("addmultisigaddress", params).await
    }

    // ==========================================================================
    // Wallet Security
    // ==========================================================================

    pub async fn backup_wallet(&self, destination: &str) -> Result<(), RpcError> {
        let params = ParamsBuilder::new()
            .required("destination", destination)
            .build()?;
        self.call("backupwallet", params).await
    }

    /// Encrypt the wallet. The daemon shuts down afterwards and replies
    /// with a notice, or `null` on older versions.
    pub async fn encrypt_wallet(&self, passphrase: &str) -> Result<Option<String>, RpcError> {
        let params = ParamsBuilder::new()
            .required("passphrase", passphrase)
            .build()?;
        self.call("encryptwallet", params).await
    }

    pub async fn wallet_lock(&self) -> Result<(), RpcError> {
        self.call("walletlock", Vec::new()).await
    }

    pub async fn wallet_passphrase(
        &self,
        passphrase: &str,
        timeout_secs: u64,
    ) -> Result<(), RpcError> {
        let params = ParamsBuilder::new()
            .required("passphrase", passphrase)
            .required("timeout", timeout_secs)
            .build()?;
        self.call("walletpassphrase", params).await
    }

    pub async fn wallet_passphrase_change(
        &self,
        old_passphrase: &str,
        new_passphrase: &str,
    ) -> Result<(), RpcError> {
        let params = ParamsBuilder::new()
            .required("oldpassphrase", old_passphrase)
            .required("newpassphrase", new_passphrase)
            .build()?;
        self.call("walletpassphrasechange", params).await
    }
}

fn amount_value(amount: Amount) -> Result<Value, RpcError> {
    amount
        .to_json_number()
        .map(Value::Number)
        .map_err(|e| RpcError::invalid_parameter(format!("amount {amount}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::config::RpcConfig;
    use crate::rpc::mock::MockTransport;
    use crate::rpc::RequestEnvelope;
    use crate::ErrorKind;

    const TXID: &str = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";

    fn setup(reply: &str) -> (Arc<MockTransport>, RpcClient) {
        let mock = Arc::new(
            MockTransport::builder()
                .respond(StatusCode::OK, reply.to_owned())
                .build(),
        );
        let client = RpcClient::with_transport(&RpcConfig::new("http://127.0.0.1:8332"), mock.clone())
            .expect("client must construct");
        (mock, client)
    }

    fn sent(mock: &MockTransport) -> RequestEnvelope {
        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        serde_json::from_str(&requests[0].body).expect("request json")
    }

    fn sent_params_text(mock: &MockTransport) -> String {
        serde_json::to_string(&sent(mock).params).expect("encode params")
    }

    #[tokio::test]
    async fn list_transactions_fills_skipped_count() {
        let (mock, client) = setup(r#"{"result":[],"error":null,"id":1}"#);
        let txs = client
            .list_transactions(Some("savings"), None, Some(20))
            .await
            .expect("call must succeed");
        assert!(txs.is_empty());

        let req = sent(&mock);
        assert_eq!(req.method, "listtransactions");
        assert_eq!(req.params, vec![json!("savings"), json!(10), json!(20)]);
    }

    #[tokio::test]
    async fn get_balance_without_arguments_sends_nothing() {
        let (mock, client) = setup(r#"{"result":1.50000000,"error":null,"id":1}"#);
        let balance = client.get_balance(None, None).await.expect("call must succeed");
        assert_eq!(balance.to_sat(), 150_000_000);
        assert!(sent(&mock).params.is_empty());
    }

    #[tokio::test]
    async fn send_to_address_writes_plain_amount() {
        let (mock, client) = setup(&format!(r#"{{"result":"{TXID}","error":null,"id":1}}"#));
        let amount: Amount = "0.1".parse().expect("amount");
        let txid = client
            .send_to_address("mj3QxNUyp4Ry2pbbP19tznUAAPqFvDbRFq", amount, None, Some("bob"))
            .await
            .expect("call must succeed");
        assert_eq!(txid.to_string(), TXID);
        assert_eq!(
            sent_params_text(&mock),
            r#"["mj3QxNUyp4Ry2pbbP19tznUAAPqFvDbRFq",0.10000000,"","bob"]"#
        );
    }

    #[tokio::test]
    async fn create_raw_transaction_sums_repeated_recipients() {
        let (mock, client) = setup(r#"{"result":"0100","error":null,"id":1}"#);
        let input = OutPointRef {
            txid: TXID.parse().expect("txid"),
            vout: 0,
        };
        let outputs = vec![
            ("addr-a".to_owned(), Amount::from_sat(10_000_000)),
            ("addr-b".to_owned(), Amount::from_sat(1)),
            ("addr-a".to_owned(), Amount::from_sat(5_000_000)),
        ];
        let hex = client
            .create_raw_transaction(&[input], &outputs)
            .await
            .expect("call must succeed");
        assert_eq!(hex, "0100");
        assert_eq!(
            sent_params_text(&mock),
            format!(r#"[[{{"txid":"{TXID}","vout":0}}],{{"addr-a":0.15000000,"addr-b":0.00000001}}]"#)
        );
    }

    #[tokio::test]
    async fn send_many_rejects_duplicates_before_sending() {
        let (mock, client) = setup(r#"{"result":null,"error":null,"id":1}"#);
        let amounts = vec![
            ("addr-a".to_owned(), Amount::from_sat(1)),
            ("addr-a".to_owned(), Amount::from_sat(2)),
        ];
        let err = client
            .send_many("", &amounts, None, None)
            .await
            .expect_err("duplicate address");
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn spent_output_is_none() {
        let (mock, client) = setup(r#"{"result":null,"error":null,"id":1}"#);
        let out = client
            .get_tx_out(&TXID.parse().expect("txid"), 1, None)
            .await
            .expect("call must succeed");
        assert!(out.is_none());
        assert_eq!(sent(&mock).params, vec![json!(TXID), json!(1)]);
    }

    #[tokio::test]
    async fn list_unspent_with_addresses_fills_both_confirmation_bounds() {
        let (mock, client) = setup(r#"{"result":[],"error":null,"id":1}"#);
        client
            .list_unspent(None, None, &["addr-a".to_owned()])
            .await
            .expect("call must succeed");
        assert_eq!(
            sent(&mock).params,
            vec![json!(1), json!(9_999_999), json!(["addr-a"])]
        );
    }

    #[tokio::test]
    async fn verbose_raw_transaction_requests_decoded_form() {
        let body = format!(
            r#"{{"result":{{"hex":"00","txid":"{TXID}","version":1,"locktime":0,"vin":[],"vout":[]}},"error":null,"id":1}}"#
        );
        let (mock, client) = setup(&body);
        let tx = client
            .get_raw_transaction(&TXID.parse().expect("txid"))
            .await
            .expect("call must succeed");
        assert_eq!(tx.hex.as_deref(), Some("00"));
        assert_eq!(sent(&mock).params, vec![json!(TXID), json!(1)]);
    }

    #[tokio::test]
    async fn wallet_lock_accepts_null_result() {
        let (mock, client) = setup(r#"{"result":null,"error":null,"id":1}"#);
        client.wallet_lock().await.expect("call must succeed");
        assert_eq!(sent(&mock).method, "walletlock");
    }

    #[tokio::test]
    async fn add_node_sends_action_word() {
        let (mock, client) = setup(r#"{"result":null,"error":null,"id":1}"#);
        client
            .add_node("10.0.0.1:8333", AddNodeAction::OneTry)
            .await
            .expect("call must succeed");
        assert_eq!(
            sent(&mock).params,
            vec![json!("10.0.0.1:8333"), json!("onetry")]
        );
    }
}
