use std::env;
use std::sync::Once;

use btcrpc_core::rpc::codes;
use btcrpc_core::{Auth, Extensible, ErrorKind, RpcClient, RpcConfig};

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("btcrpc_core=debug")),
            )
            .with_target(true)
            .try_init();
    });
}

fn regtest_client() -> RpcClient {
    let url = env::var("BTCRPC_TEST_RPC_URL").expect("BTCRPC_TEST_RPC_URL must be set");
    let auth = Auth::from_parts(
        env::var("BTCRPC_TEST_RPC_USER").ok(),
        env::var("BTCRPC_TEST_RPC_PASS").ok(),
        env::var_os("BTCRPC_TEST_RPC_COOKIE_FILE").map(Into::into),
    )
    .expect("regtest credentials must be consistent");

    RpcClient::new(&RpcConfig::new(url).with_auth(auth)).expect("rpc client must construct")
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a local regtest bitcoind; set BTCRPC_TEST_RPC_URL and credentials"]
async fn regtest_chain_queries_and_error_classification() {
    init_tracing();
    let rpc = regtest_client();

    eprintln!("[itest] checking get_blockchain_info against {}", rpc.url());
    let info = rpc
        .get_blockchain_info()
        .await
        .expect("regtest get_blockchain_info must succeed");
    assert_eq!(info.chain, "regtest");
    eprintln!("[itest] unmapped chain info members: {:?}", info.unmapped_fields());

    let count = rpc
        .get_block_count()
        .await
        .expect("regtest get_block_count must succeed");
    assert_eq!(count, info.blocks);

    let best = rpc
        .get_best_block_hash()
        .await
        .expect("regtest get_best_block_hash must succeed");
    let at_tip = rpc
        .get_block_hash(count)
        .await
        .expect("regtest get_block_hash must succeed");
    assert_eq!(best, at_tip, "tip hash must match hash at tip height");

    eprintln!("[itest] checking error classification");
    let err = rpc
        .call::<serde_json::Value>("nosuchmethod", Vec::new())
        .await
        .expect_err("unknown method must fail");
    assert_eq!(err.kind(), ErrorKind::MethodNotFound);
    assert_eq!(err.code(), Some(codes::METHOD_NOT_FOUND));

    let err = rpc
        .get_block_hash(count + 1_000_000)
        .await
        .expect_err("height beyond tip must fail");
    assert!(err.kind().is_remote(), "unexpected kind {}", err.kind());
    eprintln!("[itest] integration test completed");
}
