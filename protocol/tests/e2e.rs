//! End-to-end integration tests for the transaction pipeline.
//!
//! These tests drive the public API the way the `tx` binary does: build,
//! sign, encode, route, and for the alternate entry path, read pre-signed
//! bytes back in. Wire output is checked against a reference transaction
//! whose id and blob are known to validators.
//!
//! Submission runs against an in-process websocket server, so nothing here
//! touches the network.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use ripple_tx::config::{OutputMode, SigningConfig};
use ripple_tx::crypto::{Algorithm, Seed};
use ripple_tx::transaction::{
    decode_signed, encode, read_encoded, sign_with_config, OutputRouter, SubmissionStatus,
    Transaction, TransactionBuilder, TransactionKind, WebSocketSubmitter,
};
use ripple_tx::types::Amount;
use ripple_tx::{ErrorKind, TxError};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const GENESIS_SEED: &str = "snoPBrXtMeMyMHUVTgbuqAfg1SUTb";
const GENESIS_ACCOUNT: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";
const DEST: &str = "rPT1Sjq2YGrBMTttX4GZHjKu9dyfzbpAYe";

const KNOWN_HASH: &str = "893D6C0957674832E68876D377D95C466622630C49E9E67AD7DA323BB166F9FC";
const KNOWN_BLOB: &str = concat!(
    "120000",
    "2200000000",
    "2400000001",
    "6140000000000F4240",
    "68400000000000000A",
    "73210330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020",
    "7446304402204C62FE143AA2D3D4AD7F8435AE3A28704ED53CBFF52AE859C66BEC6166C1A2B4",
    "0220246CC0FAE312F8DE11016A0404AFCE55CA65F413621414F41031FAF384E6F551",
    "8114B5F762798A53D543A014CAF8B297CFF8F2F937E8",
    "8314F667B0CA50CC7709A220B0561B85E53A48461FA8",
);

fn genesis_config(sequence: u32) -> SigningConfig {
    SigningConfig::new(Seed::from_base58(GENESIS_SEED).unwrap(), sequence)
}

fn one_xrp_payment() -> Transaction {
    TransactionBuilder::payment()
        .destination(DEST)
        .amount("1")
        .build()
        .unwrap()
}

/// Accepts one websocket connection, answers the first text frame with
/// `reply` and hands back the request it received.
async fn ledger_stub(reply: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("ws://{}", listener.local_addr().unwrap());
    let reply = reply.to_string();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let request = loop {
            match ws.next().await.unwrap().unwrap() {
                Message::Text(text) => break text.as_str().to_string(),
                _ => continue,
            }
        };
        ws.send(Message::text(reply)).await.unwrap();
        let _ = ws.close(None).await;
        request
    });
    (endpoint, handle)
}

// ---------------------------------------------------------------------------
// Known Vector
// ---------------------------------------------------------------------------

#[test]
fn reference_payment_matches_the_network() {
    let signed = sign_with_config(one_xrp_payment(), &genesis_config(1)).unwrap();
    let encoded = encode(&signed).unwrap();

    assert_eq!(encoded.hash_hex(), KNOWN_HASH);
    assert_eq!(encoded.raw_hex(), KNOWN_BLOB);
    assert_eq!(encoded.json["Account"], GENESIS_ACCOUNT);
    assert_eq!(encoded.json["Destination"], DEST);
    assert_eq!(encoded.json["Flags"], 0);
    assert_eq!(encoded.json["hash"], KNOWN_HASH);
}

#[test]
fn reference_blob_reemits_unchanged() {
    let bytes = read_encoded(format!("{}\n", KNOWN_BLOB).as_bytes()).unwrap();
    let signed = decode_signed(&bytes).unwrap();
    assert!(signed.verify_signature());

    let encoded = encode(&signed).unwrap();
    assert_eq!(encoded.hash_hex(), KNOWN_HASH);
    assert_eq!(encoded.raw, bytes);
}

#[test]
fn summary_output_of_reference_payment() {
    let signed = sign_with_config(one_xrp_payment(), &genesis_config(1)).unwrap();
    let encoded = encode(&signed).unwrap();

    let mut out = Vec::new();
    OutputRouter::new(OutputMode::Summary)
        .write_outputs(&encoded, &mut out)
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with(&format!("Hash: {}\nRaw: {}\n", KNOWN_HASH, KNOWN_BLOB)));
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[test]
fn cross_currency_payment_survives_the_wire() {
    let tx = TransactionBuilder::payment()
        .destination(DEST)
        .amount(format!("10/USD/{}", GENESIS_ACCOUNT))
        .send_max("12.5")
        .paths(format!("USD/{}", GENESIS_ACCOUNT))
        .destination_tag(42)
        .invoice("order-1138")
        .option("partial")
        .option("nodirect")
        .build()
        .unwrap();

    let mut config = genesis_config(5);
    config.fee = Some(12);
    config.last_ledger_sequence = Some(80_000);
    let signed = sign_with_config(tx, &config).unwrap();
    let encoded = encode(&signed).unwrap();

    let json = &encoded.json;
    assert_eq!(json["Flags"], 0x0003_0000);
    assert_eq!(json["Fee"], "12");
    assert_eq!(json["LastLedgerSequence"], 80_000);
    assert_eq!(json["DestinationTag"], 42);
    assert_eq!(json["SendMax"], "12500000");
    assert_eq!(json["Amount"]["currency"], "USD");
    assert_eq!(json["Amount"]["issuer"], GENESIS_ACCOUNT);
    assert_eq!(json["Amount"]["value"], "10");
    assert_eq!(json["Paths"][0][0]["currency"], "USD");
    assert_eq!(json["Paths"][0][0]["issuer"], GENESIS_ACCOUNT);
    assert_eq!(json["InvoiceID"].as_str().unwrap().len(), 64);

    let decoded = decode_signed(&encoded.raw).unwrap();
    assert_eq!(decoded, signed);
    assert!(decoded.verify_signature());
}

#[test]
fn missing_payment_inputs_are_configuration_errors() {
    let err = TransactionBuilder::payment().amount("1").build().unwrap_err();
    assert!(matches!(err, TxError::MissingRequiredField("Destination")));
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = TransactionBuilder::payment()
        .destination(DEST)
        .build()
        .unwrap_err();
    assert!(matches!(err, TxError::MissingRequiredField("Amount")));

    let err = TransactionBuilder::payment()
        .destination(DEST)
        .amount("1")
        .option("freeze")
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

/// Sign then route into `out`, stopping at the first failure like `tx` does.
async fn sign_and_route(
    tx: Transaction,
    config: &SigningConfig,
    out: &mut Vec<u8>,
) -> Result<(), TxError> {
    let signed = sign_with_config(tx, config)?;
    OutputRouter::new(config.output).route(&signed, out).await?;
    Ok(())
}

#[tokio::test]
async fn signing_failures_emit_nothing() {
    let mut out = Vec::new();
    let err = sign_and_route(one_xrp_payment(), &SigningConfig::default(), &mut out)
        .await
        .unwrap_err();
    assert!(matches!(err, TxError::MissingSeed));
    assert!(out.is_empty());

    let mut config = genesis_config(1);
    config.output = OutputMode::Binary;
    config.fee = Some(ripple_tx::config::MAX_NATIVE_DROPS + 1);
    let err = sign_and_route(one_xrp_payment(), &config, &mut out)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(out.is_empty());
}

#[test]
fn fee_beyond_the_native_maximum_is_rejected_before_signing() {
    let mut config = genesis_config(1);
    config.fee = Some(1 << 62);
    let err = sign_with_config(one_xrp_payment(), &config).unwrap_err();
    assert!(matches!(err, TxError::ValueOutOfRange(_)));
}

#[test]
fn ed25519_pipeline_round_trips() {
    let mut config = SigningConfig::new(Seed::generate(Algorithm::Ed25519), 3);
    config.source_tag = Some(99);
    let signed = sign_with_config(one_xrp_payment(), &config).unwrap();
    assert_eq!(signed.transaction().base.signing_pub_key[0], 0xED);
    assert_eq!(signed.signature().len(), 64);

    let encoded = encode(&signed).unwrap();
    let decoded = decode_signed(&encoded.raw).unwrap();
    assert!(decoded.verify_signature());
    assert_eq!(decoded.transaction().base.source_tag, Some(99));
}

// ---------------------------------------------------------------------------
// Trust Lines
// ---------------------------------------------------------------------------

#[test]
fn trust_set_qualities_and_flags_reach_the_wire() {
    let tx = TransactionBuilder::trust_set()
        .limit(format!("100/USD/{}", DEST))
        .quality_in(1.5)
        .quality_out(0.0)
        .option("noripple")
        .option("auth")
        .build()
        .unwrap();
    let signed = sign_with_config(tx, &genesis_config(2)).unwrap();
    let encoded = encode(&signed).unwrap();

    assert_eq!(encoded.json["TransactionType"], "TrustSet");
    assert_eq!(encoded.json["Flags"], 0x0003_0000);
    assert_eq!(encoded.json["QualityIn"], 1_500_000_000u32);
    assert_eq!(encoded.json["QualityOut"], 0);
    assert_eq!(encoded.json["LimitAmount"]["value"], "100");

    let decoded = decode_signed(&encoded.raw).unwrap();
    let TransactionKind::TrustSet(trust) = &decoded.transaction().kind else {
        panic!("expected a trust set");
    };
    assert_eq!(trust.quality_in, Some(1_500_000_000));
    assert_eq!(trust.quality_out, Some(0));
    assert!(!Amount::Issued(trust.limit_amount).is_native());
}

#[test]
fn native_trust_limit_is_rejected() {
    let err = TransactionBuilder::trust_set().limit("100").build().unwrap_err();
    assert!(matches!(err, TxError::InvalidAmount { .. }));
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn websocket_submission_reports_the_verdict() {
    let (endpoint, server) = ledger_stub(
        r#"{"id":1,"status":"success","type":"response","result":{"engine_result":"tesSUCCESS","engine_result_code":0,"engine_result_message":"The transaction was applied. Only final in a validated ledger."}}"#,
    )
    .await;

    let mut config = genesis_config(1);
    config.submit = true;
    config.output = OutputMode::Json;
    config.endpoint = endpoint;
    config.submit_timeout = Duration::from_secs(5);

    let signed = sign_with_config(one_xrp_payment(), &config).unwrap();
    let submitter = WebSocketSubmitter::from_config(&config);
    let mut out = Vec::new();
    let routed = OutputRouter::from_config(&config, &submitter)
        .route(&signed, &mut out)
        .await
        .unwrap();

    let SubmissionStatus::Answered(verdict) = &routed.submission else {
        panic!("expected a verdict, got {:?}", routed.submission);
    };
    assert!(verdict.is_success());

    let request: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
    assert_eq!(request["command"], "submit");
    assert_eq!(request["tx_blob"], KNOWN_BLOB);

    let text = String::from_utf8(out).unwrap();
    assert!(text.ends_with(
        "tesSUCCESS: The transaction was applied. Only final in a validated ledger.\n"
    ));
}

#[tokio::test]
async fn rejected_verdicts_are_results_not_errors() {
    let (endpoint, _server) = ledger_stub(
        r#"{"status":"success","result":{"engine_result":"tefPAST_SEQ","engine_result_message":"This sequence number has already passed."}}"#,
    )
    .await;
    let submitter = WebSocketSubmitter::new(endpoint, Duration::from_secs(5));
    let signed = sign_with_config(one_xrp_payment(), &genesis_config(1)).unwrap();

    let mut out = Vec::new();
    let routed = OutputRouter::new(OutputMode::Binary)
        .with_submitter(&submitter)
        .route(&signed, &mut out)
        .await
        .unwrap();
    let (encoded, verdict) = routed.into_result().unwrap();
    assert_eq!(encoded.hash_hex(), KNOWN_HASH);
    assert_eq!(verdict.unwrap().code, "tefPAST_SEQ");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("ws://{}", listener.local_addr().unwrap());
    drop(listener);

    let submitter = WebSocketSubmitter::new(endpoint, Duration::from_secs(5));
    let signed = sign_with_config(one_xrp_payment(), &genesis_config(1)).unwrap();
    let mut out = Vec::new();
    let routed = OutputRouter::new(OutputMode::Summary)
        .with_submitter(&submitter)
        .route(&signed, &mut out)
        .await
        .unwrap();

    assert!(!out.is_empty());
    let err = routed.into_result().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}
