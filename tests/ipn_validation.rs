mod common;

use common::ScriptedTransport;
use paypal_nvp::{
    config::{Environment, IpnConfig},
    endpoints::IPN_SANDBOX,
    ipn::IpnValidator,
};

fn notification() -> Vec<(String, String)> {
    serde_json::from_value(serde_json::json!([
        ["mc_gross", "19.95"],
        ["protection_eligibility", "Eligible"],
        ["payer_id", "LPLWNMTBWMFAY"],
        ["payment_date", "20:12:59 Jan 13, 2009 PST"],
        ["payment_status", "Completed"],
        ["txn_id", "61E67681CH3238416"],
    ]))
    .unwrap()
}

#[tokio::test]
async fn test_sandbox_validation_round() {
    let transport = ScriptedTransport::new().reply("VERIFIED\n").reply("INVALID");
    let validator = IpnValidator::from_config(
        transport.clone(),
        &IpnConfig::default(),
        Environment::Sandbox,
    )
    .unwrap();

    let verdict = validator.validate(notification()).await.unwrap();
    assert!(verdict.is_verified());
    assert_eq!(verdict.message, "VERIFIED");

    let verdict = validator.validate(notification()).await.unwrap();
    assert!(!verdict.is_verified());
    assert_eq!(
        validator.errors(),
        vec!["IPN Validation Failed: INVALID".to_string()]
    );

    let sent = transport.query(0);
    assert!(transport.requests()[0].as_str().starts_with(IPN_SANDBOX));
    assert_eq!(sent[0], ("cmd".to_string(), "_notify-validate".to_string()));
    assert_eq!(&sent[1..], notification().as_slice());
}
