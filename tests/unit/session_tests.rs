use crate::context::{CHAIN_ID, employee, employer};
use payroll::domain::{PayrollError, SessionError, WalletHandle, short_address};
use payroll::port::WalletConnector;

#[test]
fn test_clones_share_one_lifecycle() {
    let handle = WalletHandle::new(employee(), CHAIN_ID);
    let clone = handle.clone();

    clone.disconnect();

    assert!(!handle.is_live());
    assert_eq!(handle.address(), Err(SessionError::Disconnected));
    assert_eq!(
        handle.verify_expected(Some(&employee().to_string())),
        Err(SessionError::Disconnected)
    );
}

#[test]
fn test_separate_sessions_are_independent() {
    let first = WalletHandle::new(employee(), CHAIN_ID);
    let second = WalletHandle::new(employee(), CHAIN_ID);
    first.disconnect();
    assert!(second.is_live());
}

#[test]
fn test_mismatch_reports_abbreviated_address() {
    let handle = WalletHandle::new(employer(), CHAIN_ID);
    let expected = employee().to_string();

    match handle.verify_expected(Some(&expected)) {
        Err(SessionError::WalletMismatch {
            expected: reported,
            connected,
        }) => {
            assert_eq!(reported, expected);
            assert_eq!(connected, short_address(&employer().to_string()));
            assert!(connected.contains("..."));
        }
        other => panic!("Expected mismatch, got {other:?}"),
    }
}

#[test]
fn test_no_expected_wallet_accepts_any() {
    let handle = WalletHandle::new(employer(), CHAIN_ID);
    assert!(handle.verify_expected(None).is_ok());
}

#[test]
fn test_short_address_format() {
    let address = "0x1234567890abcdef1234567890abcdef12345678";
    assert_eq!(short_address(address), "0x12345678...12345678");
    assert_eq!(short_address("0xabc"), "0xabc");
}

#[tokio::test]
async fn test_connector_disconnect_invalidates_handle() {
    let ctx = crate::context::TestContext::new().await;

    assert_eq!(
        ctx.chain.connect().await.unwrap_err(),
        PayrollError::Session(SessionError::NoAccounts)
    );

    ctx.chain.set_connected_account(employee()).await;
    let handle = ctx.chain.connect().await.unwrap();
    assert_eq!(handle.address().unwrap(), employee());
    assert_eq!(handle.chain_id(), CHAIN_ID);

    ctx.chain.disconnect(&handle).await.unwrap();
    assert!(!handle.is_live());
}
