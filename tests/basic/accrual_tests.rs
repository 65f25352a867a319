use crate::context::tokens;
use alloy_primitives::U256;
use payroll::domain::{
    AccrualPreview, ClaimableSource, MonthlyRate, Reading, StreamState, TokenAmount, accrue,
    claimable_at, monthly_projection,
};

fn stream(rate: u64, last: u64, accrued: u64, active: bool) -> StreamState {
    StreamState {
        rate_per_second: U256::from(rate),
        last_withdraw_time: last,
        accrued_balance: U256::from(accrued),
        is_active: active,
    }
}

#[test]
fn test_active_stream_adds_rate_times_elapsed() {
    let s = stream(250, 1_000, 40, true);
    assert_eq!(claimable_at(&s, 1_100).wei(), U256::from(40 + 250 * 100));
}

#[test]
fn test_inactive_stream_returns_accrued_only() {
    let s = stream(250, 1_000, 40, false);
    assert_eq!(claimable_at(&s, 5_000).wei(), U256::from(40u64));
}

#[test]
fn test_negative_elapsed_is_clamped() {
    let accrued = U256::from(77u64);
    assert_eq!(accrue(accrued, U256::from(9u64), -5, true), accrued);

    let s = stream(9, 2_000, 77, true);
    assert_eq!(claimable_at(&s, 1_995).wei(), accrued);
}

#[test]
fn test_monthly_projection_of_small_rate() {
    let rate = tokens("0.0001").wei();
    match monthly_projection(rate) {
        MonthlyRate::Projected(amount) => assert_eq!(amount.to_token_string(), "259.2"),
        MonthlyRate::NoActiveRate => panic!("Expected a projected amount"),
    }
}

#[test]
fn test_zero_rate_is_its_own_state() {
    assert_eq!(monthly_projection(U256::ZERO), MonthlyRate::NoActiveRate);

    let preview = AccrualPreview::compute(
        Reading::Known(stream(0, 0, 0, true)),
        Reading::Unknown,
        100,
    );
    assert_eq!(preview.monthly_label(6, "HLUSD"), "no active rate");
}

#[test]
fn test_unknown_renders_differently_from_zero() {
    let unknown = AccrualPreview::unknown();
    let zero = AccrualPreview::compute(
        Reading::Known(stream(0, 0, 0, false)),
        Reading::Known(TokenAmount::ZERO),
        100,
    );

    assert_eq!(unknown.claimable_label(6, "HLUSD"), "unknown");
    assert_eq!(zero.claimable_label(6, "HLUSD"), "0.000000 HLUSD");
    assert_ne!(unknown.claimable, zero.claimable);
}

#[test]
fn test_local_recomputation_when_oracle_fails() {
    let preview = AccrualPreview::compute(
        Reading::Known(stream(3, 100, 1, true)),
        Reading::Unknown,
        110,
    );
    assert_eq!(preview.source, ClaimableSource::Local);
    assert_eq!(
        preview.claimable,
        Reading::Known(TokenAmount::from_wei(U256::from(31u64)))
    );
}

#[test]
fn test_nothing_readable_is_unknown() {
    let preview = AccrualPreview::compute(Reading::Unknown, Reading::Unknown, 110);
    assert_eq!(preview, AccrualPreview::unknown());
}

#[test]
fn test_snapshot_claimable_matches_accrue() {
    for (rate, last, accrued, active, now) in [
        (250, 1_000, 40, true, 1_100),
        (250, 1_000, 40, false, 1_100),
        (9, 2_000, 77, true, 1_995),
        (u64::MAX, 0, u64::MAX, true, i64::MAX),
    ] {
        let s = stream(rate, last, accrued, active);
        let elapsed = now - last as i64;
        assert_eq!(
            claimable_at(&s, now).wei(),
            accrue(U256::from(accrued), U256::from(rate), elapsed, active)
        );
    }
}
