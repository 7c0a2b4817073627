//! Entitlement evaluator scenarios.

use chrono::NaiveDate;
use studio_core::{AccountUsage, Plan};
use studio_quota::{Decision, DenialReason, PlanPolicy, PolicyTable, evaluate};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
}

fn yesterday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()
}

fn free_with(tokens: u32) -> AccountUsage {
    AccountUsage {
        lifetime_tokens_used: tokens,
        last_reset_date: Some(today()),
        ..AccountUsage::new_free()
    }
}

#[test]
fn test_free_token_limit_reports_remaining() {
    let eval = evaluate(&free_with(290), &PlanPolicy::free(), today(), 15);

    assert_eq!(
        eval.decision,
        Decision::Denied {
            reason: DenialReason::TokenLimitExceeded,
            remaining_tokens: 10,
        }
    );
}

#[test]
fn test_free_full_word_allowance_permitted() {
    let eval = evaluate(&free_with(0), &PlanPolicy::free(), today(), 150);

    match eval.decision {
        Decision::Permitted { updated } => {
            assert_eq!(updated.lifetime_tokens_used, 150);
            assert_eq!(updated.daily_generation_count, 1);
        }
        other => panic!("expected permit, got {:?}", other),
    }
}

#[test]
fn test_free_word_limit_ignores_token_headroom() {
    let eval = evaluate(&free_with(0), &PlanPolicy::free(), today(), 151);
    assert_eq!(eval.denial(), Some(DenialReason::WordLimitExceeded));

    for used in [0, 100, 149, 299, 300] {
        let eval = evaluate(&free_with(used), &PlanPolicy::free(), today(), 500);
        assert_eq!(
            eval.denial(),
            Some(DenialReason::WordLimitExceeded),
            "used = {}",
            used
        );
    }
}

#[test]
fn test_paid_exhausted_account_denied() {
    let usage = AccountUsage {
        plan: Plan::Paid,
        lifetime_tokens_used: 800,
        last_reset_date: Some(today()),
        ..AccountUsage::new_free()
    };

    for words in [1, 10, 400] {
        let eval = evaluate(&usage, &PlanPolicy::paid(), today(), words);
        assert_eq!(
            eval.decision,
            Decision::Denied {
                reason: DenialReason::TokenLimitExceeded,
                remaining_tokens: 0,
            }
        );
    }
}

#[test]
fn test_paid_has_no_word_cap() {
    let usage = AccountUsage {
        plan: Plan::Paid,
        ..AccountUsage::new_free()
    };
    let eval = evaluate(&usage, &PlanPolicy::paid(), today(), 700);
    assert!(eval.is_permitted());
    assert_eq!(eval.projected().lifetime_tokens_used, 700);
}

#[test]
fn test_rollover_resets_before_daily_check() {
    let usage = AccountUsage {
        daily_generation_count: 2,
        last_reset_date: Some(yesterday()),
        ..AccountUsage::new_free()
    };

    let eval = evaluate(&usage, &PlanPolicy::free(), today(), 10);

    assert!(eval.rollover);
    assert_eq!(eval.counters.daily_generation_count, 0);
    assert_eq!(eval.counters.last_reset_date, Some(today()));
    assert!(eval.is_permitted());
    assert_eq!(eval.projected().daily_generation_count, 1);
}

#[test]
fn test_rollover_reported_even_when_denied() {
    let usage = AccountUsage {
        lifetime_tokens_used: 300,
        daily_generation_count: 1,
        last_reset_date: Some(yesterday()),
        ..AccountUsage::new_free()
    };

    let eval = evaluate(&usage, &PlanPolicy::free(), today(), 5);

    assert_eq!(eval.denial(), Some(DenialReason::TokenLimitExceeded));
    assert!(eval.rollover);
    assert_eq!(eval.counters.daily_generation_count, 0);
    assert_eq!(eval.counters.last_reset_date, Some(today()));
    assert_eq!(eval.counters.lifetime_tokens_used, 300);
}

#[test]
fn test_first_generation_sets_reset_date() {
    let eval = evaluate(&AccountUsage::new_free(), &PlanPolicy::free(), today(), 3);
    assert!(eval.rollover);
    assert_eq!(eval.projected().last_reset_date, Some(today()));
}

#[test]
fn test_same_day_has_no_rollover() {
    let usage = AccountUsage {
        daily_generation_count: 1,
        ..free_with(20)
    };
    let eval = evaluate(&usage, &PlanPolicy::free(), today(), 3);
    assert!(!eval.rollover);
    assert_eq!(eval.counters, usage);
}

#[test]
fn test_daily_limit_is_retryable() {
    let usage = AccountUsage {
        daily_generation_count: 2,
        ..free_with(0)
    };
    let eval = evaluate(&usage, &PlanPolicy::free(), today(), 1);
    let reason = eval.denial().unwrap();

    assert_eq!(reason, DenialReason::DailyLimitExceeded);
    assert!(reason.is_retryable());
    assert!(reason.limit_reached());
}

#[test]
fn test_evaluation_is_idempotent() {
    let usage = AccountUsage {
        lifetime_tokens_used: 120,
        daily_generation_count: 1,
        last_reset_date: Some(yesterday()),
        ..AccountUsage::new_free()
    };
    let policy = PlanPolicy::free();

    let first = evaluate(&usage, &policy, today(), 40);
    let second = evaluate(&usage, &policy, today(), 40);

    assert_eq!(first, second);
}

#[test]
fn test_permit_never_exceeds_lifetime_cap() {
    let table = PolicyTable::default();

    for plan in [Plan::Free, Plan::Paid] {
        let policy = table.for_plan(plan);
        for used in (0..=policy.max_lifetime_tokens).step_by(37) {
            for words in [0, 1, 13, 75, 150, 151, 400, 801] {
                let usage = AccountUsage {
                    plan,
                    lifetime_tokens_used: used,
                    ..AccountUsage::new_free()
                };
                let eval = evaluate(&usage, policy, today(), words);
                if let Decision::Permitted { updated } = eval.decision {
                    assert!(updated.lifetime_tokens_used <= policy.max_lifetime_tokens);
                    assert_eq!(updated.lifetime_tokens_used, used + words);
                }
            }
        }
    }
}

#[test]
fn test_check_order_daily_word_token() {
    let policy = PlanPolicy::free();

    // Every limit fails: daily wins.
    let all_bad = AccountUsage {
        lifetime_tokens_used: 300,
        daily_generation_count: 2,
        last_reset_date: Some(today()),
        ..AccountUsage::new_free()
    };
    assert_eq!(
        evaluate(&all_bad, &policy, today(), 200).denial(),
        Some(DenialReason::DailyLimitExceeded)
    );

    // Word and token fail: word wins.
    assert_eq!(
        evaluate(&free_with(300), &policy, today(), 200).denial(),
        Some(DenialReason::WordLimitExceeded)
    );
}
