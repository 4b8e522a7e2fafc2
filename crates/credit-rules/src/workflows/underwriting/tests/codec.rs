use super::common::*;

use crate::workflows::underwriting::codec::{decode, encode, CodecError};
use crate::workflows::underwriting::domain::{LoanApplication, Outcome};
use crate::workflows::underwriting::family::{Predicate, RuleFamily};
use crate::workflows::underwriting::mining::{grid, grid_candidates};

fn probes() -> Vec<LoanApplication> {
    vec![
        application("probe-neutral"),
        LoanApplication {
            credit_score: 600,
            dti_ratio: 0.50,
            revolving_utilization_pct: 0.75,
            num_revolving_accounts: 5,
            num_30d_late_last_12m: 3,
            num_open_tradelines: 2,
            credit_history_length_years: 1.5,
            ..manual("probe-subprime", Outcome::Decline)
        },
        LoanApplication {
            credit_score: 810,
            dti_ratio: 0.25,
            revolving_utilization_pct: 0.20,
            num_revolving_accounts: 4,
            credit_history_length_years: 11.0,
            ..manual("probe-prime", Outcome::Approve)
        },
        LoanApplication {
            credit_history_length_years: 14.0,
            bankruptcy_last_7y_flag: true,
            ..application("probe-bankrupt")
        },
    ]
}

#[test]
fn every_grid_point_decodes_to_an_equivalent_predicate() {
    let probes = probes();

    for family in RuleFamily::ordered() {
        for thresholds in grid_candidates(grid(family).axes) {
            let original = Predicate::new(family, thresholds).expect("grid point is representable");
            let expression = encode(&original);
            let decoded = decode(family, &expression)
                .unwrap_or_else(|err| panic!("{expression} failed to decode: {err}"));

            assert_eq!(encode(&decoded), expression);
            for probe in &probes {
                assert_eq!(
                    decoded.matches(probe),
                    original.matches(probe),
                    "{expression} disagrees on {}",
                    probe.application_id
                );
            }
        }
    }
}

#[test]
fn clean_file_clauses_are_enforced_after_decoding() {
    let expression = encode(&predicate(RuleFamily::LongHistoryCleanFile, &[10.0]));
    let decoded = decode(RuleFamily::LongHistoryCleanFile, &expression).expect("decodes");

    let clean = LoanApplication {
        credit_history_length_years: 14.0,
        ..application("clean")
    };
    let bankrupt = LoanApplication {
        bankruptcy_last_7y_flag: true,
        ..clean.clone()
    };

    assert!(decoded.matches(&clean));
    assert!(!decoded.matches(&bankrupt));
}

#[test]
fn altered_fixed_clause_is_malformed() {
    let expression = "credit_history_length_years >= 10 and num_60d_late_last_24m == 1 \
                      and num_90d_late_last_24m == 0 and bankruptcy_last_7y_flag == false \
                      and foreclosure_last_7y_flag == false";

    let err = decode(RuleFamily::LongHistoryCleanFile, expression).expect_err("fixed clause");
    assert!(matches!(err, CodecError::MalformedExpression { .. }));
}

#[test]
fn loose_number_formats_are_rejected() {
    for expression in [
        "credit_score >= 760.0 and dti_ratio <= 0.30",
        "credit_score >= 760 and dti_ratio <= 0.3",
        "credit_score >= 760 and dti_ratio <= .30",
        "credit_score >= -760 and dti_ratio <= 0.30",
        "credit_score >= 760 AND dti_ratio <= 0.30",
        "credit_score > 760 and dti_ratio <= 0.30",
        "",
    ] {
        assert!(
            decode(RuleFamily::HighScoreLowDti, expression).is_err(),
            "'{expression}' should not decode"
        );
    }
}
