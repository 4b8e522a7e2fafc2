use tracing::warn;

use super::super::codec::{decode, render_number};
use super::super::domain::LoanApplication;
use super::super::family::{NumberKind, Predicate};
use super::super::profile::{FamilyRef, Rule};
use super::RuleEvaluation;

/// Replay one rule against one application.
///
/// Rules that cannot be resolved to a predicate never fire; the reason lands in
/// `match_details` instead of propagating.
pub(crate) fn evaluate_rule(
    rule: &Rule,
    application: &LoanApplication,
    weight_override: f64,
) -> RuleEvaluation {
    let family = match &rule.family_id {
        FamilyRef::Known(family) => *family,
        FamilyRef::Unregistered(tag) => {
            warn!(rule_id = %rule.id, family_id = %tag, "no evaluator registered for family");
            return not_fired(
                rule,
                format!("No evaluator registered for family_id={tag}."),
            );
        }
    };

    let predicate = match &rule.predicate {
        Some(stored) => match stored.resolve() {
            Ok(predicate) if predicate.family() == family => predicate,
            Ok(predicate) => {
                warn!(
                    rule_id = %rule.id,
                    %family,
                    predicate_family = %predicate.family(),
                    "predicate family mismatch"
                );
                return not_fired(
                    rule,
                    format!(
                        "Predicate family {} does not match rule family {family}.",
                        predicate.family()
                    ),
                );
            }
            Err(err) => {
                warn!(rule_id = %rule.id, error = %err, "rule predicate is invalid");
                return not_fired(rule, format!("Invalid predicate: {err}"));
            }
        },
        None => match decode(family, &rule.expression) {
            Ok(predicate) => predicate,
            Err(err) => {
                warn!(rule_id = %rule.id, error = %err, "rule expression could not be decoded");
                return not_fired(rule, format!("Failed to decode expression: {err}"));
            }
        },
    };

    let fired = predicate.matches(application);
    if !fired {
        return RuleEvaluation {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            fired: false,
            rule_score: 0.0,
            match_details: Some(describe_misses(&predicate, application)),
            decline_reason_codes: Vec::new(),
        };
    }

    let rule_score = rule.base_score * weight_override;
    let decline_reason_codes = if rule_score < 0.0 {
        rule.aligned_reason_codes.clone()
    } else {
        Vec::new()
    };

    RuleEvaluation {
        rule_id: rule.id.clone(),
        rule_name: rule.name.clone(),
        fired: true,
        rule_score,
        match_details: Some(describe_hits(&predicate, application)),
        decline_reason_codes,
    }
}

fn not_fired(rule: &Rule, details: String) -> RuleEvaluation {
    RuleEvaluation {
        rule_id: rule.id.clone(),
        rule_name: rule.name.clone(),
        fired: false,
        rule_score: 0.0,
        match_details: Some(details),
        decline_reason_codes: Vec::new(),
    }
}

/// Observed values print like thresholds, except integral slots over fractional features.
fn observed(kind: NumberKind, value: f64) -> String {
    match kind {
        NumberKind::Integer if value.fract() != 0.0 => format!("{value:.2}"),
        _ => render_number(kind, value),
    }
}

fn describe_hits(predicate: &Predicate, application: &LoanApplication) -> String {
    predicate
        .clauses()
        .map(|(slot, threshold)| {
            let value = slot.feature.value(application);
            format!(
                "{}={} {} {}",
                slot.feature.name(),
                observed(slot.kind, value),
                slot.comparison.token(),
                render_number(slot.kind, threshold)
            )
        })
        .collect::<Vec<_>>()
        .join(" and ")
}

fn describe_misses(predicate: &Predicate, application: &LoanApplication) -> String {
    predicate
        .clauses()
        .filter_map(|(slot, threshold)| {
            let value = slot.feature.value(application);
            if slot.comparison.holds(value, threshold) {
                return None;
            }
            Some(format!(
                "{}={} {} {}",
                slot.feature.name(),
                observed(slot.kind, value),
                slot.comparison.negated_token(),
                render_number(slot.kind, threshold)
            ))
        })
        .collect::<Vec<_>>()
        .join(" or ")
}
