//! Canonical text form of a [`Predicate`].
//!
//! Clauses are rendered in slot order followed by any fixed clauses, joined with ` and `.
//! Integers print without a decimal point, decimals with exactly two places, and flags as
//! `true`/`false`. [`decode`] accepts only text of that exact shape for the given family.

use super::family::{NumberKind, Predicate, RuleFamily, Slot};

const CONJUNCTION: &str = " and ";

/// Failure to build or decode a predicate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("{family} expects {expected} threshold(s), found {found}")]
    Arity {
        family: RuleFamily,
        expected: usize,
        found: usize,
    },
    #[error("{family} cannot use {value} as a threshold for {feature}")]
    Threshold {
        family: RuleFamily,
        feature: &'static str,
        value: f64,
    },
    #[error("malformed {family} expression '{expression}': {reason}")]
    MalformedExpression {
        family: RuleFamily,
        expression: String,
        reason: String,
    },
}

pub fn encode(predicate: &Predicate) -> String {
    predicate
        .clauses()
        .map(|(slot, threshold)| render_clause(slot, threshold))
        .collect::<Vec<_>>()
        .join(CONJUNCTION)
}

pub fn decode(family: RuleFamily, expression: &str) -> Result<Predicate, CodecError> {
    let malformed = |reason: String| CodecError::MalformedExpression {
        family,
        expression: expression.to_string(),
        reason,
    };

    let shape = family.shape();
    let parts: Vec<&str> = expression.trim().split(CONJUNCTION).collect();
    let expected = shape.slots.len() + shape.fixed.len();
    if parts.len() != expected {
        return Err(malformed(format!(
            "expected {expected} clause(s), found {}",
            parts.len()
        )));
    }

    let mut thresholds = Vec::with_capacity(shape.slots.len());
    for (index, part) in parts.iter().enumerate() {
        let (slot, fixed) = match shape.slots.get(index) {
            Some(slot) => (*slot, None),
            None => {
                let clause = shape.fixed[index - shape.slots.len()];
                (clause.slot, Some(clause.value))
            }
        };

        let value = parse_clause(slot, part).map_err(malformed)?;
        match fixed {
            Some(required) if value != required => {
                return Err(malformed(format!(
                    "clause '{}' must read '{}'",
                    part.trim(),
                    render_clause(slot, required)
                )));
            }
            Some(_) => {}
            None => thresholds.push(value),
        }
    }

    Predicate::new(family, thresholds).map_err(|err| malformed(err.to_string()))
}

pub(crate) fn render_number(kind: NumberKind, value: f64) -> String {
    match kind {
        NumberKind::Integer => format!("{}", value as i64),
        NumberKind::Decimal => format!("{value:.2}"),
        NumberKind::Flag => {
            if value == 0.0 {
                "false".to_string()
            } else {
                "true".to_string()
            }
        }
    }
}

fn render_clause(slot: Slot, threshold: f64) -> String {
    format!(
        "{} {} {}",
        slot.feature.name(),
        slot.comparison.token(),
        render_number(slot.kind, threshold)
    )
}

fn parse_clause(slot: Slot, clause: &str) -> Result<f64, String> {
    let tokens: Vec<&str> = clause.split_whitespace().collect();
    let [feature, comparator, literal] = tokens.as_slice() else {
        return Err(format!("clause '{}' is not '<feature> <op> <value>'", clause.trim()));
    };

    if *feature != slot.feature.name() {
        return Err(format!(
            "expected feature '{}', found '{feature}'",
            slot.feature.name()
        ));
    }
    if *comparator != slot.comparison.token() {
        return Err(format!(
            "expected '{}' for {}, found '{comparator}'",
            slot.comparison.token(),
            slot.feature.name()
        ));
    }

    parse_number(slot.kind, literal)
        .ok_or_else(|| format!("'{literal}' is not a valid value for {}", slot.feature.name()))
}

fn parse_number(kind: NumberKind, literal: &str) -> Option<f64> {
    match kind {
        NumberKind::Integer => literal.parse::<u32>().ok().map(f64::from),
        NumberKind::Decimal => {
            let (whole, fraction) = literal.split_once('.')?;
            let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
            if !digits(whole) || !digits(fraction) || fraction.len() != 2 {
                return None;
            }
            literal.parse::<f64>().ok()
        }
        NumberKind::Flag => match literal {
            "false" => Some(0.0),
            "true" => Some(1.0),
            _ => None,
        },
    }
}
