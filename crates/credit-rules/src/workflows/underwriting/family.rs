use serde::{Deserialize, Serialize};

use super::codec::CodecError;
use super::domain::{LoanApplication, Outcome};

/// Closed set of rule families the miner can discover and the evaluator can replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleFamily {
    #[serde(rename = "many_30d_lates")]
    Many30dLates,
    #[serde(rename = "high_score_low_dti")]
    HighScoreLowDti,
    #[serde(rename = "low_score_high_dti")]
    LowScoreHighDti,
    #[serde(rename = "high_utilization_many_revolving")]
    HighUtilizationManyRevolving,
    #[serde(rename = "low_utilization_moderate_revolving")]
    LowUtilizationModerateRevolving,
    #[serde(rename = "long_history_clean_file")]
    LongHistoryCleanFile,
    #[serde(rename = "thin_file_few_tradelines")]
    ThinFileFewTradelines,
}

impl RuleFamily {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Many30dLates,
            Self::HighScoreLowDti,
            Self::LowScoreHighDti,
            Self::HighUtilizationManyRevolving,
            Self::LowUtilizationModerateRevolving,
            Self::LongHistoryCleanFile,
            Self::ThinFileFewTradelines,
        ]
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::Many30dLates => "many_30d_lates",
            Self::HighScoreLowDti => "high_score_low_dti",
            Self::LowScoreHighDti => "low_score_high_dti",
            Self::HighUtilizationManyRevolving => "high_utilization_many_revolving",
            Self::LowUtilizationModerateRevolving => "low_utilization_moderate_revolving",
            Self::LongHistoryCleanFile => "long_history_clean_file",
            Self::ThinFileFewTradelines => "thin_file_few_tradelines",
        }
    }

    pub fn from_id(value: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|family| family.id() == value.trim())
    }

    pub fn shape(self) -> &'static FamilyShape {
        match self {
            Self::Many30dLates => &MANY_30D_LATES,
            Self::HighScoreLowDti => &HIGH_SCORE_LOW_DTI,
            Self::LowScoreHighDti => &LOW_SCORE_HIGH_DTI,
            Self::HighUtilizationManyRevolving => &HIGH_UTILIZATION_MANY_REVOLVING,
            Self::LowUtilizationModerateRevolving => &LOW_UTILIZATION_MODERATE_REVOLVING,
            Self::LongHistoryCleanFile => &LONG_HISTORY_CLEAN_FILE,
            Self::ThinFileFewTradelines => &THIN_FILE_FEW_TRADELINES,
        }
    }

    pub fn target(self) -> Outcome {
        self.shape().target
    }
}

impl std::fmt::Display for RuleFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Application attributes a rule clause can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    CreditScore,
    DtiRatio,
    CreditHistoryLengthYears,
    NumOpenTradelines,
    NumRevolvingAccounts,
    RevolvingUtilizationPct,
    Num30dLateLast12m,
    Num60dLateLast24m,
    Num90dLateLast24m,
    BankruptcyLast7yFlag,
    ForeclosureLast7yFlag,
}

impl Feature {
    pub const fn name(self) -> &'static str {
        match self {
            Self::CreditScore => "credit_score",
            Self::DtiRatio => "dti_ratio",
            Self::CreditHistoryLengthYears => "credit_history_length_years",
            Self::NumOpenTradelines => "num_open_tradelines",
            Self::NumRevolvingAccounts => "num_revolving_accounts",
            Self::RevolvingUtilizationPct => "revolving_utilization_pct",
            Self::Num30dLateLast12m => "num_30d_late_last_12m",
            Self::Num60dLateLast24m => "num_60d_late_last_24m",
            Self::Num90dLateLast24m => "num_90d_late_last_24m",
            Self::BankruptcyLast7yFlag => "bankruptcy_last_7y_flag",
            Self::ForeclosureLast7yFlag => "foreclosure_last_7y_flag",
        }
    }

    /// Numeric view of the feature; flags map to 0 and 1.
    pub fn value(self, application: &LoanApplication) -> f64 {
        match self {
            Self::CreditScore => f64::from(application.credit_score),
            Self::DtiRatio => application.dti_ratio,
            Self::CreditHistoryLengthYears => application.credit_history_length_years,
            Self::NumOpenTradelines => f64::from(application.num_open_tradelines),
            Self::NumRevolvingAccounts => f64::from(application.num_revolving_accounts),
            Self::RevolvingUtilizationPct => application.revolving_utilization_pct,
            Self::Num30dLateLast12m => f64::from(application.num_30d_late_last_12m),
            Self::Num60dLateLast24m => f64::from(application.num_60d_late_last_24m),
            Self::Num90dLateLast24m => f64::from(application.num_90d_late_last_24m),
            Self::BankruptcyLast7yFlag => flag(application.bankruptcy_last_7y_flag),
            Self::ForeclosureLast7yFlag => flag(application.foreclosure_last_7y_flag),
        }
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    AtLeast,
    AtMost,
    Equal,
}

impl Comparison {
    pub const fn token(self) -> &'static str {
        match self {
            Self::AtLeast => ">=",
            Self::AtMost => "<=",
            Self::Equal => "==",
        }
    }

    pub const fn negated_token(self) -> &'static str {
        match self {
            Self::AtLeast => "<",
            Self::AtMost => ">",
            Self::Equal => "!=",
        }
    }

    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::AtLeast => value >= threshold,
            Self::AtMost => value <= threshold,
            Self::Equal => value == threshold,
        }
    }
}

/// How a threshold is written in an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Integer,
    Decimal,
    Flag,
}

/// One searched position of a family's conjunction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub feature: Feature,
    pub comparison: Comparison,
    pub kind: NumberKind,
}

/// Clause that is part of the family but never searched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClause {
    pub slot: Slot,
    pub value: f64,
}

#[derive(Debug)]
pub struct FamilyShape {
    pub target: Outcome,
    pub slots: &'static [Slot],
    pub fixed: &'static [FixedClause],
}

const fn slot(feature: Feature, comparison: Comparison, kind: NumberKind) -> Slot {
    Slot {
        feature,
        comparison,
        kind,
    }
}

static MANY_30D_LATES: FamilyShape = FamilyShape {
    target: Outcome::Decline,
    slots: &[slot(
        Feature::Num30dLateLast12m,
        Comparison::AtLeast,
        NumberKind::Integer,
    )],
    fixed: &[],
};

static HIGH_SCORE_LOW_DTI: FamilyShape = FamilyShape {
    target: Outcome::Approve,
    slots: &[
        slot(Feature::CreditScore, Comparison::AtLeast, NumberKind::Integer),
        slot(Feature::DtiRatio, Comparison::AtMost, NumberKind::Decimal),
    ],
    fixed: &[],
};

static LOW_SCORE_HIGH_DTI: FamilyShape = FamilyShape {
    target: Outcome::Decline,
    slots: &[
        slot(Feature::CreditScore, Comparison::AtMost, NumberKind::Integer),
        slot(Feature::DtiRatio, Comparison::AtLeast, NumberKind::Decimal),
    ],
    fixed: &[],
};

static HIGH_UTILIZATION_MANY_REVOLVING: FamilyShape = FamilyShape {
    target: Outcome::Decline,
    slots: &[
        slot(
            Feature::RevolvingUtilizationPct,
            Comparison::AtLeast,
            NumberKind::Decimal,
        ),
        slot(
            Feature::NumRevolvingAccounts,
            Comparison::AtLeast,
            NumberKind::Integer,
        ),
    ],
    fixed: &[],
};

static LOW_UTILIZATION_MODERATE_REVOLVING: FamilyShape = FamilyShape {
    target: Outcome::Approve,
    slots: &[
        slot(
            Feature::RevolvingUtilizationPct,
            Comparison::AtMost,
            NumberKind::Decimal,
        ),
        slot(
            Feature::NumRevolvingAccounts,
            Comparison::AtLeast,
            NumberKind::Integer,
        ),
        slot(
            Feature::NumRevolvingAccounts,
            Comparison::AtMost,
            NumberKind::Integer,
        ),
    ],
    fixed: &[],
};

static LONG_HISTORY_CLEAN_FILE: FamilyShape = FamilyShape {
    target: Outcome::Approve,
    slots: &[slot(
        Feature::CreditHistoryLengthYears,
        Comparison::AtLeast,
        NumberKind::Integer,
    )],
    fixed: &[
        FixedClause {
            slot: slot(
                Feature::Num60dLateLast24m,
                Comparison::Equal,
                NumberKind::Integer,
            ),
            value: 0.0,
        },
        FixedClause {
            slot: slot(
                Feature::Num90dLateLast24m,
                Comparison::Equal,
                NumberKind::Integer,
            ),
            value: 0.0,
        },
        FixedClause {
            slot: slot(
                Feature::BankruptcyLast7yFlag,
                Comparison::Equal,
                NumberKind::Flag,
            ),
            value: 0.0,
        },
        FixedClause {
            slot: slot(
                Feature::ForeclosureLast7yFlag,
                Comparison::Equal,
                NumberKind::Flag,
            ),
            value: 0.0,
        },
    ],
};

static THIN_FILE_FEW_TRADELINES: FamilyShape = FamilyShape {
    target: Outcome::Decline,
    slots: &[
        slot(
            Feature::NumOpenTradelines,
            Comparison::AtMost,
            NumberKind::Integer,
        ),
        slot(
            Feature::CreditHistoryLengthYears,
            Comparison::AtMost,
            NumberKind::Integer,
        ),
    ],
    fixed: &[],
};

/// A family tag plus the thresholds for each of its searched slots, in slot order.
///
/// Only constructible through [`Predicate::new`], so every value matches its family shape.
/// Rules persist it as a `RulePredicate`; the text expression is derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    family: RuleFamily,
    thresholds: Vec<f64>,
}

impl Predicate {
    pub fn new(family: RuleFamily, thresholds: Vec<f64>) -> Result<Self, CodecError> {
        let slots = family.shape().slots;
        if thresholds.len() != slots.len() {
            return Err(CodecError::Arity {
                family,
                expected: slots.len(),
                found: thresholds.len(),
            });
        }

        for (slot, value) in slots.iter().zip(&thresholds) {
            let representable = match slot.kind {
                NumberKind::Decimal => value.is_finite() && *value >= 0.0,
                NumberKind::Integer => value.is_finite() && *value >= 0.0 && value.fract() == 0.0,
                NumberKind::Flag => *value == 0.0 || *value == 1.0,
            };
            if !representable {
                return Err(CodecError::Threshold {
                    family,
                    feature: slot.feature.name(),
                    value: *value,
                });
            }
        }

        Ok(Self { family, thresholds })
    }

    pub fn family(&self) -> RuleFamily {
        self.family
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Every clause of the conjunction: searched slots first, then fixed clauses.
    pub fn clauses(&self) -> impl Iterator<Item = (Slot, f64)> + '_ {
        let shape = self.family.shape();
        shape
            .slots
            .iter()
            .copied()
            .zip(self.thresholds.iter().copied())
            .chain(shape.fixed.iter().map(|clause| (clause.slot, clause.value)))
    }

    pub fn matches(&self, application: &LoanApplication) -> bool {
        self.clauses().all(|(slot, threshold)| {
            slot.comparison
                .holds(slot.feature.value(application), threshold)
        })
    }
}
