use super::super::codec::render_number;
use super::super::family::{NumberKind, Predicate, RuleFamily};
use super::kernel::MiningFloors;

/// Search space and acceptance policy for one rule family.
#[derive(Debug)]
pub struct FamilyGrid {
    pub family: RuleFamily,
    pub axes: &'static [&'static [&'static [f64]]],
    pub floors: MiningFloors,
    /// Confidence at which the mined rule suggests a hard decline.
    pub hard_decline_at: Option<f64>,
}

const STRICT: MiningFloors = MiningFloors {
    min_support: 2,
    min_confidence: 0.8,
};

const SEGMENT: MiningFloors = MiningFloors {
    min_support: 10,
    min_confidence: 0.7,
};

static MANY_30D_LATES: FamilyGrid = FamilyGrid {
    family: RuleFamily::Many30dLates,
    axes: &[&[&[1.0], &[2.0], &[3.0], &[4.0], &[5.0]]],
    floors: STRICT,
    hard_decline_at: Some(0.98),
};

static HIGH_SCORE_LOW_DTI: FamilyGrid = FamilyGrid {
    family: RuleFamily::HighScoreLowDti,
    axes: &[
        &[
            &[720.0],
            &[740.0],
            &[760.0],
            &[780.0],
            &[800.0],
            &[820.0],
            &[840.0],
        ],
        &[&[0.25], &[0.30], &[0.35], &[0.40]],
    ],
    floors: STRICT,
    hard_decline_at: None,
};

static LOW_SCORE_HIGH_DTI: FamilyGrid = FamilyGrid {
    family: RuleFamily::LowScoreHighDti,
    axes: &[
        &[&[580.0], &[600.0], &[620.0], &[640.0]],
        &[&[0.40], &[0.45], &[0.50], &[0.55]],
    ],
    floors: SEGMENT,
    hard_decline_at: Some(0.95),
};

static HIGH_UTILIZATION_MANY_REVOLVING: FamilyGrid = FamilyGrid {
    family: RuleFamily::HighUtilizationManyRevolving,
    axes: &[
        &[&[0.50], &[0.60], &[0.70], &[0.80]],
        &[&[3.0], &[4.0], &[5.0], &[6.0]],
    ],
    floors: SEGMENT,
    hard_decline_at: Some(0.95),
};

static LOW_UTILIZATION_MODERATE_REVOLVING: FamilyGrid = FamilyGrid {
    family: RuleFamily::LowUtilizationModerateRevolving,
    axes: &[
        &[&[0.20], &[0.25], &[0.30], &[0.35]],
        &[&[2.0, 5.0], &[3.0, 6.0], &[4.0, 8.0]],
    ],
    floors: SEGMENT,
    hard_decline_at: None,
};

static LONG_HISTORY_CLEAN_FILE: FamilyGrid = FamilyGrid {
    family: RuleFamily::LongHistoryCleanFile,
    axes: &[&[&[5.0], &[7.0], &[10.0], &[12.0]]],
    floors: SEGMENT,
    hard_decline_at: None,
};

// Thin-file outcomes are noisier, so the confidence floor is looser.
static THIN_FILE_FEW_TRADELINES: FamilyGrid = FamilyGrid {
    family: RuleFamily::ThinFileFewTradelines,
    axes: &[&[&[0.0], &[1.0], &[2.0], &[3.0]], &[&[1.0], &[2.0], &[3.0]]],
    floors: MiningFloors {
        min_support: 10,
        min_confidence: 0.6,
    },
    hard_decline_at: None,
};

pub fn grid(family: RuleFamily) -> &'static FamilyGrid {
    match family {
        RuleFamily::Many30dLates => &MANY_30D_LATES,
        RuleFamily::HighScoreLowDti => &HIGH_SCORE_LOW_DTI,
        RuleFamily::LowScoreHighDti => &LOW_SCORE_HIGH_DTI,
        RuleFamily::HighUtilizationManyRevolving => &HIGH_UTILIZATION_MANY_REVOLVING,
        RuleFamily::LowUtilizationModerateRevolving => &LOW_UTILIZATION_MODERATE_REVOLVING,
        RuleFamily::LongHistoryCleanFile => &LONG_HISTORY_CLEAN_FILE,
        RuleFamily::ThinFileFewTradelines => &THIN_FILE_FEW_TRADELINES,
    }
}

fn int(value: f64) -> String {
    render_number(NumberKind::Integer, value)
}

fn dec(value: f64) -> String {
    render_number(NumberKind::Decimal, value)
}

pub(crate) fn rule_name(predicate: &Predicate) -> String {
    match (predicate.family(), predicate.thresholds()) {
        (RuleFamily::Many30dLates, [lates]) => {
            format!("{}+ recent 30-day delinquencies", int(*lates))
        }
        (RuleFamily::HighScoreLowDti, [score, dti]) => {
            format!("Score >= {} & DTI <= {}", int(*score), dec(*dti))
        }
        (RuleFamily::LowScoreHighDti, [score, dti]) => {
            format!("Score <= {} & DTI >= {} -> decline", int(*score), dec(*dti))
        }
        (RuleFamily::HighUtilizationManyRevolving, [utilization, accounts]) => format!(
            "Utilization >= {} & {}+ revolving accounts -> decline",
            dec(*utilization),
            int(*accounts)
        ),
        (RuleFamily::LowUtilizationModerateRevolving, [utilization, low, high]) => format!(
            "Utilization <= {}, {}-{} revolving accounts -> approve",
            dec(*utilization),
            int(*low),
            int(*high)
        ),
        (RuleFamily::LongHistoryCleanFile, [years]) => {
            format!("History >= {} years, clean file -> approve", int(*years))
        }
        (RuleFamily::ThinFileFewTradelines, [tradelines, years]) => format!(
            "Thin file: <= {} tradelines & history <= {} years -> decline",
            int(*tradelines),
            int(*years)
        ),
        (family, _) => family.id().to_string(),
    }
}

pub(crate) fn rule_description(predicate: &Predicate) -> Option<String> {
    let text = match (predicate.family(), predicate.thresholds()) {
        (RuleFamily::Many30dLates, [lates]) => format!(
            "Historically associated with declines when applicants have {} or more 30-day late \
             payments in the last 12 months.",
            int(*lates)
        ),
        (RuleFamily::HighScoreLowDti, [score, dti]) => format!(
            "Historically associated with approvals when applicants have a credit score at or \
             above {} and a debt-to-income ratio at or below {}.",
            int(*score),
            dec(*dti)
        ),
        (RuleFamily::LowScoreHighDti, [score, dti]) => format!(
            "Historically associated with declines when applicants have a low credit score \
             (<= {}) and a high debt-to-income ratio (>= {}).",
            int(*score),
            dec(*dti)
        ),
        (RuleFamily::HighUtilizationManyRevolving, [utilization, accounts]) => format!(
            "Historically associated with declines when applicants have high revolving \
             utilization (>= {}) and at least {} revolving accounts.",
            dec(*utilization),
            int(*accounts)
        ),
        (RuleFamily::LowUtilizationModerateRevolving, [utilization, low, high]) => format!(
            "Historically associated with approvals when applicants hold {}-{} revolving \
             accounts with utilization at or below {}.",
            int(*low),
            int(*high),
            dec(*utilization)
        ),
        (RuleFamily::LongHistoryCleanFile, [years]) => format!(
            "Historically associated with approvals when applicants have at least {} years of \
             credit history, no 60/90-day delinquencies in 24 months, and no bankruptcy or \
             foreclosure in 7 years.",
            int(*years)
        ),
        (RuleFamily::ThinFileFewTradelines, [tradelines, years]) => format!(
            "Historically associated with declines when applicants have at most {} open \
             tradelines and at most {} years of credit history.",
            int(*tradelines),
            int(*years)
        ),
        _ => return None,
    };
    Some(text)
}
