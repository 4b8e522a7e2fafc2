use serde::{Deserialize, Serialize};
use tracing::warn;

use super::super::domain::{LoanApplication, Outcome};
use super::super::family::{Predicate, RuleFamily};

/// Minimum evidence a grid point needs before it can become a rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MiningFloors {
    pub min_support: usize,
    pub min_confidence: f64,
}

/// Grid point that cleared both floors.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPoint {
    pub predicate: Predicate,
    pub support: usize,
    pub confidence: f64,
}

/// Cartesian product of the axes, first axis outermost.
///
/// Each axis entry may bind several consecutive slots (a closed range binds two).
pub(crate) fn grid_candidates(axes: &[&[&[f64]]]) -> Vec<Vec<f64>> {
    axes.iter().fold(vec![Vec::new()], |prefixes, axis| {
        prefixes
            .iter()
            .flat_map(|prefix| {
                axis.iter().map(move |values| {
                    let mut point = prefix.clone();
                    point.extend_from_slice(values);
                    point
                })
            })
            .collect()
    })
}

/// Support and confidence of `predicate` over labeled applications.
pub(crate) fn measure(
    records: &[&LoanApplication],
    predicate: &Predicate,
    target: Outcome,
) -> (usize, f64) {
    let mut support = 0usize;
    let mut hits = 0usize;
    for record in records.iter().filter(|record| predicate.matches(record)) {
        support += 1;
        if record.manual_outcome() == Some(target) {
            hits += 1;
        }
    }

    if support == 0 {
        return (0, 0.0);
    }

    (support, hits as f64 / support as f64)
}

/// Every grid point of `family` that meets `floors`, in grid order.
pub fn accepted_points(
    records: &[&LoanApplication],
    family: RuleFamily,
    axes: &[&[&[f64]]],
    floors: MiningFloors,
) -> Vec<GridPoint> {
    let target = family.target();
    let mut accepted = Vec::new();

    for thresholds in grid_candidates(axes) {
        let predicate = match Predicate::new(family, thresholds) {
            Ok(predicate) => predicate,
            Err(err) => {
                warn!(%family, error = %err, "skipping unrepresentable grid point");
                continue;
            }
        };

        let (support, confidence) = measure(records, &predicate, target);
        if support == 0 || support < floors.min_support || confidence < floors.min_confidence {
            continue;
        }

        accepted.push(GridPoint {
            predicate,
            support,
            confidence,
        });
    }

    accepted
}

/// Highest confidence wins, then highest support; earlier points keep remaining ties.
pub fn select_best(points: Vec<GridPoint>) -> Option<GridPoint> {
    let mut best: Option<GridPoint> = None;
    for point in points {
        let replace = match &best {
            None => true,
            Some(current) => {
                point.confidence > current.confidence
                    || (point.confidence == current.confidence && point.support > current.support)
            }
        };
        if replace {
            best = Some(point);
        }
    }
    best
}

/// Signed score magnitude `round(confidence * 100)`, negative for decline targets.
pub fn score_from_confidence(confidence: f64, target: Outcome) -> f64 {
    let magnitude = (confidence * 100.0).round();
    match target {
        Outcome::Decline => -magnitude,
        Outcome::Approve => magnitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_iterates_outer_axis_first() {
        let axes: &[&[&[f64]]] = &[&[&[1.0], &[2.0]], &[&[10.0, 11.0], &[20.0, 21.0]]];
        let points = grid_candidates(axes);
        assert_eq!(
            points,
            vec![
                vec![1.0, 10.0, 11.0],
                vec![1.0, 20.0, 21.0],
                vec![2.0, 10.0, 11.0],
                vec![2.0, 20.0, 21.0],
            ]
        );
    }

    #[test]
    fn score_sign_follows_target() {
        assert_eq!(score_from_confidence(0.876, Outcome::Decline), -88.0);
        assert_eq!(score_from_confidence(0.876, Outcome::Approve), 88.0);
        assert_eq!(score_from_confidence(1.0, Outcome::Approve), 100.0);
    }

    fn point(threshold: f64, support: usize, confidence: f64) -> GridPoint {
        GridPoint {
            predicate: Predicate::new(RuleFamily::Many30dLates, vec![threshold])
                .expect("valid predicate"),
            support,
            confidence,
        }
    }

    #[test]
    fn selection_prefers_confidence_then_support_then_order() {
        let best = select_best(vec![
            point(1.0, 10, 0.8),
            point(2.0, 6, 0.9),
            point(3.0, 8, 0.9),
            point(4.0, 8, 0.9),
        ])
        .expect("a point is selected");
        assert_eq!(best.predicate.thresholds(), &[3.0]);
    }

    #[test]
    fn selection_of_nothing_is_none() {
        assert!(select_best(Vec::new()).is_none());
    }
}
