//! Analysis overlay: evaluation bar, candidate-move arrows and the text
//! panels, computed from the last analysis the server sent.

use chess_core::{CandidateMove, Square};
use tracing::warn;

use crate::api::{Analysis, BestMove, Evaluation, Insights, MoveOutcome, MoveReply, PositionalFeatures, UndoReply};

/// Evaluations inside this many pawns either way read as "Even".
const EVEN_DEADBAND_PAWNS: f64 = 0.2;

/// Bar range in pawns; mate scores saturate to this value.
const BAR_LIMIT_PAWNS: f64 = 10.0;

/// The last analysis received for the live position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisSnapshot {
    pub analysis: Option<Analysis>,
    pub insights: Option<Insights>,
}

impl AnalysisSnapshot {
    pub fn best_moves(&self) -> &[BestMove] {
        self.analysis
            .as_ref()
            .map(|a| a.best_moves.as_slice())
            .unwrap_or(&[])
    }
}

impl From<MoveOutcome> for AnalysisSnapshot {
    fn from(outcome: MoveOutcome) -> Self {
        Self {
            analysis: outcome.analysis,
            insights: outcome.insights,
        }
    }
}

impl From<MoveReply> for AnalysisSnapshot {
    fn from(reply: MoveReply) -> Self {
        Self {
            analysis: reply.analysis,
            insights: reply.insights,
        }
    }
}

impl From<UndoReply> for AnalysisSnapshot {
    fn from(reply: UndoReply) -> Self {
        Self {
            analysis: reply.analysis,
            insights: reply.insights,
        }
    }
}

/// Which side the bar fill favours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarFill {
    White,
    Black,
    /// No evaluation available.
    Neutral,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvalBar {
    pub label: String,
    /// 0 = completely Black, 100 = completely White.
    pub percentage: f64,
    pub fill: BarFill,
}

pub fn evaluation_bar(evaluation: Option<&Evaluation>) -> EvalBar {
    let Some(evaluation) = evaluation else {
        return EvalBar {
            label: "Even".to_string(),
            percentage: 50.0,
            fill: BarFill::Neutral,
        };
    };

    let (value, label) = match *evaluation {
        Evaluation::Cp(cp) => {
            let pawns = f64::from(cp) / 100.0;
            let label = if pawns.abs() < EVEN_DEADBAND_PAWNS {
                "Even".to_string()
            } else {
                // Halves round away from zero: 0.25 shows as 0.3.
                let shown = (pawns.abs() * 10.0).round() / 10.0;
                format!("{} +{:.1}", side_name(pawns > 0.0), shown)
            };
            (pawns, label)
        }
        Evaluation::Mate(moves) => {
            let white_mates = moves > 0;
            let value = if white_mates { BAR_LIMIT_PAWNS } else { -BAR_LIMIT_PAWNS };
            (value, format!("{} M{}", side_name(white_mates), moves.unsigned_abs()))
        }
    };

    EvalBar {
        label,
        percentage: bar_percentage(value),
        fill: if value >= 0.0 { BarFill::White } else { BarFill::Black },
    }
}

/// Map `[-10, 10]` pawns linearly onto `[0, 100]`, clamped.
fn bar_percentage(pawns: f64) -> f64 {
    ((pawns + BAR_LIMIT_PAWNS) * (100.0 / (2.0 * BAR_LIMIT_PAWNS))).clamp(0.0, 100.0)
}

fn side_name(white: bool) -> &'static str {
    if white {
        "White"
    } else {
        "Black"
    }
}

// ---- Arrows ----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKind {
    Best,
    Alternative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrow {
    pub from: Square,
    pub to: Square,
    pub kind: ArrowKind,
}

/// One arrow per candidate move, the first one marked best. Entries whose
/// move text cannot be read are skipped.
pub fn arrows_for(best_moves: &[BestMove]) -> Vec<Arrow> {
    best_moves
        .iter()
        .enumerate()
        .filter_map(|(i, best)| {
            let mv = match CandidateMove::from_uci(&best.uci) {
                Ok(mv) => mv,
                Err(e) => {
                    warn!("Skipping arrow for unreadable move: {e}");
                    return None;
                }
            };
            if mv.from() == mv.to() {
                return None;
            }
            Some(Arrow {
                from: mv.from(),
                to: mv.to(),
                kind: if i == 0 { ArrowKind::Best } else { ArrowKind::Alternative },
            })
        })
        .collect()
}

/// View state that decides whether arrows may be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrowGate {
    pub browsing: bool,
    pub at_tail: bool,
    pub panel_expanded: bool,
}

impl ArrowGate {
    pub fn allows_arrows(&self) -> bool {
        !self.browsing && self.at_tail && self.panel_expanded
    }
}

// ---- Text panels ----

/// `"<n>. <move> <score>"` per candidate move.
pub fn best_move_lines(best_moves: &[BestMove]) -> Vec<String> {
    best_moves
        .iter()
        .enumerate()
        .map(|(i, best)| {
            let score = match (best.mate, best.centipawn) {
                (Some(mate), _) => format!("M{mate}"),
                (None, Some(cp)) => format!("{}", f64::from(cp) / 100.0),
                (None, None) => "0".to_string(),
            };
            format!("{}. {} {}", i + 1, best.uci, score)
        })
        .collect()
}

pub fn insight_lines(insights: &Insights) -> Vec<String> {
    let sign = if insights.material_balance > 0 { "+" } else { "" };
    let mut lines = vec![format!(
        "Material Balance: {sign}{}",
        insights.material_balance
    )];
    lines.extend(insights.learning_points.iter().cloned());

    if !insights.suggested_improvements.is_empty() {
        lines.push("Suggested Improvements:".to_string());
        lines.extend(insights.suggested_improvements.iter().cloned());
    }
    lines
}

pub fn positional_lines(features: &PositionalFeatures) -> Vec<String> {
    vec![
        format!(
            "Center Control - White: {}, Black: {}",
            features.center_control.white, features.center_control.black
        ),
        format!(
            "Developed Pieces - White: {}, Black: {}",
            features.piece_activity.white_developed, features.piece_activity.black_developed
        ),
        format!(
            "King Safety - White: {}, Black: {}",
            features.king_safety.white_king_safety, features.king_safety.black_king_safety
        ),
    ]
}

/// Everything the overlay shows for one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFrame {
    pub bar: EvalBar,
    pub best_moves: Vec<String>,
    pub insights: Vec<String>,
    pub positional: Vec<String>,
    /// Empty whenever the gate is closed.
    pub arrows: Vec<Arrow>,
}

pub fn render(snapshot: &AnalysisSnapshot, gate: ArrowGate) -> OverlayFrame {
    let evaluation = snapshot.analysis.as_ref().and_then(|a| a.evaluation.as_ref());
    let best_moves = snapshot.best_moves();

    OverlayFrame {
        bar: evaluation_bar(evaluation),
        best_moves: best_move_lines(best_moves),
        insights: snapshot.insights.as_ref().map(insight_lines).unwrap_or_default(),
        positional: snapshot
            .insights
            .as_ref()
            .and_then(|i| i.positional_features.as_ref())
            .map(positional_lines)
            .unwrap_or_default(),
        arrows: if gate.allows_arrows() {
            arrows_for(best_moves)
        } else {
            Vec::new()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn best(uci: &str, cp: i32) -> BestMove {
        BestMove {
            uci: uci.to_string(),
            centipawn: Some(cp),
            mate: None,
        }
    }

    const OPEN: ArrowGate = ArrowGate {
        browsing: false,
        at_tail: true,
        panel_expanded: true,
    };

    #[test]
    fn test_mate_for_black_saturates() {
        let bar = evaluation_bar(Some(&Evaluation::Mate(-3)));
        assert_eq!(bar.label, "Black M3");
        assert_eq!(bar.percentage, 0.0);
        assert_eq!(bar.fill, BarFill::Black);

        let bar = evaluation_bar(Some(&Evaluation::Mate(2)));
        assert_eq!(bar.label, "White M2");
        assert_eq!(bar.percentage, 100.0);
        assert_eq!(bar.fill, BarFill::White);
    }

    #[test]
    fn test_centipawn_labels() {
        assert_eq!(evaluation_bar(Some(&Evaluation::Cp(15))).label, "Even");
        assert_eq!(evaluation_bar(Some(&Evaluation::Cp(-19))).label, "Even");
        assert_eq!(evaluation_bar(Some(&Evaluation::Cp(20))).label, "White +0.2");
        assert_eq!(evaluation_bar(Some(&Evaluation::Cp(-250))).label, "Black +2.5");
        assert_eq!(evaluation_bar(Some(&Evaluation::Cp(25))).label, "White +0.3");
        assert_eq!(evaluation_bar(Some(&Evaluation::Cp(125))).label, "White +1.3");
        assert_eq!(evaluation_bar(Some(&Evaluation::Cp(-25))).label, "Black +0.3");

        let bar = evaluation_bar(Some(&Evaluation::Cp(250)));
        assert_eq!(bar.percentage, 62.5);
        assert_eq!(bar.fill, BarFill::White);

        // Beyond the bar range
        assert_eq!(evaluation_bar(Some(&Evaluation::Cp(-1500))).percentage, 0.0);
        assert_eq!(evaluation_bar(Some(&Evaluation::Cp(1500))).percentage, 100.0);
    }

    #[test]
    fn test_missing_evaluation_is_neutral() {
        let bar = evaluation_bar(None);
        assert_eq!(bar.label, "Even");
        assert_eq!(bar.percentage, 50.0);
        assert_eq!(bar.fill, BarFill::Neutral);
    }

    #[test]
    fn test_arrows_mark_best_first_and_skip_garbage() {
        let arrows = arrows_for(&[best("g1f3", 30), best("??", 0), best("B1C3", 20)]);
        assert_eq!(
            arrows,
            vec![
                Arrow { from: Square::G1, to: Square::F3, kind: ArrowKind::Best },
                Arrow { from: Square::B1, to: Square::C3, kind: ArrowKind::Alternative },
            ]
        );
    }

    #[test]
    fn test_each_gate_condition_suppresses_arrows() {
        assert!(OPEN.allows_arrows());
        assert!(!ArrowGate { browsing: true, ..OPEN }.allows_arrows());
        assert!(!ArrowGate { at_tail: false, ..OPEN }.allows_arrows());
        assert!(!ArrowGate { panel_expanded: false, ..OPEN }.allows_arrows());

        let snapshot = AnalysisSnapshot {
            analysis: Some(Analysis {
                evaluation: Some(Evaluation::Cp(30)),
                best_moves: vec![best("e2e4", 30)],
            }),
            insights: None,
        };
        assert_eq!(render(&snapshot, OPEN).arrows.len(), 1);
        let closed = render(&snapshot, ArrowGate { panel_expanded: false, ..OPEN });
        assert!(closed.arrows.is_empty());
        // The rest of the overlay is still there
        assert_eq!(closed.best_moves, vec!["1. e2e4 0.3"]);
    }

    #[test]
    fn test_text_panels() {
        let insights = Insights {
            material_balance: 3,
            positional_features: Some(PositionalFeatures::default()),
            suggested_improvements: vec!["Look for tactical opportunities".into()],
            learning_points: vec!["Best move: e2e4 (0.30)".into()],
        };
        assert_eq!(
            insight_lines(&insights),
            vec![
                "Material Balance: +3",
                "Best move: e2e4 (0.30)",
                "Suggested Improvements:",
                "Look for tactical opportunities",
            ]
        );
        assert_eq!(
            positional_lines(&PositionalFeatures::default())[0],
            "Center Control - White: 0, Black: 0"
        );

        let lines = best_move_lines(&[
            best("e2e4", 100),
            BestMove { uci: "d1h5".into(), centipawn: None, mate: Some(2) },
        ]);
        assert_eq!(lines, vec!["1. e2e4 1", "2. d1h5 M2"]);
    }
}
