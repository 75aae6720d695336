use crate::ranking::{EliminationRule, OptionId, Round, VoteCount};

/// Instant runoff: the option with the fewest first preferences is eliminated.
///
/// Ties go against the option ranked by fewer voters overall, then against
/// the option that comes last in block order.
pub struct InstantRunoffRule;

impl EliminationRule for InstantRunoffRule {
    fn name(&self) -> &'static str {
        "instant runoff"
    }

    fn select_elimination_candidate(&self, round: &Round) -> (OptionId, String) {
        let ranking_counts = round.ballots.ranking_counts();
        let mut candidates: Vec<(VoteCount, VoteCount, OptionId)> = round
            .first_preferences
            .iter()
            .map(|(id, vc)| {
                let ranked_by = ranking_counts.get(id).cloned().unwrap_or(VoteCount::EMPTY);
                (*vc, ranked_by, *id)
            })
            .collect();
        // Lowest first preferences, then lowest support, then the greater block.
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)).then(b.2.cmp(&a.2)));
        let (vc, _, id) = candidates[0];
        (id, format!("{} first preference(s)", vc.0))
    }
}
