//! Standings and winner determination.

use super::models::{Player, PlayerId, Tournament};
use serde::{Deserialize, Serialize};

/// One row of the standings table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-indexed position
    pub rank: usize,
    pub player_id: PlayerId,
    pub name: String,
    pub points: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub sub_score: u32,
    pub had_bye: bool,
}

/// Sum of the best-of-3 bonus over every recorded match the player took
/// part in, won or not.
pub fn match_list_score(tournament: &Tournament, player: PlayerId) -> u32 {
    tournament
        .matches()
        .filter(|m| m.involves(player) && m.outcome.is_recorded())
        .filter_map(|m| m.sub_result)
        .map(|r| r.bonus())
        .sum()
}

/// Name the tournament winner.
///
/// Players without a win are not considered. The rest are ordered by wins,
/// then sub-score. When the top two share the same number of wins, the one
/// with the strictly higher match-list score wins; a further tie goes to the
/// first in that order.
///
/// # Returns
///
/// * `Option<&Player>` - The winner, or `None` if nobody has a win
pub fn determine_winner(tournament: &Tournament) -> Option<&Player> {
    let mut contenders: Vec<&Player> = tournament.players.iter().filter(|p| p.wins > 0).collect();
    contenders.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| b.sub_score().cmp(&a.sub_score()))
    });

    match contenders.as_slice() {
        [first, second, ..] if first.wins == second.wins => {
            let first_score = match_list_score(tournament, first.id);
            let second_score = match_list_score(tournament, second.id);
            if second_score > first_score {
                Some(*second)
            } else {
                Some(*first)
            }
        }
        [first, ..] => Some(*first),
        [] => None,
    }
}

/// Rank every player by points, wins, sub-score and enrollment order.
pub fn standings(tournament: &Tournament) -> Vec<Standing> {
    let mut order: Vec<&Player> = tournament.players.iter().collect();
    order.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.wins.cmp(&a.wins))
            .then_with(|| b.sub_score().cmp(&a.sub_score()))
    });

    order
        .into_iter()
        .enumerate()
        .map(|(idx, player)| Standing {
            rank: idx + 1,
            player_id: player.id,
            name: player.name.clone(),
            points: player.points,
            wins: player.wins,
            draws: player.draws,
            losses: player.losses,
            sub_score: player.sub_score(),
            had_bye: player.had_bye,
        })
        .collect()
}
