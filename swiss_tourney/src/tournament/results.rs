//! Result recording and ledger derivation.
//!
//! Ledgers are never patched incrementally. Every recording stores the
//! outcome on the match and then re-derives every player's ledger from the
//! round byes and all recorded matches, so recording the same result twice
//! leaves the ledgers unchanged.

use super::errors::{TournamentError, TournamentResult};
use super::models::{Match, MatchId, MatchOutcome, Player, PlayerId, SubResult, Tournament};
use std::collections::HashMap;

/// Record the result of a match and update both players' ledgers.
///
/// # Arguments
///
/// * `tournament` - Snapshot holding the match
/// * `match_id` - Match to record
/// * `sub_result` - Best-of-3 shape
/// * `outcome` - `Draw`, `Player1Won` or `Player2Won`
/// * `winner` - Winning player, `None` for a draw
///
/// # Returns
///
/// * `TournamentResult<Match>` - The match as stored after recording
///
/// # Errors
///
/// * `TournamentError::MatchNotFound` - No such match; nothing is changed
/// * `TournamentError::InvalidWinner` - `winner` disagrees with `outcome`
pub fn record_result(
    tournament: &mut Tournament,
    match_id: MatchId,
    sub_result: SubResult,
    outcome: MatchOutcome,
    winner: Option<PlayerId>,
) -> TournamentResult<Match> {
    let game = tournament
        .find_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;

    let expected_winner = match outcome {
        MatchOutcome::Pending => return Err(TournamentError::InvalidWinner(match_id)),
        MatchOutcome::Draw => None,
        MatchOutcome::Player1Won => Some(game.player1),
        MatchOutcome::Player2Won => Some(game.player2),
    };
    if winner != expected_winner {
        return Err(TournamentError::InvalidWinner(match_id));
    }

    let rerecorded = game.outcome.is_recorded();
    game.outcome = outcome;
    game.sub_result = Some(sub_result);
    game.winner = expected_winner;
    let recorded = game.clone();

    rebuild_ledgers(tournament);

    if rerecorded {
        log::info!(
            "Tournament {}: re-recorded match {} as {:?} ({})",
            tournament.id,
            match_id,
            outcome,
            sub_result
        );
    } else {
        log::info!(
            "Tournament {}: recorded match {} as {:?} ({})",
            tournament.id,
            match_id,
            outcome,
            sub_result
        );
    }

    Ok(recorded)
}

/// Re-derive every ledger from the tournament history.
///
/// Rounds are replayed in order: the bye recipient gets a win, then each
/// recorded match credits its players. A win appends the best-of-3 shape to
/// the winner's history and adds 3 points plus the shape's bonus, so
/// `points == 3 * wins + draws + sub_score()` always holds.
pub fn rebuild_ledgers(tournament: &mut Tournament) {
    let Tournament {
        players, rounds, ..
    } = tournament;

    for player in players.iter_mut() {
        player.reset_ledger();
    }

    let index: HashMap<PlayerId, usize> = players
        .iter()
        .enumerate()
        .map(|(idx, p)| (p.id, idx))
        .collect();

    for round in rounds.iter() {
        if let Some(&idx) = round.bye.and_then(|id| index.get(&id)) {
            players[idx].grant_bye();
        }

        for game in &round.matches {
            let (Some(&p1), Some(&p2)) = (index.get(&game.player1), index.get(&game.player2))
            else {
                log::warn!("Match {} references a player outside the roster", game.id);
                continue;
            };

            match game.outcome {
                MatchOutcome::Pending => {}
                MatchOutcome::Draw => {
                    players[p1].register_draw();
                    players[p2].register_draw();
                }
                MatchOutcome::Player1Won => {
                    credit_win(&mut players[p1], game.sub_result);
                    players[p2].register_loss();
                }
                MatchOutcome::Player2Won => {
                    credit_win(&mut players[p2], game.sub_result);
                    players[p1].register_loss();
                }
            }
        }
    }
}

fn credit_win(player: &mut Player, sub_result: Option<SubResult>) {
    let sub_result = sub_result.unwrap_or(SubResult::ZeroZero);
    player.add_sub_result(sub_result);
    player.register_win();
    player.points += sub_result.bonus();
}
