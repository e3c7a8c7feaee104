//! Round pairing.
//!
//! Round 1 pairs the roster consecutively in enrollment order. Later rounds
//! sort players by bye status and points and greedily pair each player with
//! the first remaining opponent they have not faced. The greedy scan never
//! backtracks, so a late round can leave two players unpaired when they have
//! already met everyone else that is still free.

use super::errors::{TournamentError, TournamentResult};
use super::models::{Match, Player, PlayerId, Round, Tournament};
use rand::Rng;
use std::collections::HashSet;

/// Chooses the bye recipient in round 1.
pub trait ByeSelector: Send + Sync {
    /// Return the index of the recipient within `candidates` (never empty).
    fn select(&self, candidates: &[PlayerId]) -> usize;
}

/// Uniformly random bye recipient
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomByeSelector;

impl ByeSelector for RandomByeSelector {
    fn select(&self, candidates: &[PlayerId]) -> usize {
        rand::rng().random_range(0..candidates.len())
    }
}

/// Always the first candidate. Deterministic, for tests and replays.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstByeSelector;

impl ByeSelector for FirstByeSelector {
    fn select(&self, _candidates: &[PlayerId]) -> usize {
        0
    }
}

/// Pairs and bye chosen for a round before anything is applied
#[derive(Debug, Default)]
struct RoundPlan {
    pairs: Vec<(PlayerId, PlayerId)>,
    bye: Option<PlayerId>,
}

/// Whether `a` and `b` met in any match of `history`, in either seat order.
pub fn have_played<'a, I>(a: PlayerId, b: PlayerId, history: I) -> bool
where
    I: IntoIterator<Item = &'a Match>,
{
    history.into_iter().any(|m| m.is_between(a, b))
}

/// Create the next round of `tournament`.
///
/// The tournament is only touched once the round is fully built: the round
/// is appended and the bye recipient, if any, gets an automatic win.
///
/// # Errors
///
/// * `TournamentError::NoPlayers` - Empty roster
/// * `TournamentError::AlreadyFinalized` - Tournament is closed
/// * `TournamentError::RoundLimitReached` - All required rounds exist
pub fn create_round(
    tournament: &mut Tournament,
    bye_selector: &dyn ByeSelector,
) -> TournamentResult<Round> {
    if tournament.players.is_empty() {
        return Err(TournamentError::NoPlayers);
    }
    if tournament.is_finalized {
        return Err(TournamentError::AlreadyFinalized(tournament.id));
    }

    let next_round = tournament.next_round_number();
    let max_rounds = tournament.max_rounds();
    if next_round > max_rounds {
        return Err(TournamentError::RoundLimitReached {
            next_round,
            max_rounds,
        });
    }

    let plan = if next_round == 1 {
        pair_first_round(&tournament.players, bye_selector)
    } else {
        let history: Vec<&Match> = tournament.matches().collect();
        pair_later_round(&tournament.players, &history)
    };

    let mut round = Round::new(next_round);
    round.matches = plan
        .pairs
        .iter()
        .map(|&(player1, player2)| Match::new(next_round, player1, player2))
        .collect();
    round.bye = plan.bye;

    let tournament_id = tournament.id;
    if let Some(player) = plan.bye.and_then(|bye| tournament.player_mut(bye)) {
        player.grant_bye();
        log::info!(
            "Tournament {}: {} receives the round {} bye",
            tournament_id,
            player.name,
            next_round
        );
    }

    tournament.rounds.push(round.clone());
    log::info!(
        "Tournament {}: created round {}/{} with {} match(es)",
        tournament.id,
        next_round,
        max_rounds,
        round.matches.len()
    );

    Ok(round)
}

fn pair_first_round(players: &[Player], bye_selector: &dyn ByeSelector) -> RoundPlan {
    let mut plan = RoundPlan::default();
    let mut candidates = Vec::new();

    for chunk in players.chunks(2) {
        match chunk {
            [a, b] => plan.pairs.push((a.id, b.id)),
            [single] => candidates.push(single.id),
            _ => {}
        }
    }

    if !candidates.is_empty() {
        let idx = bye_selector.select(&candidates);
        plan.bye = candidates.get(idx).or(candidates.first()).copied();
    }

    plan
}

fn pair_later_round(players: &[Player], history: &[&Match]) -> RoundPlan {
    let mut order: Vec<&Player> = players.iter().collect();
    // Stable: ties keep enrollment order
    order.sort_by(|a, b| {
        b.had_bye
            .cmp(&a.had_bye)
            .then_with(|| b.points.cmp(&a.points))
    });

    let odd_roster = players.len() % 2 != 0;
    let mut plan = RoundPlan::default();
    let mut paired: HashSet<PlayerId> = HashSet::with_capacity(players.len());

    for (i, player1) in order.iter().enumerate() {
        if paired.contains(&player1.id) {
            continue;
        }

        let opponent = order[i + 1..].iter().find(|player2| {
            !paired.contains(&player2.id)
                && !have_played(player1.id, player2.id, history.iter().copied())
        });

        match opponent {
            Some(player2) => {
                plan.pairs.push((player1.id, player2.id));
                paired.insert(player1.id);
                paired.insert(player2.id);
            }
            None if odd_roster => {
                if plan.bye.is_none() {
                    plan.bye = Some(player1.id);
                }
            }
            None => log::debug!("{} left unpaired: no unfaced opponent remains", player1.name),
        }
    }

    plan
}
