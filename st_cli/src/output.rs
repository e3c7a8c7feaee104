//! Plain-text rendering of engine types.

use std::fmt::Write;
use swiss_tourney::tournament::{
    Match, MatchOutcome, PlayerId, Round, Standing, Tournament, TournamentInfo,
};

fn player_name(tournament: &Tournament, id: PlayerId) -> &str {
    tournament
        .player(id)
        .map(|p| p.name.as_str())
        .unwrap_or("<unknown>")
}

fn match_line(tournament: &Tournament, game: &Match) -> String {
    let p1 = player_name(tournament, game.player1);
    let p2 = player_name(tournament, game.player2);
    let result = match (game.outcome, game.sub_result) {
        (MatchOutcome::Pending, _) => "pending".to_string(),
        (MatchOutcome::Draw, sub) => format!("draw {}", sub.map(|s| s.as_str()).unwrap_or("")),
        (MatchOutcome::Player1Won, sub) | (MatchOutcome::Player2Won, sub) => {
            let winner = game.winner.map(|w| player_name(tournament, w)).unwrap_or("?");
            format!("{} wins {}", winner, sub.map(|s| s.as_str()).unwrap_or(""))
        }
    };
    format!("  {}  {} vs {}: {}", game.id, p1, p2, result.trim_end())
}

/// One round: matches with their IDs and the bye
pub fn render_round(tournament: &Tournament, round: &Round) -> String {
    let mut out = format!("Round {} ({})\n", round.number, round.id);
    for game in &round.matches {
        let _ = writeln!(out, "{}", match_line(tournament, game));
    }
    if let Some(bye) = round.bye {
        let _ = writeln!(out, "  bye: {}", player_name(tournament, bye));
    }
    out
}

/// Header, roster and every round
pub fn render_tournament(tournament: &Tournament) -> String {
    let mut out = format!(
        "#{} {}{}\n",
        tournament.id,
        tournament.name,
        if tournament.is_finalized {
            " [finalized]"
        } else {
            ""
        }
    );
    let _ = writeln!(
        out,
        "{} to {}, round {}/{}",
        tournament.starts_at.format("%Y-%m-%d %H:%M"),
        tournament.ends_at().format("%Y-%m-%d %H:%M"),
        tournament.rounds.len(),
        tournament.max_rounds()
    );

    let _ = writeln!(out, "Players:");
    for player in &tournament.players {
        let _ = writeln!(out, "  {}  {}", player.id, player.name);
    }
    for round in &tournament.rounds {
        out.push_str(&render_round(tournament, round));
    }
    out
}

/// Standings table
pub fn render_standings(rows: &[Standing]) -> String {
    let mut out = format!(
        "{:>4}  {:<20} {:>5} {:>3} {:>3} {:>3} {:>4}\n",
        "#", "Player", "Pts", "W", "D", "L", "Sub"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:>4}  {:<20} {:>5} {:>3} {:>3} {:>3} {:>4}{}",
            row.rank,
            row.name,
            row.points,
            row.wins,
            row.draws,
            row.losses,
            row.sub_score,
            if row.had_bye { "  (bye)" } else { "" }
        );
    }
    out
}

/// Tournament listing, one line each
pub fn render_list(infos: &[TournamentInfo]) -> String {
    let mut out = String::new();
    for info in infos {
        let _ = writeln!(
            out,
            "#{:<5} {:<24} {} players, round {}/{}{}",
            info.id,
            info.name,
            info.player_count,
            info.round_count,
            info.max_rounds,
            if info.is_finalized { ", finalized" } else { "" }
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use swiss_tourney::tournament::{
        FirstByeSelector, SubResult, TournamentConfig, create_round, record_result, standings,
    };

    fn three_players() -> Tournament {
        let mut tournament = Tournament::new(4, TournamentConfig::new("Cup", Utc::now(), 3600));
        tournament.enroll(["Ana", "Ben", "Cid"]).unwrap();
        tournament
    }

    #[test]
    fn test_round_shows_names_and_bye() {
        let mut tournament = three_players();
        let round = create_round(&mut tournament, &FirstByeSelector).unwrap();
        let text = render_round(&tournament, &round);

        assert!(text.starts_with("Round 1"));
        assert!(text.contains("Ana vs Ben: pending"));
        assert!(text.contains("bye: Cid"));
    }

    #[test]
    fn test_recorded_match_line() {
        let mut tournament = three_players();
        let round = create_round(&mut tournament, &FirstByeSelector).unwrap();
        let game = &round.matches[0];
        record_result(
            &mut tournament,
            game.id,
            SubResult::TwoOne,
            MatchOutcome::Player2Won,
            Some(game.player2),
        )
        .unwrap();

        let text = render_tournament(&tournament);
        assert!(text.contains("#4 Cup"));
        assert!(text.contains("Ben wins 2x1"));
        assert!(text.contains("round 1/2"));
    }

    #[test]
    fn test_standings_table() {
        let mut tournament = three_players();
        create_round(&mut tournament, &FirstByeSelector).unwrap();
        let text = render_standings(&standings(&tournament));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("Cid"));
        assert!(lines[1].ends_with("(bye)"));
    }

    #[test]
    fn test_list() {
        let tournament = three_players();
        let text = render_list(&[TournamentInfo::from(&tournament)]);
        assert!(text.contains("3 players, round 0/2"));
    }
}
