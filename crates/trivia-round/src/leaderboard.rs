//! Standings, ranks, and winners.

use trivia_registry::Standing;

use crate::Templates;

/// One leaderboard line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedPlayer {
    /// Competition rank: tied players share a rank and the next rank
    /// skips ahead (5, 5, 3 points rank 1, 1, 3).
    pub rank: usize,
    pub username: String,
    pub score: u32,
}

/// Active players ordered by score descending, then username ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<RankedPlayer>,
}

impl Leaderboard {
    pub fn from_standings(mut standings: Vec<Standing>) -> Self {
        standings.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.username.cmp(&b.username))
        });

        let mut entries: Vec<RankedPlayer> = Vec::with_capacity(standings.len());
        for (position, standing) in standings.into_iter().enumerate() {
            let rank = match entries.last() {
                Some(prev) if prev.score == standing.score => prev.rank,
                _ => position + 1,
            };
            entries.push(RankedPlayer {
                rank,
                username: standing.username,
                score: standing.score,
            });
        }

        Self { entries }
    }

    pub fn entries(&self) -> &[RankedPlayer] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every player holding the top score, in alphabetical order.
    pub fn winners(&self) -> Vec<&str> {
        let Some(top) = self.entries.first() else {
            return Vec::new();
        };
        self.entries
            .iter()
            .take_while(|e| e.score == top.score)
            .map(|e| e.username.as_str())
            .collect()
    }

    /// One `"<rank>. <username>: <score> <noun>"` line per player.
    pub fn render(&self, templates: &Templates) -> String {
        self.entries
            .iter()
            .map(|e| {
                format!(
                    "{}. {}: {} {}",
                    e.rank,
                    e.username,
                    e.score,
                    templates.points_noun(e.score)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Heading, standings, and winner line, separated by newlines.
    pub fn final_standings(&self, templates: &Templates) -> String {
        format!(
            "{}\n{}\n{}",
            templates.final_standings_heading,
            self.render(templates),
            templates.winner_text(&self.winners())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(scores: &[(&str, u32)]) -> Leaderboard {
        Leaderboard::from_standings(
            scores
                .iter()
                .map(|(name, score)| Standing::new(*name, *score))
                .collect(),
        )
    }

    fn templates() -> Templates {
        Templates {
            final_standings_heading: "===FINAL===".into(),
            one_winner: "Winner: {}".into(),
            multiple_winners: "Winners: {}".into(),
            ..Templates::default()
        }
    }

    #[test]
    fn test_orders_by_score_then_username() {
        let b = board(&[("carol", 1), ("bob", 3), ("alice", 1)]);
        let names: Vec<_> = b.entries().iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, ["bob", "alice", "carol"]);
    }

    #[test]
    fn test_competition_ranking() {
        let b = board(&[("a", 5), ("b", 5), ("c", 3), ("d", 3), ("e", 0)]);
        let ranks: Vec<_> = b.entries().iter().map(|e| e.rank).collect();
        assert_eq!(ranks, [1, 1, 3, 3, 5]);
    }

    #[test]
    fn test_render_uses_singular_only_for_one_point() {
        let b = board(&[("alice", 2), ("bob", 1), ("carol", 0)]);
        assert_eq!(
            b.render(&templates()),
            "1. alice: 2 points\n2. bob: 1 point\n3. carol: 0 points"
        );
    }

    #[test]
    fn test_single_winner() {
        let b = board(&[("bob", 1), ("alice", 2)]);
        assert_eq!(b.winners(), ["alice"]);
        assert_eq!(
            b.final_standings(&templates()),
            "===FINAL===\n1. alice: 2 points\n2. bob: 1 point\nWinner: alice"
        );
    }

    #[test]
    fn test_tied_winners_are_alphabetical() {
        let b = board(&[("zed", 1), ("amy", 1), ("kim", 0)]);
        assert_eq!(b.winners(), ["amy", "zed"]);
        assert!(b.final_standings(&templates()).ends_with("\nWinners: amy, zed"));
    }

    #[test]
    fn test_all_zero_scores_are_all_winners() {
        let b = board(&[("b", 0), ("a", 0)]);
        assert_eq!(b.winners(), ["a", "b"]);
    }

    #[test]
    fn test_empty_leaderboard() {
        let b = board(&[]);
        assert!(b.is_empty());
        assert!(b.winners().is_empty());
        assert_eq!(b.render(&templates()), "");
        assert_eq!(b.final_standings(&templates()), "===FINAL===\n\n");
    }
}
