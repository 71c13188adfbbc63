/*
 *  Agon - Discord bot for running team tournaments inside Discord servers.
 *  Copyright (C) 2026  The Agon developers
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
use crate::utils;
use getset::{CopyGetters, Getters};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serenity::all::{ChannelId, GuildId};
use std::fmt;
use std::fs;

/// Team counts a single-elimination bracket can be built from.
pub const VALID_SIZES: [usize; 5] = [2, 4, 8, 16, 32];

// Fixed seed: generating the bracket view and creating the match channels
// are separate operations that must agree on the same team order.
const SEEDING_SEED: u64 = 1;

/// Whether a bracket can be built from `count` teams.
pub fn is_valid_size(count: usize) -> bool {
    VALID_SIZES.contains(&count)
}

/**
 * Returns the given team names in seeded order.
 *
 * The order is a deterministic shuffle: the same input list always produces
 * the same seeding, no matter when or how often it is computed.
 */
pub fn seeded_order(mut names: Vec<String>) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(SEEDING_SEED);
    names.shuffle(&mut rng);

    names
}

/// Completion state of a bracket match.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum MatchStatus {
    Pending,
    Completed,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Pending => write!(f, "PENDING"),
            MatchStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Reasons a score submission can be rejected.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum ScoreError {
    UnknownMatch,
    AlreadyScored,
    Tied,
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::UnknownMatch => write!(f, "No match with that number exists."),
            ScoreError::AlreadyScored => write!(f, "That match has already been scored."),
            ScoreError::Tied => write!(f, "Scores cannot be tied. Please enter a winner."),
        }
    }
}

/// A single bracket match between two teams.
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Serialize, Deserialize, Getters, CopyGetters)]
pub struct BracketMatch {
    /// Match number, unique within the bracket and increasing across rounds.
    #[getset(get_copy = "pub")]
    id: u32,
    /// Round the match belongs to (1-based).
    #[getset(get_copy = "pub")]
    round: u32,
    #[getset(get = "pub")]
    team_a: String,
    #[getset(get = "pub")]
    team_b: String,
    #[getset(get = "pub")]
    winner: Option<String>,
    #[getset(get_copy = "pub")]
    status: MatchStatus,
    /// The match's private channel, once created.
    #[getset(get_copy = "pub")]
    channel: Option<ChannelId>,
}

impl BracketMatch {
    /// The losing team of a completed match.
    pub fn loser(&self) -> Option<&String> {
        let winner = self.winner.as_ref()?;
        if winner == &self.team_a {
            Some(&self.team_b)
        } else {
            Some(&self.team_a)
        }
    }
}

/// The full single-elimination bracket of a guild's tournament: the seeded
/// team order plus every match created so far.
///
/// Mutating methods do not write to disk on their own; callers persist a
/// batch of changes with `save` once the operation is done.
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Serialize, Deserialize, Getters, CopyGetters)]
pub struct Bracket {
    #[getset(get_copy = "pub")]
    guild: GuildId,
    /// Team names in seeded order, fixed at generation time.
    #[getset(get = "pub")]
    seeds: Vec<String>,
    #[getset(get = "pub")]
    matches: Vec<BracketMatch>,
}

impl Bracket {
    /// Constructor for a bracket, given the already-seeded team list. The
    /// seed count must have been validated with `is_valid_size`.
    pub fn new(guild: GuildId, seeds: Vec<String>) -> Bracket {
        Self {
            guild,
            seeds,
            matches: Vec::new(),
        }
    }

    /// The next free match number.
    fn next_match_id(&self) -> u32 {
        self.matches.iter().map(|m| m.id).max().unwrap_or(0) + 1
    }

    /// Creates the matches of a round by pairing the given teams in order:
    /// teams 0 and 1 meet in the first match, 2 and 3 in the second, and so
    /// on. Returns the numbers of the created matches.
    ///
    /// The team count must be even; round 1 is built from the seeds, later
    /// rounds from the previous round's winners.
    pub fn add_round(&mut self, round: u32, teams: &[String]) -> Vec<u32> {
        let mut created = Vec::with_capacity(teams.len() / 2);
        let mut id = self.next_match_id();

        for pair in teams.chunks_exact(2) {
            self.matches.push(BracketMatch {
                id,
                round,
                team_a: pair[0].clone(),
                team_b: pair[1].clone(),
                winner: None,
                status: MatchStatus::Pending,
                channel: None,
            });
            created.push(id);
            id += 1;
        }

        created
    }

    /// Retrieves a match by its number.
    pub fn get_match(&self, match_id: u32) -> Option<&BracketMatch> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    /// Remembers the private channel created for a match.
    pub fn set_match_channel(&mut self, match_id: u32, channel: ChannelId) {
        if let Some(m) = self.matches.iter_mut().find(|m| m.id == match_id) {
            m.channel = Some(channel);
        }
    }

    /// Records the final score of a match, returning the winning team's name.
    ///
    /// Ties, unknown match numbers, and re-scoring a completed match are
    /// rejected.
    pub fn record_result(
        &mut self,
        match_id: u32,
        score_a: u32,
        score_b: u32,
    ) -> Result<String, ScoreError> {
        if score_a == score_b {
            return Err(ScoreError::Tied);
        }

        let Some(m) = self.matches.iter_mut().find(|m| m.id == match_id) else {
            return Err(ScoreError::UnknownMatch);
        };
        if m.status == MatchStatus::Completed {
            return Err(ScoreError::AlreadyScored);
        }

        let winner = if score_a > score_b {
            m.team_a.clone()
        } else {
            m.team_b.clone()
        };
        m.winner = Some(winner.clone());
        m.status = MatchStatus::Completed;

        Ok(winner)
    }

    /// The highest round created so far (0 when no matches exist yet).
    pub fn current_round(&self) -> u32 {
        self.matches.iter().map(|m| m.round).max().unwrap_or(0)
    }

    /// The matches of a round, in match-number order.
    pub fn round_matches(&self, round: u32) -> Vec<&BracketMatch> {
        let mut matches = self
            .matches
            .iter()
            .filter(|m| m.round == round)
            .collect::<Vec<_>>();
        matches.sort_by_key(|m| m.id);

        matches
    }

    /// Whether every match of a round has been scored.
    pub fn round_complete(&self, round: u32) -> bool {
        let matches = self.round_matches(round);
        !matches.is_empty() && matches.iter().all(|m| m.status == MatchStatus::Completed)
    }

    /// The winners of a round's completed matches, in match-number order.
    pub fn round_winners(&self, round: u32) -> Vec<String> {
        self.round_matches(round)
            .iter()
            .filter_map(|m| m.winner.clone())
            .collect()
    }

    /// The tournament champion: the winner of the final round, once that
    /// round consists of a single completed match.
    pub fn champion(&self) -> Option<String> {
        let round = self.current_round();
        if round == 0 {
            return None;
        }

        let matches = self.round_matches(round);
        if matches.len() == 1 && matches[0].status == MatchStatus::Completed {
            matches[0].winner.clone()
        } else {
            None
        }
    }

    /// The teams occupying each bracket column: column 0 holds the seeds,
    /// column `r` the winners of round `r` in match order (`None` for slots
    /// whose match is still pending). Used by the bracket view.
    pub fn advancing_by_round(&self) -> Vec<Vec<Option<String>>> {
        let mut columns = Vec::with_capacity(self.current_round() as usize + 1);
        columns.push(self.seeds.iter().cloned().map(Some).collect::<Vec<_>>());

        for round in 1..=self.current_round() {
            columns.push(
                self.round_matches(round)
                    .iter()
                    .map(|m| m.winner.clone())
                    .collect(),
            );
        }

        columns
    }

    /// Saves the bracket to disk as a JSON file.
    ///
    /// Bracket files are saved as `guilds/<guild_id>/bracket.json`.
    pub fn save(&self) {
        let json = serde_json::to_string_pretty(self).expect(
            format!(
                "[Bracket {}] Could not serialize the bracket struct.",
                self.guild
            )
            .as_str(),
        );

        fs::write(utils::guild_dir(&self.guild).join("bracket.json"), json).expect(
            format!(
                "[Bracket {}] Could not write the bracket file to disk.",
                self.guild
            )
            .as_str(),
        );
    }

    /// Loads a Bracket instance from a JSON string and returns it.
    pub fn from_json(json: &str) -> Bracket {
        serde_json::from_str(json).expect("[Bracket] Could not parse data as valid JSON.")
    }
}

/* Static methods: */

/// Retrieves the bracket of a guild's tournament, if one was generated.
pub fn get_bracket(guild_id: &GuildId) -> Option<Bracket> {
    if let Ok(json) = fs::read_to_string(utils::guild_dir(guild_id).join("bracket.json")) {
        Some(Bracket::from_json(&json))
    } else {
        None
    }
}

/// Removes the stored bracket of a guild, if any.
pub fn clear_bracket(guild_id: &GuildId) {
    let path = utils::guild_dir(guild_id).join("bracket.json");
    if fs::metadata(&path).is_ok() {
        fs::remove_file(&path).expect(
            format!(
                "[Bracket] Could not delete the bracket file for guild {}.",
                guild_id
            )
            .as_str(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn bracket_of(seeds: &[&str]) -> Bracket {
        let mut bracket = Bracket::new(GuildId::new(1), names(seeds));
        let seeds = bracket.seeds().clone();
        bracket.add_round(1, &seeds);
        bracket
    }

    #[test]
    fn seeding_is_deterministic() {
        let input = names(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        assert_eq!(seeded_order(input.clone()), seeded_order(input));
    }

    #[test]
    fn seeding_is_a_permutation() {
        let input = names(&["a", "b", "c", "d"]);
        let mut seeded = seeded_order(input.clone());
        seeded.sort();
        assert_eq!(seeded, input);
    }

    #[test]
    fn valid_sizes_are_the_supported_powers_of_two() {
        for count in [2, 4, 8, 16, 32] {
            assert!(is_valid_size(count));
        }
        for count in [0, 1, 3, 6, 12, 64] {
            assert!(!is_valid_size(count));
        }
    }

    #[test]
    fn round_one_pairs_adjacent_seeds() {
        let bracket = bracket_of(&["a", "b", "c", "d"]);
        let matches = bracket.round_matches(1);

        assert_eq!(matches.len(), 2);
        assert_eq!((matches[0].team_a(), matches[0].team_b()), (&"a".to_string(), &"b".to_string()));
        assert_eq!((matches[1].team_a(), matches[1].team_b()), (&"c".to_string(), &"d".to_string()));
        assert_eq!(matches[0].id(), 1);
        assert_eq!(matches[1].id(), 2);
    }

    #[test]
    fn match_ids_continue_across_rounds() {
        let mut bracket = bracket_of(&["a", "b", "c", "d"]);
        bracket.record_result(1, 2, 0).unwrap();
        bracket.record_result(2, 0, 2).unwrap();

        let winners = bracket.round_winners(1);
        let ids = bracket.add_round(2, &winners);
        assert_eq!(ids, vec![3]);

        let final_match = bracket.get_match(3).unwrap();
        assert_eq!(final_match.round(), 2);
        assert_eq!(final_match.team_a(), "a");
        assert_eq!(final_match.team_b(), "d");
    }

    #[test]
    fn ties_are_rejected() {
        let mut bracket = bracket_of(&["a", "b"]);
        assert_eq!(bracket.record_result(1, 1, 1), Err(ScoreError::Tied));
        assert_eq!(bracket.get_match(1).unwrap().status(), MatchStatus::Pending);
    }

    #[test]
    fn unknown_matches_are_rejected() {
        let mut bracket = bracket_of(&["a", "b"]);
        assert_eq!(bracket.record_result(7, 1, 0), Err(ScoreError::UnknownMatch));
    }

    #[test]
    fn completed_matches_cannot_be_rescored() {
        let mut bracket = bracket_of(&["a", "b"]);
        assert_eq!(bracket.record_result(1, 2, 1), Ok("a".to_string()));
        assert_eq!(
            bracket.record_result(1, 0, 2),
            Err(ScoreError::AlreadyScored)
        );
        assert_eq!(bracket.get_match(1).unwrap().winner(), &Some("a".to_string()));
    }

    #[test]
    fn champion_requires_a_completed_final() {
        let mut bracket = bracket_of(&["a", "b", "c", "d"]);
        assert_eq!(bracket.champion(), None);

        bracket.record_result(1, 2, 0).unwrap();
        bracket.record_result(2, 2, 1).unwrap();
        assert!(bracket.round_complete(1));
        // Two winners remain; the final has not even been created yet.
        assert_eq!(bracket.champion(), None);

        let winners = bracket.round_winners(1);
        bracket.add_round(2, &winners);
        assert_eq!(bracket.champion(), None);

        bracket.record_result(3, 3, 2).unwrap();
        assert_eq!(bracket.champion(), Some("a".to_string()));
    }

    #[test]
    fn advancing_columns_track_winners_and_pending_slots() {
        let mut bracket = bracket_of(&["a", "b", "c", "d"]);
        bracket.record_result(1, 2, 0).unwrap();

        let columns = bracket.advancing_by_round();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].len(), 4);
        assert_eq!(columns[1], vec![Some("a".to_string()), None]);
    }

    #[test]
    fn losers_are_derived_from_the_winner() {
        let mut bracket = bracket_of(&["a", "b", "c", "d"]);
        bracket.record_result(1, 0, 2).unwrap();

        let scored = bracket.get_match(1).unwrap();
        assert_eq!(scored.loser(), Some(&"a".to_string()));
        assert_eq!(bracket.get_match(2).unwrap().loser(), None);
    }
}
