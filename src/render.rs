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
use crate::bracket::{Bracket, MatchStatus};
use crate::tournament::Tournament;
use serenity::all::{Colour, CreateEmbed, CreateEmbedFooter};

/*
 * The bracket view: one embed, one field per round. Losers are struck
 * through, pending pairings shown as-is, and the champion line fills in once
 * the final is scored. The view message is replaced on every refresh.
 */

/**
 * Builds the (title, body) sections of the bracket view, one per round.
 *
 * Before any match exists, a single section lists the seeded team order.
 */
pub fn overview_sections(bracket: &Bracket) -> Vec<(String, String)> {
    if bracket.matches().is_empty() {
        let body = bracket
            .seeds()
            .iter()
            .enumerate()
            .map(|(i, name)| format!("`{:2}.` {}", i + 1, name))
            .collect::<Vec<_>>()
            .join("\n");

        return vec![(String::from("Seeds"), body)];
    }

    let mut sections = Vec::with_capacity(bracket.current_round() as usize);
    for round in 1..=bracket.current_round() {
        let lines = bracket
            .round_matches(round)
            .iter()
            .map(|m| match m.status() {
                MatchStatus::Completed => {
                    let winner = m
                        .winner()
                        .as_ref()
                        .expect("[render] A completed match has no winner.");
                    let loser = m
                        .loser()
                        .expect("[render] A completed match has no loser.");
                    format!("Match {}: **{}** def. ~~{}~~", m.id(), winner, loser)
                }
                MatchStatus::Pending => {
                    format!("Match {}: {} vs {}", m.id(), m.team_a(), m.team_b())
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        sections.push((format!("Round {}", round), lines));
    }

    // Push known winners into the next column before the round completes,
    // the way the bracket fills in slot by slot.
    let round = bracket.current_round();
    if round > 0 && !bracket.round_complete(round) {
        if let Some(slots) = bracket.advancing_by_round().last() {
            if slots.len() > 1 && slots.iter().any(Option::is_some) {
                let body = slots
                    .iter()
                    .map(|slot| slot.as_deref().unwrap_or("*?*").to_string())
                    .collect::<Vec<_>>()
                    .join(" · ");
                sections.push((String::from("Advancing"), body));
            }
        }
    }

    sections
}

/**
 * The champion line shown under the rounds.
 */
pub fn champion_line(bracket: &Bracket) -> String {
    match bracket.champion() {
        Some(champion) => format!("🏆 Champion: **{}**", champion),
        None => String::from("🏆 Champion: *TBD*"),
    }
}

/**
 * Builds the full bracket view embed for a tournament.
 */
pub fn bracket_embed(bracket: &Bracket, t: &Tournament) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(format!("🧾 {} — Bracket", t.name()))
        .description(format!(
            "**{}** teams — {}, Best-of-{}",
            bracket.seeds().len(),
            t.bracket_type(),
            t.best_of()
        ))
        .colour(Colour::from_rgb(201, 0, 43))
        .footer(CreateEmbedFooter::new(champion_line(bracket)));

    for (title, body) in overview_sections(bracket) {
        embed = embed.field(title, body, false);
    }

    embed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::all::GuildId;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn seeds_are_listed_before_matches_exist() {
        let bracket = Bracket::new(GuildId::new(1), names(&["a", "b", "c", "d"]));
        let sections = overview_sections(&bracket);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, "Seeds");
        assert!(sections[0].1.contains("` 1.` a"));
        assert!(sections[0].1.contains("` 4.` d"));
    }

    #[test]
    fn pending_matches_show_both_teams() {
        let mut bracket = Bracket::new(GuildId::new(1), names(&["a", "b"]));
        let seeds = bracket.seeds().clone();
        bracket.add_round(1, &seeds);

        let sections = overview_sections(&bracket);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, "Round 1");
        assert_eq!(sections[0].1, "Match 1: a vs b");
    }

    #[test]
    fn completed_matches_strike_the_loser() {
        let mut bracket = Bracket::new(GuildId::new(1), names(&["a", "b"]));
        let seeds = bracket.seeds().clone();
        bracket.add_round(1, &seeds);
        bracket.record_result(1, 0, 2).unwrap();

        let sections = overview_sections(&bracket);
        assert_eq!(sections[0].1, "Match 1: **b** def. ~~a~~");
    }

    #[test]
    fn partial_rounds_preview_the_advancing_teams() {
        let mut bracket = Bracket::new(GuildId::new(1), names(&["a", "b", "c", "d"]));
        let seeds = bracket.seeds().clone();
        bracket.add_round(1, &seeds);
        bracket.record_result(1, 2, 0).unwrap();

        let sections = overview_sections(&bracket);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].0, "Advancing");
        assert_eq!(sections[1].1, "a · *?*");
    }

    #[test]
    fn champion_line_fills_in_after_the_final() {
        let mut bracket = Bracket::new(GuildId::new(1), names(&["a", "b"]));
        let seeds = bracket.seeds().clone();
        bracket.add_round(1, &seeds);

        assert_eq!(champion_line(&bracket), "🏆 Champion: *TBD*");

        bracket.record_result(1, 2, 1).unwrap();
        assert_eq!(champion_line(&bracket), "🏆 Champion: **a**");
    }
}
