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
use crate::channels::Scaffold;
use crate::{player, tournament, utils};
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use serenity::all::{ChannelId, GuildId, MessageId, RoleId};
use std::fmt;
use std::fs;

/// Bracket format label. Only single elimination is actually played; the
/// toggle changes what the panel advertises.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum BracketType {
    SingleElim,
    DoubleElim,
}

impl fmt::Display for BracketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketType::SingleElim => write!(f, "Single Elim"),
            BracketType::DoubleElim => write!(f, "Double Elim"),
        }
    }
}

/// Whether players may currently join the tournament.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum QueueStatus {
    Open,
    Closed,
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueStatus::Open => write!(f, "OPEN"),
            QueueStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Lifecycle of the tournament itself.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum TournamentStatus {
    Waiting,
    Running,
    Finished,
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TournamentStatus::Waiting => write!(f, "WAITING"),
            TournamentStatus::Running => write!(f, "RUNNING"),
            TournamentStatus::Finished => write!(f, "FINISHED"),
        }
    }
}

/// Data structure defining the single tournament a guild can host, along with
/// the Discord anchors (roles, category, channels, panel messages) the bot
/// created for it.
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Serialize, Deserialize, Getters, CopyGetters)]
pub struct Tournament {
    /// Identifier of the guild hosting the tournament.
    #[getset(get_copy = "pub")]
    guild: GuildId,
    /// Display name of the tournament (mutable).
    #[getset(get = "pub")]
    name: String,
    /// Maximum number of teams allowed to register.
    #[getset(get_copy = "pub")]
    max_teams: u16,
    /// Exact roster size a team needs before it can ready up (1-6).
    #[getset(get_copy = "pub")]
    team_size: u8,
    /// Match format: best-of-1, -3 or -5.
    #[getset(get_copy = "pub")]
    best_of: u8,
    #[getset(get_copy = "pub")]
    bracket_type: BracketType,
    /// When enabled, team captains may score their own matches.
    #[getset(get_copy = "pub")]
    captain_scoring: bool,
    /// When enabled, match briefs ask for screenshot proof of results.
    #[getset(get_copy = "pub")]
    screenshot_proof: bool,
    #[getset(get_copy = "pub")]
    queue_status: QueueStatus,
    #[getset(get_copy = "pub")]
    status: TournamentStatus,
    #[getset(get_copy = "pub")]
    teams_joined: u16,
    #[getset(get_copy = "pub")]
    players_joined: u32,
    #[getset(get_copy = "pub")]
    spectators_joined: u32,
    /// Category grouping the fixed tournament channels.
    #[getset(get_copy = "pub")]
    category: ChannelId,
    /// Staff-only channel hosting the control panel embed.
    #[getset(get_copy = "pub")]
    panel_channel: ChannelId,
    #[getset(get_copy = "pub")]
    panel_message: Option<MessageId>,
    #[getset(get_copy = "pub")]
    rules_channel: ChannelId,
    #[getset(get_copy = "pub")]
    create_team_channel: ChannelId,
    #[getset(get_copy = "pub")]
    teams_channel: ChannelId,
    #[getset(get_copy = "pub")]
    chat_channel: ChannelId,
    #[getset(get_copy = "pub")]
    bracket_channel: ChannelId,
    /// Last posted bracket view, replaced on every refresh.
    #[getset(get_copy = "pub")]
    bracket_message: Option<MessageId>,
    #[getset(get_copy = "pub")]
    results_channel: ChannelId,
    /// Category holding per-match channels, created lazily on start.
    #[getset(get_copy = "pub")]
    matches_category: Option<ChannelId>,
    /// Category holding per-team hub channels, created lazily.
    #[getset(get_copy = "pub")]
    teams_category: Option<ChannelId>,
    #[getset(get_copy = "pub")]
    join_panel_channel: Option<ChannelId>,
    #[getset(get_copy = "pub")]
    join_panel_message: Option<MessageId>,
    /// Permanent invite code shared on the join panel.
    #[getset(get = "pub")]
    join_invite_code: Option<String>,
    #[getset(get_copy = "pub")]
    player_role: RoleId,
    #[getset(get_copy = "pub")]
    spectator_role: RoleId,
}

/**
 * Validates the user-provided tournament settings, returning a user-facing
 * error message when any of them is out of range.
 */
pub fn validate_settings(max_teams: u16, team_size: u8, best_of: u8) -> Result<(), String> {
    if max_teams == 0 {
        return Err(String::from("Max Teams must be greater than 0."));
    }
    if !(1..=6).contains(&team_size) {
        return Err(String::from("Team Size must be between **1** and **6**."));
    }
    if ![1, 3, 5].contains(&best_of) {
        return Err(String::from("Best-of must be **1**, **3**, or **5**."));
    }

    Ok(())
}

impl Tournament {
    /// Constructor for a tournament, given the validated settings and the
    /// freshly created Discord scaffolding (roles, category, channels).
    pub fn new(
        guild: GuildId,
        name: String,
        max_teams: u16,
        team_size: u8,
        best_of: u8,
        scaffold: &Scaffold,
    ) -> Tournament {
        let res = Self {
            guild,
            name,
            max_teams,
            team_size,
            best_of,
            bracket_type: BracketType::SingleElim,
            captain_scoring: false,
            screenshot_proof: false,
            queue_status: QueueStatus::Closed,
            status: TournamentStatus::Waiting,
            teams_joined: 0,
            players_joined: 0,
            spectators_joined: 0,
            category: scaffold.category,
            panel_channel: scaffold.admin_channel,
            panel_message: None,
            rules_channel: scaffold.rules_channel,
            create_team_channel: scaffold.create_team_channel,
            teams_channel: scaffold.teams_channel,
            chat_channel: scaffold.chat_channel,
            bracket_channel: scaffold.bracket_channel,
            bracket_message: None,
            results_channel: scaffold.results_channel,
            matches_category: None,
            teams_category: None,
            join_panel_channel: None,
            join_panel_message: None,
            join_invite_code: None,
            player_role: scaffold.player_role,
            spectator_role: scaffold.spectator_role,
        };

        res.save();

        res
    }

    /// Maximum amount of players that can register, derived from the team
    /// settings.
    pub fn max_players(&self) -> u32 {
        self.max_teams as u32 * self.team_size as u32
    }

    /// Updates the core tournament settings. Values must have been validated
    /// beforehand with `validate_settings`.
    pub fn update_settings(&mut self, name: String, max_teams: u16, team_size: u8, best_of: u8) {
        self.name = name;
        self.max_teams = max_teams;
        self.team_size = team_size;
        self.best_of = best_of;

        self.save();
    }

    /// Opens the join queue.
    pub fn open_queue(&mut self) {
        self.queue_status = QueueStatus::Open;

        self.save();
    }

    /// Closes the join queue.
    pub fn close_queue(&mut self) {
        self.queue_status = QueueStatus::Closed;

        self.save();
    }

    /// Moves the tournament to a new lifecycle state.
    pub fn set_status(&mut self, status: TournamentStatus) {
        self.status = status;

        self.save();
    }

    /// Toggles captain scoring, returning the new value.
    pub fn toggle_captain_scoring(&mut self) -> bool {
        self.captain_scoring = !self.captain_scoring;

        self.save();

        self.captain_scoring
    }

    /// Toggles the screenshot proof requirement, returning the new value.
    pub fn toggle_screenshot_proof(&mut self) -> bool {
        self.screenshot_proof = !self.screenshot_proof;

        self.save();

        self.screenshot_proof
    }

    /// Toggles the advertised bracket type, returning the new value.
    pub fn toggle_bracket_type(&mut self) -> BracketType {
        self.bracket_type = match self.bracket_type {
            BracketType::SingleElim => BracketType::DoubleElim,
            BracketType::DoubleElim => BracketType::SingleElim,
        };

        self.save();

        self.bracket_type
    }

    /// Adjusts the cached player/spectator counters, never going below zero.
    pub fn adjust_counts(&mut self, players: i64, spectators: i64) {
        self.players_joined = (self.players_joined as i64 + players).max(0) as u32;
        self.spectators_joined = (self.spectators_joined as i64 + spectators).max(0) as u32;

        self.save();
    }

    /// Registers one more team in the tournament.
    pub fn team_joined(&mut self) {
        self.teams_joined += 1;

        self.save();
    }

    /// Unregisters `count` teams from the tournament.
    pub fn teams_left(&mut self, count: u16) {
        self.teams_joined = self.teams_joined.saturating_sub(count);

        self.save();
    }

    /// Remembers the control panel message, once posted.
    pub fn set_panel_message(&mut self, message: MessageId) {
        self.panel_message = Some(message);

        self.save();
    }

    /// Remembers the permanent invite code shown on the join panel.
    pub fn set_join_invite_code(&mut self, invite_code: String) {
        self.join_invite_code = Some(invite_code);

        self.save();
    }

    /// Remembers where the join panel lives, for live updates.
    pub fn set_join_panel(&mut self, channel: ChannelId, message: MessageId) {
        self.join_panel_channel = Some(channel);
        self.join_panel_message = Some(message);

        self.save();
    }

    /// Remembers the last posted bracket view message.
    pub fn set_bracket_message(&mut self, message: MessageId) {
        self.bracket_message = Some(message);

        self.save();
    }

    /// Remembers the category holding per-match channels.
    pub fn set_matches_category(&mut self, category: ChannelId) {
        self.matches_category = Some(category);

        self.save();
    }

    /// Remembers the category holding per-team hub channels.
    pub fn set_teams_category(&mut self, category: ChannelId) {
        self.teams_category = Some(category);

        self.save();
    }

    /// Saves the tournament to disk as a JSON file.
    ///
    /// Tournament files are saved as `guilds/<guild_id>/tournament.json`.
    pub fn save(&self) {
        let json = serde_json::to_string_pretty(self).expect(
            format!(
                "[Tournament {}] Could not serialize the tournament struct.",
                self.guild
            )
            .as_str(),
        );

        fs::write(utils::guild_dir(&self.guild).join("tournament.json"), json).expect(
            format!(
                "[Tournament {}] Could not write the tournament file to disk.",
                self.guild
            )
            .as_str(),
        );
    }

    /// Loads a Tournament instance from a JSON string and returns it.
    pub fn from_json(json: &str) -> Tournament {
        serde_json::from_str(json).expect("[Tournament] Could not parse data as valid JSON.")
    }
}

/* Static methods: */

/// Retrieves the tournament hosted by a guild, if any.
pub fn get_tournament(guild_id: &GuildId) -> Option<Tournament> {
    if let Ok(json) = fs::read_to_string(utils::guild_dir(guild_id).join("tournament.json")) {
        Some(Tournament::from_json(&json))
    } else {
        None
    }
}

macro_rules! get_existing_tournament {
    ($guild_id:expr) => {
        tournament::get_tournament($guild_id).expect(
            format!(
                "[Tournament] Could not find a tournament for guild {}.",
                $guild_id
            )
            .as_str(),
        )
    };
}
pub(crate) use get_existing_tournament;

/**
 * Removes every piece of tournament state stored for a guild: the tournament
 * itself, the bracket, the bot player pool, all team files, and each player's
 * membership and pending invites. The player files themselves survive, since
 * they mirror guild membership rather than tournament participation.
 */
pub fn purge_guild_data(guild_id: &GuildId) {
    let dir = utils::guild_dir(guild_id);

    for file in ["tournament.json", "bracket.json", "bots.json"] {
        let path = dir.join(file);
        if fs::metadata(&path).is_ok() {
            fs::remove_file(&path).expect(
                format!("[Tournament] Could not delete {} for guild {}.", file, guild_id).as_str(),
            );
        }
    }

    let teams = utils::teams_dir(guild_id);
    if fs::metadata(&teams).is_ok() {
        fs::remove_dir_all(&teams).expect(
            format!(
                "[Tournament] Could not delete the teams directory for guild {}.",
                guild_id
            )
            .as_str(),
        );
    }
    fs::create_dir_all(&teams).expect(
        format!(
            "[Tournament] Could not recreate the teams directory for guild {}.",
            guild_id
        )
        .as_str(),
    );

    player::reset_all(guild_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_accept_the_original_ranges() {
        assert!(validate_settings(8, 2, 3).is_ok());
        assert!(validate_settings(32, 1, 1).is_ok());
        assert!(validate_settings(4, 6, 5).is_ok());
    }

    #[test]
    fn settings_reject_zero_teams() {
        assert!(validate_settings(0, 2, 3).is_err());
    }

    #[test]
    fn settings_reject_out_of_range_team_sizes() {
        assert!(validate_settings(8, 0, 3).is_err());
        assert!(validate_settings(8, 7, 3).is_err());
    }

    #[test]
    fn settings_reject_even_best_of() {
        assert!(validate_settings(8, 2, 2).is_err());
        assert!(validate_settings(8, 2, 4).is_err());
        assert!(validate_settings(8, 2, 7).is_err());
    }
}
