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
use crate::player::{self, Player};
use crate::{team, utils};
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use serenity::all::{ChannelId, GuildId, RoleId, UserId};
use std::{collections::HashSet, fs};

/// Prefix carried by every human team's Discord role ("Team | <name>").
pub const TEAM_ROLE_PREFIX: &str = "Team | ";
/// Prefix carried by every forced bot team's name and Discord role.
pub const BOT_TEAM_PREFIX: &str = "Bot Team ";

/// Data structure defining a tournament team.
///
/// Teams are keyed by their Discord role: the role grants access to the
/// team's private hub channel and, once matches start, to its match channels.
///
/// Ready teams take part in bracket generation. A team may only ready up once
/// its roster reaches the tournament's team size; bot teams are born ready.
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Serialize, Deserialize, Getters, CopyGetters)]
pub struct Team {
    /// Identifier for the guild the team belongs to.
    #[getset(get_copy = "pub")]
    guild: GuildId,
    /// Team display name (unique within the guild).
    #[getset(get = "pub")]
    name: String,
    /// The team's Discord role (immutable; primary key).
    #[getset(get_copy = "pub")]
    role: RoleId,
    /// The team's private hub channel.
    #[getset(get_copy = "pub")]
    channel: ChannelId,
    /// The player that created the team.
    #[getset(get_copy = "pub")]
    captain: UserId,
    /// Team members (stored as Discord identifiers).
    #[getset(get = "pub")]
    members: HashSet<UserId>,
    /// Whether the team declared itself ready to play.
    #[getset(get_copy = "pub")]
    ready: bool,
    /// Whether this is a forced bot team used for testing.
    #[getset(get_copy = "pub")]
    bot: bool,
}

impl Team {
    /// Constructor for a team. Human teams start empty and not ready (the
    /// captain is added right after through `add_member`); bot teams have no
    /// member users and are marked ready immediately.
    pub fn new(
        guild: GuildId,
        name: String,
        role: RoleId,
        channel: ChannelId,
        captain: UserId,
        bot: bool,
    ) -> Team {
        let res = Self {
            guild,
            name,
            role,
            channel,
            captain,
            members: HashSet::with_capacity(2),
            ready: bot,
            bot,
        };

        res.save();

        res
    }

    /// Adds the given player to the team.
    pub fn add_member(&mut self, player: &mut Player) {
        if !self.members.insert(player.id()) {
            return;
        }

        player.set_team(self.role);

        self.save();
    }

    /// Removes the given player from the team. Returns `true` when the team
    /// was emptied out and deleted from the system as a consequence.
    pub fn remove_member(&mut self, player: &mut Player) -> bool {
        if !self.members.remove(&player.id()) {
            return false;
        }

        player.clear_team();

        // A team that loses a member is no longer a full, ready roster:
        self.ready = false;

        if self.members.is_empty() {
            self.delete();
            return true;
        }

        self.save();
        false
    }

    /// Hands the captaincy to another member (used when the captain leaves
    /// but the team survives).
    pub fn set_captain(&mut self, captain: UserId) {
        self.captain = captain;

        self.save();
    }

    /// Marks or unmarks the team as ready to play.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;

        self.save();
    }

    /// Deletes the team from the system, clearing each remaining member's
    /// team assignment first.
    pub fn delete(&self) {
        for member in self.members.iter() {
            if let Some(mut member_player) = player::get_player(&self.guild, member) {
                member_player.clear_team();
            }
        }

        fs::remove_file(
            utils::teams_dir(&self.guild).join(format!("{}.json", self.role)),
        )
        .expect(
            format!(
                "[Team {}-{}] Could not delete the persistence (JSON) file for the team.",
                self.guild, self.name,
            )
            .as_str(),
        );
    }

    /// Saves the team's information to disk as a JSON file.
    ///
    /// Team files are saved as `guilds/<guild_id>/teams/<role_id>.json`.
    pub fn save(&self) {
        let json = serde_json::to_string_pretty(self).expect(
            format!(
                "[Team {}-{}] Could not serialize the team struct.",
                self.guild, self.name
            )
            .as_str(),
        );

        // Suppose the guild's teams/ directory exists.
        fs::write(
            utils::teams_dir(&self.guild).join(format!("{}.json", self.role)),
            json,
        )
        .expect(
            format!(
                "[Team {}-{}] Could not write the team file to disk.",
                self.guild, self.name
            )
            .as_str(),
        );
    }

    /// Loads a Team instance from a JSON string and returns it.
    pub fn from_json(json: &str) -> Team {
        serde_json::from_str(json).expect("[Team] Could not parse data as valid JSON.")
    }
}

/* Static methods: */

/// Retrieves a Team object given its guild and role, if it exists.
pub fn get_team(guild_id: &GuildId, role: &RoleId) -> Option<Team> {
    if let Ok(json) = fs::read_to_string(utils::teams_dir(guild_id).join(format!("{}.json", role)))
    {
        Some(Team::from_json(&json))
    } else {
        None
    }
}

macro_rules! get_existing_team {
    ($guild_id:expr, $role:expr) => {
        team::get_team($guild_id, $role).expect(
            format!(
                "[Team] Could not find the team with role {} in guild {}.",
                $role, $guild_id
            )
            .as_str(),
        )
    };
}
pub(crate) use get_existing_team;

/// Retrieves every team of a guild, in no particular order.
pub fn all_teams(guild_id: &GuildId) -> Vec<Team> {
    let Ok(entries) = fs::read_dir(utils::teams_dir(guild_id)) else {
        return Vec::new();
    };

    let mut teams = Vec::new();
    for entry in entries.flatten() {
        if entry.path().extension().map(|ext| ext == "json") != Some(true) {
            continue;
        }
        let json = fs::read_to_string(entry.path()).expect(
            format!(
                "[Team] Could not read the team file {}.",
                entry.path().display()
            )
            .as_str(),
        );
        teams.push(Team::from_json(&json));
    }

    teams
}

/// Retrieves the teams of a guild that are ready to play, sorted by name so
/// that bracket seeding sees a stable input order.
pub fn ready_teams(guild_id: &GuildId) -> Vec<Team> {
    let mut teams = all_teams(guild_id)
        .into_iter()
        .filter(|team| team.ready())
        .collect::<Vec<_>>();
    teams.sort_by(|a, b| a.name().cmp(b.name()));

    teams
}

/// Retrieves a team by its display name, if it exists.
pub fn find_by_name(guild_id: &GuildId, name: &str) -> Option<Team> {
    all_teams(guild_id)
        .into_iter()
        .find(|team| team.name() == name)
}
