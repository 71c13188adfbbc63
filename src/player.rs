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
use crate::teaminvite::TeamInvite;
use crate::utils;
use getset::{CopyGetters, Getters, Setters};
use serde::{Deserialize, Serialize};
use serenity::all::{GuildId, RoleId, UserId};
use std::fs;

/**
 * Data structure defining a guild member known to the bot and their
 * tournament state in that guild.
 *
 * One record per (guild, user) pair; records are created lazily when a user
 * first shows up, either at startup or when they trigger a command.
 */
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Serialize, Deserialize, Getters, CopyGetters, Setters)]
pub struct Player {
    #[getset(get_copy = "pub")]
    guild: GuildId,
    #[getset(get_copy = "pub")]
    id: UserId,
    #[getset(get = "pub", set = "pub")]
    name: String,
    /// Role of the team the player currently belongs to, if any.
    #[getset(get_copy = "pub")]
    team: Option<RoleId>,
    /// Pending team invites.
    #[getset(get = "pub")]
    invites: Vec<TeamInvite>,
    /// Whether the player joined the tournament as a spectator.
    #[getset(get_copy = "pub")]
    spectator: bool,
}

impl Player {
    /**
     * Constructor for a player record.
     */
    pub fn new(guild: GuildId, id: UserId, name: String) -> Player {
        let res = Self {
            guild,
            id,
            name,
            team: None,
            // Size 1: players rarely collect invites from several teams.
            invites: Vec::with_capacity(1),
            spectator: false,
        };

        res.save();

        res
    }

    /**
     * Puts the player on a team, dropping any pending invites.
     */
    pub fn set_team(&mut self, team: RoleId) {
        self.team = Some(team);
        self.invites.clear();

        self.save();
    }

    /**
     * Takes the player off their current team.
     */
    pub fn clear_team(&mut self) {
        self.team = None;

        self.save();
    }

    /**
     * Marks or unmarks the player as a spectator.
     */
    pub fn set_spectator(&mut self, spectator: bool) {
        self.spectator = spectator;

        self.save();
    }

    /**
     * Records a new pending team invite, ignoring duplicates for the same
     * team.
     */
    pub fn add_invite(&mut self, invite: TeamInvite) {
        if self.invites.contains(&invite) {
            return;
        }
        self.invites.push(invite);

        self.save();
    }

    /**
     * Retrieves the pending invite for a given team, if any.
     */
    pub fn invite_for(&self, team: &RoleId) -> Option<&TeamInvite> {
        self.invites.iter().find(|invite| invite.team() == team)
    }

    /**
     * Saves the player record to disk as a JSON file.
     *
     * Player files are saved as `guilds/<guild_id>/players/<user_id>.json`.
     */
    pub fn save(&self) {
        let json = serde_json::to_string_pretty(self).expect(
            format!(
                "[Player {}] Could not serialize the player struct.",
                self.id
            )
            .as_str(),
        );

        fs::write(
            utils::players_dir(&self.guild).join(format!("{}.json", self.id)),
            json,
        )
        .expect(
            format!(
                "[Player {}] Could not write the player file to disk.",
                self.id
            )
            .as_str(),
        );
    }

    /**
     * Loads a Player instance from a JSON string and returns it.
     */
    pub fn from_json(json: &str) -> Player {
        serde_json::from_str(json).expect("[Player] Could not parse data as valid JSON.")
    }
}

/**
 * Retrieves a player record given its guild and Discord ID, if it exists.
 */
pub fn get_player(guild_id: &GuildId, user_id: &UserId) -> Option<Player> {
    if let Ok(json) =
        fs::read_to_string(utils::players_dir(guild_id).join(format!("{}.json", user_id)))
    {
        Some(Player::from_json(&json))
    } else {
        None
    }
}

/**
 * Retrieves a player record, creating it first when the user is not yet known
 * (e.g. they joined the guild after the bot booted).
 */
pub fn get_or_register_player(guild_id: &GuildId, user_id: &UserId, user_name: &str) -> Player {
    match get_player(guild_id, user_id) {
        Some(player) => player,
        None => Player::new(*guild_id, *user_id, user_name.to_string()),
    }
}

/**
 * Resets the tournament state (team, invites, spectator flag) of every player
 * record in a guild. Used when the tournament is deleted.
 */
pub fn reset_all(guild_id: &GuildId) {
    let Ok(entries) = fs::read_dir(utils::players_dir(guild_id)) else {
        return;
    };

    for entry in entries.flatten() {
        let Ok(json) = fs::read_to_string(entry.path()) else {
            continue;
        };
        let mut player = Player::from_json(&json);
        player.team = None;
        player.invites.clear();
        player.spectator = false;
        player.save();
    }
}
