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
use getset::Getters;
use serde::{Deserialize, Serialize};
use serenity::all::GuildId;
use std::fs;

/// A fake player used to fill tournaments for testing. Bot players carry no
/// Discord identity, just a label; `/bots force_teams` turns groups of them
/// into ready teams.
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Clone, Serialize, Deserialize, Getters)]
pub struct BotPlayer {
    #[getset(get = "pub")]
    label: String,
}

/**
 * Loads the stored bot players of a guild (empty when none were added).
 */
pub fn load_bots(guild_id: &GuildId) -> Vec<BotPlayer> {
    if let Ok(json) = fs::read_to_string(utils::guild_dir(guild_id).join("bots.json")) {
        serde_json::from_str(&json).expect(
            format!(
                "[BotPlayer] Could not parse the bot players of guild {} as valid JSON.",
                guild_id
            )
            .as_str(),
        )
    } else {
        Vec::new()
    }
}

/**
 * Updates the persistent bot player pool of a guild.
 */
pub fn save_bots(guild_id: &GuildId, bots: &Vec<BotPlayer>) {
    let json = serde_json::to_string_pretty(bots).expect(
        format!(
            "[BotPlayer] Could not serialize the bot players of guild {} into JSON.",
            guild_id
        )
        .as_str(),
    );
    fs::write(utils::guild_dir(guild_id).join("bots.json"), json).expect(
        format!(
            "[BotPlayer] Could not write the bot players of guild {} to disk.",
            guild_id
        )
        .as_str(),
    );
}

/**
 * Appends `count` new bot players to a guild's pool, numbering them after the
 * ones already stored. Returns the new labels for reporting.
 */
pub fn add_bots(guild_id: &GuildId, count: usize) -> Vec<String> {
    let mut bots = load_bots(guild_id);
    let existing = bots.len();

    let mut labels = Vec::with_capacity(count);
    for i in 0..count {
        let label = format!("Bot #{}", existing + i + 1);
        bots.push(BotPlayer {
            label: label.clone(),
        });
        labels.push(label);
    }

    save_bots(guild_id, &bots);

    labels
}

/**
 * Removes and returns the first `count` bot players of a guild's pool.
 */
pub fn take_bots(guild_id: &GuildId, count: usize) -> Vec<BotPlayer> {
    let mut bots = load_bots(guild_id);
    let taken = bots.drain(..count.min(bots.len())).collect::<Vec<_>>();

    save_bots(guild_id, &bots);

    taken
}

/**
 * Deletes every stored bot player of a guild.
 */
pub fn clear_bots(guild_id: &GuildId) {
    let path = utils::guild_dir(guild_id).join("bots.json");
    if fs::metadata(&path).is_ok() {
        fs::remove_file(&path).expect(
            format!(
                "[BotPlayer] Could not delete the bot players file of guild {}.",
                guild_id
            )
            .as_str(),
        );
    }
}
