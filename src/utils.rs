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
use regex::Regex;
use serenity::all::GuildId;
use std::path::PathBuf;
use std::{env, fs};

/* Persistent storage layout:
 *
 *   <data root>/guilds/<guild_id>/tournament.json
 *   <data root>/guilds/<guild_id>/bracket.json
 *   <data root>/guilds/<guild_id>/bots.json
 *   <data root>/guilds/<guild_id>/results.log
 *   <data root>/guilds/<guild_id>/teams/<role_id>.json
 *   <data root>/guilds/<guild_id>/players/<user_id>.json
 */

/**
 * Root directory for all persistent data.
 *
 * Defaults to `./data`, overridable through the AGON_DATA_DIR environmental
 * variable.
 */
pub fn data_root() -> PathBuf {
    PathBuf::from(env::var("AGON_DATA_DIR").unwrap_or_else(|_| String::from("data")))
}

/// Directory holding one subdirectory per guild the bot is in.
pub fn guilds_root() -> PathBuf {
    data_root().join("guilds")
}

/// Directory holding a single guild's persistent data.
pub fn guild_dir(guild_id: &GuildId) -> PathBuf {
    guilds_root().join(guild_id.to_string())
}

/// Directory holding a single guild's team files.
pub fn teams_dir(guild_id: &GuildId) -> PathBuf {
    guild_dir(guild_id).join("teams")
}

/// Directory holding a single guild's player files.
pub fn players_dir(guild_id: &GuildId) -> PathBuf {
    guild_dir(guild_id).join("players")
}

/**
 * Macro for logging the usage of a command.
 *
 * Inserted at the top of every command by the `#[agon::log_cmd]` attribute.
 */
macro_rules! log_cmd {
    ($ctx:ident) => {
        tracing::info!(
            command = %$ctx.invocation_string(),
            author = %$ctx.author().tag(),
            author_id = %$ctx.author().id,
            "command invoked"
        );
    };
}
pub(crate) use log_cmd;

/**
 * Macro for retrieving the guild ID from a Context object.
 */
macro_rules! get_guild_id {
    ($ctx:ident) => {
        $ctx.guild_id()
            .expect("The command was not executed in a guild.")
    };
}
pub(crate) use get_guild_id;

/**
 * Macro for retrieving the player record of the author of a command.
 */
macro_rules! get_triggering_player {
    ($ctx:ident, $gid:expr) => {
        crate::player::get_or_register_player(&$gid, &$ctx.author().id, &$ctx.author().name)
    };
}
pub(crate) use get_triggering_player;

/**
 * Creates the directories expected for the bot to function properly.
 */
pub fn init_filesystem() {
    fs::create_dir_all(guilds_root()).expect("Could not create the guilds data directory.");
}

/**
 * Creates the per-guild directories and files, if any of them is missing.
 */
pub fn init_guild_storage(guild_id: &GuildId) {
    fs::create_dir_all(teams_dir(guild_id)).expect(
        format!("Could not create the teams directory for guild {}.", guild_id).as_str(),
    );
    fs::create_dir_all(players_dir(guild_id)).expect(
        format!(
            "Could not create the players directory for guild {}.",
            guild_id
        )
        .as_str(),
    );

    let results_log = guild_dir(guild_id).join("results.log");
    if fs::metadata(&results_log).is_err() {
        fs::write(&results_log, "").expect(
            format!("Could not create the results log for guild {}.", guild_id).as_str(),
        );
    }
}

/**
 * Appends a timestamped line to the guild's match results log.
 */
pub fn append_result_log(guild_id: &GuildId, line: &str) {
    let path = guild_dir(guild_id).join("results.log");
    let mut log = fs::read_to_string(&path).unwrap_or_default();
    log.push_str(format!("[{}] {}\n", chrono::Utc::now().to_rfc3339(), line).as_str());
    fs::write(&path, log)
        .expect(format!("Could not write the results log for guild {}.", guild_id).as_str());
}

/**
 * Turns a free-form team name into a Discord channel name slug.
 *
 * Lowercase, runs of non-alphanumerics collapsed into single hyphens, capped
 * at 20 characters. Falls back to "team" for names with no usable characters.
 */
pub fn slug(name: &str) -> String {
    let re = Regex::new(r"[^a-z0-9]+").expect("The slug pattern is not a valid regex.");
    let lowered = name.to_lowercase();
    let slug = re
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .chars()
        .take(20)
        .collect::<String>();
    let slug = slug.trim_matches('-').to_string();

    if slug.is_empty() {
        String::from("team")
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_lowercases_and_hyphenates() {
        assert_eq!(slug("T0G Demons"), "t0g-demons");
    }

    #[test]
    fn slug_collapses_symbol_runs() {
        assert_eq!(slug("alpha // beta!!"), "alpha-beta");
    }

    #[test]
    fn slug_caps_length() {
        let long = "a very long team name indeed";
        assert!(slug(long).len() <= 20);
        assert!(!slug(long).ends_with('-'));
    }

    #[test]
    fn slug_falls_back_for_unusable_names() {
        assert_eq!(slug("!!!"), "team");
    }
}
