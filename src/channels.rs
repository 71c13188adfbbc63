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
use crate::team::{BOT_TEAM_PREFIX, TEAM_ROLE_PREFIX};
use crate::tournament::Tournament;
use crate::utils;
use serenity::all::{
    ChannelId, ChannelType, Colour, CreateChannel, CreateEmbed, CreateMessage, EditRole, GuildId,
    Http, PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId, UserId,
};
use std::sync::Arc;
use std::time::Duration;

/* Fixed channel names, as created under the tournament category: */

pub const ADMIN_CHANNEL: &str = "🔒│tournament-admin";
pub const ANNOUNCEMENTS_CHANNEL: &str = "📢│tournament-announcements";
pub const RULES_CHANNEL: &str = "📜│tournament-rules";
pub const CREATE_TEAM_CHANNEL: &str = "🏷│create-team";
pub const TEAMS_CHANNEL: &str = "🧾│tournament-teams";
pub const CHAT_CHANNEL: &str = "💬│tournament-chat";
pub const BRACKET_CHANNEL: &str = "🏆│bracket-and-scores";
pub const RESULTS_CHANNEL: &str = "🎯│match-results";

/// Name of the shared category holding the per-team hub channels.
pub const TEAMS_CATEGORY: &str = "🛡 Tournament Teams";

/// Seconds a match channel lives after its score is submitted.
pub const MATCH_CHANNEL_LINGER_SECS: u64 = 5;

/// Everything `/tournament create` sets up on the Discord side, handed to the
/// Tournament constructor as its anchors.
pub struct Scaffold {
    pub category: ChannelId,
    pub admin_channel: ChannelId,
    pub announcements_channel: ChannelId,
    pub rules_channel: ChannelId,
    pub create_team_channel: ChannelId,
    pub teams_channel: ChannelId,
    pub chat_channel: ChannelId,
    pub bracket_channel: ChannelId,
    pub results_channel: ChannelId,
    pub player_role: RoleId,
    pub spectator_role: RoleId,
}

/* Permission overwrite helpers: */

/// The @everyone role of a guild shares the guild's identifier.
fn everyone_role(guild: GuildId) -> RoleId {
    RoleId::new(guild.get())
}

fn hide_from_everyone(guild: GuildId) -> PermissionOverwrite {
    PermissionOverwrite {
        allow: Permissions::empty(),
        deny: Permissions::VIEW_CHANNEL
            | Permissions::SEND_MESSAGES
            | Permissions::READ_MESSAGE_HISTORY,
        kind: PermissionOverwriteType::Role(everyone_role(guild)),
    }
}

fn read_only(role: RoleId) -> PermissionOverwrite {
    PermissionOverwrite {
        allow: Permissions::VIEW_CHANNEL | Permissions::READ_MESSAGE_HISTORY,
        deny: Permissions::SEND_MESSAGES,
        kind: PermissionOverwriteType::Role(role),
    }
}

fn read_write(role: RoleId) -> PermissionOverwrite {
    PermissionOverwrite {
        allow: Permissions::VIEW_CHANNEL
            | Permissions::SEND_MESSAGES
            | Permissions::READ_MESSAGE_HISTORY,
        deny: Permissions::empty(),
        kind: PermissionOverwriteType::Role(role),
    }
}

fn read_write_attach(role: RoleId) -> PermissionOverwrite {
    PermissionOverwrite {
        allow: Permissions::VIEW_CHANNEL
            | Permissions::SEND_MESSAGES
            | Permissions::READ_MESSAGE_HISTORY
            | Permissions::ATTACH_FILES,
        deny: Permissions::empty(),
        kind: PermissionOverwriteType::Role(role),
    }
}

fn hidden(role: RoleId) -> PermissionOverwrite {
    PermissionOverwrite {
        allow: Permissions::empty(),
        deny: Permissions::VIEW_CHANNEL,
        kind: PermissionOverwriteType::Role(role),
    }
}

/**
 * Creates the tournament roles, the tournament category, and the fixed
 * channel set underneath it, seeding each informational channel with its
 * intro message.
 *
 * Permission matrix: the admin channel is staff-only, informational channels
 * are read-only for players and spectators, and the chat channel is open to
 * both.
 */
pub async fn create_scaffolding(
    http: &Http,
    guild: GuildId,
    tournament_name: &str,
) -> serenity::Result<Scaffold> {
    // Roles first; every overwrite below needs them:
    let player_role = guild
        .create_role(
            http,
            EditRole::new()
                .name(format!("{} Player", tournament_name))
                .mentionable(true),
        )
        .await?;
    let spectator_role = guild
        .create_role(
            http,
            EditRole::new()
                .name(format!("{} Spectator", tournament_name))
                .mentionable(true),
        )
        .await?;

    let category = guild
        .create_channel(
            http,
            CreateChannel::new(format!("🎮 {}", tournament_name))
                .kind(ChannelType::Category)
                .permissions(vec![
                    hide_from_everyone(guild),
                    read_write(player_role.id),
                    read_only(spectator_role.id),
                ]),
        )
        .await?;

    let text_channel = |name: &str, overwrites: Vec<PermissionOverwrite>| {
        CreateChannel::new(name)
            .kind(ChannelType::Text)
            .category(category.id)
            .permissions(overwrites)
    };

    let admin_channel = guild
        .create_channel(
            http,
            text_channel(
                ADMIN_CHANNEL,
                vec![
                    hide_from_everyone(guild),
                    hidden(player_role.id),
                    hidden(spectator_role.id),
                ],
            ),
        )
        .await?;

    let informational = |name: &str| {
        text_channel(
            name,
            vec![
                hide_from_everyone(guild),
                read_only(player_role.id),
                read_only(spectator_role.id),
            ],
        )
    };

    let announcements_channel = guild.create_channel(http, informational(ANNOUNCEMENTS_CHANNEL)).await?;
    let rules_channel = guild.create_channel(http, informational(RULES_CHANNEL)).await?;
    let create_team_channel = guild.create_channel(http, informational(CREATE_TEAM_CHANNEL)).await?;
    let teams_channel = guild.create_channel(http, informational(TEAMS_CHANNEL)).await?;
    let bracket_channel = guild.create_channel(http, informational(BRACKET_CHANNEL)).await?;
    let results_channel = guild.create_channel(http, informational(RESULTS_CHANNEL)).await?;

    // Tournament chat: players and spectators can both talk.
    let chat_channel = guild
        .create_channel(
            http,
            text_channel(
                CHAT_CHANNEL,
                vec![
                    hide_from_everyone(guild),
                    read_write(player_role.id),
                    read_write(spectator_role.id),
                ],
            ),
        )
        .await?;

    // Intro content, mirrored on each informational channel:
    announcements_channel
        .send_message(
            http,
            CreateMessage::new().content(
                "📢 **Tournament Announcements**\n\
                All official updates for this tournament will be posted here.\n\
                Only staff can speak in this channel.",
            ),
        )
        .await?;

    rules_channel
        .send_message(
            http,
            CreateMessage::new().embed(
                CreateEmbed::new()
                    .title("📜 Tournament Rules")
                    .description(
                        "Here you can add the rules for your tournament.\n\n\
                        Suggested sections:\n\
                        • Format (2v2, 3v3, etc.)\n\
                        • Map / mode rules\n\
                        • No-cheating / fair play rules\n\
                        • Host / server settings\n\
                        • Reporting scores & screenshots\n",
                    )
                    .colour(Colour::ORANGE),
            ),
        )
        .await?;

    create_team_channel
        .send_message(
            http,
            CreateMessage::new().embed(
                CreateEmbed::new()
                    .title("Create Your Tournament Team")
                    .description(
                        "Use `/team create <name>` to create your team.\n\n\
                        When you create a team, the bot will:\n\
                        • Create a **team role** and give it to you (captain)\n\
                        • Create a **private team hub** channel\n\
                        • Update the **admin panel** and **join panel** with the new team count\n\n\
                        Invite teammates with `/team invite`, and once your roster is full, \
                        mark the team ready with `/team ready` to be included in the bracket.\n\
                        You can also disband your team later with `/team disband`.",
                    )
                    .colour(Colour::DARK_GREEN),
            ),
        )
        .await?;

    teams_channel
        .send_message(
            http,
            CreateMessage::new().content(
                "🧾 **Tournament Teams**\n\
                Teams that ready up will have their roster posted here.",
            ),
        )
        .await?;

    bracket_channel
        .send_message(
            http,
            CreateMessage::new().content(
                "🏆 **Bracket and Scores**\n\
                The bracket view and live match scores will be posted here.",
            ),
        )
        .await?;

    results_channel
        .send_message(
            http,
            CreateMessage::new().content(
                "🎯 **Match Results**\n\
                After each match, its final score will be reported here.",
            ),
        )
        .await?;

    Ok(Scaffold {
        category: category.id,
        admin_channel: admin_channel.id,
        announcements_channel: announcements_channel.id,
        rules_channel: rules_channel.id,
        create_team_channel: create_team_channel.id,
        teams_channel: teams_channel.id,
        chat_channel: chat_channel.id,
        bracket_channel: bracket_channel.id,
        results_channel: results_channel.id,
        player_role: player_role.id,
        spectator_role: spectator_role.id,
    })
}

/**
 * Returns the shared per-team hub category, creating it on first use.
 */
pub async fn get_or_create_teams_category(
    http: &Http,
    t: &mut Tournament,
) -> serenity::Result<ChannelId> {
    if let Some(category) = t.teams_category() {
        return Ok(category);
    }

    let category = t
        .guild()
        .create_channel(
            http,
            CreateChannel::new(TEAMS_CATEGORY)
                .kind(ChannelType::Category)
                .permissions(vec![hide_from_everyone(t.guild())]),
        )
        .await?;
    t.set_teams_category(category.id);

    Ok(category.id)
}

/**
 * Returns the per-match channel category, creating it on first use.
 */
pub async fn get_or_create_matches_category(
    http: &Http,
    t: &mut Tournament,
) -> serenity::Result<ChannelId> {
    if let Some(category) = t.matches_category() {
        return Ok(category);
    }

    let category = t
        .guild()
        .create_channel(
            http,
            CreateChannel::new(format!("🎯 {} Matches", t.name()))
                .kind(ChannelType::Category)
                .permissions(vec![hide_from_everyone(t.guild())]),
        )
        .await?;
    t.set_matches_category(category.id);

    Ok(category.id)
}

/**
 * Creates a team's Discord role and private hub channel.
 *
 * Human teams get a "Team | <name>" role and a hub with usage instructions;
 * bot teams get their name as role and a plain roster message.
 */
pub async fn create_team_hub(
    http: &Http,
    t: &mut Tournament,
    team_name: &str,
    bot: bool,
) -> serenity::Result<(RoleId, ChannelId)> {
    let guild = t.guild();
    let role_name = if bot {
        team_name.to_string()
    } else {
        format!("{}{}", TEAM_ROLE_PREFIX, team_name)
    };

    let role = guild
        .create_role(http, EditRole::new().name(role_name).mentionable(!bot))
        .await?;

    let category = get_or_create_teams_category(http, t).await?;

    let channel_name = if bot {
        format!("team-bot-{}", utils::slug(team_name.trim_start_matches(BOT_TEAM_PREFIX)))
    } else {
        format!("🛡│team-{}", utils::slug(team_name))
    };

    let channel = guild
        .create_channel(
            http,
            CreateChannel::new(channel_name)
                .kind(ChannelType::Text)
                .category(category)
                .permissions(vec![hide_from_everyone(guild), read_write(role.id)]),
        )
        .await?;

    if !bot {
        channel
            .send_message(
                http,
                CreateMessage::new().embed(
                    CreateEmbed::new()
                        .title(format!("Team Hub — {}", team_name))
                        .description(format!(
                            "Welcome <@&{}>! This is your private team hub.\n\n\
                            • `/team invite` – invite tournament players to the team\n\
                            • `/team ready` – mark your team as ready (posts your roster to \
                            the tournament teams list)\n\
                            • `/team leave` – leave the team\n\
                            • `/team disband` – remove this team (channel, role, and listings)\n",
                            role.id
                        ))
                        .colour(Colour::BLURPLE),
                ),
            )
            .await?;
    }

    Ok((role.id, channel.id))
}

/**
 * Creates the private channel for a bracket match, visible only to the two
 * team roles, and posts the match brief in it.
 */
pub async fn create_match_channel(
    http: &Http,
    t: &Tournament,
    matches_category: ChannelId,
    match_id: u32,
    team_a: &str,
    team_b: &str,
    role_a: Option<RoleId>,
    role_b: Option<RoleId>,
) -> serenity::Result<ChannelId> {
    let guild = t.guild();

    let mut overwrites = vec![hide_from_everyone(guild)];
    for role in [role_a, role_b].into_iter().flatten() {
        overwrites.push(read_write_attach(role));
    }

    let channel = guild
        .create_channel(
            http,
            CreateChannel::new(format!(
                "match-{}-{}-vs-{}",
                match_id,
                utils::slug(team_a),
                utils::slug(team_b)
            ))
            .kind(ChannelType::Text)
            .category(matches_category)
            .permissions(overwrites),
        )
        .await?;

    let proof_line = if t.screenshot_proof() {
        "Attach a **screenshot** of the final scoreboard when reporting.\n"
    } else {
        ""
    };
    let scorer_line = if t.captain_scoring() {
        "Captains and staff can submit the score."
    } else {
        "Only staff can submit the score."
    };

    channel
        .send_message(
            http,
            CreateMessage::new().embed(
                CreateEmbed::new()
                    .title(format!("Match {}: {} vs {}", match_id, team_a, team_b))
                    .description(format!(
                        "📣 **Match Started!** **{}** vs **{}**\n\n\
                        Bracket Match **#{}**, **Best-of-{}**.\n\n\
                        Report the result with `/bracket score {} <{} score> <{} score>`.\n\
                        {}{} No ties allowed.\n\
                        Results will be posted in **#bracket-and-scores**, the winner \
                        advances, and this channel will be deleted shortly after scoring.",
                        team_a, team_b, match_id, t.best_of(), match_id, team_a, team_b,
                        proof_line, scorer_line
                    ))
                    .colour(Colour::from_rgb(201, 0, 43)),
            ),
        )
        .await?;

    Ok(channel.id)
}

/**
 * Schedules a channel for deletion after a short delay, so the participants
 * can read the final message posted in it.
 */
pub fn delete_channel_later(http: Arc<Http>, channel: ChannelId, delay_secs: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        if let Err(e) = channel.delete(&http).await {
            tracing::warn!(channel = %channel, error = %e, "failed to delete match channel");
        }
    });
}

/**
 * Whether a guild member currently holds the given role.
 */
pub async fn member_has_role(http: &Http, guild: GuildId, user: UserId, role: RoleId) -> bool {
    match guild.member(http, user).await {
        Ok(member) => member.roles.contains(&role),
        Err(_) => false,
    }
}

/**
 * Tears down every Discord artifact of a tournament: the stored invite, the
 * main category and its channels, the team hub and match categories, stray
 * team channels, and all tournament roles (player, spectator, human teams,
 * bot teams).
 *
 * Individual failures are logged and skipped; a half-deleted tournament must
 * still end up as deleted as possible.
 */
pub async fn delete_tournament_artifacts(http: &Http, t: &Tournament) {
    let guild = t.guild();

    // Revoke the join invite, if one was created:
    if let Some(code) = t.join_invite_code() {
        if let Err(e) = http.delete_invite(code, Some("Tournament deleted")).await {
            tracing::warn!(guild = %guild, error = %e, "could not delete the join invite");
        }
    }

    let channels = match guild.channels(http).await {
        Ok(channels) => channels,
        Err(e) => {
            tracing::warn!(guild = %guild, error = %e, "could not list the guild's channels");
            return;
        }
    };

    let matches_name_norm = format!("{}matches", normalize(t.name()));

    // Categories to wipe: the main tournament category (by stored id), any
    // team hubs category, and any matches category of this tournament.
    let mut category_ids = Vec::new();
    for channel in channels.values() {
        if channel.kind != ChannelType::Category {
            continue;
        }
        let norm = normalize(&channel.name);
        if channel.id == t.category()
            || Some(channel.id) == t.teams_category()
            || Some(channel.id) == t.matches_category()
            || norm.contains("tournamentteams")
            || norm.contains(&matches_name_norm)
        {
            category_ids.push(channel.id);
        }
    }

    for channel in channels.values() {
        let in_doomed_category = channel
            .parent_id
            .map(|parent| category_ids.contains(&parent))
            .unwrap_or(false);
        // Stray team hubs may survive outside their category after manual
        // reorganization; catch them by name.
        let team_leftover = channel.kind == ChannelType::Text && channel.name.contains("team-");

        if in_doomed_category || team_leftover {
            if let Err(e) = channel.id.delete(http).await {
                tracing::warn!(
                    guild = %guild,
                    channel = %channel.id,
                    error = %e,
                    "could not delete a tournament channel"
                );
            }
        }
    }

    for category in category_ids {
        if let Err(e) = category.delete(http).await {
            tracing::warn!(
                guild = %guild,
                channel = %category,
                error = %e,
                "could not delete a tournament category"
            );
        }
    }

    // Roles: the stored pair plus every team role by prefix.
    let mut role_ids = vec![t.player_role(), t.spectator_role()];
    match guild.roles(http).await {
        Ok(roles) => {
            for role in roles.values() {
                if role.name.starts_with(TEAM_ROLE_PREFIX) || role.name.starts_with(BOT_TEAM_PREFIX)
                {
                    role_ids.push(role.id);
                }
            }
        }
        Err(e) => {
            tracing::warn!(guild = %guild, error = %e, "could not list the guild's roles");
        }
    }

    for role in role_ids {
        if let Err(e) = guild.delete_role(http, role).await {
            tracing::warn!(
                guild = %guild,
                role = %role,
                error = %e,
                "could not delete a tournament role"
            );
        }
    }
}

/// Lowercased, whitespace-free version of a name, for fuzzy category matching.
fn normalize(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect()
}
