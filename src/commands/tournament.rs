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
use crate::tournament::{Tournament, TournamentStatus};
use crate::utils::get_guild_id;
use crate::{channels, panel, tournament, utils, Context, Error};
use serenity::all::CreateMessage;

#[poise::command(
    slash_command,
    subcommands(
        "create",
        "edit",
        "delete",
        "open_join",
        "close_join",
        "captain_scoring",
        "screenshot_proof",
        "bracket_type",
        "status",
    ),
    subcommand_required,
    default_member_permissions = "MANAGE_GUILD",
    guild_only,
    ephemeral
)]
pub async fn tournament(_: Context<'_>) -> Result<(), Error> {
    // This function will not be executed, as the command has subcommands.
    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized(
        "en-US",
        "Create a new tournament: roles, channels, and the control panel."
    )
)]
#[agon::log_cmd]
pub async fn create(
    ctx: Context<'_>,
    #[description = "The tournament's display name."] name: String,
    #[description = "Maximum number of teams (recommended: 4, 8, 16, 32)."]
    #[min = 1]
    #[max = 999]
    max_teams: u16,
    #[description = "Players per team (1-6; 2 for 2v2, 3 for 3v3...)."]
    #[min = 1]
    #[max = 6]
    team_size: u8,
    #[description = "Match format: best-of-1, -3, or -5."]
    #[min = 1]
    #[max = 5]
    best_of: u8,
) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);
    utils::init_guild_storage(&gid);

    // One tournament per guild:
    if tournament::get_tournament(&gid).is_some() {
        ctx.reply(
            "A tournament already exists in this server.\n\
            Delete it first with `/tournament delete` if you want to start over.",
        )
        .await?;

        return Ok(());
    }

    if let Err(message) = tournament::validate_settings(max_teams, team_size, best_of) {
        ctx.reply(message).await?;

        return Ok(());
    }

    // Creating two roles and nine channels takes a while; defer so the
    // interaction does not expire mid-way.
    ctx.defer_ephemeral().await?;

    let scaffold = channels::create_scaffolding(ctx.http(), gid, &name).await?;
    let mut t = Tournament::new(gid, name.clone(), max_teams, team_size, best_of, &scaffold);

    // Post the control panel in the admin channel and remember it:
    let panel_message = scaffold
        .admin_channel
        .send_message(
            ctx.http(),
            CreateMessage::new().embed(panel::build_panel_embed(&t)),
        )
        .await?;
    t.set_panel_message(panel_message.id);

    tracing::info!(guild = %gid, name = %name, "tournament created");

    ctx.reply(format!(
        "✅ Tournament **{}** created.\n\
        📺 Admin Panel: <#{}>\n\
        📢 Announcements: <#{}>\n\
        🎭 Player Role: <@&{}>\n\
        👀 Spectator Role: <@&{}>\n\
        Open the join queue with `/tournament open_join`, then post the join \
        panel with `/join panel`.",
        name,
        scaffold.admin_channel,
        scaffold.announcements_channel,
        scaffold.player_role,
        scaffold.spectator_role
    ))
    .await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized(
        "en-US",
        "Edit the core tournament settings (name, max teams, team size, best-of)."
    )
)]
#[agon::log_cmd]
pub async fn edit(
    ctx: Context<'_>,
    #[description = "New tournament name."] name: Option<String>,
    #[description = "New maximum number of teams."]
    #[min = 1]
    #[max = 999]
    max_teams: Option<u16>,
    #[description = "New team size (1-6)."]
    #[min = 1]
    #[max = 6]
    team_size: Option<u8>,
    #[description = "New match format (1, 3, or 5)."]
    #[min = 1]
    #[max = 5]
    best_of: Option<u8>,
) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    let Some(mut t) = tournament::get_tournament(&gid) else {
        ctx.reply("No active tournament found.").await?;

        return Ok(());
    };

    let name = name.unwrap_or_else(|| t.name().clone());
    let max_teams = max_teams.unwrap_or(t.max_teams());
    let team_size = team_size.unwrap_or(t.team_size());
    let best_of = best_of.unwrap_or(t.best_of());

    if let Err(message) = tournament::validate_settings(max_teams, team_size, best_of) {
        ctx.reply(message).await?;

        return Ok(());
    }

    t.update_settings(name, max_teams, team_size, best_of);
    tracing::info!(guild = %gid, "tournament settings edited");

    panel::update_panel_message(ctx.http(), &t).await;
    panel::refresh_join_panel(ctx.http(), &t).await;

    ctx.reply("✅ Tournament settings updated.").await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized(
        "en-US",
        "Delete the tournament: all of its channels, roles, teams, and stored state."
    )
)]
#[agon::log_cmd]
pub async fn delete(
    ctx: Context<'_>,
    #[description = "Type DELETE to confirm."] confirm: String,
) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    if confirm.trim().to_uppercase() != "DELETE" {
        ctx.reply(
            "❌ Confirmation failed. You must type **DELETE** exactly to delete the tournament.",
        )
        .await?;

        return Ok(());
    }

    let Some(t) = tournament::get_tournament(&gid) else {
        ctx.reply("No active tournament found.").await?;

        return Ok(());
    };

    // Reply before sweeping: the channel this command ran in may well be one
    // of the channels about to be deleted.
    ctx.reply(
        "🗑 Deleting tournament (categories, channels, team hubs, match channels, and roles)...",
    )
    .await?;

    channels::delete_tournament_artifacts(ctx.http(), &t).await;
    tournament::purge_guild_data(&gid);

    tracing::info!(guild = %gid, "tournament deleted");

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized("en-US", "Open the tournament join queue.")
)]
#[agon::log_cmd]
pub async fn open_join(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    let Some(mut t) = tournament::get_tournament(&gid) else {
        ctx.reply("No active tournament found.").await?;

        return Ok(());
    };

    t.open_queue();
    tracing::info!(guild = %gid, "join queue opened");

    panel::update_panel_message(ctx.http(), &t).await;
    panel::refresh_join_panel(ctx.http(), &t).await;

    ctx.reply("✅ Join is now **OPEN**.").await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized("en-US", "Close the tournament join queue.")
)]
#[agon::log_cmd]
pub async fn close_join(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    let Some(mut t) = tournament::get_tournament(&gid) else {
        ctx.reply("No active tournament found.").await?;

        return Ok(());
    };

    t.close_queue();
    tracing::info!(guild = %gid, "join queue closed");

    panel::update_panel_message(ctx.http(), &t).await;
    panel::refresh_join_panel(ctx.http(), &t).await;

    ctx.reply("✅ Join is now **CLOSED**.").await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized("en-US", "Toggle captain scoring ON/OFF.")
)]
#[agon::log_cmd]
pub async fn captain_scoring(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    let Some(mut t) = tournament::get_tournament(&gid) else {
        ctx.reply("No active tournament found.").await?;

        return Ok(());
    };

    let state = if t.toggle_captain_scoring() {
        "ON (Captains + Admins)"
    } else {
        "OFF (Admins Only)"
    };
    tracing::info!(guild = %gid, state = state, "captain scoring toggled");

    panel::update_panel_message(ctx.http(), &t).await;
    panel::refresh_join_panel(ctx.http(), &t).await;

    ctx.reply(format!("✅ Captain Scoring set to **{}**.", state))
        .await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized("en-US", "Toggle the screenshot proof requirement ON/OFF.")
)]
#[agon::log_cmd]
pub async fn screenshot_proof(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    let Some(mut t) = tournament::get_tournament(&gid) else {
        ctx.reply("No active tournament found.").await?;

        return Ok(());
    };

    let state = if t.toggle_screenshot_proof() { "ON" } else { "OFF" };
    tracing::info!(guild = %gid, state = state, "screenshot proof toggled");

    panel::update_panel_message(ctx.http(), &t).await;
    panel::refresh_join_panel(ctx.http(), &t).await;

    ctx.reply(format!("✅ Screenshot Proof set to **{}**.", state))
        .await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized("en-US", "Toggle the bracket type label (Single / Double Elim).")
)]
#[agon::log_cmd]
pub async fn bracket_type(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    let Some(mut t) = tournament::get_tournament(&gid) else {
        ctx.reply("No active tournament found.").await?;

        return Ok(());
    };

    let bracket_type = t.toggle_bracket_type();
    tracing::info!(guild = %gid, bracket_type = %bracket_type, "bracket type toggled");

    panel::update_panel_message(ctx.http(), &t).await;
    panel::refresh_join_panel(ctx.http(), &t).await;

    ctx.reply(format!("✅ Bracket Type set to **{}**.", bracket_type))
        .await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized("en-US", "Show the tournament control panel.")
)]
#[agon::log_cmd]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    let Some(t) = tournament::get_tournament(&gid) else {
        ctx.reply("No active tournament found.").await?;

        return Ok(());
    };

    // Early warning for a tournament stuck in a finished state:
    if t.status() == TournamentStatus::Finished {
        ctx.reply(
            "ℹ This tournament is **FINISHED**. Create a new one with `/tournament create`.",
        )
        .await?;
    }

    ctx.send(
        poise::CreateReply::default()
            .embed(panel::build_panel_embed(&t))
            .ephemeral(true),
    )
    .await?;

    Ok(())
}
