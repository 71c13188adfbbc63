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
use crate::tournament::QueueStatus;
use crate::utils::{get_guild_id, get_triggering_player};
use crate::{panel, tournament, Context, Error};
use serenity::all::{CreateInvite, CreateMessage, GuildChannel};

#[poise::command(
    slash_command,
    subcommands("player", "spectator", "leave", "panel"),
    subcommand_required,
    guild_only
)]
pub async fn join(_: Context<'_>) -> Result<(), Error> {
    // This function will not be executed, as the command has subcommands.
    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized("en-US", "Join the tournament as a player.")
)]
#[agon::log_cmd]
pub async fn player(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);
    let uid = ctx.author().id;

    let Some(mut t) = tournament::get_tournament(&gid) else {
        ctx.reply("❌ No active tournament found. The host may have ended it.")
            .await?;

        return Ok(());
    };

    // Respect the queue status: players cannot join when CLOSED.
    if t.queue_status() != QueueStatus::Open {
        ctx.reply(
            "🔴 Player join is currently **CLOSED**. Wait for the host to open joins again.",
        )
        .await?;

        return Ok(());
    }

    let member = gid.member(ctx.http(), uid).await?;

    if member.roles.contains(&t.player_role()) {
        ctx.reply("✅ You're already joined as a **Player** in this tournament.")
            .await?;

        return Ok(());
    }

    // Capacity check (max players = max teams * team size):
    if t.players_joined() >= t.max_players() {
        ctx.reply(
            "⚠ Player spots are currently **full**. You can still join as a **Spectator**.",
        )
        .await?;

        return Ok(());
    }

    // Switching from spectator? Drop that role first.
    let had_spectator = member.roles.contains(&t.spectator_role());
    if had_spectator {
        ctx.http()
            .remove_member_role(
                gid,
                uid,
                t.spectator_role(),
                Some("Switching to tournament player"),
            )
            .await?;
    }
    ctx.http()
        .add_member_role(gid, uid, t.player_role(), Some("Joined tournament as player"))
        .await?;

    t.adjust_counts(1, if had_spectator { -1 } else { 0 });

    let mut player = get_triggering_player!(ctx, gid);
    player.set_spectator(false);

    panel::refresh_join_panel(ctx.http(), &t).await;

    ctx.reply(format!(
        "✅ You are now registered as a **Player** for **{}**.\n\n\
        🧾 Use `/team create` in <#{}> to **create your team** and invite teammates.\n\
        For solo tournaments, you still create a team – you just won't be able to \
        add anyone else.\n\n\
        💬 Use <#{}> for all tournament chat.\n\
        📜 And don't forget to read the rules in <#{}>.",
        t.name(),
        t.create_team_channel(),
        t.chat_channel(),
        t.rules_channel()
    ))
    .await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized("en-US", "Join the tournament as a spectator.")
)]
#[agon::log_cmd]
pub async fn spectator(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);
    let uid = ctx.author().id;

    let Some(mut t) = tournament::get_tournament(&gid) else {
        ctx.reply("❌ No active tournament found. The host may have ended it.")
            .await?;

        return Ok(());
    };

    // Spectators are allowed even while the queue is closed.
    let member = gid.member(ctx.http(), uid).await?;

    if member.roles.contains(&t.player_role()) {
        ctx.reply(
            "⚠ You're currently a **Player** in this tournament.\n\
            If you want to spectate instead, leave with `/join leave` first and then \
            use `/join spectator`.",
        )
        .await?;

        return Ok(());
    }

    if member.roles.contains(&t.spectator_role()) {
        ctx.reply("✅ You're already a **Spectator** for this tournament.")
            .await?;

        return Ok(());
    }

    ctx.http()
        .add_member_role(
            gid,
            uid,
            t.spectator_role(),
            Some("Joined tournament as spectator"),
        )
        .await?;

    t.adjust_counts(0, 1);

    let mut player = get_triggering_player!(ctx, gid);
    player.set_spectator(true);

    panel::refresh_join_panel(ctx.http(), &t).await;

    ctx.reply(format!(
        "👀 You are now a **Spectator** for **{}**.\n\n\
        You can view the tournament and chat in <#{}>.\n\n\
        If you don't want to spectate anymore, use `/join leave`.",
        t.name(),
        t.chat_channel()
    ))
    .await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized("en-US", "Leave the tournament (as a player or spectator).")
)]
#[agon::log_cmd]
pub async fn leave(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);
    let uid = ctx.author().id;

    let Some(mut t) = tournament::get_tournament(&gid) else {
        ctx.reply("❌ No active tournament found.").await?;

        return Ok(());
    };

    let member = gid.member(ctx.http(), uid).await?;
    let had_player = member.roles.contains(&t.player_role());
    let had_spectator = member.roles.contains(&t.spectator_role());

    if !had_player && !had_spectator {
        ctx.reply(
            "ℹ You are not currently joined in this tournament as a player or spectator.",
        )
        .await?;

        return Ok(());
    }

    if had_player {
        ctx.http()
            .remove_member_role(gid, uid, t.player_role(), Some("Left tournament"))
            .await?;
    }
    if had_spectator {
        ctx.http()
            .remove_member_role(gid, uid, t.spectator_role(), Some("Left tournament"))
            .await?;
    }

    t.adjust_counts(
        if had_player { -1 } else { 0 },
        if had_spectator { -1 } else { 0 },
    );

    let mut player = get_triggering_player!(ctx, gid);
    player.set_spectator(false);

    panel::refresh_join_panel(ctx.http(), &t).await;

    ctx.reply(format!(
        "🚪 You have **left** the tournament **{}**.\n\
        You can always re-join later with `/join player` or `/join spectator`.",
        t.name()
    ))
    .await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    required_permissions = "MANAGE_GUILD",
    description_localized(
        "en-US",
        "Post the Join Tournament panel in a channel (staff only)."
    )
)]
#[agon::log_cmd]
pub async fn panel(
    ctx: Context<'_>,
    #[description = "The public channel to post the join panel in."]
    #[channel_types("Text")]
    channel: GuildChannel,
) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    let Some(mut t) = tournament::get_tournament(&gid) else {
        ctx.reply("❌ No tournament found. Create one first with `/tournament create`.")
            .await?;

        return Ok(());
    };

    // Only from the admin panel channel, so the join panel cannot be spoofed
    // from arbitrary places:
    if ctx.channel_id() != t.panel_channel() {
        ctx.reply(format!(
            "❌ You can only use this command in <#{}>.",
            t.panel_channel()
        ))
        .await?;

        return Ok(());
    }

    // Create a permanent invite for the join panel channel:
    let invite = channel
        .id
        .create_invite(
            ctx.http(),
            CreateInvite::new().max_age(0).max_uses(0).unique(true),
        )
        .await?;
    t.set_join_invite_code(invite.code);

    let message = channel
        .id
        .send_message(
            ctx.http(),
            CreateMessage::new().embed(panel::build_join_embed(&t)),
        )
        .await?;

    // Save where the join panel lives, for live updates:
    t.set_join_panel(channel.id, message.id);

    ctx.reply(format!("✅ Join panel posted in <#{}>.", channel.id))
        .await?;

    Ok(())
}
