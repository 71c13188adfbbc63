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
use crate::team::{Team, BOT_TEAM_PREFIX};
use crate::utils::get_guild_id;
use crate::{botplayer, channels, panel, team, tournament, utils, Context, Error};
use serenity::all::CreateMessage;
use std::fmt::Write as _;

#[poise::command(
    slash_command,
    subcommands("add", "force_teams", "clear"),
    subcommand_required,
    default_member_permissions = "MANAGE_GUILD",
    guild_only,
    ephemeral
)]
pub async fn bots(_: Context<'_>) -> Result<(), Error> {
    // This function will not be executed, as the command has subcommands.
    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized(
        "en-US",
        "Add bot PLAYERS (not teams) for testing. Example: 16 bots for a 16-player bracket."
    )
)]
#[agon::log_cmd]
pub async fn add(
    ctx: Context<'_>,
    #[description = "How many bot players to add for this server."]
    #[min = 1]
    #[max = 128]
    count: u8,
) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);
    utils::init_guild_storage(&gid);

    let labels = botplayer::add_bots(&gid, count as usize);

    let mut reply = format!(
        "✅ Added **{}** bot players for this server.\n\n**New Bots:**\n",
        labels.len()
    );
    for label in labels {
        let _ = writeln!(reply, "• {}", label);
    }

    ctx.reply(reply).await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized(
        "en-US",
        "Turn stored bot players into READY teams, based on team size and max teams."
    )
)]
#[agon::log_cmd]
pub async fn force_teams(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    let Some(mut t) = tournament::get_tournament(&gid) else {
        ctx.reply(
            "❌ There is **no tournament** for this server.\n\
            Create one with `/tournament create` first.",
        )
        .await?;

        return Ok(());
    };

    let bots = botplayer::load_bots(&gid);
    if bots.is_empty() {
        ctx.reply(
            "⚠️ There are **no bot players** stored for this server.\n\
            Use `/bots add <count>` first.",
        )
        .await?;

        return Ok(());
    }

    let team_size = t.team_size() as usize;
    let possible_teams = bots.len() / team_size;
    let slots_left = t.max_teams().saturating_sub(t.teams_joined()) as usize;
    let teams_to_create = possible_teams.min(slots_left);

    if teams_to_create == 0 {
        ctx.reply(format!(
            "❌ No teams can be created.\n\
            - Bots available: `{}`\n\
            - team size: `{}`\n\
            - max teams: `{}`\n\
            - teams joined: `{}`",
            bots.len(),
            team_size,
            t.max_teams(),
            t.teams_joined()
        ))
        .await?;

        return Ok(());
    }

    // One role + one channel per team; defer before the burst.
    ctx.defer_ephemeral().await?;

    let used_bots = botplayer::take_bots(&gid, teams_to_create * team_size);
    let mut created: Vec<(String, String)> = Vec::with_capacity(teams_to_create);

    for (index, group) in used_bots.chunks(team_size).enumerate() {
        let team_number = t.teams_joined() as usize + 1;
        let team_name = format!("{}{}", BOT_TEAM_PREFIX, team_number);

        let (role, channel) = channels::create_team_hub(ctx.http(), &mut t, &team_name, true).await?;

        // Post which bots ended up on this team:
        let roster = group
            .iter()
            .map(|bot| format!("- {}", bot.label()))
            .collect::<Vec<_>>()
            .join("\n");
        if let Err(e) = channel
            .send_message(
                ctx.http(),
                CreateMessage::new().content(format!(
                    "🤖 **Forced {}**\nTeam size: `{}`\nBot players:\n{}",
                    team_name, team_size, roster
                )),
            )
            .await
        {
            tracing::warn!(guild = %gid, channel = %channel, error = %e, "could not post the bot roster");
        }

        // Bot teams are born ready, captained by the invoking staff member:
        Team::new(gid, team_name.clone(), role, channel, ctx.author().id, true);
        t.team_joined();

        created.push((team_name, format!("<@&{}> — <#{}>", role, channel)));
        tracing::info!(guild = %gid, team = index + 1, "bot team created");
    }

    panel::update_panel_message(ctx.http(), &t).await;
    panel::refresh_join_panel(ctx.http(), &t).await;

    let mut reply = format!(
        "✅ Forced **{}** bot teams using stored bots.\n\
        - team size: `{}`\n\
        - max teams: `{}`\n\
        - teams joined (new): `{}`\n\n\
        **Created Teams:**\n",
        created.len(),
        team_size,
        t.max_teams(),
        t.teams_joined()
    );
    for (name, line) in created {
        let _ = writeln!(reply, "• {} — {}", name, line);
    }
    // Discord caps messages at 2000 characters:
    if reply.len() > 2000 {
        reply.truncate(1990);
        reply.push_str("\n…(trimmed)");
    }

    ctx.reply(reply).await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized(
        "en-US",
        "Delete bot teams (channels + roles) and all stored bot players."
    )
)]
#[agon::log_cmd]
pub async fn clear(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    ctx.defer_ephemeral().await?;

    let mut deleted = 0u16;
    for bot_team in team::all_teams(&gid).into_iter().filter(|tm| tm.bot()) {
        if let Err(e) = bot_team.channel().delete(ctx.http()).await {
            tracing::warn!(guild = %gid, channel = %bot_team.channel(), error = %e, "could not delete bot team channel");
        }
        if let Err(e) = gid.delete_role(ctx.http(), bot_team.role()).await {
            tracing::warn!(guild = %gid, role = %bot_team.role(), error = %e, "could not delete bot team role");
        }
        bot_team.delete();
        deleted += 1;
    }

    botplayer::clear_bots(&gid);

    let mut teams_joined = 0;
    if let Some(mut t) = tournament::get_tournament(&gid) {
        t.teams_left(deleted);
        teams_joined = t.teams_joined();
        panel::update_panel_message(ctx.http(), &t).await;
        panel::refresh_join_panel(ctx.http(), &t).await;
    }

    tracing::info!(guild = %gid, deleted = deleted, "bot teams cleared");

    ctx.reply(format!(
        "🧹 Cleared **{}** bot teams (channels + roles) and removed stored bot players.\n\
        Updated teams joined = `{}`.",
        deleted, teams_joined
    ))
    .await?;

    Ok(())
}
