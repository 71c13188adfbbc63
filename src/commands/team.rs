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
use crate::team::Team;
use crate::tournament::Tournament;
use crate::utils::{get_guild_id, get_triggering_player};
use crate::{channels, panel, player, team, tournament, Context, Error};
use serenity::all::{Colour, CreateEmbed, CreateEmbedFooter, CreateMessage, GetMessages, User};
use std::fmt::Write as _;

#[poise::command(
    slash_command,
    subcommands(
        "create",
        "invite",
        "invitations",
        "join",
        "ready",
        "unready",
        "leave",
        "disband",
        "list",
    ),
    subcommand_required,
    guild_only
)]
pub async fn team(_: Context<'_>) -> Result<(), Error> {
    // This function will not be executed, as the command has subcommands.
    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized(
        "en-US",
        "Create a team: its role, its private hub channel, and you as captain."
    )
)]
#[agon::log_cmd]
pub async fn create(
    ctx: Context<'_>,
    #[description = "The team's name."] name: String,
) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);
    let uid = ctx.author().id;

    let Some(mut t) = tournament::get_tournament(&gid) else {
        ctx.reply("❌ No active tournament found in this server.")
            .await?;

        return Ok(());
    };

    // Team creation is for registered players:
    if !channels::member_has_role(ctx.http(), gid, uid, t.player_role()).await {
        ctx.reply("❌ Join the tournament first with `/join player` to create a team.")
            .await?;

        return Ok(());
    }

    let mut creator = get_triggering_player!(ctx, gid);
    if let Some(existing) = creator.team() {
        let team = team::get_existing_team!(&gid, &existing);
        ctx.reply(format!(
            "❌ You are already in **{}**.\n\
            You must leave or disband that team before creating a new one.",
            team.name()
        ))
        .await?;

        return Ok(());
    }

    let name = name.trim().to_string();
    if name.len() < 2 || name.len() > 32 {
        ctx.reply("❌ Team names must be between **2** and **32** characters.")
            .await?;

        return Ok(());
    }
    if team::find_by_name(&gid, &name).is_some() {
        ctx.reply("❌ A team with that name already exists. Please choose another name.")
            .await?;

        return Ok(());
    }

    // Role + hub channel creation are several API calls; defer first.
    ctx.defer_ephemeral().await?;

    let (role, channel) = channels::create_team_hub(ctx.http(), &mut t, &name, false).await?;
    ctx.http()
        .add_member_role(gid, uid, role, Some("Tournament team creator / captain"))
        .await?;

    let mut team = Team::new(gid, name.clone(), role, channel, uid, false);
    team.add_member(&mut creator);

    t.team_joined();
    panel::update_panel_message(ctx.http(), &t).await;
    panel::refresh_join_panel(ctx.http(), &t).await;

    tracing::info!(guild = %gid, team = %name, captain = %uid, "team created");

    ctx.reply(format!(
        "✅ Team **{}** created!\n\
        • Role: <@&{}>\n\
        • Team Channel: <#{}>\n\
        • Total Teams in Tournament: **{}**\n\
        Invite teammates with `/team invite`.",
        name,
        role,
        channel,
        t.teams_joined()
    ))
    .await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized("en-US", "Invite a tournament player to your team.")
)]
#[agon::log_cmd]
pub async fn invite(
    ctx: Context<'_>,
    #[description = "The player to invite to the team."] user: User,
) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    let Some(t) = tournament::get_tournament(&gid) else {
        ctx.reply("❌ No active tournament found.").await?;

        return Ok(());
    };

    let sender = get_triggering_player!(ctx, gid);
    let Some(team_role) = sender.team() else {
        ctx.reply("❌ You are not in a team in this server.").await?;

        return Ok(());
    };
    let team = team::get_existing_team!(&gid, &team_role);

    if team.ready() {
        ctx.reply("❌ Your team is marked **READY**; unready it before changing the roster.")
            .await?;

        return Ok(());
    }
    if team.members().len() >= t.team_size() as usize {
        ctx.reply(format!(
            "❌ Your team is already full (**{}** players).",
            t.team_size()
        ))
        .await?;

        return Ok(());
    }

    if user.id == sender.id() {
        ctx.reply("❌ You cannot invite yourself to your own team.")
            .await?;

        return Ok(());
    }
    if user.bot {
        ctx.reply("❌ Discord bots cannot play in the tournament.")
            .await?;

        return Ok(());
    }

    // Only registered players are eligible:
    if !channels::member_has_role(ctx.http(), gid, user.id, t.player_role()).await {
        ctx.reply(format!(
            "ℹ <@{}> has not joined the tournament yet.\n\
            • Ask them to **join the tournament** with `/join player` first.\n\
            • If they are not in the server yet, share the invite from the join panel.",
            user.id
        ))
        .await?;

        return Ok(());
    }

    let mut target = player::get_or_register_player(&gid, &user.id, &user.name);
    if target.team().is_some() {
        ctx.reply(format!("❌ <@{}> is already in a team in this server.", user.id))
            .await?;

        return Ok(());
    }

    target.add_invite((team_role, team.name().clone(), sender.id()).into());

    ctx.reply(format!(
        "✅ Invite sent to <@{}>.\n\
        Tell them to use `/team join {}` to accept it, or `/team invitations` to \
        check their invites.",
        user.id,
        team.name()
    ))
    .await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized("en-US", "Check your pending team invitations.")
)]
#[agon::log_cmd]
pub async fn invitations(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);
    let player = get_triggering_player!(ctx, gid);

    if player.invites().is_empty() {
        ctx.reply("You do not have any team invitations.").await?;

        return Ok(());
    }

    let mut reply = String::from("You have the following team invitations:\n");
    for invite in player.invites() {
        let _ = writeln!(
            reply,
            "- **{}** by <@{}> — accept with `/team join {}`",
            invite.team_name(),
            invite.sender(),
            invite.team_name()
        );
    }

    ctx.reply(reply).await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized("en-US", "Join a team you have been invited to.")
)]
#[agon::log_cmd]
pub async fn join(
    ctx: Context<'_>,
    #[description = "The team to join. You should have been invited to join it."]
    #[rename = "team"]
    team_name: String,
) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);
    let uid = ctx.author().id;

    let Some(t) = tournament::get_tournament(&gid) else {
        ctx.reply("❌ No active tournament found.").await?;

        return Ok(());
    };

    let mut player = get_triggering_player!(ctx, gid);
    if player.team().is_some() {
        ctx.reply("❌ You are already in a team in this server.")
            .await?;

        return Ok(());
    }

    let Some(mut team) = team::find_by_name(&gid, team_name.trim()) else {
        ctx.reply("❌ No team with that name exists.").await?;

        return Ok(());
    };

    if player.invite_for(&team.role()).is_none() {
        ctx.reply("❌ You were not invited to that team.").await?;

        return Ok(());
    }
    if team.members().len() >= t.team_size() as usize {
        ctx.reply(format!(
            "❌ **{}** is already full (**{}** players).",
            team.name(),
            t.team_size()
        ))
        .await?;

        return Ok(());
    }

    ctx.http()
        .add_member_role(gid, uid, team.role(), Some("Accepted tournament team invite"))
        .await?;
    team.add_member(&mut player);

    ctx.reply(format!("✅ You have joined **{}** successfully.", team.name()))
        .await?;

    Ok(())
}

/// Roster embed posted to the tournament teams channel when a team flips its
/// ready state.
fn roster_embed(t: &Tournament, team: &Team, author: &User) -> CreateEmbed {
    let status_text = if team.ready() { "✅ READY" } else { "⏳ NOT READY" };
    let full_text = if team.members().len() >= t.team_size() as usize {
        "FULL"
    } else {
        "NOT FULL"
    };
    let colour = if team.ready() {
        Colour::DARK_GREEN
    } else {
        Colour::ORANGE
    };

    let mut members = team
        .members()
        .iter()
        .map(|id| format!("• <@{}>", id))
        .collect::<Vec<_>>();
    members.sort();
    let roster = if members.is_empty() {
        String::from("*(no players yet)*")
    } else {
        members.join("\n")
    };

    CreateEmbed::new()
        .title(format!("{} — {}", status_text, team.name()))
        .description(format!(
            "{}\n\n**Status:** {}\n**Players:** {}/{} ({})",
            roster,
            status_text,
            team.members().len(),
            t.team_size(),
            full_text
        ))
        .colour(colour)
        .field(
            "Tournament Teams",
            format!("{} total teams registered", t.teams_joined()),
            false,
        )
        .footer(CreateEmbedFooter::new(format!(
            "Updated by {} • Team status",
            author.name
        )))
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized(
        "en-US",
        "Mark your team as ready to play (requires a full roster)."
    )
)]
#[agon::log_cmd]
pub async fn ready(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    let player = get_triggering_player!(ctx, gid);
    let Some(team_role) = player.team() else {
        ctx.reply("❌ You are not in a team in this server.").await?;

        return Ok(());
    };
    let mut team = team::get_existing_team!(&gid, &team_role);
    // Teams only exist inside a tournament:
    let t = tournament::get_existing_tournament!(&gid);

    // A team can only ready up once its roster is full:
    if team.members().len() < t.team_size() as usize {
        ctx.reply(format!(
            "❌ Your team must have **{}** players before you can ready up.\n\
            Current roster: **{}/{}**.",
            t.team_size(),
            team.members().len(),
            t.team_size()
        ))
        .await?;

        return Ok(());
    }

    team.set_ready(true);

    // Post the roster to the tournament teams list:
    t.teams_channel()
        .send_message(
            ctx.http(),
            CreateMessage::new().embed(roster_embed(&t, &team, ctx.author())),
        )
        .await?;

    ctx.reply("Team ready status is now: **READY**").await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized("en-US", "Mark your team as not ready.")
)]
#[agon::log_cmd]
pub async fn unready(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    let player = get_triggering_player!(ctx, gid);
    let Some(team_role) = player.team() else {
        ctx.reply("❌ You are not in a team in this server.").await?;

        return Ok(());
    };
    let mut team = team::get_existing_team!(&gid, &team_role);
    let t = tournament::get_existing_tournament!(&gid);

    team.set_ready(false);

    t.teams_channel()
        .send_message(
            ctx.http(),
            CreateMessage::new().embed(roster_embed(&t, &team, ctx.author())),
        )
        .await?;

    ctx.reply("Team ready status is now: **NOT READY**").await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized("en-US", "Leave your current team.")
)]
#[agon::log_cmd]
pub async fn leave(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);
    let uid = ctx.author().id;

    let Some(mut t) = tournament::get_tournament(&gid) else {
        ctx.reply("❌ No active tournament found.").await?;

        return Ok(());
    };

    let mut player = get_triggering_player!(ctx, gid);
    let Some(team_role) = player.team() else {
        ctx.reply("❌ You are not in a team in this server.").await?;

        return Ok(());
    };
    let mut team = team::get_existing_team!(&gid, &team_role);

    if team.ready() {
        ctx.reply(
            "❌ You can no longer leave your team while it is marked **READY**.\n\
            Unready it first with `/team unready`.",
        )
        .await?;

        return Ok(());
    }

    ctx.http()
        .remove_member_role(gid, uid, team_role, Some("Left tournament team"))
        .await?;

    let team_name = team.name().clone();
    let disbanded = team.remove_member(&mut player);

    if disbanded {
        // Last member out: the role and hub channel go too. The channel is
        // deleted on a short delay, in case this was run from inside it.
        if let Err(e) = gid.delete_role(ctx.http(), team_role).await {
            tracing::warn!(guild = %gid, role = %team_role, error = %e, "could not delete team role");
        }
        channels::delete_channel_later(ctx.serenity_context().http.clone(), team.channel(), 3);

        t.teams_left(1);
        panel::update_panel_message(ctx.http(), &t).await;
        panel::refresh_join_panel(ctx.http(), &t).await;
    } else if team.captain() == uid {
        // Hand the captaincy to whoever is still around:
        if let Some(next) = team.members().iter().next().copied() {
            team.set_captain(next);
        }
    }

    ctx.reply(format!("✅ You have left team **{}** successfully.", team_name))
        .await?;

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized(
        "en-US",
        "Disband your team, removing its role, hub channel, and listings."
    )
)]
#[agon::log_cmd]
pub async fn disband(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);
    let uid = ctx.author().id;

    let Some(mut t) = tournament::get_tournament(&gid) else {
        ctx.reply("❌ No active tournament found.").await?;

        return Ok(());
    };

    let player = get_triggering_player!(ctx, gid);
    let Some(team_role) = player.team() else {
        ctx.reply("❌ You are not in a team in this server.").await?;

        return Ok(());
    };
    let team = team::get_existing_team!(&gid, &team_role);

    if team.captain() != uid {
        ctx.reply("❌ Only the team captain can disband the team.")
            .await?;

        return Ok(());
    }

    ctx.defer_ephemeral().await?;

    // Remove the team role from every member:
    for member in team.members() {
        if let Err(e) = ctx
            .http()
            .remove_member_role(gid, *member, team_role, Some("Tournament team disbanded"))
            .await
        {
            tracing::warn!(guild = %gid, user = %member, error = %e, "could not remove team role");
        }
    }

    // Drop this team's roster posts from the teams channel:
    match t
        .teams_channel()
        .messages(ctx.http(), GetMessages::new().limit(100))
        .await
    {
        Ok(messages) => {
            for message in messages {
                let mentions_team = message
                    .embeds
                    .iter()
                    .any(|e| e.title.as_deref().is_some_and(|title| title.contains(team.name())));
                if mentions_team {
                    let _ = message.delete(ctx.http()).await;
                }
            }
        }
        Err(e) => {
            tracing::warn!(guild = %gid, error = %e, "could not scan the teams channel");
        }
    }

    let team_name = team.name().clone();
    team.delete();

    if let Err(e) = gid.delete_role(ctx.http(), team_role).await {
        tracing::warn!(guild = %gid, role = %team_role, error = %e, "could not delete team role");
    }

    t.teams_left(1);
    panel::update_panel_message(ctx.http(), &t).await;
    panel::refresh_join_panel(ctx.http(), &t).await;

    tracing::info!(guild = %gid, team = %team_name, "team disbanded");

    // Reply before the hub channel goes away; this command is usually run
    // from inside it.
    ctx.reply(format!(
        "🗑 Team **{}** has been disbanded. Its hub channel will be deleted shortly.",
        team_name
    ))
    .await?;

    channels::delete_channel_later(ctx.serenity_context().http.clone(), team.channel(), 3);

    Ok(())
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized("en-US", "List the tournament's teams and their state.")
)]
#[agon::log_cmd]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    let Some(t) = tournament::get_tournament(&gid) else {
        ctx.reply("❌ No active tournament found.").await?;

        return Ok(());
    };

    let mut teams = team::all_teams(&gid);
    if teams.is_empty() {
        ctx.reply("No teams have been created yet.").await?;

        return Ok(());
    }
    teams.sort_by(|a, b| a.name().cmp(b.name()));

    let mut reply = format!(
        "**{} / {}** teams registered:\n",
        t.teams_joined(),
        t.max_teams()
    );
    for team in teams {
        let status = if team.ready() { "✅ READY" } else { "⏳ NOT READY" };
        let kind = if team.bot() { " 🤖" } else { "" };
        let _ = writeln!(
            reply,
            "- **{}**{} — {} — {}/{} players",
            team.name(),
            kind,
            status,
            team.members().len(),
            t.team_size()
        );
    }

    ctx.reply(reply).await?;

    Ok(())
}
