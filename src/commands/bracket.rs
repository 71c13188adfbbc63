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
use crate::bracket::{self, Bracket};
use crate::tournament::{Tournament, TournamentStatus};
use crate::utils::{get_guild_id, get_triggering_player};
use crate::{channels, panel, render, team, tournament, utils, Context, Error};
use serenity::all::{Colour, CreateEmbed, CreateMessage};

#[poise::command(
    slash_command,
    subcommands("generate", "start", "score"),
    subcommand_required,
    guild_only
)]
pub async fn bracket(_: Context<'_>) -> Result<(), Error> {
    // This function will not be executed, as the command has subcommands.
    Ok(())
}

/// Replaces the bracket view message in the bracket channel with a freshly
/// rendered one.
async fn post_bracket_view(
    ctx: Context<'_>,
    t: &mut Tournament,
    bracket: &Bracket,
) -> serenity::Result<()> {
    // Drop the previous view; the channel should only ever show one.
    if let Some(old) = t.bracket_message() {
        if let Err(e) = t.bracket_channel().delete_message(ctx.http(), old).await {
            tracing::warn!(guild = %t.guild(), error = %e, "could not delete the old bracket view");
        }
    }

    let message = t
        .bracket_channel()
        .send_message(
            ctx.http(),
            CreateMessage::new().embed(render::bracket_embed(bracket, t)),
        )
        .await?;
    t.set_bracket_message(message.id);

    Ok(())
}

/// Creates the private channel of every listed match, recording each channel
/// on the bracket. Returns how many channels were created.
async fn create_round_channels(
    ctx: Context<'_>,
    t: &mut Tournament,
    bracket: &mut Bracket,
    match_ids: &[u32],
) -> serenity::Result<u32> {
    let gid = t.guild();
    let category = channels::get_or_create_matches_category(ctx.http(), t).await?;

    let pairings = match_ids
        .iter()
        .filter_map(|id| {
            bracket
                .get_match(*id)
                .map(|m| (m.id(), m.team_a().clone(), m.team_b().clone()))
        })
        .collect::<Vec<_>>();

    let mut created = 0;
    for (match_id, team_a, team_b) in pairings {
        let role_a = team::find_by_name(&gid, &team_a).map(|tm| tm.role());
        let role_b = team::find_by_name(&gid, &team_b).map(|tm| tm.role());

        let channel = channels::create_match_channel(
            ctx.http(),
            t,
            category,
            match_id,
            &team_a,
            &team_b,
            role_a,
            role_b,
        )
        .await?;
        bracket.set_match_channel(match_id, channel);

        tracing::info!(
            guild = %gid,
            match_id = match_id,
            team_a = %team_a,
            team_b = %team_b,
            channel = %channel,
            "match channel created"
        );
        created += 1;
    }

    Ok(created)
}

/// Checks the ready-team list against the supported bracket sizes, replying
/// with the problem when there is one.
async fn validated_seeds(ctx: Context<'_>, gid: serenity::all::GuildId) -> Result<Option<Vec<String>>, Error> {
    let ready = team::ready_teams(&gid);

    if ready.len() < 2 {
        ctx.reply(
            "❌ Not enough teams to build a bracket. You need at least **2** READY teams.",
        )
        .await?;

        return Ok(None);
    }
    if !bracket::is_valid_size(ready.len()) {
        ctx.reply(format!(
            "❌ Bracket size must be **2, 4, 8, 16, or 32** ready teams.\n\
            Currently detected: **{}**.",
            ready.len()
        ))
        .await?;

        return Ok(None);
    }

    let names = ready.into_iter().map(|tm| tm.name().clone()).collect();
    Ok(Some(bracket::seeded_order(names)))
}

#[poise::command(
    slash_command,
    ephemeral,
    required_permissions = "MANAGE_GUILD",
    description_localized(
        "en-US",
        "Seed the READY teams and post the bracket view (staff only)."
    )
)]
#[agon::log_cmd]
pub async fn generate(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    let Some(mut t) = tournament::get_tournament(&gid) else {
        ctx.reply("❌ No tournament found. Create one first.").await?;

        return Ok(());
    };

    let Some(seeds) = validated_seeds(ctx, gid).await? else {
        return Ok(());
    };

    let bracket = Bracket::new(gid, seeds);
    bracket.save();

    post_bracket_view(ctx, &mut t, &bracket).await?;

    tracing::info!(guild = %gid, teams = bracket.seeds().len(), "bracket generated");

    ctx.reply(format!(
        "✅ Bracket generated with **{}** teams and posted in <#{}>.",
        bracket.seeds().len(),
        t.bracket_channel()
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
        "Start the tournament: seed the bracket and create round-one match channels."
    )
)]
#[agon::log_cmd]
pub async fn start(ctx: Context<'_>) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    let Some(mut t) = tournament::get_tournament(&gid) else {
        ctx.reply("❌ No tournament found. Create one first.").await?;

        return Ok(());
    };

    match t.status() {
        TournamentStatus::Running => {
            ctx.reply(
                "⚠️ Tournament is already marked as **RUNNING**.\n\
                If you need to remake matches, delete the tournament and start over.",
            )
            .await?;

            return Ok(());
        }
        TournamentStatus::Finished => {
            ctx.reply("⚠️ Tournament is already **FINISHED**.").await?;

            return Ok(());
        }
        TournamentStatus::Waiting => {}
    }

    let Some(seeds) = validated_seeds(ctx, gid).await? else {
        return Ok(());
    };

    // Creating one channel per match takes a while; defer first.
    ctx.defer_ephemeral().await?;

    t.set_status(TournamentStatus::Running);
    panel::update_panel_message(ctx.http(), &t).await;
    panel::refresh_join_panel(ctx.http(), &t).await;

    // Any previously generated bracket is superseded by this one:
    bracket::clear_bracket(&gid);
    let mut bracket = Bracket::new(gid, seeds.clone());
    let match_ids = bracket.add_round(1, &seeds);
    let created = create_round_channels(ctx, &mut t, &mut bracket, &match_ids).await?;
    bracket.save();

    post_bracket_view(ctx, &mut t, &bracket).await?;

    tracing::info!(guild = %gid, created = created, "tournament started");

    ctx.reply(format!(
        "✅ Tournament status set to **RUNNING**.\n\
        Created **{}** match channel(s) for Round 1.",
        created
    ))
    .await?;

    Ok(())
}

/// The result embed posted to the match channel and mirrored to the results
/// channel.
fn result_embed(match_id: u32, team_a: &str, team_b: &str, score_a: u32, score_b: u32, winner: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("Match {} Result", match_id))
        .description(format!(
            "**{}** score: **{}**\n**{}** score: **{}**\n\n🏆 **Winner: {}**",
            team_a, score_a, team_b, score_b, winner
        ))
        .colour(Colour::from_rgb(201, 0, 43))
}

#[poise::command(
    slash_command,
    ephemeral,
    description_localized(
        "en-US",
        "Submit the final score of a match (staff; captains when captain scoring is on)."
    )
)]
#[agon::log_cmd]
pub async fn score(
    ctx: Context<'_>,
    #[description = "The bracket match number."] match_id: u32,
    #[description = "Rounds won by the first team."] score_a: u32,
    #[description = "Rounds won by the second team."] score_b: u32,
) -> Result<(), Error> {
    let gid = get_guild_id!(ctx);

    let Some(mut t) = tournament::get_tournament(&gid) else {
        ctx.reply("❌ No tournament found. Create one first.").await?;

        return Ok(());
    };
    let Some(mut bracket) = bracket::get_bracket(&gid) else {
        ctx.reply("❌ No bracket exists yet. Start the tournament first.")
            .await?;

        return Ok(());
    };

    let Some(scored) = bracket.get_match(match_id) else {
        ctx.reply("❌ No match with that number exists.").await?;

        return Ok(());
    };
    let team_a = scored.team_a().clone();
    let team_b = scored.team_b().clone();
    let match_channel = scored.channel();

    // Staff can always score; captains of the two teams only when captain
    // scoring is enabled.
    let is_staff = ctx
        .author_member()
        .await
        .and_then(|member| member.permissions)
        .map(|permissions| permissions.manage_guild())
        .unwrap_or(false);
    let is_captain = {
        let player = get_triggering_player!(ctx, gid);
        [&team_a, &team_b].iter().any(|name| {
            team::find_by_name(&gid, name)
                .map(|tm| tm.captain() == player.id())
                .unwrap_or(false)
        })
    };

    if !is_staff && !(t.captain_scoring() && is_captain) {
        ctx.reply("❌ Only tournament staff can score matches right now.")
            .await?;

        return Ok(());
    }

    let winner = match bracket.record_result(match_id, score_a, score_b) {
        Ok(winner) => winner,
        Err(e) => {
            ctx.reply(format!("❌ {}", e)).await?;

            return Ok(());
        }
    };
    bracket.save();

    utils::append_result_log(
        &gid,
        format!(
            "Match {}: {} {} - {} {} (winner: {})",
            match_id, team_a, score_a, score_b, team_b, winner
        )
        .as_str(),
    );

    let embed = result_embed(match_id, &team_a, &team_b, score_a, score_b, &winner);

    // Post the result where the match was played, then clean the channel up:
    if let Some(channel) = match_channel {
        if let Err(e) = channel
            .send_message(
                ctx.http(),
                CreateMessage::new().embed(embed.clone()).content(format!(
                    "✅ Match scored. This channel will be deleted in **{} seconds**.",
                    channels::MATCH_CHANNEL_LINGER_SECS
                )),
            )
            .await
        {
            tracing::warn!(guild = %gid, channel = %channel, error = %e, "could not post the match result");
        }
        channels::delete_channel_later(
            ctx.serenity_context().http.clone(),
            channel,
            channels::MATCH_CHANNEL_LINGER_SECS,
        );
    }

    // Mirror the result to the results and bracket channels:
    if let Err(e) = t
        .results_channel()
        .send_message(ctx.http(), CreateMessage::new().embed(embed))
        .await
    {
        tracing::warn!(guild = %gid, error = %e, "could not mirror the result to the results channel");
    }
    if let Err(e) = t
        .bracket_channel()
        .send_message(
            ctx.http(),
            CreateMessage::new().content(format!(
                "📊 **Match {} Result:** **{}** {} – {} **{}** (winner: **{}**)",
                match_id, team_a, score_a, score_b, team_b, winner
            )),
        )
        .await
    {
        tracing::warn!(guild = %gid, error = %e, "could not mirror the result to the bracket channel");
    }

    // Advance the bracket: refresh the view, and either crown a champion or
    // open the next round once the current one is complete.
    let round = bracket.current_round();
    let round_complete = bracket.round_complete(round);

    if round_complete {
        let winners = bracket.round_winners(round);

        if winners.len() == 1 {
            t.set_status(TournamentStatus::Finished);
            panel::update_panel_message(ctx.http(), &t).await;
            panel::refresh_join_panel(ctx.http(), &t).await;

            if let Err(e) = t
                .bracket_channel()
                .send_message(
                    ctx.http(),
                    CreateMessage::new()
                        .content(format!("🏆 **Tournament Winner:** **{}**", winners[0])),
                )
                .await
            {
                tracing::warn!(guild = %gid, error = %e, "could not announce the champion");
            }
            tracing::info!(guild = %gid, champion = %winners[0], "tournament finished");
        } else {
            let match_ids = bracket.add_round(round + 1, &winners);
            create_round_channels(ctx, &mut t, &mut bracket, &match_ids).await?;
            bracket.save();
            tracing::info!(guild = %gid, round = round + 1, "next round created");
        }
    }

    post_bracket_view(ctx, &mut t, &bracket).await?;

    ctx.reply(format!(
        "✅ Match **{}** scored: **{}** won.",
        match_id, winner
    ))
    .await?;

    Ok(())
}
