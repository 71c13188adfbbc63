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
use crate::tournament::{QueueStatus, Tournament};
use serenity::all::{Colour, CreateEmbed, CreateEmbedFooter, EditMessage, Http};

/*
 * The two long-lived embeds of a tournament:
 *
 * - the control panel, posted in the staff channel, summarizing the settings
 *   and lifecycle state;
 * - the join panel, posted in a public channel of the staff's choosing,
 *   advertising the tournament with live counters and the invite link.
 *
 * Both are edited in place whenever the tournament changes.
 */

/**
 * Builds the control panel embed from the current tournament state.
 */
pub fn build_panel_embed(t: &Tournament) -> CreateEmbed {
    let captain_scoring = if t.captain_scoring() {
        "ON (Captains + Admins)"
    } else {
        "OFF (Admins Only)"
    };
    let screenshot_proof = if t.screenshot_proof() { "ON" } else { "OFF" };

    CreateEmbed::new()
        .title("🛠️ TOURNAMENT CONTROL PANEL")
        .description(format!("Tournament Name: **{}**", t.name()))
        .colour(Colour::RED)
        .field(
            "Teams Joined",
            format!(
                "{} / {}\n(Recommended bracket sizes: **4, 8, 16, 32**)",
                t.teams_joined(),
                t.max_teams()
            ),
            false,
        )
        .field("Team Size", format!("{} (1–6)", t.team_size()), true)
        .field(
            "Match Format",
            format!("Best-of-{} Games\n(1 = BO1, 3 = BO3, 5 = BO5)", t.best_of()),
            true,
        )
        .field("Bracket Type", t.bracket_type().to_string(), true)
        .field("Captain Scoring", captain_scoring, true)
        .field("Screenshot Proof", screenshot_proof, true)
        .field("Queue Status", t.queue_status().to_string(), true)
        .field("Tournament Status", t.status().to_string(), true)
        .footer(CreateEmbedFooter::new(
            "Use the /tournament commands to manage your tournament.",
        ))
}

/**
 * Edits the control panel message in place, if it was ever posted.
 * Failures are logged, not propagated: a stale panel must not break the
 * command that triggered the refresh.
 */
pub async fn update_panel_message(http: &Http, t: &Tournament) {
    let Some(message) = t.panel_message() else {
        return;
    };

    if let Err(e) = t
        .panel_channel()
        .edit_message(http, message, EditMessage::new().embed(build_panel_embed(t)))
        .await
    {
        tracing::warn!(
            guild = %t.guild(),
            error = %e,
            "could not refresh the control panel message"
        );
    }
}

/**
 * Builds the public join panel embed from the current tournament state.
 */
pub fn build_join_embed(t: &Tournament) -> CreateEmbed {
    let status_text = match t.queue_status() {
        QueueStatus::Open => "🟢 **OPEN** – Players can join.",
        QueueStatus::Closed => "🔴 **CLOSED** – Players cannot join.",
    };

    let invite_line = match t.join_invite_code() {
        Some(code) => format!("🔗 Share this invite to join: https://discord.gg/{}\n\n", code),
        None => String::new(),
    };

    let description = format!(
        "Tournament: **{}**\n\
        Status: {}\n\
        Teams: **{} / {}** | Team Size: **{}**\n\
        Players: **{}** | Spectators: **{}**\n\n\
        {}\
        🧾 Create your team with `/team create` (see <#{}>)\n\
        💬 Use <#{}> for all tournament chat\n\
        📜 Don't forget to read the rules in <#{}>\n\n\
        ✅ Join as a player with `/join player`, or watch with `/join spectator`.\n\
        👀 **Spectators** can see everything except the admin channel and can only \
        type in the chat channel.\n\
        🚪 If you ever want to leave, use `/join leave`.",
        t.name(),
        status_text,
        t.teams_joined(),
        t.max_teams(),
        t.team_size(),
        t.players_joined(),
        t.spectators_joined(),
        invite_line,
        t.create_team_channel(),
        t.chat_channel(),
        t.rules_channel(),
    );

    CreateEmbed::new()
        .title("🎮 Join Tournament")
        .description(description)
        .colour(Colour::DARK_GREEN)
}

/**
 * Edits the join panel message in place, if it was ever posted.
 */
pub async fn refresh_join_panel(http: &Http, t: &Tournament) {
    let (Some(channel), Some(message)) = (t.join_panel_channel(), t.join_panel_message()) else {
        return;
    };

    if let Err(e) = channel
        .edit_message(http, message, EditMessage::new().embed(build_join_embed(t)))
        .await
    {
        tracing::warn!(
            guild = %t.guild(),
            error = %e,
            "could not refresh the join panel message"
        );
    }
}
