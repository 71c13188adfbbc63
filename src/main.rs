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
mod botplayer;
mod bracket;
mod channels;
mod commands;
mod panel;
mod player;
mod render;
mod team;
mod teaminvite;
mod tournament;
mod utils;

use poise::serenity_prelude as serenity;
use std::env;
use tracing_subscriber::EnvFilter;

/* Poise-required data types: */

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;
// User data:
pub struct Data {}

/**
 * Ensures the per-guild storage exists and registers every (non-bot) guild
 * member as a player record.
 */
async fn bootstrap_guild(ctx: &serenity::Context, guild_id: serenity::GuildId) {
    utils::init_guild_storage(&guild_id);

    match guild_id.members(&ctx.http, None, None).await {
        Ok(members) => {
            for member in members {
                // Ignore bots:
                if member.user.bot {
                    continue;
                }

                // Create records for new members; players that joined the
                // guild while the bot was offline are also picked up lazily
                // the first time they run a command.
                if player::get_player(&guild_id, &member.user.id).is_none() {
                    let _player =
                        player::Player::new(guild_id, member.user.id, member.user.name.clone());
                }
            }
        }
        Err(e) => {
            tracing::warn!(
                guild = %guild_id,
                error = %e,
                "could not retrieve the guild's members"
            );
        }
    }

    tracing::info!(guild = %guild_id, "guild storage ready");
}

async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    _data: &Data,
) -> Result<(), Error> {
    match event {
        // Ready (bot is started):
        serenity::FullEvent::Ready { data_about_bot, .. } => {
            tracing::info!(user = %data_about_bot.user.name, "Agon is connected");

            // Create directories for the persistent data, if necessary:
            utils::init_filesystem();

            ctx.set_presence(
                Some(serenity::ActivityData::playing(
                    "Agon Tournaments | /tournament create",
                )),
                serenity::OnlineStatus::Online,
            );

            for guild in &data_about_bot.guilds {
                bootstrap_guild(ctx, guild.id).await;
            }
        }
        // Guild create (the bot joins a new server):
        serenity::FullEvent::GuildCreate { guild, is_new } => {
            // Only process new guilds:
            if *is_new != Some(true) {
                return Ok(());
            }
            tracing::info!(guild = %guild.id, name = %guild.name, "Agon entered a new guild");

            bootstrap_guild(ctx, guild.id).await;
        }

        _ => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let token = env::var("DISCORD_TOKEN")
        .expect("Discord token not provided (in DISCORD_TOKEN environmental variable).");
    let intents = serenity::GatewayIntents::default()
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::bots::bots(),
                commands::bracket::bracket(),
                commands::join::join(),
                commands::team::team(),
                commands::tournament::tournament(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(handle_event(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands)
                    .await
                    .expect("Could not register the commands.");
                Ok(Data {})
            })
        })
        .build();

    let mut client = serenity::Client::builder(token, intents)
        .framework(framework) // For command handling, using poise.
        .await
        .expect("Could not create the Discord bot client object.");

    client.start().await.expect("The Discord bot crashed.");
}
