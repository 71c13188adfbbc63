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
use getset::Getters;
use serde::{Deserialize, Serialize};
use serenity::all::{RoleId, UserId};

/// Data structure defining a team invite.
///
/// Invites are sent by team members to registered players in the same guild,
/// asking them to join the team. They are stored on the invited player until
/// accepted (via `/team join`) or until the player joins some team.
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Clone, Serialize, Deserialize, Getters)]
pub struct TeamInvite {
    /// Role of the inviting team (teams are keyed by their role).
    #[getset(get = "pub")]
    team: RoleId,
    /// Display name of the inviting team, for listing the invite.
    #[getset(get = "pub")]
    team_name: String,
    /// Member that sent the invite.
    #[getset(get = "pub")]
    sender: UserId,
}

impl From<(RoleId, String, UserId)> for TeamInvite {
    fn from((team, team_name, sender): (RoleId, String, UserId)) -> TeamInvite {
        TeamInvite {
            team,
            team_name,
            sender,
        }
    }
}

/// Comparison of `TeamInvite` objects.
///
/// Two invites are considered equal if they point to the same team; a player
/// never holds more than one pending invite per team.
impl PartialEq for TeamInvite {
    fn eq(&self, other: &Self) -> bool {
        self.team == other.team
    }
}
