//! Home commands - validation, ownership checks and the share protocol
//!
//! Each method corresponds to one player command:
//!
//! | Command                      | Method                 |
//! |------------------------------|------------------------|
//! | `sethome <name>`             | `set_home`             |
//! | `delhome <name>`             | `delete_home`          |
//! | `home <name>`                | `home`                 |
//! | `homes`                      | `homes`                |
//! | `psethome <name>`            | `set_public_home`      |
//! | `pdelhome <name>`            | `delete_public_home`   |
//! | `phome <name>`               | `public_home`          |
//! | `phomes`                     | `public_homes`         |
//! | `sharehome <name> <target>`  | `share_home`           |
//! | `acceptshare <from> <name>`  | `accept_share`         |
//!
//! The caller is always identified by an opaque owner identity. Moving the
//! player is up to the host; `home` and `public_home` only resolve targets.

mod error;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::homes::{
    is_valid_home_name, BlockPos, GuardedWrite, Home, HomeRegistry, PendingShares, MAX_HOMES,
};
use crate::sessions::SessionDirectory;

pub use error::HomeError;

/// Where the caller is standing when saving a home
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub world: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    #[serde(default, with = "crate::homes::codec::angle")]
    pub yaw: f32,
    #[serde(default, with = "crate::homes::codec::angle")]
    pub pitch: f32,
}

impl Location {
    fn into_home(self, name: &str, owner: &str) -> Home {
        Home::new(
            name,
            BlockPos::new(self.x, self.y, self.z),
            self.world,
            self.yaw,
            self.pitch,
            owner,
        )
    }
}

/// Whether a set command created a new home or replaced one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SetOutcome {
    Created,
    Updated,
}

/// A player's homes in name order
#[derive(Debug, Clone, Serialize)]
pub struct HomeListing {
    pub homes: Vec<Home>,
    pub count: usize,
    pub max: usize,
}

/// A recorded share offer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareOffer {
    pub from: String,
    pub to: String,
    pub home: String,
}

/// Command front end over the home registry and share offers.
///
/// Built once at startup and shared through an `Arc`.
#[derive(Debug)]
pub struct HomeService {
    registry: Arc<HomeRegistry>,
    shares: PendingShares,
    sessions: Arc<SessionDirectory>,
}

impl HomeService {
    pub fn new(registry: Arc<HomeRegistry>, sessions: Arc<SessionDirectory>) -> Self {
        Self {
            registry,
            shares: PendingShares::new(),
            sessions,
        }
    }

    pub fn registry(&self) -> &Arc<HomeRegistry> {
        &self.registry
    }

    pub fn shares(&self) -> &PendingShares {
        &self.shares
    }

    pub fn sessions(&self) -> &Arc<SessionDirectory> {
        &self.sessions
    }

    fn validate_name(name: &str) -> Result<(), HomeError> {
        if is_valid_home_name(name) {
            Ok(())
        } else {
            Err(HomeError::InvalidName(name.to_string()))
        }
    }

    /// Display name for an identity, falling back to the identity itself
    fn display_name(&self, id: &str) -> String {
        self.sessions.name_of(id).unwrap_or_else(|| id.to_string())
    }

    /// `sethome <name>`
    pub fn set_home(
        &self,
        caller: &str,
        name: &str,
        location: Location,
    ) -> Result<SetOutcome, HomeError> {
        Self::validate_name(name)?;

        let home = location.into_home(name, caller);
        let replaced = self
            .registry
            .upsert_player_home(caller, home)
            .ok_or(HomeError::CapacityExceeded)?;

        info!("{} set home '{}'", caller, name);
        Ok(if replaced {
            SetOutcome::Updated
        } else {
            SetOutcome::Created
        })
    }

    /// `delhome <name>`
    pub fn delete_home(&self, caller: &str, name: &str) -> Result<(), HomeError> {
        if !self.registry.delete_player_home(caller, name) {
            return Err(HomeError::NotFound(name.to_string()));
        }
        info!("{} deleted home '{}'", caller, name);
        Ok(())
    }

    /// `home <name>` - resolve a teleport target
    pub fn home(&self, caller: &str, name: &str) -> Result<Home, HomeError> {
        self.registry
            .player_home(caller, name)
            .ok_or_else(|| HomeError::NotFound(name.to_string()))
    }

    /// `homes`
    pub fn homes(&self, caller: &str) -> HomeListing {
        let data = self.registry.player_data(caller);
        HomeListing {
            count: data.count(),
            homes: data.homes().cloned().collect(),
            max: MAX_HOMES,
        }
    }

    /// `psethome <name>` - create a public home, or update one the caller owns
    pub fn set_public_home(
        &self,
        caller: &str,
        name: &str,
        location: Location,
    ) -> Result<SetOutcome, HomeError> {
        Self::validate_name(name)?;

        let home = location.into_home(name, caller);
        let outcome = self
            .registry
            .set_public_home_if(home, |existing| {
                existing.map_or(true, |h| h.is_owned_by(caller))
            });

        match outcome {
            GuardedWrite::Applied { replaced } => {
                info!("{} set public home '{}'", caller, name);
                Ok(if replaced {
                    SetOutcome::Updated
                } else {
                    SetOutcome::Created
                })
            }
            _ => Err(HomeError::Unauthorized(name.to_string())),
        }
    }

    /// `pdelhome <name>` - only the recorded owner may delete
    pub fn delete_public_home(&self, caller: &str, name: &str) -> Result<(), HomeError> {
        match self
            .registry
            .delete_public_home_if(name, |h| h.is_owned_by(caller))
        {
            GuardedWrite::Applied { .. } => {
                info!("{} deleted public home '{}'", caller, name);
                Ok(())
            }
            GuardedWrite::Refused => Err(HomeError::Unauthorized(name.to_string())),
            GuardedWrite::Missing => Err(HomeError::NotFound(name.to_string())),
        }
    }

    /// `phome <name>`
    pub fn public_home(&self, name: &str) -> Result<Home, HomeError> {
        self.registry
            .public_home(name)
            .ok_or_else(|| HomeError::NotFound(name.to_string()))
    }

    /// `phomes`
    pub fn public_homes(&self) -> Vec<Home> {
        self.registry.public_homes().homes().cloned().collect()
    }

    /// `sharehome <name> <target>` - offer a copy of one of the caller's
    /// homes to an online player
    pub fn share_home(
        &self,
        caller: &str,
        home_name: &str,
        target_name: &str,
    ) -> Result<ShareOffer, HomeError> {
        let target = self
            .sessions
            .resolve(target_name)
            .ok_or_else(|| HomeError::PlayerOffline(target_name.to_string()))?;

        self.offer_share(caller, &target, home_name)
    }

    /// Record a share offer between two identities
    pub fn offer_share(
        &self,
        from: &str,
        to: &str,
        home_name: &str,
    ) -> Result<ShareOffer, HomeError> {
        if from == to {
            return Err(HomeError::SelfTarget);
        }

        if self.registry.player_home(from, home_name).is_none() {
            return Err(HomeError::NotFound(home_name.to_string()));
        }

        if !self.registry.player_can_accept(to, home_name) {
            return Err(HomeError::TargetFull(self.display_name(to)));
        }

        self.shares.offer(from, to, home_name);
        info!("{} offered home '{}' to {}", from, home_name, to);

        Ok(ShareOffer {
            from: from.to_string(),
            to: to.to_string(),
            home: home_name.to_string(),
        })
    }

    /// `acceptshare <from> <name>`
    pub fn accept_share(
        &self,
        caller: &str,
        from_name: &str,
        home_name: &str,
    ) -> Result<Home, HomeError> {
        let from = self
            .sessions
            .resolve(from_name)
            .ok_or_else(|| HomeError::PlayerOffline(from_name.to_string()))?;

        self.accept_offer(&from, caller, home_name)
    }

    /// Accept a pending offer between two identities.
    ///
    /// The offered home is re-read from the offerer's current homes. If it
    /// was deleted the stale offer is cleared. If the recipient is full the
    /// offer stays so they can make room and retry.
    pub fn accept_offer(&self, from: &str, to: &str, home_name: &str) -> Result<Home, HomeError> {
        if !self.shares.has_offer(from, to, home_name) {
            return Err(HomeError::NoSuchOffer {
                from: self.display_name(from),
                home: home_name.to_string(),
            });
        }

        let Some(original) = self.registry.player_home(from, home_name) else {
            self.shares.consume_offer(from, to, home_name);
            warn!(
                "Share of '{}' from {} to {} dropped: home no longer exists",
                home_name, from, to
            );
            return Err(HomeError::HomeGone(home_name.to_string()));
        };

        let copy = original.with_owner(to);
        if !self.registry.set_player_home(to, copy.clone()) {
            return Err(HomeError::CapacityExceeded);
        }

        self.shares.consume_offer(from, to, home_name);
        info!("{} accepted home '{}' from {}", to, home_name, from);
        Ok(copy)
    }
}
