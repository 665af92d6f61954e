//! Command failures reported back to players

use thiserror::Error;

use crate::homes::MAX_HOMES;

/// Why a home command did not go through.
///
/// Every failure leaves the registry untouched, with one exception: a
/// [`HomeError::HomeGone`] share acceptance also clears the stale offer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HomeError {
    #[error("home name '{0}' may only contain letters, numbers and underscores")]
    InvalidName(String),

    #[error("you've reached the maximum of {} homes", MAX_HOMES)]
    CapacityExceeded,

    #[error("{0} has reached the maximum number of homes")]
    TargetFull(String),

    #[error("home '{0}' not found")]
    NotFound(String),

    #[error("public home '{0}' belongs to someone else")]
    Unauthorized(String),

    #[error("you can't share a home with yourself")]
    SelfTarget,

    #[error("player {0} is not online")]
    PlayerOffline(String),

    #[error("no pending share from {from} for home '{home}'")]
    NoSuchOffer { from: String, home: String },

    #[error("the shared home '{0}' no longer exists")]
    HomeGone(String),
}
