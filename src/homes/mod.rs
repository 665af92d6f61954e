//! Home data model - named locations, per-player sets, public homes and
//! the registry that owns them

pub mod codec;
mod home;
mod player;
mod public;
mod registry;
mod shares;

pub use codec::{CodecError, HomeRecord, RegistryState};
pub use home::{is_valid_home_name, BlockPos, Home};
pub use player::{PlayerHomes, MAX_HOMES};
pub use public::PublicHomes;
pub use registry::{GuardedWrite, HomeRegistry};
pub use shares::PendingShares;
