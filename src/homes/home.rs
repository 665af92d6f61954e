//! Home value type and home name validation

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Integer block coordinates of a saved point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

/// A named saved location.
///
/// Immutable once built. Sharing a home produces a new `Home` via
/// [`Home::with_owner`] rather than mutating the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Home {
    name: String,
    position: BlockPos,
    /// World / dimension identifier (e.g. "minecraft:overworld")
    world: String,
    #[serde(with = "crate::homes::codec::angle")]
    yaw: f32,
    #[serde(with = "crate::homes::codec::angle")]
    pitch: f32,
    /// Owner identity at the time the home was created
    owner: String,
}

impl Home {
    /// Create a new home. The name is expected to be validated by the caller.
    pub fn new(
        name: impl Into<String>,
        position: BlockPos,
        world: impl Into<String>,
        yaw: f32,
        pitch: f32,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            world: world.into(),
            yaw,
            pitch,
            owner: owner.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> BlockPos {
        self.position
    }

    pub fn world(&self) -> &str {
        &self.world
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Check whether `identity` is the recorded owner
    pub fn is_owned_by(&self, identity: &str) -> bool {
        self.owner == identity
    }

    /// Copy of this home with a different owner; everything else is kept
    pub fn with_owner(&self, owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ..self.clone()
        }
    }
}

/// Home names are restricted to a command-safe charset
static HOME_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").unwrap());

/// Check a home name against `[A-Za-z0-9_]+`
///
/// # Examples
/// ```
/// use homepoints::homes::is_valid_home_name;
///
/// assert!(is_valid_home_name("base_2"));
/// assert!(!is_valid_home_name("my base"));
/// assert!(!is_valid_home_name(""));
/// ```
pub fn is_valid_home_name(name: &str) -> bool {
    HOME_NAME_REGEX.is_match(name)
}
