//! Persistence codec - registry state to/from a JSON document
//!
//! Document layout:
//! ```text
//! {
//!   "playerHomes": [ { "ownerId": "...", "homes": [HomeRecord, ...] }, ... ],
//!   "publicHomes": { "homes": [HomeRecord, ...] },
//!   "savedAt": "2026-01-01T00:00:00Z"
//! }
//! ```
//! Missing fields decode to empty collections. Unknown fields are ignored.
//! `savedAt` is informational only and never required.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::{BlockPos, Home, PlayerHomes, PublicHomes};

/// Codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed home document: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("failed to encode home document: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Complete persisted state of the home registry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryState {
    /// Owner identity -> that owner's private homes
    pub players: BTreeMap<String, PlayerHomes>,
    pub public: PublicHomes,
}

impl RegistryState {
    /// Total number of private homes across all owners
    pub fn private_home_count(&self) -> usize {
        self.players.values().map(PlayerHomes::count).sum()
    }
}

/// Orientation angles in JSON.
///
/// JSON has no literal for non-finite floats, so those are written as the
/// strings `"NaN"`, `"Infinity"` and `"-Infinity"`. Numbers and those strings
/// are both accepted on read; `null` (older documents) reads as 0.
pub(crate) mod angle {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Angle {
        Number(f32),
        Text(String),
        Null,
    }

    pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f32(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_sign_positive() {
            serializer.serialize_str("Infinity")
        } else {
            serializer.serialize_str("-Infinity")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        match Angle::deserialize(deserializer)? {
            Angle::Number(v) => Ok(v),
            Angle::Null => Ok(0.0),
            Angle::Text(s) => match s.as_str() {
                "NaN" => Ok(f32::NAN),
                "Infinity" => Ok(f32::INFINITY),
                "-Infinity" => Ok(f32::NEG_INFINITY),
                other => Err(de::Error::invalid_value(
                    de::Unexpected::Str(other),
                    &"a number, \"NaN\", \"Infinity\" or \"-Infinity\"",
                )),
            },
        }
    }
}

/// One home as written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeRecord {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub world: String,
    #[serde(with = "angle")]
    pub yaw: f32,
    #[serde(with = "angle")]
    pub pitch: f32,
    pub owner: String,
}

impl Default for HomeRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            x: 0,
            y: 0,
            z: 0,
            world: String::new(),
            yaw: 0.0,
            pitch: 0.0,
            owner: String::new(),
        }
    }
}

impl From<&Home> for HomeRecord {
    fn from(home: &Home) -> Self {
        let pos = home.position();
        Self {
            name: home.name().to_string(),
            x: pos.x,
            y: pos.y,
            z: pos.z,
            world: home.world().to_string(),
            yaw: home.yaw(),
            pitch: home.pitch(),
            owner: home.owner().to_string(),
        }
    }
}

impl From<HomeRecord> for Home {
    fn from(r: HomeRecord) -> Self {
        Home::new(
            r.name,
            BlockPos::new(r.x, r.y, r.z),
            r.world,
            r.yaw,
            r.pitch,
            r.owner,
        )
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PlayerHomesRecord {
    owner_id: String,
    homes: Vec<HomeRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct PublicHomesRecord {
    homes: Vec<HomeRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct HomeDocument {
    player_homes: Vec<PlayerHomesRecord>,
    public_homes: PublicHomesRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
}

/// Serialize registry state to a JSON document
pub fn encode(state: &RegistryState) -> Result<Vec<u8>, CodecError> {
    let doc = HomeDocument {
        player_homes: state
            .players
            .iter()
            .map(|(owner_id, homes)| PlayerHomesRecord {
                owner_id: owner_id.clone(),
                homes: homes.homes().map(HomeRecord::from).collect(),
            })
            .collect(),
        public_homes: PublicHomesRecord {
            homes: state.public.homes().map(HomeRecord::from).collect(),
        },
        saved_at: Some(Utc::now()),
    };

    serde_json::to_vec_pretty(&doc).map_err(CodecError::Encode)
}

/// Parse a JSON document back into registry state.
///
/// Records without a name are skipped. Private homes beyond the per-player
/// capacity are dropped with a warning so the capacity invariant holds
/// after every load.
pub fn decode(bytes: &[u8]) -> Result<RegistryState, CodecError> {
    let doc: HomeDocument = serde_json::from_slice(bytes).map_err(CodecError::Malformed)?;

    if let Some(saved_at) = doc.saved_at {
        debug!("Decoding home document saved at {}", saved_at.to_rfc3339());
    }

    let mut state = RegistryState::default();

    for record in doc.player_homes {
        if record.owner_id.is_empty() {
            warn!("Skipping player home set with empty owner id");
            continue;
        }
        let set = state.players.entry(record.owner_id.clone()).or_default();
        for home in record.homes {
            if home.name.is_empty() {
                warn!("Skipping unnamed home for owner {}", record.owner_id);
                continue;
            }
            let name = home.name.clone();
            if !set.set(home.into()) {
                warn!(
                    "Dropping home '{}' for owner {}: capacity exceeded",
                    name, record.owner_id
                );
            }
        }
    }

    for home in doc.public_homes.homes {
        if home.name.is_empty() {
            warn!("Skipping unnamed public home");
            continue;
        }
        state.public.set(home.into());
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::homes::MAX_HOMES;

    fn home(name: &str, owner: &str, x: i32) -> Home {
        Home::new(
            name,
            BlockPos::new(x, 64, -x),
            "minecraft:the_nether",
            12.5,
            -90.0,
            owner,
        )
    }

    fn state(owners: usize, public: usize) -> RegistryState {
        let mut state = RegistryState::default();
        for o in 0..owners {
            let owner = format!("owner-{}", o);
            let mut set = PlayerHomes::new();
            for h in 0..3 {
                set.set(home(&format!("home_{}", h), &owner, h));
            }
            state.players.insert(owner, set);
        }
        for p in 0..public {
            state.public.set(home(&format!("warp_{}", p), "owner-0", p as i32));
        }
        state
    }

    #[test]
    fn test_round_trip_shapes() {
        for owners in [0, 1, 5] {
            for public in [0, 1, 4] {
                let original = state(owners, public);
                let bytes = encode(&original).unwrap();
                let decoded = decode(&bytes).unwrap();
                assert_eq!(decoded, original, "owners={} public={}", owners, public);
            }
        }
    }

    #[test]
    fn test_round_trip_keeps_empty_owner_sets() {
        let mut original = RegistryState::default();
        original.players.insert("lonely".to_string(), PlayerHomes::new());
        let decoded = decode(&encode(&original).unwrap()).unwrap();
        assert!(decoded.players.contains_key("lonely"));
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_wire_field_names() {
        let bytes = encode(&state(1, 1)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        let player = &value["playerHomes"][0];
        assert_eq!(player["ownerId"], "owner-0");
        let record = &player["homes"][0];
        for key in ["name", "x", "y", "z", "world", "yaw", "pitch", "owner"] {
            assert!(record.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(value["publicHomes"]["homes"][0]["name"], "warp_0");
        assert!(value.get("savedAt").is_some());
    }

    #[test]
    fn test_missing_and_unknown_fields() {
        let decoded = decode(b"{}").unwrap();
        assert_eq!(decoded, RegistryState::default());

        let decoded = decode(br#"{"version": 7, "somethingElse": [1, 2]}"#).unwrap();
        assert_eq!(decoded, RegistryState::default());

        let decoded = decode(br#"{"publicHomes": {}}"#).unwrap();
        assert!(decoded.public.is_empty());
    }

    #[test]
    fn test_decode_hand_written_document() {
        let doc = br#"{
            "playerHomes": [
                {"ownerId": "a", "homes": [
                    {"name": "base", "x": 1, "y": 2, "z": 3, "world": "minecraft:overworld",
                     "yaw": 45.0, "pitch": 10.0, "owner": "a"}
                ]}
            ],
            "publicHomes": {"homes": [
                {"name": "spawn", "x": 0, "y": 80, "z": 0, "world": "minecraft:overworld",
                 "yaw": 0.0, "pitch": 0.0, "owner": "a"}
            ]}
        }"#;
        let state = decode(doc).unwrap();
        let base = state.players["a"].get("base").unwrap();
        assert_eq!(base.position(), BlockPos::new(1, 2, 3));
        assert_eq!(base.yaw(), 45.0);
        assert_eq!(state.public.get("spawn").map(Home::owner), Some("a"));
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(
            decode(b"{ not json"),
            Err(CodecError::Malformed(_))
        ));
        assert!(matches!(
            decode(br#"{"playerHomes": "nope"}"#),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_enforces_capacity() {
        let homes: Vec<HomeRecord> = (0..MAX_HOMES + 5)
            .map(|i| HomeRecord::from(&home(&format!("h{}", i), "a", i as i32)))
            .collect();
        let doc = serde_json::json!({
            "playerHomes": [{"ownerId": "a", "homes": homes}]
        });
        let state = decode(&serde_json::to_vec(&doc).unwrap()).unwrap();
        assert_eq!(state.players["a"].count(), MAX_HOMES);
    }

    #[test]
    fn test_decode_skips_unnamed_records() {
        let doc = br#"{"publicHomes": {"homes": [{"x": 5}]}, "playerHomes": [{"homes": []}]}"#;
        let state = decode(doc).unwrap();
        assert!(state.public.is_empty());
        assert!(state.players.is_empty());
    }

    #[test]
    fn test_non_finite_angles_round_trip() {
        let angles = [
            (f32::INFINITY, f32::NEG_INFINITY),
            (f32::NAN, 0.5),
            (-0.0, f32::MAX),
        ];

        let mut original = RegistryState::default();
        let mut set = PlayerHomes::new();
        for (i, (yaw, pitch)) in angles.iter().enumerate() {
            let name = format!("odd_{}", i);
            set.set(Home::new(
                name.as_str(),
                BlockPos::new(0, 0, 0),
                "w",
                *yaw,
                *pitch,
                "a",
            ));
            original.public.set(Home::new(name.as_str(), BlockPos::new(1, 1, 1), "w", *yaw, *pitch, "a"));
        }
        original.players.insert("a".to_string(), set);

        let bytes = encode(&original).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["playerHomes"][0]["homes"][0]["yaw"], "Infinity");
        assert_eq!(value["playerHomes"][0]["homes"][0]["pitch"], "-Infinity");
        assert_eq!(value["playerHomes"][0]["homes"][1]["yaw"], "NaN");

        let decoded = decode(&bytes).unwrap();
        for (i, (yaw, pitch)) in angles.iter().enumerate() {
            let name = format!("odd_{}", i);
            for got in [
                decoded.players["a"].get(&name).unwrap(),
                decoded.public.get(&name).unwrap(),
            ] {
                assert_eq!(got.yaw().to_bits(), yaw.to_bits(), "{} yaw", name);
                assert_eq!(got.pitch().to_bits(), pitch.to_bits(), "{} pitch", name);
            }
        }
    }

    #[test]
    fn test_null_angles_read_as_zero() {
        let doc = br#"{"publicHomes": {"homes": [
            {"name": "spawn", "world": "w", "yaw": null, "pitch": null, "owner": "a"}
        ]}}"#;
        let state = decode(doc).unwrap();
        let spawn = state.public.get("spawn").unwrap();
        assert_eq!(spawn.yaw(), 0.0);
        assert_eq!(spawn.pitch(), 0.0);

        assert!(matches!(
            decode(br#"{"publicHomes": {"homes": [{"name": "x", "yaw": "north"}]}}"#),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn test_private_home_count() {
        assert_eq!(state(4, 0).private_home_count(), 12);
    }
}
