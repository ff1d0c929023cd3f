//! WebSocket protocol message definitions
//! These are the wire types for client-server communication.
//!
//! Every frame is a JSON text message `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::GameConfig;
use crate::game::{PlayerId, ProjectileId};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMsg {
    /// Held keys and mouse state
    PlayerInput(PlayerInput),

    /// Requested display name (raw string, truncated server-side)
    ChangeName(String),
}

/// Payload of `playerInput`; every field is optional on the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    #[serde(default)]
    pub keys: KeyState,
    #[serde(default)]
    pub mouse: MouseState,
}

/// Movement keys, WASD and arrows are interchangeable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyState {
    #[serde(default)]
    pub w: Option<bool>,
    #[serde(default)]
    pub a: Option<bool>,
    #[serde(default)]
    pub s: Option<bool>,
    #[serde(default)]
    pub d: Option<bool>,
    #[serde(default)]
    pub arrowup: Option<bool>,
    #[serde(default)]
    pub arrowdown: Option<bool>,
    #[serde(default)]
    pub arrowleft: Option<bool>,
    #[serde(default)]
    pub arrowright: Option<bool>,
}

impl KeyState {
    pub fn up(&self) -> bool {
        held(self.w) || held(self.arrowup)
    }

    pub fn down(&self) -> bool {
        held(self.s) || held(self.arrowdown)
    }

    pub fn left(&self) -> bool {
        held(self.a) || held(self.arrowleft)
    }

    pub fn right(&self) -> bool {
        held(self.d) || held(self.arrowright)
    }
}

fn held(key: Option<bool>) -> bool {
    key.unwrap_or(false)
}

/// Mouse button and aim point in world coordinates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MouseState {
    #[serde(default)]
    pub down: bool,
    #[serde(default)]
    pub world_x: Option<f32>,
    #[serde(default)]
    pub world_y: Option<f32>,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMsg {
    /// Sent once, to the joining connection only
    Init(InitPayload),

    /// World snapshot, broadcast every tick
    GameState(GameStateView),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitPayload {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    #[serde(rename = "CONFIG")]
    pub config: GameConfig,
}

/// Client-facing world view; connection handles never appear here
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateView {
    /// Keyed by player id (a JSON object with decimal string keys)
    pub players: BTreeMap<PlayerId, PlayerView>,
    pub bullets: Vec<BulletView>,
}

/// Player state in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub x: f32,
    pub y: f32,
    /// Radius
    pub r: f32,
    pub color: String,
    pub score: u32,
}

/// Projectile state in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletView {
    pub id: ProjectileId,
    pub owner_id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    /// Radius
    pub r: f32,
    /// Ticks left
    pub life: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_player_input() {
        let raw = r#"{"event":"playerInput","data":{
            "keys":{"w":true,"a":false,"arrowright":true},
            "mouse":{"down":true,"worldX":12.5,"worldY":-3}
        }}"#;
        let ClientMsg::PlayerInput(input) = serde_json::from_str::<ClientMsg>(raw).unwrap() else {
            panic!("expected playerInput");
        };
        assert!(input.keys.up());
        assert!(!input.keys.left());
        assert!(input.keys.right());
        assert!(!input.keys.down());
        assert!(input.mouse.down);
        assert_eq!(input.mouse.world_x, Some(12.5));
        assert_eq!(input.mouse.world_y, Some(-3.0));
    }

    #[test]
    fn missing_input_fields_fall_back() {
        let ClientMsg::PlayerInput(input) =
            serde_json::from_str::<ClientMsg>(r#"{"event":"playerInput","data":{}}"#).unwrap()
        else {
            panic!("expected playerInput");
        };
        assert!(!input.keys.up());
        assert!(!input.mouse.down);
        assert!(input.mouse.world_x.is_none());

        let ClientMsg::PlayerInput(input) =
            serde_json::from_str::<ClientMsg>(r#"{"event":"playerInput","data":{"mouse":{"down":true}}}"#)
                .unwrap()
        else {
            panic!("expected playerInput");
        };
        assert!(input.mouse.down);
        assert!(input.mouse.world_y.is_none());
    }

    #[test]
    fn change_name_payload_is_a_raw_string() {
        let msg: ClientMsg =
            serde_json::from_str(r#"{"event":"changeName","data":"Ace"}"#).unwrap();
        assert!(matches!(msg, ClientMsg::ChangeName(name) if name == "Ace"));
    }

    #[test]
    fn unknown_events_are_rejected() {
        assert!(serde_json::from_str::<ClientMsg>(r#"{"event":"teleport","data":{}}"#).is_err());
        assert!(serde_json::from_str::<ClientMsg>("not json").is_err());
    }

    #[test]
    fn init_uses_client_field_names() {
        let msg = ServerMsg::Init(InitPayload {
            player_id: 3,
            config: GameConfig::default(),
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["event"], "init");
        assert_eq!(json["data"]["playerId"], 3);
        assert_eq!(json["data"]["CONFIG"]["worldSize"], 2000.0);
        assert_eq!(json["data"]["CONFIG"]["updateRate"], 60);
    }
}
