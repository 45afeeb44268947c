// Wire protocol DTOs and conversions for the game server's WebSocket messages.
// Both directions derive Serialize and Deserialize so scripted servers can reuse them.

use crate::domain::{Command, EntityFields, SessionIds, Vec3};
use crate::use_cases::ServerEvent;
use serde::{Deserialize, Serialize};

/// Messages the server sends to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    // Join accepted; the session id doubles as the local player's entity key.
    Joined(SessionIds),
    Add(EntityUpdateDto),
    Remove(RemoveDto),
    Change(EntityUpdateDto),
    // Free-form command channel; only `movement` is understood.
    Message(GenericMessageDto),
}

/// Messages the client sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    Join(JoinPayload),
    Movement(MovementDto),
    CreateProjectile(ProjectileDto),
}

/// Join-or-create request. Stored ids are sent back to resume a previous session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinPayload {
    pub room: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl JoinPayload {
    pub fn new(room: impl Into<String>, stored: Option<SessionIds>) -> Self {
        let (room_id, session_id) = match stored {
            Some(ids) => (Some(ids.room_id), Some(ids.session_id)),
            None => (None, None),
        };
        Self {
            room: room.into(),
            room_id,
            session_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityUpdateDto {
    pub key: String,
    pub entity: EntityDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveDto {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericMessageDto {
    pub command: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Flattened entity state as the server schema carries it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityDto {
    Player {
        x: f32,
        y: f32,
        z: f32,
        #[serde(rename = "stateNum", default)]
        state_num: u32,
        health: f32,
    },
    Projectile {
        x: f32,
        y: f32,
        z: f32,
        angle: f32,
    },
}

impl From<EntityDto> for EntityFields {
    fn from(dto: EntityDto) -> Self {
        match dto {
            EntityDto::Player {
                x,
                y,
                z,
                state_num,
                health,
            } => EntityFields::player(Vec3::new(x, y, z), state_num, health),
            EntityDto::Projectile { x, y, z, angle } => {
                EntityFields::projectile(Vec3::new(x, y, z), angle)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementDto {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(rename = "stateNum")]
    pub state_num: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileDto {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub angle: f32,
}

impl From<Command> for ClientMessage {
    fn from(command: Command) -> Self {
        match command {
            Command::Movement {
                position,
                state_num,
            } => ClientMessage::Movement(MovementDto {
                x: position.x,
                y: position.y,
                z: position.z,
                state_num,
            }),
            Command::CreateProjectile { position, angle } => {
                ClientMessage::CreateProjectile(ProjectileDto {
                    x: position.x,
                    y: position.y,
                    z: position.z,
                    angle,
                })
            }
        }
    }
}

/// A decoded server message, split by who handles it.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    // Handled by the runner's join handshake.
    Joined(SessionIds),
    // Routed to the session controller.
    Event(ServerEvent),
    // Generic message with a command this client does not understand.
    Unhandled { command: String },
}

impl TryFrom<ServerMessage> for Inbound {
    type Error = serde_json::Error;

    fn try_from(msg: ServerMessage) -> Result<Self, Self::Error> {
        let inbound = match msg {
            ServerMessage::Joined(ids) => Inbound::Joined(ids),
            ServerMessage::Add(update) => Inbound::Event(ServerEvent::Added {
                key: update.key,
                fields: update.entity.into(),
            }),
            ServerMessage::Remove(remove) => {
                Inbound::Event(ServerEvent::Removed { key: remove.key })
            }
            ServerMessage::Change(update) => Inbound::Event(ServerEvent::Changed {
                key: update.key,
                fields: update.entity.into(),
            }),
            ServerMessage::Message(generic) => match generic.command.as_str() {
                "movement" => {
                    let movement: MovementDto = serde_json::from_value(generic.data)?;
                    Inbound::Event(ServerEvent::Movement {
                        position: Vec3::new(movement.x, movement.y, movement.z),
                        state_num: movement.state_num,
                    })
                }
                _ => Inbound::Unhandled {
                    command: generic.command,
                },
            },
        };
        Ok(inbound)
    }
}

/// Parses one text frame into an [`Inbound`].
pub fn decode_server_text(text: &str) -> Result<Inbound, serde_json::Error> {
    let msg: ServerMessage = serde_json::from_str(text)?;
    Inbound::try_from(msg)
}
