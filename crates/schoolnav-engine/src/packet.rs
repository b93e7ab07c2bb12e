//! Backend point packet.
//!
//! The point backend answers with one JSON envelope holding rooms, exits and
//! connections as flat database rows. Decoding turns the rows into typed
//! points in that order (rooms, then exits, then connections), which is also
//! the order that decides which point wins a shared grid cell.

use serde::{Deserialize, Serialize};

use schoolnav_logic::{Point, PointInventory, PointKind};

use crate::error::ProviderError;

pub const STATUS_SUCCESS: &str = "success";

/// Response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPacket {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub data: Option<PointTables>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointTables {
    #[serde(default)]
    pub rooms: Vec<RoomRow>,
    #[serde(default)]
    pub exits: Vec<ExitRow>,
    #[serde(default)]
    pub connections: Vec<ConnectionRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRow {
    pub id: u32,
    pub room_number: String,
    pub x_coordinate: f64,
    pub y_coordinate: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub floor_number: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitRow {
    pub id: u32,
    pub exit_name: String,
    #[serde(rename = "isEmergency", default)]
    pub is_emergency: Flag,
    pub x_coordinate: f64,
    pub y_coordinate: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub floor_number: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRow {
    pub id: u32,
    #[serde(default)]
    pub down_connection_id: Option<u32>,
    #[serde(default)]
    pub up_connection_id: Option<u32>,
    pub x_coordinate: f64,
    pub y_coordinate: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub floor_number: i32,
}

/// Boolean column that MySQL-style backends send as 0/1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    pub fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(n) => n != 0,
        }
    }
}

impl Default for Flag {
    fn default() -> Self {
        Flag::Bool(false)
    }
}

fn point_from(
    id: u32,
    x: f64,
    y: f64,
    floor: i32,
    description: Option<String>,
    kind: PointKind,
) -> Point {
    let mut point = match kind {
        PointKind::Room { room_number } => Point::room(id, x, y, floor, &room_number),
        PointKind::Exit { name, emergency } => Point::exit(id, x, y, floor, &name, emergency),
        PointKind::Connector { down, up } => Point::connector(id, x, y, floor, down, up),
        PointKind::Waypoint => Point::waypoint(x, y, floor),
    };
    point.description = description.filter(|d| !d.is_empty());
    point
}

impl PointTables {
    /// Typed points in row order: rooms, exits, connections.
    pub fn into_points(self) -> Vec<Point> {
        let rooms = self.rooms.into_iter().map(|r| {
            point_from(
                r.id,
                r.x_coordinate,
                r.y_coordinate,
                r.floor_number,
                r.description,
                PointKind::Room {
                    room_number: r.room_number,
                },
            )
        });
        let exits = self.exits.into_iter().map(|e| {
            point_from(
                e.id,
                e.x_coordinate,
                e.y_coordinate,
                e.floor_number,
                e.description,
                PointKind::Exit {
                    name: e.exit_name,
                    emergency: e.is_emergency.is_set(),
                },
            )
        });
        let connections = self.connections.into_iter().map(|c| {
            point_from(
                c.id,
                c.x_coordinate,
                c.y_coordinate,
                c.floor_number,
                c.description,
                PointKind::Connector {
                    down: c.down_connection_id,
                    up: c.up_connection_id,
                },
            )
        });
        rooms.chain(exits).chain(connections).collect()
    }

    /// Flatten an inventory back into backend rows. Waypoints have no row.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Self {
        let mut tables = Self::default();
        for p in points {
            match &p.kind {
                PointKind::Room { room_number } => tables.rooms.push(RoomRow {
                    id: p.id,
                    room_number: room_number.clone(),
                    x_coordinate: p.x,
                    y_coordinate: p.y,
                    description: p.description.clone(),
                    floor_number: p.floor,
                }),
                PointKind::Exit { name, emergency } => tables.exits.push(ExitRow {
                    id: p.id,
                    exit_name: name.clone(),
                    is_emergency: Flag::Bool(*emergency),
                    x_coordinate: p.x,
                    y_coordinate: p.y,
                    description: p.description.clone(),
                    floor_number: p.floor,
                }),
                PointKind::Connector { down, up } => tables.connections.push(ConnectionRow {
                    id: p.id,
                    down_connection_id: *down,
                    up_connection_id: *up,
                    x_coordinate: p.x,
                    y_coordinate: p.y,
                    description: p.description.clone(),
                    floor_number: p.floor,
                }),
                PointKind::Waypoint => {}
            }
        }
        tables
    }
}

impl PointPacket {
    pub fn success(tables: PointTables) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: String::new(),
            timestamp: None,
            data: Some(tables),
        }
    }

    /// Decode the envelope into an inventory.
    pub fn into_inventory(self) -> Result<PointInventory, ProviderError> {
        if self.status != STATUS_SUCCESS {
            return Err(ProviderError::Backend {
                status: self.status,
                message: self.message,
            });
        }
        let points = self.data.unwrap_or_default().into_points();
        Ok(PointInventory::new(points)?)
    }
}

/// Parse a raw backend response.
pub fn decode_packet(json: &str) -> Result<PointInventory, ProviderError> {
    let packet: PointPacket = serde_json::from_str(json)?;
    packet.into_inventory()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKET: &str = r#"{
        "status": "success",
        "message": "points loaded",
        "timestamp": "2024-03-01T08:00:00Z",
        "data": {
            "rooms": [
                {"id": 1, "room_number": "101", "x_coordinate": 40, "y_coordinate": 12.5,
                 "description": "Chemistry lab", "floor_number": 1}
            ],
            "exits": [
                {"id": 2, "exit_name": "North", "isEmergency": 1, "x_coordinate": 0,
                 "y_coordinate": 0, "description": null, "floor_number": 0},
                {"id": 3, "exit_name": "South", "isEmergency": false, "x_coordinate": 5,
                 "y_coordinate": 0, "floor_number": 0}
            ],
            "connections": [
                {"id": 4, "down_connection_id": null, "up_connection_id": 5,
                 "x_coordinate": 10, "y_coordinate": 10, "description": "", "floor_number": 0},
                {"id": 5, "down_connection_id": 4, "up_connection_id": null,
                 "x_coordinate": 10, "y_coordinate": 10, "description": "Main stairs", "floor_number": 1}
            ]
        }
    }"#;

    #[test]
    fn test_decode_packet() {
        let inv = decode_packet(PACKET).unwrap();
        assert_eq!(inv.len(), 5);
        let room = inv.room("101").unwrap();
        assert_eq!(room.description.as_deref(), Some("Chemistry lab"));
        assert_eq!(room.floor, 1);
        assert_eq!(
            inv.get(2).unwrap().kind,
            PointKind::Exit {
                name: "North".into(),
                emergency: true
            }
        );
        assert_eq!(
            inv.get(3).unwrap().kind,
            PointKind::Exit {
                name: "South".into(),
                emergency: false
            }
        );
        assert_eq!(inv.get(4).unwrap().link_toward(1), Some(5));
        assert_eq!(inv.get(4).unwrap().description, None);
        let order: Vec<u32> = inv.iter().map(|p| p.id).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_error_status() {
        let json = r#"{"status": "error", "message": "database offline", "timestamp": null}"#;
        match decode_packet(json) {
            Err(ProviderError::Backend { status, message }) => {
                assert_eq!(status, "error");
                assert_eq!(message, "database offline");
            }
            other => panic!("expected backend error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{"status": "success", "data": {"rooms": [
            {"id": 1, "room_number": "a", "x_coordinate": 0, "y_coordinate": 0, "floor_number": 0},
            {"id": 1, "room_number": "b", "x_coordinate": 0, "y_coordinate": 0, "floor_number": 0}
        ]}}"#;
        assert!(matches!(decode_packet(json), Err(ProviderError::Invalid(_))));
    }

    #[test]
    fn test_tables_from_points_keep_rows() {
        let inv = decode_packet(PACKET).unwrap();
        let tables = PointTables::from_points(inv.iter());
        assert_eq!(tables.rooms.len(), 1);
        assert_eq!(tables.exits.len(), 2);
        assert_eq!(tables.connections.len(), 2);
        let rebuilt = PointPacket::success(tables).into_inventory().unwrap();
        assert_eq!(rebuilt, inv);
    }
}
