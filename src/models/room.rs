use chrono::{DateTime, Utc};
use livekit_protocol as proto;
use serde::{Deserialize, Serialize};

/// Timestamp layout appended to room names (14 digits).
pub const ROOM_NAME_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Derive a room name from a user id and the current time
pub fn room_name_for(user_id: &str) -> String {
    room_name_at(user_id, Utc::now())
}

/// Derive a room name from a user id and a fixed instant
pub fn room_name_at(user_id: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}", user_id, at.format(ROOM_NAME_TIMESTAMP_FORMAT))
}

/// Request carrying the user asking for a room
#[derive(Debug, Default, Deserialize)]
pub struct JoinRoomRequest {
    #[serde(default)]
    pub userid: String,
}

/// Request to delete a room
#[derive(Debug, Default, Deserialize)]
pub struct DeleteRoomRequest {
    #[serde(default)]
    pub roomid: String,
}

/// Response for the admission endpoint
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub room: proto::Room,
}

/// Response after creating a room
#[derive(Debug, Serialize)]
pub struct CreateRoomResponse {
    pub room: proto::Room,
}

/// Response after deleting a room
#[derive(Debug, Serialize)]
pub struct DeleteRoomResponse {
    pub room: String,
    pub status: &'static str,
}

/// Response listing all rooms
#[derive(Debug, Serialize)]
pub struct ListRoomsResponse {
    pub rooms: Vec<proto::Room>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_room_name_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();

        assert_eq!(room_name_at("alice", at), "alice-20240307090502");
    }

    #[test]
    fn test_room_name_has_fourteen_digit_suffix() {
        let name = room_name_for("bob");
        let suffix = name.strip_prefix("bob-").expect("prefix");

        assert_eq!(suffix.len(), 14);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_room_names_one_second_apart_differ() {
        let at = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let later = at + Duration::seconds(1);

        assert_ne!(room_name_at("alice", at), room_name_at("alice", later));
        assert_eq!(room_name_at("alice", later), "alice-20250101000000");
    }

    #[test]
    fn test_requests_default_missing_fields() {
        let join: JoinRoomRequest = serde_json::from_str("{}").unwrap();
        let delete: DeleteRoomRequest = serde_json::from_str("{}").unwrap();

        assert!(join.userid.is_empty());
        assert!(delete.roomid.is_empty());
    }
}
