pub mod room;

pub use room::{
    room_name_at, room_name_for, CreateRoomResponse, DeleteRoomRequest, DeleteRoomResponse,
    JoinRoomRequest, ListRoomsResponse, TokenResponse,
};
