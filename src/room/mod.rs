//! Room membership tracking
//!
//! Rooms are named groups of connections that receive each other's relayed
//! frames. The table owns the member sets; connections hold only the room
//! name as a back-reference, never pointers, so there are no lifecycle
//! cycles between rooms and connections.

pub mod table;

pub use table::RoomTable;
