//! # Dots and Boxes Server Library
//!
//! Authoritative server for a two-player networked dots-and-boxes game.
//! The server owns the only mutable game state: it validates every
//! submitted move, applies it to the board, detects box completions
//! (including one edge closing two boxes at once), keeps score, toggles
//! the turn and decides the outcome. Clients never mutate state; after
//! every accepted mutation the whole canonical snapshot is broadcast and
//! clients simply replace their copy.
//!
//! ## Architecture
//!
//! A single-writer event loop processes connection events strictly one
//! at a time. The accept task and the per-connection reader tasks only
//! forward [`network::ServerEvent`]s into one channel; the loop owns the
//! [`game::GameRoom`] and the [`connection::ConnectionManager`]
//! exclusively, so no locking is needed anywhere.
//!
//! ## Module Organization
//!
//! - [`game`] — the room state machine: seating (max two players), turn
//!   order, move application, scoring, game over and restart.
//! - [`connection`] — registry of admitted sockets and packet fan-out
//!   to their writer tasks.
//! - [`network`] — TCP accept/read/write tasks and the event loop.
//!
//! There are no timeouts on player moves; a game may stall indefinitely
//! on one player. Disconnects arrive through the transport's
//! connection-closed notification and repair the room synchronously.

pub mod connection;
pub mod game;
pub mod network;
