//! Core model for dungeon layout templates.
//!
//! Provides the room-type catalog ([`catalog::RoomTypeCatalog`]), the layout graph
//! ([`graph::LayoutGraph`]), the connection rule set ([`validator::ConnectionValidator`]),
//! the consistency-preserving edit operations ([`mutator::GraphMutator`]), and JSON
//! persistence for templates.

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod integrity;
pub mod mutator;
pub mod schema;
pub mod storage;
pub mod validator;
