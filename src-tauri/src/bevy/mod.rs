//! Bevy engine integration
//!
//! This module contains all Bevy-related code including the body catalog,
//! scene construction, components, resources, systems, plugins, and
//! application setup.

pub mod catalog;
pub mod factory;
pub mod registry;
pub mod textures;
pub mod bump_map;
pub mod components;
pub mod resources;
pub mod plugins;
pub mod systems;
pub mod app;

// Re-export commonly used items
pub use app::{start_bevy, BridgeHandles};
