//! Bevy systems
//!
//! This module contains all the systems that operate on entities
//! and resources in the Bevy ECS.

pub mod scene;
pub mod camera;
pub mod animation;
pub mod viewport;
pub mod textures;
pub mod frame_extraction;

pub use scene::setup_scene;
pub use camera::update_camera_from_input;
pub use animation::advance_rotations;
pub use viewport::apply_viewport_resize;
pub use textures::resolve_texture_loads;
pub use frame_extraction::extract_and_process_frame;
