//! Bevy component definitions
//!
//! This module contains all component markers used to tag and identify
//! entities in the Bevy ECS (Entity Component System). Rotation rates are
//! not stored on entities; they live in the scene registry.

use bevy::prelude::*;

/// Marker component for the offscreen rendering camera
///
/// Entities with this component are cameras that render to an offscreen
/// texture instead of a window.
#[derive(Component)]
pub struct OffscreenCamera;

/// Marker component for cameras that can be controlled by user input
///
/// Entities with this component will respond to mouse input for
/// orbit camera control (rotation, zoom, pan).
#[derive(Component)]
pub struct CameraController;

/// Invisible anchor at the origin whose rotation makes a body orbit
#[derive(Component)]
pub struct OrbitPivot;

/// Sphere mesh of a planet, moon, or the sun
#[derive(Component)]
pub struct CelestialBody {
    pub radius: f32,
}

/// Flat ring around a planet
#[derive(Component)]
pub struct PlanetRing;

/// Translucent shell around a planet
#[derive(Component)]
pub struct CloudShell;

#[derive(Component)]
pub struct Sun;

/// Starfield sphere enclosing the whole scene
#[derive(Component)]
pub struct Backdrop;
