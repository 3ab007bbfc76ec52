//! Scene registry
//!
//! Built once by scene assembly and never restructured afterwards. The
//! animation system reads the rotation tracks from here instead of querying
//! per-body components.

use bevy::prelude::*;
use std::f64::consts::TAU;

use super::catalog::{BodyDescriptor, EarthSystemSpec};
use super::factory::{BodyHandles, EarthHandles};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationKind {
    /// Rotation of a body about its own axis
    Spin,
    /// Rotation of a pivot, carrying its children around the origin
    Orbit,
}

/// An entity rotating about its local y axis at a fixed rate per tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationTrack {
    pub entity: Entity,
    pub rate: f32,
    pub kind: RotationKind,
}

impl RotationTrack {
    /// Angle after `ticks` ticks, wrapped into `[0, 2π)`
    ///
    /// Computed from the tick count rather than accumulated, so long runs do
    /// not drift.
    pub fn angle_at(&self, ticks: u64) -> f32 {
        (ticks as f64 * self.rate as f64).rem_euclid(TAU) as f32
    }
}

#[derive(Clone, Debug)]
pub struct RegisteredBody {
    pub name: &'static str,
    pub handles: BodyHandles,
}

#[derive(Resource, Debug)]
pub struct SceneRegistry {
    pub sun: Entity,
    pub background: Entity,
    pub lights: Vec<Entity>,
    pub bodies: Vec<RegisteredBody>,
    pub earth: Option<EarthHandles>,
    tracks: Vec<RotationTrack>,
}

impl SceneRegistry {
    pub fn new(sun: Entity, sun_spin_rate: f32, background: Entity, lights: Vec<Entity>) -> Self {
        Self {
            sun,
            background,
            lights,
            bodies: Vec::new(),
            earth: None,
            tracks: vec![RotationTrack {
                entity: sun,
                rate: sun_spin_rate,
                kind: RotationKind::Spin,
            }],
        }
    }

    pub fn register_body(&mut self, descriptor: &BodyDescriptor, handles: BodyHandles) {
        self.track(handles.mesh, descriptor.spin_rate, RotationKind::Spin);
        self.track(handles.pivot, descriptor.orbit_rate, RotationKind::Orbit);
        self.bodies.push(RegisteredBody {
            name: descriptor.name,
            handles,
        });
    }

    pub fn register_earth(&mut self, spec: &EarthSystemSpec, handles: EarthHandles) {
        self.track(handles.planet, spec.planet_spin_rate, RotationKind::Spin);
        self.track(handles.clouds, spec.cloud_spin_rate, RotationKind::Spin);
        self.track(handles.moon, spec.moon_spin_rate, RotationKind::Spin);
        self.track(handles.pivot, spec.orbit_rate, RotationKind::Orbit);
        self.earth = Some(handles);
    }

    pub fn rotation_tracks(&self) -> &[RotationTrack] {
        &self.tracks
    }

    fn track(&mut self, entity: Entity, rate: f32, kind: RotationKind) {
        self.tracks.push(RotationTrack { entity, rate, kind });
    }
}
