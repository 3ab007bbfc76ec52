//! Texture requests and load results
//!
//! Factories request textures through a [`TextureProvider`] and record each
//! request here. Loading is asynchronous: materials are usable immediately
//! and the texture load system resolves requests as the asset server
//! finishes, applying the fallback policy to failures.

use bevy::prelude::*;

/// Source of surface textures
pub trait TextureProvider {
    fn load_texture(&self, path: &str) -> Handle<Image>;
}

impl TextureProvider for AssetServer {
    fn load_texture(&self, path: &str) -> Handle<Image> {
        self.load(path.to_owned())
    }
}

/// What a texture is used for, which decides how a failure is handled
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureRole {
    /// Base color of a lit surface
    Surface,
    /// Height map converted into a normal map once loaded
    Bump,
    /// Greyscale reflectivity map, attached as the specular tint once loaded
    Specular,
    Ring,
    Clouds,
    Sun,
    Background,
}

impl TextureRole {
    /// Whether the texture is the base color of its material
    pub fn is_color(self) -> bool {
        !matches!(self, TextureRole::Bump | TextureRole::Specular)
    }
}

/// A texture the scene is waiting for
#[derive(Clone, Debug)]
pub struct TextureRequest {
    pub path: String,
    pub handle: Handle<Image>,
    pub role: TextureRole,
    pub material: Handle<StandardMaterial>,
    pub fallback: Color,
}

/// Outcome of a texture load
#[derive(Clone, Debug)]
pub enum TextureLoadResult {
    Loaded(Handle<Image>),
    Failed(String),
}

/// All texture requests of the scene and their progress
#[derive(Resource, Default)]
pub struct TextureLoads {
    pending: Vec<TextureRequest>,
    pub loaded: u32,
    pub failed: u32,
}

impl TextureLoads {
    pub fn new(requests: Vec<TextureRequest>) -> Self {
        Self {
            pending: requests,
            ..default()
        }
    }

    pub fn pending(&self) -> &[TextureRequest] {
        &self.pending
    }

    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }

    /// Resolve every request `check` has an answer for
    ///
    /// `check` returns `None` while a texture is still loading; such
    /// requests stay pending for the next poll.
    pub fn poll(
        &mut self,
        mut check: impl FnMut(&Handle<Image>) -> Option<TextureLoadResult>,
    ) -> Vec<(TextureRequest, TextureLoadResult)> {
        let mut resolved = Vec::new();
        let mut still_pending = Vec::with_capacity(self.pending.len());

        for request in self.pending.drain(..) {
            match check(&request.handle) {
                Some(result) => {
                    match result {
                        TextureLoadResult::Loaded(_) => self.loaded += 1,
                        TextureLoadResult::Failed(_) => self.failed += 1,
                    }
                    resolved.push((request, result));
                }
                None => still_pending.push(request),
            }
        }

        self.pending = still_pending;
        resolved
    }
}

/// Replace a failed color texture with the request's fallback tint
///
/// The material keeps its alpha so translucent layers stay translucent.
/// Failed bump and specular maps need no change: they are only attached
/// after a successful load.
pub fn apply_failure_fallback(material: &mut StandardMaterial, request: &TextureRequest) {
    if !request.role.is_color() {
        return;
    }
    if material.base_color_texture.as_ref() == Some(&request.handle) {
        material.base_color_texture = None;
    }
    let alpha = material.base_color.alpha();
    material.base_color = request.fallback.with_alpha(alpha);
}
