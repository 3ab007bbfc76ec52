//! Body construction
//!
//! Every orbiting body hangs off its own pivot at the world origin: the
//! body's mesh is offset along x from the pivot, so rotating the mesh spins
//! the body and rotating the pivot carries it around the sun. The factories
//! only build; they hold no rotation rates and never animate anything.

use bevy::prelude::*;
use std::f32::consts::FRAC_PI_2;

use super::catalog::{
    BodyDescriptor, CatalogEntry, EarthSystemSpec, RingSpec, EARTH_BUMP_TEXTURE,
    EARTH_CLOUD_TEXTURE, EARTH_COLOR_TEXTURE, EARTH_FALLBACK_RGB, EARTH_RADIUS,
    EARTH_SPECULAR_TEXTURE,
    MOON_BUMP_TEXTURE, MOON_COLOR_TEXTURE, MOON_FALLBACK_RGB, MOON_RADIUS, SOLAR_SYSTEM,
    SUN_FALLBACK_RGB,
};
use super::components::{Backdrop, CelestialBody, CloudShell, OrbitPivot, PlanetRing, Sun};
use super::registry::SceneRegistry;
use super::textures::{TextureProvider, TextureRequest, TextureRole};
use crate::config::lighting::*;
use crate::config::scene::*;

/// Entities making up an ordinary body
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BodyHandles {
    pub mesh: Entity,
    pub pivot: Entity,
    pub ring: Option<Entity>,
}

/// Entities making up the earth system
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EarthHandles {
    pub planet: Entity,
    pub clouds: Entity,
    /// Child of `planet`, so it follows the planet's spin
    pub moon: Entity,
    pub pivot: Entity,
}

/// Spawns scene entities and records every texture they wait for
pub struct SceneBuilder<'a, 'w, 's, T: TextureProvider + ?Sized> {
    commands: &'a mut Commands<'w, 's>,
    meshes: &'a mut Assets<Mesh>,
    materials: &'a mut Assets<StandardMaterial>,
    textures: &'a T,
    requests: Vec<TextureRequest>,
}

impl<'a, 'w, 's, T: TextureProvider + ?Sized> SceneBuilder<'a, 'w, 's, T> {
    pub fn new(
        commands: &'a mut Commands<'w, 's>,
        meshes: &'a mut Assets<Mesh>,
        materials: &'a mut Assets<StandardMaterial>,
        textures: &'a T,
    ) -> Self {
        Self {
            commands,
            meshes,
            materials,
            textures,
            requests: Vec::new(),
        }
    }

    /// Texture requests made so far, to be tracked until they resolve
    pub fn finish(self) -> Vec<TextureRequest> {
        self.requests
    }

    /// Build a body: sphere (and optional ring) under a pivot at the origin
    pub fn spawn_body(&mut self, body: &BodyDescriptor) -> Result<BodyHandles> {
        let mesh = self.lit_sphere(body.radius, PLANET_SEGMENTS, PLANET_SEGMENTS)?;
        let material = self.surface_material(
            body.color_texture,
            body.bump_texture,
            PLANET_ROUGHNESS,
            body.fallback_color(),
        );

        let pivot = self.spawn_pivot(body.name);
        let mesh = self
            .commands
            .spawn((
                Name::new(body.name),
                CelestialBody {
                    radius: body.radius,
                },
                Mesh3d(mesh),
                MeshMaterial3d(material),
                Transform::from_xyz(body.orbit_offset, 0.0, 0.0),
                ChildOf(pivot),
            ))
            .id();

        let ring = body
            .ring
            .map(|ring| self.spawn_ring(body, &ring, pivot));

        Ok(BodyHandles { mesh, pivot, ring })
    }

    /// Build the earth with its cloud shell and moon
    pub fn spawn_earth_system(&mut self, earth: &EarthSystemSpec) -> Result<EarthHandles> {
        let pivot = self.spawn_pivot("Earth");

        let planet_mesh = self.lit_sphere(EARTH_RADIUS, EARTH_SEGMENTS, EARTH_SEGMENTS)?;
        let planet_material = self.surface_material(
            EARTH_COLOR_TEXTURE,
            Some(EARTH_BUMP_TEXTURE),
            EARTH_ROUGHNESS,
            rgb(EARTH_FALLBACK_RGB),
        );
        // Oceans shine, land does not
        let specular = self.textures.load_texture(EARTH_SPECULAR_TEXTURE);
        self.record(
            EARTH_SPECULAR_TEXTURE,
            specular,
            TextureRole::Specular,
            &planet_material,
            rgb(EARTH_FALLBACK_RGB),
        );
        let planet = self
            .commands
            .spawn((
                Name::new("Earth"),
                CelestialBody {
                    radius: EARTH_RADIUS,
                },
                Mesh3d(planet_mesh),
                MeshMaterial3d(planet_material),
                Transform::from_xyz(earth.planet_offset, 0.0, 0.0),
                ChildOf(pivot),
            ))
            .id();

        let cloud_radius = EARTH_RADIUS + CLOUD_SHELL_GAP;
        let cloud_mesh = self.meshes.add(
            Sphere::new(cloud_radius)
                .mesh()
                .uv(EARTH_SEGMENTS, EARTH_SEGMENTS),
        );
        let cloud_texture = self.textures.load_texture(EARTH_CLOUD_TEXTURE);
        let cloud_material = self.materials.add(StandardMaterial {
            base_color: Color::srgba(1.0, 1.0, 1.0, CLOUD_OPACITY),
            base_color_texture: Some(cloud_texture.clone()),
            alpha_mode: AlphaMode::Blend,
            perceptual_roughness: 1.0,
            ..default()
        });
        self.record(
            EARTH_CLOUD_TEXTURE,
            cloud_texture,
            TextureRole::Clouds,
            &cloud_material,
            Color::WHITE,
        );
        let clouds = self
            .commands
            .spawn((
                Name::new("Earth clouds"),
                CloudShell,
                CelestialBody {
                    radius: cloud_radius,
                },
                Mesh3d(cloud_mesh),
                MeshMaterial3d(cloud_material),
                Transform::from_xyz(earth.cloud_offset, 0.0, 0.0),
                ChildOf(pivot),
            ))
            .id();

        let (sectors, stacks) = MOON_SEGMENTS;
        let moon_mesh = self.lit_sphere(MOON_RADIUS, sectors, stacks)?;
        let moon_material = self.surface_material(
            MOON_COLOR_TEXTURE,
            Some(MOON_BUMP_TEXTURE),
            PLANET_ROUGHNESS,
            rgb(MOON_FALLBACK_RGB),
        );
        let moon = self
            .commands
            .spawn((
                Name::new("Moon"),
                CelestialBody {
                    radius: MOON_RADIUS,
                },
                Mesh3d(moon_mesh),
                MeshMaterial3d(moon_material),
                Transform::from_xyz(earth.moon_offset, 0.0, 0.0),
                ChildOf(planet),
            ))
            .id();

        Ok(EarthHandles {
            planet,
            clouds,
            moon,
            pivot,
        })
    }

    /// The sun sits at the origin without a pivot and is self-lit
    pub fn spawn_sun(&mut self) -> Entity {
        let mesh = self
            .meshes
            .add(Sphere::new(SUN_RADIUS).mesh().uv(SUN_SEGMENTS, SUN_SEGMENTS));
        let texture = self.textures.load_texture(SUN_TEXTURE);
        let material = self.materials.add(StandardMaterial {
            base_color_texture: Some(texture.clone()),
            unlit: true,
            ..default()
        });
        self.record(
            SUN_TEXTURE,
            texture,
            TextureRole::Sun,
            &material,
            rgb(SUN_FALLBACK_RGB),
        );

        self.commands
            .spawn((
                Name::new("Sun"),
                Sun,
                CelestialBody { radius: SUN_RADIUS },
                Mesh3d(mesh),
                MeshMaterial3d(material),
                Transform::default(),
            ))
            .id()
    }

    /// Starfield sphere seen from the inside
    pub fn spawn_background(&mut self) -> Entity {
        let mesh = self.meshes.add(
            Sphere::new(BACKGROUND_RADIUS)
                .mesh()
                .uv(BACKGROUND_SEGMENTS, BACKGROUND_SEGMENTS),
        );
        let texture = self.textures.load_texture(BACKGROUND_TEXTURE);
        let material = self.materials.add(StandardMaterial {
            base_color_texture: Some(texture.clone()),
            unlit: true,
            double_sided: true,
            cull_mode: None,
            ..default()
        });
        self.record(
            BACKGROUND_TEXTURE,
            texture,
            TextureRole::Background,
            &material,
            Color::srgb(0.01, 0.01, 0.03),
        );

        self.commands
            .spawn((
                Name::new("Background"),
                Backdrop,
                Mesh3d(mesh),
                MeshMaterial3d(material),
                Transform::default(),
            ))
            .id()
    }

    /// Point lights at the sun; the ambient fill lives on the camera
    pub fn spawn_lights(&mut self) -> Vec<Entity> {
        let sun_light = self
            .commands
            .spawn((
                Name::new("Sun light"),
                PointLight {
                    color: Color::WHITE,
                    intensity: SUN_LIGHT_INTENSITY,
                    range: SUN_LIGHT_RANGE,
                    shadows_enabled: false,
                    ..default()
                },
                Transform::default(),
            ))
            .id();

        let inner_light = self
            .commands
            .spawn((
                Name::new("Inner light"),
                PointLight {
                    color: Color::WHITE,
                    intensity: INNER_LIGHT_INTENSITY,
                    range: INNER_LIGHT_RANGE,
                    shadows_enabled: false,
                    ..default()
                },
                Transform::default(),
            ))
            .id();

        vec![sun_light, inner_light]
    }

    fn spawn_pivot(&mut self, body: &str) -> Entity {
        self.commands
            .spawn((
                Name::new(format!("{body} pivot")),
                OrbitPivot,
                Transform::default(),
                Visibility::default(),
            ))
            .id()
    }

    fn spawn_ring(&mut self, body: &BodyDescriptor, ring: &RingSpec, pivot: Entity) -> Entity {
        let mesh = self.meshes.add(
            Annulus::new(ring.inner_radius, ring.outer_radius)
                .mesh()
                .resolution(RING_SEGMENTS),
        );
        let texture = self.textures.load_texture(ring.texture);
        let material = self.materials.add(StandardMaterial {
            base_color_texture: Some(texture.clone()),
            alpha_mode: AlphaMode::Blend,
            double_sided: true,
            cull_mode: None,
            perceptual_roughness: PLANET_ROUGHNESS,
            ..default()
        });
        self.record(
            ring.texture,
            texture,
            TextureRole::Ring,
            &material,
            body.fallback_color(),
        );

        // The annulus faces +z; tip it into the orbital (xz) plane
        self.commands
            .spawn((
                Name::new(format!("{} ring", body.name)),
                PlanetRing,
                Mesh3d(mesh),
                MeshMaterial3d(material),
                Transform::from_xyz(body.orbit_offset, 0.0, 0.0)
                    .with_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
                ChildOf(pivot),
            ))
            .id()
    }

    /// Sphere with tangents, so a normal map can be attached later
    fn lit_sphere(&mut self, radius: f32, sectors: u32, stacks: u32) -> Result<Handle<Mesh>> {
        let mut mesh = Sphere::new(radius).mesh().uv(sectors, stacks);
        mesh.generate_tangents()?;
        Ok(self.meshes.add(mesh))
    }

    /// Lit material with a color texture; the bump map is only requested
    /// here and attached as a normal map once it has loaded
    fn surface_material(
        &mut self,
        color_texture: &str,
        bump_texture: Option<&str>,
        roughness: f32,
        fallback: Color,
    ) -> Handle<StandardMaterial> {
        let color = self.textures.load_texture(color_texture);
        let material = self.materials.add(StandardMaterial {
            base_color_texture: Some(color.clone()),
            perceptual_roughness: roughness,
            ..default()
        });
        self.record(
            color_texture,
            color,
            TextureRole::Surface,
            &material,
            fallback,
        );

        if let Some(path) = bump_texture {
            let bump = self.textures.load_texture(path);
            self.record(path, bump, TextureRole::Bump, &material, fallback);
        }
        material
    }

    fn record(
        &mut self,
        path: &str,
        handle: Handle<Image>,
        role: TextureRole,
        material: &Handle<StandardMaterial>,
        fallback: Color,
    ) {
        self.requests.push(TextureRequest {
            path: path.to_owned(),
            handle,
            role,
            material: material.clone(),
            fallback,
        });
    }
}

fn rgb([r, g, b]: [f32; 3]) -> Color {
    Color::srgb(r, g, b)
}

/// Build the whole solar system from the catalog
pub fn assemble_solar_system<T: TextureProvider + ?Sized>(
    builder: &mut SceneBuilder<'_, '_, '_, T>,
) -> Result<SceneRegistry> {
    let sun = builder.spawn_sun();
    let background = builder.spawn_background();
    let lights = builder.spawn_lights();
    let mut registry = SceneRegistry::new(sun, SUN_SPIN_RATE, background, lights);

    for entry in &SOLAR_SYSTEM {
        match entry {
            CatalogEntry::Body(body) => {
                let handles = builder.spawn_body(body)?;
                registry.register_body(body, handles);
            }
            CatalogEntry::Earth(earth) => {
                let handles = builder.spawn_earth_system(earth)?;
                registry.register_earth(earth, handles);
            }
        }
    }

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use std::sync::Mutex;

    /// Hands out placeholder handles and remembers what was asked for
    #[derive(Resource, Default)]
    struct StubTextures(Mutex<Vec<String>>);

    impl TextureProvider for StubTextures {
        fn load_texture(&self, path: &str) -> Handle<Image> {
            if let Ok(mut paths) = self.0.lock() {
                paths.push(path.to_owned());
            }
            Handle::default()
        }
    }

    fn test_world() -> World {
        let mut world = World::new();
        world.init_resource::<Assets<Mesh>>();
        world.init_resource::<Assets<StandardMaterial>>();
        world.init_resource::<StubTextures>();
        world
    }

    fn body(radius: f32, orbit_offset: f32, ring: Option<RingSpec>) -> BodyDescriptor {
        BodyDescriptor {
            name: "Test",
            radius,
            color_texture: "textures/test/map.jpg",
            bump_texture: None,
            orbit_offset,
            ring,
            spin_rate: 0.01,
            orbit_rate: 0.001,
            fallback_rgb: [0.5, 0.5, 0.5],
        }
    }

    fn build_body(world: &mut World, descriptor: BodyDescriptor) -> BodyHandles {
        world
            .run_system_once(
                move |mut commands: Commands,
                      mut meshes: ResMut<Assets<Mesh>>,
                      mut materials: ResMut<Assets<StandardMaterial>>,
                      textures: Res<StubTextures>| {
                    let mut builder =
                        SceneBuilder::new(&mut commands, &mut meshes, &mut materials, &*textures);
                    builder.spawn_body(&descriptor).unwrap()
                },
            )
            .unwrap()
    }

    fn child_count(world: &World, entity: Entity) -> usize {
        world.get::<Children>(entity).map_or(0, |children| children.len())
    }

    #[test]
    fn body_without_ring_hangs_off_pivot_at_origin() {
        let mut world = test_world();
        let handles = build_body(&mut world, body(10.0, 260.0, None));

        assert!(handles.ring.is_none());
        assert_eq!(world.get::<Transform>(handles.pivot).unwrap().translation, Vec3::ZERO);

        let mesh = world.get::<Transform>(handles.mesh).unwrap();
        assert_eq!(mesh.translation, Vec3::new(260.0, 0.0, 0.0));
        assert_eq!(world.get::<CelestialBody>(handles.mesh).unwrap().radius, 10.0);
        assert_eq!(world.get::<ChildOf>(handles.mesh).unwrap().parent(), handles.pivot);
        assert_eq!(child_count(&world, handles.pivot), 1);
    }

    #[test]
    fn ringed_body_has_ring_beside_mesh() {
        let mut world = test_world();
        let ring = RingSpec {
            inner_radius: 29.0,
            outer_radius: 41.0,
            texture: "textures/test/ring.png",
        };
        let handles = build_body(&mut world, body(25.0, 423.0, Some(ring)));

        let ring = handles.ring.unwrap();
        assert_eq!(child_count(&world, handles.pivot), 2);
        assert!(world.get::<PlanetRing>(ring).is_some());
        assert_eq!(world.get::<ChildOf>(ring).unwrap().parent(), handles.pivot);

        let ring_transform = world.get::<Transform>(ring).unwrap();
        let mesh_transform = world.get::<Transform>(handles.mesh).unwrap();
        assert_eq!(ring_transform.translation.x, mesh_transform.translation.x);
        assert!(ring_transform
            .rotation
            .abs_diff_eq(Quat::from_rotation_x(-FRAC_PI_2), 1e-6));
    }

    #[test]
    fn earth_clouds_are_one_unit_larger_at_any_offset() {
        for (planet_offset, cloud_offset) in [(205.0, 205.0), (50.0, 80.0), (0.0, 900.0)] {
            let mut world = test_world();
            let spec = EarthSystemSpec {
                planet_offset,
                cloud_offset,
                moon_offset: 12.0,
                planet_spin_rate: 0.01,
                cloud_spin_rate: 0.02,
                moon_spin_rate: 0.03,
                orbit_rate: 0.001,
            };
            let earth = world
                .run_system_once(
                    move |mut commands: Commands,
                          mut meshes: ResMut<Assets<Mesh>>,
                          mut materials: ResMut<Assets<StandardMaterial>>,
                          textures: Res<StubTextures>| {
                        let mut builder = SceneBuilder::new(
                            &mut commands,
                            &mut meshes,
                            &mut materials,
                            &*textures,
                        );
                        builder.spawn_earth_system(&spec).unwrap()
                    },
                )
                .unwrap();

            let planet = world.get::<CelestialBody>(earth.planet).unwrap().radius;
            let clouds = world.get::<CelestialBody>(earth.clouds).unwrap().radius;
            assert_eq!(clouds, planet + 1.0);

            let cloud_x = world.get::<Transform>(earth.clouds).unwrap().translation.x;
            assert_eq!(cloud_x, cloud_offset);
        }
    }

    #[test]
    fn moon_follows_the_planet() {
        let mut world = test_world();
        let spec = match SOLAR_SYSTEM[2] {
            CatalogEntry::Earth(spec) => spec,
            CatalogEntry::Body(_) => unreachable!("earth is third"),
        };
        let earth = world
            .run_system_once(
                move |mut commands: Commands,
                      mut meshes: ResMut<Assets<Mesh>>,
                      mut materials: ResMut<Assets<StandardMaterial>>,
                      textures: Res<StubTextures>| {
                    let mut builder =
                        SceneBuilder::new(&mut commands, &mut meshes, &mut materials, &*textures);
                    builder.spawn_earth_system(&spec).unwrap()
                },
            )
            .unwrap();

        assert_eq!(world.get::<ChildOf>(earth.moon).unwrap().parent(), earth.planet);
        assert_eq!(world.get::<ChildOf>(earth.planet).unwrap().parent(), earth.pivot);
        assert_eq!(world.get::<ChildOf>(earth.clouds).unwrap().parent(), earth.pivot);
        assert_eq!(child_count(&world, earth.pivot), 2);
    }

    #[test]
    fn assembly_registers_every_catalog_entry() {
        let mut world = test_world();
        let (registry, requests) = world
            .run_system_once(
                |mut commands: Commands,
                 mut meshes: ResMut<Assets<Mesh>>,
                 mut materials: ResMut<Assets<StandardMaterial>>,
                 textures: Res<StubTextures>| {
                    let mut builder =
                        SceneBuilder::new(&mut commands, &mut meshes, &mut materials, &*textures);
                    let registry = assemble_solar_system(&mut builder).unwrap();
                    (registry, builder.finish())
                },
            )
            .unwrap();

        assert_eq!(registry.bodies.len(), 8);
        assert!(registry.earth.is_some());
        assert_eq!(registry.lights.len(), 2);

        let rings: Vec<_> = registry
            .bodies
            .iter()
            .filter(|body| body.handles.ring.is_some())
            .map(|body| body.name)
            .collect();
        assert_eq!(rings, ["Saturn", "Uranus"]);

        // sun spin, spin and orbit per body, four tracks for the earth system
        assert_eq!(registry.rotation_tracks().len(), 1 + 8 * 2 + 4);

        // 15 for ordinary bodies, 6 for the earth system, sun and background
        assert_eq!(requests.len(), 23);
        let bumps = requests
            .iter()
            .filter(|request| request.role == TextureRole::Bump)
            .count();
        assert_eq!(bumps, 7);
        let specular: Vec<_> = requests
            .iter()
            .filter(|request| request.role == TextureRole::Specular)
            .map(|request| request.path.as_str())
            .collect();
        assert_eq!(specular, [EARTH_SPECULAR_TEXTURE]);

        let mars = registry
            .bodies
            .iter()
            .find(|body| body.name == "Mars")
            .unwrap();
        let mars_x = world.get::<Transform>(mars.handles.mesh).unwrap().translation.x;
        assert_eq!(mars_x, 260.0);
        assert!(world.get::<Sun>(registry.sun).is_some());
    }
}
