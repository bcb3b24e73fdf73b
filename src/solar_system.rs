//! The default scene: a star sphere, the sun, the earth and its moon.
//!
//! [`SOLAR_SYSTEM`] describes the bodies. [`build_graph`] turns any such
//! table into a [`SceneGraph`] with an arbitrary payload per body, which lets
//! the same hierarchy drive both the GPU flow below and CPU-only tests.

use std::{collections::HashMap, rc::Rc};

use cgmath::{Matrix4, SquareMatrix, Vector3};
use instant::Duration;
use wgpu::util::DeviceExt;
use winit::event::WindowEvent;

use crate::{
    context::{Context, InitContext},
    data_structures::{
        geometry::create_sphere,
        instance::InstanceRaw,
        model::{Material, Mesh},
        orbit::Orbit,
        scene_graph::{NodeId, SceneGraph},
        texture::Texture,
    },
    flow::{FlowConstructor, FlowFuture, GraphicsFlow},
    render::{Instanced, Render},
    resources::texture::{diffuse_layout, load_texture_or},
};

/// Static description of one body.
///
/// Rates are in degrees per second, tilt and inclination in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySpec {
    pub name: &'static str,
    pub texture: &'static str,
    /// Colour used when the texture cannot be loaded.
    pub fallback: [u8; 4],
    pub scale: f32,
    pub position: [f32; 3],
    pub self_rotation_rate: f32,
    pub orbit_rate: f32,
    pub axial_tilt: f32,
    pub inclination: f32,
    /// Name of the body this one orbits. It must appear earlier in the table.
    pub parent: Option<&'static str>,
    /// Seen from inside (the star sphere), so its normals point inwards.
    pub inside: bool,
}

impl BodySpec {
    pub fn orbit(&self) -> Orbit {
        Orbit::new(
            self.scale,
            Vector3::from(self.position),
            self.self_rotation_rate,
            self.orbit_rate,
            self.axial_tilt,
            self.inclination,
        )
    }
}

pub static SOLAR_SYSTEM: [BodySpec; 4] = [
    BodySpec {
        name: "stars",
        texture: "stars.jpg",
        fallback: [8, 8, 20, 255],
        scale: 10.0,
        position: [0.0, 0.0, 0.0],
        self_rotation_rate: 0.0,
        orbit_rate: 0.0,
        axial_tilt: 0.0,
        inclination: 0.0,
        parent: None,
        inside: true,
    },
    BodySpec {
        name: "sun",
        texture: "sun.jpg",
        fallback: [255, 200, 64, 255],
        scale: 0.25,
        position: [0.0, 0.0, 0.0],
        self_rotation_rate: 360.0 / 45.0,
        orbit_rate: 0.0,
        axial_tilt: 0.0,
        inclination: 0.0,
        parent: None,
        inside: false,
    },
    BodySpec {
        name: "earth",
        texture: "earth.jpg",
        fallback: [40, 90, 200, 255],
        scale: 0.1,
        position: [0.8, 0.0, 0.0],
        self_rotation_rate: 360.0,
        orbit_rate: 360.0 / 80.0,
        axial_tilt: 30.0,
        inclination: 20.0,
        parent: Some("sun"),
        inside: false,
    },
    BodySpec {
        name: "moon",
        texture: "moon.jpg",
        fallback: [150, 150, 150, 255],
        scale: 0.05,
        position: [0.3, 0.0, 0.0],
        self_rotation_rate: 72.0,
        orbit_rate: 36.0,
        axial_tilt: 0.0,
        inclination: -30.0,
        parent: Some("earth"),
        inside: false,
    },
];

/// Build a scene graph from `bodies`, attaching each body's payload.
///
/// Parents are looked up by name and must precede their children.
pub fn build_graph<'s, R>(
    bodies: impl IntoIterator<Item = (&'s BodySpec, R)>,
) -> anyhow::Result<SceneGraph<R>> {
    let mut graph = SceneGraph::new();
    let mut ids: HashMap<&str, NodeId> = HashMap::new();
    for (spec, resource) in bodies {
        let id = match spec.parent {
            None => graph.add_root(spec.orbit(), resource),
            Some(parent) => {
                let Some(&parent_id) = ids.get(parent) else {
                    anyhow::bail!(
                        "{} orbits {parent}, which is not listed before it",
                        spec.name
                    );
                };
                graph.add_child(parent_id, spec.orbit(), resource)?
            }
        };
        if ids.insert(spec.name, id).is_some() {
            anyhow::bail!("body {} is listed twice", spec.name);
        }
    }
    Ok(graph)
}

/// GPU payload of one body.
pub struct Body {
    pub name: &'static str,
    pub mesh: Rc<Mesh>,
    pub material: Material,
    pub instance_buffer: wgpu::Buffer,
}

impl Body {
    fn new(
        device: &wgpu::Device,
        spec: &BodySpec,
        mesh: Rc<Mesh>,
        texture: Texture,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let material = Material::new(device, spec.name, texture, layout);
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Instance Buffer", spec.name)),
            contents: bytemuck::cast_slice(&[InstanceRaw::from_model(Matrix4::identity())]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            name: spec.name,
            mesh,
            material,
            instance_buffer,
        }
    }

    fn write(&self, queue: &wgpu::Queue, model: Matrix4<f32>) {
        queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&[InstanceRaw::from_model(model)]),
        );
    }

    pub fn render(&self) -> Instanced<'_> {
        Instanced {
            instance: &self.instance_buffer,
            mesh: &self.mesh,
            material: &self.material,
            amount: 1,
        }
    }
}

pub struct SolarSystem {
    graph: SceneGraph<Body>,
}

impl SolarSystem {
    /// Upload the sphere meshes and load every body's texture concurrently.
    pub async fn new(ctx: InitContext) -> anyhow::Result<Self> {
        let sphere = create_sphere(1.0);
        let mut starfield = sphere.clone();
        starfield.invert_normals();
        let outside = Rc::new(Mesh::from_geometry(&ctx.device, &sphere, "sphere")?);
        let inside = Rc::new(Mesh::from_geometry(&ctx.device, &starfield, "starfield")?);

        let layout = diffuse_layout(&ctx.device);
        let textures = futures::future::join_all(SOLAR_SYSTEM.iter().map(|spec| {
            load_texture_or(
                &ctx.asset_dir,
                spec.texture,
                spec.fallback,
                &ctx.device,
                &ctx.queue,
            )
        }))
        .await;

        let bodies = SOLAR_SYSTEM.iter().zip(textures).map(|(spec, texture)| {
            let mesh = if spec.inside { inside.clone() } else { outside.clone() };
            (spec, Body::new(&ctx.device, spec, mesh, texture, &layout))
        });
        let mut graph = build_graph(bodies)?;
        graph.write_world_transforms(|model, body| body.write(&ctx.queue, model));
        log::info!("solar system ready with {} bodies", graph.len());

        Ok(Self { graph })
    }

    pub fn graph(&self) -> &SceneGraph<Body> {
        &self.graph
    }

    /// Move every body forward by `dt` and upload the new transforms.
    pub fn advance(&mut self, queue: &wgpu::Queue, dt: Duration) {
        self.graph.update(dt.as_secs_f32());
        self.graph
            .write_world_transforms(|model, body| body.write(queue, model));
    }

    pub fn reset(&mut self, queue: &wgpu::Queue) {
        self.graph.reset();
        self.advance(queue, Duration::ZERO);
    }
}

impl GraphicsFlow for SolarSystem {
    fn on_init(&mut self, ctx: &mut Context) {
        ctx.clear_colour = wgpu::Color::BLACK;
    }

    fn on_reset(&mut self, ctx: &Context) {
        self.reset(&ctx.queue);
    }

    fn on_update(&mut self, ctx: &Context, dt: Duration) {
        self.advance(&ctx.queue, dt);
    }

    fn on_window_events(&mut self, _ctx: &Context, _event: &WindowEvent) {}

    fn on_render(&self) -> Render<'_> {
        Render::Defaults(self.graph.resources().map(Body::render).collect())
    }
}

async fn boxed(ctx: InitContext) -> anyhow::Result<Box<dyn GraphicsFlow>> {
    Ok(Box::new(SolarSystem::new(ctx).await?))
}

/// Constructor of the solar system flow for [`crate::flow::run`].
pub fn constructor() -> FlowConstructor {
    Box::new(|ctx: InitContext| -> FlowFuture { Box::pin(boxed(ctx)) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_builds_expected_hierarchy() {
        let graph = build_graph(SOLAR_SYSTEM.iter().map(|spec| (spec, spec.name))).unwrap();
        let parents: Vec<_> = graph
            .iter()
            .map(|(_, node)| node.parent().map(|p| graph.get(p).unwrap().resource))
            .collect();
        assert_eq!(parents, vec![None, None, Some("sun"), Some("earth")]);
    }

    #[test]
    fn only_the_star_sphere_is_seen_from_inside() {
        let inside: Vec<_> = SOLAR_SYSTEM
            .iter()
            .filter(|spec| spec.inside)
            .map(|spec| spec.name)
            .collect();
        assert_eq!(inside, vec!["stars"]);
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut orphan = SOLAR_SYSTEM[3];
        orphan.parent = Some("mars");
        let err = build_graph([(&orphan, ())]).unwrap_err();
        assert!(err.to_string().contains("mars"));
    }

    #[test]
    fn child_before_parent_is_rejected() {
        let bodies = [&SOLAR_SYSTEM[3], &SOLAR_SYSTEM[2], &SOLAR_SYSTEM[1]];
        assert!(build_graph(bodies.into_iter().map(|spec| (spec, ()))).is_err());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let bodies = [&SOLAR_SYSTEM[1], &SOLAR_SYSTEM[1]];
        assert!(build_graph(bodies.into_iter().map(|spec| (spec, ()))).is_err());
    }
}
