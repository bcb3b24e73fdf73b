//! Render composition.
//!
//! Flows describe what they want drawn this frame with a [`Render`]. The
//! engine flattens every flow's render into one list of [`Instanced`] draws
//! and issues them with the planet pipeline, in the order they were given.

use crate::data_structures::model::{Material, Mesh};

/// Data for one instanced draw: a mesh, its material and the instance buffer.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub mesh: &'a Mesh,
    pub material: &'a Material,
    pub amount: usize,
}

/// Specifies what a flow renders.
///
/// - `None` renders nothing
/// - `Default(Instanced)` renders a single instanced object
/// - `Defaults(Vec<Instanced>)` renders a batch, front to back in vector order
/// - `Composed(Vec<Render>)` recursively renders a composition of renders
pub enum Render<'a> {
    None,
    Default(Instanced<'a>),
    Defaults(Vec<Instanced<'a>>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    /// Flatten the render tree into `draws`, keeping the order of the leaves.
    pub fn collect_into(self, draws: &mut Vec<Instanced<'a>>) {
        match self {
            Render::Default(instanced) => draws.push(instanced),
            Render::Defaults(mut vec) => draws.append(&mut vec),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.collect_into(draws)),
            Render::None => (),
        }
    }

    /// Number of draws this render will produce.
    pub fn len(&self) -> usize {
        match self {
            Render::None => 0,
            Render::Default(_) => 1,
            Render::Defaults(vec) => vec.len(),
            Render::Composed(renders) => renders.iter().map(Render::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Render<'_> {
    fn default() -> Self {
        Self::None
    }
}
