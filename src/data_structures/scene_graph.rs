//! Scene graph of orbiting bodies.
//!
//! Nodes live in an arena and refer to their parent by [`NodeId`]. A parent
//! must exist before its children are added, so the arena order is always
//! parent-before-child. That order is used both for resolving world
//! transforms in a single pass and for issuing draw calls.
//!
//! Only translation is inherited: a child follows its parent around the
//! parent's orbit but never picks up the parent's spin or tilt.

use cgmath::{Matrix4, Vector3, Zero};
use log::warn;

use crate::data_structures::orbit::Orbit;

/// Handle of a node inside the [`SceneGraph`] that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One body in the graph: its orbit, its optional parent and whatever the caller attaches.
#[derive(Debug)]
pub struct Node<R> {
    pub orbit: Orbit,
    pub resource: R,
    parent: Option<NodeId>,
}

impl<R> Node<R> {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Arena of [`Node`]s ordered parent-before-child.
///
/// `R` is the per-node payload. The renderer attaches GPU buffers, tests
/// usually attach a name or `()`.
#[derive(Debug)]
pub struct SceneGraph<R> {
    nodes: Vec<Node<R>>,
}

impl<R> Default for SceneGraph<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> SceneGraph<R> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node without a parent.
    pub fn add_root(&mut self, orbit: Orbit, resource: R) -> NodeId {
        self.push(orbit, resource, None)
    }

    /// Add a node that translates along with `parent`.
    pub fn add_child(&mut self, parent: NodeId, orbit: Orbit, resource: R) -> anyhow::Result<NodeId> {
        if parent.0 >= self.nodes.len() {
            anyhow::bail!(
                "parent node {} does not exist (graph has {} nodes)",
                parent.0,
                self.nodes.len()
            );
        }
        Ok(self.push(orbit, resource, Some(parent)))
    }

    fn push(&mut self, orbit: Orbit, resource: R, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            orbit,
            resource,
            parent,
        });
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<R>> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<R>> {
        self.nodes.get_mut(id.0)
    }

    /// Nodes in parent-before-child order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<R>)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    pub fn resources(&self) -> impl Iterator<Item = &R> {
        self.nodes.iter().map(|node| &node.resource)
    }

    /// Advance every node's spin and orbit by `seconds`.
    pub fn update(&mut self, seconds: f32) {
        self.nodes.iter_mut().for_each(|node| node.orbit.update(seconds));
    }

    /// Put every node back to its starting angles.
    pub fn reset(&mut self) {
        self.nodes.iter_mut().for_each(|node| node.orbit.reset());
    }

    /// Accumulated translation of `id` through all of its ancestors' orbits.
    pub fn world_translation(&self, id: NodeId) -> Option<Vector3<f32>> {
        let node = self.get(id)?;
        let inherited = match node.parent {
            Some(parent) => self.world_translation(parent)?,
            None => Vector3::zero(),
        };
        Some(inherited + node.orbit.local_translation())
    }

    /// Full model matrix of `id`: world translation applied after the node's own scale, spin and tilt.
    pub fn model_matrix(&self, id: NodeId) -> Option<Matrix4<f32>> {
        let translation = self.world_translation(id)?;
        let node = self.get(id)?;
        Some(Matrix4::from_translation(translation) * node.orbit.spin_matrix())
    }

    /**
     * Model matrices of all nodes in arena order.
     *
     * Resolves every world translation in one forward pass, since a parent
     * always precedes its children.
     */
    pub fn model_matrices(&self) -> Vec<Matrix4<f32>> {
        let mut translations: Vec<Vector3<f32>> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let inherited = match node.parent {
                Some(parent) => translations.get(parent.0).copied().unwrap_or_else(|| {
                    warn!("node refers to parent {} that comes after it", parent.0);
                    Vector3::zero()
                }),
                None => Vector3::zero(),
            };
            translations.push(inherited + node.orbit.local_translation());
        }
        self.nodes
            .iter()
            .zip(translations)
            .map(|(node, translation)| Matrix4::from_translation(translation) * node.orbit.spin_matrix())
            .collect()
    }

    /// Hand each node's current model matrix to `write`, parents first.
    pub fn write_world_transforms(&mut self, mut write: impl FnMut(Matrix4<f32>, &mut R)) {
        let matrices = self.model_matrices();
        self.nodes
            .iter_mut()
            .zip(matrices)
            .for_each(|(node, matrix)| write(matrix, &mut node.resource));
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, InnerSpace, Vector4};

    use super::*;

    fn approx(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-5
    }

    fn sun_earth_moon() -> (SceneGraph<&'static str>, NodeId, NodeId, NodeId) {
        let mut graph = SceneGraph::new();
        let sun = graph.add_root(
            Orbit::new(0.25, Vector3::zero(), 8.0, 0.0, 0.0, 0.0),
            "sun",
        );
        let earth = graph
            .add_child(
                sun,
                Orbit::new(0.1, Vector3::new(0.8, 0.0, 0.0), 360.0, 90.0, 30.0, 0.0),
                "earth",
            )
            .unwrap();
        let moon = graph
            .add_child(
                earth,
                Orbit::new(0.05, Vector3::new(0.3, 0.0, 0.0), 72.0, 180.0, 0.0, 0.0),
                "moon",
            )
            .unwrap();
        (graph, sun, earth, moon)
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut graph: SceneGraph<()> = SceneGraph::new();
        let err = graph.add_child(NodeId(3), Orbit::fixed(1.0), ());
        assert!(err.is_err());
        assert!(graph.is_empty());
    }

    #[test]
    fn iteration_is_parent_before_child() {
        let (graph, sun, earth, moon) = sun_earth_moon();
        let order: Vec<_> = graph.iter().map(|(id, node)| (id, node.resource)).collect();
        assert_eq!(order, vec![(sun, "sun"), (earth, "earth"), (moon, "moon")]);
        for (id, node) in graph.iter() {
            if let Some(parent) = node.parent() {
                assert!(parent < id);
            }
        }
    }

    #[test]
    fn translations_accumulate_through_parents() {
        let (mut graph, sun, earth, moon) = sun_earth_moon();
        assert!(approx(graph.world_translation(sun).unwrap(), Vector3::zero()));
        assert!(approx(graph.world_translation(earth).unwrap(), Vector3::new(0.8, 0.0, 0.0)));
        assert!(approx(graph.world_translation(moon).unwrap(), Vector3::new(1.1, 0.0, 0.0)));

        // earth a quarter turn, moon a half turn around earth
        graph.update(1.0);
        assert!(approx(graph.world_translation(earth).unwrap(), Vector3::new(0.0, 0.0, -0.8)));
        assert!(approx(graph.world_translation(moon).unwrap(), Vector3::new(-0.3, 0.0, -0.8)));
    }

    #[test]
    fn parent_spin_is_not_inherited() {
        let (mut graph, _, earth, moon) = sun_earth_moon();
        graph.get_mut(earth).unwrap().orbit =
            Orbit::new(0.1, Vector3::new(0.8, 0.0, 0.0), 360.0, 0.0, 30.0, 0.0);
        graph.update(0.25);
        // earth has spun 90 degrees but not moved, so the moon sits where it started
        let origin = Vector4::new(0.0, 0.0, 0.0, 1.0);
        let moon_centre = graph.model_matrix(moon).unwrap() * origin;
        let mut moon_alone = Orbit::new(0.05, Vector3::new(0.3, 0.0, 0.0), 72.0, 180.0, 0.0, 0.0);
        moon_alone.update(0.25);
        assert!(approx(
            moon_centre.truncate(),
            Vector3::new(0.8, 0.0, 0.0) + moon_alone.local_translation()
        ));
    }

    #[test]
    fn model_matrix_places_scaled_sphere() {
        let (graph, _, earth, _) = sun_earth_moon();
        let m = graph.model_matrix(earth).unwrap();
        let centre = m * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!(approx(centre.truncate(), Vector3::new(0.8, 0.0, 0.0)));
        // surface point lands at scale distance from the centre
        let surface = m * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!(((surface - centre).truncate().magnitude() - 0.1).abs() < 1e-5);
    }

    #[test]
    fn tilt_is_applied_to_the_pole() {
        let (graph, _, earth, _) = sun_earth_moon();
        let m = graph.model_matrix(earth).unwrap();
        let pole = (m * Vector4::new(0.0, 1.0, 0.0, 0.0)).truncate().normalize();
        let expected = Matrix4::from_angle_z(Deg(-30.0)) * Vector4::new(0.0, 1.0, 0.0, 0.0);
        assert!(approx(pole, expected.truncate()));
    }

    #[test]
    fn batch_matrices_match_single_lookups() {
        let (mut graph, ..) = sun_earth_moon();
        graph.update(2.7);
        let batch = graph.model_matrices();
        for (id, _) in graph.iter() {
            let single = graph.model_matrix(id).unwrap();
            for c in 0..4 {
                assert!((batch[id.index()][c] - single[c]).magnitude() < 1e-5);
            }
        }
    }

    #[test]
    fn update_and_reset_reach_every_node() {
        let (mut graph, ..) = sun_earth_moon();
        graph.update(0.1);
        assert!(graph.iter().all(|(_, n)| n.orbit.self_rotation_angle() > 0.0));
        graph.reset();
        assert!(graph.iter().all(|(_, n)| n.orbit.self_rotation_angle() == 0.0
            && n.orbit.orbit_angle() == 0.0));
    }

    #[test]
    fn write_world_transforms_visits_in_order() {
        let (mut graph, ..) = sun_earth_moon();
        let mut seen = Vec::new();
        graph.write_world_transforms(|m, name| seen.push((*name, m.w.truncate())));
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].0, "sun");
        assert!(approx(seen[2].1, Vector3::new(1.1, 0.0, 0.0)));
    }
}
