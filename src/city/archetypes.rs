use super::classify::Archetype;
use nalgebra::Vector3;
use std::fmt;

/// Lookup table with one optional slot per [`Archetype`].
#[derive(Debug, Clone)]
pub struct ArchetypeTable<T> {
    entries: [Option<T>; 5],
}

impl<T> Default for ArchetypeTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ArchetypeTable<T> {
    pub fn new() -> Self {
        ArchetypeTable { entries: [None, None, None, None, None] }
    }

    /// Store `value` for `archetype`, returning the previous entry.
    pub fn insert(&mut self, archetype: Archetype, value: T) -> Option<T> {
        self.entries[archetype.index()].replace(value)
    }

    pub fn get(&self, archetype: Archetype) -> Option<&T> {
        self.entries[archetype.index()].as_ref()
    }

    pub fn missing(&self) -> Vec<Archetype> {
        Archetype::ALL
            .into_iter()
            .filter(|a| self.entries[a.index()].is_none())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Archetype, &T)> {
        Archetype::ALL
            .into_iter()
            .filter_map(move |a| self.get(a).map(|v| (a, v)))
    }
}

/// One building variant found in the city model.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingModel {
    /// Node index inside the GLTF document, used by the scene side to clone it.
    pub node: usize,
    /// Size of the node's bounding box after applying the node scale.
    pub extent: Vector3<f32>,
}

#[derive(Debug)]
pub enum AssetError {
    Gltf(gltf::Error),
    /// The city model has no node named after a building archetype.
    NoBuildingNodes,
    /// The model file contains no mesh to measure.
    NoMeshes,
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gltf(e) => write!(f, "failed to read model: {e}"),
            Self::NoBuildingNodes => write!(f, "model has no building archetype nodes"),
            Self::NoMeshes => write!(f, "model has no meshes"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gltf(e) => Some(e),
            _ => None,
        }
    }
}

impl From<gltf::Error> for AssetError {
    fn from(e: gltf::Error) -> Self {
        AssetError::Gltf(e)
    }
}

fn mesh_bounds(mesh: &gltf::Mesh<'_>) -> Option<(Vector3<f32>, Vector3<f32>)> {
    let mut bounds: Option<(Vector3<f32>, Vector3<f32>)> = None;
    for primitive in mesh.primitives() {
        let bb = primitive.bounding_box();
        let min = Vector3::from(bb.min);
        let max = Vector3::from(bb.max);
        bounds = Some(match bounds {
            Some((lo, hi)) => (lo.inf(&min), hi.sup(&max)),
            None => (min, max),
        });
    }
    bounds
}

/// Read the building variants out of a binary GLTF city model.
pub fn load_building_models(bytes: &[u8]) -> Result<ArchetypeTable<BuildingModel>, AssetError> {
    let (document, _, _) = gltf::import_slice(bytes)?;
    let mut table = ArchetypeTable::new();

    for node in document.nodes() {
        let Some(archetype) = node.name().and_then(|n| n.parse::<Archetype>().ok()) else {
            continue;
        };
        let Some((min, max)) = node.mesh().as_ref().and_then(mesh_bounds) else {
            tracing::warn!("building node {} has no mesh", archetype);
            continue;
        };
        let (_, _, scale) = node.transform().decomposed();
        let extent = (max - min).component_mul(&Vector3::from(scale));
        if table.insert(archetype, BuildingModel { node: node.index(), extent }).is_some() {
            tracing::warn!("duplicate building node {}, keeping the last one", archetype);
        }
    }

    if table.is_empty() {
        return Err(AssetError::NoBuildingNodes);
    }
    tracing::debug!(missing = ?table.missing(), "loaded building models");
    Ok(table)
}

/// Bounding box size of every mesh in a binary GLTF file.
pub fn model_extent(bytes: &[u8]) -> Result<Vector3<f32>, AssetError> {
    let (document, _, _) = gltf::import_slice(bytes)?;
    document
        .meshes()
        .filter_map(|m| mesh_bounds(&m))
        .reduce(|(lo, hi), (min, max)| (lo.inf(&min), hi.sup(&max)))
        .map(|(min, max)| max - min)
        .ok_or(AssetError::NoMeshes)
}
