use crate::models::records::{Vector3, Vector4};

/// A decoded collision mesh.
///
/// `vertices` are in first-encounter order of the source triangles, and every
/// entry of `indices` is less than `vertices.len()`. Nothing here borrows from
/// the input buffer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solid {
    pub vertices: Vec<Vector4>,
    /// Three indices per triangle, in the source winding order.
    pub indices: Vec<u16>,
    pub centre_of_mass: Vector3,
    pub bone_index: i32,
}

impl Solid {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Index triples, one per triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [u16; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|corners| [corners[0], corners[1], corners[2]])
    }
}
