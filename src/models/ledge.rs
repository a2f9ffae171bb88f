//! Decoding of a single ledge (ledge-tree leaf) into a [`Solid`].
//!
//! A ledge stores its triangles as edge chains whose start points index into a
//! vertex buffer shared with neighbouring ledges. Only the start points that
//! are actually referenced end up in the output, renumbered densely in the
//! order they are first seen.

use indexmap::IndexSet;
use tracing::trace;

use crate::data::reader::{OffsetView, Record};
use crate::error::PhyResult;
use crate::models::records::{CompactTriangle, Ledge, Vector3, Vector4};
use crate::models::solid::Solid;

/// Decode one ledge. `view` must be anchored at the start of the ledge record.
pub fn decode_ledge(
    ledge: &Ledge,
    centre_of_mass: Vector3,
    view: OffsetView<'_>,
) -> PhyResult<Solid> {
    let triangles: Vec<CompactTriangle> = view.read_array(
        Ledge::SIZE,
        usize::from(ledge.triangles_count),
        "triangle array",
    )?;

    let mut remapped: IndexSet<u16> = IndexSet::new();
    let mut indices = Vec::with_capacity(triangles.len() * 3);
    let mut max_index = 0u16;

    for triangle in &triangles {
        for edge in &triangle.edges {
            let original = edge.start_point_index;
            let (dense, inserted) = remapped.insert_full(original);
            if inserted {
                max_index = max_index.max(original);
            }
            indices.push(dense as u16);
        }
    }

    // Only the prefix up to the highest referenced point is read. The read
    // happens even for an empty ledge, so its point buffer must be in range.
    let points_at = view.resolve(view.offset(), ledge.point_offset, "vertex array")?;
    let shared: Vec<Vector4> = view.with_offset(points_at).read_array(
        0,
        usize::from(max_index) + 1,
        "vertex array",
    )?;
    let vertices: Vec<Vector4> = remapped
        .iter()
        .map(|&original| shared[usize::from(original)])
        .collect();

    trace!(
        offset = view.offset(),
        triangles = triangles.len(),
        vertices = vertices.len(),
        bone_index = ledge.bone_index,
        "decoded ledge"
    );

    Ok(Solid {
        vertices,
        indices,
        centre_of_mass,
        bone_index: ledge.bone_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhyError;
    use crate::test_support::{LedgeFixture, ledge_bytes, quad_ledge};

    fn decode(bytes: &[u8]) -> PhyResult<Solid> {
        let view = OffsetView::new(bytes);
        let (ledge, offset) = view.read_record::<Ledge>(0, "ledge").unwrap();
        decode_ledge(&ledge, Vector3 { x: 1.0, y: 2.0, z: 3.0 }, view.with_offset(offset))
    }

    #[test]
    fn shared_corners_map_to_one_vertex() {
        let solid = decode(&ledge_bytes(&quad_ledge(7))).unwrap();
        assert_eq!(solid.vertices.len(), 4);
        assert_eq!(solid.indices, vec![0, 1, 2, 2, 1, 3]);
        assert_eq!(solid.bone_index, 7);
        assert_eq!(solid.centre_of_mass, Vector3 { x: 1.0, y: 2.0, z: 3.0 });
    }

    #[test]
    fn vertices_follow_first_encounter_order() {
        // Original indices 3, 0, 2 then 2, 0, 1.
        let fixture = LedgeFixture::numbered(vec![[3, 0, 2], [2, 0, 1]], 4, 0);
        let solid = decode(&ledge_bytes(&fixture)).unwrap();
        assert_eq!(solid.indices, vec![0, 1, 2, 2, 1, 3]);
        let xs: Vec<f32> = solid.vertices.iter().map(|v| v.x).collect();
        assert_eq!(xs, vec![3.0, 0.0, 2.0, 1.0]);
        assert_eq!(solid.vertices[0].w, 1.0);
    }

    #[test]
    fn unreferenced_points_are_dropped() {
        // Points 1 and 3 are never referenced; 5 and beyond are never read.
        let fixture = LedgeFixture::numbered(vec![[0, 2, 4]], 6, 0);
        let solid = decode(&ledge_bytes(&fixture)).unwrap();
        assert_eq!(solid.vertices.len(), 3);
        let xs: Vec<f32> = solid.vertices.iter().map(|v| v.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn only_referenced_prefix_must_be_present() {
        let fixture = LedgeFixture::numbered(vec![[0, 1, 2]], 6, 0);
        let bytes = ledge_bytes(&fixture);
        // Drop points 3..6; they are never referenced.
        let trimmed = &bytes[..bytes.len() - 3 * Vector4::SIZE];
        let solid = decode(trimmed).unwrap();
        assert_eq!(solid.vertices.len(), 3);
    }

    #[test]
    fn truncated_point_buffer_is_out_of_bounds() {
        let bytes = ledge_bytes(&quad_ledge(0));
        let truncated = &bytes[..bytes.len() - 1];
        assert!(matches!(
            decode(truncated),
            Err(PhyError::OutOfBoundsAccess { what: "vertex array", .. })
        ));
    }

    #[test]
    fn truncated_triangles_are_out_of_bounds() {
        let bytes = ledge_bytes(&quad_ledge(0));
        let truncated = &bytes[..Ledge::SIZE + CompactTriangle::SIZE + 4];
        assert!(matches!(
            decode(truncated),
            Err(PhyError::OutOfBoundsAccess { what: "triangle array", .. })
        ));
    }

    #[test]
    fn empty_ledge_yields_empty_solid() {
        // One point stays in range for the single vertex read.
        let fixture = LedgeFixture::numbered(Vec::new(), 1, 2);
        let solid = decode(&ledge_bytes(&fixture)).unwrap();
        assert!(solid.vertices.is_empty());
        assert!(solid.indices.is_empty());
        assert_eq!(solid.bone_index, 2);
    }

    #[test]
    fn empty_ledge_still_checks_point_buffer() {
        let mut bytes = ledge_bytes(&LedgeFixture::numbered(Vec::new(), 0, 2));
        bytes[0..4].copy_from_slice(&1_000_000i32.to_le_bytes());
        assert!(matches!(
            decode(&bytes),
            Err(PhyError::OutOfBoundsAccess { what: "vertex array", .. })
        ));

        // Without any point bytes at all the one-point read also fails.
        let bytes = ledge_bytes(&LedgeFixture::numbered(Vec::new(), 0, 2));
        assert!(matches!(
            decode(&bytes),
            Err(PhyError::OutOfBoundsAccess { what: "vertex array", .. })
        ));
    }
}
