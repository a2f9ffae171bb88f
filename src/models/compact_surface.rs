//! Compact surface decoding: ledge-tree traversal.
//!
//! The ledge-tree is stored as a flat run of [`LedgeNode`]s. An internal
//! node's left child sits directly after it and its right child is reached
//! through a relative offset; leaves point at a [`Ledge`]. The tree is walked
//! with an explicit stack so input depth never maps onto call depth.

use tracing::{debug, trace};

use crate::data::reader::{OffsetView, Record};
use crate::error::{PhyError, PhyResult};
use crate::models::ledge::decode_ledge;
use crate::models::records::{CompactSurfaceHeader, Ledge, LedgeNode, Vector3};
use crate::models::solid::Solid;

/// Decode a compact surface. `view` is anchored at the compact surface header.
///
/// Solids come back in pre-order leaf order, left subtree first.
pub fn decode_compact_surface(view: OffsetView<'_>) -> PhyResult<Vec<Solid>> {
    let (header, header_offset) =
        view.read_record::<CompactSurfaceHeader>(0, "compact surface header")?;

    // The root offset is relative to the mass centre field, not the header.
    let root = view.resolve(
        header_offset + CompactSurfaceHeader::MASS_CENTRE_OFFSET,
        header.offset_ledgetree_root,
        "ledge tree root",
    )?;

    let nodes = view.with_offset(0);
    let ledges = collect_ledges(nodes, root)?;
    debug!(
        offset = header_offset,
        ledges = ledges.len(),
        "walked ledge tree"
    );

    decode_ledges(nodes, &ledges, header.mass_centre)
}

/// Walk the tree from `root` and return every leaf's ledge with its absolute
/// offset, in pre-order.
fn collect_ledges(nodes: OffsetView<'_>, root: usize) -> PhyResult<Vec<(Ledge, usize)>> {
    // Non-overlapping nodes can't outnumber this; more visits means a cycle.
    let limit = nodes.buffer_len() / LedgeNode::SIZE;
    let mut visited = 0usize;
    let mut ledges = Vec::new();
    let mut pending = vec![root];

    while let Some(offset) = pending.pop() {
        let (node, node_offset) = nodes.read_record::<LedgeNode>(offset, "ledge node")?;
        visited += 1;
        if visited > limit {
            return Err(PhyError::LedgeTreeTooLarge { limit });
        }

        if node.is_terminal() {
            let ledge_at = nodes.resolve(node_offset, node.compact_ledge_offset, "ledge")?;
            let (ledge, ledge_offset) = nodes.read_record::<Ledge>(ledge_at, "ledge")?;
            trace!(node = node_offset, ledge = ledge_offset, "found leaf");
            ledges.push((ledge, ledge_offset));
        } else {
            let right = nodes.resolve(node_offset, node.right_node_offset, "ledge node")?;
            // Left is pushed last so it is visited first.
            pending.push(right);
            pending.push(node_offset + LedgeNode::SIZE);
        }
    }

    Ok(ledges)
}

#[cfg(not(feature = "rayon"))]
fn decode_ledges(
    nodes: OffsetView<'_>,
    ledges: &[(Ledge, usize)],
    mass_centre: Vector3,
) -> PhyResult<Vec<Solid>> {
    ledges
        .iter()
        .map(|(ledge, offset)| decode_ledge(ledge, mass_centre, nodes.with_offset(*offset)))
        .collect()
}

/// Leaves are already located and their byte ranges are independent, so they
/// can be decoded in parallel. `collect` keeps traversal order.
#[cfg(feature = "rayon")]
fn decode_ledges(
    nodes: OffsetView<'_>,
    ledges: &[(Ledge, usize)],
    mass_centre: Vector3,
) -> PhyResult<Vec<Solid>> {
    use rayon::prelude::*;

    ledges
        .par_iter()
        .map(|(ledge, offset)| decode_ledge(ledge, mass_centre, nodes.with_offset(*offset)))
        .collect()
}
