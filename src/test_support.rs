//! Little-endian byte builders for hand-assembled PHY test inputs.

use crate::data::reader::Record;
use crate::models::records::{
    CompactSurfaceHeader, CompactTriangle, Header, Ledge, LedgeNode, SurfaceHeader,
};

pub(crate) const VPHYSICS_ID: u32 = u32::from_le_bytes(*b"VPHY");

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_i32(out: &mut Vec<u8>, value: i32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_f32(out: &mut Vec<u8>, value: f32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn patch_i32(out: &mut [u8], at: usize, value: i32) {
    out[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

/// One leaf: triangles as start-point triples plus the shared point buffer.
#[derive(Debug, Clone)]
pub(crate) struct LedgeFixture {
    pub triangles: Vec<[u16; 3]>,
    pub points: Vec<[f32; 4]>,
    pub bone_index: i32,
}

impl LedgeFixture {
    /// Points whose coordinates encode their own on-disk index.
    pub fn numbered(triangles: Vec<[u16; 3]>, point_count: usize, bone_index: i32) -> Self {
        let points = (0..point_count)
            .map(|i| {
                let i = i as f32;
                [i, i + 0.25, i + 0.5, 1.0]
            })
            .collect();
        Self {
            triangles,
            points,
            bone_index,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum TreeFixture {
    Leaf(LedgeFixture),
    Node(Box<TreeFixture>, Box<TreeFixture>),
}

impl TreeFixture {
    pub fn node(left: TreeFixture, right: TreeFixture) -> Self {
        TreeFixture::Node(Box::new(left), Box::new(right))
    }
}

/// Ledge header, its triangle array, then its point buffer.
pub(crate) fn ledge_bytes(fixture: &LedgeFixture) -> Vec<u8> {
    let mut out = Vec::new();
    let point_offset = Ledge::SIZE + fixture.triangles.len() * CompactTriangle::SIZE;
    push_i32(&mut out, point_offset as i32);
    push_i32(&mut out, fixture.bone_index);
    // is_compact_flag = 1
    push_u32(&mut out, 1 << 2);
    push_u16(&mut out, fixture.triangles.len() as u16);
    push_u16(&mut out, 0);
    for (i, triangle) in fixture.triangles.iter().enumerate() {
        push_u32(&mut out, i as u32 & 0xFFF);
        for &start in triangle {
            push_u32(&mut out, u32::from(start));
        }
    }
    for point in &fixture.points {
        for &c in point {
            push_f32(&mut out, c);
        }
    }
    out
}

fn write_nodes<'a>(
    tree: &'a TreeFixture,
    nodes: &mut Vec<u8>,
    leaves: &mut Vec<(usize, &'a LedgeFixture)>,
) {
    let pos = nodes.len();
    nodes.extend_from_slice(&[0u8; LedgeNode::SIZE]);
    match tree {
        TreeFixture::Leaf(fixture) => leaves.push((pos, fixture)),
        TreeFixture::Node(left, right) => {
            write_nodes(left, nodes, leaves);
            let right_pos = nodes.len();
            patch_i32(nodes, pos, (right_pos - pos) as i32);
            write_nodes(right, nodes, leaves);
        }
    }
}

/// Compact surface payload: header, nodes in pre-order, then every ledge.
pub(crate) fn compact_surface_bytes(mass_centre: [f32; 3], tree: &TreeFixture) -> Vec<u8> {
    let mut nodes = Vec::new();
    let mut leaves = Vec::new();
    write_nodes(tree, &mut nodes, &mut leaves);

    let nodes_start = CompactSurfaceHeader::SIZE;
    let mut ledges = Vec::new();
    for (node_pos, fixture) in leaves {
        let ledge_pos = nodes_start + nodes.len() + ledges.len();
        patch_i32(&mut nodes, node_pos + 4, (ledge_pos - (nodes_start + node_pos)) as i32);
        ledges.extend(ledge_bytes(fixture));
    }

    let mut out = Vec::new();
    push_u32(&mut out, (nodes.len() + ledges.len()) as u32);
    for _ in 0..3 {
        push_f32(&mut out, 0.0);
    }
    push_i32(&mut out, 0);
    for c in mass_centre {
        push_f32(&mut out, c);
    }
    for _ in 0..3 {
        push_f32(&mut out, 1.0);
    }
    push_f32(&mut out, 10.0);
    push_u32(&mut out, 0);
    push_i32(&mut out, (nodes_start - CompactSurfaceHeader::MASS_CENTRE_OFFSET) as i32);
    for _ in 0..3 {
        push_i32(&mut out, 0);
    }
    assert_eq!(out.len(), CompactSurfaceHeader::SIZE);
    out.extend(nodes);
    out.extend(ledges);
    out
}

/// A surface group: its 12-byte header followed by `payload`.
pub(crate) fn surface_group_bytes(model_type: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let size = SurfaceHeader::SIZE - SurfaceHeader::SIZE_FIELD_LEN + payload.len();
    push_u32(&mut out, size as u32);
    push_u32(&mut out, VPHYSICS_ID);
    push_u16(&mut out, 0x100);
    push_u16(&mut out, model_type);
    out.extend_from_slice(payload);
    out
}

/// A whole file. `header_size` may exceed the record size to add padding.
pub(crate) fn phy_bytes(
    header_size: u32,
    checksum: i64,
    groups: &[Vec<u8>],
    text: Option<&str>,
) -> Vec<u8> {
    let mut out = Vec::new();
    push_u32(&mut out, header_size);
    push_u32(&mut out, 0);
    push_i32(&mut out, groups.len() as i32);
    out.extend_from_slice(&checksum.to_le_bytes());
    assert!(header_size as usize >= Header::SIZE);
    out.resize(header_size as usize, 0);
    for group in groups {
        out.extend_from_slice(group);
    }
    if let Some(text) = text {
        out.extend_from_slice(text.as_bytes());
        out.push(0);
    }
    out
}

/// Two triangles sharing an edge: a quad over points 0..4.
pub(crate) fn quad_ledge(bone_index: i32) -> LedgeFixture {
    LedgeFixture::numbered(vec![[0, 1, 2], [2, 1, 3]], 4, bone_index)
}
