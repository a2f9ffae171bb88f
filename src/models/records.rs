//! Fixed-layout wire records of the PHY format.
//!
//! All records are packed and little-endian. Bitfields from the IVP compact
//! structures are unpacked into plain fields on decode.

use std::fmt;

use winnow::Parser;
use winnow::binary::{le_f32, le_i32, le_i64, le_u8, le_u16, le_u32};

use crate::data::reader::{Record, WResult};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Position plus a fourth component (the IVP hesse value for points).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Record for Vector3 {
    const SIZE: usize = 12;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let x = le_f32.parse_next(input)?;
        let y = le_f32.parse_next(input)?;
        let z = le_f32.parse_next(input)?;
        Ok(Vector3 { x, y, z })
    }
}

impl Record for Vector4 {
    const SIZE: usize = 16;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let x = le_f32.parse_next(input)?;
        let y = le_f32.parse_next(input)?;
        let z = le_f32.parse_next(input)?;
        let w = le_f32.parse_next(input)?;
        Ok(Vector4 { x, y, z, w })
    }
}

/// Top-level file header (20 bytes, padded up to `size`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    /// Byte length of the header; surface data starts here.
    pub size: u32,
    pub id: u32,
    pub solid_count: i32,
    pub checksum: i64,
}

impl Record for Header {
    const SIZE: usize = 20;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let size = le_u32.parse_next(input)?;
        let id = le_u32.parse_next(input)?;
        let solid_count = le_i32.parse_next(input)?;
        let checksum = le_i64.parse_next(input)?;
        Ok(Header {
            size,
            id,
            solid_count,
            checksum,
        })
    }
}

/// Surface representation used by a solid group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModelType {
    CompactSurface,
    Mopp,
    Ball,
    Virtual,
    Unrecognized(u16),
}

impl From<u16> for ModelType {
    fn from(raw: u16) -> Self {
        match raw {
            0 => ModelType::CompactSurface,
            1 => ModelType::Mopp,
            2 => ModelType::Ball,
            3 => ModelType::Virtual,
            other => ModelType::Unrecognized(other),
        }
    }
}

impl ModelType {
    /// The on-disk tag value.
    pub fn raw(self) -> u16 {
        match self {
            ModelType::CompactSurface => 0,
            ModelType::Mopp => 1,
            ModelType::Ball => 2,
            ModelType::Virtual => 3,
            ModelType::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelType::CompactSurface => f.write_str("compact surface"),
            ModelType::Mopp => f.write_str("MOPP"),
            ModelType::Ball => f.write_str("ball"),
            ModelType::Virtual => f.write_str("virtual"),
            ModelType::Unrecognized(raw) => write!(f, "unrecognized ({raw})"),
        }
    }
}

/// Per-group header preceding each surface payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceHeader {
    /// Number of bytes in this group after the `size` field itself.
    pub size: u32,
    pub vphysics_id: u32,
    pub version: u16,
    pub model_type: ModelType,
}

impl SurfaceHeader {
    /// Size of the `size` field, which is not counted in `size`.
    pub const SIZE_FIELD_LEN: usize = 4;
}

impl Record for SurfaceHeader {
    const SIZE: usize = 12;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let size = le_u32.parse_next(input)?;
        let vphysics_id = le_u32.parse_next(input)?;
        let version = le_u16.parse_next(input)?;
        let model_type = le_u16.parse_next(input)?.into();
        Ok(SurfaceHeader {
            size,
            vphysics_id,
            version,
            model_type,
        })
    }
}

/// Header of a compact surface payload (68 bytes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompactSurfaceHeader {
    pub surface_size: u32,
    pub drag_axis_areas: Vector3,
    pub axis_map_size: i32,
    pub mass_centre: Vector3,
    pub rotation_inertia: Vector3,
    pub upper_limit_radius: f32,
    pub max_factor_surface_deviation: u8,
    /// 24-bit byte size of the compact surface.
    pub byte_size: u32,
    /// Relative to the location of `mass_centre`, not the header start.
    pub offset_ledgetree_root: i32,
}

impl CompactSurfaceHeader {
    /// Byte offset of `mass_centre` within the record.
    pub const MASS_CENTRE_OFFSET: usize = 20;
}

impl Record for CompactSurfaceHeader {
    const SIZE: usize = 68;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let surface_size = le_u32.parse_next(input)?;
        let drag_axis_areas = Vector3::parse(input)?;
        let axis_map_size = le_i32.parse_next(input)?;
        let mass_centre = Vector3::parse(input)?;
        let rotation_inertia = Vector3::parse(input)?;
        let upper_limit_radius = le_f32.parse_next(input)?;
        let packed = le_u32.parse_next(input)?;
        let offset_ledgetree_root = le_i32.parse_next(input)?;
        for _ in 0..3 {
            let _reserved = le_i32.parse_next(input)?;
        }
        Ok(CompactSurfaceHeader {
            surface_size,
            drag_axis_areas,
            axis_map_size,
            mass_centre,
            rotation_inertia,
            upper_limit_radius,
            max_factor_surface_deviation: (packed & 0xFF) as u8,
            byte_size: packed >> 8,
            offset_ledgetree_root,
        })
    }
}

/// A node of the ledge-tree (28 bytes).
///
/// The left child of an internal node is the node directly after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgeNode {
    /// Relative to this node; zero for leaves.
    pub right_node_offset: i32,
    /// Relative to this node; the leaf's ledge.
    pub compact_ledge_offset: i32,
    pub center: Vector3,
    pub radius: f32,
    pub box_sizes: [u8; 3],
}

impl LedgeNode {
    pub fn is_terminal(&self) -> bool {
        self.right_node_offset == 0
    }
}

impl Record for LedgeNode {
    const SIZE: usize = 28;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let right_node_offset = le_i32.parse_next(input)?;
        let compact_ledge_offset = le_i32.parse_next(input)?;
        let center = Vector3::parse(input)?;
        let radius = le_f32.parse_next(input)?;
        let box_sizes = [
            le_u8.parse_next(input)?,
            le_u8.parse_next(input)?,
            le_u8.parse_next(input)?,
        ];
        let _reserved = le_u8.parse_next(input)?;
        Ok(LedgeNode {
            right_node_offset,
            compact_ledge_offset,
            center,
            radius,
            box_sizes,
        })
    }
}

/// Leaf payload header (16 bytes), followed by its triangle array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ledge {
    /// Relative to the start of this ledge.
    pub point_offset: i32,
    pub bone_index: i32,
    pub has_children_flag: u8,
    pub is_compact_flag: u8,
    /// Ledge size in 16-byte units (24 bits).
    pub size_div_16: u32,
    pub triangles_count: u16,
}

impl Record for Ledge {
    const SIZE: usize = 16;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let point_offset = le_i32.parse_next(input)?;
        let bone_index = le_i32.parse_next(input)?;
        let flags = le_u32.parse_next(input)?;
        let triangles_count = le_u16.parse_next(input)?;
        let _reserved = le_u16.parse_next(input)?;
        Ok(Ledge {
            point_offset,
            bone_index,
            has_children_flag: (flags & 0b11) as u8,
            is_compact_flag: ((flags >> 2) & 0b11) as u8,
            size_div_16: flags >> 8,
            triangles_count,
        })
    }
}

/// One triangle corner. Corner `n` of a triangle is the start point of its
/// edge `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub start_point_index: u16,
    /// Signed 15-bit offset to the opposite edge.
    pub opposite_index: i16,
    pub is_virtual: bool,
}

impl Record for Edge {
    const SIZE: usize = 4;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let raw = le_u32.parse_next(input)?;
        Ok(Edge {
            start_point_index: (raw & 0xFFFF) as u16,
            opposite_index: (((raw << 1) as i32) >> 17) as i16,
            is_virtual: raw >> 31 != 0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactTriangle {
    pub tri_index: u16,
    pub pierce_index: u16,
    pub material_index: u8,
    pub is_virtual: bool,
    pub edges: [Edge; 3],
}

impl Record for CompactTriangle {
    const SIZE: usize = 16;

    fn parse(input: &mut &[u8]) -> WResult<Self> {
        let raw = le_u32.parse_next(input)?;
        let edges = [Edge::parse(input)?, Edge::parse(input)?, Edge::parse(input)?];
        Ok(CompactTriangle {
            tri_index: (raw & 0xFFF) as u16,
            pierce_index: ((raw >> 12) & 0xFFF) as u16,
            material_index: ((raw >> 24) & 0x7F) as u8,
            is_virtual: raw >> 31 != 0,
            edges,
        })
    }
}
