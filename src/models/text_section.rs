//! The key/value text that trails the binary solids.
//!
//! The section is a sequence of named blocks:
//!
//! ```text
//! solid {
//! "index" "0"
//! "name" "pelvis"
//! "mass" "12.5"
//! }
//! ragdollconstraint {
//! "parent" "0"
//! "child" "1"
//! "xmin" "-30.00"
//! ...
//! }
//! ```
//!
//! Tokens are either double-quoted or bare words, and `//` starts a comment
//! that runs to the end of the line.

use std::str::FromStr;

use winnow::Parser;
use winnow::ascii::multispace1;
use winnow::combinator::{alt, delimited, eof, preceded, repeat, terminated};
use winnow::token::{take_till, take_while};

use crate::data::reader::{OffsetView, WResult};
use crate::error::{PhyError, PhyResult};

/// A named block and its entries in file order. Duplicate keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyValueBlock {
    pub name: String,
    pub entries: Vec<(String, String)>,
}

impl KeyValueBlock {
    /// First value for `key` (ASCII case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// First value for `key` parsed as `T`, or `None` if missing or malformed.
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key)?.trim().parse().ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextSection {
    pub blocks: Vec<KeyValueBlock>,
}

/// Physical properties of one solid from a `solid` block.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolidProperties {
    pub index: Option<i32>,
    pub name: Option<String>,
    pub parent: Option<String>,
    pub mass: Option<f32>,
    pub surface_prop: Option<String>,
    pub damping: Option<f32>,
    pub rot_damping: Option<f32>,
    pub inertia: Option<f32>,
    pub volume: Option<f32>,
}

impl From<&KeyValueBlock> for SolidProperties {
    fn from(block: &KeyValueBlock) -> Self {
        SolidProperties {
            index: block.get_parsed("index"),
            name: block.get("name").map(str::to_owned),
            parent: block.get("parent").map(str::to_owned),
            mass: block.get_parsed("mass"),
            surface_prop: block.get("surfaceprop").map(str::to_owned),
            damping: block.get_parsed("damping"),
            rot_damping: block.get_parsed("rotdamping"),
            inertia: block.get_parsed("inertia"),
            volume: block.get_parsed("volume"),
        }
    }
}

/// Rotation limits about one axis of a ragdoll joint, in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisLimit {
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub friction: Option<f32>,
}

impl AxisLimit {
    fn from_block(block: &KeyValueBlock, axis: &str) -> Self {
        AxisLimit {
            min: block.get_parsed(&format!("{axis}min")),
            max: block.get_parsed(&format!("{axis}max")),
            friction: block.get_parsed(&format!("{axis}friction")),
        }
    }
}

/// A joint between two solids from a `ragdollconstraint` block.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RagdollConstraint {
    /// Solid index of the parent.
    pub parent: Option<i32>,
    /// Solid index of the child.
    pub child: Option<i32>,
    pub x: AxisLimit,
    pub y: AxisLimit,
    pub z: AxisLimit,
}

impl From<&KeyValueBlock> for RagdollConstraint {
    fn from(block: &KeyValueBlock) -> Self {
        RagdollConstraint {
            parent: block.get_parsed("parent"),
            child: block.get_parsed("child"),
            x: AxisLimit::from_block(block, "x"),
            y: AxisLimit::from_block(block, "y"),
            z: AxisLimit::from_block(block, "z"),
        }
    }
}

impl TextSection {
    /// Parse section text that has already been cut at its terminator.
    pub fn parse(text: &str) -> PhyResult<Self> {
        let mut input = text;
        let blocks = parse_section
            .parse_next(&mut input)
            .map_err(|e| PhyError::TextSection {
                offset: text.len() - input.len(),
                detail: format!("{e}"),
            })?;
        Ok(TextSection { blocks })
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Every block called `name` (ASCII case-insensitive), in file order.
    pub fn blocks_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a KeyValueBlock> {
        self.blocks
            .iter()
            .filter(move |block| block.name.eq_ignore_ascii_case(name))
    }

    /// The first block called `name`.
    pub fn block(&self, name: &str) -> Option<&KeyValueBlock> {
        self.blocks
            .iter()
            .find(|block| block.name.eq_ignore_ascii_case(name))
    }

    pub fn solids(&self) -> impl Iterator<Item = SolidProperties> + '_ {
        self.blocks_named("solid").map(SolidProperties::from)
    }

    pub fn ragdoll_constraints(&self) -> impl Iterator<Item = RagdollConstraint> + '_ {
        self.blocks_named("ragdollconstraint")
            .map(RagdollConstraint::from)
    }

    pub fn collision_rules(&self) -> Option<&KeyValueBlock> {
        self.block("collisionrules")
    }

    pub fn edit_params(&self) -> Option<&KeyValueBlock> {
        self.block("editparams")
    }
}

/// Parse the text section starting at the view's anchor.
///
/// An empty trailing range gives an empty section; otherwise the text must be
/// NUL-terminated.
pub fn parse_text_section(view: OffsetView<'_>) -> PhyResult<TextSection> {
    if view.remaining_len() == 0 {
        return Ok(TextSection::default());
    }
    let text = view.read_nul_terminated_text(0, "text section")?;
    TextSection::parse(&text)
}

fn skip_ws(input: &mut &str) -> WResult<()> {
    repeat(
        0..,
        alt((multispace1.void(), ("//", take_till(0.., '\n')).void())),
    )
    .parse_next(input)
}

fn quoted<'s>(input: &mut &'s str) -> WResult<&'s str> {
    delimited('"', take_till(0.., '"'), '"').parse_next(input)
}

fn bare<'s>(input: &mut &'s str) -> WResult<&'s str> {
    take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, '{' | '}' | '"')
    })
    .parse_next(input)
}

fn token<'s>(input: &mut &'s str) -> WResult<&'s str> {
    preceded(skip_ws, alt((quoted, bare))).parse_next(input)
}

fn entry(input: &mut &str) -> WResult<(String, String)> {
    let key = token.parse_next(input)?;
    let value = token.parse_next(input)?;
    Ok((key.to_owned(), value.to_owned()))
}

fn block(input: &mut &str) -> WResult<KeyValueBlock> {
    let name = token.parse_next(input)?;
    (skip_ws, '{').parse_next(input)?;
    let entries = repeat(0.., entry).parse_next(input)?;
    (skip_ws, '}').parse_next(input)?;
    Ok(KeyValueBlock {
        name: name.to_owned(),
        entries,
    })
}

fn parse_section(input: &mut &str) -> WResult<Vec<KeyValueBlock>> {
    terminated(repeat(0.., block), (skip_ws, eof)).parse_next(input)
}
