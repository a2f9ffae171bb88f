//! Whole-file PHY decoding.

use tracing::debug;

use crate::data::reader::OffsetView;
use crate::error::{PhyError, PhyResult};
use crate::models::header::decode_header;
use crate::models::records::Header;
use crate::models::solid::Solid;
use crate::models::surface::decode_surfaces;
use crate::models::text_section::{TextSection, parse_text_section};

/// A fully decoded PHY file.
///
/// Owns all of its data; the input buffer can be dropped once
/// [`Phy::parse`] returns.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Phy {
    header: Header,
    solids: Vec<Solid>,
    text_section: TextSection,
}

impl Phy {
    /// Decode a whole PHY file.
    ///
    /// When `expected_checksum` is given it must match the header's checksum
    /// (usually the checksum of the model the collision data belongs to).
    /// Decoding is all-or-nothing.
    pub fn parse(data: &[u8], expected_checksum: Option<i64>) -> PhyResult<Self> {
        let header = decode_header(data, expected_checksum)?;

        let view = OffsetView::new(data);
        let surfaces_start = header.size as usize;
        let (solids, consumed) =
            decode_surfaces(view.with_offset(surfaces_start), header.solid_group_count())?;

        let text_start = surfaces_start.saturating_add(consumed);
        if text_start > data.len() {
            return Err(PhyError::OutOfBoundsAccess {
                what: "text section",
                offset: text_start,
                needed: text_start,
                available: data.len(),
            });
        }
        let text_section = parse_text_section(view.with_offset(text_start))?;

        debug!(
            solids = solids.len(),
            text_blocks = text_section.blocks.len(),
            "decoded PHY file"
        );

        Ok(Phy {
            header,
            solids,
            text_section,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn checksum(&self) -> i64 {
        self.header.checksum
    }

    /// Solids in file order: surface groups in sequence, and within a group
    /// the ledge-tree leaves in pre-order.
    pub fn solids(&self) -> &[Solid] {
        &self.solids
    }

    pub fn into_solids(self) -> Vec<Solid> {
        self.solids
    }

    pub fn text_section(&self) -> &TextSection {
        &self.text_section
    }
}
