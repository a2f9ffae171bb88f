//! Iteration over the solid groups that follow the header.
//!
//! Each group starts with a [`SurfaceHeader`] naming its surface model type.
//! Only compact surfaces are decoded; anything else aborts the whole parse,
//! even though the group's size would allow skipping it.

use tracing::debug;

use crate::data::reader::{OffsetView, Record};
use crate::error::{PhyError, PhyResult};
use crate::models::compact_surface::decode_compact_surface;
use crate::models::records::{ModelType, SurfaceHeader};
use crate::models::solid::Solid;

/// Decode `solid_group_count` groups starting at the view's anchor.
///
/// Returns every solid in file order along with the number of bytes the
/// groups occupied.
pub fn decode_surfaces(
    view: OffsetView<'_>,
    solid_group_count: usize,
) -> PhyResult<(Vec<Solid>, usize)> {
    // `solid_group_count` is untrusted; don't size anything from it.
    let mut solids = Vec::new();
    let mut cursor = 0usize;

    for group in 0..solid_group_count {
        let (surface_header, surface_offset) =
            view.read_record::<SurfaceHeader>(cursor, "surface header")?;
        debug!(
            group,
            offset = surface_offset,
            size = surface_header.size,
            model_type = %surface_header.model_type,
            "decoding surface group"
        );

        let payload = view.with_offset(surface_offset + SurfaceHeader::SIZE);
        solids.extend(decode_surface(&surface_header, payload)?);

        cursor = cursor
            .saturating_add(surface_header.size as usize)
            .saturating_add(SurfaceHeader::SIZE_FIELD_LEN);
    }

    Ok((solids, cursor))
}

/// Dispatch one group's payload on its model type.
pub fn decode_surface(header: &SurfaceHeader, payload: OffsetView<'_>) -> PhyResult<Vec<Solid>> {
    match header.model_type {
        ModelType::CompactSurface => decode_compact_surface(payload),
        ModelType::Mopp => Err(PhyError::NotImplemented("MOPP surface")),
        model_type @ (ModelType::Ball | ModelType::Virtual | ModelType::Unrecognized(_)) => {
            Err(PhyError::InvalidBody(model_type))
        }
    }
}
