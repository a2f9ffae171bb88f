use tracing::debug;

use crate::data::reader::OffsetView;
use crate::error::{PhyError, PhyResult};
use crate::models::records::Header;

impl Header {
    /// Number of surface groups following the header.
    ///
    /// Always valid for headers returned by [`decode_header`], which rejects
    /// negative counts.
    pub fn solid_group_count(&self) -> usize {
        usize::try_from(self.solid_count).unwrap_or(0)
    }
}

/// Decode the file header, checking it against `expected_checksum` if given.
///
/// Nothing past the header is read.
pub fn decode_header(data: &[u8], expected_checksum: Option<i64>) -> PhyResult<Header> {
    let (header, _) = OffsetView::new(data).read_record::<Header>(0, "PHY header")?;
    debug!(
        size = header.size,
        solid_count = header.solid_count,
        checksum = header.checksum,
        "decoded PHY header"
    );

    if let Some(expected) = expected_checksum {
        if header.checksum != expected {
            return Err(PhyError::InvalidChecksum {
                expected,
                actual: header.checksum,
            });
        }
    }

    if header.solid_count < 0 {
        return Err(PhyError::InvalidHeader(format!(
            "negative solid count {}",
            header.solid_count
        )));
    }

    Ok(header)
}
