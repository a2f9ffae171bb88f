/// Bounds-checked access to PHY buffers
pub mod data;
/// Error definitions
pub mod error;
/// Wire records and the decoders for each part of a PHY file
pub mod models;
/// Whole-file decoding
pub mod phy;

#[cfg(test)]
mod test_support;

pub use error::{PhyError, PhyResult};
pub use models::records::{Header, ModelType, Vector3, Vector4};
pub use models::solid::Solid;
pub use models::text_section::{
    AxisLimit, KeyValueBlock, RagdollConstraint, SolidProperties, TextSection,
};
pub use phy::Phy;
