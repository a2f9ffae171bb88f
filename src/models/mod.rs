pub mod compact_surface;
pub mod header;
pub mod ledge;
pub mod records;
pub mod solid;
pub mod surface;
pub mod text_section;
