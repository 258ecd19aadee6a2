pub mod bulk;
pub mod synop;
