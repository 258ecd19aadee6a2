pub mod frame;
pub mod observation;
pub mod ops;
