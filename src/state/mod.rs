pub mod observation;
pub mod parameters;
