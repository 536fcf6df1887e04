pub mod datapoint;
pub mod status;
