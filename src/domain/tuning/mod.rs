pub mod interpolation;
pub mod prediction;
