pub mod kmeanplusplus;
pub mod precomputed;
pub mod randomsample;
