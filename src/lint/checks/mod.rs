//! Individual lint checks

pub mod flow;
pub mod references;
