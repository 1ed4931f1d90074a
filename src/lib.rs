//! Feature matching benchmark analytics
//!
//! Reads keypoint detection, descriptor matching and homography result files,
//! aggregates them per dataset and detector, and renders charts plus a console
//! overview.

pub mod config;
pub mod error;
pub mod plotting;
pub mod report;
pub mod results;
pub mod summary;
