//! Scenario configuration and UPPAAL project template handling
//!
//! The plant model itself is an opaque UPPAAL project supplied by the user.
//! This crate covers everything the harness needs to know about it:
//!
//! - **Scenarios**: named parameter assignments for the plant (belt speed,
//!   number of disks, flow-control policy, sensor positions, station
//!   processing times), loaded from a JSON configuration. A scenario is
//!   either a single point or an extensive sweep over inclusive ranges.
//! - **Templates**: the UPPAAL project XML, from which properties are
//!   extracted and classified, and into which concrete scenario parameters
//!   are spliced by rewriting the `<system>` block.

pub mod error;
pub mod scenario;
pub mod template;

pub use error::ModelError;
pub use scenario::{ParamRange, PlantParams, Scenario, ScenarioFile, SweepSpace, VecRange};
pub use template::{ProjectTemplate, Property, PropertyKind};
