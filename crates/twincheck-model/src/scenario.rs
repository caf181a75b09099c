//! Scenario configurations for the plant model
//!
//! A scenario fixes the free parameters of the UPPAAL plant model: conveyor
//! belt speed, number of disks in circulation, flow-control policy, output
//! sensor positions, and per-station processing times. The configuration
//! file maps scenario names to either a concrete parameter point or an
//! extensive sweep over inclusive parameter ranges.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Number of disks the physical plant can hold, per the model's
/// `const int[1, 12] DISKS` declaration.
pub const MIN_DISKS: i64 = 1;
/// Upper bound of the model's disk declaration.
pub const MAX_DISKS: i64 = 12;

/// A concrete parameter assignment for the plant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantParams {
    /// Conveyor belt motor speed
    pub speed: i64,
    /// Number of disks in circulation
    pub disks: i64,
    /// Flow-control policy selector
    pub policy: i64,
    /// Belt slot of each output sensor
    pub out_sensors: Vec<i64>,
    /// Processing time of each station
    pub stations_processing: Vec<i64>,
}

impl PlantParams {
    /// Stable label identifying this parameter point, used in instance file
    /// names and report keys: `s{speed}-d{disks}-p{policy}-os[..]-sp[..]`.
    pub fn label(&self) -> String {
        format!(
            "s{}-d{}-p{}-os{}-sp{}",
            self.speed,
            self.disks,
            self.policy,
            short_array(&self.out_sensors),
            short_array(&self.stations_processing),
        )
    }
}

/// Compact bracketed rendering without spaces, e.g. `[3,7,11]`
fn short_array(values: &[i64]) -> String {
    let inner = values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("[{}]", inner)
}

/// Inclusive integer range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamRange {
    /// Lower bound (inclusive)
    pub min: i64,
    /// Upper bound (inclusive)
    pub max: i64,
}

impl ParamRange {
    /// Number of values in the range
    pub fn len(&self) -> u64 {
        (self.max + 1 - self.min).max(0) as u64
    }

    /// Whether the range contains no values
    pub fn is_empty(&self) -> bool {
        self.max < self.min
    }
}

/// Element-wise inclusive ranges over a fixed-length integer array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VecRange {
    /// Lower bound of each element (inclusive)
    pub min: Vec<i64>,
    /// Upper bound of each element (inclusive)
    pub max: Vec<i64>,
}

impl VecRange {
    /// Size of the element-wise cartesian product
    pub fn len(&self) -> u64 {
        self.min
            .iter()
            .zip(&self.max)
            .map(|(lo, hi)| (hi + 1 - lo).max(0) as u64)
            .product()
    }

    /// Whether the product space contains no points
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An extensive sweep over the plant parameter space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSpace {
    /// Belt speed range
    pub speed: ParamRange,
    /// Disk count range
    pub disks: ParamRange,
    /// Policy selector range
    pub policy: ParamRange,
    /// Output sensor position ranges
    pub out_sensors: VecRange,
    /// Station processing time ranges
    pub stations_processing: VecRange,
}

impl SweepSpace {
    /// Total number of parameter points in the sweep
    pub fn len(&self) -> u64 {
        self.speed.len()
            * self.disks.len()
            * self.policy.len()
            * self.out_sensors.len()
            * self.stations_processing.len()
    }

    /// Whether the sweep contains no points
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check internal consistency of the sweep bounds
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.out_sensors.min.len() != self.out_sensors.max.len() {
            return Err(ModelError::Config(
                "out_sensors min/max must have the same length".into(),
            ));
        }
        if self.stations_processing.min.len() != self.stations_processing.max.len() {
            return Err(ModelError::Config(
                "stations_processing min/max must have the same length".into(),
            ));
        }
        for (name, range) in [
            ("speed", &self.speed),
            ("disks", &self.disks),
            ("policy", &self.policy),
        ] {
            if range.is_empty() {
                return Err(ModelError::Config(format!(
                    "{} range is empty: min={} max={}",
                    name, range.min, range.max
                )));
            }
        }
        for (name, range) in [
            ("out_sensors", &self.out_sensors),
            ("stations_processing", &self.stations_processing),
        ] {
            if range.min.iter().zip(&range.max).any(|(lo, hi)| hi < lo) {
                return Err(ModelError::Config(format!("{} has an empty element range", name)));
            }
        }
        if self.disks.min < MIN_DISKS || self.disks.max > MAX_DISKS {
            return Err(ModelError::Config(format!(
                "disks range [{}, {}] outside the plant bound [{}, {}]",
                self.disks.min, self.disks.max, MIN_DISKS, MAX_DISKS
            )));
        }
        Ok(())
    }

    /// Iterate over every parameter point in the sweep
    ///
    /// Order is row-major: speed varies slowest, then disks, policy, the
    /// output sensor elements, and finally the station processing times.
    pub fn iter(&self) -> SweepIter<'_> {
        SweepIter {
            space: self,
            next: 0,
            len: self.len(),
        }
    }
}

/// Exact-size iterator over the points of a [`SweepSpace`]
pub struct SweepIter<'a> {
    space: &'a SweepSpace,
    next: u64,
    len: u64,
}

impl SweepIter<'_> {
    /// Decode a flat index into a parameter point (mixed-radix, with
    /// stations_processing as the least significant digits).
    fn decode(&self, index: u64) -> PlantParams {
        let space = self.space;
        let mut rest = index;

        let mut stations = vec![0; space.stations_processing.min.len()];
        for (slot, (lo, hi)) in stations.iter_mut().zip(
            space
                .stations_processing
                .min
                .iter()
                .zip(&space.stations_processing.max),
        )
        .rev()
        {
            let radix = (hi + 1 - lo) as u64;
            *slot = lo + (rest % radix) as i64;
            rest /= radix;
        }

        let mut sensors = vec![0; space.out_sensors.min.len()];
        for (slot, (lo, hi)) in sensors
            .iter_mut()
            .zip(space.out_sensors.min.iter().zip(&space.out_sensors.max))
            .rev()
        {
            let radix = (hi + 1 - lo) as u64;
            *slot = lo + (rest % radix) as i64;
            rest /= radix;
        }

        let policy = space.policy.min + (rest % space.policy.len()) as i64;
        rest /= space.policy.len();
        let disks = space.disks.min + (rest % space.disks.len()) as i64;
        rest /= space.disks.len();
        let speed = space.speed.min + (rest % space.speed.len()) as i64;

        PlantParams {
            speed,
            disks,
            policy,
            out_sensors: sensors,
            stations_processing: stations,
        }
    }
}

impl Iterator for SweepIter<'_> {
    type Item = PlantParams;

    fn next(&mut self) -> Option<PlantParams> {
        if self.next >= self.len {
            return None;
        }
        let params = self.decode(self.next);
        self.next += 1;
        Some(params)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.len - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SweepIter<'_> {}

/// A named scenario: either a concrete point or an extensive sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scenario {
    /// Extensive sweep over parameter ranges
    Sweep(SweepSpace),
    /// Single concrete parameter point
    Point(PlantParams),
}

impl Scenario {
    /// Number of parameter points this scenario expands to
    pub fn len(&self) -> u64 {
        match self {
            Scenario::Sweep(space) => space.len(),
            Scenario::Point(_) => 1,
        }
    }

    /// Whether the scenario expands to no points
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expand the scenario into its parameter points
    pub fn points(&self) -> Vec<PlantParams> {
        match self {
            Scenario::Sweep(space) => space.iter().collect(),
            Scenario::Point(params) => vec![params.clone()],
        }
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            Scenario::Sweep(space) => space.validate(),
            Scenario::Point(params) => {
                if params.disks < MIN_DISKS || params.disks > MAX_DISKS {
                    return Err(ModelError::Config(format!(
                        "disks={} outside the plant bound [{}, {}]",
                        params.disks, MIN_DISKS, MAX_DISKS
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Scenario configuration file: a map from scenario name to scenario
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioFile {
    scenarios: BTreeMap<String, Scenario>,
}

impl ScenarioFile {
    /// Parse a configuration from its JSON text
    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        let file: ScenarioFile = serde_json::from_str(text)?;
        for (name, scenario) in &file.scenarios {
            scenario
                .validate()
                .map_err(|e| ModelError::Config(format!("scenario '{}': {}", name, e)))?;
        }
        Ok(file)
    }

    /// Load a configuration file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Look up a scenario by name
    pub fn get(&self, name: &str) -> Result<&Scenario, ModelError> {
        self.scenarios
            .get(name)
            .ok_or_else(|| ModelError::ScenarioNotFound(name.to_string()))
    }

    /// Names of all configured scenarios
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }
}
