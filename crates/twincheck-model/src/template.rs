//! UPPAAL project template handling
//!
//! The project file is treated as text: properties are extracted from its
//! `<formula>` elements and classified by prefix, and concrete parameter
//! points are spliced in by replacing the whole `<system>` block. Nothing
//! else in the document is interpreted.

use crate::error::ModelError;
use crate::scenario::PlantParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Classification of a template formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Exhaustive query (`A[] ...`, `A<> ...`); verifyta answers yes/no
    Query,
    /// Statistical probability estimate (`Pr[...](...)`)
    Probability,
    /// Simulation trace (`simulate ...`)
    Simulation,
}

impl PropertyKind {
    /// Short name used in file names and report keys
    pub fn tag(&self) -> &'static str {
        match self {
            PropertyKind::Query => "query",
            PropertyKind::Probability => "probability",
            PropertyKind::Simulation => "simulation",
        }
    }

    /// Classify a normalized formula by its leading token
    fn classify(text: &str) -> Option<PropertyKind> {
        if text.starts_with("Pr") {
            Some(PropertyKind::Probability)
        } else if text.starts_with("simulate") {
            Some(PropertyKind::Simulation)
        } else if text.starts_with('A') {
            Some(PropertyKind::Query)
        } else {
            None
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A classified property extracted from the template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property class
    pub kind: PropertyKind,
    /// Zero-based index within its class, in order of appearance
    pub index: usize,
    /// Normalized formula text (single line, tabs stripped)
    pub text: String,
}

impl Property {
    /// Report key, e.g. `query_03`
    pub fn tag(&self) -> String {
        format!("{}_{:02}", self.kind.tag(), self.index)
    }
}

/// The UPPAAL project template
#[derive(Debug, Clone)]
pub struct ProjectTemplate {
    lines: Vec<String>,
    properties: Vec<Property>,
}

impl ProjectTemplate {
    /// Parse a template from its XML text
    pub fn from_text(text: &str) -> Result<Self, ModelError> {
        if !text.contains("<system>") || !text.contains("</system>") {
            return Err(ModelError::Template(
                "project has no <system> block".into(),
            ));
        }
        let properties = extract_properties(text);
        Ok(Self {
            lines: text.lines().map(str::to_string).collect(),
            properties,
        })
    }

    /// Load a template from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_text(&text)
    }

    /// All classified properties, in order of appearance
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Properties of one class
    pub fn properties_of(&self, kind: PropertyKind) -> Vec<&Property> {
        self.properties.iter().filter(|p| p.kind == kind).collect()
    }

    /// Render a concrete project for one parameter point
    ///
    /// Every line outside the `<system>...</system>` block is copied
    /// verbatim; the block itself is regenerated from the parameters.
    pub fn instantiate(&self, params: &PlantParams) -> String {
        let mut out = String::new();
        let mut in_system = false;
        let mut emitted = false;
        for line in &self.lines {
            if !emitted && line.contains("<system>") {
                emitted = true;
                out.push_str("    <system>\n");
                out.push_str(&system_block(params));
                out.push_str("    </system>\n");
                in_system = !line.contains("</system>");
            } else if in_system {
                if line.contains("</system>") {
                    in_system = false;
                }
            } else {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

/// Generate the `<system>` block contents for one parameter point
fn system_block(params: &PlantParams) -> String {
    let mut block = String::new();
    block.push_str(&format!("const int SPEED = {};\n", params.speed));
    block.push_str(&format!("const int[1, 12] DISKS = {};\n", params.disks));
    block.push_str(&format!(
        "const SlotId POS_OUT_SENSORS[OUT_SENSORS] = {};\n",
        uppaal_array(&params.out_sensors)
    ));
    block.push_str(&format!(
        "const int STATIONS_ELABORATION_TIME[STATIONS] = {};\n",
        uppaal_array(&params.stations_processing)
    ));
    block.push_str(PLANT_WIRING);
    if params.policy == 0 {
        // Policy 0 needs the positions of the two gating sensors.
        block.push_str(
            "flowController = FlowController_0(POS_OUT_SENSORS[2], POS_OUT_SENSORS[3]);\n",
        );
    } else {
        block.push_str(&format!(
            "flowController = FlowController_{}();\n",
            params.policy
        ));
    }
    block.push_str(
        "system initializer, motor, conveyorBelt, station, inSensor, outSensor, flowController;\n",
    );
    block
}

/// Fixed wiring of the plant: station/sensor orderings and process
/// instantiations. Independent of the swept parameters.
const PLANT_WIRING: &str = "
const SlotId POS_IN_SENSORS_IN_ORDER[STATIONS] = {POS_IN_SENSORS[0], POS_IN_SENSORS[1], POS_IN_SENSORS[3], POS_IN_SENSORS[2], POS_IN_SENSORS[4], POS_IN_SENSORS[5]};
const OutSensorId OUT_SENSORS_ID_IN_ORDER[STATIONS] = {1, 2, 4, 3, 4, 0};
const StationId IN_SENSORS_STATION[IN_SENSORS] = {0, 1, 3, 2, 4, 5};

initializer = Initializer(DISKS);
motor = Motor(SPEED);
conveyorBelt = ConveyorBelt();
station(const StationId id) = Station(id, POS_STATIONS[id], STATIONS_ELABORATION_TIME[id], POS_IN_SENSORS_IN_ORDER[id], OUT_SENSORS_ID_IN_ORDER[id]);
inSensor(const InSensorId id) = InSensor(id, IN_SENSORS_STATION[id]);
outSensor(const OutSensorId id) = OutSensor(id, POS_OUT_SENSORS[id]);
";

/// UPPAAL braced array literal, e.g. `{3, 7, 11}`
fn uppaal_array(values: &[i64]) -> String {
    let inner = values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", inner)
}

/// Extract and classify every `<formula>` element in the document
fn extract_properties(text: &str) -> Vec<Property> {
    let mut properties = Vec::new();
    let mut counts = [0usize; 3];
    let mut rest = text;
    while let Some(start) = rest.find("<formula>") {
        let after = &rest[start + "<formula>".len()..];
        let Some(end) = after.find("</formula>") else {
            break;
        };
        let raw = &after[..end];
        let normalized = normalize_formula(raw);
        if let Some(kind) = PropertyKind::classify(&normalized) {
            let slot = match kind {
                PropertyKind::Query => 0,
                PropertyKind::Probability => 1,
                PropertyKind::Simulation => 2,
            };
            properties.push(Property {
                kind,
                index: counts[slot],
                text: normalized,
            });
            counts[slot] += 1;
        }
        rest = &after[end + "</formula>".len()..];
    }
    properties
}

/// Unescape XML entities and collapse the formula onto a single line
fn normalize_formula(raw: &str) -> String {
    let unescaped = raw
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&");
    unescaped.replace(['\r', '\n'], " ").replace('\t', "").trim().to_string()
}
