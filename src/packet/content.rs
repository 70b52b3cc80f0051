//! Typed packet contents
//!
//! Each packet carries exactly one of these. The packet type tag is derived
//! from the variant, so a packet never changes type once created.

use super::triangulation::Triangulation;
use super::{Packet, PacketType};
use std::collections::BTreeSet;
use std::rc::Weak;

/// The data stored inside a packet
#[derive(Debug, Clone)]
pub enum PacketContent {
    Container,
    Text(String),
    Script(Script),
    Triangulation(Triangulation),
    NormalSurfaces(SurfaceList),
    AngleStructures(AngleStructureList),
    SurfaceFilter(SurfaceFilter),
    Pdf(Vec<u8>),
}

impl PacketContent {
    pub fn packet_type(&self) -> PacketType {
        match self {
            Self::Container => PacketType::Container,
            Self::Text(_) => PacketType::Text,
            Self::Script(_) => PacketType::Script,
            Self::Triangulation(tri) => match tri.dim() {
                2 => PacketType::Triangulation2,
                3 => PacketType::Triangulation3,
                _ => PacketType::Triangulation4,
            },
            Self::NormalSurfaces(_) => PacketType::NormalSurfaces,
            Self::AngleStructures(_) => PacketType::AngleStructures,
            Self::SurfaceFilter(_) => PacketType::SurfaceFilter,
            Self::Pdf(_) => PacketType::Pdf,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scripts
// ─────────────────────────────────────────────────────────────────────────────

/// A script variable bound to a packet elsewhere in the tree (or to nothing)
#[derive(Debug, Clone)]
pub struct ScriptVariable {
    pub name: String,
    pub value: Option<Weak<Packet>>,
}

#[derive(Debug, Clone, Default)]
pub struct Script {
    pub text: String,
    pub variables: Vec<ScriptVariable>,
}

impl Script {
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    /// Whether `name` is used by any variable other than the one at `exclude`
    pub fn name_used_elsewhere(&self, name: &str, exclude: Option<usize>) -> bool {
        self.variables
            .iter()
            .enumerate()
            .any(|(i, v)| Some(i) != exclude && v.name == name)
    }

    /// First name of the form `var0`, `var1`, ... not already in use
    pub fn fresh_variable_name(&self) -> String {
        (0..)
            .map(|i| format!("var{i}"))
            .find(|name| self.variable_index(name).is_none())
            .unwrap_or_else(|| "var".to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Normal surfaces and angle structures
// ─────────────────────────────────────────────────────────────────────────────

/// Summary of a single normal surface, as enumerated by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalSurface {
    pub name: String,
    pub coords: Vec<i64>,
    /// None for non-compact surfaces
    pub euler: Option<i64>,
    pub orientable: Option<bool>,
    pub compact: bool,
    pub has_boundary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceList {
    /// Coordinate system the vectors are expressed in, e.g. "Standard normal (tri-quad)"
    pub coords: String,
    pub embedded_only: bool,
    pub surfaces: Vec<NormalSurface>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AngleStructureList {
    pub taut_only: bool,
    /// Angles per structure, as (numerator, denominator) multiples of π
    pub structures: Vec<Vec<(i64, i64)>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Surface filters
// ─────────────────────────────────────────────────────────────────────────────

/// Sub-type tag for surface filter packets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterType {
    Trivial,
    Properties,
    Combination,
}

impl FilterType {
    pub const ALL: [FilterType; 3] = [Self::Trivial, Self::Properties, Self::Combination];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Trivial => "Default filter",
            Self::Properties => "Filter by basic properties",
            Self::Combination => "Combination filter",
        }
    }
}

/// A three-way constraint on a boolean property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoolSet {
    #[default]
    Any,
    Yes,
    No,
}

impl BoolSet {
    pub fn accepts(&self, value: bool) -> bool {
        match self {
            Self::Any => true,
            Self::Yes => value,
            Self::No => !value,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Any => "Any",
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            Self::Any => Self::Yes,
            Self::Yes => Self::No,
            Self::No => Self::Any,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertiesFilter {
    pub orientability: BoolSet,
    pub compactness: BoolSet,
    pub boundary: BoolSet,
    /// Allowed Euler characteristics; empty means any
    pub euler: BTreeSet<i64>,
}

impl PropertiesFilter {
    pub fn accepts(&self, surface: &NormalSurface) -> bool {
        if !self.compactness.accepts(surface.compact) {
            return false;
        }
        if !self.boundary.accepts(surface.has_boundary) {
            return false;
        }
        if self.orientability != BoolSet::Any {
            match surface.orientable {
                Some(o) if self.orientability.accepts(o) => {}
                _ => return false,
            }
        }
        if !self.euler.is_empty() {
            match surface.euler {
                Some(chi) if self.euler.contains(&chi) => {}
                _ => return false,
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceFilter {
    Trivial,
    Properties(PropertiesFilter),
    /// Combines the filters among this packet's children
    Combination { use_and: bool },
}

impl SurfaceFilter {
    pub fn filter_type(&self) -> FilterType {
        match self {
            Self::Trivial => FilterType::Trivial,
            Self::Properties(_) => FilterType::Properties,
            Self::Combination { .. } => FilterType::Combination,
        }
    }
}
