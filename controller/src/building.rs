use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_FLOOR_HEIGHT,
    collision::Vec3,
    config::ControllerSettings,
    error::ControllerError,
    proximity::{InteractionMarker, MarkerId},
};

/// Results shown for an empty location search.
pub const DEFAULT_SEARCH_RESULTS: usize = 6;

/// Mission marker placed in a building.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerDef {
    pub id: String,
    pub mission: String,
    pub position: [f32; 3],
}

/// Named teleport target inside a building.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    /// 1-based storey, matching [`crate::floor_index`].
    pub floor: u32,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub position: [f32; 3],
}

impl Location {
    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    /// Case-insensitive match on name, type, keywords or floor label.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.kind.to_lowercase().contains(&query)
            || self
                .keywords
                .iter()
                .any(|k| k.to_lowercase().contains(&query))
            || floor_label(self.floor).to_lowercase().contains(&query)
    }
}

/// Human label for a 1-based storey: "Ground Floor", "Floor 1", ...
pub fn floor_label(floor: u32) -> String {
    if floor <= 1 {
        "Ground Floor".to_owned()
    } else {
        format!("Floor {}", floor - 1)
    }
}

fn default_floor_height() -> f32 {
    DEFAULT_FLOOR_HEIGHT
}

/// Static description of one building.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingProfile {
    pub id: String,
    pub name: String,
    pub spawn: [f32; 3],
    #[serde(default = "default_floor_height")]
    pub floor_height: f32,
    #[serde(default, rename = "marker")]
    pub markers: Vec<MarkerDef>,
    #[serde(default, rename = "location")]
    pub locations: Vec<Location>,
}

impl BuildingProfile {
    #[inline]
    pub fn spawn_point(&self) -> Vec3 {
        Vec3::from(self.spawn)
    }

    pub fn location(&self, id: &str) -> Result<&Location, ControllerError> {
        self.locations
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| ControllerError::UnknownLocation {
                building: self.id.clone(),
                location: id.to_owned(),
            })
    }

    /// Locations matching `query`; the first few when the query is blank.
    pub fn search(&self, query: &str) -> Vec<&Location> {
        if query.trim().is_empty() {
            return self.locations.iter().take(DEFAULT_SEARCH_RESULTS).collect();
        }
        self.locations.iter().filter(|l| l.matches(query)).collect()
    }

    /// Fresh, visible interaction markers for this building.
    pub fn interaction_markers(&self) -> Vec<InteractionMarker> {
        self.markers
            .iter()
            .map(|m| {
                InteractionMarker::new(
                    MarkerId(m.id.clone()),
                    m.mission.clone(),
                    Vec3::from(m.position),
                )
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), ControllerError> {
        if !(self.floor_height > 0.0) {
            return Err(ControllerError::invalid(
                "building.floor_height",
                format!("must be positive in `{}`", self.id),
            ));
        }
        let mut seen = HashSet::new();
        for id in self.markers.iter().map(|m| &m.id) {
            if !seen.insert(id) {
                return Err(ControllerError::DuplicateId {
                    building: self.id.clone(),
                    id: id.clone(),
                });
            }
        }
        seen.clear();
        for id in self.locations.iter().map(|l| &l.id) {
            if !seen.insert(id) {
                return Err(ControllerError::DuplicateId {
                    building: self.id.clone(),
                    id: id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Every known building plus shared controller settings, loaded from TOML.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingCatalog {
    #[serde(default)]
    pub settings: ControllerSettings,
    #[serde(default, rename = "building")]
    pub buildings: Vec<BuildingProfile>,
}

impl BuildingCatalog {
    pub fn from_toml_str(source: &str) -> Result<Self, ControllerError> {
        let catalog: Self = toml::from_str(source)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), ControllerError> {
        self.settings.validate()?;
        let mut seen = HashSet::new();
        for building in &self.buildings {
            if !seen.insert(&building.id) {
                return Err(ControllerError::DuplicateId {
                    building: building.id.clone(),
                    id: building.id.clone(),
                });
            }
            building.validate()?;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&BuildingProfile, ControllerError> {
        self.buildings
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| ControllerError::UnknownBuilding(id.to_owned()))
    }
}
