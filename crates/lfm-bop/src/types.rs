use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

/// Small integer identifier for a car model in the simulator's catalog.
pub type CarModelId = u16;

#[derive(Debug, thiserror::Error)]
#[error("Invalid car class '{0}'. Accepted values: 'gt3', 'gt4'")]
pub struct CarClassParseError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarClass {
    Gt3,
    Gt4,
}

impl CarClass {
    /// Capture order on the BoP page: the GT3 tab is selected by default,
    /// GT4 comes after a tab switch.
    pub const ALL: [CarClass; 2] = [CarClass::Gt3, CarClass::Gt4];

    /// Label of the UI tab that must be clicked before capturing this
    /// class, `None` for the default tab.
    pub fn tab_label(&self) -> Option<&'static str> {
        match self {
            CarClass::Gt3 => None,
            CarClass::Gt4 => Some("GT4"),
        }
    }

    /// Substring the class column must contain for rows captured under
    /// this class. The default tab lists GT3 cars only, so no filter
    /// applies there.
    pub fn class_filter(&self) -> Option<&'static str> {
        match self {
            CarClass::Gt3 => None,
            CarClass::Gt4 => Some("gt4"),
        }
    }
}

impl FromStr for CarClass {
    type Err = CarClassParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gt3" => Ok(CarClass::Gt3),
            "gt4" => Ok(CarClass::Gt4),
            _ => Err(CarClassParseError(s.to_string())),
        }
    }
}

impl Display for CarClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CarClass::Gt3 => write!(f, "GT3"),
            CarClass::Gt4 => write!(f, "GT4"),
        }
    }
}

/// One ballast adjustment: `ballast_kg` applied to `car_model` at `track`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BopEntry {
    pub track: String,
    pub car_model: CarModelId,
    pub ballast_kg: i32,
}

impl Display for BopEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<18} car #{:<3} {:>+4} kg",
            self.track, self.car_model, self.ballast_kg
        )
    }
}

/// The full output document, written as one JSON file per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BopData {
    pub entries: Vec<BopEntry>,
}
