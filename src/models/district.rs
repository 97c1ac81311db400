use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PortalError;

/// Administrative districts with a ground-station data file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum District {
    Ampara,
    Anuradhapura,
    Batticaloa,
    Battaramulla,
    Galle,
    Fort,
    Hambanthota,
    Jaffna,
    Kandy,
    Kanthale,
    Kilinochchi,
    Katubedda,
    Mannar,
    Matale,
    Matara,
    Monaragala,
    Mullaitivu,
    Polonnaruwa,
    PointPedro,
}

impl District {
    /// All districts in selector order
    pub const ALL: [District; 19] = [
        District::Ampara,
        District::Anuradhapura,
        District::Batticaloa,
        District::Battaramulla,
        District::Galle,
        District::Fort,
        District::Hambanthota,
        District::Jaffna,
        District::Kandy,
        District::Kanthale,
        District::Kilinochchi,
        District::Katubedda,
        District::Mannar,
        District::Matale,
        District::Matara,
        District::Monaragala,
        District::Mullaitivu,
        District::Polonnaruwa,
        District::PointPedro,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            District::Ampara => "Ampara",
            District::Anuradhapura => "Anuradhapura",
            District::Batticaloa => "Batticaloa",
            District::Battaramulla => "Battaramulla",
            District::Galle => "Galle",
            District::Fort => "Fort",
            District::Hambanthota => "Hambanthota",
            District::Jaffna => "Jaffna",
            District::Kandy => "Kandy",
            District::Kanthale => "Kanthale",
            District::Kilinochchi => "Kilinochchi",
            District::Katubedda => "Katubedda",
            District::Mannar => "Mannar",
            District::Matale => "Matale",
            District::Matara => "Matara",
            District::Monaragala => "Monaragala",
            District::Mullaitivu => "Mullaitivu",
            District::Polonnaruwa => "Polonnaruwa",
            District::PointPedro => "PointPedro",
        }
    }

    /// Backing file name, e.g. `Cleaned_Kandy.xls`
    pub fn file_name(&self, extension: &str) -> String {
        format!("Cleaned_{}.{}", self.name(), extension.trim_start_matches('.'))
    }
}

impl FromStr for District {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        District::ALL
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PortalError::UnknownDistrict(wanted.to_string()))
    }
}

impl std::fmt::Display for District {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
