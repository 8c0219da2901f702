//! # Sites and Site Profiles
//!
//! A [`Site`] is a regulated facility owned by exactly one [`Organization`].
//! Its [`SiteProfile`] (category, water use, byproducts) is the only input to
//! requirement generation and is fixed once the site has been registered;
//! no operation edits it.

use serde::{Deserialize, Serialize};

use crate::identity::{OrganizationId, SiteId};

/// Category of negative environmental impact (NVOS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum NvosCategory {
    I,
    II,
    III,
    IV,
}

impl NvosCategory {
    /// All four categories in declaration order.
    pub const ALL: [NvosCategory; 4] = [Self::I, Self::II, Self::III, Self::IV];

    /// Return the string representation of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I => "I",
            Self::II => "II",
            Self::III => "III",
            Self::IV => "IV",
        }
    }

    /// Parse the string form produced by [`NvosCategory::as_str`].
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "I" => Some(Self::I),
            "II" => Some(Self::II),
            "III" => Some(Self::III),
            "IV" => Some(Self::IV),
            _ => None,
        }
    }
}

impl std::fmt::Display for NvosCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a site draws water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum WaterUseType {
    /// No water use.
    None,
    /// Groundwater well.
    Well,
    /// River or lake.
    #[serde(alias = "river")]
    SurfaceWater,
    Other,
}

impl WaterUseType {
    /// Return the string representation of this water use type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Well => "well",
            Self::SurfaceWater => "surface_water",
            Self::Other => "other",
        }
    }

    /// Parse the string form produced by [`WaterUseType::as_str`].
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "well" => Some(Self::Well),
            "surface_water" | "river" => Some(Self::SurfaceWater),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for WaterUseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three classifying attributes of a site that drive requirement
/// generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SiteProfile {
    pub category: NvosCategory,
    pub water_use_type: WaterUseType,
    /// Whether the site produces byproducts (manure, litter).
    pub has_byproducts: bool,
}

/// An organization ("client" legal entity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    /// Taxpayer identification number.
    #[serde(default)]
    pub inn: String,
    /// Primary state registration number.
    #[serde(default)]
    pub ogrn: String,
}

/// A registered site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Site {
    pub id: SiteId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub address: String,
    pub profile: SiteProfile,
}
