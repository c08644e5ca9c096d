//! Region lookup: map extents, figure geometry and styling defaults.
//!
//! Regions are resolved once per plotting run. Built-in entries cover CONUS,
//! every state and the ten Geographic Area Coordination Centers (GACCs);
//! a YAML file can override individual fields or add new named regions.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bbox::BoundingBox;
use crate::error::{FireWxError, FireWxResult};
use crate::time::TimeZoneSpec;

/// NDFD grid spacing used to turn map extents into label strides.
const NDFD_GRID_KM: f64 = 2.539703;
const KM_PER_DEGREE: f64 = 111.2;

/// Height reserved above and below the map panel for title and colorbar.
pub const TITLE_BAND_PX: u32 = 96;
pub const COLORBAR_BAND_PX: u32 = 110;

/// Kind of region, which drives figure size and label density defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    Conus,
    State,
    Gacc,
    User,
    Custom,
}

impl RegionKind {
    fn figure_width(&self) -> u32 {
        match self {
            RegionKind::Conus => 1600,
            RegionKind::Gacc => 1400,
            _ => 1200,
        }
    }

    fn labels_per_axis(&self) -> f64 {
        match self {
            RegionKind::Conus => 22.0,
            RegionKind::Gacc => 16.0,
            _ => 14.0,
        }
    }
}

/// How a region was requested.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionKey {
    Conus,
    State(String),
    Gacc(String),
    /// A region defined only in the override file.
    Named(String),
    Custom(BoundingBox),
}

impl RegionKey {
    /// Path-safe identifier used in output directories.
    pub fn slug(&self) -> String {
        match self {
            RegionKey::Conus => "CONUS".to_string(),
            RegionKey::State(code) | RegionKey::Gacc(code) | RegionKey::Named(code) => {
                code.to_uppercase()
            }
            RegionKey::Custom(b) => format!(
                "CUSTOM_{:.2}_{:.2}_{:.2}_{:.2}",
                b.west, b.south, b.east, b.north
            )
            .replace('-', "m"),
        }
    }
}

impl FromStr for RegionKey {
    type Err = FireWxError;

    /// Accepts "conus", a state code ("CA"), a GACC code ("OSCC"),
    /// "custom:west,south,east,north", or any other name for override lookup.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(FireWxError::UnknownRegion(s.to_string()));
        }
        if let Some(bounds) = trimmed
            .strip_prefix("custom:")
            .or_else(|| trimmed.strip_prefix("CUSTOM:"))
        {
            return Ok(RegionKey::Custom(BoundingBox::from_bounds_string(bounds)?));
        }

        let upper = trimmed.to_uppercase();
        if upper == "CONUS" || upper == "US" {
            return Ok(RegionKey::Conus);
        }
        if STATES.iter().any(|s| s.code == upper) {
            return Ok(RegionKey::State(upper));
        }
        if GACCS.iter().any(|g| g.code == upper) {
            return Ok(RegionKey::Gacc(upper));
        }
        Ok(RegionKey::Named(upper))
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// Fully resolved settings for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSettings {
    pub key: String,
    pub name: String,
    pub kind: RegionKind,
    /// NDFD sector directory (`AR.<sector>`) the data is downloaded from.
    pub ndfd_sector: String,
    pub extent: BoundingBox,
    pub figure_width: u32,
    pub figure_height: u32,
    pub title_font_size: f32,
    pub subtitle_font_size: f32,
    pub signature_font_size: f32,
    pub colorbar_font_size: f32,
    pub station_font_size: f32,
    /// Fraction of the figure width taken by the colorbar.
    pub colorbar_shrink: f32,
    /// Stride between station sample points, in grid cells.
    pub decimate: usize,
    pub time_zone: TimeZoneSpec,
}

impl RegionSettings {
    /// Derive settings from an extent using the kind's defaults.
    pub fn derive(
        key: &str,
        name: &str,
        kind: RegionKind,
        extent: BoundingBox,
        time_zone: TimeZoneSpec,
    ) -> Self {
        let figure_width = kind.figure_width();
        let figure_height = map_height(&extent, figure_width) + TITLE_BAND_PX + COLORBAR_BAND_PX;
        let scale = figure_width as f32 / 1200.0;

        Self {
            key: key.to_uppercase(),
            name: name.to_string(),
            kind,
            ndfd_sector: sector_for_extent(&extent).to_string(),
            extent,
            figure_width,
            figure_height,
            title_font_size: 24.0 * scale,
            subtitle_font_size: 17.0 * scale,
            signature_font_size: 12.0 * scale,
            colorbar_font_size: 13.0 * scale,
            station_font_size: if kind == RegionKind::Conus { 9.0 } else { 11.0 },
            colorbar_shrink: 0.8,
            decimate: auto_decimate(&extent, kind.labels_per_axis()),
            time_zone,
        }
    }

    /// Station stride for a reference system; dense boundary layers thin the labels.
    pub fn decimate_for(&self, reference_system: ReferenceSystem) -> usize {
        if reference_system.is_dense() {
            ((self.decimate as f64) * 1.25).ceil() as usize
        } else {
            self.decimate
        }
    }

    /// Map panel height in pixels.
    pub fn map_height(&self) -> u32 {
        self.figure_height
            .saturating_sub(TITLE_BAND_PX + COLORBAR_BAND_PX)
            .max(1)
    }

    fn apply(&mut self, o: &RegionOverride) -> FireWxResult<()> {
        if let Some(ref name) = o.name {
            self.name = name.clone();
        }
        if let Some(extent) = o.extent {
            extent.validate()?;
            self.extent = extent;
        }
        if let Some(ref sector) = o.ndfd_sector {
            self.ndfd_sector = sector.clone();
        }
        if let Some(v) = o.figure_width {
            self.figure_width = v;
        }
        if let Some(v) = o.figure_height {
            self.figure_height = v;
        }
        if let Some(v) = o.title_font_size {
            self.title_font_size = v;
        }
        if let Some(v) = o.subtitle_font_size {
            self.subtitle_font_size = v;
        }
        if let Some(v) = o.signature_font_size {
            self.signature_font_size = v;
        }
        if let Some(v) = o.colorbar_font_size {
            self.colorbar_font_size = v;
        }
        if let Some(v) = o.station_font_size {
            self.station_font_size = v;
        }
        if let Some(v) = o.colorbar_shrink {
            self.colorbar_shrink = v.clamp(0.1, 1.0);
        }
        if let Some(v) = o.decimate {
            self.decimate = v.max(1);
        }
        if let Some(tz) = o.time_zone {
            tz.validate()?;
            self.time_zone = tz;
        }
        Ok(())
    }
}

/// Map panel height preserving the extent's aspect at its center latitude.
fn map_height(extent: &BoundingBox, width: u32) -> u32 {
    let (lat_c, _) = extent.center();
    let x_span = extent.width() * lat_c.to_radians().cos().max(0.2);
    let ratio = (extent.height() / x_span).clamp(0.5, 1.6);
    (width as f64 * ratio).round() as u32
}

/// Grid stride giving roughly `labels_per_axis` station labels across the extent.
pub fn auto_decimate(extent: &BoundingBox, labels_per_axis: f64) -> usize {
    let (lat_c, _) = extent.center();
    let width_km = extent.width() * KM_PER_DEGREE * lat_c.to_radians().cos().abs();
    let cells = width_km / NDFD_GRID_KM;
    ((cells / labels_per_axis).round() as usize).max(1)
}

/// Boundary overlays a reference system draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryLayer {
    States,
    Counties,
    Gacc,
    Psa,
    Cwa,
    FireZones,
    PublicZones,
}

impl BoundaryLayer {
    /// GeoJSON file stem expected in the boundaries directory.
    pub fn file_stem(&self) -> &'static str {
        match self {
            BoundaryLayer::States => "states",
            BoundaryLayer::Counties => "counties",
            BoundaryLayer::Gacc => "gacc",
            BoundaryLayer::Psa => "psa",
            BoundaryLayer::Cwa => "cwa",
            BoundaryLayer::FireZones => "fire_zones",
            BoundaryLayer::PublicZones => "public_zones",
        }
    }
}

/// Which political or fire-management boundaries are drawn on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSystem {
    StatesOnly,
    StatesAndCounties,
    GaccOnly,
    GaccAndPsa,
    CwaOnly,
    NwsFireZones,
    NwsPublicZones,
}

impl ReferenceSystem {
    pub const ALL: [ReferenceSystem; 7] = [
        ReferenceSystem::StatesOnly,
        ReferenceSystem::StatesAndCounties,
        ReferenceSystem::GaccOnly,
        ReferenceSystem::GaccAndPsa,
        ReferenceSystem::CwaOnly,
        ReferenceSystem::NwsFireZones,
        ReferenceSystem::NwsPublicZones,
    ];

    pub fn layers(&self) -> &'static [BoundaryLayer] {
        use BoundaryLayer::*;
        match self {
            ReferenceSystem::StatesOnly => &[States],
            ReferenceSystem::StatesAndCounties => &[States, Counties],
            ReferenceSystem::GaccOnly => &[Gacc],
            ReferenceSystem::GaccAndPsa => &[Gacc, Psa],
            ReferenceSystem::CwaOnly => &[States, Cwa],
            ReferenceSystem::NwsFireZones => &[States, Cwa, FireZones],
            ReferenceSystem::NwsPublicZones => &[States, Cwa, PublicZones],
        }
    }

    /// Reference systems whose boundaries crowd the map.
    pub fn is_dense(&self) -> bool {
        matches!(
            self,
            ReferenceSystem::StatesAndCounties
                | ReferenceSystem::GaccAndPsa
                | ReferenceSystem::NwsFireZones
                | ReferenceSystem::NwsPublicZones
        )
    }

    /// Directory name used in the output tree.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ReferenceSystem::StatesOnly => "States Only",
            ReferenceSystem::StatesAndCounties => "States & Counties",
            ReferenceSystem::GaccOnly => "GACC Only",
            ReferenceSystem::GaccAndPsa => "GACC & PSA",
            ReferenceSystem::CwaOnly => "CWA Only",
            ReferenceSystem::NwsFireZones => "NWS CWAs & NWS Fire Weather Zones",
            ReferenceSystem::NwsPublicZones => "NWS CWAs & NWS Public Zones",
        }
    }
}

impl FromStr for ReferenceSystem {
    type Err = FireWxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "states" | "statesonly" => Ok(ReferenceSystem::StatesOnly),
            "statescounties" | "statesandcounties" | "counties" => {
                Ok(ReferenceSystem::StatesAndCounties)
            }
            "gacc" | "gacconly" => Ok(ReferenceSystem::GaccOnly),
            "gaccpsa" | "gaccandpsa" | "psa" => Ok(ReferenceSystem::GaccAndPsa),
            "cwa" | "cwaonly" => Ok(ReferenceSystem::CwaOnly),
            "firezones" | "nwsfirezones" | "nwscwasnwsfireweatherzones" => {
                Ok(ReferenceSystem::NwsFireZones)
            }
            "publiczones" | "nwspubliczones" | "nwscwasnwspubliczones" => {
                Ok(ReferenceSystem::NwsPublicZones)
            }
            _ => Err(FireWxError::UnknownReferenceSystem(s.to_string())),
        }
    }
}

impl fmt::Display for ReferenceSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Optional per-field overrides read from YAML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionOverride {
    pub name: Option<String>,
    pub extent: Option<BoundingBox>,
    pub ndfd_sector: Option<String>,
    pub figure_width: Option<u32>,
    pub figure_height: Option<u32>,
    pub title_font_size: Option<f32>,
    pub subtitle_font_size: Option<f32>,
    pub signature_font_size: Option<f32>,
    pub colorbar_font_size: Option<f32>,
    pub station_font_size: Option<f32>,
    pub colorbar_shrink: Option<f32>,
    pub decimate: Option<usize>,
    pub time_zone: Option<TimeZoneSpec>,
}

/// Root of a regions override file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionOverrideFile {
    #[serde(default)]
    pub regions: HashMap<String, RegionOverride>,
}

/// Built-in region table merged with user overrides.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    regions: HashMap<String, RegionSettings>,
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RegionCatalog {
    /// Catalog with only the built-in regions.
    pub fn builtin() -> Self {
        let mut regions = HashMap::new();

        let conus = RegionSettings::derive(
            "CONUS",
            "CONUS",
            RegionKind::Conus,
            BoundingBox::new(-125.0, 24.0, -66.5, 50.0),
            TimeZoneSpec::SystemLocal,
        );
        regions.insert(conus.key.clone(), conus);

        for s in STATES {
            let settings = RegionSettings::derive(
                s.code,
                s.name,
                RegionKind::State,
                BoundingBox::new(s.bounds[0], s.bounds[1], s.bounds[2], s.bounds[3]),
                TimeZoneSpec::fixed(s.utc_offset, s.dst),
            );
            regions.insert(settings.key.clone(), settings);
        }

        for g in GACCS {
            let settings = RegionSettings::derive(
                g.code,
                g.name,
                RegionKind::Gacc,
                BoundingBox::new(g.bounds[0], g.bounds[1], g.bounds[2], g.bounds[3]),
                TimeZoneSpec::fixed(g.utc_offset, g.dst),
            );
            regions.insert(settings.key.clone(), settings);
        }

        Self { regions }
    }

    /// Built-ins plus overrides from a YAML file.
    pub fn from_file(path: &Path) -> FireWxResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut catalog = Self::builtin();
        catalog.apply_yaml(&content)?;
        info!(path = %path.display(), regions = catalog.regions.len(), "Loaded region overrides");
        Ok(catalog)
    }

    /// Merge overrides from a YAML document.
    pub fn apply_yaml(&mut self, yaml: &str) -> FireWxResult<()> {
        let file: RegionOverrideFile = serde_yaml::from_str(yaml)?;
        for (key, o) in file.regions {
            let key = key.to_uppercase();
            match self.regions.get_mut(&key) {
                Some(existing) => {
                    debug!(region = %key, "Applying region override");
                    existing.apply(&o)?;
                }
                None => {
                    let extent = o.extent.ok_or_else(|| {
                        FireWxError::ConfigError(format!(
                            "new region '{}' needs an extent",
                            key
                        ))
                    })?;
                    extent.validate()?;
                    let name = o.name.clone().unwrap_or_else(|| key.clone());
                    let mut settings = RegionSettings::derive(
                        &key,
                        &name,
                        RegionKind::User,
                        extent,
                        o.time_zone.unwrap_or_default(),
                    );
                    settings.apply(&o)?;
                    debug!(region = %key, "Added user region");
                    self.regions.insert(key, settings);
                }
            }
        }
        Ok(())
    }

    /// Look up a region by key. Custom bounds are derived on the fly.
    pub fn resolve(&self, key: &RegionKey) -> FireWxResult<RegionSettings> {
        match key {
            RegionKey::Custom(extent) => {
                extent.validate()?;
                Ok(RegionSettings::derive(
                    &key.slug(),
                    "Custom Region",
                    RegionKind::Custom,
                    *extent,
                    TimeZoneSpec::SystemLocal,
                ))
            }
            other => self
                .regions
                .get(&other.slug())
                .cloned()
                .ok_or_else(|| FireWxError::UnknownRegion(other.slug())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&RegionSettings> {
        self.regions.get(&key.to_uppercase())
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.regions.keys()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// An NDFD sector directory and the extent it covers.
#[derive(Debug, Clone, Copy)]
pub struct NdfdSector {
    pub name: &'static str,
    pub bounds: [f64; 4],
}

impl NdfdSector {
    pub fn extent(&self) -> BoundingBox {
        BoundingBox::new(self.bounds[0], self.bounds[1], self.bounds[2], self.bounds[3])
    }
}

pub const NDFD_SECTORS: &[NdfdSector] = &[
    NdfdSector { name: "conus", bounds: [-130.0, 20.0, -60.0, 52.5] },
    NdfdSector { name: "pacnwest", bounds: [-126.0, 40.5, -116.0, 49.5] },
    NdfdSector { name: "pacswest", bounds: [-125.0, 31.5, -113.5, 42.5] },
    NdfdSector { name: "nrockies", bounds: [-118.0, 40.5, -103.5, 49.5] },
    NdfdSector { name: "crrocks", bounds: [-120.5, 36.5, -101.5, 42.5] },
    NdfdSector { name: "srockies", bounds: [-115.5, 30.5, -102.5, 37.5] },
    NdfdSector { name: "nplains", bounds: [-105.0, 42.5, -95.5, 49.5] },
    NdfdSector { name: "crplains", bounds: [-105.0, 36.5, -94.0, 43.5] },
    NdfdSector { name: "splains", bounds: [-107.0, 25.5, -93.0, 37.5] },
    NdfdSector { name: "umissvly", bounds: [-98.0, 40.0, -89.5, 49.5] },
    NdfdSector { name: "crmissvy", bounds: [-96.5, 35.5, -87.0, 43.0] },
    NdfdSector { name: "smissvly", bounds: [-95.0, 28.5, -88.0, 37.0] },
    NdfdSector { name: "crgrlakes", bounds: [-93.0, 41.0, -82.0, 48.5] },
    NdfdSector { name: "ergrlakes", bounds: [-89.0, 36.0, -80.0, 42.5] },
    NdfdSector { name: "neast", bounds: [-80.5, 40.5, -66.5, 47.5] },
    NdfdSector { name: "midatlan", bounds: [-83.0, 36.5, -73.5, 42.5] },
    NdfdSector { name: "seast", bounds: [-92.0, 24.0, -75.0, 37.0] },
    NdfdSector { name: "alaska", bounds: [-180.0, 50.0, -129.0, 72.0] },
    NdfdSector { name: "hawaii", bounds: [-161.0, 18.0, -154.0, 23.0] },
];

/// Smallest NDFD sector covering the extent, falling back to CONUS.
pub fn sector_for_extent(extent: &BoundingBox) -> &'static str {
    NDFD_SECTORS
        .iter()
        .filter(|s| s.extent().covers(extent))
        .min_by(|a, b| {
            a.extent()
                .area()
                .partial_cmp(&b.extent().area())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|s| s.name)
        .unwrap_or("conus")
}

struct BuiltinRegion {
    code: &'static str,
    name: &'static str,
    /// west, south, east, north
    bounds: [f64; 4],
    utc_offset: i32,
    dst: bool,
}

const STATES: &[BuiltinRegion] = &[
    BuiltinRegion { code: "AL", name: "Alabama", bounds: [-88.6, 30.1, -84.8, 35.1], utc_offset: -6, dst: true },
    BuiltinRegion { code: "AK", name: "Alaska", bounds: [-170.0, 51.0, -129.9, 71.5], utc_offset: -9, dst: true },
    BuiltinRegion { code: "AZ", name: "Arizona", bounds: [-114.9, 31.2, -109.0, 37.1], utc_offset: -7, dst: false },
    BuiltinRegion { code: "AR", name: "Arkansas", bounds: [-94.7, 32.9, -89.6, 36.6], utc_offset: -6, dst: true },
    BuiltinRegion { code: "CA", name: "California", bounds: [-124.6, 32.4, -114.1, 42.1], utc_offset: -8, dst: true },
    BuiltinRegion { code: "CO", name: "Colorado", bounds: [-109.1, 36.9, -102.0, 41.1], utc_offset: -7, dst: true },
    BuiltinRegion { code: "CT", name: "Connecticut", bounds: [-73.8, 40.9, -71.7, 42.1], utc_offset: -5, dst: true },
    BuiltinRegion { code: "DE", name: "Delaware", bounds: [-75.8, 38.4, -75.0, 39.9], utc_offset: -5, dst: true },
    BuiltinRegion { code: "FL", name: "Florida", bounds: [-87.7, 24.4, -79.9, 31.1], utc_offset: -5, dst: true },
    BuiltinRegion { code: "GA", name: "Georgia", bounds: [-85.7, 30.3, -80.8, 35.1], utc_offset: -5, dst: true },
    BuiltinRegion { code: "HI", name: "Hawaii", bounds: [-160.3, 18.9, -154.7, 22.3], utc_offset: -10, dst: false },
    BuiltinRegion { code: "ID", name: "Idaho", bounds: [-117.3, 41.9, -111.0, 49.1], utc_offset: -7, dst: true },
    BuiltinRegion { code: "IL", name: "Illinois", bounds: [-91.6, 36.9, -87.4, 42.6], utc_offset: -6, dst: true },
    BuiltinRegion { code: "IN", name: "Indiana", bounds: [-88.2, 37.7, -84.7, 41.8], utc_offset: -5, dst: true },
    BuiltinRegion { code: "IA", name: "Iowa", bounds: [-96.7, 40.3, -90.1, 43.6], utc_offset: -6, dst: true },
    BuiltinRegion { code: "KS", name: "Kansas", bounds: [-102.1, 36.9, -94.5, 40.1], utc_offset: -6, dst: true },
    BuiltinRegion { code: "KY", name: "Kentucky", bounds: [-89.6, 36.4, -81.9, 39.2], utc_offset: -5, dst: true },
    BuiltinRegion { code: "LA", name: "Louisiana", bounds: [-94.1, 28.9, -88.8, 33.1], utc_offset: -6, dst: true },
    BuiltinRegion { code: "ME", name: "Maine", bounds: [-71.1, 43.0, -66.9, 47.5], utc_offset: -5, dst: true },
    BuiltinRegion { code: "MD", name: "Maryland", bounds: [-79.5, 37.9, -75.0, 39.8], utc_offset: -5, dst: true },
    BuiltinRegion { code: "MA", name: "Massachusetts", bounds: [-73.5, 41.2, -69.9, 42.9], utc_offset: -5, dst: true },
    BuiltinRegion { code: "MI", name: "Michigan", bounds: [-90.5, 41.7, -82.4, 48.3], utc_offset: -5, dst: true },
    BuiltinRegion { code: "MN", name: "Minnesota", bounds: [-97.3, 43.5, -89.5, 49.4], utc_offset: -6, dst: true },
    BuiltinRegion { code: "MS", name: "Mississippi", bounds: [-91.7, 30.1, -88.1, 35.0], utc_offset: -6, dst: true },
    BuiltinRegion { code: "MO", name: "Missouri", bounds: [-95.8, 36.0, -89.1, 40.6], utc_offset: -6, dst: true },
    BuiltinRegion { code: "MT", name: "Montana", bounds: [-116.1, 44.3, -104.0, 49.1], utc_offset: -7, dst: true },
    BuiltinRegion { code: "NE", name: "Nebraska", bounds: [-104.1, 39.9, -95.3, 43.1], utc_offset: -6, dst: true },
    BuiltinRegion { code: "NV", name: "Nevada", bounds: [-120.1, 35.0, -114.0, 42.1], utc_offset: -8, dst: true },
    BuiltinRegion { code: "NH", name: "New Hampshire", bounds: [-72.6, 42.7, -70.6, 45.4], utc_offset: -5, dst: true },
    BuiltinRegion { code: "NJ", name: "New Jersey", bounds: [-75.6, 38.9, -73.9, 41.4], utc_offset: -5, dst: true },
    BuiltinRegion { code: "NM", name: "New Mexico", bounds: [-109.1, 31.3, -103.0, 37.1], utc_offset: -7, dst: true },
    BuiltinRegion { code: "NY", name: "New York", bounds: [-79.8, 40.5, -71.8, 45.1], utc_offset: -5, dst: true },
    BuiltinRegion { code: "NC", name: "North Carolina", bounds: [-84.4, 33.8, -75.4, 36.6], utc_offset: -5, dst: true },
    BuiltinRegion { code: "ND", name: "North Dakota", bounds: [-104.1, 45.9, -96.5, 49.1], utc_offset: -6, dst: true },
    BuiltinRegion { code: "OH", name: "Ohio", bounds: [-84.9, 38.4, -80.5, 42.0], utc_offset: -5, dst: true },
    BuiltinRegion { code: "OK", name: "Oklahoma", bounds: [-103.1, 33.6, -94.4, 37.1], utc_offset: -6, dst: true },
    BuiltinRegion { code: "OR", name: "Oregon", bounds: [-124.6, 41.9, -116.4, 46.3], utc_offset: -8, dst: true },
    BuiltinRegion { code: "PA", name: "Pennsylvania", bounds: [-80.6, 39.7, -74.7, 42.3], utc_offset: -5, dst: true },
    BuiltinRegion { code: "RI", name: "Rhode Island", bounds: [-71.9, 41.1, -71.1, 42.1], utc_offset: -5, dst: true },
    BuiltinRegion { code: "SC", name: "South Carolina", bounds: [-83.4, 32.0, -78.5, 35.3], utc_offset: -5, dst: true },
    BuiltinRegion { code: "SD", name: "South Dakota", bounds: [-104.1, 42.4, -96.4, 46.0], utc_offset: -6, dst: true },
    BuiltinRegion { code: "TN", name: "Tennessee", bounds: [-90.4, 34.9, -81.6, 36.7], utc_offset: -6, dst: true },
    BuiltinRegion { code: "TX", name: "Texas", bounds: [-106.7, 25.8, -93.5, 36.6], utc_offset: -6, dst: true },
    BuiltinRegion { code: "UT", name: "Utah", bounds: [-114.1, 36.9, -109.0, 42.1], utc_offset: -7, dst: true },
    BuiltinRegion { code: "VT", name: "Vermont", bounds: [-73.5, 42.7, -71.4, 45.1], utc_offset: -5, dst: true },
    BuiltinRegion { code: "VA", name: "Virginia", bounds: [-83.7, 36.5, -75.2, 39.5], utc_offset: -5, dst: true },
    BuiltinRegion { code: "WA", name: "Washington", bounds: [-124.8, 45.5, -116.9, 49.1], utc_offset: -8, dst: true },
    BuiltinRegion { code: "WV", name: "West Virginia", bounds: [-82.7, 37.2, -77.7, 40.7], utc_offset: -5, dst: true },
    BuiltinRegion { code: "WI", name: "Wisconsin", bounds: [-92.9, 42.5, -86.8, 47.1], utc_offset: -6, dst: true },
    BuiltinRegion { code: "WY", name: "Wyoming", bounds: [-111.1, 40.9, -104.0, 45.1], utc_offset: -7, dst: true },
];

const GACCS: &[BuiltinRegion] = &[
    BuiltinRegion { code: "AICC", name: "Alaska Interagency Coordination Center", bounds: [-170.0, 51.0, -129.9, 71.5], utc_offset: -9, dst: true },
    BuiltinRegion { code: "NWCC", name: "Northwest Coordination Center", bounds: [-125.0, 41.9, -116.4, 49.1], utc_offset: -8, dst: true },
    BuiltinRegion { code: "ONCC", name: "Northern California Coordination Center", bounds: [-124.6, 37.0, -119.5, 42.1], utc_offset: -8, dst: true },
    BuiltinRegion { code: "OSCC", name: "Southern California Coordination Center", bounds: [-121.5, 32.4, -114.1, 38.6], utc_offset: -8, dst: true },
    BuiltinRegion { code: "GBCC", name: "Great Basin Coordination Center", bounds: [-120.1, 35.0, -107.5, 45.7], utc_offset: -7, dst: true },
    BuiltinRegion { code: "NRCC", name: "Northern Rockies Coordination Center", bounds: [-117.3, 43.8, -96.4, 49.1], utc_offset: -7, dst: true },
    BuiltinRegion { code: "RMCC", name: "Rocky Mountain Coordination Center", bounds: [-111.1, 36.9, -94.5, 46.0], utc_offset: -7, dst: true },
    BuiltinRegion { code: "SWCC", name: "Southwest Coordination Center", bounds: [-114.9, 31.2, -99.9, 37.1], utc_offset: -7, dst: false },
    BuiltinRegion { code: "SACC", name: "Southern Area Coordination Center", bounds: [-106.7, 24.4, -75.2, 39.5], utc_offset: -6, dst: true },
    BuiltinRegion { code: "EACC", name: "Eastern Area Coordination Center", bounds: [-97.3, 36.0, -66.8, 49.5], utc_offset: -5, dst: true },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_region_keys() {
        assert_eq!("ca".parse::<RegionKey>().unwrap(), RegionKey::State("CA".into()));
        assert_eq!("OSCC".parse::<RegionKey>().unwrap(), RegionKey::Gacc("OSCC".into()));
        assert_eq!("conus".parse::<RegionKey>().unwrap(), RegionKey::Conus);
        match "custom:-120,35,-110,42".parse::<RegionKey>().unwrap() {
            RegionKey::Custom(b) => assert_eq!(b.west, -120.0),
            other => panic!("expected custom, got {:?}", other),
        }
        assert!("custom:-110,35,-120,42".parse::<RegionKey>().is_err());
    }

    #[test]
    fn test_sector_selection() {
        assert_eq!(sector_for_extent(&BoundingBox::new(-124.6, 32.4, -114.1, 42.1)), "pacswest");
        assert_eq!(sector_for_extent(&BoundingBox::new(-124.8, 45.5, -116.9, 49.1)), "pacnwest");
        // Straddles several sectors
        assert_eq!(sector_for_extent(&BoundingBox::new(-120.0, 30.0, -80.0, 45.0)), "conus");
    }

    #[test]
    fn test_reference_system_parse() {
        assert_eq!(
            "States & Counties".parse::<ReferenceSystem>().unwrap(),
            ReferenceSystem::StatesAndCounties
        );
        assert_eq!("GACC Only".parse::<ReferenceSystem>().unwrap(), ReferenceSystem::GaccOnly);
        assert!("rivers".parse::<ReferenceSystem>().is_err());
    }
}
