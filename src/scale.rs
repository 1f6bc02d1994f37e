use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discrete magnitude tiers the viewer can occupy, ordered smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleLevel {
    Subatomic,
    Atomic,
    Molecular,
    Cellular,
    Human,
    Planetary,
    Stellar,
    SolarSystem,
    Galactic,
    Universe,
}

impl ScaleLevel {
    pub const ALL: [ScaleLevel; 10] = [
        ScaleLevel::Subatomic,
        ScaleLevel::Atomic,
        ScaleLevel::Molecular,
        ScaleLevel::Cellular,
        ScaleLevel::Human,
        ScaleLevel::Planetary,
        ScaleLevel::Stellar,
        ScaleLevel::SolarSystem,
        ScaleLevel::Galactic,
        ScaleLevel::Universe,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self {
            ScaleLevel::Subatomic => "subatomic",
            ScaleLevel::Atomic => "atomic",
            ScaleLevel::Molecular => "molecular",
            ScaleLevel::Cellular => "cellular",
            ScaleLevel::Human => "human",
            ScaleLevel::Planetary => "planetary",
            ScaleLevel::Stellar => "stellar",
            ScaleLevel::SolarSystem => "solar_system",
            ScaleLevel::Galactic => "galactic",
            ScaleLevel::Universe => "universe",
        }
    }
}

impl fmt::Display for ScaleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ScaleLevel {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match ScaleLevel::ALL.iter().find(|level| level.key() == normalized) {
            Some(level) => Ok(*level),
            None => bail!("Unknown scale '{value}'. Expected one of: {}.", ScaleRegistry::key_list()),
        }
    }
}

/// Static metadata for one scale level.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleInfo {
    pub level: ScaleLevel,
    /// Base-10 exponent of the characteristic size in meters.
    pub magnitude: i32,
    pub default_camera_distance: f32,
    pub min_camera_distance: f32,
    pub max_camera_distance: f32,
    /// Coarser detail at higher values.
    pub lod_level: u32,
    pub enable_physics: bool,
    pub time_scale: f64,
    pub name: &'static str,
    pub description: &'static str,
    pub examples: &'static [&'static str],
}

impl ScaleInfo {
    pub fn typical_size_meters(&self) -> f64 {
        10f64.powi(self.magnitude)
    }

    /// Human readable size label such as `1 m`, `10 km` or `10^21 m`.
    pub fn size_label(&self) -> String {
        format_magnitude(self.magnitude)
    }

    pub fn clamp_camera_distance(&self, distance: f32) -> f32 {
        if !distance.is_finite() {
            return self.default_camera_distance;
        }
        distance.clamp(self.min_camera_distance, self.max_camera_distance)
    }
}

pub fn format_magnitude(magnitude: i32) -> String {
    match magnitude {
        -2 => "1 cm".to_string(),
        -3 => "1 mm".to_string(),
        -6 => "1 µm".to_string(),
        -9 => "1 nm".to_string(),
        0..=2 => format!("{} m", 10i64.pow(magnitude as u32)),
        3..=5 => format!("{} km", 10i64.pow((magnitude - 3) as u32)),
        m => format!("10^{m} m"),
    }
}

static SCALE_TABLE: [ScaleInfo; 10] = [
    ScaleInfo {
        level: ScaleLevel::Subatomic,
        magnitude: -15,
        default_camera_distance: 8.0,
        min_camera_distance: 2.0,
        max_camera_distance: 40.0,
        lod_level: 3,
        enable_physics: true,
        time_scale: 1e-21,
        name: "Subatomic",
        description: "Quarks and nucleons bound inside an atomic nucleus.",
        examples: &["proton", "neutron", "quark"],
    },
    ScaleInfo {
        level: ScaleLevel::Atomic,
        magnitude: -10,
        default_camera_distance: 12.0,
        min_camera_distance: 3.0,
        max_camera_distance: 60.0,
        lod_level: 2,
        enable_physics: true,
        time_scale: 1e-15,
        name: "Atomic",
        description: "Electron clouds orbiting a nucleus.",
        examples: &["hydrogen atom", "carbon atom"],
    },
    ScaleInfo {
        level: ScaleLevel::Molecular,
        magnitude: -8,
        default_camera_distance: 15.0,
        min_camera_distance: 4.0,
        max_camera_distance: 80.0,
        lod_level: 2,
        enable_physics: true,
        time_scale: 1e-12,
        name: "Molecular",
        description: "Bonded atoms forming proteins and strands of DNA.",
        examples: &["water molecule", "DNA helix", "hemoglobin"],
    },
    ScaleInfo {
        level: ScaleLevel::Cellular,
        magnitude: -5,
        default_camera_distance: 20.0,
        min_camera_distance: 5.0,
        max_camera_distance: 100.0,
        lod_level: 1,
        enable_physics: true,
        time_scale: 1e-3,
        name: "Cellular",
        description: "Living cells and their organelles.",
        examples: &["red blood cell", "bacterium", "neuron"],
    },
    ScaleInfo {
        level: ScaleLevel::Human,
        magnitude: 0,
        default_camera_distance: 10.0,
        min_camera_distance: 1.0,
        max_camera_distance: 50.0,
        lod_level: 0,
        enable_physics: true,
        time_scale: 1.0,
        name: "Human",
        description: "Everyday objects measured in meters.",
        examples: &["person", "tree", "car"],
    },
    ScaleInfo {
        level: ScaleLevel::Planetary,
        magnitude: 7,
        default_camera_distance: 30.0,
        min_camera_distance: 12.0,
        max_camera_distance: 150.0,
        lod_level: 1,
        enable_physics: true,
        time_scale: 3_600.0,
        name: "Planetary",
        description: "Planets and their moons.",
        examples: &["Earth", "Moon", "Jupiter"],
    },
    ScaleInfo {
        level: ScaleLevel::Stellar,
        magnitude: 9,
        default_camera_distance: 40.0,
        min_camera_distance: 15.0,
        max_camera_distance: 200.0,
        lod_level: 2,
        enable_physics: true,
        time_scale: 86_400.0,
        name: "Stellar",
        description: "Individual stars and their coronas.",
        examples: &["Sun", "Sirius", "red dwarf"],
    },
    ScaleInfo {
        level: ScaleLevel::SolarSystem,
        magnitude: 13,
        default_camera_distance: 60.0,
        min_camera_distance: 20.0,
        max_camera_distance: 300.0,
        lod_level: 2,
        enable_physics: true,
        time_scale: 2_592_000.0,
        name: "Solar System",
        description: "Planetary orbits around a single star.",
        examples: &["inner planets", "asteroid belt", "Kuiper belt"],
    },
    ScaleInfo {
        level: ScaleLevel::Galactic,
        magnitude: 21,
        default_camera_distance: 100.0,
        min_camera_distance: 30.0,
        max_camera_distance: 500.0,
        lod_level: 3,
        enable_physics: false,
        time_scale: 3.15e13,
        name: "Galactic",
        description: "Spiral arms made of hundreds of billions of stars.",
        examples: &["Milky Way", "Andromeda", "Magellanic Clouds"],
    },
    ScaleInfo {
        level: ScaleLevel::Universe,
        magnitude: 26,
        default_camera_distance: 150.0,
        min_camera_distance: 50.0,
        max_camera_distance: 800.0,
        lod_level: 4,
        enable_physics: false,
        time_scale: 3.15e16,
        name: "Observable Universe",
        description: "Galaxy filaments and voids of the cosmic web.",
        examples: &["Laniakea supercluster", "cosmic web", "CMB"],
    },
];

/// Neighbours of a level in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdjacentScales {
    pub smaller: Option<ScaleLevel>,
    pub larger: Option<ScaleLevel>,
}

/// Immutable, ordered table of every [`ScaleLevel`] and its metadata.
#[derive(Debug, Clone, Copy)]
pub struct ScaleRegistry {
    entries: &'static [ScaleInfo],
}

impl Default for ScaleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl ScaleRegistry {
    pub const fn standard() -> Self {
        Self { entries: &SCALE_TABLE }
    }

    pub fn lookup(&self, level: ScaleLevel) -> &'static ScaleInfo {
        &self.entries[level.index()]
    }

    pub fn levels(&self) -> impl Iterator<Item = ScaleLevel> + '_ {
        self.entries.iter().map(|info| info.level)
    }

    pub fn entries(&self) -> &'static [ScaleInfo] {
        self.entries
    }

    pub fn smallest(&self) -> ScaleLevel {
        ScaleLevel::ALL[0]
    }

    pub fn largest(&self) -> ScaleLevel {
        ScaleLevel::ALL[ScaleLevel::ALL.len() - 1]
    }

    pub fn adjacent(&self, level: ScaleLevel) -> AdjacentScales {
        let index = level.index();
        AdjacentScales {
            smaller: index.checked_sub(1).and_then(|i| self.entries.get(i)).map(|info| info.level),
            larger: self.entries.get(index + 1).map(|info| info.level),
        }
    }

    pub fn by_magnitude(&self, magnitude: i32) -> Option<ScaleLevel> {
        self.entries.iter().find(|info| info.magnitude == magnitude).map(|info| info.level)
    }

    /// Snaps an arbitrary exponent to the closest level. Ties go to the smaller level.
    pub fn nearest_to_magnitude(&self, magnitude: f64) -> Option<ScaleLevel> {
        if !magnitude.is_finite() {
            return None;
        }
        let mut best: Option<(&ScaleInfo, f64)> = None;
        for info in self.entries {
            let distance = (info.magnitude as f64 - magnitude).abs();
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((info, distance)),
            }
        }
        best.map(|(info, _)| info.level)
    }

    fn key_list() -> String {
        ScaleLevel::ALL.iter().map(|level| level.key()).collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_aligned_with_enum_order() {
        let registry = ScaleRegistry::standard();
        for level in ScaleLevel::ALL {
            assert_eq!(registry.lookup(level).level, level);
        }
        let magnitudes: Vec<i32> = registry.entries().iter().map(|info| info.magnitude).collect();
        assert!(magnitudes.windows(2).all(|pair| pair[0] < pair[1]), "magnitudes must ascend: {magnitudes:?}");
    }

    #[test]
    fn camera_bounds_contain_default_distance() {
        for info in ScaleRegistry::standard().entries() {
            assert!(info.min_camera_distance > 0.0);
            assert!(info.min_camera_distance <= info.default_camera_distance, "{}", info.level);
            assert!(info.default_camera_distance <= info.max_camera_distance, "{}", info.level);
        }
    }

    #[test]
    fn adjacent_has_absent_neighbour_at_the_ends() {
        let registry = ScaleRegistry::standard();
        assert_eq!(registry.adjacent(ScaleLevel::Subatomic).smaller, None);
        assert_eq!(registry.adjacent(ScaleLevel::Subatomic).larger, Some(ScaleLevel::Atomic));
        assert_eq!(registry.adjacent(ScaleLevel::Universe).larger, None);
        assert_eq!(
            registry.adjacent(ScaleLevel::Human),
            AdjacentScales { smaller: Some(ScaleLevel::Cellular), larger: Some(ScaleLevel::Planetary) }
        );
    }

    #[test]
    fn magnitude_lookup_is_exact() {
        let registry = ScaleRegistry::standard();
        assert_eq!(registry.by_magnitude(21), Some(ScaleLevel::Galactic));
        assert_eq!(registry.by_magnitude(0), Some(ScaleLevel::Human));
        assert_eq!(registry.by_magnitude(1), None);
    }

    #[test]
    fn nearest_magnitude_snaps_and_breaks_ties_downwards() {
        let registry = ScaleRegistry::standard();
        assert_eq!(registry.nearest_to_magnitude(6.2), Some(ScaleLevel::Planetary));
        assert_eq!(registry.nearest_to_magnitude(8.0), Some(ScaleLevel::Planetary));
        assert_eq!(registry.nearest_to_magnitude(-40.0), Some(ScaleLevel::Subatomic));
        assert_eq!(registry.nearest_to_magnitude(f64::NAN), None);
    }

    #[test]
    fn parses_keys_leniently() {
        assert_eq!("Solar System".parse::<ScaleLevel>().unwrap(), ScaleLevel::SolarSystem);
        assert_eq!("galactic".parse::<ScaleLevel>().unwrap(), ScaleLevel::Galactic);
        let err = "quasar".parse::<ScaleLevel>().unwrap_err();
        assert!(err.to_string().contains("Unknown scale"));
    }

    #[test]
    fn size_labels_read_naturally() {
        assert_eq!(format_magnitude(0), "1 m");
        assert_eq!(format_magnitude(4), "10 km");
        assert_eq!(format_magnitude(21), "10^21 m");
        assert_eq!(format_magnitude(-9), "1 nm");
    }
}
