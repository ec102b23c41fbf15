use std::collections::HashMap;

use crate::resolver::normalize_name;
use crate::types::CarModelId;

/// Shipped car catalog. Keys are the canonical normalized names; order is
/// significant because fuzzy resolution tests entries in definition order
/// and the first qualifying entry wins.
const CAR_CATALOG: &[(&str, CarModelId)] = &[
    ("audi r8 lms gt3 evo ii", 31),
    ("amr v8 vantage", 20),
    ("bmw m4 gt3", 30),
    ("ferrari 296 gt3", 32),
    ("honda nsx gt3 evo", 21),
    ("lamborghini huracan gt3 evo 2", 33),
    ("mclaren 720s gt3 evo", 35),
    ("mercedes amg gt3", 25),
    ("porsche 992 gt3 r", 34),
    ("ford mustang gt3", 36),
    ("bentley continental", 8),
    ("nissan gtr nismo gt3", 6),
    ("alpine a110 gt4", 50),
    ("aston martin vantage gt4", 51),
    ("audi r8 lms gt4", 52),
    ("bmw m4 gt4", 53),
    ("chevrolet camaro gt4", 55),
    ("ginetta g55 gt4", 56),
    ("ktm x bow gt4", 57),
    ("maserati mc gt4", 58),
    ("mclaren 570s gt4", 59),
    ("mercedes amg gt4", 60),
    ("porsche 718 cayman gt4 clubsport", 61),
];

/// Shipped track catalog: display names as rendered in the BoP page
/// headings, mapped to the simulator's track slugs.
const TRACK_CATALOG: &[(&str, &str)] = &[
    ("Autodromo Enzo e Dino Ferrari", "imola"),
    ("Autodromo Nazionale di Monza", "monza"),
    ("Brands Hatch Circuit", "brands_hatch"),
    ("Circuit de Catalunya", "barcelona"),
    ("Circuit de Paul Ricard", "paul_ricard"),
    ("Circuit de Spa Francorchamps", "spa"),
    ("Circuit Of The Americas", "cota"),
    ("Circuit Ricardo Tormo", "valencia"),
    ("Donington Park", "donington"),
    ("Hungaroring", "hungaroring"),
    ("Indianapolis", "indianapolis"),
    ("Kyalami", "kyalami"),
    ("Laguna Seca", "laguna_seca"),
    ("Misano", "misano"),
    ("Mount Panorama Circuit", "mount_panorama"),
    ("Nürburgring", "nurburgring"),
    ("Nürburgring Nordschleife 24h", "nurburgring_24h"),
    ("Oulton Park", "oulton_park"),
    ("Silverstone", "silverstone"),
    ("Snetterton", "snetterton"),
    ("Spielberg - Red Bull Ring", "red_bull_ring"),
    ("Suzuka Circuit", "suzuka"),
    ("Watkins Glen", "watkins_glen"),
    ("Zandvoort", "zandvoort"),
    ("Zolder", "zolder"),
];

/// Immutable car-name catalog. Exact lookups go through a map; fuzzy
/// resolution iterates entries in definition order.
#[derive(Debug, Clone)]
pub struct CarCatalog {
    order: Vec<(String, CarModelId)>,
    by_name: HashMap<String, CarModelId>,
}

impl CarCatalog {
    /// Builds a catalog from `(name, id)` pairs, preserving order. Names
    /// are normalized on construction, so callers may pass display names.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, CarModelId)>,
        S: AsRef<str>,
    {
        let order: Vec<(String, CarModelId)> = entries
            .into_iter()
            .map(|(name, id)| (normalize_name(name.as_ref()), id))
            .collect();
        let by_name = order.iter().cloned().collect();
        CarCatalog { order, by_name }
    }

    pub fn builtin() -> Self {
        Self::new(CAR_CATALOG.iter().copied())
    }

    /// Exact lookup of an already-normalized name.
    pub fn get(&self, normalized: &str) -> Option<CarModelId> {
        self.by_name.get(normalized).copied()
    }

    /// Entries in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, CarModelId)> {
        self.order.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Immutable track catalog. Exact display-name match only; there is no
/// fuzzy fallback for tracks.
#[derive(Debug, Clone)]
pub struct TrackCatalog {
    by_name: HashMap<String, String>,
}

impl TrackCatalog {
    pub fn new<I, S, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        TrackCatalog {
            by_name: entries
                .into_iter()
                .map(|(name, slug)| (name.into(), slug.into()))
                .collect(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(TRACK_CATALOG.iter().copied())
    }

    pub fn slug(&self, display_name: &str) -> Option<&str> {
        self.by_name.get(display_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
