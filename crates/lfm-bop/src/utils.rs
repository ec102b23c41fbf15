use crate::types::{BopEntry, CarModelId};

/// Post-extraction filtering and pagination of the entry list.
#[derive(Debug, Default)]
pub struct BopFilter {
    pub track: Option<String>,
    pub car_model: Option<CarModelId>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl BopFilter {
    pub fn apply(self, mut entries: Vec<BopEntry>) -> Vec<BopEntry> {
        if let Some(track) = self.track {
            entries.retain(|e| e.track == track);
        }
        if let Some(car) = self.car_model {
            entries.retain(|e| e.car_model == car);
        }
        if let Some(off) = self.offset {
            entries = entries.into_iter().skip(off).collect();
        }
        if let Some(lim) = self.limit {
            entries.truncate(lim);
        }
        entries
    }

    pub fn validate(self) -> Result<Self, String> {
        if self.offset.is_some_and(|o| o == 0) {
            return Err("Offset must be greater than 0".to_string());
        }
        if self.limit.is_some_and(|l| l == 0) {
            return Err("Limit must be greater than 0".to_string());
        }
        Ok(self)
    }
}

/// Per-class entry counts for one scrape run.
#[derive(Debug)]
pub struct BopStats {
    pub gt3: usize,
    pub gt4: usize,
    pub total: usize,
}

impl BopStats {
    pub fn from_class_runs(gt3: &[BopEntry], gt4: &[BopEntry]) -> BopStats {
        BopStats {
            gt3: gt3.len(),
            gt4: gt4.len(),
            total: gt3.len() + gt4.len(),
        }
    }
}

impl std::fmt::Display for BopStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nStatistics:")?;
        writeln!(f, "  GT3 entries: {}", self.gt3)?;
        writeln!(f, "  GT4 entries: {}", self.gt4)?;
        writeln!(f, "  Total:       {}", self.total)
    }
}
