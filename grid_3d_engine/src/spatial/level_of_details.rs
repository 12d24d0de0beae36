/// Level-of-detail tiers and per-entity LOD mesh sets.

/// Detail tier assigned to a grid cell and forwarded to its occupants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DetailLevel {
    /// Not drawn (cell outside the view frustum)
    #[default]
    None,
    Low,
    Mid,
    High,
}

impl DetailLevel {
    pub fn label(self) -> &'static str {
        match self {
            DetailLevel::None => "NONE",
            DetailLevel::Low => "LOW",
            DetailLevel::Mid => "MID",
            DetailLevel::High => "HIGH",
        }
    }
}

/// Three meshes for one entity, one per visible tier.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelOfDetails {
    high: String,
    mid: String,
    low: String,
    level: DetailLevel,
}

impl LevelOfDetails {
    /// New set, starting at `DetailLevel::High`
    pub fn new(high: impl Into<String>, mid: impl Into<String>, low: impl Into<String>) -> Self {
        Self {
            high: high.into(),
            mid: mid.into(),
            low: low.into(),
            level: DetailLevel::High,
        }
    }

    pub fn detail_level(&self) -> DetailLevel {
        self.level
    }

    pub fn set_detail_level(&mut self, level: DetailLevel) {
        self.level = level;
    }

    /// Mesh for the current tier, `None` at `DetailLevel::None`
    pub fn mesh(&self) -> Option<&str> {
        self.mesh_for(self.level)
    }

    pub fn mesh_for(&self, level: DetailLevel) -> Option<&str> {
        match level {
            DetailLevel::None => None,
            DetailLevel::Low => Some(&self.low),
            DetailLevel::Mid => Some(&self.mid),
            DetailLevel::High => Some(&self.high),
        }
    }
}

#[cfg(test)]
#[path = "level_of_details_tests.rs"]
mod tests;
