use glam::Vec3;
use serde::Deserialize;

use crate::error::TerrainError;
use crate::mesh::Mesh;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ColorBand {
    pub name: String,
    pub color: (f32, f32, f32),
    /// Select this band if height < height_lt.
    pub height_lt: f32,
}

/// Height-ordered vertex colour bands.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ColorBands {
    pub bands: Vec<ColorBand>,
}

impl Default for ColorBands {
    fn default() -> Self {
        let band = |name: &str, color, height_lt| ColorBand {
            name: name.to_string(),
            color,
            height_lt,
        };
        Self {
            bands: vec![
                band("water", (0.0, 0.0, 0.5), 0.0),
                band("sand", (0.76, 0.7, 0.5), 2.0),
                band("grass", (0.2, 0.6, 0.2), 5.0),
                band("rock", (0.5, 0.5, 0.5), 8.0),
                band("snow", (1.0, 1.0, 1.0), f32::MAX),
            ],
        }
    }
}

impl ColorBands {
    pub fn validate(&self) -> Result<(), TerrainError> {
        if self.bands.is_empty() {
            return Err(TerrainError::InvalidColorBands(
                "at least one colour band is required".to_string(),
            ));
        }

        let mut last = f32::NEG_INFINITY;
        for b in &self.bands {
            if !b.height_lt.is_finite() {
                return Err(TerrainError::InvalidColorBands(format!(
                    "band '{}' has non-finite height_lt",
                    b.name
                )));
            }
            if b.height_lt <= last {
                return Err(TerrainError::InvalidColorBands(format!(
                    "band '{}' has height_lt={} but previous band had height_lt={} (must be strictly increasing)",
                    b.name, b.height_lt, last
                )));
            }
            last = b.height_lt;
        }

        Ok(())
    }

    pub fn pick(&self, height: f32) -> Option<&ColorBand> {
        self.bands
            .iter()
            .find(|b| height < b.height_lt)
            .or_else(|| self.bands.last())
    }

    pub fn apply(&self, mesh: &mut Mesh) {
        for v in &mut mesh.vertices {
            if let Some(band) = self.pick(v.position.y) {
                let (r, g, b) = band.color;
                v.color = Vec3::new(r, g, b);
            }
        }
    }
}
