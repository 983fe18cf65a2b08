// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Marker glyph selection.
//!
//! Maps an aircraft and its [`Category`] to the symbol drawn for it and the
//! rotation to apply. Pure table lookup.

use serde::{Deserialize, Serialize};

use crate::classify::Category;
use crate::feed::AircraftStateVector;

/// Marker descriptor for one aircraft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Glyph {
    pub symbol: String,
    /// Clockwise rotation in degrees, north = 0.
    pub rotation_degrees: f64,
}

/// Symbols used for each marker kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlyphTable {
    pub military: String,
    pub passenger: String,
    pub business_jet: String,
    pub cargo: String,
    pub general_aviation: String,
    /// Used for any aircraft reporting on-ground, regardless of category.
    pub on_ground: String,
    pub helicopter: String,
    /// Use the helicopter symbol when the feed's declared category says
    /// "Heli". Ground state still takes precedence.
    pub honor_declared_heli: bool,
}

impl Default for GlyphTable {
    fn default() -> Self {
        Self {
            military: "🛩️".to_string(),
            passenger: "✈️".to_string(),
            business_jet: "💼".to_string(),
            cargo: "📦".to_string(),
            general_aviation: "🛫".to_string(),
            on_ground: "🛬".to_string(),
            helicopter: "🚁".to_string(),
            honor_declared_heli: true,
        }
    }
}

impl GlyphTable {
    #[must_use]
    pub fn symbol_for(&self, category: Category) -> &str {
        match category {
            Category::Military => &self.military,
            Category::Passenger => &self.passenger,
            Category::BusinessJet => &self.business_jet,
            Category::Cargo => &self.cargo,
            Category::GeneralAviation => &self.general_aviation,
        }
    }

    /// Pick the marker for an aircraft of the given category.
    #[must_use]
    pub fn select(&self, vector: &AircraftStateVector, category: Category) -> Glyph {
        let symbol: &str = if vector.on_ground {
            &self.on_ground
        } else if self.honor_declared_heli && is_declared_heli(vector) {
            &self.helicopter
        } else {
            self.symbol_for(category)
        };

        Glyph {
            symbol: symbol.to_owned(),
            rotation_degrees: rotation(vector.heading),
        }
    }
}

/// Select a glyph using the default table.
#[must_use]
pub fn select_glyph(vector: &AircraftStateVector, category: Category) -> Glyph {
    GlyphTable::default().select(vector, category)
}

fn is_declared_heli(vector: &AircraftStateVector) -> bool {
    vector
        .declared_category
        .as_deref()
        .is_some_and(|c| c.to_ascii_lowercase().contains("heli"))
}

fn rotation(heading: Option<f64>) -> f64 {
    heading.filter(|h| h.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(heading: Option<f64>, on_ground: bool, declared: Option<&str>) -> AircraftStateVector {
        AircraftStateVector {
            id: Some("abc123".to_string()),
            heading,
            on_ground,
            declared_category: declared.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_category_symbols() {
        let table = GlyphTable::default();
        let v = vector(Some(90.0), false, None);
        for category in Category::ALL {
            let glyph = table.select(&v, category);
            assert_eq!(glyph.symbol, table.symbol_for(category));
            assert!((glyph.rotation_degrees - 90.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_ground_override() {
        let table = GlyphTable::default();
        let v = vector(Some(45.0), true, Some("Heli"));
        let glyph = table.select(&v, Category::Military);
        assert_eq!(glyph.symbol, table.on_ground);
        assert!((glyph.rotation_degrees - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_declared_heli_hint() {
        let table = GlyphTable::default();
        let v = vector(None, false, Some("Heli (Rotorcraft)"));
        assert_eq!(table.select(&v, Category::Passenger).symbol, table.helicopter);

        let ignoring = GlyphTable {
            honor_declared_heli: false,
            ..GlyphTable::default()
        };
        assert_eq!(ignoring.select(&v, Category::Passenger).symbol, ignoring.passenger);
    }

    #[test]
    fn test_missing_or_invalid_heading() {
        let table = GlyphTable::default();
        assert!(table.select(&vector(None, false, None), Category::Cargo).rotation_degrees.abs() < f64::EPSILON);
        assert!(table
            .select(&vector(Some(f64::NAN), false, None), Category::Cargo)
            .rotation_degrees
            .abs()
            < f64::EPSILON);
    }

    #[test]
    fn test_select_glyph_uses_default_table() {
        let v = vector(Some(10.0), false, None);
        assert_eq!(select_glyph(&v, Category::Cargo), GlyphTable::default().select(&v, Category::Cargo));
    }
}
