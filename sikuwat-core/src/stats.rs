//! Planting statistics for the farmer and admin dashboards

use serde::Serialize;

/// Harvest figures of one planting record
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HarvestFigures {
    pub harvest_yield: Option<f64>,
    pub sales_amount: Option<f64>,
}

impl HarvestFigures {
    /// A planting counts as harvested once it has a positive yield
    pub fn is_harvested(&self) -> bool {
        self.harvest_yield.is_some_and(|y| y > 0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlantingStats {
    pub total_plantings: usize,
    pub total_harvested: usize,
    pub total_yield: f64,
    pub total_revenue: f64,
    pub avg_yield: f64,
    /// Harvested share of all plantings, in percent
    pub success_rate: f64,
}

impl PlantingStats {
    pub fn from_figures<I>(figures: I) -> Self
    where
        I: IntoIterator<Item = HarvestFigures>,
    {
        let mut total_plantings = 0usize;
        let mut total_harvested = 0usize;
        let mut total_yield = 0.0;
        let mut total_revenue = 0.0;

        for f in figures {
            total_plantings += 1;
            if f.is_harvested() {
                total_harvested += 1;
                total_yield += f.harvest_yield.unwrap_or_default();
                total_revenue += f.sales_amount.unwrap_or_default();
            }
        }

        let avg_yield = if total_harvested > 0 {
            total_yield / total_harvested as f64
        } else {
            0.0
        };
        let success_rate = if total_plantings > 0 {
            total_harvested as f64 / total_plantings as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total_plantings,
            total_harvested,
            total_yield: round2(total_yield),
            total_revenue: round2(total_revenue),
            avg_yield: round2(avg_yield),
            success_rate: round2(success_rate),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
