//! Elevation shaping: seed regions, land sculpting and erosion.

pub mod erosion;
pub mod regions;
pub mod sculpt;

pub use erosion::{erode_land, is_erodible, ErosionOutcome};
pub use regions::{create_regions, MapRegion};
pub use sculpt::{create_land, LandOutcome, LAND_GUARD};
