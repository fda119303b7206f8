//! Parcel filter criteria.
//!
//! Each dimension is independently optional and the dimensions compose with
//! logical AND. The individual comparisons preserve the observed upstream
//! behavior exactly, including the either-qualifies `max_value` policy — see
//! DESIGN.md before "fixing" it.

use serde::{Deserialize, Serialize};

use crate::parcel::Parcel;

/// Optional value/size/age criteria applied on top of a (county, state)
/// query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParcelFilter {
  /// Matches if EITHER assessed_value OR taxable_value is at or below this
  /// threshold.
  pub max_value: Option<f64>,
  pub min_sqft:  Option<f64>,
  pub max_sqft:  Option<f64>,
  pub year_min:  Option<i32>,
}

impl ParcelFilter {
  /// True when every present dimension accepts `parcel`.
  pub fn matches(&self, parcel: &Parcel) -> bool {
    if let Some(max_value) = self.max_value {
      let assessed_ok = parcel.assessed_value.is_some_and(|v| v <= max_value);
      let taxable_ok = parcel.taxable_value.is_some_and(|v| v <= max_value);
      if !(assessed_ok || taxable_ok) {
        return false;
      }
    }

    // Missing square footage counts as 0 for both bounds.
    let sqft = parcel.building_sqft.unwrap_or(0.0);
    if let Some(min_sqft) = self.min_sqft
      && sqft < min_sqft
    {
      return false;
    }
    if let Some(max_sqft) = self.max_sqft
      && sqft > max_sqft
    {
      return false;
    }

    if let Some(year_min) = self.year_min
      && parcel.year_built.unwrap_or(0) < year_min
    {
      return false;
    }

    true
  }
}
