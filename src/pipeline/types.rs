use serde::{Deserialize, Serialize};

/// One tube cross-section: integer pixel center plus radius.
///
/// Features carry no identity beyond their values; two features with the same
/// center and radius are interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Feature {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
}

impl Feature {
    /// Radius is clamped to at least one pixel.
    pub fn new(x: i32, y: i32, radius: i32) -> Self {
        Self {
            x,
            y,
            radius: radius.max(1),
        }
    }

    /// Euclidean distance from this feature's center to `(x, y)`.
    pub fn distance_to(&self, x: i32, y: i32) -> f64 {
        let dx = x as f64 - self.x as f64;
        let dy = y as f64 - self.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Ordered, mutable collection of accepted features.
///
/// Order carries no meaning before clustering but decides which feature a
/// removal picks when several lie within reach of the pointer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    features: Vec<Feature>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    /// Removes the first feature (in set order) whose center lies closer to
    /// `(x, y)` than its radius plus `tolerance`.
    pub fn remove_first_within(&mut self, x: i32, y: i32, tolerance: f64) -> Option<Feature> {
        let index = self
            .features
            .iter()
            .position(|f| f.distance_to(x, y) < f.radius as f64 + tolerance)?;
        Some(self.features.remove(index))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    pub fn as_slice(&self) -> &[Feature] {
        &self.features
    }

    pub fn into_vec(self) -> Vec<Feature> {
        self.features
    }
}

impl From<Vec<Feature>> for FeatureSet {
    fn from(features: Vec<Feature>) -> Self {
        Self { features }
    }
}

impl<'a> IntoIterator for &'a FeatureSet {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

/// Features judged to share one physical row, in accumulation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// 1-based row number.
    pub index: u32,
    pub features: Vec<Feature>,
}

impl Row {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Vertical extent covered by the row's members.
    pub fn vertical_span(&self) -> i64 {
        let min = self.features.iter().map(|f| f.y).min().unwrap_or(0);
        let max = self.features.iter().map(|f| f.y).max().unwrap_or(0);
        max as i64 - min as i64
    }
}

/// Final (row, tube) numbering attached to a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub row: u32,
    pub tube: u32,
    pub feature: Feature,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_is_clamped_positive() {
        assert_eq!(Feature::new(1, 2, 0).radius, 1);
        assert_eq!(Feature::new(1, 2, -4).radius, 1);
        assert_eq!(Feature::new(1, 2, 4).radius, 4);
    }

    #[test]
    fn test_remove_first_within_prefers_set_order() {
        let mut set = FeatureSet::from(vec![
            Feature::new(20, 20, 5),
            Feature::new(10, 10, 5),
            Feature::new(11, 10, 5),
        ]);

        // (10, 10) is exactly on the second feature, but the first one is
        // still within 5 + 10 px and comes first.
        let removed = set.remove_first_within(10, 10, 10.0);
        assert_eq!(removed, Some(Feature::new(20, 20, 5)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_remove_boundary_is_exclusive() {
        let mut set = FeatureSet::from(vec![Feature::new(0, 0, 5)]);
        assert!(set.remove_first_within(15, 0, 10.0).is_none());
        assert!(set.remove_first_within(14, 0, 10.0).is_some());
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_at_extreme_coordinates_is_noop() {
        let mut set = FeatureSet::from(vec![Feature::new(10, 10, 5), Feature::new(i32::MAX, i32::MIN, 5)]);
        let before = set.clone();

        assert!(set.remove_first_within(i32::MIN, 0, 10.0).is_none());
        assert!(set.remove_first_within(0, i32::MAX, 10.0).is_none());
        assert_eq!(set, before);

        assert_eq!(
            set.remove_first_within(i32::MAX, i32::MIN, 10.0),
            Some(Feature::new(i32::MAX, i32::MIN, 5))
        );
    }

    #[test]
    fn test_row_vertical_span() {
        let row = Row {
            index: 1,
            features: vec![Feature::new(0, 10, 4), Feature::new(5, 26, 4), Feature::new(9, 18, 4)],
        };
        assert_eq!(row.vertical_span(), 16);
        assert_eq!(row.len(), 3);

        let tall = Row {
            index: 1,
            features: vec![Feature::new(0, i32::MIN, 4), Feature::new(0, i32::MAX, 4)],
        };
        assert_eq!(tall.vertical_span(), u32::MAX as i64);
    }
}
