use crate::config::ClusteringConfig;
use crate::pipeline::{Assignment, Feature, PipelineError, PipelineResult, Row};

/// Groups features into physical rows by vertical proximity.
///
/// Features are stably sorted by `y` and scanned once. A feature joins the
/// current row when its `y` is within `row_tolerance` of the row's most
/// recently added member. The comparison is chained, so a row may span more
/// than the tolerance when its members drift gradually.
#[derive(Debug, Clone)]
pub struct RowClusterer {
    tolerance: i32,
}

impl Default for RowClusterer {
    fn default() -> Self {
        Self::new(&ClusteringConfig::default())
    }
}

impl RowClusterer {
    pub fn new(config: &ClusteringConfig) -> Self {
        Self {
            tolerance: config.row_tolerance,
        }
    }

    pub fn with_tolerance(tolerance: i32) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> i32 {
        self.tolerance
    }

    /// Partition `features` into rows numbered from 1 in ascending `y`.
    pub fn group_rows(&self, features: &[Feature]) -> PipelineResult<Vec<Row>> {
        if features.is_empty() {
            return Err(PipelineError::EmptyFeatureSet);
        }

        let mut sorted = features.to_vec();
        sorted.sort_by_key(|f| f.y);

        let mut groups: Vec<Vec<Feature>> = Vec::new();
        let mut current: Vec<Feature> = Vec::new();

        for feature in sorted {
            let breaks_row = current
                .last()
                .map_or(false, |last| (feature.y as i64 - last.y as i64).abs() > self.tolerance as i64);
            if breaks_row {
                groups.push(std::mem::take(&mut current));
            }
            current.push(feature);
        }
        groups.push(current);

        let rows: Vec<Row> = groups
            .into_iter()
            .enumerate()
            .map(|(i, features)| Row {
                index: i as u32 + 1,
                features,
            })
            .collect();

        for row in &rows {
            if row.vertical_span() > self.tolerance as i64 {
                tracing::debug!(
                    row = row.index,
                    span = row.vertical_span(),
                    tolerance = self.tolerance,
                    "Row spans more than the tolerance through chained neighbours"
                );
            }
        }
        tracing::debug!(features = features.len(), rows = rows.len(), "Rows grouped");

        Ok(rows)
    }

    /// Number every feature as (row, tube), row-major and tube-minor.
    ///
    /// Tubes are numbered in the order they joined their row, which is
    /// ascending `y`, not left to right.
    pub fn assign(&self, features: &[Feature]) -> PipelineResult<Vec<Assignment>> {
        let rows = self.group_rows(features)?;
        Ok(assignments_from_rows(&rows))
    }
}

/// Flatten rows into (row, tube) assignments.
pub fn assignments_from_rows(rows: &[Row]) -> Vec<Assignment> {
    rows.iter()
        .flat_map(|row| {
            row.features
                .iter()
                .enumerate()
                .map(move |(i, feature)| Assignment {
                    row: row.index,
                    tube: i as u32 + 1,
                    feature: *feature,
                })
        })
        .collect()
}
