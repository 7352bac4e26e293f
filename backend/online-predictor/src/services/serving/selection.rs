use crate::error::{PredictorError, Result};
use crate::models::FeatureViewSchema;

/// Positions of a feature vector that never reach the model
///
/// Resolved once from column names against the feature view schema, then
/// applied positionally to every served vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    width: usize,
    dropped: Vec<usize>,
}

impl ColumnSelection {
    pub fn exclude(schema: &FeatureViewSchema, columns: &[String]) -> Result<Self> {
        let mut dropped = Vec::with_capacity(columns.len());
        for column in columns {
            let position = schema.position(column).ok_or_else(|| {
                PredictorError::Schema(format!(
                    "excluded column '{}' is not served by the feature view (columns: {:?})",
                    column,
                    schema.names().collect::<Vec<_>>()
                ))
            })?;
            dropped.push(position);
        }
        dropped.sort_unstable();
        dropped.dedup();

        if dropped.len() >= schema.len() {
            return Err(PredictorError::Schema(
                "every feature view column is excluded, nothing is left for the model".to_string(),
            ));
        }

        Ok(Self {
            width: schema.len(),
            dropped,
        })
    }

    pub fn dropped(&self) -> &[usize] {
        &self.dropped
    }

    pub fn retained_width(&self) -> usize {
        self.width - self.dropped.len()
    }

    pub fn retained_names(&self, schema: &FeatureViewSchema) -> Vec<String> {
        schema
            .features
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.dropped.contains(i))
            .map(|(_, f)| f.name.clone())
            .collect()
    }

    /// Strip the dropped positions from a served vector
    pub fn apply<T>(&self, vector: Vec<T>) -> Result<Vec<T>> {
        if vector.len() != self.width {
            return Err(PredictorError::FeatureVectorShape {
                expected: self.width,
                actual: vector.len(),
            });
        }
        drop_positions(vector, &self.dropped)
    }
}

/// Remove `positions` from `values`, keeping the relative order of the rest
///
/// Out-of-range positions are an error rather than a no-op.
pub fn drop_positions<T>(values: Vec<T>, positions: &[usize]) -> Result<Vec<T>> {
    if let Some(&out_of_range) = positions.iter().find(|&&p| p >= values.len()) {
        return Err(PredictorError::FeatureVectorShape {
            expected: out_of_range + 1,
            actual: values.len(),
        });
    }

    Ok(values
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !positions.contains(i))
        .map(|(_, v)| v)
        .collect())
}
