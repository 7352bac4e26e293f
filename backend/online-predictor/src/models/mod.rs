// Domain models for online prediction

use serde::{Deserialize, Serialize};
use std::fmt;

/// One position of a feature vector as served by the online store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
}

impl FeatureValue {
    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Int(v) => Some(*v as f64),
            FeatureValue::Double(v) => Some(*v),
            FeatureValue::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            FeatureValue::Null | FeatureValue::String(_) => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Null => write!(f, "null"),
            FeatureValue::Bool(v) => write!(f, "{}", v),
            FeatureValue::Int(v) => write!(f, "{}", v),
            FeatureValue::Double(v) => write!(f, "{}", v),
            FeatureValue::String(v) => write!(f, "{}", v),
        }
    }
}

/// Column declared by a feature view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDescriptor {
    pub name: String,
    #[serde(default, rename = "type")]
    pub feature_type: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub label: bool,
}

/// Ordered schema of a feature view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureViewSchema {
    pub features: Vec<FeatureDescriptor>,
}

impl FeatureViewSchema {
    pub fn new(features: Vec<FeatureDescriptor>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }
}

/// A single model output value
///
/// Classifiers emit integer labels, regressors and probability heads emit floats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prediction {
    Label(i64),
    Score(f64),
}

/// Body of `POST /v1/predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    /// `inputs[0]` is the entity key, remaining positions are ignored
    pub inputs: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predictions: Vec<Prediction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_value_untagged_decoding() {
        let values: Vec<FeatureValue> =
            serde_json::from_str(r#"[111, 0, 4.5, "grocery", null, true]"#).unwrap();

        assert_eq!(
            values,
            vec![
                FeatureValue::Int(111),
                FeatureValue::Int(0),
                FeatureValue::Double(4.5),
                FeatureValue::String("grocery".to_string()),
                FeatureValue::Null,
                FeatureValue::Bool(true),
            ]
        );
    }

    #[test]
    fn test_feature_value_as_f64() {
        assert_eq!(FeatureValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(FeatureValue::Bool(true).as_f64(), Some(1.0));
        assert_eq!(FeatureValue::String("grocery".into()).as_f64(), None);
        assert_eq!(FeatureValue::Null.as_f64(), None);
    }

    #[test]
    fn test_predictions_serialize_as_plain_list() {
        let response = PredictResponse {
            predictions: vec![Prediction::Label(0), Prediction::Score(0.25)],
        };

        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"predictions":[0,0.25]}"#
        );
    }

    #[test]
    fn test_schema_lookup() {
        let schema = FeatureViewSchema::new(vec![
            FeatureDescriptor {
                name: "cc_num".to_string(),
                feature_type: "bigint".to_string(),
                primary: true,
                label: false,
            },
            FeatureDescriptor {
                name: "amount".to_string(),
                feature_type: "double".to_string(),
                primary: false,
                label: false,
            },
        ]);

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.position("amount"), Some(1));
        assert_eq!(schema.position("category"), None);
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["cc_num", "amount"]);
    }
}
