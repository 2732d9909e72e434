//! Random-forest inference.
//!
//! [`ForestClassifier`] evaluates a forest exported as JSON in the
//! flattened-array encoding most training stacks emit: per tree, parallel
//! arrays `children_left` / `children_right` / `feature` / `threshold`
//! plus per-node class counts. A node with a negative left child is a
//! leaf; internal nodes route left when `value <= threshold`.
//!
//! Structural validation happens once at load time so inference can walk
//! arrays without per-step bounds churn: every internal node must point at
//! children later in the array (guaranteeing termination) and reference an
//! in-range feature.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::scaler::StandardScaler;
use crate::{FEATURE_COUNT, ModelError, RiskClassifier, RiskLabel};

/// One decision tree in flattened-array encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Left child index per node; negative marks a leaf.
    pub children_left: Vec<i64>,
    /// Right child index per node; negative marks a leaf.
    pub children_right: Vec<i64>,
    /// Feature index tested at each internal node.
    pub feature: Vec<i64>,
    /// Split threshold per internal node.
    pub threshold: Vec<f64>,
    /// Per-node class counts, `[class0, class1]`.
    pub value: Vec<[f64; 2]>,
}

impl DecisionTree {
    fn len(&self) -> usize {
        self.children_left.len()
    }

    /// Check the parallel arrays agree and every internal node routes
    /// forward to an in-range child.
    fn validate(&self, index: usize, n_features: usize) -> Result<(), ModelError> {
        let n = self.len();
        if n == 0 {
            return Err(ModelError::Inconsistent(format!("tree {index} is empty")));
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|len| *len != n)
        {
            return Err(ModelError::Inconsistent(format!(
                "tree {index} has mismatched node arrays"
            )));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left < 0 {
                continue; // leaf
            }
            let feature = self.feature[node];
            let in_range = |child: i64| child > node as i64 && (child as usize) < n;
            if !in_range(left) || !in_range(right) {
                return Err(ModelError::Inconsistent(format!(
                    "tree {index} node {node} points at an invalid child"
                )));
            }
            if feature < 0 || feature as usize >= n_features {
                return Err(ModelError::Inconsistent(format!(
                    "tree {index} node {node} tests out-of-range feature {feature}"
                )));
            }
        }
        Ok(())
    }

    /// Walk the tree and return the winning class (0 or 1) at the leaf.
    ///
    /// Indices were range-checked at load; child indices strictly increase,
    /// so the walk terminates.
    fn predict(&self, features: &[f64]) -> usize {
        let mut node = 0usize;
        loop {
            let left = self.children_left[node];
            if left < 0 {
                let [class0, class1] = self.value[node];
                return usize::from(class1 > class0);
            }
            node = if features[self.feature[node] as usize] <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }
}

/// On-disk shape of the forest artifact.
#[derive(Debug, Deserialize)]
struct ForestArtifact {
    n_features: usize,
    trees: Vec<DecisionTree>,
}

/// Random-forest risk classifier with its paired feature scaler.
#[derive(Debug)]
pub struct ForestClassifier {
    scaler: StandardScaler,
    trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    /// Load and validate the forest and scaler artifacts.
    ///
    /// # Errors
    ///
    /// [`ModelError::Io`] when either file cannot be read,
    /// [`ModelError::Malformed`] when it is not the expected JSON shape,
    /// [`ModelError::Inconsistent`] when the parsed contents disagree with
    /// each other. Callers treat any of these as fatal at startup.
    pub fn load(forest_path: &Path, scaler_path: &Path) -> Result<Self, ModelError> {
        let artifact: ForestArtifact = read_json(forest_path)?;
        let scaler: StandardScaler = read_json(scaler_path)?;

        if artifact.n_features != FEATURE_COUNT {
            return Err(ModelError::Inconsistent(format!(
                "forest was trained on {} features, expected {FEATURE_COUNT}",
                artifact.n_features
            )));
        }
        if artifact.trees.is_empty() {
            return Err(ModelError::Inconsistent("forest has no trees".to_string()));
        }
        for (index, tree) in artifact.trees.iter().enumerate() {
            tree.validate(index, artifact.n_features)?;
        }
        scaler.validate(artifact.n_features)?;

        info!(
            trees = artifact.trees.len(),
            forest = %forest_path.display(),
            "risk model loaded"
        );
        Ok(Self {
            scaler,
            trees: artifact.trees,
        })
    }

    /// Build a classifier from already-validated parts. Test seam.
    #[cfg(test)]
    pub(crate) fn from_parts(scaler: StandardScaler, trees: Vec<DecisionTree>) -> Self {
        Self { scaler, trees }
    }
}

impl RiskClassifier for ForestClassifier {
    fn classify(&self, features: [f64; FEATURE_COUNT]) -> Result<RiskLabel, ModelError> {
        let scaled = self.scaler.transform(&features)?;
        let risk_votes = self
            .trees
            .iter()
            .filter(|tree| tree.predict(&scaled) == 1)
            .count();

        // Strict majority; a split forest stays nominal.
        Ok(if 2 * risk_votes > self.trees.len() {
            RiskLabel::Risk
        } else {
            RiskLabel::Nominal
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let raw = fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ModelError::Malformed {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Identity scaler for three features.
    fn identity_scaler() -> StandardScaler {
        StandardScaler {
            mean: vec![0.0, 0.0, 0.0],
            scale: vec![1.0, 1.0, 1.0],
        }
    }

    /// A stump voting Risk when `features[feature] > threshold`.
    fn stump(feature: i64, threshold: f64) -> DecisionTree {
        DecisionTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![feature, -2, -2],
            threshold: vec![threshold, 0.0, 0.0],
            value: vec![[0.0, 0.0], [10.0, 0.0], [0.0, 10.0]],
        }
    }

    /// A single leaf that always votes the given class.
    fn constant_tree(class1: bool) -> DecisionTree {
        let value = if class1 { [0.0, 1.0] } else { [1.0, 0.0] };
        DecisionTree {
            children_left: vec![-1],
            children_right: vec![-1],
            feature: vec![-2],
            threshold: vec![0.0],
            value: vec![value],
        }
    }

    #[test]
    fn stump_routes_on_threshold() {
        let tree = stump(0, 30.0);
        assert_eq!(tree.predict(&[25.0, 0.0, 0.0]), 0);
        assert_eq!(tree.predict(&[30.0, 0.0, 0.0]), 0); // <= goes left
        assert_eq!(tree.predict(&[31.0, 0.0, 0.0]), 1);
    }

    #[test]
    fn forest_takes_strict_majority() {
        let forest = ForestClassifier::from_parts(
            identity_scaler(),
            vec![constant_tree(true), constant_tree(true), constant_tree(false)],
        );
        assert_eq!(
            forest.classify([0.0, 0.0, 0.0]).unwrap(),
            RiskLabel::Risk
        );

        let split = ForestClassifier::from_parts(
            identity_scaler(),
            vec![constant_tree(true), constant_tree(false)],
        );
        assert_eq!(
            split.classify([0.0, 0.0, 0.0]).unwrap(),
            RiskLabel::Nominal
        );
    }

    #[test]
    fn scaling_is_applied_before_the_walk() {
        // Threshold 0 on feature 0; scaler shifts 50 → 0, so 50 goes left.
        let scaler = StandardScaler {
            mean: vec![50.0, 0.0, 0.0],
            scale: vec![1.0, 1.0, 1.0],
        };
        let forest = ForestClassifier::from_parts(scaler, vec![stump(0, 0.0)]);
        assert_eq!(
            forest.classify([50.0, 0.0, 0.0]).unwrap(),
            RiskLabel::Nominal
        );
        assert_eq!(
            forest.classify([51.0, 0.0, 0.0]).unwrap(),
            RiskLabel::Risk
        );
    }

    #[test]
    fn validate_rejects_mismatched_arrays() {
        let mut tree = stump(0, 1.0);
        tree.threshold.pop();
        assert!(tree.validate(0, 3).is_err());
    }

    #[test]
    fn validate_rejects_backward_children() {
        let mut tree = stump(0, 1.0);
        tree.children_left[0] = 0; // self-loop
        assert!(tree.validate(0, 3).is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_feature() {
        let tree = stump(7, 1.0);
        assert!(tree.validate(0, 3).is_err());
    }

    #[test]
    fn load_fails_on_missing_artifacts() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let err = ForestClassifier::load(
            &dir.path().join("forest.json"),
            &dir.path().join("scaler.json"),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
    }

    #[test]
    fn load_fails_on_malformed_json() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let forest_path = dir.path().join("forest.json");
        let scaler_path = dir.path().join("scaler.json");
        std::fs::write(&forest_path, "{not json").expect("write");
        std::fs::write(&scaler_path, "{}").expect("write");

        let err = ForestClassifier::load(&forest_path, &scaler_path).unwrap_err();
        assert!(matches!(err, ModelError::Malformed { .. }));
    }

    #[test]
    fn load_round_trips_well_formed_artifacts() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let forest_path = dir.path().join("forest.json");
        let scaler_path = dir.path().join("scaler.json");

        let artifact = serde_json::json!({
            "n_features": 3,
            "trees": [stump(0, 30.0), constant_tree(false)],
        });
        std::fs::write(&forest_path, artifact.to_string()).expect("write");
        std::fs::write(
            &scaler_path,
            serde_json::to_string(&identity_scaler()).expect("serialize"),
        )
        .expect("write");

        let forest = ForestClassifier::load(&forest_path, &scaler_path).expect("load");
        // One risk vote out of two trees is not a strict majority.
        assert_eq!(
            forest.classify([100.0, 0.0, 0.0]).unwrap(),
            RiskLabel::Nominal
        );
    }

    #[test]
    fn load_rejects_empty_forest() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let forest_path = dir.path().join("forest.json");
        let scaler_path = dir.path().join("scaler.json");
        std::fs::write(&forest_path, r#"{"n_features": 3, "trees": []}"#).expect("write");
        std::fs::write(
            &scaler_path,
            serde_json::to_string(&identity_scaler()).expect("serialize"),
        )
        .expect("write");

        let err = ForestClassifier::load(&forest_path, &scaler_path).unwrap_err();
        assert!(matches!(err, ModelError::Inconsistent(_)));
    }
}
