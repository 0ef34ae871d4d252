//! Versioned mapping from model classes to emotion categories
//!
//! A model trained on integer targets only knows positions. The table pins
//! which category each position meant at training time, and building a
//! classifier checks that the model's columns cover every category exactly
//! once.

use crate::model::ModelClass;
use emolens_core::{EmotionCategory, Error, Result};

/// Training-time label ordering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    version: String,
    labels: Vec<EmotionCategory>,
}

impl LabelTable {
    /// Version tag of the original nine-label ordering
    pub const V1: &'static str = "v1";

    /// anger, disgust, fear, guilt, joy, love, sadness, shame, surprise
    pub fn v1() -> Self {
        Self {
            version: Self::V1.to_string(),
            labels: EmotionCategory::ALL.to_vec(),
        }
    }

    /// Look up a built-in table by version
    pub fn by_version(version: &str) -> Result<Self> {
        match version {
            Self::V1 => Ok(Self::v1()),
            other => Err(Error::config(format!("unknown label table version '{other}'"))),
        }
    }

    /// Custom ordering; must list all nine categories exactly once
    pub fn new(version: impl Into<String>, labels: Vec<EmotionCategory>) -> Result<Self> {
        let version = version.into();
        if labels.len() != EmotionCategory::COUNT {
            return Err(Error::config(format!(
                "label table '{version}' has {} labels, expected {}",
                labels.len(),
                EmotionCategory::COUNT
            )));
        }

        let mut seen = [false; EmotionCategory::COUNT];
        for label in &labels {
            if std::mem::replace(&mut seen[label.index()], true) {
                return Err(Error::config(format!(
                    "label table '{version}' lists '{label}' twice"
                )));
            }
        }

        Ok(Self { version, labels })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn labels(&self) -> &[EmotionCategory] {
        &self.labels
    }

    /// Category for one model class
    pub fn resolve(&self, class: &ModelClass) -> Result<EmotionCategory> {
        match class {
            ModelClass::Index(idx) => self.labels.get(*idx).copied().ok_or_else(|| {
                Error::classifier(format!(
                    "class index {idx} is outside label table '{}' ({} labels)",
                    self.version,
                    self.labels.len()
                ))
            }),
            ModelClass::Label(name) => name
                .parse::<EmotionCategory>()
                .map_err(|_| Error::classifier(format!("model class '{name}' is not an emotion"))),
        }
    }

    /// Category for every `predict_proba` column, in column order.
    ///
    /// Fails unless the columns are a bijection onto the nine categories.
    pub fn column_mapping(&self, classes: &[ModelClass]) -> Result<Vec<EmotionCategory>> {
        if classes.len() != EmotionCategory::COUNT {
            return Err(Error::classifier(format!(
                "model exposes {} classes, label table '{}' expects {}",
                classes.len(),
                self.version,
                EmotionCategory::COUNT
            )));
        }

        let mut seen = [false; EmotionCategory::COUNT];
        let mut columns = Vec::with_capacity(classes.len());
        for class in classes {
            let category = self.resolve(class)?;
            if std::mem::replace(&mut seen[category.index()], true) {
                return Err(Error::classifier(format!(
                    "model classes map '{category}' more than once"
                )));
            }
            columns.push(category);
        }

        Ok(columns)
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::v1()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(range: impl Iterator<Item = usize>) -> Vec<ModelClass> {
        range.map(ModelClass::Index).collect()
    }

    #[test]
    fn test_v1_mapping_is_positional() {
        let table = LabelTable::v1();
        let columns = table.column_mapping(&indices(0..9)).unwrap();
        assert_eq!(columns, EmotionCategory::ALL.to_vec());
        assert_eq!(
            table.resolve(&ModelClass::Index(4)).unwrap(),
            EmotionCategory::Joy
        );
    }

    #[test]
    fn test_permuted_columns_follow_classes() {
        let table = LabelTable::v1();
        let classes = indices((0..9).rev());
        let columns = table.column_mapping(&classes).unwrap();
        assert_eq!(columns[0], EmotionCategory::Surprise);
        assert_eq!(columns[8], EmotionCategory::Anger);
    }

    #[test]
    fn test_named_classes() {
        let table = LabelTable::v1();
        let classes: Vec<ModelClass> = EmotionCategory::ALL
            .iter()
            .map(|c| ModelClass::Label(c.to_string()))
            .collect();
        assert!(table.column_mapping(&classes).is_ok());
    }

    #[test]
    fn test_wrong_length_rejected() {
        let table = LabelTable::v1();
        let err = table.column_mapping(&indices(0..8)).unwrap_err();
        assert!(matches!(err, Error::Classifier(_)));
    }

    #[test]
    fn test_duplicate_and_out_of_range_rejected() {
        let table = LabelTable::v1();

        let mut duplicated = indices(0..9);
        duplicated[8] = ModelClass::Index(0);
        assert!(table.column_mapping(&duplicated).is_err());

        let mut out_of_range = indices(0..9);
        out_of_range[8] = ModelClass::Index(9);
        assert!(table.column_mapping(&out_of_range).is_err());
    }

    #[test]
    fn test_custom_table_validation() {
        assert!(LabelTable::new("short", vec![EmotionCategory::Joy]).is_err());

        let mut labels = EmotionCategory::ALL.to_vec();
        labels.swap(0, 4);
        let table = LabelTable::new("v2", labels).unwrap();
        assert_eq!(
            table.resolve(&ModelClass::Index(0)).unwrap(),
            EmotionCategory::Joy
        );

        assert!(LabelTable::by_version("v9").is_err());
    }
}
