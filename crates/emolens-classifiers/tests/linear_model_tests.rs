//! End-to-end tests for loading a linear artifact from disk and classifying
//! through the adapter.

use emolens_classifiers::{build_classifier, Classifier, DeviceType, ModelSettings};
use emolens_core::EmotionCategory;
use serde_json::json;
use std::io::Write;

/// Nine-class artifact where each class has one strongly weighted keyword
fn keyword_artifact() -> serde_json::Value {
    let keywords = [
        "furious", "gross", "scared", "guilty", "happy", "adore", "sad", "ashamed", "shocked",
    ];
    let vocabulary: serde_json::Map<String, serde_json::Value> = keywords
        .iter()
        .enumerate()
        .map(|(i, k)| (k.to_string(), json!(i)))
        .collect();
    let coef: Vec<Vec<f32>> = (0..9)
        .map(|class| (0..9).map(|f| if f == class { 4.0 } else { -0.5 }).collect())
        .collect();

    json!({
        "format": "emolens-linear-v1",
        "name": "keyword-lr",
        "classes": [0, 1, 2, 3, 4, 5, 6, 7, 8],
        "multi_class": "multinomial",
        "vectorizer": {
            "vocabulary": vocabulary,
            "lowercase": true,
            "norm": "l2"
        },
        "coef": coef,
        "intercept": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
    })
}

fn write_artifact(value: &serde_json::Value) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(value.to_string().as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn settings_for(file: &tempfile::NamedTempFile) -> ModelSettings {
    ModelSettings {
        path: Some(file.path().to_path_buf()),
        device: DeviceType::Cpu,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_classify_happy_text() {
    let file = write_artifact(&keyword_artifact());
    let classifier = build_classifier(&settings_for(&file)).unwrap();

    let result = classifier.classify("I am so happy today").await.unwrap();

    assert_eq!(result.label, EmotionCategory::Joy);
    assert!((0.0..=1.0).contains(&result.confidence()));
    assert_eq!(result.metadata.model.as_deref(), Some("keyword-lr"));
}

#[tokio::test]
async fn test_probabilities_are_distributions() {
    let file = write_artifact(&keyword_artifact());
    let classifier = build_classifier(&settings_for(&file)).unwrap();

    for text in ["", "   ", "so SCARED", "gross and sad", "nothing matches here"] {
        let result = classifier.classify(text).await.unwrap();
        assert_eq!(result.scores.iter().count(), 9);
        assert!(
            (result.scores.sum() - 1.0).abs() < 1e-6,
            "sum for {text:?} was {}",
            result.scores.sum()
        );
        assert_eq!(result.scores.get(result.label), result.confidence());
    }
}

#[test]
fn test_artifact_with_eight_classes_is_rejected() {
    let mut artifact = keyword_artifact();
    artifact["classes"] = json!([0, 1, 2, 3, 4, 5, 6, 7]);
    artifact["coef"].as_array_mut().unwrap().pop();
    artifact["intercept"].as_array_mut().unwrap().pop();
    let file = write_artifact(&artifact);

    assert!(build_classifier(&settings_for(&file)).is_err());
}

#[test]
fn test_artifact_with_duplicate_classes_is_rejected() {
    let mut artifact = keyword_artifact();
    artifact["classes"] = json!([0, 1, 2, 3, 4, 5, 6, 7, 7]);
    let file = write_artifact(&artifact);

    assert!(build_classifier(&settings_for(&file)).is_err());
}

#[tokio::test]
async fn test_shipped_demo_artifact_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../models/emotion_keywords_lr.json");
    let settings = ModelSettings {
        path: Some(path),
        ..Default::default()
    };
    let classifier = build_classifier(&settings).unwrap();

    let result = classifier
        .classify("I was so scared and nervous")
        .await
        .unwrap();
    assert_eq!(result.label, EmotionCategory::Fear);
    assert!((result.scores.sum() - 1.0).abs() < 1e-6);
}
