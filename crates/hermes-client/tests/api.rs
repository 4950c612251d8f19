//! HermesClient against the in-process mock service.

use std::sync::Arc;
use std::time::Duration;

use hermes_client::{
    build_classification_payload, build_retrain_payload, merge_predictions, ApiError, ClassifierApi, HermesClient,
    ModelSelection, ModelsLoader, SingleEntryForm,
};
use hermes_common::columns::IMPORTANT_HEADERS;
use hermes_test_utils::pretty_assertions::assert_eq;
use hermes_test_utils::{sample_document, MockApi, MockReply};
use serde_json::{json, Value};

#[tokio::test]
async fn test_fetch_models_lists_base_then_versioned() {
    let api = MockApi::spawn().await;
    let client = HermesClient::new(api.base_url());

    let catalog = client.fetch_models().await.unwrap();
    assert_eq!(catalog.names(), &["xgboost", "lightgbm", "custom", "experimental"]);
    assert!(catalog.is_versioned("custom"));
    assert!(!catalog.is_versioned("experimental"));
    assert_eq!(catalog.versions("custom"), vec!["10", "2", "1"]);
}

#[tokio::test]
async fn test_classify_sends_features_csv_and_merges() {
    let api = MockApi::spawn().await;
    let client = HermesClient::new(format!("{}/", api.base_url()));
    let mut doc = sample_document();

    let payload = build_classification_payload(&doc, false).unwrap();
    let selection = ModelSelection::new("custom").with_version("2");
    let response = client.predict_batch(&selection, &payload).await.unwrap();
    assert_eq!(response.prediction, vec!["CONFIRMED", "CANDIDATE", "CONFIRMED"]);

    let request = api.last_request().unwrap();
    assert_eq!(request.path, "/api/v1/predict/");
    assert_eq!(request.file_name.as_deref(), Some("features.csv"));
    assert_eq!(request.content_type.as_deref(), Some("text/csv"));
    assert_eq!(request.query.get("model").map(String::as_str), Some("custom"));
    assert_eq!(request.query.get("version").map(String::as_str), Some("2"));
    assert!(!request.query.contains_key("evaluate"));
    assert_eq!(request.body.lines().next(), Some("orb_period,planet_radius,ra"));

    merge_predictions(&mut doc, &payload, &response.prediction).unwrap();
    assert_eq!(doc.cell(0, "prediction"), "CONFIRMED");
    assert_eq!(doc.cell(2, "prediction"), "");
    assert_eq!(doc.cell(3, "prediction"), "CONFIRMED");
    assert_eq!(response.notification(payload.row_count()).message, "Predicted 3 rows (model 2).");
}

#[tokio::test]
async fn test_classify_with_evaluation_returns_report() {
    let api = MockApi::spawn().await;
    let client = HermesClient::new(api.base_url());
    let payload = build_classification_payload(&sample_document(), true).unwrap();

    let selection = ModelSelection::new("xgboost").with_evaluate(true);
    let response = client.predict_batch(&selection, &payload).await.unwrap();

    let request = api.last_request().unwrap();
    assert_eq!(request.query.get("evaluate").map(String::as_str), Some("true"));
    assert!(request.body.starts_with("orb_period,planet_radius,ra,label"));

    let evaluation = response.evaluation.unwrap();
    assert_eq!(evaluation.accuracy, Some(0.8667));
    let labels: Vec<&str> = evaluation.per_label.iter().map(|(l, _)| l.as_str()).collect();
    assert_eq!(labels, vec!["CANDIDATE", "CONFIRMED", "macro avg", "weighted avg"]);
}

#[tokio::test]
async fn test_http_error_uses_detail_then_status() {
    let api = MockApi::spawn().await;
    let client = HermesClient::new(api.base_url());
    let payload = build_classification_payload(&sample_document(), false).unwrap();
    let selection = ModelSelection::new("xgboost");

    api.set_predict(MockReply::fixed(422, json!({ "detail": "Unknown model 'xgboost'" })));
    let err = client.predict_batch(&selection, &payload).await.unwrap_err();
    assert!(matches!(&err, ApiError::Http { status: 422, message } if message == "Unknown model 'xgboost'"));
    let notice = err.to_notification("Classification failed").unwrap();
    assert_eq!(notice.message, "Unknown model 'xgboost'");

    api.set_predict(MockReply::fixed(503, json!({ "error": "down" })));
    let err = client.predict_batch(&selection, &payload).await.unwrap_err();
    assert!(matches!(&err, ApiError::Http { status: 503, message } if message == "HTTP 503"));
}

#[tokio::test]
async fn test_prediction_length_mismatch_is_rejected() {
    let api = MockApi::spawn().await;
    let client = HermesClient::new(api.base_url());
    let payload = build_classification_payload(&sample_document(), false).unwrap();

    api.set_predict(MockReply::fixed(200, json!({ "prediction": ["CONFIRMED"] })));
    let err = client.predict_batch(&ModelSelection::new("xgboost"), &payload).await.unwrap_err();
    assert!(matches!(err, ApiError::LengthMismatch { got: 1, expected: 3 }));

    api.set_predict(MockReply::fixed(200, json!({ "prediction": "CONFIRMED" })));
    let err = client.predict_batch(&ModelSelection::new("xgboost"), &payload).await.unwrap_err();
    assert!(matches!(err, ApiError::PredictionNotArray));
}

#[tokio::test]
async fn test_retrain_uploads_train_csv() {
    let api = MockApi::spawn().await;
    let client = HermesClient::new(api.base_url());
    let payload = build_retrain_payload(&sample_document()).unwrap();

    let selection = ModelSelection::new("custom").with_version("10").with_evaluate(true);
    let response = client.retrain(&selection, &payload).await.unwrap();
    assert_eq!(response.message.as_deref(), Some("Retraining started"));
    assert_eq!(response.model_version.as_deref(), Some("11"));

    let request = api.last_request().unwrap();
    assert_eq!(request.path, "/api/v1/retrain/");
    assert_eq!(request.file_name.as_deref(), Some("train.csv"));
    assert!(request.body.contains("label"));
    assert_eq!(request.body.lines().count(), 4);
}

#[tokio::test]
async fn test_single_entry_posts_json_without_evaluate() {
    let api = MockApi::spawn().await;
    let client = HermesClient::new(api.base_url());

    let mut form = SingleEntryForm::new();
    for (i, column) in IMPORTANT_HEADERS.iter().enumerate() {
        form.set_input(column, &format!("{}.5", i));
    }
    form.set_bool("koi_fpflag_ss", true);
    form.validate().unwrap();

    let selection = ModelSelection::new("xgboost").with_evaluate(true);
    let response = client.predict_single(&selection, &form).await.unwrap();
    assert_eq!(response.prediction, "CONFIRMED");
    assert_eq!(response.shap_values.unwrap().per_feature.len(), 4);

    let request = api.last_request().unwrap();
    assert_eq!(request.path, "/api/v1/predict/single/");
    assert!(!request.query.contains_key("evaluate"));
    let body: Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["data"]["koi_fpflag_ss"], json!(1.0));
    assert_eq!(body["data"]["orb_period"], json!(0.5));
}

#[tokio::test]
async fn test_models_loader_last_request_wins() {
    let api = MockApi::spawn().await;
    api.set_models_delay(Some(Duration::from_millis(400)));
    let loader = Arc::new(ModelsLoader::new(Arc::new(HermesClient::new(api.base_url()))));

    let first = tokio::spawn({
        let loader = Arc::clone(&loader);
        async move { loader.load().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    api.set_models_delay(None);
    api.set_models(MockReply::fixed(200, json!({ "all_models": { "base": ["fresh"] } })));
    let second = loader.load().await.unwrap();
    assert_eq!(second.names(), &["fresh"]);

    assert!(matches!(first.await.unwrap(), Err(ApiError::Aborted)));
    assert_eq!(loader.cached().unwrap().names(), &["fresh"]);
}
