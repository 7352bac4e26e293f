// Shared fixtures: a mocked feature store REST API and a matching config

use online_predictor::Config;
use serde_json::json;
use std::path::Path;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PROJECT: &str = "fraud";
pub const PROJECT_ID: i64 = 119;
pub const FEATURE_STORE_ID: i64 = 67;
pub const FEATURE_VIEW: &str = "transactions_fraud_online_fv";

pub fn test_config(server_uri: &str, artifact_dir: &Path) -> Config {
    Config {
        http_host: "127.0.0.1".to_string(),
        http_port: 8080,
        feature_store_url: server_uri.to_string(),
        feature_store_online_url: None,
        project_name: PROJECT.to_string(),
        feature_store_name: None,
        request_timeout_ms: 2000,
        feature_view_name: FEATURE_VIEW.to_string(),
        feature_view_version: 1,
        training_dataset_version: 1,
        entity_key: "cc_num".to_string(),
        excluded_columns: vec!["cc_num".to_string(), "fraud_label".to_string()],
        artifact_files_path: artifact_dir.to_path_buf(),
        model_file_name: "model.onnx".to_string(),
    }
}

fn view_path() -> String {
    format!(
        "/hopsworks-api/api/project/{}/featurestores/{}/featureview/{}/version/1",
        PROJECT_ID, FEATURE_STORE_ID, FEATURE_VIEW
    )
}

pub async fn mount_project(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/hopsworks-api/api/project/getProjectInfo/{}",
            PROJECT
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "projectId": PROJECT_ID,
            "projectName": PROJECT
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/hopsworks-api/api/project/{}/featurestores/fraud_featurestore",
            PROJECT_ID
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "featurestoreId": FEATURE_STORE_ID,
            "featurestoreName": "fraud_featurestore"
        })))
        .mount(server)
        .await;
}

pub async fn mount_feature_view(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(view_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": FEATURE_VIEW,
            "version": 1,
            "features": [
                { "name": "cc_num", "type": "bigint", "primary": true },
                { "name": "fraud_label", "type": "bigint", "label": true },
                { "name": "amount", "type": "double" },
                { "name": "category", "type": "string" }
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/servingkeys", view_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "featureName": "cc_num", "required": true }
        ])))
        .mount(server)
        .await;
}

pub async fn mount_feature_vector(server: &MockServer, cc_num: i64, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/0.1.0/feature_store"))
        .and(body_partial_json(json!({
            "featureStoreName": "fraud_featurestore",
            "featureViewName": FEATURE_VIEW,
            "featureViewVersion": 1,
            "entries": { "cc_num": cc_num }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Full happy-path feature store for entity 111
pub async fn fraud_feature_store() -> MockServer {
    let server = MockServer::start().await;
    mount_project(&server).await;
    mount_feature_view(&server).await;
    mount_feature_vector(
        &server,
        111,
        json!({ "features": [111, 0, 4.5, "grocery"], "status": "COMPLETE" }),
    )
    .await;
    server
}
