use crate::support::{model_response, ollama_body};
use biotools_curator::config::Config;
use biotools_curator::pipeline::{self, REPORT_FILE, RunRequest, SUMMARY_FILE};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn read_report(dir: &Path) -> HashMap<String, Value> {
    std::fs::read_to_string(dir.join(REPORT_FILE))
        .unwrap()
        .lines()
        .map(|line| {
            let row: Value = serde_json::from_str(line).unwrap();
            (row["candidate_id"].as_str().unwrap().to_string(), row)
        })
        .collect()
}

fn config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.llm.host = server.uri();
    config.llm.transport_retries = 0;
    config.enrichment.europe_pmc.base_url = server.uri();
    config.scoring.require_homepage = true;
    config.pipeline.concurrency = 2;
    config
}

async fn mount_homepage(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/seqtool"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(
                    r#"<html><body><p>Sequencing read aligner.</p>
                       <a href="/seqtool/install.html">Installation</a></body></html>"#,
                ),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn end_to_end_run_writes_report_and_summary() {
    let server = MockServer::start().await;
    mount_homepage(&server).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resultList": {"result": [{
                "title": "SeqTool: fast alignment",
                "abstractText": "We present SeqTool, a fast aligner.",
                "pmid": "12345"
            }]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_string_contains("a fast aligner"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ollama_body(&model_response([1.0; 5], [1.0; 5], &[]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("candidates.json");
    std::fs::write(
        &input,
        json!([
            {
                "id": "seqtool",
                "title": "SeqTool",
                "description": "Read aligner",
                "homepage": format!("{}/seqtool", server.uri()),
                "publication_ids": ["PMID:12345"]
            },
            {"id": "nohome", "title": "Orphan"}
        ])
        .to_string(),
    )
    .unwrap();
    let out = dir.path().join("out");

    let summary = pipeline::run(
        &config(&server),
        RunRequest {
            input,
            output_dir: Some(out.clone()),
            limit: None,
            offline: false,
        },
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(summary.candidates_total, 2);
    assert_eq!(summary.records_written, 2);
    assert!(!summary.cancelled);
    assert_eq!(summary.metrics.add, 1);
    assert_eq!(summary.metrics.do_not_add, 1);
    assert_eq!(summary.metrics.homepage_scraped, 1);

    let rows = read_report(&out);
    let added = &rows["seqtool"];
    assert_eq!(added["decision"]["kind"], "add");
    assert_eq!(added["evidence"]["homepage_status"], "ok");
    assert_eq!(added["diagnostics"]["attempts"], 1);
    assert!(
        added["documentation"]
            .as_array()
            .unwrap()
            .iter()
            .any(|d| d.as_str().unwrap().ends_with("/seqtool/install.html"))
    );
    assert_eq!(added["subscores"]["bio_subscores"]["A4"], 1.0);

    let skipped = &rows["nohome"];
    assert_eq!(skipped["decision"]["kind"], "do_not_add");
    assert_eq!(skipped["decision"]["reasons"], json!(["no_usable_homepage"]));
    assert!(skipped["subscores"].is_null());
    assert_eq!(skipped["diagnostics"]["attempts"], 0);

    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(out.join(SUMMARY_FILE)).unwrap()).unwrap();
    assert_eq!(written["run_id"], summary.run_id);
    assert_eq!(added["run_id"], summary.run_id);
}

#[tokio::test]
async fn offline_limited_run_skips_network_except_the_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ollama_body(&model_response([1.0; 5], [1.0; 5], &[]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("candidates.jsonl");
    let lines = [
        json!({"id": "a", "title": "A", "homepage": "https://a.example"}),
        json!({"id": "b", "title": "B", "homepage": "https://b.example"}),
    ]
    .map(|row| row.to_string())
    .join("\n");
    std::fs::write(&input, lines).unwrap();

    let summary = pipeline::run(
        &config(&server),
        RunRequest {
            input,
            output_dir: Some(dir.path().to_path_buf()),
            limit: Some(1),
            offline: true,
        },
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(summary.candidates_total, 2);
    assert_eq!(summary.records_written, 1);
    let rows = read_report(dir.path());
    assert_eq!(rows["a"]["evidence"]["homepage_status"], "skipped");
    assert_eq!(rows["a"]["decision"]["kind"], "add");
    assert!(
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .all(|r| r.url.path() == "/api/generate")
    );
}

#[tokio::test]
async fn cancelled_run_still_writes_a_summary() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("candidates.json");
    std::fs::write(&input, r#"[{"id": "a", "title": "A"}]"#).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let summary = pipeline::run(
        &config(&server),
        RunRequest {
            input,
            output_dir: Some(dir.path().to_path_buf()),
            limit: None,
            offline: true,
        },
        cancel,
    )
    .await
    .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.records_written, 0);
    assert_eq!(summary.not_started, 1);
    assert!(dir.path().join(SUMMARY_FILE).exists());
    assert_eq!(std::fs::read_to_string(dir.path().join(REPORT_FILE)).unwrap(), "");
}

#[tokio::test]
async fn missing_homepage_page_is_rejected_before_the_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ollama_body(&model_response([1.0; 5], [1.0; 5], &[]))),
        )
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("candidates.json");
    std::fs::write(
        &input,
        json!([{
            "id": "gone",
            "title": "GoneTool",
            "homepage": format!("{}/gone", server.uri())
        }])
        .to_string(),
    )
    .unwrap();

    let summary = pipeline::run(
        &config(&server),
        RunRequest {
            input,
            output_dir: Some(dir.path().to_path_buf()),
            limit: None,
            offline: false,
        },
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(summary.records_written, 1);
    assert_eq!(summary.metrics.do_not_add, 1);
    let row = &read_report(dir.path())["gone"];
    assert_eq!(row["evidence"]["homepage_status"], "error");
    assert_eq!(row["evidence"]["http_status"], 404);
    assert_eq!(row["decision"]["kind"], "do_not_add");
    assert_eq!(row["decision"]["reasons"], json!(["no_usable_homepage"]));
    assert_eq!(row["diagnostics"]["attempts"], 0);
}
