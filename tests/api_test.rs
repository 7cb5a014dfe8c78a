use anyhow::Result;
use mysa_mood::{routes, MoodLog};
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Serve the full router on an ephemeral port, logging into a temp directory.
async fn spawn_app() -> Result<(String, MoodLog, TempDir)> {
    // ---
    let tmp = tempfile::tempdir()?;
    let log = MoodLog::new(tmp.path().join("mood data"), "mood_tracker_history.csv");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = routes::router(log.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Ok((format!("http://{}", addr), log, tmp))
}

fn assert_cors(resp: &Response) {
    // ---
    let headers = resp.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type");
    assert_eq!(headers["access-control-allow-methods"], "POST, GET, OPTIONS");
}

fn moods(groups: &[(&str, usize)]) -> Vec<Value> {
    // ---
    groups
        .iter()
        .flat_map(|(label, n)| {
            (0..*n).map(move |i| json!({"expression": label, "frame": i}))
        })
        .collect()
}

#[tokio::test]
async fn analyze_returns_statistics_and_appends_log() -> Result<()> {
    // ---
    let (base, log, _tmp) = spawn_app().await?;
    let client = Client::new();

    let resp = client
        .post(format!("{}/api/analyze-mood", base))
        .json(&json!({"data_log": moods(&[("happy", 6), ("sad", 3), ("drowsy", 1)])}))
        .send()
        .await?;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_cors(&resp);

    let body: Value = resp.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["total_samples"], 10);
    assert_eq!(body["dominant_mood"], "HAPPY");
    assert_eq!(
        body["report_message"],
        "Your overall mood is balanced. Keep up the good work!"
    );
    assert_eq!(
        body["pie_chart_data"],
        json!({"happy": 60.0, "sad": 30.0, "drowsy": 10.0})
    );
    assert!(body["csv_saved_path"]
        .as_str()
        .unwrap()
        .ends_with("mood_tracker_history.csv"));

    let csv = std::fs::read_to_string(log.path())?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 11);
    assert_eq!(lines[0], "expression,frame");
    assert_eq!(lines[1], "happy,0");

    Ok(())
}

#[tokio::test]
async fn analyze_negative_dominant_mood() -> Result<()> {
    // ---
    let (base, _log, _tmp) = spawn_app().await?;

    let body: Value = Client::new()
        .post(format!("{}/api/analyze-mood", base))
        .json(&json!({"data_log": moods(&[("sad", 3), ("happy", 1)])}))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body["dominant_mood"], "SAD");
    assert_eq!(body["pie_chart_data"], json!({"sad": 75.0, "happy": 25.0}));
    assert!(body["report_message"]
        .as_str()
        .unwrap()
        .starts_with("Your dominant state was SAD."));

    Ok(())
}

#[tokio::test]
async fn analyze_rejects_empty_or_invalid_batches() -> Result<()> {
    // ---
    let (base, log, _tmp) = spawn_app().await?;
    let client = Client::new();
    let url = format!("{}/api/analyze-mood", base);

    for payload in [json!({"data_log": []}), json!({}), json!({"data_log": null})] {
        let resp = client.post(&url).json(&payload).send().await?;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {}", payload);
        assert_cors(&resp);
        let body: Value = resp.json().await?;
        assert_eq!(body["error"], "No valid data log received.");
    }

    let resp = client
        .post(&url)
        .json(&json!({"data_log": [{"mood": "happy"}]}))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert!(body["error"].is_string());

    let resp = client
        .post(&url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert!(!log.path().exists(), "rejected batches must not be logged");

    Ok(())
}

#[tokio::test]
async fn preflight_is_empty_ok() -> Result<()> {
    // ---
    let (base, _log, _tmp) = spawn_app().await?;
    let client = Client::new();

    for path in ["/api/analyze-mood", "/api/generate-pdf"] {
        let resp = client
            .request(reqwest::Method::OPTIONS, format!("{}{}", base, path))
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_cors(&resp);
        assert!(resp.bytes().await?.is_empty());
    }

    Ok(())
}

#[tokio::test]
async fn generate_pdf_from_analysis() -> Result<()> {
    // ---
    let (base, _log, _tmp) = spawn_app().await?;
    let client = Client::new();

    let analysis: Value = client
        .post(format!("{}/api/analyze-mood", base))
        .json(&json!({"data_log": moods(&[("drowsy", 2), ("happy", 1), ("sad", 1)])}))
        .send()
        .await?
        .json()
        .await?;

    let resp = client
        .post(format!("{}/api/generate-pdf", base))
        .json(&json!({"report_data": analysis}))
        .send()
        .await?;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_cors(&resp);
    assert_eq!(resp.headers()["content-type"], "application/pdf");
    let disposition = resp.headers()["content-disposition"].to_str()?.to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains(routes::REPORT_FILENAME));

    let bytes = resp.bytes().await?;
    assert!(bytes.starts_with(b"%PDF"));

    Ok(())
}

#[tokio::test]
async fn generate_pdf_rejects_bad_input() -> Result<()> {
    // ---
    let (base, _log, _tmp) = spawn_app().await?;
    let client = Client::new();
    let url = format!("{}/api/generate-pdf", base);

    let resp = client.post(&url).json(&json!({})).send().await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["error"], "Missing 'report_data' in request.");

    let resp = client
        .post(&url)
        .json(&json!({"report_data": {
            "total_samples": 4,
            "report_message": "m",
            "pie_chart_data": {"sad": 75.0, "happy": 25.0}
        }}))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert!(body["error"].as_str().unwrap().contains("dominant_mood"));

    Ok(())
}

#[tokio::test]
async fn health_reports_ok() -> Result<()> {
    // ---
    let (base, _log, _tmp) = spawn_app().await?;

    let resp = Client::new().get(format!("{}/health", base)).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body, json!({"status": "ok"}));

    Ok(())
}
