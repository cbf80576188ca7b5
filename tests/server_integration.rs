//! End-to-end tests for the report server.
//!
//! A stub axum server plays the source page; the report server fetches it
//! over real HTTP and persists into a temporary SQLite database.

use axum::{extract::State, http::StatusCode, response::Html, routing::get, Router};
use notes_reporter::config::Config;
use notes_reporter::server::run_server;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use tempfile::TempDir;

// ─── Stub source ────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct SourcePage {
    body: Arc<RwLock<String>>,
    failing: Arc<RwLock<bool>>,
}

impl SourcePage {
    fn set(&self, entries: &[(&str, u64, &str)]) {
        *self.body.write().unwrap() = previews(entries);
    }

    fn set_raw(&self, html: &str) {
        *self.body.write().unwrap() = html.to_string();
    }

    fn fail(&self, failing: bool) {
        *self.failing.write().unwrap() = failing;
    }
}

async fn serve_page(State(page): State<SourcePage>) -> Result<Html<String>, StatusCode> {
    if *page.failing.read().unwrap() {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Html(page.body.read().unwrap().clone()))
}

fn previews(entries: &[(&str, u64, &str)]) -> String {
    let items: String = entries
        .iter()
        .map(|(number, count, comment)| {
            format!(
                r#"<li class="oos_listItem">
  <div class="oos_previewSide">{}</div>
  <div class="oos_previewHeader"><a href="/Phone.aspx/1-{}">{}</a></div>
  <div class="oos_previewBody">{}</div>
</li>
"#,
                count, number, number, comment
            )
        })
        .collect();
    format!(
        "<html><body><ul id=\"previews\">\n{}</ul></body></html>",
        items
    )
}

async fn start_source() -> (SourcePage, String) {
    let page = SourcePage::default();
    let app = Router::new()
        .route("/", get(serve_page))
        .with_state(page.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    (page, url)
}

// ─── Helpers ────────────────────────────────────────────────────────

fn test_config(tmp: &TempDir, source_url: &str, port: u16) -> Config {
    let config_content = format!(
        r#"
[db]
path = "{}"

[source]
url = "{}"
timeout_secs = 5

[server]
bind = "127.0.0.1:{}"
"#,
        tmp.path().join("numbers.sqlite").display(),
        source_url,
        port
    );
    let cfg: Config = toml::from_str(&config_content).unwrap();
    cfg.validate().unwrap();
    cfg
}

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

async fn get_text(port: u16, path: &str) -> (u16, String) {
    let resp = reqwest::get(format!("http://127.0.0.1:{}{}", port, path))
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.text().await.unwrap())
}

fn lines(body: &str) -> Vec<&str> {
    body.lines().collect()
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_count_and_area_reports() {
    let tmp = TempDir::new().unwrap();
    let (source, url) = start_source().await;
    source.set(&[
        ("212-555-0100", 12, "Said it was the \"IRS\""),
        ("212-555-0101", 3, "Silent call"),
        ("415-555-0100", 1, "Car warranty"),
    ]);

    let port = find_free_port();
    let cfg = test_config(&tmp, &url, port);
    let server_handle = tokio::spawn(async move {
        run_server(&cfg).await.ok();
    });
    wait_for_server(port).await;

    // Served from the live page.
    let (status, body) = get_text(port, "/api/v1.0/results/2").await;
    assert_eq!(status, 200);
    assert_eq!(
        lines(&body),
        vec![
            "Showing a total of 2 results.",
            "[212-555-0100, 12, Said it was the \"IRS\"]",
            "[212-555-0101, 3, Silent call]",
        ]
    );

    // More than the page holds: falls back to the store.
    let (status, body) = get_text(port, "/api/v1.0/results/5").await;
    assert_eq!(status, 200);
    assert!(body.starts_with("Showing a total of 3 results."), "{}", body);

    // The page moves on; older area matches survive in the store.
    source.set(&[("415-555-0200", 7, "Robocall"), ("415-555-0201", 2, "Survey")]);

    let (status, body) = get_text(port, "/api/v1.0/resultsForArea/212").await;
    assert_eq!(status, 200);
    assert_eq!(
        lines(&body),
        vec![
            "Showing a total of 2 results.",
            "[212-555-0100, 12, Said it was the \"IRS\"]",
            "[212-555-0101, 3, Silent call]",
        ]
    );

    let (_, body) = get_text(port, "/api/v1.0/resultsForArea/212/5").await;
    assert!(body.starts_with("Showing a total of 2 results."), "{}", body);

    let (_, body) = get_text(port, "/api/v1.0/resultsForArea/415/1").await;
    assert_eq!(
        lines(&body),
        vec!["Showing a total of 1 results.", "[415-555-0200, 7, Robocall]"]
    );

    let (_, body) = get_text(port, "/api/v1.0/resultsForArea/999").await;
    assert_eq!(lines(&body), vec!["Showing a total of 0 results."]);

    // Default window: everything stored, newest fetch first.
    let (status, body) = get_text(port, "/api/v1.0/results").await;
    assert_eq!(status, 200);
    let all = lines(&body);
    assert_eq!(all[0], "Showing a total of 5 results.");
    assert_eq!(all[1], "[415-555-0200, 7, Robocall]");
    assert_eq!(all[2], "[415-555-0201, 2, Survey]");

    server_handle.abort();
}

#[tokio::test]
async fn test_bad_count_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let (source, url) = start_source().await;
    source.set(&[("212-555-0100", 1, "x")]);

    let port = find_free_port();
    let cfg = test_config(&tmp, &url, port);
    let server_handle = tokio::spawn(async move {
        run_server(&cfg).await.ok();
    });
    wait_for_server(port).await;

    let resp = reqwest::get(format!("http://127.0.0.1:{}/api/v1.0/results/ten", port))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");

    server_handle.abort();
}

#[tokio::test]
async fn test_source_failures_surface_as_errors() {
    let tmp = TempDir::new().unwrap();
    let (source, url) = start_source().await;
    source.set(&[("212-555-0100", 1, "x")]);

    let port = find_free_port();
    let cfg = test_config(&tmp, &url, port);
    let server_handle = tokio::spawn(async move {
        run_server(&cfg).await.ok();
    });
    wait_for_server(port).await;

    source.fail(true);
    let resp = reqwest::get(format!("http://127.0.0.1:{}/api/v1.0/results", port))
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "fetch_error");

    source.fail(false);
    source.set_raw("<html><body><p>maintenance</p></body></html>");
    let resp = reqwest::get(format!("http://127.0.0.1:{}/api/v1.0/results/1", port))
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "extract_error");

    server_handle.abort();
}

#[tokio::test]
async fn test_health() {
    let tmp = TempDir::new().unwrap();
    let (_source, url) = start_source().await;
    let port = find_free_port();
    let cfg = test_config(&tmp, &url, port);
    let server_handle = tokio::spawn(async move {
        run_server(&cfg).await.ok();
    });
    wait_for_server(port).await;

    let body: Value = reqwest::get(format!("http://127.0.0.1:{}/health", port))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");

    server_handle.abort();
}
