use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use factguard::admin::HistoryStats;
use serde_json::Value;

use crate::error::{CliError, CliResult};
use crate::output::{OutputFormat, format_created_at, truncate_string};

#[derive(Parser)]
pub struct StatsCommand {
    #[clap(long, short, default_value = "10", help = "Number of recent requests to show")]
    pub limit: usize,
}

impl StatsCommand {
    pub async fn execute(&self, server: &str, format: OutputFormat) -> CliResult<()> {
        let client = reqwest::Client::new();
        let stats = fetch_stats(&client, server).await?;

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
            OutputFormat::Table => {
                println!("Fact Guard Statistics");
                println!("=====================\n");

                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Metric", "Value"]);

                table.add_row(["Total requests", &stats.total_requests.to_string()]);
                table.add_row(["Average score", &format!("{:.2}", stats.average_score)]);
                table.add_row(["Fake", &stats.fake_count.to_string()]);
                table.add_row(["Real", &stats.real_count.to_string()]);

                println!("{table}\n");

                if stats.recent_requests.is_empty() {
                    println!("No recent requests.");
                    return Ok(());
                }

                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["ID", "URL", "Score", "Fake", "Created"]);

                for item in stats.recent_requests.iter().take(self.limit) {
                    table.add_row([
                        item.id.to_string(),
                        truncate_string(&item.url, 60),
                        item.score.to_string(),
                        if item.is_fake { "yes" } else { "no" }.to_string(),
                        format_created_at(&item.created_at),
                    ]);
                }

                println!("{table}");
            }
        }

        Ok(())
    }
}

/// Fetch `/api/history/stats` from a Fact Guard server
pub async fn fetch_stats(client: &reqwest::Client, server: &str) -> CliResult<HistoryStats> {
    let response = client
        .get(format!("{}/api/history/stats", server.trim_end_matches('/')))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let detail = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string));
        return Err(match detail {
            Some(kind) => CliError(format!("Stats request failed with status {status}: {kind}")),
            None => CliError(format!("Stats request failed with status {status}")),
        });
    }

    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

    #[tokio::test]
    async fn test_fetch_stats() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/api/history/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_requests": 2,
                "average_score": 4.5,
                "fake_count": 1,
                "real_count": 1,
                "recent_requests": [
                    {"id": 2, "url": "https://news.test/b", "score": 2, "is_fake": true, "created_at": "2026-02-24T18:30:00Z"}
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let server = format!("{}/", mock_server.uri());
        let stats = fetch_stats(&client, &server).await.unwrap();

        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.recent_requests.len(), 1);
        assert!(stats.recent_requests[0].is_fake);
    }

    #[tokio::test]
    async fn test_null_recent_requests() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_requests": 0,
                "average_score": 0,
                "fake_count": 0,
                "real_count": 0,
                "recent_requests": null
            })))
            .mount(&mock_server)
            .await;

        let stats = fetch_stats(&reqwest::Client::new(), &mock_server.uri())
            .await
            .unwrap();
        assert!(stats.recent_requests.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_reports_kind() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"error": "connection_failed", "details": "refused"})),
            )
            .mount(&mock_server)
            .await;

        let err = fetch_stats(&reqwest::Client::new(), &mock_server.uri())
            .await
            .unwrap_err();
        assert!(err.0.contains("500"));
        assert!(err.0.contains("connection_failed"));
    }
}
