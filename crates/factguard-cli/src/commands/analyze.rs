use std::fmt::Display;
use std::time::Duration;

use bytes::Bytes;
use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use futures::{Stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::ACCEPT;
use serde_json::Value;

use factguard::analysis::{AnalysisRequest, AnalysisResult};
use factguard::sse::{EVENT_STREAM_CONTENT_TYPE, LineSplitter, SseDecoder, SseMessage, StreamEvent, event_type};

use crate::error::{CliError, CliResult};
use crate::output::{OutputFormat, truncate_string};

#[derive(Parser)]
pub struct AnalyzeCommand {
    #[clap(help = "URL of the article to check")]
    pub url: String,

    #[clap(
        long,
        help = "POST straight to an upstream analysis endpoint instead of the server"
    )]
    pub upstream: Option<String>,
}

/// Where the event stream is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTarget {
    /// `GET <base>/api/analyze/stream?url=...` on a Fact Guard server
    Server(String),
    /// `POST {"url": ...}` to an analysis upstream
    Upstream(String),
}

/// How the stream ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// A `done` event, with its data
    Done(String),
    /// A `data: [DONE]` line
    Sentinel,
    /// The connection closed without a terminal event
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub result: Option<AnalysisResult>,
    pub end: StreamEnd,
    pub events: usize,
}

impl AnalyzeCommand {
    pub async fn execute(&self, server: &str, format: OutputFormat) -> CliResult<()> {
        let target = match &self.upstream {
            Some(upstream) => StreamTarget::Upstream(upstream.clone()),
            None => StreamTarget::Server(server.to_string()),
        };

        let pb = match format {
            OutputFormat::Json => ProgressBar::hidden(),
            OutputFormat::Table => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} [{elapsed_precise}] {msg}")
                        .map_err(|e| format!("Progress bar error: {e}"))?,
                );
                pb.enable_steady_tick(Duration::from_millis(120));
                pb
            }
        };
        pb.set_message(format!("Connecting for {}", self.url));

        let client = reqwest::Client::new();
        let outcome = run_analysis(&client, &target, &self.url, |event| {
            match event.event_type.as_str() {
                event_type::START | event_type::PROGRESS => pb.set_message(event.data.clone()),
                event_type::DONE => pb.finish_with_message(event.data.clone()),
                _ => {}
            }
        })
        .await;

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                pb.abandon_with_message("Analysis failed");
                return Err(e);
            }
        };
        if !pb.is_finished() {
            pb.finish_and_clear();
        }

        match format {
            OutputFormat::Json => {
                let result = outcome
                    .result
                    .map(AnalysisResult::into_value)
                    .unwrap_or(Value::Null);
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            OutputFormat::Table => match &outcome.result {
                Some(result) => print_result(result),
                None => println!("No result received ({} events)", outcome.events),
            },
        }

        if outcome.end == StreamEnd::Closed {
            tracing::warn!("Stream closed without a done event");
        }

        Ok(())
    }
}

/// Open the event stream for `url` and decode it to completion
pub async fn run_analysis<F>(
    client: &reqwest::Client,
    target: &StreamTarget,
    url: &str,
    on_event: F,
) -> CliResult<AnalysisOutcome>
where
    F: FnMut(&StreamEvent),
{
    let request = match target {
        StreamTarget::Server(base) => client
            .get(format!("{}/api/analyze/stream", base.trim_end_matches('/')))
            .query(&[("url", url)]),
        StreamTarget::Upstream(upstream) => client
            .post(upstream)
            .header(ACCEPT, EVENT_STREAM_CONTENT_TYPE)
            .json(&AnalysisRequest::new(url)),
    };

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError(format!("Stream request failed with status {status}")));
    }

    collect_analysis(response.bytes_stream(), on_event).await
}

/// Decode an event stream until a terminal event
///
/// `on_event` sees every decoded event in order. An `error` event fails with
/// its details; anything after `done` or `[DONE]` is never read.
pub async fn collect_analysis<S, E, F>(stream: S, mut on_event: F) -> CliResult<AnalysisOutcome>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
    F: FnMut(&StreamEvent),
{
    let mut stream = std::pin::pin!(stream);
    let mut splitter = LineSplitter::new();
    let mut decoder = SseDecoder::new();
    let mut result = None;
    let mut events = 0;

    let mut handle = |message: SseMessage| -> CliResult<Option<StreamEnd>> {
        let event = match message {
            SseMessage::Done => return Ok(Some(StreamEnd::Sentinel)),
            SseMessage::Event(event) => event,
        };
        events += 1;
        on_event(&event);

        match event.event_type.as_str() {
            event_type::RESULT => match parse_result(&event.data) {
                Some(parsed) => result = Some(parsed),
                None => tracing::warn!("Ignoring result event that is not a JSON object"),
            },
            event_type::DONE => return Ok(Some(StreamEnd::Done(event.data))),
            event_type::ERROR => return Err(CliError(describe_error(&event.data))),
            _ => {}
        }
        Ok(None)
    };

    let mut end = StreamEnd::Closed;
    'read: while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| CliError(format!("Stream interrupted: {e}")))?;
        for line in splitter.push(&chunk) {
            if let Some(message) = decoder.feed_line(&line) {
                if let Some(stop) = handle(message)? {
                    end = stop;
                    break 'read;
                }
            }
        }
    }

    if end == StreamEnd::Closed {
        let tail = splitter.finish().and_then(|line| decoder.feed_line(&line));
        for message in tail.into_iter().chain(decoder.finish()) {
            if let Some(stop) = handle(message)? {
                end = stop;
                break;
            }
        }
    }

    Ok(AnalysisOutcome {
        result,
        end,
        events,
    })
}

fn parse_result(data: &str) -> Option<AnalysisResult> {
    serde_json::from_str(data).ok().and_then(AnalysisResult::from_value)
}

fn describe_error(data: &str) -> String {
    let payload: Option<Value> = serde_json::from_str(data).ok();
    let field = |key: &str| {
        payload
            .as_ref()
            .and_then(|p| p.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    match (field("error"), field("details")) {
        (Some(kind), Some(details)) => format!("Analysis failed ({kind}): {details}"),
        (Some(kind), None) => format!("Analysis failed: {kind}"),
        (None, Some(details)) => format!("Analysis failed: {details}"),
        (None, None) => format!("Analysis failed: {data}"),
    }
}

fn print_result(result: &AnalysisResult) {
    println!("Analysis Result");
    println!("===============\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["Field", "Value"]);

    let score = result
        .credibility_score()
        .map(|s| format!("{s}/10"))
        .unwrap_or_else(|| "-".to_string());
    let fake = match result.is_fake() {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    };

    table.add_row(["URL", result.url().unwrap_or("-")]);
    table.add_row(["Credibility", &score]);
    table.add_row(["Verdict", result.final_verdict().unwrap_or("-")]);
    table.add_row(["Fake", fake]);
    table.add_row(["Manipulations", &result.manipulations().len().to_string()]);
    table.add_row(["Logical issues", &result.logical_issues().len().to_string()]);
    if let Some(summary) = result.summary() {
        table.add_row(["Summary", &truncate_string(summary, 200)]);
    }
    println!("{table}\n");

    let sources = result.sources();
    if sources.is_empty() {
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(["Source", "URL"]);
    for source in &sources {
        table.add_row([truncate_string(&source.title, 60), source.url.clone()]);
    }
    println!("{table}\n");

    if let Some(usage) = result.usage() {
        println!("Tokens: {} total", usage.total_tokens);
    }
}
