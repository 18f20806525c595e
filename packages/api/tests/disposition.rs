//! Buffer-vs-stream disposition, links, agent selection and error
//! propagation, driven through scripted transport agents.

use std::sync::Arc;

use http::{HeaderMap, HeaderValue, StatusCode};
use serde_json::json;

use parley::{
    Agent, AgentSelection, BodyChunk, BodyStream, Client, Codec, Encoding, Error, Kind, Request,
    ResponseHead, WireRequest, WriteSink,
};

/// Echoes the request body back under the request's content type.
struct EchoAgent;

impl Agent for EchoAgent {
    fn send(&self, request: &WireRequest) -> Result<(ResponseHead, BodyStream), Error> {
        let mut headers = HeaderMap::new();
        if let Some(content_type) = request.headers.get(http::header::CONTENT_TYPE) {
            headers.insert(http::header::CONTENT_TYPE, content_type.clone());
        }
        let (sender, stream) = BodyStream::channel();
        if !request.body.is_empty() {
            sender.send(request.body.clone());
        }
        sender.finish();
        Ok((ResponseHead::new(StatusCode::OK, headers), stream))
    }
}

/// Answers every request with a canned head and body.
struct ScriptedAgent {
    status: StatusCode,
    content_type: Option<&'static str>,
    extra_header: Option<(&'static str, &'static str)>,
    body: &'static [u8],
}

impl ScriptedAgent {
    fn with_body(content_type: &'static str, body: &'static [u8]) -> Self {
        ScriptedAgent {
            status: StatusCode::OK,
            content_type: Some(content_type),
            extra_header: None,
            body,
        }
    }
}

impl Agent for ScriptedAgent {
    fn send(&self, _request: &WireRequest) -> Result<(ResponseHead, BodyStream), Error> {
        let mut headers = HeaderMap::new();
        if let Some(content_type) = self.content_type {
            headers.insert(
                http::header::CONTENT_TYPE,
                HeaderValue::from_static(content_type),
            );
        }
        if let Some((name, value)) = self.extra_header {
            headers.insert(
                http::header::HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        let (sender, stream) = BodyStream::channel();
        if !self.body.is_empty() {
            sender.send(self.body);
        }
        sender.finish();
        Ok((ResponseHead::new(self.status, headers), stream))
    }
}

/// Always fails with a transport error before any head arrives.
struct RefusingAgent;

impl Agent for RefusingAgent {
    fn send(&self, _request: &WireRequest) -> Result<(ResponseHead, BodyStream), Error> {
        Err(Error::new(Kind::Transport).with("connection refused"))
    }
}

fn echo_client() -> Client {
    Client::new(Arc::new(EchoAgent))
}

fn drain_text(stream: &mut BodyStream) -> String {
    stream.set_encoding(Encoding::Utf8);
    let mut collected = String::new();
    for chunk in stream {
        match chunk.expect("stream chunk") {
            BodyChunk::Text(text) => collected.push_str(&text),
            BodyChunk::Data(_) => panic!("stream was configured for utf8 delivery"),
        }
    }
    collected
}

#[test]
fn unknown_content_type_disables_buffering() {
    let client = echo_client();
    let mut response = Request::post(&client, "http://localhost:5000/echo")
        .content_type("application/x-dog")
        .send(&json!("hello this is dog"))
        .end()
        .expect("end");

    assert!(!response.buffered());
    assert!(response.text().is_none());
    assert_eq!(response.body(), &json!({}));

    let stream = response.stream_mut().expect("live stream attached");
    assert_eq!(drain_text(stream), "hello this is dog");
}

#[test]
fn buffer_true_forces_buffering_of_an_unknown_type() {
    let client = Client::new(Arc::new(ScriptedAgent::with_body(
        "application/x-custom",
        b"custom stuff",
    )));

    let response = Request::get(&client, "http://localhost:5000/custom")
        .buffer(true)
        .end()
        .expect("end");

    assert!(response.buffered());
    assert_eq!(response.text(), Some("custom stuff"));
    assert_eq!(response.body(), &json!({}));
}

#[test]
fn buffer_false_forces_streaming_of_a_json_response() {
    let client = echo_client();
    let mut response = Request::post(&client, ":5000/echo")
        .send(&json!({ "name": "tobi" }))
        .buffer(false)
        .end()
        .expect("end");

    assert!(!response.buffered());
    assert!(response.text().is_none());
    assert_eq!(response.body(), &json!({}));
    assert_eq!(
        drain_text(response.stream_mut().expect("stream")),
        r#"{"name":"tobi"}"#
    );
}

#[test]
fn text_subtypes_buffer_by_default() {
    let client = Client::new(Arc::new(ScriptedAgent::with_body(
        "text/html; charset=utf-8",
        b"<p>hi</p>",
    )));

    let response = Request::get(&client, ":5000/page").end().expect("end");
    assert!(response.buffered());
    assert_eq!(response.text(), Some("<p>hi</p>"));
}

#[test]
fn links_default_to_an_empty_mapping() {
    let client = Client::new(Arc::new(ScriptedAgent::with_body("text/plain", b"ok")));
    let response = Request::get(&client, ":5000/login").end().expect("end");
    assert!(response.links().is_empty());
}

#[test]
fn links_parse_the_link_header_field() {
    let agent = ScriptedAgent {
        status: StatusCode::OK,
        content_type: Some("text/plain"),
        extra_header: Some((
            "link",
            "<https://api.github.com/repos/visionmedia/mocha/issues?page=2>; rel=\"next\"",
        )),
        body: b"ok",
    };
    let client = Client::new(Arc::new(agent));

    let response = Request::get(&client, ":5000/links").end().expect("end");
    assert_eq!(
        response.links().get("next").map(String::as_str),
        Some("https://api.github.com/repos/visionmedia/mocha/issues?page=2")
    );
}

#[test]
fn agent_defaults_to_the_unset_sentinel() {
    let client = echo_client();
    let request = Request::post(&client, "http://localhost:5000/echo");
    assert!(request.selected_agent().is_default());
    assert!(request.selected_agent().custom().is_none());
}

#[test]
fn agent_none_is_distinguishable_from_unset() {
    let client = echo_client();
    let request = Request::get(&client, ":5000/echo").agent(None::<Arc<dyn Agent>>);
    assert!(request.selected_agent().is_disabled());
    assert!(!request.selected_agent().is_default());

    // Still dispatches over the client transport.
    let response = request.end().expect("end");
    assert!(response.ok());
}

#[test]
fn explicitly_set_agent_reads_back_as_the_same_reference() {
    let client = echo_client();
    let custom: Arc<dyn Agent> = Arc::new(EchoAgent);

    let request = Request::get(&client, ":5000/echo").agent(custom.clone());
    let selected = request
        .selected_agent()
        .custom()
        .expect("custom agent selected");
    assert!(Arc::ptr_eq(selected, &custom));
}

#[test]
fn explicit_agent_receives_the_dispatch() {
    let scripted: Arc<dyn Agent> =
        Arc::new(ScriptedAgent::with_body("text/plain", b"from the override"));
    let client = Client::new(Arc::new(RefusingAgent));

    let response = Request::get(&client, ":5000/echo")
        .agent(scripted)
        .end()
        .expect("override transport used");
    assert_eq!(response.text(), Some("from the override"));
}

#[test]
fn agent_selection_converts_from_options() {
    let selection = AgentSelection::from(None::<Arc<dyn Agent>>);
    assert!(selection.is_disabled());

    let agent: Arc<dyn Agent> = Arc::new(EchoAgent);
    let selection = AgentSelection::from(Some(agent));
    assert!(selection.custom().is_some());
}

#[derive(Default)]
struct CollectingSink {
    buf: Vec<u8>,
    ended: bool,
}

impl WriteSink for CollectingSink {
    fn write(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    fn end(&mut self) {
        self.ended = true;
    }
}

#[test]
fn pipe_forwards_chunks_and_signals_completion() {
    let client = echo_client();
    let mut sink = CollectingSink::default();

    let response = Request::post(&client, "http://localhost:5000/echo")
        .send(&json!("{\"name\":\"tobi\"}"))
        .pipe(&mut sink)
        .expect("pipe");

    assert!(sink.ended);
    assert_eq!(sink.buf, b"{\"name\":\"tobi\"}");
    assert!(!response.buffered());
    assert!(response.text().is_none());
    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn transport_failure_surfaces_through_end() {
    let client = Client::new(Arc::new(RefusingAgent));
    let error = Request::get(&client, ":5000/echo")
        .end()
        .expect_err("refused connection");
    assert!(error.is_transport());
    assert_eq!(client.stats().snapshot().transport_failures, 1);
}

#[test]
fn malformed_json_surfaces_a_decode_error() {
    let client = Client::new(Arc::new(ScriptedAgent::with_body(
        "application/json",
        b"not json at all",
    )));
    let error = Request::get(&client, ":5000/broken")
        .end()
        .expect_err("malformed body");
    assert!(error.is_decode());
}

#[test]
fn structured_body_without_codec_is_an_encode_error() {
    let client = echo_client();
    let error = Request::post(&client, ":5000/echo")
        .content_type("application/x-dog")
        .send(&json!({ "a": 1 }))
        .end()
        .expect_err("no codec applies");
    assert_eq!(error.kind(), Kind::Encode);
}

#[test]
fn registered_custom_codec_buffers_and_decodes() {
    let agent = ScriptedAgent::with_body("application/vnd.parley", b"hello");
    let client = Client::builder(Arc::new(agent))
        .codec(
            "application/vnd.parley",
            Codec::buffered().with_decode(|bytes| {
                Ok(json!({ "wrapped": String::from_utf8_lossy(bytes).into_owned() }))
            }),
        )
        .build();

    let response = Request::get(&client, ":5000/custom").end().expect("end");
    assert!(response.buffered());
    assert_eq!(response.body(), &json!({ "wrapped": "hello" }));
}
