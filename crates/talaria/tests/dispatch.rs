//! End-to-end dispatch scenarios: routing, body negotiation in both
//! directions, registry overrides and problem-detail rendering.

use bytes::Bytes;
use http::{Method, StatusCode};
use serde_json::json;
use std::sync::Arc;
use talaria::{
    Dispatcher, HandlerResponse, HttpError, MediaType, Negotiated, Payload, PayloadKind, Request,
    RequestContext, RequestDeserializer, ResponseSerializer, Route, RouteTable,
};

fn get_user(ctx: RequestContext) -> Result<HandlerResponse, HttpError> {
    let id = ctx
        .params
        .get_int("id")
        .ok_or_else(|| HttpError::internal("route guarantees an int id"))?;
    Ok(HandlerResponse::ok(Payload::Structured(
        json!({ "id": id, "name": "alice" }),
    )))
}

fn echo_body(ctx: RequestContext) -> Result<HandlerResponse, HttpError> {
    let body = ctx
        .body
        .ok_or_else(|| HttpError::internal("route declares a request body"))?;
    Ok(HandlerResponse::ok(body))
}

fn user_dispatcher() -> Dispatcher {
    let table = RouteTable::builder()
        .route(Route::get("/users/:id<int>", get_user))
        .build()
        .unwrap();
    Dispatcher::new(table)
}

fn body_str(response: &talaria::Response) -> String {
    String::from_utf8(response.body.to_vec()).unwrap()
}

#[test]
fn get_user_end_to_end() {
    let dispatcher = user_dispatcher();

    let response = dispatcher.dispatch(
        Request::new(Method::GET, "/users/42").with_accept("application/json"),
    );

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type, "application/json");
    let value: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(value, json!({ "id": 42, "name": "alice" }));
}

#[test]
fn absent_accept_header_defaults_to_wildcard() {
    let dispatcher = user_dispatcher();

    let response = dispatcher.dispatch(Request::new(Method::GET, "/users/7"));

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type, "application/json");
}

#[test]
fn literal_route_beats_placeholder_regardless_of_registration_order() {
    fn literal(_ctx: RequestContext) -> Result<HandlerResponse, HttpError> {
        Ok(HandlerResponse::ok("literal"))
    }
    fn by_id(_ctx: RequestContext) -> Result<HandlerResponse, HttpError> {
        Ok(HandlerResponse::ok("parameterized"))
    }

    // Placeholder route registered first on purpose.
    let table = RouteTable::builder()
        .route(Route::get("/orders/:id", by_id))
        .route(Route::get("/orders/api", literal))
        .build()
        .unwrap();
    let dispatcher = Dispatcher::new(table);

    let response = dispatcher.dispatch(
        Request::new(Method::GET, "/orders/api").with_accept("text/plain"),
    );
    assert_eq!(body_str(&response), "literal");

    let response = dispatcher.dispatch(
        Request::new(Method::GET, "/orders/42").with_accept("text/plain"),
    );
    assert_eq!(body_str(&response), "parameterized");
}

#[test]
fn unmatched_path_renders_404_problem_detail() {
    let dispatcher = user_dispatcher();

    let response = dispatcher.dispatch(
        Request::new(Method::GET, "/missing").with_accept("application/problem+json"),
    );

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.content_type, "application/problem+json");
    let problem: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(problem["status"], 404);
    assert_eq!(problem["title"], "Not Found");
    assert_eq!(problem["instance"], "/missing");
    assert!(problem["type"].as_str().unwrap().ends_with("/404"));
}

#[test]
fn wrong_method_renders_405() {
    let dispatcher = user_dispatcher();

    let response = dispatcher.dispatch(
        Request::new(Method::DELETE, "/users/42").with_accept("application/json"),
    );

    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    let problem: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert!(problem["detail"].as_str().unwrap().contains("DELETE"));
}

#[test]
fn unconvertible_path_parameter_renders_400_naming_the_parameter() {
    let dispatcher = user_dispatcher();

    let response = dispatcher.dispatch(
        Request::new(Method::GET, "/users/99999999999999999999999")
            .with_accept("application/json"),
    );

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let problem: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    let detail = problem["detail"].as_str().unwrap();
    assert!(detail.contains("id"));
    assert!(detail.contains("int"));
    assert!(detail.contains("99999999999999999999999"));
}

#[test]
fn error_negotiation_prefers_html_for_browsers() {
    let dispatcher = user_dispatcher();

    let response = dispatcher.dispatch(
        Request::new(Method::GET, "/missing")
            .with_accept("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.content_type, "text/html");
    let body = body_str(&response);
    assert!(body.contains("<title>404 Not Found</title>"));
    assert!(body.contains("<h1>Not Found</h1>"));
}

#[test]
fn malformed_accept_header_is_a_client_error() {
    let dispatcher = user_dispatcher();

    let response =
        dispatcher.dispatch(Request::new(Method::GET, "/users/42").with_accept("not a header"));

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[test]
fn json_body_deserialized_for_declared_route() {
    let table = RouteTable::builder()
        .route(Route::post("/echo", echo_body).with_request_body(PayloadKind::Structured))
        .build()
        .unwrap();
    let dispatcher = Dispatcher::new(table);

    let response = dispatcher.dispatch(
        Request::new(Method::POST, "/echo")
            .with_accept("application/json")
            .with_content_type("application/json")
            .with_body(&br#"{"a": 1}"#[..]),
    );

    assert_eq!(response.status, StatusCode::OK);
    let value: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(value, json!({"a": 1}));
}

#[test]
fn form_body_deserialized_to_structured_value() {
    let table = RouteTable::builder()
        .route(Route::post("/echo", echo_body).with_request_body(PayloadKind::Structured))
        .build()
        .unwrap();
    let dispatcher = Dispatcher::new(table);

    let response = dispatcher.dispatch(
        Request::new(Method::POST, "/echo")
            .with_accept("application/json")
            .with_content_type("application/x-www-form-urlencoded")
            .with_body(&b"a=1&b=two"[..]),
    );

    assert_eq!(response.status, StatusCode::OK);
    let value: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(value, json!({"a": "1", "b": "two"}));
}

#[test]
fn missing_content_type_defaults_to_text_plain() {
    let table = RouteTable::builder()
        .route(Route::post("/echo", echo_body).with_request_body(PayloadKind::Text))
        .build()
        .unwrap();
    let dispatcher = Dispatcher::new(table);

    let response = dispatcher.dispatch(
        Request::new(Method::POST, "/echo")
            .with_accept("text/plain")
            .with_body(&b"hello"[..]),
    );

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type, "text/plain");
    assert_eq!(body_str(&response), "hello");
}

#[test]
fn malformed_json_body_is_a_client_error() {
    let table = RouteTable::builder()
        .route(Route::post("/echo", echo_body).with_request_body(PayloadKind::Structured))
        .build()
        .unwrap();
    let dispatcher = Dispatcher::new(table);

    let response = dispatcher.dispatch(
        Request::new(Method::POST, "/echo")
            .with_accept("application/json")
            .with_content_type("application/json")
            .with_body(&b"{broken"[..]),
    );

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[test]
fn cleared_deserializers_render_415() {
    let table = RouteTable::builder()
        .route(Route::post("/echo", echo_body).with_request_body(PayloadKind::Structured))
        .build()
        .unwrap();
    let dispatcher = Dispatcher::new(table);
    dispatcher.deserializers().clear_all();

    let response = dispatcher.dispatch(
        Request::new(Method::POST, "/echo")
            .with_accept("application/json")
            .with_content_type("application/json")
            .with_body(&b"{}"[..]),
    );

    assert_eq!(response.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    dispatcher.deserializers().restore_defaults();
    let response = dispatcher.dispatch(
        Request::new(Method::POST, "/echo")
            .with_accept("application/json")
            .with_content_type("application/json")
            .with_body(&b"{}"[..]),
    );
    assert_eq!(response.status, StatusCode::OK);
}

struct MarkerDeserializer;

impl RequestDeserializer for MarkerDeserializer {
    fn content_types(&self) -> Option<&[&'static str]> {
        Some(&["application/json"])
    }

    fn target_kind(&self) -> PayloadKind {
        PayloadKind::Structured
    }

    fn deserialize(&self, _body: &Bytes, _ct: &MediaType) -> Result<Payload, HttpError> {
        Ok(Payload::Structured(json!({"overridden": true})))
    }
}

#[test]
fn custom_deserializer_overrides_default_until_restored() {
    let table = RouteTable::builder()
        .route(Route::post("/echo", echo_body).with_request_body(PayloadKind::Structured))
        .build()
        .unwrap();
    let dispatcher = Dispatcher::new(table);
    dispatcher
        .deserializers()
        .register_front(Arc::new(MarkerDeserializer));

    let request = || {
        Request::new(Method::POST, "/echo")
            .with_accept("application/json")
            .with_content_type("application/json")
            .with_body(&br#"{"a": 1}"#[..])
    };

    let response = dispatcher.dispatch(request());
    let value: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(value, json!({"overridden": true}));

    dispatcher.deserializers().restore_defaults();
    let response = dispatcher.dispatch(request());
    let value: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(value, json!({"a": 1}));
}

struct JsonOnlySerializer;

impl ResponseSerializer for JsonOnlySerializer {
    fn media_types(&self) -> &[&'static str] {
        &["application/json"]
    }

    fn payload_kind(&self) -> PayloadKind {
        PayloadKind::Structured
    }

    fn serialize(
        &self,
        payload: &Payload,
        negotiated: &Negotiated,
    ) -> Result<(Bytes, String), HttpError> {
        let value = payload
            .as_structured()
            .ok_or_else(|| HttpError::internal("structured only"))?;
        let bytes = serde_json::to_vec(value)
            .map_err(|err| HttpError::internal_with_source("encoding JSON", err))?;
        Ok((Bytes::from(bytes), negotiated.candidate.clone()))
    }
}

#[test]
fn unmatchable_accept_renders_406_as_plain_text() {
    let dispatcher = user_dispatcher();
    dispatcher.serializers().clear_all();
    dispatcher
        .serializers()
        .register_front(Arc::new(JsonOnlySerializer));

    let response = dispatcher.dispatch(
        Request::new(Method::GET, "/users/42").with_accept("application/xml"),
    );

    // Nothing matches application/xml, not even for the error payload, so
    // the dispatcher falls back to the direct plain-text rendering.
    assert_eq!(response.status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(response.content_type, "text/plain");
    assert!(body_str(&response).starts_with("406 Not Acceptable"));
}

#[test]
fn binary_payload_resolves_concrete_content_type() {
    fn download(_ctx: RequestContext) -> Result<HandlerResponse, HttpError> {
        Ok(HandlerResponse::ok(Payload::Binary(Bytes::from_static(
            b"a,b\n1,2\n",
        ))))
    }

    let table = RouteTable::builder()
        .route(Route::get("/export", download))
        .build()
        .unwrap();
    let dispatcher = Dispatcher::new(table);

    let response =
        dispatcher.dispatch(Request::new(Method::GET, "/export").with_accept("text/csv"));

    assert_eq!(response.status, StatusCode::OK);
    // The binary serializer's text/* candidate resolves against the accept
    // entry; no wildcard leaks onto the wire.
    assert_eq!(response.content_type, "text/csv");
    assert_eq!(&response.body[..], b"a,b\n1,2\n");
}

#[test]
fn handler_error_maps_to_its_status() {
    fn teapot(_ctx: RequestContext) -> Result<HandlerResponse, HttpError> {
        Err(HttpError::with_status(
            StatusCode::IM_A_TEAPOT,
            "short and stout",
        ))
    }

    let table = RouteTable::builder()
        .route(Route::get("/brew", teapot))
        .build()
        .unwrap();
    let dispatcher = Dispatcher::new(table);

    let response = dispatcher.dispatch(
        Request::new(Method::GET, "/brew").with_accept("application/problem+json"),
    );

    assert_eq!(response.status, StatusCode::IM_A_TEAPOT);
    let problem: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(problem["detail"], "short and stout");
}

#[test]
fn internal_error_detail_hidden_unless_debug() {
    fn boom(_ctx: RequestContext) -> Result<HandlerResponse, HttpError> {
        Err(HttpError::internal("connection pool exhausted"))
    }

    let table = || {
        RouteTable::builder()
            .route(Route::get("/boom", boom))
            .build()
            .unwrap()
    };

    let dispatcher = Dispatcher::new(table());
    let response = dispatcher.dispatch(
        Request::new(Method::GET, "/boom").with_accept("application/problem+json"),
    );
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let problem: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(problem["detail"], "An unexpected error occurred.");

    let debug_dispatcher =
        Dispatcher::with_config(table(), talaria::DispatcherConfig { debug: true });
    let response = debug_dispatcher.dispatch(
        Request::new(Method::GET, "/boom").with_accept("application/problem+json"),
    );
    let problem: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert!(problem["detail"]
        .as_str()
        .unwrap()
        .contains("connection pool exhausted"));
}

#[test]
fn quality_ordering_selects_higher_quality_representation() {
    let dispatcher = user_dispatcher();

    // text/plain is preferred; the structured payload is JSON-encoded but
    // served as text/plain by the structured-to-text serializer.
    let response = dispatcher.dispatch(
        Request::new(Method::GET, "/users/42")
            .with_accept("application/json;q=0.4, text/plain;q=0.9"),
    );

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type, "text/plain");
    let value: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(value["id"], 42);
}

#[test]
fn dispatcher_is_shareable_across_threads() {
    let dispatcher = Arc::new(user_dispatcher());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let dispatcher = Arc::clone(&dispatcher);
            std::thread::spawn(move || {
                let response = dispatcher.dispatch(
                    Request::new(Method::GET, format!("/users/{i}"))
                        .with_accept("application/json"),
                );
                assert_eq!(response.status, StatusCode::OK);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
