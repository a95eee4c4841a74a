use http::Method;
use httpmock::MockServer;
use serde::Deserialize;
use serde_json::json;
use service_request::http_client::reqwest::ReqwestHttpClient;
use service_request::{BuildRequest, Field, ResponseExt, Result, ServiceError, ServiceRequest};

use crate::common::blog_settings;

mod common;

const TITLE: Field<String> = Field::new("title");
const BODY: Field<String> = Field::new("body");

struct CreatePost;

impl BuildRequest for CreatePost {
    fn build_request<'a>(&self, request: ServiceRequest<'a>) -> Result<ServiceRequest<'a>> {
        let payload = json!({
            "title": request.value(&TITLE).cloned().unwrap_or_default(),
            "body": request.value(&BODY).cloned().unwrap_or_default(),
        });
        Ok(request.with_request(payload))
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct Post {
    id: u32,
    title: String,
}

#[test]
fn get_with_path_and_query_parameters() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::GET)
            .path("/api/v1/posts/7")
            .query_param("expand", "author")
            .header("accept", "application/json")
            .header("x-auth-token", "SuperSecretToken");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"id": 7, "title": "Hello"}));
    });
    let settings = blog_settings(&server);
    let client = ReqwestHttpClient::default();

    let response = ServiceRequest::new(&settings, "blog", "/posts/{id}")
        .unwrap()
        .with_header("X-Auth-Token", "SuperSecretToken")
        .with_path_parameter("id", 7)
        .with_query_parameter("expand", "author")
        .execute(&client, Method::GET, true)
        .unwrap();

    mock.assert();
    assert_eq!(
        Post {
            id: 7,
            title: String::from("Hello")
        },
        response.json::<Post>().unwrap()
    );
    assert_eq!(Some("application/json"), response.header_str("content-type"));
}

#[test]
fn post_built_from_typed_values() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::POST)
            .path("/api/v1/posts")
            .json_body(json!({"title": "Hello", "body": "World"}));
        then.status(201).json_body(json!({"id": 8, "title": "Hello"}));
    });
    let settings = blog_settings(&server);
    let client = ReqwestHttpClient::default();

    let response = ServiceRequest::new(&settings, "blog", "/posts")
        .unwrap()
        .with_value(&TITLE, String::from("Hello"))
        .with_value(&BODY, String::from("World"))
        .build(&CreatePost)
        .unwrap()
        .execute(&client, Method::POST, true)
        .unwrap();

    mock.assert();
    assert_eq!(201, response.status().as_u16());
    assert_eq!(8, response.json::<Post>().unwrap().id);
}

#[test]
fn get_drops_the_body() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::GET)
            .path("/api/v1/posts")
            .matches(|req| req.body.as_ref().map_or(true, |body| body.is_empty()));
        then.status(200).json_body(json!([]));
    });
    let settings = blog_settings(&server);
    let client = ReqwestHttpClient::default();

    ServiceRequest::new(&settings, "blog", "/posts")
        .unwrap()
        .with_request(json!({"title": "never sent"}))
        .execute(&client, Method::GET, true)
        .unwrap();

    mock.assert();
}

#[test]
fn expected_failure() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::DELETE).path("/api/v1/posts/99");
        then.status(404);
    });
    let settings = blog_settings(&server);
    let client = ReqwestHttpClient::default();

    let response = ServiceRequest::new(&settings, "blog", "/posts/{id}")
        .unwrap()
        .with_path_parameter("id", 99)
        .execute(&client, Method::DELETE, false)
        .unwrap();

    mock.assert();
    assert_eq!(404, response.status().as_u16());
}

#[test]
fn unexpected_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.path("/api/v1/posts");
        then.status(500);
    });
    let settings = blog_settings(&server);
    let client = ReqwestHttpClient::default();

    let err = ServiceRequest::new(&settings, "blog", "/posts")
        .unwrap()
        .execute(&client, Method::GET, true)
        .unwrap_err();

    match err.downcast_ref::<ServiceError>() {
        Some(ServiceError::UnexpectedStatus { status, url, .. }) => {
            assert_eq!(500, status.as_u16());
            assert!(url.ends_with("/api/v1/posts"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn unknown_service_never_reaches_the_server() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.any_request();
        then.status(200);
    });
    let settings = blog_settings(&server);

    let err = ServiceRequest::new(&settings, "shop", "/orders").unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ServiceError>(),
        Some(ServiceError::UnknownService(_))
    ));
    mock.assert_hits(0);
}
