//! HTTP adapters against a mock server.

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leadwatch::error::{FetchError, SinkError};
use leadwatch::report::{LeadSink, SlackSink};
use leadwatch::source::{Lead, PostSource, RedditListing, DEFAULT_USER_AGENT};

fn listing_body() -> serde_json::Value {
    json!({
        "kind": "Listing",
        "data": {
            "after": "t3_p2",
            "children": [
                {"kind": "t3", "data": {
                    "id": "p1",
                    "title": "Buying a house in Irvine",
                    "selftext": "",
                    "permalink": "/r/irvine/comments/p1/buying_a_house_in_irvine/"
                }},
                {"kind": "t3", "data": {
                    "id": "p2",
                    "title": "Best pizza place",
                    "selftext": "near UCI",
                    "permalink": "/r/irvine/comments/p2/best_pizza_place/"
                }}
            ]
        }
    })
}

#[tokio::test]
async fn test_reddit_listing_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/irvine/new.json"))
        .and(query_param("limit", "20"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
        .expect(1)
        .mount(&server)
        .await;

    let listing = RedditListing::new(server.uri(), 20).unwrap();
    let posts = listing.fetch("irvine").await.unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, "p1");
    assert_eq!(posts[1].body, "near UCI");
    assert_eq!(
        posts[0].permalink,
        "/r/irvine/comments/p1/buying_a_house_in_irvine/"
    );
}

#[tokio::test]
async fn test_reddit_listing_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/private_sub/new.json"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let listing = RedditListing::new(server.uri(), 20).unwrap();
    let err = listing.fetch("private_sub").await.unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 403, .. }));
}

#[tokio::test]
async fn test_reddit_listing_undecodable_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/irvine/new.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(&server)
        .await;

    let listing = RedditListing::new(server.uri(), 20).unwrap();
    let err = listing.fetch("irvine").await.unwrap_err();

    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn test_slack_sink_posts_leads() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_string_contains("1 new lead"))
        .and(body_string_contains("https://reddit.com/r/irvine/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let sink = SlackSink::new(format!("{}/hook", server.uri()));
    let leads = vec![Lead {
        source: "irvine".to_string(),
        title: "Buying a house in Irvine".to_string(),
        url: "https://reddit.com/r/irvine/p1".to_string(),
    }];

    sink.deliver(&leads).await.unwrap();
}

#[tokio::test]
async fn test_slack_sink_skips_empty_runs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let sink = SlackSink::new(format!("{}/hook", server.uri()));
    sink.deliver(&[]).await.unwrap();
}

#[tokio::test]
async fn test_slack_sink_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
        .mount(&server)
        .await;

    let sink = SlackSink::new(format!("{}/hook", server.uri()));
    let leads = vec![Lead {
        source: "irvine".to_string(),
        title: "t".to_string(),
        url: "u".to_string(),
    }];

    let err = sink.deliver(&leads).await.unwrap_err();
    assert!(matches!(err, SinkError::Status { status: 404, ref body } if body == "no_service"));
}
