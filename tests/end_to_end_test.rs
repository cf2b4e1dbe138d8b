use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use futures::StreamExt;
use movies_service::{app, Movie, MovieInfo, ServiceConfig};
use serde_json::json;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Serves `router` on an ephemeral local port and returns its base URL.
async fn spawn_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

struct Backends {
    movie_info_url: String,
    reviews_url: String,
    movies: Router,
}

async fn start_backends() -> Backends {
    let defaults = ServiceConfig::default();
    let (movie_info_router, _) = app::movie_info_app(&defaults);
    let (reviews_router, _) = app::reviews_app(&defaults);
    let movie_info_base = spawn_backend(movie_info_router).await;
    let reviews_base = spawn_backend(reviews_router).await;

    let movie_info_url = format!("{}/v1/movieinfos", movie_info_base);
    let reviews_url = format!("{}/v1/reviews", reviews_base);
    let mut config = ServiceConfig::default();
    config.clients.movie_info_url = movie_info_url.clone();
    config.clients.reviews_url = reviews_url.clone();
    config.retry.fixed_delay_ms = 10;

    Backends {
        movie_info_url,
        reviews_url,
        movies: app::movies_app(&config).unwrap(),
    }
}

async fn post(url: &str, body: serde_json::Value) {
    let response = reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
}

#[tokio::test]
async fn test_movie_composed_from_running_backends() {
    let backends = start_backends().await;
    post(
        &backends.movie_info_url,
        json!({
            "movieInfoId": "1",
            "name": "Batman Begins",
            "year": 2005,
            "cast": ["Christian Bale", "Michael Cane"],
            "releaseDate": "2005-06-15"
        }),
    )
    .await;
    post(
        &backends.reviews_url,
        json!({"movieInfoId": 1, "comment": "Awesome Movie", "rating": 9.0}),
    )
    .await;
    post(
        &backends.reviews_url,
        json!({"movieInfoId": 2, "comment": "Other Movie", "rating": 5.0}),
    )
    .await;

    let response = backends
        .movies
        .clone()
        .oneshot(Request::builder().uri("/v1/movies/1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let movie: Movie = serde_json::from_slice(&body).unwrap();
    assert_eq!(movie.movie_info.name, "Batman Begins");
    assert_eq!(movie.reviews.len(), 1);
    assert_eq!(movie.reviews[0].comment, "Awesome Movie");

    let response = backends
        .movies
        .oneshot(Request::builder().uri("/v1/movies/42").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_movies_stream_relays_backend_feed() {
    let backends = start_backends().await;
    post(
        &backends.movie_info_url,
        json!({
            "name": "Batman Begins",
            "year": 2005,
            "cast": ["Christian Bale"],
            "releaseDate": "2005-06-15"
        }),
    )
    .await;

    let response = backends
        .movies
        .oneshot(Request::builder().uri("/v1/movies/stream").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    post(
        &backends.movie_info_url,
        json!({
            "name": "The Dark Knight",
            "year": 2008,
            "cast": ["Christian Bale", "Heath Ledger"],
            "releaseDate": "2008-07-18"
        }),
    )
    .await;

    let mut body = response.into_body().into_data_stream();
    let mut buffer = String::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        while buffer.lines().count() < 2 {
            let chunk = body.next().await.unwrap().unwrap();
            buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    })
    .await
    .unwrap();

    let names: Vec<String> = buffer
        .lines()
        .map(|line| serde_json::from_str::<MovieInfo>(line).unwrap().name)
        .collect();
    assert_eq!(names, vec!["Batman Begins", "The Dark Knight"]);
}
