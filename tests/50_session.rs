mod common;

use anyhow::Result;
use axum::http::StatusCode;

use instant_api::session::{self, SessionConfig, SessionOptions};

fn cookie_config() -> SessionConfig {
    SessionConfig {
        kind: "cookie".to_string(),
        options: SessionOptions {
            secret: Some("keyboard cat".to_string()),
            ..SessionOptions::default()
        },
    }
}

/// First `name=value` pair of a Set-Cookie header.
fn cookie_pair(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get("set-cookie")?
        .to_str()
        .ok()?
        .split(';')
        .next()
        .map(str::to_owned)
}

#[tokio::test]
async fn server_sessions_issue_a_cookie_once() -> Result<()> {
    let strategy = session::resolve(&SessionConfig::default())?;
    let app = strategy.apply(common::resource_app("users"));

    let (status, headers, _) = common::send(&app, "GET", "/users", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    let cookie = cookie_pair(&headers).expect("fresh session sets a cookie");
    assert!(cookie.starts_with("instant.sid="));

    // Replaying the cookie resumes the session instead of minting a new one.
    let (status, headers, _) =
        common::send(&app, "GET", "/users", &[("cookie", &cookie)], None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie_pair(&headers).is_none());
    Ok(())
}

#[tokio::test]
async fn server_session_cookie_carries_the_configured_attributes() -> Result<()> {
    let config = SessionConfig {
        kind: "server".to_string(),
        options: SessionOptions {
            name: "sid".to_string(),
            max_age_secs: Some(3600),
            secure: true,
            ..SessionOptions::default()
        },
    };
    let strategy = session::resolve(&config)?;
    let app = strategy.apply(common::resource_app("users"));

    let (_, headers, _) = common::send(&app, "GET", "/users", &[], None).await;
    let raw = headers.get("set-cookie").unwrap().to_str()?.to_string();
    assert!(raw.starts_with("sid="));
    assert!(raw.contains("Max-Age=3600"));
    assert!(raw.contains("HttpOnly"));
    assert!(raw.contains("Secure"));
    Ok(())
}

#[tokio::test]
async fn cookie_sessions_round_trip_a_signed_payload() -> Result<()> {
    let strategy = session::resolve(&cookie_config())?;
    let app = strategy.apply(common::resource_app("users"));

    let (status, headers, _) = common::send(&app, "GET", "/users", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    let cookie = cookie_pair(&headers).expect("fresh session sets a cookie");

    // A valid, unmodified session cookie is accepted silently.
    let (status, headers, _) =
        common::send(&app, "GET", "/users", &[("cookie", &cookie)], None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie_pair(&headers).is_none());
    Ok(())
}

#[tokio::test]
async fn tampered_cookie_starts_a_fresh_session() -> Result<()> {
    let strategy = session::resolve(&cookie_config())?;
    let app = strategy.apply(common::resource_app("users"));

    let forged = "instant.sid=Zm9yZ2Vk.bm90LWEtc2lnbmF0dXJl";
    let (status, headers, _) =
        common::send(&app, "GET", "/users", &[("cookie", forged)], None).await;

    // Request still succeeds, and a fresh signed cookie replaces the forgery.
    assert_eq!(status, StatusCode::OK);
    let reissued = cookie_pair(&headers).expect("fresh session reissued");
    assert_ne!(reissued, forged);
    Ok(())
}
