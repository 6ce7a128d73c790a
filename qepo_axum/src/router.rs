//! The complete application router

use axum::Router;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Pages at the root plus the JSON API under `/api`, with HTTP tracing
pub fn qepo_router() -> Router {
    qepo_router_no_trace().layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as [`qepo_router`] without the tracing layer, for applications
/// that install their own
pub fn qepo_router_no_trace() -> Router {
    Router::new()
        .merge(super::pages::router())
        .nest("/api", super::api::router())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use axum::body::Body;
    use http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use serial_test::serial;

    async fn app() -> Router {
        init_test_environment().await;
        qepo_router_no_trace()
    }

    #[tokio::test]
    #[serial]
    async fn test_home_follows_auth_state() {
        let app = app().await;

        let body = body_string(send(&app, get("/", None)).await).await;
        assert!(body.contains(r#"href="/login""#));
        assert!(!body.contains("Keluar"));

        let cookie = signed_in(&app, &unique_email("home")).await;
        let body = body_string(send(&app, get("/", Some(&cookie))).await).await;
        assert!(body.contains("Keluar"));
    }

    #[tokio::test]
    #[serial]
    async fn test_guards_redirect_home() {
        let app = app().await;

        let response = send(&app, get("/profile", None)).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), Some("/"));

        let cookie = signed_in(&app, &unique_email("guard")).await;
        for page in ["/login", "/register"] {
            let response = send(&app, get(page, Some(&cookie))).await;
            assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
            assert_eq!(location(&response), Some("/"));
        }

        let response = send(&app, get("/profile", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("X-CSRF-Token"));
    }

    #[tokio::test]
    #[serial]
    async fn test_register_resets_form() {
        let app = app().await;
        let email = unique_email("reg");

        let response = send(
            &app,
            form_post(
                "/register",
                None,
                &[("email", &email), ("password", TEST_PASSWORD)],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("Register success"));
        assert!(body.contains(r#"value="""#));
        assert!(!body.contains(&email));
    }

    #[tokio::test]
    #[serial]
    async fn test_register_invalid_password_shows_field_error() {
        let app = app().await;
        let response = send(
            &app,
            form_post(
                "/register",
                None,
                &[("email", "a@b.com"), ("password", "abcdefgh")],
            ),
        )
        .await;
        let body = body_string(response).await;
        assert!(body.contains("Password must contain at least one uppercase letter"));
    }

    #[tokio::test]
    #[serial]
    async fn test_wrong_password_stays_on_login() {
        let app = app().await;
        let email = unique_email("wrong");
        signed_in(&app, &email).await;

        let response = send(
            &app,
            form_post(
                "/login",
                None,
                &[("email", &email), ("password", "Abcdef1?")],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert_eq!(body.matches("Email atau password salah").count(), 2);
        assert!(body.contains(&email));
    }

    #[tokio::test]
    #[serial]
    async fn test_login_flashes_once() {
        let app = app().await;
        let email = unique_email("flash");
        signed_in(&app, &email).await;

        let login = send(
            &app,
            form_post(
                "/login",
                None,
                &[("email", &email), ("password", TEST_PASSWORD)],
            ),
        )
        .await;
        assert_eq!(location(&login), Some("/"));

        let cookie = cookies_from(&login);
        let home = send(&app, get("/", Some(&cookie))).await;
        let cleared = home
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .any(|v| v.to_str().unwrap().starts_with("qepo_flash=;"));
        assert!(cleared);
        assert!(body_string(home).await.contains("Login success"));
    }

    #[tokio::test]
    #[serial]
    async fn test_oauth_start_and_callback() {
        let app = app().await;

        let start = send(&app, get("/login/google", None)).await;
        assert_eq!(start.status(), StatusCode::SEE_OTHER);
        let provider_url = location(&start).unwrap().to_string();
        assert!(provider_url.contains("/callback?code="));

        // The in-memory provider redirects straight back to the callback
        let callback_path = provider_url[provider_url.find("/callback").unwrap()..].to_string();
        let callback = send(&app, get(&callback_path, Some(&cookies_from(&start)))).await;
        assert_eq!(location(&callback), Some("/"));

        let cookie = cookies_from(&callback);
        let profile = send(&app, get("/profile", Some(&cookie))).await;
        assert_eq!(profile.status(), StatusCode::OK);
    }

    #[tokio::test]
    #[serial]
    async fn test_callback_without_session_goes_to_login() {
        let app = app().await;
        let response = send(&app, get("/callback", None)).await;
        assert_eq!(location(&response), Some("/login"));
    }

    #[tokio::test]
    #[serial]
    async fn test_logout_ends_session() {
        let app = app().await;
        let cookie = signed_in(&app, &unique_email("bye")).await;

        let response = send(&app, get("/logout", Some(&cookie))).await;
        assert_eq!(location(&response), Some("/"));
        let set_cookies: Vec<_> = response.headers().get_all(header::SET_COOKIE).iter().collect();
        assert!(set_cookies.iter().any(|v| v.to_str().unwrap().contains("Max-Age=-86400")));

        let response = send(&app, get("/profile", Some(&cookie))).await;
        assert_eq!(location(&response), Some("/"));
    }

    #[tokio::test]
    #[serial]
    async fn test_profile_form_updates_and_checks_csrf() {
        let app = app().await;
        let cookie = signed_in(&app, &unique_email("form")).await;
        let token = csrf_token(&app, &cookie).await;

        let forged = send(
            &app,
            form_post(
                "/profile",
                Some(&cookie),
                &[("username", "nama baru"), ("bio", ""), ("csrf_token", "forged")],
            ),
        )
        .await;
        assert_eq!(forged.status(), StatusCode::FORBIDDEN);

        let username = format!("budi{}", std::process::id());
        let response = send(
            &app,
            form_post(
                "/profile",
                Some(&cookie),
                &[("username", &username), ("bio", "halo"), ("csrf_token", &token)],
            ),
        )
        .await;
        // No profile row yet, so the update is refused with a toast
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("Gagal update profile"));

        let created = send(
            &app,
            json_request(Method::POST, "/api/profile", &cookie, Some(&token), json!({})),
        )
        .await;
        assert_eq!(created.status(), StatusCode::OK);

        let response = send(
            &app,
            form_post(
                "/profile",
                Some(&cookie),
                &[("username", &username), ("bio", "halo"), ("csrf_token", &token)],
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/profile"));

        let follow = format!("{cookie}; {}", cookies_from(&response));
        let page = send(&app, get("/profile", Some(&follow))).await;
        let body = body_string(page).await;
        assert!(body.contains(&username));
        assert!(body.contains("halo"));
        assert!(body.contains("Berhasil update profile"));

        // A form posted by script may carry the token in the header instead
        let mut scripted = form_post(
            "/profile",
            Some(&cookie),
            &[("username", &username), ("bio", "halo lagi")],
        );
        scripted
            .headers_mut()
            .insert("X-CSRF-Token", token.parse().unwrap());
        let response = send(&app, scripted).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    #[serial]
    async fn test_api_profile_lifecycle() {
        let app = app().await;

        let anonymous = send(&app, get("/api/profile", None)).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_str(&body_string(anonymous).await).unwrap();
        assert_eq!(body["code"], "UNAUTHORIZED");

        let cookie = signed_in(&app, &unique_email("api")).await;
        let token = csrf_token(&app, &cookie).await;

        let none = send(&app, get("/api/profile", Some(&cookie))).await;
        assert_eq!(body_string(none).await, "null");

        let no_header = send(
            &app,
            json_request(Method::POST, "/api/profile", &cookie, None, json!({})),
        )
        .await;
        assert_eq!(no_header.status(), StatusCode::UNAUTHORIZED);

        let created = send(
            &app,
            json_request(Method::POST, "/api/profile", &cookie, Some(&token), json!({})),
        )
        .await;
        assert_eq!(created.status(), StatusCode::OK);

        let username = format!("api{}", std::process::id());
        let patched = send(
            &app,
            json_request(
                Method::PATCH,
                "/api/profile",
                &cookie,
                Some(&token),
                json!({"username": username, "bio": "dari api"}),
            ),
        )
        .await;
        assert_eq!(patched.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(patched).await).unwrap();
        assert_eq!(body["username"], username.as_str());
        assert_eq!(body["bio"], "dari api");

        let invalid = send(
            &app,
            json_request(
                Method::PATCH,
                "/api/profile",
                &cookie,
                Some(&token),
                json!({"username": "ab"}),
            ),
        )
        .await;
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_string(invalid).await).unwrap();
        assert!(body["fields"]["username"].is_string());

        // A second account cannot take the same username
        let other = signed_in(&app, &unique_email("api2")).await;
        let other_token = csrf_token(&app, &other).await;
        send(
            &app,
            json_request(Method::POST, "/api/profile", &other, Some(&other_token), json!({})),
        )
        .await;
        let conflict = send(
            &app,
            json_request(
                Method::PATCH,
                "/api/profile",
                &other,
                Some(&other_token),
                json!({"username": username}),
            ),
        )
        .await;
        assert_eq!(conflict.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = serde_json::from_str(&body_string(conflict).await).unwrap();
        assert_eq!(body["code"], "USERNAME_USED");
    }

    #[tokio::test]
    #[serial]
    async fn test_api_picture_upload_is_served() {
        let app = app().await;
        let cookie = signed_in(&app, &unique_email("pic")).await;
        let token = csrf_token(&app, &cookie).await;
        send(
            &app,
            json_request(Method::POST, "/api/profile", &cookie, Some(&token), json!({})),
        )
        .await;

        // "iVBORw==" is the start of a PNG signature
        let uploaded = send(
            &app,
            json_request(
                Method::PUT,
                "/api/profile/picture",
                &cookie,
                Some(&token),
                json!({"image": "iVBORw=="}),
            ),
        )
        .await;
        assert_eq!(uploaded.status(), StatusCode::NO_CONTENT);

        let profile = send(&app, get("/api/profile", Some(&cookie))).await;
        let body: Value = serde_json::from_str(&body_string(profile).await).unwrap();
        let url = body["profile_picture_url"].as_str().unwrap().to_string();
        assert!(url.starts_with("/storage/avatar/avatar-"));

        let path = url.split('?').next().unwrap();
        let object = send(&app, get(path, None)).await;
        assert_eq!(object.status(), StatusCode::OK);
        assert_eq!(object.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");

        let missing = send(&app, get("/storage/avatar/nothing.png", None)).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    async fn put_picture_of_size(app: &Router, cookie: &str, token: &str, size: usize) -> StatusCode {
        use base64::{Engine as _, engine::general_purpose::STANDARD};

        let image = STANDARD.encode(vec![0x5a_u8; size]);
        send(
            app,
            json_request(
                Method::PUT,
                "/api/profile/picture",
                cookie,
                Some(token),
                json!({ "image": image }),
            ),
        )
        .await
        .status()
    }

    #[tokio::test]
    #[serial]
    async fn test_api_picture_accepts_images_up_to_the_avatar_limit() {
        let app = app().await;
        let cookie = signed_in(&app, &unique_email("bigpic")).await;
        let token = csrf_token(&app, &cookie).await;
        send(
            &app,
            json_request(Method::POST, "/api/profile", &cookie, Some(&token), json!({})),
        )
        .await;

        // Base64 of a 1.9 MB image is larger than axum's default body limit
        let near_limit = put_picture_of_size(&app, &cookie, &token, 1_900_000).await;
        assert_eq!(near_limit, StatusCode::NO_CONTENT);

        let at_limit = put_picture_of_size(&app, &cookie, &token, *qepo::AVATAR_MAX_BYTES).await;
        assert_eq!(at_limit, StatusCode::NO_CONTENT);

        // Just over the limit reaches the profile service and is an invalid image
        let too_big =
            put_picture_of_size(&app, &cookie, &token, *qepo::AVATAR_MAX_BYTES + 1).await;
        assert_eq!(too_big, StatusCode::BAD_REQUEST);
    }

    fn avatar_upload(cookie: &str, token: &str) -> Request<Body> {
        let boundary = "qepoboundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"csrf_token\"\r\n\r\n{token}\r\n\
             --{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"a.png\"\r\n\
             Content-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(&[0x89, b'P', b'N', b'G']);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::post("/profile/avatar")
            .header(header::COOKIE, cookie)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    #[serial]
    async fn test_avatar_editor_select_save_remove() {
        let app = app().await;
        let cookie = signed_in(&app, &unique_email("avatar")).await;
        let token = csrf_token(&app, &cookie).await;
        send(
            &app,
            json_request(Method::POST, "/api/profile", &cookie, Some(&token), json!({})),
        )
        .await;

        let response = send(&app, avatar_upload(&cookie, &token)).await;
        assert_eq!(location(&response), Some("/profile"));

        let page = body_string(send(&app, get("/profile", Some(&cookie))).await).await;
        assert!(page.contains(";base64,"));
        assert!(page.contains(r#"action="/profile/avatar/save""#));

        let remove = send(
            &app,
            form_post("/profile/avatar/remove", Some(&cookie), &[("csrf_token", &token)]),
        )
        .await;
        assert_eq!(location(&remove), Some("/profile"));
        let page = body_string(send(&app, get("/profile", Some(&cookie))).await).await;
        assert!(!page.contains(";base64,"));
        assert!(!page.contains(r#"action="/profile/avatar/save""#));

        send(&app, avatar_upload(&cookie, &token)).await;

        let save = send(
            &app,
            form_post("/profile/avatar/save", Some(&cookie), &[("csrf_token", &token)]),
        )
        .await;
        assert_eq!(location(&save), Some("/profile"));

        let page = send(
            &app,
            get(
                "/profile",
                Some(&format!("{cookie}; {}", cookies_from(&save))),
            ),
        )
        .await;
        let page = body_string(page).await;
        assert!(page.contains("Berhasil mengubah foto profil"));
        // The stored, cache-busted picture replaces the preview
        assert!(page.contains(".png?t="));
        assert!(!page.contains(";base64,"));
    }
}
