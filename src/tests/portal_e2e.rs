//! Full-router scenarios: gate redirects, the emailed-link onboarding flow,
//! and the admin and portal JSON surfaces.

use axum::http::StatusCode;
use chrono::NaiveDate;
use serde_json::json;

use super::*;
use crate::{
    auth::PkceChallenge,
    db::tests::company_input,
    models::{CreateInvestment, UpdateContent},
};

const TEMP: StatusCode = StatusCode::TEMPORARY_REDIRECT;
const SEE_OTHER: StatusCode = StatusCode::SEE_OTHER;

// ============================================================================
// Gate
// ============================================================================

#[tokio::test]
async fn test_anonymous_is_sent_to_login() {
    let app = TestApp::new().await;

    for path in ["/", "/portal", "/portal/stats", "/admin", "/admin/lps", "/auth/setup-password"] {
        let response = app.get(path, None).await;
        assert_redirect(&response, TEMP, "/login");
    }

    let response = app.get("/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["view"], "login");
}

#[tokio::test]
async fn test_signed_in_users_are_sent_home_from_login() {
    let app = TestApp::new().await;
    let (_, lp) = app.lp_user("lp@example.com", vec![]).await;
    let (_, admin) = app.admin_user("admin@example.com").await;

    let response = app.get("/login", Some(&app.cookie_for(&lp))).await;
    assert_redirect(&response, TEMP, "/portal");

    let response = app.get("/login", Some(&app.cookie_for(&admin))).await;
    assert_redirect(&response, TEMP, "/admin");
}

#[tokio::test]
async fn test_lp_cannot_reach_admin() {
    let app = TestApp::new().await;
    let (_, session) = app.lp_user("lp@example.com", vec![]).await;

    let response = app.get("/admin/funds", Some(&app.cookie_for(&session))).await;
    assert_redirect(&response, TEMP, "/portal");
}

#[tokio::test]
async fn test_admin_can_reach_portal_and_admin() {
    let app = TestApp::new().await;
    let (_, session) = app.admin_user("admin@example.com").await;
    let cookie = app.cookie_for(&session);

    assert_eq!(app.get("/admin", Some(&cookie)).await.status(), StatusCode::OK);
    let response = app.get("/portal/stats", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["message"], "No fund access.");
}

#[tokio::test]
async fn test_session_without_profile_is_sent_to_setup() {
    let app = TestApp::new().await;
    let (_, session) = app.identity_user("new@example.com");
    let cookie = app.cookie_for(&session);

    for path in ["/login", "/portal", "/admin"] {
        let response = app.get(path, Some(&cookie)).await;
        assert_redirect(&response, TEMP, "/auth/setup-password");
    }

    let response = app.get("/auth/setup-password", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["email"], "new@example.com");
}

#[tokio::test]
async fn test_expiring_session_is_renewed_in_cookie() {
    let app = TestApp::new().await;
    let (user, _) = app.lp_user("lp@example.com", vec![]).await;
    let expiring = app.identity.issue_expiring_session(&user);

    let response = app.get("/portal", Some(&app.cookie_for(&expiring))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    let renewed = SessionCookie::decode(cookies["lp_portal_session"].value()).unwrap();
    assert_ne!(renewed.access_token, expiring.access_token);
    assert_eq!(renewed.user_id, user.id);
    assert_eq!(app.identity.calls(), vec!["refresh_session"]);
}

#[tokio::test]
async fn test_renewed_cookie_is_set_on_redirects() {
    let app = TestApp::new().await;
    let (admin, _) = app.admin_user("admin@example.com").await;

    for (path, to) in [("/login", "/admin"), ("/", "/login"), ("/admin", "")] {
        let expiring = app.identity.issue_expiring_session(&admin);

        let response = app.get(path, Some(&app.cookie_for(&expiring))).await;

        if to.is_empty() {
            assert_eq!(response.status(), StatusCode::OK);
        } else {
            assert_redirect(&response, TEMP, to);
        }
        let cookies = set_cookies(&response);
        let renewed = SessionCookie::decode(cookies["lp_portal_session"].value()).unwrap();
        assert_ne!(renewed.access_token, expiring.access_token, "{path}");
        assert_eq!(renewed.user_id, admin.id);
    }
}

#[tokio::test]
async fn test_revoked_session_cookie_is_cleared() {
    let app = TestApp::new().await;
    let (_, session) = app.lp_user("lp@example.com", vec![]).await;
    let cookie = app.cookie_for(&session);
    app.identity.sign_out(&session.access_token).await;

    let response = app.get("/portal", Some(&cookie)).await;

    assert_redirect(&response, TEMP, "/login");
    let cookies = set_cookies(&response);
    let removed = &cookies["lp_portal_session"];
    assert_eq!(removed.value(), "");
    assert_eq!(
        removed.max_age(),
        Some(tower_cookies::cookie::time::Duration::ZERO)
    );
}

#[tokio::test]
async fn test_excluded_paths_skip_the_gate() {
    let app = TestApp::new().await;

    let response = app
        .get("/favicon.ico", Some("lp_portal_session=garbage"))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(set_cookies(&response).is_empty());
    assert!(app.identity.calls().is_empty());
}

#[tokio::test]
async fn test_identity_outage_keeps_cookie() {
    let app = TestApp::new().await;
    let (_, session) = app.lp_user("lp@example.com", vec![]).await;
    app.identity.set_unavailable(true);

    let response = app.get("/portal", Some(&app.cookie_for(&session))).await;

    assert_redirect(&response, TEMP, "/login");
    assert!(set_cookies(&response).is_empty());
}

// ============================================================================
// Auth actions
// ============================================================================

#[tokio::test]
async fn test_check_email_statuses() {
    let app = TestApp::new().await;
    app.lp_user("existing@example.com", vec![]).await;
    app.ctx.create_test_lp("new@example.com", vec![]).await;

    for (email, expected) in [
        ("stranger@example.com", "not_allowed"),
        ("  Existing@Example.com ", "existing_user"),
        ("new@example.com", "new_user"),
    ] {
        let response = app
            .send_json("POST", "/auth/check-email", None, json!({ "email": email }))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], expected, "{email}");
    }
}

#[tokio::test]
async fn test_magic_link_through_setup_to_portal() {
    let app = TestApp::new().await;
    let fund = app.ctx.create_test_fund("fund-i").await;
    app.ctx.create_test_lp("lp@example.com", vec![fund]).await;

    // Request the link
    let response = app
        .send_json(
            "POST",
            "/auth/magic-link",
            None,
            json!({ "email": "LP@example.com" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let verifier = set_cookies(&response)["lp_portal_session-code-verifier"]
        .value()
        .to_string();
    assert_eq!(json_body(response).await["sent"], true);

    let links = app.identity.sent_links();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].email, "lp@example.com");
    assert_eq!(links[0].redirect_to, "http://localhost:8080/auth/callback");
    assert_eq!(links[0].code_challenge, PkceChallenge::challenge_for(&verifier));

    // Follow it
    let user = ProviderUser {
        id: Uuid::new_v4(),
        email: "lp@example.com".into(),
    };
    app.identity.add_code("link-code", &user);
    let response = app
        .get(
            "/auth/callback?code=link-code",
            Some(&format!("lp_portal_session-code-verifier={verifier}")),
        )
        .await;
    assert_redirect(&response, SEE_OTHER, "/auth/setup-password");
    let cookies = set_cookies(&response);
    assert_eq!(cookies["lp_portal_session-code-verifier"].value(), "");
    let session_cookie = format!(
        "lp_portal_session={}",
        cookies["lp_portal_session"].value()
    );

    // Mid-setup identities cannot reach content yet
    let response = app.get("/portal", Some(&session_cookie)).await;
    assert_redirect(&response, TEMP, "/auth/setup-password");

    // Weak and mismatched passwords are refused
    let response = app
        .send_json(
            "POST",
            "/auth/setup-password",
            Some(&session_cookie),
            json!({ "password": "weak", "confirm": "weak" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = app
        .send_json(
            "POST",
            "/auth/setup-password",
            Some(&session_cookie),
            json!({ "password": "Sup3rSecret", "confirm": "Sup3rSecreT" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.identity.updated_passwords().is_empty());

    let response = app
        .send_json(
            "POST",
            "/auth/setup-password",
            Some(&session_cookie),
            json!({ "password": "Sup3rSecret", "confirm": "Sup3rSecret" }),
        )
        .await;
    assert_redirect(&response, SEE_OTHER, "/portal");
    assert_eq!(
        app.identity.updated_passwords(),
        vec![(user.id, "Sup3rSecret".to_string())]
    );

    let response = app.get("/portal", Some(&session_cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let home = json_body(response).await;
    assert_eq!(home["funds"][0]["slug"], "fund-i");
    assert_eq!(home["sections"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_callback_without_code_or_verifier_goes_to_login() {
    let app = TestApp::new().await;
    let user = ProviderUser {
        id: Uuid::new_v4(),
        email: "lp@example.com".into(),
    };
    app.identity.add_code("code", &user);

    let response = app.get("/auth/callback", None).await;
    assert_redirect(&response, SEE_OTHER, "/login");

    let response = app.get("/auth/callback?code=code", None).await;
    assert_redirect(&response, SEE_OTHER, "/login");

    let response = app
        .get(
            "/auth/callback?code=unknown",
            Some("lp_portal_session-code-verifier=v"),
        )
        .await;
    assert_redirect(&response, SEE_OTHER, "/login");
}

#[tokio::test]
async fn test_recovery_link_lands_on_reset_password() {
    let app = TestApp::new().await;
    let (user, _) = app.lp_user("lp@example.com", vec![]).await;

    let response = app
        .send_json(
            "POST",
            "/auth/password-reset",
            None,
            json!({ "email": "lp@example.com" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let verifier = set_cookies(&response)["lp_portal_session-code-verifier"]
        .value()
        .to_string();
    let links = app.identity.sent_links();
    assert_eq!(
        links[0].redirect_to,
        "http://localhost:8080/auth/callback?type=recovery"
    );

    app.identity.add_code("reset-code", &user);
    let response = app
        .get(
            "/auth/callback?code=reset-code&type=recovery",
            Some(&format!("lp_portal_session-code-verifier={verifier}")),
        )
        .await;
    assert_redirect(&response, SEE_OTHER, "/auth/reset-password");
    let session_cookie = format!(
        "lp_portal_session={}",
        set_cookies(&response)["lp_portal_session"].value()
    );

    let response = app
        .send_json(
            "POST",
            "/auth/reset-password",
            Some(&session_cookie),
            json!({ "password": "N3wPassword", "confirm": "N3wPassword" }),
        )
        .await;
    assert_redirect(&response, SEE_OTHER, "/portal");
    assert_eq!(
        app.identity.updated_passwords(),
        vec![(user.id, "N3wPassword".to_string())]
    );
}

#[tokio::test]
async fn test_sign_in_by_role() {
    let app = TestApp::new().await;
    let (admin, _) = app.admin_user("admin@example.com").await;
    app.identity.add_password(&admin, "Sup3rSecret");

    let response = app
        .send_json(
            "POST",
            "/auth/sign-in",
            None,
            json!({ "email": "admin@example.com", "password": "Sup3rSecret" }),
        )
        .await;

    assert_redirect(&response, SEE_OTHER, "/admin");
    assert!(set_cookies(&response).contains_key("lp_portal_session"));
    let profile = app.db.users().get_by_id(admin.id).await.unwrap().unwrap();
    assert!(profile.last_login_at.is_some());
}

#[tokio::test]
async fn test_sign_in_with_wrong_password() {
    let app = TestApp::new().await;
    let (lp, _) = app.lp_user("lp@example.com", vec![]).await;
    app.identity.add_password(&lp, "Sup3rSecret");

    let response = app
        .send_json(
            "POST",
            "/auth/sign-in",
            None,
            json!({ "email": "lp@example.com", "password": "guess" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    let body = json_body(response).await;
    assert_eq!(body["error"]["message"], "Invalid email or password");
    assert!(body["error"]["request_id"].is_string());
}

#[tokio::test]
async fn test_sign_out_clears_session() {
    let app = TestApp::new().await;
    let (_, session) = app.lp_user("lp@example.com", vec![]).await;
    let cookie = app.cookie_for(&session);

    let response = app
        .send_json("POST", "/auth/sign-out", Some(&cookie), json!({}))
        .await;

    assert_redirect(&response, SEE_OTHER, "/login");
    assert_eq!(set_cookies(&response)["lp_portal_session"].value(), "");
    assert!(app.identity.calls().contains(&"sign_out"));

    let response = app.get("/portal", Some(&cookie)).await;
    assert_redirect(&response, TEMP, "/login");
}

#[tokio::test]
async fn test_me_requires_session() {
    let app = TestApp::new().await;

    let response = app.get("/auth/me", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (user, session) = app.lp_user("lp@example.com", vec![]).await;
    let response = app.get("/auth/me", Some(&app.cookie_for(&session))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["user"]["id"], user.id.to_string());
    assert_eq!(body["profile"]["role"], "lp");
}

// ============================================================================
// Admin console
// ============================================================================

#[tokio::test]
async fn test_admin_manages_funds_and_lps() {
    let app = TestApp::new().await;
    let (_, session) = app.admin_user("admin@example.com").await;
    let cookie = app.cookie_for(&session);

    let response = app
        .send_json(
            "POST",
            "/admin/funds",
            Some(&cookie),
            json!({ "name": "Fund II", "slug": "fund-ii" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let fund_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let new_lp = json!({ "email": "lp@example.com", "name": "Jane", "fund_ids": [fund_id] });
    let response = app
        .send_json("POST", "/admin/lps", Some(&cookie), new_lp.clone())
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let lp_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .send_json("POST", "/admin/lps", Some(&cookie), new_lp)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .send_json(
            "PATCH",
            &format!("/admin/lps/{lp_id}"),
            Some(&cookie),
            json!({ "field": "name", "value": "" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/admin/lps", Some(&cookie)).await;
    let lps = json_body(response).await;
    assert_eq!(lps[0]["name"], "Jane");
    assert_eq!(lps[0]["fund_ids"][0], fund_id);

    let response = app.get("/admin", Some(&cookie)).await;
    assert_eq!(json_body(response).await["lp_count"], 1);
}

#[tokio::test]
async fn test_company_with_investments_cannot_be_deleted() {
    let app = TestApp::new().await;
    let (_, session) = app.admin_user("admin@example.com").await;
    let cookie = app.cookie_for(&session);
    let fund = app.ctx.create_test_fund("fund-i").await;
    let company = app
        .db
        .companies()
        .create(company_input("Acme", vec![fund]))
        .await
        .unwrap();
    app.db
        .investments()
        .create(CreateInvestment {
            company_id: company.id,
            fund_id: fund,
            investment_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            investment_type: None,
            stage: None,
            amount: Some(250_000.0),
            ownership_percentage: None,
            role: None,
            post_money_valuation: None,
        })
        .await
        .unwrap();

    let response = app
        .send_json(
            "DELETE",
            &format!("/admin/companies/{}", company.id),
            Some(&cookie),
            json!({}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        json_body(response).await["error"]["message"],
        "Cannot delete: this company has investments"
    );
}

#[tokio::test]
async fn test_admin_publishes_update() {
    let app = TestApp::new().await;
    let (_, session) = app.admin_user("admin@example.com").await;
    let cookie = app.cookie_for(&session);
    let fund = app.ctx.create_test_fund("fund-i").await;

    let response = app
        .send_json(
            "POST",
            "/admin/updates",
            Some(&cookie),
            json!({ "title": "Q1 letter", "body": "# Hello", "fund_ids": [fund] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let update = json_body(response).await;
    assert_eq!(update["status"], "draft");
    let id = update["id"].as_str().unwrap();

    let response = app
        .send_json(
            "POST",
            &format!("/admin/updates/{id}/publish"),
            Some(&cookie),
            json!({}),
        )
        .await;
    let published = json_body(response).await;
    assert_eq!(published["status"], "published");
    assert!(published["published_at"].is_string());
}

// ============================================================================
// Portal
// ============================================================================

#[tokio::test]
async fn test_portal_scopes_to_granted_funds() {
    let app = TestApp::new().await;
    let a = app.ctx.create_test_fund("fund-a").await;
    let b = app.ctx.create_test_fund("fund-b").await;
    app.ctx.create_test_fund("fund-c").await;
    let (_, session) = app.lp_user("lp@example.com", vec![a, b]).await;
    let cookie = app.cookie_for(&session);

    let funds = json_body(app.get("/portal/funds", Some(&cookie)).await).await;
    let slugs: Vec<_> = funds
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["slug"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(slugs, vec!["fund-a", "fund-b"]);

    let stats = json_body(app.get("/portal/stats?fund=fund-b", Some(&cookie)).await).await;
    assert_eq!(stats["fund"]["slug"], "fund-b");

    // Ungranted or unknown slugs fall back to the first fund
    let stats = json_body(app.get("/portal/stats?fund=fund-c", Some(&cookie)).await).await;
    assert_eq!(stats["fund"]["slug"], "fund-a");
}

#[tokio::test]
async fn test_portal_without_funds() {
    let app = TestApp::new().await;
    let (_, session) = app.lp_user("lp@example.com", vec![]).await;
    let cookie = app.cookie_for(&session);

    for path in ["/portal/stats", "/portal/portfolio", "/portal/updates"] {
        let body = json_body(app.get(path, Some(&cookie)).await).await;
        assert!(body["fund"].is_null(), "{path}");
        assert_eq!(body["message"], "No fund access.", "{path}");
    }
}

#[tokio::test]
async fn test_update_detail_visibility() {
    let app = TestApp::new().await;
    let mine = app.ctx.create_test_fund("fund-a").await;
    let other = app.ctx.create_test_fund("fund-b").await;
    let (_, session) = app.lp_user("lp@example.com", vec![mine]).await;
    let cookie = app.cookie_for(&session);

    let create = |fund_ids| UpdateContent {
        title: "Letter".into(),
        body: "Body".into(),
        fund_ids,
    };
    let visible = app.db.updates().create(create(vec![mine])).await.unwrap();
    let draft = app.db.updates().create(create(vec![mine])).await.unwrap();
    let hidden = app.db.updates().create(create(vec![other])).await.unwrap();
    for id in [visible.id, hidden.id] {
        app.ctx
            .db
            .updates()
            .set_status(id, crate::models::UpdateStatus::Published, Some(Utc::now()))
            .await
            .unwrap();
    }

    let response = app
        .get(&format!("/portal/updates/{}?fund=fund-a", visible.id), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["title"], "Letter");

    for id in [draft.id.to_string(), hidden.id.to_string(), "not-a-uuid".into()] {
        let response = app
            .get(&format!("/portal/updates/{id}?fund=fund-a"), Some(&cookie))
            .await;
        assert_redirect(&response, SEE_OTHER, "/portal/updates?fund=fund-a");
    }

    let list = json_body(app.get("/portal/updates", Some(&cookie)).await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}
