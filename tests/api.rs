mod common;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use common::TestServer;

async fn send_json(
    client: &Client,
    method: reqwest::Method,
    url: String,
    token: &str,
    body: Value,
) -> (StatusCode, Value) {
    let resp = client
        .request(method, url)
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("send request");
    let status = resp.status();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

/// Seeds two brands, one site with a deal for `betano`, and a toplist `best-casinos`.
async fn seed(server: &TestServer, client: &Client) {
    let admin = &server.admin_token;

    for body in [
        json!({
            "brandId": "betano",
            "name": "Betano",
            "defaultBonus": "100% up to 1000 RON",
            "defaultAffiliateUrl": "https://betano.example/aff",
            "defaultRating": 8.4,
            "license": "ONJN",
            "pros": ["Fast payouts"],
            "paymentMethods": ["visa", "paypal"]
        }),
        json!({
            "brandId": "unibet",
            "name": "Unibet",
            "defaultBonus": "50 free spins",
            "cons": ["Slow support"]
        }),
    ] {
        let (status, _) =
            send_json(client, reqwest::Method::POST, server.url("/api/brands"), admin, body).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send_json(
        client,
        reqwest::Method::POST,
        server.url("/api/sites"),
        admin,
        json!({"domain": "Cazinou.io", "name": "Cazinou"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["siteKey"], "cazinou-io");

    let (status, _) = send_json(
        client,
        reqwest::Method::PUT,
        server.url("/api/sites/cazinou-io/brands/betano"),
        admin,
        json!({"bonus": "500 RON site deal", "rating": "9.1", "terms": "18+ T&C apply"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(
        client,
        reqwest::Method::POST,
        server.url("/api/sites/cazinou-io/toplists"),
        admin,
        json!({
            "slug": "best-casinos",
            "items": [
                {"brandId": "betano", "cta": "Claim bonus"},
                {"brandId": "unibet", "bonus": "Item-level bonus", "rating": 7}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["title"], "Best Casinos");
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::start().await;
    let resp = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn public_toplist_merges_override_layers() {
    let server = TestServer::start().await;
    let client = Client::new();
    seed(&server, &client).await;

    let resp = client
        .get(server.url("/api/sites/cazinou-io/toplists/best-casinos"))
        .header("Origin", "https://cazinou.io")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );

    let doc: Value = resp.json().await.unwrap();
    assert!(doc.get("data").is_none(), "public document is not enveloped");
    assert_eq!(doc["siteKey"], "cazinou-io");
    assert_eq!(doc["slug"], "best-casinos");
    assert!(doc["updatedAt"].is_string());

    let items = doc["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);

    let betano = &items[0];
    assert_eq!(betano["brandId"], "betano");
    assert_eq!(betano["bonus"], "500 RON site deal");
    assert_eq!(betano["rating"], 9.1);
    assert_eq!(betano["terms"], "18+ T&C apply");
    assert_eq!(betano["affiliateUrl"], "https://betano.example/aff");
    assert_eq!(betano["license"], "ONJN");
    assert_eq!(betano["cta"], "Claim bonus");
    assert_eq!(betano["pros"], json!(["Fast payouts"]));

    let unibet = &items[1];
    assert_eq!(unibet["bonus"], "Item-level bonus");
    assert_eq!(unibet["rating"], 7.0);
    assert_eq!(unibet["cons"], json!(["Slow support"]));
    assert!(unibet["logo"].is_null());
}

#[tokio::test]
async fn public_toplist_unknown_slug_is_404() {
    let server = TestServer::start().await;
    let resp = reqwest::get(server.url("/api/sites/nope/toplists/missing"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let server = TestServer::start().await;
    let resp = Client::new()
        .request(
            reqwest::Method::OPTIONS,
            server.url("/api/sites/cazinou-io/toplists/best-casinos"),
        )
        .header("Origin", "https://cazinou.io")
        .header("Access-Control-Request-Method", "GET")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let headers = resp.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(
        headers["access-control-allow-headers"]
            .to_str()
            .unwrap()
            .contains("X-API-Key")
    );
}

#[tokio::test]
async fn management_requires_a_key() {
    let server = TestServer::start().await;
    let client = Client::new();

    let resp = client.get(server.url("/api/brands")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key("www-authenticate"));

    let resp = client
        .get(server.url("/api/brands"))
        .bearer_auth("tlcms_deadbeef_000000000000000000000000")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .get(server.url("/api/brands"))
        .header("X-API-Key", &server.admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn editors_only_reach_assigned_sites() {
    let server = TestServer::start().await;
    let client = Client::new();
    seed(&server, &client).await;
    let admin = &server.admin_token;

    let (status, _) = send_json(
        &client,
        reqwest::Method::POST,
        server.url("/api/sites"),
        admin,
        json!({"domain": "pariuri.ro"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, user) = send_json(
        &client,
        reqwest::Method::POST,
        server.url("/api/admin/users"),
        admin,
        json!({"email": "Editor@Cazinou.io", "role": "editor", "siteKeys": ["cazinou-io"]}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["data"]["email"], "editor@cazinou.io");
    assert_eq!(user["data"]["siteKeys"], json!(["cazinou-io"]));
    let user_id = user["data"]["id"].as_str().unwrap();

    let (status, token) = send_json(
        &client,
        reqwest::Method::POST,
        server.url(&format!("/api/admin/users/{user_id}/tokens")),
        admin,
        json!({"description": "editor laptop"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let editor = token["data"]["token"].as_str().unwrap().to_string();
    assert!(editor.starts_with("tlcms_"));

    let resp = client
        .get(server.url("/api/sites/cazinou-io/toplists"))
        .bearer_auth(&editor)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(server.url("/api/sites/pariuri-ro/toplists"))
        .bearer_auth(&editor)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let (status, _) = send_json(
        &client,
        reqwest::Method::POST,
        server.url("/api/brands"),
        &editor,
        json!({"brandId": "superbet", "name": "Superbet"}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let resp = client
        .get(server.url("/api/sites"))
        .bearer_auth(&editor)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["siteKey"], "cazinou-io");

    let resp = client
        .get(server.url("/api/admin/users"))
        .bearer_auth(&editor)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn replace_items_is_all_or_nothing() {
    let server = TestServer::start().await;
    let client = Client::new();
    seed(&server, &client).await;
    let admin = &server.admin_token;
    let items_url = server.url("/api/sites/cazinou-io/toplists/best-casinos/items");

    let (status, body) = send_json(
        &client,
        reqwest::Method::PUT,
        items_url.clone(),
        admin,
        json!({"items": [{"brandId": "unibet"}, {"brandId": "ghost"}, {"brandId": "phantom"}]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["missingBrandIds"], json!(["ghost", "phantom"]));

    let resp = client.get(&items_url).bearer_auth(admin).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    let brands: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["brandId"].as_str().unwrap())
        .collect();
    assert_eq!(brands, vec!["betano", "unibet"]);

    let (status, body) = send_json(
        &client,
        reqwest::Method::PUT,
        items_url,
        admin,
        json!({"items": [{"brandId": "unibet", "rating": "6.5"}, {"brandId": "betano"}]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items[0]["brandId"], "unibet");
    assert_eq!(items[0]["position"], 0);
    assert_eq!(items[1]["position"], 1);

    let doc: Value = reqwest::get(server.url("/api/sites/cazinou-io/toplists/best-casinos"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(doc["items"][0]["brandId"], "unibet");
    assert_eq!(doc["items"][0]["rating"], 6.5);
}

#[tokio::test]
async fn brand_in_use_cannot_be_deleted() {
    let server = TestServer::start().await;
    let client = Client::new();
    seed(&server, &client).await;
    let admin = &server.admin_token;

    let resp = client
        .delete(server.url("/api/brands/betano"))
        .bearer_auth(admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["details"]["usage"]["siteBrands"], 1);
    assert_eq!(body["details"]["usage"]["toplistItems"], 1);

    let resp = client
        .delete(server.url("/api/sites/cazinou-io"))
        .bearer_auth(admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .delete(server.url("/api/brands/betano"))
        .bearer_auth(admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn brand_update_rejects_unknown_registry_codes() {
    let server = TestServer::start().await;
    let client = Client::new();
    seed(&server, &client).await;

    let (status, body) = send_json(
        &client,
        reqwest::Method::PUT,
        server.url("/api/brands/betano"),
        &server.admin_token,
        json!({"currencies": ["XYZ"]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["fields"].is_array());

    let (status, body) = send_json(
        &client,
        reqwest::Method::PUT,
        server.url("/api/brands/betano"),
        &server.admin_token,
        json!({"defaultBonus": null, "currencies": ["RON"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["defaultBonus"].is_null());
    assert_eq!(body["data"]["name"], "Betano");
}

#[tokio::test]
async fn imports_report_per_record_outcomes() {
    let server = TestServer::start().await;
    let client = Client::new();
    seed(&server, &client).await;
    let admin = &server.admin_token;

    let brands = json!({
        "brands": {
            "Superbet": {"slug": "superbet", "rating": "8.8", "bonus": "Free bet"},
            "Betano": {"slug": "betano"},
            "Broken": {"slug": "Not A Slug"}
        }
    });
    let (status, body) = send_json(
        &client,
        reqwest::Method::POST,
        server.url("/api/brands/import"),
        admin,
        brands,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["imported"], 1);
    assert_eq!(body["data"]["skipped"], 1);
    assert_eq!(body["data"]["errors"].as_array().unwrap().len(), 1);

    let toplists = json!({
        "items": {
            "i1": {"slug": "superbet", "bonus": "Imported bonus"},
            "i2": {"slug": "missing-brand"}
        },
        "toplists": {
            "homepage": {"items": ["i1", "i2", "i3"]},
            "best-casinos": {"items": ["i1"]}
        },
        "pageMapping": {"/": ["homepage"]}
    });
    let (status, body) = send_json(
        &client,
        reqwest::Method::POST,
        server.url("/api/sites/cazinou-io/toplists/import"),
        admin,
        toplists,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["imported"], 1);
    assert_eq!(body["data"]["skipped"], 1);
    assert_eq!(body["data"]["warnings"].as_array().unwrap().len(), 2);

    let doc: Value = reqwest::get(server.url("/api/sites/cazinou-io/toplists/homepage"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(doc["title"], "Homepage");
    assert_eq!(doc["items"].as_array().unwrap().len(), 1);
    assert_eq!(doc["items"][0]["bonus"], "Imported bonus");

    let (status, _) = send_json(
        &client,
        reqwest::Method::POST,
        server.url("/api/brands/import"),
        admin,
        json!({"brands": ["not", "a", "map"]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn toplist_patch_renames_slug() {
    let server = TestServer::start().await;
    let client = Client::new();
    seed(&server, &client).await;

    let (status, body) = send_json(
        &client,
        reqwest::Method::PATCH,
        server.url("/api/sites/cazinou-io/toplists/best-casinos"),
        &server.admin_token,
        json!({"slug": "top-casinos", "title": "Top Casinos 2025", "pages": ["/casino"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], "top-casinos");
    assert_eq!(body["data"]["pages"], json!(["/casino"]));

    let resp = reqwest::get(server.url("/api/sites/cazinou-io/toplists/best-casinos"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let doc: Value = reqwest::get(server.url("/api/sites/cazinou-io/toplists/top-casinos"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(doc["title"], "Top Casinos 2025");
    assert_eq!(doc["items"].as_array().unwrap().len(), 2);
}
