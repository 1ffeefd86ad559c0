mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn created_property_reads_back_identically() -> Result<()> {
    let server = common::ensure_server().await?;
    let owner = common::new_user(server, "lister").await?;

    let created = common::create_property(server, &owner, "SALE", 2_500_000).await?;
    assert_eq!(created["status"], "AVAILABLE");
    assert_eq!(created["user_id"], owner.id.as_str());
    assert_eq!(created["image_urls"].as_array().map(Vec::len), Some(2));

    let id = created["id"].as_str().unwrap_or_default();
    let res = common::client().get(server.url(&format!("/api/properties/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(common::body(res).await?["data"], created);
    Ok(())
}

#[tokio::test]
async fn listings_are_filtered_by_status_and_owner() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::client();
    let owner = common::new_user(server, "owner").await?;
    let other = common::new_user(server, "other").await?;

    let mine = common::create_property(server, &owner, "RENT", 30_000).await?;
    common::create_property(server, &other, "RENT", 40_000).await?;

    let res = client.get(server.url("/api/properties/user")).bearer_auth(&owner.token).send().await?;
    let listed = common::body(res).await?;
    let listed = listed["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], mine["id"]);

    let available = common::body(client.get(server.url("/api/properties")).send().await?).await?;
    let available = available["data"].as_array().cloned().unwrap_or_default();
    assert!(available.iter().any(|p| p["id"] == mine["id"]));
    assert!(available.iter().all(|p| p["status"] == "AVAILABLE"));

    let res = client.get(server.url("/api/properties/user")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn only_the_owner_edits_and_status_is_not_editable() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::client();
    let owner = common::new_user(server, "editor").await?;
    let stranger = common::new_user(server, "stranger").await?;
    let property = common::create_property(server, &owner, "RENT", 50_000).await?;
    let url = server.url(&format!("/api/properties/{}", property["id"].as_str().unwrap_or_default()));

    let res = client.put(&url).bearer_auth(&stranger.token).json(&json!({ "title": "Mine now" })).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client.put(&url).bearer_auth(&owner.token).json(&json!({ "status": "SOLD" })).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .put(&url)
        .bearer_auth(&owner.token)
        .json(&json!({ "title": "Renovated loft", "price": 55000 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = common::body(res).await?;
    assert_eq!(updated["data"]["title"], "Renovated loft");
    assert_eq!(updated["data"]["price"], "55000");
    assert_eq!(updated["data"]["status"], "AVAILABLE");
    assert_eq!(updated["data"]["location"], property["location"]);
    Ok(())
}

#[tokio::test]
async fn delete_by_owner_or_admin() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::client();
    let owner = common::new_user(server, "deleter").await?;
    let stranger = common::new_user(server, "bystander").await?;
    let admin = common::admin(server).await?;

    let first = common::create_property(server, &owner, "SALE", 900_000).await?;
    let second = common::create_property(server, &owner, "SALE", 800_000).await?;
    let first_url = server.url(&format!("/api/properties/{}", first["id"].as_str().unwrap_or_default()));
    let second_url = server.url(&format!("/api/properties/{}", second["id"].as_str().unwrap_or_default()));

    assert_eq!(client.delete(&first_url).bearer_auth(&stranger.token).send().await?.status(), StatusCode::FORBIDDEN);
    assert_eq!(client.delete(&first_url).bearer_auth(&owner.token).send().await?.status(), StatusCode::OK);
    assert_eq!(client.get(&first_url).send().await?.status(), StatusCode::NOT_FOUND);

    assert_eq!(client.delete(&second_url).bearer_auth(&admin.token).send().await?.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn invalid_listing_reports_fields() -> Result<()> {
    let server = common::ensure_server().await?;
    let owner = common::new_user(server, "sloppy").await?;

    let res = common::client()
        .post(server.url("/api/properties"))
        .bearer_auth(&owner.token)
        .json(&json!({ "title": "Half a listing", "price": -5 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = common::body(res).await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["price"].is_string());
    assert!(body["field_errors"]["type"].is_string());
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_reported_in_envelope() -> Result<()> {
    let server = common::ensure_server().await?;
    let owner = common::new_user(server, "garbled").await?;

    let res = common::client()
        .post(server.url("/api/properties"))
        .bearer_auth(&owner.token)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::body(res).await?["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn sold_listing_keeps_its_price_and_type() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::client();
    let owner = common::new_user(server, "repricer").await?;
    let buyer = common::new_user(server, "repricer-buyer").await?;
    let property = common::create_property(server, &owner, "SALE", 80_000).await?;
    let id = property["id"].as_str().unwrap_or_default();
    let url = server.url(&format!("/api/properties/{}", id));

    assert_eq!(common::pay(server, &buyer, id, "purchase", 80_000).await?.status(), StatusCode::CREATED);

    let res = client
        .put(&url)
        .bearer_auth(&owner.token)
        .json(&json!({ "price": 5000, "type": "RENT" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client.put(&url).bearer_auth(&owner.token).json(&json!({ "title": "Sold villa" })).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = common::body(res).await?;
    assert_eq!(updated["data"]["title"], "Sold villa");
    assert_eq!(updated["data"]["price"], "80000");
    assert_eq!(updated["data"]["type"], "SALE");
    assert_eq!(updated["data"]["status"], "SOLD");
    Ok(())
}

#[tokio::test]
async fn price_must_fit_stored_precision() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::client();
    let owner = common::new_user(server, "precise").await?;

    for price in ["1000.005", "1000000000000"] {
        let mut body = common::listing("SALE", 1);
        body["price"] = json!(price);
        let res = client.post(server.url("/api/properties")).bearer_auth(&owner.token).json(&body).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "price {}", price);
        assert!(common::body(res).await?["field_errors"]["price"].is_string());
    }

    let mut body = common::listing("SALE", 1);
    body["price"] = json!("1000.50");
    let res = client.post(server.url("/api/properties")).bearer_auth(&owner.token).json(&body).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(())
}
