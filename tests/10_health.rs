mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client().get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = common::body(res).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_describes_service() -> Result<()> {
    let server = common::ensure_server().await?;

    let body = common::body(common::client().get(server.url("/")).send().await?).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "LuxeHaven API");
    Ok(())
}

#[tokio::test]
async fn guard_redirects_anonymous_and_routes_roles_home() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::client();

    let res = client.get(server.url("/properties/new")).send().await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.headers()["location"], "/auth/signin");

    let user = common::new_user(server, "guarded").await?;
    let res = client.get(server.url("/auth/signin")).bearer_auth(&user.token).send().await?;
    assert_eq!(res.headers()["location"], "/dashboard");
    let res = client.get(server.url("/admin")).bearer_auth(&user.token).send().await?;
    assert_eq!(res.headers()["location"], "/dashboard");

    let admin = common::admin(server).await?;
    let res = client.get(server.url("/dashboard")).bearer_auth(&admin.token).send().await?;
    assert_eq!(res.headers()["location"], "/admin");

    let res = client.get(server.url("/properties")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await?.contains("data-page=\"properties\""));
    Ok(())
}
