use anyhow::Result;
use httpmock::prelude::*;
use httpmock::Mock;
use smart_basket::api::{self, CompareRequest};
use smart_basket::utils::validation::Validate;
use smart_basket::{BasketConfig, BasketError, ComparisonService, Money};
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn product_page(name: &str, price: &str, href: &str) -> String {
    format!(
        r#"<html><body><ul class="grid">
  <li class="item"><a class="item__link" href="{href}"><span class="item__name">{name}</span></a>
  <span class="item__price">{price}</span></li>
</ul></body></html>"#
    )
}

fn config_toml(server: &MockServer, slow_timeout: Option<u64>) -> String {
    let mut toml = format!(
        r#"
[cache]
ttl_seconds = 3600

[aggregator]
global_timeout_seconds = 10

[[stores]]
name = "Checkers"
type = "html"
search_url = "{checkers}"
timeout_seconds = 2

[stores.html]
product_selector = "li.item"
name_selector = ".item__name"
price_selector = ".item__price"
link_selector = "a.item__link"

[[stores]]
name = "Woolworths"
type = "json"
search_url = "{woolworths}"
timeout_seconds = 2

[stores.headers]
x-api-key = "${{SMART_BASKET_TEST_WW_KEY}}"

[stores.json]
results_path = "products"
name_field = "title"
price_field = "price"
url_field = "link"

[[stores]]
name = "Pick n Pay"
type = "json"
search_url = "{pnp}"
timeout_seconds = 2

[stores.json]
name_field = "name"
price_field = "price"
"#,
        checkers = server.url("/checkers/search?q={query}"),
        woolworths = server.url("/woolworths/api/search?term={query}"),
        pnp = server.url("/pnp/search?q={query}"),
    );

    if let Some(timeout) = slow_timeout {
        toml.push_str(&format!(
            r#"
[[stores]]
name = "Shoprite"
type = "json"
search_url = "{}"
timeout_seconds = {}

[stores.json]
name_field = "name"
price_field = "price"
"#,
            server.url("/shoprite/search?q={query}"),
            timeout
        ));
    }

    toml
}

struct StoreMocks<'a> {
    checkers_milk: Mock<'a>,
    woolworths_milk: Mock<'a>,
    pnp: Mock<'a>,
}

fn mount_stores(server: &MockServer) -> StoreMocks<'_> {
    let checkers_milk = server.mock(|when, then| {
        when.method(GET).path("/checkers/search").query_param("q", "Milk");
        then.status(200)
            .header("Content-Type", "text/html")
            .body(product_page("Clover Milk 1L", "R10.00", "/p/milk-1l"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/checkers/search").query_param("q", "Bread");
        then.status(200)
            .header("Content-Type", "text/html")
            .body(product_page("Albany White Bread", "R 15,00", "/p/bread"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/checkers/search").query_param("q", "Eggs");
        then.status(200)
            .header("Content-Type", "text/html")
            .body("<html><body><p>No products found</p></body></html>");
    });

    let woolworths_milk = server.mock(|when, then| {
        when.method(GET)
            .path("/woolworths/api/search")
            .query_param("term", "Milk")
            .header("x-api-key", "test-key");
        then.status(200).json_body(serde_json::json!({
            "products": [{"title": "Woolworths Fresh Milk 1L", "price": 8.0, "link": "/milk"}]
        }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/woolworths/api/search")
            .query_param("term", "Bread");
        then.status(200).json_body(serde_json::json!({
            "products": [{"title": "Woolworths Loaf", "price": "R20.00", "link": "/bread"}]
        }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/woolworths/api/search")
            .query_param("term", "Eggs");
        then.status(200).json_body(serde_json::json!({
            "products": [{"title": "Free Range Eggs 6s", "price": 5, "link": "/eggs"}]
        }));
    });

    let pnp = server.mock(|when, then| {
        when.method(GET).path("/pnp/search");
        then.status(503);
    });

    StoreMocks {
        checkers_milk,
        woolworths_milk,
        pnp,
    }
}

fn load_config(dir: &TempDir, content: &str) -> Result<BasketConfig> {
    let path = dir.path().join("basket.toml");
    std::fs::write(&path, content)?;
    let config = BasketConfig::from_file(&path)?;
    config.validate()?;
    Ok(config)
}

#[tokio::test]
async fn test_end_to_end_comparison_ranks_stores() -> Result<()> {
    std::env::set_var("SMART_BASKET_TEST_WW_KEY", "test-key");
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let mocks = mount_stores(&server);

    let config = load_config(&temp_dir, &config_toml(&server, None))?;
    let service = ComparisonService::from_config(&config)?;

    let results = service.compare("Milk, Bread\nEggs").await?;

    let names: Vec<&str> = results
        .stores()
        .iter()
        .map(|s| s.store.name.as_str())
        .collect();
    assert_eq!(names, vec!["Pick n Pay", "Checkers", "Woolworths"]);

    let pnp = &results.stores()[0];
    assert_eq!(pnp.total, Money::ZERO);
    assert_eq!(pnp.unpriced, 3);
    mocks.pnp.assert_hits(3);

    let checkers = &results.stores()[1];
    assert_eq!(checkers.total, Money::from_cents(2500));
    assert_eq!(checkers.unpriced, 1);
    assert_eq!(checkers.items[0].name, "Clover Milk 1L");
    assert_eq!(
        checkers.items[0].url,
        Some(server.url("/p/milk-1l"))
    );
    assert_eq!(checkers.items[2].name, "Eggs");
    assert_eq!(checkers.items[2].price, None);

    let woolworths = &results.stores()[2];
    assert_eq!(woolworths.total, Money::from_cents(3300));
    assert_eq!(woolworths.unpriced, 0);
    mocks.woolworths_milk.assert();

    Ok(())
}

#[tokio::test]
async fn test_repeated_compare_is_served_from_cache() -> Result<()> {
    std::env::set_var("SMART_BASKET_TEST_WW_KEY", "test-key");
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let mocks = mount_stores(&server);

    let config = load_config(&temp_dir, &config_toml(&server, None))?;
    let service = ComparisonService::from_config(&config)?;

    let first = service.compare("Milk, Bread\nEggs").await?;
    let second = service.compare("Milk,Bread,Eggs").await?;

    assert_eq!(first, second);
    mocks.checkers_milk.assert_hits(1);
    mocks.woolworths_milk.assert_hits(1);

    service.refresh("Milk, Bread\nEggs").await?;
    mocks.checkers_milk.assert_hits(2);

    Ok(())
}

#[tokio::test]
async fn test_slow_store_does_not_hold_up_the_others() -> Result<()> {
    std::env::set_var("SMART_BASKET_TEST_WW_KEY", "test-key");
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let _mocks = mount_stores(&server);
    server.mock(|when, then| {
        when.method(GET).path("/shoprite/search");
        then.status(200)
            .delay(Duration::from_secs(5))
            .json_body(serde_json::json!([{"name": "Milk", "price": 1}]));
    });

    let config = load_config(&temp_dir, &config_toml(&server, Some(1)))?;
    let service = ComparisonService::from_config(&config)?;

    let started = Instant::now();
    let results = service.compare("Milk").await?;

    assert!(started.elapsed() < Duration::from_secs(4));
    let shoprite = results
        .stores()
        .iter()
        .find(|s| s.store.name == "Shoprite")
        .expect("slow store still reported");
    assert_eq!(shoprite.unpriced, 1);
    assert_eq!(shoprite.items[0].price, None);

    let checkers = results
        .stores()
        .iter()
        .find(|s| s.store.name == "Checkers")
        .expect("checkers reported");
    assert_eq!(checkers.total, Money::from_cents(1000));

    Ok(())
}

#[tokio::test]
async fn test_empty_shopping_list_never_reaches_stores() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let mocks = mount_stores(&server);

    let config = load_config(&temp_dir, &config_toml(&server, None))?;
    let service = ComparisonService::from_config(&config)?;

    let err = service.compare(" \n , ").await.unwrap_err();
    assert!(matches!(err, BasketError::EmptyList));

    let reply = api::handle_compare(
        &service,
        CompareRequest {
            shopping_list: "".to_string(),
            refresh: false,
        },
    )
    .await;
    assert_eq!(reply.status, 400);

    mocks.pnp.assert_hits(0);
    mocks.checkers_milk.assert_hits(0);

    Ok(())
}
