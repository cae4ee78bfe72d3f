//! # HTTP Round-Trip Tests
//!
//! Drives the synchronization layer through the real `HttpTransport` against an
//! in-process axum paper-trading server that authenticates by session cookie.

use axum::extract::{Query, Request, State};
use axum::http::header::COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use dashboard::{
    ApiRequest, Dashboard, EntryStatus, HttpTransport, ResourceId, ResourceKey, SyncConfig,
    SyncError, Transport,
};
use parking_lot::Mutex;
use serde_json::json;
use shared::dto::{
    BotSettings, BotSettingsUpdate, Coin, CoinPrice, CoinToggleRequest, Holding, MarketPrice,
    MutationAck, Portfolio, TradeSide, Transaction,
};
use std::collections::HashMap;
use std::sync::Arc;

const SESSION: &str = "test-session-7f3a";

struct Account {
    portfolio: Portfolio,
    transactions: Vec<Transaction>,
    bot: BotSettings,
    enabled: Vec<String>,
    /// Make the public price feed demand a session, to exercise the hard-401 path
    market_requires_session: bool,
    /// Answer the price feed with this status and a non-JSON body
    market_outage: Option<(StatusCode, &'static str)>,
    requests: usize,
}

impl Account {
    fn traded() -> Self {
        Self {
            portfolio: Portfolio {
                balance: 7_500.0,
                quote_currency: "USDT".to_string(),
                holdings: vec![Holding {
                    symbol: "BTC".to_string(),
                    amount: 0.04,
                    avg_price: 62_500.0,
                }],
                total_value: 10_060.0,
            },
            transactions: vec![Transaction {
                id: "tx-1".to_string(),
                symbol: "BTC".to_string(),
                side: TradeSide::Buy,
                amount: 0.04,
                price: 62_500.0,
                total: 2_500.0,
                created_at: Utc::now(),
            }],
            bot: BotSettings {
                is_active: false,
                trade_amount: 100.0,
                buy_threshold: 2.0,
                sell_threshold: 3.0,
                max_positions: 5,
            },
            enabled: vec!["BTC".to_string()],
            market_requires_session: false,
            market_outage: None,
            requests: 0,
        }
    }
}

#[derive(Clone)]
struct Server {
    account: Arc<Mutex<Account>>,
}

fn price_of(symbol: &str) -> f64 {
    match symbol {
        "BTC" => 64_000.0,
        "ETH" => 3_100.0,
        "SOL" => 145.0,
        _ => 1.0,
    }
}

fn has_session(headers: &HeaderMap) -> bool {
    let expected = format!("session={}", SESSION);
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .any(|cookie| cookie.trim() == expected)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "not logged in" }))).into_response()
}

async fn require_session(State(server): State<Server>, req: Request, next: Next) -> Response {
    server.account.lock().requests += 1;
    if !has_session(req.headers()) {
        return unauthorized();
    }
    next.run(req).await
}

async fn market_prices(State(server): State<Server>, headers: HeaderMap) -> Response {
    let account = server.account.lock();
    if let Some(outage) = account.market_outage {
        return outage.into_response();
    }
    if account.market_requires_session && !has_session(&headers) {
        return unauthorized();
    }
    drop(account);
    let prices: Vec<MarketPrice> = ["BTC", "ETH", "SOL"]
        .into_iter()
        .map(|symbol| MarketPrice {
            symbol: symbol.to_string(),
            price: price_of(symbol),
            change_24h: Some(1.5),
        })
        .collect();
    Json(prices).into_response()
}

async fn coins_available() -> Json<Vec<Coin>> {
    Json(vec![
        Coin { symbol: "BTC".to_string(), name: "Bitcoin".to_string() },
        Coin { symbol: "ETH".to_string(), name: "Ethereum".to_string() },
        Coin { symbol: "SOL".to_string(), name: "Solana".to_string() },
    ])
}

async fn portfolio_get(State(server): State<Server>) -> Json<Portfolio> {
    Json(server.account.lock().portfolio.clone())
}

async fn portfolio_reset(State(server): State<Server>) -> Json<Portfolio> {
    let mut account = server.account.lock();
    account.portfolio = Portfolio::fresh("USDT");
    account.transactions.clear();
    Json(account.portfolio.clone())
}

async fn transactions_list(State(server): State<Server>) -> Json<Vec<Transaction>> {
    Json(server.account.lock().transactions.clone())
}

async fn bot_get(State(server): State<Server>) -> Json<BotSettings> {
    Json(server.account.lock().bot.clone())
}

async fn bot_update(
    State(server): State<Server>,
    Json(update): Json<BotSettingsUpdate>,
) -> Json<BotSettings> {
    let mut account = server.account.lock();
    update.apply_to(&mut account.bot);
    Json(account.bot.clone())
}

async fn bot_toggle(State(server): State<Server>) -> Json<BotSettings> {
    let mut account = server.account.lock();
    account.bot.is_active = !account.bot.is_active;
    Json(account.bot.clone())
}

async fn coins_enabled(State(server): State<Server>) -> Json<Vec<String>> {
    Json(server.account.lock().enabled.clone())
}

async fn coins_enable(
    State(server): State<Server>,
    Json(req): Json<CoinToggleRequest>,
) -> Json<MutationAck> {
    let mut account = server.account.lock();
    if !account.enabled.contains(&req.symbol) {
        account.enabled.push(req.symbol.clone());
    }
    Json(MutationAck {
        success: true,
        message: Some(format!("{} enabled", req.symbol)),
    })
}

async fn coins_disable(
    State(server): State<Server>,
    Json(req): Json<CoinToggleRequest>,
) -> Json<MutationAck> {
    server.account.lock().enabled.retain(|s| s != &req.symbol);
    Json(MutationAck {
        success: true,
        message: None,
    })
}

async fn coin_prices(
    State(server): State<Server>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<CoinPrice>> {
    let account = server.account.lock();
    let prices = account
        .enabled
        .iter()
        .filter(|symbol| params.get("symbol").map_or(true, |wanted| wanted == *symbol))
        .map(|symbol| CoinPrice {
            symbol: symbol.clone(),
            price: price_of(symbol),
            change_24h: None,
            balance: account
                .portfolio
                .holdings
                .iter()
                .find(|h| &h.symbol == symbol)
                .map(|h| h.amount),
        })
        .collect();
    Json(prices)
}

fn router(server: Server) -> Router {
    let public = Router::new()
        .route("/market/prices", get(market_prices))
        .route("/coins/available", get(coins_available));

    let private = Router::new()
        .route("/portfolio/get", get(portfolio_get))
        .route("/portfolio/reset", post(portfolio_reset))
        .route("/transactions/list", get(transactions_list))
        .route("/bot/get", get(bot_get))
        .route("/bot/update", post(bot_update))
        .route("/bot/toggle", post(bot_toggle))
        .route("/coins/enabled", get(coins_enabled))
        .route("/coins/enable", post(coins_enable))
        .route("/coins/disable", post(coins_disable))
        .route("/coins/prices", get(coin_prices))
        .route_layer(middleware::from_fn_with_state(server.clone(), require_session));

    Router::new()
        .nest("/api", public.merge(private))
        .with_state(server)
}

/// Start the server on an ephemeral port and return its API base URL
async fn spawn_server(account: Account) -> (String, Server) {
    let server = Server {
        account: Arc::new(Mutex::new(account)),
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(server.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api", addr), server)
}

fn logged_in(base_url: &str) -> Dashboard {
    let config = SyncConfig::default()
        .with_base_url(base_url)
        .with_session(SESSION);
    Dashboard::new(&config).unwrap()
}

fn logged_out(base_url: &str) -> Dashboard {
    Dashboard::new(&SyncConfig::default().with_base_url(base_url)).unwrap()
}

#[tokio::test]
async fn test_logged_out_account_resources_are_empty_not_errors() {
    // Arrange
    let (base_url, server) = spawn_server(Account::traded()).await;
    let dashboard = logged_out(&base_url);

    // Act
    let outcomes = dashboard.load_all().await;

    // Assert
    assert!(outcomes.iter().all(|(_, outcome)| outcome.is_ok()), "{:?}", outcomes);
    for key in ResourceKey::ALL {
        assert_eq!(
            dashboard.store().status(&ResourceId::of(key)),
            Some(EntryStatus::Fresh),
            "{}",
            key
        );
    }
    let snapshot = dashboard.snapshot();
    assert!(snapshot.portfolio.is_none());
    assert!(snapshot.transactions.is_empty());
    assert!(snapshot.bot_settings.is_none());
    assert!(snapshot.is_logged_out());
    assert!(snapshot.enabled_coins.is_empty());
    assert!(snapshot.coin_prices.is_empty());
    assert_eq!(snapshot.market_prices.len(), 3);
    assert_eq!(snapshot.available_coins.len(), 3);
    assert!(server.account.lock().requests >= 5);
}

#[tokio::test]
async fn test_hard_401_surfaces_error() {
    let mut account = Account::traded();
    account.market_requires_session = true;
    let (base_url, _server) = spawn_server(account).await;
    let dashboard = logged_out(&base_url);
    let id = ResourceId::of(ResourceKey::MarketPrices);

    let err = dashboard.store().fetch(&id).await.unwrap_err();

    assert_eq!(
        err,
        SyncError::Http {
            status: 401,
            message: "not logged in".to_string()
        }
    );
    assert_eq!(dashboard.store().status(&id), Some(EntryStatus::Error));
    assert_eq!(dashboard.snapshot().errors.len(), 1);
}

#[tokio::test]
async fn test_plain_text_server_error_is_reported_verbatim() {
    // Arrange
    let mut account = Account::traded();
    account.market_outage = Some((StatusCode::BAD_GATEWAY, "price feed offline"));
    let (base_url, _server) = spawn_server(account).await;
    let dashboard = logged_out(&base_url);
    let transport = HttpTransport::new(&SyncConfig::default().with_base_url(&base_url)).unwrap();

    // Act
    let response = transport.send(ApiRequest::get("market/prices")).await.unwrap();
    let err = dashboard
        .store()
        .fetch(&ResourceId::of(ResourceKey::MarketPrices))
        .await
        .unwrap_err();

    // Assert
    assert_eq!(response.status, 502);
    assert_eq!(response.body, serde_json::Value::String("price feed offline".to_string()));
    assert_eq!(
        err,
        SyncError::Http {
            status: 502,
            message: "price feed offline".to_string()
        }
    );
}

#[tokio::test]
async fn test_empty_server_error_falls_back_to_status() {
    let mut account = Account::traded();
    account.market_outage = Some((StatusCode::SERVICE_UNAVAILABLE, ""));
    let (base_url, _server) = spawn_server(account).await;
    let dashboard = logged_out(&base_url);
    let transport = HttpTransport::new(&SyncConfig::default().with_base_url(&base_url)).unwrap();

    let response = transport.send(ApiRequest::get("market/prices")).await.unwrap();
    let err = dashboard
        .store()
        .fetch(&ResourceId::of(ResourceKey::MarketPrices))
        .await
        .unwrap_err();

    assert_eq!(response.status, 503);
    assert_eq!(response.body, serde_json::Value::Null);
    assert_eq!(
        err,
        SyncError::Http {
            status: 503,
            message: "status 503".to_string()
        }
    );
}

#[tokio::test]
async fn test_session_cookie_authenticates_reads() {
    let (base_url, _server) = spawn_server(Account::traded()).await;
    let dashboard = logged_in(&base_url);

    let value = dashboard
        .store()
        .fetch(&ResourceId::of(ResourceKey::Portfolio))
        .await
        .unwrap();

    let portfolio = value.as_portfolio().unwrap();
    assert_eq!(portfolio.balance, 7_500.0);
    assert_eq!(portfolio.holdings[0].symbol, "BTC");
}

#[tokio::test]
async fn test_reset_portfolio_refreshes_portfolio_and_transactions() {
    // Arrange
    let (base_url, _server) = spawn_server(Account::traded()).await;
    let dashboard = logged_in(&base_url);
    let store = dashboard.store();
    let portfolio = ResourceId::of(ResourceKey::Portfolio);
    let transactions = ResourceId::of(ResourceKey::Transactions);
    let bot = ResourceId::of(ResourceKey::BotSettings);
    store.fetch(&portfolio).await.unwrap();
    store.fetch(&transactions).await.unwrap();
    store.fetch(&bot).await.unwrap();

    // Act
    let reset = dashboard.mutator().reset_portfolio().await.unwrap();

    // Assert
    assert_eq!(reset.balance, 10_000.0);
    assert_eq!(store.status(&portfolio), Some(EntryStatus::Stale));
    assert_eq!(store.status(&transactions), Some(EntryStatus::Stale));
    assert_eq!(store.status(&bot), Some(EntryStatus::Fresh));

    let value = store.fetch(&portfolio).await.unwrap();
    let refreshed = value.as_portfolio().unwrap();
    assert_eq!(refreshed.balance, 10_000.0);
    assert_eq!(refreshed.quote_currency, "USDT");
    assert!(refreshed.holdings.is_empty());
    let value = store.fetch(&transactions).await.unwrap();
    assert!(value.as_transactions().unwrap().is_empty());
    assert_eq!(
        dashboard.notices().try_recv().unwrap().message,
        "Portfolio reset"
    );
}

#[tokio::test]
async fn test_enable_coin_refetches_enabled_list_for_subscribers() {
    // Arrange
    let (base_url, server) = spawn_server(Account::traded()).await;
    let dashboard = logged_in(&base_url);
    let mut enabled = dashboard.subscribe(&ResourceId::of(ResourceKey::EnabledCoins));
    let eth_price = ResourceId::keyed(ResourceKey::CoinPrices, "ETH").unwrap();
    let entry = enabled.settled().await.unwrap();
    assert_eq!(
        entry.value.unwrap().as_enabled_coins().unwrap(),
        ["BTC".to_string()]
    );
    let before = dashboard.store().fetch(&eth_price).await.unwrap();
    assert!(before.as_coin_prices().unwrap().is_empty());

    // Act
    let ack = dashboard.mutator().enable_coin("eth").await.unwrap();

    // Assert
    assert!(ack.success);
    assert!(server.account.lock().enabled.contains(&"ETH".to_string()));
    let entry = enabled.settled().await.unwrap();
    assert_eq!(entry.status, EntryStatus::Fresh);
    assert!(entry
        .value
        .unwrap()
        .as_enabled_coins()
        .unwrap()
        .contains(&"ETH".to_string()));

    assert_eq!(dashboard.store().status(&eth_price), Some(EntryStatus::Stale));
    let after = dashboard.store().fetch(&eth_price).await.unwrap();
    let prices = after.as_coin_prices().unwrap();
    assert_eq!(prices.len(), 1);
    assert_eq!(prices[0].price, 3_100.0);
}

#[tokio::test]
async fn test_unauthenticated_mutation_changes_nothing() {
    // Arrange
    let (base_url, server) = spawn_server(Account::traded()).await;
    let dashboard = logged_out(&base_url);
    let portfolio = ResourceId::of(ResourceKey::Portfolio);
    dashboard.store().fetch(&portfolio).await.unwrap();

    // Act
    let err = dashboard.mutator().reset_portfolio().await.unwrap_err();

    // Assert
    assert_eq!(
        err,
        SyncError::Unauthenticated {
            resource: "reset portfolio"
        }
    );
    assert_eq!(server.account.lock().portfolio.balance, 7_500.0);
    assert_eq!(dashboard.store().status(&portfolio), Some(EntryStatus::Fresh));
    let notice = dashboard.notices().try_recv().unwrap();
    assert_eq!(notice.message, "Failed to reset portfolio: please log in");
}

#[tokio::test]
async fn test_bot_update_and_toggle_round_trip() {
    let (base_url, server) = spawn_server(Account::traded()).await;
    let dashboard = logged_in(&base_url);
    let bot = ResourceId::of(ResourceKey::BotSettings);
    dashboard.store().fetch(&bot).await.unwrap();

    let updated = dashboard
        .mutator()
        .update_bot_settings(BotSettingsUpdate {
            trade_amount: Some(250.0),
            max_positions: Some(8),
            ..Default::default()
        })
        .await
        .unwrap();
    let toggled = dashboard.mutator().toggle_bot().await.unwrap();

    assert_eq!(updated.trade_amount, 250.0);
    assert_eq!(updated.buy_threshold, 2.0);
    assert!(toggled.is_active);
    assert_eq!(server.account.lock().bot.max_positions, 8);
    let value = dashboard.store().fetch(&bot).await.unwrap();
    assert_eq!(value.as_bot_settings().unwrap(), &toggled);
}
