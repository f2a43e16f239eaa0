use config::Config;
use dashboard::view::{ChartView, GlanceView, Options};
use dashboard::{ChartRequest, Dashboard, DashboardError, Dimension, FilterState, Trigger, Universe};
use error::ApiError;
use history_model::{Column, HistoryProvider, Ticker};
use log::{error, info};
use redis::ConnectionLike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::{process::exit, sync::Arc};
use yahoo_api::api::YahooAPI;

use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, post, web};

mod config;
mod error;
mod utils;

#[derive(Serialize)]
struct HealthcheckResponse {
    status: String,
}

#[derive(Deserialize)]
struct ReconcileRequest<V: Ord> {
    trigger: Trigger,
    #[serde(default)]
    selected: BTreeSet<V>,
    #[serde(default)]
    all: bool,
}

#[derive(Deserialize)]
struct ChartQuery {
    ticker: Option<String>,
    column: Option<String>,
    #[serde(default)]
    years: String,
    #[serde(default)]
    months: String,
}

fn parse_ticker(raw: Option<&str>, fallback: Ticker) -> Result<Ticker, ApiError> {
    match raw {
        None => Ok(fallback),
        Some(raw) => utils::sanitize_ticker(raw.to_string())
            .parse::<Ticker>()
            .map_err(|e| ApiError::BadRequest(e.to_string())),
    }
}

fn reconcile<V: Ord + Copy + Debug>(
    request: ReconcileRequest<V>,
    universe: &Universe<V>,
    dimension: Dimension,
) -> Result<FilterState<V>, ApiError> {
    let outside = universe.outside(&request.selected);
    if !outside.is_empty() {
        return Err(DashboardError::InvalidSelection(format!(
            "{}s not offered: {:?}",
            dimension, outside
        ))
        .into());
    }

    let state = FilterState {
        selected: request.selected,
        all: request.all,
    };
    Ok(state.reconcile(request.trigger, universe))
}

#[get("/healthcheck")]
async fn healthcheck() -> impl Responder {
    web::Json(HealthcheckResponse {
        status: "ok".to_string(),
    })
}

#[get("/api/options")]
async fn get_options(dashboard: web::Data<Dashboard>) -> impl Responder {
    web::Json(Options::new(&dashboard))
}

#[post("/api/filters/year")]
async fn reconcile_years(
    body: web::Json<ReconcileRequest<i32>>,
    dashboard: web::Data<Dashboard>,
) -> Result<web::Json<FilterState<i32>>, ApiError> {
    let state = reconcile(body.into_inner(), dashboard.years(), Dimension::Year)?;
    Ok(web::Json(state))
}

#[post("/api/filters/month")]
async fn reconcile_months(
    body: web::Json<ReconcileRequest<u32>>,
    dashboard: web::Data<Dashboard>,
) -> Result<web::Json<FilterState<u32>>, ApiError> {
    let state = reconcile(body.into_inner(), dashboard.months(), Dimension::Month)?;
    Ok(web::Json(state))
}

#[get("/api/chart")]
async fn get_chart(
    query: web::Query<ChartQuery>,
    dashboard: web::Data<Dashboard>,
) -> Result<web::Json<ChartView>, ApiError> {
    let ticker = parse_ticker(query.ticker.as_deref(), dashboard.reference())?;
    let column = match query.column.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(column) => Some(
            column
                .parse::<Column>()
                .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        ),
    };
    let years = utils::parse_list(&query.years).map_err(ApiError::BadRequest)?;
    let months = utils::parse_list(&query.months).map_err(ApiError::BadRequest)?;
    dashboard.validate_selection(&years, &months)?;

    let request = ChartRequest {
        column,
        years,
        months,
    };
    let reaction = dashboard.chart(ticker.symbol(), &request).await;
    Ok(web::Json(ChartView::from_reaction(ticker, reaction)?))
}

#[get("/api/glance/{ticker}")]
async fn get_glance(
    ticker: web::Path<String>,
    dashboard: web::Data<Dashboard>,
) -> Result<web::Json<GlanceView>, ApiError> {
    let ticker = parse_ticker(Some(ticker.as_str()), dashboard.reference())?;
    let reaction = dashboard.glance(ticker.symbol()).await;
    Ok(web::Json(GlanceView::from_reaction(ticker, reaction)?))
}

async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(HealthcheckResponse {
        status: "not found".to_string(),
    })
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(healthcheck)
        .service(get_options)
        .service(reconcile_years)
        .service(reconcile_months)
        .service(get_chart)
        .service(get_glance);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Could not create config: {}", e);
            exit(1);
        }
    };

    let mut yahoo_api = YahooAPI::new();
    if let Some(redis_url) = config.redis_url.as_deref() {
        let mut redis_client = match redis::Client::open(redis_url) {
            Ok(client) => client,
            Err(e) => {
                error!("Could not create Redis client: {}", e);
                exit(1);
            }
        };
        if !redis_client.check_connection() {
            error!("Redis unavailable");
            exit(1);
        }
        info!("Redis connected, caching histories for {}s", config.cache_ttl_secs);
        yahoo_api = yahoo_api.with_cache(redis_client, config.cache_ttl_secs);
    }

    let provider: Arc<dyn HistoryProvider> = Arc::new(yahoo_api);
    let reference = Ticker::default();
    let dashboard = match Dashboard::load(provider, reference).await {
        Ok(dashboard) => dashboard,
        Err(e) => {
            error!("Could not load reference history for {}: {}", reference, e);
            exit(1);
        }
    };
    info!(
        "Reference history for {} loaded: {} years, {} months",
        reference,
        dashboard.years().values().len(),
        dashboard.months().values().len()
    );

    let dashboard = web::Data::new(dashboard);

    HttpServer::new(move || {
        App::new()
            .app_data(dashboard.clone())
            .configure(routes)
            .default_service(web::to(not_found))
            .wrap(Logger::default())
    })
    .bind(("0.0.0.0", config.port))?
    .workers(config.workers)
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use history_model::{DailyBar, ProviderResult};
    use serde_json::{Value, json};
    use std::collections::HashMap;

    struct StaticProvider {
        histories: HashMap<&'static str, Vec<DailyBar>>,
    }

    #[async_trait]
    impl HistoryProvider for StaticProvider {
        async fn fetch_history(&self, ticker: &str) -> ProviderResult<Vec<DailyBar>> {
            if ticker == "META" {
                return Err("upstream timed out".into());
            }
            Ok(self.histories.get(ticker).cloned().unwrap_or_default())
        }
    }

    fn bar(y: i32, m: u32, d: u32, close: f64) -> DailyBar {
        DailyBar {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            open: close,
            high: close + 5.0,
            low: close - 5.0,
            close,
            volume: 1_000,
        }
    }

    fn test_dashboard() -> web::Data<Dashboard> {
        let provider = StaticProvider {
            histories: HashMap::from([
                (
                    "TSLA",
                    vec![
                        bar(2020, 1, 2, 100.0),
                        bar(2020, 2, 3, 110.0),
                        bar(2021, 1, 4, 120.0),
                        bar(2022, 6, 1, 130.0),
                    ],
                ),
                ("AMZN", vec![bar(2022, 6, 1, 3000.0)]),
            ]),
        };
        web::Data::new(Dashboard::new(
            Arc::new(provider),
            Ticker::Tsla,
            Universe::new([2020, 2021, 2022]),
            Universe::new(1..=12),
        ))
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(test_dashboard())
                    .configure(routes)
                    .default_service(web::to(not_found)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn healthcheck_ok() {
        let app = app!();
        let req = test::TestRequest::get().uri("/healthcheck").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[actix_web::test]
    async fn unknown_route_not_found() {
        let app = app!();
        let req = test::TestRequest::get().uri("/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn options_lists_controls() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api/options").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["title"], json!("Stock Price App"));
        assert_eq!(body["default_ticker"], json!("TSLA"));
        assert_eq!(body["tickers"][1], json!({"label": "Amazon.com, Inc.", "value": "AMZN"}));
        assert_eq!(body["columns"], json!(["Open", "High", "Low", "Close", "Volume"]));
        assert_eq!(body["years"]["all_label"], json!("All Years"));
        assert_eq!(body["years"]["options"], json!([2020, 2021, 2022]));
        assert_eq!(body["months"]["options"].as_array().unwrap().len(), 12);
    }

    #[actix_web::test]
    async fn year_checklist_sync() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/api/filters/year")
            .set_json(json!({"trigger": "multi_select", "selected": [2021, 2020, 2022], "all": false}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"selected": [2020, 2021, 2022], "all": true}));

        let req = test::TestRequest::post()
            .uri("/api/filters/year")
            .set_json(json!({"trigger": "multi_select", "selected": [2020, 2022], "all": true}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"selected": [2020, 2022], "all": false}));
    }

    #[actix_web::test]
    async fn month_toggle_selects_and_clears() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/api/filters/month")
            .set_json(json!({"trigger": "all_toggle", "selected": [3], "all": true}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["selected"], json!([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]));
        assert_eq!(body["all"], json!(true));

        let req = test::TestRequest::post()
            .uri("/api/filters/month")
            .set_json(json!({"trigger": "all_toggle", "selected": [1, 2], "all": false}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"selected": [], "all": false}));
    }

    #[actix_web::test]
    async fn filter_outside_universe_rejected() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/api/filters/month")
            .set_json(json!({"trigger": "multi_select", "selected": [13]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn chart_filters_by_year_and_month() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/chart?ticker=tsla&column=close&years=2020,2021&months=1")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["available"], json!(true));
        assert_eq!(body["title"], json!("Plot of Close"));
        assert_eq!(
            body["points"],
            json!([
                {"date": "2020-01-02", "value": 100.0},
                {"date": "2021-01-04", "value": 120.0}
            ])
        );
    }

    #[actix_web::test]
    async fn chart_without_column_is_placeholder() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/chart?years=2020&months=1")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["available"], json!(true));
        assert_eq!(body["ticker"], json!("TSLA"));
        assert_eq!(body["title"], json!(null));
        assert_eq!(body["points"], json!([]));
    }

    #[actix_web::test]
    async fn chart_empty_selection_is_empty() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/chart?ticker=TSLA&column=Open&years=2020")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["available"], json!(true));
        assert_eq!(body["points"], json!([]));
    }

    #[actix_web::test]
    async fn chart_rejects_bad_input() {
        let app = app!();
        for uri in [
            "/api/chart?column=Date&years=2020&months=1",
            "/api/chart?column=Close&years=1999&months=1",
            "/api/chart?column=Close&years=2020&months=jan",
            "/api/chart?ticker=XXXX&column=Close",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn chart_no_data_for_empty_history() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/chart?ticker=NFLX&column=Close&years=2020&months=1")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["available"], json!(false));
        assert_eq!(body["points"], json!([]));
        assert_eq!(body["reason"], json!("No data for NFLX"));
    }

    #[actix_web::test]
    async fn chart_unavailable_provider_is_empty() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/chart?ticker=META&column=Close&years=2020&months=1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["available"], json!(false));
        assert_eq!(body["points"], json!([]));
        assert_eq!(
            body["reason"],
            json!("Provider unavailable for META: upstream timed out")
        );
    }

    #[actix_web::test]
    async fn glance_is_latest_bar_of_ticker() {
        let app = app!();

        let req = test::TestRequest::get().uri("/api/glance/TSLA").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["close"], json!(130.0));
        assert_eq!(body["date"], json!("2022-06-01"));

        let req = test::TestRequest::get().uri("/api/glance/amzn").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["ticker"], json!("AMZN"));
        assert_eq!(body["close"], json!(3000.0));
    }

    #[actix_web::test]
    async fn glance_unavailable_provider_is_blank() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api/glance/META").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["available"], json!(false));
        assert_eq!(body["open"], json!(null));
        assert_eq!(body["volume"], json!(null));
    }
}
