use actix_web::{test, web, App};
use chrono::DateTime;
use marketplace_server::configure_routes;

mod common;

#[actix_web::test]
async fn test_health_check() {
    let state = web::Data::new(common::state(common::store()));

    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(|cfg| configure_routes(cfg, false)),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["status"], "healthy");
    assert!(DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
}
