// File: services/intentpay_backend/src/main.rs
use axum::Router;
use intentpay_common::logging;
use intentpay_config::load_config;
use intentpay_stripe::{routes as stripe_routes, PaymentGateway, StripeClient};
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let level = std::env::var("LOG_LEVEL").unwrap_or_default();
    logging::init_with_level(logging::level_from_str(&level));

    let config = Arc::new(load_config()?);

    let gateway: Arc<dyn PaymentGateway> = Arc::new(StripeClient::new(&config.stripe)?);
    let mut app: Router = stripe_routes(config.clone(), gateway);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use intentpay_stripe::doc::StripeApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Intentpay API",
                version = "0.1.0",
                description = "Stripe payment intent demo server",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            components(),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(StripeApiDoc::openapi());
        info!("Adding Swagger UI at /docs");

        let swagger_ui = SwaggerUi::new("/docs").url("/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    // Client pages for anything no API route matched
    if let Some(static_dir) = config.static_dir.as_deref() {
        info!("Serving static files from {}", static_dir);
        app = app.fallback_service(ServeDir::new(static_dir));
    }

    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening at http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
