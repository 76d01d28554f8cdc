use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use campdir_api::config;
use campdir_api::database::manager::DatabaseManager;
use campdir_api::handlers;
use campdir_api::middleware::auth_middleware;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting campdir API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("CAMPDIR_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 campdir API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    let mut app = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public resource and auth routes
        .merge(public_routes())
        .merge(auth_public_routes())
        // Bearer-token protected routes
        .merge(protected_routes())
        // Global middleware
        .layer(TraceLayer::new_for_http());

    if config::config().security.enable_cors {
        app = app.layer(CorsLayer::permissive());
    }

    app
}

fn public_routes() -> Router {
    use handlers::public::{bootcamps, courses, reviews};

    Router::new()
        .route("/api/v1/bootcamps", get(bootcamps::bootcamps_list))
        .route(
            "/api/v1/bootcamps/radius/:zipcode/:distance",
            get(bootcamps::bootcamps_in_radius),
        )
        .route("/api/v1/bootcamps/:id", get(bootcamps::bootcamp_get))
        .route("/api/v1/bootcamps/:id/courses", get(bootcamps::bootcamp_courses_list))
        .route("/api/v1/bootcamps/:id/reviews", get(bootcamps::bootcamp_reviews_list))
        .route("/api/v1/courses", get(courses::courses_list))
        .route("/api/v1/courses/:id", get(courses::course_get))
        .route("/api/v1/reviews", get(reviews::reviews_list))
        .route("/api/v1/reviews/:id", get(reviews::review_get))
}

fn auth_public_routes() -> Router {
    use axum::routing::{post, put};
    use handlers::public::auth;

    Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", get(auth::logout))
        .route("/api/v1/auth/forgotpassword", post(auth::forgot_password))
        .route("/api/v1/auth/resetpassword/:resettoken", put(auth::reset_password))
}

fn protected_routes() -> Router {
    use axum::routing::{post, put};
    use handlers::protected::{auth, bootcamps, courses, reviews, users};

    Router::new()
        // Bootcamp mutations (publisher/admin, owner checked in handlers)
        .route("/api/v1/bootcamps", post(bootcamps::bootcamp_create))
        .route(
            "/api/v1/bootcamps/:id",
            put(bootcamps::bootcamp_update).delete(bootcamps::bootcamp_delete),
        )
        // Courses and reviews nested under their bootcamp
        .route("/api/v1/bootcamps/:id/courses", post(courses::course_create))
        .route("/api/v1/bootcamps/:id/reviews", post(reviews::review_create))
        .route(
            "/api/v1/courses/:id",
            put(courses::course_update).delete(courses::course_delete),
        )
        .route(
            "/api/v1/reviews/:id",
            put(reviews::review_update).delete(reviews::review_delete),
        )
        // Current-user account management
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/auth/updatedetails", put(auth::update_details))
        .route("/api/v1/auth/updatepassword", put(auth::update_password))
        // Admin user management
        .route("/api/v1/users", get(users::users_list).post(users::user_create))
        .route(
            "/api/v1/users/:id",
            get(users::user_get).put(users::user_update).delete(users::user_delete),
        )
        .route_layer(axum::middleware::from_fn(auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "campdir API",
            "version": version,
            "description": "Bootcamp directory REST API built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "bootcamps": "/api/v1/bootcamps[/:id] (GET public, mutations protected)",
                "courses": "/api/v1/courses[/:id] (GET public, mutations protected)",
                "reviews": "/api/v1/reviews[/:id] (GET public, mutations protected)",
                "radius": "/api/v1/bootcamps/radius/:zipcode/:distance (public)",
                "auth": "/api/v1/auth/* (register/login public, account management protected)",
                "users": "/api/v1/users[/:id] (admin)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
