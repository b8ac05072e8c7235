use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "ssr")] {
        use anyhow::Context;
        use axum::{
            extract::DefaultBodyLimit,
            middleware,
            routing::post,
            Router,
        };
        use docqa::app::*;
        use docqa::config::{HostConfig, CHAT_PATH, UPLOAD_PATH};
        use docqa::middleware::{trace_requests, ColoredFields};
        use docqa::proxy::{forward_request, REQUEST_BODY_LIMIT};
        use docqa::state::AppState;
        use dotenv::dotenv;
        use env_logger::Env;
        use leptos::prelude::*;
        use leptos_axum::{generate_route_list, LeptosRoutes};
        use tracing_subscriber::EnvFilter;

        #[tokio::main]
        async fn main() -> anyhow::Result<()> {
            dotenv().ok();
            env_logger::init_from_env(Env::default().default_filter_or("info"));
            tracing_subscriber::fmt()
                .fmt_fields(ColoredFields)
                .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
                .init();

            let host = HostConfig::from_env()?;
            log::info!("proxying document requests to {}", host.backend_url);

            let conf = get_configuration(None).context("reading leptos configuration")?;
            let addr = conf.leptos_options.site_addr;
            let leptos_options = conf.leptos_options;
            let routes = generate_route_list(App);

            let app_state = AppState::new(leptos_options.clone(), &host)?;

            let proxy_routes = Router::new()
                .route(UPLOAD_PATH, post(forward_request))
                .route(CHAT_PATH, post(forward_request))
                .layer(DefaultBodyLimit::max(REQUEST_BODY_LIMIT));

            let app = Router::new()
                .merge(proxy_routes)
                .leptos_routes(&app_state, routes, {
                    let leptos_options = leptos_options.clone();
                    move || shell(leptos_options.clone())
                })
                .fallback(leptos_axum::file_and_error_handler::<AppState, _>(shell))
                .layer(middleware::from_fn(trace_requests))
                .with_state(app_state);

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("binding {addr}"))?;
            log::info!("listening on http://{}", &addr);
            axum::serve(listener, app.into_make_service()).await?;
            Ok(())
        }
    } else {
        pub fn main() {
            // no client-side main function
            // see lib.rs for hydration function instead
        }
    }
}
