//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use estudio_backend::config::AppState;
use estudio_backend::docs::ApiDoc;
use estudio_backend::handlers;
use estudio_backend::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas do editor (protegidas pelo middleware de auth)
    let proposal_routes = Router::new()
        .route("/"
               , post(handlers::proposals::create_proposal)
               .get(handlers::proposals::list_proposals)
        )
        .route("/{id}"
               , get(handlers::proposals::get_proposal)
               .put(handlers::proposals::update_proposal)
               .delete(handlers::proposals::delete_proposal)
        )
        .route("/{id}/send", post(handlers::proposals::send_proposal))
        .route("/{id}/cancel", post(handlers::proposals::cancel_proposal))
        .route("/{id}/confirm-payment", post(handlers::proposals::confirm_payment))
        .route("/{id}/contract-file", post(handlers::proposals::upload_contract_file))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let template_routes = Router::new()
        .route("/"
               , post(handlers::templates::create_template)
               .get(handlers::templates::list_templates)
        )
        .route("/{id}"
               , get(handlers::templates::get_template)
               .put(handlers::templates::update_template)
               .delete(handlers::templates::delete_template)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let payment_routes = Router::new()
        .route("/"
               , post(handlers::payments::create_payment_config)
               .get(handlers::payments::list_payment_configs)
        )
        .route("/{id}", axum::routing::delete(handlers::payments::delete_payment_config))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Fluxo público do cliente: nenhuma sessão, o token é a credencial.
    let public_routes = Router::new()
        .route("/{token}", get(handlers::public::view_proposal))
        .route("/{token}/approve", post(handlers::public::approve_proposal))
        .route("/{token}/request-changes", post(handlers::public::request_changes))
        .route("/{token}/contract", post(handlers::public::contract_preview)
               .get(handlers::public::get_contract))
        .route("/{token}/sign", post(handlers::public::sign_proposal))
        .route("/{token}/receipt", post(handlers::public::upload_receipt))
        .route("/{token}/contract.pdf", get(handlers::public::download_contract_pdf));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/proposals", proposal_routes)
        .nest("/api/templates", template_routes)
        .nest("/api/payment-configs", payment_routes)
        .nest("/api/public/proposals", public_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
