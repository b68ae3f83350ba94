//src/main.rs

use std::net::SocketAddr;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;

mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
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

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Recursos do CRM, todos atrás do auth_guard
    let crm_routes = Router::new()
        .route(
            "/leads",
            get(handlers::lead::list_leads)
                .post(handlers::lead::create_lead)
                .put(handlers::lead::update_lead)
                .delete(handlers::lead::delete_lead),
        )
        .route("/leads/{id}/summary", get(handlers::lead::lead_summary))
        .route(
            "/contacts",
            get(handlers::contact::list_contacts)
                .post(handlers::contact::create_contact)
                .put(handlers::contact::update_contact)
                .delete(handlers::contact::delete_contact),
        )
        .route(
            "/notes",
            get(handlers::note::list_notes)
                .post(handlers::note::create_note)
                .put(handlers::note::update_note)
                .delete(handlers::note::delete_note),
        )
        .route(
            "/reminders",
            get(handlers::reminder::list_reminders)
                .post(handlers::reminder::create_reminder)
                .put(handlers::reminder::update_reminder)
                .delete(handlers::reminder::delete_reminder),
        )
        .route(
            "/correspondence",
            get(handlers::correspondence::list_correspondence)
                .post(handlers::correspondence::create_correspondence)
                .put(handlers::correspondence::update_correspondence)
                .delete(handlers::correspondence::delete_correspondence),
        )
        .route("/audit", get(handlers::audit::list_audit_entries))
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api", crm_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    // with_connect_info: o IP do cliente alimenta a trilha de auditoria
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Erro no servidor Axum");
}
