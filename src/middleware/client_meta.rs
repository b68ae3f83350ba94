// src/middleware/client_meta.rs

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};

/// Metadados do cliente gravados na trilha de auditoria.
///
/// O IP vem do primeiro valor de `X-Forwarded-For` quando presente
/// (estamos atrás de proxy), senão do endereço do socket.
#[derive(Debug, Clone)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: String,
}

impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let ip_address = forwarded.or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });

        let user_agent = parts
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Ok(ClientMeta { ip_address, user_agent })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> ClientMeta {
        let (mut parts, _) = request.into_parts();
        ClientMeta::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn prefers_first_forwarded_address() {
        let request = Request::builder()
            .header("x-forwarded-for", "10.0.0.1, 172.16.0.1")
            .header("user-agent", "curl/8.0")
            .body(())
            .unwrap();
        let meta = extract(request).await;
        assert_eq!(meta.ip_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(meta.user_agent, "curl/8.0");
    }

    #[tokio::test]
    async fn falls_back_to_socket_address() {
        let mut request = Request::builder().body(()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 9000))));
        let meta = extract(request).await;
        assert_eq!(meta.ip_address.as_deref(), Some("127.0.0.1"));
        assert_eq!(meta.user_agent, "");
    }
}
