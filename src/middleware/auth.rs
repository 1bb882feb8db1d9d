//! Middleware de autenticación JWT
//!
//! Verifica el token, exige `read` para las consultas y `write` para las
//! modificaciones, e inyecta el conductor autenticado en las extensions.

use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{
    models::AuthenticatedDriver,
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{extract_token_from_header, verify_token, READ_SCOPE, WRITE_SCOPE},
    },
};

/// Permiso que necesita un método HTTP
pub fn required_scope(method: &Method) -> &'static str {
    match *method {
        Method::GET | Method::HEAD => READ_SCOPE,
        _ => WRITE_SCOPE,
    }
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.jwt)?;

    let scope = required_scope(request.method());
    if !claims.has_scope(scope) {
        debug!("🔒 Token de '{}' sin permiso '{}'", claims.sub, scope);
        return Err(AppError::Forbidden(format!("Missing scope '{}'", scope)));
    }

    request
        .extensions_mut()
        .insert(AuthenticatedDriver::new(claims.sub));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_scope_by_method() {
        assert_eq!(required_scope(&Method::GET), READ_SCOPE);
        assert_eq!(required_scope(&Method::POST), WRITE_SCOPE);
        assert_eq!(required_scope(&Method::PUT), WRITE_SCOPE);
        assert_eq!(required_scope(&Method::DELETE), WRITE_SCOPE);
    }
}
