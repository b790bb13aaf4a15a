use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::policy;
use crate::error::AppError;
use crate::models::Identity;

/// The authenticated caller, as resolved by `AuthMiddleware`.
///
/// Only usable on routes wrapped by the middleware; anywhere else the
/// extensions are empty and extraction fails with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Identity>().cloned() {
            Some(identity) => ready(Ok(CurrentUser(identity))),
            None => ready(Err(AppError::Unauthorized(
                "Access denied. No token provided.".to_string(),
            )
            .into())),
        }
    }
}

/// An authenticated caller holding the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

impl FromRequest for AdminUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = match req.extensions().get::<Identity>().cloned() {
            Some(identity) => identity,
            None => {
                return ready(Err(AppError::Unauthorized(
                    "Access denied. No token provided.".to_string(),
                )
                .into()))
            }
        };
        match policy::require_admin(&identity) {
            Ok(()) => ready(Ok(AdminUser(identity))),
            Err(err) => ready(Err(err.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;

    fn identity(role: Role) -> Identity {
        Identity {
            id: 123,
            username: "alice".into(),
            email: "alice@example.com".into(),
            role,
        }
    }

    #[actix_rt::test]
    async fn test_current_user_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(identity(Role::User));

        let mut payload = Payload::None;
        let extracted = CurrentUser::from_request(&req, &mut payload).await;
        assert_eq!(extracted.unwrap().0.id, 123);
    }

    #[actix_rt::test]
    async fn test_current_user_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let err = CurrentUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_admin_extractor_rejects_regular_user() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(identity(Role::User));

        let mut payload = Payload::None;
        let err = AdminUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::FORBIDDEN);
    }

    #[actix_rt::test]
    async fn test_admin_extractor_accepts_admin() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(identity(Role::Admin));

        let mut payload = Payload::None;
        let admin = AdminUser::from_request(&req, &mut payload).await.unwrap();
        assert!(admin.0.is_admin());
    }
}
