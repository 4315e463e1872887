//! Identity resolution.
//!
//! Authentication lives upstream (gateway, password hashing, OTP email and
//! OAuth are external collaborators). The gateway forwards the already
//! authenticated caller in two trusted headers, which these extractors turn
//! into a typed identity. Every cart and order operation keys off
//! `Identity::user_id`.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use uuid::Uuid;

use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: Uuid,
    pub is_admin: bool,
}

fn resolve(req: &HttpRequest) -> Result<Identity, AppError> {
    let raw = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("Missing {} header", USER_ID_HEADER)))?;

    let user_id = Uuid::parse_str(raw)
        .map_err(|_| AppError::Unauthorized(format!("Malformed {} header", USER_ID_HEADER)))?;

    let is_admin = req
        .headers()
        .get(USER_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|role| role.eq_ignore_ascii_case("admin"))
        .unwrap_or(false);

    Ok(Identity { user_id, is_admin })
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, AppError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}

/// An `Identity` that is additionally required to carry the admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminIdentity(pub Identity);

impl FromRequest for AdminIdentity {
    type Error = AppError;
    type Future = Ready<Result<Self, AppError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req).and_then(|identity| {
            if identity.is_admin {
                Ok(AdminIdentity(identity))
            } else {
                Err(AppError::Forbidden)
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn resolves_user_id_from_header() {
        let user_id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, user_id.to_string()))
            .to_http_request();

        let identity = Identity::from_request(&req, &mut Payload::None)
            .await
            .unwrap();
        assert_eq!(identity.user_id, user_id);
        assert!(!identity.is_admin);
    }

    #[actix_web::test]
    async fn missing_header_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        let err = Identity::from_request(&req, &mut Payload::None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[actix_web::test]
    async fn malformed_user_id_is_unauthorized() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "not-a-uuid"))
            .to_http_request();
        let err = Identity::from_request(&req, &mut Payload::None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[actix_web::test]
    async fn admin_extractor_requires_the_admin_role() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, Uuid::new_v4().to_string()))
            .to_http_request();
        let err = AdminIdentity::from_request(&req, &mut Payload::None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, Uuid::new_v4().to_string()))
            .insert_header((USER_ROLE_HEADER, "admin"))
            .to_http_request();
        let admin = AdminIdentity::from_request(&req, &mut Payload::None)
            .await
            .unwrap();
        assert!(admin.0.is_admin);
    }
}
