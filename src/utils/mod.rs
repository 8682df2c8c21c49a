use crate::models::{Claims, ServiceError};
use actix_web::{HttpMessage, HttpRequest};
use log::warn;

pub mod study_storage;
pub mod user_directory;

// JWT utility functions
pub mod jwt {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

    // Generate a new JWT token for a user
    pub fn generate_token(
        user_id: &str,
        email: &str,
        name: Option<&str>,
        secret: &str,
        ttl_days: i64,
    ) -> Result<String, ServiceError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Duration::days(ttl_days))
            .ok_or(ServiceError::InternalServerError)?
            .timestamp() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.map(str::to_string),
            exp: expiration,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .map_err(|_| ServiceError::InternalServerError)
    }

    // Validate and decode a JWT token
    pub fn decode_token(token: &str, secret: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ServiceError::Unauthenticated)
    }

    // Extract JWT from Authorization header
    pub fn extract_token_from_header(auth_header: &str) -> Result<String, ServiceError> {
        match auth_header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(ServiceError::Unauthenticated),
        }
    }
}

// Middleware for JWT authentication
pub mod auth_middleware {
    use super::*;
    use actix_web::body::EitherBody;
    use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
    use actix_web::http::header;
    use actix_web::{Error, ResponseError};
    use futures::future::{ok, Ready};
    use std::future::Future;
    use std::pin::Pin;
    use std::rc::Rc;

    pub struct Authentication {
        secret: Rc<String>,
    }

    impl Authentication {
        pub fn new(secret: impl Into<String>) -> Self {
            Self {
                secret: Rc::new(secret.into()),
            }
        }
    }

    impl<S, B> Transform<S, ServiceRequest> for Authentication
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<EitherBody<B>>;
        type Error = Error;
        type Transform = AuthenticationMiddleware<S>;
        type InitError = ();
        type Future = Ready<Result<Self::Transform, Self::InitError>>;

        fn new_transform(&self, service: S) -> Self::Future {
            ok(AuthenticationMiddleware {
                service,
                secret: Rc::clone(&self.secret),
            })
        }
    }

    pub struct AuthenticationMiddleware<S> {
        service: S,
        secret: Rc<String>,
    }

    impl<S> AuthenticationMiddleware<S> {
        fn claims_for(&self, req: &ServiceRequest) -> Result<Claims, ServiceError> {
            let auth_header = req
                .headers()
                .get(header::AUTHORIZATION)
                .ok_or(ServiceError::Unauthenticated)?;
            let auth_str = auth_header
                .to_str()
                .map_err(|_| ServiceError::Unauthenticated)?;
            let token = jwt::extract_token_from_header(auth_str)?;
            jwt::decode_token(&token, &self.secret)
        }
    }

    impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<EitherBody<B>>;
        type Error = Error;
        type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

        forward_ready!(service);

        fn call(&self, req: ServiceRequest) -> Self::Future {
            match self.claims_for(&req) {
                Ok(claims) => {
                    // Add the claims to the request extensions
                    req.extensions_mut().insert(claims);
                    let fut = self.service.call(req);
                    Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
                }
                Err(err) => {
                    warn!("Rejected unauthenticated request to {}", req.path());
                    let response = err.error_response();
                    Box::pin(async move {
                        Ok(req.into_response(response).map_into_right_body())
                    })
                }
            }
        }
    }
}

// Get the authenticated claims from a request
pub fn get_claims_from_request(req: &HttpRequest) -> Result<Claims, ServiceError> {
    req.extensions()
        .get::<Claims>()
        .cloned()
        .ok_or(ServiceError::Unauthenticated)
}

// Get the authenticated user ID from a request
pub fn get_user_id_from_request(req: &HttpRequest) -> Result<String, ServiceError> {
    get_claims_from_request(req).map(|claims| claims.sub)
}

// Derive a display name from an email address
pub fn get_username_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
