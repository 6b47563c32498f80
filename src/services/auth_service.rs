use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::DatabaseConnection;
use tracing::{debug, info, warn};

use crate::db::entities::user;
use crate::db::services::user_service;
use crate::error::{ServiceError, ServiceResult, is_unique_violation};
use crate::web::models::{Claims, LoginRequest, LoginResponse, RegisterRequest};

fn validate_registration(req: &RegisterRequest) -> ServiceResult<()> {
    let well_formed = req
        .email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !well_formed {
        return Err(ServiceError::Validation("A valid email address is required.".to_string()));
    }
    if req.password.is_empty() {
        return Err(ServiceError::Validation("Password must not be empty.".to_string()));
    }
    Ok(())
}

/// Registers a new active account. The stored credential is a bcrypt hash,
/// never the password itself.
pub async fn register_user(db: &DatabaseConnection, req: RegisterRequest, bcrypt_cost: u32) -> ServiceResult<user::Model> {
    validate_registration(&req)?;

    if user_service::get_user_by_email(db, &req.email).await?.is_some() {
        return Err(ServiceError::DuplicateEmail(req.email));
    }

    let password_hash =
        hash(&req.password, bcrypt_cost).map_err(|e| ServiceError::PasswordHashing(e.to_string()))?;

    // A concurrent registration can still win the race past the check above.
    let user = user_service::create_user(db, &req.email, &password_hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ServiceError::DuplicateEmail(req.email.clone())
            } else {
                ServiceError::Database(e)
            }
        })?;

    info!(user_id = user.id, email = %user.email, "User registered.");
    Ok(user)
}

/// Checks an email and password pair. Unknown emails and wrong passwords
/// are indistinguishable to the caller.
pub async fn authenticate_user(db: &DatabaseConnection, email: &str, password: &str) -> ServiceResult<user::Model> {
    let Some(user) = user_service::get_user_by_email(db, email).await? else {
        return Err(ServiceError::InvalidCredentials);
    };

    let valid_password =
        verify(password, &user.hashed_password).map_err(|e| ServiceError::PasswordHashing(e.to_string()))?;
    if !valid_password {
        warn!(email, "Rejected login with a wrong password.");
        return Err(ServiceError::InvalidCredentials);
    }

    if !user.is_active {
        return Err(ServiceError::InactiveAccount);
    }

    Ok(user)
}

pub async fn login_user(
    db: &DatabaseConnection,
    req: LoginRequest,
    jwt_secret: &str,
    token_ttl: Duration,
) -> ServiceResult<LoginResponse> {
    let user = authenticate_user(db, &req.email, &req.password).await?;
    let access_token = create_access_token(&user, jwt_secret, token_ttl)?;

    info!(user_id = user.id, "User logged in.");
    Ok(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
    })
}

/// Signs an HS256 token naming the user, valid for `ttl` from now.
pub fn create_access_token(user: &user::Model, jwt_secret: &str, ttl: Duration) -> ServiceResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| ServiceError::TokenCreation("token expiry out of range".to_string()))?
        .timestamp()
        .max(0) as usize;

    let claims = Claims {
        sub: user.email.clone(),
        user_id: user.id,
        exp: expiration,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(jwt_secret.as_ref()))
        .map_err(|e| ServiceError::TokenCreation(e.to_string()))
}

/// Verifies the signature and the expiry of a token. Any failure reads as
/// bad credentials.
pub fn decode_access_token(token: &str, jwt_secret: &str) -> ServiceResult<Claims> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(token, &DecodingKey::from_secret(jwt_secret.as_ref()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = ?e, "Rejected access token.");
            ServiceError::InvalidCredentials
        })
}

pub async fn get_user(db: &DatabaseConnection, user_id: i32) -> ServiceResult<user::Model> {
    user_service::get_user_by_id(db, user_id)
        .await?
        .ok_or(ServiceError::NotFound("User"))
}
