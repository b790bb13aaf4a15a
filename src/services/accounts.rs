use validator::Validate;

use super::ensure_available;
use crate::auth::{hash_password, verify_password, AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::config::AdminBootstrap;
use crate::error::AppError;
use crate::models::{Identity, NewUser, Role, User, UserChanges};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// bcrypt is deliberately slow; keep it off the async workers.
async fn hash_off_thread(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Hashing task failed: {}", e)))?
}

async fn verify_off_thread(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Verification task failed: {}", e)))?
}

/// Creates an account and logs it in.
///
/// Duplicate emails are reported before duplicate usernames, each with its
/// own message.
pub async fn register(state: &AppState, request: RegisterRequest) -> Result<AuthResponse, AppError> {
    let request = request.normalized();
    request.validate()?;

    ensure_available(
        state.store.as_ref(),
        None,
        Some(&request.username),
        Some(&request.email),
    )
    .await?;

    let password_hash = hash_off_thread(request.password, state.password_cost).await?;
    let user = state
        .store
        .create_user(NewUser {
            username: request.username,
            email: request.email,
            password_hash,
            role: request.role.unwrap_or_default(),
        })
        .await?;

    log::info!("registered user {} ({}) as {}", user.id, user.username, user.role);
    let token = state.tokens.issue(&Identity::from(&user))?;
    Ok(AuthResponse { user, token })
}

/// Exchanges an email and password for a token.
///
/// Unknown emails and wrong passwords produce the same error.
pub async fn login(state: &AppState, request: LoginRequest) -> Result<AuthResponse, AppError> {
    let request = LoginRequest {
        email: request.email.trim().to_lowercase(),
        ..request
    };
    request.validate()?;

    let Some(credentials) = state.store.find_credentials(&request.email).await? else {
        log::warn!("login failed: unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    let matches = verify_off_thread(request.password, credentials.password_hash.clone()).await?;
    if !matches {
        log::warn!("login failed: wrong password for user {}", credentials.id);
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let user = User::from(credentials);
    let token = state.tokens.issue(&Identity::from(&user))?;
    Ok(AuthResponse { user, token })
}

pub async fn profile(state: &AppState, caller: &Identity) -> Result<User, AppError> {
    state
        .store
        .find_user(caller.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Lets a caller change their own username or email. The role is not editable here.
pub async fn update_profile(
    state: &AppState,
    caller: &Identity,
    request: UpdateProfileRequest,
) -> Result<User, AppError> {
    let request = request.normalized();
    request.validate()?;

    ensure_available(
        state.store.as_ref(),
        Some(caller.id),
        request.username.as_deref(),
        request.email.as_deref(),
    )
    .await?;

    let changes = UserChanges {
        username: request.username,
        email: request.email,
        role: None,
    };
    state
        .store
        .update_user(caller.id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Creates the configured admin account unless an admin already exists.
///
/// Returns the new account, or `None` when nothing had to be done.
pub async fn ensure_admin(state: &AppState, admin: &AdminBootstrap) -> Result<Option<User>, AppError> {
    if state.store.count_admins().await? > 0 {
        return Ok(None);
    }
    let response = register(
        state,
        RegisterRequest {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password: admin.password.clone(),
            role: Some(Role::Admin),
        },
    )
    .await?;
    Ok(Some(response.user))
}
