use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit,
    config::AppConfig,
    dto::accounts::{Claims, FormPage, LoginForm, LoginResponse, SignupForm},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta, Outcome},
    routes::paths,
    session::SessionId,
    state::AppState,
};

const USERNAME_MAX_LEN: usize = 150;
const PASSWORD_MIN_LEN: usize = 8;

pub fn signup_page() -> Outcome<FormPage> {
    Outcome::render(
        "Sign Up",
        FormPage {
            action: "/api/accounts/signup".into(),
            fields: vec!["username".into(), "password1".into(), "password2".into()],
        },
    )
}

pub fn login_page() -> Outcome<FormPage> {
    Outcome::render(
        "Login",
        FormPage {
            action: paths::LOGIN.into(),
            fields: vec!["username".into(), "password".into()],
        },
    )
}

/// Form-level signup checks. Username uniqueness is checked against the database.
pub fn validate_signup(form: &SignupForm) -> Vec<String> {
    let mut errors = Vec::new();

    let username = form.username.trim();
    if username.is_empty() {
        errors.push("Username is required.".to_string());
    } else if username.chars().count() > USERNAME_MAX_LEN {
        errors.push(format!(
            "Username must be at most {USERNAME_MAX_LEN} characters."
        ));
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        errors.push("Username may contain only letters, digits and @/./+/-/_.".to_string());
    }

    if form.password1 != form.password2 {
        errors.push("The two password fields didn't match.".to_string());
    }
    if form.password1.chars().count() < PASSWORD_MIN_LEN {
        errors.push(format!(
            "Password must contain at least {PASSWORD_MIN_LEN} characters."
        ));
    }
    if !form.password1.is_empty() && form.password1.chars().all(|c| c.is_ascii_digit()) {
        errors.push("Password can't be entirely numeric.".to_string());
    }

    errors
}

pub async fn signup(state: &AppState, form: SignupForm) -> AppResult<Outcome<()>> {
    let errors = validate_signup(&form);
    if !errors.is_empty() {
        return Err(AppError::BadRequest(errors.join(" ")));
    }
    let username = form.username.trim().to_string();

    let exist = Users::find()
        .filter(UserCol::Username.eq(username.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest(
            "A user with that username already exists.".to_string(),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(form.password1.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username),
        password_hash: Set(password_hash),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(user_id = %user.id, "user signed up");
    audit::record(
        &state.pool,
        user.id,
        "user_signup",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(Outcome::redirect(paths::LOGIN))
}

pub async fn login(state: &AppState, form: LoginForm) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginForm { username, password } = form;
    let invalid = || AppError::BadRequest("Invalid username or password".into());
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(invalid());
    }

    let user = Users::find()
        .filter(UserCol::Username.eq(username))
        .one(&state.orm)
        .await?
        .ok_or_else(invalid)?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(invalid());
    }

    let token = issue_token(&state.config, user.id, &user.username)?;

    audit::record(
        &state.pool,
        user.id,
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse { token },
        Some(Meta::empty()),
    ))
}

/// Drops the caller's session state, cart included.
pub async fn logout(state: &AppState, user: &AuthUser, session: &SessionId) -> Outcome<()> {
    state.sessions.remove(session);
    audit::record(
        &state.pool,
        user.user_id,
        "user_logout",
        "users",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;
    Outcome::redirect(paths::MOVIES)
}

pub fn issue_token(config: &AppConfig, user_id: Uuid, username: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.jwt_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}
