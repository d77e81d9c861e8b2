// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account and session endpoints.
//!
//! Signup never starts a session; the client logs in afterwards. Login sets
//! the `sid` cookie, logout and password change clear it.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderName, HeaderValue, StatusCode},
    Json,
};

use super::{required, ApiJson};
use crate::{
    audit_log,
    auth::{
        cookie::{clear_session_cookie, session_cookie},
        password::{hash_password, verify_password, verify_unknown_account},
        Auth, OptionalAuth, SessionIdentity,
    },
    error::{ApiError, ErrorBody},
    models::{
        ChangePasswordRequest, LoginRequest, SignupRequest, UpdateProfileRequest, UserProfile,
    },
    state::AppState,
    storage::{normalize_email, AuditEvent, AuditEventType, StoredUser, UserRepository},
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const EMAIL_TAKEN: &str = "A user with this email address already exists";

type CookieHeader = [(HeaderName, HeaderValue); 1];

/// Argon2 is CPU-bound, so hashing runs on the blocking pool.
async fn hash_blocking(password: String) -> Result<String, ApiError> {
    Ok(tokio::task::spawn_blocking(move || hash_password(&password)).await??)
}

async fn verify_blocking(password: String, stored_hash: String) -> Result<bool, ApiError> {
    Ok(tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await??)
}

async fn verify_unknown_blocking(password: String) -> Result<bool, ApiError> {
    Ok(tokio::task::spawn_blocking(move || verify_unknown_account(&password)).await??)
}

fn load_account(state: &AppState, identity: &SessionIdentity) -> Result<StoredUser, ApiError> {
    UserRepository::new(state.storage())
        .find(&identity.user_id)?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

#[utoipa::path(
    post,
    path = "/v1/users/signup",
    request_body = SignupRequest,
    tag = "Users",
    responses(
        (status = 201, description = "Account created", body = UserProfile),
        (status = 400, description = "Missing field", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody),
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let name = required(request.name, "name")?;
    let email = required(request.email, "email")?;
    let password = required(request.password, "password")?;

    let password_hash = hash_blocking(password).await?;
    let user = StoredUser::new(name, &email, password_hash);

    let repo = UserRepository::new(state.storage());
    {
        let _accounts = state.lock_accounts().await;
        if repo.find_by_email(&user.email)?.is_some() {
            return Err(ApiError::conflict(EMAIL_TAKEN));
        }
        repo.create(&user)?;
    }

    audit_log!(
        state.storage(),
        AuditEvent::new(AuditEventType::UserSignedUp).with_user(user.id)
    );
    tracing::info!(user_id = %user.id, "User signed up");

    Ok((StatusCode::CREATED, Json(user.profile())))
}

#[utoipa::path(
    post,
    path = "/v1/users/login",
    request_body = LoginRequest,
    tag = "Users",
    responses(
        (status = 200, description = "Logged in; session cookie set", body = UserProfile),
        (status = 400, description = "Missing field", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<(CookieHeader, Json<UserProfile>), ApiError> {
    let email = required(request.email, "email")?;
    let password = required(request.password, "password")?;

    let user = UserRepository::new(state.storage()).find_by_email(&email)?;
    let verified = match &user {
        Some(user) => verify_blocking(password, user.password_hash.clone()).await?,
        None => verify_unknown_blocking(password).await?,
    };

    let user = match user {
        Some(user) if verified => user,
        other => {
            let mut event = AuditEvent::new(AuditEventType::LoginFailed).failed(INVALID_CREDENTIALS);
            if let Some(user) = other {
                event = event.with_user(user.id);
            }
            audit_log!(state.storage(), event);
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
    };

    let session_id = state.sessions().create(user.id).await;
    let cookie = session_cookie(&session_id, state.sessions().ttl(), state.cookie_secure());

    audit_log!(
        state.storage(),
        AuditEvent::new(AuditEventType::LoginSucceeded).with_user(user.id)
    );

    Ok(([(SET_COOKIE, cookie)], Json(user.profile())))
}

/// End the caller's session. Succeeds without a session too.
#[utoipa::path(
    post,
    path = "/v1/users/logout",
    tag = "Users",
    responses((status = 204, description = "Logged out; session cookie cleared"))
)]
pub async fn logout(
    OptionalAuth(identity): OptionalAuth,
    State(state): State<AppState>,
) -> (StatusCode, CookieHeader) {
    if let Some(identity) = identity {
        state.sessions().destroy(&identity.session_id).await;
        audit_log!(state.storage(), AuditEventType::LoggedOut, identity);
    }

    (
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, clear_session_cookie(state.cookie_secure()))],
    )
}

#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "No session"),
    )
)]
pub async fn get_current_user(
    Auth(identity): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(load_account(&state, &identity)?.profile()))
}

/// Change name and/or email. Absent fields are left as they are.
#[utoipa::path(
    patch,
    path = "/v1/users/me",
    request_body = UpdateProfileRequest,
    tag = "Users",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 400, description = "Blank field", body = ErrorBody),
        (status = 401, description = "No session"),
        (status = 409, description = "Email already registered", body = ErrorBody),
    )
)]
pub async fn update_profile(
    Auth(identity): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let repo = UserRepository::new(state.storage());
    let _accounts = state.lock_accounts().await;
    let mut user = load_account(&state, &identity)?;

    if request.name.is_some() {
        user.name = required(request.name, "name")?;
    }

    if request.email.is_some() {
        let email = required(request.email, "email")?;
        if let Some(existing) = repo.find_by_email(&email)? {
            if existing.id != user.id {
                return Err(ApiError::conflict(EMAIL_TAKEN));
            }
        }
        user.email = normalize_email(&email);
    }

    repo.update(&user)?;
    audit_log!(state.storage(), AuditEventType::ProfileUpdated, identity);

    Ok(Json(user.profile()))
}

/// Change the password. Ends every session of the user on success.
#[utoipa::path(
    patch,
    path = "/v1/users/me/password",
    request_body = ChangePasswordRequest,
    tag = "Users",
    security(("session_cookie" = [])),
    responses(
        (status = 204, description = "Password changed; sessions ended"),
        (status = 400, description = "Missing field or confirmation mismatch", body = ErrorBody),
        (status = 401, description = "No session or wrong current password", body = ErrorBody),
    )
)]
pub async fn change_password(
    Auth(identity): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> Result<(StatusCode, CookieHeader), ApiError> {
    let current = required(request.current_password, "current_password")?;
    let new_password = required(request.new_password, "new_password")?;
    let confirmation = required(request.confirm_new_password, "confirm_new_password")?;

    if new_password != confirmation {
        return Err(ApiError::bad_request("New passwords do not match"));
    }

    let mut user = load_account(&state, &identity)?;
    if !verify_blocking(current, user.password_hash.clone()).await? {
        audit_log!(
            state.storage(),
            AuditEvent::new(AuditEventType::PasswordChanged)
                .with_user(user.id)
                .failed("wrong current password")
        );
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }

    user.password_hash = hash_blocking(new_password).await?;
    UserRepository::new(state.storage()).update(&user)?;

    let ended = state.sessions().destroy_for_user(&user.id).await;
    audit_log!(state.storage(), AuditEventType::PasswordChanged, identity);
    tracing::info!(user_id = %user.id, sessions_ended = ended, "Password changed");

    Ok((
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, clear_session_cookie(state.cookie_secure()))],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup_request(email: &str) -> SignupRequest {
        SignupRequest {
            name: Some("Alice".to_string()),
            email: Some(email.to_string()),
            password: Some("correct horse".to_string()),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn session_id(cookie: &HeaderValue) -> String {
        cookie
            .to_str()
            .unwrap()
            .strip_prefix("sid=")
            .and_then(|rest| rest.split(';').next())
            .unwrap()
            .to_string()
    }

    async fn signed_in(state: &AppState, email: &str) -> SessionIdentity {
        signup(State(state.clone()), ApiJson(signup_request(email)))
            .await
            .unwrap();
        let ([(_, cookie)], Json(profile)) = login(
            State(state.clone()),
            ApiJson(login_request(email, "correct horse")),
        )
        .await
        .unwrap();
        SessionIdentity::new(profile.id, session_id(&cookie))
    }

    #[tokio::test]
    async fn signup_creates_account_without_session() {
        let (state, _temp_dir) = AppState::for_tests();

        let (status, Json(profile)) = signup(
            State(state.clone()),
            ApiJson(signup_request("Alice@Example.com")),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(profile.email, "alice@example.com");
        assert!(state.sessions().is_empty().await);

        let stored = UserRepository::new(state.storage())
            .find(&profile.id)
            .unwrap()
            .unwrap();
        assert!(stored.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_email() {
        let (state, _temp_dir) = AppState::for_tests();
        signup(State(state.clone()), ApiJson(signup_request("a@example.com")))
            .await
            .unwrap();

        let err = signup(State(state), ApiJson(signup_request(" A@EXAMPLE.com ")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_signups_for_one_email_store_one_account() {
        let (state, _temp_dir) = AppState::for_tests();

        let first = tokio::spawn(signup(
            State(state.clone()),
            ApiJson(signup_request("dup@example.com")),
        ));
        let second = tokio::spawn(signup(
            State(state.clone()),
            ApiJson(signup_request("DUP@example.com")),
        ));
        let (first, second) = tokio::join!(first, second);

        let mut statuses = [first.unwrap(), second.unwrap()].map(|result| match result {
            Ok((status, _)) => status,
            Err(err) => err.status,
        });
        statuses.sort();
        assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);

        let accounts = UserRepository::new(state.storage()).list_all().unwrap();
        assert_eq!(accounts.len(), 1);
    }

    #[tokio::test]
    async fn signup_requires_fields() {
        let (state, _temp_dir) = AppState::for_tests();
        let err = signup(
            State(state),
            ApiJson(SignupRequest {
                password: None,
                ..signup_request("a@example.com")
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "password is required");
    }

    #[tokio::test]
    async fn login_sets_cookie_and_session() {
        let (state, _temp_dir) = AppState::for_tests();
        signup(State(state.clone()), ApiJson(signup_request("a@example.com")))
            .await
            .unwrap();

        let ([(name, cookie)], Json(profile)) = login(
            State(state.clone()),
            ApiJson(login_request("a@example.com", "correct horse")),
        )
        .await
        .unwrap();

        assert_eq!(name, SET_COOKIE);
        assert!(cookie.to_str().unwrap().contains("HttpOnly"));
        let identity = state.sessions().resolve(&session_id(&cookie)).await.unwrap();
        assert_eq!(identity.user_id, profile.id);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (state, _temp_dir) = AppState::for_tests();
        signup(State(state.clone()), ApiJson(signup_request("a@example.com")))
            .await
            .unwrap();

        for request in [
            login_request("a@example.com", "wrong"),
            login_request("nobody@example.com", "correct horse"),
        ] {
            let err = login(State(state.clone()), ApiJson(request))
                .await
                .unwrap_err();
            assert_eq!(err.status, StatusCode::UNAUTHORIZED);
            assert_eq!(err.message, INVALID_CREDENTIALS);
        }
        assert!(state.sessions().is_empty().await);
    }

    #[tokio::test]
    async fn logout_destroys_session() {
        let (state, _temp_dir) = AppState::for_tests();
        let identity = signed_in(&state, "a@example.com").await;

        let (status, [(_, cookie)]) =
            logout(OptionalAuth(Some(identity.clone())), State(state.clone())).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(cookie.to_str().unwrap().contains("Max-Age=0"));
        assert!(state.sessions().resolve(&identity.session_id).await.is_none());

        let (status, _) = logout(OptionalAuth(None), State(state)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn update_profile_changes_fields_and_detects_conflicts() {
        let (state, _temp_dir) = AppState::for_tests();
        let alice = signed_in(&state, "alice@example.com").await;
        signed_in(&state, "bob@example.com").await;

        let Json(profile) = update_profile(
            Auth(alice.clone()),
            State(state.clone()),
            ApiJson(UpdateProfileRequest {
                name: Some("Alice B".to_string()),
                email: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(profile.name, "Alice B");
        assert_eq!(profile.email, "alice@example.com");

        let err = update_profile(
            Auth(alice.clone()),
            State(state.clone()),
            ApiJson(UpdateProfileRequest {
                name: None,
                email: Some("BOB@example.com".to_string()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let Json(profile) = update_profile(
            Auth(alice.clone()),
            State(state.clone()),
            ApiJson(UpdateProfileRequest {
                name: None,
                email: Some("Alice@Example.com".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(profile.email, "alice@example.com");

        let Json(me) = get_current_user(Auth(alice), State(state)).await.unwrap();
        assert_eq!(me.name, "Alice B");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_email_changes_to_one_address_admit_one() {
        let (state, _temp_dir) = AppState::for_tests();
        let alice = signed_in(&state, "alice@example.com").await;
        let bob = signed_in(&state, "bob@example.com").await;

        let claim = |identity: SessionIdentity| {
            tokio::spawn(update_profile(
                Auth(identity),
                State(state.clone()),
                ApiJson(UpdateProfileRequest {
                    name: None,
                    email: Some("shared@example.com".to_string()),
                }),
            ))
        };
        let (first, second) = tokio::join!(claim(alice), claim(bob));

        let mut statuses = [first.unwrap(), second.unwrap()].map(|result| match result {
            Ok(_) => StatusCode::OK,
            Err(err) => err.status,
        });
        statuses.sort();
        assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);

        let holders = UserRepository::new(state.storage())
            .list_where(|user| user.email == "shared@example.com")
            .unwrap();
        assert_eq!(holders.len(), 1);
    }

    #[tokio::test]
    async fn change_password_checks_and_ends_sessions() {
        let (state, _temp_dir) = AppState::for_tests();
        let alice = signed_in(&state, "a@example.com").await;
        let change = |current: &str, new: &str, confirm: &str| ChangePasswordRequest {
            current_password: Some(current.to_string()),
            new_password: Some(new.to_string()),
            confirm_new_password: Some(confirm.to_string()),
        };

        let err = change_password(
            Auth(alice.clone()),
            State(state.clone()),
            ApiJson(change("correct horse", "new-pass", "other-pass")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = change_password(
            Auth(alice.clone()),
            State(state.clone()),
            ApiJson(change("wrong", "new-pass", "new-pass")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        let (status, _) = change_password(
            Auth(alice.clone()),
            State(state.clone()),
            ApiJson(change("correct horse", "new-pass", "new-pass")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.sessions().resolve(&alice.session_id).await.is_none());

        let err = login(
            State(state.clone()),
            ApiJson(login_request("a@example.com", "correct horse")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        login(
            State(state),
            ApiJson(login_request("a@example.com", "new-pass")),
        )
        .await
        .unwrap();
    }
}
