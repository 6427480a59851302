//! Users API handlers.
//!
//! ```text
//! POST /api/v1/users {"firstname":"Ada","lastname":"Lovelace","email":"ada@engine.net","password":"abc123"}
//! POST /api/v1/users/login {"email":"ada@engine.net","password":"abc123"}
//! GET  /api/v1/users/{id}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{
    PasswordChange, RegisterUserRequest, ResetPasswordRequest, UpdateUserRequest,
};
use crate::domain::{LoginCredentials, Password, User, UserId, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedCaller, token_header};
use crate::inbound::http::envelope::{self, empty_body};
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_path_id, password_validation_error, user_validation_error,
};

const PASSWORD: FieldName = FieldName::new("password");

/// Registration body for `POST /api/v1/users`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
}

/// Login body for `POST /api/v1/users/login`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of a successful login. The token travels in the `x-auth-token`
/// header.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[schema(value_type = String)]
    pub id: UserId,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

impl From<&User> for LoginResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            firstname: user.firstname.as_ref().to_owned(),
            lastname: user.lastname.as_ref().to_owned(),
            email: user.email.as_ref().to_owned(),
        }
    }
}

/// Body for `POST /api/v1/users/forgot-password`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Query of the reset link: `?email=`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct ResetPasswordQuery {
    /// Account whose password is being reset.
    pub email: String,
}

/// Body for `POST /api/v1/users/reset-password`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ResetPasswordBody {
    pub password: String,
    pub confirm_password: String,
}

/// Body for `PUT /api/v1/users/{id}/password`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

impl From<ChangePasswordRequest> for PasswordChange {
    fn from(value: ChangePasswordRequest) -> Self {
        Self {
            old_password: Password::unchecked(&value.old_password),
            new_password: Password::unchecked(&value.new_password),
            confirm_new_password: Password::unchecked(&value.confirm_new_password),
        }
    }
}

/// Body for `PUT /api/v1/users/{id}`. Supplying any password field turns
/// the edit into a profile update plus password change.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUserBody {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_new_password: Option<String>,
}

impl UpdateUserBody {
    fn password_change(&self) -> Option<PasswordChange> {
        if self.old_password.is_none()
            && self.new_password.is_none()
            && self.confirm_new_password.is_none()
        {
            return None;
        }
        let field = |value: &Option<String>| Password::unchecked(value.as_deref().unwrap_or(""));
        Some(PasswordChange {
            old_password: field(&self.old_password),
            new_password: field(&self.new_password),
            confirm_new_password: field(&self.confirm_new_password),
        })
    }
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserSchema),
        (status = 400, description = "Invalid request or duplicate email", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let profile =
        UserProfile::try_from_parts(&payload.firstname, &payload.lastname, &payload.email)
            .map_err(user_validation_error)?;
    let password = Password::new(&payload.password)
        .map_err(|err| password_validation_error(PASSWORD, err))?;

    let user = state
        .users
        .register(RegisterUserRequest { profile, password })
        .await?;
    Ok(envelope::created("User created successfully", user))
}

/// Check credentials and issue a session token.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse,
            headers(("x-auth-token" = String, description = "Session token"))),
        (status = 400, description = "Email or Password is Incorrect", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(user_validation_error)?;
    let outcome = state.users.login(&credentials).await?;

    let body = envelope::Envelope::new("Login successful", LoginResponse::from(&outcome.user));
    Ok(HttpResponse::Ok()
        .insert_header(token_header(&outcome.token))
        .json(body))
}

/// Start the forgot-password flow. The answer is identical whether or not
/// the account exists.
#[utoipa::path(
    post,
    path = "/api/v1/users/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset instructions sent if the account exists"),
        (status = 400, description = "Email is required", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "forgotPassword",
    security([])
)]
#[post("/users/forgot-password")]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    payload: web::Json<ForgotPasswordRequest>,
) -> ApiResult<HttpResponse> {
    state.users.request_password_reset(&payload.email).await?;
    Ok(envelope::ok(
        "Please check your email for further instructions on resetting your password",
        empty_body(),
    ))
}

/// Complete the forgot-password flow.
#[utoipa::path(
    post,
    path = "/api/v1/users/reset-password",
    params(ResetPasswordQuery),
    request_body = ResetPasswordBody,
    responses(
        (status = 200, description = "Password reset successfully", body = UserSchema),
        (status = 400, description = "Passwords do not match", body = ErrorSchema),
        (status = 404, description = "User does not exist", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "resetPassword",
    security([])
)]
#[post("/users/reset-password")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    query: web::Query<ResetPasswordQuery>,
    payload: web::Json<ResetPasswordBody>,
) -> ApiResult<HttpResponse> {
    let request = ResetPasswordRequest {
        email: query.into_inner().email,
        password: Password::unchecked(&payload.password),
        confirm_password: Password::unchecked(&payload.confirm_password),
    };
    let user = state.users.reset_password(request).await?;
    Ok(envelope::ok("Password reset successfully", user))
}

/// List every account.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "All users", body = [UserSchema]),
        (status = 401, description = "Not signed in", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    _caller: AuthenticatedCaller,
) -> ApiResult<HttpResponse> {
    let users = state.users_query.list_users().await?;
    Ok(envelope::ok("All users", users))
}

/// Fetch one account.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Single user", body = UserSchema),
        (status = 401, description = "Not signed in", body = ErrorSchema),
        (status = 404, description = "User does not exist", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    _caller: AuthenticatedCaller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: UserId = parse_path_id(&path)?;
    let user = state.users_query.get_user(&id).await?;
    Ok(envelope::ok("Single user", user))
}

/// Edit a profile, optionally changing the password. Owner or admin only.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserBody,
    responses(
        (status = 200, description = "User details updated successfully", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Not signed in or not permitted", body = ErrorSchema),
        (status = 404, description = "User does not exist", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<String>,
    payload: web::Json<UpdateUserBody>,
) -> ApiResult<HttpResponse> {
    let user_id: UserId = parse_path_id(&path)?;
    let profile =
        UserProfile::try_from_parts(&payload.firstname, &payload.lastname, &payload.email)
            .map_err(user_validation_error)?;
    let request = UpdateUserRequest {
        user_id,
        profile,
        password_change: payload.password_change(),
    };
    let user = state.users.update_user(caller.caller(), request).await?;
    Ok(envelope::ok("User details updated successfully", user))
}

/// Change a password. Owner or admin only.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/password",
    params(("id" = String, Path, description = "User id")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed successfully", body = UserSchema),
        (status = 400, description = "Old password is incorrect, or the new pair is invalid", body = ErrorSchema),
        (status = 401, description = "Not signed in or not permitted", body = ErrorSchema),
        (status = 404, description = "User does not exist", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "changePassword"
)]
#[put("/users/{id}/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<String>,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let user_id: UserId = parse_path_id(&path)?;
    let user = state
        .users
        .change_password(caller.caller(), &user_id, payload.into_inner().into())
        .await?;
    Ok(envelope::ok("Password changed successfully", user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::LoginOutcome;
    use crate::domain::{AuthToken, EmailAddress, Error, PasswordDigest, PersonName};
    use crate::inbound::http::auth::AUTH_TOKEN_HEADER;
    use crate::inbound::http::test_utils::{TEST_TOKEN, TestPorts, member};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn user(email: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::random(),
            firstname: PersonName::firstname("Ada").expect("name"),
            lastname: PersonName::lastname("Lovelace").expect("name"),
            email: EmailAddress::new(email).expect("email"),
            password: PasswordDigest::new("$argon2id$stub"),
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn registration_returns_the_user_without_password() {
        let mut ports = TestPorts::default();
        ports
            .users
            .expect_register()
            .withf(|request| request.profile.email.as_ref() == "a@b.com")
            .returning(|_| Ok(user("a@b.com")));
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(json!({
                "firstname": "A", "lastname": "B", "email": "a@b.com", "password": "abc123"
            }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "User created successfully");
        assert_eq!(body["body"]["email"], "a@b.com");
        assert!(body["body"].get("password").is_none());
    }

    #[rstest]
    #[case(json!({"firstname": "", "lastname": "B", "email": "a@b.com", "password": "abc123"}), "firstname", "empty_field")]
    #[case(json!({"firstname": "A", "lastname": "B", "email": "a@b.org", "password": "abc123"}), "email", "invalid_email")]
    #[case(json!({"firstname": "A", "lastname": "B", "email": "a@b.com", "password": "a!"}), "password", "insecure_password")]
    #[actix_web::test]
    async fn registration_rejects_invalid_fields(
        #[case] payload: Value,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let mut ports = TestPorts::default();
        ports.users.expect_register().never();
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(payload)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], field);
        assert_eq!(body["details"]["code"], code);
    }

    #[rstest]
    #[actix_web::test]
    async fn login_sets_the_token_header() {
        let mut ports = TestPorts::default();
        ports.users.expect_login().returning(|_| {
            Ok(LoginOutcome {
                user: user("a@b.com"),
                token: AuthToken::new("signed.token"),
            })
        });
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/users/login")
            .set_json(json!({"email": "a@b.com", "password": "abc123"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(AUTH_TOKEN_HEADER)
                .and_then(|value| value.to_str().ok()),
            Some("signed.token")
        );
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "Login successful");
        let mut fields: Vec<&str> = body["body"]
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        fields.sort_unstable();
        assert_eq!(fields, ["email", "firstname", "id", "lastname"]);
    }

    #[rstest]
    #[actix_web::test]
    async fn forgot_password_answers_the_same_for_any_email() {
        let mut ports = TestPorts::default();
        ports
            .users
            .expect_request_password_reset()
            .returning(|_| Ok(()));
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/users/forgot-password")
            .set_json(json!({"email": "nobody@example.com"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body["message"],
            "Please check your email for further instructions on resetting your password"
        );
        assert_eq!(body["body"], json!({}));
    }

    #[rstest]
    #[actix_web::test]
    async fn reset_password_reads_the_email_from_the_query() {
        let mut ports = TestPorts::default();
        ports
            .users
            .expect_reset_password()
            .withf(|request| {
                request.email == "a@b.com" && request.confirm_password.expose() == "abc124"
            })
            .returning(|_| Err(Error::invalid_request("Passwords do not match")));
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/users/reset-password?email=a@b.com")
            .set_json(json!({"password": "abc123", "confirmPassword": "abc124"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "Passwords do not match");
    }

    #[rstest]
    #[actix_web::test]
    async fn listing_users_requires_a_token() {
        let mut ports = TestPorts::default();
        ports.users_query.expect_list_users().never();
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/users")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body["message"],
            "You need to be signed in to perform this operation"
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_user_ids_are_not_found() {
        let mut ports = TestPorts::signed_in(member());
        ports.users_query.expect_get_user().never();
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/users/42")
            .insert_header((AUTH_TOKEN_HEADER, TEST_TOKEN))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "Invalid id passed");
    }

    #[rstest]
    #[actix_web::test]
    async fn profile_edits_carry_password_changes_only_when_supplied() {
        let caller = member();
        let mut ports = TestPorts::signed_in(caller.clone());
        ports
            .users
            .expect_update_user()
            .withf(|_, request| request.password_change.is_none())
            .returning(|_, _| Ok(user("new@b.com")));
        let app = actix_test::init_service(ports.into_app()).await;

        let request = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/users/{}", caller.user_id))
            .insert_header((AUTH_TOKEN_HEADER, TEST_TOKEN))
            .set_json(json!({"firstname": "A", "lastname": "B", "email": "new@b.com"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], "User details updated successfully");
    }

    #[rstest]
    fn partial_password_fields_still_request_a_change() {
        let body = UpdateUserBody {
            new_password: Some("abc123".into()),
            ..UpdateUserBody::default()
        };
        let change = body.password_change().expect("change requested");
        assert_eq!(change.old_password.expose(), "");
        assert_eq!(change.new_password.expose(), "abc123");
    }
}
