use serde_json::Value;

use crate::errors::ClientError;
use crate::models::user::{
    AuthResponse, AuthTokens, ChangePasswordRequest, LoginRequest, RegisterRequest,
    UpdateProfileRequest, User,
};

use super::http::{object_from_value, ApiClient};

/// Session endpoints. Login and register install the session; logout
/// destroys it.
pub struct AuthApi<'a> {
    http: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(http: &'a ApiClient) -> Self {
        Self { http }
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<User, ClientError> {
        let value = self
            .http
            .post("auth/login/", Some(serde_json::to_value(credentials)?))
            .await?;
        let auth: AuthResponse = serde_json::from_value(value)?;
        self.install(auth)
    }

    /// Register a new account. The server wraps this response differently
    /// from login: `{success, data: {user, tokens: {access, refresh}}}`.
    pub async fn register(&self, data: &RegisterRequest) -> Result<User, ClientError> {
        let value = self
            .http
            .post("auth/register/", Some(serde_json::to_value(data)?))
            .await?;

        let auth: AuthResponse = match value.get("data") {
            Some(inner) if inner.get("tokens").is_some() => {
                let user = serde_json::from_value(inner["user"].clone())?;
                let tokens: AuthTokens = serde_json::from_value(inner["tokens"].clone())?;
                AuthResponse {
                    user,
                    access: tokens.access,
                    refresh: tokens.refresh,
                }
            }
            _ => serde_json::from_value(value)?,
        };
        self.install(auth)
    }

    fn install(&self, auth: AuthResponse) -> Result<User, ClientError> {
        self.http.session().install(
            auth.user.clone(),
            AuthTokens {
                access: auth.access,
                refresh: auth.refresh,
            },
        );
        Ok(auth.user)
    }

    /// Best-effort server-side logout; the local session is destroyed either
    /// way.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self.http.post("auth/logout/", None).await;
        self.http.session().clear();
        result.map(|_| ())
    }

    pub async fn profile(&self) -> Result<User, ClientError> {
        let value = self.http.get("auth/profile/").await?;
        let user: User = object_from_value(value)?;
        self.http.session().set_user(user.clone());
        Ok(user)
    }

    pub async fn update_profile(&self, data: &UpdateProfileRequest) -> Result<User, ClientError> {
        let value = self
            .http
            .patch("auth/profile/", Some(serde_json::to_value(data)?))
            .await?;
        let user: User = object_from_value(value)?;
        self.http.session().set_user(user.clone());
        Ok(user)
    }

    pub async fn update_avatar(&self, avatar_url: &str) -> Result<Value, ClientError> {
        let value = self
            .http
            .post(
                "auth/profile/avatar/",
                Some(serde_json::json!({ "avatar_url": avatar_url })),
            )
            .await?;
        object_from_value(value)
    }

    pub async fn change_password(&self, data: &ChangePasswordRequest) -> Result<(), ClientError> {
        self.http
            .post("auth/password/change/", Some(serde_json::to_value(data)?))
            .await?;
        Ok(())
    }
}
