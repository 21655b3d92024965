//! fsrbac-auth-core - 认证核心库
//!
//! JWT Claims 解析为调用方 Principal (角色 + 用户组)

use chrono::{Duration, Utc};
use fsrbac_authz::Principal;
use fsrbac_errors::{AppError, AppResult};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user name)
    pub sub: String,
    /// Expiration time
    pub exp: i64,
    /// Issued at
    pub iat: i64,
    /// JWT ID
    pub jti: String,
    /// Issuer
    #[serde(default)]
    pub iss: String,
    /// Audience
    #[serde(default)]
    pub aud: String,
    /// Token type
    #[serde(default)]
    pub token_type: String,
    /// Roles
    #[serde(default)]
    pub roles: Vec<String>,
    /// Groups
    #[serde(default)]
    pub groups: Vec<String>,
}

impl Claims {
    pub fn new(
        subject: &str,
        roles: Vec<String>,
        groups: Vec<String>,
        expires_in_secs: i64,
        issuer: &str,
        audience: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.to_string(),
            exp: (now + Duration::seconds(expires_in_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::now_v7().to_string(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            token_type: "access".to_string(),
            roles,
            groups,
        }
    }

    pub fn is_access_token(&self) -> bool {
        self.token_type == "access"
    }

    /// 转换为授权用的调用方
    pub fn principal(&self) -> Principal {
        Principal::new(self.sub.clone())
            .with_roles(self.roles.iter().cloned())
            .with_groups(self.groups.iter().cloned())
    }
}

/// 调用方解析
pub trait PrincipalResolver: Send + Sync {
    fn resolve(&self, token: &str) -> AppResult<Principal>;
}

/// Token 服务
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
    issuer: String,
    audience: String,
}

impl TokenService {
    pub fn new(secret: &str, access_token_expires_in: i64, issuer: String, audience: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in,
            issuer,
            audience,
        }
    }

    /// 生成访问令牌
    pub fn generate_access_token(
        &self,
        subject: &str,
        roles: Vec<String>,
        groups: Vec<String>,
    ) -> AppResult<String> {
        let claims = Claims::new(
            subject,
            roles,
            groups,
            self.access_token_expires_in,
            &self.issuer,
            &self.audience,
        );

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))
    }

    /// 验证令牌
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0; // 不允许时间偏差

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::unauthenticated(format!("Invalid token: {}", e)))?;

        let claims = token_data.claims;

        if claims.sub.is_empty() {
            return Err(AppError::unauthenticated("Token subject missing"));
        }

        if claims.jti.is_empty() {
            return Err(AppError::unauthenticated("Token ID (jti) missing"));
        }

        if !claims.is_access_token() {
            return Err(AppError::unauthenticated("Not an access token"));
        }

        Ok(claims)
    }
}

impl PrincipalResolver for TokenService {
    fn resolve(&self, token: &str) -> AppResult<Principal> {
        let claims = self.validate_token(strip_bearer(token))?;
        let principal = claims.principal();
        debug!(
            principal = %principal,
            roles = principal.roles.len(),
            groups = principal.groups.len(),
            "Principal resolved"
        );
        Ok(principal)
    }
}

/// 去掉 `Bearer ` 前缀
pub fn strip_bearer(header: &str) -> &str {
    let header = header.trim();
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .unwrap_or(header)
        .trim()
}
