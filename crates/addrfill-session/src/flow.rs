//! Identity flow seam.
//!
//! The host runtime opens the provider's consent page and hands back the
//! URL it was redirected to. Everything around that call is plain URL work.

use async_trait::async_trait;
use url::Url;

use crate::error::SessionError;

/// The host's web-auth facility.
#[async_trait]
pub trait IdentityFlow: Send + Sync {
    /// Redirect URI registered for this client.
    fn redirect_uri(&self) -> String;

    /// Open `auth_url` interactively and return the final redirect URL.
    async fn launch(&self, auth_url: Url) -> Result<Url, SessionError>;
}

/// Provider authorization URL requesting an identity token.
pub fn authorization_url(
    authorize_url: &str,
    client_id: &str,
    redirect_uri: &str,
    nonce: &str,
) -> Result<Url, SessionError> {
    let mut url = Url::parse(authorize_url).map_err(|e| {
        SessionError::Internal(format!("Invalid authorize URL '{}': {}", authorize_url, e))
    })?;

    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("response_type", "id_token")
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", "openid email")
        .append_pair("nonce", nonce);

    Ok(url)
}

/// Pull `id_token` out of the fragment of the redirect URL.
pub fn extract_id_token(response: &Url) -> Result<String, SessionError> {
    let fragment = response
        .fragment()
        .ok_or_else(|| SessionError::AuthFlow("response URL has no fragment".to_string()))?;

    url::form_urlencoded::parse(fragment.as_bytes())
        .find(|(name, _)| name == "id_token")
        .map(|(_, value)| value.into_owned())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| SessionError::AuthFlow("no id_token in response URL".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_parameters() {
        let url = authorization_url(
            "https://accounts.google.com/o/oauth2/v2/auth",
            "client-1",
            "https://ext.chromiumapp.org/auth",
            "abc123",
        )
        .unwrap();

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "client-1");
        assert_eq!(params["response_type"], "id_token");
        assert_eq!(params["redirect_uri"], "https://ext.chromiumapp.org/auth");
        assert_eq!(params["scope"], "openid email");
        assert_eq!(params["nonce"], "abc123");
        assert_eq!(url.host_str(), Some("accounts.google.com"));
    }

    #[test]
    fn test_authorization_url_rejects_garbage() {
        assert!(authorization_url("::", "c", "r", "n").is_err());
    }

    #[test]
    fn test_extract_id_token() {
        let url = Url::parse(
            "https://ext.chromiumapp.org/auth#state=x&id_token=eyJ.abc.def&authuser=0",
        )
        .unwrap();
        assert_eq!(extract_id_token(&url).unwrap(), "eyJ.abc.def");
    }

    #[test]
    fn test_extract_id_token_missing() {
        let no_fragment = Url::parse("https://ext.chromiumapp.org/auth?id_token=x").unwrap();
        assert!(matches!(
            extract_id_token(&no_fragment),
            Err(SessionError::AuthFlow(_))
        ));

        let error = Url::parse("https://ext.chromiumapp.org/auth#error=access_denied").unwrap();
        assert!(matches!(
            extract_id_token(&error),
            Err(SessionError::AuthFlow(_))
        ));
    }
}
