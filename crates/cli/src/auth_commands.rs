use anyhow::Result;
use strato_auth::{AuthError, Authenticator, ProviderConfig};

pub async fn login() -> Result<()> {
    let auth = Authenticator::new(ProviderConfig::from_env())?;
    auth.login().await?;
    println!("Successfully logged in.");
    Ok(())
}

pub fn logout() -> Result<()> {
    let auth = Authenticator::new(ProviderConfig::from_env())?;
    auth.logout()?;
    println!("Logged out.");
    Ok(())
}

pub async fn status() -> Result<()> {
    let auth = Authenticator::new(ProviderConfig::from_env())?;
    match auth.get_token().await {
        Ok(token) => {
            println!("Logged in via {}.", token.auth_method);
            Ok(())
        },
        Err(AuthError::CredentialsNotFound) => {
            println!("Not logged in. Run `strato login` to authenticate.");
            Ok(())
        },
        Err(e) => Err(e.into()),
    }
}
