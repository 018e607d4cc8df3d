//! Account commands.

use secrecy::SecretString;
use stockroom_admin::account::{self, Registered, Registration};

use super::CommandError;
use crate::context::AppContext;
use crate::output;
use crate::RegisterArgs;

/// Sign in and persist the session.
pub async fn login(ctx: &mut AppContext, username: &str, password: String) -> Result<(), CommandError> {
    let password = SecretString::from(password);
    let user = account::login(&ctx.api, &mut ctx.session, username, &password).await?;
    ctx.reauthorize();

    if ctx.json {
        return Ok(output::json(&user)?);
    }
    output::user(&user, ctx.session.is_admin());
    Ok(())
}

pub fn logout(ctx: &mut AppContext) -> Result<(), CommandError> {
    ctx.session.logout()?;
    ctx.reauthorize();
    output::line("Logged out");
    Ok(())
}

/// Show the signed-in user, refreshing the stored profile from the API when
/// the token is still accepted.
pub async fn whoami(ctx: &mut AppContext) -> Result<(), CommandError> {
    if !ctx.session.is_authenticated() {
        output::line("Not logged in");
        return Ok(());
    }

    match ctx.session.authorize(&ctx.api).me().await {
        Ok(profile) => {
            ctx.session.update_user(&serde_json::to_value(&profile)?)?;
        }
        Err(e) => tracing::warn!(error = %e, "could not refresh profile, showing stored one"),
    }

    if let Some(user) = ctx.session.user() {
        if ctx.json {
            return Ok(output::json(user)?);
        }
        output::user(user, ctx.session.is_admin());
    }
    Ok(())
}

/// Create an account and sign in with it.
pub async fn register(ctx: &mut AppContext, args: RegisterArgs) -> Result<(), CommandError> {
    let confirm_password = args.confirm_password.unwrap_or_else(|| args.password.clone());
    let form = Registration {
        first_name: args.first_name,
        last_name: args.last_name,
        username: args.username,
        email: args.email,
        password: SecretString::from(args.password),
        confirm_password: SecretString::from(confirm_password),
        age: args.age,
        gender: args.gender,
        image: args.image,
    };

    match account::register_and_login(&ctx.api, &mut ctx.session, &form).await? {
        Registered::LoggedIn(user) => {
            ctx.reauthorize();
            output::user(&user, ctx.session.is_admin());
        }
        Registered::RegisteredOnly(user) => {
            output::line(&format!(
                "Registered {} (id {}). Sign in with `stockroom login {}`.",
                user.display_name(),
                user.id,
                user.username
            ));
        }
    }
    Ok(())
}
