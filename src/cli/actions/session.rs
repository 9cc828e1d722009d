use crate::{
    cli::{actions::context::Context, globals::GlobalArgs},
    routes::{return_destination, Resolution},
    session::{Credentials, SessionPhase, SessionState},
};
use anyhow::{Context as _, Result};
use secrecy::SecretString;
use tracing::{debug, instrument};

#[derive(Debug)]
pub struct SignInArgs {
    pub globals: GlobalArgs,
    pub email: String,
    pub password: SecretString,
    pub return_url: Option<String>,
}

#[derive(Debug)]
pub struct OpenArgs {
    pub globals: GlobalArgs,
    pub path: String,
}

/// Sign in, then persist the session cookies for later commands.
///
/// # Errors
/// Returns an error if validation or sign-in fails.
#[instrument(skip_all)]
pub async fn sign_in(args: SignInArgs) -> Result<()> {
    let credentials = Credentials::new(&args.email, args.password)?;
    let context = Context::open(&args.globals)?;

    let user = context.controller.sign_in(&credentials).await?;
    context
        .save_cookies()
        .context("failed to save session cookies")?;

    println!("Signed in as {}", user.email);
    println!("Continue at {}", return_destination(args.return_url.as_deref()));
    Ok(())
}

/// Sign out on the server (best effort) and drop all local session state.
///
/// # Errors
/// Returns an error if the local credentials cannot be removed.
#[instrument(skip_all)]
pub async fn sign_out(globals: &GlobalArgs) -> Result<()> {
    let context = Context::open(globals)?;
    context.controller.sign_out().await;
    context.forget_cookies()?;

    println!("Signed out");
    Ok(())
}

/// Paint the last known identity, then confirm it with the server.
///
/// # Errors
/// Returns an error if the API configuration is invalid.
#[instrument(skip_all)]
pub async fn status(globals: &GlobalArgs) -> Result<()> {
    let context = Context::open(globals)?;

    if let Some(user) = context.controller.restored_user() {
        debug!("Restored identity from session mirror");
        println!("Last known user: {}", user.email);
    }

    context.controller.initialize().await;
    let state = context.controller.snapshot();
    if !state.is_authenticated {
        context.forget_cookies()?;
    }

    println!("{}", describe(&state));
    Ok(())
}

/// Resolve a storefront path the way the navigation layer would.
///
/// # Errors
/// Returns an error if the API configuration is invalid.
#[instrument(skip_all, fields(path = %args.path))]
pub async fn open(args: OpenArgs) -> Result<()> {
    let context = Context::open(&args.globals)?;

    match context.navigate(&args.path).await {
        Resolution::Render(page) => println!("{page:?}"),
        Resolution::Redirect(location) => println!("Redirect: {location}"),
    }
    Ok(())
}

fn describe(state: &SessionState) -> String {
    match (state.phase(), &state.user) {
        (SessionPhase::Authenticated, Some(user)) => match &user.name {
            Some(name) => format!("Authenticated as {name} <{}>", user.email),
            None => format!("Authenticated as {}", user.email),
        },
        (SessionPhase::Authenticated, None) => "Authenticated".to_string(),
        (SessionPhase::Unauthenticated, _) => "Not signed in".to_string(),
        (SessionPhase::Checking, _) => "Checking session".to_string(),
        (SessionPhase::Unknown, _) => "Session not checked".to_string(),
    }
}
