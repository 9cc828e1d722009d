use crate::cli::actions::{catalog, session, Action};
use anyhow::Result;

/// Execute the provided action.
// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::SignIn(args) => session::sign_in(args).await,
        Action::SignOut(globals) => session::sign_out(&globals).await,
        Action::Status(globals) => session::status(&globals).await,
        Action::Open(args) => session::open(args).await,
        Action::Products(args) => catalog::products(args).await,
        Action::DeleteProduct(args) => catalog::delete(args).await,
        Action::Colors(args) => catalog::colors(args).await,
    }
}
