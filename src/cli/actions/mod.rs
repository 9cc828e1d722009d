pub mod catalog;
pub mod context;
pub mod session;

// Internal "interpreter" for `Action`.
mod run;

use crate::cli::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    SignIn(session::SignInArgs),
    SignOut(GlobalArgs),
    Status(GlobalArgs),
    Open(session::OpenArgs),
    Products(catalog::ProductsArgs),
    DeleteProduct(catalog::DeleteArgs),
    Colors(catalog::ColorsArgs),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
