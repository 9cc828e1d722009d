//! Maps validated CLI matches to an [`Action`].

use crate::catalog::FilamentType;
use crate::cli::{
    actions::{
        catalog::{ColorsArgs, DeleteArgs, ProductsArgs},
        session::{OpenArgs, SignInArgs},
        Action,
    },
    commands::{
        self, api, ARG_ALL, ARG_EMAIL, ARG_FILAMENT_TYPE, ARG_ID, ARG_PASSWORD, ARG_PATH,
        ARG_RETURN_URL,
    },
    globals::GlobalArgs,
};
use anyhow::{anyhow, bail, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let globals = GlobalArgs::new(api::Options::parse(matches)?);

    let required = |sub: &ArgMatches, id: &str| -> Result<String> {
        sub.get_one::<String>(id)
            .cloned()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("missing required argument: --{id}"))
    };

    match matches.subcommand() {
        Some((commands::CMD_SIGN_IN, sub)) => Ok(Action::SignIn(SignInArgs {
            globals,
            email: required(sub, ARG_EMAIL)?,
            password: SecretString::from(required(sub, ARG_PASSWORD)?),
            return_url: sub.get_one::<String>(ARG_RETURN_URL).cloned(),
        })),
        Some((commands::CMD_SIGN_OUT, _)) => Ok(Action::SignOut(globals)),
        Some((commands::CMD_STATUS, _)) => Ok(Action::Status(globals)),
        Some((commands::CMD_OPEN, sub)) => Ok(Action::Open(OpenArgs {
            globals,
            path: required(sub, ARG_PATH)?,
        })),
        Some((commands::CMD_PRODUCTS, sub)) => match sub.subcommand() {
            Some((commands::CMD_DELETE, delete)) => Ok(Action::DeleteProduct(DeleteArgs {
                globals,
                id: delete
                    .get_one::<i64>(ARG_ID)
                    .copied()
                    .context("missing required argument: id")?,
            })),
            _ => Ok(Action::Products(ProductsArgs {
                globals,
                id: sub.get_one::<i64>(ARG_ID).copied(),
            })),
        },
        Some((commands::CMD_COLORS, sub)) => {
            let filament_type = sub
                .get_one::<String>(ARG_FILAMENT_TYPE)
                .map_or(Ok(FilamentType::default()), |value| value.parse())
                .map_err(|err| anyhow!(err))?;
            Ok(Action::Colors(ColorsArgs {
                globals,
                filament_type,
                include_unavailable: sub.get_flag(ARG_ALL),
            }))
        }
        Some((other, _)) => bail!("unknown command: {other}"),
        None => bail!("no command given"),
    }
}
