pub mod api;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const CMD_SIGN_IN: &str = "signin";
pub const CMD_SIGN_OUT: &str = "signout";
pub const CMD_STATUS: &str = "status";
pub const CMD_OPEN: &str = "open";
pub const CMD_PRODUCTS: &str = "products";
pub const CMD_DELETE: &str = "delete";
pub const CMD_COLORS: &str = "colors";

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_RETURN_URL: &str = "return-url";
pub const ARG_PATH: &str = "path";
pub const ARG_ID: &str = "id";
pub const ARG_FILAMENT_TYPE: &str = "filament-type";
pub const ARG_ALL: &str = "all";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("storefront")
        .about("3D print storefront client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(CMD_SIGN_IN)
                .about("Sign in with email and password")
                .arg(
                    Arg::new(ARG_EMAIL)
                        .short('e')
                        .long("email")
                        .help("Account email")
                        .env("STOREFRONT_EMAIL")
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_PASSWORD)
                        .short('p')
                        .long("password")
                        .help("Account password")
                        .env("STOREFRONT_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_RETURN_URL)
                        .long("return-url")
                        .help("Page to continue at after signing in (local paths only)"),
                ),
        )
        .subcommand(Command::new(CMD_SIGN_OUT).about("Sign out and forget the local session"))
        .subcommand(Command::new(CMD_STATUS).about("Check the session with the server"))
        .subcommand(
            Command::new(CMD_OPEN)
                .about("Resolve a storefront path through the route guards")
                .arg(Arg::new(ARG_PATH).help("Path, e.g. /add-product").required(true)),
        )
        .subcommand(
            Command::new(CMD_PRODUCTS)
                .about("List products, or show one with --id")
                .arg(
                    Arg::new(ARG_ID)
                        .long("id")
                        .help("Product id")
                        .value_parser(clap::value_parser!(i64)),
                )
                .subcommand(
                    Command::new(CMD_DELETE).about("Delete a product").arg(
                        Arg::new(ARG_ID)
                            .help("Product id")
                            .required(true)
                            .value_parser(clap::value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new(CMD_COLORS)
                .about("List filament colors")
                .arg(
                    Arg::new(ARG_FILAMENT_TYPE)
                        .short('f')
                        .long("filament-type")
                        .help("Filament type")
                        .default_value("PLA")
                        .value_parser(["PLA", "PETG"])
                        .ignore_case(true),
                )
                .arg(
                    Arg::new(ARG_ALL)
                        .long("all")
                        .help("Include colors that are not available")
                        .action(clap::ArgAction::SetTrue),
                ),
        );

    let command = api::with_args(command);
    logging::with_args(command)
}
