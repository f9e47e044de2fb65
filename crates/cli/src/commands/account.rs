//! Account commands.

use clap::Args;
use secrecy::SecretString;
use serde_json::json;
use the_wind_storefront::{SignIn, Storefront};

use super::{CliError, emit, say};

#[derive(Args)]
pub struct LoginArgs {
    #[arg(short, long)]
    email: String,

    #[arg(short, long, env = "WIND_PASSWORD", hide_env_values = true)]
    password: String,

    /// Page that sent the shopper to sign in, e.g. `checkout`
    #[arg(long)]
    redirect: Option<String>,
}

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(short, long)]
    name: String,

    #[arg(short, long)]
    email: String,

    #[arg(short, long, env = "WIND_PASSWORD", hide_env_values = true)]
    password: String,

    #[arg(long)]
    redirect: Option<String>,
}

pub async fn login(storefront: &Storefront, args: LoginArgs) -> Result<(), CliError> {
    let password = SecretString::from(args.password);
    let signed_in = storefront
        .sign_in(&args.email, &password, args.redirect.as_deref())
        .await?;
    print_sign_in(&signed_in)
}

pub async fn register(storefront: &Storefront, args: RegisterArgs) -> Result<(), CliError> {
    let password = SecretString::from(args.password);
    let signed_in = storefront
        .sign_up(&args.name, &args.email, &password, args.redirect.as_deref())
        .await?;
    print_sign_in(&signed_in)
}

fn print_sign_in(signed_in: &SignIn) -> Result<(), CliError> {
    emit(&json!({
        "user": signed_in.user,
        "destination": format!("{:?}", signed_in.destination).to_lowercase(),
        "mergedCart": signed_in.merged_cart,
    }))
}

#[allow(clippy::unnecessary_wraps)]
pub fn logout(storefront: &Storefront) -> Result<(), CliError> {
    storefront.sign_out();
    say("Signed out");
    Ok(())
}

pub fn whoami(storefront: &Storefront) -> Result<(), CliError> {
    let session = storefront.session().snapshot();
    emit(&json!({
        "user": session.user,
        "guestId": session.guest_id,
    }))
}
