//! Sign in, sign out, and who am I

use anyhow::Result;
use console::style;
use dialoguer::{Input, Password};

use crate::context::{expect_data, AppContext};

pub async fn login(ctx: &AppContext, email: Option<String>, remember: bool) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => Input::with_theme(&ctx.theme())
            .with_prompt("Email")
            .interact_text()?,
    };
    let password = Password::with_theme(&ctx.theme())
        .with_prompt("Password")
        .interact()?;

    let response = ctx.session.sign_in(&email, &password, remember).await?;
    let user = expect_data(response)?;

    ctx.print_success(&format!("Signed in as {}", user.email));
    ctx.print_info(&format!("Home: {}", ctx.session.landing_route().path()));
    if !remember {
        ctx.print_warning("Temporary session: it ends with this command. Use `fumi shell` to keep working.");
    }
    Ok(())
}

pub fn logout(ctx: &AppContext) -> Result<()> {
    ctx.session.logout();
    ctx.print_success("Signed out");
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    let user = ctx.require(&[])?;

    println!("{:<8} {}", "Name:", user.full_name());
    println!("{:<8} {}", "Email:", user.email);
    let roles: Vec<&str> = user.roles.iter().map(|r| r.name.as_str()).collect();
    println!("{:<8} {}", "Roles:", style(roles.join(", ")).cyan());
    println!("{:<8} {}", "Home:", ctx.session.landing_route().path());
    println!("{:<8} {}", "Server:", style(&ctx.config.api_url).dim());
    Ok(())
}
