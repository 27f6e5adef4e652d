//! User administration commands

use anyhow::Result;
use clap::Subcommand;
use dialoguer::Password;

use fumigation_client::services::NewUser;
use fumigation_client::{PageRequest, ROLE_ADMIN};

use super::entity_id;
use crate::context::{expect_data, AppContext};
use crate::output;

#[derive(Subcommand)]
pub enum UsersCommand {
    /// List users, optionally by role
    List {
        #[arg(short, long)]
        role: Option<String>,

        #[arg(long, default_value_t = 0)]
        page: u32,

        #[arg(long, default_value_t = 20)]
        size: u32,
    },

    /// Create a user (password is prompted)
    Create {
        #[arg(short, long)]
        email: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// Role name (admin, technician, client); repeat for several
        #[arg(short, long = "role", required = true)]
        roles: Vec<String>,
    },

    /// Replace a user's roles
    Roles {
        id: String,

        #[arg(short, long = "role", required = true)]
        roles: Vec<String>,
    },

    /// Delete a user
    Delete {
        id: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn run(ctx: &AppContext, cmd: UsersCommand) -> Result<()> {
    ctx.require(&[ROLE_ADMIN])?;

    match cmd {
        UsersCommand::List { role, page, size } => {
            let listing = expect_data(
                ctx.api
                    .users()
                    .list(PageRequest::new(page, size), role.as_deref())
                    .await?,
            )?;
            ctx.print_header(&format!("Users ({} total)", listing.total()));
            listing.items().iter().for_each(output::user_line);
        }
        UsersCommand::Create {
            email,
            first_name,
            last_name,
            roles,
        } => {
            let password = Password::with_theme(&ctx.theme())
                .with_prompt("Password for the new user")
                .with_confirmation("Repeat password", "Passwords do not match")
                .interact()?;
            let user = NewUser {
                first_name,
                last_name,
                email,
                password,
                roles,
            };
            let created = expect_data(ctx.api.users().create(&user).await?)?;
            ctx.print_success(&format!("Created {}", created.email));
        }
        UsersCommand::Roles { id, roles } => {
            let user = expect_data(
                ctx.api
                    .users()
                    .set_roles(&entity_id(&id), roles.as_slice())
                    .await?,
            )?;
            output::user_line(&user);
        }
        UsersCommand::Delete { id, yes } => {
            if !yes && !ctx.confirm(&format!("Delete user {}?", id), false)? {
                ctx.print_info("Cancelled");
                return Ok(());
            }
            expect_data(ctx.api.users().delete(&entity_id(&id)).await)?;
            ctx.print_success(&format!("User {} deleted", id));
        }
    }
    Ok(())
}
