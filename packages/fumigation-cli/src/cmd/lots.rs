//! Lot commands

use anyhow::Result;
use clap::Subcommand;

use fumigation_client::{LotStatus, PageRequest, ROLE_ADMIN, ROLE_TECHNICIAN};

use super::entity_id;
use crate::context::{expect_data, AppContext};
use crate::output;

#[derive(Subcommand)]
pub enum LotsCommand {
    /// List every lot (admin)
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,

        #[arg(long, default_value_t = 20)]
        size: u32,
    },

    /// Lots assigned to you (technician)
    Assigned,

    /// Assign technicians to a lot (admin)
    Assign {
        id: String,

        /// Technician id; repeat for several
        #[arg(short, long = "technician", required = true)]
        technicians: Vec<String>,
    },

    /// Move a lot forward: pending, in-service, completed
    Status { id: String, status: String },
}

pub async fn run(ctx: &AppContext, cmd: LotsCommand) -> Result<()> {
    match cmd {
        LotsCommand::List { page, size } => {
            ctx.require(&[ROLE_ADMIN])?;
            let listing = expect_data(ctx.api.lots().list(PageRequest::new(page, size)).await?)?;
            ctx.print_header(&format!("Lots ({} total)", listing.total()));
            listing.items().iter().for_each(output::lot_line);
        }
        LotsCommand::Assigned => {
            ctx.require(&[ROLE_TECHNICIAN])?;
            let lots = expect_data(ctx.api.lots().assigned().await?)?;
            ctx.print_header("Your lots");
            if lots.is_empty() {
                ctx.print_info("Nothing assigned");
            }
            lots.iter().for_each(output::lot_line);
        }
        LotsCommand::Assign { id, technicians } => {
            ctx.require(&[ROLE_ADMIN])?;
            let ids: Vec<_> = technicians.iter().map(|t| entity_id(t)).collect();
            let lot = expect_data(
                ctx.api
                    .lots()
                    .assign_technicians(&entity_id(&id), &ids)
                    .await?,
            )?;
            ctx.print_success(&format!(
                "Lot {} now has {} technician(s)",
                lot.id,
                lot.technicians.len()
            ));
        }
        LotsCommand::Status { id, status } => {
            ctx.require(&[ROLE_ADMIN, ROLE_TECHNICIAN])?;
            let next = LotStatus::parse(&status.replace('-', "_"));
            if matches!(next, LotStatus::Other(_)) {
                anyhow::bail!("Unknown lot status '{}'", status);
            }
            let lot = expect_data(ctx.api.lots().get(&entity_id(&id)).await?)?;
            let updated = expect_data(ctx.api.lots().update_status(&lot, next).await?)?;
            ctx.print_success(&format!("Lot {} is now {}", updated.id, updated.status));
        }
    }
    Ok(())
}
