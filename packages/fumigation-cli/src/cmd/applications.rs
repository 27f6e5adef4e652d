//! Fumigation application commands

use anyhow::Result;
use clap::Subcommand;

use fumigation_client::{
    filter_by_bucket, CreateApplication, NewLot, PageRequest, StatusBucket, ROLE_ADMIN,
    ROLE_CLIENT,
};

use super::{entity_id, split_pair};
use crate::context::{expect_data, AppContext};
use crate::output;

#[derive(Subcommand)]
pub enum ApplicationsCommand {
    /// List every application (admin)
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,

        #[arg(long, default_value_t = 20)]
        size: u32,

        /// Only show one bucket: pending, in-progress, finished
        #[arg(short, long)]
        bucket: Option<StatusBucket>,
    },

    /// List your own applications (client)
    Mine {
        #[arg(short, long)]
        bucket: Option<StatusBucket>,
    },

    /// Show one application
    Show { id: String },

    /// Approve an application (admin)
    Approve { id: String },

    /// Reject an application with a reason (admin)
    Reject {
        id: String,

        #[arg(short, long)]
        reason: String,
    },

    /// Request fumigation service (client)
    Create {
        #[arg(short, long)]
        location: String,

        /// Lot as CODE:TONS; repeat for several lots
        #[arg(long = "lot", required = true)]
        lots: Vec<String>,
    },
}

pub async fn run(ctx: &AppContext, cmd: ApplicationsCommand) -> Result<()> {
    match cmd {
        ApplicationsCommand::List { page, size, bucket } => {
            ctx.require(&[ROLE_ADMIN])?;
            let listing = expect_data(
                ctx.api
                    .applications()
                    .list(PageRequest::new(page, size))
                    .await?,
            )?;
            ctx.print_header(&format!(
                "Applications (page {}, {} total)",
                page + 1,
                listing.total()
            ));
            print_filtered(listing.items(), bucket);
            if listing.has_next() {
                ctx.print_info(&format!("More: --page {}", page + 1));
            }
        }
        ApplicationsCommand::Mine { bucket } => {
            ctx.require(&[ROLE_CLIENT])?;
            let mine = expect_data(ctx.api.applications().mine().await?)?;
            ctx.print_header("Your applications");
            print_filtered(&mine, bucket);
        }
        ApplicationsCommand::Show { id } => {
            ctx.require(&[ROLE_ADMIN, ROLE_CLIENT])?;
            let application = expect_data(ctx.api.applications().get(&entity_id(&id)).await?)?;
            output::application_detail(&application);
        }
        ApplicationsCommand::Approve { id } => {
            ctx.require(&[ROLE_ADMIN])?;
            let application =
                expect_data(ctx.api.applications().approve(&entity_id(&id)).await?)?;
            ctx.print_success(&format!("Application {} approved", application.id));
        }
        ApplicationsCommand::Reject { id, reason } => {
            ctx.require(&[ROLE_ADMIN])?;
            let application = expect_data(
                ctx.api
                    .applications()
                    .reject(&entity_id(&id), &reason)
                    .await?,
            )?;
            ctx.print_success(&format!("Application {} rejected", application.id));
        }
        ApplicationsCommand::Create { location, lots } => {
            ctx.require(&[ROLE_CLIENT])?;
            let lots = lots
                .iter()
                .map(|raw| parse_lot(raw))
                .collect::<Result<Vec<_>>>()?;
            let request = CreateApplication {
                company_id: None,
                location,
                lots,
            };
            let created = expect_data(ctx.api.applications().create(&request).await?)?;
            ctx.print_success(&format!("Application {} submitted", created.id));
        }
    }
    Ok(())
}

fn print_filtered(
    applications: &[fumigation_client::FumigationApplication],
    bucket: Option<StatusBucket>,
) {
    match bucket {
        Some(bucket) => filter_by_bucket(applications, bucket)
            .into_iter()
            .for_each(output::application_line),
        None => applications.iter().for_each(output::application_line),
    }
}

fn parse_lot(raw: &str) -> Result<NewLot> {
    let (code, tons) = split_pair(raw, "lot")?;
    Ok(NewLot {
        code: code.to_string(),
        tons: tons
            .parse()
            .map_err(|_| anyhow::anyhow!("Tons must be a number in '{}'", raw))?,
        scheduled_date: None,
    })
}
