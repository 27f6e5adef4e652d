use anyhow::Result;

use fumigation_client::ROLE_ADMIN;

use crate::context::{expect_data, AppContext};
use crate::output;

pub async fn show(ctx: &AppContext) -> Result<()> {
    ctx.require(&[ROLE_ADMIN])?;
    let summary = expect_data(ctx.api.dashboard().summary().await?)?;
    ctx.print_header("Dashboard");
    output::summary(&summary);
    Ok(())
}
