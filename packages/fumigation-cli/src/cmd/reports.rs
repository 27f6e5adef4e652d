//! Report and signature commands

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Args, Subcommand};
use std::path::PathBuf;

use fumigation_client::{
    ApiResponse, FailureKind, FormMode, ReportForm, Signature, SignatureKind, Supply, User,
    ROLE_ADMIN, ROLE_CLIENT, ROLE_TECHNICIAN,
};

use super::entity_id;
use crate::context::{expect_data, AppContext};
use crate::output;

#[derive(Subcommand)]
pub enum ReportsCommand {
    /// File a fumigation report for a lot
    Fumigation(FumigationArgs),

    /// File a cleanup report for a lot
    Cleanup(CleanupArgs),

    /// Show the reports and signatures of a lot
    Show { lot: String },
}

#[derive(Args)]
pub struct CommonArgs {
    #[arg(long)]
    lot: String,

    /// Report date (YYYY-MM-DD); today when omitted
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Start time (HH:MM)
    #[arg(long, value_parser = parse_time)]
    start: NaiveTime,

    /// End time (HH:MM)
    #[arg(long, value_parser = parse_time)]
    end: NaiveTime,

    /// Supply used, as NAME:QUANTITY:UNIT; repeat for several
    #[arg(long = "supply")]
    supplies: Vec<String>,

    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args)]
pub struct FumigationArgs {
    #[command(flatten)]
    common: CommonArgs,

    #[arg(long)]
    location: String,

    /// Degrees Celsius
    #[arg(long)]
    temperature: Option<f64>,

    /// Relative humidity, percent
    #[arg(long)]
    humidity: Option<f64>,
}

#[derive(Args)]
pub struct CleanupArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// The tarps were removed
    #[arg(long)]
    tarps_removed: bool,
}

#[derive(Args)]
pub struct SignArgs {
    /// Report id
    report: String,

    /// technician, client or supervisor
    #[arg(short, long, value_parser = parse_kind)]
    kind: SignatureKind,

    /// Name of the person signing
    #[arg(short, long)]
    signer: String,

    /// PNG file with the signature
    #[arg(short, long)]
    image: PathBuf,
}

pub async fn run(ctx: &AppContext, cmd: ReportsCommand) -> Result<()> {
    match cmd {
        ReportsCommand::Fumigation(args) => {
            let user = ctx.require(&[ROLE_ADMIN, ROLE_TECHNICIAN])?;
            let mut form = form_for(&user, &args.common)?;
            form.location = args.location;
            form.temperature = args.temperature;
            form.humidity = args.humidity;

            let report = form.into_fumigation()?;
            let saved = expect_data(ctx.api.reports().submit_fumigation(&report).await?)?;
            ctx.print_success("Fumigation report filed");
            output::fumigation_report(&saved);
        }
        ReportsCommand::Cleanup(args) => {
            let user = ctx.require(&[ROLE_ADMIN, ROLE_TECHNICIAN])?;
            let mut form = form_for(&user, &args.common)?;
            form.tarps_removed = args.tarps_removed;

            let report = form.into_cleanup()?;
            let saved = expect_data(ctx.api.reports().submit_cleanup(&report).await?)?;
            ctx.print_success("Cleanup report filed");
            output::cleanup_report(&saved);
        }
        ReportsCommand::Show { lot } => {
            ctx.require(&[])?;
            show(ctx, &lot).await?;
        }
    }
    Ok(())
}

pub async fn sign(ctx: &AppContext, args: SignArgs) -> Result<()> {
    ctx.require(&[ROLE_ADMIN, ROLE_TECHNICIAN, ROLE_CLIENT])?;
    let png = std::fs::read(&args.image)
        .with_context(|| format!("Failed to read {}", args.image.display()))?;

    let signature = Signature::from_png(entity_id(&args.report), args.kind, args.signer, &png);
    let saved = expect_data(ctx.api.reports().sign(&signature).await?)?;
    ctx.print_success("Signature attached");
    output::signature_line(&saved);
    Ok(())
}

async fn show(ctx: &AppContext, lot: &str) -> Result<()> {
    let lot_id = entity_id(lot);
    let reports = ctx.api.reports();

    let mut report_ids = Vec::new();
    if let Some(report) = optional(reports.fumigation_for_lot(&lot_id).await?)? {
        output::fumigation_report(&report);
        report_ids.extend(report.id);
    } else {
        ctx.print_info("No fumigation report yet");
    }
    if let Some(report) = optional(reports.cleanup_for_lot(&lot_id).await?)? {
        output::cleanup_report(&report);
        report_ids.extend(report.id);
    } else {
        ctx.print_info("No cleanup report yet");
    }

    for id in report_ids {
        let signatures = expect_data(reports.signatures(&id).await?)?;
        ctx.print_header(&format!("Signatures on report {}", id));
        signatures.iter().for_each(output::signature_line);
    }
    Ok(())
}

/// A 404 means "not filed yet".
fn optional<T>(response: ApiResponse<T>) -> Result<Option<T>> {
    match response {
        ApiResponse::Failure(failure)
            if failure.kind == FailureKind::Server && failure.status == Some(404) =>
        {
            Ok(None)
        }
        other => expect_data(other).map(Some),
    }
}

fn form_for(user: &User, args: &CommonArgs) -> Result<ReportForm> {
    let mode = if user.has_role(&[ROLE_ADMIN]) {
        FormMode::Admin
    } else {
        FormMode::Technician
    };

    let mut form = ReportForm::new(mode);
    form.lot_id = Some(entity_id(&args.lot));
    form.date = Some(args.date.unwrap_or_else(|| Local::now().date_naive()));
    form.start_time = Some(args.start);
    form.end_time = Some(args.end);
    form.observations = args.notes.clone();
    form.supplies = args
        .supplies
        .iter()
        .map(|raw| parse_supply(raw))
        .collect::<Result<_>>()?;
    Ok(form)
}

fn parse_supply(raw: &str) -> Result<Supply> {
    let mut parts = raw.splitn(3, ':').map(str::trim);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(quantity), Some(unit)) => Ok(Supply {
            name: name.to_string(),
            quantity: quantity
                .parse()
                .with_context(|| format!("Quantity must be a number in '{}'", raw))?,
            unit: unit.to_string(),
            dosage: None,
        }),
        _ => bail!("Expected supply as NAME:QUANTITY:UNIT, got '{}'", raw),
    }
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| format!("expected HH:MM, got '{}'", raw))
}

fn parse_kind(raw: &str) -> Result<SignatureKind, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "technician" | "tecnico" => Ok(SignatureKind::Technician),
        "client" | "cliente" => Ok(SignatureKind::Client),
        "supervisor" => Ok(SignatureKind::Supervisor),
        other => Err(format!("unknown signature kind '{}'", other)),
    }
}
