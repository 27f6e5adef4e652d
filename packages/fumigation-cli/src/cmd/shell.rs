//! Interactive menu

use anyhow::Result;
use colored::Colorize;
use console::Term;
use dialoguer::{Confirm, Input, Password, Select};

use fumigation_client::{
    FumigationApplication, LotStatus, PageRequest, RoleKind, Route, StatusBucket, ROLE_ADMIN,
    ROLE_TECHNICIAN,
};

use super::{applications, auth, dashboard, lots, users};
use crate::context::{expect_data, AppContext};
use crate::output;

#[derive(Clone, Copy)]
enum Action {
    Dashboard,
    ReviewApplications,
    AllLots,
    Users,
    AssignedLots,
    AdvanceLot,
    MyApplications,
    WhoAmI,
    SignOut,
    Exit,
}

impl Action {
    fn label(&self) -> &'static str {
        match self {
            Action::Dashboard => "📊 Dashboard",
            Action::ReviewApplications => "📝 Review pending applications",
            Action::AllLots => "📦 All lots",
            Action::Users => "👥 Users",
            Action::AssignedLots => "📦 My lots",
            Action::AdvanceLot => "⏩ Update lot status",
            Action::MyApplications => "📝 My applications",
            Action::WhoAmI => "🙋 Who am I",
            Action::SignOut => "🔒 Sign out",
            Action::Exit => "🛑 Exit",
        }
    }
}

pub async fn run(ctx: &AppContext) -> Result<()> {
    let term = Term::stdout();
    print_banner(&term)?;

    loop {
        println!();
        if !ctx.session.is_authenticated() {
            if !sign_in(ctx, &term).await? {
                break;
            }
            continue;
        }

        let actions = menu(ctx);
        let labels: Vec<&str> = actions.iter().map(Action::label).collect();
        let selection = Select::with_theme(&ctx.theme())
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact_on(&term)?;

        let result = match actions[selection] {
            Action::Dashboard => dashboard::show(ctx).await,
            Action::ReviewApplications => review_applications(ctx, &term).await,
            Action::AllLots => {
                lots::run(
                    ctx,
                    lots::LotsCommand::List {
                        page: 0,
                        size: 50,
                    },
                )
                .await
            }
            Action::Users => {
                users::run(
                    ctx,
                    users::UsersCommand::List {
                        role: None,
                        page: 0,
                        size: 50,
                    },
                )
                .await
            }
            Action::AssignedLots => lots::run(ctx, lots::LotsCommand::Assigned).await,
            Action::AdvanceLot => advance_lot(ctx, &term).await,
            Action::MyApplications => {
                applications::run(ctx, applications::ApplicationsCommand::Mine { bucket: None })
                    .await
            }
            Action::WhoAmI => auth::whoami(ctx),
            Action::SignOut => auth::logout(ctx),
            Action::Exit => {
                println!("{}", "👋 Goodbye!".bright_blue());
                break;
            }
        };

        if let Err(e) = result {
            println!("{} {:#}", "✗".bright_red(), e);
        }
    }

    Ok(())
}

fn print_banner(term: &Term) -> Result<()> {
    term.clear_screen()?;
    println!(
        "{}",
        "╔════════════════════════════════════════╗".bright_cyan()
    );
    println!(
        "{}",
        "║        Fumigation Service Client       ║".bright_cyan()
    );
    println!(
        "{}",
        "╚════════════════════════════════════════╝".bright_cyan()
    );
    println!();
    Ok(())
}

/// Menu for the signed-in user, led by their landing screen.
fn menu(ctx: &AppContext) -> Vec<Action> {
    let mut actions = Vec::new();
    let user = ctx.session.user();
    let holds = |kind: RoleKind| user.as_ref().is_some_and(|u| u.has_kind(kind));

    match ctx.session.landing_route() {
        Route::AdminDashboard => actions.push(Action::Dashboard),
        Route::TechnicianLots => actions.push(Action::AssignedLots),
        Route::ClientApplications => actions.push(Action::MyApplications),
        Route::Login => {}
    }

    if holds(RoleKind::Admin) {
        actions.extend([Action::ReviewApplications, Action::AllLots, Action::Users]);
    }
    if holds(RoleKind::Technician) {
        if !actions.iter().any(|a| matches!(a, Action::AssignedLots)) {
            actions.push(Action::AssignedLots);
        }
        actions.push(Action::AdvanceLot);
    }
    if holds(RoleKind::Client) && !actions.iter().any(|a| matches!(a, Action::MyApplications)) {
        actions.push(Action::MyApplications);
    }

    actions.extend([Action::WhoAmI, Action::SignOut, Action::Exit]);
    actions
}

/// Returns false when the user chose to leave.
async fn sign_in(ctx: &AppContext, term: &Term) -> Result<bool> {
    println!("{}", "Not signed in".yellow());
    let choice = Select::with_theme(&ctx.theme())
        .items(&["🔑 Sign in", "🛑 Exit"])
        .default(0)
        .interact_on(term)?;
    if choice == 1 {
        return Ok(false);
    }

    let email: String = Input::with_theme(&ctx.theme())
        .with_prompt("Email")
        .interact_text()?;
    let password = Password::with_theme(&ctx.theme())
        .with_prompt("Password")
        .interact()?;
    let remember = Confirm::with_theme(&ctx.theme())
        .with_prompt("Remember me on this machine?")
        .default(false)
        .interact()?;

    match ctx.session.sign_in(&email, &password, remember).await {
        Ok(response) => match expect_data(response) {
            Ok(user) => println!(
                "{} {}",
                "✅ Welcome,".bright_green(),
                user.full_name().bold()
            ),
            Err(e) => println!("{} {}", "❌".bright_red(), e),
        },
        Err(e) => println!("{} {:#}", "❌".bright_red(), e),
    }
    Ok(true)
}

async fn review_applications(ctx: &AppContext, term: &Term) -> Result<()> {
    ctx.require(&[ROLE_ADMIN])?;
    let listing = expect_data(
        ctx.api
            .applications()
            .list(PageRequest::new(0, 100))
            .await?,
    )?;
    let pending: Vec<&FumigationApplication> = listing
        .items()
        .iter()
        .filter(|a| a.bucket() == StatusBucket::Pending)
        .collect();
    if pending.is_empty() {
        ctx.print_info("No applications waiting for review");
        return Ok(());
    }

    let labels: Vec<String> = pending
        .iter()
        .map(|a| {
            format!(
                "#{} {} ({})",
                a.id,
                a.company_name.as_deref().unwrap_or("-"),
                a.location.as_deref().unwrap_or("-")
            )
        })
        .collect();
    let picked = Select::with_theme(&ctx.theme())
        .with_prompt("Application")
        .items(&labels)
        .default(0)
        .interact_on(term)?;
    let application = pending[picked];
    output::application_detail(application);

    let decision = Select::with_theme(&ctx.theme())
        .items(&["✅ Approve", "❌ Reject", "↩ Back"])
        .default(0)
        .interact_on(term)?;
    match decision {
        0 => {
            expect_data(ctx.api.applications().approve(&application.id).await?)?;
            ctx.print_success("Approved");
        }
        1 => {
            let reason: String = Input::with_theme(&ctx.theme())
                .with_prompt("Reason")
                .interact_text()?;
            expect_data(
                ctx.api
                    .applications()
                    .reject(&application.id, &reason)
                    .await?,
            )?;
            ctx.print_success("Rejected");
        }
        _ => {}
    }
    Ok(())
}

async fn advance_lot(ctx: &AppContext, term: &Term) -> Result<()> {
    ctx.require(&[ROLE_TECHNICIAN])?;
    let lots = expect_data(ctx.api.lots().assigned().await?)?;
    let open: Vec<_> = lots
        .iter()
        .filter(|lot| lot.status != LotStatus::Completed)
        .collect();
    if open.is_empty() {
        ctx.print_info("No open lots");
        return Ok(());
    }

    let labels: Vec<String> = open
        .iter()
        .map(|lot| {
            format!(
                "#{} {} [{}]",
                lot.id,
                lot.code.as_deref().unwrap_or("-"),
                lot.status
            )
        })
        .collect();
    let picked = Select::with_theme(&ctx.theme())
        .with_prompt("Lot")
        .items(&labels)
        .default(0)
        .interact_on(term)?;
    let lot = open[picked];

    let next: Vec<LotStatus> = [LotStatus::InService, LotStatus::Completed]
        .into_iter()
        .filter(|status| lot.status.can_transition_to(status))
        .collect();
    if next.is_empty() {
        ctx.print_warning(&format!("Lot {} has status {} and cannot be moved", lot.id, lot.status));
        return Ok(());
    }
    let next_labels: Vec<String> = next.iter().map(ToString::to_string).collect();
    let choice = Select::with_theme(&ctx.theme())
        .with_prompt("New status")
        .items(&next_labels)
        .default(0)
        .interact_on(term)?;

    let updated = expect_data(ctx.api.lots().update_status(lot, next[choice].clone()).await?)?;
    ctx.print_success(&format!("Lot {} is now {}", updated.id, updated.status));
    Ok(())
}
