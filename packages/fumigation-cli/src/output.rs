//! Plain-text rendering of domain objects.

use colored::Colorize;
use console::style;

use fumigation_client::{
    CleanupReport, DashboardSummary, FumigationApplication, FumigationReport, Lot, Signature,
    StatusBucket, User,
};

pub fn bucket_label(bucket: StatusBucket) -> String {
    match bucket {
        StatusBucket::Pending => bucket.label().yellow().to_string(),
        StatusBucket::InProgress => bucket.label().cyan().to_string(),
        StatusBucket::Finished => bucket.label().green().to_string(),
    }
}

pub fn user_line(user: &User) {
    let id = user.id.as_ref().map(ToString::to_string).unwrap_or_default();
    let roles: Vec<&str> = user.roles.iter().map(|r| r.name.as_str()).collect();
    println!(
        "{:<6} {:<28} {:<24} {}",
        id,
        user.email,
        user.full_name(),
        style(roles.join(", ")).dim()
    );
}

pub fn application_line(application: &FumigationApplication) {
    println!(
        "{:<6} {:<12} {:<24} {:<20} {} lot(s)",
        application.id,
        bucket_label(application.bucket()),
        application.company_name.as_deref().unwrap_or("-"),
        application.location.as_deref().unwrap_or("-"),
        application.lots.len()
    );
}

pub fn application_detail(application: &FumigationApplication) {
    println!("{:<12} {}", "Id:", application.id);
    println!("{:<12} {}", "Status:", application.status);
    println!("{:<12} {}", "Bucket:", bucket_label(application.bucket()));
    if let Some(company) = &application.company_name {
        println!("{:<12} {}", "Company:", company);
    }
    if let Some(location) = &application.location {
        println!("{:<12} {}", "Location:", location);
    }
    if let Some(reason) = &application.rejection_reason {
        println!("{:<12} {}", "Rejected:", reason.red());
    }
    if !application.lots.is_empty() {
        println!("{}", style("Lots").bold());
        for lot in &application.lots {
            print!("  ");
            lot_line(lot);
        }
    }
}

pub fn lot_line(lot: &Lot) {
    let technicians: Vec<String> = lot.technicians.iter().map(User::full_name).collect();
    println!(
        "{:<6} {:<10} {:<12} {:>8} t  {}",
        lot.id,
        lot.code.as_deref().unwrap_or("-"),
        lot.status.to_string(),
        lot.tons.map(|t| format!("{:.1}", t)).unwrap_or_else(|| "-".into()),
        style(technicians.join(", ")).dim()
    );
}

pub fn fumigation_report(report: &FumigationReport) {
    println!("{}", style("Fumigation report").bold());
    println!("{:<14} {}", "Lot:", report.lot_id);
    println!(
        "{:<14} {} {}-{}",
        "When:", report.date, report.start_time, report.end_time
    );
    println!("{:<14} {}", "Location:", report.location);
    if let Some(t) = report.temperature {
        println!("{:<14} {:.1} °C", "Temperature:", t);
    }
    if let Some(h) = report.humidity {
        println!("{:<14} {:.0} %", "Humidity:", h);
    }
    for supply in &report.supplies {
        println!("  - {} {} {}", supply.name, supply.quantity, supply.unit);
    }
    if let Some(notes) = &report.observations {
        println!("{:<14} {}", "Notes:", notes);
    }
}

pub fn cleanup_report(report: &CleanupReport) {
    println!("{}", style("Cleanup report").bold());
    println!("{:<14} {}", "Lot:", report.lot_id);
    println!(
        "{:<14} {} {}-{}",
        "When:", report.date, report.start_time, report.end_time
    );
    println!(
        "{:<14} {}",
        "Tarps removed:",
        if report.tarps_removed { "yes" } else { "no" }
    );
    for supply in &report.supplies {
        println!("  - {} {} {}", supply.name, supply.quantity, supply.unit);
    }
    if let Some(notes) = &report.observations {
        println!("{:<14} {}", "Notes:", notes);
    }
}

pub fn signature_line(signature: &Signature) {
    println!(
        "{:?}: {} ({} bytes)",
        signature.kind,
        signature.signer_name,
        signature.png_bytes().map(|b| b.len()).unwrap_or(0)
    );
}

pub fn summary(summary: &DashboardSummary) {
    println!("{}", style("Applications").bold());
    for bucket in StatusBucket::ALL {
        println!("  {:<22} {}", bucket_label(bucket), summary.applications.get(bucket));
    }
    println!("{}", style("Lots").bold());
    for (status, count) in &summary.lots_by_status {
        println!("  {:<12} {}", status, count);
    }
    println!("{}", style("Users").bold());
    for (role, count) in &summary.users_by_role {
        println!("  {:<18} {}", role, count);
    }
}
