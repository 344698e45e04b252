use crate::infra::{build_service, parse_publish_policy, ApiService};
use application_manager::error::AppError;
use application_manager::lifecycle::{
    Application, ApplicationId, LifecycleConfig, NewApplication, PublishPolicy,
};
use clap::Args;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Name of the sample application
    #[arg(long, default_value = "Community garden proposal")]
    pub(crate) name: String,
    /// Initial content of the sample application
    #[arg(long, default_value = "Convert the empty lot on Elm Street into shared plots.")]
    pub(crate) content: String,
    /// Content submitted as a revision while the record is still editable
    #[arg(long)]
    pub(crate) revised_content: Option<String>,
    /// Reject the application after verification instead of accepting and publishing it
    #[arg(long)]
    pub(crate) reject_reason: Option<String>,
    /// How a second publish behaves: `idempotent` or `reject`
    #[arg(long, value_parser = parse_publish_policy, default_value = "idempotent")]
    pub(crate) republish_policy: PublishPolicy,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = LifecycleConfig {
        publish_policy: args.republish_policy,
    };
    let (service, _, _) = build_service(&config);

    println!("Application lifecycle demo");
    println!("Republish policy: {}", config.publish_policy);

    let record = service.create(NewApplication::new(&args.name, &args.content))?;
    print_step("Created", &record);

    if let Some(revision) = args.revised_content.as_deref() {
        let record = service.update_content(record.id, revision)?;
        print_step("Content updated", &record);
    }

    let verified = service.verify(record.id)?;
    print_step("Verified", &verified);

    match args.reject_reason.as_deref() {
        Some(reason) => {
            let rejected = service.reject(record.id, reason)?;
            print_step("Rejected", &rejected);
        }
        None => {
            let accepted = service.accept(record.id)?;
            print_step("Accepted", &accepted);
            let published = service.publish(record.id)?;
            print_step("Published", &published);

            match service.publish(record.id) {
                Ok(again) => print_step("Republished (no change)", &again),
                Err(err) => println!("  Republish refused: {}", err),
            }
        }
    }

    print_history(&service, record.id)?;

    let stored = service.get(record.id)?;
    match serde_json::to_string_pretty(&stored.view()) {
        Ok(json) => println!("\nPublic payload:\n{}", json),
        Err(err) => println!("\nPublic payload unavailable: {}", err),
    }

    Ok(())
}

fn print_step(label: &str, record: &Application) {
    match record.published_number {
        Some(number) => println!(
            "  {:<24} #{} status={} published_number={}",
            label, record.id, record.status, number
        ),
        None => println!("  {:<24} #{} status={}", label, record.id, record.status),
    }
}

fn print_history(service: &ApiService, id: ApplicationId) -> Result<(), AppError> {
    println!("\nAudit trail");
    for entry in service.history(id)? {
        let marker = if entry.content_updated {
            " (content edit)"
        } else {
            ""
        };
        println!(
            "  {} {}{}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.status,
            marker
        );
    }
    Ok(())
}
