use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

mod activity;
mod benefits;
mod config;
mod dates;
mod distribution;
mod loader;
mod models;
mod period;
mod replay;
mod report;
mod series;
mod trend;

use benefits::BenefitRules;
use config::AnalyticsConfig;
use loader::Dataset;
use period::TimePeriod;
use report::MetricSeries;
use series::Metric;

#[derive(Parser)]
#[command(name = "eventmanager-stats")]
#[command(about = "Volunteer activity and benefit statistics over time", long_about = None)]
struct Cli {
    /// Volunteers CSV export
    #[arg(long, default_value = "volunteers.csv")]
    volunteers: PathBuf,
    /// Jobs (shifts) CSV export
    #[arg(long, default_value = "jobs.csv")]
    jobs: PathBuf,
    /// Job-type rules (JSON); falls back to EVENTMANAGER_STATS_CONFIG
    #[arg(long)]
    config: Option<PathBuf>,
    /// Evaluate as of this instant instead of the system clock
    #[arg(long)]
    now: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum MetricArg {
    ActiveVolunteers,
    FreeDrinks,
    GuestList,
    Invites,
    TotalGuestList,
    TotalShifts,
    VenueShifts,
}

#[derive(Subcommand)]
enum Commands {
    /// Export one series and its trend line as CSV
    Series {
        #[arg(long, value_enum)]
        metric: MetricArg,
        /// Venue for venue-shifts
        #[arg(long)]
        venue: Option<String>,
        #[arg(long, value_enum, default_value_t = TimePeriod::OneMonth)]
        period: TimePeriod,
        /// Defaults to stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a markdown report of every series
    Report {
        #[arg(long, value_enum, default_value_t = TimePeriod::OneMonth)]
        period: TimePeriod,
        #[arg(long, default_value = "stats-report.md")]
        out: PathBuf,
    },
    /// Show each volunteer's current benefits
    Benefits,
    /// List inactive volunteers and cleanup candidates
    Cleanup,
    /// Show gender and age distributions
    Distribution,
}

fn to_metric(metric: MetricArg, venue: Option<String>) -> anyhow::Result<Metric> {
    Ok(match metric {
        MetricArg::ActiveVolunteers => Metric::ActiveVolunteers,
        MetricArg::FreeDrinks => Metric::FreeDrinks,
        MetricArg::GuestList => Metric::GuestListVolunteers,
        MetricArg::Invites => Metric::VolunteerInvites,
        MetricArg::TotalGuestList => Metric::TotalGuestList,
        MetricArg::TotalShifts => Metric::TotalShifts,
        MetricArg::VenueShifts => {
            Metric::VenueShifts(venue.context("--venue is required for venue-shifts")?)
        }
    })
}

/// Builds a series on the blocking pool; long windows can take a while.
async fn build_in_background(
    dataset: Arc<Dataset>,
    rules: Arc<BenefitRules>,
    period: TimePeriod,
    metric: Metric,
    now: i64,
) -> anyhow::Result<MetricSeries> {
    let title = metric.title();
    tokio::task::spawn_blocking(move || {
        let points =
            series::build_series(&dataset.volunteers, &dataset.jobs, period, &metric, &rules, now);
        MetricSeries::new(metric, points)
    })
    .await
    .with_context(|| format!("failed to build {title}"))
}

fn venues(dataset: &Dataset) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for job in &dataset.jobs {
        if !names.iter().any(|name| name.eq_ignore_ascii_case(&job.venue_name)) {
            names.push(job.venue_name.clone());
        }
    }
    names.sort();
    names
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = AnalyticsConfig::resolve(cli.config.as_deref())?;
    let rules = Arc::new(config.rules());
    let now = match cli.now.as_deref() {
        Some(raw) => dates::parse_timestamp(raw, &rules.tz)
            .with_context(|| format!("invalid --now value {raw:?}"))?,
        None => dates::now_millis(),
    };
    let dataset = Arc::new(Dataset::load(&cli.volunteers, &cli.jobs, &rules.tz)?);

    match cli.command {
        Commands::Series {
            metric,
            venue,
            period,
            out,
        } => {
            let metric = to_metric(metric, venue)?;
            let built = build_in_background(dataset, rules, period, metric, now).await?;

            if built.points.is_empty() {
                log::warn!(
                    "No data for {} over {}",
                    built.metric.title(),
                    period.display_name()
                );
            }

            match out {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    report::write_series_csv(file, &built)?;
                    println!("Series written to {}.", path.display());
                }
                None => report::write_series_csv(std::io::stdout().lock(), &built)?,
            }
        }
        Commands::Report { period, out } => {
            let mut metrics = vec![
                Metric::ActiveVolunteers,
                Metric::FreeDrinks,
                Metric::GuestListVolunteers,
                Metric::VolunteerInvites,
                Metric::TotalGuestList,
                Metric::TotalShifts,
            ];
            metrics.extend(venues(&dataset).into_iter().map(Metric::VenueShifts));
            log::info!("Building {} series over {}", metrics.len(), period.display_name());

            let handles: Vec<_> = metrics
                .into_iter()
                .map(|metric| {
                    tokio::spawn(build_in_background(
                        Arc::clone(&dataset),
                        Arc::clone(&rules),
                        period,
                        metric,
                        now,
                    ))
                })
                .collect();

            let mut built = Vec::with_capacity(handles.len());
            for handle in handles {
                built.push(handle.await.context("report task failed")??);
            }

            let report = report::build_report(period, now, &rules.tz, &built);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Benefits => {
            let history = replay::History::new(&dataset.jobs);
            println!("Benefits as of {}:", dates::format_timestamp(now, &rules.tz));
            for volunteer in &dataset.volunteers {
                let status = replay::status_as_of(volunteer.id, &history, &rules, now);
                let rank = status
                    .rank
                    .map_or_else(|| "no rank".to_string(), |rank| format!("{rank:?}"));
                println!(
                    "- #{} {} {} ({}): {} ({} shifts this month)",
                    status.volunteer_id,
                    volunteer.name,
                    volunteer.last_name_abbreviation,
                    rank,
                    status.benefits.description,
                    status.monthly_shifts
                );

                let stacked: Vec<String> = status
                    .active_benefits
                    .iter()
                    .filter_map(|benefit| benefit.rank)
                    .map(|rank| format!("{rank:?}"))
                    .collect();
                if stacked.len() > 1 {
                    println!("    stacked ranks: {}", stacked.join(", "));
                }

                let eligible: Vec<&str> = [
                    (status.is_eligible_for_galaxie, "Galaxie"),
                    (status.is_eligible_for_etoile, "Etoile"),
                    (status.is_eligible_for_nova, "Nova"),
                ]
                .into_iter()
                .filter_map(|(eligible, name)| eligible.then_some(name))
                .collect();
                let last_shift = status.last_job_date.map_or_else(
                    || "never".to_string(),
                    |date| dates::format_timestamp(date, &rules.tz),
                );
                let eligible = if eligible.is_empty() {
                    "none".to_string()
                } else {
                    eligible.join(", ")
                };
                println!("    last shift: {last_shift}; eligible this month: {eligible}");
            }
            let drinks = replay::total_free_drinks(&dataset.volunteers, &history, &rules, now);
            println!("Free drinks available: {drinks}");
        }
        Commands::Cleanup => {
            let history = replay::History::new(&dataset.jobs);
            let volunteers = activity::refresh_from_jobs(&dataset.volunteers, &history, now);

            let inactive: Vec<_> = volunteers.iter().filter(|v| !v.is_active).collect();
            println!("{} of {} volunteers inactive:", inactive.len(), volunteers.len());
            for volunteer in inactive {
                println!(
                    "- {} {}: {}",
                    volunteer.name,
                    volunteer.last_name_abbreviation,
                    activity::activity_status_text(volunteer.last_shift_date, now)
                );
            }

            let candidates = activity::cleanup_candidates(&volunteers, now);
            if candidates.is_empty() {
                println!("No volunteers due for cleanup.");
            } else {
                println!("Due for cleanup (no shift in 4+ years):");
                for volunteer in candidates {
                    println!("- {} ({})", volunteer.name, volunteer.email);
                }
            }
        }
        Commands::Distribution => {
            let total = dataset.volunteers.len();
            if total == 0 {
                println!("No volunteers loaded.");
                return Ok(());
            }

            println!("Gender ({total} volunteers):");
            for segment in distribution::gender_distribution(&dataset.volunteers) {
                println!(
                    "- {}: {} ({:.1}%)",
                    distribution::gender_label(segment.key),
                    segment.count,
                    segment.percentage
                );
            }

            let today = dates::local_date(now, &rules.tz);
            println!("Age:");
            for segment in distribution::age_distribution(&dataset.volunteers, today) {
                println!(
                    "- {}: {} ({:.1}%)",
                    segment.key.label(),
                    segment.count,
                    segment.percentage
                );
            }
        }
    }

    Ok(())
}
