//! `hbind` - CLI for healthbinder
//!
//! This binary provides the command-line interface for the local health
//! journal: check-ins, medications, workouts, vitals, insights and reminders.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::Path;
use std::time::Duration;

use chrono::Local;
use clap::Parser;

use healthbinder::cli::{
    ChartCommand, CheckinCommand, Cli, Command, ConfigCommand, ExportFormat, FilesCommand,
    InsightsCommand, MedCommand, MetricCommand, OutputFormat, RemindCommand, VaultCommand,
    WorkoutCommand,
};
use healthbinder::record::{today, CheckIn, Medication, Metric, Workout};
use healthbinder::{attachments, chart, export, insights, reminder, vault};
use healthbinder::{init_logging, Config, Storage};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        // Configuration commands never touch the journal
        Command::Config(cmd) => handle_config(&config, cmd),
        command => {
            let storage = Storage::open(config.database_path())?;
            if command.requires_unlock() {
                vault::ensure_unlocked(&storage, cli.pin.as_deref())?;
            }
            dispatch(&storage, &config, command, cli.pin.as_deref())
        }
    }
}

fn dispatch(
    storage: &Storage,
    config: &Config,
    command: Command,
    pin: Option<&str>,
) -> anyhow::Result<()> {
    match command {
        Command::Checkin(cmd) => handle_checkin(storage, cmd),
        Command::Med(cmd) => handle_med(storage, cmd),
        Command::Workout(cmd) => handle_workout(storage, cmd),
        Command::Metric(cmd) => handle_metric(storage, cmd),
        Command::Insights(cmd) => handle_insights(storage, config, &cmd),
        Command::Chart(cmd) => handle_chart(storage, &cmd),
        Command::Status(cmd) => handle_status(storage, config, cmd.json),
        Command::Vault(cmd) => handle_vault(storage, cmd, pin),
        Command::Files(cmd) => handle_files(storage, cmd),
        Command::Remind(cmd) => handle_remind(storage, config, cmd),
        Command::Prune(cmd) => handle_prune(storage, config, cmd.yes),
        Command::Config(_) => unreachable!("handled before opening storage"),
    }
}

fn handle_checkin(storage: &Storage, cmd: CheckinCommand) -> anyhow::Result<()> {
    match cmd {
        CheckinCommand::Add {
            energy,
            exercise,
            symptoms,
            notes,
        } => {
            let checkin = CheckIn::new(energy, exercise, symptoms, notes)?;
            storage.insert_checkin(&checkin)?;
            println!("Check-in recorded (energy {energy}/10).");
        }
        CheckinCommand::List { limit, format } => {
            let checkins = storage.checkins(limit)?;
            print_checkins(&checkins, format)?;
        }
        CheckinCommand::Export { format, output } => {
            let count = match format {
                ExportFormat::Csv => export::export_checkins_csv(storage, &output)?,
                ExportFormat::Json => export::export_checkins_json(storage, &output)?,
            };
            println!("Exported {count} check-ins to {}.", output.display());
        }
        CheckinCommand::Import { file } => {
            let count = export::import_checkins_json(storage, &file)?;
            println!("Imported {count} check-ins (previous history replaced).");
        }
    }
    Ok(())
}

fn print_checkins(checkins: &[CheckIn], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(checkins)?),
        OutputFormat::Table => {
            println!("{:<17} {:>6}  {:<8} {:<20} {}", "When", "Energy", "Exercise", "Symptoms", "Notes");
            for c in checkins {
                println!(
                    "{:<17} {:>6}  {:<8} {:<20} {}",
                    format_when(&c.timestamp),
                    format!("{}/10", c.energy),
                    if c.exercise { "yes" } else { "no" },
                    c.symptoms.as_deref().unwrap_or("-"),
                    c.notes.as_deref().unwrap_or("-"),
                );
            }
        }
        OutputFormat::Plain => {
            for c in checkins {
                let mut line = format!("{}  energy {}/10", format_when(&c.timestamp), c.energy);
                if c.exercise {
                    line.push_str(", exercised");
                }
                if let Some(symptoms) = &c.symptoms {
                    line.push_str(&format!(", symptoms: {symptoms}"));
                }
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn handle_med(storage: &Storage, cmd: MedCommand) -> anyhow::Result<()> {
    match cmd {
        MedCommand::Add { name, dose } => {
            let med = Medication::new(name, dose)?;
            let id = storage.add_medication(&med)?;
            println!("Added medication #{id}: {}.", med.name);
        }
        MedCommand::List => {
            for med in storage.medications()? {
                println!(
                    "#{:<4} {}{}",
                    med.id.unwrap_or_default(),
                    med.name,
                    med.dose.as_deref().map(|d| format!(" ({d})")).unwrap_or_default(),
                );
            }
        }
        MedCommand::Remove { id } => {
            if storage.remove_medication(id)? {
                println!("Removed medication #{id}.");
            } else {
                println!("No medication with id {id}.");
            }
        }
        MedCommand::Tick { id } => {
            storage.set_taken(today(), id, true)?;
            println!("Marked #{id} taken for today.");
        }
        MedCommand::Untick { id } => {
            storage.set_taken(today(), id, false)?;
            println!("Unmarked #{id} for today.");
        }
        MedCommand::Status => {
            let meds = storage.medications()?;
            let taken = storage.taken_on(today())?;
            for med in &meds {
                let ticked = med.id.is_some_and(|id| taken.contains(&id));
                println!(
                    "[{}] {}{}",
                    if ticked { "x" } else { " " },
                    med.name,
                    med.dose.as_deref().map(|d| format!(" ({d})")).unwrap_or_default(),
                );
            }
            println!("Adherence today: {}", insights::adherence(storage)?);
        }
    }
    Ok(())
}

fn handle_workout(storage: &Storage, cmd: WorkoutCommand) -> anyhow::Result<()> {
    match cmd {
        WorkoutCommand::Add {
            betterme,
            strength,
            mobility,
            cardio,
            steps,
            calories,
            notes,
        } => {
            let workout = Workout::new(betterme, strength, mobility, cardio, steps, calories, notes);
            storage.insert_workout(&workout)?;
            println!("Workout recorded.");
        }
        WorkoutCommand::List { limit, format } => {
            let workouts = storage.workouts(limit)?;
            print_workouts(&workouts, format)?;
        }
        WorkoutCommand::Clear { yes } => {
            if yes {
                let removed = storage.clear_workouts()?;
                println!("Deleted {removed} workouts.");
            } else {
                println!("This will delete all workouts. Use --yes to confirm.");
            }
        }
        WorkoutCommand::Export { output } => {
            let count = export::export_workouts_csv(storage, &output)?;
            println!("Exported {count} workouts to {}.", output.display());
        }
        WorkoutCommand::Import { file } => {
            let count = export::import_workouts_json(storage, &file)?;
            println!("Imported {count} workouts (previous history replaced).");
        }
        WorkoutCommand::Streak => {
            let workouts = storage.workouts(usize::MAX)?;
            let streak = insights::betterme_streak(&workouts);
            println!("BetterMe streak: {streak} day{}", plural(u64::from(streak)));
        }
    }
    Ok(())
}

fn print_workouts(workouts: &[Workout], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(workouts)?),
        OutputFormat::Table => {
            println!(
                "{:<17} {:<16} {:>7} {:>9} {}",
                "When", "Sessions", "Steps", "Calories", "Notes"
            );
            for w in workouts {
                println!(
                    "{:<17} {:<16} {:>7} {:>9} {}",
                    format_when(&w.timestamp),
                    session_tags(w),
                    w.steps.map_or_else(|| "-".to_string(), |s| s.to_string()),
                    w.calories.map_or_else(|| "-".to_string(), |c| c.to_string()),
                    w.notes.as_deref().unwrap_or("-"),
                );
            }
        }
        OutputFormat::Plain => {
            for w in workouts {
                println!(
                    "{}  {}{}{}",
                    format_when(&w.timestamp),
                    session_tags(w),
                    w.steps.map(|s| format!(", {s} steps")).unwrap_or_default(),
                    w.calories.map(|c| format!(", {c} kcal")).unwrap_or_default(),
                );
            }
        }
    }
    Ok(())
}

/// Render the session flags of a workout, e.g. "betterme+cardio".
fn session_tags(workout: &Workout) -> String {
    let mut tags = Vec::new();
    if workout.betterme {
        tags.push("betterme");
    }
    if workout.strength {
        tags.push("strength");
    }
    if workout.mobility {
        tags.push("mobility");
    }
    if workout.cardio {
        tags.push("cardio");
    }
    if tags.is_empty() {
        "steps only".to_string()
    } else {
        tags.join("+")
    }
}

fn handle_metric(storage: &Storage, cmd: MetricCommand) -> anyhow::Result<()> {
    match cmd {
        MetricCommand::Add {
            weight,
            resting_hr,
            spo2,
            hrv,
            bp,
            sleep,
        } => {
            let metric = Metric::new(weight, resting_hr, spo2, hrv, bp, sleep)?;
            storage.insert_metric(&metric)?;
            println!("Measurements recorded.");
        }
        MetricCommand::List { limit, format } => {
            let metrics = storage.metrics(limit)?;
            print_metrics(&metrics, format)?;
        }
        MetricCommand::Export { output } => {
            let count = export::export_metrics_csv(storage, &output)?;
            println!("Exported {count} entries to {}.", output.display());
        }
        MetricCommand::Template { output } => {
            export::write_metrics_template(&output)?;
            println!("Wrote import template to {}.", output.display());
        }
        MetricCommand::Import { file } => {
            let count = export::import_metrics(storage, &file)?;
            println!("Imported {count} entries.");
        }
    }
    Ok(())
}

fn print_metrics(metrics: &[Metric], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(metrics)?),
        OutputFormat::Table => {
            println!(
                "{:<17} {:>7} {:>5} {:>6} {:>5} {:>8} {:>6}",
                "When", "Weight", "RHR", "SpO2", "HRV", "BP", "Sleep"
            );
            for m in metrics {
                println!(
                    "{:<17} {:>7} {:>5} {:>6} {:>5} {:>8} {:>6}",
                    format_when(&m.timestamp),
                    m.weight.map_or_else(|| "-".to_string(), |v| format!("{v:.1}")),
                    m.resting_hr.map_or_else(|| "-".to_string(), |v| v.to_string()),
                    m.spo2.map_or_else(|| "-".to_string(), |v| format!("{v:.0}%")),
                    m.hrv.map_or_else(|| "-".to_string(), |v| format!("{v:.0}")),
                    m.bp.as_deref().unwrap_or("-"),
                    m.sleep_minutes.map_or_else(|| "-".to_string(), |v| format!("{v}m")),
                );
            }
        }
        OutputFormat::Plain => {
            for m in metrics {
                let mut parts = Vec::new();
                if let Some(v) = m.weight {
                    parts.push(format!("weight {v:.1}kg"));
                }
                if let Some(v) = m.resting_hr {
                    parts.push(format!("rhr {v}bpm"));
                }
                if let Some(v) = m.spo2 {
                    parts.push(format!("spo2 {v:.0}%"));
                }
                if let Some(v) = m.hrv {
                    parts.push(format!("hrv {v:.0}ms"));
                }
                if let Some(v) = &m.bp {
                    parts.push(format!("bp {v}"));
                }
                if let Some(v) = m.sleep_minutes {
                    parts.push(format!("sleep {v}min"));
                }
                println!("{}  {}", format_when(&m.timestamp), parts.join(", "));
            }
        }
    }
    Ok(())
}

fn handle_insights(
    storage: &Storage,
    config: &Config,
    cmd: &InsightsCommand,
) -> anyhow::Result<()> {
    let cards = insights::analyze(storage, &config.goals)?;
    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cards)?),
        OutputFormat::Table => {
            println!("{:<20} {:<12} {:<5} {}", "Insight", "Value", "Tone", "Note");
            for card in &cards {
                println!(
                    "{:<20} {:<12} {:<5} {}",
                    card.title, card.value, card.tone, card.message
                );
            }
        }
        OutputFormat::Plain => {
            for card in &cards {
                println!("{}: {} [{}]", card.title, card.value, card.tone);
                println!("  {}", card.message);
            }
        }
    }
    Ok(())
}

fn handle_chart(storage: &Storage, cmd: &ChartCommand) -> anyhow::Result<()> {
    match cmd {
        ChartCommand::Energy => {
            let checkins = storage.checkins(chart::ENERGY_CHART_POINTS)?;
            print!("{}", chart::render_energy(&checkins, chart::ENERGY_CHART_POINTS));
        }
        ChartCommand::Weekly => {
            let workouts = storage.workouts(usize::MAX)?;
            let buckets = chart::weekly_buckets(&workouts, chart::WEEKLY_CHART_WEEKS);
            print!("{}", chart::render_weekly(&buckets));
        }
    }
    Ok(())
}

fn handle_status(storage: &Storage, config: &Config, json: bool) -> anyhow::Result<()> {
    let stats = storage.stats()?;
    let workouts = storage.workouts(usize::MAX)?;
    let streak = insights::betterme_streak(&workouts);
    let adherence = insights::adherence(storage)?;
    let schedule = reminder::status(storage, config.reminder_interval())?;

    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "stats": stats,
            "betterme_streak_days": streak,
            "adherence": adherence,
            "reminder_due_in_secs": schedule.due_in.as_secs(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("hbind status");
        println!("------------");
        println!("Database:       {}", storage.path().display());
        println!("Size:           {} bytes", stats.db_size_bytes);
        println!("Check-ins:      {}", stats.checkins);
        println!("Workouts:       {}", stats.workouts);
        println!("Metric entries: {}", stats.metrics);
        println!("Medications:    {}", stats.medications);
        println!("Attachments:    {}", stats.attachments);
        println!();
        println!("BetterMe streak: {streak} day{}", plural(u64::from(streak)));
        println!("Adherence today: {adherence}");
        println!("Next reminder:   {}", format_due(schedule.due_in));
    }
    Ok(())
}

fn handle_vault(storage: &Storage, cmd: VaultCommand, pin: Option<&str>) -> anyhow::Result<()> {
    match cmd {
        VaultCommand::Set { passcode } => {
            vault::set_pin(storage, &passcode, pin)?;
            println!("Passcode set. Data commands now require --pin.");
        }
        VaultCommand::Clear => {
            let current = pin.ok_or(healthbinder::Error::VaultLocked)?;
            vault::clear_pin(storage, current)?;
            println!("Passcode removed.");
        }
        VaultCommand::Status => {
            if vault::is_set(storage)? {
                println!("A passcode is set; data commands require --pin.");
            } else {
                println!("No passcode set.");
            }
        }
    }
    Ok(())
}

fn handle_files(storage: &Storage, cmd: FilesCommand) -> anyhow::Result<()> {
    match cmd {
        FilesCommand::Add { paths } => {
            for outcome in attachments::add_files(storage, &paths)? {
                match outcome {
                    attachments::AddOutcome::Stored { id, name } => {
                        println!("Stored {name} as #{id}.");
                    }
                    attachments::AddOutcome::Duplicate { name } => {
                        println!("Skipped {name}: identical contents already stored.");
                    }
                }
            }
        }
        FilesCommand::List => {
            for a in storage.attachments()? {
                println!(
                    "#{:<4} {:<30} {:<6} {:>10} bytes  {}",
                    a.id.unwrap_or_default(),
                    a.name,
                    a.kind,
                    a.size_bytes,
                    format_when(&a.added_at),
                );
            }
        }
        FilesCommand::Get { id, output } => {
            attachments::export_one(storage, id, &output)?;
            println!("Wrote attachment #{id} to {}.", output.display());
        }
        FilesCommand::Export { dir } => {
            let written = attachments::export_all(storage, &dir)?;
            println!("Exported {} file{} to {}.", written.len(), plural(written.len() as u64), dir.display());
        }
    }
    Ok(())
}

fn handle_remind(storage: &Storage, config: &Config, cmd: RemindCommand) -> anyhow::Result<()> {
    match cmd {
        RemindCommand::Run => {
            reminder::run(storage, config.reminder_interval())?;
        }
        RemindCommand::Status => {
            let status = reminder::status(storage, config.reminder_interval())?;
            match status.last_fired {
                Some(last) => println!("Last reminder: {}", format_when(&last)),
                None => println!("No reminder has fired yet."),
            }
            println!("Next reminder: {}", format_due(status.due_in));
        }
        RemindCommand::Test => {
            reminder::fire(storage)?;
        }
        RemindCommand::Calendar { output } => {
            let ics = reminder::calendar(config.reminder.interval_hours, chrono::Utc::now());
            std::fs::write(&output, ics)?;
            println!(
                "Wrote calendar with a reminder every {}h to {}.",
                config.reminder.interval_hours,
                output.display()
            );
        }
    }
    Ok(())
}

fn handle_prune(storage: &Storage, config: &Config, yes: bool) -> anyhow::Result<()> {
    let Some(max_age) = config.max_age() else {
        println!("Pruning is disabled (storage.max_age_days = 0).");
        return Ok(());
    };

    if yes {
        let removed = storage.prune_older_than(max_age)?;
        println!(
            "Pruned {removed} record{} older than {} days.",
            plural(removed as u64),
            config.storage.max_age_days
        );
    } else {
        println!(
            "This will delete records older than {} days. Use --yes to confirm.",
            config.storage.max_age_days
        );
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:    {}", config.database_path().display());
                println!("  Max age (days):   {}", config.storage.max_age_days);
                println!();
                println!("[Reminder]");
                println!("  Interval (hours): {}", config.reminder.interval_hours);
                println!();
                println!("[Goals]");
                println!("  Sleep target:     {} min", config.goals.sleep_target_minutes);
                println!("  Resting HR max:   {} bpm", config.goals.resting_hr_max);
                println!("  HRV min:          {} ms", config.goals.hrv_min);
                println!("  SpO2 min:         {}%", config.goals.spo2_min);
                println!("  Energy good:      {}/10", config.goals.energy_good);
                println!("  Steps target:     {}", config.goals.steps_target);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
        ConfigCommand::Reset { yes } => {
            let path = Config::default_config_path();
            if yes {
                if Path::new(&path).exists() {
                    std::fs::remove_file(&path)?;
                    println!("Removed {}; defaults apply.", path.display());
                } else {
                    println!("No configuration file at {}; defaults already apply.", path.display());
                }
            } else {
                println!("This will remove {} and revert to defaults.", path.display());
                println!("Use --yes to confirm.");
            }
        }
    }
    Ok(())
}

/// Format a stored timestamp in local time for display.
fn format_when(timestamp: &chrono::DateTime<chrono::Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// Format the time until the next reminder.
fn format_due(due_in: Duration) -> String {
    if due_in.is_zero() {
        return "due now".to_string();
    }
    let mins = due_in.as_secs() / 60;
    format!("in {}h {:02}m", mins / 60, mins % 60)
}

fn plural(count: u64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
