use clap::{Parser, Subcommand};
use glow_core::*;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "glow")]
#[command(about = "Daily wellness tracker for water, meals and facial exercises", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Treat this day (YYYY-MM-DD) as today for reports; `water`, `meal`
    /// and `exercise` only accept the real current day
    #[arg(long, global = true)]
    date: Option<DateKey>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's record (default)
    Today,

    /// Set or adjust today's water glasses
    Water {
        /// New glass count
        #[arg(allow_negative_numbers = true, conflicts_with = "add")]
        count: Option<i64>,

        /// Add (or with a negative value, remove) glasses
        #[arg(long, allow_negative_numbers = true)]
        add: Option<i64>,
    },

    /// Set or adjust today's meal count
    Meal {
        /// healthy or unhealthy
        kind: MealKind,

        /// New meal count
        #[arg(allow_negative_numbers = true, conflicts_with = "add")]
        count: Option<i64>,

        /// Add (or with a negative value, remove) meals
        #[arg(long, allow_negative_numbers = true)]
        add: Option<i64>,
    },

    /// Mark a facial exercise as completed today
    Exercise {
        /// Exercise id (see `glow exercises`)
        id: String,
    },

    /// List available facial exercises
    Exercises,

    /// Show the last seven days
    Week,

    /// Show current and best streaks
    Streak,

    /// Export the full history as CSV
    Export {
        /// Destination file
        path: PathBuf,
    },
}

type Service = DailyRecordService<FileStore, Arc<dyn Clock>>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    glow_core::logging::init_with_level(&config.logging.level);

    let command = cli.command.unwrap_or(Commands::Today);
    if let Some(date) = cli.date {
        check_pinned_date(&command, date)?;
    }

    // Determine data directory
    let records_dir = match cli.data_dir {
        Some(dir) => dir.join("records"),
        None => config.records_dir(),
    };

    let clock: Arc<dyn Clock> = match cli.date {
        Some(date) => Arc::new(FixedClock::at_date(date.date())),
        None => Arc::new(SystemClock),
    };

    tracing::debug!("Using record store at {:?}", records_dir);
    let store = FileStore::open(&records_dir)?;
    let svc = DailyRecordService::new(store, clock);

    match command {
        Commands::Today => cmd_today(&svc),
        Commands::Water { count, add } => cmd_water(&svc, count, add),
        Commands::Meal { kind, count, add } => cmd_meal(&svc, kind, count, add),
        Commands::Exercise { id } => cmd_exercise(&svc, &id),
        Commands::Exercises => cmd_exercises(),
        Commands::Week => cmd_week(&svc),
        Commands::Streak => cmd_streak(&svc),
        Commands::Export { path } => cmd_export(&svc, path),
    }
}

/// Past days are closed; only reports may look at them through `--date`
fn check_pinned_date(command: &Commands, date: DateKey) -> Result<()> {
    let mutates = matches!(
        command,
        Commands::Water { .. } | Commands::Meal { .. } | Commands::Exercise { .. }
    );
    let today = SystemClock.today();
    if mutates && date != today {
        return Err(Error::InvalidArgument(format!(
            "Cannot modify {}: only today's record ({}) can be changed",
            date, today
        )));
    }
    Ok(())
}

fn cmd_today(svc: &Service) -> Result<()> {
    display_record(&svc.get_today()?);
    Ok(())
}

fn cmd_water(svc: &Service, count: Option<i64>, add: Option<i64>) -> Result<()> {
    let record = match (count, add) {
        (Some(count), _) => svc.set_water_glasses(count)?,
        (None, Some(delta)) => svc.add_water_glasses(delta)?,
        (None, None) => svc.get_today()?,
    };

    println!(
        "Water: {}/{} glasses",
        record.water_glasses, WATER_GOAL_GLASSES
    );
    if (count.is_some() || add.is_some()) && record.water_goal_met() {
        println!("✓ Daily water goal reached!");
    }
    Ok(())
}

fn cmd_meal(svc: &Service, kind: MealKind, count: Option<i64>, add: Option<i64>) -> Result<()> {
    let record = match (count, add) {
        (Some(count), _) => svc.set_meal_count(kind, count)?,
        (None, Some(delta)) => svc.add_meal_count(kind, delta)?,
        (None, None) => svc.get_today()?,
    };

    println!(
        "Meals: {} healthy, {} unhealthy ({})",
        record.healthy_meals,
        record.unhealthy_meals,
        if record.meals_balanced() {
            "balanced"
        } else {
            "not balanced"
        }
    );
    Ok(())
}

fn cmd_exercise(svc: &Service, id: &str) -> Result<()> {
    let exercise = get_default_catalog().get(id)?;
    let already_done = svc.get_today()?.exercises_completed.contains(&exercise.id);
    let record = svc.complete_exercise(&exercise.id)?;

    if already_done {
        println!("{} was already completed today.", exercise.title);
    } else {
        println!("✓ Completed {}!", exercise.title);
    }
    println!(
        "  Exercises today: {}",
        record.exercises_completed.len()
    );
    Ok(())
}

fn cmd_exercises() -> Result<()> {
    for exercise in get_default_catalog().list() {
        println!(
            "{:<18} {} ({}s)",
            exercise.id, exercise.title, exercise.duration_seconds
        );
    }
    Ok(())
}

fn cmd_week(svc: &Service) -> Result<()> {
    let summary = svc.weekly_summary()?;

    for day in &summary.days {
        println!(
            "{} {}  water {}  exercise {}  meals {}",
            day.date,
            day.date.date().format("%a"),
            mark(day.water_goal_met),
            mark(day.exercise_complete),
            mark(day.meals_balanced),
        );
    }

    println!();
    println!("Water goal:    {}/{}", summary.water_days, summary.days.len());
    println!("Exercise:      {}/{}", summary.exercise_days, summary.days.len());
    println!(
        "Balanced meals: {}/{}",
        summary.balanced_meal_days,
        summary.days.len()
    );
    Ok(())
}

fn cmd_streak(svc: &Service) -> Result<()> {
    let state = svc.streak_state()?;

    println!("Current streak: {}", days(state.current_streak));
    println!("Best streak: {}", days(state.best_streak));

    if let Some(milestone) = Milestone::current_for(state.current_streak) {
        println!("Achievement: {} ({} days)", milestone.reward, milestone.days);
    }
    if let Some(next) = Milestone::next_for(state.current_streak) {
        println!(
            "Next milestone: {} in {}",
            next.reward,
            days(next.days_to_go(state.current_streak))
        );
    }
    Ok(())
}

fn cmd_export(svc: &Service, path: PathBuf) -> Result<()> {
    let count = export_csv(&svc.history()?, &path)?;
    println!("✓ Exported {} days to {}", count, path.display());
    Ok(())
}

fn display_record(record: &DailyRecord) {
    println!("{}", record.date);
    println!(
        "  Water:     {}/{} glasses",
        record.water_glasses, WATER_GOAL_GLASSES
    );
    println!(
        "  Meals:     {} healthy, {} unhealthy",
        record.healthy_meals, record.unhealthy_meals
    );
    if record.exercises_completed.is_empty() {
        println!("  Exercises: none yet");
    } else {
        let ids: Vec<&str> = record
            .exercises_completed
            .iter()
            .map(String::as_str)
            .collect();
        println!("  Exercises: {}", ids.join(", "));
    }
}

fn mark(met: bool) -> &'static str {
    if met {
        "✓"
    } else {
        "·"
    }
}

fn days(n: u32) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", n)
    }
}
