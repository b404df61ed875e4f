//! Mindtrack CLI
//!
//! Command-line interface over the local entry store:
//! - Log moods and journal entries
//! - Browse, search and delete history
//! - Analytics, trends and the mood calendar
//! - CBT exercises and check-ins
//! - Export and status

use chrono::{DateTime, Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use mindtrack::analytics::{self, MoodAnalytics, MoodTrend};
use mindtrack::config::{generate_default_config, Config, LoggingConfig};
use mindtrack::exercises::{
    generate_review, CheckIn, CognitiveDistortion, ExerciseLog, NewActivity, NewDistortionRecord,
    NewThoughtRecord,
};
use mindtrack::export::{self, ExportKind};
use mindtrack::storage::{
    EntryStore, FileStore, JournalEntry, MoodEntry, MoodLevel, NewJournalEntry, NewMood,
};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "mindtrack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Local-first mood tracking, journaling and CBT exercises")]
#[command(long_about = "Mindtrack keeps your mood log, journal and CBT exercises on this device.\nEverything is stored as plain JSON files in the data directory.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory, overriding the config file
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntryKind {
    Mood,
    Journal,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log how you feel (1-5 or Terrible, Poor, Okay, Good, Great)
    Mood {
        mood: MoodLevel,
        /// Optional note
        #[arg(short, long)]
        note: Option<String>,
        /// Tags (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Write a journal entry
    Journal {
        /// Entry text; words are joined with spaces
        #[arg(required = true)]
        content: Vec<String>,
        /// Tags (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Link a mood (1-5)
        #[arg(short, long)]
        mood: Option<i64>,
    },

    /// List entries, newest first
    List {
        #[arg(value_enum, default_value = "mood")]
        kind: EntryKind,
        /// Show at most this many entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Search journal entries by text or tag
    Search {
        /// Search term (empty lists everything)
        #[arg(default_value = "")]
        term: String,
    },

    /// Delete an entry by id
    Delete {
        #[arg(value_enum)]
        kind: EntryKind,
        id: String,
    },

    /// Mood summary over a trailing window
    Analytics {
        /// Window length in days (default from config)
        #[arg(short, long)]
        days: Option<i64>,
    },

    /// Mood trend over a short trailing window
    Trend {
        /// Window length in days (default from config)
        #[arg(short, long)]
        days: Option<i64>,
    },

    /// Mood calendar for a month
    Calendar {
        /// Month as YYYY-MM (default: current month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Export data (mood, journal, backup)
    Export {
        kind: ExportKind,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// CBT exercises
    Exercise {
        #[command(subcommand)]
        command: ExerciseCommand,
    },

    /// Show store status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ExerciseCommand {
    /// Record a thought record
    Thought {
        #[arg(long)]
        situation: String,
        #[arg(long)]
        emotion: String,
        /// Emotion intensity (1-10)
        #[arg(long)]
        intensity: Option<i64>,
        /// The automatic thought
        #[arg(long)]
        thought: String,
        #[arg(long, default_value = "")]
        evidence: String,
        #[arg(long, default_value = "")]
        alternative: String,
    },

    /// Analyse a thought for cognitive distortions
    Distortion {
        thought: String,
        /// Distortion id (repeatable, see `exercise distortions`)
        #[arg(short, long = "distortion", required = true)]
        distortions: Vec<CognitiveDistortion>,
        #[arg(long, default_value = "")]
        reframed: String,
    },

    /// Save an activity plan
    Plan {
        /// Activity as NAME@TIME or NAME@TIME@DESCRIPTION (repeatable)
        #[arg(short, long = "activity", required = true)]
        activities: Vec<String>,
    },

    /// Start an interactive check-in
    Checkin,

    /// Generate a clinical summary of your exercises
    Review {
        /// Save the generated review
        #[arg(long)]
        save: bool,
        #[arg(long, default_value = "")]
        recommendations: String,
    },

    /// List the cognitive distortions
    Distortions,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.to_string_lossy().to_string();
    }

    init_logging(&config.logging)?;

    if let Commands::Config { output } = &cli.command {
        return write_config(output.as_deref());
    }
    if let Commands::Exercise {
        command: ExerciseCommand::Distortions,
    } = &cli.command
    {
        return print_distortions(cli.format);
    }

    let substrate = open_substrate(&config)?;
    let mut store = EntryStore::open(substrate.clone())?;
    if store.load_report().has_recovered() {
        eprintln!(
            "Warning: some stored data could not be read and was skipped (see `mindtrack status`)."
        );
    }

    match cli.command {
        Commands::Mood { mood, note, tags } => {
            let mut input = NewMood::from_level(mood).tags(tags);
            if let Some(note) = note {
                input = input.note(note);
            }
            let entry = store.save_mood_entry(input)?;
            emit(cli.format, &entry, || {
                println!(
                    "Logged {} {} at {} (id {})",
                    entry.emoji,
                    entry.label,
                    format_timestamp(entry.timestamp),
                    entry.id
                );
            })?;
        }

        Commands::Journal {
            content,
            tags,
            mood,
        } => {
            let mut input = NewJournalEntry::new(content.join(" ")).tags(tags);
            if let Some(mood) = mood {
                input = input.mood(mood);
            }
            let entry = store.save_journal_entry(input)?;
            emit(cli.format, &entry, || {
                println!(
                    "Saved journal entry ({} characters, id {})",
                    entry.content.chars().count(),
                    entry.id
                );
            })?;
        }

        Commands::List { kind, limit } => match kind {
            EntryKind::Mood => {
                let entries = newest_first(store.mood_entries(), |e| e.timestamp, limit);
                emit(cli.format, &entries, || print_mood_table(&entries))?;
            }
            EntryKind::Journal => {
                let entries = newest_first(store.journal_entries(), |e| e.timestamp, limit);
                emit(cli.format, &entries, || print_journal_table(&entries))?;
            }
        },

        Commands::Search { term } => {
            let found = analytics::search_journal(store.journal_entries(), &term);
            emit(cli.format, &found, || {
                if found.is_empty() {
                    println!("No journal entries match {:?}", term);
                } else {
                    print_journal_table(&found);
                }
            })?;
        }

        Commands::Delete { kind, id } => {
            let description = match kind {
                EntryKind::Mood => store
                    .get_mood_entry(&id)
                    .map(|e| format!("{} mood entry from {}", e.label, e.date)),
                EntryKind::Journal => store
                    .get_journal_entry(&id)
                    .map(|e| format!("journal entry from {}", e.date)),
            };
            let removed = match kind {
                EntryKind::Mood => store.delete_mood_entry(&id)?,
                EntryKind::Journal => store.delete_journal_entry(&id)?,
            };
            match description.filter(|_| removed) {
                Some(description) => println!("Deleted {} ({})", description, id),
                None => {
                    eprintln!("No entry with id {}", id);
                    std::process::exit(1);
                }
            }
        }

        Commands::Analytics { days } => {
            let days = window_days(days, config.analytics.window_days)?;
            let summary =
                analytics::compute_analytics_for(store.mood_entries(), store.now_millis(), days);
            emit(cli.format, &summary, || print_analytics(&summary, days))?;
        }

        Commands::Trend { days } => {
            let days = window_days(days, config.analytics.trend_days)?;
            let trend = analytics::mood_trend(store.mood_entries(), store.now_millis(), days);
            emit(cli.format, &trend, || print_trend(&trend))?;
        }

        Commands::Calendar { month } => {
            let (year, month) = parse_month(month.as_deref())?;
            let calendar = analytics::mood_calendar(store.mood_entries());
            let days = analytics::month_view(&calendar, year, month);
            let month_entries: Vec<MoodEntry> = days.iter().map(|(_, e)| (*e).clone()).collect();
            let stats =
                analytics::calendar_stats(&month_entries, config.analytics.good_mood_threshold);

            #[derive(Serialize)]
            struct CalendarOutput<'a> {
                year: i32,
                month: u32,
                days: &'a [MoodEntry],
                stats: analytics::CalendarStats,
            }
            let output = CalendarOutput {
                year,
                month,
                days: &month_entries,
                stats,
            };
            emit(cli.format, &output, || {
                println!("{}-{:02}", year, month);
                println!("{}", "-".repeat(40));
                if month_entries.is_empty() {
                    println!("No mood entries this month");
                }
                for entry in &month_entries {
                    println!(
                        "{}  {} {:<9} {}",
                        entry.local_date(),
                        entry.emoji,
                        entry.label,
                        entry.note.as_deref().unwrap_or("")
                    );
                }
                println!();
                println!(
                    "Days logged: {}  Good days: {}  Positive rate: {}%",
                    stats.total_entries, stats.good_days, stats.positive_rate
                );
            })?;
        }

        Commands::Export { kind, output } => {
            let snapshot = store.snapshot();
            let now = store.now_millis();
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    let file = std::fs::File::create(&path)?;
                    export::export(std::io::BufWriter::new(file), kind, &snapshot, now)?;
                    println!("Exported to {:?}", path);
                }
                None => {
                    let stdout = std::io::stdout();
                    export::export(stdout.lock(), kind, &snapshot, now)?;
                }
            }
        }

        Commands::Exercise { command } => {
            let mut log = ExerciseLog::open(substrate);
            run_exercise(&mut log, command, cli.format)?;
        }

        Commands::Status => {
            let stats = store.stats();
            let report = store.load_report().clone();
            let counts = ExerciseLog::open(substrate.clone()).counts()?;
            let used = substrate.used_bytes()?;

            println!("Mindtrack v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Data directory: {}", substrate.dir().display());
            match config.storage.quota_bytes {
                Some(quota) => println!("Storage: {} of {} bytes", used, quota),
                None => println!("Storage: {} bytes", used),
            }
            println!();
            println!("Mood log:    {}", report.mood);
            println!("Journal:     {}", report.journal);
            println!("{}", stats);
            println!();
            println!("Exercises:");
            println!("  Thought records:    {}", counts.thought_records);
            println!("  Distortion records: {}", counts.distortion_records);
            println!("  Activity plans:     {}", counts.behavioral_activation);
            println!("  Check-ins:          {}", counts.therapy_sessions);
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}

fn run_exercise(
    log: &mut ExerciseLog<FileStore>,
    command: ExerciseCommand,
    format: OutputFormat,
) -> CliResult<()> {
    match command {
        ExerciseCommand::Thought {
            situation,
            emotion,
            intensity,
            thought,
            evidence,
            alternative,
        } => {
            let mut input = NewThoughtRecord::new(situation, emotion, thought)
                .evidence(evidence)
                .alternative(alternative);
            if let Some(intensity) = intensity {
                input = input.intensity(intensity);
            }
            let record = log.save_thought_record(input)?;
            emit(format, &record, || println!("Thought record saved (id {})", record.id))?;
        }

        ExerciseCommand::Distortion {
            thought,
            distortions,
            reframed,
        } => {
            let input = distortions
                .into_iter()
                .fold(NewDistortionRecord::new(thought), |input, d| input.distortion(d))
                .reframed(reframed);
            let record = log.save_distortion_record(input)?;
            emit(format, &record, || {
                let names: Vec<&str> = record.selected_distortions.iter().map(|d| d.name()).collect();
                println!("Exercise completed: {}", names.join(", "));
            })?;
        }

        ExerciseCommand::Plan { activities } => {
            let activities = activities
                .iter()
                .map(|arg| parse_activity(arg))
                .collect::<Result<Vec<_>, _>>()?;
            let plan = log.save_activity_plan(activities)?;
            emit(format, &plan, || {
                println!("Activity plan saved (id {})", plan.id);
                for activity in &plan.activities {
                    let mark = if activity.completed { "x" } else { " " };
                    println!("  [{}] {} - {}", mark, activity.name, activity.scheduled_time);
                }
            })?;
        }

        ExerciseCommand::Checkin => {
            let check_in = run_check_in()?;
            if check_in.answered() == 0 {
                println!("Nothing answered, check-in not saved.");
                return Ok(());
            }
            let session = log.save_check_in(check_in)?;
            emit(format, &session, || {
                println!();
                println!("Check-in saved ({} answers)", session.responses.len());
            })?;
        }

        ExerciseCommand::Review {
            save,
            recommendations,
        } => {
            let counts = log.counts()?;
            let text = generate_review(&counts);
            if save {
                let review = log.save_review(text, recommendations)?;
                emit(format, &review, || {
                    println!("{}", review.review);
                    println!();
                    println!("Review saved (id {})", review.id);
                })?;
            } else {
                #[derive(Serialize)]
                struct ReviewOutput<'a> {
                    review: &'a str,
                    counts: mindtrack::ExerciseCounts,
                }
                emit(format, &ReviewOutput { review: &text, counts }, || println!("{}", text))?;
            }
        }

        ExerciseCommand::Distortions => print_distortions(format)?,
    }
    Ok(())
}

/// Walk the default prompts over stdin until answered or EOF
fn run_check_in() -> CliResult<CheckIn> {
    let mut check_in = CheckIn::new();
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = std::io::stdout();

    while let Some(prompt) = check_in.current_prompt() {
        println!("{}", prompt);
        print!("> ");
        stdout.flush()?;

        let Some(line) = lines.next() else { break };
        if let Some(reply) = check_in.respond(&line?) {
            println!("{}", reply.acknowledgement);
            println!();
        }
    }
    Ok(check_in)
}

fn parse_activity(arg: &str) -> Result<NewActivity, String> {
    let mut parts = arg.splitn(3, '@');
    let name = parts.next().unwrap_or_default().trim();
    let time = parts.next().map(str::trim).ok_or_else(|| {
        format!(
            "Invalid activity {:?}. Use: NAME@TIME or NAME@TIME@DESCRIPTION",
            arg
        )
    })?;

    let mut activity = NewActivity::new(name, time);
    if let Some(description) = parts.next() {
        activity = activity.description(description.trim());
    }
    Ok(activity)
}

fn window_days(requested: Option<i64>, default: i64) -> Result<i64, String> {
    match requested.unwrap_or(default) {
        days @ 1..=36_500 => Ok(days),
        days => Err(format!("Invalid window: {} days. Use 1 to 36500", days)),
    }
}

fn parse_month(s: Option<&str>) -> Result<(i32, u32), String> {
    let Some(s) = s else {
        let today = Local::now().date_naive();
        return Ok((today.year(), today.month()));
    };
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .map(|d| (d.year(), d.month()))
        .map_err(|_| format!("Invalid month format: {}. Use: YYYY-MM", s))
}

fn open_substrate(config: &Config) -> CliResult<FileStore> {
    let dir = config.storage.data_path();
    tracing::debug!(dir = %dir.display(), "Opening data directory");

    let store = FileStore::open(dir)?;
    Ok(match config.storage.quota_bytes {
        Some(quota) => store.with_quota(quota),
        None => store,
    })
}

fn init_logging(config: &LoggingConfig) -> CliResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mindtrack={}", config.level)));

    let writer = match &config.file {
        Some(path) => {
            let path = Path::new(path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .init();
    }
    Ok(())
}

fn write_config(output: Option<&Path>) -> CliResult<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)?;
            println!("Config written to {:?}", path);
        }
        None => {
            print!("{}", config);
        }
    }
    Ok(())
}

/// Print `value` as JSON, or run the table printer
fn emit<T: Serialize>(format: OutputFormat, value: &T, table: impl FnOnce()) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => table(),
    }
    Ok(())
}

fn newest_first<T: Clone>(entries: &[T], timestamp: impl Fn(&T) -> i64, limit: Option<usize>) -> Vec<T> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|e| std::cmp::Reverse(timestamp(e)));
    if let Some(limit) = limit {
        sorted.truncate(limit);
    }
    sorted
}

fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp_millis(timestamp)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    let flat = s.replace('\n', " ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn print_mood_table(entries: &[MoodEntry]) {
    if entries.is_empty() {
        println!("No mood entries yet.");
        println!();
        println!("Log your first mood with:");
        println!("  mindtrack mood good");
        return;
    }

    println!("{:<17} {:<12} {:<20} {}", "When", "Mood", "Tags", "Note / ID");
    println!("{}", "-".repeat(72));
    for e in entries {
        println!(
            "{:<17} {} {:<9} {:<20} {}",
            format_timestamp(e.timestamp),
            e.emoji,
            e.label,
            truncate(&e.tags.join(", "), 20),
            e.note.as_deref().map(|n| truncate(n, 30)).unwrap_or_else(|| e.id.clone())
        );
    }
}

fn print_journal_table<E: std::borrow::Borrow<JournalEntry>>(entries: &[E]) {
    if entries.is_empty() {
        println!("No journal entries yet.");
        return;
    }

    println!("{:<17} {:<6} {:<20} {}", "When", "Mood", "Tags", "Entry");
    println!("{}", "-".repeat(80));
    for e in entries {
        let e = e.borrow();
        let mood = e
            .mood_level()
            .map(|level| level.emoji().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<17} {:<6} {:<20} {}",
            format_timestamp(e.timestamp),
            mood,
            truncate(&e.tags.join(", "), 20),
            truncate(&e.content, 40)
        );
    }
}

fn bar(count: usize) -> String {
    "█".repeat(count.min(40))
}

fn print_analytics(summary: &MoodAnalytics, days: i64) {
    println!("Last {} days", days);
    println!("{}", "-".repeat(40));
    println!("Entries:      {}", summary.total_entries);
    match summary.average() {
        Some(avg) => println!("Average mood: {:.2}", avg),
        None => {
            println!("Average mood: -");
            return;
        }
    }
    println!();
    println!("Distribution:");
    for level in MoodLevel::all().iter().rev() {
        let count = summary.mood_distribution.get(level.label()).unwrap_or(0);
        println!("  {} {:<9} {:>3} {}", level.emoji(), level.label(), count, bar(count));
    }
    // Labels outside the fixed set (hand-edited data) still get a line
    for (label, count) in summary.mood_distribution.iter() {
        if MoodLevel::from_label(label).is_none() {
            println!("  ? {:<9} {:>3} {}", label, count, bar(count));
        }
    }
}

fn print_trend(trend: &MoodTrend) {
    println!("Mood trend, last {} days", trend.days);
    println!("{}", "-".repeat(40));
    if trend.points.is_empty() {
        println!("No mood entries in this window");
        return;
    }
    for point in &trend.points {
        println!(
            "{}  {} {:<9} {}",
            point.date,
            point.mood,
            point.label,
            bar(point.mood as usize * 4)
        );
    }
    println!();
    println!("Average: {:.2}", trend.average);
}

fn print_distortions(format: OutputFormat) -> CliResult<()> {
    #[derive(Serialize)]
    struct DistortionInfo {
        id: &'static str,
        name: &'static str,
        description: &'static str,
        example: &'static str,
    }
    let catalogue: Vec<DistortionInfo> = CognitiveDistortion::all()
        .iter()
        .map(|d| DistortionInfo {
            id: d.id(),
            name: d.name(),
            description: d.description(),
            example: d.example(),
        })
        .collect();

    emit(format, &catalogue, || {
        for d in &catalogue {
            println!("{} ({})", d.name, d.id);
            println!("  {}", d.description);
            println!("  e.g. \"{}\"", d.example);
        }
    })
}
