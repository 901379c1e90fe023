//! fatiguefit - per-muscle fatigue and readiness tracker

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use fatiguefit::engine::fatigue::set_fatigue_contributions;
use fatiguefit::engine::plan::{recommend_exercises, warnings};
use fatiguefit::engine::stimulus::{sets_to_optimal, stimulus_progress};
use fatiguefit::exercises::{Exercise, find_exercise, find_exercise_by_name};
use fatiguefit::session::{MAX_SORENESS, last_set_for_exercise};
use fatiguefit::{
    JsonStore, MuscleGroup, MuscleSection, MuscleTracker, Persistence, SorenessMap,
    TuningConfig, WorkoutSession, recompute,
};

#[derive(Parser)]
#[command(name = "fatiguefit")]
#[command(author, version, about = "Per-muscle fatigue, stimulus and readiness tracker")]
struct Cli {
    /// JSON file holding the session log and settings
    #[arg(long, env = "FATIGUEFIT_HISTORY", default_value = "fatiguefit.json")]
    history: PathBuf,

    /// Optional tuning override file (JSON)
    #[arg(long, env = "FATIGUEFIT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Body readiness, coach banner, suggested focus and stats
    Status,

    /// Fatigue, weekly stimulus and readiness for every section
    Sections,

    /// Recommended exercises and warnings for the chosen focus
    Plan {
        /// Muscle groups, comma separated (default: suggested focus)
        #[arg(short, long, value_delimiter = ',')]
        focus: Vec<String>,
    },

    /// Start a workout session
    Start {
        /// Muscle groups, comma separated
        #[arg(short, long, value_delimiter = ',')]
        focus: Vec<String>,

        /// Pre-workout soreness as section=level (0-4), repeatable
        #[arg(short, long)]
        sore: Vec<String>,
    },

    /// Log a set in the current session
    Log {
        /// Exercise id or name (e.g. "bench-press", "Squat")
        exercise: String,

        /// Weight in the profile's unit
        #[arg(short, long)]
        weight: f32,

        #[arg(short, long, default_value = "8")]
        reps: u32,

        /// Perceived exertion, 1-10
        #[arg(long, default_value = "8")]
        rpe: f32,
    },

    /// End the current session
    End,

    /// Rebuild section states from the session log
    Replay,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => TuningConfig::from_json_file(path)
            .with_context(|| format!("loading tuning config {}", path.display()))?,
        None => TuningConfig::default(),
    };
    let mut store = JsonStore::open(&cli.history)
        .with_context(|| format!("opening history {}", cli.history.display()))?;

    match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => show_status(&store, &config)?,
        Commands::Sections => show_sections(&store, &config)?,
        Commands::Plan { focus } => show_plan(&store, &config, &focus)?,
        Commands::Start { focus, sore } => start_session(&mut store, &focus, &sore)?,
        Commands::Log { exercise, weight, reps, rpe } => {
            log_set(&mut store, &config, &exercise, weight, reps, rpe)?
        }
        Commands::End => end_session(&mut store, &config)?,
        Commands::Replay => replay(&mut store, &config)?,
    }

    Ok(())
}

/// Session log including the one in progress, so its sets count
fn full_history(store: &impl Persistence) -> Result<Vec<WorkoutSession>> {
    let mut history = store.load_sessions()?;
    if let Some(current) = store.load_current_session()? {
        history.push(current);
    }
    Ok(history)
}

fn parse_groups(raw: &[String]) -> Result<Vec<MuscleGroup>> {
    raw.iter()
        .map(|id| match MuscleGroup::from_id(id) {
            Some(group) => Ok(group),
            None => bail!("Unknown muscle group: {}", id),
        })
        .collect()
}

fn parse_soreness(raw: &[String]) -> Result<SorenessMap> {
    let mut soreness = SorenessMap::default();
    for item in raw {
        let Some((section, level)) = item.split_once('=') else {
            bail!("Expected section=level, got {}", item);
        };
        let Some(section) = MuscleSection::from_id(section) else {
            bail!("Unknown muscle section: {}", section);
        };
        let level: u8 = level
            .trim()
            .parse()
            .with_context(|| format!("soreness level for {}", section))?;
        soreness[section] = level.min(MAX_SORENESS);
    }
    Ok(soreness)
}

fn resolve_exercise(query: &str) -> Result<&'static Exercise> {
    match find_exercise(query).or_else(|| find_exercise_by_name(query)) {
        Some(exercise) => Ok(exercise),
        None => bail!("Unknown exercise: {}", query),
    }
}

fn show_status(store: &JsonStore, config: &TuningConfig) -> Result<()> {
    let now = Utc::now();
    let profile = store.load_profile()?;
    let derived = recompute(&full_history(store)?, &profile, &store.load_soreness()?, now, config);
    let coach = &derived.coach;

    println!("{}", coach.banner.title);
    println!("  {}", coach.banner.subtitle);
    if let Some(next) = coach.next_recommended_start_at
        && next > now
    {
        println!("  next session: {}", next.format("%Y-%m-%d %H:%M UTC"));
    }
    println!("  [{}] / [{}]", coach.banner.primary_cta, coach.banner.secondary_cta);
    println!("{:-<50}", "");
    println!("Body readiness: {:.0}%", derived.body_readiness);
    println!(
        "Consistency:    {} (cadence {:.0}h)",
        coach.consistency, coach.average_interval_hours
    );

    let focus: Vec<_> = derived.suggested_focus.iter().map(|g| g.name()).collect();
    println!("Suggested focus: {}", focus.join(", "));
    for group in &derived.groups {
        println!("  {:10} {}", group.group.name(), group.readiness);
    }

    let stats = &derived.stats;
    println!("{:-<50}", "");
    println!("Sessions: {}", stats.total_sessions);
    println!("Streak:   {} days (best {})", stats.current_streak, stats.longest_streak);
    if let Some(lift) = &stats.heaviest_lift {
        let unit = profile.weight_unit;
        println!(
            "Heaviest: {} {:.1}{}",
            lift.exercise_name,
            unit.from_kg(lift.weight_kg),
            unit.label()
        );
    }
    println!("PRs:      {}", stats.pr_count);
    let unlocked: Vec<_> = stats
        .badges
        .iter()
        .filter(|b| b.is_unlocked())
        .map(|b| b.name)
        .collect();
    if !unlocked.is_empty() {
        println!("Badges:   {}", unlocked.join(", "));
    }
    Ok(())
}

fn show_sections(store: &JsonStore, config: &TuningConfig) -> Result<()> {
    let now = Utc::now();
    let profile = store.load_profile()?;
    let derived = recompute(&full_history(store)?, &profile, &store.load_soreness()?, now, config);

    println!(
        "{:14} {:>7} {:>6} {:>8} {:>5}  {:12} {}",
        "section", "fatigue", "sets", "to-opt", "prog", "zone", "readiness"
    );
    println!("{:-<70}", "");
    for (section, state) in derived.tracker.sections.iter() {
        println!(
            "{:14} {:>7.1} {:>6.2} {:>8.2} {:>4.0}%  {:12} {}",
            section.name(),
            state.fatigue,
            state.weekly_stimulus,
            sets_to_optimal(state.weekly_stimulus, config),
            stimulus_progress(state.weekly_stimulus, config),
            derived.zones[section].to_string(),
            derived.readiness[section]
        );
    }
    Ok(())
}

fn show_plan(store: &JsonStore, config: &TuningConfig, focus: &[String]) -> Result<()> {
    let now = Utc::now();
    let profile = store.load_profile()?;
    let soreness = store.load_soreness()?;
    let derived = recompute(&full_history(store)?, &profile, &soreness, now, config);

    let mut groups = parse_groups(focus)?;
    if groups.is_empty() {
        groups = derived.suggested_focus.clone();
    }
    let ui = &config.ui;
    if groups.len() < ui.min_focus_muscles || groups.len() > ui.max_focus_muscles {
        bail!(
            "Pick between {} and {} muscle groups",
            ui.min_focus_muscles,
            ui.max_focus_muscles
        );
    }
    let states = &derived.tracker.sections;

    let names: Vec<_> = groups.iter().map(|g| g.name()).collect();
    println!("Plan for {}", names.join(", "));
    println!("{:-<60}", "");
    for rec in recommend_exercises(&groups, states, &soreness, now, config) {
        println!("{:5.2}  {:24} {}", rec.priority, rec.exercise.name, rec.reason);
    }

    for warning in warnings(&groups, states, &soreness, now, config) {
        println!();
        println!("! {} ({})", warning.message, warning.readiness);
        if !warning.alternatives.is_empty() {
            let alt: Vec<_> = warning.alternatives.iter().map(|e| e.name).collect();
            println!("  alternatives: {}", alt.join(", "));
        }
    }
    Ok(())
}

fn start_session(store: &mut JsonStore, focus: &[String], sore: &[String]) -> Result<()> {
    if store.load_current_session()?.is_some() {
        bail!("A session is already in progress; end it first");
    }
    let groups = parse_groups(focus)?;
    let soreness = parse_soreness(sore)?;
    let session = WorkoutSession::start(groups, Some(soreness), Utc::now());

    store.save_soreness(&soreness)?;
    store.save_current_session(Some(&session))?;
    println!("Session started ({})", session.id);
    Ok(())
}

fn log_set(
    store: &mut JsonStore,
    config: &TuningConfig,
    query: &str,
    weight: f32,
    reps: u32,
    rpe: f32,
) -> Result<()> {
    let Some(mut session) = store.load_current_session()? else {
        bail!("No session in progress; run `fatiguefit start` first");
    };
    let exercise = resolve_exercise(query)?;
    let profile = store.load_profile()?;
    let unit = profile.weight_unit;
    let now = Utc::now();

    let history = store.load_sessions()?;
    if let Some(previous) = last_set_for_exercise(Some(&session), &history, exercise.id) {
        println!(
            "last time: {:.1}{} x {} @ RPE {}",
            unit.from_kg(previous.weight_kg),
            unit.label(),
            previous.reps,
            previous.rpe
        );
    }

    let entry = session
        .add_exercise(exercise.id)
        .context("session no longer accepts exercises")?;
    let set = session
        .log_set(entry, unit.to_kg(weight), reps, rpe, now)
        .context("failed to log set")?;

    let tracker = match store.load_section_states()? {
        Some(tracker) => tracker,
        None => MuscleTracker::rebuild(&full_history(&*store)?, &profile, now, config),
    };
    let tracker = tracker.log_set(&set, &profile, config);

    store.save_current_session(Some(&session))?;
    store.save_section_states(&tracker)?;

    println!("Logged: {} {:.1}{} x {} @ RPE {}", exercise.name, weight, unit.label(), reps, set.rpe);
    let added = set_fatigue_contributions(&set, profile.sensitivity(), config);
    for (section, gain) in added.iter().filter(|(_, g)| **g > 0.0) {
        println!("  +{:.1} {} (now {:.1})", gain, section.name(), tracker.section(section).fatigue);
    }
    Ok(())
}

fn end_session(store: &mut JsonStore, config: &TuningConfig) -> Result<()> {
    let Some(mut session) = store.load_current_session()? else {
        bail!("No session in progress");
    };
    let now = Utc::now();
    session.end(now);

    let mut sessions = store.load_sessions()?;
    sessions.push(session.clone());
    store.save_sessions(&sessions)?;
    store.save_current_session(None)?;

    let sets = session.sets().count();
    let minutes = session.duration_secs.unwrap_or(0) / 60;
    println!("Session ended: {} sets in {} min", sets, minutes);

    let coach = fatiguefit::engine::compute_coach_state(&sessions, now, config);
    println!("{}: {}", coach.banner.title, coach.banner.subtitle);
    Ok(())
}

fn replay(store: &mut JsonStore, config: &TuningConfig) -> Result<()> {
    let now = Utc::now();
    let profile = store.load_profile()?;
    let history = full_history(&*store)?;
    let tracker = MuscleTracker::rebuild(&history, &profile, now, config);
    store.save_section_states(&tracker)?;

    println!("Replayed {} sessions", history.len());
    for (section, state) in tracker.sections.iter().filter(|(_, s)| s.fatigue > 0.0) {
        println!("  {:14} {:>5.1}", section.name(), state.fatigue);
    }
    Ok(())
}
