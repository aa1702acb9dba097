use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveTime;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use math_drill::analysis::{self, Highlight};
use math_drill::clock::{Clock, SystemClock};
use math_drill::config::AppConfig;
use math_drill::curriculum::{Curriculum, ExerciseStrategy};
use math_drill::db;
use math_drill::domain::{Operation, ResultStatus, NOT_RECOGNIZED};
use math_drill::session::{ExerciseConfig, PracticeSession};
use math_drill::store::{MasteryStore, SqliteStore};

#[derive(Parser)]
#[command(name = "math-drill", about = "Adaptive arithmetic fact practice", version)]
struct Cli {
  /// SQLite database (overrides config.toml and DATABASE_PATH)
  #[arg(long, global = true)]
  db: Option<PathBuf>,

  /// Learner id
  #[arg(long, global = true)]
  user: Option<i64>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Practice in the terminal
  Practice {
    /// addition, subtraction, multiplication or division
    #[arg(long, default_value = "addition")]
    operation: String,

    /// Practice a single level instead of the whole operation
    #[arg(long)]
    level: Option<String>,

    /// Number of exercises
    #[arg(long)]
    count: Option<usize>,

    /// Force DRILL or REVIEW for a single level
    #[arg(long)]
    strategy: Option<String>,

    /// Print the session result as JSON
    #[arg(long)]
    json: bool,
  },

  /// List levels with the learner's star rating
  Levels {
    #[arg(long)]
    operation: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// Practice streak and today's highlights
  Stats {
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
}

#[derive(Serialize)]
struct LevelSummary {
  id: String,
  operation: Operation,
  strategy: ExerciseStrategy,
  facts: usize,
  stars: u8,
  unlocked_by: Vec<String>,
}

#[derive(Serialize)]
struct Stats {
  streak_days: u32,
  attempts_today: usize,
  highlights: Vec<Highlight>,
}

#[tokio::main]
async fn main() -> ExitCode {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "math_drill=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  match run(Cli::parse()).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("error: {}", e);
      ExitCode::FAILURE
    }
  }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
  let mut app_config = AppConfig::load();
  if let Some(path) = cli.db {
    app_config.database_path = path;
  }
  if let Some(user) = cli.user {
    app_config.user_id = user;
  }

  let pool = db::init_db(&app_config.database_path)?;
  let store: Arc<dyn MasteryStore> = Arc::new(SqliteStore::new(pool));
  let curriculum = Curriculum::standard();

  match cli.command {
    Commands::Practice {
      operation,
      level,
      count,
      strategy,
      json,
    } => {
      let mut config = ExerciseConfig::new(
        parse_operation(&operation)?,
        count.unwrap_or(app_config.exercise_count),
      );
      config.level_id = level;
      config.strategy = strategy.as_deref().map(parse_strategy).transpose()?;
      practice(config, app_config.user_id, &curriculum, store, json).await
    }
    Commands::Levels { operation, json } => {
      let operation = operation.as_deref().map(parse_operation).transpose()?;
      list_levels(&curriculum, operation, app_config.user_id, store, json)
    }
    Commands::Stats { json } => stats(app_config.user_id, store, json),
  }
}

fn parse_operation(s: &str) -> Result<Operation, String> {
  Operation::from_str(s).ok_or_else(|| format!("unknown operation: {}", s))
}

fn parse_strategy(s: &str) -> Result<ExerciseStrategy, String> {
  ExerciseStrategy::from_str(s).ok_or_else(|| format!("unknown strategy: {} (use DRILL or REVIEW)", s))
}

async fn practice(
  config: ExerciseConfig,
  user_id: i64,
  curriculum: &Curriculum,
  store: Arc<dyn MasteryStore>,
  json: bool,
) -> Result<(), Box<dyn Error>> {
  let mut session = PracticeSession::initialize(
    config,
    user_id,
    curriculum,
    store,
    Arc::new(SystemClock),
    Box::new(StdRng::from_os_rng()),
  )
  .await?;

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  while let Some(exercise) = session.next()? {
    println!("{}", exercise.equation.question());
    let started = Instant::now();

    let Some(line) = lines.next_line().await? else {
      break;
    };
    let line = line.trim();
    if line == "q" {
      break;
    }

    let answer = line.parse::<i32>().unwrap_or(NOT_RECOGNIZED);
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if let Some(result) = session.submit(answer, elapsed_ms).await? {
      match result.status {
        ResultStatus::Correct => println!("  ✓ {} ({})", result.equation, result.speed_badge.as_str()),
        ResultStatus::Incorrect => println!(
          "  ✗ {} (answer: {})",
          result.equation,
          exercise.equation.expected_result()
        ),
        ResultStatus::NotRecognized => println!("  ? please enter a whole number"),
      }
    }
  }

  let highlights = analysis::generate_highlights(session.attempts());
  let result = session.finish();
  if json {
    println!("{}", serde_json::to_string_pretty(&result)?);
    return Ok(());
  }

  println!("\n{}/{} correct", result.correct_count(), result.results.len());
  if let Some(stars) = result.star_progress {
    println!("Stars: {} -> {}", stars.initial_stars, stars.final_stars);
  }
  for highlight in highlights {
    println!("{} {}", highlight.icon(), highlight.message());
  }
  Ok(())
}

fn list_levels(
  curriculum: &Curriculum,
  operation: Option<Operation>,
  user_id: i64,
  store: Arc<dyn MasteryStore>,
  json: bool,
) -> Result<(), Box<dyn Error>> {
  let mastery = store.load_mastery(user_id)?;
  let summaries: Vec<LevelSummary> = curriculum
    .all_levels()
    .iter()
    .filter(|level| operation.is_none_or(|op| level.operation() == op))
    .map(|level| LevelSummary {
      id: level.id().to_string(),
      operation: level.operation(),
      strategy: level.strategy(),
      facts: level.all_fact_ids().len(),
      stars: level.calculate_stars(&mastery),
      unlocked_by: level.prerequisites().to_vec(),
    })
    .collect();

  if json {
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    return Ok(());
  }
  for level in summaries {
    println!(
      "{:<26} {:<15} {:<7} {:>4} facts  {}",
      level.id,
      level.operation.as_str(),
      level.strategy.as_str(),
      level.facts,
      "★".repeat(level.stars as usize)
    );
  }
  Ok(())
}

fn stats(user_id: i64, store: Arc<dyn MasteryStore>, json: bool) -> Result<(), Box<dyn Error>> {
  let today = SystemClock.now().date_naive();
  let streak_days =
    analysis::calculate_streak(&analysis::daily_activity(&store.attempts(user_id)?), today);
  let start_of_today = today.and_time(NaiveTime::MIN).and_utc();
  let todays = store.attempts_since(user_id, start_of_today)?;

  let stats = Stats {
    streak_days,
    attempts_today: todays.len(),
    highlights: analysis::generate_highlights(&todays),
  };
  if json {
    println!("{}", serde_json::to_string_pretty(&stats)?);
    return Ok(());
  }

  println!("Streak: {} day(s)", stats.streak_days);
  println!("Today: {} exercise(s)", stats.attempts_today);
  for highlight in &stats.highlights {
    println!("{} {}", highlight.icon(), highlight.message());
  }
  Ok(())
}
