//! Guided brewing session.
//!
//! Builds the plan up front (plan errors are fatal before the session UI
//! is entered), then runs the session driver on a tokio runtime with stdin
//! supplying user intents. Restart and quit are confirmed before they
//! touch the session, per the configured guards.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};

use brewflow_core::log::{BrewOutcome, CreateLogRequest, LogSink};
use brewflow_core::scaling::{scale, ScaledResult};
use brewflow_core::session::{
    DisplayState, SessionDriver, SessionEngine, SessionIntent, SessionPhase, SystemClock,
};
use brewflow_core::{BrewConfig, BrewPlan, BrewPlanBuilder, SessionEvent};

use crate::common;
use crate::log_sink::JsonlLogSink;

#[derive(Args)]
pub struct BrewArgs {
    /// Recipe TOML file (defaults to the built-in V60 recipe)
    #[arg(long)]
    pub recipe: Option<PathBuf>,
    /// Dose in grams; marks dose as the last-edited field
    #[arg(long)]
    pub dose: Option<f64>,
    /// Target yield in grams; marks yield as last edited when given alone
    #[arg(long = "yield")]
    pub yield_g: Option<f64>,
    /// Water temperature in Celsius
    #[arg(long)]
    pub temp: Option<f64>,
    /// Grind label
    #[arg(long)]
    pub grind: Option<String>,
    /// Skip restart/quit confirmation prompts
    #[arg(long)]
    pub yes: bool,
}

#[derive(Clone, Copy, PartialEq)]
enum PendingConfirm {
    Restart,
    Quit,
}

pub fn run(args: BrewArgs) -> Result<(), Box<dyn std::error::Error>> {
    let recipe = common::load_recipe(args.recipe.as_deref())?;
    let config = common::load_config()?;
    let inputs = common::build_inputs(args.dose, args.yield_g, args.temp, args.grind);
    let profile = common::effective_profile(&config, &recipe);
    let scaled = scale(&recipe, &inputs, &profile);
    // Plan errors surface here, before any session state exists.
    let plan = BrewPlanBuilder::build(&recipe, &scaled)?;

    println!(
        "{} -- {} g : {} g at {} C ({})",
        plan.recipe_name, scaled.dose_g, scaled.yield_g, scaled.water_temp_c, scaled.grind_label
    );
    for warning in &scaled.warnings {
        println!("warning: {warning}");
    }
    println!("enter = continue/confirm, p = pause, r = resume, restart, q = quit");

    let runtime = tokio::runtime::Runtime::new()?;
    let engine = runtime.block_on(run_session(plan.clone(), &config, args.yes))?;

    if engine.is_completed() {
        capture_and_log(&plan, &scaled)?;
    }
    Ok(())
}

async fn run_session(
    plan: BrewPlan,
    config: &BrewConfig,
    assume_yes: bool,
) -> Result<SessionEngine, Box<dyn std::error::Error>> {
    let engine = SessionEngine::new(plan, Arc::new(SystemClock));
    let mut handle = SessionDriver::spawn(engine, Duration::from_millis(config.tick_interval_ms));
    handle.send(SessionIntent::Start);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_render = String::new();
    let mut pending: Option<PendingConfirm> = None;

    loop {
        tokio::select! {
            changed = handle.display.changed() => {
                if changed.is_err() {
                    break;
                }
                let display = handle.display.borrow_and_update().clone();
                render(&display, &mut last_render);
                if display.phase == SessionPhase::Completed {
                    break;
                }
            }
            event = handle.events.recv() => {
                match event {
                    Some(SessionEvent::StepCompleted { .. }) => println!("(timer done)"),
                    Some(_) => {}
                    None => break,
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed: tear the session down.
                    break;
                };
                let input = line.trim().to_lowercase();

                if let Some(what) = pending.take() {
                    if input == "y" || input == "yes" {
                        match what {
                            PendingConfirm::Restart => {
                                handle.send(SessionIntent::Restart);
                                handle.send(SessionIntent::Start);
                            }
                            PendingConfirm::Quit => break,
                        }
                    } else {
                        println!("cancelled");
                    }
                    continue;
                }

                match input.as_str() {
                    "" => {
                        let phase = handle.display.borrow().phase;
                        if phase == SessionPhase::AwaitingPour {
                            handle.send(SessionIntent::ConfirmPour);
                        } else {
                            handle.send(SessionIntent::Next);
                        }
                    }
                    "p" => handle.send(SessionIntent::Pause),
                    "r" => handle.send(SessionIntent::Resume),
                    "restart" => {
                        if assume_yes || !config.confirm_restart {
                            handle.send(SessionIntent::Restart);
                            handle.send(SessionIntent::Start);
                        } else {
                            pending = Some(PendingConfirm::Restart);
                            println!("restart discards session progress; continue? [y/N]");
                        }
                    }
                    "q" => {
                        if assume_yes || !config.confirm_exit {
                            break;
                        }
                        pending = Some(PendingConfirm::Quit);
                        println!("quit the session? [y/N]");
                    }
                    other => println!("unrecognized input: {other}"),
                }
            }
        }
    }

    handle.shutdown();
    Ok(handle.task.await?)
}

fn render(display: &DisplayState, last_render: &mut String) {
    let mut parts = vec![display.step_text.clone()];
    if let Some(countdown) = &display.countdown_text {
        parts.push(format!("countdown {countdown}"));
    }
    if let Some(elapsed) = &display.elapsed_text {
        parts.push(format!("elapsed {elapsed}"));
    }
    match display.phase {
        SessionPhase::AwaitingPour => parts.push("press enter to confirm the pour".into()),
        SessionPhase::Completed => {}
        _ if display.ready_to_advance => parts.push("press enter for the next step".into()),
        _ => {}
    }
    let line = parts.join(" | ");
    if line != *last_render {
        println!("{line}");
        *last_render = line;
    }
}

/// Prompt for an outcome and append the log request. An empty rating skips
/// logging entirely.
fn capture_and_log(plan: &BrewPlan, scaled: &ScaledResult) -> Result<(), Box<dyn std::error::Error>> {
    let Some(outcome) = prompt_outcome()? else {
        return Ok(());
    };
    let request = CreateLogRequest::new(plan, scaled, outcome);
    let sink = JsonlLogSink::new(common::data_dir()?.join("brewlog.jsonl"));
    sink.append(&request)?;
    println!("logged brew to {}", sink.path().display());
    Ok(())
}

fn prompt_outcome() -> Result<Option<BrewOutcome>, Box<dyn std::error::Error>> {
    let rating = match prompt_line("rating 1-5 (enter to skip logging): ")? {
        Some(text) if !text.is_empty() => match text.parse::<u8>() {
            Ok(rating @ 1..=5) => rating,
            _ => {
                println!("not a rating between 1 and 5; skipping log");
                return Ok(None);
            }
        },
        _ => return Ok(None),
    };
    let tag = prompt_line("tag (optional): ")?.filter(|t| !t.is_empty());
    let note = prompt_line("note (optional): ")?.filter(|n| !n.is_empty());
    Ok(Some(BrewOutcome { rating, tag, note }))
}

fn prompt_line(prompt: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
    use std::io::{BufRead, Write};
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
