//------------ suggest-cli -------------------------------------------------------
//!
//! Interactive admin/debug harness over the Admin Control Plane (C9):
//! load a snapshot, issue suggest queries, inspect stats, trigger a
//! rebuild or cache clear. Mirrors the teacher's own `bin/cli.rs`
//! shape: `clap` for startup flags, `rustyline` for the REPL loop,
//! `ansi_term` for colored output.

use std::path::PathBuf;

use ansi_term::Colour;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use suggest_store::admin::Admin;
use suggest_store::config::EngineConfig;
use suggest_store::engine::Engine;
use suggest_store::phrase::now_ms;

#[derive(Parser, Debug)]
#[command(name = "suggest-cli", about = "Admin REPL for the suggestion engine")]
struct Args {
    /// Snapshot file (serde_json-encoded Vec<SnapshotRecord>) to load at startup.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Number of shards.
    #[arg(long, default_value_t = EngineConfig::default().shard_count)]
    shard_count: u32,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut config = EngineConfig::default();
    config.shard_count = args.shard_count;
    let engine = match Engine::new(config) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("{}", Colour::Red.paint(format!("{err}")));
            std::process::exit(1);
        }
    };

    if let Some(path) = &args.snapshot {
        match engine.rebuild_from_file(path) {
            Ok(()) => println!("{}", Colour::Green.paint(format!("loaded snapshot {}", path.display()))),
            Err(err) => eprintln!("{}", Colour::Red.paint(format!("{err}"))),
        }
    }

    let admin = Admin::new(&engine);
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("{}", Colour::Red.paint(format!("readline init failed: {err}")));
            std::process::exit(1);
        }
    };

    println!("suggest-cli ready. Commands: suggest <prefix> [user_id], rebuild <path>, stats, clear-cache, trending [n], sweep, quit");

    loop {
        match rl.readline("suggest> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                if !handle_command(line.trim(), &engine, &admin) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", Colour::Red.paint(format!("readline error: {err}")));
                break;
            }
        }
    }
}

/// Returns `false` to end the REPL loop.
fn handle_command(line: &str, engine: &Engine, admin: &Admin) -> bool {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else { return true };

    match command {
        "quit" | "exit" => return false,
        "stats" => println!("{}", admin.stats()),
        "clear-cache" => {
            admin.clear_cache();
            println!("{}", Colour::Green.paint("cache cleared"));
        }
        "sweep" => {
            let removed = admin.sweep_expired_users(now_ms());
            println!("removed {removed} stale user histories");
        }
        "rebuild" => match parts.next() {
            Some(path) => match admin.rebuild_from_file(path) {
                Ok(()) => println!("{}", Colour::Green.paint("rebuild complete")),
                Err(err) => eprintln!("{}", Colour::Red.paint(format!("{err}"))),
            },
            None => eprintln!("{}", Colour::Yellow.paint("usage: rebuild <snapshot-path>")),
        },
        "suggest" => match parts.next() {
            Some(prefix) => {
                let user_id = parts.next();
                match engine.suggest(prefix, user_id, None, now_ms(), None) {
                    Ok(results) => {
                        for r in results {
                            println!("  {:>8.4}  {}", r.score, r.phrase);
                        }
                    }
                    Err(err) => eprintln!("{}", Colour::Red.paint(format!("{err}"))),
                }
            }
            None => eprintln!("{}", Colour::Yellow.paint("usage: suggest <prefix> [user_id]")),
        },
        "trending" => {
            let n = parts.next().and_then(|s| s.parse().ok()).unwrap_or(10);
            for (phrase, score) in admin.trending_top(now_ms(), n) {
                println!("  {score:>8}  {phrase}");
            }
        }
        other => eprintln!("{}", Colour::Yellow.paint(format!("unknown command: {other}"))),
    }
    true
}
