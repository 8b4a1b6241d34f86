//! Gacha Tally - Binary Entry Point
//!
//! `gacha [--base-dir DIR] <command>`; see `gacha --help`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use gacha_tally::config::BASE_DIR_ENV;
use gacha_tally::{GachaResult, GachaService, Paths, PlayerRecord};

/// Exit status for malformed command lines, same as clap's
const USAGE_EXIT: u8 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about = "Gacha play-result ledger", long_about = None)]
struct Cli {
    /// Directory holding data/, backups/, logs/ and setting.json
    #[arg(long, env = BASE_DIR_ENV, global = true)]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record one draw: 0 = hit, 1 = jackpot
    Record { name: String, result: String },
    /// Back up the roster, then clear it
    Reset,
    /// Rewrite data/data.js from the roster
    #[command(alias = "gen-datajs")]
    RegenerateSnapshot,
    /// Back up the roster without changing it
    Backup,
    /// Back up the roster, then replace it with a backup
    Restore { backup: String },
    /// Rewrite backups/index.js and the backup script wrappers
    GenBackupIndex,
    /// Set a player's reward status: none, progress or done
    Status { name: String, status: String },
    /// List backups, newest first
    Backups,
    /// Print the roster
    Show,
    /// `gacha <name> <result>`, same as `record`
    #[command(external_subcommand)]
    Legacy(Vec<String>),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Command::Legacy(args) = &cli.command {
        if args.len() != 2 {
            eprintln!(
                "error: unrecognized command {:?}\n\nUsage: gacha <name> <0|1>, or see gacha --help",
                args.join(" ")
            );
            return ExitCode::from(USAGE_EXIT);
        }
    }

    match run(Paths::resolve(cli.base_dir), cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(paths: Paths, command: Command) -> GachaResult<()> {
    let service = GachaService::open(paths)?;

    match command {
        Command::Record { name, result } => {
            print_record(&service.record(&name, &result)?);
        }
        Command::Legacy(args) => {
            // Arity is checked before the service is opened
            if let [name, result] = args.as_slice() {
                print_record(&service.record(name, result)?);
            }
        }
        Command::Reset => {
            let artifact = service.reset()?;
            println!("reset: completed (backup {})", artifact.name);
        }
        Command::RegenerateSnapshot => {
            let snapshot = service.regenerate_snapshot()?;
            println!("regenerate-snapshot: completed ({})", snapshot.path.display());
        }
        Command::Backup => {
            let artifact = service.backup()?;
            println!("backup: completed ({})", artifact.name);
        }
        Command::Restore { backup } => {
            let report = service.restore(&backup)?;
            println!(
                "restore: completed ({} player(s) from {}, previous roster in {})",
                report.players, report.restored_from, report.safety_backup.name
            );
        }
        Command::GenBackupIndex => {
            let count = service.rebuild_backup_index()?;
            println!("gen-backup-index: completed ({} backup(s))", count);
        }
        Command::Status { name, status } => {
            let record = service.set_status(&name, &status)?;
            print_record(&record);
        }
        Command::Backups => {
            for name in service.list_backups()? {
                println!("{}", name);
            }
        }
        Command::Show => {
            let roster = service.show()?;
            println!("{}", serde_json::to_string_pretty(&roster)?);
        }
    }

    Ok(())
}

fn print_record(record: &PlayerRecord) {
    let flags = record.flags();
    println!(
        "{}: hit={} jackpot={} illust={} gif={} status={}",
        record.name(),
        record.hit_count(),
        record.jackpot_count(),
        flags.illust,
        flags.gif,
        record.status()
    );
}
