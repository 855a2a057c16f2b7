use crate::args::Args;
use crate::format::{format_info, format_json, format_records};
use crate::history::{load_history, save_history};
use crate::parser::{parse, Command};
use crate::timing::TimingState;
use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, BufRead, Write};

use kestrel_engine::{Database, JsonStorage};

const HELP: &str = "\
Commands:
  create_table <table> <col:type> ...   create a table (types: int, str, bool)
  list_tables                           list all tables
  drop_table <table>                    delete a table and its records
  insert into <table> values (v, ...)   insert a record
  select from <table> [where c = v]     read records
  update <table> set c = v [, ...] where c = v
  delete from <table> where c = v       delete matching records
  info <table>                          show table schema and record count
  timing                                toggle per-command timing
  help                                  show this help
  exit                                  leave the shell
";

/// Interactive shell over a database rooted at the configured data
/// directory.
pub fn run(db: &mut Database<JsonStorage>, args: &Args) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    load_history(&mut rl);

    let mut timing = TimingState::default();

    println!(
        "kestrel v{} — data directory \"{}\"",
        env!("CARGO_PKG_VERSION"),
        args.data_dir.display()
    );
    println!("Type help for commands, exit to quit.");

    loop {
        let line = match rl.readline("kestrel> ") {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(trimmed);

        let cmd = match parse(trimmed) {
            Ok(cmd) => cmd,
            Err(e) => {
                eprintln!("ERROR: {}", e);
                continue;
            }
        };

        match cmd {
            Command::Exit => break,
            Command::Timing => {
                let on = timing.toggle();
                println!("Timing is {}.", if on { "on" } else { "off" });
            }
            cmd => {
                let timer = timing.maybe_start();
                if let Err(e) = execute(db, cmd, args) {
                    eprintln!("ERROR: {:#}", e);
                }
                timing.maybe_print(timer);
            }
        }
    }

    save_history(&mut rl);
    Ok(())
}

/// Execute one parsed command against the database and print the
/// outcome. Shared by the shell and one-shot `-c` mode.
pub fn execute(db: &mut Database<JsonStorage>, cmd: Command, args: &Args) -> Result<()> {
    match cmd {
        Command::CreateTable { table, columns } => {
            let schema = db.create_table(&table, &columns)?;
            println!(
                "Table \"{}\" created with columns: {}",
                schema.name,
                schema.describe()
            );
        }
        Command::ListTables => {
            let tables = db.list_tables();
            if tables.is_empty() {
                println!("No tables.");
            } else {
                for name in tables {
                    println!("- {}", name);
                }
            }
        }
        Command::DropTable { table } => {
            if !confirm(args, &format!("drop table \"{}\"", table))? {
                return Ok(());
            }
            db.drop_table(&table)?;
            println!("Table \"{}\" dropped.", table);
        }
        Command::Insert { table, values } => {
            let id = db.insert(&table, &values)?;
            println!("Record with ID={} inserted into \"{}\"", id, table);
        }
        Command::Select { table, condition } => {
            let records = db.select(&table, condition.as_ref())?;
            if args.json {
                println!("{}", format_json(&records));
            } else {
                let columns = db.catalog().get(&table)?.columns.clone();
                print!("{}", format_records(&columns, &records));
            }
        }
        Command::Update {
            table,
            set_clause,
            condition,
        } => {
            let updated = db.update(&table, &set_clause, condition.as_ref())?;
            if updated == 0 {
                println!("No matching records.");
            } else {
                println!("Updated {} record(s).", updated);
            }
        }
        Command::Delete { table, condition } => {
            if condition.is_some() && !confirm(args, &format!("delete from \"{}\"", table))? {
                return Ok(());
            }
            let removed = db.delete(&table, condition.as_ref())?;
            if removed == 0 {
                println!("No records to delete.");
            } else {
                println!("Deleted {} record(s).", removed);
            }
        }
        Command::Info { table } => {
            print!("{}", format_info(&db.info(&table)?));
        }
        Command::Help => print!("{}", HELP),
        // Handled by the shell loop; no-ops in one-shot mode.
        Command::Timing | Command::Exit => {}
    }
    Ok(())
}

/// Ask the user to confirm a destructive action. `--yes` skips the
/// prompt.
fn confirm(args: &Args, action: &str) -> Result<bool> {
    if args.yes {
        return Ok(true);
    }
    print!("Really {}? [y/N] ", action);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let yes = matches!(answer.trim().to_lowercase().as_str(), "y" | "yes");
    if !yes {
        println!("Operation cancelled.");
    }
    Ok(yes)
}
