//! GitScope - read-only history and diff inspection for Git repositories
//!
//! This is the main entry point for the gitscope command-line interface.

use std::path::PathBuf;
use std::process::ExitCode;

use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gitscope::explorer::{Explorer, ExplorerConfig};
use gitscope::graph::BranchPriority;

enum Command {
    Branches,
    Log(String),
    LogAll(Vec<String>),
    Diff(String, String),
    Compare(String, String),
    Show(String),
    Graph(Vec<String>),
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    // Parse simple command line args.
    let mut path = PathBuf::from(".");
    let mut verbose = false;
    let mut config = ExplorerConfig::default();
    let mut positional: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-C" | "--repo" => {
                i += 1;
                if i < args.len() {
                    path = PathBuf::from(&args[i]);
                }
            }
            "-n" | "--depth" => {
                i += 1;
                match parse_number(&args, i, "--depth") {
                    Some(depth) => config = config.per_branch_depth(depth),
                    None => return ExitCode::FAILURE,
                }
            }
            "--max-files" => {
                i += 1;
                match parse_number(&args, i, "--max-files") {
                    Some(n) => config = config.max_files(n),
                    None => return ExitCode::FAILURE,
                }
            }
            "--max-bytes" => {
                i += 1;
                match parse_number(&args, i, "--max-bytes") {
                    Some(n) => config = config.max_file_bytes(n),
                    None => return ExitCode::FAILURE,
                }
            }
            "-p" | "--priority" => {
                i += 1;
                if i < args.len() {
                    let names = args[i].split(',').map(str::trim).filter(|s| !s.is_empty());
                    config = config.priority(BranchPriority::new(names));
                }
            }
            "-v" | "--verbose" => {
                verbose = true;
            }
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            "--version" => {
                println!("gitscope v{}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            arg => {
                if !arg.starts_with('-') {
                    positional.push(arg.to_string());
                } else {
                    eprintln!("Unknown option: {}", arg);
                    return ExitCode::FAILURE;
                }
            }
        }
        i += 1;
    }

    init_logging(verbose);

    let command = match parse_command(positional) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("Run 'gitscope --help' for usage.");
            return ExitCode::FAILURE;
        }
    };

    let explorer = match Explorer::open_with_config(&path, config) {
        Ok(explorer) => explorer,
        Err(e) => {
            eprintln!("Error opening repository: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&explorer, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "gitscope=debug" } else { "gitscope=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_number(args: &[String], i: usize, flag: &str) -> Option<usize> {
    match args.get(i).map(|v| v.parse::<usize>()) {
        Some(Ok(n)) => Some(n),
        Some(Err(_)) => {
            eprintln!("Invalid value for {}: {}", flag, args[i]);
            None
        }
        None => {
            eprintln!("Missing value for {}", flag);
            None
        }
    }
}

fn parse_command(mut positional: Vec<String>) -> Result<Command, String> {
    if positional.is_empty() {
        return Err("Missing command".to_string());
    }
    let name = positional.remove(0);
    let rest = positional;

    let command = match (name.as_str(), rest.as_slice()) {
        ("branches", []) => Command::Branches,
        ("log", [branch]) => Command::Log(branch.clone()),
        ("log-all", _) => Command::LogAll(rest.to_vec()),
        ("diff", [old, new]) => Command::Diff(old.clone(), new.clone()),
        ("compare", [old, new]) => Command::Compare(old.clone(), new.clone()),
        ("show", [revision]) => Command::Show(revision.clone()),
        ("graph", _) => Command::Graph(rest.to_vec()),
        ("branches" | "log" | "diff" | "compare" | "show", _) => {
            return Err(format!("Wrong number of arguments for '{}'", name));
        }
        _ => return Err(format!("Unknown command: {}", name)),
    };
    Ok(command)
}

fn run(explorer: &Explorer, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Branches => print_json(&explorer.list_branches()?),
        Command::Log(branch) => print_json(&explorer.list_commits(&branch)?),
        Command::LogAll(branches) => print_json(&explorer.list_all_commits(&as_strs(&branches))?),
        Command::Diff(old, new) => print_text(&explorer.tree_diff(&old, &new)?),
        Command::Compare(old, new) => print_text(&explorer.compare_branches(&old, &new)?),
        Command::Show(revision) => print_text(&explorer.commit_diff(&revision)?),
        Command::Graph(branches) => print_json(&explorer.graph(&as_strs(&branches))?),
    }
}

fn as_strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_text(text: &str) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", text);
    if !text.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn print_help() {
    println!("GitScope - read-only history and diff inspection for Git repositories");
    println!();
    println!("Usage: gitscope [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("Commands:");
    println!("  branches                 List local branches");
    println!("  log BRANCH               List the history of one branch (JSON)");
    println!("  log-all [BRANCH...]      List commits across branches, newest first (JSON)");
    println!("  diff REV_A REV_B         Unified diff between two revisions");
    println!("  compare BRANCH_A BRANCH_B");
    println!("                           Unified diff between two branch tips");
    println!("  show REV                 Unified diff of a commit against its first parent");
    println!("  graph [BRANCH...]        Commit graph across branches (JSON)");
    println!();
    println!("With no BRANCH arguments, log-all and graph use every local branch.");
    println!();
    println!("Options:");
    println!("  -C, --repo PATH          Path to the repository (default: .)");
    println!("  -n, --depth N            Commits walked per branch (default: 50)");
    println!("      --max-files N        Files rendered per diff (default: 10)");
    println!("      --max-bytes N        Largest file diffed, in bytes (default: 1048576)");
    println!("  -p, --priority A,B,...   Primary branch priority (default: main,master,dev,develop)");
    println!("  -v, --verbose            Enable debug logging");
    println!("  -h, --help               Show this help message");
    println!("  --version                Show version");
    println!();
    println!("Examples:");
    println!("  gitscope graph main feature");
    println!("  gitscope -C ../repo compare main develop");
    println!("  gitscope show HEAD~1");
}
