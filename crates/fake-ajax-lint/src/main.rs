//! fake-ajax rule file linter
//!
//! Usage:
//!   fake-ajax-lint <directory_or_file> [OPTIONS]

use clap::Parser;
use fake_ajax_lint::{
    collect_rule_files, fix_keys, is_yaml, lint_file, parse_rule_document, LintIssue,
    LintOptions, LintResult, Severity,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Parser, Debug)]
#[command(name = "fake-ajax-lint")]
#[command(author, version, about = "Validate fake-ajax rule files")]
struct Args {
    /// Rule file, or directory containing .json/.yaml/.yml rule files
    #[arg(required = true)]
    path: PathBuf,

    /// Rewrite keys that can never match into their canonical spelling
    #[arg(short, long)]
    fix: bool,

    /// Output format: text (default), json
    #[arg(short, long, default_value = "text")]
    output: String,

    /// Only show errors (hide warnings)
    #[arg(short = 'e', long)]
    errors_only: bool,

    /// Do not report unknown rule fields
    #[arg(long)]
    allow_unknown_fields: bool,

    /// Strict mode - treat warnings as errors
    #[arg(short, long)]
    strict: bool,
}

fn main() {
    let args = Args::parse();
    let json_output = args.output == "json";

    let options = LintOptions {
        check_unknown_fields: !args.allow_unknown_fields,
    };

    let files = collect_rule_files(&args.path);
    if files.is_empty() {
        eprintln!(
            "{YELLOW}Warning:{RESET} No rule files found in {}",
            args.path.display()
        );
        std::process::exit(0);
    }

    if !json_output {
        println!("{BOLD}{CYAN}fake-ajax rule linter{RESET}");
        println!("{DIM}{RULE}{RESET}");
        println!("{DIM}Scanning:{RESET} {CYAN}{}{RESET}", args.path.display());
        println!(
            "{DIM}Found:{RESET}    {BOLD}{}{RESET} rule file(s)\n",
            files.len()
        );
    }

    let mut result = LintResult::new();
    for file in &files {
        result.merge(lint_file(file, &options));
    }

    if json_output {
        print_results_json(&result);
    } else {
        print_results(&result, &args);
    }

    if args.fix && result.warnings > 0 {
        if !json_output {
            println!("\n{BOLD}Applying fixes...{RESET}");
        }
        apply_fixes(&files, json_output);
    }

    std::process::exit(if result.failed(args.strict) { 1 } else { 0 });
}

fn print_results_json(result: &LintResult) {
    match serde_json::to_string_pretty(result) {
        Ok(output) => println!("{output}"),
        Err(e) => eprintln!("{RED}Error serializing results: {e}{RESET}"),
    }
}

fn print_results(result: &LintResult, args: &Args) {
    println!();

    if result.issues.is_empty() {
        println!("{GREEN}{BOLD}No issues found!{RESET}");
    } else {
        let mut issues_by_file: BTreeMap<&PathBuf, Vec<&LintIssue>> = BTreeMap::new();
        for issue in &result.issues {
            if args.errors_only && issue.severity != Severity::Error {
                continue;
            }
            issues_by_file.entry(&issue.file).or_default().push(issue);
        }

        for (file, issues) in issues_by_file {
            print_file_issues(file, &issues);
        }
    }

    println!("{DIM}{RULE}{RESET}");
    println!("{BOLD}{CYAN}Summary{RESET}");
    println!("{DIM}{RULE}{RESET}");
    println!(
        "  {DIM}Files checked:{RESET} {BOLD}{}{RESET}",
        result.files_checked
    );

    if result.errors > 0 {
        println!("  {RED}Errors:{RESET}    {BOLD}{RED}{}{RESET}", result.errors);
    } else {
        println!("  {GREEN}Errors:{RESET}    {BOLD}{GREEN}0{RESET}");
    }

    if result.warnings > 0 {
        println!(
            "  {YELLOW}Warnings:{RESET}  {BOLD}{YELLOW}{}{RESET}",
            result.warnings
        );
    } else {
        println!("  {DIM}Warnings:{RESET}  {BOLD}0{RESET}");
    }

    println!();

    if result.failed(args.strict) {
        println!("{RED}{BOLD}Linting failed{RESET}");
    } else if result.warnings > 0 {
        println!("{YELLOW}{BOLD}Passed with warnings{RESET}");
    } else {
        println!("{GREEN}{BOLD}All checks passed!{RESET}");
    }
}

fn print_file_issues(file: &Path, issues: &[&LintIssue]) {
    let file_errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();
    let file_warnings = issues
        .iter()
        .filter(|i| i.severity == Severity::Warning)
        .count();

    let status = if file_errors > 0 {
        format!("{RED}FAIL{RESET}")
    } else if file_warnings > 0 {
        format!("{YELLOW}WARN{RESET}")
    } else {
        format!("{CYAN}INFO{RESET}")
    };

    let file_name = file.file_name().unwrap_or_default().to_string_lossy();
    println!(
        "{status} {BOLD}{CYAN}{file_name}{RESET} {DIM}({file_errors} error(s), {file_warnings} warning(s)){RESET}"
    );

    for issue in issues {
        let color = severity_color(issue.severity);
        let location = issue
            .location
            .as_ref()
            .map(|l| format!("{DIM}[{RESET}{CYAN}{l}{RESET}{DIM}]{RESET} "))
            .unwrap_or_default();

        println!(
            "  {color}|{RESET} {location}{BOLD}{color}{}{RESET}: {} {DIM}({color}{}{DIM}){RESET}",
            issue.severity.label(),
            issue.message,
            issue.code
        );
        if let Some(suggestion) = &issue.suggestion {
            println!("  {color}|{RESET}   {GREEN}-> {suggestion}{RESET}");
        }
    }
    println!();
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => RED,
        Severity::Warning => YELLOW,
        Severity::Info => CYAN,
    }
}

/// Rewrite fixable keys in place. `quiet` keeps stdout clean for JSON output;
/// failures still go to stderr.
fn apply_fixes(files: &[PathBuf], quiet: bool) {
    let mut fixes_applied = 0;

    for file in files {
        let Ok(content) = std::fs::read_to_string(file) else {
            continue;
        };
        let Ok(mut document) = parse_rule_document(file, &content) else {
            continue;
        };

        let fixed = fix_keys(&mut document);
        if fixed == 0 {
            continue;
        }
        fixes_applied += fixed;

        let serialized = if is_yaml(file) {
            serde_yaml::to_string(&document).map_err(|e| e.to_string())
        } else {
            serde_json::to_string_pretty(&document).map_err(|e| e.to_string())
        };

        match serialized {
            Ok(content) => {
                if let Err(e) = std::fs::write(file, content) {
                    eprintln!("{RED}Error writing {}: {e}{RESET}", file.display());
                } else if !quiet {
                    println!("{GREEN}Fixed {fixed} key(s): {}{RESET}", file.display());
                }
            }
            Err(e) => eprintln!("{RED}Error serializing {}: {e}{RESET}", file.display()),
        }
    }

    if !quiet {
        println!("\n{GREEN}Applied {fixes_applied} fixes{RESET}");
    }
}
