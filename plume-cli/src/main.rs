//! Plume CLI: match style sheets against a view tree and print the result.
//!
//! Run with: cargo run --bin plume -- --stylesheet demos/theme.json --tree demos/views.json

mod tree;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use plume_css::{AstNode, Declaration, MatchedSelector, ResolvedStyle, StyleConfig, StyleScope};
use plume_view::{NodeId, ViewTree};
use serde::Serialize;

use tree::{ViewSpec, describe};

/// Plume: selector matching and cascade inspector
#[derive(Parser, Debug)]
#[command(name = "plume")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Resolve every view in the tree
    plume --stylesheet theme.json --tree views.json

    # Later sheets win ties against earlier ones
    plume -s base.json -s overrides.json --tree views.json

    # Only the view with id "ok", as JSON
    plume -s theme.json --tree views.json --node ok --json

    # Rules that apply while the view is pressed
    plume -s theme.json --tree views.json --node ok --state pressed

    # Fail on sibling combinators instead of skipping them
    plume -s theme.json --tree views.json --strict
"#)]
struct Cli {
    /// Rule AST file (JSON array of rule and comment nodes); repeatable
    #[arg(short, long = "stylesheet", value_name = "FILE", required = true)]
    stylesheets: Vec<PathBuf>,

    /// View tree file (JSON)
    #[arg(short, long, value_name = "FILE")]
    tree: PathBuf,

    /// Only report the view with this id
    #[arg(long, value_name = "ID")]
    node: Option<String>,

    /// List the visual-state rules for this state instead of resolving
    #[arg(long, value_name = "STATE")]
    state: Option<String>,

    /// Reject sheets containing `+` or `~` combinators
    #[arg(long)]
    strict: bool,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,
}

/// Everything printed for one view.
#[derive(Debug, Serialize)]
struct ViewReport {
    view: String,
    matches: Vec<String>,
    style: ResolvedStyle,
    failures: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let sheets = cli
        .stylesheets
        .iter()
        .map(|path| load_sheet(path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let config = StyleConfig::new().with_strict_combinators(cli.strict);
    let scope = StyleScope::with_sheets(config, sheets).context("building selector index")?;

    let source = fs::read_to_string(&cli.tree)
        .with_context(|| format!("reading {}", cli.tree.display()))?;
    let spec: ViewSpec = serde_json::from_str(&source)
        .with_context(|| format!("parsing {}", cli.tree.display()))?;
    let tree = spec.into_tree();

    let targets = match &cli.node {
        Some(view_id) => match tree.find_by_id(view_id) {
            Some(id) => vec![id],
            None => anyhow::bail!("no view with id {view_id:?}"),
        },
        None => tree.descendants(tree.root()),
    };

    if !cli.json {
        let snapshot = scope.snapshot();
        for (rule_set, invalid) in snapshot.invalid_selectors() {
            eprintln!(
                "{} rule {}: {}",
                "skipped".yellow(),
                rule_set.0,
                invalid.error
            );
        }
    }

    if let Some(state) = &cli.state {
        print_state(&scope, &tree, &targets, state, cli.json)?;
        return Ok(());
    }

    let reports: Vec<ViewReport> = targets
        .iter()
        .filter_map(|&id| report(&scope, &tree, id))
        .collect();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report);
        }
    }
    Ok(())
}

fn load_sheet(path: &Path) -> anyhow::Result<Vec<AstNode>> {
    let source =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("parsing {}", path.display()))
}

fn report(scope: &StyleScope, tree: &ViewTree, id: NodeId) -> Option<ViewReport> {
    let view = tree.view(id)?;
    let inline: Vec<_> = view
        .data()
        .inline_style
        .iter()
        .map(|(property, value)| Declaration::new(property, value))
        .collect();

    let mut style = ResolvedStyle::default();
    let applied = scope.resolve(&view, &inline, &mut style);

    Some(ViewReport {
        view: describe(view.data()),
        matches: scope.query(&view).iter().map(ToString::to_string).collect(),
        style,
        failures: applied.failures.iter().map(ToString::to_string).collect(),
    })
}

fn print_report(report: &ViewReport) {
    println!("{}", report.view.bold());
    if report.matches.is_empty() {
        println!("  {}", "(no rules)".dimmed());
    }
    for matched in &report.matches {
        println!("  {matched}");
    }
    match serde_json::to_string(&report.style) {
        Ok(style) => println!("  {} {style}", "=>".green()),
        Err(e) => println!("  {} {e}", "=>".red()),
    }
    for failure in &report.failures {
        println!("  {} {failure}", "!".red());
    }
}

fn print_state(
    scope: &StyleScope,
    tree: &ViewTree,
    targets: &[NodeId],
    state: &str,
    json: bool,
) -> anyhow::Result<()> {
    let states = scope.visual_states();
    let mut listing = Vec::new();
    for &id in targets {
        let Some(view) = tree.view(id) else {
            continue;
        };
        let matches: Vec<MatchedSelector<'_>> = states.query(&view, state);
        listing.push((
            describe(view.data()),
            matches.iter().map(ToString::to_string).collect::<Vec<_>>(),
        ));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }
    for (view, matches) in &listing {
        println!("{}:{}", view.bold(), state.cyan());
        for matched in matches {
            println!("  {matched}");
        }
    }
    Ok(())
}
