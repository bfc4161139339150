//! hasse CLI: edit a poset-structured dictionary file.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};

use hasse_lexicon::config::LexiconConfig;
use hasse_lexicon::engine::{Commit, Lexicon, MutationEngine};
use hasse_lexicon::entry::{ContentBlock, CoverSide, FieldUpdate, WordId};
use hasse_lexicon::error::IntegrityWarning;
use hasse_lexicon::export;

#[derive(Parser)]
#[command(name = "hasse", version, about = "Poset-structured dictionary editor")]
struct Cli {
    /// Dictionary file in `{"words": [...]}` form.
    #[arg(long, global = true, default_value = "dictionary.json")]
    file: PathBuf,

    /// TOML config file. Defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "lexicon.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new dictionary holding a single category root.
    Init {
        /// Headword of the root.
        headword: String,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Print one entry as JSON.
    Show { id: WordId },

    /// List category roots.
    Roots,

    /// List an entry and all of its ancestors.
    Ancestors { id: WordId },

    /// List an entry and all of its descendants.
    Descendants { id: WordId },

    /// Add a blank entry below a parent.
    Add {
        parent: WordId,
        /// Headword for the new entry.
        #[arg(long)]
        headword: Option<String>,
    },

    /// Delete an entry.
    Delete {
        id: WordId,
        /// Move the entry's children here instead of deleting them.
        #[arg(long)]
        reattach_to: Option<WordId>,
    },

    /// Replace one field of an entry.
    Set {
        id: WordId,
        field: FieldArg,
        /// New value: text, comma-separated list, `true`/`false`, or a JSON
        /// array of `{"title", "text"}` blocks for contents and variations.
        value: String,
    },

    /// Replace an entry's upper or lower covers.
    Relink {
        id: WordId,
        side: CoverSide,
        /// Comma-separated ids; empty to clear.
        #[arg(default_value = "")]
        ids: String,
    },

    /// Audit every invariant and print a summary.
    Check,

    /// Re-import the file, applying repairs, and write it back.
    Normalize,
}

#[derive(Clone, Copy, ValueEnum)]
enum FieldArg {
    Entry,
    Translations,
    #[value(alias = "simple_translations")]
    SimpleTranslations,
    Category,
    Tags,
    Contents,
    Variations,
    Arguments,
    #[value(alias = "is_function")]
    IsFunction,
    #[value(alias = "upper_covers")]
    UpperCovers,
    #[value(alias = "lower_covers")]
    LowerCovers,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = LexiconConfig::load_or_default(&cli.config)?;
    let engine = MutationEngine::new(config.to_engine_config());

    match cli.command {
        Commands::Init { headword, force } => {
            if cli.file.exists() && !force {
                return Err(miette::miette!(
                    help = "Pass --force to overwrite it.",
                    "{} already exists",
                    cli.file.display()
                ));
            }
            let commit = engine.add_root(&Lexicon::new(), &headword)?;
            export::write_file(&cli.file, &commit.lexicon, config.pretty_json)?;
            println!("Initialized {} with root {}", cli.file.display(), headword);
        }

        Commands::Show { id } => {
            let lex = load(&cli.file)?;
            let entry = lex.get_entry(id)?;
            println!("{}", serde_json::to_string_pretty(entry).into_diagnostic()?);
        }

        Commands::Roots => {
            let lex = load(&cli.file)?;
            let roots = lex.list_roots(&config.category_marker);
            if roots.is_empty() {
                println!("No category roots.");
            }
            for id in roots {
                print_line(&lex, id);
            }
        }

        Commands::Ancestors { id } => {
            let lex = load(&cli.file)?;
            lex.get_entry(id)?;
            for a in lex.ancestors_of(id) {
                print_line(&lex, a);
            }
        }

        Commands::Descendants { id } => {
            let lex = load(&cli.file)?;
            lex.get_entry(id)?;
            for d in lex.descendants_of(id) {
                print_line(&lex, d);
            }
        }

        Commands::Add { parent, headword } => {
            let lex = load(&cli.file)?;
            let mut commit = engine.add_word(&lex, parent)?;
            if let (Some(headword), Some(id)) = (headword, commit.created) {
                let named = engine.update_field(&commit.lexicon, id, FieldUpdate::Entry(headword))?;
                commit.lexicon = named.lexicon;
            }
            save(&cli.file, &commit, config.pretty_json)?;
            if let Some(id) = commit.created {
                println!("Added {id} below {parent}");
            }
        }

        Commands::Delete { id, reattach_to } => {
            let lex = load(&cli.file)?;
            let commit = engine.delete_word(&lex, id, reattach_to)?;
            let removed = lex.live_count() - commit.lexicon.live_count();
            save(&cli.file, &commit, config.pretty_json)?;
            println!("Deleted {id} ({removed} entr(ies) removed)");
        }

        Commands::Set { id, field, value } => {
            let lex = load(&cli.file)?;
            let update = parse_update(field, &value)?;
            let name = update.field_name();
            let commit = engine.update_field(&lex, id, update)?;
            save(&cli.file, &commit, config.pretty_json)?;
            println!("Updated {name} of {id}");
        }

        Commands::Relink { id, side, ids } => {
            let lex = load(&cli.file)?;
            let desired = parse_ids(&ids);
            let commit = engine.relink_covers(&lex, id, side, desired)?;
            save(&cli.file, &commit, config.pretty_json)?;
            let entry = commit.lexicon.get_entry(id)?;
            println!("{id} {side}: {}", join_ids(entry.covers(side).iter().copied()));
        }

        Commands::Check => {
            let lex = load(&cli.file)?;
            let report = engine.verify(&lex);
            print!("{}", lex.info());
            if !report.is_consistent() {
                println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
                return Err(miette::miette!(
                    help = "Run `hasse normalize` to repair what can be repaired.",
                    "{} integrity problem(s) found",
                    report.problem_count()
                ));
            }
            println!("All invariants hold.");
        }

        Commands::Normalize => {
            let imported = export::read_file(&cli.file)?;
            report_warnings(&imported.warnings);
            export::write_file(&cli.file, &imported.lexicon, config.pretty_json)?;
            println!(
                "Normalized {} ({} repair(s))",
                cli.file.display(),
                imported.warnings.len()
            );
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<Lexicon> {
    let imported = export::read_file(path)?;
    report_warnings(&imported.warnings);
    Ok(imported.lexicon)
}

fn save(path: &Path, commit: &Commit, pretty: bool) -> Result<()> {
    report_warnings(&commit.warnings);
    for rejected in &commit.rejected {
        eprintln!("{:?}", miette::Report::new(rejected.clone()));
    }
    export::write_file(path, &commit.lexicon, pretty)?;
    Ok(())
}

fn report_warnings(warnings: &[IntegrityWarning]) {
    for warning in warnings {
        eprintln!("{:?}", miette::Report::new(warning.clone()));
    }
}

fn print_line(lex: &Lexicon, id: WordId) {
    if let Ok(entry) = lex.get_entry(id) {
        println!("  {id}  {}  [{}]", entry.entry, entry.category);
    }
}

fn join_ids(ids: impl Iterator<Item = WordId>) -> String {
    ids.map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

/// Parse a comma-separated id list. Tokens that are not ids are reported and
/// left out; the rest of the edit goes ahead.
fn parse_ids(raw: &str) -> Vec<WordId> {
    let mut ids = Vec::new();
    for token in split_list(raw) {
        match token.parse::<WordId>() {
            Ok(id) => ids.push(id),
            Err(e) => {
                let warning = miette::miette!(
                    severity = miette::Severity::Warning,
                    code = "hasse::cli::bad_id",
                    help = "Ids are written as `N` or `#N`.",
                    "ignoring `{token}`: {e}"
                );
                eprintln!("{warning:?}");
            }
        }
    }
    ids
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_blocks(raw: &str) -> Result<Vec<ContentBlock>> {
    serde_json::from_str(raw).into_diagnostic()
}

fn parse_update(field: FieldArg, value: &str) -> Result<FieldUpdate> {
    let update = match field {
        FieldArg::Entry => FieldUpdate::Entry(value.to_string()),
        FieldArg::Category => FieldUpdate::Category(value.to_string()),
        FieldArg::Translations => FieldUpdate::Translations(split_list(value)),
        FieldArg::SimpleTranslations => FieldUpdate::SimpleTranslations(split_list(value)),
        FieldArg::Tags => FieldUpdate::Tags(split_list(value)),
        FieldArg::Contents => FieldUpdate::Contents(parse_blocks(value)?),
        FieldArg::Variations => FieldUpdate::Variations(parse_blocks(value)?),
        FieldArg::Arguments => FieldUpdate::Arguments(parse_ids(value)),
        FieldArg::IsFunction => FieldUpdate::IsFunction(value.trim().parse().into_diagnostic()?),
        FieldArg::UpperCovers => FieldUpdate::UpperCovers(parse_ids(value)),
        FieldArg::LowerCovers => FieldUpdate::LowerCovers(parse_ids(value)),
    };
    Ok(update)
}
