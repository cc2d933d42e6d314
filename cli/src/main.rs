//! docstamp CLI - audit-row and title stamping for Word documents
//!
//! A command-line tool for listing documents in a library folder, stamping
//! an audit row and a new title into a chosen document, splitting at the
//! first page break, and inspecting content controls.

use clap::{Parser, Subcommand};
use colored::*;
use docstamp::package::{DocxPackage, DOCUMENT_PART};
use docstamp::store::{stamped_name, DocumentEntry, DocumentStore, LocalStore};
use docstamp::{AuditRow, SdtInfo, StampOptions};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Audit-row and title stamping for Word documents in a document library
#[derive(Parser)]
#[command(
    name = "docstamp",
    version,
    about = "Stamp Word documents in a document library",
    long_about = "docstamp - append an audit row and rewrite the title of a Word document,\n\
                  storing the result as a new file next to the original.\n\n\
                  Folders are local directories by default; pass --site-url to work\n\
                  against a content-management site over REST."
)]
struct Cli {
    /// Site URL of the remote document store (local directory mode when omitted)
    #[arg(long, global = true)]
    site_url: Option<String>,

    /// Bearer token for the remote store
    #[arg(long, global = true, env = "DOCSTAMP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the .docx documents in a folder
    #[command(visible_alias = "ls")]
    List {
        /// Local directory, or a server-relative folder with --site-url
        folder: String,
    },

    /// Append the audit row and rewrite the title, storing a new copy
    Stamp {
        /// Folder holding the document
        folder: String,

        /// Document name within the folder
        name: String,

        /// Audit row ID
        #[arg(long)]
        id: String,

        /// Audit row author
        #[arg(long)]
        author: String,

        /// Audit row date
        #[arg(long)]
        date: String,

        /// New document title
        #[arg(long)]
        title: String,

        /// Header literals identifying the marker table
        #[arg(long, value_delimiter = ',',
              default_values_t = docstamp::docx::table::DEFAULT_HEADERS.map(String::from))]
        headers: Vec<String>,

        /// Tag or alias of the title content control
        #[arg(long, default_value = docstamp::docx::title::DEFAULT_TITLE_TAG)]
        title_tag: String,

        /// Paragraph styles tried when no content control matches
        #[arg(long = "style", value_delimiter = ',',
              default_values_t = docstamp::docx::title::DEFAULT_TITLE_STYLES.map(String::from))]
        styles: Vec<String>,

        /// Suffix appended to the stored copy's name
        #[arg(long, default_value = "-edited")]
        suffix: String,
    },

    /// Split a document at its first page break into -pag1/-resto copies
    Split {
        /// Folder holding the document
        folder: String,

        /// Document name within the folder
        name: String,
    },

    /// Show the structured content controls of a document
    Inspect {
        /// Folder holding the document
        folder: String,

        /// Document name within the folder
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        site_url,
        token,
        command,
    } = cli;
    let store = make_store(site_url.as_deref(), token)?;

    match command {
        Commands::List { folder } => {
            let entries = store.list_documents(&folder)?;
            if entries.is_empty() {
                println!("{} No .docx documents in {}", "!".yellow().bold(), folder);
            }
            for entry in entries {
                println!("{}  {}", entry.name.bold(), entry.path.dimmed());
            }
        }

        Commands::Stamp {
            folder,
            name,
            id,
            author,
            date,
            title,
            headers,
            title_tag,
            styles,
            suffix,
        } => {
            let pb = create_spinner("Downloading document...");
            let entry = find_document(store.as_ref(), &folder, &name)?;
            let data = store.download(&entry.path)?;

            pb.set_message("Stamping...");
            let options = StampOptions {
                row: AuditRow::new(id, author, date),
                title,
                table_headers: headers,
                title_tag,
                title_styles: styles,
            };
            let (bytes, report) = docstamp::stamp_bytes(&data, &options)?;

            pb.set_message("Uploading...");
            let new_name = stamped_name(&entry.name, &suffix);
            let stored = store.upload(&folder, &new_name, &bytes)?;
            pb.finish_and_clear();

            println!("{} Stored {}", "✓".green().bold(), stored);
            println!(
                "{}: sdt={} fallback={} headers={} footers={} core={}",
                "Changes".bold(),
                report.document_sdt,
                report.style_fallback,
                report.headers_updated,
                report.footers_updated,
                report.core_updated
            );
        }

        Commands::Split { folder, name } => {
            let pb = create_spinner("Downloading document...");
            let entry = find_document(store.as_ref(), &folder, &name)?;
            let data = store.download(&entry.path)?;

            pb.set_message("Splitting...");
            let (first, rest) = docstamp::split_at_first_page_break(&data)?;

            pb.set_message("Uploading...");
            let first_name = stamped_name(&entry.name, "-pag1");
            let rest_name = stamped_name(&entry.name, "-resto");
            let first_path = store.upload(&folder, &first_name, &first)?;
            let rest_path = store.upload(&folder, &rest_name, &rest)?;
            pb.finish_and_clear();

            println!("{} Stored {}", "✓".green().bold(), first_path);
            println!("{} Stored {}", "✓".green().bold(), rest_path);
        }

        Commands::Inspect { folder, name, json } => {
            let entry = find_document(store.as_ref(), &folder, &name)?;
            let data = store.download(&entry.path)?;
            let pkg = DocxPackage::from_bytes(data)?;

            let mut parts = vec![DOCUMENT_PART.to_string()];
            parts.extend(pkg.header_parts());
            parts.extend(pkg.footer_parts());

            let mut controls: BTreeMap<String, Vec<SdtInfo>> = BTreeMap::new();
            for part in parts {
                let xml = pkg.read_xml(&part)?;
                controls.insert(part, docstamp::list_sdt_controls(&xml)?);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&controls)?);
            } else {
                for (part, infos) in controls {
                    println!("{} ({})", part.cyan().bold(), infos.len());
                    for info in infos {
                        println!(
                            "  tag={} alias={} text={:?}",
                            info.tag.as_deref().unwrap_or("-").bold(),
                            info.alias.as_deref().unwrap_or("-"),
                            info.sample_text
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

fn make_store(
    site_url: Option<&str>,
    token: Option<String>,
) -> Result<Box<dyn DocumentStore>, docstamp::Error> {
    match site_url {
        Some(site) => Ok(Box::new(docstamp::RestStore::new(site, token)?)),
        None => Ok(Box::new(LocalStore::new("."))),
    }
}

fn find_document(
    store: &dyn DocumentStore,
    folder: &str,
    name: &str,
) -> Result<DocumentEntry, docstamp::Error> {
    store
        .list_documents(folder)?
        .into_iter()
        .find(|e| e.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| docstamp::Error::DocumentNotFound(format!("{folder}/{name}")))
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_stamp_defaults() {
        let cli = Cli::parse_from([
            "docstamp", "stamp", "docs", "informe.docx", "--id", "1", "--author", "Ana",
            "--date", "01/01/2026", "--title", "Nuevo",
        ]);
        match cli.command {
            Commands::Stamp {
                headers,
                title_tag,
                styles,
                suffix,
                ..
            } => {
                assert_eq!(headers, vec!["ID", "Autor", "Fecha"]);
                assert_eq!(title_tag, "TituloDocumento");
                assert_eq!(styles, vec!["TituloDocumento", "Title"]);
                assert_eq!(suffix, "-edited");
            }
            _ => panic!("expected stamp command"),
        }
    }
}
