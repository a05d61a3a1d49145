use anyhow::{Context, Result};
use clap::Parser;
use concord_core::{ConcordanceQuery, Corpus, Language, OutputRow};
use concord_philologic::query::{fetch_all, PhilologicClient};
use concord_philologic::rows::{assemble_rows, lemma_label};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "concord")]
#[command(about = "Extract lemma concordances from PhiloLogic corpora into CSV", long_about = None)]
struct Cli {
    /// Lemma(s) to search for; several lemmas are OR-combined.
    #[arg(required = true)]
    lemmas: Vec<String>,

    /// Restrict to this author, as spelled in corpus metadata.
    #[arg(short, long)]
    author: Option<String>,

    /// Restrict to this work title.
    #[arg(short, long)]
    title: Option<String>,

    /// Output CSV path.
    #[arg(short, long, default_value = "output.csv")]
    output: PathBuf,

    /// Corpus language: Latin or Greek (selects the PhiloLogic endpoints).
    #[arg(short = 'L', long, default_value = "Latin", value_parser = parse_language)]
    language: Language,

    /// Override the corpus base URL (e.g. a local mirror); both the query and
    /// navigation endpoints derive from it.
    #[arg(long)]
    base_url: Option<String>,

    /// Print progress information to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_language(s: &str) -> std::result::Result<Language, concord_core::Error> {
    s.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let corpus = match cli.base_url.as_deref() {
        Some(base) => Corpus::with_base(cli.language, base)?,
        None => Corpus::for_language(cli.language)?,
    };

    if cli.verbose {
        eprintln!("language: {}", corpus.language.label());
        eprintln!("lemmas: {}", cli.lemmas.join(", "));
        if let Some(author) = cli.author.as_deref() {
            eprintln!("author filter: {author}");
        }
        if let Some(title) = cli.title.as_deref() {
            eprintln!("title filter: {title}");
        }
    }

    let query = ConcordanceQuery {
        lemmas: cli.lemmas.clone(),
        author: cli.author.clone(),
        title: cli.title.clone(),
    };
    let client = PhilologicClient::new(reqwest::Client::new(), corpus.clone());
    let response = fetch_all(&client, &query).await?;

    if cli.verbose {
        eprintln!("hits: {}", response.results.len());
    }

    let lemma = lemma_label(&cli.lemmas);
    let rows = assemble_rows(&response.results, &lemma, &corpus);

    write_csv(&rows, &cli.output)?;
    println!("wrote {} rows to {}", rows.len(), cli.output.display());
    Ok(())
}

/// Write all rows through a same-directory tempfile, then persist over the
/// output path, so no partially written file is ever observable there.
fn write_csv(rows: &[OutputRow], path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;

    {
        // The header is written unconditionally, so zero hits still produce a
        // well-formed (header-only) file.
        let mut w = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file_mut());
        w.write_record(OutputRow::HEADER)
            .context("write csv header")?;
        for row in rows {
            w.serialize(row).context("write csv row")?;
        }
        w.flush().context("flush csv")?;
    }

    tmp.persist(path)
        .with_context(|| format!("persist output to {}", path.display()))?;
    Ok(())
}
